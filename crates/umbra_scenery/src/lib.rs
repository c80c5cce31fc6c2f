//! Umbra scenery - the nodes scenes are built from
//!
//! Primitives (sphere, disk, box), composites (list, object trees, CSG),
//! placement wrappers (static transformation, translation, motion
//! rotation), lights and basic shaders. All of them implement
//! `umbra_kernel::SceneObject`.

mod axis_box;
mod csg;
mod disk;
mod light_area;
mod light_point;
mod list;
mod motion_rotation;
mod object_tree;
mod shaders;
mod sphere;
mod transformation;
mod translation;

pub use axis_box::AxisBox;
pub use csg::{Csg, CsgOperation};
pub use disk::Disk;
pub use light_area::LightArea;
pub use light_point::LightPoint;
pub use list::List;
pub use motion_rotation::MotionRotation;
pub use object_tree::{AabbTree, AabpTree, ObjectTree, OctTree, Qbvh, SceneObjectTraits};
pub use shaders::{Lambert, Mirror};
pub use sphere::Sphere;
pub use transformation::Transformation;
pub use translation::Translation;
