//! The built-in demo scene.

use anyhow::{Context, Result};
use std::sync::Arc;
use umbra_kernel::{collect_lights, Light, SceneObject, SceneObjectRef, Spectral, TimePeriod};
use umbra_math::{Mat4, Vec3};
use umbra_scenery::{
    AabbTree, AabpTree, AxisBox, Csg, Disk, Lambert, LightArea, LightPoint, List, Mirror,
    MotionRotation, OctTree, Qbvh, Sphere, Transformation, Translation,
};

use crate::settings::SceneRoot;

/// A lit floor with a carved sphere, a squashed mirror ball and a box
/// spinning during the shutter. Lit by a disk light overhead and a dim
/// point light.
pub fn demo_objects() -> Result<Vec<SceneObjectRef>> {
    let floor: SceneObjectRef = Arc::new(
        AxisBox::new(Vec3::new(-8.0, -8.0, -1.0), Vec3::new(8.0, 8.0, 0.0))
            .with_shader(Arc::new(Lambert::new(Spectral::splat(0.6)))),
    );

    let red = Arc::new(Lambert::new(Spectral::new(0.7, 0.15, 0.1)));
    let ball: SceneObjectRef =
        Arc::new(Sphere::new(Vec3::new(0.0, 0.0, 1.0), 1.0).with_shader(red.clone()));
    let notch: SceneObjectRef = Arc::new(
        AxisBox::new(Vec3::new(0.0, -1.5, 1.0), Vec3::new(1.5, 0.0, 2.5)).with_shader(red),
    );
    let carved: SceneObjectRef = Arc::new(Csg::difference(ball, notch));

    let chrome: SceneObjectRef = Arc::new(
        Sphere::new(Vec3::ZERO, 1.0).with_shader(Arc::new(Mirror::new(Spectral::splat(0.9)))),
    );
    let placement = Mat4::from_translation(Vec3::new(2.4, 0.8, 0.5))
        * Mat4::from_scale(Vec3::new(0.8, 0.8, 0.5));
    let squashed: SceneObjectRef = Arc::new(Transformation::new(chrome, placement)?);

    let block: SceneObjectRef = Arc::new(
        AxisBox::new(Vec3::new(-0.5, -0.5, 0.0), Vec3::new(0.5, 0.5, 1.0))
            .with_shader(Arc::new(Lambert::new(Spectral::new(0.1, 0.3, 0.7)))),
    );
    let spinning: SceneObjectRef = Arc::new(MotionRotation::new(block, Vec3::Z, 0.0, 0.5)?);
    let spinning: SceneObjectRef = Arc::new(Translation::new(spinning, Vec3::new(-2.4, 0.6, 0.0)));

    // facing down onto the scene
    let lamp: SceneObjectRef = Arc::new(Translation::new(
        Arc::new(Disk::new(Vec3::ZERO, -Vec3::Z, 1.2)),
        Vec3::new(0.0, -1.0, 5.0),
    ));
    let area_light = LightArea::new(lamp, Spectral::splat(8.0))
        .context("Failed to create the area light")?
        .with_single_sided(true)
        .with_emission_samples(2);
    let fill = LightPoint::new(Vec3::new(-4.0, -4.0, 3.0), Spectral::splat(6.0));

    Ok(vec![
        floor,
        carved,
        squashed,
        spinning,
        Arc::new(area_light),
        Arc::new(fill),
    ])
}

/// Put `objects` under the requested root node.
pub fn build_root(kind: SceneRoot, objects: Vec<SceneObjectRef>) -> SceneObjectRef {
    match kind {
        SceneRoot::List => Arc::new(List::from_children(objects)),
        SceneRoot::AabbTree => Arc::new(AabbTree::from_children(objects)),
        SceneRoot::AabpTree => Arc::new(AabpTree::from_children(objects)),
        SceneRoot::Octree => Arc::new(OctTree::from_children(objects)),
        SceneRoot::Qbvh => Arc::new(Qbvh::from_children(objects)),
    }
}

/// A scene ready for rendering: pre-processed root and its lights.
pub struct PreparedScene {
    pub root: SceneObjectRef,
    light_objects: Vec<SceneObjectRef>,
}

impl PreparedScene {
    pub fn new(root: SceneObjectRef, shutter: &TimePeriod) -> Self {
        root.pre_process(shutter);
        let light_objects = collect_lights(&root);
        log::debug!("Scene has {} lights", light_objects.len());
        Self {
            root,
            light_objects,
        }
    }

    pub fn lights(&self) -> Vec<&dyn Light> {
        self.light_objects
            .iter()
            .filter_map(|object| object.as_light())
            .collect()
    }

    pub fn scene(&self) -> &dyn SceneObject {
        self.root.as_ref()
    }
}
