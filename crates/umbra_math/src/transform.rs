// Transform utilities for Mat4
//
// glam::Mat4 already provides transform_point3(), transform_vector3() and inverse().

use crate::Aabb;
use glam::{Mat4, Vec3};

/// Extension trait for Mat4 to provide additional transform utilities
pub trait Mat4Ext {
    /// Bounding box of the eight transformed corners.
    fn transform_aabb(&self, aabb: &Aabb) -> Aabb;

    /// Inverse transpose, the matrix that carries normals.
    fn normal_matrix(&self) -> Mat4;

    /// Transform a normal and renormalize it.
    fn transform_normal(&self, normal: Vec3) -> Vec3;

    /// True if the matrix has a usable inverse.
    fn is_invertible(&self) -> bool;
}

impl Mat4Ext for Mat4 {
    fn transform_aabb(&self, aabb: &Aabb) -> Aabb {
        if aabb.is_empty() {
            return Aabb::EMPTY;
        }
        Aabb::from_iter_points(
            aabb.corners()
                .into_iter()
                .map(|corner| self.transform_point3(corner)),
        )
    }

    fn normal_matrix(&self) -> Mat4 {
        self.inverse().transpose()
    }

    fn transform_normal(&self, normal: Vec3) -> Vec3 {
        self.normal_matrix()
            .transform_vector3(normal)
            .normalize_or_zero()
    }

    fn is_invertible(&self) -> bool {
        let det = self.determinant();
        det.is_finite() && det.abs() > f32::EPSILON
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f32::consts::FRAC_PI_2;

    #[test]
    fn test_transform_aabb_translation() {
        let mat = Mat4::from_translation(Vec3::new(5.0, 5.0, 5.0));
        let aabb = Aabb::new(Vec3::ZERO, Vec3::ONE);
        let transformed = mat.transform_aabb(&aabb);

        assert!((transformed.min - Vec3::splat(5.0)).length() < 1e-5);
        assert!((transformed.max - Vec3::splat(6.0)).length() < 1e-5);
    }

    #[test]
    fn test_transform_aabb_rotation_grows_box() {
        let mat = Mat4::from_rotation_z(FRAC_PI_2 * 0.5);
        let aabb = Aabb::new(Vec3::splat(-1.0), Vec3::splat(1.0));
        let transformed = mat.transform_aabb(&aabb);

        let half_diagonal = 2.0_f32.sqrt();
        assert!((transformed.max.x - half_diagonal).abs() < 1e-5);
        assert!((transformed.max.z - 1.0).abs() < 1e-5);
    }

    #[test]
    fn test_transform_aabb_keeps_empty() {
        let mat = Mat4::from_scale(Vec3::splat(3.0));
        assert!(mat.transform_aabb(&Aabb::EMPTY).is_empty());
    }

    #[test]
    fn test_normal_under_nonuniform_scale() {
        // A plane tilted at 45 degrees, stretched along x.
        let mat = Mat4::from_scale(Vec3::new(2.0, 1.0, 1.0));
        let normal = Vec3::new(1.0, 1.0, 0.0).normalize();
        let tangent = Vec3::new(1.0, -1.0, 0.0);

        let world_tangent = mat.transform_vector3(tangent);
        let world_normal = mat.transform_normal(normal);
        assert!(world_tangent.dot(world_normal).abs() < 1e-5);
        assert!((world_normal.length() - 1.0).abs() < 1e-5);
    }

    #[test]
    fn test_is_invertible() {
        assert!(Mat4::from_rotation_y(0.7).is_invertible());
        assert!(!Mat4::from_scale(Vec3::new(1.0, 0.0, 1.0)).is_invertible());
    }
}
