//! Pinhole camera for primary rays.

use rand::Rng;
use umbra_math::{BoundedRay, Vec3};

use crate::settings::CameraSettings;

#[derive(Debug, Clone)]
pub struct Camera {
    pub image_width: u32,
    pub image_height: u32,

    look_from: Vec3,
    look_at: Vec3,
    vup: Vec3,
    /// Vertical field of view in degrees
    vfov: f32,

    // set by initialize()
    pixel00_loc: Vec3,
    pixel_delta_u: Vec3,
    pixel_delta_v: Vec3,
    u: Vec3,
    v: Vec3,
    w: Vec3,
}

impl Camera {
    pub fn new() -> Self {
        Self {
            image_width: 640,
            image_height: 360,
            look_from: Vec3::ZERO,
            look_at: Vec3::new(0.0, 0.0, -1.0),
            vup: Vec3::Y,
            vfov: 90.0,
            pixel00_loc: Vec3::ZERO,
            pixel_delta_u: Vec3::ZERO,
            pixel_delta_v: Vec3::ZERO,
            u: Vec3::X,
            v: Vec3::Y,
            w: Vec3::Z,
        }
    }

    /// Camera placed as described by `settings`.
    pub fn from_settings(width: u32, height: u32, settings: &CameraSettings) -> Self {
        let mut camera = Self::new()
            .with_resolution(width, height)
            .with_position(
                Vec3::from_array(settings.look_from),
                Vec3::from_array(settings.look_at),
                Vec3::from_array(settings.up),
            )
            .with_vfov(settings.vfov);
        camera.initialize();
        camera
    }

    pub fn with_resolution(mut self, width: u32, height: u32) -> Self {
        self.image_width = width;
        self.image_height = height;
        self
    }

    pub fn with_position(mut self, look_from: Vec3, look_at: Vec3, vup: Vec3) -> Self {
        self.look_from = look_from;
        self.look_at = look_at;
        self.vup = vup;
        self
    }

    pub fn with_vfov(mut self, vfov: f32) -> Self {
        self.vfov = vfov;
        self
    }

    /// Must be called before generating rays.
    pub fn initialize(&mut self) {
        let h = (self.vfov.to_radians() / 2.0).tan();
        let viewport_height = 2.0 * h;
        let viewport_width = viewport_height * (self.image_width as f32 / self.image_height as f32);

        self.w = (self.look_from - self.look_at).normalize();
        self.u = self.vup.cross(self.w).normalize();
        self.v = self.w.cross(self.u);

        let viewport_u = viewport_width * self.u;
        let viewport_v = -viewport_height * self.v;
        self.pixel_delta_u = viewport_u / self.image_width as f32;
        self.pixel_delta_v = viewport_v / self.image_height as f32;

        let viewport_upper_left = self.look_from - self.w - viewport_u / 2.0 - viewport_v / 2.0;
        self.pixel00_loc = viewport_upper_left + 0.5 * (self.pixel_delta_u + self.pixel_delta_v);
    }

    /// Ray through a jittered point of pixel (i, j).
    pub fn get_ray<R: Rng + ?Sized>(&self, i: u32, j: u32, rng: &mut R) -> BoundedRay {
        let offset_x = rng.gen::<f32>() - 0.5;
        let offset_y = rng.gen::<f32>() - 0.5;
        let pixel_sample = self.pixel00_loc
            + (i as f32 + offset_x) * self.pixel_delta_u
            + (j as f32 + offset_y) * self.pixel_delta_v;
        BoundedRay::new(self.look_from, pixel_sample - self.look_from)
    }
}

impl Default for Camera {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn test_camera_initialize() {
        let mut camera = Camera::new()
            .with_resolution(800, 600)
            .with_position(Vec3::ZERO, Vec3::new(0.0, 0.0, -1.0), Vec3::Y)
            .with_vfov(90.0);
        camera.initialize();
        assert!((camera.w - Vec3::Z).length() < 0.001);
        assert!((camera.u - Vec3::X).length() < 0.001);
        assert!((camera.v - Vec3::Y).length() < 0.001);
    }

    #[test]
    fn test_center_ray_points_at_target() {
        let settings = CameraSettings {
            look_from: [0.0, -5.0, 0.0],
            look_at: [0.0, 0.0, 0.0],
            up: [0.0, 0.0, 1.0],
            vfov: 60.0,
        };
        let camera = Camera::from_settings(101, 101, &settings);
        let mut rng = StdRng::seed_from_u64(42);

        let ray = camera.get_ray(50, 50, &mut rng);
        assert_eq!(ray.support(), Vec3::new(0.0, -5.0, 0.0));
        assert!(ray.direction().y > 0.99);

        // top-left pixel looks up and to the left
        let corner = camera.get_ray(0, 0, &mut rng);
        assert!(corner.direction().x < 0.0);
        assert!(corner.direction().z > 0.0);
    }
}
