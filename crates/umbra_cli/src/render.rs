//! Bucketed direct-lighting render of a whole frame.

use image::{Rgba, RgbaImage};
use rand::Rng;
use rayon::prelude::*;
use std::time::Instant;
use umbra_kernel::{
    DirectLighting, DirectLightingSettings, Light, Sample, SceneObject, Spectral, TimePeriod,
};

use crate::bucket::{generate_buckets, render_bucket, BucketResult};
use crate::camera::Camera;

/// Everything a worker needs to shade pixels.
pub struct Frame<'s> {
    pub camera: Camera,
    pub direct: DirectLighting<'s>,
    pub lights: Vec<&'s dyn Light>,
    pub shutter: TimePeriod,
    pub samples_per_pixel: u32,
    pub settings: DirectLightingSettings,
}

impl<'s> Frame<'s> {
    pub fn new(scene: &'s dyn SceneObject, lights: Vec<&'s dyn Light>, camera: Camera) -> Self {
        Self {
            camera,
            direct: DirectLighting::new(scene),
            lights,
            shutter: TimePeriod::instant(0.0),
            samples_per_pixel: 1,
            settings: DirectLightingSettings::default(),
        }
    }

    /// Average of `samples_per_pixel` estimates at jittered positions and
    /// shutter times.
    pub fn render_pixel<R: Rng + ?Sized>(&self, i: u32, j: u32, rng: &mut R) -> Spectral {
        let mut sum = Spectral::ZERO;
        for _ in 0..self.samples_per_pixel {
            let sample = Sample::at_time(self.shutter.interpolate(rng.gen()));
            let ray = self.camera.get_ray(i, j, rng);
            let radiance = self
                .direct
                .cast_ray(&sample, &ray, &self.lights, &self.settings, rng);
            if radiance.is_finite() {
                sum += radiance;
            }
        }
        sum / self.samples_per_pixel as f32
    }

    /// Render every bucket in parallel and assemble the image.
    pub fn render(&self, bucket_size: u32, seed: u64) -> RgbaImage {
        let width = self.camera.image_width;
        let height = self.camera.image_height;
        let buckets = generate_buckets(width, height, bucket_size);
        log::info!(
            "Rendering {}x{} in {} buckets, {} spp, {} lights",
            width,
            height,
            buckets.len(),
            self.samples_per_pixel,
            self.lights.len()
        );

        let start = Instant::now();
        let results: Vec<BucketResult> = buckets
            .par_iter()
            .map(|bucket| render_bucket(bucket, self, seed))
            .collect();

        let mut image = RgbaImage::new(width, height);
        for result in &results {
            let bucket = &result.bucket;
            for (n, color) in result.pixels.iter().enumerate() {
                let x = bucket.x + n as u32 % bucket.width;
                let y = bucket.y + n as u32 / bucket.width;
                image.put_pixel(x, y, Rgba(color_to_rgba(*color)));
            }
        }
        log::info!("Render finished in {:.2?}", start.elapsed());
        image
    }
}

/// Apply gamma correction (gamma = 2.0).
#[inline]
pub fn linear_to_gamma(linear: f32) -> f32 {
    if linear > 0.0 {
        linear.sqrt()
    } else {
        0.0
    }
}

/// Convert linear radiance to 8-bit RGBA.
pub fn color_to_rgba(color: Spectral) -> [u8; 4] {
    let channel = |c: f32| (linear_to_gamma(c).clamp(0.0, 1.0) * 255.0).round() as u8;
    [channel(color.x), channel(color.y), channel(color.z), 255]
}
