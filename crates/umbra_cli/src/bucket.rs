//! Image tiles rendered independently, one rayon task each.

use rand::rngs::StdRng;
use rand::SeedableRng;
use umbra_kernel::Spectral;

use crate::render::Frame;

/// Tile of the image, `index` being its place in the render order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Bucket {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
    pub index: usize,
}

impl Bucket {
    pub fn new(x: u32, y: u32, width: u32, height: u32, index: usize) -> Self {
        Self {
            x,
            y,
            width,
            height,
            index,
        }
    }

    pub fn pixel_count(&self) -> u32 {
        self.width * self.height
    }

    /// Squared distance from the bucket centre to `(cx, cy)`.
    fn distance_squared(&self, cx: f32, cy: f32) -> f32 {
        let dx = self.x as f32 + self.width as f32 / 2.0 - cx;
        let dy = self.y as f32 + self.height as f32 / 2.0 - cy;
        dx * dx + dy * dy
    }
}

pub const DEFAULT_BUCKET_SIZE: u32 = 64;

/// Cover a `width` x `height` image with buckets of at most `size` pixels
/// a side, centre buckets first. Edge buckets are clipped to the image.
pub fn generate_buckets(width: u32, height: u32, size: u32) -> Vec<Bucket> {
    let size = size.max(1);
    let mut buckets: Vec<Bucket> = (0..height)
        .step_by(size as usize)
        .flat_map(|y| {
            (0..width).step_by(size as usize).map(move |x| {
                Bucket::new(x, y, size.min(width - x), size.min(height - y), 0)
            })
        })
        .collect();

    let (cx, cy) = (width as f32 / 2.0, height as f32 / 2.0);
    // stable, so equally distant buckets stay in scanline order
    buckets.sort_by(|a, b| a.distance_squared(cx, cy).total_cmp(&b.distance_squared(cx, cy)));
    for (index, bucket) in buckets.iter_mut().enumerate() {
        bucket.index = index;
    }
    buckets
}

/// Render a single bucket, pixels in row-major order.
///
/// The random stream depends only on `seed` and the bucket index, so a
/// frame renders the same whatever thread picks up the bucket.
pub fn render_bucket(bucket: &Bucket, frame: &Frame<'_>, seed: u64) -> BucketResult {
    let mut rng = StdRng::seed_from_u64(seed.wrapping_add(bucket.index as u64));
    let mut pixels = Vec::with_capacity(bucket.pixel_count() as usize);
    for local_y in 0..bucket.height {
        for local_x in 0..bucket.width {
            pixels.push(frame.render_pixel(bucket.x + local_x, bucket.y + local_y, &mut rng));
        }
    }
    log::trace!("Bucket {} done", bucket.index);
    BucketResult::new(*bucket, pixels)
}

#[derive(Debug, Clone)]
pub struct BucketResult {
    pub bucket: Bucket,
    /// Row-major radiance
    pub pixels: Vec<Spectral>,
}

impl BucketResult {
    pub fn new(bucket: Bucket, pixels: Vec<Spectral>) -> Self {
        Self { bucket, pixels }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::camera::Camera;
    use umbra_scenery::List;

    #[test]
    fn test_buckets_cover_the_image_once() {
        for (width, height, size) in [(128, 128, 64), (100, 70, 64), (17, 5, 4)] {
            let buckets = generate_buckets(width, height, size);
            let mut covered = vec![0u8; (width * height) as usize];
            for bucket in &buckets {
                assert!(bucket.width <= size && bucket.height <= size);
                for y in bucket.y..bucket.y + bucket.height {
                    for x in bucket.x..bucket.x + bucket.width {
                        covered[(y * width + x) as usize] += 1;
                    }
                }
            }
            assert!(covered.iter().all(|&n| n == 1), "{width}x{height} by {size}");
        }
        assert_eq!(generate_buckets(100, 70, 64).len(), 4);
    }

    #[test]
    fn test_spiral_order() {
        let buckets = generate_buckets(192, 192, 64);
        assert_eq!(buckets.len(), 9);
        assert_eq!((buckets[0].x, buckets[0].y), (64, 64));
        for (i, bucket) in buckets.iter().enumerate() {
            assert_eq!(bucket.index, i);
        }
    }

    #[test]
    fn test_empty_scene_renders_black() {
        let scene = List::new();
        let mut camera = Camera::new().with_resolution(4, 3);
        camera.initialize();
        let frame = Frame::new(&scene, Vec::new(), camera);
        let result = render_bucket(&Bucket::new(0, 0, 4, 3, 0), &frame, 7);
        assert_eq!(result.pixels.len(), 12);
        assert!(result.pixels.iter().all(|p| *p == Spectral::ZERO));
    }
}
