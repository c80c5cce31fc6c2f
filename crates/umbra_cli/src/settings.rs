//! Render settings, read from an optional JSON file.

use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};
use umbra_kernel::{DirectLightingSettings, TimePeriod};

use crate::bucket::DEFAULT_BUCKET_SIZE;

/// Which node holds the top level of the scene.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SceneRoot {
    /// Plain list, every child tested for every ray.
    List,
    AabbTree,
    AabpTree,
    Octree,
    #[default]
    Qbvh,
}

impl fmt::Display for SceneRoot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            SceneRoot::List => "list",
            SceneRoot::AabbTree => "aabb_tree",
            SceneRoot::AabpTree => "aabp_tree",
            SceneRoot::Octree => "octree",
            SceneRoot::Qbvh => "qbvh",
        };
        f.write_str(name)
    }
}

/// Pinhole camera placement.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CameraSettings {
    pub look_from: [f32; 3],
    pub look_at: [f32; 3],
    pub up: [f32; 3],
    /// Vertical field of view in degrees
    pub vfov: f32,
}

impl Default for CameraSettings {
    fn default() -> Self {
        Self {
            look_from: [0.0, -6.0, 2.5],
            look_at: [0.0, 0.0, 0.5],
            up: [0.0, 0.0, 1.0],
            vfov: 40.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RenderSettings {
    pub width: u32,
    pub height: u32,
    pub samples_per_pixel: u32,
    pub bucket_size: u32,
    /// Base seed; each bucket derives its own stream from it.
    pub seed: u64,
    pub output: PathBuf,
    pub scene_root: SceneRoot,
    pub shutter: TimePeriod,
    pub camera: CameraSettings,
    pub direct_lighting: DirectLightingSettings,
}

impl Default for RenderSettings {
    fn default() -> Self {
        Self {
            width: 640,
            height: 360,
            samples_per_pixel: 16,
            bucket_size: DEFAULT_BUCKET_SIZE,
            seed: 0,
            output: PathBuf::from("umbra.png"),
            scene_root: SceneRoot::default(),
            shutter: TimePeriod::new(0.0, 1.0),
            camera: CameraSettings::default(),
            direct_lighting: DirectLightingSettings::default(),
        }
    }
}

impl RenderSettings {
    /// Read settings from a JSON file. Missing fields keep their defaults.
    pub fn load(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read settings from {}", path.display()))?;
        Self::from_json(&text).with_context(|| format!("Invalid settings in {}", path.display()))
    }

    pub fn from_json(text: &str) -> Result<Self> {
        let settings: Self = serde_json::from_str(text).context("Failed to parse settings")?;
        settings.validate()?;
        Ok(settings)
    }

    fn validate(&self) -> Result<()> {
        if self.width == 0 || self.height == 0 {
            bail!("Image size {}x{} is empty", self.width, self.height);
        }
        if self.samples_per_pixel == 0 {
            bail!("samples_per_pixel must be at least 1");
        }
        if self.bucket_size == 0 {
            bail!("bucket_size must be at least 1");
        }
        if !(self.camera.vfov > 0.0 && self.camera.vfov < 180.0) {
            bail!("Field of view {} is outside (0, 180)", self.camera.vfov);
        }
        if self.shutter.end < self.shutter.begin {
            bail!(
                "Shutter closes at {} before it opens at {}",
                self.shutter.end,
                self.shutter.begin
            );
        }
        Ok(())
    }
}
