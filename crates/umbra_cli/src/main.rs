//! umbra - render the demo scene with direct lighting
//!
//! Usage: `umbra [settings.json]`. Without a settings file the defaults
//! are used. Set `RUST_LOG` for more or less output.

mod bucket;
mod camera;
mod render;
mod scene;
mod settings;

use anyhow::{Context, Result};
use std::path::Path;

use camera::Camera;
use render::Frame;
use scene::PreparedScene;
use settings::RenderSettings;

fn main() -> Result<()> {
    env_logger::Builder::from_default_env()
        .filter_level(log::LevelFilter::Info)
        .parse_default_env()
        .init();

    let settings = match std::env::args().nth(1) {
        Some(path) => RenderSettings::load(Path::new(&path))?,
        None => RenderSettings::default(),
    };
    log::info!("Starting umbra, scene root: {}", settings.scene_root);

    let objects = scene::demo_objects()?;
    let root = scene::build_root(settings.scene_root, objects);
    let prepared = PreparedScene::new(root, &settings.shutter);

    let camera = Camera::from_settings(settings.width, settings.height, &settings.camera);
    let mut frame = Frame::new(prepared.scene(), prepared.lights(), camera);
    frame.shutter = settings.shutter;
    frame.samples_per_pixel = settings.samples_per_pixel;
    frame.settings = settings.direct_lighting;

    let image = frame.render(settings.bucket_size, settings.seed);
    image
        .save(&settings.output)
        .with_context(|| format!("Failed to write {}", settings.output.display()))?;
    log::info!("Saved {}", settings.output.display());

    Ok(())
}
