#![deny(unsafe_code)]
//! Shared fixtures for the cross-crate end-to-end and property tests.

use image::{Rgb, RgbImage};
use rwe_capability::{Capabilities, SimulatedCaptioner, SimulatedEmbedder, SimulatedGenerator};
use rwe_engine::{EngineError, ReflectiveEngine};
use rwe_store::RunLayout;
use rwe_types::{EngineConfig, SeedPolicy};
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Small images and a fixed generation seed keep runs fast and repeatable.
pub fn test_config() -> EngineConfig {
    let mut config = EngineConfig::default();
    config.defaults.width = 48;
    config.defaults.height = 32;
    config.defaults.seed = SeedPolicy::Fixed(7);
    config
}

/// Simulated generator with scripted captions and embeddings, each cycling.
pub fn scripted(captions: &[&str], embeddings: Vec<Vec<f32>>) -> Capabilities {
    Capabilities::new(
        Arc::new(SimulatedGenerator::new()),
        Arc::new(SimulatedCaptioner::new().with_script(captions.iter().map(|c| c.to_string()).collect())),
        Arc::new(SimulatedEmbedder::new().with_script(embeddings)),
    )
}

/// `groups` consecutive blocks of `per_group` vectors, each block pointing
/// along its own axis with a small per-item wobble.
pub fn grouped_embeddings(groups: usize, per_group: usize, dim: usize) -> Vec<Vec<f32>> {
    let dim = dim.max(groups + 1);
    (0..groups * per_group)
        .map(|i| {
            let g = i / per_group;
            let mut v = vec![0.0f32; dim];
            v[g] = 1.0;
            v[dim - 1] = 0.02 * (i % per_group) as f32;
            v
        })
        .collect()
}

/// Write a small gradient PNG usable as a genesis reference.
pub fn write_seed_image(dir: &Path) -> Result<PathBuf, image::ImageError> {
    let path = dir.join("genesis_seed.png");
    RgbImage::from_fn(24, 16, |x, y| Rgb([(x * 10) as u8, (y * 12) as u8, 180])).save(&path)?;
    Ok(path)
}

/// Open an engine on `root` with a seeded RNG.
pub fn open_engine(
    config: EngineConfig,
    root: &Path,
    capabilities: Capabilities,
    seed: u64,
) -> Result<ReflectiveEngine, EngineError> {
    Ok(ReflectiveEngine::open(config, RunLayout::new(root), capabilities)?.with_seed(seed))
}
