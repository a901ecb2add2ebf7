//! End-to-end test: a local genesis reference seeds the run and steers the
//! first iterations through image-to-image, falling back when it fails.

use rwe_capability::{Capabilities, SimulatedCaptioner, SimulatedEmbedder, SimulatedGenerator};
use rwe_store::{RunLayout, RunLog};
use rwe_tests::{open_engine, test_config, write_seed_image};
use rwe_types::EngineConfig;
use std::path::Path;
use std::sync::Arc;

fn genesis_config(reference: &Path) -> EngineConfig {
    let mut config = test_config();
    config.genesis.enabled = true;
    config.genesis.reference = reference.to_string_lossy().into_owned();
    config.genesis.use_style = true;
    config.genesis.style_strength = 0.4;
    config.genesis.style_iterations = 2;
    config
}

fn with_generator(generator: SimulatedGenerator) -> Capabilities {
    Capabilities::new(
        Arc::new(generator),
        Arc::new(SimulatedCaptioner::new()),
        Arc::new(SimulatedEmbedder::new()),
    )
}

#[tokio::test]
async fn style_applies_for_the_configured_iterations() {
    let src = tempfile::tempdir().unwrap();
    let out = tempfile::tempdir().unwrap();
    let seed = write_seed_image(src.path()).unwrap();
    let caps = with_generator(SimulatedGenerator::new().with_image_to_image(true));
    let mut engine = open_engine(genesis_config(&seed), out.path(), caps, 4).unwrap();
    engine.run(4).await.unwrap();

    let all = RunLog::new(RunLayout::new(out.path()).run_log()).read_all().unwrap();
    assert_eq!(all.len(), 5);
    assert!(all[0].is_genesis());
    assert_eq!(all[0].iteration, 0);
    assert!(all[0].prompt.starts_with("GENESIS: "));

    let styled: Vec<bool> = all[1..].iter().map(|r| r.used_img2img).collect();
    assert_eq!(styled, vec![true, true, false, false]);
    assert!((all[1].img2img_strength - 0.4).abs() < 1e-9);
    assert_eq!(all[3].img2img_strength, 0.0);
    // genesis embedding is the comparison point for the first real step
    assert!(all[1].novelty_prev.is_some());
}

#[tokio::test]
async fn failing_img2img_falls_back_to_text_to_image() {
    let src = tempfile::tempdir().unwrap();
    let out = tempfile::tempdir().unwrap();
    let seed = write_seed_image(src.path()).unwrap();
    let caps = with_generator(SimulatedGenerator::new().with_failing_image_to_image());
    let mut engine = open_engine(genesis_config(&seed), out.path(), caps, 4).unwrap();
    let records = engine.run(2).await.unwrap();
    assert_eq!(records.len(), 2);
    for r in &records {
        assert!(!r.used_img2img);
        assert_eq!(r.img2img_strength, 0.0);
    }
}

#[tokio::test]
async fn unsupported_img2img_never_tries_style() {
    let src = tempfile::tempdir().unwrap();
    let out = tempfile::tempdir().unwrap();
    let seed = write_seed_image(src.path()).unwrap();
    let caps = with_generator(SimulatedGenerator::new().with_image_to_image(false));
    let mut engine = open_engine(genesis_config(&seed), out.path(), caps, 4).unwrap();
    let records = engine.run(2).await.unwrap();
    assert!(records.iter().all(|r| !r.used_img2img));
    // genesis still happened
    assert!(RunLayout::new(out.path()).genesis_analysis().is_file());
}
