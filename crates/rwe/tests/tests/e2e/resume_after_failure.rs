//! End-to-end test: a fatal capability failure keeps the last checkpoint,
//! and a restart continues from it.

use rwe_capability::{Capabilities, FailingGenerator, SimulatedCaptioner, SimulatedEmbedder};
use rwe_engine::EngineError;
use rwe_store::{RunLayout, RunLog, WorldStateStore};
use rwe_tests::{open_engine, test_config};
use std::sync::Arc;

fn broken_generator() -> Capabilities {
    Capabilities::new(
        Arc::new(FailingGenerator),
        Arc::new(SimulatedCaptioner::new()),
        Arc::new(SimulatedEmbedder::new()),
    )
}

#[tokio::test]
async fn failure_then_resume() {
    let dir = tempfile::tempdir().unwrap();
    let layout = RunLayout::new(dir.path());

    let mut engine = open_engine(test_config(), dir.path(), Capabilities::simulated(), 5).unwrap();
    engine.run(3).await.unwrap();
    let checkpoint_motifs = engine.world().motif_bank.clone();
    drop(engine);

    let mut broken = open_engine(test_config(), dir.path(), broken_generator(), 5).unwrap();
    let err = broken.run(2).await.unwrap_err();
    assert!(matches!(err, EngineError::Capability(_)));
    assert_eq!(broken.world().iteration, 3);
    assert_eq!(broken.world().motif_bank, checkpoint_motifs);
    assert_eq!(RunLog::new(layout.run_log()).read_all().unwrap().len(), 3);
    assert_eq!(
        &WorldStateStore::new(layout.world_state()).load().unwrap().unwrap(),
        broken.world()
    );
    drop(broken);

    let mut engine = open_engine(test_config(), dir.path(), Capabilities::simulated(), 6).unwrap();
    assert_eq!(engine.world().iteration, 3);
    let more = engine.run(2).await.unwrap();
    assert_eq!(more[0].iteration, 4);
    assert!(more[0].novelty_prev.is_some());
    assert_eq!(more[1].iteration, 5);

    let all = RunLog::new(layout.run_log()).read_all().unwrap();
    let iterations: Vec<u64> = all.iter().map(|r| r.iteration).collect();
    assert_eq!(iterations, vec![1, 2, 3, 4, 5]);
}

#[tokio::test]
async fn torn_log_tail_is_ignored_on_resume() {
    let dir = tempfile::tempdir().unwrap();
    let layout = RunLayout::new(dir.path());
    let mut engine = open_engine(test_config(), dir.path(), Capabilities::simulated(), 2).unwrap();
    engine.run(2).await.unwrap();
    drop(engine);

    // a crash mid-append leaves half a line behind
    let mut text = std::fs::read_to_string(layout.run_log()).unwrap();
    text.push_str("{\"iteration\": 3, \"ts\":");
    std::fs::write(layout.run_log(), text).unwrap();

    let mut engine = open_engine(test_config(), dir.path(), Capabilities::simulated(), 2).unwrap();
    assert_eq!(engine.world().iteration, 2);
    assert_eq!(engine.step().await.unwrap().iteration, 3);
}
