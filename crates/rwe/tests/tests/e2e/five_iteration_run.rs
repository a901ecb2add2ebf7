//! End-to-end test: a short run with fixed seed and scripted capabilities.

use rwe_store::{RunLayout, RunLog, WorldStateStore};
use rwe_tests::{grouped_embeddings, open_engine, scripted, test_config};

const CAPTIONS: [&str; 5] = [
    "a lighthouse on a rocky shore",
    "a lighthouse beam over dark water",
    "a glass desert under violet clouds",
    "a cathedral forest with tall pillars",
    "a tidepool full of bright anemones",
];

#[tokio::test]
async fn five_iterations_produce_five_records() {
    let dir = tempfile::tempdir().unwrap();
    let caps = scripted(&CAPTIONS, grouped_embeddings(5, 1, 8));
    let mut engine = open_engine(test_config(), dir.path(), caps, 42).unwrap();
    let records = engine.run(5).await.unwrap();

    assert_eq!(records.len(), 5);
    let iterations: Vec<u64> = records.iter().map(|r| r.iteration).collect();
    assert_eq!(iterations, vec![1, 2, 3, 4, 5]);
    assert!(records[0].novelty_prev.is_none());
    for r in &records[1..] {
        assert!(r.novelty_prev.is_some(), "iteration {}", r.iteration);
    }

    let layout = RunLayout::new(dir.path());
    let logged = RunLog::new(layout.run_log()).read_all().unwrap();
    assert_eq!(logged, records);
    let world = WorldStateStore::new(layout.world_state()).load().unwrap().unwrap();
    assert_eq!(world.iteration, 5);
    assert_eq!(world.iteration, logged[4].iteration);
    assert!(world.within_bounds());
}

#[tokio::test]
async fn orthogonal_embeddings_push_novelty_up_to_coherence() {
    // every consecutive pair is orthogonal: novelty 1.0, far above target
    let dir = tempfile::tempdir().unwrap();
    let caps = scripted(&CAPTIONS, grouped_embeddings(5, 1, 8));
    let mut engine = open_engine(test_config(), dir.path(), caps, 1).unwrap();
    let records = engine.run(5).await.unwrap();
    for r in &records[1..] {
        assert!((r.novelty_prev.unwrap() - 1.0).abs() < 1e-6);
        assert!(r.rule_change.starts_with("increase_coherence"), "{}", r.rule_change);
    }
}

#[tokio::test]
async fn caption_keywords_enter_the_motif_bank() {
    let dir = tempfile::tempdir().unwrap();
    let caps = scripted(&CAPTIONS, grouped_embeddings(5, 1, 8));
    let mut engine = open_engine(test_config(), dir.path(), caps, 3).unwrap();
    let records = engine.run(1).await.unwrap();
    assert!(records[0].motifs_added.iter().any(|m| m == "lighthouse"));
    assert!(engine.world().motif_bank.contains("lighthouse"));
}

#[tokio::test]
async fn same_seed_same_run() {
    let run = |seed: u64| async move {
        let dir = tempfile::tempdir().unwrap();
        let caps = scripted(&CAPTIONS, grouped_embeddings(5, 1, 8));
        let mut engine = open_engine(test_config(), dir.path(), caps, seed).unwrap();
        let records = engine.run(5).await.unwrap();
        records
            .into_iter()
            .map(|r| (r.prompt, r.rule_change, r.motifs_added))
            .collect::<Vec<_>>()
    };
    assert_eq!(run(9).await, run(9).await);
}
