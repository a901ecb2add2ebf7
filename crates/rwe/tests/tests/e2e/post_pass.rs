//! End-to-end test: a run whose embeddings fall into three clear groups is
//! clustered, segmented and rendered into an atlas.

use rwe_engine::PostPass;
use rwe_store::RunLayout;
use rwe_tests::{grouped_embeddings, open_engine, scripted, test_config};

const CAPTIONS: [&str; 3] = [
    "a harbor of paper boats at dawn",
    "a harbor crowded with lanterns",
    "a harbor under falling snow",
];

#[tokio::test]
async fn grouped_run_yields_three_epochs_and_an_atlas() {
    let dir = tempfile::tempdir().unwrap();
    let caps = scripted(&CAPTIONS, grouped_embeddings(3, 4, 8));
    let mut engine = open_engine(test_config(), dir.path(), caps, 21).unwrap();
    engine.run(12).await.unwrap();

    let layout = RunLayout::new(dir.path());
    let report = PostPass::new(layout.clone()).run().unwrap();

    assert_eq!(report.clusters.items.len(), 12);
    assert_eq!(report.clusters.k, 3);
    let labels: Vec<usize> = report.clusters.items.iter().map(|i| i.cluster).collect();
    assert_eq!(labels, vec![0, 0, 0, 0, 1, 1, 1, 1, 2, 2, 2, 2]);

    let sizes: Vec<usize> = report.epochs.iter().map(|e| e.size).collect();
    assert_eq!(sizes, vec![4, 4, 4]);
    assert_eq!(report.epochs[0].iteration_start, 1);
    assert_eq!(report.epochs[2].iteration_end, 12);

    assert!(layout.clusters().is_file());
    assert!(layout.epochs().is_file());
    assert!(layout.sheets_dir().join("timeline.png").is_file());
    assert!(layout.atlas_pdf().is_file());
    assert_eq!(report.atlas.pdf, layout.atlas_pdf());
    let bytes = std::fs::read(layout.atlas_pdf()).unwrap();
    assert!(bytes.starts_with(b"%PDF"));
}
