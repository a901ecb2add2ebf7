//! Property tests: epoch segmentation always partitions the run.
//!
//! Whatever the cluster labels and novelty values, epochs are contiguous,
//! non-overlapping, cover every item exactly once and are numbered from 1.

use proptest::prelude::*;
use rwe_analysis::EpochSegmenter;
use rwe_types::ClusterItem;

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn arb_items() -> impl Strategy<Value = Vec<ClusterItem>> {
    prop::collection::vec((0usize..4, prop::option::of(0.0f64..1.0)), 1..80).prop_map(|raw| {
        raw.into_iter()
            .enumerate()
            .map(|(i, (cluster, novelty_prev))| ClusterItem {
                iteration: i as u64 + 1,
                image_path: format!("outputs/{:04}.png", i + 1),
                caption: String::new(),
                cluster,
                ts: 1_700_000_000 + i as i64,
                novelty_prev,
            })
            .collect()
    })
}

fn arb_segmenter() -> impl Strategy<Value = EpochSegmenter> {
    (1usize..6, 0.1f64..1.0)
        .prop_map(|(sustain, spike)| EpochSegmenter::new().with_sustain(sustain).with_novelty_spike(spike))
}

// ---------------------------------------------------------------------------
// Property Tests
// ---------------------------------------------------------------------------

proptest! {
    #[test]
    fn epochs_partition_items(items in arb_items(), segmenter in arb_segmenter()) {
        let epochs = segmenter.segment(&items);
        prop_assert!(!epochs.is_empty());
        prop_assert_eq!(epochs[0].start_index, 0);
        prop_assert_eq!(epochs[epochs.len() - 1].end_index, items.len() - 1);

        let mut next = 0;
        for (i, e) in epochs.iter().enumerate() {
            prop_assert_eq!(e.epoch_id, i + 1);
            prop_assert_eq!(e.start_index, next);
            prop_assert!(e.end_index >= e.start_index);
            prop_assert_eq!(e.size, e.end_index - e.start_index + 1);
            prop_assert_eq!(e.items.len(), e.size);
            prop_assert_eq!(e.iteration_start, e.items[0].iteration);
            prop_assert!(e.top_clusters.len() <= 3);
            next = e.end_index + 1;
        }
        prop_assert_eq!(next, items.len());
    }

    #[test]
    fn constant_cluster_without_spikes_is_one_epoch(n in 1usize..60, cluster in 0usize..4) {
        let items: Vec<ClusterItem> = (0..n)
            .map(|i| ClusterItem {
                iteration: i as u64 + 1,
                image_path: String::new(),
                caption: String::new(),
                cluster,
                ts: i as i64,
                novelty_prev: Some(0.05),
            })
            .collect();
        let epochs = EpochSegmenter::new().segment(&items);
        prop_assert_eq!(epochs.len(), 1);
        prop_assert_eq!(epochs[0].size, n);
    }
}
