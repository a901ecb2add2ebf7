use crate::error::AnalysisError;
use rwe_store::{read_json, write_json, RunLayout};
use rwe_types::{ClusterCount, ClusterItem, ClusterReport, Epoch, EpochReport};
use tracing::info;

/// Splits an iteration-ordered cluster sequence into contiguous epochs.
///
/// A boundary opens before index `i+1` when the cluster switches and the new
/// cluster holds for the next `sustain` items (or until the end), or when the
/// novelty at `i+1` reaches the spike threshold.
#[derive(Clone, Debug)]
pub struct EpochSegmenter {
    sustain: usize,
    novelty_spike: f64,
}

impl EpochSegmenter {
    pub fn new() -> Self {
        Self {
            sustain: 3,
            novelty_spike: 0.40,
        }
    }

    pub fn with_sustain(mut self, sustain: usize) -> Self {
        self.sustain = sustain.max(1);
        self
    }

    pub fn with_novelty_spike(mut self, spike: f64) -> Self {
        self.novelty_spike = spike;
        self
    }

    /// Start indices of every epoch; always begins with 0 for non-empty input.
    pub fn boundaries(&self, clusters: &[usize], novelty: &[f64]) -> Vec<usize> {
        let n = clusters.len();
        if n == 0 {
            return Vec::new();
        }
        let mut bounds = vec![0];
        for i in 0..n - 1 {
            let stable_switch = clusters[i] != clusters[i + 1] && {
                let end = n.min(i + 1 + self.sustain);
                clusters[i + 1..end].iter().all(|c| *c == clusters[i + 1])
            };
            let spike = novelty.get(i + 1).is_some_and(|v| *v >= self.novelty_spike);
            if stable_switch || spike {
                bounds.push(i + 1);
            }
        }
        bounds
    }

    pub fn segment(&self, items: &[ClusterItem]) -> Vec<Epoch> {
        let mut items = items.to_vec();
        items.sort_by_key(|x| x.iteration);
        let clusters: Vec<usize> = items.iter().map(|x| x.cluster).collect();
        let novelty: Vec<f64> = items.iter().map(ClusterItem::novelty_or_zero).collect();
        let bounds = self.boundaries(&clusters, &novelty);

        bounds
            .iter()
            .enumerate()
            .map(|(ei, start)| {
                let end = bounds.get(ei + 1).map_or(items.len() - 1, |next| next - 1);
                let seg = items[*start..=end].to_vec();
                let avg_novelty =
                    seg.iter().map(ClusterItem::novelty_or_zero).sum::<f64>() / seg.len().max(1) as f64;
                Epoch {
                    epoch_id: ei + 1,
                    start_index: *start,
                    end_index: end,
                    iteration_start: seg[0].iteration,
                    iteration_end: seg[seg.len() - 1].iteration,
                    size: seg.len(),
                    avg_novelty,
                    top_clusters: top_clusters(&seg, 3),
                    items: seg,
                }
            })
            .collect()
    }

    /// Read `clusters.json` under `layout`, segment, and write `epochs.json`.
    pub fn segment_run(&self, layout: &RunLayout) -> Result<Vec<Epoch>, AnalysisError> {
        let report: ClusterReport = read_json(&layout.clusters())?;
        if report.items.is_empty() {
            return Err(AnalysisError::InsufficientData { needed: 1, found: 0 });
        }
        let epochs = self.segment(&report.items);
        write_json(
            &layout.epochs(),
            &EpochReport {
                epochs: epochs.clone(),
            },
        )?;
        info!(epochs = epochs.len(), path = %layout.epochs().display(), "epochs written");
        Ok(epochs)
    }
}

impl Default for EpochSegmenter {
    fn default() -> Self {
        Self::new()
    }
}

/// Most frequent clusters first; ties keep first-appearance order.
fn top_clusters(seg: &[ClusterItem], limit: usize) -> Vec<ClusterCount> {
    let mut counts: Vec<ClusterCount> = Vec::new();
    for item in seg {
        match counts.iter_mut().find(|c| c.cluster == item.cluster) {
            Some(c) => c.count += 1,
            None => counts.push(ClusterCount {
                cluster: item.cluster,
                count: 1,
            }),
        }
    }
    counts.sort_by(|a, b| b.count.cmp(&a.count));
    counts.truncate(limit);
    counts
}

#[cfg(test)]
mod tests {
    use super::*;

    fn items(clusters: &[usize], novelty: &[Option<f64>]) -> Vec<ClusterItem> {
        clusters
            .iter()
            .zip(novelty)
            .enumerate()
            .map(|(i, (c, n))| ClusterItem {
                iteration: i as u64 + 1,
                image_path: format!("{}.png", i + 1),
                caption: String::new(),
                cluster: *c,
                ts: i as i64,
                novelty_prev: *n,
            })
            .collect()
    }

    #[test]
    fn sustained_switch_opens_epoch() {
        let clusters = [0, 0, 0, 1, 1, 1, 1];
        let seg = EpochSegmenter::new();
        assert_eq!(seg.boundaries(&clusters, &[0.1; 7]), vec![0, 3]);
        let epochs = seg.segment(&items(&clusters, &[Some(0.1); 7]));
        assert_eq!(epochs.len(), 2);
        assert_eq!((epochs[0].start_index, epochs[0].end_index), (0, 2));
        assert_eq!((epochs[1].start_index, epochs[1].end_index), (3, 6));
        assert_eq!(epochs[1].iteration_start, 4);
        assert_eq!(epochs[1].top_clusters, vec![ClusterCount { cluster: 1, count: 4 }]);
    }

    #[test]
    fn short_excursion_stays_in_current_epoch() {
        // the switch into cluster 1 is not sustained; the return to 0 is
        let clusters = [0, 0, 0, 1, 0, 0, 0];
        let seg = EpochSegmenter::new();
        assert_eq!(seg.boundaries(&clusters, &[0.1; 7]), vec![0, 4]);
        let epochs = seg.segment(&items(&clusters, &[Some(0.1); 7]));
        assert_eq!(epochs[0].size, 4);
        assert_eq!(
            epochs[0].top_clusters,
            vec![ClusterCount { cluster: 0, count: 3 }, ClusterCount { cluster: 1, count: 1 }]
        );
    }

    #[test]
    fn three_epochs_from_two_sustained_switches() {
        let clusters = [0, 0, 0, 1, 1, 1, 1, 2, 2];
        let epochs = EpochSegmenter::new().segment(&items(&clusters, &[Some(0.0); 9]));
        let sizes: Vec<usize> = epochs.iter().map(|e| e.size).collect();
        assert_eq!(sizes, vec![3, 4, 2]);
        assert_eq!(epochs[1].end_index, 6);
    }

    #[test]
    fn spike_splits_constant_clusters() {
        let novelty = [Some(0.0), Some(0.0), Some(0.5), Some(0.0)];
        let epochs = EpochSegmenter::new().segment(&items(&[0, 0, 0, 0], &novelty));
        let sizes: Vec<usize> = epochs.iter().map(|e| e.size).collect();
        assert_eq!(sizes, vec![2, 2]);
    }

    #[test]
    fn novelty_spike_opens_epoch() {
        let clusters = [0, 0, 0, 0];
        let novelty = [None, Some(0.1), Some(0.45), Some(0.1)];
        let epochs = EpochSegmenter::new().segment(&items(&clusters, &novelty));
        assert_eq!(epochs.len(), 2);
        assert_eq!(epochs[1].start_index, 2);
        assert!((epochs[0].avg_novelty - 0.05).abs() < 1e-12);
    }

    #[test]
    fn switch_near_end_holds_to_the_end() {
        let clusters = [0, 0, 0, 0, 2, 2];
        assert_eq!(EpochSegmenter::new().boundaries(&clusters, &[0.0; 6]), vec![0, 4]);
    }

    #[test]
    fn empty_input_has_no_epochs() {
        assert!(EpochSegmenter::new().segment(&[]).is_empty());
    }

    #[test]
    fn unsorted_items_are_ordered_by_iteration() {
        let mut it = items(&[0, 0, 0, 1, 1, 1], &[None; 6]);
        it.reverse();
        let epochs = EpochSegmenter::new().segment(&it);
        assert_eq!(epochs[0].iteration_start, 1);
        assert_eq!(epochs.len(), 2);
    }

    #[test]
    fn epochs_partition_the_items() {
        let clusters = [0, 1, 1, 1, 2, 2, 0, 0, 0, 0, 3];
        let novelty: Vec<Option<f64>> = (0..11).map(|i| Some((i % 5) as f64 * 0.11)).collect();
        let epochs = EpochSegmenter::new().segment(&items(&clusters, &novelty));
        let mut expected_start = 0;
        for (i, e) in epochs.iter().enumerate() {
            assert_eq!(e.epoch_id, i + 1);
            assert_eq!(e.start_index, expected_start);
            assert_eq!(e.size, e.end_index - e.start_index + 1);
            expected_start = e.end_index + 1;
        }
        assert_eq!(expected_start, 11);
    }

    #[test]
    fn segment_run_round_trips_through_files() {
        let dir = tempfile::tempdir().unwrap();
        let layout = RunLayout::create(dir.path()).unwrap();
        let report = ClusterReport {
            k: 2,
            method: rwe_types::CLUSTER_METHOD.into(),
            items: items(&[0, 0, 0, 1, 1, 1, 1], &[Some(0.1); 7]),
        };
        write_json(&layout.clusters(), &report).unwrap();
        let epochs = EpochSegmenter::new().segment_run(&layout).unwrap();
        let on_disk: EpochReport = read_json(&layout.epochs()).unwrap();
        assert_eq!(on_disk.epochs, epochs);
        assert_eq!(epochs.len(), 2);
    }

    #[test]
    fn missing_clusters_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let layout = RunLayout::create(dir.path()).unwrap();
        assert!(matches!(
            EpochSegmenter::new().segment_run(&layout),
            Err(AnalysisError::Store(_))
        ));
    }
}
