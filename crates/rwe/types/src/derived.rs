use serde::{Deserialize, Serialize};

/// Method tag recorded with every cluster report.
pub const CLUSTER_METHOD: &str = "kmeans_cosine_silhouette";

/// One iteration's cluster assignment, flattened for the report.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ClusterItem {
    pub iteration: u64,
    pub image_path: String,
    pub caption: String,
    pub cluster: usize,
    pub ts: i64,
    pub novelty_prev: Option<f64>,
}

impl ClusterItem {
    /// Novelty with absent values read as zero.
    pub fn novelty_or_zero(&self) -> f64 {
        self.novelty_prev.unwrap_or(0.0)
    }
}

/// Iteration-ordered cluster assignments plus the selected `k`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ClusterReport {
    pub k: usize,
    pub method: String,
    pub items: Vec<ClusterItem>,
}

/// Cluster label and its member count inside an epoch.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClusterCount {
    pub cluster: usize,
    pub count: usize,
}

/// Contiguous, thematically stable run of iterations.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Epoch {
    /// 1-based.
    pub epoch_id: usize,
    pub start_index: usize,
    pub end_index: usize,
    pub iteration_start: u64,
    pub iteration_end: u64,
    pub size: usize,
    pub avg_novelty: f64,
    /// Up to three most frequent clusters, most frequent first.
    pub top_clusters: Vec<ClusterCount>,
    pub items: Vec<ClusterItem>,
}

/// File wrapper for the epoch list.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct EpochReport {
    pub epochs: Vec<Epoch>,
}
