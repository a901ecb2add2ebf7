#![deny(unsafe_code)]
//! # rwe-analysis
//!
//! Offline passes over a completed run:
//!
//! - [`ClusterSelector`]: k-means over L2-normalised embeddings, with `k`
//!   chosen by cosine silhouette, written to `clusters.json`
//! - [`EpochSegmenter`]: boundary detection over the cluster sequence and
//!   novelty spikes, written to `epochs.json`
//!
//! Both stages are deterministic: re-running them on an unchanged run log
//! reproduces the same files.

pub mod epochs;
pub mod error;
pub mod kmeans;
pub mod selector;
pub mod silhouette;

pub use epochs::EpochSegmenter;
pub use error::AnalysisError;
pub use kmeans::{KMeans, KMeansFit, KMEANS_SEED};
pub use selector::ClusterSelector;
pub use silhouette::{cosine_distance, silhouette_cosine};
