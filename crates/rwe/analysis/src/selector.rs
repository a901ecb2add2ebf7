use crate::error::AnalysisError;
use crate::kmeans::KMeans;
use crate::silhouette::silhouette_cosine;
use rwe_store::{read_embedding, write_json, RunLayout, RunLog};
use rwe_types::{ClusterItem, ClusterReport, IterationRecord, CLUSTER_METHOD};
use tracing::{debug, info, warn};

/// Picks `k` by cosine silhouette over a range, then labels every iteration.
#[derive(Clone, Debug)]
pub struct ClusterSelector {
    kmin: usize,
    kmax: usize,
    n_init: usize,
    seed: u64,
}

impl ClusterSelector {
    pub fn new() -> Self {
        Self {
            kmin: 3,
            kmax: 10,
            n_init: 10,
            seed: crate::kmeans::KMEANS_SEED,
        }
    }

    pub fn with_range(mut self, kmin: usize, kmax: usize) -> Self {
        self.kmin = kmin.max(2);
        self.kmax = kmax.max(self.kmin);
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    fn kmeans(&self, k: usize) -> KMeans {
        KMeans::new(k).with_n_init(self.n_init).with_seed(self.seed)
    }

    /// Best `k` in `[kmin, min(kmax, n-1)]` by silhouette; small inputs get a
    /// fixed fallback instead of a search.
    pub fn choose_k(&self, data: &[Vec<f64>]) -> usize {
        let n = data.len();
        if n < self.kmin + 2 {
            return if n >= 2 { self.kmin.min(n).max(2) } else { 1 };
        }
        let mut best_k = self.kmin;
        let mut best_s = -1.0;
        let upper = self.kmax.min(n - 1);
        for k in self.kmin..=upper {
            let Ok(fit) = self.kmeans(k).fit(data) else {
                continue;
            };
            if fit.distinct_labels() < 2 {
                continue;
            }
            let Some(s) = silhouette_cosine(data, &fit.labels) else {
                continue;
            };
            debug!(k, silhouette = s, "silhouette candidate");
            if s > best_s {
                best_s = s;
                best_k = k;
            }
        }
        best_k
    }

    /// Cluster the given records; `embeddings` runs parallel to `records`,
    /// with `None` for artifacts whose embedding is unavailable.
    pub fn cluster(
        &self,
        records: &[IterationRecord],
        embeddings: &[Option<Vec<f32>>],
    ) -> Result<ClusterReport, AnalysisError> {
        if records.is_empty() {
            return Err(AnalysisError::EmptyRunLog);
        }
        let data = matrix(records, embeddings)?;
        if data.len() < 2 {
            return Err(AnalysisError::InsufficientData {
                needed: 2,
                found: data.len(),
            });
        }
        let k = self.choose_k(&data).max(2);
        let fit = self.kmeans(k).fit(&data)?;
        let items = records
            .iter()
            .zip(&fit.labels)
            .map(|(r, l)| ClusterItem {
                iteration: r.iteration,
                image_path: r.image_path.clone(),
                caption: r.caption.clone(),
                cluster: *l,
                ts: r.ts,
                novelty_prev: r.novelty_prev,
            })
            .collect();
        Ok(ClusterReport {
            k,
            method: CLUSTER_METHOD.to_string(),
            items,
        })
    }

    /// Read the run log and embeddings of `layout`, cluster, and write `clusters.json`.
    pub fn cluster_run(&self, layout: &RunLayout) -> Result<ClusterReport, AnalysisError> {
        let records = RunLog::new(layout.run_log()).read_all()?;
        if records.is_empty() {
            return Err(AnalysisError::EmptyRunLog);
        }
        let embeddings: Vec<Option<Vec<f32>>> = records
            .iter()
            .map(|r| load_embedding(layout, r))
            .collect();
        let report = self.cluster(&records, &embeddings)?;
        write_json(&layout.clusters(), &report)?;
        info!(
            k = report.k,
            items = report.items.len(),
            path = %layout.clusters().display(),
            "clusters written"
        );
        Ok(report)
    }
}

impl Default for ClusterSelector {
    fn default() -> Self {
        Self::new()
    }
}

fn load_embedding(layout: &RunLayout, record: &IterationRecord) -> Option<Vec<f32>> {
    if record.embedding_path.is_empty() {
        return None;
    }
    let path = layout.resolve(&record.embedding_path);
    if !path.is_file() {
        warn!(iteration = record.iteration, path = %path.display(), "embedding missing, using zero vector");
        return None;
    }
    match read_embedding(&path) {
        Ok(v) if !v.is_empty() => Some(v),
        Ok(_) => None,
        Err(e) => {
            warn!(iteration = record.iteration, error = %e, "unreadable embedding, using zero vector");
            None
        }
    }
}

/// L2-normalised rows; missing embeddings become zero rows of the common dimension.
fn matrix(
    records: &[IterationRecord],
    embeddings: &[Option<Vec<f32>>],
) -> Result<Vec<Vec<f64>>, AnalysisError> {
    let dim = embeddings
        .iter()
        .flatten()
        .map(|v| v.len())
        .next()
        .unwrap_or(1);
    let mut rows = Vec::with_capacity(records.len());
    for (i, r) in records.iter().enumerate() {
        let row = match embeddings.get(i).and_then(|e| e.as_ref()) {
            Some(v) if v.len() != dim => {
                return Err(AnalysisError::DimensionMismatch {
                    iteration: r.iteration,
                    expected: dim,
                    found: v.len(),
                })
            }
            Some(v) => normalized(v),
            None => vec![0.0; dim],
        };
        rows.push(row);
    }
    Ok(rows)
}

fn normalized(v: &[f32]) -> Vec<f64> {
    let row: Vec<f64> = v.iter().map(|x| *x as f64).collect();
    let norm = row.iter().map(|x| x * x).sum::<f64>().sqrt();
    if norm > 0.0 {
        row.into_iter().map(|x| x / norm).collect()
    } else {
        row
    }
}
