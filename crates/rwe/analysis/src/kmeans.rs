use crate::error::AnalysisError;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Seed used by every clustering stage so re-runs are identical.
pub const KMEANS_SEED: u64 = 42;

/// Result of one k-means fit.
#[derive(Clone, Debug, PartialEq)]
pub struct KMeansFit {
    /// Cluster label per input point, numbered by first appearance.
    pub labels: Vec<usize>,
    pub centroids: Vec<Vec<f64>>,
    /// Sum of squared distances to the assigned centroid.
    pub inertia: f64,
}

impl KMeansFit {
    /// Number of points assigned to each centroid.
    pub fn counts(&self) -> Vec<usize> {
        let mut counts = vec![0; self.centroids.len()];
        for l in &self.labels {
            counts[*l] += 1;
        }
        counts
    }

    /// Number of distinct labels actually used.
    pub fn distinct_labels(&self) -> usize {
        self.counts().iter().filter(|c| **c > 0).count()
    }
}

/// Lloyd's k-means with k-means++ seeding and several restarts.
#[derive(Clone, Debug)]
pub struct KMeans {
    k: usize,
    n_init: usize,
    max_iter: usize,
    seed: u64,
}

impl KMeans {
    pub fn new(k: usize) -> Self {
        Self {
            k,
            n_init: 10,
            max_iter: 300,
            seed: KMEANS_SEED,
        }
    }

    pub fn with_n_init(mut self, n: usize) -> Self {
        self.n_init = n.max(1);
        self
    }

    pub fn with_max_iter(mut self, n: usize) -> Self {
        self.max_iter = n.max(1);
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    /// Fit all restarts from one seeded stream and keep the lowest inertia.
    pub fn fit(&self, data: &[Vec<f64>]) -> Result<KMeansFit, AnalysisError> {
        let n = data.len();
        if self.k == 0 || self.k > n {
            return Err(AnalysisError::InvalidK { k: self.k, n });
        }
        let mut rng = StdRng::seed_from_u64(self.seed);
        let mut best: Option<KMeansFit> = None;
        for _ in 0..self.n_init.max(1) {
            let fit = self.run_once(data, &mut rng);
            if best.as_ref().map_or(true, |b| fit.inertia < b.inertia) {
                best = Some(fit);
            }
        }
        best.map(relabel_by_first_appearance)
            .ok_or(AnalysisError::InvalidK { k: self.k, n })
    }

    fn run_once(&self, data: &[Vec<f64>], rng: &mut StdRng) -> KMeansFit {
        let mut centroids = seed_plus_plus(data, self.k, rng);
        let mut labels = assign(data, &centroids);
        for _ in 0..self.max_iter {
            centroids = update(data, &labels, &centroids);
            let next = assign(data, &centroids);
            if next == labels {
                break;
            }
            labels = next;
        }
        let inertia = data
            .iter()
            .zip(&labels)
            .map(|(p, l)| sq_dist(p, &centroids[*l]))
            .sum();
        KMeansFit {
            labels,
            centroids,
            inertia,
        }
    }
}

pub(crate) fn sq_dist(a: &[f64], b: &[f64]) -> f64 {
    a.iter().zip(b).map(|(x, y)| (x - y) * (x - y)).sum()
}

fn nearest(point: &[f64], centroids: &[Vec<f64>]) -> usize {
    let mut best = 0;
    let mut best_d = f64::INFINITY;
    for (j, c) in centroids.iter().enumerate() {
        let d = sq_dist(point, c);
        if d < best_d {
            best_d = d;
            best = j;
        }
    }
    best
}

fn assign(data: &[Vec<f64>], centroids: &[Vec<f64>]) -> Vec<usize> {
    data.iter().map(|p| nearest(p, centroids)).collect()
}

/// Mean of each cluster; an emptied cluster takes over the point lying
/// farthest from its own centroid.
fn update(data: &[Vec<f64>], labels: &[usize], old: &[Vec<f64>]) -> Vec<Vec<f64>> {
    let k = old.len();
    let dim = data.first().map_or(0, |p| p.len());
    let mut sums = vec![vec![0.0; dim]; k];
    let mut counts = vec![0usize; k];
    for (p, l) in data.iter().zip(labels) {
        counts[*l] += 1;
        for (s, v) in sums[*l].iter_mut().zip(p) {
            *s += v;
        }
    }
    let mut centroids: Vec<Vec<f64>> = sums
        .into_iter()
        .zip(&counts)
        .enumerate()
        .map(|(j, (s, c))| {
            if *c == 0 {
                old[j].clone()
            } else {
                s.into_iter().map(|v| v / *c as f64).collect()
            }
        })
        .collect();

    let mut taken = vec![false; data.len()];
    for j in (0..k).filter(|j| counts[*j] == 0) {
        let far = data
            .iter()
            .enumerate()
            .filter(|(i, _)| !taken[*i])
            .map(|(i, p)| (i, sq_dist(p, &centroids[labels[i]])))
            .max_by(|a, b| a.1.total_cmp(&b.1));
        if let Some((i, _)) = far {
            taken[i] = true;
            centroids[j] = data[i].clone();
        }
    }
    centroids
}

fn seed_plus_plus(data: &[Vec<f64>], k: usize, rng: &mut StdRng) -> Vec<Vec<f64>> {
    let n = data.len();
    let mut centroids = Vec::with_capacity(k);
    centroids.push(data[rng.gen_range(0..n)].clone());
    let mut d2: Vec<f64> = data.iter().map(|p| sq_dist(p, &centroids[0])).collect();
    while centroids.len() < k {
        let total: f64 = d2.iter().sum();
        let idx = if total <= 0.0 {
            rng.gen_range(0..n)
        } else {
            let mut target = rng.gen::<f64>() * total;
            let mut chosen = n - 1;
            for (i, d) in d2.iter().enumerate() {
                if target < *d {
                    chosen = i;
                    break;
                }
                target -= d;
            }
            chosen
        };
        let c = data[idx].clone();
        for (slot, p) in d2.iter_mut().zip(data) {
            *slot = slot.min(sq_dist(p, &c));
        }
        centroids.push(c);
    }
    centroids
}

fn relabel_by_first_appearance(fit: KMeansFit) -> KMeansFit {
    let k = fit.centroids.len();
    let mut map: Vec<Option<usize>> = vec![None; k];
    let mut next = 0;
    for l in &fit.labels {
        if map[*l].is_none() {
            map[*l] = Some(next);
            next += 1;
        }
    }
    for slot in map.iter_mut().filter(|m| m.is_none()) {
        *slot = Some(next);
        next += 1;
    }
    let map: Vec<usize> = map.into_iter().map(|m| m.unwrap_or(0)).collect();
    let mut centroids = vec![Vec::new(); k];
    for (old, c) in fit.centroids.into_iter().enumerate() {
        centroids[map[old]] = c;
    }
    KMeansFit {
        labels: fit.labels.iter().map(|l| map[*l]).collect(),
        centroids,
        inertia: fit.inertia,
    }
}
