/// Similarity and novelty between two consecutive artifact embeddings.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct NoveltySignal {
    pub similarity: f64,
    pub novelty: f64,
}

impl NoveltySignal {
    pub fn between(prev: &[f32], next: &[f32]) -> Self {
        let similarity = cosine_similarity(prev, next);
        Self {
            similarity,
            novelty: 1.0 - similarity,
        }
    }
}

fn norm(v: &[f32]) -> f64 {
    v.iter().map(|x| (*x as f64) * (*x as f64)).sum::<f64>().sqrt()
}

/// Cosine similarity in `[-1, 1]`. Zero vectors have similarity 0 with
/// everything; mismatched lengths compare over the shared prefix.
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f64 {
    let na = norm(a);
    let nb = norm(b);
    if na == 0.0 || nb == 0.0 {
        return 0.0;
    }
    let dot: f64 = a
        .iter()
        .zip(b.iter())
        .map(|(x, y)| (*x as f64) * (*y as f64))
        .sum();
    (dot / (na * nb)).clamp(-1.0, 1.0)
}

/// `1 - cosine_similarity`, in `[0, 2]`.
pub fn novelty(a: &[f32], b: &[f32]) -> f64 {
    1.0 - cosine_similarity(a, b)
}

/// Scale to unit length in place. Zero vectors are left untouched.
pub fn l2_normalize(v: &mut [f32]) {
    let n = norm(v);
    if n > 0.0 {
        for x in v.iter_mut() {
            *x = (*x as f64 / n) as f32;
        }
    }
}
