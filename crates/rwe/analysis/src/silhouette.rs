/// Cosine distance `1 - cos(a, b)`; a zero vector is at distance 1 from everything.
pub fn cosine_distance(a: &[f64], b: &[f64]) -> f64 {
    let na = a.iter().map(|x| x * x).sum::<f64>().sqrt();
    let nb = b.iter().map(|x| x * x).sum::<f64>().sqrt();
    if na == 0.0 || nb == 0.0 {
        return 1.0;
    }
    let dot: f64 = a.iter().zip(b).map(|(x, y)| x * y).sum();
    1.0 - (dot / (na * nb)).clamp(-1.0, 1.0)
}

/// Mean silhouette coefficient under cosine distance.
///
/// `None` unless the labelling uses between 2 and n-1 distinct clusters.
/// Points alone in their cluster score 0.
pub fn silhouette_cosine(data: &[Vec<f64>], labels: &[usize]) -> Option<f64> {
    let n = data.len();
    if n != labels.len() || n < 3 {
        return None;
    }
    let k = labels.iter().max().map_or(0, |m| m + 1);
    let mut sizes = vec![0usize; k];
    for l in labels {
        sizes[*l] += 1;
    }
    let used = sizes.iter().filter(|s| **s > 0).count();
    if used < 2 || used > n - 1 {
        return None;
    }

    let mut total = 0.0;
    for i in 0..n {
        let own = labels[i];
        if sizes[own] <= 1 {
            continue;
        }
        let mut sums = vec![0.0; k];
        for j in 0..n {
            if i != j {
                sums[labels[j]] += cosine_distance(&data[i], &data[j]);
            }
        }
        let a = sums[own] / (sizes[own] - 1) as f64;
        let b = (0..k)
            .filter(|c| *c != own && sizes[*c] > 0)
            .map(|c| sums[c] / sizes[c] as f64)
            .fold(f64::INFINITY, f64::min);
        let denom = a.max(b);
        if denom > 0.0 {
            total += (b - a) / denom;
        }
    }
    Some(total / n as f64)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn distance_basics() {
        assert!(cosine_distance(&[1.0, 0.0], &[2.0, 0.0]).abs() < 1e-12);
        assert!((cosine_distance(&[1.0, 0.0], &[0.0, 3.0]) - 1.0).abs() < 1e-12);
        assert!((cosine_distance(&[1.0, 0.0], &[-1.0, 0.0]) - 2.0).abs() < 1e-12);
        assert_eq!(cosine_distance(&[0.0, 0.0], &[1.0, 0.0]), 1.0);
    }

    #[test]
    fn well_separated_directions_score_high() {
        let data = vec![
            vec![1.0, 0.01],
            vec![1.0, -0.01],
            vec![1.0, 0.0],
            vec![0.01, 1.0],
            vec![-0.01, 1.0],
            vec![0.0, 1.0],
        ];
        let s = silhouette_cosine(&data, &[0, 0, 0, 1, 1, 1]).unwrap();
        assert!(s > 0.95);
    }

    #[test]
    fn bad_labelling_scores_low() {
        let data = vec![
            vec![1.0, 0.0],
            vec![0.0, 1.0],
            vec![1.0, 0.0],
            vec![0.0, 1.0],
        ];
        let s = silhouette_cosine(&data, &[0, 0, 1, 1]).unwrap();
        assert!(s < 0.0);
    }

    #[test]
    fn degenerate_labellings() {
        let data = vec![vec![1.0], vec![2.0], vec![3.0]];
        assert!(silhouette_cosine(&data, &[0, 0, 0]).is_none());
        assert!(silhouette_cosine(&data, &[0, 1, 2]).is_none());
        assert!(silhouette_cosine(&data[..2], &[0, 1]).is_none());
    }
}
