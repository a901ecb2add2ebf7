//! Property tests: novelty is a well-behaved dissimilarity over embeddings.

use proptest::prelude::*;
use rwe_motif::{cosine_similarity, l2_normalize, novelty};

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn arb_vector(dim: usize) -> impl Strategy<Value = Vec<f32>> {
    prop::collection::vec(-10.0f32..10.0, dim)
}

fn arb_pair() -> impl Strategy<Value = (Vec<f32>, Vec<f32>)> {
    (1usize..32).prop_flat_map(|d| (arb_vector(d), arb_vector(d)))
}

fn nonzero(v: &[f32]) -> bool {
    v.iter().any(|x| x.abs() > 1e-3)
}

// ---------------------------------------------------------------------------
// Property Tests
// ---------------------------------------------------------------------------

proptest! {
    #[test]
    fn novelty_in_range((a, b) in arb_pair()) {
        let n = novelty(&a, &b);
        prop_assert!((0.0..=2.0).contains(&n), "novelty {}", n);
    }

    #[test]
    fn novelty_is_symmetric((a, b) in arb_pair()) {
        prop_assert!((novelty(&a, &b) - novelty(&b, &a)).abs() < 1e-12);
    }

    #[test]
    fn self_novelty_is_zero(a in arb_vector(16)) {
        prop_assume!(nonzero(&a));
        prop_assert!(novelty(&a, &a).abs() < 1e-9);
    }

    #[test]
    fn scale_invariant((a, b) in arb_pair(), k in 0.1f32..50.0) {
        prop_assume!(nonzero(&a) && nonzero(&b));
        let scaled: Vec<f32> = a.iter().map(|x| x * k).collect();
        prop_assert!((cosine_similarity(&a, &b) - cosine_similarity(&scaled, &b)).abs() < 1e-4);
    }

    #[test]
    fn normalised_vectors_have_unit_length(mut a in arb_vector(12)) {
        prop_assume!(nonzero(&a));
        l2_normalize(&mut a);
        let len: f64 = a.iter().map(|x| (*x as f64).powi(2)).sum::<f64>().sqrt();
        prop_assert!((len - 1.0).abs() < 1e-5);
    }
}
