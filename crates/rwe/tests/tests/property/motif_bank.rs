//! Property tests: the motif bank stays bounded, duplicate-free and lowercase
//! under any sequence of additions and front injections.

use proptest::prelude::*;
use rwe_types::{MotifBank, MOTIF_CAPACITY};
use std::collections::{BTreeSet, HashSet};

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

#[derive(Clone, Debug)]
enum Op {
    Add(Vec<String>),
    Front(String),
}

fn arb_motif() -> impl Strategy<Value = String> {
    // small alphabet so duplicates and case variants actually occur
    "[a-dA-D]{1,3}"
}

fn arb_op() -> impl Strategy<Value = Op> {
    prop_oneof![
        3 => prop::collection::vec(arb_motif(), 0..12).prop_map(Op::Add),
        1 => arb_motif().prop_map(Op::Front),
    ]
}

fn apply(bank: &mut MotifBank, op: &Op, banned: &BTreeSet<String>) {
    match op {
        Op::Add(motifs) => {
            bank.add(motifs, banned);
        }
        Op::Front(m) => {
            bank.insert_front(m);
        }
    }
}

// ---------------------------------------------------------------------------
// Property Tests
// ---------------------------------------------------------------------------

proptest! {
    #[test]
    fn bank_is_bounded_and_unique(ops in prop::collection::vec(arb_op(), 0..60)) {
        let banned = BTreeSet::new();
        let mut bank = MotifBank::new();
        for op in &ops {
            apply(&mut bank, op, &banned);
            prop_assert!(bank.len() <= MOTIF_CAPACITY);
            let distinct: HashSet<&String> = bank.iter().collect();
            prop_assert_eq!(distinct.len(), bank.len());
            prop_assert!(bank.iter().all(|m| *m == m.to_lowercase()));
        }
    }

    #[test]
    fn banned_motifs_never_enter(
        ops in prop::collection::vec(arb_op(), 0..40),
        banned in prop::collection::btree_set("[a-d]{1,2}", 0..6),
    ) {
        let mut bank = MotifBank::new();
        for op in &ops {
            if let Op::Add(_) = op {
                apply(&mut bank, op, &banned);
            }
        }
        prop_assert!(bank.iter().all(|m| !banned.contains(m)));
    }

    #[test]
    fn overflow_evicts_oldest_first(extra in 1usize..40) {
        let mut bank = MotifBank::new();
        let motifs: Vec<String> = (0..MOTIF_CAPACITY + extra).map(|i| format!("m{}", i)).collect();
        let added = bank.add(&motifs, &BTreeSet::new());
        prop_assert_eq!(added.len(), motifs.len());
        prop_assert_eq!(bank.len(), MOTIF_CAPACITY);
        prop_assert_eq!(bank.as_slice(), &motifs[extra..]);
    }

    #[test]
    fn add_reports_exactly_the_new_motifs(
        first in prop::collection::vec(arb_motif(), 0..10),
        second in prop::collection::vec(arb_motif(), 0..10),
    ) {
        let banned = BTreeSet::new();
        let mut bank = MotifBank::new();
        bank.add(&first, &banned);
        let before: Vec<String> = bank.as_slice().to_vec();
        let added = bank.add(&second, &banned);
        for m in &added {
            prop_assert!(!before.contains(m));
            prop_assert!(bank.contains(m));
        }
        prop_assert_eq!(bank.len(), before.len() + added.len());
    }
}
