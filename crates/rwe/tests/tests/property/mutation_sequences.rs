//! Property tests: arbitrary novelty and caption sequences never push the
//! world out of its generation bounds or corrupt its motif bank.

use proptest::prelude::*;
use rand::rngs::StdRng;
use rand::SeedableRng;
use rwe_mutation::{RuleKind, RuleMutationEngine};
use rwe_types::{EngineConfig, WorldState, MOTIF_CAPACITY};

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn arb_caption() -> impl Strategy<Value = String> {
    prop_oneof![
        Just("a quiet room with a window and a wooden floor".to_string()),
        Just("a hallway lined with doors".to_string()),
        Just("a coastal cliff under open sky".to_string()),
        Just("a glass desert at noon".to_string()),
        "[a-z ]{0,30}",
    ]
}

fn arb_step() -> impl Strategy<Value = (Option<f64>, String)> {
    (prop::option::weighted(0.9, 0.0f64..2.0), arb_caption())
}

// ---------------------------------------------------------------------------
// Property Tests
// ---------------------------------------------------------------------------

proptest! {
    #[test]
    fn world_stays_valid(steps in prop::collection::vec(arb_step(), 1..80), seed in any::<u64>()) {
        let config = EngineConfig::default();
        let engine = RuleMutationEngine::new(&config);
        let mut world = WorldState::new(&config);
        let mut rng = StdRng::seed_from_u64(seed);
        for (novelty, caption) in &steps {
            let outcome = engine.mutate(&mut world, *novelty, caption, &mut rng);
            prop_assert!(world.within_bounds(), "cfg {} steps {}", world.cfg, world.steps);
            prop_assert!(world.style_index < config.style_pool.len());
            prop_assert!(world.motif_bank.len() <= MOTIF_CAPACITY);
            prop_assert!(!outcome.rule_change.is_empty());
            if novelty.is_none() && outcome.rule != RuleKind::EscapeInteriorTrap {
                prop_assert_eq!(outcome.rule, RuleKind::Bootstrap);
            }
        }
    }

    #[test]
    fn second_indoor_caption_triggers_escape(seed in any::<u64>()) {
        let config = EngineConfig::default();
        let engine = RuleMutationEngine::new(&config);
        let mut world = WorldState::new(&config);
        let mut rng = StdRng::seed_from_u64(seed);
        let indoor = "a dim room with a closed door and a bare wall";
        let first = engine.mutate(&mut world, Some(0.3), indoor, &mut rng);
        prop_assert_ne!(first.rule, RuleKind::EscapeInteriorTrap);
        let second = engine.mutate(&mut world, Some(0.3), indoor, &mut rng);
        prop_assert_eq!(second.rule, RuleKind::EscapeInteriorTrap);
        prop_assert_eq!(world.interior_strikes, 2);
    }
}
