use crate::interior::likely_interior;
use crate::types::{MutationOutcome, MutationPolicy, RuleKind, StyleChange, RULE_ORDER};
use rand::seq::SliceRandom;
use rand::Rng;
use rwe_types::{EngineConfig, WorldState};
use std::collections::BTreeSet;
use tracing::debug;

/// Decides how the world changes after each iteration.
///
/// Rules are evaluated top-down in [`RULE_ORDER`]; the first guard that holds
/// is the only branch applied. The interior strike counter is updated before
/// any guard is evaluated.
#[derive(Clone, Debug)]
pub struct RuleMutationEngine {
    policy: MutationPolicy,
    style_pool: Vec<String>,
    novelty_pool: Vec<String>,
    escape_pool: Vec<String>,
    banned: BTreeSet<String>,
}

impl RuleMutationEngine {
    pub fn new(config: &EngineConfig) -> Self {
        Self {
            policy: MutationPolicy::default(),
            style_pool: config.style_pool.clone(),
            novelty_pool: config.novelty_motif_pool.clone(),
            escape_pool: config.escape_motifs.clone(),
            banned: config.banned_motifs.clone(),
        }
    }

    pub fn with_policy(mut self, policy: MutationPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn policy(&self) -> &MutationPolicy {
        &self.policy
    }

    /// Apply one mutation for the latest novelty signal and caption.
    pub fn mutate<R: Rng + ?Sized>(
        &self,
        world: &mut WorldState,
        novelty: Option<f64>,
        caption: &str,
        rng: &mut R,
    ) -> MutationOutcome {
        self.record_strike(world, caption);
        let rule = self.select(world, novelty);
        let outcome = match rule {
            RuleKind::EscapeInteriorTrap => self.escape_interior_trap(world, rng),
            RuleKind::Bootstrap => self.bootstrap(world, rng),
            RuleKind::IncreaseNovelty => {
                let forced = novelty.is_some_and(|n| n < self.policy.force_rotate_below);
                self.increase_novelty(world, forced, rng)
            }
            RuleKind::IncreaseCoherence => self.increase_coherence(world, rng),
            RuleKind::Micro => self.micro(world, rng),
        };
        debug!(
            rule = %outcome.rule,
            rule_change = %outcome.rule_change,
            cfg = world.cfg,
            steps = world.steps,
            strikes = world.interior_strikes,
            "world mutated"
        );
        outcome
    }

    /// First rule whose guard holds for this world and novelty.
    pub fn select(&self, world: &WorldState, novelty: Option<f64>) -> RuleKind {
        RULE_ORDER
            .iter()
            .copied()
            .find(|rule| self.guard(*rule, world, novelty))
            .unwrap_or(RuleKind::Micro)
    }

    fn guard(&self, rule: RuleKind, world: &WorldState, novelty: Option<f64>) -> bool {
        let target = world.novelty_target;
        match rule {
            RuleKind::EscapeInteriorTrap => {
                world.interior_strikes >= self.policy.interior_strike_limit
            }
            RuleKind::Bootstrap => novelty.is_none(),
            RuleKind::IncreaseNovelty => novelty.is_some_and(|n| n < target - self.policy.low_margin),
            RuleKind::IncreaseCoherence => {
                novelty.is_some_and(|n| n > target + self.policy.high_margin)
            }
            RuleKind::Micro => true,
        }
    }

    fn record_strike(&self, world: &mut WorldState, caption: &str) {
        if likely_interior(caption, self.policy.interior_min_hits) {
            world.interior_strikes += 1;
        } else {
            world.interior_strikes = world.interior_strikes.saturating_sub(1);
        }
    }

    fn escape_interior_trap<R: Rng + ?Sized>(
        &self,
        world: &mut WorldState,
        rng: &mut R,
    ) -> MutationOutcome {
        world.motif_bank.purge(&self.banned);
        let added = self.inject(world, &self.escape_pool, rng);
        let style = self.rotate_style(world, true, rng);
        world.cfg = clamp_cfg(world.cfg + rng.gen_range(0.6..=1.2), 5.0, 9.0);
        world.steps = shift_steps(world.steps, pick(&[2, 3, 4], rng), 18, 36);
        outcome(RuleKind::EscapeInteriorTrap, format!("escape_interior_trap+{}", style), added, style)
    }

    fn bootstrap<R: Rng + ?Sized>(&self, world: &mut WorldState, rng: &mut R) -> MutationOutcome {
        let style = self.rotate_style(world, true, rng);
        let added = self.inject(world, &self.novelty_pool, rng);
        outcome(RuleKind::Bootstrap, format!("bootstrap+{}", style), added, style)
    }

    fn increase_novelty<R: Rng + ?Sized>(
        &self,
        world: &mut WorldState,
        forced: bool,
        rng: &mut R,
    ) -> MutationOutcome {
        let added = self.inject(world, &self.novelty_pool, rng);
        let style = self.rotate_style(world, forced, rng);
        world.cfg = clamp_cfg(world.cfg + rng.gen_range(0.3..=1.0), 5.0, 9.0);
        world.steps = shift_steps(world.steps, pick(&[1, 2, 3], rng), 18, 36);
        outcome(
            RuleKind::IncreaseNovelty,
            format!("increase_novelty+inject+{}", style),
            added,
            style,
        )
    }

    fn increase_coherence<R: Rng + ?Sized>(
        &self,
        world: &mut WorldState,
        rng: &mut R,
    ) -> MutationOutcome {
        let style = self.rotate_style(world, false, rng);
        world.cfg = clamp_cfg(world.cfg + rng.gen_range(-0.9..=-0.2), 4.8, 7.0);
        world.steps = shift_steps(world.steps, pick(&[-2, -1, 0], rng), 18, 32);
        outcome(
            RuleKind::IncreaseCoherence,
            format!("increase_coherence+{}", style),
            Vec::new(),
            style,
        )
    }

    fn micro<R: Rng + ?Sized>(&self, world: &mut WorldState, rng: &mut R) -> MutationOutcome {
        let r: f64 = rng.gen();
        let jitter = if r < self.policy.micro_cfg_probability {
            world.cfg = clamp_cfg(world.cfg + rng.gen_range(-0.35..=0.35), 4.8, 9.0);
            "micro(cfg)"
        } else if r < self.policy.micro_cfg_probability + self.policy.micro_steps_probability {
            world.steps = shift_steps(world.steps, pick(&[-1, 0, 1], rng), 18, 36);
            "micro(steps)"
        } else {
            "micro(none)"
        };
        let style = self.rotate_style(world, false, rng);
        outcome(RuleKind::Micro, format!("{}+{}", jitter, style), Vec::new(), style)
    }

    /// Put up to `inject_count` shuffled pool motifs at the front of the bank.
    fn inject<R: Rng + ?Sized>(&self, world: &mut WorldState, pool: &[String], rng: &mut R) -> Vec<String> {
        let mut candidates: Vec<&String> = pool.iter().collect();
        candidates.shuffle(rng);
        candidates
            .into_iter()
            .take(self.policy.inject_count)
            .filter(|c| world.motif_bank.insert_front(c))
            .cloned()
            .collect()
    }

    /// Advance the style round-robin; unforced rotations are probabilistic.
    fn rotate_style<R: Rng + ?Sized>(&self, world: &mut WorldState, force: bool, rng: &mut R) -> StyleChange {
        if self.style_pool.is_empty() {
            return StyleChange::Keep;
        }
        if force || rng.gen::<f64>() < self.policy.rotate_probability {
            world.style_index = (world.style_index + 1) % self.style_pool.len();
            world.prompt_style = self.style_pool[world.style_index].clone();
            StyleChange::Rotate
        } else {
            StyleChange::Keep
        }
    }
}

fn outcome(rule: RuleKind, rule_change: String, motifs_added: Vec<String>, style: StyleChange) -> MutationOutcome {
    MutationOutcome {
        rule,
        rule_change,
        motifs_added,
        style,
    }
}

fn pick<R: Rng + ?Sized>(choices: &[i64], rng: &mut R) -> i64 {
    choices.choose(rng).copied().unwrap_or(0)
}

fn clamp_cfg(v: f64, lo: f64, hi: f64) -> f64 {
    v.clamp(lo, hi)
}

fn shift_steps(steps: u32, delta: i64, lo: u32, hi: u32) -> u32 {
    (steps as i64 + delta).clamp(lo as i64, hi as i64) as u32
}
