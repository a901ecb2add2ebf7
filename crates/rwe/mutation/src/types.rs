use serde::{Deserialize, Serialize};

/// The mutation branches, in priority order.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RuleKind {
    /// Caption history says the world is stuck indoors.
    EscapeInteriorTrap,
    /// No previous embedding to compare against.
    Bootstrap,
    /// Novelty fell below the target band.
    IncreaseNovelty,
    /// Novelty rose above the target band.
    IncreaseCoherence,
    /// Novelty inside the band: small jitter only.
    Micro,
}

/// Evaluation order: the first rule whose guard holds wins.
pub const RULE_ORDER: [RuleKind; 5] = [
    RuleKind::EscapeInteriorTrap,
    RuleKind::Bootstrap,
    RuleKind::IncreaseNovelty,
    RuleKind::IncreaseCoherence,
    RuleKind::Micro,
];

impl std::fmt::Display for RuleKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::EscapeInteriorTrap => write!(f, "escape_interior_trap"),
            Self::Bootstrap => write!(f, "bootstrap"),
            Self::IncreaseNovelty => write!(f, "increase_novelty"),
            Self::IncreaseCoherence => write!(f, "increase_coherence"),
            Self::Micro => write!(f, "micro"),
        }
    }
}

/// Outcome of a style-rotation attempt.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum StyleChange {
    Rotate,
    Keep,
}

impl std::fmt::Display for StyleChange {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Rotate => write!(f, "style_rotate"),
            Self::Keep => write!(f, "style_keep"),
        }
    }
}

/// Thresholds and probabilities steering the mutation branches.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct MutationPolicy {
    /// Strikes at which the escape branch fires.
    pub interior_strike_limit: u32,
    /// Indoor keywords a caption must contain to count as interior.
    pub interior_min_hits: usize,
    /// Novelty below `target - low_margin` asks for more novelty.
    pub low_margin: f64,
    /// Novelty above `target + high_margin` asks for more coherence.
    pub high_margin: f64,
    /// Novelty below this forces a style rotation in the novelty branch.
    pub force_rotate_below: f64,
    /// Probability of an unforced style rotation.
    pub rotate_probability: f64,
    /// Probability of a cfg jitter inside the band.
    pub micro_cfg_probability: f64,
    /// Probability of a steps jitter inside the band (after cfg is ruled out).
    pub micro_steps_probability: f64,
    /// Motifs injected per novelty or escape event.
    pub inject_count: usize,
}

impl Default for MutationPolicy {
    fn default() -> Self {
        Self {
            interior_strike_limit: 2,
            interior_min_hits: 2,
            low_margin: 0.08,
            high_margin: 0.12,
            force_rotate_below: 0.12,
            rotate_probability: 0.25,
            micro_cfg_probability: 0.40,
            micro_steps_probability: 0.35,
            inject_count: 3,
        }
    }
}

/// What one mutation call did to the world.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct MutationOutcome {
    pub rule: RuleKind,
    /// Full tag, e.g. `increase_novelty+inject+style_keep`.
    pub rule_change: String,
    pub motifs_added: Vec<String>,
    pub style: StyleChange,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn order_starts_with_escape_and_ends_with_micro() {
        assert_eq!(RULE_ORDER[0], RuleKind::EscapeInteriorTrap);
        assert_eq!(RULE_ORDER[4], RuleKind::Micro);
    }

    #[test]
    fn tags_display() {
        assert_eq!(format!("{}", RuleKind::IncreaseCoherence), "increase_coherence");
        assert_eq!(format!("{}", StyleChange::Keep), "style_keep");
    }

    #[test]
    fn micro_probabilities_cumulate_below_one() {
        let p = MutationPolicy::default();
        assert!((p.micro_cfg_probability + p.micro_steps_probability - 0.75).abs() < 1e-12);
    }
}
