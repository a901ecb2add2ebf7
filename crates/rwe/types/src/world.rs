use crate::config::EngineConfig;
use crate::motif::MotifBank;
use serde::{Deserialize, Serialize};

/// Engine-wide bounds for guidance scale.
pub const CFG_BOUNDS: (f64, f64) = (4.8, 9.0);
/// Engine-wide bounds for inference steps.
pub const STEPS_BOUNDS: (u32, u32) = (18, 36);

/// Seed selection: fixed for deterministic reruns, or random per iteration.
///
/// Persisted as an integer where any negative value means random.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "i64", into = "i64")]
pub enum SeedPolicy {
    Fixed(u64),
    Random,
}

impl From<i64> for SeedPolicy {
    fn from(v: i64) -> Self {
        if v >= 0 {
            Self::Fixed(v as u64)
        } else {
            Self::Random
        }
    }
}

impl From<SeedPolicy> for i64 {
    fn from(s: SeedPolicy) -> Self {
        match s {
            SeedPolicy::Fixed(v) => v.min(i64::MAX as u64) as i64,
            SeedPolicy::Random => -1,
        }
    }
}

fn default_backend() -> String {
    "auto".to_string()
}

/// The mutable control variables steering the next artifact.
///
/// Owned by exactly one writer (the orchestrator) and checkpointed after
/// every completed iteration.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct WorldState {
    /// Last completed step index.
    pub iteration: u64,
    pub motif_bank: MotifBank,
    pub prompt_style: String,
    #[serde(default)]
    pub style_index: usize,
    pub negative: String,
    pub width: u32,
    pub height: u32,
    pub steps: u32,
    pub cfg: f64,
    pub novelty_target: f64,
    pub seed: SeedPolicy,
    /// Consecutive iterations judged to be trapped indoors.
    #[serde(default)]
    pub interior_strikes: u32,
    /// Generation backend variant, fixed on first load.
    #[serde(default = "default_backend")]
    pub backend: String,
}

impl WorldState {
    /// Fresh world seeded from configuration defaults.
    pub fn new(config: &EngineConfig) -> Self {
        let d = &config.defaults;
        let mut motif_bank = MotifBank::new();
        motif_bank.add(config.initial_words.iter().cloned(), &config.banned_motifs);
        Self {
            iteration: 0,
            motif_bank,
            prompt_style: config.style_pool.first().cloned().unwrap_or_default(),
            style_index: 0,
            negative: d.negative.clone(),
            width: d.width,
            height: d.height,
            steps: d.steps,
            cfg: d.cfg,
            novelty_target: d.novelty_target,
            seed: d.seed,
            interior_strikes: 0,
            backend: default_backend(),
        }
    }

    /// True until a backend tag has been recorded.
    pub fn backend_unset(&self) -> bool {
        self.backend.is_empty() || self.backend == "auto"
    }

    /// Within the engine-wide generation bounds.
    pub fn within_bounds(&self) -> bool {
        (CFG_BOUNDS.0..=CFG_BOUNDS.1).contains(&self.cfg)
            && (STEPS_BOUNDS.0..=STEPS_BOUNDS.1).contains(&self.steps)
    }
}
