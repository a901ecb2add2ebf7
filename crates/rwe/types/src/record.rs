use serde::{Deserialize, Serialize};

/// Rule-change tag written for the synthetic genesis record.
pub const GENESIS_TAG: &str = "genesis_bootstrap";
/// Backend tag written for the synthetic genesis record.
pub const GENESIS_BACKEND: &str = "genesis";

/// Generation parameters actually used for one artifact.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct GenerationParams {
    pub width: u32,
    pub height: u32,
    pub steps: u32,
    pub cfg: f64,
    pub seed: u64,
}

/// One line of the run log. Immutable once appended.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct IterationRecord {
    pub iteration: u64,
    /// Unix seconds.
    pub ts: i64,
    pub prompt: String,
    pub negative: String,
    /// `None` for the genesis record.
    pub generation: Option<GenerationParams>,
    pub image_path: String,
    pub caption: String,
    pub motifs_added: Vec<String>,
    pub similarity_prev: Option<f64>,
    pub novelty_prev: Option<f64>,
    pub rule_change: String,
    pub embedding_path: String,
    pub interior_strikes: u32,
    pub backend: String,
    #[serde(default)]
    pub used_img2img: bool,
    #[serde(default)]
    pub img2img_strength: f64,
}

impl IterationRecord {
    pub fn is_genesis(&self) -> bool {
        self.rule_change == GENESIS_TAG
    }
}
