use crate::error::ConfigError;
use crate::world::{SeedPolicy, CFG_BOUNDS, STEPS_BOUNDS};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::path::Path;

pub const DEFAULT_NEGATIVE: &str =
    "lowres, blurry, artifacts, text, watermark, logo, signature, deformed";

const DEFAULT_STYLE: &str = "sunlit exterior, wide angle, deep depth of field, cinematic composition";
const DEFAULT_NOVELTY_POOL: [&str; 3] = ["tidepool", "cathedral forest", "glass desert"];
const DEFAULT_ESCAPE_POOL: [&str; 3] = ["open sky", "mountain ridge", "coastal cliffs"];
const DEFAULT_INITIAL_WORDS: [&str; 6] = ["mirror", "archive", "threshold", "glyph", "loop", "shadow"];

/// Default generation parameters applied to a fresh world.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct GenerationDefaults {
    pub width: u32,
    pub height: u32,
    pub steps: u32,
    pub cfg: f64,
    pub novelty_target: f64,
    pub seed: SeedPolicy,
    pub negative: String,
}

impl Default for GenerationDefaults {
    fn default() -> Self {
        Self {
            width: 1024,
            height: 1024,
            steps: 22,
            cfg: 6.0,
            novelty_target: 0.28,
            seed: SeedPolicy::Random,
            negative: DEFAULT_NEGATIVE.to_string(),
        }
    }
}

/// Genesis reference settings.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct GenesisConfig {
    /// Bootstrap only runs when enabled and a reference is set.
    pub enabled: bool,
    /// http(s) URL or local file path.
    pub reference: String,
    /// Maximum keywords taken from the genesis caption.
    pub analysis_keywords: usize,
    /// Reuse the genesis image as an image-to-image seed.
    pub use_style: bool,
    /// Image-to-image strength in (0, 1].
    pub style_strength: f64,
    /// Number of leading iterations that receive the seed image.
    pub style_iterations: u64,
}

impl Default for GenesisConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            reference: String::new(),
            analysis_keywords: 12,
            use_style: false,
            style_strength: 0.55,
            style_iterations: 3,
        }
    }
}

impl GenesisConfig {
    /// Reference to bootstrap from, if genesis is active.
    pub fn active_reference(&self) -> Option<&str> {
        if self.enabled && !self.reference.trim().is_empty() {
            Some(self.reference.trim())
        } else {
            None
        }
    }
}

/// Validated engine configuration, parsed once at startup.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct EngineConfig {
    pub initial_words: Vec<String>,
    pub banned_motifs: BTreeSet<String>,
    /// Stopwords already merged with the banned motifs.
    pub stopwords: BTreeSet<String>,
    pub style_pool: Vec<String>,
    pub novelty_motif_pool: Vec<String>,
    pub escape_motifs: Vec<String>,
    pub defaults: GenerationDefaults,
    pub genesis: GenesisConfig,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            initial_words: owned(&DEFAULT_INITIAL_WORDS),
            banned_motifs: BTreeSet::new(),
            stopwords: BTreeSet::new(),
            style_pool: vec![DEFAULT_STYLE.to_string()],
            novelty_motif_pool: owned(&DEFAULT_NOVELTY_POOL),
            escape_motifs: owned(&DEFAULT_ESCAPE_POOL),
            defaults: GenerationDefaults::default(),
            genesis: GenesisConfig::default(),
        }
    }
}

impl EngineConfig {
    /// Load and validate a sectioned JSON config file.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path)?;
        Self::from_json_str(&text)
    }

    /// Parse and validate a sectioned JSON config document.
    pub fn from_json_str(text: &str) -> Result<Self, ConfigError> {
        let raw: RawConfig = serde_json::from_str(text)?;
        let config = raw.into_config()?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.style_pool.is_empty() {
            return Err(ConfigError::invalid("style_pool", "must not be empty"));
        }
        let d = &self.defaults;
        if d.width == 0 || d.height == 0 {
            return Err(ConfigError::invalid(
                "runtime_defaults.width/height",
                format!("must be positive, got {}x{}", d.width, d.height),
            ));
        }
        if d.steps < STEPS_BOUNDS.0 || d.steps > STEPS_BOUNDS.1 {
            return Err(ConfigError::invalid(
                "runtime_defaults.steps",
                format!("{} outside [{}, {}]", d.steps, STEPS_BOUNDS.0, STEPS_BOUNDS.1),
            ));
        }
        if !(CFG_BOUNDS.0..=CFG_BOUNDS.1).contains(&d.cfg) {
            return Err(ConfigError::invalid(
                "runtime_defaults.cfg",
                format!("{} outside [{}, {}]", d.cfg, CFG_BOUNDS.0, CFG_BOUNDS.1),
            ));
        }
        if !(d.novelty_target > 0.0 && d.novelty_target < 1.0) {
            return Err(ConfigError::invalid(
                "runtime_defaults.novelty_target",
                format!("{} outside (0, 1)", d.novelty_target),
            ));
        }
        let g = &self.genesis;
        if g.enabled && g.reference.trim().is_empty() {
            return Err(ConfigError::invalid("genesis_image.url", "enabled without a url"));
        }
        if g.analysis_keywords == 0 {
            return Err(ConfigError::invalid(
                "genesis_image.analysis_keywords",
                "must be at least 1",
            ));
        }
        if !(g.style_strength > 0.0 && g.style_strength <= 1.0) {
            return Err(ConfigError::invalid(
                "genesis_image.style_strength",
                format!("{} outside (0, 1]", g.style_strength),
            ));
        }
        if !(1..=12).contains(&g.style_iterations) {
            return Err(ConfigError::invalid(
                "genesis_image.style_iterations",
                format!("{} outside [1, 12]", g.style_iterations),
            ));
        }
        Ok(())
    }

    /// True if `word` is a banned motif.
    pub fn is_banned(&self, word: &str) -> bool {
        self.banned_motifs.contains(&word.to_lowercase())
    }
}

fn owned(words: &[&str]) -> Vec<String> {
    words.iter().map(|w| w.to_string()).collect()
}

// ── On-disk representation ──────────────────────────────────────────────

/// A list section: either `{"values": [...]}` or a bare array.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum ListSection {
    Plain(Vec<Option<String>>),
    Section {
        #[serde(default)]
        values: Vec<Option<String>>,
    },
}

impl ListSection {
    fn entries(self) -> Vec<String> {
        let values = match self {
            Self::Plain(v) => v,
            Self::Section { values } => values,
        };
        values
            .into_iter()
            .flatten()
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect()
    }

    fn lowercased(self) -> Vec<String> {
        self.entries().into_iter().map(|s| s.to_lowercase()).collect()
    }
}

#[derive(Debug, Default, Deserialize)]
struct ValuesSection<T> {
    #[serde(default)]
    values: T,
}

#[derive(Debug, Default, Deserialize)]
struct RawRuntime {
    width: Option<u32>,
    height: Option<u32>,
    steps: Option<u32>,
    cfg: Option<f64>,
    novelty_target: Option<f64>,
    seed: Option<i64>,
    negative: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct RawGenesis {
    enabled: Option<bool>,
    url: Option<String>,
    analysis_keywords: Option<usize>,
    use_style: Option<bool>,
    style_strength: Option<f64>,
    style_iterations: Option<u64>,
}

#[derive(Debug, Default, Deserialize)]
struct RawConfig {
    initial_words: Option<ListSection>,
    banned_motifs: Option<ListSection>,
    stopwords: Option<ListSection>,
    style_pool: Option<ListSection>,
    novelty_motif_pool: Option<ListSection>,
    escape_motifs: Option<ListSection>,
    runtime_defaults: Option<ValuesSection<RawRuntime>>,
    genesis_image: Option<ValuesSection<RawGenesis>>,
}

fn or_default(section: Option<ListSection>, lower: bool, default: Vec<String>) -> Vec<String> {
    let parsed = match section {
        Some(s) if lower => s.lowercased(),
        Some(s) => s.entries(),
        None => Vec::new(),
    };
    if parsed.is_empty() {
        default
    } else {
        parsed
    }
}

impl RawConfig {
    fn into_config(self) -> Result<EngineConfig, ConfigError> {
        let base = EngineConfig::default();

        let banned_motifs: BTreeSet<String> = self
            .banned_motifs
            .map(ListSection::lowercased)
            .unwrap_or_default()
            .into_iter()
            .collect();
        let mut stopwords: BTreeSet<String> = self
            .stopwords
            .map(ListSection::lowercased)
            .unwrap_or_default()
            .into_iter()
            .collect();
        stopwords.extend(banned_motifs.iter().cloned());

        let runtime = self.runtime_defaults.unwrap_or_default().values;
        let d = base.defaults;
        let seed = match runtime.seed {
            Some(s) => SeedPolicy::from(s),
            None => d.seed,
        };
        let defaults = GenerationDefaults {
            width: runtime.width.unwrap_or(d.width),
            height: runtime.height.unwrap_or(d.height),
            steps: runtime.steps.unwrap_or(d.steps),
            cfg: runtime.cfg.unwrap_or(d.cfg),
            novelty_target: runtime.novelty_target.unwrap_or(d.novelty_target),
            seed,
            negative: runtime
                .negative
                .map(|n| n.trim().to_string())
                .filter(|n| !n.is_empty())
                .unwrap_or(d.negative),
        };

        let g = self.genesis_image.unwrap_or_default().values;
        let gd = base.genesis;
        let enabled = g.enabled.unwrap_or(gd.enabled);
        let genesis = GenesisConfig {
            enabled,
            reference: g.url.map(|u| u.trim().to_string()).unwrap_or_default(),
            analysis_keywords: g.analysis_keywords.unwrap_or(gd.analysis_keywords),
            use_style: g.use_style.unwrap_or(gd.use_style),
            style_strength: g.style_strength.unwrap_or(gd.style_strength),
            style_iterations: g.style_iterations.unwrap_or(gd.style_iterations),
        };

        Ok(EngineConfig {
            initial_words: or_default(self.initial_words, true, base.initial_words),
            banned_motifs,
            stopwords,
            style_pool: or_default(self.style_pool, false, base.style_pool),
            novelty_motif_pool: or_default(self.novelty_motif_pool, true, base.novelty_motif_pool),
            escape_motifs: or_default(self.escape_motifs, true, base.escape_motifs),
            defaults,
            genesis,
        })
    }
}
