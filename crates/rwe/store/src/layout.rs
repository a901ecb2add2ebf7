use crate::error::StoreError;
use chrono::{DateTime, TimeZone};
use std::path::{Path, PathBuf};

pub const WORLD_STATE_FILE: &str = "world_state.json";
pub const RUN_LOG_FILE: &str = "world_log.jsonl";
pub const EMBEDDINGS_DIR: &str = "embeddings";
pub const GENESIS_EMBEDDING_FILE: &str = "genesis.f32";
pub const GENESIS_SOURCE_STEM: &str = "genesis_source";
pub const GENESIS_ANALYSIS_FILE: &str = "genesis_analysis.json";
pub const CLUSTERS_FILE: &str = "clusters.json";
pub const EPOCHS_FILE: &str = "epochs.json";
pub const ATLAS_DIR: &str = "atlas";
pub const SHEETS_DIR: &str = "sheets";
pub const ATLAS_PDF_FILE: &str = "rwe_atlas.pdf";

/// File stem for an iteration artifact: `rwe_<YYYYmmdd-HHMMSS>_iter<NNNNN>`.
pub fn artifact_stem<Tz: TimeZone>(iteration: u64, at: &DateTime<Tz>) -> String
where
    Tz::Offset: std::fmt::Display,
{
    format!("rwe_{}_iter{:05}", at.format("%Y%m%d-%H%M%S"), iteration)
}

/// Where every file of one run lives, relative to the output directory.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RunLayout {
    root: PathBuf,
}

impl RunLayout {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Create the output and embeddings directories.
    pub fn create(root: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let layout = Self::new(root);
        std::fs::create_dir_all(layout.embeddings_dir())?;
        Ok(layout)
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn world_state(&self) -> PathBuf {
        self.root.join(WORLD_STATE_FILE)
    }

    pub fn run_log(&self) -> PathBuf {
        self.root.join(RUN_LOG_FILE)
    }

    pub fn embeddings_dir(&self) -> PathBuf {
        self.root.join(EMBEDDINGS_DIR)
    }

    pub fn image_path(&self, stem: &str) -> PathBuf {
        self.root.join(format!("{}.png", stem))
    }

    pub fn embedding_path(&self, stem: &str) -> PathBuf {
        self.embeddings_dir().join(format!("{}.f32", stem))
    }

    pub fn genesis_embedding(&self) -> PathBuf {
        self.embeddings_dir().join(GENESIS_EMBEDDING_FILE)
    }

    /// `genesis_source.<ext>`; `ext` is given without the dot.
    pub fn genesis_source(&self, ext: &str) -> PathBuf {
        self.root
            .join(format!("{}.{}", GENESIS_SOURCE_STEM, ext.trim_start_matches('.')))
    }

    pub fn genesis_analysis(&self) -> PathBuf {
        self.root.join(GENESIS_ANALYSIS_FILE)
    }

    pub fn clusters(&self) -> PathBuf {
        self.root.join(CLUSTERS_FILE)
    }

    pub fn epochs(&self) -> PathBuf {
        self.root.join(EPOCHS_FILE)
    }

    pub fn atlas_dir(&self) -> PathBuf {
        self.root.join(ATLAS_DIR)
    }

    pub fn sheets_dir(&self) -> PathBuf {
        self.atlas_dir().join(SHEETS_DIR)
    }

    pub fn atlas_pdf(&self) -> PathBuf {
        self.atlas_dir().join(ATLAS_PDF_FILE)
    }

    /// Resolve a path recorded in the run log.
    ///
    /// Recorded paths are relative to the working directory of the run that
    /// wrote them; when that no longer resolves, fall back to the same file
    /// name under this layout.
    pub fn resolve(&self, recorded: &str) -> PathBuf {
        let p = PathBuf::from(recorded);
        if p.is_absolute() || p.exists() {
            return p;
        }
        let Some(name) = p.file_name() else {
            return p;
        };
        let in_root = self.root.join(name);
        if in_root.exists() {
            return in_root;
        }
        let in_embeddings = self.embeddings_dir().join(name);
        if in_embeddings.exists() {
            return in_embeddings;
        }
        p
    }
}

/// Lossless-enough string form for recording a path in JSON.
pub fn path_string(path: &Path) -> String {
    path.to_string_lossy().into_owned()
}
