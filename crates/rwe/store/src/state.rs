use crate::error::StoreError;
use rwe_types::WorldState;
use serde::Serialize;
use std::io::Write;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Write pretty JSON to `path` via a sibling temp file and a rename, so a
/// crash leaves either the old or the new document, never a torn one.
pub fn write_json_atomic<T: Serialize + ?Sized>(path: &Path, value: &T) -> Result<(), StoreError> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }
    let tmp = tmp_path(path);
    {
        let mut file = std::fs::File::create(&tmp)?;
        serde_json::to_writer_pretty(&mut file, value)?;
        file.write_all(b"\n")?;
        file.sync_all()?;
    }
    std::fs::rename(&tmp, path)?;
    Ok(())
}

fn tmp_path(path: &Path) -> PathBuf {
    let mut name = path
        .file_name()
        .map(|n| n.to_os_string())
        .unwrap_or_default();
    name.push(".tmp");
    path.with_file_name(name)
}

/// Checkpoint file for the single [`WorldState`] of a run.
#[derive(Clone, Debug)]
pub struct WorldStateStore {
    path: PathBuf,
}

impl WorldStateStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn exists(&self) -> bool {
        self.path.is_file()
    }

    /// Load the last checkpoint, or `None` for a fresh run.
    pub fn load(&self) -> Result<Option<WorldState>, StoreError> {
        if !self.exists() {
            return Ok(None);
        }
        let text = std::fs::read_to_string(&self.path)?;
        let state: WorldState = serde_json::from_str(&text)?;
        debug!(path = %self.path.display(), iteration = state.iteration, "world state loaded");
        Ok(Some(state))
    }

    pub fn save(&self, state: &WorldState) -> Result<(), StoreError> {
        write_json_atomic(&self.path, state)?;
        debug!(path = %self.path.display(), iteration = state.iteration, "world state saved");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rwe_types::EngineConfig;

    #[test]
    fn missing_file_loads_none() {
        let dir = tempfile::tempdir().unwrap();
        let store = WorldStateStore::new(dir.path().join("world_state.json"));
        assert!(store.load().unwrap().is_none());
    }

    #[test]
    fn save_then_load() {
        let dir = tempfile::tempdir().unwrap();
        let store = WorldStateStore::new(dir.path().join("world_state.json"));
        let mut w = WorldState::new(&EngineConfig::default());
        w.iteration = 12;
        w.interior_strikes = 1;
        store.save(&w).unwrap();
        assert_eq!(store.load().unwrap(), Some(w));
        assert!(!dir.path().join("world_state.json.tmp").exists());
    }

    #[test]
    fn legacy_snapshot_gets_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("world_state.json");
        let legacy = serde_json::json!({
            "iteration": 3,
            "motif_bank": ["mirror", "glyph"],
            "prompt_style": "ink",
            "negative": "blurry",
            "width": 512,
            "height": 512,
            "steps": 22,
            "cfg": 6.0,
            "novelty_target": 0.28,
            "seed": -1
        });
        std::fs::write(&path, legacy.to_string()).unwrap();
        let w = WorldStateStore::new(&path).load().unwrap().unwrap();
        assert_eq!(w.interior_strikes, 0);
        assert_eq!(w.style_index, 0);
        assert_eq!(w.backend, "auto");
        assert_eq!(w.motif_bank.len(), 2);
    }

    #[test]
    fn garbage_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("world_state.json");
        std::fs::write(&path, "{not json").unwrap();
        assert!(matches!(WorldStateStore::new(&path).load(), Err(StoreError::Json(_))));
    }
}
