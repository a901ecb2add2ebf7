//! CLI command implementations

pub mod offline;
pub mod run;
pub mod status;

use crate::error::CliResult;
use rwe_store::RunLayout;
use rwe_types::EngineConfig;
use std::path::PathBuf;
use tracing::debug;

/// Configuration and run directory shared by every command.
pub struct Context {
    pub config: EngineConfig,
    pub config_path: Option<PathBuf>,
    pub layout: RunLayout,
}

impl Context {
    /// Without a config path the built-in defaults apply; a given path must
    /// exist and validate.
    pub fn load(config_path: Option<PathBuf>, out: PathBuf) -> CliResult<Self> {
        let config = match &config_path {
            Some(path) => EngineConfig::from_path(path)?,
            None => {
                debug!("no config file given, using built-in defaults");
                EngineConfig::default()
            }
        };
        debug!(
            out = %out.display(),
            styles = config.style_pool.len(),
            width = config.defaults.width,
            height = config.defaults.height,
            "configuration loaded"
        );
        Ok(Self {
            config,
            config_path,
            layout: RunLayout::new(out),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::CliError;

    #[test]
    fn defaults_without_config() {
        let ctx = Context::load(None, PathBuf::from("out")).unwrap();
        assert_eq!(ctx.config, EngineConfig::default());
        assert_eq!(ctx.layout.root(), std::path::Path::new("out"));
    }

    #[test]
    fn missing_config_file_fails() {
        let err = Context::load(Some(PathBuf::from("/no/such/rwe_config.json")), "out".into());
        assert!(matches!(err, Err(CliError::Config(_))));
    }

    #[test]
    fn config_file_is_parsed() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("rwe_config.json");
        std::fs::write(&path, r#"{"style_pool": {"values": ["ink wash"]}}"#).unwrap();
        let ctx = Context::load(Some(path), dir.path().into()).unwrap();
        assert_eq!(ctx.config.style_pool, vec!["ink wash".to_string()]);
    }
}
