use rwe_analysis::AnalysisError;
use rwe_atlas::AtlasError;
use rwe_capability::CapabilityError;
use rwe_genesis::GenesisError;
use rwe_store::StoreError;
use rwe_types::ConfigError;

/// Errors from the iteration loop and the offline pass.
#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),
    #[error("capability error: {0}")]
    Capability(#[from] CapabilityError),
    #[error("storage error: {0}")]
    Store(#[from] StoreError),
    #[error("genesis error: {0}")]
    Genesis(#[from] GenesisError),
    #[error("analysis error: {0}")]
    Analysis(#[from] AnalysisError),
    #[error("atlas error: {0}")]
    Atlas(#[from] AtlasError),
    #[error("embedding for iteration {0} is empty")]
    EmptyEmbedding(u64),
    #[error("embedding for iteration {iteration} has dimension {found}, previous had {expected}")]
    EmbeddingDimension {
        iteration: u64,
        expected: usize,
        found: usize,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_display() {
        let e = EngineError::EmptyEmbedding(7);
        assert!(format!("{}", e).contains('7'));
        let e: EngineError = CapabilityError::Caption("offline".into()).into();
        assert!(format!("{}", e).contains("offline"));
        let e = EngineError::EmbeddingDimension {
            iteration: 3,
            expected: 512,
            found: 768,
        };
        assert_eq!(
            e.to_string(),
            "embedding for iteration 3 has dimension 768, previous had 512"
        );
    }
}
