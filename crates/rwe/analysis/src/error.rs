use rwe_store::StoreError;

/// Errors from the offline analysis stages.
#[derive(Debug, thiserror::Error)]
pub enum AnalysisError {
    #[error("run log is missing or empty")]
    EmptyRunLog,
    #[error("not enough data: need at least {needed}, found {found}")]
    InsufficientData { needed: usize, found: usize },
    #[error("cannot fit {k} clusters to {n} points")]
    InvalidK { k: usize, n: usize },
    #[error("embedding for iteration {iteration} has dimension {found}, expected {expected}")]
    DimensionMismatch {
        iteration: u64,
        expected: usize,
        found: usize,
    },
    #[error("storage error: {0}")]
    Store(#[from] StoreError),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn insufficient_display() {
        let e = AnalysisError::InsufficientData { needed: 2, found: 1 };
        assert!(format!("{}", e).contains("need at least 2"));
    }

    #[test]
    fn empty_log_display() {
        assert!(format!("{}", AnalysisError::EmptyRunLog).contains("empty"));
    }
}
