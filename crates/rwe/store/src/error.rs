use std::path::PathBuf;

/// Errors from durable run storage.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("storage io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("image error: {0}")]
    Image(#[from] image::ImageError),
    #[error("run log line {line} is corrupt: {reason}")]
    CorruptRecord { line: usize, reason: String },
    #[error("embedding file {path} has {len} bytes, not a whole number of f32 values")]
    CorruptEmbedding { path: PathBuf, len: u64 },
}
