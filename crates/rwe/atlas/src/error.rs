use rwe_store::StoreError;

/// Errors from atlas assembly.
#[derive(Debug, thiserror::Error)]
pub enum AtlasError {
    #[error("no readable images for {0}")]
    NoImages(String),
    #[error("cluster report has no items")]
    EmptyClusters,
    #[error("atlas io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("atlas image error: {0}")]
    Image(#[from] image::ImageError),
    #[error("unusable font {0}")]
    Font(String),
    #[error("pdf error: {0}")]
    Pdf(String),
    #[error("storage error: {0}")]
    Store(#[from] StoreError),
}
