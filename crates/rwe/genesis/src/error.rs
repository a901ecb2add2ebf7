use rwe_analysis::AnalysisError;
use rwe_store::StoreError;

/// Errors from resolving, fetching or analysing a genesis reference.
#[derive(Debug, thiserror::Error)]
pub enum GenesisError {
    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),
    #[error("GET {url} returned {status}")]
    Status { url: String, status: u16 },
    #[error("invalid genesis url `{0}`")]
    InvalidUrl(String),
    #[error("page {0} did not reference an image")]
    NoImageInPage(String),
    #[error("gave up after {0} page hops without reaching an image")]
    TooManyHops(usize),
    #[error("genesis file {0} not found")]
    NotFound(String),
    #[error("genesis io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("genesis image error: {0}")]
    Image(#[from] image::ImageError),
    #[error("storage error: {0}")]
    Store(#[from] StoreError),
    #[error("palette analysis failed: {0}")]
    Analysis(#[from] AnalysisError),
}
