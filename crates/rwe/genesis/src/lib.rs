#![deny(unsafe_code)]
//! # rwe-genesis
//!
//! Genesis reference handling: resolve a URL (following HTML pages to the
//! image they feature) or a local file into `genesis_source.<ext>`, and
//! describe the image for `genesis_analysis.json` (size, luma statistics,
//! dominant palette).

pub mod error;
pub mod palette;
pub mod resolve;

pub use error::GenesisError;
pub use palette::{
    analyze, dominant_colors, DominantColor, GenesisAnalysis, ImageSize, PALETTE_SAMPLE,
    PALETTE_SIZE, PALETTE_THUMB,
};
pub use resolve::{
    extract_image_url, guess_extension, is_remote, GenesisFetcher, GenesisSource, MAX_PAGE_HOPS,
};
