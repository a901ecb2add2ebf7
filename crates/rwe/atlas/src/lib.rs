#![deny(unsafe_code)]
//! # rwe-atlas
//!
//! Visual summary of a finished run: contact sheets for a sampled
//! timeline, every cluster and every epoch, plus motif-frequency indices,
//! assembled into one paginated A4 PDF.

pub mod builder;
pub mod error;
pub mod pdf;
pub mod sheet;
pub mod wrap;

pub use builder::{
    group_by_cluster, motif_line, timeline_sample, AtlasBuilder, AtlasSummary, ATLAS_TITLE,
    MOTIF_TABLE_SIZE, SHEET_MEMBERS, TIMELINE_MAX, WRAP_WIDTH,
};
pub use error::AtlasError;
pub use pdf::{write_pdf, AtlasPage};
pub use sheet::{ContactSheet, HEADER_HEIGHT};
pub use wrap::wrap_lines;
