#![deny(unsafe_code)]
//! # rwe-store
//!
//! Durable storage for one Reflective World Engine run directory: the
//! world-state checkpoint, the append-only run log, per-iteration images
//! and embeddings, and the derived JSON artifacts of the offline pass.

pub mod artifacts;
pub mod error;
pub mod layout;
pub mod log;
pub mod state;

pub use artifacts::{load_image, read_embedding, read_json, save_png, write_embedding, write_json};
pub use error::StoreError;
pub use layout::{artifact_stem, path_string, RunLayout};
pub use log::RunLog;
pub use state::{write_json_atomic, WorldStateStore};
