#![deny(unsafe_code)]
//! # rwe-types
//!
//! Shared data model for the Reflective World Engine:
//!
//! - [`EngineConfig`]: validated configuration, parsed once at startup
//! - [`WorldState`]: the control variables mutated after every iteration
//! - [`MotifBank`]: ordered, bounded motif collection embedded in the world
//! - [`IterationRecord`]: one append-only run-log line
//! - [`ClusterReport`] / [`Epoch`]: derived, read-only analysis artifacts

pub mod config;
pub mod derived;
pub mod error;
pub mod motif;
pub mod record;
pub mod world;

pub use config::{EngineConfig, GenerationDefaults, GenesisConfig, DEFAULT_NEGATIVE};
pub use derived::{ClusterCount, ClusterItem, ClusterReport, Epoch, EpochReport, CLUSTER_METHOD};
pub use error::ConfigError;
pub use motif::{MotifBank, MOTIF_CAPACITY};
pub use record::{GenerationParams, IterationRecord, GENESIS_BACKEND, GENESIS_TAG};
pub use world::{SeedPolicy, WorldState, CFG_BOUNDS, STEPS_BOUNDS};
