#![deny(unsafe_code)]
//! # rwe-engine
//!
//! The Reflective World Engine loop. [`ReflectiveEngine`] runs one
//! iteration at a time: compose a prompt from the motif bank, generate,
//! caption and embed the artifact, measure novelty against the previous
//! embedding, mutate the world, then persist the artifact, the run-log
//! record and the world snapshot before the next iteration starts.
//!
//! An optional genesis bootstrap seeds a fresh run from a reference image,
//! and [`PostPass`] derives clusters, epochs and the atlas once the loop
//! has finished.

pub mod bootstrap;
pub mod engine;
pub mod error;
pub mod postpass;

pub use engine::{ReflectiveEngine, MAX_RANDOM_SEED};
pub use error::EngineError;
pub use postpass::{PostPass, PostPassReport};
