#![deny(unsafe_code)]
//! # rwe-capability
//!
//! The three external capabilities the Reflective World Engine consumes:
//! image generation (optionally image-to-image), captioning and embedding.
//!
//! Each is an async trait so the engine can run against a remote model
//! service ([`HttpModelService`]), deterministic in-process stand-ins
//! ([`SimulatedGenerator`], [`SimulatedCaptioner`], [`SimulatedEmbedder`]),
//! or always-failing variants used to exercise fatal paths.

pub mod error;
pub mod http;
pub mod simulated;
pub mod traits;

pub use error::CapabilityError;
pub use http::{decode_image, encode_png, HttpModelService};
pub use simulated::{
    FailingCaptioner, FailingEmbedder, FailingGenerator, SimulatedCaptioner, SimulatedEmbedder,
    SimulatedGenerator, SIMULATED_GRID,
};
pub use traits::{
    Capabilities, Captioner, Embedder, GenerationRequest, ImageGenerator, InitImage,
};
