#![deny(unsafe_code)]
//! # rwe-mutation
//!
//! The world-mutation state machine. After every iteration the engine looks
//! at the novelty between consecutive embeddings and at the latest caption,
//! then applies exactly one of five ordered rules:
//!
//! 1. escape an interior trap (repeated indoor captions)
//! 2. bootstrap when there is no novelty signal yet
//! 3. push novelty up when it fell below the target band
//! 4. pull coherence back when novelty overshot
//! 5. micro jitter inside the band
//!
//! Every branch keeps `cfg` and `steps` within the engine-wide bounds.

pub mod engine;
pub mod interior;
pub mod types;

pub use engine::RuleMutationEngine;
pub use interior::{interior_hits, likely_interior, INTERIOR_KEYWORDS};
pub use types::{MutationOutcome, MutationPolicy, RuleKind, StyleChange, RULE_ORDER};
