#![deny(unsafe_code)]
//! # rwe-motif
//!
//! Text-side helpers for the Reflective World Engine: caption keyword
//! extraction, motif frequency tables, prompt composition, and the
//! cosine novelty signal between consecutive embeddings.

pub mod keywords;
pub mod novelty;
pub mod prompt;

pub use keywords::{
    motif_counts, tokenize_keywords, MotifCount, CAPTION_KEYWORDS, TABLE_KEYWORDS_PER_CAPTION,
};
pub use novelty::{cosine_similarity, l2_normalize, novelty, NoveltySignal};
pub use prompt::{PromptComposer, PROMPT_MOTIFS};
