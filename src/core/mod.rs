//! Core text processing
//!
//! Stateless transforms shared by the speech, listening and web flows.

pub mod chunker;
pub mod punctuation;

pub use chunker::chunk;
pub use punctuation::{normalize, PunctuationNormalizer, Stage, PIPELINE};
