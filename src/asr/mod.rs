//! ASR (Automatic Speech Recognition) Module
//!
//! Transcription is delegated to an external service; this module only
//! defines the narrow contract and the Wyoming client that speaks it.

pub mod wyoming;

use crate::audio::AudioClip;
use anyhow::Result;
use async_trait::async_trait;

pub use wyoming::WyomingClient;

/// Transcript with a best-effort confidence score
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Transcript {
    pub text: String,
    /// In [0, 1], when the service reports one
    pub confidence: Option<f32>,
}

impl Transcript {
    pub fn new(text: impl Into<String>, confidence: Option<f32>) -> Self {
        Self {
            text: text.into(),
            confidence,
        }
    }

    /// Empty text means the service heard nothing usable
    pub fn is_empty(&self) -> bool {
        self.text.trim().is_empty()
    }
}

/// Speech-to-text collaborator
#[async_trait]
pub trait Transcriber: Send + Sync {
    async fn transcribe(&self, clip: &AudioClip) -> Result<Transcript>;

    fn name(&self) -> &str;
}
