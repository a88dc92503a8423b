//! Browser TTS bridge
//!
//! A local page does the actual speaking. We write each chunk into its
//! "text" input, click "button", and watch the "status" element move
//! through "Speaking..." to "Finished" (or "Stopped").

use super::TtsEngine;
use crate::core::chunk;
use crate::error::JarvisError;
use anyhow::Result;
use async_trait::async_trait;
use std::time::Duration;
use tokio::time::{sleep, Instant};
use tracing::{debug, error, info, warn};

pub const TEXT_ID: &str = "text";
pub const BUTTON_ID: &str = "button";
pub const STATUS_ID: &str = "status";

/// Element-level access to the speech page
#[async_trait]
pub trait UiBridge: Send + Sync {
    /// Wait until the page's controls are usable
    async fn ready(&self) -> Result<()> {
        Ok(())
    }

    /// Replace the content of an input element
    async fn set_text(&self, id: &str, text: &str) -> Result<()>;

    async fn click(&self, id: &str) -> Result<()>;

    /// Visible text of an element
    async fn text_of(&self, id: &str) -> Result<String>;

    async fn close(&self) -> Result<()> {
        Ok(())
    }
}

/// Wait windows and the sleep estimate used when status polling fails
#[derive(Debug, Clone)]
pub struct SpeakTiming {
    pub start_wait: Duration,
    pub finish_wait: Duration,
    pub poll_interval: Duration,
    pub base_delay: f32,
    pub per_char: f32,
    pub last_chunk_extra: f32,
    pub max_delay: f32,
}

impl Default for SpeakTiming {
    fn default() -> Self {
        Self {
            start_wait: Duration::from_secs(2),
            finish_wait: Duration::from_secs(60),
            poll_interval: Duration::from_millis(100),
            base_delay: 0.8,
            // ~18 chars/sec
            per_char: 0.055,
            last_chunk_extra: 2.5,
            max_delay: 20.0,
        }
    }
}

/// Estimated playback time of a chunk
pub fn fallback_delay(chunk_len: usize, is_last: bool, timing: &SpeakTiming) -> Duration {
    let mut secs = timing.base_delay + chunk_len as f32 * timing.per_char;
    if is_last {
        secs += timing.last_chunk_extra;
    }
    Duration::from_secs_f32(secs.min(timing.max_delay))
}

/// Speaks through any [`UiBridge`]
pub struct BrowserSpeaker<B> {
    bridge: B,
    max_chunk_len: usize,
    timing: SpeakTiming,
}

impl<B: UiBridge> BrowserSpeaker<B> {
    pub fn new(bridge: B, max_chunk_len: usize) -> Self {
        Self::with_timing(bridge, max_chunk_len, SpeakTiming::default())
    }

    pub fn with_timing(bridge: B, max_chunk_len: usize, timing: SpeakTiming) -> Self {
        Self {
            bridge,
            max_chunk_len,
            timing,
        }
    }

    pub fn bridge(&self) -> &B {
        &self.bridge
    }

    /// Poll the status element until `done` holds or `window` elapses
    async fn wait_status(&self, window: Duration, done: impl Fn(&str) -> bool) -> Result<()> {
        let deadline = Instant::now() + window;
        loop {
            let status = self.bridge.text_of(STATUS_ID).await?;
            if done(&status) {
                return Ok(());
            }
            if Instant::now() >= deadline {
                return Err(JarvisError::Speech(format!(
                    "status stuck at '{}' after {:?}",
                    status, window
                ))
                .into());
            }
            sleep(self.timing.poll_interval).await;
        }
    }

    /// Wait for one chunk to play, by status or by estimate
    async fn wait_for_playback(&self, chunk: &str, is_last: bool) {
        let watched = async {
            self.wait_status(self.timing.start_wait, |s| s.contains("Speaking"))
                .await?;
            self.wait_status(self.timing.finish_wait, |s| {
                s.contains("Finished") || s.contains("Stopped")
            })
            .await
        };

        if let Err(e) = watched.await {
            let delay = fallback_delay(chunk.chars().count(), is_last, &self.timing);
            debug!("Status polling failed ({:#}), sleeping {:?}", e, delay);
            sleep(delay).await;
        }
    }
}

#[async_trait]
impl<B: UiBridge> TtsEngine for BrowserSpeaker<B> {
    async fn speak(&self, text: &str) -> Result<()> {
        if text.trim().is_empty() {
            warn!("Jarvis Empty");
            return Ok(());
        }

        let chunks = chunk(text, self.max_chunk_len);

        if let Err(e) = self.bridge.ready().await {
            error!("❌ Jarvis Error: {:#}", e);
            return Err(e);
        }

        let total = chunks.len();
        for (idx, piece) in chunks.iter().enumerate() {
            let sent = async {
                self.bridge.set_text(TEXT_ID, piece).await?;
                info!("[Jarvis]: {}", piece);
                self.bridge.click(BUTTON_ID).await
            };
            if let Err(e) = sent.await {
                error!("❌ Jarvis Error chunk {}: {:#}", idx + 1, e);
                return Err(e);
            }

            self.wait_for_playback(piece, idx + 1 == total).await;
        }

        Ok(())
    }

    fn name(&self) -> &str {
        "browser"
    }

    async fn shutdown(&self) -> Result<()> {
        self.bridge.close().await
    }
}
