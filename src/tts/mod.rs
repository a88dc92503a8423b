//! TTS (Text-to-Speech) Module
//!
//! Speech output goes through a browser page driven over WebDriver, with a
//! local speech-dispatcher fallback.

use crate::config::Config;
use anyhow::Result;
use async_trait::async_trait;
use std::path::Path;
use std::sync::Arc;
use tracing::{info, warn};

pub mod browser;
pub mod system;
pub mod webdriver;

pub use browser::{fallback_delay, BrowserSpeaker, SpeakTiming, UiBridge};
pub use system::SystemEngine;
pub use webdriver::WebDriverBridge;

/// Trait for TTS engines
#[async_trait]
pub trait TtsEngine: Send + Sync {
    /// Speak the given text
    async fn speak(&self, text: &str) -> Result<()>;

    /// Get the engine name
    fn name(&self) -> &str;

    /// Release external resources (browser sessions, ...)
    async fn shutdown(&self) -> Result<()> {
        Ok(())
    }
}

/// Speak several messages in order, reporting progress
///
/// A failed message is logged and the rest still play.
pub async fn speak_messages(engine: &dyn TtsEngine, messages: &[String]) {
    let total = messages.len();
    for (idx, message) in messages.iter().enumerate() {
        info!("[Jarvis] Message {}/{}", idx + 1, total);
        if let Err(e) = engine.speak(message).await {
            warn!("⚠️ Message {}/{} not spoken: {:#}", idx + 1, total, e);
        }
    }
}

/// Factory to create the configured TTS engine
pub async fn create_engine(config: &Config) -> Result<Arc<dyn TtsEngine>> {
    info!("🛠️ Creating TTS engine: {}", config.tts_engine);
    let engine: Arc<dyn TtsEngine> = match config.tts_engine.as_str() {
        "browser" => {
            let page = Path::new(&config.tts_page_path);
            webdriver::install_page(page)?;
            let bridge =
                WebDriverBridge::connect(&config.webdriver_url, page, config.headless).await?;
            Arc::new(BrowserSpeaker::new(bridge, config.max_chunk_len))
        }
        "system" => {
            info!("  - Using System TTS Fallback");
            Arc::new(SystemEngine::new(config.max_chunk_len))
        }
        _ => {
            warn!(
                "  - Unknown engine '{}', falling back to System",
                config.tts_engine
            );
            Arc::new(SystemEngine::new(config.max_chunk_len))
        }
    };
    info!("✅ TTS engine '{}' initialized", engine.name());
    Ok(engine)
}
