//! System fallback TTS engine

use super::TtsEngine;
use crate::core::chunk;
use crate::error::JarvisError;
use anyhow::Result;
use async_trait::async_trait;
use tokio::process::Command;
use tracing::{debug, warn};

/// Commands tried in order; each blocks until the chunk is spoken
const COMMANDS: [(&str, &[&str]); 2] = [("spd-say", &["-w"]), ("espeak-ng", &[])];

#[derive(Debug)]
pub struct SystemEngine {
    max_chunk_len: usize,
}

impl Default for SystemEngine {
    fn default() -> Self {
        Self::new(400)
    }
}

impl SystemEngine {
    pub fn new(max_chunk_len: usize) -> Self {
        Self { max_chunk_len }
    }

    async fn say(piece: &str) -> Result<()> {
        for (program, args) in COMMANDS {
            match Command::new(program).args(args).arg(piece).status().await {
                Ok(status) if status.success() => return Ok(()),
                Ok(status) => warn!("{} exited with {}", program, status),
                Err(e) => debug!("{} unavailable: {}", program, e),
            }
        }
        Err(JarvisError::Speech(
            "No system TTS command found (tried spd-say, espeak-ng)".to_string(),
        )
        .into())
    }
}

#[async_trait]
impl TtsEngine for SystemEngine {
    async fn speak(&self, text: &str) -> Result<()> {
        if text.trim().is_empty() {
            warn!("Jarvis Empty");
            return Ok(());
        }
        for piece in chunk(text, self.max_chunk_len) {
            debug!("System speaking: {}", piece);
            Self::say(&piece).await?;
        }
        Ok(())
    }

    fn name(&self) -> &str {
        "system"
    }
}
