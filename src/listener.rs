//! Speech loop
//!
//! Phrase -> transcript -> (translation) -> normalized text -> session log.

use crate::asr::{Transcriber, Transcript};
use crate::audio::PhraseSource;
use crate::config::Config;
use crate::core::PunctuationNormalizer;
use crate::session_log::SessionLog;
use crate::translate::{language_name, route, Route, Translator};
use anyhow::Result;
use std::sync::Arc;
use tracing::{debug, error, info, warn};

/// Consecutive misses that trigger a recalibration
pub const MISS_LIMIT: u32 = 4;

/// What one turn of the loop did
#[derive(Debug, Clone, PartialEq)]
pub enum TurnOutcome {
    Persisted(String),
    /// Below `min_confidence`; heard but not written
    LowConfidence(String),
    Duplicate(String),
    /// Transcriber failed or heard nothing
    Missed,
    /// Nothing left after normalization
    Empty,
    /// Writing the session log failed
    LogFailed(String),
}

#[derive(Debug, Clone)]
pub struct ListenerSettings {
    pub min_confidence: f32,
    pub translate_languages: Vec<String>,
}

impl Default for ListenerSettings {
    fn default() -> Self {
        Self {
            min_confidence: 0.3,
            translate_languages: vec!["hi".to_string(), "bn".to_string()],
        }
    }
}

impl ListenerSettings {
    pub fn from_config(config: &Config) -> Self {
        Self {
            min_confidence: config.min_confidence,
            translate_languages: config.translate_languages.clone(),
        }
    }
}

/// Quality hints printed next to the raw transcript
pub fn quality_warnings(text: &str, confidence: Option<f32>) -> Vec<String> {
    let mut warnings = Vec::new();
    if text.split_whitespace().count() == 1 && text.chars().count() < 3 {
        warnings.push("Very short - might be unclear".to_string());
    }
    // scripts without case (Devanagari, Bengali) never count as caps
    if text.chars().any(char::is_uppercase) && !text.chars().any(char::is_lowercase) {
        warnings.push("All caps - check audio quality".to_string());
    }
    if let Some(conf) = confidence {
        warnings.push(format!("conf {:.2}", conf));
    }
    warnings
}

fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

pub struct Listener {
    source: Box<dyn PhraseSource>,
    transcriber: Arc<dyn Transcriber>,
    translator: Arc<dyn Translator>,
    normalizer: PunctuationNormalizer,
    log: SessionLog,
    settings: ListenerSettings,
    miss_streak: u32,
    last_written: Option<String>,
}

impl Listener {
    pub fn new(
        source: Box<dyn PhraseSource>,
        transcriber: Arc<dyn Transcriber>,
        translator: Arc<dyn Translator>,
        log: SessionLog,
        settings: ListenerSettings,
    ) -> Self {
        Self {
            source,
            transcriber,
            translator,
            normalizer: PunctuationNormalizer::default(),
            log,
            settings,
            miss_streak: 0,
            last_written: None,
        }
    }

    pub fn miss_streak(&self) -> u32 {
        self.miss_streak
    }

    /// Run until the phrase source is exhausted
    pub async fn run(&mut self) -> Result<Vec<TurnOutcome>> {
        info!("👂 Listening with '{}'...", self.transcriber.name());
        let mut outcomes = Vec::new();
        while let Some(outcome) = self.run_turn().await? {
            outcomes.push(outcome);
        }
        info!("Phrase source exhausted, stopping");
        Ok(outcomes)
    }

    /// One phrase; `None` when the source has nothing more
    pub async fn run_turn(&mut self) -> Result<Option<TurnOutcome>> {
        let Some(clip) = self.source.next_phrase().await? else {
            return Ok(None);
        };

        debug!("Recognizing {:.2}s of audio...", clip.duration_secs());
        let transcript = match self.transcriber.transcribe(&clip).await {
            Ok(t) if !t.is_empty() => t,
            Ok(_) => {
                warn!("No speech detected or could not recognize.");
                return self.missed().await.map(Some);
            }
            Err(e) => {
                warn!("Could not understand audio: {:#}", e);
                return self.missed().await.map(Some);
            }
        };

        self.miss_streak = 0;
        Ok(Some(self.process(transcript).await))
    }

    async fn missed(&mut self) -> Result<TurnOutcome> {
        self.miss_streak += 1;
        if self.miss_streak >= MISS_LIMIT {
            info!("Re-calibrating to ambient noise (quiet please)...");
            if let Err(e) = self.source.recalibrate().await {
                warn!("Recalibration failed: {:#}", e);
            }
            self.miss_streak = 0;
        }
        Ok(TurnOutcome::Missed)
    }

    async fn process(&mut self, transcript: Transcript) -> TurnOutcome {
        let clean = collapse_whitespace(&transcript.text);

        let warnings = quality_warnings(&clean, transcript.confidence);
        if warnings.is_empty() {
            info!("RAW: {}", clean);
        } else {
            info!("RAW: {} [{}]", clean, warnings.join("] ["));
        }

        let lang = self.translator.detect(&clean).await;
        let text = match route(&lang, &self.settings.translate_languages) {
            Route::English => {
                info!("DEEP (English): {}", clean);
                clean
            }
            Route::Translate(src) => {
                let translated = self.translator.translate(&clean, &src).await;
                info!("DEEP ({} -> Eng): {}", language_name(&src), translated);
                translated
            }
            Route::Untranslated => {
                info!("DEEP (No translation): {}", clean);
                clean
            }
        };

        let normalized = self.normalizer.normalize(&text);
        info!("NORM: {}  -->  {}", text, normalized);

        if normalized.is_empty() {
            return TurnOutcome::Empty;
        }

        if let Some(conf) = transcript.confidence {
            if conf < self.settings.min_confidence {
                warn!("Skipping write (low confidence)");
                return TurnOutcome::LowConfidence(normalized);
            }
        }

        if self.last_written.as_deref() == Some(normalized.as_str()) {
            info!("Duplicate text skipped");
            return TurnOutcome::Duplicate(normalized);
        }

        match self.log.append(&normalized, None) {
            Ok(()) => {
                self.last_written = Some(normalized.clone());
                TurnOutcome::Persisted(normalized)
            }
            Err(e) => {
                error!(
                    "[LOG ERROR] There is a problem writing to {}: {:#}",
                    self.log.path().display(),
                    e
                );
                TurnOutcome::LogFailed(normalized)
            }
        }
    }
}
