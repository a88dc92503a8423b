//! Mock transcription side for testing
//!
//! Scripted phrases, transcripts and translations.

use anyhow::Result;
use async_trait::async_trait;
use jarvis::asr::{Transcriber, Transcript};
use jarvis::audio::{AudioClip, PhraseSource};
use jarvis::translate::Translator;
use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex};

/// Yields `count` silent phrases, then ends
pub struct ScriptedPhrases {
    remaining: usize,
    pub recalibrations: Arc<Mutex<usize>>,
}

impl ScriptedPhrases {
    pub fn new(count: usize) -> Self {
        Self {
            remaining: count,
            recalibrations: Arc::new(Mutex::new(0)),
        }
    }
}

#[async_trait]
impl PhraseSource for ScriptedPhrases {
    async fn next_phrase(&mut self) -> Result<Option<AudioClip>> {
        if self.remaining == 0 {
            return Ok(None);
        }
        self.remaining -= 1;
        Ok(Some(AudioClip::new(vec![0i16; 160], 16000)))
    }

    async fn recalibrate(&mut self) -> Result<()> {
        *self.recalibrations.lock().unwrap() += 1;
        Ok(())
    }
}

/// Returns queued transcripts; `Err` entries simulate service failures
pub struct MockTranscriber {
    responses: Mutex<VecDeque<Result<Transcript, String>>>,
    pub calls: Arc<Mutex<usize>>,
}

impl MockTranscriber {
    pub fn new(responses: Vec<Result<Transcript, String>>) -> Self {
        Self {
            responses: Mutex::new(responses.into()),
            calls: Arc::new(Mutex::new(0)),
        }
    }

    pub fn heard(text: &str, confidence: Option<f32>) -> Result<Transcript, String> {
        Ok(Transcript::new(text, confidence))
    }

    pub fn failure() -> Result<Transcript, String> {
        Err("service unavailable".to_string())
    }
}

#[async_trait]
impl Transcriber for MockTranscriber {
    async fn transcribe(&self, _clip: &AudioClip) -> Result<Transcript> {
        *self.calls.lock().unwrap() += 1;
        match self.responses.lock().unwrap().pop_front() {
            Some(Ok(t)) => Ok(t),
            Some(Err(e)) => Err(anyhow::anyhow!(e)),
            None => Ok(Transcript::default()),
        }
    }

    fn name(&self) -> &str {
        "mock"
    }
}

/// Fixed detections and translations
#[derive(Default)]
pub struct MockTranslator {
    pub languages: HashMap<String, String>,
    pub translations: HashMap<String, String>,
    pub translated: Arc<Mutex<Vec<(String, String)>>>,
}

impl MockTranslator {
    pub fn with(mut self, text: &str, lang: &str, english: Option<&str>) -> Self {
        self.languages.insert(text.to_string(), lang.to_string());
        if let Some(english) = english {
            self.translations.insert(text.to_string(), english.to_string());
        }
        self
    }
}

#[async_trait]
impl Translator for MockTranslator {
    async fn detect(&self, text: &str) -> String {
        self.languages
            .get(text)
            .cloned()
            .unwrap_or_else(|| "en".to_string())
    }

    async fn translate(&self, text: &str, src_lang: &str) -> String {
        self.translated
            .lock()
            .unwrap()
            .push((text.to_string(), src_lang.to_string()));
        self.translations
            .get(text)
            .cloned()
            .unwrap_or_else(|| text.to_string())
    }
}
