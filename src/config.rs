use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Main application configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    // Session log
    pub log_path: String,
    pub log_level: String,

    // Website resolution
    pub websites_path: Option<String>,
    pub min_score: f64,
    pub max_results: usize,

    // Speech output
    pub tts_engine: String,
    pub webdriver_url: String,
    pub headless: bool,
    pub tts_page_path: String,
    pub max_chunk_len: usize,

    // Transcription
    pub wyoming_host: String,
    pub wyoming_port: u16,
    pub min_confidence: f32,

    // Translation
    pub translate_url: String,
    pub translate_languages: Vec<String>,

    // Capture
    pub phrase_time_limit: f32,
    pub pause_threshold: f32,
    pub dynamic_energy_ratio: f32,
    pub mic_keywords: Vec<String>,
    pub wav_input: Option<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            log_path: data_dir().join("input.txt").to_string_lossy().to_string(),
            log_level: "INFO".to_string(),
            websites_path: None,
            min_score: 0.82,
            max_results: 5,
            tts_engine: "browser".to_string(),
            webdriver_url: "http://localhost:9515".to_string(),
            headless: true,
            tts_page_path: data_dir().join("index.html").to_string_lossy().to_string(),
            max_chunk_len: 400,
            wyoming_host: "localhost".to_string(),
            wyoming_port: 10300,
            min_confidence: 0.3,
            translate_url: "https://translate.googleapis.com/translate_a/single".to_string(),
            translate_languages: vec!["hi".to_string(), "bn".to_string()],
            phrase_time_limit: 4.0,
            pause_threshold: 0.38,
            dynamic_energy_ratio: 1.8,
            mic_keywords: ["wo mic", "phone", "usb", "bluetooth", "external", "mobile"]
                .iter()
                .map(|k| k.to_string())
                .collect(),
            wav_input: None,
        }
    }
}

impl Config {
    /// Load config from the default location, or create default
    pub fn load() -> Result<Self> {
        Self::load_from(&config_path())
    }

    /// Load config from an explicit path
    ///
    /// A corrupt file is moved aside and defaults are used instead.
    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config {}", path.display()))?;
        match serde_json::from_str(&content) {
            Ok(config) => Ok(config),
            Err(e) => {
                tracing::warn!("⚠️ Config file corrupted or invalid, using defaults: {}", e);
                let backup_path = path.with_extension("json.corrupt");
                let _ = std::fs::rename(path, &backup_path);
                Ok(Self::default())
            }
        }
    }

    /// Save config to the default location
    pub fn save(&self) -> Result<()> {
        self.save_to(&config_path())
    }

    /// Save config to an explicit path
    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let content = serde_json::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }
}

pub fn config_path() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("jarvis")
        .join("config.json")
}

fn data_dir() -> PathBuf {
    dirs::data_dir().unwrap_or_default().join("jarvis")
}
