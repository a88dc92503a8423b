//! Language detection and translation to English
//!
//! Both calls are best effort: detection yields an empty code and
//! translation yields the input unchanged whenever the service fails.

use crate::error::JarvisError;
use anyhow::{Context, Result};
use async_trait::async_trait;
use std::time::Duration;
use tracing::{debug, warn};

/// Translation collaborator
#[async_trait]
pub trait Translator: Send + Sync {
    /// Language code of `text`, or "" when unknown
    async fn detect(&self, text: &str) -> String;

    /// `text` in English, or `text` itself on failure
    async fn translate(&self, text: &str, src_lang: &str) -> String;
}

/// What to do with a transcript in a detected language
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Route {
    English,
    Translate(String),
    Untranslated,
}

/// Route `lang`: "en" passes, configured languages translate, others stay as heard
pub fn route(lang: &str, translate_languages: &[String]) -> Route {
    if lang == "en" {
        Route::English
    } else if !lang.is_empty() && translate_languages.iter().any(|l| l == lang) {
        Route::Translate(lang.to_string())
    } else {
        Route::Untranslated
    }
}

/// Display name for the languages the assistant routes by default
pub fn language_name(code: &str) -> &str {
    match code {
        "hi" => "Hindi",
        "bn" => "Bengali",
        "en" => "English",
        other => other,
    }
}

/// Client for Google's public `translate_a/single` endpoint
#[derive(Debug, Clone)]
pub struct GoogleTranslator {
    url: String,
    client: reqwest::Client,
}

impl GoogleTranslator {
    pub fn new(url: &str) -> Self {
        Self {
            url: url.to_string(),
            client: reqwest::Client::new(),
        }
    }

    async fn query(&self, text: &str, src_lang: &str) -> Result<serde_json::Value> {
        let url = format!(
            "{}?client=gtx&sl={}&tl=en&dt=t&q={}",
            self.url,
            urlencoding::encode(src_lang),
            urlencoding::encode(text)
        );

        let response = self
            .client
            .get(url)
            .timeout(Duration::from_secs(10))
            .send()
            .await
            .context("Translation request failed")?;

        let status = response.status();
        if !status.is_success() {
            return Err(
                JarvisError::Translation(format!("service returned {}", status)).into(),
            );
        }

        response
            .json::<serde_json::Value>()
            .await
            .context("Invalid translation response")
    }
}

/// Joined translated segments of a `translate_a/single` response
pub fn parse_translation(body: &serde_json::Value) -> Option<String> {
    let segments = body.get(0)?.as_array()?;
    let text: String = segments
        .iter()
        .filter_map(|seg| seg.get(0).and_then(|s| s.as_str()))
        .collect();
    (!text.is_empty()).then_some(text)
}

/// Detected source language of a `translate_a/single` response
pub fn parse_detected_language(body: &serde_json::Value) -> Option<String> {
    body.get(2)
        .and_then(|l| l.as_str())
        .filter(|l| !l.is_empty())
        .map(str::to_string)
}

#[async_trait]
impl Translator for GoogleTranslator {
    async fn detect(&self, text: &str) -> String {
        match self.query(text, "auto").await {
            Ok(body) => parse_detected_language(&body).unwrap_or_default(),
            Err(e) => {
                warn!("Language detection error: {:#}", e);
                String::new()
            }
        }
    }

    async fn translate(&self, text: &str, src_lang: &str) -> String {
        match self.query(text, src_lang).await {
            Ok(body) => match parse_translation(&body) {
                Some(translated) => {
                    debug!("Translated ({} -> en): {}", src_lang, translated);
                    translated
                }
                None => {
                    warn!("Translation error ({} -> en): empty response", src_lang);
                    text.to_string()
                }
            },
            Err(e) => {
                warn!("Translation error ({} -> en): {:#}", src_lang, e);
                text.to_string()
            }
        }
    }
}

/// Treats everything as English
#[derive(Debug, Default, Clone)]
pub struct NoopTranslator;

#[async_trait]
impl Translator for NoopTranslator {
    async fn detect(&self, _text: &str) -> String {
        "en".to_string()
    }

    async fn translate(&self, text: &str, _src_lang: &str) -> String {
        text.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_route() {
        let langs = vec!["hi".to_string(), "bn".to_string()];
        assert_eq!(route("en", &langs), Route::English);
        assert_eq!(route("hi", &langs), Route::Translate("hi".into()));
        assert_eq!(route("bn", &langs), Route::Translate("bn".into()));
        assert_eq!(route("fr", &langs), Route::Untranslated);
        assert_eq!(route("", &langs), Route::Untranslated);
    }

    #[test]
    fn test_parse_response() {
        let body = serde_json::json!([
            [["Open ", "YouTube kholo", null], ["the browser", "browser", null]],
            null,
            "hi"
        ]);
        assert_eq!(parse_translation(&body).as_deref(), Some("Open the browser"));
        assert_eq!(parse_detected_language(&body).as_deref(), Some("hi"));
    }

    #[test]
    fn test_parse_malformed_response() {
        let body = serde_json::json!({"error": "quota"});
        assert_eq!(parse_translation(&body), None);
        assert_eq!(parse_detected_language(&body), None);
    }

    #[tokio::test]
    async fn test_unreachable_service_falls_back() {
        // nothing listens on port 9 locally
        let translator = GoogleTranslator::new("http://127.0.0.1:9/translate_a/single");
        assert_eq!(translator.detect("namaste").await, "");
        assert_eq!(translator.translate("namaste", "hi").await, "namaste");
    }

    #[tokio::test]
    async fn test_error_status_is_a_translation_error() {
        use tokio::io::{AsyncReadExt, AsyncWriteExt};

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.expect("bind");
        let port = listener.local_addr().expect("addr").port();
        tokio::spawn(async move {
            while let Ok((mut stream, _)) = listener.accept().await {
                let mut buf = [0u8; 1024];
                let _ = stream.read(&mut buf).await;
                let _ = stream
                    .write_all(b"HTTP/1.1 500 Internal Server Error\r\ncontent-length: 0\r\nconnection: close\r\n\r\n")
                    .await;
            }
        });

        let translator =
            GoogleTranslator::new(&format!("http://127.0.0.1:{}/translate_a/single", port));
        let err = translator.query("namaste", "hi").await.unwrap_err();
        assert!(matches!(
            err.downcast_ref::<JarvisError>(),
            Some(JarvisError::Translation(msg)) if msg.contains("500")
        ));
        assert_eq!(translator.translate("namaste", "hi").await, "namaste");
    }
}
