//! W3C WebDriver bridge to the speech page
//!
//! Talks to a chromedriver-style endpoint over plain HTTP/JSON.

use super::browser::{UiBridge, BUTTON_ID};
use crate::error::JarvisError;
use anyhow::{Context, Result};
use async_trait::async_trait;
use serde_json::{json, Value};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tokio::time::{sleep, Instant};
use tracing::{debug, info, warn};

/// Element reference key defined by the W3C spec
pub const ELEMENT_KEY: &str = "element-6066-11e4-a52e-4f735466cecf";

const PAGE_HTML: &str = include_str!("../../assets/index.html");
const READY_TIMEOUT: Duration = Duration::from_secs(10);
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Write the bundled speech page to `path` unless it already exists
pub fn install_page(path: &Path) -> Result<()> {
    if path.exists() {
        return Ok(());
    }
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(path, PAGE_HTML)
        .with_context(|| format!("Failed to write speech page to {}", path.display()))?;
    info!("📄 Installed speech page at {}", path.display());
    Ok(())
}

/// New-session request body for Chrome
pub fn session_body(headless: bool) -> Value {
    let mut args = vec![
        "--autoplay-policy=no-user-gesture-required",
        "--use-fake-ui-for-media-stream",
        "--allow-file-access-from-files",
    ];
    if headless {
        args.push("--headless=new");
    }
    json!({
        "capabilities": {
            "alwaysMatch": {
                "browserName": "chrome",
                "goog:chromeOptions": { "args": args }
            }
        }
    })
}

/// Unwrap a WebDriver response, turning `{"value": {"error": ..}}` into an error
pub fn unwrap_value(body: Value) -> Result<Value> {
    let value = body.get("value").cloned().unwrap_or(Value::Null);
    if let Some(kind) = value.get("error").and_then(|e| e.as_str()) {
        let message = value
            .get("message")
            .and_then(|m| m.as_str())
            .unwrap_or_default();
        return Err(JarvisError::Speech(format!("webdriver {}: {}", kind, message)).into());
    }
    Ok(value)
}

/// Element id from a find-element response value
pub fn element_id(value: &Value) -> Option<String> {
    value
        .get(ELEMENT_KEY)
        .and_then(|id| id.as_str())
        .map(str::to_string)
}

fn file_url(path: &Path) -> String {
    let absolute: PathBuf = path.canonicalize().unwrap_or_else(|_| path.to_path_buf());
    format!("file://{}", absolute.display())
}

/// One live browser session showing the speech page
pub struct WebDriverBridge {
    client: reqwest::Client,
    base_url: String,
    session_id: String,
}

impl WebDriverBridge {
    /// Start a session and load the page
    pub async fn connect(webdriver_url: &str, page: &Path, headless: bool) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()?;
        let base_url = webdriver_url.trim_end_matches('/').to_string();

        let response = client
            .post(format!("{}/session", base_url))
            .json(&session_body(headless))
            .send()
            .await
            .with_context(|| format!("Failed to reach WebDriver at {}", base_url))?;
        let value = unwrap_value(response.json().await?)?;
        let session_id = value
            .get("sessionId")
            .and_then(|s| s.as_str())
            .context("WebDriver returned no sessionId")?
            .to_string();
        info!("🌐 WebDriver session {} started", session_id);

        let bridge = Self {
            client,
            base_url,
            session_id,
        };
        bridge
            .command("url", json!({ "url": file_url(page) }))
            .await?;
        Ok(bridge)
    }

    fn session_url(&self, path: &str) -> String {
        format!("{}/session/{}/{}", self.base_url, self.session_id, path)
    }

    async fn command(&self, path: &str, body: Value) -> Result<Value> {
        let response = self
            .client
            .post(self.session_url(path))
            .json(&body)
            .send()
            .await?;
        unwrap_value(response.json().await?)
    }

    async fn find(&self, id: &str) -> Result<String> {
        let value = self
            .command(
                "element",
                json!({ "using": "css selector", "value": format!("#{}", id) }),
            )
            .await?;
        element_id(&value).ok_or_else(|| JarvisError::Speech(format!("no element #{}", id)).into())
    }
}

#[async_trait]
impl UiBridge for WebDriverBridge {
    async fn ready(&self) -> Result<()> {
        let deadline = Instant::now() + READY_TIMEOUT;
        loop {
            match self.find(BUTTON_ID).await {
                Ok(_) => return Ok(()),
                Err(e) if Instant::now() >= deadline => return Err(e),
                Err(e) => debug!("Speech page not ready: {:#}", e),
            }
            sleep(Duration::from_millis(250)).await;
        }
    }

    async fn set_text(&self, id: &str, text: &str) -> Result<()> {
        let element = self.find(id).await?;
        self.command(&format!("element/{}/clear", element), json!({}))
            .await?;
        self.command(&format!("element/{}/value", element), json!({ "text": text }))
            .await?;
        Ok(())
    }

    async fn click(&self, id: &str) -> Result<()> {
        let element = self.find(id).await?;
        self.command(&format!("element/{}/click", element), json!({}))
            .await?;
        Ok(())
    }

    async fn text_of(&self, id: &str) -> Result<String> {
        let element = self.find(id).await?;
        let response = self
            .client
            .get(self.session_url(&format!("element/{}/text", element)))
            .send()
            .await?;
        let value = unwrap_value(response.json().await?)?;
        Ok(value.as_str().unwrap_or_default().to_string())
    }

    async fn close(&self) -> Result<()> {
        let url = format!("{}/session/{}", self.base_url, self.session_id);
        match self.client.delete(url).send().await {
            Ok(_) => info!("🛑 WebDriver session {} closed", self.session_id),
            Err(e) => warn!("Failed to close WebDriver session: {}", e),
        }
        Ok(())
    }
}
