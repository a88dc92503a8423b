//! Mock browser launcher for testing

use anyhow::Result;
use jarvis::web::BrowserLauncher;

/// Records opened URLs; URLs in `failing` return an error
#[derive(Debug, Default)]
pub struct RecordingLauncher {
    pub opened: Vec<String>,
    pub failing: Vec<String>,
}

impl RecordingLauncher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing_on(url: &str) -> Self {
        Self {
            failing: vec![url.to_string()],
            ..Self::default()
        }
    }
}

impl BrowserLauncher for RecordingLauncher {
    fn open(&mut self, url: &str) -> Result<()> {
        if self.failing.iter().any(|u| u == url) {
            return Err(anyhow::anyhow!("launcher refused {}", url));
        }
        self.opened.push(url.to_string());
        Ok(())
    }
}
