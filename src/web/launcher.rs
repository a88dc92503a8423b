//! System browser launcher

use crate::error::JarvisError;
use anyhow::Result;
use std::process::{Command, Stdio};
use tracing::debug;

/// Opens URLs in the operator's browser
pub trait BrowserLauncher {
    fn open(&mut self, url: &str) -> Result<()>;
}

/// Hands URLs to the platform opener (`xdg-open`, `open`, `start`)
#[derive(Debug, Default)]
pub struct SystemLauncher;

impl SystemLauncher {
    pub fn new() -> Self {
        Self
    }

    fn command(url: &str) -> Command {
        if cfg!(target_os = "windows") {
            let mut cmd = Command::new("cmd");
            cmd.args(["/C", "start", "", url]);
            cmd
        } else if cfg!(target_os = "macos") {
            let mut cmd = Command::new("open");
            cmd.arg(url);
            cmd
        } else {
            let mut cmd = Command::new("xdg-open");
            cmd.arg(url);
            cmd
        }
    }
}

impl BrowserLauncher for SystemLauncher {
    fn open(&mut self, url: &str) -> Result<()> {
        debug!("Opening {}", url);
        Self::command(url)
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .spawn()
            .map_err(|e| JarvisError::Browser(format!("{} for {}", e, url)))?;
        Ok(())
    }
}
