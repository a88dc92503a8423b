//! Append-only session log
//!
//! Every heard or typed utterance ends up here as one timestamped line.
//! The file is opened, written and closed per record.

use anyhow::{Context, Result};
use std::fs::OpenOptions;
use std::io::Write;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone)]
pub struct SessionLog {
    path: PathBuf,
}

impl SessionLog {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Append one record: `<ts> | DEEP: <text>` with an optional `| True/False` suffix
    pub fn append(&self, text: &str, success: Option<bool>) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }

        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .with_context(|| format!("Failed to open session log {}", self.path.display()))?;

        writeln!(file, "{}", format_record(&timestamp(), text, success))?;
        Ok(())
    }
}

fn timestamp() -> String {
    chrono::Local::now().format("%Y-%m-%d %H:%M:%S").to_string()
}

fn format_record(timestamp: &str, text: &str, success: Option<bool>) -> String {
    match success {
        Some(flag) => {
            let flag = if flag { "True" } else { "False" };
            format!("{} | DEEP: {} | {}", timestamp, text, flag)
        }
        None => format!("{} | DEEP: {}", timestamp, text),
    }
}
