//! Shared fakes for integration tests
//!
//! Nothing here touches the network, a browser or a microphone.

#![allow(dead_code)]

pub mod mock_asr;
pub mod mock_tts;
pub mod mock_web;

use std::path::PathBuf;
use tempfile::TempDir;

/// Temp directory holding a session log
pub struct TestContext {
    pub temp_dir: TempDir,
    pub log_path: PathBuf,
}

impl TestContext {
    pub fn new() -> Self {
        let temp_dir = tempfile::tempdir().expect("Failed to create temp dir");
        let log_path = temp_dir.path().join("data").join("input.txt");
        Self { temp_dir, log_path }
    }

    pub fn log(&self) -> jarvis::session_log::SessionLog {
        jarvis::session_log::SessionLog::new(&self.log_path)
    }

    /// Log lines without their timestamps
    pub fn log_records(&self) -> Vec<String> {
        match std::fs::read_to_string(&self.log_path) {
            Ok(content) => content
                .lines()
                .map(|line| match line.split_once(" | ") {
                    Some((_, rest)) => rest.to_string(),
                    None => line.to_string(),
                })
                .collect(),
            Err(_) => Vec::new(),
        }
    }
}
