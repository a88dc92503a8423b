//! Mock speech page for testing
//!
//! Records every element call and replays a scripted status sequence.

use anyhow::Result;
use async_trait::async_trait;
use jarvis::tts::UiBridge;
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

#[derive(Debug, Clone, PartialEq)]
pub enum BridgeCall {
    SetText(String, String),
    Click(String),
}

/// Status behaviour of the fake page
#[derive(Debug, Clone)]
pub enum StatusScript {
    /// Every click plays "Speaking..." then "Finished"
    Plays,
    /// Status never changes
    Stuck,
    /// Reading the status fails
    Broken,
}

pub struct MockBridge {
    pub calls: Arc<Mutex<Vec<BridgeCall>>>,
    script: StatusScript,
    pending: Mutex<VecDeque<String>>,
    status: Mutex<String>,
    /// Fail `set_text` from this call index on
    pub fail_set_text_at: Option<usize>,
    pub closed: Arc<Mutex<bool>>,
    /// Page never becomes usable
    pub fail_ready: bool,
}

impl MockBridge {
    pub fn new(script: StatusScript) -> Self {
        Self {
            calls: Arc::new(Mutex::new(Vec::new())),
            script,
            pending: Mutex::new(VecDeque::new()),
            status: Mutex::new("Idle".to_string()),
            fail_set_text_at: None,
            closed: Arc::new(Mutex::new(false)),
            fail_ready: false,
        }
    }

    pub fn not_ready(mut self) -> Self {
        self.fail_ready = true;
        self
    }

    pub fn failing_at(mut self, idx: usize) -> Self {
        self.fail_set_text_at = Some(idx);
        self
    }

    /// Text written to the input, in order
    pub fn spoken(&self) -> Vec<String> {
        self.calls
            .lock()
            .unwrap()
            .iter()
            .filter_map(|c| match c {
                BridgeCall::SetText(_, text) => Some(text.clone()),
                _ => None,
            })
            .collect()
    }
}

#[async_trait]
impl UiBridge for MockBridge {
    async fn ready(&self) -> Result<()> {
        if self.fail_ready {
            return Err(anyhow::anyhow!("no such element #button"));
        }
        Ok(())
    }

    async fn set_text(&self, id: &str, text: &str) -> Result<()> {
        let mut calls = self.calls.lock().unwrap();
        let written = calls
            .iter()
            .filter(|c| matches!(c, BridgeCall::SetText(..)))
            .count();
        if self.fail_set_text_at.is_some_and(|idx| written >= idx) {
            return Err(anyhow::anyhow!("no such element #{}", id));
        }
        calls.push(BridgeCall::SetText(id.to_string(), text.to_string()));
        Ok(())
    }

    async fn click(&self, id: &str) -> Result<()> {
        self.calls
            .lock()
            .unwrap()
            .push(BridgeCall::Click(id.to_string()));
        if let StatusScript::Plays = self.script {
            let mut pending = self.pending.lock().unwrap();
            pending.push_back("Speaking...".to_string());
            pending.push_back("Finished".to_string());
        }
        Ok(())
    }

    async fn text_of(&self, _id: &str) -> Result<String> {
        if let StatusScript::Broken = self.script {
            return Err(anyhow::anyhow!("status element missing"));
        }
        let mut status = self.status.lock().unwrap();
        if let Some(next) = self.pending.lock().unwrap().pop_front() {
            *status = next;
        }
        Ok(status.clone())
    }

    async fn close(&self) -> Result<()> {
        *self.closed.lock().unwrap() = true;
        Ok(())
    }
}
