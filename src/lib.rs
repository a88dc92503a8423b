//! Jarvis Library
//!
//! Core modules for the Jarvis voice assistant front end.

pub mod asr;
pub mod audio;
pub mod config;
pub mod core;
pub mod error;
pub mod listener;
pub mod session_log;
pub mod translate;
pub mod tts;
pub mod utils;
pub mod web;
