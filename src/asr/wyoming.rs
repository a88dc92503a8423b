//! Wyoming Protocol Client
//!
//! Wyoming events are a JSON header line, optionally followed by
//! `data_length` bytes of extra JSON data and `payload_length` bytes of
//! binary payload (raw PCM for audio chunks).
//!
//! Reference: https://github.com/rhasspy/wyoming

use super::{Transcriber, Transcript};
use crate::audio::AudioClip;
use crate::error::JarvisError;
use anyhow::{Context, Result};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tokio::io::{AsyncBufReadExt, AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt, BufReader};
use tokio::net::TcpStream;
use tracing::{debug, info, warn};

const TRANSCRIPT_TIMEOUT: Duration = Duration::from_secs(30);
/// Bytes of PCM per audio-chunk event
const CHUNK_BYTES: usize = 2048;

/// Event header line
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EventHeader {
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<serde_json::Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data_length: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub payload_length: Option<usize>,
}

/// A fully read event
#[derive(Debug, Clone)]
pub struct Event {
    pub kind: String,
    pub data: serde_json::Value,
    pub payload: Vec<u8>,
}

/// Audio format data for audio-start / audio-chunk
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AudioFormat {
    pub rate: u32,
    pub width: u8,
    pub channels: u8,
}

/// Transcript result data
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TranscriptData {
    pub text: String,
    #[serde(default)]
    pub confidence: Option<f32>,
}

/// Write one event
pub async fn write_event<W: AsyncWrite + Unpin>(
    writer: &mut W,
    kind: &str,
    data: Option<serde_json::Value>,
    payload: &[u8],
) -> Result<()> {
    let header = EventHeader {
        kind: kind.to_string(),
        data,
        data_length: None,
        payload_length: (!payload.is_empty()).then_some(payload.len()),
    };
    let mut line = serde_json::to_vec(&header)?;
    line.push(b'\n');
    writer.write_all(&line).await?;
    if !payload.is_empty() {
        writer.write_all(payload).await?;
    }
    Ok(())
}

/// Read one event; `None` at end of stream
pub async fn read_event<R: AsyncRead + Unpin>(reader: &mut BufReader<R>) -> Result<Option<Event>> {
    let mut line = String::new();
    if reader.read_line(&mut line).await? == 0 {
        return Ok(None);
    }

    let header: EventHeader =
        serde_json::from_str(line.trim()).context("Invalid Wyoming event header")?;

    let mut data = header.data.unwrap_or(serde_json::Value::Null);
    if let Some(len) = header.data_length.filter(|&len| len > 0) {
        let mut buf = vec![0u8; len];
        reader.read_exact(&mut buf).await?;
        let extra: serde_json::Value = serde_json::from_slice(&buf)?;
        data = match (data, extra) {
            (serde_json::Value::Object(mut base), serde_json::Value::Object(more)) => {
                base.extend(more);
                serde_json::Value::Object(base)
            }
            (_, extra) => extra,
        };
    }

    let mut payload = Vec::new();
    if let Some(len) = header.payload_length.filter(|&len| len > 0) {
        payload.resize(len, 0);
        reader.read_exact(&mut payload).await?;
    }

    Ok(Some(Event {
        kind: header.kind,
        data,
        payload,
    }))
}

/// Wyoming client for ASR services
pub struct WyomingClient {
    host: String,
    port: u16,
}

impl WyomingClient {
    /// Create a new Wyoming client
    pub fn new(host: &str, port: u16) -> Self {
        Self {
            host: host.to_string(),
            port,
        }
    }

    /// Check if the server is available
    pub async fn health_check(&self) -> bool {
        match TcpStream::connect((&*self.host, self.port)).await {
            Ok(_) => {
                debug!("Wyoming server available at {}:{}", self.host, self.port);
                true
            }
            Err(e) => {
                warn!("Wyoming server not available: {}", e);
                false
            }
        }
    }

    async fn send_audio<W: AsyncWrite + Unpin>(writer: &mut W, clip: &AudioClip) -> Result<()> {
        let format = serde_json::to_value(AudioFormat {
            rate: clip.sample_rate,
            width: 2,
            channels: 1,
        })?;

        write_event(writer, "transcribe", None, &[]).await?;
        write_event(writer, "audio-start", Some(format.clone()), &[]).await?;
        for chunk in clip.pcm_bytes().chunks(CHUNK_BYTES) {
            write_event(writer, "audio-chunk", Some(format.clone()), chunk).await?;
        }
        write_event(writer, "audio-stop", None, &[]).await?;
        writer.flush().await?;
        Ok(())
    }
}

#[async_trait]
impl Transcriber for WyomingClient {
    /// Sends audio to Wyoming server and returns transcript
    async fn transcribe(&self, clip: &AudioClip) -> Result<Transcript> {
        let stream = TcpStream::connect((&*self.host, self.port))
            .await
            .context("Failed to connect to Wyoming server")?;

        let (reader, mut writer) = stream.into_split();
        let mut reader = BufReader::new(reader);

        Self::send_audio(&mut writer, clip).await?;
        debug!(
            "Sent audio ({:.2}s), waiting for transcript...",
            clip.duration_secs()
        );

        let transcript = tokio::time::timeout(TRANSCRIPT_TIMEOUT, async {
            while let Some(event) = read_event(&mut reader).await? {
                if event.kind == "transcript" {
                    let data: TranscriptData = serde_json::from_value(event.data)
                        .context("Invalid transcript data")?;
                    return Ok::<_, anyhow::Error>(Transcript::new(
                        data.text.trim(),
                        data.confidence,
                    ));
                }
                debug!("Ignoring Wyoming event '{}'", event.kind);
            }
            Ok(Transcript::default())
        })
        .await
        .map_err(|_| JarvisError::Transcription("timeout waiting for transcript".to_string()))??;

        info!("📝 Wyoming transcript: '{}'", transcript.text);
        Ok(transcript)
    }

    fn name(&self) -> &str {
        "wyoming"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::net::TcpListener;

    #[tokio::test]
    async fn test_event_round_trip_with_payload() {
        let mut wire = Vec::new();
        write_event(&mut wire, "audio-chunk", Some(serde_json::json!({"rate": 16000})), &[1, 2, 3])
            .await
            .expect("write");

        let mut reader = BufReader::new(wire.as_slice());
        let event = read_event(&mut reader).await.expect("read").expect("event");
        assert_eq!(event.kind, "audio-chunk");
        assert_eq!(event.data["rate"], 16000);
        assert_eq!(event.payload, vec![1, 2, 3]);
        assert!(read_event(&mut reader).await.expect("read").is_none());
    }

    #[tokio::test]
    async fn test_read_event_merges_data_length() {
        let extra = br#"{"text":"hello"}"#;
        let wire = format!(
            "{{\"type\":\"transcript\",\"data_length\":{}}}\n{}",
            extra.len(),
            String::from_utf8_lossy(extra)
        );
        let mut reader = BufReader::new(wire.as_bytes());
        let event = read_event(&mut reader).await.expect("read").expect("event");
        assert_eq!(event.data["text"], "hello");
    }

    #[tokio::test]
    async fn test_transcribe_against_local_server() {
        let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind");
        let port = listener.local_addr().expect("addr").port();

        let server = tokio::spawn(async move {
            let (stream, _) = listener.accept().await.expect("accept");
            let (reader, mut writer) = stream.into_split();
            let mut reader = BufReader::new(reader);
            let mut audio_bytes = 0;
            while let Some(event) = read_event(&mut reader).await.expect("server read") {
                match event.kind.as_str() {
                    "audio-chunk" => audio_bytes += event.payload.len(),
                    "audio-stop" => break,
                    _ => {}
                }
            }
            let data = serde_json::json!({"text": " open youtube ", "confidence": 0.91});
            write_event(&mut writer, "transcript", Some(data), &[])
                .await
                .expect("server write");
            audio_bytes
        });

        let client = WyomingClient::new("127.0.0.1", port);
        let clip = AudioClip::new(vec![0i16; 3000], 16000);
        let transcript = client.transcribe(&clip).await.expect("transcribe");

        assert_eq!(transcript.text, "open youtube");
        assert_eq!(transcript.confidence, Some(0.91));
        assert_eq!(server.await.expect("server"), 6000);
    }

    #[tokio::test]
    async fn test_transcribe_connection_refused() {
        let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind");
        let port = listener.local_addr().expect("addr").port();
        drop(listener);

        let client = WyomingClient::new("127.0.0.1", port);
        let clip = AudioClip::new(vec![0i16; 10], 16000);
        assert!(client.transcribe(&clip).await.is_err());
    }
}
