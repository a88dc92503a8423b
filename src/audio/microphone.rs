//! Live microphone capture using cpal

use super::{
    calculate_energy, pick_preferred_device, AudioClip, EnergyGate, GateSettings, PhraseSource,
    CHUNK_SIZE, SAMPLE_RATE,
};
use anyhow::{Context, Result};
use async_trait::async_trait;
use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use std::time::Duration;
use tokio::sync::mpsc::{self, UnboundedReceiver};
use tracing::{debug, info, warn};

const CALIBRATION: Duration = Duration::from_millis(1000);
const RECALIBRATION: Duration = Duration::from_millis(800);

/// Microphone phrase source
pub struct MicrophoneSource {
    rx: UnboundedReceiver<Vec<i16>>,
    gate: EnergyGate,
}

/// Start capture on the preferred input device and return a receiver for audio chunks
pub fn start_capture(keywords: &[String]) -> Result<UnboundedReceiver<Vec<i16>>> {
    let host = cpal::default_host();

    let devices: Vec<cpal::Device> = host.input_devices()?.collect();
    let names: Vec<String> = devices
        .iter()
        .map(|d| d.name().unwrap_or_else(|_| "Unknown".to_string()))
        .collect();

    info!("Available audio input devices:");
    for (i, name) in names.iter().enumerate() {
        info!("  [{}] {}", i, name);
    }

    let device = match pick_preferred_device(&names, keywords) {
        Some(idx) => {
            info!("Using microphone: {}", names[idx]);
            devices
                .into_iter()
                .nth(idx)
                .context("Device index out of range")?
        }
        None => {
            info!("Using default microphone");
            host.default_input_device()
                .context("No default input device")?
        }
    };

    let config = cpal::StreamConfig {
        channels: 1,
        sample_rate: cpal::SampleRate(SAMPLE_RATE),
        buffer_size: cpal::BufferSize::Fixed(CHUNK_SIZE as u32),
    };

    let (tx, rx) = mpsc::unbounded_channel();
    let stream = device.build_input_stream(
        &config,
        move |data: &[i16], _: &cpal::InputCallbackInfo| {
            if tx.send(data.to_vec()).is_err() {
                warn!("Audio receiver dropped");
            }
        },
        |err| {
            warn!("Audio stream error: {}", err);
        },
        None,
    )?;
    stream.play()?;
    // cpal streams are not Send; the capture runs for the rest of the process
    std::mem::forget(stream);

    Ok(rx)
}

impl MicrophoneSource {
    /// Open the preferred input device and calibrate to ambient noise
    pub async fn open(keywords: &[String], settings: GateSettings) -> Result<Self> {
        let rx = start_capture(keywords)?;
        let mut source = Self {
            rx,
            gate: EnergyGate::new(GateSettings {
                sample_rate: SAMPLE_RATE,
                ..settings
            }),
        };

        info!("Calibrating microphone... Please be silent.");
        source.calibrate_for(CALIBRATION).await?;
        info!("Calibrated energy threshold: {:.1}", source.gate.threshold());
        Ok(source)
    }

    async fn calibrate_for(&mut self, window: Duration) -> Result<()> {
        let wanted = (SAMPLE_RATE as f32 * window.as_secs_f32()) as usize;
        let mut ambient = Vec::with_capacity(wanted);
        while ambient.len() < wanted {
            let chunk = self
                .rx
                .recv()
                .await
                .ok_or_else(|| anyhow::anyhow!("Microphone stream closed"))?;
            ambient.extend_from_slice(&chunk);
        }
        debug!("Ambient energy: {:.1}", calculate_energy(&ambient));
        self.gate.calibrate(&ambient);
        Ok(())
    }
}

#[async_trait]
impl PhraseSource for MicrophoneSource {
    async fn next_phrase(&mut self) -> Result<Option<AudioClip>> {
        while let Some(chunk) = self.rx.recv().await {
            if let Some(clip) = self.gate.push(&chunk) {
                return Ok(Some(clip));
            }
        }
        Ok(self.gate.flush())
    }

    async fn recalibrate(&mut self) -> Result<()> {
        info!("Re-calibrating to ambient noise (quiet please)...");
        self.calibrate_for(RECALIBRATION).await?;
        self.gate.boost_ratio();
        Ok(())
    }
}
