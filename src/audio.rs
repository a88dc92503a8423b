//! Audio capture and phrase segmentation
//!
//! Raw 16 kHz mono samples are cut into phrases by an energy gate before
//! they reach the transcriber. Sources: a recorded WAV file, or the live
//! microphone when built with the `microphone` feature.

#[cfg(feature = "microphone")]
pub mod microphone;

use anyhow::{Context, Result};
use async_trait::async_trait;
use std::path::Path;
use tracing::{debug, info};

pub const SAMPLE_RATE: u32 = 16000;
pub const CHUNK_SIZE: usize = 1024;
/// Capture chunks per second when replaying recorded audio
const CHUNKS_PER_SEC: u32 = 16;

/// Energy floor so a perfectly silent calibration still gates noise
const MIN_THRESHOLD: f32 = 50.0;
const MAX_ENERGY_RATIO: f32 = 2.2;
const RATIO_STEP: f32 = 0.1;

/// One captured phrase
#[derive(Debug, Clone, PartialEq)]
pub struct AudioClip {
    pub samples: Vec<i16>,
    pub sample_rate: u32,
}

impl AudioClip {
    pub fn new(samples: Vec<i16>, sample_rate: u32) -> Self {
        Self {
            samples,
            sample_rate,
        }
    }

    pub fn duration_secs(&self) -> f32 {
        self.samples.len() as f32 / self.sample_rate as f32
    }

    /// Little-endian 16-bit PCM
    pub fn pcm_bytes(&self) -> Vec<u8> {
        self.samples.iter().flat_map(|s| s.to_le_bytes()).collect()
    }
}

/// Calculate audio energy (RMS)
pub fn calculate_energy(samples: &[i16]) -> f32 {
    if samples.is_empty() {
        return 0.0;
    }

    let sum: i64 = samples.iter().map(|&s| (s as i64).pow(2)).sum();
    (sum as f32 / samples.len() as f32).sqrt()
}

/// Index of the first device whose name contains a preferred keyword
pub fn pick_preferred_device(names: &[String], keywords: &[String]) -> Option<usize> {
    names.iter().position(|name| {
        let name = name.to_lowercase();
        keywords.iter().any(|k| name.contains(&k.to_lowercase()))
    })
}

/// Segmentation tuning
#[derive(Debug, Clone)]
pub struct GateSettings {
    pub sample_rate: u32,
    /// Seconds of silence that end a phrase
    pub pause_threshold: f32,
    /// Hard cap on phrase length in seconds
    pub phrase_time_limit: f32,
    /// Speech threshold as a multiple of ambient energy
    pub dynamic_energy_ratio: f32,
}

impl Default for GateSettings {
    fn default() -> Self {
        Self {
            sample_rate: SAMPLE_RATE,
            pause_threshold: 0.38,
            phrase_time_limit: 4.0,
            dynamic_energy_ratio: 1.8,
        }
    }
}

impl GateSettings {
    pub fn from_config(config: &crate::config::Config) -> Self {
        Self {
            sample_rate: SAMPLE_RATE,
            pause_threshold: config.pause_threshold,
            phrase_time_limit: config.phrase_time_limit,
            dynamic_energy_ratio: config.dynamic_energy_ratio,
        }
    }
}

/// Energy-threshold phrase segmenter
#[derive(Debug)]
pub struct EnergyGate {
    settings: GateSettings,
    ambient: f32,
    ratio: f32,
    buffer: Vec<i16>,
    silent_samples: usize,
}

impl EnergyGate {
    pub fn new(settings: GateSettings) -> Self {
        let ratio = settings.dynamic_energy_ratio;
        Self {
            settings,
            ambient: 0.0,
            ratio,
            buffer: Vec::new(),
            silent_samples: 0,
        }
    }

    /// Measure ambient noise
    pub fn calibrate(&mut self, ambient: &[i16]) {
        self.ambient = calculate_energy(ambient);
        debug!(
            "Calibrated ambient energy {:.1}, threshold {:.1}",
            self.ambient,
            self.threshold()
        );
    }

    /// Current speech threshold
    pub fn threshold(&self) -> f32 {
        (self.ambient * self.ratio).max(MIN_THRESHOLD)
    }

    pub fn ratio(&self) -> f32 {
        self.ratio
    }

    /// Demand more energy for speech after repeated misses
    pub fn boost_ratio(&mut self) {
        self.ratio = (self.ratio + RATIO_STEP).min(MAX_ENERGY_RATIO);
        info!(
            "New energy threshold: {:.1} | ratio: {:.2}",
            self.threshold(),
            self.ratio
        );
    }

    /// Feed one chunk; returns a phrase when one completes
    pub fn push(&mut self, chunk: &[i16]) -> Option<AudioClip> {
        let voiced = calculate_energy(chunk) > self.threshold();

        if self.buffer.is_empty() && !voiced {
            return None;
        }

        self.buffer.extend_from_slice(chunk);
        if voiced {
            self.silent_samples = 0;
        } else {
            self.silent_samples += chunk.len();
        }

        let rate = self.settings.sample_rate as f32;
        let pause_samples = (self.settings.pause_threshold * rate) as usize;
        let limit_samples = (self.settings.phrase_time_limit * rate) as usize;

        if self.silent_samples >= pause_samples || self.buffer.len() >= limit_samples {
            return self.take();
        }
        None
    }

    /// Whatever is buffered, e.g. at end of stream
    pub fn flush(&mut self) -> Option<AudioClip> {
        if self.buffer.is_empty() {
            None
        } else {
            self.take()
        }
    }

    fn take(&mut self) -> Option<AudioClip> {
        self.silent_samples = 0;
        let samples = std::mem::take(&mut self.buffer);
        Some(AudioClip::new(samples, self.settings.sample_rate))
    }
}

/// Producer of phrases for the listener
#[async_trait]
pub trait PhraseSource: Send {
    /// Next phrase; `None` once the source is exhausted
    async fn next_phrase(&mut self) -> Result<Option<AudioClip>>;

    /// Re-measure ambient noise after repeated misses
    async fn recalibrate(&mut self) -> Result<()>;
}

/// Phrases segmented out of a recorded WAV file
pub struct WavSource {
    samples: Vec<i16>,
    position: usize,
    chunk_len: usize,
    gate: EnergyGate,
}

impl WavSource {
    /// Load a 16-bit PCM WAV file, downmixing to mono
    pub fn open(path: &Path, settings: GateSettings) -> Result<Self> {
        let mut reader = hound::WavReader::open(path)
            .with_context(|| format!("Failed to open WAV file {}", path.display()))?;
        let spec = reader.spec();
        if spec.sample_format != hound::SampleFormat::Int || spec.bits_per_sample != 16 {
            return Err(anyhow::anyhow!(
                "Unsupported WAV format in {}: expected 16-bit PCM",
                path.display()
            ));
        }

        let interleaved: Vec<i16> = reader
            .samples::<i16>()
            .collect::<std::result::Result<_, _>>()
            .context("Failed to read WAV samples")?;
        let channels = spec.channels.max(1) as usize;
        let samples = downmix(&interleaved, channels);

        info!(
            "🎙️ Loaded {} ({:.1}s at {} Hz)",
            path.display(),
            samples.len() as f32 / spec.sample_rate as f32,
            spec.sample_rate
        );

        let settings = GateSettings {
            sample_rate: spec.sample_rate,
            ..settings
        };
        Ok(Self::from_samples(samples, settings))
    }

    /// Calibrates on the opening half second
    pub fn from_samples(samples: Vec<i16>, settings: GateSettings) -> Self {
        let mut gate = EnergyGate::new(settings.clone());
        let window = (settings.sample_rate as usize / 2).min(samples.len());
        gate.calibrate(&samples[..window]);
        Self {
            samples,
            position: 0,
            chunk_len: (settings.sample_rate / CHUNKS_PER_SEC).max(1) as usize,
            gate,
        }
    }
}

fn downmix(interleaved: &[i16], channels: usize) -> Vec<i16> {
    if channels == 1 {
        return interleaved.to_vec();
    }
    interleaved
        .chunks(channels)
        .map(|frame| (frame.iter().map(|&s| s as i32).sum::<i32>() / frame.len() as i32) as i16)
        .collect()
}

#[async_trait]
impl PhraseSource for WavSource {
    async fn next_phrase(&mut self) -> Result<Option<AudioClip>> {
        while self.position < self.samples.len() {
            let end = (self.position + self.chunk_len).min(self.samples.len());
            let chunk = &self.samples[self.position..end];
            self.position = end;
            if let Some(clip) = self.gate.push(chunk) {
                return Ok(Some(clip));
            }
        }
        Ok(self.gate.flush())
    }

    async fn recalibrate(&mut self) -> Result<()> {
        self.gate.boost_ratio();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn settings() -> GateSettings {
        GateSettings {
            sample_rate: 1000,
            pause_threshold: 0.2,
            phrase_time_limit: 1.0,
            dynamic_energy_ratio: 1.8,
        }
    }

    #[test]
    fn test_energy_calculation() {
        let silence = vec![0i16; 100];
        assert_eq!(calculate_energy(&silence), 0.0);

        let loud = vec![1000i16; 100];
        assert!((calculate_energy(&loud) - 1000.0).abs() < 0.01);
    }

    #[test]
    fn test_pcm_bytes_little_endian() {
        let clip = AudioClip::new(vec![1, -2], 16000);
        assert_eq!(clip.pcm_bytes(), vec![0x01, 0x00, 0xFE, 0xFF]);
    }

    #[test]
    fn test_pick_preferred_device() {
        let names = vec![
            "Built-in Audio".to_string(),
            "USB PnP Sound Device".to_string(),
            "Bluetooth Headset".to_string(),
        ];
        let keywords = vec!["bluetooth".to_string(), "usb".to_string()];
        assert_eq!(pick_preferred_device(&names, &keywords), Some(1));
        assert_eq!(pick_preferred_device(&names[..1], &keywords), None);
    }

    #[test]
    fn test_gate_ends_phrase_on_pause() {
        let mut gate = EnergyGate::new(settings());
        gate.calibrate(&[10i16; 100]);

        assert!(gate.push(&[0i16; 100]).is_none());
        assert!(gate.push(&[3000i16; 100]).is_none());
        assert!(gate.push(&[0i16; 100]).is_none());
        let clip = gate.push(&[0i16; 100]).expect("phrase after 0.2s of silence");
        assert_eq!(clip.samples.len(), 300);
        assert!(gate.flush().is_none());
    }

    #[test]
    fn test_gate_caps_phrase_length() {
        let mut gate = EnergyGate::new(settings());
        let mut phrases = 0;
        for _ in 0..25 {
            if gate.push(&[3000i16; 100]).is_some() {
                phrases += 1;
            }
        }
        assert_eq!(phrases, 2);
        assert_eq!(gate.flush().map(|c| c.samples.len()), Some(500));
    }

    #[test]
    fn test_boost_ratio_is_capped() {
        let mut gate = EnergyGate::new(settings());
        gate.calibrate(&[1000i16; 10]);
        for _ in 0..10 {
            gate.boost_ratio();
        }
        assert!((gate.ratio() - 2.2).abs() < 1e-6);
        assert!((gate.threshold() - 2200.0).abs() < 0.5);
    }

    #[test]
    fn test_downmix() {
        assert_eq!(downmix(&[100, 200, -100, -300], 2), vec![150, -200]);
    }

    #[tokio::test]
    async fn test_wav_source_segments_file() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("speech.wav");
        let spec = hound::WavSpec {
            channels: 1,
            sample_rate: 1000,
            bits_per_sample: 16,
            sample_format: hound::SampleFormat::Int,
        };
        let mut writer = hound::WavWriter::create(&path, spec).expect("create wav");
        let pattern = [(500, 0i16), (300, 4000), (400, 0), (200, 4000), (300, 0)];
        for (count, value) in pattern {
            for _ in 0..count {
                writer.write_sample(value).expect("write sample");
            }
        }
        writer.finalize().expect("finalize");

        let mut source = WavSource::open(&path, settings()).expect("open");
        let mut phrases = Vec::new();
        while let Some(clip) = source.next_phrase().await.expect("phrase") {
            assert_eq!(clip.sample_rate, 1000);
            phrases.push(clip);
        }
        assert_eq!(phrases.len(), 2);
    }
}
