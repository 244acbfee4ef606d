//! Configuration management for the normalizer and feature extractor
//!
//! This module provides runtime configuration loading from JSON files so
//! framing and normalization parameters can be tuned without recompiling.
//! Unlike calibration parameters, a missing or malformed config file is not
//! fatal: the engine falls back to the defaults below.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// Complete engine configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub normalizer: NormalizerConfig,
    #[serde(default)]
    pub features: FeatureConfig,
}

/// How an over-long waveform is cut down to the target duration
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TrimStrategy {
    /// Keep the middle window; pad short input evenly on both sides
    #[default]
    Center,
    /// Keep the highest-energy window (30% overlap scan)
    Loudest,
}

/// Waveform normalization parameters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NormalizerConfig {
    /// Output sample rate in Hz
    pub target_sample_rate: u32,
    /// Output duration in seconds
    pub target_duration_secs: f32,
    /// Inputs shorter than this are rejected
    pub min_duration_secs: f32,
    /// Inputs with RMS below this are rejected as silent
    pub silence_rms_floor: f32,
    #[serde(default)]
    pub trim: TrimStrategy,
}

impl Default for NormalizerConfig {
    fn default() -> Self {
        Self {
            target_sample_rate: 16_000,
            target_duration_secs: 3.5,
            min_duration_secs: 0.3,
            silence_rms_floor: 1e-4,
            trim: TrimStrategy::Center,
        }
    }
}

impl NormalizerConfig {
    /// Exact number of samples every normalized waveform carries
    pub fn target_len(&self) -> usize {
        (self.target_sample_rate as f64 * self.target_duration_secs as f64).round() as usize
    }
}

/// Feature extraction parameters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeatureConfig {
    /// Cepstral frame length in milliseconds
    pub cepstral_frame_ms: f32,
    /// Cepstral hop in milliseconds
    pub cepstral_hop_ms: f32,
    /// Number of triangular mel bands
    pub mel_bands: usize,
    /// Number of cepstral coefficients kept (c1..cN)
    pub cepstral_coefficients: usize,
    /// Pre-emphasis coefficient applied before cepstral framing
    pub pre_emphasis: f32,
    /// STFT size for spectral and phase analysis
    pub stft_size: usize,
    /// STFT hop for spectral and phase analysis
    pub stft_hop: usize,
    /// Fraction of spectral energy below the rolloff frequency
    pub rolloff_fraction: f32,
    /// Lowest pitch searched by the jitter estimator (Hz)
    pub pitch_min_hz: f32,
    /// Highest pitch searched by the jitter estimator (Hz)
    pub pitch_max_hz: f32,
    /// Pitch analysis window in milliseconds
    pub pitch_window_ms: f32,
    /// Pitch analysis hop in milliseconds
    pub pitch_hop_ms: f32,
    /// Minimum normalized autocorrelation peak for a voiced window
    pub voicing_threshold: f32,
}

impl Default for FeatureConfig {
    fn default() -> Self {
        Self {
            cepstral_frame_ms: 25.0,
            cepstral_hop_ms: 10.0,
            mel_bands: 26,
            cepstral_coefficients: 13,
            pre_emphasis: 0.97,
            stft_size: 1024,
            stft_hop: 256,
            rolloff_fraction: 0.85,
            pitch_min_hz: 75.0,
            pitch_max_hz: 500.0,
            pitch_window_ms: 40.0,
            pitch_hop_ms: 10.0,
            voicing_threshold: 0.3,
        }
    }
}

impl AppConfig {
    /// Load configuration from JSON file
    ///
    /// # Arguments
    /// * `path` - Path to JSON config file
    ///
    /// # Returns
    /// Loaded configuration, or the defaults if the file doesn't exist or
    /// its JSON is invalid
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Self {
        match fs::read_to_string(&path) {
            Ok(contents) => match serde_json::from_str(&contents) {
                Ok(config) => {
                    log::info!("[Config] Loaded configuration from {:?}", path.as_ref());
                    config
                }
                Err(err) => {
                    log::warn!(
                        "[Config] Failed to parse JSON from {:?}: {}. Using defaults.",
                        path.as_ref(),
                        err
                    );
                    Self::default()
                }
            },
            Err(err) => {
                log::warn!(
                    "[Config] Failed to read config file {:?}: {}. Using defaults.",
                    path.as_ref(),
                    err
                );
                Self::default()
            }
        }
    }

    /// Load configuration from the bundled assets directory
    pub fn load() -> Self {
        Self::load_from_file("assets/engine_config.json")
    }
}
