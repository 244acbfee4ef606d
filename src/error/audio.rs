// Audio error types and constants
//
// These errors describe input audio that cannot be turned into a usable,
// normalized waveform. Retrying the same samples never helps, so callers
// should surface them directly and ask for a different recording.

use crate::error::ErrorCode;
use log::error;
use std::fmt;

/// Audio error code constants
///
/// Single source of truth for the numeric codes an API layer maps to
/// user-facing messages.
///
/// Error code range: 1001-1006
pub struct AudioErrorCodes {}

impl AudioErrorCodes {
    /// Waveform contained no samples
    pub const EMPTY: i32 = 1001;

    /// Sample rate was zero
    pub const INVALID_SAMPLE_RATE: i32 = 1002;

    /// Waveform contained NaN or infinite samples
    pub const NON_FINITE: i32 = 1003;

    /// Waveform shorter than the minimum usable duration
    pub const TOO_SHORT: i32 = 1004;

    /// Waveform energy below the silence floor
    pub const SILENT: i32 = 1005;

    /// Resampler could not convert the waveform
    pub const RESAMPLE_FAILED: i32 = 1006;
}

/// Log an audio error with structured context
///
/// Emits error_code, component and message fields so log pipelines can
/// group rejected uploads by cause.
pub fn log_audio_error(err: &AudioError, context: &str) {
    error!(
        "Audio error in {}: code={}, component=WaveformNormalizer, message={}",
        context,
        err.code(),
        err.message()
    );
}

/// Unusable input audio (the `InvalidAudioError` family)
#[derive(Debug, Clone, PartialEq)]
pub enum AudioError {
    /// No samples at all
    Empty,

    /// Sample rate must be > 0
    InvalidSampleRate { sample_rate: u32 },

    /// At least one sample is NaN or infinite
    NonFinite { index: usize },

    /// Shorter than the minimum usable duration
    TooShort { duration_secs: f32, min_secs: f32 },

    /// Near-zero energy in the input or in the window kept after trimming
    Silent { rms: f32, floor: f32 },

    /// Resampling to the target rate failed
    ResampleFailed { reason: String },
}

impl ErrorCode for AudioError {
    fn code(&self) -> i32 {
        match self {
            AudioError::Empty => AudioErrorCodes::EMPTY,
            AudioError::InvalidSampleRate { .. } => AudioErrorCodes::INVALID_SAMPLE_RATE,
            AudioError::NonFinite { .. } => AudioErrorCodes::NON_FINITE,
            AudioError::TooShort { .. } => AudioErrorCodes::TOO_SHORT,
            AudioError::Silent { .. } => AudioErrorCodes::SILENT,
            AudioError::ResampleFailed { .. } => AudioErrorCodes::RESAMPLE_FAILED,
        }
    }

    fn message(&self) -> String {
        match self {
            AudioError::Empty => "Audio is empty. Record a voice sample and try again.".to_string(),
            AudioError::InvalidSampleRate { sample_rate } => {
                format!("Sample rate must be greater than 0 (got {})", sample_rate)
            }
            AudioError::NonFinite { index } => {
                format!("Audio contains a non-finite sample at index {}", index)
            }
            AudioError::TooShort {
                duration_secs,
                min_secs,
            } => format!(
                "Audio too short: {:.2}s recorded, at least {:.2}s required",
                duration_secs, min_secs
            ),
            AudioError::Silent { rms, floor } => format!(
                "Audio is silent (RMS {:.6} below floor {:.6}). Check the microphone.",
                rms, floor
            ),
            AudioError::ResampleFailed { reason } => {
                format!("Failed to resample audio: {}", reason)
            }
        }
    }
}

impl fmt::Display for AudioError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "AudioError::{:?} (code {}): {}",
            self,
            self.code(),
            self.message()
        )
    }
}

impl std::error::Error for AudioError {}

impl From<rubato::ResamplerConstructionError> for AudioError {
    fn from(err: rubato::ResamplerConstructionError) -> Self {
        AudioError::ResampleFailed {
            reason: err.to_string(),
        }
    }
}

impl From<rubato::ResampleError> for AudioError {
    fn from(err: rubato::ResampleError) -> Self {
        AudioError::ResampleFailed {
            reason: err.to_string(),
        }
    }
}
