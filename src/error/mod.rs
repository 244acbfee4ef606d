// Error types for the voice signature engine
//
// Each failure family lives in its own module with a numeric code range so
// the API layer in front of the engine can map every cause to a distinct,
// actionable message. EngineError wraps the families for the top-level
// enroll/analyze operations.

mod audio;
mod calibration;
mod extraction;
mod signature;

use std::fmt;

pub use audio::{log_audio_error, AudioError, AudioErrorCodes};
pub use calibration::{log_calibration_error, CalibrationError, CalibrationErrorCodes};
pub use extraction::{log_extraction_error, ExtractionError, ExtractionErrorCodes};
pub use signature::{log_signature_error, SignatureError, SignatureErrorCodes};

/// Error codes for structured error reporting
///
/// This trait provides a standard way to get error codes and messages
/// from custom error types.
pub trait ErrorCode {
    /// Get the numeric error code
    fn code(&self) -> i32;

    /// Get the human-readable error message
    fn message(&self) -> String;
}

/// Any failure surfaced by the engine's enroll/analyze operations
///
/// Every variant is terminal for the call that produced it; the engine
/// never retries.
#[derive(Debug, Clone, PartialEq)]
pub enum EngineError {
    InvalidAudio(AudioError),
    FeatureExtraction(ExtractionError),
    Signature(SignatureError),
    Calibration(CalibrationError),
}

impl EngineError {
    /// Log this error through the family-specific logger
    pub fn log(&self, context: &str) {
        match self {
            EngineError::InvalidAudio(err) => log_audio_error(err, context),
            EngineError::FeatureExtraction(err) => log_extraction_error(err, context),
            EngineError::Signature(err) => log_signature_error(err, context),
            EngineError::Calibration(err) => log_calibration_error(err, context),
        }
    }

    /// True when verification was attempted before enrollment
    pub fn is_no_baseline(&self) -> bool {
        matches!(self, EngineError::Signature(SignatureError::NoBaseline))
    }
}

impl ErrorCode for EngineError {
    fn code(&self) -> i32 {
        match self {
            EngineError::InvalidAudio(err) => err.code(),
            EngineError::FeatureExtraction(err) => err.code(),
            EngineError::Signature(err) => err.code(),
            EngineError::Calibration(err) => err.code(),
        }
    }

    fn message(&self) -> String {
        match self {
            EngineError::InvalidAudio(err) => err.message(),
            EngineError::FeatureExtraction(err) => err.message(),
            EngineError::Signature(err) => err.message(),
            EngineError::Calibration(err) => err.message(),
        }
    }
}

impl fmt::Display for EngineError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EngineError::InvalidAudio(err) => err.fmt(f),
            EngineError::FeatureExtraction(err) => err.fmt(f),
            EngineError::Signature(err) => err.fmt(f),
            EngineError::Calibration(err) => err.fmt(f),
        }
    }
}

impl std::error::Error for EngineError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            EngineError::InvalidAudio(err) => Some(err),
            EngineError::FeatureExtraction(err) => Some(err),
            EngineError::Signature(err) => Some(err),
            EngineError::Calibration(err) => Some(err),
        }
    }
}

impl From<AudioError> for EngineError {
    fn from(err: AudioError) -> Self {
        EngineError::InvalidAudio(err)
    }
}

impl From<ExtractionError> for EngineError {
    fn from(err: ExtractionError) -> Self {
        EngineError::FeatureExtraction(err)
    }
}

impl From<SignatureError> for EngineError {
    fn from(err: SignatureError) -> Self {
        EngineError::Signature(err)
    }
}

impl From<CalibrationError> for EngineError {
    fn from(err: CalibrationError) -> Self {
        EngineError::Calibration(err)
    }
}
