// Feature extraction error types and constants

use crate::error::ErrorCode;
use log::error;
use std::fmt;

/// Extraction error code constants
///
/// Error code range: 2001-2006
pub struct ExtractionErrorCodes {}

impl ExtractionErrorCodes {
    /// Waveform too short to form a single analysis frame
    pub const TOO_SHORT_TO_FRAME: i32 = 2001;

    /// A feature sub-vector came back empty
    pub const MISSING_SUB_VECTOR: i32 = 2002;

    /// A feature sub-vector has the wrong length
    pub const WRONG_LENGTH: i32 = 2003;

    /// A feature value is NaN or infinite
    pub const NON_FINITE: i32 = 2004;

    /// Waveform sample rate differs from the extractor's
    pub const SAMPLE_RATE_MISMATCH: i32 = 2005;

    /// No frame carries enough energy for the named analysis
    pub const NO_SIGNAL: i32 = 2006;
}

/// Log an extraction error
///
/// Extraction failures on normalized audio should not happen, so these are
/// always logged as unexpected.
pub fn log_extraction_error(err: &ExtractionError, context: &str) {
    error!(
        "Unexpected extraction error in {}: code={}, component=FeatureExtractor, message={}",
        context,
        err.code(),
        err.message()
    );
}

/// Internal computation failure on otherwise valid audio
/// (the `FeatureExtractionError` family)
#[derive(Debug, Clone, PartialEq)]
pub enum ExtractionError {
    /// Not enough samples for one frame of the named analysis
    TooShortToFrame {
        analysis: &'static str,
        samples: usize,
        frame_length: usize,
    },

    /// Sub-vector is empty
    MissingSubVector { name: &'static str },

    /// Sub-vector length differs from the configured layout
    WrongLength {
        name: &'static str,
        expected: usize,
        actual: usize,
    },

    /// Sub-vector holds a NaN or infinite value
    NonFinite { name: &'static str, index: usize },

    /// Waveform was not normalized to the extractor's sample rate
    SampleRateMismatch { expected: u32, actual: u32 },

    /// Every frame is silent, so the analysis has nothing to measure
    NoSignal { analysis: &'static str },
}

impl ErrorCode for ExtractionError {
    fn code(&self) -> i32 {
        match self {
            ExtractionError::TooShortToFrame { .. } => ExtractionErrorCodes::TOO_SHORT_TO_FRAME,
            ExtractionError::MissingSubVector { .. } => ExtractionErrorCodes::MISSING_SUB_VECTOR,
            ExtractionError::WrongLength { .. } => ExtractionErrorCodes::WRONG_LENGTH,
            ExtractionError::NonFinite { .. } => ExtractionErrorCodes::NON_FINITE,
            ExtractionError::SampleRateMismatch { .. } => {
                ExtractionErrorCodes::SAMPLE_RATE_MISMATCH
            }
            ExtractionError::NoSignal { .. } => ExtractionErrorCodes::NO_SIGNAL,
        }
    }

    fn message(&self) -> String {
        match self {
            ExtractionError::TooShortToFrame {
                analysis,
                samples,
                frame_length,
            } => format!(
                "Cannot frame {} analysis: {} samples, frame length {}",
                analysis, samples, frame_length
            ),
            ExtractionError::MissingSubVector { name } => {
                format!("Feature sub-vector '{}' is empty", name)
            }
            ExtractionError::WrongLength {
                name,
                expected,
                actual,
            } => format!(
                "Feature sub-vector '{}' has length {} (expected {})",
                name, actual, expected
            ),
            ExtractionError::NonFinite { name, index } => {
                format!("Feature sub-vector '{}' is non-finite at index {}", name, index)
            }
            ExtractionError::SampleRateMismatch { expected, actual } => format!(
                "Waveform sample rate {} Hz does not match extractor rate {} Hz",
                actual, expected
            ),
            ExtractionError::NoSignal { analysis } => {
                format!("No frame carries signal for {} analysis", analysis)
            }
        }
    }
}

impl fmt::Display for ExtractionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "ExtractionError::{:?} (code {}): {}",
            self,
            self.code(),
            self.message()
        )
    }
}

impl std::error::Error for ExtractionError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extraction_error_codes() {
        assert_eq!(
            ExtractionError::TooShortToFrame {
                analysis: "cepstral",
                samples: 10,
                frame_length: 400
            }
            .code(),
            2001
        );
        assert_eq!(
            ExtractionError::MissingSubVector { name: "cepstral" }.code(),
            2002
        );
        assert_eq!(
            ExtractionError::WrongLength {
                name: "spectral",
                expected: 4,
                actual: 3
            }
            .code(),
            2003
        );
        assert_eq!(
            ExtractionError::NonFinite {
                name: "phase",
                index: 0
            }
            .code(),
            2004
        );
        assert_eq!(
            ExtractionError::SampleRateMismatch {
                expected: 16_000,
                actual: 44_100
            }
            .code(),
            2005
        );
        assert_eq!(
            ExtractionError::NoSignal {
                analysis: "spectral"
            }
            .code(),
            2006
        );
    }

    #[test]
    fn test_wrong_length_message() {
        let err = ExtractionError::WrongLength {
            name: "cepstral",
            expected: 26,
            actual: 13,
        };
        assert!(err.message().contains("'cepstral'"));
        assert!(err.message().contains("length 13 (expected 26)"));
    }
}
