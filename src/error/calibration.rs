// Calibration error types and constants

use crate::error::ErrorCode;
use log::error;
use std::fmt;

/// Calibration error code constants
///
/// Error code range: 4001-4006
pub struct CalibrationErrorCodes {}

impl CalibrationErrorCodes {
    /// Feature weights do not sum to 1.0
    pub const WEIGHTS_DO_NOT_SUM_TO_ONE: i32 = 4001;

    /// A feature weight is negative or non-finite
    pub const NEGATIVE_WEIGHT: i32 = 4002;

    /// A threshold is out of range
    pub const INVALID_THRESHOLD: i32 = 4003;

    /// Strictness ceilings do not widen from strict to very_relaxed
    pub const NON_MONOTONIC_STRICTNESS: i32 = 4004;

    /// Calibration file could not be read
    pub const IO: i32 = 4005;

    /// Calibration file is not valid JSON for the record layout
    pub const PARSE: i32 = 4006;
}

/// Log a calibration error with structured context
pub fn log_calibration_error(err: &CalibrationError, context: &str) {
    error!(
        "Calibration error in {}: code={}, component=CalibrationParameters, message={}",
        context,
        err.code(),
        err.message()
    );
}

/// Invalid or unreadable calibration record
#[derive(Debug, Clone, PartialEq)]
pub enum CalibrationError {
    /// Weights sum outside 1.0 ± tolerance
    WeightsDoNotSumToOne { sum: f32, tolerance: f32 },

    /// Weight below zero or non-finite
    NegativeWeight { name: &'static str, value: f32 },

    /// Threshold non-finite or outside its valid range
    InvalidThreshold { name: &'static str, value: f32 },

    /// A looser strictness level has a tighter ceiling than a stricter one
    NonMonotonicStrictness { tighter: &'static str, looser: &'static str },

    /// Reading the calibration source failed
    Io { path: String, reason: String },

    /// Deserializing the calibration record failed
    Parse { reason: String },
}

impl ErrorCode for CalibrationError {
    fn code(&self) -> i32 {
        match self {
            CalibrationError::WeightsDoNotSumToOne { .. } => {
                CalibrationErrorCodes::WEIGHTS_DO_NOT_SUM_TO_ONE
            }
            CalibrationError::NegativeWeight { .. } => CalibrationErrorCodes::NEGATIVE_WEIGHT,
            CalibrationError::InvalidThreshold { .. } => CalibrationErrorCodes::INVALID_THRESHOLD,
            CalibrationError::NonMonotonicStrictness { .. } => {
                CalibrationErrorCodes::NON_MONOTONIC_STRICTNESS
            }
            CalibrationError::Io { .. } => CalibrationErrorCodes::IO,
            CalibrationError::Parse { .. } => CalibrationErrorCodes::PARSE,
        }
    }

    fn message(&self) -> String {
        match self {
            CalibrationError::WeightsDoNotSumToOne { sum, tolerance } => format!(
                "Feature weights must sum to 1.0 ± {} (got {:.4})",
                tolerance, sum
            ),
            CalibrationError::NegativeWeight { name, value } => {
                format!("Weight '{}' must be a non-negative number (got {})", name, value)
            }
            CalibrationError::InvalidThreshold { name, value } => {
                format!("Threshold '{}' out of range (got {})", name, value)
            }
            CalibrationError::NonMonotonicStrictness { tighter, looser } => format!(
                "Strictness ceiling for '{}' must not be below '{}'",
                looser, tighter
            ),
            CalibrationError::Io { path, reason } => {
                format!("Failed to read calibration file {}: {}", path, reason)
            }
            CalibrationError::Parse { reason } => {
                format!("Invalid calibration record: {}", reason)
            }
        }
    }
}

impl fmt::Display for CalibrationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "CalibrationError::{:?} (code {}): {}",
            self,
            self.code(),
            self.message()
        )
    }
}

impl std::error::Error for CalibrationError {}

impl From<serde_json::Error> for CalibrationError {
    fn from(err: serde_json::Error) -> Self {
        CalibrationError::Parse {
            reason: err.to_string(),
        }
    }
}
