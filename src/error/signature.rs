// Signature store error types and constants

use crate::error::ErrorCode;
use log::{error, warn};
use std::fmt;

/// Signature error code constants
///
/// Error code range: 3001-3002
pub struct SignatureErrorCodes {}

impl SignatureErrorCodes {
    /// Verification attempted before any enrollment
    pub const NO_BASELINE: i32 = 3001;

    /// Signature store RwLock was poisoned
    pub const STORE_POISONED: i32 = 3002;
}

/// Log a signature store error
///
/// A missing baseline is a caller mistake rather than a fault and is logged
/// at warn level.
pub fn log_signature_error(err: &SignatureError, context: &str) {
    match err {
        SignatureError::NoBaseline => warn!(
            "Signature error in {}: code={}, component=SignatureStore, message={}",
            context,
            err.code(),
            err.message()
        ),
        SignatureError::StorePoisoned => error!(
            "Signature error in {}: code={}, component=SignatureStore, message={}",
            context,
            err.code(),
            err.message()
        ),
    }
}

/// Signature store errors
#[derive(Debug, Clone, PartialEq)]
pub enum SignatureError {
    /// No signature enrolled (the `NoBaselineError`)
    NoBaseline,

    /// Store lock poisoned by a panicking writer
    StorePoisoned,
}

impl ErrorCode for SignatureError {
    fn code(&self) -> i32 {
        match self {
            SignatureError::NoBaseline => SignatureErrorCodes::NO_BASELINE,
            SignatureError::StorePoisoned => SignatureErrorCodes::STORE_POISONED,
        }
    }

    fn message(&self) -> String {
        match self {
            SignatureError::NoBaseline => {
                "No voice signature enrolled. Enroll a baseline recording first.".to_string()
            }
            SignatureError::StorePoisoned => "Signature store lock poisoned".to_string(),
        }
    }
}

impl fmt::Display for SignatureError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "SignatureError::{:?} (code {}): {}",
            self,
            self.code(),
            self.message()
        )
    }
}

impl std::error::Error for SignatureError {}
