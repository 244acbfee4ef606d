// Voice Signature Core - Rust speaker verification engine
// Normalize -> extract -> enroll or score against a single baseline

// Module declarations
pub mod analysis;
pub mod audio;
pub mod calibration;
pub mod config;
pub mod engine;
pub mod error;
pub mod matching;
pub mod signature;

// Re-exports for convenience
pub use analysis::{FeatureExtractor, FeatureVector};
pub use audio::{Waveform, WaveformNormalizer};
pub use calibration::{CalibrationParameters, Strictness};
pub use config::AppConfig;
pub use engine::VerificationEngine;
pub use error::{EngineError, ErrorCode};
pub use matching::{MatchRule, RiskLevel, VerdictRecord};
pub use signature::{Signature, SignatureStore};

use tracing_subscriber::EnvFilter;

/// Install the global tracing subscriber
///
/// Honors `RUST_LOG` (default `info`) and writes to stderr so stdout stays
/// free for JSON output. `log` records are bridged into tracing. Calling
/// this more than once is harmless.
pub fn init_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}
