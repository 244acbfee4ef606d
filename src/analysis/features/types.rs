// Types module - fixed-layout feature vector
//
// A FeatureVector always carries all four sub-vectors. validate() is the
// postcondition the extractor runs before returning and the engine runs on
// vectors supplied from outside; a vector with a missing or mis-sized
// sub-vector is rejected rather than compared with neutral defaults.

use serde::{Deserialize, Serialize};

use crate::error::ExtractionError;

/// Number of scalars in the spectral sub-vector
pub const SPECTRAL_LEN: usize = 4;

/// Number of scalars in the phase sub-vector
pub const PHASE_LEN: usize = 3;

/// Frame-mean spectral shape statistics
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct SpectralSummary {
    /// Spectral centroid in Hz (brightness)
    pub centroid: f32,
    /// Frequency below which the rolloff fraction of energy lies, in Hz
    pub rolloff: f32,
    /// Magnitude-weighted spread around the centroid, in Hz
    pub bandwidth: f32,
    /// Geometric/arithmetic mean ratio (0 tonal .. 1 noise)
    pub flatness: f32,
}

impl SpectralSummary {
    /// Ordered view: centroid, rolloff, bandwidth, flatness
    pub fn as_array(&self) -> [f32; SPECTRAL_LEN] {
        [self.centroid, self.rolloff, self.bandwidth, self.flatness]
    }
}

/// Unwrapped-phase continuity statistics
///
/// Larger `discontinuity` means less phase-continuous audio, which is
/// typical of vocoder/synthesis output.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct PhaseSummary {
    /// Mean |second time-difference| of unwrapped phase (scored value)
    pub discontinuity: f32,
    /// Standard deviation of |second time-difference|
    pub discontinuity_std: f32,
    /// Mean |first time-difference| of unwrapped phase
    pub unwrapped_derivative_mean: f32,
}

impl PhaseSummary {
    pub fn as_array(&self) -> [f32; PHASE_LEN] {
        [
            self.discontinuity,
            self.discontinuity_std,
            self.unwrapped_derivative_mean,
        ]
    }
}

/// Fixed-size feature vector extracted from one normalized waveform
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeatureVector {
    /// Per-coefficient means followed by per-coefficient variances
    pub cepstral: Vec<f32>,
    pub spectral: SpectralSummary,
    pub phase: PhaseSummary,
    /// Relative pitch-period variation; informational only
    pub jitter: f32,
}

impl FeatureVector {
    /// Check every sub-vector is present, correctly sized and finite
    ///
    /// # Arguments
    /// * `expected_cepstral_len` - 2 × configured coefficient count
    pub fn validate(&self, expected_cepstral_len: usize) -> Result<(), ExtractionError> {
        if self.cepstral.is_empty() {
            return Err(ExtractionError::MissingSubVector { name: "cepstral" });
        }
        if self.cepstral.len() != expected_cepstral_len || self.cepstral.len() % 2 != 0 {
            return Err(ExtractionError::WrongLength {
                name: "cepstral",
                expected: expected_cepstral_len,
                actual: self.cepstral.len(),
            });
        }

        check_finite("cepstral", &self.cepstral)?;
        check_finite("spectral", &self.spectral.as_array())?;
        check_finite("phase", &self.phase.as_array())?;
        check_finite("jitter", &[self.jitter])?;

        Ok(())
    }
}

fn check_finite(name: &'static str, values: &[f32]) -> Result<(), ExtractionError> {
    match values.iter().position(|v| !v.is_finite()) {
        Some(index) => Err(ExtractionError::NonFinite { name, index }),
        None => Ok(()),
    }
}
