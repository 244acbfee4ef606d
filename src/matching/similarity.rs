// Similarity module - per-feature comparison of candidate and baseline
//
// Every measure here is total: empty, zero-norm or mismatched inputs map to
// a similarity of 0 instead of a division error.

use serde::{Deserialize, Serialize};

use crate::analysis::{FeatureVector, SPECTRAL_LEN};
use crate::signature::Signature;

/// Denominator floors for the spectral relative differences, in
/// `SpectralSummary::as_array` order
///
/// Centroid, rolloff and bandwidth are in Hz; flatness is a ratio in [0, 1]
/// and would never move against a 1 Hz floor.
pub const SPECTRAL_DIFFERENCE_FLOORS: [f32; SPECTRAL_LEN] = [1.0, 1.0, 1.0, 1e-3];

/// Denominator floor for the phase relative difference
pub const PHASE_DIFFERENCE_FLOOR: f32 = 0.01;

/// Denominator floor for the jitter relative difference
pub const JITTER_DIFFERENCE_FLOOR: f32 = 1e-6;

/// Cosine similarity in [-1, 1]
///
/// Returns 0.0 for empty inputs, inputs of different length, or when either
/// vector has zero norm.
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    if a.is_empty() || a.len() != b.len() {
        return 0.0;
    }

    let mut dot = 0.0f64;
    let mut norm_a = 0.0f64;
    let mut norm_b = 0.0f64;
    for (&x, &y) in a.iter().zip(b) {
        dot += x as f64 * y as f64;
        norm_a += x as f64 * x as f64;
        norm_b += y as f64 * y as f64;
    }

    let denom = norm_a.sqrt() * norm_b.sqrt();
    if denom > 0.0 && denom.is_finite() {
        (dot / denom).clamp(-1.0, 1.0) as f32
    } else {
        0.0
    }
}

/// |test - base| / max(|base|, floor)
pub fn relative_difference(test: f32, base: f32, floor: f32) -> f32 {
    (test - base).abs() / base.abs().max(floor)
}

/// Similarity values for one candidate/baseline comparison
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FeatureSimilarities {
    /// Cosine of the cepstral sub-vectors, in [-1, 1]
    pub mfcc: f32,
    /// clamp(1 - spectral_difference, 0, 1)
    pub spectral: f32,
    /// Mean relative difference of the spectral scalars
    pub spectral_difference: f32,
    /// clamp(1 - relative phase-discontinuity difference, 0, 1)
    pub phase: f32,
    /// Informational; weighted by calibration (normally 0)
    pub jitter: f32,
    /// Raw phase discontinuity of the candidate, used by the AI flag
    pub candidate_phase_discontinuity: f32,
}

impl FeatureSimilarities {
    /// Compare a candidate vector against the enrolled signature
    pub fn between(candidate: &FeatureVector, signature: &Signature) -> Self {
        let base = &signature.features;

        let mfcc = cosine_similarity(&candidate.cepstral, &signature.cepstral_unit);

        let test_spectral = candidate.spectral.as_array();
        let base_spectral = base.spectral.as_array();
        let spectral_difference = test_spectral
            .iter()
            .zip(&base_spectral)
            .zip(&SPECTRAL_DIFFERENCE_FLOORS)
            .map(|((&t, &b), &floor)| relative_difference(t, b, floor))
            .sum::<f32>()
            / test_spectral.len() as f32;

        let phase = 1.0
            - relative_difference(
                candidate.phase.discontinuity,
                base.phase.discontinuity,
                PHASE_DIFFERENCE_FLOOR,
            );
        let jitter = 1.0 - relative_difference(candidate.jitter, base.jitter, JITTER_DIFFERENCE_FLOOR);

        Self {
            mfcc,
            spectral: (1.0 - spectral_difference).clamp(0.0, 1.0),
            spectral_difference,
            phase: phase.clamp(0.0, 1.0),
            jitter: jitter.clamp(0.0, 1.0),
            candidate_phase_discontinuity: candidate.phase.discontinuity,
        }
    }
}
