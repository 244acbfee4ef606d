// Matching module - candidate vs. baseline comparison
//
// Module organization:
// - similarity: per-feature similarity measures (cosine, relative difference)
// - scoring: weighted deviation, ordered override rules, AI flag, confidence
// - verdict: VerdictRecord, RiskLevel, MatchRule and labels
//
// Everything here is a pure function of a candidate vector, a signature
// snapshot and the calibration parameters.

pub mod scoring;
pub mod similarity;
pub mod verdict;

pub use scoring::score;
pub use similarity::{cosine_similarity, FeatureSimilarities};
pub use verdict::{MatchRule, RiskLevel, VerdictRecord};

use crate::analysis::FeatureVector;
use crate::calibration::{CalibrationParameters, Strictness};
use crate::signature::Signature;

/// Compare `candidate` against `signature` and score the result
pub fn compare(
    candidate: &FeatureVector,
    signature: &Signature,
    strictness: Strictness,
    params: &CalibrationParameters,
) -> VerdictRecord {
    let similarities = FeatureSimilarities::between(candidate, signature);
    score(&similarities, strictness, params)
}
