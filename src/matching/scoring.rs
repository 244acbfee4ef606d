// Scoring - weighted deviation plus ordered override rules
//
// Decision policy, first true wins:
// 1. identical recording: phase and spectral similarity above their cut-offs
// 2. dual high similarity: MFCC similarity high and spectral difference small
// 3. threshold: weighted deviation below the strictness ceiling
// otherwise mismatch. The AI flag is evaluated independently of the match.

use super::similarity::FeatureSimilarities;
use super::verdict::{verdict_label, MatchRule, RiskLevel, VerdictRecord};
use crate::calibration::{CalibrationParameters, Strictness, Weights};

/// 1 - Σ w·sim, clamped to >= 0
pub fn weighted_deviation(similarities: &FeatureSimilarities, weights: &Weights) -> f32 {
    let score = weights.mfcc * similarities.mfcc
        + weights.phase * similarities.phase
        + weights.spectral * similarities.spectral
        + weights.jitter * similarities.jitter;
    (1.0 - score).max(0.0)
}

/// Pick the first rule that accepts the candidate
pub fn decide(
    similarities: &FeatureSimilarities,
    deviation: f32,
    threshold: f32,
    params: &CalibrationParameters,
) -> MatchRule {
    let o = &params.overrides;
    if similarities.phase > o.identical_phase_similarity
        && similarities.spectral > o.identical_spectral_similarity
    {
        MatchRule::IdenticalRecording
    } else if similarities.mfcc > o.dual_mfcc_similarity
        && similarities.spectral_difference < o.dual_spectral_difference
    {
        MatchRule::DualHighSimilarity
    } else if deviation < threshold {
        MatchRule::WithinThreshold
    } else {
        MatchRule::None
    }
}

/// Synthesis-like phase artifacts on a sample that does not sound like the
/// enrolled speaker
pub fn is_ai_generated(similarities: &FeatureSimilarities, params: &CalibrationParameters) -> bool {
    similarities.candidate_phase_discontinuity > params.ai_phase_threshold()
        && similarities.mfcc < params.overrides.ai_mfcc_ceiling
}

/// Score one comparison into a verdict
///
/// Pure function of its inputs; identical inputs give identical records.
pub fn score(
    similarities: &FeatureSimilarities,
    strictness: Strictness,
    params: &CalibrationParameters,
) -> VerdictRecord {
    let deviation = weighted_deviation(similarities, &params.weights);
    let threshold = params.threshold_for(strictness);
    let rule = decide(similarities, deviation, threshold, params);
    let is_match = rule.is_match();

    let from_deviation = (1.0 - deviation).clamp(0.0, 1.0);
    let confidence = match rule {
        MatchRule::IdenticalRecording => params.overrides.identical_confidence,
        MatchRule::DualHighSimilarity => params.overrides.dual_confidence,
        MatchRule::WithinThreshold | MatchRule::None => from_deviation,
    };

    let mismatch_confidence = if is_match {
        0.0
    } else {
        let span = (1.0 - threshold).max(f32::EPSILON);
        ((deviation - threshold) / span).clamp(0.0, 1.0)
    };

    let is_ai_generated = is_ai_generated(similarities, params);
    let risk_level = RiskLevel::from_deviation(deviation);

    tracing::debug!(
        mfcc = similarities.mfcc,
        spectral = similarities.spectral,
        phase = similarities.phase,
        deviation,
        threshold,
        rule = ?rule,
        is_ai_generated,
        "Scored comparison"
    );

    VerdictRecord {
        is_match,
        is_ai_generated,
        confidence,
        match_confidence: confidence,
        mismatch_confidence,
        deviation,
        threshold,
        strictness,
        risk_level,
        verdict: verdict_label(rule, confidence).to_string(),
        match_rule: rule,
        mfcc_similarity: similarities.mfcc,
        spectral_similarity: similarities.spectral,
        phase_similarity: similarities.phase,
        jitter_similarity: similarities.jitter,
        phase_discontinuity: similarities.candidate_phase_discontinuity,
        weights: params.weights,
    }
}

#[cfg(test)]
#[path = "scoring_tests.rs"]
mod tests;
