// Verdict types returned by one comparison

use serde::{Deserialize, Serialize};

use crate::calibration::{Strictness, Weights};

/// Display-only risk band derived from the deviation
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RiskLevel {
    Minimal,
    Low,
    Medium,
    High,
}

impl RiskLevel {
    /// <0.10 MINIMAL, <0.30 LOW, <=0.50 MEDIUM, else HIGH
    pub fn from_deviation(deviation: f32) -> Self {
        if deviation < 0.10 {
            RiskLevel::Minimal
        } else if deviation < 0.30 {
            RiskLevel::Low
        } else if deviation <= 0.50 {
            RiskLevel::Medium
        } else {
            RiskLevel::High
        }
    }
}

/// Which decision rule accepted the candidate
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchRule {
    /// Phase and spectral similarity both near 1 (same recording)
    IdenticalRecording,
    /// High MFCC similarity with a small spectral difference
    DualHighSimilarity,
    /// Weighted deviation under the strictness ceiling
    WithinThreshold,
    /// Rejected
    None,
}

impl MatchRule {
    pub fn is_match(&self) -> bool {
        !matches!(self, MatchRule::None)
    }
}

pub const LABEL_IDENTICAL: &str = "Identical Features (Same Recording)";
pub const LABEL_DUAL: &str = "Same Speaker (High MFCC Similarity)";
pub const LABEL_MATCH_HIGH: &str = "Match (High Confidence)";
pub const LABEL_MATCH_MEDIUM: &str = "Match (Medium Confidence)";
pub const LABEL_MATCH_LOW: &str = "Match (Low Confidence)";
pub const LABEL_MISMATCH: &str = "Mismatch / Different Speaker";

/// Human-readable label for the rule that fired
pub fn verdict_label(rule: MatchRule, confidence: f32) -> &'static str {
    match rule {
        MatchRule::IdenticalRecording => LABEL_IDENTICAL,
        MatchRule::DualHighSimilarity => LABEL_DUAL,
        MatchRule::WithinThreshold if confidence > 0.8 => LABEL_MATCH_HIGH,
        MatchRule::WithinThreshold if confidence > 0.6 => LABEL_MATCH_MEDIUM,
        MatchRule::WithinThreshold => LABEL_MATCH_LOW,
        MatchRule::None => LABEL_MISMATCH,
    }
}

/// Result of one candidate/baseline comparison
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VerdictRecord {
    pub is_match: bool,
    pub is_ai_generated: bool,
    /// Override constant on the override paths, else clamp(1 - deviation)
    pub confidence: f32,
    /// Confidence that the candidate is the enrolled speaker
    pub match_confidence: f32,
    /// How far past the ceiling a rejected candidate fell (0 when matched)
    pub mismatch_confidence: f32,
    pub deviation: f32,
    /// Deviation ceiling of the requested strictness
    pub threshold: f32,
    pub strictness: Strictness,
    pub risk_level: RiskLevel,
    pub verdict: String,
    pub match_rule: MatchRule,
    pub mfcc_similarity: f32,
    pub spectral_similarity: f32,
    pub phase_similarity: f32,
    pub jitter_similarity: f32,
    pub phase_discontinuity: f32,
    pub weights: Weights,
}
