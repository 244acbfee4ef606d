// CalibrationParameters - externally supplied scoring parameters
//
// The record is produced by an offline calibration step and only consumed
// here. Unlike AppConfig, loading is strict: a record that fails validation
// is rejected before any comparison can use it.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::fs;
use std::path::Path;
use std::str::FromStr;

use crate::error::{log_calibration_error, CalibrationError};

/// Allowed distance of the weight sum from 1.0
pub const WEIGHT_SUM_TOLERANCE: f32 = 1e-3;

/// Caller-selected operating point; looser levels accept larger deviations
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Strictness {
    Strict,
    #[default]
    Normal,
    Relaxed,
    VeryRelaxed,
}

impl Strictness {
    /// All levels from strictest to loosest
    pub const ALL: [Strictness; 4] = [
        Strictness::Strict,
        Strictness::Normal,
        Strictness::Relaxed,
        Strictness::VeryRelaxed,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Strictness::Strict => "strict",
            Strictness::Normal => "normal",
            Strictness::Relaxed => "relaxed",
            Strictness::VeryRelaxed => "very_relaxed",
        }
    }
}

impl fmt::Display for Strictness {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Strictness {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "strict" => Ok(Strictness::Strict),
            "normal" => Ok(Strictness::Normal),
            "relaxed" => Ok(Strictness::Relaxed),
            "very_relaxed" | "very-relaxed" => Ok(Strictness::VeryRelaxed),
            other => Err(format!(
                "unknown strictness '{}' (expected strict|normal|relaxed|very_relaxed)",
                other
            )),
        }
    }
}

/// Per-feature weights of the deviation score
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Weights {
    pub mfcc: f32,
    pub phase: f32,
    pub spectral: f32,
    /// Zero in every shipped calibration; jitter is informational
    #[serde(default)]
    pub jitter: f32,
}

impl Default for Weights {
    fn default() -> Self {
        Self {
            mfcc: 0.45,
            phase: 0.30,
            spectral: 0.25,
            jitter: 0.0,
        }
    }
}

impl Weights {
    pub fn sum(&self) -> f32 {
        self.mfcc + self.phase + self.spectral + self.jitter
    }

    fn named(&self) -> [(&'static str, f32); 4] {
        [
            ("mfcc", self.mfcc),
            ("phase", self.phase),
            ("spectral", self.spectral),
            ("jitter", self.jitter),
        ]
    }
}

/// Deviation ceiling per strictness level
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct StrictnessThresholds {
    pub strict: f32,
    pub normal: f32,
    pub relaxed: f32,
    pub very_relaxed: f32,
}

impl Default for StrictnessThresholds {
    fn default() -> Self {
        Self {
            strict: 0.15,
            normal: 0.30,
            relaxed: 0.50,
            very_relaxed: 0.70,
        }
    }
}

impl StrictnessThresholds {
    pub fn get(&self, strictness: Strictness) -> f32 {
        match strictness {
            Strictness::Strict => self.strict,
            Strictness::Normal => self.normal,
            Strictness::Relaxed => self.relaxed,
            Strictness::VeryRelaxed => self.very_relaxed,
        }
    }
}

/// Cut-offs of the override rules layered over the weighted sum
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct OverrideRules {
    #[serde(default = "default_identical_similarity")]
    pub identical_phase_similarity: f32,
    #[serde(default = "default_identical_similarity")]
    pub identical_spectral_similarity: f32,
    #[serde(default = "default_identical_confidence")]
    pub identical_confidence: f32,
    #[serde(default = "default_dual_mfcc_similarity")]
    pub dual_mfcc_similarity: f32,
    #[serde(default = "default_dual_spectral_difference")]
    pub dual_spectral_difference: f32,
    #[serde(default = "default_dual_confidence")]
    pub dual_confidence: f32,
    /// The AI flag is only raised below this MFCC similarity
    #[serde(default = "default_ai_mfcc_ceiling")]
    pub ai_mfcc_ceiling: f32,
}

fn default_identical_similarity() -> f32 {
    0.95
}

fn default_identical_confidence() -> f32 {
    0.98
}

fn default_dual_mfcc_similarity() -> f32 {
    0.90
}

fn default_dual_spectral_difference() -> f32 {
    0.10
}

fn default_dual_confidence() -> f32 {
    0.85
}

fn default_ai_mfcc_ceiling() -> f32 {
    0.70
}

impl Default for OverrideRules {
    fn default() -> Self {
        Self {
            identical_phase_similarity: default_identical_similarity(),
            identical_spectral_similarity: default_identical_similarity(),
            identical_confidence: default_identical_confidence(),
            dual_mfcc_similarity: default_dual_mfcc_similarity(),
            dual_spectral_difference: default_dual_spectral_difference(),
            dual_confidence: default_dual_confidence(),
            ai_mfcc_ceiling: default_ai_mfcc_ceiling(),
        }
    }
}

/// Immutable scoring parameters consumed by the matcher
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CalibrationParameters {
    pub weights: Weights,
    /// Reference phase-discontinuity level of natural speech, in radians
    /// per hop of magnitude-weighted second difference
    pub phase_threshold: f32,
    /// AI threshold = phase_threshold × ai_phase_multiplier
    pub ai_phase_multiplier: f32,
    pub strictness_thresholds: StrictnessThresholds,
    #[serde(default)]
    pub overrides: OverrideRules,
}

/// Reference values the engine ships with
impl Default for CalibrationParameters {
    fn default() -> Self {
        Self {
            weights: Weights::default(),
            phase_threshold: 0.3,
            ai_phase_multiplier: 2.0,
            strictness_thresholds: StrictnessThresholds::default(),
            overrides: OverrideRules::default(),
        }
    }
}

impl CalibrationParameters {
    /// Phase discontinuity above which a sample counts as synthesis-like
    pub fn ai_phase_threshold(&self) -> f32 {
        self.phase_threshold * self.ai_phase_multiplier
    }

    pub fn threshold_for(&self, strictness: Strictness) -> f32 {
        self.strictness_thresholds.get(strictness)
    }

    /// Parse and validate a JSON calibration record
    pub fn from_json_str(json: &str) -> Result<Self, CalibrationError> {
        let params: Self = serde_json::from_str(json)?;
        params.validate()?;
        Ok(params)
    }

    /// Load and validate a calibration record, failing fast on any problem
    ///
    /// # Errors
    /// - `Io` if the file cannot be read
    /// - `Parse` if the JSON does not match the record layout
    /// - any validation error from [`CalibrationParameters::validate`]
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self, CalibrationError> {
        let path = path.as_ref();
        let contents = fs::read_to_string(path).map_err(|err| CalibrationError::Io {
            path: path.display().to_string(),
            reason: err.to_string(),
        });

        let params = contents
            .and_then(|json| Self::from_json_str(&json))
            .inspect_err(|err| log_calibration_error(err, "load_from_file"))?;

        log::info!(
            "[Calibration] Loaded parameters from {:?} (weights sum {:.3})",
            path,
            params.weights.sum()
        );
        Ok(params)
    }

    /// Check the record is usable for scoring
    ///
    /// Rules: weights non-negative and summing to 1.0 ± 1e-3; phase threshold
    /// and multiplier finite and positive; strictness ceilings positive and
    /// non-decreasing from strict to very_relaxed; override similarities and
    /// confidences within [0, 1].
    pub fn validate(&self) -> Result<(), CalibrationError> {
        for (name, value) in self.weights.named() {
            if !value.is_finite() || value < 0.0 {
                return Err(CalibrationError::NegativeWeight { name, value });
            }
        }

        let sum = self.weights.sum();
        if (sum - 1.0).abs() > WEIGHT_SUM_TOLERANCE {
            return Err(CalibrationError::WeightsDoNotSumToOne {
                sum,
                tolerance: WEIGHT_SUM_TOLERANCE,
            });
        }

        check_positive("phase_threshold", self.phase_threshold)?;
        check_positive("ai_phase_multiplier", self.ai_phase_multiplier)?;

        let ceilings = Strictness::ALL.map(|s| (s.as_str(), self.threshold_for(s)));
        for (name, value) in ceilings {
            check_positive(name, value)?;
        }
        for pair in ceilings.windows(2) {
            let ((tighter, t), (looser, l)) = (pair[0], pair[1]);
            if l < t {
                return Err(CalibrationError::NonMonotonicStrictness { tighter, looser });
            }
        }

        let o = &self.overrides;
        for (name, value) in [
            ("identical_phase_similarity", o.identical_phase_similarity),
            ("identical_spectral_similarity", o.identical_spectral_similarity),
            ("identical_confidence", o.identical_confidence),
            ("dual_mfcc_similarity", o.dual_mfcc_similarity),
            ("dual_spectral_difference", o.dual_spectral_difference),
            ("dual_confidence", o.dual_confidence),
            ("ai_mfcc_ceiling", o.ai_mfcc_ceiling),
        ] {
            if !value.is_finite() || !(0.0..=1.0).contains(&value) {
                return Err(CalibrationError::InvalidThreshold { name, value });
            }
        }

        Ok(())
    }
}

fn check_positive(name: &'static str, value: f32) -> Result<(), CalibrationError> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(CalibrationError::InvalidThreshold { name, value })
    }
}
