//! VerificationEngine: enroll / reset / analyze over the voice pipeline.
//!
//! The engine owns the normalizer, the feature extractor, the validated
//! calibration record and the signature store. Everything but the store is
//! immutable after construction, so one engine can be shared through an
//! `Arc` by any number of request handlers.

use std::sync::Arc;

use crate::analysis::{FeatureExtractor, FeatureVector};
use crate::audio::{Waveform, WaveformNormalizer};
use crate::calibration::{CalibrationParameters, Strictness};
use crate::config::AppConfig;
use crate::error::EngineError;
use crate::matching::{self, VerdictRecord};
use crate::signature::{Signature, SignatureStore};

/// Speaker verification engine with a single enrolled baseline
pub struct VerificationEngine {
    config: AppConfig,
    calibration: CalibrationParameters,
    normalizer: WaveformNormalizer,
    extractor: FeatureExtractor,
    store: SignatureStore,
}

impl VerificationEngine {
    /// Create an engine, rejecting an invalid calibration record up front
    ///
    /// # Errors
    /// - `EngineError::Calibration` if `calibration` fails validation
    pub fn new(config: AppConfig, calibration: CalibrationParameters) -> Result<Self, EngineError> {
        calibration.validate().map_err(|err| {
            let err = EngineError::from(err);
            err.log("VerificationEngine::new");
            err
        })?;

        let normalizer = WaveformNormalizer::new(config.normalizer.clone());
        let extractor =
            FeatureExtractor::new(config.normalizer.target_sample_rate, &config.features);

        tracing::info!(
            sample_rate = config.normalizer.target_sample_rate,
            target_len = normalizer.target_len(),
            mfcc_weight = calibration.weights.mfcc,
            phase_weight = calibration.weights.phase,
            spectral_weight = calibration.weights.spectral,
            "Verification engine ready"
        );

        Ok(Self {
            config,
            calibration,
            normalizer,
            extractor,
            store: SignatureStore::new(),
        })
    }

    /// Engine with default configuration and reference calibration
    pub fn with_defaults() -> Result<Self, EngineError> {
        Self::new(AppConfig::default(), CalibrationParameters::default())
    }

    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    pub fn calibration(&self) -> &CalibrationParameters {
        &self.calibration
    }

    /// Normalize and extract a feature vector (no store access)
    pub fn extract(&self, waveform: &Waveform) -> Result<FeatureVector, EngineError> {
        let normalized = self.normalizer.normalize(waveform)?;
        let features = self.extractor.extract(&normalized)?;
        Ok(features)
    }

    /// Enroll `waveform` as the baseline, replacing any previous signature
    ///
    /// The store is only touched after extraction succeeds, so a failed
    /// enrollment leaves the previous signature in place.
    pub fn enroll(&self, waveform: &Waveform) -> Result<(), EngineError> {
        let features = self
            .extract(waveform)
            .inspect_err(|err| err.log("enroll"))?;
        self.store_baseline(features)
    }

    /// Enroll an already extracted feature vector
    pub fn enroll_features(&self, features: FeatureVector) -> Result<(), EngineError> {
        features
            .validate(self.extractor.cepstral_len())
            .map_err(EngineError::from)
            .inspect_err(|err| err.log("enroll_features"))?;
        self.store_baseline(features)
    }

    /// Clear the enrolled baseline
    pub fn reset(&self) -> Result<(), EngineError> {
        self.store.reset()?;
        Ok(())
    }

    pub fn has_baseline(&self) -> Result<bool, EngineError> {
        Ok(self.store.has_baseline()?)
    }

    /// Current baseline snapshot, if any
    pub fn baseline(&self) -> Result<Option<Arc<Signature>>, EngineError> {
        Ok(self.store.get_baseline()?)
    }

    /// Verify `waveform` against the enrolled baseline
    ///
    /// The baseline is snapshotted first: without one this fails with
    /// `NoBaseline` before any audio work is done.
    pub fn analyze(
        &self,
        waveform: &Waveform,
        strictness: Strictness,
    ) -> Result<VerdictRecord, EngineError> {
        let signature = self.snapshot("analyze")?;
        let candidate = self
            .extract(waveform)
            .inspect_err(|err| err.log("analyze"))?;
        Ok(self.compare(&candidate, &signature, strictness))
    }

    /// Verify an already extracted feature vector
    pub fn analyze_features(
        &self,
        candidate: &FeatureVector,
        strictness: Strictness,
    ) -> Result<VerdictRecord, EngineError> {
        let signature = self.snapshot("analyze_features")?;
        candidate
            .validate(self.extractor.cepstral_len())
            .map_err(EngineError::from)
            .inspect_err(|err| err.log("analyze_features"))?;
        Ok(self.compare(candidate, &signature, strictness))
    }

    // ========================================================================
    // HELPER METHODS
    // ========================================================================

    fn store_baseline(&self, features: FeatureVector) -> Result<(), EngineError> {
        self.store.set_baseline(features)?;
        Ok(())
    }

    fn snapshot(&self, context: &str) -> Result<Arc<Signature>, EngineError> {
        // the store has already logged the failure at error level
        self.store.require_baseline().map_err(|err| {
            tracing::debug!(context, error = ?err, "Baseline snapshot unavailable");
            EngineError::from(err)
        })
    }

    fn compare(
        &self,
        candidate: &FeatureVector,
        signature: &Signature,
        strictness: Strictness,
    ) -> VerdictRecord {
        let verdict = matching::compare(candidate, signature, strictness, &self.calibration);
        tracing::info!(
            is_match = verdict.is_match,
            is_ai_generated = verdict.is_ai_generated,
            deviation = verdict.deviation,
            strictness = %strictness,
            rule = ?verdict.match_rule,
            "Verification complete"
        );
        verdict
    }
}
