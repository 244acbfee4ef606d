// FeatureExtractor - fixed-layout voice feature extraction
//
// This module turns a normalized waveform into a FeatureVector used for
// speaker comparison and synthesis-artifact detection.
//
// Module organization:
// - types: Data structures (FeatureVector and its sub-vectors)
// - fft: Windowed FFT / STFT computation
// - cepstral: Mel-frequency cepstral coefficients (speaker timbre)
// - spectral: Frequency-domain shape (centroid, rolloff, bandwidth, flatness)
// - phase: Unwrapped-phase continuity (vocoder artifacts)
// - jitter: Pitch-period irregularity (informational)
// - mod.rs: Coordinator (FeatureExtractor)
//
// The extractor only holds immutable precomputed tables, so a single
// instance can serve any number of threads.

mod cepstral;
mod fft;
mod jitter;
mod phase;
mod spectral;
mod types;

pub use types::{FeatureVector, PhaseSummary, SpectralSummary, PHASE_LEN, SPECTRAL_LEN};

use crate::audio::Waveform;
use crate::config::FeatureConfig;
use crate::error::ExtractionError;
use cepstral::CepstralFeatures;
use fft::{FftProcessor, WindowKind};
use jitter::JitterEstimator;
use spectral::SpectralFeatures;

/// FeatureExtractor coordinates the feature extraction pipeline
///
/// Spectral and phase statistics share one STFT pass; cepstral and jitter
/// analyses run their own framing.
pub struct FeatureExtractor {
    sample_rate: u32,
    stft: FftProcessor,
    stft_hop: usize,
    cepstral: CepstralFeatures,
    spectral: SpectralFeatures,
    jitter: JitterEstimator,
}

fn ms_to_samples(ms: f32, sample_rate: u32) -> usize {
    ((ms / 1000.0) * sample_rate as f32).round().max(1.0) as usize
}

impl FeatureExtractor {
    /// Create a new FeatureExtractor for waveforms at `sample_rate`
    ///
    /// # Arguments
    /// * `sample_rate` - Rate every input waveform must have (the normalizer's target)
    /// * `config` - Framing and analysis parameters
    pub fn new(sample_rate: u32, config: &FeatureConfig) -> Self {
        let stft_size = config.stft_size.max(4);
        let cepstral_frame = ms_to_samples(config.cepstral_frame_ms, sample_rate);
        let cepstral_hop = ms_to_samples(config.cepstral_hop_ms, sample_rate);

        Self {
            sample_rate,
            stft: FftProcessor::new(stft_size, stft_size, WindowKind::Hann),
            stft_hop: config.stft_hop.max(1),
            cepstral: CepstralFeatures::new(
                sample_rate,
                cepstral_frame,
                cepstral_hop,
                config.mel_bands,
                config.cepstral_coefficients,
                config.pre_emphasis,
            ),
            spectral: SpectralFeatures::new(sample_rate, stft_size, config.rolloff_fraction),
            jitter: JitterEstimator::new(
                sample_rate,
                ms_to_samples(config.pitch_window_ms, sample_rate),
                ms_to_samples(config.pitch_hop_ms, sample_rate),
                config.pitch_min_hz,
                config.pitch_max_hz,
                config.voicing_threshold,
            ),
        }
    }

    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    /// Length of the cepstral sub-vector this extractor produces
    pub fn cepstral_len(&self) -> usize {
        self.cepstral.output_len()
    }

    /// Extract all four sub-vectors from a normalized waveform
    ///
    /// Runs the FeatureVector postcondition before returning, so a vector
    /// handed back from here is always complete and finite.
    ///
    /// # Errors
    /// - `SampleRateMismatch` if the waveform was not normalized to this rate
    /// - `TooShortToFrame` if any analysis cannot form its minimum frames
    /// - `NoSignal` if every STFT frame is silent
    /// - `WrongLength` / `NonFinite` if the postcondition fails
    pub fn extract(&self, waveform: &Waveform) -> Result<FeatureVector, ExtractionError> {
        if waveform.sample_rate != self.sample_rate {
            return Err(ExtractionError::SampleRateMismatch {
                expected: self.sample_rate,
                actual: waveform.sample_rate,
            });
        }
        let samples = &waveform.samples;

        let cepstral = self.cepstral.compute(samples)?;

        let stft = self.stft.stft(samples, self.stft_hop);
        if stft.len() < phase::MIN_FRAMES {
            return Err(ExtractionError::TooShortToFrame {
                analysis: "phase",
                samples: samples.len(),
                frame_length: self.stft.frame_length() + (phase::MIN_FRAMES - 1) * self.stft_hop,
            });
        }
        let phase = phase::summarize(&stft, self.stft_hop, self.stft.fft_size())
            .ok_or(ExtractionError::NoSignal { analysis: "phase" })?;

        let magnitudes: Vec<Vec<f32>> = stft
            .iter()
            .map(|frame| frame.iter().map(|c| c.norm()).collect())
            .collect();
        let spectral = self.spectral.summarize(&magnitudes)?;

        let jitter = self.jitter.compute(samples)?;

        let features = FeatureVector {
            cepstral,
            spectral,
            phase,
            jitter,
        };
        features.validate(self.cepstral_len())?;

        tracing::debug!(
            frames = stft.len(),
            centroid = features.spectral.centroid,
            phase_discontinuity = features.phase.discontinuity,
            jitter = features.jitter,
            "Extracted feature vector"
        );

        Ok(features)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};

    const SAMPLE_RATE: u32 = 16_000;

    /// Harmonic stack with slow vibrato plus a little seeded noise
    fn generate_voice_like(f0: f32, seed: u64, len: usize) -> Vec<f32> {
        let mut rng = StdRng::seed_from_u64(seed);
        let mut phase = 0.0f32;
        (0..len)
            .map(|i| {
                let t = i as f32 / SAMPLE_RATE as f32;
                let freq = f0 * (1.0 + 0.02 * (2.0 * std::f32::consts::PI * 5.0 * t).sin());
                phase += 2.0 * std::f32::consts::PI * freq / SAMPLE_RATE as f32;
                let voiced: f32 = (1..=6).map(|h| (phase * h as f32).sin() / h as f32).sum();
                0.3 * voiced + 0.01 * rng.gen_range(-1.0..1.0)
            })
            .collect()
    }

    fn extractor() -> FeatureExtractor {
        FeatureExtractor::new(SAMPLE_RATE, &FeatureConfig::default())
    }

    #[test]
    fn test_full_vector_layout() {
        let wf = Waveform::new(generate_voice_like(140.0, 7, 56_000), SAMPLE_RATE);
        let features = extractor().extract(&wf).unwrap();

        assert_eq!(features.cepstral.len(), 26);
        assert!(features.spectral.centroid > 0.0);
        assert!(features.spectral.rolloff > 0.0);
        assert!(features.spectral.bandwidth > 0.0);
        assert!(features.phase.discontinuity > 0.0);
        assert!(features.jitter >= 0.0);
        println!("Features: {:?}", features);
    }

    #[test]
    fn test_extraction_is_deterministic() {
        let wf = Waveform::new(generate_voice_like(120.0, 3, 56_000), SAMPLE_RATE);
        let e = extractor();
        assert_eq!(e.extract(&wf).unwrap(), e.extract(&wf).unwrap());
    }

    #[test]
    fn test_voice_like_signal_has_small_jitter() {
        let wf = Waveform::new(generate_voice_like(140.0, 11, 56_000), SAMPLE_RATE);
        let features = extractor().extract(&wf).unwrap();
        assert!(
            features.jitter < 0.05,
            "Expected jitter < 0.05, got {}",
            features.jitter
        );
    }

    #[test]
    fn test_phase_separates_voice_from_noise() {
        let voice = Waveform::new(generate_voice_like(140.0, 5, 48_000), SAMPLE_RATE);
        let mut rng = StdRng::seed_from_u64(21);
        let noise = Waveform::new(
            (0..48_000).map(|_| rng.gen_range(-0.3..0.3)).collect(),
            SAMPLE_RATE,
        );

        let e = extractor();
        let voice = e.extract(&voice).unwrap().phase.discontinuity;
        let noise = e.extract(&noise).unwrap().phase.discontinuity;
        assert!(voice < 0.4, "voice discontinuity {}", voice);
        assert!(noise > 0.6, "noise discontinuity {}", noise);
        assert!(noise > 2.0 * voice);
    }

    #[test]
    fn test_sample_rate_mismatch() {
        let wf = Waveform::new(vec![0.1; 56_000], 44_100);
        assert_eq!(
            extractor().extract(&wf).unwrap_err(),
            ExtractionError::SampleRateMismatch {
                expected: 16_000,
                actual: 44_100
            }
        );
    }

    #[test]
    fn test_too_short_to_frame() {
        let wf = Waveform::new(vec![0.1; 200], SAMPLE_RATE);
        assert!(matches!(
            extractor().extract(&wf),
            Err(ExtractionError::TooShortToFrame { .. })
        ));
    }

    #[test]
    fn test_short_for_phase_but_not_cepstral() {
        // one cepstral frame fits, three 1024-sample STFT frames do not
        let wf = Waveform::new(generate_voice_like(140.0, 1, 1500), SAMPLE_RATE);
        assert!(matches!(
            extractor().extract(&wf),
            Err(ExtractionError::TooShortToFrame {
                analysis: "phase",
                ..
            })
        ));
    }
}
