//! Integration tests for the VerificationEngine lifecycle
//!
//! These tests run the full normalize -> extract -> enroll/analyze path on
//! deterministic synthetic voices and check:
//! - Determinism and self-match behavior
//! - The no-baseline guard and reset lifecycle
//! - Fail-fast calibration loading
//! - Concurrent analyze/enroll through a shared engine
//! - Phase-artifact detection on noise and phase-scrambled takes

use std::path::PathBuf;
use std::sync::Arc;
use std::thread;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rustfft::num_complex::Complex;
use rustfft::FftPlanner;
use voice_signature::config::TrimStrategy;
use voice_signature::error::{AudioError, CalibrationError, EngineError, SignatureError};
use voice_signature::{
    AppConfig, CalibrationParameters, MatchRule, Strictness, VerificationEngine, Waveform,
};

/// Synthetic "speaker": fundamental, spectral tilt and vibrato rate
struct Speaker {
    f0: f32,
    tilt: f32,
    vibrato_hz: f32,
}

const ALICE: Speaker = Speaker {
    f0: 140.0,
    tilt: 0.75,
    vibrato_hz: 5.0,
};

const BOB: Speaker = Speaker {
    f0: 230.0,
    tilt: 0.35,
    vibrato_hz: 6.5,
};

impl Speaker {
    /// One take of this speaker; `seed` varies the noise floor
    fn say(&self, sample_rate: u32, secs: f32, seed: u64) -> Waveform {
        let mut rng = StdRng::seed_from_u64(seed);
        let len = (secs * sample_rate as f32) as usize;
        let mut phase = 0.0f32;
        let samples = (0..len)
            .map(|i| {
                let t = i as f32 / sample_rate as f32;
                let vibrato = 1.0 + 0.02 * (2.0 * std::f32::consts::PI * self.vibrato_hz * t).sin();
                phase += 2.0 * std::f32::consts::PI * self.f0 * vibrato / sample_rate as f32;
                let harmonics: f32 = (1..=12)
                    .map(|h| (phase * h as f32).sin() * self.tilt.powi(h - 1))
                    .sum();
                0.2 * harmonics + 0.004 * rng.gen_range(-1.0..1.0)
            })
            .collect();
        Waveform::new(samples, sample_rate)
    }
}

/// Seeded white noise in [-amplitude, amplitude]
fn white_noise(sample_rate: u32, secs: f32, amplitude: f32, seed: u64) -> Waveform {
    let mut rng = StdRng::seed_from_u64(seed);
    let len = (secs * sample_rate as f32) as usize;
    let samples = (0..len)
        .map(|_| rng.gen_range(-amplitude..amplitude))
        .collect();
    Waveform::new(samples, sample_rate)
}

/// Keep each block's magnitude spectrum but replace its phases with random
/// ones, the way a careless vocoder would
fn scramble_phase(waveform: &Waveform, block: usize, seed: u64) -> Waveform {
    let mut rng = StdRng::seed_from_u64(seed);
    let mut planner = FftPlanner::<f32>::new();
    let forward = planner.plan_fft_forward(block);
    let inverse = planner.plan_fft_inverse(block);

    let mut samples = Vec::with_capacity(waveform.samples.len());
    for chunk in waveform.samples.chunks_exact(block) {
        let mut buffer: Vec<Complex<f32>> = chunk.iter().map(|&s| Complex::new(s, 0.0)).collect();
        forward.process(&mut buffer);
        // DC and Nyquist stay real; the rest keeps conjugate symmetry
        for k in 1..block / 2 {
            let angle = rng.gen_range(0.0..std::f32::consts::TAU);
            buffer[k] = Complex::from_polar(buffer[k].norm(), angle);
            buffer[block - k] = buffer[k].conj();
        }
        inverse.process(&mut buffer);
        samples.extend(buffer.iter().map(|c| c.re / block as f32));
    }
    Waveform::new(samples, waveform.sample_rate)
}

fn asset(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("assets")
        .join(name)
}

fn engine() -> VerificationEngine {
    VerificationEngine::with_defaults().expect("default engine")
}

#[test]
fn test_analyze_is_deterministic() {
    let engine = engine();
    engine.enroll(&ALICE.say(16_000, 3.0, 1)).unwrap();

    let sample = BOB.say(16_000, 3.0, 2);
    let first = engine.analyze(&sample, Strictness::Normal).unwrap();
    let second = engine.analyze(&sample, Strictness::Normal).unwrap();
    assert_eq!(first, second);
    assert_eq!(
        first.deviation.to_bits(),
        second.deviation.to_bits(),
        "deviation must be bit-identical"
    );
}

#[test]
fn test_self_match_idempotence() {
    let engine = engine();
    for (i, sample) in [ALICE.say(16_000, 3.5, 3), BOB.say(44_100, 2.0, 4)]
        .iter()
        .enumerate()
    {
        engine.enroll(sample).unwrap();
        let verdict = engine.analyze(sample, Strictness::Strict).unwrap();
        assert!(verdict.is_match, "take {} did not self-match", i);
        assert_eq!(verdict.match_rule, MatchRule::IdenticalRecording);
        assert!(verdict.phase_similarity > 0.95);
        assert!(verdict.spectral_similarity > 0.95);
        assert!((verdict.confidence - 0.98).abs() < 1e-6);
    }
}

#[test]
fn test_same_speaker_closer_than_different_speaker() {
    let engine = engine();
    engine.enroll(&ALICE.say(16_000, 3.0, 10)).unwrap();

    let same = engine
        .analyze(&ALICE.say(16_000, 3.0, 11), Strictness::Normal)
        .unwrap();
    let other = engine
        .analyze(&BOB.say(16_000, 3.0, 12), Strictness::Normal)
        .unwrap();

    println!("same: {:?}", same);
    println!("other: {:?}", other);
    assert!(same.mfcc_similarity > other.mfcc_similarity);
    assert!(same.deviation < other.deviation);
    assert!(same.is_match);
}

#[test]
fn test_no_baseline_guard() {
    let engine = engine();
    let err = engine
        .analyze(&ALICE.say(16_000, 2.0, 5), Strictness::VeryRelaxed)
        .unwrap_err();
    assert_eq!(err, EngineError::Signature(SignatureError::NoBaseline));

    engine.enroll(&ALICE.say(16_000, 2.0, 5)).unwrap();
    engine.reset().unwrap();
    assert!(engine
        .analyze(&ALICE.say(16_000, 2.0, 5), Strictness::VeryRelaxed)
        .unwrap_err()
        .is_no_baseline());
}

#[test]
fn test_monotonic_strictness_on_real_features() {
    let engine = engine();
    engine.enroll(&ALICE.say(16_000, 3.0, 20)).unwrap();
    let candidate = engine.extract(&BOB.say(16_000, 3.0, 21)).unwrap();

    let mut was_match = false;
    for strictness in Strictness::ALL {
        let verdict = engine.analyze_features(&candidate, strictness).unwrap();
        assert!(verdict.is_match || !was_match);
        was_match = verdict.is_match;
    }
}

#[test]
fn test_shipped_assets_load() {
    let calibration = CalibrationParameters::load_from_file(asset("calibration.json")).unwrap();
    assert_eq!(calibration, CalibrationParameters::default());

    let config = AppConfig::load_from_file(asset("engine_config.json"));
    assert_eq!(config, AppConfig::default());
}

#[test]
fn test_invalid_calibration_fails_before_analyze() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("bad_calibration.json");
    std::fs::write(
        &path,
        r#"{ "weights": { "mfcc": 0.5, "phase": 0.5, "spectral": 0.25, "jitter": 0.0 },
            "phase_threshold": 0.3, "ai_phase_multiplier": 2.0,
            "strictness_thresholds": { "strict": 0.15, "normal": 0.30, "relaxed": 0.50, "very_relaxed": 0.70 } }"#,
    )
    .unwrap();

    let err = CalibrationParameters::load_from_file(&path).unwrap_err();
    assert!(matches!(err, CalibrationError::WeightsDoNotSumToOne { .. }));
}

#[test]
fn test_loudest_trim_strategy() {
    let mut config = AppConfig::default();
    config.normalizer.trim = TrimStrategy::Loudest;
    let engine = VerificationEngine::new(config, CalibrationParameters::default()).unwrap();

    // quiet lead-in followed by a long loud take
    let mut samples = vec![0.0f32; 16_000];
    samples.extend(ALICE.say(16_000, 5.0, 30).samples);
    let sample = Waveform::new(samples, 16_000);

    engine.enroll(&sample).unwrap();
    let verdict = engine.analyze(&sample, Strictness::Strict).unwrap();
    assert!(verdict.is_match);
}

#[test]
fn test_concurrent_analyze_and_enroll() {
    let engine = Arc::new(engine());
    let baseline = ALICE.say(16_000, 2.0, 40);
    engine.enroll(&baseline).unwrap();
    let expected = engine.analyze(&baseline, Strictness::Normal).unwrap();

    let readers: Vec<_> = (0..4)
        .map(|_| {
            let engine = Arc::clone(&engine);
            let baseline = baseline.clone();
            thread::spawn(move || {
                for _ in 0..3 {
                    let verdict = engine.analyze(&baseline, Strictness::Normal).unwrap();
                    assert!(verdict.is_match);
                    assert_eq!(verdict.match_rule, MatchRule::IdenticalRecording);
                }
            })
        })
        .collect();

    let writer = {
        let engine = Arc::clone(&engine);
        let baseline = baseline.clone();
        thread::spawn(move || {
            for _ in 0..3 {
                engine.enroll(&baseline).unwrap();
            }
        })
    };

    for handle in readers {
        handle.join().unwrap();
    }
    writer.join().unwrap();

    let after = engine.analyze(&baseline, Strictness::Normal).unwrap();
    assert_eq!(after, expected);
}

#[test]
fn test_different_take_is_not_an_identical_recording() {
    let engine = engine();
    engine.enroll(&ALICE.say(16_000, 3.0, 50)).unwrap();

    // close in timbre, but a different voice and a different recording
    let cousin = Speaker {
        f0: 125.0,
        tilt: 0.78,
        vibrato_hz: 5.0,
    };
    let verdict = engine
        .analyze(&cousin.say(16_000, 3.0, 51), Strictness::Strict)
        .unwrap();
    println!("cousin: {:?}", verdict);
    assert_ne!(verdict.match_rule, MatchRule::IdenticalRecording);
}

#[test]
fn test_noise_has_low_phase_similarity() {
    let engine = engine();
    engine.enroll(&ALICE.say(16_000, 3.0, 52)).unwrap();

    let voice = engine
        .analyze(&ALICE.say(16_000, 3.0, 53), Strictness::Normal)
        .unwrap();
    let noise = engine
        .analyze(&white_noise(16_000, 3.0, 0.3, 54), Strictness::Normal)
        .unwrap();
    println!("voice: {:?}", voice);
    println!("noise: {:?}", noise);
    assert!(voice.phase_similarity > 0.8);
    assert!(noise.phase_similarity < 0.5);
    assert!(noise.phase_discontinuity > 2.0 * voice.phase_discontinuity);
    assert_ne!(noise.match_rule, MatchRule::IdenticalRecording);
    assert!(!noise.is_match);
}

#[test]
fn test_phase_scrambled_take_is_flagged() {
    let engine = engine();
    engine.enroll(&ALICE.say(16_000, 3.0, 60)).unwrap();
    let ai_threshold = CalibrationParameters::default().ai_phase_threshold();

    let natural = engine
        .analyze(&ALICE.say(16_000, 3.0, 61), Strictness::Normal)
        .unwrap();
    assert!(natural.phase_discontinuity < ai_threshold);
    assert!(!natural.is_ai_generated);

    // same speaker, phases destroyed: phase similarity collapses
    let scrambled_self = engine
        .analyze(&scramble_phase(&ALICE.say(16_000, 3.0, 62), 256, 63), Strictness::Normal)
        .unwrap();
    println!("scrambled self: {:?}", scrambled_self);
    assert!(scrambled_self.phase_similarity < 0.5);
    assert!(scrambled_self.phase_similarity < natural.phase_similarity);
    assert!(scrambled_self.phase_discontinuity > ai_threshold);

    // different speaker with synthesis artifacts raises the AI flag
    let scrambled_other = engine
        .analyze(&scramble_phase(&BOB.say(16_000, 3.0, 64), 256, 65), Strictness::Normal)
        .unwrap();
    println!("scrambled other: {:?}", scrambled_other);
    assert!(scrambled_other.phase_discontinuity > ai_threshold);
    assert!(scrambled_other.is_ai_generated);
}

#[test]
fn test_silent_window_after_trim_is_not_enrolled() {
    let engine = engine();

    // 1 s of speech then 10 s of silence: the centered window is all zeros
    let mut samples = ALICE.say(16_000, 1.0, 70).samples;
    samples.extend(std::iter::repeat(0.0f32).take(160_000));
    let err = engine.enroll(&Waveform::new(samples, 16_000)).unwrap_err();

    assert!(matches!(err, EngineError::InvalidAudio(AudioError::Silent { .. })));
    assert!(engine.baseline().unwrap().is_none());
}
