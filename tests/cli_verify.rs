use std::f32::consts::PI;
use std::path::{Path, PathBuf};
use std::process::Command;

use serde_json::Value;

fn cli() -> Command {
    Command::new(env!("CARGO_BIN_EXE_voice_signature_cli"))
}

/// Write a mono 16-bit WAV with a harmonic tone at `f0`
fn write_voice(dir: &Path, name: &str, f0: f32, sample_rate: u32, secs: f32) -> PathBuf {
    let path = dir.join(name);
    let spec = hound::WavSpec {
        channels: 1,
        sample_rate,
        bits_per_sample: 16,
        sample_format: hound::SampleFormat::Int,
    };
    let mut writer = hound::WavWriter::create(&path, spec).expect("create wav");
    let len = (secs * sample_rate as f32) as usize;
    for i in 0..len {
        let t = i as f32 / sample_rate as f32;
        let value: f32 = (1..=6)
            .map(|h| (2.0 * PI * f0 * h as f32 * t).sin() * 0.6f32.powi(h - 1))
            .sum::<f32>()
            * 0.2;
        writer
            .write_sample((value * i16::MAX as f32) as i16)
            .expect("write sample");
    }
    writer.finalize().expect("finalize wav");
    path
}

#[test]
fn verify_same_recording_matches() {
    let dir = tempfile::tempdir().unwrap();
    let take = write_voice(dir.path(), "take.wav", 150.0, 22_050, 3.0);

    let output = cli()
        .args(["verify", "--baseline"])
        .arg(&take)
        .arg("--sample")
        .arg(&take)
        .args(["--strictness", "strict"])
        .output()
        .expect("failed to run voice_signature_cli verify");
    assert_eq!(
        output.status.code(),
        Some(0),
        "stderr: {}",
        String::from_utf8_lossy(&output.stderr)
    );

    let stdout = String::from_utf8(output.stdout).expect("stdout UTF-8");
    let json: Value = serde_json::from_str(stdout.trim()).expect("verdict JSON payload");
    assert_eq!(json["is_match"], true);
    assert_eq!(json["match_rule"], "identical_recording");
    assert_eq!(json["strictness"], "strict");
    assert_eq!(json["verdict"], "Identical Features (Same Recording)");
}

#[test]
fn verify_writes_output_file() {
    let dir = tempfile::tempdir().unwrap();
    let take = write_voice(dir.path(), "take.wav", 150.0, 16_000, 2.0);
    let report = dir.path().join("verdict.json");

    let status = cli()
        .args(["verify", "--baseline"])
        .arg(&take)
        .arg("--sample")
        .arg(&take)
        .arg("--calibration")
        .arg(PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("assets/calibration.json"))
        .arg("--output")
        .arg(&report)
        .status()
        .expect("failed to run verify with output");
    assert!(status.success());

    let json: Value =
        serde_json::from_str(&std::fs::read_to_string(&report).unwrap()).expect("report JSON");
    assert_eq!(json["risk_level"], "MINIMAL");
    assert!(json["baseline"].as_str().unwrap().ends_with("take.wav"));
}

#[test]
fn verify_silent_sample_is_an_error() {
    let dir = tempfile::tempdir().unwrap();
    let take = write_voice(dir.path(), "take.wav", 150.0, 16_000, 2.0);
    let silent = write_voice(dir.path(), "silent.wav", 150.0, 16_000, 0.0);

    let output = cli()
        .args(["verify", "--baseline"])
        .arg(&take)
        .arg("--sample")
        .arg(&silent)
        .output()
        .expect("failed to run verify");
    assert_eq!(output.status.code(), Some(1));
}

#[test]
fn features_prints_vector() {
    let dir = tempfile::tempdir().unwrap();
    let take = write_voice(dir.path(), "take.wav", 120.0, 16_000, 2.0);

    let output = cli()
        .args(["features", "--input"])
        .arg(&take)
        .output()
        .expect("failed to run features");
    assert!(output.status.success());

    let json: Value = serde_json::from_slice(&output.stdout).expect("feature JSON");
    assert_eq!(json["cepstral"].as_array().map(Vec::len), Some(26));
    assert!(json["spectral"]["centroid"].as_f64().unwrap() > 0.0);
    assert!(json["phase"]["discontinuity"].is_number());
}

#[test]
fn check_calibration_rejects_bad_weights() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("calibration.json");
    std::fs::write(
        &path,
        r#"{ "weights": { "mfcc": 0.9, "phase": 0.3, "spectral": 0.25 },
            "phase_threshold": 0.3, "ai_phase_multiplier": 2.0,
            "strictness_thresholds": { "strict": 0.15, "normal": 0.30, "relaxed": 0.50, "very_relaxed": 0.70 } }"#,
    )
    .unwrap();

    let output = cli()
        .args(["check-calibration", "--path"])
        .arg(&path)
        .output()
        .expect("failed to run check-calibration");
    assert_eq!(output.status.code(), Some(1));
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("sum"), "unexpected stderr: {stderr}");
}

#[test]
fn check_calibration_accepts_shipped_asset() {
    let output = cli()
        .args(["check-calibration", "--path"])
        .arg(PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("assets/calibration.json"))
        .output()
        .expect("failed to run check-calibration");
    assert!(output.status.success());
}
