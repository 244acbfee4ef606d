use std::fs;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use serde::Serialize;
use voice_signature::{
    AppConfig, CalibrationParameters, Strictness, VerdictRecord, VerificationEngine,
};

#[path = "voice_signature_cli/wav.rs"]
mod wav;

/// Exit code when the sample does not match the baseline
const EXIT_MISMATCH: u8 = 3;

#[derive(Parser, Debug)]
#[command(
    name = "voice_signature_cli",
    about = "Enroll a baseline recording and verify a sample against it"
)]
struct Cli {
    /// Engine configuration JSON (defaults to built-in values)
    #[arg(long, global = true)]
    config: Option<PathBuf>,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Enroll BASELINE and score SAMPLE against it
    Verify {
        #[arg(long)]
        baseline: PathBuf,
        #[arg(long)]
        sample: PathBuf,
        #[arg(long, default_value_t = Strictness::Normal)]
        strictness: Strictness,
        /// Calibration record JSON (defaults to the reference calibration)
        #[arg(long)]
        calibration: Option<PathBuf>,
        #[arg(long)]
        output: Option<PathBuf>,
    },
    /// Print the feature vector of a recording
    Features {
        #[arg(long)]
        input: PathBuf,
    },
    /// Validate a calibration record
    CheckCalibration {
        #[arg(long)]
        path: PathBuf,
    },
}

fn main() -> ExitCode {
    voice_signature::init_logging();
    match run() {
        Ok(code) => code,
        Err(err) => {
            eprintln!("Error: {err:?}");
            ExitCode::from(1)
        }
    }
}

fn run() -> Result<ExitCode> {
    let cli = Cli::parse();
    let config = cli
        .config
        .as_deref()
        .map(AppConfig::load_from_file)
        .unwrap_or_default();

    match cli.command {
        Commands::Verify {
            baseline,
            sample,
            strictness,
            calibration,
            output,
        } => run_verify(
            config,
            &baseline,
            &sample,
            strictness,
            calibration.as_deref(),
            output,
        ),
        Commands::Features { input } => run_features(config, &input),
        Commands::CheckCalibration { path } => run_check_calibration(&path),
    }
}

fn run_verify(
    config: AppConfig,
    baseline: &Path,
    sample: &Path,
    strictness: Strictness,
    calibration_path: Option<&Path>,
    output_path: Option<PathBuf>,
) -> Result<ExitCode> {
    let calibration = match calibration_path {
        Some(path) => CalibrationParameters::load_from_file(path)
            .with_context(|| format!("loading calibration {}", path.display()))?,
        None => CalibrationParameters::default(),
    };
    let engine = VerificationEngine::new(config, calibration)?;

    let baseline_audio = wav::load_wav(baseline)?;
    engine
        .enroll(&baseline_audio)
        .with_context(|| format!("enrolling {}", baseline.display()))?;

    let sample_audio = wav::load_wav(sample)?;
    let verdict = engine
        .analyze(&sample_audio, strictness)
        .with_context(|| format!("analyzing {}", sample.display()))?;

    emit_verdict(baseline, sample, &verdict, output_path)?;

    if verdict.is_match {
        Ok(ExitCode::from(0))
    } else {
        Ok(ExitCode::from(EXIT_MISMATCH))
    }
}

fn run_features(config: AppConfig, input: &Path) -> Result<ExitCode> {
    let engine = VerificationEngine::new(config, CalibrationParameters::default())?;
    let audio = wav::load_wav(input)?;
    let features = engine
        .extract(&audio)
        .with_context(|| format!("extracting features from {}", input.display()))?;
    println!("{}", serde_json::to_string_pretty(&features)?);
    Ok(ExitCode::from(0))
}

fn run_check_calibration(path: &Path) -> Result<ExitCode> {
    let params = CalibrationParameters::load_from_file(path)
        .with_context(|| format!("validating {}", path.display()))?;
    println!("{}", serde_json::to_string_pretty(&params)?);
    Ok(ExitCode::from(0))
}

fn emit_verdict(
    baseline: &Path,
    sample: &Path,
    verdict: &VerdictRecord,
    output_path: Option<PathBuf>,
) -> Result<()> {
    let report = VerifyReportPayload {
        baseline: baseline.display().to_string(),
        sample: sample.display().to_string(),
        verdict,
    };
    let json = serde_json::to_string_pretty(&report)?;

    if let Some(path) = output_path {
        fs::write(&path, json).with_context(|| format!("writing {}", path.display()))?;
    } else {
        println!("{json}");
    }

    Ok(())
}

#[derive(Serialize)]
struct VerifyReportPayload<'a> {
    baseline: String,
    sample: String,
    #[serde(flatten)]
    verdict: &'a VerdictRecord,
}
