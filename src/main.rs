mod audio;
mod cli;
mod config;
mod error;
mod report;

use anyhow::{Context, Result};
use clap::Parser;
use std::process::ExitCode;

use audio::analysis::{BoundaryPolicy, LoudnessConfig};
use cli::Cli;
use error::CheckError;
use report::TrackReport;

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .format_timestamp_millis()
        .init();

    match run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            log::error!("{:#}", err);
            let code = err
                .chain()
                .find_map(|e| e.downcast_ref::<CheckError>())
                .map_or(1, CheckError::exit_code);
            ExitCode::from(code)
        }
    }
}

fn run() -> Result<()> {
    let mut cli = Cli::parse();

    // Explicit --config path, or auto-detect sndcheck.toml / user config
    let config_path = cli.config.clone().or_else(config::discover_config);
    if let Some(ref path) = config_path {
        if let Some(cfg) = config::load_config(path) {
            log::info!("Loaded config from {}", path.display());
            cfg.apply_to(&mut cli);
        } else {
            log::warn!("Failed to load config from {}", path.display());
        }
    }

    let base = LoudnessConfig::new(cli.threshold, cli.bucket_size)?.with_boundary(cli.boundary);
    if cli.bucket_ms == Some(0) {
        return Err(CheckError::InvalidConfiguration("bucket duration must be positive".into()).into());
    }
    if base.boundary == BoundaryPolicy::Legacy {
        log::warn!(
            "Legacy boundary: buckets hold bucket_size + 1 samples but RMS divides by bucket_size"
        );
    }

    log::info!(" thresh: {:.6}", base.threshold);
    match cli.bucket_ms {
        Some(ms) => log::info!("bkt_len: {}ms", ms),
        None => log::info!("bkt_siz: {}", base.bucket_size),
    }

    let mut reports = Vec::with_capacity(cli.inputs.len());
    for input in &cli.inputs {
        if !input.exists() {
            return Err(CheckError::InvalidInput(format!(
                "Input file not found: {}",
                input.display()
            ))
            .into());
        }
        log::info!("Input: {}", input.display());

        let audio = audio::decode::decode_audio(input, !cli.no_progress)
            .with_context(|| format!("Failed to load {}", input.display()))?;

        let config = match cli.bucket_ms {
            Some(ms) => base
                .with_bucket_ms(ms, audio.sample_rate)
                .with_context(|| format!("Cannot size buckets for {}", input.display()))?,
            None => base,
        };

        let loudness = audio::analysis::analyze(&audio.samples, &config);
        match loudness.pct_good {
            Some(pct) => log::info!(
                "{}: {}/{} good buckets ({:.2}%)",
                input.display(),
                loudness.good_count,
                loudness.bucket_count,
                pct
            ),
            None => log::warn!("{}: no complete buckets, score unavailable", input.display()),
        }
        reports.push(TrackReport::new(input, &audio, loudness));
    }

    print!("{}", report::render_all(&reports, cli.format)?);
    Ok(())
}
