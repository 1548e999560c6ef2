use anyhow::Result;
use clap::ValueEnum;
use serde::{Deserialize, Serialize};
use std::fmt::Write;
use std::path::Path;

use crate::audio::analysis::LoudnessReport;
use crate::audio::decode::AudioData;

const SPARKLINE_URL: &str = "http://sparksvg.me/bar.svg?";

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// Labelled lines, one value per line
    #[default]
    Text,
    Json,
    /// Bucket RMS values on one comma-separated line
    Csv,
    /// Sparkline chart URL of the bucket RMS values (x1000)
    Url,
}

/// Everything reported for one input file.
#[derive(Debug, Serialize)]
pub struct TrackReport {
    pub path: String,
    pub channels: usize,
    pub sample_rate: Option<u32>,
    pub frames: usize,
    #[serde(flatten)]
    pub loudness: LoudnessReport,
}

impl TrackReport {
    pub fn new(path: &Path, audio: &AudioData, loudness: LoudnessReport) -> Self {
        Self {
            path: path.display().to_string(),
            channels: audio.channels,
            sample_rate: audio.sample_rate,
            frames: audio.frames(),
            loudness,
        }
    }
}

pub fn render_all(reports: &[TrackReport], format: OutputFormat) -> Result<String> {
    if format == OutputFormat::Json {
        let json = match reports {
            [single] => serde_json::to_string_pretty(single)?,
            many => serde_json::to_string_pretty(many)?,
        };
        return Ok(json + "\n");
    }

    let blocks = reports
        .iter()
        .map(|r| match format {
            OutputFormat::Csv => Ok(csv_line(&r.loudness) + "\n"),
            OutputFormat::Url => Ok(sparkline_url(&r.loudness) + "\n"),
            _ => render_text(r),
        })
        .collect::<Result<Vec<_>, _>>()?;
    let separator = if format == OutputFormat::Text { "\n" } else { "" };
    Ok(blocks.join(separator))
}

fn fmt_opt(value: Option<f64>) -> String {
    value.map_or_else(|| "N/A".to_string(), |v| format!("{:.6}", v))
}

pub fn render_text(report: &TrackReport) -> Result<String, std::fmt::Error> {
    let l = &report.loudness;
    let s = &l.stats;
    let mut out = String::new();

    writeln!(out, "   file: {}", report.path)?;
    writeln!(out, " thresh: {:.6}", l.threshold)?;
    writeln!(out, "bkt_siz: {}", l.bucket_size)?;
    writeln!(out, "   chan: {}", report.channels)?;
    writeln!(out, " frames: {}", report.frames)?;
    writeln!(out, "samples: {}", l.sample_count)?;
    writeln!(out, "buckets: {}", l.bucket_count)?;
    writeln!(out, "   good: {}", l.good_count)?;
    match l.pct_good {
        Some(pct) => writeln!(out, "pctgood: {:.2} %", pct)?,
        None => writeln!(out, "pctgood: N/A (no complete buckets)")?,
    }
    writeln!(out, " minrms: {}", fmt_opt(s.min))?;
    writeln!(out, " maxrms: {}", fmt_opt(s.max))?;
    writeln!(out, " avgrms: {}", fmt_opt(s.mean))?;
    writeln!(out, "   mean: {}", fmt_opt(s.mean))?;
    writeln!(out, " stddev: {}", fmt_opt(s.stddev))?;
    writeln!(out, "variance: {}", fmt_opt(s.variance))?;
    writeln!(out, "skewness: {}", fmt_opt(s.skewness))?;
    writeln!(out, "kurtosis: {}", fmt_opt(s.kurtosis))?;
    writeln!(out, "\nRMS Buckets\n\n{}", sparkline_url(l))?;
    Ok(out)
}

pub fn csv_line(loudness: &LoudnessReport) -> String {
    loudness
        .bucket_rms
        .iter()
        .map(|rms| format!("{:.6}", rms))
        .collect::<Vec<_>>()
        .join(",")
}

/// Bucket RMS scaled by 1000 and truncated, as the chart service expects integers.
pub fn sparkline_url(loudness: &LoudnessReport) -> String {
    let values: Vec<String> = loudness
        .bucket_rms
        .iter()
        .map(|rms| ((rms * 1000.0) as i64).to_string())
        .collect();
    format!("{}{}", SPARKLINE_URL, values.join(","))
}
