use serde::Deserialize;
use std::path::{Path, PathBuf};

use crate::audio::analysis::{BoundaryPolicy, DEFAULT_BUCKET_SIZE, DEFAULT_THRESHOLD};
use crate::cli::Cli;
use crate::report::OutputFormat;

#[derive(Debug, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub analysis: AnalysisConfig,
    #[serde(default)]
    pub output: OutputConfig,
}

#[derive(Debug, Deserialize)]
pub struct AnalysisConfig {
    #[serde(default = "default_threshold")]
    pub threshold: f64,
    #[serde(default = "default_bucket_size")]
    pub bucket_size: i64,
    #[serde(default)]
    pub bucket_ms: Option<u32>,
    #[serde(default)]
    pub boundary: BoundaryPolicy,
}

#[derive(Debug, Deserialize)]
pub struct OutputConfig {
    #[serde(default)]
    pub format: OutputFormat,
    #[serde(default = "default_progress")]
    pub progress: bool,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            threshold: default_threshold(),
            bucket_size: default_bucket_size(),
            bucket_ms: None,
            boundary: BoundaryPolicy::default(),
        }
    }
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            format: OutputFormat::default(),
            progress: default_progress(),
        }
    }
}

impl Config {
    /// Fill in CLI options that are still at their defaults.
    pub fn apply_to(self, cli: &mut Cli) {
        let size_is_default = cli.bucket_size == DEFAULT_BUCKET_SIZE as i64;
        if cli.threshold == DEFAULT_THRESHOLD { cli.threshold = self.analysis.threshold; }
        // An explicit --bucket-size wins over a duration from the file.
        if cli.bucket_ms.is_none() && size_is_default { cli.bucket_ms = self.analysis.bucket_ms; }
        if size_is_default { cli.bucket_size = self.analysis.bucket_size; }
        if cli.boundary == BoundaryPolicy::Exact { cli.boundary = self.analysis.boundary; }
        if cli.format == OutputFormat::Text { cli.format = self.output.format; }
        if !cli.no_progress { cli.no_progress = !self.output.progress; }
    }
}

fn default_threshold() -> f64 { DEFAULT_THRESHOLD }
fn default_bucket_size() -> i64 { DEFAULT_BUCKET_SIZE as i64 }
fn default_progress() -> bool { true }

pub fn load_config(path: &Path) -> Option<Config> {
    let content = std::fs::read_to_string(path).ok()?;
    toml::from_str(&content)
        .map_err(|e| log::warn!("Ignoring malformed config {}: {}", path.display(), e))
        .ok()
}

/// `./sndcheck.toml`, then the XDG-style `~/.config/sndcheck/config.toml`,
/// then the platform config directory.
pub fn discover_config() -> Option<PathBuf> {
    let local = PathBuf::from("sndcheck.toml");
    if local.exists() {
        return Some(local);
    }
    if let Some(home) = dirs::home_dir() {
        let xdg = home.join(".config").join("sndcheck").join("config.toml");
        if xdg.exists() {
            return Some(xdg);
        }
    }
    if let Some(config_dir) = dirs::config_dir() {
        let platform = config_dir.join("sndcheck").join("config.toml");
        if platform.exists() {
            return Some(platform);
        }
    }
    None
}
