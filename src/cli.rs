use clap::Parser;
use std::path::PathBuf;

use crate::audio::analysis::BoundaryPolicy;
use crate::report::OutputFormat;

#[derive(Parser, Debug)]
#[command(name = "sndcheck", about = "Score audio tracks by the share of loud RMS buckets")]
pub struct Cli {
    /// Input audio files (WAV, MP3, FLAC, OGG, AAC)
    #[arg(required = true)]
    pub inputs: Vec<PathBuf>,

    /// RMS threshold for a good bucket (0.0-1.0)
    #[arg(short, long, default_value_t = 0.13, allow_negative_numbers = true)]
    pub threshold: f64,

    /// Samples per bucket
    #[arg(short, long, default_value_t = 22000, allow_negative_numbers = true)]
    pub bucket_size: i64,

    /// Bucket length in milliseconds; overrides --bucket-size using each file's sample rate
    #[arg(long)]
    pub bucket_ms: Option<u32>,

    /// Bucket boundary policy
    #[arg(long, value_enum, default_value_t = BoundaryPolicy::Exact)]
    pub boundary: BoundaryPolicy,

    /// Report format
    #[arg(short, long, value_enum, default_value_t = OutputFormat::Text)]
    pub format: OutputFormat,

    /// Config file (defaults to sndcheck.toml or the user config dir)
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Hide the decode progress bar
    #[arg(long)]
    pub no_progress: bool,
}
