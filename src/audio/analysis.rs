use clap::ValueEnum;
use serde::{Deserialize, Serialize};

use super::stats::SummaryStats;
use crate::error::CheckError;

/// RMS above this counts as a "good" bucket.
pub const DEFAULT_THRESHOLD: f64 = 0.13;
/// 22000 samples = ~500ms at 44.1kHz. Not derived from the source rate.
pub const DEFAULT_BUCKET_SIZE: usize = 22_000;

/// When a bucket is closed relative to `bucket_size`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum BoundaryPolicy {
    /// Close once one more sample would overflow the bucket: every bucket
    /// holds exactly `bucket_size` samples.
    #[default]
    Exact,
    /// Close once the count has already overflowed: buckets hold
    /// `bucket_size + 1` samples while RMS still divides by `bucket_size`.
    /// The reported bucket count stays `len / bucket_size` and is the
    /// percentage denominator, so historical scores come out unchanged.
    Legacy,
}

impl BoundaryPolicy {
    fn lookahead(self) -> usize {
        match self {
            BoundaryPolicy::Exact => 1,
            BoundaryPolicy::Legacy => 0,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct LoudnessConfig {
    pub threshold: f64,
    pub bucket_size: usize,
    pub boundary: BoundaryPolicy,
}

impl Default for LoudnessConfig {
    fn default() -> Self {
        Self {
            threshold: DEFAULT_THRESHOLD,
            bucket_size: DEFAULT_BUCKET_SIZE,
            boundary: BoundaryPolicy::default(),
        }
    }
}

impl LoudnessConfig {
    /// Validate raw user values. `bucket_size` is signed so that negative
    /// input reaches this check instead of wrapping.
    pub fn new(threshold: f64, bucket_size: i64) -> Result<Self, CheckError> {
        if !threshold.is_finite() || !(0.0..=1.0).contains(&threshold) {
            return Err(CheckError::InvalidConfiguration(format!(
                "threshold must be within 0.0..=1.0, got {}",
                threshold
            )));
        }
        if bucket_size <= 0 {
            return Err(CheckError::InvalidConfiguration(format!(
                "bucket size must be positive, got {}",
                bucket_size
            )));
        }
        let bucket_size = usize::try_from(bucket_size).map_err(|_| {
            CheckError::InvalidConfiguration(format!("bucket size {} is too large", bucket_size))
        })?;
        Ok(Self {
            threshold,
            bucket_size,
            boundary: BoundaryPolicy::default(),
        })
    }

    pub fn with_boundary(mut self, boundary: BoundaryPolicy) -> Self {
        self.boundary = boundary;
        self
    }

    /// Replace `bucket_size` with the sample count covering `bucket_ms` at
    /// the source's sample rate.
    pub fn with_bucket_ms(mut self, bucket_ms: u32, sample_rate: Option<u32>) -> Result<Self, CheckError> {
        let sample_rate = sample_rate.ok_or_else(|| {
            CheckError::InvalidInput(
                "sample rate unknown, cannot derive bucket size from a duration".to_string(),
            )
        })?;
        let samples = u64::from(sample_rate) * u64::from(bucket_ms) / 1000;
        if samples == 0 {
            return Err(CheckError::InvalidConfiguration(format!(
                "{}ms at {}Hz is shorter than one sample",
                bucket_ms, sample_rate
            )));
        }
        self.bucket_size = usize::try_from(samples).map_err(|_| {
            CheckError::InvalidConfiguration(format!("{}ms bucket is too large", bucket_ms))
        })?;
        Ok(self)
    }
}

/// Result of the bucketed loudness pass over one sample stream.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct LoudnessReport {
    pub sample_count: usize,
    pub threshold: f64,
    pub bucket_size: usize,
    pub boundary: BoundaryPolicy,
    pub bucket_count: usize,
    pub good_count: usize,
    /// Percentage of good buckets; `None` when there are no buckets at all
    pub pct_good: Option<f64>,
    #[serde(flatten)]
    pub stats: SummaryStats,
    #[serde(rename = "bucket_rms_sequence")]
    pub bucket_rms: Vec<f64>,
}

/// Running sum of squares for the bucket being filled.
struct BucketAccumulator {
    bucket_size: usize,
    lookahead: usize,
    sum_sq: f64,
    count: usize,
}

impl BucketAccumulator {
    fn new(config: &LoudnessConfig) -> Self {
        Self {
            bucket_size: config.bucket_size,
            lookahead: config.boundary.lookahead(),
            sum_sq: 0.0,
            count: 0,
        }
    }

    /// Add one sample; returns the bucket RMS when this sample closes it.
    fn push(&mut self, sample: f32) -> Option<f64> {
        let magnitude = f64::from(sample.abs());
        self.sum_sq += magnitude * magnitude;
        self.count += 1;

        if self.count + self.lookahead > self.bucket_size {
            let rms = (self.sum_sq / self.bucket_size as f64).sqrt();
            self.sum_sq = 0.0;
            self.count = 0;
            Some(rms)
        } else {
            None
        }
    }
}

/// RMS of every complete bucket, in bucket order. Trailing samples that do
/// not fill a bucket are dropped.
pub fn bucket_rms(samples: &[f32], config: &LoudnessConfig) -> Vec<f64> {
    let mut acc = BucketAccumulator::new(config);
    samples.iter().filter_map(|&s| acc.push(s)).collect()
}

pub fn analyze(samples: &[f32], config: &LoudnessConfig) -> LoudnessReport {
    log::info!(
        "Analyzing {} samples (threshold={:.3}, bucket_size={}, boundary={:?})",
        samples.len(),
        config.threshold,
        config.bucket_size,
        config.boundary
    );

    let bucket_rms = bucket_rms(samples, config);
    let bucket_count = match config.boundary {
        BoundaryPolicy::Exact => bucket_rms.len(),
        // Fewer buckets close than are counted here.
        BoundaryPolicy::Legacy => samples.len() / config.bucket_size,
    };
    let good_count = bucket_rms.iter().filter(|&&rms| rms > config.threshold).count();
    let pct_good = (bucket_count > 0).then(|| good_count as f64 / bucket_count as f64 * 100.0);

    if bucket_count == 0 {
        log::warn!(
            "{} samples do not fill a single bucket of {}",
            samples.len(),
            config.bucket_size
        );
    }
    log::debug!("buckets={}, good={}", bucket_count, good_count);

    LoudnessReport {
        sample_count: samples.len(),
        threshold: config.threshold,
        bucket_size: config.bucket_size,
        boundary: config.boundary,
        bucket_count,
        good_count,
        pct_good,
        stats: SummaryStats::compute(&bucket_rms),
        bucket_rms,
    }
}
