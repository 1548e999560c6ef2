use crate::error::CheckError;

/// Collapses interleaved PCM into a mono sample stream.
///
/// Each output sample is the plain average of one frame, every channel at
/// equal weight. This is a lossy shortcut (no pan law, no LFE handling), good
/// enough for a loudness proxy and nothing more.
///
/// Batches may be any length; a frame split across two batches is carried
/// over until its remaining channel values arrive.
pub struct MonoExtractor {
    channels: usize,
    pending: Vec<f32>,
    samples: Vec<f32>,
}

impl MonoExtractor {
    pub fn new(channels: usize) -> Result<Self, CheckError> {
        if channels == 0 {
            return Err(CheckError::InvalidInput(
                "source reports 0 channels".to_string(),
            ));
        }
        Ok(Self {
            channels,
            pending: Vec::with_capacity(channels),
            samples: Vec::new(),
        })
    }

    /// Number of mono samples produced so far.
    pub fn sample_count(&self) -> usize {
        self.samples.len()
    }

    pub fn push_interleaved(&mut self, batch: &[f32]) {
        if self.channels == 1 {
            self.samples.extend_from_slice(batch);
            return;
        }

        let mut rest = batch;
        if !self.pending.is_empty() {
            let take = (self.channels - self.pending.len()).min(rest.len());
            self.pending.extend_from_slice(&rest[..take]);
            rest = &rest[take..];
            if self.pending.len() < self.channels {
                return;
            }
            self.samples.push(average(&self.pending));
            self.pending.clear();
        }

        let mut frames = rest.chunks_exact(self.channels);
        self.samples.extend(frames.by_ref().map(average));
        self.pending.extend_from_slice(frames.remainder());
    }

    pub fn finish(self) -> Vec<f32> {
        if !self.pending.is_empty() {
            log::warn!(
                "Dropping {} trailing channel values that do not form a full frame",
                self.pending.len()
            );
        }
        self.samples
    }
}

fn average(frame: &[f32]) -> f32 {
    frame.iter().sum::<f32>() / frame.len() as f32
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn averages_each_frame() {
        let mut mono = MonoExtractor::new(2).unwrap();
        mono.push_interleaved(&[1.0, -1.0, 0.5, 0.5]);
        assert_eq!(mono.finish(), vec![0.0, 0.5]);
    }

    #[test]
    fn single_channel_passes_through() {
        let mut mono = MonoExtractor::new(1).unwrap();
        mono.push_interleaved(&[0.1, -0.2]);
        mono.push_interleaved(&[0.3]);
        assert_eq!(mono.finish(), vec![0.1, -0.2, 0.3]);
    }

    #[test]
    fn accumulates_across_batches_in_order() {
        let mut mono = MonoExtractor::new(2).unwrap();
        mono.push_interleaved(&[0.2, 0.4]);
        mono.push_interleaved(&[1.0, 0.0, -0.5, -0.5]);
        assert_eq!(mono.sample_count(), 3);
        let samples = mono.finish();
        assert!((samples[0] - 0.3).abs() < 1e-6);
        assert_eq!(samples[1], 0.5);
        assert_eq!(samples[2], -0.5);
    }

    #[test]
    fn frame_split_between_batches() {
        let mut mono = MonoExtractor::new(3).unwrap();
        mono.push_interleaved(&[0.3]);
        mono.push_interleaved(&[0.3]);
        assert_eq!(mono.sample_count(), 0);
        mono.push_interleaved(&[0.3, 0.9, 0.0]);
        assert_eq!(mono.sample_count(), 1);
        mono.push_interleaved(&[0.0]);
        let samples = mono.finish();
        assert_eq!(samples.len(), 2);
        assert!((samples[0] - 0.3).abs() < 1e-6);
        assert!((samples[1] - 0.3).abs() < 1e-6);
    }

    #[test]
    fn zero_channels_is_rejected() {
        assert!(matches!(
            MonoExtractor::new(0),
            Err(CheckError::InvalidInput(_))
        ));
    }

    #[test]
    fn empty_batches_are_harmless() {
        let mut mono = MonoExtractor::new(2).unwrap();
        mono.push_interleaved(&[]);
        assert!(mono.finish().is_empty());
    }
}
