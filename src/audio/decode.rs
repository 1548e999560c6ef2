use indicatif::{ProgressBar, ProgressStyle};
use std::path::Path;
use symphonia::core::audio::SampleBuffer;
use symphonia::core::codecs::DecoderOptions;
use symphonia::core::formats::FormatOptions;
use symphonia::core::io::MediaSourceStream;
use symphonia::core::meta::MetadataOptions;
use symphonia::core::probe::Hint;

use super::mono::MonoExtractor;
use crate::error::CheckError;

pub struct AudioData {
    /// Mono sample stream, one value per source frame
    pub samples: Vec<f32>,
    pub channels: usize,
    pub sample_rate: Option<u32>,
}

impl AudioData {
    pub fn frames(&self) -> usize {
        self.samples.len()
    }
}

fn invalid(context: &str, path: &Path, err: impl std::fmt::Display) -> CheckError {
    CheckError::InvalidInput(format!("{} {}: {}", context, path.display(), err))
}

fn progress_bar(total_frames: Option<u64>, visible: bool) -> ProgressBar {
    if !visible {
        return ProgressBar::hidden();
    }
    match total_frames {
        Some(total) => {
            let pb = ProgressBar::new(total);
            let style = ProgressStyle::with_template(
                "[{elapsed_precise}] {bar:40.cyan/blue} {pos}/{len} frames ({eta} remaining)",
            )
            .map(|s| s.progress_chars("=>-"))
            .unwrap_or_else(|_| ProgressStyle::default_bar());
            pb.set_style(style);
            pb
        }
        None => ProgressBar::new_spinner(),
    }
}

/// Decode `path` and downmix it to mono, batch by batch.
pub fn decode_audio(path: &Path, show_progress: bool) -> Result<AudioData, CheckError> {
    let file = std::fs::File::open(path).map_err(|e| invalid("Failed to open", path, e))?;

    let mss = MediaSourceStream::new(Box::new(file), Default::default());

    let mut hint = Hint::new();
    if let Some(ext) = path.extension().and_then(|e| e.to_str()) {
        hint.with_extension(ext);
    }

    let probed = symphonia::default::get_probe()
        .format(&hint, mss, &FormatOptions::default(), &MetadataOptions::default())
        .map_err(|e| invalid("Unsupported audio format in", path, e))?;

    let mut format = probed.format;

    let track = format
        .tracks()
        .iter()
        .find(|t| t.codec_params.codec != symphonia::core::codecs::CODEC_TYPE_NULL)
        .ok_or_else(|| invalid("No audio tracks in", path, "empty container"))?;

    let track_id = track.id;
    let sample_rate = track.codec_params.sample_rate;
    let mut channels = track.codec_params.channels.map(|c| c.count());
    let pb = progress_bar(track.codec_params.n_frames, show_progress);

    log::info!(
        "  chan: {}, rate: {}",
        channels.map_or_else(|| "?".to_string(), |c| c.to_string()),
        sample_rate.map_or_else(|| "?".to_string(), |r| format!("{}Hz", r))
    );

    let mut decoder = symphonia::default::get_codecs()
        .make(&track.codec_params, &DecoderOptions::default())
        .map_err(|e| invalid("No decoder for", path, e))?;

    let mut mono: Option<MonoExtractor> = None;

    loop {
        let packet = match format.next_packet() {
            Ok(packet) => packet,
            Err(symphonia::core::errors::Error::IoError(ref e))
                if e.kind() == std::io::ErrorKind::UnexpectedEof =>
            {
                break;
            }
            Err(e) => return Err(invalid("Failed to read", path, e)),
        };

        if packet.track_id() != track_id {
            continue;
        }

        let decoded = match decoder.decode(&packet) {
            Ok(d) => d,
            Err(symphonia::core::errors::Error::DecodeError(err)) => {
                log::warn!("Skipping corrupt packet: {}", err);
                continue;
            }
            Err(e) => return Err(invalid("Failed to decode", path, e)),
        };

        let spec = *decoded.spec();
        let num_frames = decoded.frames();

        if mono.is_none() {
            let count = *channels.get_or_insert(spec.channels.count());
            mono = Some(MonoExtractor::new(count)?);
        }
        let Some(extractor) = mono.as_mut() else {
            continue;
        };

        let mut sample_buf = SampleBuffer::<f32>::new(num_frames as u64, spec);
        sample_buf.copy_interleaved_ref(decoded);
        extractor.push_interleaved(sample_buf.samples());
        pb.set_position(extractor.sample_count() as u64);
    }

    pb.finish_and_clear();

    let channels = channels.unwrap_or(0);
    let samples = match mono {
        Some(m) => m.finish(),
        // Nothing decoded; still reject a source that claims no channels.
        None => MonoExtractor::new(channels)?.finish(),
    };

    match sample_rate {
        Some(rate) => log::info!(
            "Decoded audio: {} frames, {:.1}s",
            samples.len(),
            samples.len() as f32 / rate as f32
        ),
        None => log::info!("Decoded audio: {} frames", samples.len()),
    }

    Ok(AudioData {
        samples,
        channels,
        sample_rate,
    })
}
