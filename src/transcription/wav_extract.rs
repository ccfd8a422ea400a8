//! WAV helpers: duration, sample writing, and time-range extraction.

use hound::{SampleFormat, WavReader, WavSpec, WavWriter};
use std::path::Path;

const RATE_HZ: u32 = 16_000;

fn mono_16k_spec() -> WavSpec {
    WavSpec {
        channels: 1,
        sample_rate: RATE_HZ,
        bits_per_sample: 16,
        sample_format: SampleFormat::Int,
    }
}

fn ms_to_frame(ms: u64) -> u64 {
    ms * u64::from(RATE_HZ) / 1000
}

/// Length of a WAV file in seconds, from its header.
pub fn wav_duration_secs(path: &Path) -> Result<f64, String> {
    let reader = WavReader::open(path).map_err(|e| format!("{}: {}", path.display(), e))?;
    let spec = reader.spec();
    if spec.sample_rate == 0 {
        return Err(format!("{} reports a zero sample rate", path.display()));
    }
    // duration() counts frames, i.e. samples per channel
    Ok(reader.duration() as f64 / spec.sample_rate as f64)
}

/// Create (or replace) `path` holding `samples` as 16 kHz mono PCM.
pub fn write_wav_from_samples(path: &Path, samples: &[i16]) -> Result<(), String> {
    let mut wav = WavWriter::create(path, mono_16k_spec()).map_err(|e| e.to_string())?;
    samples
        .iter()
        .try_for_each(|&sample| wav.write_sample(sample))
        .map_err(|e| e.to_string())?;
    wav.finalize().map_err(|e| e.to_string())
}

/// Copy the `[start_ms, end_ms)` window of `source` into `dest`.
///
/// Only the mono 16 kHz audio produced by the extractor is accepted. A window
/// running past the end of the file is cut short; the frame count written is returned.
pub fn extract_segment(
    source: &Path,
    dest: &Path,
    start_ms: u64,
    end_ms: u64,
) -> Result<usize, String> {
    let mut wav = WavReader::open(source).map_err(|e| format!("{}: {}", source.display(), e))?;
    let WavSpec { sample_rate, channels, bits_per_sample, .. } = wav.spec();
    if (sample_rate, channels, bits_per_sample) != (RATE_HZ, 1, 16) {
        return Err(format!(
            "{}: unsupported layout {} Hz / {} channel(s) / {}-bit",
            source.display(),
            sample_rate,
            channels,
            bits_per_sample
        ));
    }

    let first = ms_to_frame(start_ms);
    let wanted = ms_to_frame(end_ms).saturating_sub(first) as usize;
    if first < u64::from(wav.duration()) {
        wav.seek(first as u32).map_err(|e| e.to_string())?;
    } else {
        return write_wav_from_samples(dest, &[]).map(|_| 0);
    }
    let window = wav
        .samples::<i16>()
        .take(wanted)
        .collect::<Result<Vec<i16>, _>>()
        .map_err(|e| e.to_string())?;

    write_wav_from_samples(dest, &window)?;
    Ok(window.len())
}
