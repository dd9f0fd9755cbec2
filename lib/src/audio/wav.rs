//! WAV duration measurement, used both for cache hits and freshly decoded
//! tracks (spec §4.6 step 1 and step 5).

use std::path::Path;

use crate::error::UmaVoiceError;

/// `frames / sample_rate`, read from the file's header without decoding the
/// samples (spec §4.6: "Measure duration from the in-memory WAV").
pub fn read_duration(path: &Path) -> Result<f64, UmaVoiceError> {
    let reader = hound::WavReader::open(path)
        .map_err(|e| UmaVoiceError::AudioExtract(format!("reading {}: {e}", path.display())))?;
    let spec = reader.spec();
    if spec.sample_rate == 0 {
        return Ok(0.0);
    }
    Ok(reader.duration() as f64 / spec.sample_rate as f64)
}

#[cfg(test)]
pub(crate) fn write_silence(path: &Path, seconds: f64) -> Result<(), UmaVoiceError> {
    let spec = hound::WavSpec {
        channels: 1,
        sample_rate: 44_100,
        bits_per_sample: 16,
        sample_format: hound::SampleFormat::Int,
    };
    let mut writer = hound::WavWriter::create(path, spec)
        .map_err(|e| UmaVoiceError::AudioExtract(format!("{e}")))?;
    let samples = (spec.sample_rate as f64 * seconds) as u32;
    for _ in 0..samples {
        writer
            .write_sample(0i16)
            .map_err(|e| UmaVoiceError::AudioExtract(format!("{e}")))?;
    }
    writer
        .finalize()
        .map_err(|e| UmaVoiceError::AudioExtract(format!("{e}")))
}
