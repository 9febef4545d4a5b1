//! Whole-file WAV reading and writing.

use crate::{Error, Result};
use framewise_core::io::check_channels;
use hound::{SampleFormat, WavReader, WavWriter};
use std::io::Read;
use std::path::Path;

/// WAV audio encoding format.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WavFormat {
    /// Linear PCM (integer samples).
    Pcm,
    /// IEEE 754 floating-point samples.
    IeeeFloat,
}

impl From<SampleFormat> for WavFormat {
    fn from(format: SampleFormat) -> Self {
        match format {
            SampleFormat::Float => WavFormat::IeeeFloat,
            SampleFormat::Int => WavFormat::Pcm,
        }
    }
}

/// WAV file metadata extracted without loading sample data.
#[derive(Debug, Clone)]
pub struct WavInfo {
    /// Number of audio channels.
    pub channels: u16,
    /// Sample rate in Hz.
    pub sample_rate: u32,
    /// Bit depth per sample.
    pub bits_per_sample: u16,
    /// Total number of sample frames (samples per channel).
    pub num_frames: u64,
    /// Duration in seconds.
    pub duration_secs: f64,
    /// Audio encoding format.
    pub format: WavFormat,
}

/// Read WAV metadata without loading sample data.
pub fn read_wav_info<P: AsRef<Path>>(path: P) -> Result<WavInfo> {
    let reader = WavReader::open(path)?;
    let spec = reader.spec();
    let num_frames = u64::from(reader.duration());
    let duration_secs = num_frames as f64 / f64::from(spec.sample_rate);

    Ok(WavInfo {
        channels: spec.channels,
        sample_rate: spec.sample_rate,
        bits_per_sample: spec.bits_per_sample,
        num_frames,
        duration_secs,
        format: spec.sample_format.into(),
    })
}

/// WAV file specification.
///
/// 32-bit files are written as IEEE float, every other depth as integer PCM.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WavSpec {
    /// Number of audio channels.
    pub channels: u16,
    /// Sample rate in Hz (e.g., 44100, 48000).
    pub sample_rate: u32,
    /// Bit depth per sample (e.g., 16, 24, 32).
    pub bits_per_sample: u16,
}

impl Default for WavSpec {
    fn default() -> Self {
        Self {
            channels: 1,
            sample_rate: 48000,
            bits_per_sample: 32,
        }
    }
}

impl From<hound::WavSpec> for WavSpec {
    fn from(spec: hound::WavSpec) -> Self {
        Self {
            channels: spec.channels,
            sample_rate: spec.sample_rate,
            bits_per_sample: spec.bits_per_sample,
        }
    }
}

impl From<WavSpec> for hound::WavSpec {
    fn from(spec: WavSpec) -> Self {
        hound::WavSpec {
            channels: spec.channels,
            sample_rate: spec.sample_rate,
            bits_per_sample: spec.bits_per_sample,
            sample_format: if spec.bits_per_sample == 32 {
                SampleFormat::Float
            } else {
                SampleFormat::Int
            },
        }
    }
}

/// Full-scale magnitude of a signed integer sample of `bits` bits.
pub(crate) fn int_scale(bits: u16) -> f32 {
    (1i64 << (bits - 1)) as f32
}

/// Quantize a float sample to a signed integer of the given full scale.
pub(crate) fn quantize(sample: f32, scale: f32) -> i32 {
    (sample * scale).clamp(-scale, scale - 1.0) as i32
}

/// Pull up to `count` interleaved samples from `reader` as float.
///
/// Integer PCM is scaled into `[-1, 1)`.
pub(crate) fn decode<R: Read>(reader: &mut WavReader<R>, count: usize) -> Result<Vec<f32>> {
    let spec = reader.spec();
    let samples = match spec.sample_format {
        SampleFormat::Float => reader
            .samples::<f32>()
            .take(count)
            .collect::<std::result::Result<Vec<_>, _>>()?,
        SampleFormat::Int => {
            let scale = int_scale(spec.bits_per_sample);
            reader
                .samples::<i32>()
                .take(count)
                .map(|s| s.map(|v| v as f32 / scale))
                .collect::<std::result::Result<Vec<_>, _>>()?
        }
    };
    Ok(samples)
}

/// Split interleaved samples into one buffer per channel.
///
/// A trailing partial frame is dropped.
pub(crate) fn deinterleave(samples: &[f32], channels: usize) -> Vec<Vec<f32>> {
    let frames = samples.len() / channels;
    let mut out = vec![Vec::with_capacity(frames); channels];
    for frame in samples.chunks_exact(channels) {
        for (buf, &s) in out.iter_mut().zip(frame) {
            buf.push(s);
        }
    }
    out
}

/// Read a WAV file into one buffer per channel, along with its spec.
///
/// # Example
/// ```ignore
/// let (channels, spec) = read_wav("input.wav")?;
/// println!("Loaded {} frames at {} Hz", channels[0].len(), spec.sample_rate);
/// ```
pub fn read_wav<P: AsRef<Path>>(path: P) -> Result<(Vec<Vec<f32>>, WavSpec)> {
    let mut reader = WavReader::open(path)?;
    let spec = WavSpec::from(reader.spec());
    if spec.channels == 0 {
        return Err(Error::UnsupportedFormat("zero-channel WAV".into()));
    }
    let samples = decode(&mut reader, usize::MAX)?;
    Ok((deinterleave(&samples, spec.channels as usize), spec))
}

/// Write one buffer per channel to a WAV file.
///
/// `spec.channels` must match `data.len()` and every channel must have the
/// same length.
///
/// # Example
/// ```ignore
/// let silence = vec![vec![0.0f32; 48000]; 2];
/// let spec = WavSpec { channels: 2, ..Default::default() };
/// write_wav("output.wav", &silence, spec)?;
/// ```
pub fn write_wav<P: AsRef<Path>>(path: P, data: &[Vec<f32>], spec: WavSpec) -> Result<()> {
    let frames = check_channels(data, spec.channels as usize)?;
    let mut writer = WavWriter::create(path, hound::WavSpec::from(spec))?;

    if spec.bits_per_sample == 32 {
        for i in 0..frames {
            for channel in data {
                writer.write_sample(channel[i])?;
            }
        }
    } else {
        let scale = int_scale(spec.bits_per_sample);
        for i in 0..frames {
            for channel in data {
                writer.write_sample(quantize(channel[i], scale))?;
            }
        }
    }

    writer.finalize()?;
    Ok(())
}
