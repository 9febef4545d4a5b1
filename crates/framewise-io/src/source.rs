//! Streaming WAV reader.

use crate::wav::{WavFormat, WavSpec, decode, deinterleave};
use crate::{Error, Result};
use framewise_core::AudioSource;
use hound::WavReader;
use std::fs::File;
use std::io::BufReader;
use std::path::Path;

/// An [`AudioSource`] that streams a WAV file from disk.
///
/// Each read deinterleaves up to the requested number of frames into one
/// buffer per channel. Integer PCM is converted to float. The final read may
/// be short; every read after that returns empty buffers (end-of-stream).
pub struct WavSource {
    reader: WavReader<BufReader<File>>,
    spec: WavSpec,
    format: WavFormat,
    remaining: usize,
}

impl WavSource {
    /// Open a WAV file for streaming.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let reader = WavReader::open(path)?;
        let spec = WavSpec::from(reader.spec());
        if spec.channels == 0 {
            return Err(Error::UnsupportedFormat("zero-channel WAV".into()));
        }
        let remaining = reader.duration() as usize;
        tracing::debug!(
            "wav_open: {} ({} ch, {} Hz, {} frames)",
            path.display(),
            spec.channels,
            spec.sample_rate,
            remaining
        );
        Ok(Self {
            format: reader.spec().sample_format.into(),
            reader,
            spec,
            remaining,
        })
    }

    /// File specification.
    pub fn spec(&self) -> WavSpec {
        self.spec
    }

    /// Encoding of the underlying file.
    pub fn format(&self) -> WavFormat {
        self.format
    }

    /// Frames not yet read.
    pub fn remaining(&self) -> usize {
        self.remaining
    }

    fn read_frames(&mut self, frames: usize) -> Result<Vec<Vec<f32>>> {
        let channels = self.spec.channels as usize;
        let count = frames.min(self.remaining);
        let samples = decode(&mut self.reader, count * channels)?;
        let out = deinterleave(&samples, channels);
        let got = out.first().map_or(0, Vec::len);
        if got < count {
            tracing::debug!("wav_truncated: expected {count} frames, file yielded {got}");
            self.remaining = 0;
        } else {
            self.remaining -= got;
        }
        Ok(out)
    }
}

impl std::fmt::Debug for WavSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WavSource")
            .field("spec", &self.spec)
            .field("format", &self.format)
            .field("remaining", &self.remaining)
            .finish_non_exhaustive()
    }
}

impl AudioSource for WavSource {
    fn channels(&self) -> usize {
        self.spec.channels as usize
    }

    fn sample_rate(&self) -> f32 {
        self.spec.sample_rate as f32
    }

    fn read(&mut self, frames: usize) -> framewise_core::Result<Vec<Vec<f32>>> {
        Ok(self.read_frames(frames)?)
    }
}
