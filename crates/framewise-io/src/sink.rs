//! Streaming WAV writer.

use crate::wav::{WavSpec, int_scale, quantize};
use crate::{Error, Result};
use framewise_core::AudioSink;
use framewise_core::io::check_channels;
use hound::WavWriter;
use std::fs::File;
use std::io::BufWriter;
use std::path::{Path, PathBuf};

/// An [`AudioSink`] that writes fixed-size buffers to a WAV file.
///
/// Writes must carry one buffer per channel of at most `buffer_size` frames.
/// The file header is finalized on [`close`](AudioSink::close). Dropping an
/// open sink also finalizes, but any error is lost.
pub struct WavSink {
    writer: Option<WavWriter<BufWriter<File>>>,
    path: PathBuf,
    spec: WavSpec,
    buffer_size: usize,
    strict: bool,
    frames_written: u64,
}

impl WavSink {
    /// Create (or truncate) a WAV file accepting `buffer_size`-frame writes.
    ///
    /// The sink is strict by default: a buffer adapter pads its final
    /// partial write to `buffer_size`.
    pub fn create<P: AsRef<Path>>(path: P, spec: WavSpec, buffer_size: usize) -> Result<Self> {
        if buffer_size == 0 {
            return Err(framewise_core::Error::ZeroBufferSize.into());
        }
        let path = path.as_ref().to_path_buf();
        let writer = WavWriter::create(&path, hound::WavSpec::from(spec))?;
        tracing::debug!(
            "wav_create: {} ({} ch, {} Hz, {}-bit, buffer {buffer_size})",
            path.display(),
            spec.channels,
            spec.sample_rate,
            spec.bits_per_sample
        );
        Ok(Self {
            writer: Some(writer),
            path,
            spec,
            buffer_size,
            strict: true,
            frames_written: 0,
        })
    }

    /// Set whether the final partial buffer must be padded.
    pub fn with_strict(mut self, strict: bool) -> Self {
        self.strict = strict;
        self
    }

    /// File specification.
    pub fn spec(&self) -> WavSpec {
        self.spec
    }

    /// Frames written so far.
    pub fn frames_written(&self) -> u64 {
        self.frames_written
    }

    /// Returns true once the file header has been finalized.
    pub fn is_finalized(&self) -> bool {
        self.writer.is_none()
    }

    fn write_frames(&mut self, data: &[Vec<f32>]) -> Result<()> {
        let frames = check_channels(data, self.spec.channels as usize)?;
        if frames > self.buffer_size {
            return Err(Error::OversizedWrite {
                frames,
                buffer_size: self.buffer_size,
            });
        }
        let writer = self.writer.as_mut().ok_or(Error::SinkClosed)?;

        if self.spec.bits_per_sample == 32 {
            for i in 0..frames {
                for channel in data {
                    writer.write_sample(channel[i])?;
                }
            }
        } else {
            let scale = int_scale(self.spec.bits_per_sample);
            for i in 0..frames {
                for channel in data {
                    writer.write_sample(quantize(channel[i], scale))?;
                }
            }
        }
        self.frames_written += frames as u64;
        Ok(())
    }

    fn finalize(&mut self) -> Result<()> {
        if let Some(writer) = self.writer.take() {
            writer.finalize()?;
            tracing::debug!(
                "wav_finalize: {} ({} frames)",
                self.path.display(),
                self.frames_written
            );
        }
        Ok(())
    }
}

impl std::fmt::Debug for WavSink {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WavSink")
            .field("path", &self.path)
            .field("spec", &self.spec)
            .field("buffer_size", &self.buffer_size)
            .field("strict", &self.strict)
            .field("frames_written", &self.frames_written)
            .finish_non_exhaustive()
    }
}

impl AudioSink for WavSink {
    type Sample = f32;

    fn channels(&self) -> usize {
        self.spec.channels as usize
    }

    fn buffer_size(&self) -> usize {
        self.buffer_size
    }

    fn strict_buffer_size(&self) -> bool {
        self.strict
    }

    fn write(&mut self, data: &[Vec<f32>]) -> framewise_core::Result<()> {
        Ok(self.write_frames(data)?)
    }

    fn close(&mut self) -> framewise_core::Result<()> {
        Ok(self.finalize()?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::read_wav;
    use tempfile::NamedTempFile;

    #[test]
    fn test_writes_and_finalizes() {
        let file = NamedTempFile::new().unwrap();
        let spec = WavSpec {
            channels: 2,
            ..Default::default()
        };
        let mut sink = WavSink::create(file.path(), spec, 4).unwrap();
        assert_eq!(sink.buffer_size(), 4);
        assert!(sink.strict_buffer_size());

        sink.write(&[vec![0.1; 4], vec![0.2; 4]]).unwrap();
        sink.write(&[vec![0.3; 2], vec![0.4; 2]]).unwrap();
        sink.close().unwrap();
        assert!(sink.is_finalized());
        assert_eq!(sink.frames_written(), 6);

        let (data, _) = read_wav(file.path()).unwrap();
        assert_eq!(data[0], vec![0.1, 0.1, 0.1, 0.1, 0.3, 0.3]);
        assert_eq!(data[1], vec![0.2, 0.2, 0.2, 0.2, 0.4, 0.4]);
    }

    #[test]
    fn test_rejects_bad_writes() {
        let file = NamedTempFile::new().unwrap();
        let mut sink = WavSink::create(file.path(), WavSpec::default(), 4).unwrap();
        assert!(sink.write(&[vec![0.0; 5]]).is_err(), "longer than buffer size");
        assert!(sink.write(&[vec![0.0; 4], vec![0.0; 4]]).is_err(), "wrong channel count");

        sink.close().unwrap();
        sink.close().unwrap();
        assert!(sink.write(&[vec![0.0; 4]]).is_err(), "after close");
    }

    #[test]
    fn test_zero_buffer_size_rejected() {
        let file = NamedTempFile::new().unwrap();
        let err = WavSink::create(file.path(), WavSpec::default(), 0).unwrap_err();
        assert!(matches!(
            err,
            Error::Core(framewise_core::Error::ZeroBufferSize)
        ));
    }
}
