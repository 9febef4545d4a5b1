//! Fixed-buffer playback node.

use super::{DEFAULT_SAMPLE_RATE, SampleSource};
use crate::error::Result;
use crate::samples::SampleBuffer;

/// Plays a buffer once, `count` samples at a time.
///
/// The final chunk is short if the buffer length is not a multiple of
/// `count`; after that the node reports end-of-stream. A zero-length request
/// returns an empty buffer while data remains.
#[derive(Debug, Clone)]
pub struct Playback {
    data: SampleBuffer,
    position: usize,
    sample_rate: f32,
}

impl Playback {
    /// Play `data` (real or complex).
    pub fn new(data: impl Into<SampleBuffer>) -> Self {
        Self {
            data: data.into(),
            position: 0,
            sample_rate: DEFAULT_SAMPLE_RATE,
        }
    }

    /// Sample rate in Hz.
    pub fn with_sample_rate(mut self, sample_rate: f32) -> Self {
        self.sample_rate = sample_rate;
        self
    }

    /// Samples not yet played.
    pub fn remaining(&self) -> usize {
        self.data.len() - self.position
    }

    /// Start again from the beginning.
    pub fn rewind(&mut self) {
        self.position = 0;
    }
}

impl SampleSource for Playback {
    fn sample(&mut self, count: usize) -> Result<Option<SampleBuffer>> {
        if self.remaining() == 0 {
            return Ok(None);
        }
        let n = count.min(self.remaining());
        let range = self.position..self.position + n;
        self.position += n;
        Ok(Some(match &self.data {
            SampleBuffer::Real(v) => SampleBuffer::Real(v[range].to_vec()),
            SampleBuffer::Complex(v) => SampleBuffer::Complex(v[range].to_vec()),
        }))
    }

    fn sample_rate(&self) -> f32 {
        self.sample_rate
    }

    fn set_sample_rate(&mut self, sample_rate: f32) -> Result<()> {
        self.sample_rate = sample_rate;
        Ok(())
    }
}
