//! Upstream source and downstream sink contracts.
//!
//! Device wrappers, file readers, and graph fan-outs all present the same
//! [`AudioSource`] interface to the framer; buffer adapters drive any
//! [`AudioSink`]. Data always travels as one `Vec` per channel.
//!
//! ## End-of-stream convention
//!
//! A source signals end-of-stream by returning buffers that are all empty
//! (see [`is_end_of_stream`]). A short read (fewer frames than requested, but
//! not zero) is legal; the reader zero-pads it with [`pad_frames`] before
//! further processing.
//!
//! ## In-memory implementations
//!
//! [`MemorySource`] and [`MemorySink`] back offline processing and tests.

use crate::arrays;
use crate::error::{Error, Result};

/// A pull-based producer of multi-channel real samples.
pub trait AudioSource {
    /// Number of channels returned by every [`read`](Self::read).
    fn channels(&self) -> usize;

    /// Sample rate in Hz.
    fn sample_rate(&self) -> f32;

    /// Read up to `frames` samples per channel.
    ///
    /// Returns one buffer per channel. All-empty buffers mean end-of-stream;
    /// shorter buffers are a short read.
    fn read(&mut self, frames: usize) -> Result<Vec<Vec<f32>>>;
}

impl<S: AudioSource + ?Sized> AudioSource for Box<S> {
    fn channels(&self) -> usize {
        (**self).channels()
    }

    fn sample_rate(&self) -> f32 {
        (**self).sample_rate()
    }

    fn read(&mut self, frames: usize) -> Result<Vec<Vec<f32>>> {
        (**self).read(frames)
    }
}

/// A consumer that requires fixed-size multi-channel writes.
pub trait AudioSink {
    /// Element type accepted by [`write`](Self::write).
    type Sample: Copy + Default;

    /// Number of channel buffers every write must carry.
    fn channels(&self) -> usize;

    /// Required number of samples per channel per write.
    fn buffer_size(&self) -> usize;

    /// Whether the final partial buffer must be padded to
    /// [`buffer_size`](Self::buffer_size). Consulted only when flushing.
    ///
    /// Sinks that express no preference are treated as strict.
    fn strict_buffer_size(&self) -> bool {
        true
    }

    /// Write one buffer per channel.
    fn write(&mut self, data: &[Vec<Self::Sample>]) -> Result<()>;

    /// Release the sink. Called once, after the final write.
    fn close(&mut self) -> Result<()> {
        Ok(())
    }
}

/// Returns true if every channel buffer is empty.
pub fn is_end_of_stream<T>(data: &[Vec<T>]) -> bool {
    data.iter().all(Vec::is_empty)
}

/// Zero-pad every channel buffer at the end to at least `frames` samples.
pub fn pad_frames<T: Copy + Default>(data: Vec<Vec<T>>, frames: usize) -> Vec<Vec<T>> {
    data.into_iter()
        .map(|channel| arrays::zpad(channel, frames))
        .collect()
}

/// Validate a multi-channel buffer set and return its per-channel length.
///
/// # Errors
///
/// [`Error::ChannelMismatch`] if `data.len() != expected`, or
/// [`Error::RaggedChannels`] if the channels differ in length.
pub fn check_channels<T>(data: &[Vec<T>], expected: usize) -> Result<usize> {
    if data.len() != expected {
        return Err(Error::ChannelMismatch {
            expected,
            actual: data.len(),
        });
    }
    let frames = data.first().map_or(0, Vec::len);
    for (channel, buf) in data.iter().enumerate().skip(1) {
        if buf.len() != frames {
            return Err(Error::RaggedChannels {
                channel,
                expected: frames,
                actual: buf.len(),
            });
        }
    }
    Ok(frames)
}

/// An [`AudioSource`] that plays back pre-loaded channel data once.
#[derive(Debug, Clone)]
pub struct MemorySource {
    data: Vec<Vec<f32>>,
    position: usize,
    sample_rate: f32,
    max_read: Option<usize>,
}

impl MemorySource {
    /// Creates a source from one buffer per channel.
    ///
    /// # Errors
    ///
    /// Returns [`Error::RaggedChannels`] if the channels differ in length.
    pub fn new(data: Vec<Vec<f32>>, sample_rate: f32) -> Result<Self> {
        check_channels(&data, data.len())?;
        Ok(Self {
            data,
            position: 0,
            sample_rate,
            max_read: None,
        })
    }

    /// Creates a single-channel source.
    pub fn mono(samples: Vec<f32>, sample_rate: f32) -> Self {
        Self {
            data: vec![samples],
            position: 0,
            sample_rate,
            max_read: None,
        }
    }

    /// Cap the number of frames returned per read, producing short reads.
    pub fn with_max_read(mut self, max_read: usize) -> Self {
        self.max_read = Some(max_read);
        self
    }

    /// Frames not yet read.
    pub fn remaining(&self) -> usize {
        self.data.first().map_or(0, Vec::len) - self.position
    }
}

impl AudioSource for MemorySource {
    fn channels(&self) -> usize {
        self.data.len()
    }

    fn sample_rate(&self) -> f32 {
        self.sample_rate
    }

    fn read(&mut self, frames: usize) -> Result<Vec<Vec<f32>>> {
        let limit = self.max_read.map_or(frames, |max| frames.min(max));
        let count = limit.min(self.remaining());
        let start = self.position;
        self.position += count;
        Ok(self
            .data
            .iter()
            .map(|channel| channel[start..start + count].to_vec())
            .collect())
    }
}

/// An [`AudioSink`] that records every write.
#[derive(Debug, Clone)]
pub struct MemorySink<T> {
    channels: usize,
    buffer_size: usize,
    strict: bool,
    writes: Vec<Vec<Vec<T>>>,
    closed: bool,
}

impl<T: Copy + Default> MemorySink<T> {
    /// Creates a strict sink with the given channel count and buffer size.
    pub fn new(channels: usize, buffer_size: usize) -> Self {
        Self {
            channels,
            buffer_size,
            strict: true,
            writes: Vec::new(),
            closed: false,
        }
    }

    /// Set whether the final partial buffer must be padded.
    pub fn with_strict(mut self, strict: bool) -> Self {
        self.strict = strict;
        self
    }

    /// Every write received so far, in order.
    pub fn writes(&self) -> &[Vec<Vec<T>>] {
        &self.writes
    }

    /// All samples written to `channel`, concatenated.
    pub fn channel_data(&self, channel: usize) -> Vec<T> {
        self.writes
            .iter()
            .flat_map(|w| w[channel].iter().copied())
            .collect()
    }

    /// Returns true once [`AudioSink::close`] has been called.
    pub fn is_closed(&self) -> bool {
        self.closed
    }
}

impl<T: Copy + Default> AudioSink for MemorySink<T> {
    type Sample = T;

    fn channels(&self) -> usize {
        self.channels
    }

    fn buffer_size(&self) -> usize {
        self.buffer_size
    }

    fn strict_buffer_size(&self) -> bool {
        self.strict
    }

    fn write(&mut self, data: &[Vec<T>]) -> Result<()> {
        check_channels(data, self.channels)?;
        self.writes.push(data.to_vec());
        Ok(())
    }

    fn close(&mut self) -> Result<()> {
        self.closed = true;
        Ok(())
    }
}
