//! Arbitrary-size writes in, fixed-size writes out.
//!
//! A [`BufferAdapter`] sits in front of an [`AudioSink`] that insists on a
//! particular buffer size. Callers write any number of frames; the adapter
//! queues them per channel in [`RingBuffer`]s and forwards exactly
//! `buffer_size` frames at a time whenever that much is queued.
//!
//! # Capacity
//!
//! Each channel's ring holds
//! `ceil((2 * sink_size + write_size) / sink_size) * sink_size` samples for
//! the largest write seen so far, which always leaves room for one sink
//! buffer plus the incoming write. Capacity grows as larger writes arrive and
//! never shrinks.
//!
//! # End of stream
//!
//! [`flush`](BufferAdapter::flush) forwards whatever is left: zero-padded to
//! full sink buffers for strict sinks, or as one exact-length write
//! otherwise. [`close`](BufferAdapter::close) flushes and then closes the sink.

use crate::error::{Error, Result};
use crate::io::{AudioSink, check_channels};
use crate::ring::RingBuffer;

/// Reconciles arbitrary write sizes with a sink's fixed buffer size.
pub struct BufferAdapter<S: AudioSink> {
    sink: S,
    rings: Vec<RingBuffer<S::Sample>>,
    sink_size: usize,
    capacity: usize,
}

/// Ring capacity needed to absorb `write_size` frames on top of a sink buffer.
fn capacity_for(sink_size: usize, write_size: usize) -> usize {
    (2 * sink_size + write_size).div_ceil(sink_size) * sink_size
}

impl<S: AudioSink> BufferAdapter<S> {
    /// Wrap `sink`, sizing the queues from its buffer size and channel count.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ZeroBufferSize`] if the sink's buffer size is zero.
    pub fn new(sink: S) -> Result<Self> {
        let sink_size = sink.buffer_size();
        if sink_size == 0 {
            return Err(Error::ZeroBufferSize);
        }
        let capacity = capacity_for(sink_size, 0);
        let rings = (0..sink.channels())
            .map(|_| RingBuffer::with_capacity(capacity))
            .collect();

        Ok(Self {
            sink,
            rings,
            sink_size,
            capacity,
        })
    }

    /// Number of channels every write must carry.
    pub fn channels(&self) -> usize {
        self.rings.len()
    }

    /// Frames forwarded to the sink per write.
    pub fn buffer_size(&self) -> usize {
        self.sink_size
    }

    /// Current per-channel queue capacity.
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Frames queued per channel and not yet forwarded.
    pub fn queued(&self) -> usize {
        self.rings.first().map_or(0, RingBuffer::len)
    }

    /// Borrow the wrapped sink.
    pub fn sink(&self) -> &S {
        &self.sink
    }

    /// Mutably borrow the wrapped sink.
    pub fn sink_mut(&mut self) -> &mut S {
        &mut self.sink
    }

    /// Unwrap the sink, discarding anything still queued.
    pub fn into_inner(self) -> S {
        self.sink
    }

    /// Queue `data` (one buffer per channel, any length) and forward every
    /// complete sink buffer.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ChannelMismatch`] or [`Error::RaggedChannels`] for
    /// malformed input, or any error raised by the sink.
    pub fn write(&mut self, data: &[Vec<S::Sample>]) -> Result<()> {
        let frames = check_channels(data, self.rings.len())?;

        let needed = capacity_for(self.sink_size, frames);
        if needed > self.capacity {
            tracing::debug!(
                "adapter_grow: {} → {} samples per channel for {frames}-frame write",
                self.capacity,
                needed
            );
            self.capacity = needed;
            for ring in &mut self.rings {
                ring.reserve(needed);
            }
        }

        for (ring, channel) in self.rings.iter_mut().zip(data) {
            ring.write(channel);
        }

        while self.queued() >= self.sink_size {
            let chunk = self.dequeue(self.sink_size)?;
            self.sink.write(&chunk)?;
        }
        Ok(())
    }

    /// Forward everything still queued.
    ///
    /// Strict sinks receive full-size buffers with the last one zero-padded;
    /// other sinks receive the exact remainder in a single write.
    pub fn flush(&mut self) -> Result<()> {
        let remaining = self.queued();
        if remaining == 0 {
            return Ok(());
        }

        if self.sink.strict_buffer_size() {
            tracing::debug!("adapter_flush: {remaining} frames, padded to {}", self.sink_size);
            while self.queued() > 0 {
                let count = self.queued().min(self.sink_size);
                let chunk = crate::io::pad_frames(self.dequeue(count)?, self.sink_size);
                self.sink.write(&chunk)?;
            }
        } else {
            tracing::debug!("adapter_flush: {remaining} frames, exact");
            let chunk = self.dequeue(remaining)?;
            self.sink.write(&chunk)?;
        }
        Ok(())
    }

    /// Flush remaining data, then close the sink.
    pub fn close(&mut self) -> Result<()> {
        self.flush()?;
        self.sink.close()
    }

    fn dequeue(&mut self, count: usize) -> Result<Vec<Vec<S::Sample>>> {
        self.rings.iter_mut().map(|ring| ring.read(count)).collect()
    }
}
