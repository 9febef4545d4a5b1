//! Overlapping, windowed frames from a hop-sized upstream source.
//!
//! Each call to [`WindowFramer::read`] pulls one hop of `H` samples per
//! channel, shifts it into a length-`L` accumulation buffer, and returns the
//! buffer multiplied by the window's pre-window.
//!
//! ## Drain
//!
//! When upstream reports end-of-stream the framer keeps going with all-zero
//! hops for `L/H - 1` frames (integer division), so every real sample already
//! in the accumulation buffer passes through every frame position before the
//! framer itself reports end-of-stream. The end-of-stream read counts as the
//! first drain frame. Once drained, every later call returns `None`.

use crate::arrays;
use crate::error::Result;
use crate::io::{AudioSource, check_channels, is_end_of_stream, pad_frames};
use crate::window::Window;

/// Cuts a stream into overlapping windowed frames.
pub struct WindowFramer<S> {
    source: S,
    window: Window,
    buffers: Vec<Vec<f32>>,
    drain: Option<usize>,
    drained: bool,
    hops: usize,
}

impl<S: AudioSource> WindowFramer<S> {
    /// Frame `source` with `window`.
    pub fn new(source: S, window: Window) -> Self {
        let buffers = vec![vec![0.0; window.length()]; source.channels()];
        Self {
            source,
            window,
            buffers,
            drain: None,
            drained: false,
            hops: 0,
        }
    }

    /// The window used for framing.
    pub fn window(&self) -> &Window {
        &self.window
    }

    /// Samples consumed per frame.
    pub fn hop(&self) -> usize {
        self.window.hop()
    }

    /// Channels per frame.
    pub fn channels(&self) -> usize {
        self.buffers.len()
    }

    /// Frames emitted so far, including drain frames.
    pub fn frames_emitted(&self) -> usize {
        self.hops
    }

    /// Returns true once the drain has completed.
    pub fn is_drained(&self) -> bool {
        self.drained
    }

    /// Borrow the upstream source.
    pub fn source(&self) -> &S {
        &self.source
    }

    /// Unwrap the upstream source.
    pub fn into_inner(self) -> S {
        self.source
    }

    /// Frames emitted after upstream end-of-stream: `L/H - 1`.
    pub fn drain_frames(&self) -> usize {
        (self.window.length() / self.window.hop()).saturating_sub(1)
    }

    /// Produce the next windowed frame, one `L`-sample buffer per channel.
    ///
    /// Returns `Ok(None)` once the stream has ended and drained.
    ///
    /// # Errors
    ///
    /// Propagates upstream errors, and [`Error::ChannelMismatch`] or
    /// [`Error::RaggedChannels`] if the upstream read is malformed.
    ///
    /// [`Error::ChannelMismatch`]: crate::Error::ChannelMismatch
    /// [`Error::RaggedChannels`]: crate::Error::RaggedChannels
    pub fn read(&mut self) -> Result<Option<Vec<Vec<f32>>>> {
        if self.drained {
            return Ok(None);
        }

        let hop = self.window.hop();
        let chunk = match self.drain {
            None => {
                let data = self.source.read(hop)?;
                if is_end_of_stream(&data) {
                    let remaining = self.drain_frames();
                    tracing::debug!(
                        "framer_drain: upstream ended after {} hops, {remaining} drain frames",
                        self.hops
                    );
                    if remaining == 0 {
                        self.finish();
                        return Ok(None);
                    }
                    self.drain = Some(remaining - 1);
                    self.silence()
                } else {
                    let frames = check_channels(&data, self.buffers.len())?;
                    if frames < hop {
                        tracing::trace!("framer_short_read: {frames} of {hop} samples");
                    }
                    let mut data = pad_frames(data, hop);
                    for channel in &mut data {
                        channel.truncate(hop);
                    }
                    data
                }
            }
            Some(0) => {
                self.finish();
                return Ok(None);
            }
            Some(n) => {
                self.drain = Some(n - 1);
                self.silence()
            }
        };

        let mut out = Vec::with_capacity(self.buffers.len());
        for (buffer, hop_data) in self.buffers.iter_mut().zip(&chunk) {
            arrays::append_shift(buffer, hop_data)?;
            let mut frame = buffer.clone();
            self.window.apply_pre(&mut frame);
            out.push(frame);
        }
        self.hops += 1;
        Ok(Some(out))
    }

    fn silence(&self) -> Vec<Vec<f32>> {
        vec![vec![0.0; self.window.hop()]; self.buffers.len()]
    }

    fn finish(&mut self) {
        tracing::debug!("framer_drained: {} frames emitted", self.hops);
        self.drained = true;
        self.drain = None;
    }
}

impl<S: AudioSource> Iterator for WindowFramer<S> {
    type Item = Result<Vec<Vec<f32>>>;

    fn next(&mut self) -> Option<Self::Item> {
        self.read().transpose()
    }
}
