//! Overlap-add synthesis, the inverse of [`WindowFramer`](crate::framer::WindowFramer).
//!
//! Each pushed frame is multiplied by the window's post-window and added into
//! a length-`L` accumulator. The first `H` accumulated samples are then final:
//! they are scaled by [`Window::overlap_gain`] and returned, and the
//! accumulator shifts left by `H`.
//!
//! Output lags input by `L - H` samples; with a COLA window the samples after
//! that lag reproduce the framed input.

use crate::arrays;
use crate::error::{Error, Result};
use crate::io::check_channels;
use crate::window::Window;

/// Reassembles windowed frames into a continuous stream.
#[derive(Debug, Clone)]
pub struct OverlapAdd {
    window: Window,
    gain: f32,
    accumulators: Vec<Vec<f32>>,
}

impl OverlapAdd {
    /// Synthesizer for `channels` channels framed with `window`.
    pub fn new(window: Window, channels: usize) -> Self {
        let gain = window.overlap_gain();
        let accumulators = vec![vec![0.0; window.length()]; channels];
        Self {
            window,
            gain,
            accumulators,
        }
    }

    /// The synthesis window.
    pub fn window(&self) -> &Window {
        &self.window
    }

    /// Number of channels.
    pub fn channels(&self) -> usize {
        self.accumulators.len()
    }

    /// Output latency in samples (`L - H`).
    pub fn latency(&self) -> usize {
        self.window.overlap()
    }

    /// Add one frame per channel and return the next `H` finished samples
    /// per channel.
    ///
    /// # Errors
    ///
    /// [`Error::ChannelMismatch`] for the wrong channel count, or
    /// [`Error::RaggedChannels`] if any frame is not `L` samples long.
    pub fn push(&mut self, mut frames: Vec<Vec<f32>>) -> Result<Vec<Vec<f32>>> {
        let length = check_channels(&frames, self.accumulators.len())?;
        if length != self.window.length() && !frames.is_empty() {
            return Err(Error::RaggedChannels {
                channel: 0,
                expected: self.window.length(),
                actual: length,
            });
        }

        let hop = self.window.hop();
        let mut out = Vec::with_capacity(frames.len());
        for (acc, frame) in self.accumulators.iter_mut().zip(&mut frames) {
            self.window.apply_post(frame);
            for (a, s) in acc.iter_mut().zip(frame.iter()) {
                *a += s;
            }
            out.push(acc[..hop].iter().map(|s| s * self.gain).collect());
            arrays::shift_left_zero_fill(acc, hop);
        }
        Ok(out)
    }

    /// Return the `L - H` samples still accumulating, scaled, and reset.
    ///
    /// Only needed when frames stop arriving before a drain has pushed the
    /// tail out.
    pub fn finish(&mut self) -> Vec<Vec<f32>> {
        let hop = self.window.hop();
        let gain = self.gain;
        self.accumulators
            .iter_mut()
            .map(|acc| {
                let tail = acc[..acc.len() - hop].iter().map(|s| s * gain).collect();
                acc.fill(0.0);
                tail
            })
            .collect()
    }

    /// Clear the accumulators.
    pub fn reset(&mut self) {
        for acc in &mut self.accumulators {
            acc.fill(0.0);
        }
    }
}
