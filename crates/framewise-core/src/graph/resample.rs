//! Streaming sample-rate conversion node.

use super::{DEFAULT_SAMPLE_RATE, Node, SampleSource};
use crate::error::{Error, Result};
use crate::samples::{SampleBuffer, Scalar};

/// Converts an upstream node's rate by a fixed ratio with linear
/// interpolation.
///
/// `ratio` is output rate over input rate: 2.0 doubles the rate, 0.5 halves
/// it. Each upstream read asks for `round(count / ratio)` samples (at least
/// one), and the internal buffer grows to hold whatever comes back. A `None`
/// or empty upstream read ends the input; buffered samples are still played
/// out, holding the last input value across the final interval.
pub struct Resample {
    upstream: Node,
    ratio: f64,
    pending: Vec<Scalar>,
    position: f64,
    ended: bool,
    complex: bool,
}

fn check_ratio(ratio: f64) -> Result<f64> {
    if ratio.is_finite() && ratio > 0.0 {
        Ok(ratio)
    } else {
        Err(Error::InvalidRatio(ratio))
    }
}

impl Resample {
    /// Resample `upstream` by `ratio`.
    ///
    /// # Errors
    ///
    /// [`Error::InvalidRatio`] unless `ratio` is finite and positive.
    pub fn new(upstream: Node, ratio: f64) -> Result<Self> {
        let ratio = check_ratio(ratio)?;
        tracing::debug!("resample_new: {} ratio {ratio}", upstream.id());
        Ok(Self {
            upstream,
            ratio,
            pending: Vec::new(),
            position: 0.0,
            ended: false,
            complex: false,
        })
    }

    /// Output rate over input rate.
    pub fn ratio(&self) -> f64 {
        self.ratio
    }

    /// Change the ratio. Takes effect at the next output sample.
    pub fn set_ratio(&mut self, ratio: f64) -> Result<()> {
        self.ratio = check_ratio(ratio)?;
        Ok(())
    }

    /// The node being resampled.
    pub fn upstream(&self) -> &Node {
        &self.upstream
    }

    /// Input samples buffered but not yet fully consumed.
    pub fn buffered(&self) -> usize {
        self.pending.len()
    }

    /// Read enough upstream samples for `needed` more outputs.
    fn pull(&mut self, needed: usize) -> Result<()> {
        let request = ((needed as f64 / self.ratio).round() as usize).max(1);
        match self.upstream.sample(request)? {
            Some(buf) if !buf.is_empty() => {
                let grown = self.pending.len() + buf.len();
                if grown > self.pending.capacity() {
                    tracing::debug!(
                        "resample_grow: buffer {} → {grown}",
                        self.pending.capacity()
                    );
                }
                self.pending.extend((0..buf.len()).filter_map(|i| buf.get(i)));
            }
            _ => {
                tracing::debug!("resample_end: {} ended", self.upstream.id());
                self.ended = true;
            }
        }
        Ok(())
    }

    fn is_drained(&self) -> bool {
        self.ended && self.position as usize >= self.pending.len()
    }
}

impl std::fmt::Debug for Resample {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Resample")
            .field("upstream", &self.upstream)
            .field("ratio", &self.ratio)
            .field("buffered", &self.pending.len())
            .field("ended", &self.ended)
            .finish_non_exhaustive()
    }
}

impl SampleSource for Resample {
    fn sample(&mut self, count: usize) -> Result<Option<SampleBuffer>> {
        if count == 0 {
            return Ok((!self.is_drained()).then(SampleBuffer::default));
        }

        let step = 1.0 / self.ratio;
        let mut out = Vec::with_capacity(count);
        while out.len() < count {
            let index = self.position as usize;
            let frac = (self.position - index as f64) as f32;
            if index + 1 < self.pending.len() {
                out.push(self.pending[index].lerp(self.pending[index + 1], frac));
            } else if !self.ended {
                self.pull(count - out.len())?;
                continue;
            } else if let Some(&last) = self.pending.get(index) {
                out.push(last);
            } else {
                break;
            }
            self.position += step;
        }

        let consumed = (self.position as usize).min(self.pending.len());
        self.pending.drain(..consumed);
        self.position -= consumed as f64;

        if out.is_empty() {
            return Ok(None);
        }
        let mut buf: SampleBuffer = out.into_iter().collect();
        if buf.is_complex() {
            self.complex = true;
        } else if self.complex {
            buf.promote();
        }
        Ok(Some(buf))
    }

    fn sample_rate(&self) -> f32 {
        let upstream = self.upstream.sample_rate().unwrap_or(DEFAULT_SAMPLE_RATE);
        (f64::from(upstream) * self.ratio) as f32
    }

    fn set_sample_rate(&mut self, sample_rate: f32) -> Result<()> {
        self.upstream
            .set_sample_rate((f64::from(sample_rate) / self.ratio) as f32)
    }
}
