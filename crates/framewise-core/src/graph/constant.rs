//! Constant-value node with optional linear smoothing.

use super::{DEFAULT_SAMPLE_RATE, SampleSource};
use crate::error::Result;
use crate::samples::{SampleBuffer, Scalar};

/// Always produces `count` copies of its value; never ends.
///
/// With smoothing enabled, [`set_value`](Self::set_value) ramps linearly from
/// the current output to the new value over the configured number of
/// samples instead of jumping.
#[derive(Debug, Clone)]
pub struct Constant {
    current: Scalar,
    start: Scalar,
    target: Scalar,
    ramp_len: usize,
    ramp_pos: usize,
    smoothing: usize,
    sample_rate: f32,
}

impl Constant {
    /// A constant node with no smoothing.
    pub fn new(value: impl Into<Scalar>) -> Self {
        let value = value.into();
        Self {
            current: value,
            start: value,
            target: value,
            ramp_len: 0,
            ramp_pos: 0,
            smoothing: 0,
            sample_rate: DEFAULT_SAMPLE_RATE,
        }
    }

    /// Ramp over `samples` samples whenever the value changes.
    pub fn with_smoothing(mut self, samples: usize) -> Self {
        self.smoothing = samples;
        self
    }

    /// Value the node is at or ramping towards.
    pub fn value(&self) -> Scalar {
        self.target
    }

    /// Most recently produced value.
    pub fn current(&self) -> Scalar {
        self.current
    }

    /// Returns true if no ramp is in progress.
    pub fn is_settled(&self) -> bool {
        self.ramp_pos >= self.ramp_len
    }

    /// Change the value, ramping if smoothing is enabled.
    pub fn set_value(&mut self, value: impl Into<Scalar>) {
        let value = value.into();
        if value == self.target {
            return;
        }
        self.target = value;
        if self.smoothing == 0 {
            self.set_immediate(value);
        } else {
            self.start = self.current;
            self.ramp_len = self.smoothing;
            self.ramp_pos = 0;
        }
    }

    /// Jump to `value` without ramping.
    pub fn set_immediate(&mut self, value: impl Into<Scalar>) {
        let value = value.into();
        self.current = value;
        self.start = value;
        self.target = value;
        self.ramp_len = 0;
        self.ramp_pos = 0;
    }

    fn advance(&mut self) -> Scalar {
        if self.ramp_pos < self.ramp_len {
            self.ramp_pos += 1;
            self.current = if self.ramp_pos == self.ramp_len {
                self.target
            } else {
                self.start
                    .lerp(self.target, self.ramp_pos as f32 / self.ramp_len as f32)
            };
        }
        self.current
    }
}

impl SampleSource for Constant {
    fn sample(&mut self, count: usize) -> Result<Option<SampleBuffer>> {
        if self.is_settled() {
            return Ok(Some(SampleBuffer::filled(count, self.current)));
        }
        Ok(Some((0..count).map(|_| self.advance()).collect()))
    }

    fn sample_rate(&self) -> f32 {
        self.sample_rate
    }

    fn set_sample_rate(&mut self, sample_rate: f32) -> Result<()> {
        self.sample_rate = sample_rate;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rustfft::num_complex::Complex32;

    #[test]
    fn repeats_value_forever() {
        let mut c = Constant::new(5.0);
        for _ in 0..3 {
            assert_eq!(c.sample(3).unwrap(), Some(SampleBuffer::Real(vec![5.0; 3])));
        }
    }

    #[test]
    fn complex_value_gives_complex_buffer() {
        let mut c = Constant::new(Complex32::new(0.0, 1.0));
        assert!(c.sample(2).unwrap().unwrap().is_complex());
    }

    #[test]
    fn unsmoothed_change_is_immediate() {
        let mut c = Constant::new(1.0);
        c.set_value(2.0);
        assert_eq!(c.sample(2).unwrap().unwrap().as_real().unwrap(), &[2.0, 2.0]);
    }

    #[test]
    fn smoothed_change_ramps_linearly() {
        let mut c = Constant::new(0.0).with_smoothing(4);
        c.set_value(4.0);
        assert!(!c.is_settled());
        let out = c.sample(6).unwrap().unwrap();
        assert_eq!(out.as_real().unwrap(), &[1.0, 2.0, 3.0, 4.0, 4.0, 4.0]);
        assert!(c.is_settled());
        assert_eq!(c.current(), Scalar::Real(4.0));
    }

    #[test]
    fn retarget_mid_ramp_starts_from_current() {
        let mut c = Constant::new(0.0).with_smoothing(4);
        c.set_value(8.0);
        c.sample(2).unwrap();
        c.set_value(0.0);
        let out = c.sample(4).unwrap().unwrap();
        assert_eq!(out.as_real().unwrap(), &[3.0, 2.0, 1.0, 0.0]);
    }
}
