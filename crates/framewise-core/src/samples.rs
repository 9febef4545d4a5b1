//! Real and complex sample buffers.
//!
//! Graph nodes may produce either real or complex samples. [`SampleBuffer`]
//! makes the element kind explicit: combining a real buffer with a complex
//! buffer or a complex gain promotes the real side through [`SampleBuffer::promote`],
//! never implicitly. Promotion is one-way.

use rustfft::num_complex::Complex32;

use crate::arrays;

/// A single real or complex value (gain, constant, or sample).
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Scalar {
    /// Real value.
    Real(f32),
    /// Complex value.
    Complex(Complex32),
}

impl Scalar {
    /// Real zero.
    pub const ZERO: Scalar = Scalar::Real(0.0);
    /// Real one.
    pub const ONE: Scalar = Scalar::Real(1.0);

    /// Returns true for the complex variant.
    #[inline]
    pub fn is_complex(self) -> bool {
        matches!(self, Scalar::Complex(_))
    }

    /// The value as a complex number.
    #[inline]
    pub fn to_complex(self) -> Complex32 {
        match self {
            Scalar::Real(v) => Complex32::new(v, 0.0),
            Scalar::Complex(c) => c,
        }
    }

    /// The real part of the value.
    #[inline]
    pub fn re(self) -> f32 {
        match self {
            Scalar::Real(v) => v,
            Scalar::Complex(c) => c.re,
        }
    }

    /// Linear interpolation from `self` to `other` at position `t` (0..=1).
    pub fn lerp(self, other: Scalar, t: f32) -> Scalar {
        match (self, other) {
            (Scalar::Real(a), Scalar::Real(b)) => Scalar::Real(a + (b - a) * t),
            (a, b) => {
                let (a, b) = (a.to_complex(), b.to_complex());
                Scalar::Complex(a + (b - a) * t)
            }
        }
    }
}

impl Default for Scalar {
    fn default() -> Self {
        Scalar::ZERO
    }
}

impl From<f32> for Scalar {
    fn from(v: f32) -> Self {
        Scalar::Real(v)
    }
}

impl From<Complex32> for Scalar {
    fn from(c: Complex32) -> Self {
        Scalar::Complex(c)
    }
}

impl core::fmt::Display for Scalar {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Scalar::Real(v) => write!(f, "{v}"),
            Scalar::Complex(c) => write!(f, "{c}"),
        }
    }
}

/// An ordered sequence of real or complex samples.
#[derive(Debug, Clone, PartialEq)]
pub enum SampleBuffer {
    /// Real samples.
    Real(Vec<f32>),
    /// Complex samples.
    Complex(Vec<Complex32>),
}

impl SampleBuffer {
    /// A real buffer of `len` zeros.
    pub fn zeros(len: usize) -> Self {
        SampleBuffer::Real(vec![0.0; len])
    }

    /// A buffer of `len` copies of `value`, complex if `value` is complex.
    pub fn filled(len: usize, value: Scalar) -> Self {
        match value {
            Scalar::Real(v) => SampleBuffer::Real(vec![v; len]),
            Scalar::Complex(c) => SampleBuffer::Complex(vec![c; len]),
        }
    }

    /// Number of samples.
    pub fn len(&self) -> usize {
        match self {
            SampleBuffer::Real(v) => v.len(),
            SampleBuffer::Complex(v) => v.len(),
        }
    }

    /// Returns true if the buffer holds no samples (end-of-stream marker).
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Returns true for the complex variant.
    pub fn is_complex(&self) -> bool {
        matches!(self, SampleBuffer::Complex(_))
    }

    /// Sample at `index`, if in range.
    pub fn get(&self, index: usize) -> Option<Scalar> {
        match self {
            SampleBuffer::Real(v) => v.get(index).copied().map(Scalar::Real),
            SampleBuffer::Complex(v) => v.get(index).copied().map(Scalar::Complex),
        }
    }

    /// Borrow the real samples, if this is a real buffer.
    pub fn as_real(&self) -> Option<&[f32]> {
        match self {
            SampleBuffer::Real(v) => Some(v),
            SampleBuffer::Complex(_) => None,
        }
    }

    /// Borrow the complex samples, if this is a complex buffer.
    pub fn as_complex(&self) -> Option<&[Complex32]> {
        match self {
            SampleBuffer::Real(_) => None,
            SampleBuffer::Complex(v) => Some(v),
        }
    }

    /// Convert a real buffer to complex in place. No-op if already complex.
    pub fn promote(&mut self) {
        if let SampleBuffer::Real(v) = self {
            let promoted = v.iter().map(|&x| Complex32::new(x, 0.0)).collect();
            *self = SampleBuffer::Complex(promoted);
        }
    }

    /// Consume the buffer, returning complex samples.
    pub fn into_complex(self) -> Vec<Complex32> {
        match self {
            SampleBuffer::Real(v) => v.into_iter().map(|x| Complex32::new(x, 0.0)).collect(),
            SampleBuffer::Complex(v) => v,
        }
    }

    /// Consume the buffer, returning the real part of every sample.
    pub fn into_real_part(self) -> Vec<f32> {
        match self {
            SampleBuffer::Real(v) => v,
            SampleBuffer::Complex(v) => v.into_iter().map(|c| c.re).collect(),
        }
    }

    /// Truncate or zero-pad (at the end) to exactly `len` samples.
    pub fn fit(self, len: usize) -> Self {
        match self {
            SampleBuffer::Real(mut v) => {
                v.truncate(len);
                SampleBuffer::Real(arrays::zpad(v, len))
            }
            SampleBuffer::Complex(mut v) => {
                v.truncate(len);
                SampleBuffer::Complex(arrays::zpad(v, len))
            }
        }
    }

    /// Accumulate `gain * other` into this buffer, promoting to complex if
    /// either `gain` or `other` is complex.
    ///
    /// Both buffers must have the same length.
    pub fn add_scaled(&mut self, other: &SampleBuffer, gain: Scalar) {
        debug_assert_eq!(self.len(), other.len());
        match (other, gain) {
            (SampleBuffer::Real(src), Scalar::Real(g)) => match self {
                SampleBuffer::Real(dst) => {
                    for (d, s) in dst.iter_mut().zip(src) {
                        *d += *s * g;
                    }
                }
                SampleBuffer::Complex(dst) => {
                    for (d, s) in dst.iter_mut().zip(src) {
                        d.re += *s * g;
                    }
                }
            },
            _ => {
                let g = gain.to_complex();
                let mut dst = std::mem::take(self).into_complex();
                match other {
                    SampleBuffer::Real(src) => {
                        for (d, s) in dst.iter_mut().zip(src) {
                            *d += g * *s;
                        }
                    }
                    SampleBuffer::Complex(src) => {
                        for (d, s) in dst.iter_mut().zip(src) {
                            *d += g * *s;
                        }
                    }
                }
                *self = SampleBuffer::Complex(dst);
            }
        }
    }

    /// Multiply this buffer elementwise by `other`, promoting to complex if
    /// `other` is complex.
    ///
    /// Both buffers must have the same length.
    pub fn mul_assign(&mut self, other: &SampleBuffer) {
        debug_assert_eq!(self.len(), other.len());
        match other {
            SampleBuffer::Real(src) => match self {
                SampleBuffer::Real(dst) => {
                    for (d, s) in dst.iter_mut().zip(src) {
                        *d *= *s;
                    }
                }
                SampleBuffer::Complex(dst) => {
                    for (d, s) in dst.iter_mut().zip(src) {
                        *d *= *s;
                    }
                }
            },
            SampleBuffer::Complex(src) => {
                let mut dst = std::mem::take(self).into_complex();
                for (d, s) in dst.iter_mut().zip(src) {
                    *d *= *s;
                }
                *self = SampleBuffer::Complex(dst);
            }
        }
    }
}

/// An empty real buffer.
impl Default for SampleBuffer {
    fn default() -> Self {
        SampleBuffer::Real(Vec::new())
    }
}

impl From<Vec<f32>> for SampleBuffer {
    fn from(v: Vec<f32>) -> Self {
        SampleBuffer::Real(v)
    }
}

impl From<Vec<Complex32>> for SampleBuffer {
    fn from(v: Vec<Complex32>) -> Self {
        SampleBuffer::Complex(v)
    }
}

/// Collects into a real buffer unless any value is complex.
impl FromIterator<Scalar> for SampleBuffer {
    fn from_iter<I: IntoIterator<Item = Scalar>>(iter: I) -> Self {
        let values: Vec<Scalar> = iter.into_iter().collect();
        if values.iter().any(|v| v.is_complex()) {
            SampleBuffer::Complex(values.into_iter().map(Scalar::to_complex).collect())
        } else {
            SampleBuffer::Real(values.into_iter().map(Scalar::re).collect())
        }
    }
}
