//! Periodic waveform generator node.

use core::f64::consts::{PI, TAU};

use rustfft::num_complex::Complex32;

use super::{DEFAULT_SAMPLE_RATE, SampleSource};
use crate::error::Result;
use crate::samples::{SampleBuffer, Scalar};
use crate::units;

/// Harmonics summed for the quadrature part of [`Waveform::ComplexTriangle`].
const TRIANGLE_HARMONICS: usize = 128;

/// Width of each [`Waveform::Gauss`] pulse, in cycles.
const GAUSS_WIDTH: f64 = 1.0 / 16.0;

/// Largest magnitude of the diverging quadrature parts of
/// [`Waveform::ComplexSquare`] and [`Waveform::ComplexRamp`].
const QUADRATURE_LIMIT: f64 = 8.0;

/// Oscillator waveform. Every waveform starts at zero phase rising through 0,
/// except the square waves, which start high.
///
/// Each `Complex*` variant is the analytic signal of its real counterpart:
/// the real part matches exactly and the imaginary part is its Hilbert
/// transform, so the spectrum has no negative frequencies.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Waveform {
    /// `sin(φ)`.
    #[default]
    Sine,
    /// `e^{i(φ - π/2)}`: real part equals [`Sine`](Waveform::Sine).
    ComplexSine,
    /// Rises 0 → 1 over the first quarter cycle, falls to -1, rises to 0.
    Triangle,
    /// Analytic [`Triangle`](Waveform::Triangle).
    ComplexTriangle,
    /// +1 for the first half cycle, -1 for the second.
    Square,
    /// Analytic [`Square`](Waveform::Square). The imaginary part diverges at
    /// each edge and is clamped there.
    ComplexSquare,
    /// Rises 0 → 1 over the first half cycle, jumps to -1, rises to 0.
    Ramp,
    /// Analytic [`Ramp`](Waveform::Ramp), clamped at the jump.
    ComplexRamp,
    /// A positive Gaussian pulse at a quarter cycle and a negative one at
    /// three quarters.
    Gauss,
    /// Parabolic arcs: a sine-like wave with only odd harmonics that fall
    /// off with the cube of their number.
    Parabola,
}

impl Waveform {
    /// Value at `phase` (cycles, in `0..1`).
    fn at(self, phase: f64) -> Scalar {
        let phi = TAU * phase;
        match self {
            Waveform::Sine => Scalar::Real(phi.sin() as f32),
            Waveform::ComplexSine => {
                let phi = TAU * (phase - 0.25);
                Scalar::Complex(Complex32::new(phi.cos() as f32, phi.sin() as f32))
            }
            Waveform::Triangle => Scalar::Real(triangle(phase) as f32),
            Waveform::ComplexTriangle => {
                let quadrature: f64 = (0..TRIANGLE_HARMONICS)
                    .map(|k| {
                        let n = (2 * k + 1) as f64;
                        let sign = if k % 2 == 0 { 1.0 } else { -1.0 };
                        sign * (n * phi).cos() / (n * n)
                    })
                    .sum();
                let scale = 8.0 / (PI * PI);
                complex(triangle(phase), -scale * quadrature)
            }
            Waveform::Square => Scalar::Real(square(phase) as f32),
            Waveform::ComplexSquare => {
                let quadrature = (2.0 / PI) * (phi / 2.0).tan().abs().ln();
                complex(square(phase), quadrature)
            }
            Waveform::Ramp => Scalar::Real(ramp(phase) as f32),
            Waveform::ComplexRamp => {
                let quadrature = -(2.0 / PI) * (2.0 * (phi / 2.0).cos()).abs().ln();
                complex(ramp(phase), quadrature)
            }
            Waveform::Gauss => {
                let pulse = |center: f64| {
                    let d = (phase - center).abs();
                    let d = d.min(1.0 - d) / GAUSS_WIDTH;
                    (-0.5 * d * d).exp()
                };
                Scalar::Real((pulse(0.25) - pulse(0.75)) as f32)
            }
            Waveform::Parabola => Scalar::Real(if phase < 0.5 {
                16.0 * phase * (0.5 - phase)
            } else {
                -16.0 * (phase - 0.5) * (1.0 - phase)
            } as f32),
        }
    }
}

fn triangle(phase: f64) -> f64 {
    if phase < 0.25 {
        4.0 * phase
    } else if phase < 0.75 {
        2.0 - 4.0 * phase
    } else {
        4.0 * phase - 4.0
    }
}

fn square(phase: f64) -> f64 {
    if phase < 0.5 { 1.0 } else { -1.0 }
}

fn ramp(phase: f64) -> f64 {
    if phase < 0.5 {
        2.0 * phase
    } else {
        2.0 * phase - 2.0
    }
}

fn complex(re: f64, im: f64) -> Scalar {
    let im = im.clamp(-QUADRATURE_LIMIT, QUADRATURE_LIMIT);
    Scalar::Complex(Complex32::new(re as f32, im as f32))
}

/// Waveform generator with optional finite duration.
///
/// Without a duration the oscillator never ends. With one, the final chunk is
/// short and every later call returns end-of-stream.
#[derive(Debug, Clone)]
pub struct Oscillator {
    waveform: Waveform,
    frequency: f32,
    amplitude: f32,
    phase: f64,
    sample_rate: f32,
    remaining: Option<usize>,
}

impl Oscillator {
    /// A full-scale oscillator at `frequency` Hz.
    pub fn new(waveform: Waveform, frequency: f32) -> Self {
        Self {
            waveform,
            frequency,
            amplitude: 1.0,
            phase: 0.0,
            sample_rate: DEFAULT_SAMPLE_RATE,
            remaining: None,
        }
    }

    /// Peak amplitude.
    pub fn with_amplitude(mut self, amplitude: f32) -> Self {
        self.amplitude = amplitude;
        self
    }

    /// Starting phase in cycles (wrapped into `0..1`).
    pub fn with_phase(mut self, cycles: f64) -> Self {
        self.phase = cycles.rem_euclid(1.0);
        self
    }

    /// Sample rate in Hz.
    pub fn with_sample_rate(mut self, sample_rate: f32) -> Self {
        self.sample_rate = sample_rate;
        self
    }

    /// Stop after `seconds`, measured at the current sample rate.
    pub fn with_duration(mut self, seconds: f32) -> Self {
        self.remaining = Some(units::seconds_to_samples(seconds, self.sample_rate));
        self
    }

    /// Stop after exactly `samples` samples.
    pub fn with_length(mut self, samples: usize) -> Self {
        self.remaining = Some(samples);
        self
    }

    /// Waveform.
    pub fn waveform(&self) -> Waveform {
        self.waveform
    }

    /// Frequency in Hz.
    pub fn frequency(&self) -> f32 {
        self.frequency
    }

    /// Change the frequency without resetting phase.
    pub fn set_frequency(&mut self, frequency: f32) {
        self.frequency = frequency;
    }

    /// Samples left before end-of-stream, or `None` if unbounded.
    pub fn remaining(&self) -> Option<usize> {
        self.remaining
    }
}

impl SampleSource for Oscillator {
    fn sample(&mut self, count: usize) -> Result<Option<SampleBuffer>> {
        let n = match self.remaining {
            Some(0) => return Ok(None),
            Some(left) => {
                self.remaining = Some(left - count.min(left));
                count.min(left)
            }
            None => count,
        };

        let step = f64::from(self.frequency) / f64::from(self.sample_rate);
        let amplitude = self.amplitude;
        let buffer = (0..n)
            .map(|_| {
                let value = self.waveform.at(self.phase);
                self.phase = (self.phase + step).rem_euclid(1.0);
                match value {
                    Scalar::Real(v) => Scalar::Real(v * amplitude),
                    Scalar::Complex(c) => Scalar::Complex(c * amplitude),
                }
            })
            .collect();
        Ok(Some(buffer))
    }

    fn sample_rate(&self) -> f32 {
        self.sample_rate
    }

    fn set_sample_rate(&mut self, sample_rate: f32) -> Result<()> {
        self.sample_rate = sample_rate;
        Ok(())
    }
}
