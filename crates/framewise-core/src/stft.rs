//! Short-time Fourier analysis and resynthesis.
//!
//! [`Stft`] frames an [`AudioSource`] and transforms each frame with
//! `rustfft`. Forward transforms are scaled by `1/L`, so with the window's
//! sum-to-`L` normalization a full-scale bin-centred complex sinusoid
//! analyses to a bin of magnitude 1 (0 dB).
//!
//! [`SpectralPipeline`] closes the loop: framer, forward FFT, a caller
//! supplied spectral callback, inverse FFT, overlap-add. It is itself an
//! [`AudioSource`], so it can feed another framer or a buffer adapter.
//!
//! ```rust
//! use framewise_core::io::{AudioSource, MemorySource};
//! use framewise_core::stft::SpectralPipeline;
//! use framewise_core::window::WindowKind;
//!
//! let window = WindowKind::Hann.build(64).unwrap();
//! let source = MemorySource::mono(vec![0.5; 256], 48000.0);
//! // Halve every bin.
//! let mut pipeline = SpectralPipeline::new(source, window, |_channel, bins| {
//!     for bin in bins.iter_mut() {
//!         *bin *= 0.5;
//!     }
//! });
//! let out = pipeline.read(128).unwrap();
//! assert_eq!(out[0].len(), 128);
//! ```

use std::sync::Arc;

use rustfft::FftPlanner;
use rustfft::num_complex::Complex32;

use crate::error::Result;
use crate::framer::WindowFramer;
use crate::io::AudioSource;
use crate::ola::OverlapAdd;
use crate::ring::RingBuffer;
use crate::units;
use crate::window::Window;

/// Planned forward/inverse transforms of one size.
pub struct Fft {
    forward: Arc<dyn rustfft::Fft<f32>>,
    inverse: Arc<dyn rustfft::Fft<f32>>,
    scratch: Vec<Complex32>,
    size: usize,
}

impl Fft {
    /// Plan transforms of `size` points.
    pub fn new(size: usize) -> Self {
        let mut planner = FftPlanner::new();
        let forward = planner.plan_fft_forward(size);
        let inverse = planner.plan_fft_inverse(size);
        let scratch_len = forward
            .get_inplace_scratch_len()
            .max(inverse.get_inplace_scratch_len());
        Self {
            forward,
            inverse,
            scratch: vec![Complex32::default(); scratch_len],
            size,
        }
    }

    /// Transform size.
    pub fn size(&self) -> usize {
        self.size
    }

    /// Full complex spectrum of a real frame, scaled by `1/size`.
    ///
    /// Shorter input is zero-padded; longer input is truncated.
    pub fn forward(&mut self, frame: &[f32]) -> Vec<Complex32> {
        let mut buffer: Vec<Complex32> = frame
            .iter()
            .take(self.size)
            .map(|&x| Complex32::new(x, 0.0))
            .collect();
        buffer.resize(self.size, Complex32::default());
        self.forward_complex(&mut buffer);
        buffer
    }

    /// In-place forward transform, scaled by `1/size`.
    pub fn forward_complex(&mut self, buffer: &mut [Complex32]) {
        self.forward.process_with_scratch(buffer, &mut self.scratch);
        let scale = 1.0 / self.size as f32;
        for c in buffer.iter_mut() {
            *c *= scale;
        }
    }

    /// In-place inverse transform. Unscaled: inverts [`forward_complex`](Self::forward_complex) exactly.
    pub fn inverse_complex(&mut self, buffer: &mut [Complex32]) {
        self.inverse.process_with_scratch(buffer, &mut self.scratch);
    }
}

/// Magnitude spectrum in dB, floored at -200 dB.
pub fn magnitude_db(spectrum: &[Complex32]) -> Vec<f32> {
    spectrum
        .iter()
        .map(|c| units::linear_to_db(c.norm()))
        .collect()
}

/// Streaming short-time Fourier analysis.
pub struct Stft<S> {
    framer: WindowFramer<S>,
    fft: Fft,
}

impl<S: AudioSource> Stft<S> {
    /// Analyze `source` with `window`.
    pub fn new(source: S, window: Window) -> Self {
        let fft = Fft::new(window.length());
        Self {
            framer: WindowFramer::new(source, window),
            fft,
        }
    }

    /// The analysis window.
    pub fn window(&self) -> &Window {
        self.framer.window()
    }

    /// Channels per frame.
    pub fn channels(&self) -> usize {
        self.framer.channels()
    }

    /// Sample rate of the analyzed source.
    pub fn sample_rate(&self) -> f32 {
        self.framer.source().sample_rate()
    }

    /// Centre frequency of `bin` in Hz.
    pub fn bin_frequency(&self, bin: usize) -> f32 {
        units::bin_to_hz(bin, self.window().length(), self.sample_rate())
    }

    /// Spectrum of the next frame, one `L`-bin vector per channel.
    ///
    /// Returns `Ok(None)` once the framer has drained.
    pub fn next_spectra(&mut self) -> Result<Option<Vec<Vec<Complex32>>>> {
        let Some(frames) = self.framer.read()? else {
            return Ok(None);
        };
        Ok(Some(
            frames.iter().map(|frame| self.fft.forward(frame)).collect(),
        ))
    }
}

/// Framer, FFT, spectral callback, inverse FFT, overlap-add.
///
/// The callback receives the channel index and the full `L`-bin spectrum of
/// one frame, and may modify it in place. Only the real part of the inverse
/// transform is resynthesized.
///
/// As an [`AudioSource`] the pipeline yields the overlap-add output stream,
/// including its `L - H` sample latency, and reports end-of-stream once the
/// framer has drained and everything produced has been read.
pub struct SpectralPipeline<S, F> {
    stft: Stft<S>,
    ola: OverlapAdd,
    process: F,
    queues: Vec<RingBuffer<f32>>,
    finished: bool,
}

impl<S, F> SpectralPipeline<S, F>
where
    S: AudioSource,
    F: FnMut(usize, &mut [Complex32]),
{
    /// Build a pipeline over `source` using `window` for analysis and synthesis.
    pub fn new(source: S, window: Window, process: F) -> Self {
        let channels = source.channels();
        let ola = OverlapAdd::new(window.clone(), channels);
        let queues = (0..channels)
            .map(|_| RingBuffer::with_capacity(2 * window.length()))
            .collect();
        Self {
            stft: Stft::new(source, window),
            ola,
            process,
            queues,
            finished: false,
        }
    }

    /// Output latency in samples.
    pub fn latency(&self) -> usize {
        self.ola.latency()
    }

    /// Process one frame and return `H` output samples per channel.
    ///
    /// Returns `Ok(None)` once the framer has drained.
    pub fn process_frame(&mut self) -> Result<Option<Vec<Vec<f32>>>> {
        let Some(mut spectra) = self.stft.next_spectra()? else {
            return Ok(None);
        };
        let frames: Vec<Vec<f32>> = spectra
            .iter_mut()
            .enumerate()
            .map(|(channel, spectrum)| {
                (self.process)(channel, spectrum.as_mut_slice());
                self.stft.fft.inverse_complex(spectrum);
                spectrum.iter().map(|c| c.re).collect()
            })
            .collect();
        self.ola.push(frames).map(Some)
    }

    /// Process the whole stream, returning every output sample per channel.
    pub fn run_to_end(&mut self) -> Result<Vec<Vec<f32>>> {
        let mut out = vec![Vec::new(); self.queues.len()];
        while let Some(hop) = self.process_frame()? {
            for (acc, chunk) in out.iter_mut().zip(hop) {
                acc.extend(chunk);
            }
        }
        Ok(out)
    }
}

impl<S, F> AudioSource for SpectralPipeline<S, F>
where
    S: AudioSource,
    F: FnMut(usize, &mut [Complex32]),
{
    fn channels(&self) -> usize {
        self.queues.len()
    }

    fn sample_rate(&self) -> f32 {
        self.stft.sample_rate()
    }

    fn read(&mut self, frames: usize) -> Result<Vec<Vec<f32>>> {
        while !self.finished && self.queues.first().map_or(0, RingBuffer::len) < frames {
            match self.process_frame()? {
                Some(hop) => {
                    for (queue, chunk) in self.queues.iter_mut().zip(&hop) {
                        queue.write(chunk);
                    }
                }
                None => self.finished = true,
            }
        }
        let available = self.queues.first().map_or(0, RingBuffer::len);
        let count = frames.min(available);
        self.queues.iter_mut().map(|q| q.read(count)).collect()
    }
}
