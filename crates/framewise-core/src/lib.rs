//! Framewise Core - streaming buffers, overlap-add framing, and signal graphs
//!
//! Audio pipelines deal in three chunk sizes that never naturally agree: the
//! size a producer emits, the size a consumer insists on, and the size an
//! analysis window needs for correct reconstruction. This crate reconciles
//! them.
//!
//! # Core Abstractions
//!
//! ## Buffers
//!
//! - [`arrays`] - Shift, pad, and rotate primitives on flat sample sequences
//! - [`RingBuffer`] - Growable per-channel FIFO
//! - [`BufferAdapter`] - Arbitrary-size writes in, fixed-size sink writes out
//! - [`SampleBuffer`] / [`Scalar`] - Explicit real/complex sample kinds
//!
//! ## Windowing
//!
//! - [`Window`] / [`WindowKind`] - Closed catalog of normalized windows
//! - [`WindowFramer`] - Overlapping windowed frames with end-of-stream drain
//! - [`OverlapAdd`] - Frame reassembly
//! - [`Stft`] / [`SpectralPipeline`] - FFT analysis and resynthesis
//!
//! ## Signal Graph
//!
//! - [`SampleSource`] - The "produce `count` samples or end" contract
//! - [`Node`] - Shared node handle with pointer identity
//! - [`Mixer`], [`Multiplier`], [`Sequence`], [`ChannelFanout`], [`Resample`] - Composites
//! - [`Constant`], [`Oscillator`], [`Playback`], [`WavetableOscillator`] - Leaves
//!
//! ## Boundaries
//!
//! - [`AudioSource`] / [`AudioSink`] - Contracts for file, device, and
//!   process collaborators, with in-memory implementations
//!
//! # Example
//!
//! ```rust
//! use framewise_core::{MemorySource, OverlapAdd, WindowFramer, WindowKind};
//!
//! let window = WindowKind::Hann.build(256).unwrap();
//! let source = MemorySource::mono(vec![1.0; 1024], 48000.0);
//! let mut framer = WindowFramer::new(source, window.clone());
//! let mut ola = OverlapAdd::new(window, 1);
//!
//! let mut output = Vec::new();
//! while let Some(frame) = framer.read().unwrap() {
//!     output.extend(ola.push(frame).unwrap().remove(0));
//! }
//! assert_eq!(output.len(), 1024 + ola.latency());
//! ```
//!
//! # Threading
//!
//! Everything here is single-threaded and synchronous. Graph nodes share
//! state through `Rc<RefCell<_>>` and are neither `Send` nor `Sync`.

pub mod adapter;
pub mod arrays;
pub mod error;
pub mod framer;
pub mod graph;
pub mod io;
pub mod ola;
pub mod ring;
pub mod samples;
pub mod stft;
pub mod units;
pub mod window;

pub use adapter::BufferAdapter;
pub use error::{Error, Result};
pub use framer::WindowFramer;
pub use graph::{
    ChannelFanout, Constant, Mixer, Multiplier, Node, NodeId, Oscillator, Playback, Resample,
    SampleSource, Sequence, Termination, Waveform, Wavetable, WavetableOscillator,
};
pub use io::{AudioSink, AudioSource, MemorySink, MemorySource, is_end_of_stream, pad_frames};
pub use ola::OverlapAdd;
pub use ring::RingBuffer;
pub use rustfft::num_complex::Complex32;
pub use samples::{SampleBuffer, Scalar};
pub use stft::{Fft, SpectralPipeline, Stft};
pub use units::{bin_to_hz, db_to_linear, hz_to_bin, linear_to_db, samples_to_seconds, seconds_to_samples};
pub use window::{Window, WindowKind};
