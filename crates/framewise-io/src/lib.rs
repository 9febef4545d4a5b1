//! WAV file I/O for framewise pipelines.
//!
//! This crate provides:
//!
//! - **Streaming**: [`WavSource`] and [`WavSink`], file-backed implementations
//!   of the [`AudioSource`](framewise_core::AudioSource) and
//!   [`AudioSink`](framewise_core::AudioSink) contracts
//! - **Whole-file helpers**: [`read_wav`], [`write_wav`], and
//!   [`read_wav_info`] for loading and saving complete buffers
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use framewise_core::{BufferAdapter, OverlapAdd, WindowFramer, WindowKind};
//! use framewise_io::{WavSink, WavSource};
//!
//! let source = WavSource::open("input.wav")?;
//! let spec = source.spec();
//! let window = WindowKind::Hann.build(1024)?;
//!
//! let mut framer = WindowFramer::new(source, window.clone());
//! let mut ola = OverlapAdd::new(window, spec.channels as usize);
//! let mut out = BufferAdapter::new(WavSink::create("output.wav", spec, 512)?)?;
//!
//! while let Some(frame) = framer.read()? {
//!     out.write(&ola.push(frame)?)?;
//! }
//! out.close()?;
//! ```

mod sink;
mod source;
mod wav;

pub use sink::WavSink;
pub use source::WavSource;
pub use wav::{WavFormat, WavInfo, WavSpec, read_wav, read_wav_info, write_wav};

/// Error types for WAV I/O operations.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// WAV file read/write error.
    #[error("WAV file error: {0}")]
    Wav(#[from] hound::Error),

    /// Buffer or channel validation failed.
    #[error(transparent)]
    Core(#[from] framewise_core::Error),

    /// The requested sample format is not supported.
    #[error("Unsupported sample format: {0}")]
    UnsupportedFormat(String),

    /// A write carried more frames than the sink's buffer size.
    #[error("write of {frames} frames exceeds buffer size {buffer_size}")]
    OversizedWrite {
        /// Frames per channel in the write.
        frames: usize,
        /// Buffer size the sink was created with.
        buffer_size: usize,
    },

    /// A write arrived after the sink was finalized.
    #[error("WAV sink already finalized")]
    SinkClosed,
}

/// Result type for WAV I/O operations.
pub type Result<T> = std::result::Result<T, Error>;

impl From<Error> for framewise_core::Error {
    fn from(err: Error) -> Self {
        match err {
            Error::Core(inner) => inner,
            other => framewise_core::Error::backend(other),
        }
    }
}
