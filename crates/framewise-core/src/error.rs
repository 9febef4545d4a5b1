//! Error types for buffer, window, and graph operations.
//!
//! Every failure in this crate is synchronous and aborts the call that
//! triggered it. Nothing is retried or swallowed internally.

use crate::graph::NodeId;

/// Errors produced by framewise-core operations.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// `append_shift` was given more samples than the buffer holds.
    #[error("cannot append {appended} samples to a buffer of length {buffer}")]
    AppendTooLong {
        /// Number of samples being appended.
        appended: usize,
        /// Length of the target buffer.
        buffer: usize,
    },

    /// A ring buffer read asked for more samples than are queued.
    #[error("ring buffer underflow: requested {requested} samples, {available} available")]
    Underflow {
        /// Samples requested by the read.
        requested: usize,
        /// Samples currently queued.
        available: usize,
    },

    /// A multi-channel write did not match the declared channel count.
    #[error("expected {expected} channels, got {actual}")]
    ChannelMismatch {
        /// Channel count declared by the receiver.
        expected: usize,
        /// Channel count supplied by the caller.
        actual: usize,
    },

    /// Channels in a single multi-channel operation had different lengths.
    #[error("channel {channel} has {actual} samples, expected {expected}")]
    RaggedChannels {
        /// Index of the offending channel.
        channel: usize,
        /// Length of the first channel.
        expected: usize,
        /// Length of the offending channel.
        actual: usize,
    },

    /// A sink reported a buffer size of zero.
    #[error("sink buffer size must be at least 1")]
    ZeroBufferSize,

    /// A node was registered twice with the same composite.
    #[error("{0} is already registered with this node")]
    DuplicateNode(NodeId),

    /// A node was not registered with the composite it was looked up in.
    #[error("{0} is not registered with this node")]
    NodeNotFound(NodeId),

    /// A node was sampled while it was already being sampled (graph cycle).
    #[error("{0} was sampled re-entrantly; the graph contains a cycle")]
    NodeBusy(NodeId),

    /// A composite that needs at least one upstream node was given none.
    #[error("at least one source node is required")]
    NoSources,

    /// A resampling ratio was zero, negative, or not finite.
    #[error("resampling ratio must be finite and positive, got {0}")]
    InvalidRatio(f64),

    /// Window parameters are out of range.
    #[error("invalid window: {0}")]
    InvalidWindow(String),

    /// Wavetable rows were missing, empty, or of different lengths.
    #[error("invalid wavetable: {0}")]
    InvalidWavetable(String),

    /// A window name did not match any catalog entry.
    #[error("unsupported window name: {0}")]
    UnknownWindow(String),

    /// An I/O collaborator (file, device, process) failed.
    #[error("backend error: {0}")]
    Backend(#[source] Box<dyn std::error::Error + Send + Sync>),
}

impl Error {
    /// Wrap an error from an external source or sink implementation.
    pub fn backend(err: impl Into<Box<dyn std::error::Error + Send + Sync>>) -> Self {
        Error::Backend(err.into())
    }
}

/// Convenience result type for framewise-core operations.
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn underflow_display_names_both_counts() {
        let msg = Error::Underflow {
            requested: 10,
            available: 3,
        }
        .to_string();
        assert!(msg.contains("10"), "got: {msg}");
        assert!(msg.contains('3'), "got: {msg}");
    }

    #[test]
    fn backend_preserves_source() {
        let io = std::io::Error::new(std::io::ErrorKind::UnexpectedEof, "pipe closed");
        let err = Error::backend(io);
        let source = std::error::Error::source(&err).map(ToString::to_string);
        assert_eq!(source.as_deref(), Some("pipe closed"));
    }

    #[test]
    fn backend_accepts_plain_strings() {
        let err = Error::backend("device vanished");
        assert_eq!(err.to_string(), "backend error: device vanished");
    }
}
