//! Ordered fallback sequence node.

use std::collections::VecDeque;

use super::{Node, SampleSource, max_sample_rate, sample_fitted};
use crate::error::Result;
use crate::samples::SampleBuffer;

/// Plays each source in turn.
///
/// The first live source is sampled until it reports end-of-stream, at which
/// point it is dropped for good and the next source is tried within the same
/// call. Short results are zero-padded to `count`.
#[derive(Debug, Default)]
pub struct Sequence {
    sources: VecDeque<Node>,
    sample_rate: Option<f32>,
}

impl Sequence {
    /// A sequence over `sources`, in order.
    pub fn new(sources: impl IntoIterator<Item = Node>) -> Self {
        Self {
            sources: sources.into_iter().collect(),
            sample_rate: None,
        }
    }

    /// Append a source to the end of the sequence.
    pub fn push(&mut self, source: Node) {
        self.sources.push_back(source);
    }

    /// Sources not yet exhausted.
    pub fn len(&self) -> usize {
        self.sources.len()
    }

    /// Returns true once every source has been exhausted.
    pub fn is_empty(&self) -> bool {
        self.sources.is_empty()
    }
}

impl SampleSource for Sequence {
    fn sample(&mut self, count: usize) -> Result<Option<SampleBuffer>> {
        if count == 0 {
            return Ok((!self.sources.is_empty()).then(|| SampleBuffer::zeros(0)));
        }
        while let Some(current) = self.sources.front() {
            if let Some(buf) = sample_fitted(current, count)? {
                return Ok(Some(buf));
            }
            tracing::debug!(
                "sequence_advance: {} exhausted, {} left",
                current.id(),
                self.sources.len() - 1
            );
            self.sources.pop_front();
        }
        Ok(None)
    }

    fn sample_rate(&self) -> f32 {
        self.sample_rate
            .or_else(|| max_sample_rate(&self.sources))
            .unwrap_or(super::DEFAULT_SAMPLE_RATE)
    }

    fn set_sample_rate(&mut self, sample_rate: f32) -> Result<()> {
        self.sample_rate = Some(sample_rate);
        for source in &self.sources {
            source.set_sample_rate(sample_rate)?;
        }
        Ok(())
    }
}
