//! Weighted-sum node.

use super::{Node, NodeId, SampleSource, Termination, max_sample_rate, sample_fitted};
use crate::error::{Error, Result};
use crate::samples::{SampleBuffer, Scalar};

struct Input {
    node: Node,
    gain: Scalar,
    ended: bool,
}

/// `constant + Σ gain_i × child_i`.
///
/// Children keep insertion order. Each child's output is fitted to `count`
/// samples (zero-padded or truncated) before weighting. The output is real
/// until a complex gain or complex child output appears; from then on it is
/// always complex.
///
/// With no children the mixer returns `count` copies of its constant, not
/// zeros.
pub struct Mixer {
    inputs: Vec<Input>,
    constant: Scalar,
    termination: Termination,
    complex: bool,
    sample_rate: f32,
}

impl Mixer {
    /// An empty mixer with constant 0.
    pub fn new(termination: Termination) -> Self {
        Self {
            inputs: Vec::new(),
            constant: Scalar::ZERO,
            termination,
            complex: false,
            sample_rate: super::DEFAULT_SAMPLE_RATE,
        }
    }

    /// Set the constant added to every sample.
    pub fn with_constant(mut self, constant: impl Into<Scalar>) -> Self {
        self.constant = constant.into();
        self
    }

    /// Add `node` with `gain`.
    ///
    /// # Errors
    ///
    /// [`Error::DuplicateNode`] if `node` is already an input.
    pub fn add(&mut self, node: Node, gain: impl Into<Scalar>) -> Result<()> {
        let id = node.id();
        if self.contains(id) {
            return Err(Error::DuplicateNode(id));
        }
        let gain = gain.into();
        tracing::debug!("mixer_add: {id} gain {gain}");
        self.inputs.push(Input {
            node,
            gain,
            ended: false,
        });
        Ok(())
    }

    /// Remove the input `id`, returning its node handle.
    pub fn remove(&mut self, id: NodeId) -> Result<Node> {
        let index = self.position(id)?;
        tracing::debug!("mixer_remove: {id}");
        Ok(self.inputs.remove(index).node)
    }

    /// Change the gain of input `id`.
    pub fn set_gain(&mut self, id: NodeId, gain: impl Into<Scalar>) -> Result<()> {
        let index = self.position(id)?;
        let gain = gain.into();
        tracing::debug!("mixer_gain: {id} → {gain}");
        self.inputs[index].gain = gain;
        Ok(())
    }

    /// Gain of input `id`, if present.
    pub fn gain(&self, id: NodeId) -> Option<Scalar> {
        self.inputs.iter().find(|i| i.node.id() == id).map(|i| i.gain)
    }

    /// Returns true if `id` is an input.
    pub fn contains(&self, id: NodeId) -> bool {
        self.inputs.iter().any(|i| i.node.id() == id)
    }

    /// Input handles in insertion order.
    pub fn inputs(&self) -> impl Iterator<Item = &Node> {
        self.inputs.iter().map(|i| &i.node)
    }

    /// Number of inputs.
    pub fn len(&self) -> usize {
        self.inputs.len()
    }

    /// Returns true if there are no inputs.
    pub fn is_empty(&self) -> bool {
        self.inputs.is_empty()
    }

    /// Constant added to every sample.
    pub fn constant(&self) -> Scalar {
        self.constant
    }

    /// Change the constant.
    pub fn set_constant(&mut self, constant: impl Into<Scalar>) {
        self.constant = constant.into();
    }

    /// Termination policy.
    pub fn termination(&self) -> Termination {
        self.termination
    }

    /// Returns true once output has been promoted to complex.
    pub fn is_complex(&self) -> bool {
        self.complex
    }

    fn position(&self, id: NodeId) -> Result<usize> {
        self.inputs
            .iter()
            .position(|i| i.node.id() == id)
            .ok_or(Error::NodeNotFound(id))
    }
}

impl SampleSource for Mixer {
    fn sample(&mut self, count: usize) -> Result<Option<SampleBuffer>> {
        let mut acc = SampleBuffer::filled(count, self.constant);
        if self.complex {
            acc.promote();
        }
        if self.inputs.is_empty() || count == 0 {
            return Ok(Some(acc));
        }

        let mut live = 0;
        for input in &mut self.inputs {
            if input.ended {
                continue;
            }
            match sample_fitted(&input.node, count)? {
                Some(buf) => {
                    live += 1;
                    acc.add_scaled(&buf, input.gain);
                }
                None => match self.termination {
                    Termination::StopEarly => {
                        tracing::debug!("mixer_end: {} ended, stopping early", input.node.id());
                        return Ok(None);
                    }
                    Termination::DrainAll => {
                        tracing::debug!("mixer_input_ended: {}", input.node.id());
                        input.ended = true;
                    }
                },
            }
        }

        if live == 0 {
            return Ok(None);
        }
        if acc.is_complex() && !self.complex {
            tracing::debug!("mixer_promote: output is now complex");
            self.complex = true;
        }
        Ok(Some(acc))
    }

    fn sample_rate(&self) -> f32 {
        max_sample_rate(self.inputs()).unwrap_or(self.sample_rate)
    }

    fn set_sample_rate(&mut self, sample_rate: f32) -> Result<()> {
        self.sample_rate = sample_rate;
        for input in &self.inputs {
            input.node.set_sample_rate(sample_rate)?;
        }
        Ok(())
    }
}
