//! Weighted-product node.

use super::{Node, NodeId, SampleSource, Termination, max_sample_rate, sample_fitted};
use crate::error::{Error, Result};
use crate::samples::{SampleBuffer, Scalar};

struct Input {
    node: Node,
    ended: bool,
}

/// `constant × Π child_i`.
///
/// Same fitting, promotion, and termination rules as
/// [`Mixer`](super::Mixer); under [`Termination::DrainAll`] an ended child
/// contributes a factor of 1. With no children the output is `count` copies
/// of the constant.
pub struct Multiplier {
    inputs: Vec<Input>,
    constant: Scalar,
    termination: Termination,
    complex: bool,
    sample_rate: f32,
}

impl Multiplier {
    /// An empty multiplier with constant 1.
    pub fn new(termination: Termination) -> Self {
        Self {
            inputs: Vec::new(),
            constant: Scalar::ONE,
            termination,
            complex: false,
            sample_rate: super::DEFAULT_SAMPLE_RATE,
        }
    }

    /// Set the constant factor.
    pub fn with_constant(mut self, constant: impl Into<Scalar>) -> Self {
        self.constant = constant.into();
        self
    }

    /// Add `node` as a factor.
    ///
    /// # Errors
    ///
    /// [`Error::DuplicateNode`] if `node` is already an input.
    pub fn add(&mut self, node: Node) -> Result<()> {
        let id = node.id();
        if self.contains(id) {
            return Err(Error::DuplicateNode(id));
        }
        tracing::debug!("multiplier_add: {id}");
        self.inputs.push(Input { node, ended: false });
        Ok(())
    }

    /// Remove the input `id`, returning its node handle.
    pub fn remove(&mut self, id: NodeId) -> Result<Node> {
        let index = self
            .inputs
            .iter()
            .position(|i| i.node.id() == id)
            .ok_or(Error::NodeNotFound(id))?;
        tracing::debug!("multiplier_remove: {id}");
        Ok(self.inputs.remove(index).node)
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

    /// Constant factor.
    pub fn constant(&self) -> Scalar {
        self.constant
    }

    /// Change the constant factor.
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
}

impl SampleSource for Multiplier {
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
                    acc.mul_assign(&buf);
                }
                None => match self.termination {
                    Termination::StopEarly => {
                        tracing::debug!(
                            "multiplier_end: {} ended, stopping early",
                            input.node.id()
                        );
                        return Ok(None);
                    }
                    Termination::DrainAll => {
                        tracing::debug!("multiplier_input_ended: {}", input.node.id());
                        input.ended = true;
                    }
                },
            }
        }

        if live == 0 {
            return Ok(None);
        }
        if acc.is_complex() && !self.complex {
            tracing::debug!("multiplier_promote: output is now complex");
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
