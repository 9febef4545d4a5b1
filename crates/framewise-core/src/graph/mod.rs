//! Pull-based signal graph.
//!
//! Every node implements [`SampleSource`]: asked for `count` samples, it
//! returns a [`SampleBuffer`] or signals end-of-stream with `Ok(None)` (an
//! empty answer to a non-zero request means the same thing). A request for
//! zero samples is answered with an empty buffer and never ends a stream. Composite nodes pull from their
//! children on demand; nothing runs until the root is sampled.
//!
//! # Node kinds
//!
//! | Node | Output |
//! |------|--------|
//! | [`Constant`] | `count` copies of one value, optionally ramped across changes |
//! | [`Oscillator`] | Periodic waveform, optionally of finite duration |
//! | [`Playback`] | A fixed buffer, chunk by chunk |
//! | [`WavetableOscillator`] | A [`Wavetable`] row at a frequency, morphing between rows |
//! | [`Mixer`] | `constant + Σ gain_i × child_i` |
//! | [`Multiplier`] | `constant × Π child_i` |
//! | [`Sequence`] | Each child in turn until all are exhausted |
//! | [`Resample`] | One child at a different sample rate |
//! | [`ChannelFanout`] | Several nodes spread across a channel count |
//!
//! # Sharing
//!
//! Graphs are built from [`Node`] handles. A handle is a cheap clone of a
//! shared, single-threaded reference; the same node may feed several
//! composites, and its identity ([`NodeId`]) is the address of the shared
//! allocation. To keep control of a node after adding it to a composite,
//! build the handle from your own `Rc<RefCell<_>>` with [`Node::from_rc`]:
//!
//! ```rust
//! use std::cell::RefCell;
//! use std::rc::Rc;
//! use framewise_core::graph::{Constant, Mixer, Node, SampleSource, Termination};
//!
//! let level = Rc::new(RefCell::new(Constant::new(1.0)));
//! let mut mixer = Mixer::new(Termination::StopEarly);
//! mixer.add(Node::from_rc(level.clone()), 0.5).unwrap();
//!
//! let out = mixer.sample(4).unwrap().unwrap();
//! assert_eq!(out.as_real().unwrap(), &[0.5; 4]);
//!
//! level.borrow_mut().set_value(4.0);
//! let out = mixer.sample(4).unwrap().unwrap();
//! assert_eq!(out.as_real().unwrap(), &[2.0; 4]);
//! ```
//!
//! # Cycles
//!
//! No node detects cycles. A node reached again while it is already being
//! sampled fails with [`Error::NodeBusy`] instead of recursing.

mod constant;
mod fanout;
mod mixer;
mod multiplier;
mod oscillator;
mod playback;
mod resample;
mod sequence;
mod wavetable;

pub use constant::Constant;
pub use fanout::ChannelFanout;
pub use mixer::Mixer;
pub use multiplier::Multiplier;
pub use oscillator::{Oscillator, Waveform};
pub use playback::Playback;
pub use resample::Resample;
pub use sequence::Sequence;
pub use wavetable::{Wavetable, WavetableOscillator};

use core::fmt;
use std::cell::RefCell;
use std::rc::Rc;

use crate::error::{Error, Result};
use crate::samples::SampleBuffer;

/// Sample rate assumed by nodes that are not told otherwise.
pub const DEFAULT_SAMPLE_RATE: f32 = 48000.0;

/// The sampling contract shared by every graph node.
pub trait SampleSource {
    /// Produce up to `count` samples.
    ///
    /// `Ok(None)` or an empty buffer signals end-of-stream. A shorter,
    /// non-empty buffer is a short read that consumers zero-pad. When
    /// `count` is zero, nodes that still have data return an empty buffer.
    fn sample(&mut self, count: usize) -> Result<Option<SampleBuffer>>;

    /// Sample rate in Hz.
    fn sample_rate(&self) -> f32;

    /// Change the sample rate. Composites forward this to their children.
    fn set_sample_rate(&mut self, sample_rate: f32) -> Result<()>;
}

/// Identity of a [`Node`]: the address of its shared allocation.
///
/// Stable for as long as any handle to the node is alive.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(usize);

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "node@{:#x}", self.0)
    }
}

/// Shared handle to a graph node.
#[derive(Clone)]
pub struct Node(Rc<RefCell<dyn SampleSource>>);

impl Node {
    /// Wrap `source` in a new shared node.
    pub fn new<S: SampleSource + 'static>(source: S) -> Self {
        Self(Rc::new(RefCell::new(source)))
    }

    /// Share an existing node the caller keeps a typed reference to.
    pub fn from_rc<S: SampleSource + 'static>(source: Rc<RefCell<S>>) -> Self {
        Self(source)
    }

    /// This node's identity.
    pub fn id(&self) -> NodeId {
        NodeId(Rc::as_ptr(&self.0).cast::<()>() as usize)
    }

    /// Returns true if both handles refer to the same node.
    pub fn ptr_eq(&self, other: &Node) -> bool {
        self.id() == other.id()
    }

    /// Sample the node.
    ///
    /// # Errors
    ///
    /// [`Error::NodeBusy`] if the node is already being sampled further up
    /// the call stack, plus anything the node itself returns.
    pub fn sample(&self, count: usize) -> Result<Option<SampleBuffer>> {
        let mut source = self
            .0
            .try_borrow_mut()
            .map_err(|_| Error::NodeBusy(self.id()))?;
        source.sample(count)
    }

    /// The node's sample rate, or `None` while it is being sampled.
    pub fn sample_rate(&self) -> Option<f32> {
        self.0.try_borrow().ok().map(|s| s.sample_rate())
    }

    /// Set the node's sample rate.
    pub fn set_sample_rate(&self, sample_rate: f32) -> Result<()> {
        self.0
            .try_borrow_mut()
            .map_err(|_| Error::NodeBusy(self.id()))?
            .set_sample_rate(sample_rate)
    }
}

impl fmt::Debug for Node {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Node").field(&self.id()).finish()
    }
}

/// What a composite does when one of its children ends.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Termination {
    /// End as soon as any child ends.
    #[default]
    StopEarly,
    /// Keep going while any child is alive; ended children are skipped.
    DrainAll,
}

/// Sample `node` and fit the result to exactly `count` samples.
///
/// End-of-stream (`None` or empty) comes back as `None`; short results are
/// zero-padded and long ones truncated.
pub(crate) fn sample_fitted(node: &Node, count: usize) -> Result<Option<SampleBuffer>> {
    Ok(node
        .sample(count)?
        .filter(|buf| !buf.is_empty())
        .map(|buf| buf.fit(count)))
}

/// Largest sample rate reported by `nodes`, if any report one.
pub(crate) fn max_sample_rate<'a>(nodes: impl IntoIterator<Item = &'a Node>) -> Option<f32> {
    nodes
        .into_iter()
        .filter_map(Node::sample_rate)
        .reduce(f32::max)
}
