//! Analysis/synthesis window definitions.
//!
//! A [`Window`] describes how overlapping frames are cut from a stream and
//! stitched back together: its length `L`, overlap `V`, hop `H = L - V`, and
//! optional pre-window (applied before analysis) and post-window (applied
//! after synthesis) weight sequences.
//!
//! Every weight sequence is periodic (DFT-even) and normalized so that it
//! sums to exactly `L`. A full-scale, bin-centred complex sinusoid therefore
//! analyses to unit magnitude, and [`Window::overlap_gain`] restores unity
//! average gain through overlap-add.
//!
//! # Catalog
//!
//! The set of windows is a closed enumeration ([`WindowKind`]); there is no
//! runtime registration. Use [`WindowKind::build`] or parse a name:
//!
//! ```rust
//! use framewise_core::window::{Window, WindowKind};
//!
//! let hann = WindowKind::Hann.build(1024).unwrap();
//! assert_eq!(hann.hop(), 512);
//!
//! let kind: WindowKind = "double-hann".parse().unwrap();
//! let window = Window::with_overlap(kind, 1024, 768).unwrap();
//! assert_eq!(window.hop(), 256);
//! ```

use core::f64::consts::TAU;
use core::fmt;
use core::str::FromStr;

use crate::error::{Error, Result};

/// HFT70 flat-top coefficients (three cosine terms).
const HFT70: &[f64] = &[1.0, 1.90796, 1.07349, 0.18199];

/// HFT95 flat-top coefficients (four cosine terms).
const HFT95: &[f64] = &[1.0, 1.9383379, 1.3045202, 0.4028270, 0.0350665];

/// HFT144D flat-top coefficients (six cosine terms).
const HFT144D: &[f64] = &[
    1.0, 1.96760033, 1.57983607, 0.81123644, 0.22583558, 0.02773848, 0.00090360,
];

/// Classic five-term flat-top coefficients.
const FLAT_TOP: &[f64] = &[
    0.21557895,
    0.41663158,
    0.277263158,
    0.083578947,
    0.006947368,
];

/// The closed catalog of named windows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum WindowKind {
    /// No weighting; frames do not overlap by default.
    Rectangular,
    /// Triangular pre-window, 50% overlap.
    Triangular,
    /// Hann pre-window, 50% overlap.
    Hann,
    /// Hann post-window only, 50% overlap.
    HannPost,
    /// Hann pre- and post-windows, 75% overlap.
    DoubleHann,
    /// Hann pre-window over the centre half, zeros on each side, 75% overlap.
    PaddedHann,
    /// Padded Hann pre- and post-windows, 87.5% overlap.
    PaddedDoubleHann,
    /// Bartlett-Hann pre-window, 50% overlap.
    BartlettHann,
    /// Five-term flat-top pre-window, 75% overlap.
    FlatTop,
    /// HFT70 low-sidelobe flat-top pre-window, 75% overlap.
    Hft70,
    /// HFT95 low-sidelobe flat-top pre-window, 75% overlap.
    Hft95,
    /// HFT144D low-sidelobe flat-top pre-window, 75% overlap.
    Hft144d,
}

/// Shape of one weight sequence, before normalization.
#[derive(Debug, Clone, Copy)]
enum Shape {
    Hann,
    Triangle,
    BartlettHann,
    CosineSum(&'static [f64]),
    Padded(&'static Shape),
}

impl Shape {
    fn weights(self, length: usize) -> Vec<f64> {
        match self {
            Shape::Padded(inner) => {
                let pad = length / 4;
                let inner_len = length - 2 * pad;
                let mut out = vec![0.0; length];
                out[pad..pad + inner_len].copy_from_slice(&inner.weights(inner_len));
                out
            }
            Shape::Hann => periodic(length, |x| 0.5 - 0.5 * (TAU * x).cos()),
            Shape::Triangle => periodic(length, |x| 1.0 - (2.0 * x - 1.0).abs()),
            Shape::BartlettHann => periodic(length, |x| {
                0.62 - 0.48 * (x - 0.5).abs() - 0.38 * (TAU * x).cos()
            }),
            Shape::CosineSum(coeffs) => periodic(length, |x| {
                coeffs
                    .iter()
                    .enumerate()
                    .map(|(k, a)| {
                        let sign = if k % 2 == 0 { 1.0 } else { -1.0 };
                        sign * a * (TAU * k as f64 * x).cos()
                    })
                    .sum::<f64>()
            }),
        }
    }
}

/// Evaluate `shape` at `n / length` for every `n` in `0..length`.
fn periodic(length: usize, shape: impl Fn(f64) -> f64) -> Vec<f64> {
    let l = length as f64;
    (0..length).map(|n| shape(n as f64 / l)).collect()
}

impl WindowKind {
    /// Every catalog entry.
    pub const ALL: [WindowKind; 12] = [
        WindowKind::Rectangular,
        WindowKind::Triangular,
        WindowKind::Hann,
        WindowKind::HannPost,
        WindowKind::DoubleHann,
        WindowKind::PaddedHann,
        WindowKind::PaddedDoubleHann,
        WindowKind::BartlettHann,
        WindowKind::FlatTop,
        WindowKind::Hft70,
        WindowKind::Hft95,
        WindowKind::Hft144d,
    ];

    /// Canonical snake_case name.
    pub fn name(self) -> &'static str {
        match self {
            WindowKind::Rectangular => "rectangular",
            WindowKind::Triangular => "triangular",
            WindowKind::Hann => "hann",
            WindowKind::HannPost => "hann_post",
            WindowKind::DoubleHann => "double_hann",
            WindowKind::PaddedHann => "padded_hann",
            WindowKind::PaddedDoubleHann => "padded_double_hann",
            WindowKind::BartlettHann => "bartlett_hann",
            WindowKind::FlatTop => "flat_top",
            WindowKind::Hft70 => "hft70",
            WindowKind::Hft95 => "hft95",
            WindowKind::Hft144d => "hft144d",
        }
    }

    /// Overlap used by [`build`](Self::build) for a window of `length` samples.
    pub fn default_overlap(self, length: usize) -> usize {
        let divisor = match self {
            WindowKind::Rectangular => return 0,
            WindowKind::Triangular
            | WindowKind::Hann
            | WindowKind::HannPost
            | WindowKind::BartlettHann => 2,
            WindowKind::DoubleHann
            | WindowKind::PaddedHann
            | WindowKind::FlatTop
            | WindowKind::Hft70
            | WindowKind::Hft95
            | WindowKind::Hft144d => 4,
            WindowKind::PaddedDoubleHann => 8,
        };
        length.saturating_sub((length / divisor).max(1))
    }

    /// Build a window of `length` samples with the default overlap.
    pub fn build(self, length: usize) -> Result<Window> {
        Window::new(self, length)
    }

    fn shapes(self) -> (Option<Shape>, Option<Shape>) {
        const PADDED_HANN: Shape = Shape::Padded(&Shape::Hann);
        match self {
            WindowKind::Rectangular => (None, None),
            WindowKind::Triangular => (Some(Shape::Triangle), None),
            WindowKind::Hann => (Some(Shape::Hann), None),
            WindowKind::HannPost => (None, Some(Shape::Hann)),
            WindowKind::DoubleHann => (Some(Shape::Hann), Some(Shape::Hann)),
            WindowKind::PaddedHann => (Some(PADDED_HANN), None),
            WindowKind::PaddedDoubleHann => (Some(PADDED_HANN), Some(PADDED_HANN)),
            WindowKind::BartlettHann => (Some(Shape::BartlettHann), None),
            WindowKind::FlatTop => (Some(Shape::CosineSum(FLAT_TOP)), None),
            WindowKind::Hft70 => (Some(Shape::CosineSum(HFT70)), None),
            WindowKind::Hft95 => (Some(Shape::CosineSum(HFT95)), None),
            WindowKind::Hft144d => (Some(Shape::CosineSum(HFT144D)), None),
        }
    }
}

impl fmt::Display for WindowKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for WindowKind {
    type Err = Error;

    /// Parses a catalog name, ignoring case and treating `-`, `_`, and spaces
    /// alike (`"Double-Hann"`, `"double_hann"`, `"double hann"`).
    fn from_str(s: &str) -> Result<Self> {
        let normalized: String = s
            .trim()
            .chars()
            .map(|c| match c {
                '-' | ' ' => '_',
                c => c.to_ascii_lowercase(),
            })
            .collect();
        WindowKind::ALL
            .into_iter()
            .find(|kind| kind.name() == normalized)
            .ok_or_else(|| Error::UnknownWindow(s.to_string()))
    }
}

/// Immutable window: length, overlap, hop, and normalized weights.
#[derive(Debug, Clone, PartialEq)]
pub struct Window {
    kind: Option<WindowKind>,
    length: usize,
    overlap: usize,
    pre: Option<Vec<f32>>,
    post: Option<Vec<f32>>,
    composite: Vec<f32>,
}

impl Window {
    /// Build a catalog window with its default overlap.
    pub fn new(kind: WindowKind, length: usize) -> Result<Self> {
        if length == 0 {
            return Err(Error::InvalidWindow("length must be at least 1".into()));
        }
        Self::with_overlap(kind, length, kind.default_overlap(length))
    }

    /// Build a catalog window with an explicit overlap.
    ///
    /// # Errors
    ///
    /// [`Error::InvalidWindow`] if `length` is zero or `overlap >= length`.
    pub fn with_overlap(kind: WindowKind, length: usize, overlap: usize) -> Result<Self> {
        check_dimensions(length, overlap)?;
        let (pre, post) = kind.shapes();
        let mut window = Self::assemble(
            length,
            overlap,
            pre.map(|s| s.weights(length)),
            post.map(|s| s.weights(length)),
        )?;
        window.kind = Some(kind);
        Ok(window)
    }

    /// Build a custom window from explicit weight sequences.
    ///
    /// Each present sequence must have `length` entries and is rescaled to
    /// sum to `length`.
    pub fn from_weights(
        length: usize,
        overlap: usize,
        pre: Option<Vec<f32>>,
        post: Option<Vec<f32>>,
    ) -> Result<Self> {
        check_dimensions(length, overlap)?;
        let widen = |w: Vec<f32>| -> Result<Vec<f64>> {
            if w.len() != length {
                return Err(Error::InvalidWindow(format!(
                    "expected {length} weights, got {}",
                    w.len()
                )));
            }
            Ok(w.into_iter().map(f64::from).collect())
        };
        Self::assemble(
            length,
            overlap,
            pre.map(widen).transpose()?,
            post.map(widen).transpose()?,
        )
    }

    fn assemble(
        length: usize,
        overlap: usize,
        pre: Option<Vec<f64>>,
        post: Option<Vec<f64>>,
    ) -> Result<Self> {
        let pre = pre.map(|w| normalize(w, length)).transpose()?;
        let post = post.map(|w| normalize(w, length)).transpose()?;

        let composite = match (&pre, &post) {
            (Some(a), Some(b)) => a.iter().zip(b).map(|(x, y)| x * y).collect(),
            (Some(w), None) | (None, Some(w)) => w.clone(),
            (None, None) => vec![1.0; length],
        };

        Ok(Self {
            kind: None,
            length,
            overlap,
            pre,
            post,
            composite,
        })
    }

    /// Catalog kind, or `None` for windows built from explicit weights.
    pub fn kind(&self) -> Option<WindowKind> {
        self.kind
    }

    /// Frame length `L` in samples.
    #[inline]
    pub fn length(&self) -> usize {
        self.length
    }

    /// Overlap `V` between consecutive frames.
    #[inline]
    pub fn overlap(&self) -> usize {
        self.overlap
    }

    /// Hop `H = L - V`: new samples consumed per frame.
    #[inline]
    pub fn hop(&self) -> usize {
        self.length - self.overlap
    }

    /// Pre-window weights (sum = `L`), if any.
    pub fn pre_window(&self) -> Option<&[f32]> {
        self.pre.as_deref()
    }

    /// Post-window weights (sum = `L`), if any.
    pub fn post_window(&self) -> Option<&[f32]> {
        self.post.as_deref()
    }

    /// Elementwise product of the pre- and post-windows (all ones if neither).
    pub fn composite(&self) -> &[f32] {
        &self.composite
    }

    /// Synthesis scale giving unity average gain through overlap-add:
    /// `H / sum(composite)`.
    pub fn overlap_gain(&self) -> f32 {
        let total: f64 = self.composite.iter().map(|&w| f64::from(w)).sum();
        (self.hop() as f64 / total) as f32
    }

    /// Multiply `frame` by the pre-window. No-op without one.
    pub fn apply_pre(&self, frame: &mut [f32]) {
        if let Some(pre) = &self.pre {
            for (s, w) in frame.iter_mut().zip(pre) {
                *s *= w;
            }
        }
    }

    /// Multiply `frame` by the post-window. No-op without one.
    pub fn apply_post(&self, frame: &mut [f32]) {
        if let Some(post) = &self.post {
            for (s, w) in frame.iter_mut().zip(post) {
                *s *= w;
            }
        }
    }

    /// Largest deviation from unity of the composite window overlap-added at
    /// hop spacing and scaled by [`overlap_gain`](Self::overlap_gain).
    ///
    /// Near zero for windows that satisfy constant overlap-add at this hop.
    pub fn cola_error(&self) -> f32 {
        let hop = self.hop();
        let gain = f64::from(self.overlap_gain());
        let mut max_dev = 0.0f64;
        for phase in 0..hop {
            let sum: f64 = self
                .composite
                .iter()
                .skip(phase)
                .step_by(hop)
                .map(|&w| f64::from(w))
                .sum();
            max_dev = max_dev.max((sum * gain - 1.0).abs());
        }
        max_dev as f32
    }
}

fn check_dimensions(length: usize, overlap: usize) -> Result<()> {
    if length == 0 {
        return Err(Error::InvalidWindow("length must be at least 1".into()));
    }
    if overlap >= length {
        return Err(Error::InvalidWindow(format!(
            "overlap {overlap} must be less than length {length}"
        )));
    }
    Ok(())
}

/// Scale `weights` so they sum to `length`.
fn normalize(weights: Vec<f64>, length: usize) -> Result<Vec<f32>> {
    let total: f64 = weights.iter().sum();
    if total.abs() < 1e-12 {
        return Err(Error::InvalidWindow("weights sum to zero".into()));
    }
    let scale = length as f64 / total;
    Ok(weights.into_iter().map(|w| (w * scale) as f32).collect())
}
