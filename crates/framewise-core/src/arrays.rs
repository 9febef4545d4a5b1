//! Shift, pad, and rotate operations on flat sample sequences.
//!
//! These are the building blocks the ring buffer, framer, and graph nodes use
//! to move samples around without reallocating. All operations are generic
//! over the element type so the same code serves real (`f32`) and complex
//! (`Complex32`) buffers; `T::default()` is the zero value.
//!
//! # Fixed-length operations (in place)
//!
//! - [`append_shift`] - Push samples in at the back, get the displaced front back
//! - [`rotate_left`] / [`rotate_right`] - Circular rotation
//! - [`shift_left_zero_fill`] / [`shift_right_zero_fill`] - Shift with zero fill
//!
//! # Length-changing operations
//!
//! - [`pad`] - Grow to a minimum length with configurable fill and alignment
//! - [`zpad`] - Zero-pad at the end

use crate::error::{Error, Result};

/// Remove `appended.len()` samples from the front of `buffer`, append
/// `appended` at the back, and return the removed prefix.
///
/// The buffer keeps its length. Reading the returned prefix followed by the
/// final buffer contents yields the original buffer followed by `appended`.
///
/// # Errors
///
/// Returns [`Error::AppendTooLong`] if `appended` is longer than `buffer`.
///
/// # Example
///
/// ```rust
/// use framewise_core::arrays::append_shift;
///
/// let mut buf = [1.0, 2.0, 3.0, 4.0];
/// let removed = append_shift(&mut buf, &[5.0, 6.0]).unwrap();
/// assert_eq!(removed, vec![1.0, 2.0]);
/// assert_eq!(buf, [3.0, 4.0, 5.0, 6.0]);
/// ```
pub fn append_shift<T: Copy>(buffer: &mut [T], appended: &[T]) -> Result<Vec<T>> {
    let n = appended.len();
    if n > buffer.len() {
        return Err(Error::AppendTooLong {
            appended: n,
            buffer: buffer.len(),
        });
    }
    if n == 0 {
        return Ok(Vec::new());
    }

    let removed = buffer[..n].to_vec();
    buffer.rotate_left(n);
    let tail = buffer.len() - n;
    buffer[tail..].copy_from_slice(appended);
    Ok(removed)
}

/// Fill values and data placement for [`pad`].
///
/// `value` fills both sides unless `before`/`after` override it. `alignment`
/// places the original data: `0.0` keeps it at the front, `1.0` at the back,
/// `0.5` centres it. Values outside `0.0..=1.0` are clamped.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Padding<T> {
    /// Shared fill value.
    pub value: T,
    /// Fill placed before the data, overriding `value`.
    pub before: Option<T>,
    /// Fill placed after the data, overriding `value`.
    pub after: Option<T>,
    /// Data position within the padded result (0 = front, 1 = back).
    pub alignment: f32,
}

impl<T: Copy + Default> Default for Padding<T> {
    fn default() -> Self {
        Self {
            value: T::default(),
            before: None,
            after: None,
            alignment: 0.0,
        }
    }
}

impl<T: Copy + Default> Padding<T> {
    /// Zero fill, data kept at the front.
    pub fn zeros() -> Self {
        Self::default()
    }

    /// Fill both sides with `value`, data kept at the front.
    pub fn value(value: T) -> Self {
        Self {
            value,
            ..Self::default()
        }
    }

    /// Override the fill placed before the data.
    pub fn before(mut self, before: T) -> Self {
        self.before = Some(before);
        self
    }

    /// Override the fill placed after the data.
    pub fn after(mut self, after: T) -> Self {
        self.after = Some(after);
        self
    }

    /// Set the data alignment (0 = front, 0.5 = centre, 1 = back).
    pub fn alignment(mut self, alignment: f32) -> Self {
        self.alignment = alignment;
        self
    }
}

/// Extend `buffer` to at least `min_length` samples.
///
/// Buffers that are already long enough are returned unchanged without
/// reallocation. Otherwise the deficit `add = min_length - len` is split into
/// `after = round(add * (1 - alignment))` and `before = add - after`.
///
/// # Example
///
/// ```rust
/// use framewise_core::arrays::{Padding, pad};
///
/// let centred = pad(vec![1.0, 1.0], 6, &Padding::zeros().alignment(0.5));
/// assert_eq!(centred, vec![0.0, 0.0, 1.0, 1.0, 0.0, 0.0]);
/// ```
pub fn pad<T: Copy>(buffer: Vec<T>, min_length: usize, padding: &Padding<T>) -> Vec<T> {
    if buffer.len() >= min_length {
        return buffer;
    }

    let add = min_length - buffer.len();
    let alignment = padding.alignment.clamp(0.0, 1.0);
    let length_after = ((add as f32 * (1.0 - alignment)).round() as usize).min(add);
    let length_before = add - length_after;

    let before = padding.before.unwrap_or(padding.value);
    let after = padding.after.unwrap_or(padding.value);

    let mut out = Vec::with_capacity(min_length);
    out.extend(std::iter::repeat_n(before, length_before));
    out.extend_from_slice(&buffer);
    out.extend(std::iter::repeat_n(after, length_after));
    out
}

/// Zero-pad `buffer` at the end to at least `min_length` samples.
#[inline]
pub fn zpad<T: Copy + Default>(buffer: Vec<T>, min_length: usize) -> Vec<T> {
    if buffer.len() >= min_length {
        return buffer;
    }
    pad(buffer, min_length, &Padding::zeros())
}

/// Rotate `buffer` circularly left by `n` positions.
///
/// Negative `n` rotates right; `n` may exceed the buffer length.
pub fn rotate_left<T>(buffer: &mut [T], n: isize) {
    let len = buffer.len();
    if len == 0 {
        return;
    }
    let k = n.rem_euclid(len as isize) as usize;
    buffer.rotate_left(k);
}

/// Rotate `buffer` circularly right by `n` positions.
///
/// Equivalent to `rotate_left(buffer, -n)`.
pub fn rotate_right<T>(buffer: &mut [T], n: isize) {
    let len = buffer.len();
    if len == 0 {
        return;
    }
    let k = n.rem_euclid(len as isize) as usize;
    buffer.rotate_right(k);
}

/// Drop `n` samples from the front and fill `n` zeros at the back.
pub fn shift_left_zero_fill<T: Copy + Default>(buffer: &mut [T], n: usize) {
    let len = buffer.len();
    if n >= len {
        buffer.fill(T::default());
        return;
    }
    buffer.copy_within(n.., 0);
    buffer[len - n..].fill(T::default());
}

/// Drop `n` samples from the back and fill `n` zeros at the front.
pub fn shift_right_zero_fill<T: Copy + Default>(buffer: &mut [T], n: usize) {
    let len = buffer.len();
    if n >= len {
        buffer.fill(T::default());
        return;
    }
    buffer.copy_within(..len - n, n);
    buffer[..n].fill(T::default());
}
