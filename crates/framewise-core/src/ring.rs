//! Growable FIFO ring buffer for one channel of samples.
//!
//! The [`RingBuffer`] stores samples in a circular array with a read position
//! and fill count. Writes that would overflow the current capacity reallocate
//! to the required size, copying unread samples to the front of the new
//! storage in FIFO order. Capacity never shrinks.
//!
//! The element type is fixed per instance: `RingBuffer<f32>` for real samples,
//! `RingBuffer<Complex32>` for complex ones. A real ring becomes a complex ring
//! only through [`RingBuffer::into_complex`].

use rustfft::num_complex::Complex32;

use crate::error::{Error, Result};

/// Fixed-capacity, growable FIFO sample store.
#[derive(Debug, Clone)]
pub struct RingBuffer<T> {
    storage: Vec<T>,
    read_pos: usize,
    len: usize,
}

impl<T: Copy + Default> RingBuffer<T> {
    /// Creates an empty ring buffer able to hold `capacity` samples.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            storage: vec![T::default(); capacity],
            read_pos: 0,
            len: 0,
        }
    }

    /// Total number of samples the buffer can hold before growing.
    #[inline]
    pub fn capacity(&self) -> usize {
        self.storage.len()
    }

    /// Number of queued (unread) samples.
    #[inline]
    pub fn len(&self) -> usize {
        self.len
    }

    /// Returns true if no samples are queued.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Free space before the next write would reallocate.
    #[inline]
    pub fn available(&self) -> usize {
        self.capacity() - self.len
    }

    /// Grow the storage to at least `min_capacity` samples.
    ///
    /// Does nothing if the buffer is already that large.
    pub fn reserve(&mut self, min_capacity: usize) {
        if min_capacity <= self.capacity() {
            return;
        }

        tracing::debug!(
            "ring_grow: {} → {} samples ({} queued)",
            self.capacity(),
            min_capacity,
            self.len
        );

        let mut storage = vec![T::default(); min_capacity];
        let (first, second) = self.segments(self.len);
        storage[..first.len()].copy_from_slice(first);
        storage[first.len()..first.len() + second.len()].copy_from_slice(second);

        self.storage = storage;
        self.read_pos = 0;
    }

    /// Append `samples` at the back, growing if needed.
    pub fn write(&mut self, samples: &[T]) {
        let n = samples.len();
        if n == 0 {
            return;
        }
        if n > self.available() {
            self.reserve(self.len + n);
        }

        let cap = self.capacity();
        let write_pos = (self.read_pos + self.len) % cap;
        let first = n.min(cap - write_pos);
        self.storage[write_pos..write_pos + first].copy_from_slice(&samples[..first]);
        self.storage[..n - first].copy_from_slice(&samples[first..]);
        self.len += n;
    }

    /// Remove and return the oldest `count` samples.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Underflow`] if fewer than `count` samples are queued.
    pub fn read(&mut self, count: usize) -> Result<Vec<T>> {
        let mut out = vec![T::default(); count];
        self.read_into(&mut out)?;
        Ok(out)
    }

    /// Remove the oldest `out.len()` samples into `out`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Underflow`] if fewer than `out.len()` samples are
    /// queued; the buffer is left untouched.
    pub fn read_into(&mut self, out: &mut [T]) -> Result<()> {
        let count = out.len();
        if count > self.len {
            return Err(Error::Underflow {
                requested: count,
                available: self.len,
            });
        }
        if count == 0 {
            return Ok(());
        }

        let (first, second) = self.segments(count);
        out[..first.len()].copy_from_slice(first);
        out[first.len()..].copy_from_slice(second);

        self.read_pos = (self.read_pos + count) % self.capacity();
        self.len -= count;
        Ok(())
    }

    /// Discard all queued samples, keeping the capacity.
    pub fn clear(&mut self) {
        self.read_pos = 0;
        self.len = 0;
    }

    /// The oldest `count` queued samples as up to two contiguous slices.
    fn segments(&self, count: usize) -> (&[T], &[T]) {
        debug_assert!(count <= self.len);
        if count == 0 {
            return (&[], &[]);
        }
        let cap = self.capacity();
        let first = count.min(cap - self.read_pos);
        (
            &self.storage[self.read_pos..self.read_pos + first],
            &self.storage[..count - first],
        )
    }
}

impl RingBuffer<f32> {
    /// Rebuild this real ring as a complex ring with the same contents,
    /// capacity, and read order.
    pub fn into_complex(self) -> RingBuffer<Complex32> {
        RingBuffer {
            storage: self
                .storage
                .into_iter()
                .map(|x| Complex32::new(x, 0.0))
                .collect(),
            read_pos: self.read_pos,
            len: self.len,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fifo_order_across_wraparound() {
        let mut ring = RingBuffer::with_capacity(4);
        ring.write(&[1.0, 2.0, 3.0]);
        assert_eq!(ring.read(2).unwrap(), vec![1.0, 2.0]);
        ring.write(&[4.0, 5.0, 6.0]);
        assert_eq!(ring.capacity(), 4, "fits without growing");
        assert_eq!(ring.read(4).unwrap(), vec![3.0, 4.0, 5.0, 6.0]);
        assert!(ring.is_empty());
    }

    #[test]
    fn grows_and_preserves_unread_order() {
        let mut ring = RingBuffer::with_capacity(3);
        ring.write(&[1, 2, 3]);
        assert_eq!(ring.read(2).unwrap(), vec![1, 2]);
        ring.write(&[4, 5]);
        // read_pos is now mid-buffer with wrapped data; growing must unwrap it
        ring.write(&[6, 7, 8]);
        assert!(ring.capacity() >= 6);
        assert_eq!(ring.len(), 6);
        assert_eq!(ring.read(6).unwrap(), vec![3, 4, 5, 6, 7, 8]);
    }

    #[test]
    fn never_shrinks() {
        let mut ring = RingBuffer::<f32>::with_capacity(2);
        ring.write(&[0.0; 10]);
        let cap = ring.capacity();
        ring.read(10).unwrap();
        ring.write(&[1.0]);
        assert_eq!(ring.capacity(), cap);
        ring.reserve(1);
        assert_eq!(ring.capacity(), cap);
    }

    #[test]
    fn underflow_leaves_contents_intact() {
        let mut ring = RingBuffer::with_capacity(8);
        ring.write(&[1.0, 2.0]);
        let err = ring.read(3).unwrap_err();
        assert!(matches!(
            err,
            Error::Underflow {
                requested: 3,
                available: 2
            }
        ));
        assert_eq!(ring.read(2).unwrap(), vec![1.0, 2.0]);
    }

    #[test]
    fn zero_capacity_grows_on_first_write() {
        let mut ring = RingBuffer::with_capacity(0);
        ring.write(&[]);
        assert_eq!(ring.capacity(), 0);
        ring.write(&[7.0]);
        assert_eq!(ring.read(1).unwrap(), vec![7.0]);
    }

    #[test]
    fn into_complex_keeps_queue() {
        let mut ring = RingBuffer::with_capacity(3);
        ring.write(&[1.0, 2.0, 3.0]);
        ring.read(1).unwrap();
        ring.write(&[4.0]);
        let mut complex = ring.into_complex();
        complex.write(&[Complex32::new(0.0, 5.0)]);
        let out = complex.read(4).unwrap();
        assert_eq!(
            out,
            vec![
                Complex32::new(2.0, 0.0),
                Complex32::new(3.0, 0.0),
                Complex32::new(4.0, 0.0),
                Complex32::new(0.0, 5.0),
            ]
        );
    }

    #[test]
    fn clear_resets_fill() {
        let mut ring = RingBuffer::with_capacity(4);
        ring.write(&[1.0, 2.0]);
        ring.clear();
        assert!(ring.is_empty());
        assert_eq!(ring.available(), 4);
    }
}
