//! Property-based tests for framewise-core buffer primitives.
//!
//! Tests padding, shifting, ring-buffer ordering, and adapter conservation
//! using proptest for randomized input generation.

use framewise_core::arrays::{Padding, append_shift, pad, rotate_left, rotate_right};
use framewise_core::{AudioSink, BufferAdapter, MemorySink, RingBuffer};
use proptest::prelude::*;

proptest! {
    #![proptest_config(ProptestConfig::with_cases(256))]

    /// A buffer already at least `min_length` long comes back unchanged,
    /// whatever the padding settings.
    #[test]
    fn pad_is_identity_when_long_enough(
        data in prop::collection::vec(-1.0f32..1.0, 0..64),
        shortfall in 0usize..64,
        alignment in 0.0f32..=1.0,
        fill in -1.0f32..1.0,
    ) {
        let min_length = data.len().saturating_sub(shortfall);
        let padding = Padding::value(fill).alignment(alignment);
        prop_assert_eq!(pad(data.clone(), min_length, &padding), data);
    }

    /// Padding reaches the requested length and keeps the data contiguous.
    #[test]
    fn pad_reaches_min_length(
        data in prop::collection::vec(1.0f32..2.0, 1..32),
        extra in 1usize..32,
        alignment in 0.0f32..=1.0,
    ) {
        let min_length = data.len() + extra;
        let padded = pad(data.clone(), min_length, &Padding::zeros().alignment(alignment));
        prop_assert_eq!(padded.len(), min_length);
        let start = padded.iter().position(|&x| x != 0.0).unwrap();
        prop_assert_eq!(&padded[start..start + data.len()], data.as_slice());
    }

    /// The removed prefix followed by the final buffer equals the original
    /// buffer followed by the appended samples.
    #[test]
    fn append_shift_conserves_samples(
        buffer in prop::collection::vec(any::<i32>(), 1..64),
        take in 0usize..64,
        seed in any::<i32>(),
    ) {
        let n = take % (buffer.len() + 1);
        let appended: Vec<i32> = (0..n as i32).map(|i| i.wrapping_add(seed)).collect();

        let mut expected = buffer.clone();
        expected.extend_from_slice(&appended);

        let mut buf = buffer.clone();
        let mut actual = append_shift(&mut buf, &appended).unwrap();
        actual.extend_from_slice(&buf);

        prop_assert_eq!(actual, expected);
        prop_assert_eq!(buf.len(), buffer.len());
    }

    /// Appending more samples than the buffer holds always fails.
    #[test]
    fn append_shift_rejects_oversized(len in 0usize..16, over in 1usize..16) {
        let mut buf = vec![0.0f32; len];
        prop_assert!(append_shift(&mut buf, &vec![1.0; len + over]).is_err());
    }

    /// Rotating right undoes rotating left by the same amount.
    #[test]
    fn rotate_right_inverts_rotate_left(
        data in prop::collection::vec(any::<u16>(), 0..64),
        n in -200isize..200,
    ) {
        let mut buf = data.clone();
        rotate_left(&mut buf, n);
        rotate_right(&mut buf, n);
        prop_assert_eq!(buf, data);
    }

    /// Reads that exactly exhaust a sequence of writes return the writes
    /// concatenated, in order, across growth and wraparound.
    #[test]
    fn ring_buffer_is_fifo(
        writes in prop::collection::vec(prop::collection::vec(any::<i16>(), 0..40), 1..12),
        initial_capacity in 0usize..16,
        read_size in 1usize..17,
    ) {
        let mut ring = RingBuffer::with_capacity(initial_capacity);
        let mut expected = Vec::new();
        let mut actual = Vec::new();

        for w in &writes {
            ring.write(w);
            expected.extend_from_slice(w);
            while ring.len() >= read_size {
                actual.extend(ring.read(read_size).unwrap());
            }
        }
        let rest = ring.len();
        actual.extend(ring.read(rest).unwrap());

        prop_assert_eq!(actual, expected);
        prop_assert!(ring.is_empty());
    }

    /// Every sample written reaches the sink, in order, in sink-sized writes;
    /// strict flushing adds only zero padding.
    #[test]
    fn adapter_conserves_samples(
        sink_size in 1usize..32,
        writes in prop::collection::vec(1usize..100, 1..16),
    ) {
        let mut adapter = BufferAdapter::new(MemorySink::new(2, sink_size)).unwrap();
        let mut next = 0.0f32;
        let mut expected = Vec::new();
        for frames in writes {
            let chunk: Vec<f32> = (0..frames).map(|i| next + i as f32).collect();
            next += frames as f32;
            expected.extend_from_slice(&chunk);
            let negated = chunk.iter().map(|x| -x).collect();
            adapter.write(&[chunk, negated]).unwrap();
            prop_assert!(adapter.queued() < sink_size);
        }
        adapter.close().unwrap();

        let sink = adapter.sink();
        prop_assert!(sink.writes().iter().all(|w| w[0].len() == sink.buffer_size()));
        let left = sink.channel_data(0);
        prop_assert_eq!(&left[..expected.len()], expected.as_slice());
        prop_assert!(left[expected.len()..].iter().all(|&x| x == 0.0));
        prop_assert!(left.len() - expected.len() < sink_size);
        prop_assert_eq!(sink.channel_data(1)[..expected.len()].to_vec(),
            expected.iter().map(|x| -x).collect::<Vec<f32>>());
    }
}
