//! Signal-level integration tests for framewise-core.
//!
//! These exercise whole chains: graph → fan-out → framer → overlap-add, and
//! framer → adapter, checking reconstruction, drain, and termination
//! behaviour end to end.

use std::f32::consts::TAU;

use framewise_core::{
    AudioSource, BufferAdapter, ChannelFanout, Constant, MemorySink, MemorySource, Mixer,
    Multiplier, Node, Oscillator, OverlapAdd, Playback, SampleSource, Sequence,
    SpectralPipeline, Termination, Waveform, Window, WindowFramer, WindowKind, is_end_of_stream,
};

fn bin_centred_sine(bin: usize, length: usize, samples: usize) -> Vec<f32> {
    (0..samples)
        .map(|n| (TAU * bin as f32 * n as f32 / length as f32).sin())
        .collect()
}

fn frame_and_reassemble(input: Vec<f32>, window: &Window) -> (Vec<f32>, usize) {
    let mut framer = WindowFramer::new(MemorySource::mono(input, 48000.0), window.clone());
    let mut ola = OverlapAdd::new(window.clone(), 1);
    let mut output = Vec::new();
    while let Some(frame) = framer.read().unwrap() {
        output.extend(ola.push(frame).unwrap().remove(0));
    }
    (output, ola.latency())
}

// ============================================================================
// Overlap-add reconstruction
// ============================================================================

#[test]
fn hann_50_percent_reconstructs_bin_centred_sine() {
    let length = 512;
    let window = WindowKind::Hann.build(length).unwrap();
    assert_eq!(window.hop(), length / 2);

    let input = bin_centred_sine(8, length, 8 * length);
    let (output, latency) = frame_and_reassemble(input.clone(), &window);
    assert_eq!(output.len(), input.len() + latency);

    for i in length..input.len() - length {
        let err = (output[i + latency] - input[i]).abs();
        assert!(err < 1e-5, "sample {i}: error {err}");
    }
}

#[test]
fn every_cola_window_reconstructs() {
    let length = 256;
    let input: Vec<f32> = (0..4096).map(|n| (n as f32 * 0.013).sin() * 0.8).collect();
    for kind in [
        WindowKind::Rectangular,
        WindowKind::Triangular,
        WindowKind::Hann,
        WindowKind::HannPost,
        WindowKind::DoubleHann,
        WindowKind::PaddedHann,
        WindowKind::PaddedDoubleHann,
        WindowKind::BartlettHann,
    ] {
        let window = kind.build(length).unwrap();
        let (output, latency) = frame_and_reassemble(input.clone(), &window);
        for i in length..input.len() - length {
            let err = (output[i + latency] - input[i]).abs();
            assert!(err < 1e-4, "{kind} sample {i}: error {err}");
        }
    }
}

// ============================================================================
// Drain
// ============================================================================

#[test]
fn drain_emits_l_over_h_minus_one_frames_after_eof() {
    for kind in [WindowKind::Hann, WindowKind::DoubleHann, WindowKind::PaddedDoubleHann] {
        let window = kind.build(64).unwrap();
        let hop = window.hop();
        let mut framer = WindowFramer::new(MemorySource::mono(vec![1.0; hop * 5], 48000.0), window);

        let mut live = 0;
        while framer.source().remaining() > 0 {
            framer.read().unwrap().unwrap();
            live += 1;
        }
        assert_eq!(live, 5);

        let mut after_eof = 0;
        while framer.read().unwrap().is_some() {
            after_eof += 1;
        }
        assert_eq!(after_eof, 64 / hop - 1, "{kind}");
        assert!(framer.is_drained());
    }
}

// ============================================================================
// Graph composition
// ============================================================================

#[test]
fn mixer_termination_modes() {
    let build = |termination| {
        let mut mixer = Mixer::new(termination);
        mixer.add(Node::new(Playback::new(vec![1.0; 4])), 1.0).unwrap();
        mixer.add(Node::new(Playback::new(vec![1.0; 8])), 1.0).unwrap();
        mixer
    };

    let mut stop = build(Termination::StopEarly);
    assert!(stop.sample(4).unwrap().is_some());
    assert!(stop.sample(4).unwrap().is_none(), "ends with the first child");

    let mut drain = build(Termination::DrainAll);
    assert_eq!(drain.sample(4).unwrap().unwrap().as_real().unwrap(), &[2.0; 4]);
    assert_eq!(drain.sample(4).unwrap().unwrap().as_real().unwrap(), &[1.0; 4]);
    assert!(drain.sample(4).unwrap().is_none(), "ends once both children end");
}

#[test]
fn empty_composites_return_their_constant() {
    let mut sum = Mixer::new(Termination::StopEarly).with_constant(5.0);
    let mut product = Multiplier::new(Termination::StopEarly).with_constant(5.0);
    assert_eq!(sum.sample(6).unwrap().unwrap().as_real().unwrap(), &[5.0; 6]);
    assert_eq!(product.sample(6).unwrap().unwrap().as_real().unwrap(), &[5.0; 6]);
}

#[test]
fn fanout_replication() {
    let tone = Node::new(Oscillator::new(Waveform::Sine, 1000.0).with_length(64));
    let mut fan = ChannelFanout::new(vec![tone], 4).unwrap();
    let out = fan.sample(64).unwrap().unwrap();
    assert_eq!(out.len(), 4);
    assert!(out.iter().all(|ch| ch == &out[0]));

    let left = Node::new(Playback::new(vec![1.0, 2.0]));
    let right = Node::new(Playback::new(vec![3.0, 4.0]));
    let mut fan = ChannelFanout::new(vec![left, right], 2).unwrap();
    let out = fan.sample(2).unwrap().unwrap();
    assert_eq!(out[0].as_real().unwrap(), &[1.0, 2.0]);
    assert_eq!(out[1].as_real().unwrap(), &[3.0, 4.0]);
}

fn real(buf: Option<framewise_core::SampleBuffer>) -> Vec<f32> {
    buf.unwrap().as_real().unwrap().to_vec()
}

#[test]
fn mixer_pads_short_final_chunk_then_applies_termination() {
    let build = |termination| {
        let mut mixer = Mixer::new(termination);
        mixer.add(Node::new(Playback::new(vec![1.0; 6])), 1.0).unwrap();
        mixer.add(Node::new(Playback::new(vec![1.0; 12])), 1.0).unwrap();
        mixer
    };

    let mut stop = build(Termination::StopEarly);
    assert_eq!(real(stop.sample(4).unwrap()), vec![2.0; 4]);
    assert_eq!(
        real(stop.sample(4).unwrap()),
        vec![2.0, 2.0, 1.0, 1.0],
        "short chunk is padded, not an end"
    );
    assert!(stop.sample(4).unwrap().is_none(), "first child has ended");

    let mut drain = build(Termination::DrainAll);
    assert_eq!(real(drain.sample(4).unwrap()), vec![2.0; 4]);
    assert_eq!(real(drain.sample(4).unwrap()), vec![2.0, 2.0, 1.0, 1.0]);
    assert_eq!(real(drain.sample(4).unwrap()), vec![1.0; 4]);
    assert!(drain.sample(4).unwrap().is_none());
}

#[test]
fn multiplier_pads_short_final_chunk_then_applies_termination() {
    let build = |termination| {
        let mut product = Multiplier::new(termination);
        product.add(Node::new(Playback::new(vec![2.0; 6]))).unwrap();
        product.add(Node::new(Playback::new(vec![3.0; 12]))).unwrap();
        product
    };

    let mut stop = build(Termination::StopEarly);
    assert_eq!(real(stop.sample(4).unwrap()), vec![6.0; 4]);
    assert_eq!(real(stop.sample(4).unwrap()), vec![6.0, 6.0, 0.0, 0.0]);
    assert!(stop.sample(4).unwrap().is_none());

    let mut drain = build(Termination::DrainAll);
    assert_eq!(real(drain.sample(4).unwrap()), vec![6.0; 4]);
    assert_eq!(real(drain.sample(4).unwrap()), vec![6.0, 6.0, 0.0, 0.0]);
    assert_eq!(real(drain.sample(4).unwrap()), vec![3.0; 4], "ended child counts as 1");
    assert!(drain.sample(4).unwrap().is_none());
}

#[test]
fn fanout_pads_to_longest_when_a_source_ends_mid_stream() {
    let mut fan = ChannelFanout::new(
        vec![
            Node::new(Playback::new(vec![1.0; 4])),
            Node::new(Playback::new(vec![2.0; 6])),
            Node::new(Playback::new(vec![3.0; 7])),
        ],
        3,
    )
    .unwrap();
    assert!(fan.sample(4).unwrap().is_some());

    // first source ends while the others return 2 and 3 samples
    let out = fan.sample(4).unwrap().unwrap();
    assert_eq!(out[0].as_real().unwrap(), &[0.0; 3]);
    assert_eq!(out[1].as_real().unwrap(), &[2.0, 2.0, 0.0]);
    assert_eq!(out[2].as_real().unwrap(), &[3.0; 3]);

    assert!(fan.sample(4).unwrap().is_none());
}

#[test]
fn zero_length_requests_never_end_composites() {
    let mut drain = Mixer::new(Termination::DrainAll);
    drain.add(Node::new(Constant::new(1.0)), 1.0).unwrap();
    assert!(drain.sample(0).unwrap().is_some());
    assert_eq!(real(drain.sample(4).unwrap()), vec![1.0; 4]);

    let mut seq = Sequence::new([Node::new(Playback::new(vec![1.0, 2.0, 3.0]))]);
    assert!(seq.sample(0).unwrap().is_some());
    assert_eq!(real(seq.sample(2).unwrap()), vec![1.0, 2.0]);

    let mut fan = ChannelFanout::new(vec![Node::new(Playback::new(vec![1.0]))], 2).unwrap();
    assert_eq!(fan.sample(0).unwrap().map(|c| c.len()), Some(2));
    assert!(fan.sample(1).unwrap().is_some());
}

#[test]
fn shared_node_feeds_two_composites() {
    let shared = Node::new(Constant::new(2.0));
    let mut sum = Mixer::new(Termination::StopEarly);
    sum.add(shared.clone(), 1.0).unwrap();
    let mut product = Multiplier::new(Termination::StopEarly);
    product.add(shared.clone()).unwrap();
    product.add(Node::new(sum)).unwrap();
    assert_eq!(product.sample(2).unwrap().unwrap().as_real().unwrap(), &[4.0, 4.0]);
}

#[test]
fn tremolo_graph_through_framer() {
    // 440 Hz tone with 4 Hz amplitude modulation, played twice in sequence.
    let tremolo = || {
        let mut lfo = Mixer::new(Termination::StopEarly).with_constant(0.5);
        lfo.add(Node::new(Oscillator::new(Waveform::Sine, 4.0)), 0.5).unwrap();
        let mut am = Multiplier::new(Termination::StopEarly);
        am.add(Node::new(Oscillator::new(Waveform::Sine, 440.0).with_length(3000)))
            .unwrap();
        am.add(Node::new(lfo)).unwrap();
        Node::new(am)
    };
    let sequence = Node::new(Sequence::new([tremolo(), tremolo()]));
    let fan = ChannelFanout::new(vec![sequence], 2).unwrap();

    let window = WindowKind::Hann.build(256).unwrap();
    let mut framer = WindowFramer::new(fan, window);
    let mut frames = 0;
    for frame in framer.by_ref() {
        let frame = frame.unwrap();
        assert_eq!(frame.len(), 2);
        assert_eq!(frame[0], frame[1]);
        frames += 1;
    }
    // each tone's short final chunk is padded to a full hop by the sequence,
    // then one drain frame
    assert_eq!(frames, 2 * 3000usize.div_ceil(128) + 1);
}

// ============================================================================
// Adapter and pipeline
// ============================================================================

#[test]
fn framer_output_through_adapter_keeps_every_sample() {
    let window = WindowKind::Rectangular.build(100).unwrap();
    let input: Vec<f32> = (0..1000).map(|i| i as f32).collect();
    let mut framer = WindowFramer::new(MemorySource::mono(input.clone(), 48000.0), window);
    let mut adapter = BufferAdapter::new(MemorySink::new(1, 64)).unwrap();

    while let Some(frame) = framer.read().unwrap() {
        adapter.write(&frame).unwrap();
    }
    adapter.close().unwrap();

    let written = adapter.sink().channel_data(0);
    assert_eq!(written.len(), 1024);
    assert_eq!(&written[..1000], input.as_slice());
    assert!(adapter.sink().is_closed());
}

#[test]
fn spectral_pipeline_as_source_feeds_adapter() {
    let window = WindowKind::DoubleHann.build(128).unwrap();
    let input = bin_centred_sine(4, 128, 2048);
    let mut pipeline = SpectralPipeline::new(
        MemorySource::mono(input.clone(), 48000.0),
        window,
        |_, bins| {
            for bin in bins.iter_mut() {
                *bin *= 0.5;
            }
        },
    );
    let latency = pipeline.latency();
    let mut adapter = BufferAdapter::new(MemorySink::new(1, 100).with_strict(false)).unwrap();
    loop {
        let chunk = pipeline.read(37).unwrap();
        if is_end_of_stream(&chunk) {
            break;
        }
        adapter.write(&chunk).unwrap();
    }
    adapter.flush().unwrap();

    let out = adapter.sink().channel_data(0);
    assert_eq!(out.len(), input.len() + latency);
    for i in 128..input.len() - 128 {
        assert!((out[i + latency] - 0.5 * input[i]).abs() < 1e-4, "sample {i}");
    }
}
