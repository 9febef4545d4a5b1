//! Multi-source channel fan-out adapter.

use super::{Node, max_sample_rate};
use crate::error::{Error, Result};
use crate::io::AudioSource;
use crate::samples::SampleBuffer;

/// Spreads one or more nodes across a channel count.
///
/// The effective channel count is `max(requested, sources)`; output channel
/// `i` carries source `i % sources`, so a single source is replicated to
/// every channel. All sources are unified to the highest sample rate any of
/// them reports.
///
/// Each call samples every source once. Sources that return less than the
/// longest result (or nothing at all) are zero-padded to that length. The
/// fan-out ends only when every source has ended.
#[derive(Debug)]
pub struct ChannelFanout {
    sources: Vec<Node>,
    channels: usize,
    sample_rate: f32,
}

impl ChannelFanout {
    /// Fan `sources` out to at least `channels` channels.
    ///
    /// # Errors
    ///
    /// [`Error::NoSources`] if `sources` is empty, or [`Error::NodeBusy`]
    /// if a source is mid-sample and cannot be retuned.
    pub fn new(sources: Vec<Node>, channels: usize) -> Result<Self> {
        if sources.is_empty() {
            return Err(Error::NoSources);
        }
        let sample_rate = max_sample_rate(&sources).unwrap_or(super::DEFAULT_SAMPLE_RATE);
        tracing::debug!(
            "fanout_rate: {} sources unified to {sample_rate} Hz",
            sources.len()
        );
        for source in &sources {
            source.set_sample_rate(sample_rate)?;
        }
        let channels = channels.max(sources.len());
        Ok(Self {
            sources,
            channels,
            sample_rate,
        })
    }

    /// Effective channel count.
    pub fn channels(&self) -> usize {
        self.channels
    }

    /// Unified sample rate.
    pub fn sample_rate(&self) -> f32 {
        self.sample_rate
    }

    /// Upstream nodes in channel-assignment order.
    pub fn sources(&self) -> &[Node] {
        &self.sources
    }

    /// Sample every source and return one buffer per output channel.
    ///
    /// Results longer than `count` are truncated. Returns `Ok(None)` once
    /// every source has ended. A zero-length request returns empty buffers
    /// without touching the sources.
    pub fn sample(&mut self, count: usize) -> Result<Option<Vec<SampleBuffer>>> {
        if count == 0 {
            return Ok(Some(vec![SampleBuffer::zeros(0); self.channels]));
        }
        let results = self
            .sources
            .iter()
            .map(|node| {
                Ok(node
                    .sample(count)?
                    .filter(|buf| !buf.is_empty())
                    .map(|buf| {
                        let len = buf.len().min(count);
                        buf.fit(len)
                    }))
            })
            .collect::<Result<Vec<Option<SampleBuffer>>>>()?;

        let longest = results
            .iter()
            .flatten()
            .map(SampleBuffer::len)
            .max()
            .unwrap_or(0);
        if longest == 0 {
            return Ok(None);
        }

        let padded: Vec<SampleBuffer> = results
            .into_iter()
            .map(|r| r.map_or_else(|| SampleBuffer::zeros(longest), |buf| buf.fit(longest)))
            .collect();
        Ok(Some(
            (0..self.channels)
                .map(|channel| padded[channel % padded.len()].clone())
                .collect(),
        ))
    }
}

/// Real part of each channel, for framers and buffer adapters.
impl AudioSource for ChannelFanout {
    fn channels(&self) -> usize {
        self.channels
    }

    fn sample_rate(&self) -> f32 {
        self.sample_rate
    }

    fn read(&mut self, frames: usize) -> Result<Vec<Vec<f32>>> {
        Ok(match self.sample(frames)? {
            Some(buffers) => buffers
                .into_iter()
                .map(SampleBuffer::into_real_part)
                .collect(),
            None => vec![Vec::new(); self.channels],
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::{Constant, Playback};
    use crate::io::is_end_of_stream;

    fn playback(data: Vec<f32>, rate: f32) -> Node {
        Node::new(Playback::new(data).with_sample_rate(rate))
    }

    #[test]
    fn rejects_empty_source_list() {
        assert!(matches!(
            ChannelFanout::new(Vec::new(), 2),
            Err(Error::NoSources)
        ));
    }

    #[test]
    fn single_source_replicated_to_all_channels() {
        let mut fan = ChannelFanout::new(vec![playback(vec![1.0, 2.0, 3.0], 48000.0)], 4).unwrap();
        assert_eq!(fan.channels(), 4);
        let out = fan.sample(3).unwrap().unwrap();
        assert_eq!(out.len(), 4);
        for channel in &out {
            assert_eq!(channel.as_real().unwrap(), &[1.0, 2.0, 3.0]);
        }
    }

    #[test]
    fn two_sources_two_channels_kept_separate() {
        let mut fan = ChannelFanout::new(
            vec![
                playback(vec![1.0, 1.0], 48000.0),
                playback(vec![2.0, 2.0], 48000.0),
            ],
            2,
        )
        .unwrap();
        let out = fan.sample(2).unwrap().unwrap();
        assert_eq!(out[0].as_real().unwrap(), &[1.0, 1.0]);
        assert_eq!(out[1].as_real().unwrap(), &[2.0, 2.0]);
    }

    #[test]
    fn channel_count_never_below_source_count() {
        let sources = vec![
            Node::new(Constant::new(1.0)),
            Node::new(Constant::new(2.0)),
            Node::new(Constant::new(3.0)),
        ];
        let mut fan = ChannelFanout::new(sources, 1).unwrap();
        assert_eq!(fan.channels(), 3);
        let out = fan.sample(1).unwrap().unwrap();
        assert_eq!(out[2].as_real().unwrap(), &[3.0]);
    }

    #[test]
    fn sources_repeat_modulo_count() {
        let sources = vec![Node::new(Constant::new(1.0)), Node::new(Constant::new(2.0))];
        let mut fan = ChannelFanout::new(sources, 5).unwrap();
        let out = fan.sample(1).unwrap().unwrap();
        let firsts: Vec<f32> = out.iter().map(|b| b.as_real().unwrap()[0]).collect();
        assert_eq!(firsts, vec![1.0, 2.0, 1.0, 2.0, 1.0]);
    }

    #[test]
    fn pads_to_longest_and_ends_when_all_end() {
        let mut fan = ChannelFanout::new(
            vec![playback(vec![1.0; 3], 48000.0), playback(vec![2.0; 1], 48000.0)],
            2,
        )
        .unwrap();
        let out = fan.sample(2).unwrap().unwrap();
        assert_eq!(out[1].as_real().unwrap(), &[2.0, 0.0]);

        // second source has ended; first is short
        let out = fan.sample(2).unwrap().unwrap();
        assert_eq!(out[0].as_real().unwrap(), &[1.0]);
        assert_eq!(out[1].as_real().unwrap(), &[0.0]);

        assert!(fan.sample(2).unwrap().is_none());
        assert!(is_end_of_stream(&fan.read(2).unwrap()));
    }

    #[test]
    fn zero_count_returns_empty_channels() {
        let source = playback(vec![1.0, 2.0], 48000.0);
        let mut fan = ChannelFanout::new(vec![source], 2).unwrap();
        let out = fan.sample(0).unwrap().unwrap();
        assert_eq!(out.len(), 2);
        assert!(out.iter().all(SampleBuffer::is_empty));
        assert_eq!(fan.sample(2).unwrap().unwrap()[1].as_real().unwrap(), &[1.0, 2.0]);
    }

    #[test]
    fn unifies_to_highest_sample_rate() {
        let slow = playback(vec![0.0], 22050.0);
        let fast = playback(vec![0.0], 96000.0);
        let fan = ChannelFanout::new(vec![slow.clone(), fast], 2).unwrap();
        assert_eq!(fan.sample_rate(), 96000.0);
        assert_eq!(slow.sample_rate(), Some(96000.0));
    }
}
