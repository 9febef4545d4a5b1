//! Pipeline configuration file format and operations.

use framewise_core::{AudioSource, OverlapAdd, Window, WindowFramer, WindowKind};
use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::Result;
use crate::error::ConfigError;

/// Window section of a pipeline config.
///
/// `kind` is any catalog name (`"hann"`, `"double-hann"`, `"HFT95"`, ...).
/// When `overlap` is omitted the catalog default for the kind is used.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct WindowConfig {
    /// Catalog window name.
    pub kind: String,
    /// Window length in samples.
    pub length: usize,
    /// Overlap between consecutive frames, in samples.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub overlap: Option<usize>,
}

impl WindowConfig {
    /// Window section for a catalog kind at its default overlap.
    pub fn new(kind: WindowKind, length: usize) -> Self {
        Self {
            kind: kind.name().to_string(),
            length,
            overlap: None,
        }
    }

    /// Override the default overlap.
    pub fn with_overlap(mut self, overlap: usize) -> Self {
        self.overlap = Some(overlap);
        self
    }

    /// Parse the window name.
    pub fn window_kind(&self) -> Result<WindowKind> {
        Ok(self.kind.parse()?)
    }

    /// Overlap that will be used: the explicit one or the catalog default.
    pub fn effective_overlap(&self) -> Result<usize> {
        match self.overlap {
            Some(overlap) => Ok(overlap),
            None => Ok(self.window_kind()?.default_overlap(self.length)),
        }
    }

    /// Build the described window.
    pub fn build(&self) -> Result<Window> {
        let kind = self.window_kind()?;
        let window = match self.overlap {
            Some(overlap) => Window::with_overlap(kind, self.length, overlap)?,
            None => Window::new(kind, self.length)?,
        };
        Ok(window)
    }
}

/// Sink section of a pipeline config.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct SinkConfig {
    /// Samples per channel the sink requires per write.
    #[serde(default = "default_buffer_size")]
    pub buffer_size: usize,
    /// Whether the final partial buffer is zero-padded to `buffer_size`.
    #[serde(default = "default_strict")]
    pub strict: bool,
}

impl Default for SinkConfig {
    fn default() -> Self {
        Self {
            buffer_size: default_buffer_size(),
            strict: default_strict(),
        }
    }
}

fn default_sample_rate() -> u32 {
    48000
}

fn default_channels() -> usize {
    1
}

fn default_buffer_size() -> usize {
    512
}

fn default_strict() -> bool {
    true
}

/// Configuration of a framing pipeline.
///
/// # TOML Format
///
/// ```toml
/// sample_rate = 48000
/// channels = 2
///
/// [window]
/// kind = "hann"
/// length = 2048
/// overlap = 1024      # optional
///
/// [sink]
/// buffer_size = 512
/// strict = true
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct PipelineConfig {
    /// Sample rate in Hz (defaults to 48000).
    #[serde(default = "default_sample_rate")]
    pub sample_rate: u32,

    /// Channel count (defaults to 1).
    #[serde(default = "default_channels")]
    pub channels: usize,

    /// Analysis window.
    pub window: WindowConfig,

    /// Downstream sink requirements.
    #[serde(default)]
    pub sink: SinkConfig,
}

impl PipelineConfig {
    /// Mono 48 kHz pipeline with the given window and default sink settings.
    pub fn new(window: WindowConfig) -> Self {
        Self {
            sample_rate: default_sample_rate(),
            channels: default_channels(),
            window,
            sink: SinkConfig::default(),
        }
    }

    /// Set the sample rate.
    pub fn with_sample_rate(mut self, sample_rate: u32) -> Self {
        self.sample_rate = sample_rate;
        self
    }

    /// Set the channel count.
    pub fn with_channels(mut self, channels: usize) -> Self {
        self.channels = channels;
        self
    }

    /// Set the sink section.
    pub fn with_sink(mut self, sink: SinkConfig) -> Self {
        self.sink = sink;
        self
    }

    /// Load a config from a TOML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content =
            std::fs::read_to_string(path).map_err(|e| ConfigError::read_file(path, e))?;
        let config = Self::from_toml(&content)?;
        tracing::debug!("config_load: {}", path.display());
        Ok(config)
    }

    /// Load a config from a TOML string.
    pub fn from_toml(toml_str: &str) -> Result<Self> {
        Ok(toml::from_str(toml_str)?)
    }

    /// Serialize the config to a TOML string.
    pub fn to_toml(&self) -> Result<String> {
        Ok(toml::to_string_pretty(self)?)
    }

    /// Save the config to a TOML file, creating parent directories.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();

        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
            && !parent.exists()
        {
            std::fs::create_dir_all(parent).map_err(|e| ConfigError::create_dir(parent, e))?;
        }

        let content = self.to_toml()?;
        std::fs::write(path, content).map_err(|e| ConfigError::write_file(path, e))?;
        tracing::debug!("config_save: {}", path.display());
        Ok(())
    }

    /// Check every field without building anything.
    ///
    /// Reports the first problem found.
    pub fn validate(&self) -> Result<()> {
        if self.channels == 0 {
            return Err(ConfigError::invalid("channels", "must be at least 1"));
        }
        if self.sample_rate == 0 {
            return Err(ConfigError::invalid("sample_rate", "must be positive"));
        }
        if self.sink.buffer_size == 0 {
            return Err(ConfigError::invalid("sink.buffer_size", "must be at least 1"));
        }
        self.window.window_kind()?;
        if self.window.length == 0 {
            return Err(ConfigError::invalid("window.length", "must be at least 1"));
        }
        let overlap = self.window.effective_overlap()?;
        if overlap >= self.window.length {
            return Err(ConfigError::invalid(
                "window.overlap",
                format!(
                    "{overlap} must be less than window length {}",
                    self.window.length
                ),
            ));
        }
        Ok(())
    }

    /// Validate and build the configured window.
    pub fn build_window(&self) -> Result<Window> {
        self.validate()?;
        self.window.build()
    }

    /// Build a framer over `source` with the configured window.
    ///
    /// The source must have the configured channel count. A differing
    /// sample rate is logged but accepted.
    pub fn framer<S: AudioSource>(&self, source: S) -> Result<WindowFramer<S>> {
        let window = self.build_window()?;
        if source.channels() != self.channels {
            return Err(ConfigError::invalid(
                "channels",
                format!(
                    "source has {} channels, config expects {}",
                    source.channels(),
                    self.channels
                ),
            ));
        }
        if source.sample_rate() != self.sample_rate as f32 {
            tracing::warn!(
                "config_rate_mismatch: source runs at {} Hz, config expects {} Hz",
                source.sample_rate(),
                self.sample_rate
            );
        }
        Ok(WindowFramer::new(source, window))
    }

    /// Build an overlap-add synthesizer matching the configured window and
    /// channel count.
    pub fn overlap_add(&self) -> Result<OverlapAdd> {
        Ok(OverlapAdd::new(self.build_window()?, self.channels))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use framewise_core::MemorySource;

    fn hann(length: usize) -> PipelineConfig {
        PipelineConfig::new(WindowConfig::new(WindowKind::Hann, length))
    }

    #[test]
    fn test_defaults_from_minimal_toml() {
        let config = PipelineConfig::from_toml(
            r#"
            [window]
            kind = "hann"
            length = 256
        "#,
        )
        .unwrap();
        assert_eq!(config.sample_rate, 48000);
        assert_eq!(config.channels, 1);
        assert_eq!(config.window.overlap, None);
        assert_eq!(config.sink, SinkConfig::default());
        assert_eq!(config.build_window().unwrap().overlap(), 128);
    }

    #[test]
    fn test_toml_roundtrip() {
        let config = hann(1024)
            .with_sample_rate(44100)
            .with_channels(2)
            .with_sink(SinkConfig {
                buffer_size: 300,
                strict: false,
            });
        let toml_str = config.to_toml().unwrap();
        assert!(!toml_str.contains("overlap"), "default overlap is omitted");
        assert_eq!(PipelineConfig::from_toml(&toml_str).unwrap(), config);

        let with_overlap = PipelineConfig::new(
            WindowConfig::new(WindowKind::FlatTop, 512).with_overlap(400),
        );
        let back = PipelineConfig::from_toml(&with_overlap.to_toml().unwrap()).unwrap();
        assert_eq!(back.window.overlap, Some(400));
    }

    #[test]
    fn test_explicit_overlap_used() {
        let config =
            PipelineConfig::new(WindowConfig::new(WindowKind::Hann, 512).with_overlap(384));
        let window = config.build_window().unwrap();
        assert_eq!(window.hop(), 128);
    }

    #[test]
    fn test_validate_rejects_each_bad_field() {
        let cases: Vec<(PipelineConfig, &str)> = vec![
            (hann(256).with_channels(0), "channels"),
            (hann(256).with_sample_rate(0), "sample_rate"),
            (
                hann(256).with_sink(SinkConfig {
                    buffer_size: 0,
                    strict: true,
                }),
                "sink.buffer_size",
            ),
            (hann(0), "window.length"),
            (
                PipelineConfig::new(WindowConfig::new(WindowKind::Hann, 256).with_overlap(256)),
                "window.overlap",
            ),
        ];
        for (config, expected) in cases {
            match config.validate() {
                Err(ConfigError::Invalid { field, .. }) => assert_eq!(field, expected),
                other => panic!("{expected}: expected Invalid, got {other:?}"),
            }
        }
    }

    #[test]
    fn test_unknown_window_name() {
        let mut config = hann(256);
        config.window.kind = "kaiser".into();
        assert!(matches!(
            config.validate(),
            Err(ConfigError::Window(framewise_core::Error::UnknownWindow(_)))
        ));
    }

    #[test]
    fn test_window_name_spelling_is_flexible() {
        let mut config = hann(256);
        config.window.kind = "Padded-Double-Hann".into();
        let window = config.build_window().unwrap();
        assert_eq!(window.kind(), Some(WindowKind::PaddedDoubleHann));
        assert_eq!(window.overlap(), 224);
    }

    #[test]
    fn test_parse_error_reported() {
        assert!(matches!(
            PipelineConfig::from_toml("channels = \"two\""),
            Err(ConfigError::TomlParse(_))
        ));
    }

    #[test]
    fn test_framer_checks_channel_count() {
        let config = hann(64).with_channels(2);
        let mono = MemorySource::mono(vec![0.0; 128], 48000.0);
        assert!(matches!(
            config.framer(mono),
            Err(ConfigError::Invalid { field: "channels", .. })
        ));

        let stereo = MemorySource::new(vec![vec![0.0; 128]; 2], 48000.0).unwrap();
        let mut framer = config.framer(stereo).unwrap();
        assert_eq!(framer.read().unwrap().unwrap().len(), 2);
        assert_eq!(config.overlap_add().unwrap().channels(), 2);
    }
}
