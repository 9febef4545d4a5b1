//! Pipeline configuration for framewise.
//!
//! A [`PipelineConfig`] names everything needed to assemble a framing
//! pipeline: sample rate, channel count, window, and the downstream sink's
//! buffer requirements. Configs load from and save to TOML, validate
//! themselves, and build the corresponding core objects.
//!
//! # Example
//!
//! ```rust
//! use framewise_config::PipelineConfig;
//!
//! let config = PipelineConfig::from_toml(r#"
//!     sample_rate = 48000
//!     channels = 2
//!
//!     [window]
//!     kind = "double_hann"
//!     length = 1024
//!
//!     [sink]
//!     buffer_size = 512
//! "#).unwrap();
//!
//! config.validate().unwrap();
//! let window = config.build_window().unwrap();
//! assert_eq!(window.hop(), 256);
//! ```

mod error;
mod pipeline;

pub use error::ConfigError;
pub use pipeline::{PipelineConfig, SinkConfig, WindowConfig};

/// Result type for configuration operations.
pub type Result<T> = std::result::Result<T, ConfigError>;
