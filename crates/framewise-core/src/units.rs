//! Unit conversions for levels, durations, and spectral bins.
//!
//! Plain functions over plain numbers; nothing is attached to the numeric
//! types themselves.
//!
//! - [`db_to_linear`] / [`linear_to_db`] - Convert between dB and linear gain
//! - [`seconds_to_samples`] / [`samples_to_seconds`] - Time conversions
//! - [`hz_to_bin`] / [`bin_to_hz`] - FFT bin conversions

/// Convert decibels to linear gain.
///
/// # Example
/// ```rust
/// use framewise_core::units::db_to_linear;
///
/// assert!((db_to_linear(0.0) - 1.0).abs() < 0.001);
/// assert!((db_to_linear(-6.02) - 0.5).abs() < 0.01);
/// ```
#[inline]
pub fn db_to_linear(db: f32) -> f32 {
    const FACTOR: f32 = core::f32::consts::LN_10 / 20.0;
    (db * FACTOR).exp()
}

/// Convert linear gain (magnitude) to decibels, floored at -200 dB.
///
/// # Example
/// ```rust
/// use framewise_core::units::linear_to_db;
///
/// assert!(linear_to_db(1.0).abs() < 0.001);
/// assert!((linear_to_db(0.0) + 200.0).abs() < 0.001);
/// ```
#[inline]
pub fn linear_to_db(linear: f32) -> f32 {
    const FACTOR: f32 = 20.0 / core::f32::consts::LN_10;
    linear.max(1e-10).ln() * FACTOR
}

/// Duration in seconds to a whole number of samples, rounded to nearest.
#[inline]
pub fn seconds_to_samples(seconds: f32, sample_rate: f32) -> usize {
    (seconds * sample_rate).round().max(0.0) as usize
}

/// Sample count to duration in seconds.
#[inline]
pub fn samples_to_seconds(samples: usize, sample_rate: f32) -> f32 {
    samples as f32 / sample_rate
}

/// Nearest FFT bin for `hz` in a transform of `fft_size` points.
#[inline]
pub fn hz_to_bin(hz: f32, fft_size: usize, sample_rate: f32) -> usize {
    (hz * fft_size as f32 / sample_rate).round().max(0.0) as usize
}

/// Centre frequency of `bin` in a transform of `fft_size` points.
#[inline]
pub fn bin_to_hz(bin: usize, fft_size: usize, sample_rate: f32) -> f32 {
    bin as f32 * sample_rate / fft_size as f32
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn db_roundtrip() {
        for db in [-60.0, -6.0, 0.0, 12.0] {
            assert!((linear_to_db(db_to_linear(db)) - db).abs() < 1e-3);
        }
    }

    #[test]
    fn time_conversions() {
        assert_eq!(seconds_to_samples(0.5, 48000.0), 24000);
        assert_eq!(seconds_to_samples(-1.0, 48000.0), 0);
        assert!((samples_to_seconds(44100, 44100.0) - 1.0).abs() < 1e-6);
    }

    #[test]
    fn bin_conversions() {
        assert_eq!(hz_to_bin(1500.0, 256, 48000.0), 8);
        assert_eq!(bin_to_hz(8, 256, 48000.0), 1500.0);
        assert_eq!(hz_to_bin(1510.0, 256, 48000.0), 8);
    }
}
