//! Two-dimensional wavetable lookup and playback.

use super::{DEFAULT_SAMPLE_RATE, SampleSource};
use crate::error::{Error, Result};
use crate::samples::SampleBuffer;

/// A grid of single-cycle waves.
///
/// Each row is one cycle sampled at `columns` points. A lookup takes a wave
/// number and a phase, both in cycles and wrapped into `0..1`, and
/// interpolates bilinearly between the nearest rows and columns. Both axes
/// wrap: past the last row it blends back into the first.
#[derive(Debug, Clone, PartialEq)]
pub struct Wavetable {
    data: Vec<f32>,
    rows: usize,
    columns: usize,
}

impl Wavetable {
    /// Build a table from equal-length rows.
    ///
    /// # Errors
    ///
    /// [`Error::InvalidWavetable`] if there are no rows, the rows are empty,
    /// or their lengths differ.
    pub fn new(rows: Vec<Vec<f32>>) -> Result<Self> {
        let columns = rows.first().map_or(0, Vec::len);
        if columns == 0 {
            return Err(Error::InvalidWavetable("table has no samples".into()));
        }
        if let Some((row, len)) = rows
            .iter()
            .map(Vec::len)
            .enumerate()
            .find(|&(_, len)| len != columns)
        {
            return Err(Error::InvalidWavetable(format!(
                "row {row} has {len} samples, expected {columns}"
            )));
        }
        Ok(Self {
            rows: rows.len(),
            columns,
            data: rows.concat(),
        })
    }

    /// Number of waves.
    pub fn rows(&self) -> usize {
        self.rows
    }

    /// Samples per wave.
    pub fn columns(&self) -> usize {
        self.columns
    }

    /// Interpolated value of wave `number` at `phase`.
    pub fn lookup(&self, number: f64, phase: f64) -> f32 {
        let (row1, row2, row_t) = split(number, self.rows);
        let (col1, col2, col_t) = split(phase, self.columns);
        let at = |row: usize, col: usize| f64::from(self.data[row * self.columns + col]);

        let top = at(row1, col1) * (1.0 - col_t) + at(row1, col2) * col_t;
        let bottom = at(row2, col1) * (1.0 - col_t) + at(row2, col2) * col_t;
        (top * (1.0 - row_t) + bottom * row_t) as f32
    }

    /// Replace each phase in `phases` with the lookup at the matching wave
    /// number.
    ///
    /// # Errors
    ///
    /// [`Error::RaggedChannels`] if the slices differ in length.
    pub fn lookup_into(&self, numbers: &[f32], phases: &mut [f32]) -> Result<()> {
        if numbers.len() != phases.len() {
            return Err(Error::RaggedChannels {
                channel: 1,
                expected: numbers.len(),
                actual: phases.len(),
            });
        }
        for (phase, &number) in phases.iter_mut().zip(numbers) {
            *phase = self.lookup(f64::from(number), f64::from(*phase));
        }
        Ok(())
    }
}

/// Wrap `position` into `0..1`, scale to `len` cells, and return the two
/// neighbouring indices with the blend between them.
fn split(position: f64, len: usize) -> (usize, usize, f64) {
    let scaled = position.rem_euclid(1.0) * len as f64;
    let floor = scaled.floor();
    let lower = floor as usize % len;
    let upper = scaled.ceil() as usize % len;
    (lower, upper, scaled - floor)
}

/// Plays a [`Wavetable`] at a frequency, morphing between waves as the wave
/// number changes. Never ends.
#[derive(Debug, Clone)]
pub struct WavetableOscillator {
    table: Wavetable,
    frequency: f32,
    number: f64,
    phase: f64,
    sample_rate: f32,
}

impl WavetableOscillator {
    /// Play wave 0 of `table` at `frequency` Hz.
    pub fn new(table: Wavetable, frequency: f32) -> Self {
        Self {
            table,
            frequency,
            number: 0.0,
            phase: 0.0,
            sample_rate: DEFAULT_SAMPLE_RATE,
        }
    }

    /// Sample rate in Hz.
    pub fn with_sample_rate(mut self, sample_rate: f32) -> Self {
        self.sample_rate = sample_rate;
        self
    }

    /// Starting wave number (in cycles through the table).
    pub fn with_number(mut self, number: f64) -> Self {
        self.number = number;
        self
    }

    /// Select the wave to play; fractional values blend neighbouring rows.
    pub fn set_number(&mut self, number: f64) {
        self.number = number;
    }

    /// Current wave number.
    pub fn number(&self) -> f64 {
        self.number
    }

    /// Change the frequency without resetting phase.
    pub fn set_frequency(&mut self, frequency: f32) {
        self.frequency = frequency;
    }

    /// The table being played.
    pub fn table(&self) -> &Wavetable {
        &self.table
    }
}

impl SampleSource for WavetableOscillator {
    fn sample(&mut self, count: usize) -> Result<Option<SampleBuffer>> {
        let step = f64::from(self.frequency) / f64::from(self.sample_rate);
        let out = (0..count)
            .map(|_| {
                let value = self.table.lookup(self.number, self.phase);
                self.phase = (self.phase + step).rem_euclid(1.0);
                value
            })
            .collect::<Vec<f32>>();
        Ok(Some(out.into()))
    }

    fn sample_rate(&self) -> f32 {
        self.sample_rate
    }

    fn set_sample_rate(&mut self, sample_rate: f32) -> Result<()> {
        self.sample_rate = sample_rate;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table() -> Wavetable {
        Wavetable::new(vec![vec![0.0, 1.0, 0.0, -1.0], vec![1.0, 1.0, -1.0, -1.0]]).unwrap()
    }

    #[test]
    fn rejects_bad_shapes() {
        assert!(matches!(
            Wavetable::new(Vec::new()),
            Err(Error::InvalidWavetable(_))
        ));
        assert!(matches!(
            Wavetable::new(vec![Vec::new()]),
            Err(Error::InvalidWavetable(_))
        ));
        let err = Wavetable::new(vec![vec![0.0; 4], vec![0.0; 3]]).unwrap_err();
        assert!(err.to_string().contains("row 1"), "{err}");
    }

    #[test]
    fn exact_grid_points() {
        let t = table();
        assert_eq!((t.rows(), t.columns()), (2, 4));
        assert_eq!(t.lookup(0.0, 0.25), 1.0);
        assert_eq!(t.lookup(0.5, 0.0), 1.0);
        assert_eq!(t.lookup(0.5, 0.5), -1.0);
    }

    #[test]
    fn interpolates_along_both_axes() {
        let t = table();
        assert_eq!(t.lookup(0.0, 0.125), 0.5);
        assert_eq!(t.lookup(0.25, 0.0), 0.5);
        assert_eq!(t.lookup(0.25, 0.125), 0.75);
    }

    #[test]
    fn both_axes_wrap() {
        let t = table();
        // phase 0.875 blends the last column with the first
        assert_eq!(t.lookup(0.0, 0.875), -0.5);
        // wave 0.75 blends the last row with the first
        assert_eq!(t.lookup(0.75, 0.0), 0.5);
        assert_eq!(t.lookup(-1.0, 1.25), t.lookup(0.0, 0.25));
    }

    #[test]
    fn lookup_into_overwrites_phases() {
        let t = table();
        let mut phases = [0.0, 0.25, 0.5];
        t.lookup_into(&[0.5, 0.0, 0.5], &mut phases).unwrap();
        assert_eq!(phases, [1.0, 1.0, -1.0]);
        assert!(t.lookup_into(&[0.0], &mut phases).is_err());
    }

    #[test]
    fn oscillator_plays_selected_wave() {
        let mut osc = WavetableOscillator::new(table(), 12000.0);
        let out = osc.sample(4).unwrap().unwrap();
        assert_eq!(out.as_real().unwrap(), &[0.0, 1.0, 0.0, -1.0]);

        osc.set_number(0.5);
        let out = osc.sample(4).unwrap().unwrap();
        assert_eq!(out.as_real().unwrap(), &[1.0, 1.0, -1.0, -1.0]);
        assert_eq!(osc.number(), 0.5);
    }
}
