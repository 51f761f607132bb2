//! Angular-frequency sample grid in standard DFT ordering.

use std::f64::consts::TAU;

/// Builds the angular-frequency vector for `sample_count` time-domain samples
/// spaced `time_step` apart: index 0 is zero frequency, indices up to
/// `(n - 1) / 2` hold the increasing positive frequencies, and the remaining
/// indices wrap to the negative branch.
pub fn angular_frequency_grid(sample_count: usize, time_step: f64) -> Vec<f64> {
    let span = time_step * sample_count as f64;
    let mut grid = Vec::with_capacity(sample_count);

    for index in 0..sample_count {
        let frequency = TAU * index as f64 / span;
        if index <= (sample_count - 1) / 2 {
            grid.push(frequency);
        } else {
            grid.push(frequency - TAU / time_step);
        }
    }

    grid
}
