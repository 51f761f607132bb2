pub mod dispersion;
pub mod grid;
pub mod nonlinear;
pub mod polarization;

pub use dispersion::{
    broadcast_attenuation, eigenmode_half_step, evaluate_on_grid, scalar_half_step,
    DispersionError,
};
pub use grid::angular_frequency_grid;
pub use nonlinear::{
    kerr_step, raman_steepening_step, vector_kerr_step, RamanSteepeningParams,
};
pub use polarization::{
    circular_transfer_matrix, rotate_in, rotate_out, CircularTransferMatrix,
};

use num_complex::Complex64;

/// Element-wise product `destination[j] = lhs[j] * rhs[j]`.
pub fn multiply_into(destination: &mut [Complex64], lhs: &[Complex64], rhs: &[Complex64]) {
    for ((out, a), b) in destination.iter_mut().zip(lhs).zip(rhs) {
        *out = a * b;
    }
}

/// Scaled copy `destination[j] = factor * source[j]`.
pub fn scale_into(destination: &mut [Complex64], source: &[Complex64], factor: f64) {
    for (out, value) in destination.iter_mut().zip(source) {
        *out = value * factor;
    }
}

/// Sum of squared magnitudes over a field.
pub fn total_power(field: &[Complex64]) -> f64 {
    field.iter().map(|sample| sample.norm_sqr()).sum()
}

/// Residual of one scalar nonlinear iteration.
///
/// `raw` is the un-normalized inverse-transform output (carrying the ×N
/// scale) and `previous` the already-normalized estimate from the last
/// iteration; the division by N happens on the `raw` side only. Returns
/// `Σ|previous − raw/N|² / Σ|previous|²`.
pub fn scalar_step_residual(raw: &[Complex64], previous: &[Complex64]) -> f64 {
    let scale = 1.0 / raw.len() as f64;
    let mut numerator = 0.0;
    let mut denominator = 0.0;

    for (current, reference) in raw.iter().zip(previous) {
        numerator += (reference - current * scale).norm_sqr();
        denominator += reference.norm_sqr();
    }

    numerator / denominator
}

/// Residual of one vector nonlinear iteration, both channels summed jointly.
///
/// Same normalization asymmetry as [`scalar_step_residual`], but the vector
/// criterion is the rooted norm ratio
/// `sqrt(Σ|raw/N − previous|²) / sqrt(Σ|previous|²)`.
pub fn vector_step_residual(
    raw_a: &[Complex64],
    previous_a: &[Complex64],
    raw_b: &[Complex64],
    previous_b: &[Complex64],
) -> f64 {
    let scale = 1.0 / raw_a.len() as f64;
    let mut numerator = 0.0;
    let mut denominator = 0.0;

    for (current, reference) in raw_a.iter().zip(previous_a) {
        numerator += (current * scale - reference).norm_sqr();
        denominator += reference.norm_sqr();
    }
    for (current, reference) in raw_b.iter().zip(previous_b) {
        numerator += (current * scale - reference).norm_sqr();
        denominator += reference.norm_sqr();
    }

    numerator.sqrt() / denominator.sqrt()
}
