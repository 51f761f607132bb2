//! Linear (loss + dispersion) half-step transfer functions.
//!
//! Coefficient vectors are interpreted by length: one element broadcasts a
//! uniform value, a full-length vector is taken verbatim per frequency, and
//! any shorter vector is the Taylor coefficient list of a polynomial in ω.

use num_complex::Complex64;

#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum DispersionError {
    #[error("attenuation vector length must be 1 or {expected}, got {actual}")]
    AttenuationLength { expected: usize, actual: usize },
    #[error("coefficient vector length {actual} exceeds the field length {expected}")]
    CoefficientLength { expected: usize, actual: usize },
}

/// Evaluates a coefficient vector on the angular-frequency grid.
///
/// A full-length vector is copied verbatim. Anything shorter is treated as a
/// Taylor list and evaluated as `Σ coef[i]·ω^i / i!` with a running
/// power-over-factorial term (`term *= ω / i`, ascending `i`), so large
/// expansion orders never form an explicit power or factorial.
pub fn evaluate_on_grid(
    coefficients: &[f64],
    frequency_grid: &[f64],
) -> Result<Vec<f64>, DispersionError> {
    let sample_count = frequency_grid.len();
    if coefficients.len() > sample_count {
        return Err(DispersionError::CoefficientLength {
            expected: sample_count,
            actual: coefficients.len(),
        });
    }

    if coefficients.len() == sample_count {
        return Ok(coefficients.to_vec());
    }

    let evaluated = frequency_grid
        .iter()
        .map(|&frequency| {
            let mut total = 0.0;
            let mut term = 1.0;
            for (order, &coefficient) in coefficients.iter().enumerate() {
                if order > 0 {
                    term *= frequency / order as f64;
                }
                total += coefficient * term;
            }
            total
        })
        .collect();

    Ok(evaluated)
}

/// Broadcasts an attenuation vector to the field length.
///
/// The scalar propagation path accepts only a uniform value or a full
/// per-frequency vector; no Taylor form is defined for it.
pub fn broadcast_attenuation(
    attenuation: &[f64],
    sample_count: usize,
) -> Result<Vec<f64>, DispersionError> {
    match attenuation.len() {
        1 => Ok(vec![attenuation[0]; sample_count]),
        len if len == sample_count => Ok(attenuation.to_vec()),
        actual => Err(DispersionError::AttenuationLength {
            expected: sample_count,
            actual,
        }),
    }
}

/// Combines evaluated loss and phase profiles into the complex half-step
/// multiplier `exp(−α·Δz/4)·exp(−i·β·Δz/2)`.
pub fn half_step_transfer(
    attenuation_profile: &[f64],
    dispersion_profile: &[f64],
    step_size: f64,
) -> Vec<Complex64> {
    attenuation_profile
        .iter()
        .zip(dispersion_profile)
        .map(|(&loss, &phase)| {
            Complex64::from_polar((-loss * step_size / 4.0).exp(), -phase * step_size / 2.0)
        })
        .collect()
}

/// Half-step transfer function for the scalar propagation path.
pub fn scalar_half_step(
    attenuation: &[f64],
    dispersion: &[f64],
    frequency_grid: &[f64],
    step_size: f64,
) -> Result<Vec<Complex64>, DispersionError> {
    let loss = broadcast_attenuation(attenuation, frequency_grid.len())?;
    let phase = evaluate_on_grid(dispersion, frequency_grid)?;
    Ok(half_step_transfer(&loss, &phase, step_size))
}

/// Half-step transfer function for one propagation eigenmode of the vector
/// path, where attenuation and dispersion both follow the length rule.
pub fn eigenmode_half_step(
    attenuation: &[f64],
    dispersion: &[f64],
    frequency_grid: &[f64],
    step_size: f64,
) -> Result<Vec<Complex64>, DispersionError> {
    let loss = evaluate_on_grid(attenuation, frequency_grid)?;
    let phase = evaluate_on_grid(dispersion, frequency_grid)?;
    Ok(half_step_transfer(&loss, &phase, step_size))
}
