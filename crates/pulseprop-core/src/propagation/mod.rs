//! Symmetric split-step Fourier integrators.
//!
//! Each propagation call owns its workspace buffers and transform handles;
//! nothing outlives the call, so concurrent propagations with different grid
//! lengths are safe. The linear half-step is applied in the frequency domain,
//! and the nonlinear half-step is symmetrized by a fixed-point iteration in
//! the time domain.

mod vector;

pub use vector::{
    propagate_vector, propagate_vector_with_transform, ParsePolarizationBasisError,
    PolarizationBasis, VectorPropagationInput, VectorPropagationResult,
};

use crate::numerics::dispersion::{scalar_half_step, DispersionError};
use crate::numerics::grid::angular_frequency_grid;
use crate::numerics::nonlinear::{kerr_step, raman_steepening_step, RamanSteepeningParams};
use crate::numerics::{multiply_into, scalar_step_residual, scale_into};
use crate::spectral::{FourierTransform, SpectralError, SpectralKernel};
use num_complex::Complex64;

pub const DEFAULT_MAX_ITERATIONS: usize = 4;
pub const DEFAULT_TOLERANCE: f64 = 1.0e-5;

#[derive(Debug, thiserror::Error)]
pub enum PropagationError {
    #[error("input field must contain at least one sample")]
    EmptyField,
    #[error("field channel lengths differ: x={x}, y={y}")]
    ChannelLengthMismatch { x: usize, y: usize },
    #[error("max iterations must be at least 1")]
    ZeroMaxIterations,
    #[error("convergence tolerance must be finite and positive, got {value}")]
    InvalidTolerance { value: f64 },
    #[error(transparent)]
    Dispersion(#[from] DispersionError),
    #[error(transparent)]
    Transform(#[from] SpectralError),
}

/// One Z step whose nonlinear iteration did not reach tolerance. Non-fatal:
/// the best available estimate was accepted and propagation continued.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct UnconvergedStep {
    pub step: usize,
    pub iterations: usize,
    pub residual: f64,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct PropagationDiagnostics {
    pub unconverged_steps: Vec<UnconvergedStep>,
}

impl PropagationDiagnostics {
    pub fn is_clean(&self) -> bool {
        self.unconverged_steps.is_empty()
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScalarPropagationInput<'a> {
    pub field: &'a [Complex64],
    pub time_step: f64,
    pub step_size: f64,
    pub step_count: usize,
    pub attenuation: &'a [f64],
    pub dispersion: &'a [f64],
    pub nonlinear_coefficient: f64,
    pub raman_time: f64,
    pub optical_cycle: f64,
    pub max_iterations: usize,
    pub tolerance: f64,
}

impl<'a> ScalarPropagationInput<'a> {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        field: &'a [Complex64],
        time_step: f64,
        step_size: f64,
        step_count: usize,
        attenuation: &'a [f64],
        dispersion: &'a [f64],
        nonlinear_coefficient: f64,
    ) -> Self {
        Self {
            field,
            time_step,
            step_size,
            step_count,
            attenuation,
            dispersion,
            nonlinear_coefficient,
            raman_time: 0.0,
            optical_cycle: 0.0,
            max_iterations: DEFAULT_MAX_ITERATIONS,
            tolerance: DEFAULT_TOLERANCE,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ScalarPropagationResult {
    pub field: Vec<Complex64>,
    pub diagnostics: PropagationDiagnostics,
}

pub(crate) fn validate_iteration_controls(
    max_iterations: usize,
    tolerance: f64,
) -> Result<(), PropagationError> {
    if max_iterations == 0 {
        return Err(PropagationError::ZeroMaxIterations);
    }
    if !tolerance.is_finite() || tolerance <= 0.0 {
        return Err(PropagationError::InvalidTolerance { value: tolerance });
    }
    Ok(())
}

/// Propagates a single-polarization field with the default spectral kernel.
pub fn propagate_scalar(
    input: ScalarPropagationInput<'_>,
) -> Result<ScalarPropagationResult, PropagationError> {
    if input.field.is_empty() {
        return Err(PropagationError::EmptyField);
    }
    let mut transform = SpectralKernel::new(input.field.len());
    propagate_scalar_with_transform(input, &mut transform)
}

/// Propagates a single-polarization field through a caller-supplied Fourier
/// provider. The provider must match the field length and leave both
/// directions un-normalized.
pub fn propagate_scalar_with_transform<T: FourierTransform>(
    input: ScalarPropagationInput<'_>,
    transform: &mut T,
) -> Result<ScalarPropagationResult, PropagationError> {
    if input.field.is_empty() {
        return Err(PropagationError::EmptyField);
    }
    validate_iteration_controls(input.max_iterations, input.tolerance)?;

    let sample_count = input.field.len();
    let frequency_grid = angular_frequency_grid(sample_count, input.time_step);
    let half_step = scalar_half_step(
        input.attenuation,
        input.dispersion,
        &frequency_grid,
        input.step_size,
    )?;

    let normalization = 1.0 / sample_count as f64;
    let pure_kerr = input.raman_time == 0.0 && input.optical_cycle == 0.0;
    let finite_difference_params = RamanSteepeningParams {
        nonlinear_coefficient: input.nonlinear_coefficient,
        step_size: input.step_size,
        time_step: input.time_step,
        raman_time: input.raman_time,
        optical_cycle: input.optical_cycle,
    };

    let mut previous = input.field.to_vec();
    let mut estimate = previous.clone();
    let mut spectrum = previous.clone();
    transform.forward(&mut spectrum)?;
    let mut half_field = vec![Complex64::default(); sample_count];
    let mut candidate = vec![Complex64::default(); sample_count];

    let mut diagnostics = PropagationDiagnostics::default();

    for step in 0..input.step_count {
        // First linear half-step; the inverse transform leaves the ×N scale
        // on `half_field`, which the nonlinear apply divides back out.
        multiply_into(&mut half_field, &half_step, &spectrum);
        transform.inverse(&mut half_field)?;

        let mut converged = false;
        let mut iterations = 0;
        let mut residual = f64::INFINITY;
        while iterations < input.max_iterations {
            iterations += 1;

            if pure_kerr {
                kerr_step(
                    &mut candidate,
                    &half_field,
                    &previous,
                    &estimate,
                    input.nonlinear_coefficient,
                    input.step_size,
                );
            } else {
                raman_steepening_step(
                    &mut candidate,
                    &half_field,
                    &previous,
                    &estimate,
                    &finite_difference_params,
                );
            }

            // Second linear half-step. `spectrum` keeps the frequency-domain
            // field so the next Z step starts without a fresh forward
            // transform.
            transform.forward(&mut candidate)?;
            multiply_into(&mut spectrum, &candidate, &half_step);
            candidate.copy_from_slice(&spectrum);
            transform.inverse(&mut candidate)?;

            residual = scalar_step_residual(&candidate, &estimate);
            converged = residual < input.tolerance;
            scale_into(&mut estimate, &candidate, normalization);
            if converged {
                break;
            }
        }

        if !converged {
            diagnostics.unconverged_steps.push(UnconvergedStep {
                step,
                iterations,
                residual,
            });
        }

        previous.copy_from_slice(&estimate);
    }

    Ok(ScalarPropagationResult {
        field: estimate,
        diagnostics,
    })
}
