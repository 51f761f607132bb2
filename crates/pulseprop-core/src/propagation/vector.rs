//! Coupled two-polarization split-step integrator.
//!
//! The field is rotated into the fiber's propagation eigenbasis, propagated
//! as two coupled channels, and rotated back to the lab frame. The
//! elliptical basis decouples the linear step into two scalar transfer
//! functions; the circular basis applies a full 2×2 per-frequency matrix
//! while the rotation itself is pinned to χ = π/4, ψ = 0.

use super::{
    validate_iteration_controls, PropagationDiagnostics, PropagationError, UnconvergedStep,
    DEFAULT_MAX_ITERATIONS, DEFAULT_TOLERANCE,
};
use crate::numerics::dispersion::eigenmode_half_step;
use crate::numerics::grid::angular_frequency_grid;
use crate::numerics::nonlinear::vector_kerr_step;
use crate::numerics::polarization::{
    circular_transfer_matrix, rotate_in, rotate_out, CircularTransferMatrix,
};
use crate::numerics::{multiply_into, scale_into, vector_step_residual};
use crate::spectral::{FourierTransform, SpectralKernel};
use num_complex::Complex64;
use std::f64::consts::FRAC_PI_4;
use std::fmt::{Display, Formatter};
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PolarizationBasis {
    #[default]
    Elliptical,
    Circular,
}

impl PolarizationBasis {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Elliptical => "elliptical",
            Self::Circular => "circular",
        }
    }
}

impl Display for PolarizationBasis {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unrecognized polarization basis '{0}'; expected elliptical or circular")]
pub struct ParsePolarizationBasisError(String);

impl FromStr for PolarizationBasis {
    type Err = ParsePolarizationBasisError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "elliptical" => Ok(Self::Elliptical),
            "circular" => Ok(Self::Circular),
            other => Err(ParsePolarizationBasisError(other.to_string())),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct VectorPropagationInput<'a> {
    pub field_x: &'a [Complex64],
    pub field_y: &'a [Complex64],
    pub time_step: f64,
    pub step_size: f64,
    pub step_count: usize,
    pub attenuation_a: &'a [f64],
    pub attenuation_b: &'a [f64],
    pub dispersion_a: &'a [f64],
    pub dispersion_b: &'a [f64],
    pub nonlinear_coefficient: f64,
    /// Orientation angle ψ of the propagation eigenbasis.
    pub orientation: f64,
    /// Ellipticity angle χ of the propagation eigenbasis.
    pub ellipticity: f64,
    pub basis: PolarizationBasis,
    pub max_iterations: usize,
    pub tolerance: f64,
}

impl<'a> VectorPropagationInput<'a> {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        field_x: &'a [Complex64],
        field_y: &'a [Complex64],
        time_step: f64,
        step_size: f64,
        step_count: usize,
        attenuation_a: &'a [f64],
        attenuation_b: &'a [f64],
        dispersion_a: &'a [f64],
        dispersion_b: &'a [f64],
        nonlinear_coefficient: f64,
    ) -> Self {
        Self {
            field_x,
            field_y,
            time_step,
            step_size,
            step_count,
            attenuation_a,
            attenuation_b,
            dispersion_a,
            dispersion_b,
            nonlinear_coefficient,
            orientation: 0.0,
            ellipticity: 0.0,
            basis: PolarizationBasis::default(),
            max_iterations: DEFAULT_MAX_ITERATIONS,
            tolerance: DEFAULT_TOLERANCE,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct VectorPropagationResult {
    pub field_x: Vec<Complex64>,
    pub field_y: Vec<Complex64>,
    pub diagnostics: PropagationDiagnostics,
}

/// Applies the linear half-step in the frequency domain: two independent
/// transfer functions in the elliptical basis, the 2×2 matrix in the
/// circular basis.
fn apply_linear(
    destination_a: &mut [Complex64],
    destination_b: &mut [Complex64],
    source_a: &[Complex64],
    source_b: &[Complex64],
    half_step_a: &[Complex64],
    half_step_b: &[Complex64],
    matrix: Option<&CircularTransferMatrix>,
) {
    match matrix {
        None => {
            multiply_into(destination_a, half_step_a, source_a);
            multiply_into(destination_b, half_step_b, source_b);
        }
        Some(matrix) => {
            for index in 0..source_a.len() {
                destination_a[index] =
                    matrix.h11[index] * source_a[index] + matrix.h12[index] * source_b[index];
                destination_b[index] =
                    matrix.h21[index] * source_a[index] + matrix.h22[index] * source_b[index];
            }
        }
    }
}

/// Propagates a two-polarization field with the default spectral kernel.
pub fn propagate_vector(
    input: VectorPropagationInput<'_>,
) -> Result<VectorPropagationResult, PropagationError> {
    if input.field_x.is_empty() {
        return Err(PropagationError::EmptyField);
    }
    let mut transform = SpectralKernel::new(input.field_x.len());
    propagate_vector_with_transform(input, &mut transform)
}

/// Propagates a two-polarization field through a caller-supplied Fourier
/// provider shared by both channels.
pub fn propagate_vector_with_transform<T: FourierTransform>(
    input: VectorPropagationInput<'_>,
    transform: &mut T,
) -> Result<VectorPropagationResult, PropagationError> {
    if input.field_x.is_empty() {
        return Err(PropagationError::EmptyField);
    }
    if input.field_x.len() != input.field_y.len() {
        return Err(PropagationError::ChannelLengthMismatch {
            x: input.field_x.len(),
            y: input.field_y.len(),
        });
    }
    validate_iteration_controls(input.max_iterations, input.tolerance)?;

    let sample_count = input.field_x.len();
    let frequency_grid = angular_frequency_grid(sample_count, input.time_step);
    let half_step_a = eigenmode_half_step(
        input.attenuation_a,
        input.dispersion_a,
        &frequency_grid,
        input.step_size,
    )?;
    let half_step_b = eigenmode_half_step(
        input.attenuation_b,
        input.dispersion_b,
        &frequency_grid,
        input.step_size,
    )?;

    // The circular method rotates with the fixed χ = π/4, ψ = 0 pair and
    // folds the caller's angles into the 2×2 transfer matrix instead.
    let (rotation_chi, rotation_psi) = match input.basis {
        PolarizationBasis::Elliptical => (input.ellipticity, input.orientation),
        PolarizationBasis::Circular => (FRAC_PI_4, 0.0),
    };
    let matrix = match input.basis {
        PolarizationBasis::Elliptical => None,
        PolarizationBasis::Circular => Some(circular_transfer_matrix(
            &half_step_a,
            &half_step_b,
            input.ellipticity,
            input.orientation,
        )),
    };

    let (mut previous_a, mut previous_b) =
        rotate_in(input.field_x, input.field_y, rotation_chi, rotation_psi);
    let mut estimate_a = previous_a.clone();
    let mut estimate_b = previous_b.clone();

    let mut spectrum_a = previous_a.clone();
    let mut spectrum_b = previous_b.clone();
    transform.forward(&mut spectrum_a)?;
    transform.forward(&mut spectrum_b)?;

    let mut half_field_a = vec![Complex64::default(); sample_count];
    let mut half_field_b = vec![Complex64::default(); sample_count];
    let mut candidate_a = vec![Complex64::default(); sample_count];
    let mut candidate_b = vec![Complex64::default(); sample_count];

    let normalization = 1.0 / sample_count as f64;
    let mut diagnostics = PropagationDiagnostics::default();

    for step in 0..input.step_count {
        apply_linear(
            &mut half_field_a,
            &mut half_field_b,
            &spectrum_a,
            &spectrum_b,
            &half_step_a,
            &half_step_b,
            matrix.as_ref(),
        );
        transform.inverse(&mut half_field_a)?;
        transform.inverse(&mut half_field_b)?;
        // Unlike the scalar path, the vector path normalizes the half-step
        // field here; the nonlinear apply multiplies it unscaled.
        for sample in half_field_a.iter_mut().chain(half_field_b.iter_mut()) {
            *sample *= normalization;
        }

        let mut converged = false;
        let mut iterations = 0;
        let mut residual = f64::INFINITY;
        while iterations < input.max_iterations {
            iterations += 1;

            vector_kerr_step(
                &mut candidate_a,
                &mut candidate_b,
                &half_field_a,
                &half_field_b,
                &previous_a,
                &previous_b,
                &estimate_a,
                &estimate_b,
                input.nonlinear_coefficient,
                input.step_size,
                rotation_chi,
            );

            transform.forward(&mut candidate_a)?;
            transform.forward(&mut candidate_b)?;
            apply_linear(
                &mut spectrum_a,
                &mut spectrum_b,
                &candidate_a,
                &candidate_b,
                &half_step_a,
                &half_step_b,
                matrix.as_ref(),
            );
            candidate_a.copy_from_slice(&spectrum_a);
            candidate_b.copy_from_slice(&spectrum_b);
            transform.inverse(&mut candidate_a)?;
            transform.inverse(&mut candidate_b)?;

            residual =
                vector_step_residual(&candidate_a, &estimate_a, &candidate_b, &estimate_b);
            converged = residual < input.tolerance;
            scale_into(&mut estimate_a, &candidate_a, normalization);
            scale_into(&mut estimate_b, &candidate_b, normalization);
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

        previous_a.copy_from_slice(&estimate_a);
        previous_b.copy_from_slice(&estimate_b);
    }

    let (field_x, field_y) = rotate_out(&estimate_a, &estimate_b, rotation_chi, rotation_psi);
    Ok(VectorPropagationResult {
        field_x,
        field_y,
        diagnostics,
    })
}

#[cfg(test)]
mod tests {
    use super::{
        propagate_vector, PolarizationBasis, PropagationError, VectorPropagationInput,
    };
    use crate::numerics::dispersion::DispersionError;
    use num_complex::Complex64;
    use std::str::FromStr;

    fn two_tone(count: usize) -> (Vec<Complex64>, Vec<Complex64>) {
        let field_x = (0..count)
            .map(|index| Complex64::new((index as f64 * 0.4).cos(), 0.1))
            .collect();
        let field_y = (0..count)
            .map(|index| Complex64::new(0.0, (index as f64 * 0.4).sin()))
            .collect();
        (field_x, field_y)
    }

    #[test]
    fn basis_parses_known_names_only() {
        assert_eq!(
            PolarizationBasis::from_str("elliptical").expect("parse"),
            PolarizationBasis::Elliptical
        );
        assert_eq!(
            PolarizationBasis::from_str("circular").expect("parse"),
            PolarizationBasis::Circular
        );
        assert!(PolarizationBasis::from_str("linear").is_err());
    }

    #[test]
    fn channel_length_mismatch_is_rejected() {
        let field_x = vec![Complex64::default(); 4];
        let field_y = vec![Complex64::default(); 6];
        let input = VectorPropagationInput::new(
            &field_x, &field_y, 1.0, 0.1, 1, &[0.0], &[0.0], &[0.0], &[0.0], 0.0,
        );

        let error = propagate_vector(input).expect_err("validation");
        assert!(matches!(
            error,
            PropagationError::ChannelLengthMismatch { x: 4, y: 6 }
        ));
    }

    #[test]
    fn over_long_dispersion_vector_is_rejected() {
        let (field_x, field_y) = two_tone(4);
        let dispersion = [0.0; 5];
        let input = VectorPropagationInput::new(
            &field_x,
            &field_y,
            1.0,
            0.1,
            1,
            &[0.0],
            &[0.0],
            &dispersion,
            &[0.0],
            0.0,
        );

        let error = propagate_vector(input).expect_err("validation");
        assert!(matches!(
            error,
            PropagationError::Dispersion(DispersionError::CoefficientLength {
                expected: 4,
                actual: 5,
            })
        ));
    }

    #[test]
    fn zero_steps_round_trip_through_the_eigenbasis() {
        let (field_x, field_y) = two_tone(8);
        let mut input = VectorPropagationInput::new(
            &field_x, &field_y, 0.5, 0.1, 0, &[0.0], &[0.0], &[0.0], &[0.0], 1.0,
        );
        input.ellipticity = 0.4;
        input.orientation = -0.9;

        let result = propagate_vector(input).expect("propagation");
        for (input_sample, output_sample) in field_x.iter().zip(&result.field_x) {
            assert!((input_sample - output_sample).norm() < 1.0e-12);
        }
        for (input_sample, output_sample) in field_y.iter().zip(&result.field_y) {
            assert!((input_sample - output_sample).norm() < 1.0e-12);
        }
        assert!(result.diagnostics.is_clean());
    }

    #[test]
    fn circular_basis_ignores_caller_angles_for_the_rotation() {
        // With identical fibers the 2×2 matrix is diagonal regardless of the
        // caller's angles, so a zero-dispersion run must be an identity for
        // any χ, ψ in the circular method.
        let (field_x, field_y) = two_tone(8);
        let mut input = VectorPropagationInput::new(
            &field_x, &field_y, 1.0, 0.25, 1, &[0.0], &[0.0], &[0.0], &[0.0], 0.0,
        );
        input.basis = PolarizationBasis::Circular;
        input.ellipticity = 0.7;
        input.orientation = 1.2;

        let result = propagate_vector(input).expect("propagation");
        for (input_sample, output_sample) in field_x.iter().zip(&result.field_x) {
            assert!((input_sample - output_sample).norm() < 1.0e-10);
        }
        for (input_sample, output_sample) in field_y.iter().zip(&result.field_y) {
            assert!((input_sample - output_sample).norm() < 1.0e-10);
        }
    }
}
