use num_complex::Complex64;
use pulseprop_core::{
    propagate_scalar, propagate_vector, PolarizationBasis, ScalarPropagationInput,
    VectorPropagationInput,
};
use std::f64::consts::FRAC_PI_4;

fn gaussian_pair(count: usize, time_step: f64) -> (Vec<Complex64>, Vec<Complex64>) {
    let center = count as f64 / 2.0;
    let field_x = (0..count)
        .map(|index| {
            let time = (index as f64 - center) * time_step;
            Complex64::new((-time * time / 2.0).exp(), 0.0)
        })
        .collect();
    let field_y = (0..count)
        .map(|index| {
            let time = (index as f64 - center) * time_step;
            Complex64::new(0.0, 0.6 * (-time * time / 1.5).exp())
        })
        .collect();
    (field_x, field_y)
}

#[test]
fn elliptical_and_circular_methods_agree_at_quarter_pi() {
    let (field_x, field_y) = gaussian_pair(16, 0.5);
    let attenuation_a = [0.1];
    let attenuation_b = [0.05];
    let dispersion_a = [0.0, 0.0, 0.5];
    let dispersion_b = [0.0, 0.3];

    let mut elliptical = VectorPropagationInput::new(
        &field_x,
        &field_y,
        0.5,
        0.1,
        3,
        &attenuation_a,
        &attenuation_b,
        &dispersion_a,
        &dispersion_b,
        1.4,
    );
    elliptical.ellipticity = FRAC_PI_4;
    elliptical.orientation = 0.0;

    let mut circular = elliptical;
    circular.basis = PolarizationBasis::Circular;

    let elliptical_result = propagate_vector(elliptical).expect("elliptical propagation");
    let circular_result = propagate_vector(circular).expect("circular propagation");

    for (lhs, rhs) in elliptical_result
        .field_x
        .iter()
        .zip(&circular_result.field_x)
    {
        assert!(
            (lhs - rhs).norm() < 1.0e-10,
            "x channel diverged: {lhs} vs {rhs}"
        );
    }
    for (lhs, rhs) in elliptical_result
        .field_y
        .iter()
        .zip(&circular_result.field_y)
    {
        assert!(
            (lhs - rhs).norm() < 1.0e-10,
            "y channel diverged: {lhs} vs {rhs}"
        );
    }
}

#[test]
fn uncoupled_channels_match_independent_scalar_runs() {
    let (field_x, field_y) = gaussian_pair(32, 0.25);
    let attenuation_a = [0.2];
    let attenuation_b = [0.0];
    let dispersion_a = [0.0, 0.0, 1.0];
    let dispersion_b = [0.0, 1.0];

    // χ = ψ = 0 makes the eigenbasis the lab frame, and γ = 0 removes the
    // cross-channel coupling entirely.
    let vector_input = VectorPropagationInput::new(
        &field_x,
        &field_y,
        0.25,
        0.1,
        4,
        &attenuation_a,
        &attenuation_b,
        &dispersion_a,
        &dispersion_b,
        0.0,
    );
    let vector_result = propagate_vector(vector_input).expect("vector propagation");

    let scalar_x = propagate_scalar(ScalarPropagationInput::new(
        &field_x,
        0.25,
        0.1,
        4,
        &attenuation_a,
        &dispersion_a,
        0.0,
    ))
    .expect("scalar x propagation");
    let scalar_y = propagate_scalar(ScalarPropagationInput::new(
        &field_y,
        0.25,
        0.1,
        4,
        &attenuation_b,
        &dispersion_b,
        0.0,
    ))
    .expect("scalar y propagation");

    for (vector_sample, scalar_sample) in vector_result.field_x.iter().zip(&scalar_x.field) {
        assert!((vector_sample - scalar_sample).norm() < 1.0e-10);
    }
    for (vector_sample, scalar_sample) in vector_result.field_y.iter().zip(&scalar_y.field) {
        assert!((vector_sample - scalar_sample).norm() < 1.0e-10);
    }
}

#[test]
fn constant_fields_accumulate_analytic_kerr_and_xpm_phases() {
    let amplitude_x = 0.8;
    let amplitude_y = 0.5;
    let nonlinear_coefficient = 1.2;
    let step_size = 0.1;
    let step_count = 4;
    let field_x = vec![Complex64::new(amplitude_x, 0.0); 8];
    let field_y = vec![Complex64::new(amplitude_y, 0.0); 8];

    let input = VectorPropagationInput::new(
        &field_x,
        &field_y,
        1.0,
        step_size,
        step_count,
        &[0.0],
        &[0.0],
        &[0.0],
        &[0.0],
        nonlinear_coefficient,
    );
    let result = propagate_vector(input).expect("propagation");
    assert!(result.diagnostics.is_clean());

    // χ = 0: self weight 3/2, cross weight 1, per-step phase
    // γΔz/3 · (3·|self|² + 2·|other|²).
    let intensity_x = amplitude_x * amplitude_x;
    let intensity_y = amplitude_y * amplitude_y;
    let phase_x = nonlinear_coefficient * step_size / 3.0
        * (3.0 * intensity_x + 2.0 * intensity_y)
        * step_count as f64;
    let phase_y = nonlinear_coefficient * step_size / 3.0
        * (3.0 * intensity_y + 2.0 * intensity_x)
        * step_count as f64;

    let expected_x = Complex64::from_polar(amplitude_x, -phase_x);
    let expected_y = Complex64::from_polar(amplitude_y, -phase_y);
    for output in &result.field_x {
        assert!(
            (output - expected_x).norm() < 1.0e-8,
            "expected {expected_x}, got {output}"
        );
    }
    for output in &result.field_y {
        assert!(
            (output - expected_y).norm() < 1.0e-8,
            "expected {expected_y}, got {output}"
        );
    }
}

#[test]
fn identity_physics_round_trips_through_rotated_eigenbasis() {
    let (field_x, field_y) = gaussian_pair(16, 0.5);
    let mut input = VectorPropagationInput::new(
        &field_x, &field_y, 0.5, 0.25, 2, &[0.0], &[0.0], &[0.0], &[0.0], 0.0,
    );
    input.ellipticity = 0.35;
    input.orientation = -1.1;

    let result = propagate_vector(input).expect("propagation");

    for (output, original) in result.field_x.iter().zip(&field_x) {
        assert!((output - original).norm() < 1.0e-10);
    }
    for (output, original) in result.field_y.iter().zip(&field_y) {
        assert!((output - original).norm() < 1.0e-10);
    }
}

#[test]
fn birefringent_loss_decays_each_eigenmode_independently() {
    // With χ = ψ = 0 and pure loss the channels decay by their own rates.
    let (field_x, field_y) = gaussian_pair(8, 1.0);
    let loss_a = 0.6;
    let loss_b = 0.2;
    let step_size = 0.5;
    let attenuation_a = [loss_a];
    let attenuation_b = [loss_b];
    let input = VectorPropagationInput::new(
        &field_x,
        &field_y,
        1.0,
        step_size,
        2,
        &attenuation_a,
        &attenuation_b,
        &[0.0],
        &[0.0],
        0.0,
    );

    let result = propagate_vector(input).expect("propagation");

    let decay_a = (-loss_a * step_size / 2.0 * 2.0).exp();
    let decay_b = (-loss_b * step_size / 2.0 * 2.0).exp();
    for (output, original) in result.field_x.iter().zip(&field_x) {
        assert!((output - original * decay_a).norm() < 1.0e-10);
    }
    for (output, original) in result.field_y.iter().zip(&field_y) {
        assert!((output - original * decay_b).norm() < 1.0e-10);
    }
}
