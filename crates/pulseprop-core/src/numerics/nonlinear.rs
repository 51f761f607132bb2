//! Per-sample nonlinear step operators.
//!
//! The scalar path has two deliberately separate loops: a pure-Kerr fast path
//! and a finite-difference path for Raman response and self-steepening. The
//! finite-difference form is a different numerical scheme, not a zero-valued
//! special case of one shared loop, so the two are never merged.

use num_complex::Complex64;

/// Parameters of the scalar Raman/self-steepening step.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RamanSteepeningParams {
    pub nonlinear_coefficient: f64,
    pub step_size: f64,
    pub time_step: f64,
    pub raman_time: f64,
    pub optical_cycle: f64,
}

/// Pure-Kerr scalar step: `uv[j] = uhalf[j]·exp(−i·γ·(|u0[j]|²+|u1[j]|²)·Δz/2) / N`.
///
/// The division by N compensates the un-normalized inverse transform that
/// produced `uhalf`.
pub fn kerr_step(
    output: &mut [Complex64],
    half_step_field: &[Complex64],
    previous_field: &[Complex64],
    estimate_field: &[Complex64],
    nonlinear_coefficient: f64,
    step_size: f64,
) {
    let scale = 1.0 / half_step_field.len() as f64;
    for (((out, &half), &previous), &estimate) in output
        .iter_mut()
        .zip(half_step_field)
        .zip(previous_field)
        .zip(estimate_field)
    {
        let phase = nonlinear_coefficient
            * (previous.norm_sqr() + estimate.norm_sqr())
            * step_size
            / 2.0;
        *out = half * Complex64::from_polar(scale, -phase);
    }
}

/// Scalar step with Raman response and self-steepening, using circularly
/// wrapped three-point finite differences of the intensity and of the
/// neighbor cross products. Accumulated over both the `u0` and `u1`
/// snapshots, scaled by `γΔz/2`, and applied as
/// `uv[j] = uhalf[j]·exp(gain − i·phase) / N`.
pub fn raman_steepening_step(
    output: &mut [Complex64],
    half_step_field: &[Complex64],
    previous_field: &[Complex64],
    estimate_field: &[Complex64],
    params: &RamanSteepeningParams,
) {
    let count = half_step_field.len();
    let scale = 1.0 / count as f64;
    let raman_factor = params.raman_time / (2.0 * params.time_step);
    let steepening_factor =
        params.optical_cycle / (4.0 * std::f64::consts::PI * params.time_step);
    let step_factor = params.nonlinear_coefficient * params.step_size / 2.0;

    for index in 0..count {
        let before = if index == 0 { count - 1 } else { index - 1 };
        let after = if index + 1 == count { 0 } else { index + 1 };

        let mut phase = 0.0;
        let mut gain = 0.0;
        for snapshot in [previous_field, estimate_field] {
            let current = snapshot[index];
            let next = snapshot[after];
            let prior = snapshot[before];
            let intensity_slope = next.norm_sqr() - prior.norm_sqr();
            // conj(current)·neighbor carries both cross products: the real
            // part feeds the gain channel, the imaginary part the phase.
            let cross_next = current.conj() * next;
            let cross_prior = current.conj() * prior;

            gain -= steepening_factor
                * (intensity_slope + cross_next.re - cross_prior.re);
            phase += current.norm_sqr() - raman_factor * intensity_slope
                + steepening_factor * (cross_next.im - cross_prior.im);
        }

        let factor = Complex64::new(gain * step_factor, -phase * step_factor).exp();
        output[index] = half_step_field[index] * factor * scale;
    }
}

/// Vector Kerr + cross-phase-modulation step, shared by the elliptical and
/// circular bases (the circular caller passes χ = π/4). No division by N:
/// the vector path normalizes the half-step field before iterating.
#[allow(clippy::too_many_arguments)]
pub fn vector_kerr_step(
    output_a: &mut [Complex64],
    output_b: &mut [Complex64],
    half_step_a: &[Complex64],
    half_step_b: &[Complex64],
    previous_a: &[Complex64],
    previous_b: &[Complex64],
    estimate_a: &[Complex64],
    estimate_b: &[Complex64],
    nonlinear_coefficient: f64,
    step_size: f64,
    chi: f64,
) {
    let coefficient = nonlinear_coefficient * step_size / 3.0;
    let cos_term = (2.0 * chi).cos();
    let sin_term = (2.0 * chi).sin();
    let self_weight = (2.0 + cos_term * cos_term) / 2.0;
    let cross_weight = (2.0 + 2.0 * sin_term * sin_term) / 2.0;

    for index in 0..half_step_a.len() {
        let intensity_a = previous_a[index].norm_sqr() + estimate_a[index].norm_sqr();
        let intensity_b = previous_b[index].norm_sqr() + estimate_b[index].norm_sqr();

        let phase_a = coefficient * (self_weight * intensity_a + cross_weight * intensity_b);
        let phase_b = coefficient * (self_weight * intensity_b + cross_weight * intensity_a);

        output_a[index] = half_step_a[index] * Complex64::from_polar(1.0, -phase_a);
        output_b[index] = half_step_b[index] * Complex64::from_polar(1.0, -phase_b);
    }
}
