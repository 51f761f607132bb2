//! Rotations between the lab (x, y) frame and the fiber's propagation
//! eigenbasis, parameterized by ellipticity χ and orientation ψ. The circular
//! basis is the χ = π/4, ψ = 0 special case.

use num_complex::Complex64;

/// Per-frequency 2×2 linear-propagation matrix for the circular basis.
#[derive(Debug, Clone, PartialEq)]
pub struct CircularTransferMatrix {
    pub h11: Vec<Complex64>,
    pub h12: Vec<Complex64>,
    pub h21: Vec<Complex64>,
    pub h22: Vec<Complex64>,
}

fn rotation_terms(chi: f64, psi: f64) -> (f64, f64, f64, f64) {
    (
        psi.cos() * chi.cos(),
        psi.sin() * chi.sin(),
        psi.sin() * chi.cos(),
        psi.cos() * chi.sin(),
    )
}

/// Rotates lab-frame channels into the eigenbasis:
/// `ua = (cosψcosχ − i·sinψsinχ)·ux + (sinψcosχ + i·cosψsinχ)·uy`, with `ub`
/// the orthogonal combination. Real-only inputs are just the zero-imaginary
/// special case; there is a single code path for every input shape.
pub fn rotate_in(
    field_x: &[Complex64],
    field_y: &[Complex64],
    chi: f64,
    psi: f64,
) -> (Vec<Complex64>, Vec<Complex64>) {
    let (cc, ss, sc, cs) = rotation_terms(chi, psi);
    let a_from_x = Complex64::new(cc, -ss);
    let a_from_y = Complex64::new(sc, cs);
    let b_from_x = Complex64::new(-sc, cs);
    let b_from_y = Complex64::new(cc, ss);

    let mut mode_a = Vec::with_capacity(field_x.len());
    let mut mode_b = Vec::with_capacity(field_x.len());
    for (&x, &y) in field_x.iter().zip(field_y) {
        mode_a.push(a_from_x * x + a_from_y * y);
        mode_b.push(b_from_x * x + b_from_y * y);
    }

    (mode_a, mode_b)
}

/// Exact algebraic inverse of [`rotate_in`] (the conjugate transpose of the
/// rotation), mapping eigenbasis channels back to the lab frame.
pub fn rotate_out(
    mode_a: &[Complex64],
    mode_b: &[Complex64],
    chi: f64,
    psi: f64,
) -> (Vec<Complex64>, Vec<Complex64>) {
    let (cc, ss, sc, cs) = rotation_terms(chi, psi);
    let x_from_a = Complex64::new(cc, ss);
    let x_from_b = Complex64::new(-sc, -cs);
    let y_from_a = Complex64::new(sc, -cs);
    let y_from_b = Complex64::new(cc, -ss);

    let mut field_x = Vec::with_capacity(mode_a.len());
    let mut field_y = Vec::with_capacity(mode_a.len());
    for (&a, &b) in mode_a.iter().zip(mode_b) {
        field_x.push(x_from_a * a + x_from_b * b);
        field_y.push(y_from_a * a + y_from_b * b);
    }

    (field_x, field_y)
}

/// Assembles the 2×2 circular-basis propagation matrix from the two
/// eigenmode half-step transfer functions:
/// `h11 = ((1+sin2χ)·ha + (1−sin2χ)·hb)/2`,
/// `h12 = (sin2ψ − i·cos2ψ)·cos2χ·(ha−hb)/2`,
/// `h21 = (sin2ψ + i·cos2ψ)·cos2χ·(ha−hb)/2`,
/// `h22 = ((1−sin2χ)·ha + (1+sin2χ)·hb)/2`.
pub fn circular_transfer_matrix(
    half_step_a: &[Complex64],
    half_step_b: &[Complex64],
    chi: f64,
    psi: f64,
) -> CircularTransferMatrix {
    let half_plus_sin = 0.5 + 0.5 * (2.0 * chi).sin();
    let half_minus_sin = 0.5 - 0.5 * (2.0 * chi).sin();
    let cross_upper = Complex64::new(
        0.5 * (2.0 * psi).sin() * (2.0 * chi).cos(),
        -0.5 * (2.0 * psi).cos() * (2.0 * chi).cos(),
    );
    let cross_lower = cross_upper.conj();

    let count = half_step_a.len();
    let mut matrix = CircularTransferMatrix {
        h11: Vec::with_capacity(count),
        h12: Vec::with_capacity(count),
        h21: Vec::with_capacity(count),
        h22: Vec::with_capacity(count),
    };

    for (&ha, &hb) in half_step_a.iter().zip(half_step_b) {
        let difference = ha - hb;
        matrix.h11.push(ha * half_plus_sin + hb * half_minus_sin);
        matrix.h12.push(cross_upper * difference);
        matrix.h21.push(cross_lower * difference);
        matrix.h22.push(ha * half_minus_sin + hb * half_plus_sin);
    }

    matrix
}
