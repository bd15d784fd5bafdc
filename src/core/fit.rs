//! Nonlinear least-squares fit of the source model to an observed spectrum.
//!
//! Levenberg-Marquardt over the two free parameters (omega_0, f_c) with the
//! quality factor held fixed at the supplied value. The Jacobian is analytic,
//! so each iteration is a damped 2x2 normal-equation solve. Convergence near
//! degenerate spectra can be slow, hence the generous evaluation budget.

use std::f64::consts::PI;

use log::debug;
use thiserror::Error;

/// Function-evaluation budget for the optimizer.
const MAX_EVALUATIONS: usize = 100_000;
/// Relative step size below which the fit is considered converged.
const STEP_TOLERANCE: f64 = 1e-10;
/// Relative cost-reduction below which the fit is considered converged.
const COST_TOLERANCE: f64 = 1e-14;

/// Errors raised by [`fit_spectrum`].
#[derive(Debug, Clone, Error)]
pub enum FitError {
    #[error("fit did not converge within {0} function evaluations")]
    DidNotConverge(usize),

    #[error("singular Jacobian, parameter covariance is undefined")]
    SingularJacobian,

    #[error("need at least 3 spectral samples, got {0}")]
    TooFewSamples(usize),

    #[error("spectrum and frequency arrays differ in length ({0} vs {1})")]
    LengthMismatch(usize, usize),

    #[error("traveltime must be positive, got {0}")]
    InvalidTraveltime(f64),
}

/// Best-fit source spectrum parameters with their variance estimates.
///
/// The quality factor is carried through unchanged; it is not a free
/// parameter and therefore has no variance estimate.
#[derive(Debug, Clone, Copy)]
pub struct FitResult {
    /// Low-frequency plateau in m*s.
    pub omega_0: f64,
    /// Corner frequency in Hz.
    pub corner_frequency: f64,
    /// The fixed quality factor the fit was run with.
    pub quality_factor: f64,
    /// Variance of the plateau estimate.
    pub omega_0_var: f64,
    /// Variance of the corner frequency estimate.
    pub corner_frequency_var: f64,
}

/// Model values and Jacobian columns at the current parameters.
///
/// Residuals are model minus observation; attenuation terms `exp(-pi f t/Q)`
/// depend only on the fixed inputs and are precomputed by the caller.
fn evaluate(
    frequencies: &[f64],
    attenuation: &[f64],
    omega_0: f64,
    f_c: f64,
    model: &mut [f64],
    j_omega: &mut [f64],
    j_fc: &mut [f64],
) {
    for (i, (&f, &att)) in frequencies.iter().zip(attenuation).enumerate() {
        let ratio4 = (f / f_c).powi(4);
        let denom = 1.0 + ratio4;
        let inv_sqrt = 1.0 / denom.sqrt();
        model[i] = omega_0 * att * inv_sqrt;
        j_omega[i] = att * inv_sqrt;
        j_fc[i] = 2.0 * omega_0 * att * ratio4 / (f_c * denom * denom.sqrt());
    }
}

fn sum_of_squares(model: &[f64], observed: &[f64]) -> f64 {
    model
        .iter()
        .zip(observed)
        .map(|(&m, &y)| (m - y) * (m - y))
        .sum()
}

/// Fit (omega_0, f_c) of the source model to an observed amplitude spectrum.
///
/// `spectrum` and `frequencies` must be the same length; `quality_factor` is
/// held fixed. Seeded from the supplied initial guesses — no internal
/// heuristics. On failure the caller keeps its previous parameters; nothing
/// is partially updated.
pub fn fit_spectrum(
    spectrum: &[f64],
    frequencies: &[f64],
    traveltime: f64,
    initial_omega_0: f64,
    initial_f_c: f64,
    quality_factor: f64,
) -> Result<FitResult, FitError> {
    let n = spectrum.len();
    if n != frequencies.len() {
        return Err(FitError::LengthMismatch(n, frequencies.len()));
    }
    if n < 3 {
        return Err(FitError::TooFewSamples(n));
    }
    if !(traveltime > 0.0) {
        return Err(FitError::InvalidTraveltime(traveltime));
    }

    let attenuation: Vec<f64> = frequencies
        .iter()
        .map(|&f| (-PI * f * traveltime / quality_factor).exp())
        .collect();

    let mut omega_0 = initial_omega_0;
    let mut f_c = initial_f_c;

    let mut model = vec![0.0; n];
    let mut j_omega = vec![0.0; n];
    let mut j_fc = vec![0.0; n];

    evaluate(frequencies, &attenuation, omega_0, f_c, &mut model, &mut j_omega, &mut j_fc);
    let mut cost = sum_of_squares(&model, spectrum);
    let mut evaluations = 1;

    // Marquardt damping, scaled by the normal-matrix diagonal.
    let mut lambda = 1e-3;
    let mut converged = false;

    while evaluations < MAX_EVALUATIONS {
        // Normal equations: (J^T J + lambda * diag(J^T J)) delta = -J^T r.
        let mut jtj = [0.0f64; 3]; // [00, 01, 11]
        let mut jtr = [0.0f64; 2];
        for i in 0..n {
            let r = model[i] - spectrum[i];
            jtj[0] += j_omega[i] * j_omega[i];
            jtj[1] += j_omega[i] * j_fc[i];
            jtj[2] += j_fc[i] * j_fc[i];
            jtr[0] += j_omega[i] * r;
            jtr[1] += j_fc[i] * r;
        }

        let a00 = jtj[0] * (1.0 + lambda);
        let a11 = jtj[2] * (1.0 + lambda);
        let a01 = jtj[1];
        let det = a00 * a11 - a01 * a01;
        if !det.is_finite() || det.abs() < f64::MIN_POSITIVE {
            return Err(FitError::SingularJacobian);
        }
        let delta_omega = (-jtr[0] * a11 + jtr[1] * a01) / det;
        let delta_fc = (-jtr[1] * a00 + jtr[0] * a01) / det;

        let trial_omega = omega_0 + delta_omega;
        let trial_fc = f_c + delta_fc;

        // A step that leaves the valid domain counts as a failed step.
        let mut trial_cost = f64::INFINITY;
        if trial_fc > 0.0 && trial_omega.is_finite() && trial_fc.is_finite() {
            evaluate(
                frequencies,
                &attenuation,
                trial_omega,
                trial_fc,
                &mut model,
                &mut j_omega,
                &mut j_fc,
            );
            trial_cost = sum_of_squares(&model, spectrum);
        }
        evaluations += 1;

        if trial_cost.is_finite() && trial_cost <= cost {
            let cost_drop = cost - trial_cost;
            let step_small = delta_omega.abs() <= STEP_TOLERANCE * omega_0.abs().max(f64::MIN_POSITIVE)
                && delta_fc.abs() <= STEP_TOLERANCE * trial_fc;
            omega_0 = trial_omega;
            f_c = trial_fc;
            cost = trial_cost;
            lambda = (lambda * 0.1).max(1e-12);
            if step_small || cost_drop <= COST_TOLERANCE * cost.max(f64::MIN_POSITIVE) {
                converged = true;
                break;
            }
        } else {
            lambda *= 10.0;
            if lambda > 1e12 {
                // Damping saturated without any acceptable step.
                break;
            }
            // Restore model/Jacobian at the accepted parameters.
            evaluate(frequencies, &attenuation, omega_0, f_c, &mut model, &mut j_omega, &mut j_fc);
            evaluations += 1;
        }
    }

    if !converged {
        return Err(FitError::DidNotConverge(evaluations));
    }
    debug!(
        "fit converged after {} evaluations: omega_0={:.4e}, f_c={:.3}, cost={:.4e}",
        evaluations, omega_0, f_c, cost
    );

    // Covariance from the undamped normal matrix at the solution.
    evaluate(frequencies, &attenuation, omega_0, f_c, &mut model, &mut j_omega, &mut j_fc);
    let mut s00 = 0.0;
    let mut s01 = 0.0;
    let mut s11 = 0.0;
    for i in 0..n {
        s00 += j_omega[i] * j_omega[i];
        s01 += j_omega[i] * j_fc[i];
        s11 += j_fc[i] * j_fc[i];
    }
    let det = s00 * s11 - s01 * s01;
    if !det.is_finite() || det <= 0.0 {
        return Err(FitError::SingularJacobian);
    }
    let residual_variance = sum_of_squares(&model, spectrum) / (n - 2) as f64;
    let omega_0_var = residual_variance * s11 / det;
    let corner_frequency_var = residual_variance * s00 / det;

    Ok(FitResult {
        omega_0,
        corner_frequency: f_c,
        quality_factor,
        omega_0_var,
        corner_frequency_var,
    })
}
