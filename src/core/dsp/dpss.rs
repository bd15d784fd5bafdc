//! Discrete prolate spheroidal (Slepian) sequences.
//!
//! The tapers are eigenvectors of the symmetric tridiagonal matrix of the
//! Slepian problem (Percival & Walden, ch. 8): diagonal
//! `((N-1-2i)/2)^2 * cos(2*pi*W)`, off-diagonal `i*(N-i)/2`. The largest
//! eigenvalues correspond to the best-concentrated tapers. Eigenvalues come
//! from Sturm-sequence bisection, eigenvectors from inverse iteration with a
//! pivoted tridiagonal solve.

use thiserror::Error;

#[derive(Debug, Clone, Error)]
pub enum DpssError {
    #[error("taper length {0} too short for {1} tapers")]
    LengthTooShort(usize, usize),

    #[error("time-bandwidth product must be at least 1, got {0}")]
    InvalidTimeBandwidth(f64),

    #[error("requested zero tapers")]
    ZeroTapers,
}

/// Compute the first `num_tapers` DPSS tapers of length `n` for the given
/// time-bandwidth product. Each returned taper has unit energy.
pub fn dpss_tapers(
    n: usize,
    time_bandwidth: f64,
    num_tapers: usize,
) -> Result<Vec<Vec<f64>>, DpssError> {
    if num_tapers == 0 {
        return Err(DpssError::ZeroTapers);
    }
    if !(time_bandwidth >= 1.0) {
        return Err(DpssError::InvalidTimeBandwidth(time_bandwidth));
    }
    if n < 2 * num_tapers + 2 {
        return Err(DpssError::LengthTooShort(n, num_tapers));
    }

    let w = time_bandwidth / n as f64;
    let cos_2pw = (2.0 * std::f64::consts::PI * w).cos();

    // Tridiagonal Slepian matrix.
    let diag: Vec<f64> = (0..n)
        .map(|i| {
            let half = (n as f64 - 1.0 - 2.0 * i as f64) / 2.0;
            half * half * cos_2pw
        })
        .collect();
    // offdiag[i] couples rows i and i+1.
    let offdiag: Vec<f64> = (1..n).map(|i| (i as f64) * (n - i) as f64 / 2.0).collect();

    // Gershgorin interval containing all eigenvalues.
    let mut lower = f64::INFINITY;
    let mut upper = f64::NEG_INFINITY;
    for i in 0..n {
        let radius = if i == 0 {
            offdiag[0].abs()
        } else if i == n - 1 {
            offdiag[n - 2].abs()
        } else {
            offdiag[i - 1].abs() + offdiag[i].abs()
        };
        lower = lower.min(diag[i] - radius);
        upper = upper.max(diag[i] + radius);
    }

    let mut tapers = Vec::with_capacity(num_tapers);
    for k in 0..num_tapers {
        // k-th taper pairs with the (k+1)-th largest eigenvalue.
        let eigenvalue = kth_largest_eigenvalue(&diag, &offdiag, lower, upper, k);
        let mut v = inverse_iteration(&diag, &offdiag, eigenvalue, &tapers);
        fix_polarity(&mut v, k);
        tapers.push(v);
    }
    Ok(tapers)
}

/// Number of eigenvalues of the tridiagonal matrix strictly below `x`,
/// via the Sturm sequence of leading-minor pivots.
fn eigenvalues_below(diag: &[f64], offdiag: &[f64], x: f64) -> usize {
    let mut count = 0;
    let mut d = diag[0] - x;
    if d < 0.0 {
        count += 1;
    }
    for i in 1..diag.len() {
        if d == 0.0 {
            d = 1e-300;
        }
        d = diag[i] - x - offdiag[i - 1] * offdiag[i - 1] / d;
        if d < 0.0 {
            count += 1;
        }
    }
    count
}

fn kth_largest_eigenvalue(
    diag: &[f64],
    offdiag: &[f64],
    mut lower: f64,
    mut upper: f64,
    k: usize,
) -> f64 {
    let n = diag.len();
    // Want the eigenvalue with exactly n-1-k eigenvalues below it.
    let target = n - 1 - k;
    for _ in 0..120 {
        let mid = 0.5 * (lower + upper);
        if mid == lower || mid == upper {
            break;
        }
        if eigenvalues_below(diag, offdiag, mid) > target {
            upper = mid;
        } else {
            lower = mid;
        }
    }
    0.5 * (lower + upper)
}

/// One eigenvector by inverse iteration, Gram-Schmidt-orthogonalized against
/// the tapers already found (the top DPSS eigenvalues are well separated, so
/// two refinement passes suffice).
fn inverse_iteration(
    diag: &[f64],
    offdiag: &[f64],
    eigenvalue: f64,
    previous: &[Vec<f64>],
) -> Vec<f64> {
    let n = diag.len();
    // Deterministic not-too-structured start vector.
    let mut state: u64 = 0x9e3779b97f4a7c15;
    let mut v: Vec<f64> = (0..n)
        .map(|_| {
            state = state.wrapping_mul(6364136223846793005).wrapping_add(1442695040888963407);
            (state >> 11) as f64 / (1u64 << 53) as f64 - 0.5
        })
        .collect();
    normalize(&mut v);

    for _ in 0..3 {
        let mut next = solve_shifted(diag, offdiag, eigenvalue, &v);
        for p in previous {
            let dot: f64 = next.iter().zip(p).map(|(a, b)| a * b).sum();
            for (x, y) in next.iter_mut().zip(p) {
                *x -= dot * y;
            }
        }
        normalize(&mut next);
        v = next;
    }
    v
}

fn normalize(v: &mut [f64]) {
    let norm = v.iter().map(|x| x * x).sum::<f64>().sqrt();
    if norm > 0.0 {
        for x in v.iter_mut() {
            *x /= norm;
        }
    }
}

/// Solve (T - eigenvalue*I) x = rhs for a symmetric tridiagonal T using
/// Gaussian elimination with partial pivoting (fill-in on a second
/// superdiagonal). Near-singular pivots are nudged, which is exactly what
/// inverse iteration wants.
fn solve_shifted(diag: &[f64], offdiag: &[f64], eigenvalue: f64, rhs: &[f64]) -> Vec<f64> {
    let n = diag.len();
    let mut d: Vec<f64> = diag.iter().map(|&x| x - eigenvalue).collect();
    let mut du: Vec<f64> = offdiag.to_vec(); // superdiagonal
    let mut dl: Vec<f64> = offdiag.to_vec(); // subdiagonal
    let mut du2 = vec![0.0; n.saturating_sub(2)];
    let mut swapped = vec![false; n.saturating_sub(1)];
    let mut b = rhs.to_vec();

    for i in 0..n - 1 {
        if d[i].abs() >= dl[i].abs() {
            // No row exchange.
            if d[i] == 0.0 {
                d[i] = 1e-300;
            }
            let factor = dl[i] / d[i];
            d[i + 1] -= factor * du[i];
            dl[i] = factor;
        } else {
            // Exchange rows i and i+1.
            let factor = d[i] / dl[i];
            d[i] = dl[i];
            let temp = d[i + 1];
            d[i + 1] = du[i] - factor * temp;
            if i < n - 2 {
                du2[i] = du[i + 1];
                du[i + 1] = -factor * du2[i];
            }
            du[i] = temp;
            dl[i] = factor;
            swapped[i] = true;
        }
    }
    if d[n - 1] == 0.0 {
        d[n - 1] = 1e-300;
    }

    // Forward substitution with the recorded exchanges.
    for i in 0..n - 1 {
        if swapped[i] {
            b.swap(i, i + 1);
        }
        b[i + 1] -= dl[i] * b[i];
    }

    // Back substitution over the three stored diagonals.
    let mut x = vec![0.0; n];
    x[n - 1] = b[n - 1] / d[n - 1];
    if n >= 2 {
        x[n - 2] = (b[n - 2] - du[n - 2] * x[n - 1]) / d[n - 2];
    }
    for i in (0..n.saturating_sub(2)).rev() {
        x[i] = (b[i] - du[i] * x[i + 1] - du2[i] * x[i + 2]) / d[i];
    }
    x
}

/// Conventional sign: even-order tapers have positive mean, odd-order tapers
/// start with a positive lobe. Irrelevant for spectra, kept for
/// reproducibility.
fn fix_polarity(v: &mut [f64], order: usize) {
    let flip = if order % 2 == 0 {
        v.iter().sum::<f64>() < 0.0
    } else {
        let n = v.len();
        let half: f64 = v[..n / 2].iter().sum();
        half < 0.0
    };
    if flip {
        for x in v.iter_mut() {
            *x = -*x;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tapers_are_orthonormal() {
        let tapers = dpss_tapers(256, 2.0, 3).unwrap();
        assert_eq!(tapers.len(), 3);
        for (i, a) in tapers.iter().enumerate() {
            for (j, b) in tapers.iter().enumerate() {
                let dot: f64 = a.iter().zip(b).map(|(x, y)| x * y).sum();
                let expected = if i == j { 1.0 } else { 0.0 };
                assert!(
                    (dot - expected).abs() < 1e-8,
                    "<v{}, v{}> = {}",
                    i,
                    j,
                    dot
                );
            }
        }
    }

    #[test]
    fn test_first_taper_is_bell_shaped() {
        // Order zero has no sign change and peaks near the middle.
        let tapers = dpss_tapers(128, 2.0, 1).unwrap();
        let v = &tapers[0];
        assert!(v.iter().all(|&x| x > 0.0), "zeroth taper changes sign");
        let peak = v
            .iter()
            .enumerate()
            .max_by(|a, b| a.1.partial_cmp(b.1).unwrap())
            .unwrap()
            .0;
        assert!((peak as i64 - 64).unsigned_abs() <= 2, "peak at {}", peak);
    }

    #[test]
    fn test_higher_order_tapers_have_sign_changes() {
        let tapers = dpss_tapers(200, 2.0, 3).unwrap();
        for (k, v) in tapers.iter().enumerate().skip(1) {
            let changes = v.windows(2).filter(|w| w[0].signum() != w[1].signum()).count();
            assert!(changes >= k, "taper {} has only {} sign changes", k, changes);
        }
    }

    #[test]
    fn test_invalid_inputs_rejected() {
        assert!(matches!(dpss_tapers(4, 2.0, 3), Err(DpssError::LengthTooShort(4, 3))));
        assert!(matches!(dpss_tapers(64, 0.5, 2), Err(DpssError::InvalidTimeBandwidth(_))));
        assert!(matches!(dpss_tapers(64, 2.0, 0), Err(DpssError::ZeroTapers)));
    }
}
