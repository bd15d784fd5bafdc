//! Theoretical source displacement spectrum.
//!
//! Boatwright/Abercrombie-style omega-square model with frequency-independent
//! attenuation (constant Q):
//!
//! ```text
//! A(f) = omega_0 * exp(-pi * f * t / Q) / sqrt(1 + (f / f_c)^4)
//! ```
//!
//! For f -> 0 the amplitude approaches the plateau `omega_0`; beyond the
//! corner frequency the spectrum rolls off as f^-2; Q attenuates
//! exponentially with f times the travel time.

use std::f64::consts::PI;

/// Spectral amplitude of the source model at a single frequency.
///
/// `omega_0` is the low-frequency plateau in m*s, `corner_frequency` in Hz,
/// `quality_factor` dimensionless, `traveltime` the hypocentral travel time
/// in seconds (must be positive for the attenuation term to make sense).
pub fn source_spectrum(
    frequency: f64,
    omega_0: f64,
    corner_frequency: f64,
    quality_factor: f64,
    traveltime: f64,
) -> f64 {
    let num = omega_0 * (-PI * frequency * traveltime / quality_factor).exp();
    let denom = (1.0 + (frequency / corner_frequency).powi(4)).sqrt();
    num / denom
}

/// Evaluate the source model over a whole frequency array.
pub fn source_spectrum_array(
    frequencies: &[f64],
    omega_0: f64,
    corner_frequency: f64,
    quality_factor: f64,
    traveltime: f64,
) -> Vec<f64> {
    frequencies
        .iter()
        .map(|&f| source_spectrum(f, omega_0, corner_frequency, quality_factor, traveltime))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plateau_at_low_frequency() {
        let omega_0 = 3.2e-6;
        let a = source_spectrum(1e-9, omega_0, 8.0, 150.0, 2.0);
        assert!((a - omega_0).abs() / omega_0 < 1e-6);
    }

    #[test]
    fn test_strictly_decreasing_past_corner() {
        let fc = 6.0;
        let mut prev = source_spectrum(fc, 1e-5, fc, 200.0, 1.5);
        let mut f = fc + 0.5;
        while f < 100.0 {
            let a = source_spectrum(f, 1e-5, fc, 200.0, 1.5);
            assert!(a < prev, "not decreasing at {} Hz", f);
            prev = a;
            f += 0.5;
        }
    }

    #[test]
    fn test_high_frequency_rolloff_is_f_squared() {
        // Without attenuation (huge Q) the decay beyond f_c goes as f^-2.
        let fc = 5.0;
        let a1 = source_spectrum(50.0, 1.0, fc, 1e12, 1.0);
        let a2 = source_spectrum(100.0, 1.0, fc, 1e12, 1.0);
        assert!((a1 / a2 - 4.0).abs() < 0.05);
    }

    #[test]
    fn test_attenuation_lowers_amplitude() {
        let weak = source_spectrum(20.0, 1e-5, 8.0, 50.0, 2.0);
        let strong = source_spectrum(20.0, 1e-5, 8.0, 500.0, 2.0);
        assert!(weak < strong);
    }

    #[test]
    fn test_array_matches_scalar() {
        let freqs = [1.0, 5.0, 25.0];
        let arr = source_spectrum_array(&freqs, 2e-6, 8.0, 150.0, 2.0);
        for (i, &f) in freqs.iter().enumerate() {
            assert_eq!(arr[i], source_spectrum(f, 2e-6, 8.0, 150.0, 2.0));
        }
    }
}
