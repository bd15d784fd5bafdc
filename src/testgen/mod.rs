//! Synthetic waveform generation for tests and demos.
//!
//! Two generators: a trace whose amplitude spectrum follows the theoretical
//! source model (for end-to-end pipeline tests with a known answer), and the
//! classic Brune (1970) time-domain source pulse as implemented in PITSA.

use chrono::{TimeZone, Utc};
use std::f64::consts::PI;

use crate::core::model::source_spectrum;
use crate::event::WaveformSegment;

/// Time series whose multitaper amplitude spectrum approximates
/// `source_spectrum(f, omega_0, f_c, q, traveltime)`.
///
/// Synthesized as a sum of cosines on the FFT bin grid of `n` samples (use a
/// power of two to keep the bins aligned with the estimator's), with
/// deterministic pseudo-random phases. Per bin of width df, a cosine of
/// amplitude `A*sqrt(2*df)` puts a PSD of `A^2` into that bin, so the
/// amplitude spectrum (sqrt of PSD) lands on the model curve.
pub fn model_displacement_trace(
    omega_0: f64,
    corner_frequency: f64,
    quality_factor: f64,
    traveltime: f64,
    delta: f64,
    n: usize,
) -> Vec<f64> {
    let nfft = n.next_power_of_two();
    let df = 1.0 / (nfft as f64 * delta);

    let mut state: u64 = 0x5851f42d4c957f2d;
    let mut phases = Vec::with_capacity(nfft / 2);
    for _ in 0..nfft / 2 {
        state = state.wrapping_mul(6364136223846793005).wrapping_add(1442695040888963407);
        phases.push((state >> 11) as f64 / (1u64 << 53) as f64 * 2.0 * PI);
    }

    (0..n)
        .map(|i| {
            let t = i as f64 * delta;
            let mut sample = 0.0;
            for bin in 1..nfft / 2 {
                let f = bin as f64 * df;
                let amplitude = source_spectrum(f, omega_0, corner_frequency, quality_factor, traveltime)
                    * (2.0 * df).sqrt();
                sample += amplitude * (2.0 * PI * f * t + phases[bin]).cos();
            }
            sample
        })
        .collect()
}

/// Theoretical Brune (1970) source pulse, PITSA-style.
///
/// `stress_drop_bar` in bar, `shear_modulus` in Pa, `v_s_km` in km/s,
/// `depth_km` and `distance_km` in km; all converted to SI internally.
/// Returns a synthetic single-channel trace at the given sampling rate.
#[allow(clippy::too_many_arguments)]
pub fn brune_source(
    duration_s: f64,
    sampling_rate: f64,
    radiation_pattern: f64,
    stress_drop_bar: f64,
    shear_modulus: f64,
    v_s_km: f64,
    depth_km: f64,
    distance_km: f64,
) -> WaveformSegment {
    let stress_drop = stress_drop_bar * 1.0e5; // bar -> Pa
    let v_s = v_s_km * 1000.0;
    let distance = distance_km * 1000.0;
    let depth = depth_km * 1000.0;

    let n = (duration_s * sampling_rate) as usize;
    let delta = 1.0 / sampling_rate;
    let samples = (0..n)
        .map(|i| {
            let t = i as f64 * delta;
            2.0 * radiation_pattern * stress_drop / shear_modulus * v_s * distance / depth
                * t
                * (-2.34 * (v_s / distance) * t).exp()
        })
        .collect();

    WaveformSegment {
        channel: "SYN.NTHET.IC.ESZ".to_string(),
        delta,
        start_time: Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap(),
        samples,
    }
}

/// Brune pulse with the PITSA reference parameters.
pub fn brune_source_default(duration_s: f64) -> WaveformSegment {
    brune_source(duration_s, 200.0, 0.625, 50.0, 3.0e10, 3.5, 20.0, 1.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::spectrum::amplitude_spectrum;

    #[test]
    fn test_model_trace_spectrum_matches_model() {
        let delta = 0.005;
        let trace = model_displacement_trace(4e-6, 7.0, 120.0, 2.5, delta, 2048);
        let observed = amplitude_spectrum(&trace, delta, 2.0).unwrap();

        // Compare at a handful of bins away from DC and Nyquist.
        for &target in &[2.0, 5.0, 10.0, 30.0] {
            let bin = observed
                .frequencies
                .iter()
                .position(|&f| f >= target)
                .unwrap();
            let f = observed.frequencies[bin];
            let expected = source_spectrum(f, 4e-6, 7.0, 120.0, 2.5);
            let ratio = observed.amplitudes[bin] / expected;
            assert!(
                ratio > 0.5 && ratio < 2.0,
                "at {} Hz: observed {:e}, expected {:e}",
                f,
                observed.amplitudes[bin],
                expected
            );
        }
    }

    #[test]
    fn test_brune_pulse_shape() {
        let trace = brune_source_default(5.0);
        assert_eq!(trace.samples.len(), 1000);
        assert_eq!(trace.samples[0], 0.0);
        // Rises to a single maximum, then decays towards zero.
        let peak = trace
            .samples
            .iter()
            .enumerate()
            .max_by(|a, b| a.1.partial_cmp(b.1).unwrap())
            .unwrap()
            .0;
        assert!(peak > 0 && peak < trace.samples.len() / 2);
        assert!(trace.samples.last().unwrap().abs() < trace.samples[peak] * 1e-3);
    }
}
