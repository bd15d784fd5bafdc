//! Observed amplitude spectra and fit seeding.
//!
//! Bridges the multitaper PSD estimate to what the fitter consumes: the
//! square root of the power spectrum and of each jackknife confidence bound,
//! elementwise. With ground displacement in meters going in, the resulting
//! amplitudes carry m*s, the unit of the plateau omega_0 that the moment
//! formula expects. Keep this call site and `core::source_params` on the
//! same scaling convention.

use serde::Serialize;

use super::dsp::{mtspec, SpectrumError};

/// Default corner-frequency seed in Hz; a reasonable starting point for
/// local events.
pub const DEFAULT_CORNER_FREQUENCY: f64 = 10.0;
/// Default quality factor before any operator adjustment.
pub const DEFAULT_QUALITY_FACTOR: f64 = 100.0;

/// Amplitude spectrum of one windowed waveform segment, with its 95%
/// jackknife confidence band.
///
/// Frequencies are strictly increasing and aligned 1:1 with the amplitude
/// and band arrays; amplitudes are non-negative.
#[derive(Debug, Clone, Serialize)]
pub struct ObservedSpectrum {
    pub frequencies: Vec<f64>,
    pub amplitudes: Vec<f64>,
    pub lower_confidence: Vec<f64>,
    pub upper_confidence: Vec<f64>,
}

impl ObservedSpectrum {
    pub fn len(&self) -> usize {
        self.frequencies.len()
    }

    pub fn is_empty(&self) -> bool {
        self.frequencies.is_empty()
    }
}

/// Multitaper amplitude spectrum of a windowed segment.
///
/// `samples` is the user-selected [t1, t2] sub-range of one component trace,
/// `delta` its sample interval. Jackknife statistics are always computed;
/// they feed the confidence band of the returned spectrum.
pub fn amplitude_spectrum(
    samples: &[f64],
    delta: f64,
    time_bandwidth: f64,
) -> Result<ObservedSpectrum, SpectrumError> {
    let spectrum = mtspec(samples, delta, time_bandwidth, true)?;
    let band = spectrum
        .confidence
        .expect("jackknife statistics requested above");

    Ok(ObservedSpectrum {
        frequencies: spectrum.frequencies,
        amplitudes: spectrum.power.iter().map(|&p| p.sqrt()).collect(),
        lower_confidence: band.lower.iter().map(|&p| p.sqrt()).collect(),
        upper_confidence: band.upper.iter().map(|&p| p.sqrt()).collect(),
    })
}

/// Initial guess handed to the fitter, operator-adjustable.
///
/// The quality factor is not a free fit parameter; the operator moves it in
/// discrete 10% steps instead.
#[derive(Debug, Clone, Copy)]
pub struct FitSeed {
    pub omega_0: f64,
    pub corner_frequency: f64,
    pub quality_factor: f64,
}

impl FitSeed {
    /// The conventional seed: f_c = 10 Hz, omega_0 = mean observed amplitude
    /// below that corner, Q = 100.
    pub fn from_spectrum(spectrum: &ObservedSpectrum) -> Self {
        Self::from_spectrum_with_corner(spectrum, DEFAULT_CORNER_FREQUENCY)
    }

    /// Seed with an explicit corner-frequency guess.
    pub fn from_spectrum_with_corner(spectrum: &ObservedSpectrum, corner_frequency: f64) -> Self {
        // Index of the frequency bin closest to the corner guess.
        let corner_index = spectrum
            .frequencies
            .iter()
            .enumerate()
            .min_by(|a, b| {
                (a.1 - corner_frequency)
                    .abs()
                    .partial_cmp(&(b.1 - corner_frequency).abs())
                    .unwrap()
            })
            .map(|(i, _)| i)
            .unwrap_or(0);

        let below = &spectrum.amplitudes[..corner_index.max(1)];
        let omega_0 = below.iter().sum::<f64>() / below.len() as f64;

        Self {
            omega_0,
            corner_frequency,
            quality_factor: DEFAULT_QUALITY_FACTOR,
        }
    }

    /// Raise Q by one 10% operator step.
    pub fn step_quality_factor_up(&mut self) {
        self.quality_factor += self.quality_factor * 0.1;
    }

    /// Lower Q by one 10% operator step.
    pub fn step_quality_factor_down(&mut self) {
        self.quality_factor -= self.quality_factor * 0.1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::model::source_spectrum;

    fn synthetic_observed() -> ObservedSpectrum {
        // A model-shaped amplitude spectrum on a regular grid.
        let frequencies: Vec<f64> = (0..200).map(|i| i as f64 * 0.5).collect();
        let amplitudes: Vec<f64> = frequencies
            .iter()
            .map(|&f| source_spectrum(f, 4e-6, 8.0, 150.0, 2.0))
            .collect();
        let lower = amplitudes.iter().map(|&a| a * 0.8).collect();
        let upper = amplitudes.iter().map(|&a| a * 1.2).collect();
        ObservedSpectrum {
            frequencies,
            amplitudes,
            lower_confidence: lower,
            upper_confidence: upper,
        }
    }

    #[test]
    fn test_amplitude_is_sqrt_of_power() {
        let samples: Vec<f64> = (0..256).map(|i| (i as f64 * 0.3).sin()).collect();
        let observed = amplitude_spectrum(&samples, 0.01, 2.0).unwrap();
        let raw = mtspec(&samples, 0.01, 2.0, true).unwrap();

        assert_eq!(observed.len(), raw.power.len());
        for (a, p) in observed.amplitudes.iter().zip(&raw.power) {
            assert!((a - p.sqrt()).abs() < 1e-12);
        }
        assert!(observed.amplitudes.iter().all(|&a| a >= 0.0));
    }

    #[test]
    fn test_confidence_band_brackets_amplitude() {
        let samples: Vec<f64> = (0..300).map(|i| (i as f64 * 0.17).sin() * 2.0).collect();
        let observed = amplitude_spectrum(&samples, 0.005, 2.0).unwrap();
        for i in 0..observed.len() {
            assert!(observed.lower_confidence[i] <= observed.amplitudes[i] + 1e-30);
            assert!(observed.upper_confidence[i] >= observed.amplitudes[i] - 1e-30);
        }
    }

    #[test]
    fn test_seed_takes_plateau_mean() {
        let observed = synthetic_observed();
        let seed = FitSeed::from_spectrum(&observed);
        assert_eq!(seed.corner_frequency, 10.0);
        assert_eq!(seed.quality_factor, 100.0);
        // The plateau mean sits below omega_0 but well within an order of
        // magnitude for this shape.
        assert!(seed.omega_0 > 1e-6 && seed.omega_0 < 4e-6);
    }

    #[test]
    fn test_quality_factor_steps() {
        let mut seed = FitSeed::from_spectrum(&synthetic_observed());
        seed.step_quality_factor_up();
        assert!((seed.quality_factor - 110.0).abs() < 1e-9);
        seed.step_quality_factor_down();
        assert!((seed.quality_factor - 99.0).abs() < 1e-9);
    }
}
