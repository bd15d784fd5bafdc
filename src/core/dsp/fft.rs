//! FFT helper for the spectral estimator.

use num_complex::Complex;
use rustfft::{Fft, FftPlanner};
use std::sync::Arc;

/// One-sided power computation at a fixed transform length.
pub struct FftProcessor {
    fft: Arc<dyn Fft<f64>>,
    nfft: usize,
}

impl FftProcessor {
    pub fn new(nfft: usize) -> Self {
        let mut planner = FftPlanner::new();
        Self {
            fft: planner.plan_fft_forward(nfft),
            nfft,
        }
    }

    pub fn nfft(&self) -> usize {
        self.nfft
    }

    /// One-sided |X(f)|^2 of a real signal, zero-padded to the transform
    /// length. Returns nfft/2 + 1 bins (DC through Nyquist), unscaled.
    pub fn power(&self, samples: &[f64]) -> Vec<f64> {
        let mut buffer: Vec<Complex<f64>> = samples
            .iter()
            .take(self.nfft)
            .map(|&s| Complex::new(s, 0.0))
            .collect();
        buffer.resize(self.nfft, Complex::new(0.0, 0.0));

        self.fft.process(&mut buffer);

        buffer[..self.nfft / 2 + 1]
            .iter()
            .map(|c| c.re * c.re + c.im * c.im)
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f64::consts::PI;

    #[test]
    fn test_power_of_pure_tone_peaks_at_bin() {
        let nfft = 256;
        let bin = 16;
        let signal: Vec<f64> = (0..nfft)
            .map(|i| (2.0 * PI * bin as f64 * i as f64 / nfft as f64).cos())
            .collect();
        let power = FftProcessor::new(nfft).power(&signal);
        let peak = power
            .iter()
            .enumerate()
            .max_by(|a, b| a.1.partial_cmp(b.1).unwrap())
            .unwrap()
            .0;
        assert_eq!(peak, bin);
        // cos at an exact bin: |X| = N/2, power = N^2/4.
        let expected = (nfft as f64 / 2.0).powi(2);
        assert!((power[bin] - expected).abs() / expected < 1e-9);
    }

    #[test]
    fn test_zero_padding() {
        let power = FftProcessor::new(64).power(&[1.0; 16]);
        assert_eq!(power.len(), 33);
        // DC bin carries the full sum of the 16 ones.
        assert!((power[0] - 256.0).abs() < 1e-9);
    }
}
