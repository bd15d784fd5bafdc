//! Multitaper power spectral density estimation.
//!
//! Averages the eigenspectra of DPSS-tapered copies of the signal, the
//! Thomson estimator with uniform weights. Optionally produces a delete-one
//! jackknife 95% confidence band computed in log space.
//!
//! Scaling convention: tapers have unit energy and each eigenspectrum is
//! `delta * |FFT(taper * x)|^2`, one-sided (doubled except at DC/Nyquist).
//! The integral of the PSD over frequency then approximates the signal
//! variance. Anything consuming absolute amplitudes must keep this
//! convention in mind (see `core::spectrum`).

use thiserror::Error;

use super::dpss::{dpss_tapers, DpssError};
use super::fft::FftProcessor;

/// Minimum segment length the estimator accepts.
const MIN_SAMPLES: usize = 16;

#[derive(Debug, Clone, Error)]
pub enum SpectrumError {
    #[error("segment of {0} samples is too short, need at least {1}")]
    SegmentTooShort(usize, usize),

    #[error("sample interval must be positive, got {0}")]
    InvalidSampleInterval(f64),

    #[error(transparent)]
    Taper(#[from] DpssError),
}

/// Jackknife confidence band, one entry per frequency bin.
#[derive(Debug, Clone)]
pub struct ConfidenceBand {
    pub lower: Vec<f64>,
    pub upper: Vec<f64>,
}

/// Multitaper PSD estimate over one-sided frequencies.
#[derive(Debug, Clone)]
pub struct MultitaperSpectrum {
    /// Frequencies in Hz, strictly increasing, starting at DC.
    pub frequencies: Vec<f64>,
    /// Power spectral density per frequency bin.
    pub power: Vec<f64>,
    /// 95% jackknife band, present when requested.
    pub confidence: Option<ConfidenceBand>,
}

/// Multitaper spectral estimate of `data` sampled at interval `delta`.
///
/// `time_bandwidth` is the NW product; the taper count follows the usual
/// 2*NW - 1 rule (NW = 2 gives 3 tapers). With `jackknife` set, a delete-one
/// confidence band is attached.
pub fn mtspec(
    data: &[f64],
    delta: f64,
    time_bandwidth: f64,
    jackknife: bool,
) -> Result<MultitaperSpectrum, SpectrumError> {
    let n = data.len();
    if n < MIN_SAMPLES {
        return Err(SpectrumError::SegmentTooShort(n, MIN_SAMPLES));
    }
    if !(delta > 0.0) {
        return Err(SpectrumError::InvalidSampleInterval(delta));
    }

    let num_tapers = ((2.0 * time_bandwidth).round() as usize).saturating_sub(1).max(2);
    let tapers = dpss_tapers(n, time_bandwidth, num_tapers)?;

    let nfft = n.next_power_of_two();
    let processor = FftProcessor::new(nfft);
    let num_bins = nfft / 2 + 1;

    let mean = data.iter().sum::<f64>() / n as f64;

    // Per-taper eigenspectra, PSD-scaled.
    let mut eigenspectra = Vec::with_capacity(num_tapers);
    let mut tapered = vec![0.0; n];
    for taper in &tapers {
        for i in 0..n {
            tapered[i] = (data[i] - mean) * taper[i];
        }
        let mut power = processor.power(&tapered);
        for (bin, p) in power.iter_mut().enumerate() {
            let one_sided = if bin == 0 || bin == num_bins - 1 { 1.0 } else { 2.0 };
            *p *= one_sided * delta;
        }
        eigenspectra.push(power);
    }

    let power: Vec<f64> = (0..num_bins)
        .map(|bin| eigenspectra.iter().map(|s| s[bin]).sum::<f64>() / num_tapers as f64)
        .collect();

    let df = 1.0 / (nfft as f64 * delta);
    let frequencies: Vec<f64> = (0..num_bins).map(|bin| bin as f64 * df).collect();

    let confidence = if jackknife {
        Some(jackknife_band(&eigenspectra, &power))
    } else {
        None
    };

    Ok(MultitaperSpectrum {
        frequencies,
        power,
        confidence,
    })
}

/// Delete-one jackknife over the eigenspectra, in log space, with a
/// Student-t critical value for K-1 degrees of freedom.
fn jackknife_band(eigenspectra: &[Vec<f64>], power: &[f64]) -> ConfidenceBand {
    let k = eigenspectra.len();
    let num_bins = power.len();
    let t = student_t_975(k - 1);

    let mut lower = Vec::with_capacity(num_bins);
    let mut upper = Vec::with_capacity(num_bins);

    for bin in 0..num_bins {
        let total: f64 = eigenspectra.iter().map(|s| s[bin]).sum();
        let log_deleted: Vec<f64> = eigenspectra
            .iter()
            .map(|s| ((total - s[bin]) / (k - 1) as f64).max(1e-300).ln())
            .collect();
        let mean_log = log_deleted.iter().sum::<f64>() / k as f64;
        let variance = (k - 1) as f64 / k as f64
            * log_deleted.iter().map(|&x| (x - mean_log) * (x - mean_log)).sum::<f64>();
        let halfwidth = t * variance.sqrt();

        lower.push(power[bin] * (-halfwidth).exp());
        upper.push(power[bin] * halfwidth.exp());
    }

    ConfidenceBand { lower, upper }
}

/// Two-sided 95% Student-t critical value.
fn student_t_975(dof: usize) -> f64 {
    match dof {
        0 | 1 => 12.706,
        2 => 4.303,
        3 => 3.182,
        4 => 2.776,
        5 => 2.571,
        6 => 2.447,
        7 => 2.365,
        8 => 2.306,
        9 => 2.262,
        10 => 2.228,
        11..=15 => 2.131,
        16..=20 => 2.086,
        21..=30 => 2.042,
        _ => 1.960,
    }
}
