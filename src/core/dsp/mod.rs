//! Digital signal processing: DPSS tapers, FFT plumbing and the multitaper
//! spectral estimator.

pub mod dpss;
pub mod fft;
pub mod multitaper;

pub use dpss::{dpss_tapers, DpssError};
pub use fft::FftProcessor;
pub use multitaper::{mtspec, ConfidenceBand, MultitaperSpectrum, SpectrumError};
