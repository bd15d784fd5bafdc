//! Core estimation pipeline: spectral estimation, model fitting and
//! source-parameter aggregation.

pub mod aggregate;
pub mod dsp;
pub mod fit;
pub mod geo;
pub mod model;
pub mod pipeline;
pub mod source_params;
pub mod spectrum;

pub use aggregate::{CompositeResult, MagnitudeContext, PickResult};
pub use fit::{fit_spectrum, FitError, FitResult};
pub use source_params::Phase;
pub use spectrum::{amplitude_spectrum, FitSeed, ObservedSpectrum};
