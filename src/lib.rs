//! mwcalc - Moment magnitude estimation from waveform picks
//!
//! Fits a parametric source displacement spectrum to observed amplitude
//! spectra per station and phase, then aggregates the per-station estimates
//! into bulk source parameters: seismic moment, moment magnitude, source
//! radius, stress drop and a rough mean quality factor.
//!
//! ## Pipeline
//!
//! 1. **Multitaper spectral estimation** of a windowed waveform segment
//!    (DPSS tapers, jackknife confidence band)
//! 2. **Source model**: Boatwright/Abercrombie omega-square spectrum with
//!    plateau, corner frequency and fixed quality factor
//! 3. **Levenberg-Marquardt fit** of (omega_0, f_c) against the observed
//!    amplitude spectrum
//! 4. **Per-phase source parameters** from the fitted values, distances and
//!    rock properties
//! 5. **Aggregation** over stations into one composite result
//!
//! ## Module Structure
//!
//! - `core` - estimation algorithms and the aggregation context
//! - `event` - parsed domain data handed over by external providers
//! - `config` - physical constants and estimator settings
//! - `cli` - command-line interface
//! - `testgen` - synthetic waveform generation for tests and demos
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use mwcalc::config::{EstimatorSettings, PhysicalConstants};
//! use mwcalc::core::{pipeline, MagnitudeContext};
//!
//! let event: mwcalc::event::Event = serde_json::from_str(&bundle)?;
//! let mut context = MagnitudeContext::new(
//!     event.origin,
//!     PhysicalConstants::default(),
//!     event.stations.clone(),
//! );
//! pipeline::process_event(&event, &EstimatorSettings::default(), &mut context);
//!
//! if let Some(composite) = context.composite() {
//!     println!("Mw {:.2}", composite.moment_magnitude);
//! }
//! ```

// Core estimation pipeline
pub mod core;

// Command-line interface
pub mod cli;

// Configuration
pub mod config;

// Domain data model
pub mod event;

// Synthetic test signals
pub mod testgen;

// Re-export commonly used types at crate root for convenience
pub use config::{EstimatorSettings, PhysicalConstants};
pub use crate::core::{
    amplitude_spectrum, fit_spectrum, CompositeResult, FitError, FitResult, FitSeed,
    MagnitudeContext, ObservedSpectrum, Phase, PickResult,
};
pub use event::{Event, Origin, Pick, StationCoordinates, WaveformSegment};
