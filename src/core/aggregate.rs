//! Accepted pick results and the composite source-parameter reduction.
//!
//! [`MagnitudeContext`] is the single owner of all mutable estimation state:
//! the accepted pick results, the physical constants and the station
//! coordinates. Every mutation recomputes the composite result so it is
//! always derivable from the current state, never stale.

use std::collections::BTreeMap;

use log::warn;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::config::PhysicalConstants;
use crate::core::geo::flat_earth_distance_m;
use crate::core::source_params::{
    calculate_stress_drop, moment_from_low_freq_amplitude, moment_to_moment_magnitude,
    source_radius_from_corner_frequency, Phase,
};
use crate::event::{station_of_channel, Origin, StationCoordinates};

/// One accepted spectral measurement for a channel and phase.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PickResult {
    pub channel: String,
    pub phase: Phase,
    /// Low-frequency plateau in m*s.
    pub omega_0: f64,
    /// Corner frequency in Hz.
    pub corner_frequency: f64,
    /// Quality factor the spectrum was fit with.
    pub quality_factor: f64,
}

/// Reasons an insert is refused. A result enters the set only with every
/// scalar field finite and non-zero and a non-empty channel.
#[derive(Debug, Clone, Error)]
pub enum PickValidationError {
    #[error("channel identifier is empty")]
    EmptyChannel,

    #[error("field '{0}' must be finite and non-zero, got {1}")]
    InvalidField(&'static str, f64),
}

/// Bulk source parameters reduced over all contributing stations.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CompositeResult {
    /// Mean seismic moment in Nm.
    pub seismic_moment: f64,
    /// Hanks-Kanamori moment magnitude.
    pub moment_magnitude: f64,
    /// Mean circular source radius in m.
    pub source_radius: f64,
    /// Eshelby stress drop of the mean moment and radius, in Pa.
    pub stress_drop: f64,
    /// Mean quality factor over all contributing picks.
    pub quality_factor: f64,
    /// Number of (station, phase) groups that contributed.
    pub station_count: usize,
}

/// Owner of the pick-result set and everything needed to reduce it.
///
/// Single-threaded by design; wrap it in a mutex if it ever has to cross
/// threads, since recomputation reads the whole set and must see a
/// consistent snapshot.
#[derive(Debug, Clone)]
pub struct MagnitudeContext {
    origin: Origin,
    constants: PhysicalConstants,
    stations: BTreeMap<String, StationCoordinates>,
    results: Vec<PickResult>,
    composite: Option<CompositeResult>,
}

impl MagnitudeContext {
    pub fn new(
        origin: Origin,
        constants: PhysicalConstants,
        stations: impl IntoIterator<Item = (String, StationCoordinates)>,
    ) -> Self {
        Self {
            origin,
            constants,
            stations: stations.into_iter().collect(),
            results: Vec::new(),
            composite: None,
        }
    }

    /// Accept a pick result. Replaces in place any existing entry with the
    /// same (channel, phase) key, then recomputes the composite.
    pub fn insert(&mut self, result: PickResult) -> Result<(), PickValidationError> {
        if result.channel.is_empty() {
            return Err(PickValidationError::EmptyChannel);
        }
        for (name, value) in [
            ("omega_0", result.omega_0),
            ("corner_frequency", result.corner_frequency),
            ("quality_factor", result.quality_factor),
        ] {
            if !value.is_finite() || value == 0.0 {
                return Err(PickValidationError::InvalidField(name, value));
            }
        }

        match self
            .results
            .iter_mut()
            .find(|r| r.channel == result.channel && r.phase == result.phase)
        {
            Some(existing) => *existing = result,
            None => self.results.push(result),
        }
        self.recompute();
        Ok(())
    }

    /// Remove the result at `index`, as the operator deletes rows from the
    /// result table. Out-of-range indices are a no-op.
    pub fn remove(&mut self, index: usize) -> Option<PickResult> {
        if index >= self.results.len() {
            return None;
        }
        let removed = self.results.remove(index);
        self.recompute();
        Some(removed)
    }

    pub fn results(&self) -> &[PickResult] {
        &self.results
    }

    /// The current composite result; `None` while the set is empty.
    pub fn composite(&self) -> Option<&CompositeResult> {
        self.composite.as_ref()
    }

    pub fn constants(&self) -> &PhysicalConstants {
        &self.constants
    }

    pub fn origin(&self) -> &Origin {
        &self.origin
    }

    pub fn set_constants(&mut self, constants: PhysicalConstants) {
        self.constants = constants;
        self.recompute();
    }

    pub fn set_density(&mut self, density: f64) {
        self.constants.density = density;
        self.recompute();
    }

    pub fn set_p_wave_velocity(&mut self, velocity: f64) {
        self.constants.p_wave_velocity = velocity;
        self.recompute();
    }

    pub fn set_s_wave_velocity(&mut self, velocity: f64) {
        self.constants.s_wave_velocity = velocity;
        self.recompute();
    }

    /// Hypocentral distance in m from the origin to a station, if its
    /// coordinates are known. The station elevation (in km) stands in as the
    /// second depth coordinate of the flat-Earth frame.
    fn station_distance_m(&self, station: &str) -> Option<f64> {
        let coords = self.stations.get(station)?;
        Some(flat_earth_distance_m(
            self.origin.latitude,
            self.origin.longitude,
            self.origin.depth_km,
            coords.latitude,
            coords.longitude,
            coords.elevation_m / 1000.0,
        ))
    }

    /// Rebuild the composite from the current result set and constants.
    ///
    /// A group that cannot be evaluated (unknown station, component count
    /// out of range) is dropped with a warning; it never zero-fills the
    /// reduction and never aborts the other groups.
    fn recompute(&mut self) {
        if self.results.is_empty() {
            self.composite = None;
            return;
        }

        // Group accepted results by (station, phase), insertion order does
        // not matter for the means.
        let mut groups: BTreeMap<(String, Phase), Vec<&PickResult>> = BTreeMap::new();
        for result in &self.results {
            groups
                .entry((station_of_channel(&result.channel), result.phase))
                .or_default()
                .push(result);
        }

        let mut moments = Vec::new();
        let mut radii = Vec::new();
        let mut quality_factors = Vec::new();

        for ((station, phase), members) in &groups {
            let Some(distance_m) = self.station_distance_m(station) else {
                warn!("no coordinates for station {}, dropping its {} group", station, phase);
                continue;
            };

            let omega_0: Vec<f64> = members.iter().map(|r| r.omega_0).collect();
            let corner_frequencies: Vec<f64> = members.iter().map(|r| r.corner_frequency).collect();

            let wavespeed = match phase {
                Phase::P => self.constants.p_wave_velocity,
                Phase::S => self.constants.s_wave_velocity,
            };

            let moment = match moment_from_low_freq_amplitude(
                &omega_0,
                self.constants.density,
                wavespeed,
                distance_m,
                *phase,
            ) {
                Ok(m) => m,
                Err(err) => {
                    warn!("dropping group {}/{}: {}", station, phase, err);
                    continue;
                }
            };
            let radius = match source_radius_from_corner_frequency(
                &corner_frequencies,
                self.constants.s_wave_velocity,
                *phase,
            ) {
                Ok(r) => r,
                Err(err) => {
                    warn!("dropping group {}/{}: {}", station, phase, err);
                    continue;
                }
            };

            moments.push(moment);
            radii.push(radius);
            quality_factors.extend(members.iter().map(|r| r.quality_factor));
        }

        if moments.is_empty() {
            self.composite = None;
            return;
        }

        let seismic_moment = moments.iter().sum::<f64>() / moments.len() as f64;
        let source_radius = radii.iter().sum::<f64>() / radii.len() as f64;
        let quality_factor =
            quality_factors.iter().sum::<f64>() / quality_factors.len() as f64;

        self.composite = Some(CompositeResult {
            seismic_moment,
            moment_magnitude: moment_to_moment_magnitude(seismic_moment),
            source_radius,
            stress_drop: calculate_stress_drop(seismic_moment, source_radius),
            quality_factor,
            station_count: moments.len(),
        });
    }
}
