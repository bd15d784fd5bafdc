//! Operator-editable configuration: physical constants of the source region
//! and the defaults of the spectral estimation step.

use serde::{Deserialize, Serialize};

/// Rock properties entering the source-parameter formulas.
///
/// Process-wide defaults an operator may override; any change invalidates
/// the composite result, which the aggregation context recomputes from the
/// stored pick results.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PhysicalConstants {
    /// Rock density in kg/m^3.
    pub density: f64,
    /// P-wave velocity in m/s.
    pub p_wave_velocity: f64,
    /// S-wave velocity in m/s.
    pub s_wave_velocity: f64,
}

impl Default for PhysicalConstants {
    fn default() -> Self {
        Self {
            density: 2700.0,
            // Midpoints of the usual upper-crust velocity ranges.
            p_wave_velocity: (5800.0 + 3800.0) / 2.0,
            s_wave_velocity: (2200.0 + 3220.0) / 2.0,
        }
    }
}

/// Knobs of the spectral estimation and fitting stage.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EstimatorSettings {
    /// Time-bandwidth product NW of the multitaper estimate.
    pub time_bandwidth: f64,
    /// Corner-frequency seed for the fit, in Hz.
    pub initial_corner_frequency: f64,
    /// Fixed quality factor handed to the fit.
    pub quality_factor: f64,
}

impl Default for EstimatorSettings {
    fn default() -> Self {
        Self {
            time_bandwidth: 2.0,
            initial_corner_frequency: crate::core::spectrum::DEFAULT_CORNER_FREQUENCY,
            quality_factor: crate::core::spectrum::DEFAULT_QUALITY_FACTOR,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_constants() {
        let c = PhysicalConstants::default();
        assert_eq!(c.density, 2700.0);
        assert_eq!(c.p_wave_velocity, 4800.0);
        assert_eq!(c.s_wave_velocity, 2710.0);
    }

    #[test]
    fn test_constants_roundtrip_json() {
        let c = PhysicalConstants::default();
        let json = serde_json::to_string(&c).unwrap();
        let back: PhysicalConstants = serde_json::from_str(&json).unwrap();
        assert_eq!(c, back);
    }
}
