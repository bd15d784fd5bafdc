//! Parsed seismic-event domain data.
//!
//! These types mirror what the external event/origin/waveform providers hand
//! over once their own formats are resolved: an origin, station coordinates,
//! and picks with ground-motion-corrected component traces. How they got
//! here (database client, file reader) is not this crate's concern.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Station position from the waveform provider's metadata.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct StationCoordinates {
    pub latitude: f64,
    pub longitude: f64,
    /// Elevation above sea level in meters.
    pub elevation_m: f64,
}

/// Event origin: where and when the rupture started.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Origin {
    pub latitude: f64,
    pub longitude: f64,
    /// Origin depth in km.
    pub depth_km: f64,
    pub time: DateTime<Utc>,
}

/// One single-channel time series, already corrected to ground motion.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WaveformSegment {
    /// Channel identifier, `NET.STA.LOC.CHA`.
    pub channel: String,
    /// Sample interval in seconds.
    pub delta: f64,
    pub start_time: DateTime<Utc>,
    pub samples: Vec<f64>,
}

impl WaveformSegment {
    /// Sub-range `[from, to)` in sample indices, clamped to the trace.
    pub fn window(&self, from: usize, to: usize) -> &[f64] {
        let to = to.min(self.samples.len());
        let from = from.min(to);
        &self.samples[from..to]
    }
}

/// A phase pick with its resolved component traces.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Pick {
    /// Channel id of the pick itself.
    pub channel: String,
    /// Phase hint from the picker, "P"/"S" or absent.
    pub phase_hint: Option<String>,
    /// Pick time; travel time is this minus the origin time.
    pub time: DateTime<Utc>,
    /// Window [from, to) in sample indices of each trace to analyze. When
    /// absent, the whole trace is used.
    #[serde(default)]
    pub window: Option<(usize, usize)>,
    /// Up to three spatial-component traces for this pick.
    #[serde(default)]
    pub traces: Vec<WaveformSegment>,
}

/// Everything the pipeline needs for one event.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Event {
    pub origin: Origin,
    /// Station coordinates keyed by `NET.STA`.
    pub stations: HashMap<String, StationCoordinates>,
    pub picks: Vec<Pick>,
}

/// Station id of a channel: the first two dot-separated tokens,
/// `NET.STA.LOC.CHA` -> `NET.STA`.
pub fn station_of_channel(channel: &str) -> String {
    channel.split('.').take(2).collect::<Vec<_>>().join(".")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_station_of_channel() {
        assert_eq!(station_of_channel("BW.RJOB..EHZ"), "BW.RJOB");
        assert_eq!(station_of_channel("NET.STA.LOC.CHZ"), "NET.STA");
        assert_eq!(station_of_channel("ONLYNET"), "ONLYNET");
    }

    #[test]
    fn test_window_clamps() {
        let segment = WaveformSegment {
            channel: "BW.RJOB..EHZ".into(),
            delta: 0.005,
            start_time: Utc::now(),
            samples: (0..10).map(|i| i as f64).collect(),
        };
        assert_eq!(segment.window(2, 5), &[2.0, 3.0, 4.0]);
        assert_eq!(segment.window(8, 100).len(), 2);
        assert_eq!(segment.window(7, 3).len(), 0);
    }

    #[test]
    fn test_event_bundle_roundtrip() {
        let json = r#"{
            "origin": {"latitude": 48.1, "longitude": 11.6, "depth_km": 8.0,
                       "time": "2024-05-01T12:00:00Z"},
            "stations": {"BW.RJOB": {"latitude": 47.7, "longitude": 12.8,
                                     "elevation_m": 860.0}},
            "picks": [{"channel": "BW.RJOB..EHZ", "phase_hint": "P",
                       "time": "2024-05-01T12:00:03.5Z"}]
        }"#;
        let event: Event = serde_json::from_str(json).unwrap();
        assert_eq!(event.picks.len(), 1);
        assert!(event.picks[0].traces.is_empty());
        assert_eq!(event.picks[0].window, None);
        let back = serde_json::to_string(&event).unwrap();
        let again: Event = serde_json::from_str(&back).unwrap();
        assert_eq!(again.origin.depth_km, 8.0);
    }
}
