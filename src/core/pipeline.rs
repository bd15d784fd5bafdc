//! Batch driver: from raw picks to accepted results.
//!
//! Runs each pick through spectral estimation, seeding and fitting, and
//! inserts the accepted results into the aggregation context. Per-pick
//! isolation throughout: a pick that fails anywhere along the way is logged
//! and skipped, the batch keeps going.

use log::{debug, warn};

use crate::config::EstimatorSettings;
use crate::core::aggregate::{MagnitudeContext, PickResult};
use crate::core::fit::fit_spectrum;
use crate::core::spectrum::{amplitude_spectrum, FitSeed};
use crate::event::{Event, Pick};

/// Outcome of one batch run.
#[derive(Debug, Clone, Copy, Default)]
pub struct PipelineSummary {
    /// Pick results accepted into the context.
    pub accepted: usize,
    /// Traces skipped (no phase, bad travel time, estimation or fit
    /// failure, rejected insert).
    pub skipped: usize,
}

/// Process every pick of the event into `context`.
pub fn process_event(
    event: &Event,
    settings: &EstimatorSettings,
    context: &mut MagnitudeContext,
) -> PipelineSummary {
    let mut summary = PipelineSummary::default();
    for pick in &event.picks {
        let (accepted, skipped) = process_pick(pick, event, settings, context);
        summary.accepted += accepted;
        summary.skipped += skipped;
    }
    summary
}

/// Process the component traces of a single pick. Returns
/// (accepted, skipped) trace counts.
pub fn process_pick(
    pick: &Pick,
    event: &Event,
    settings: &EstimatorSettings,
    context: &mut MagnitudeContext,
) -> (usize, usize) {
    let Some(phase_hint) = pick.phase_hint.as_deref() else {
        warn!("pick {} has no phase hint, skipping", pick.channel);
        return (0, pick.traces.len().max(1));
    };
    let phase = match phase_hint.parse() {
        Ok(phase) => phase,
        Err(err) => {
            warn!("pick {}: {}", pick.channel, err);
            return (0, pick.traces.len().max(1));
        }
    };

    let traveltime = (pick.time - event.origin.time).num_milliseconds() as f64 / 1000.0;
    if traveltime <= 0.0 {
        warn!("pick {} precedes the origin ({}s), skipping", pick.channel, traveltime);
        return (0, pick.traces.len().max(1));
    }
    if pick.traces.is_empty() {
        warn!("pick {} has no waveform data, skipping", pick.channel);
        return (0, 1);
    }

    let mut accepted = 0;
    let mut skipped = 0;
    for trace in &pick.traces {
        let samples = match pick.window {
            Some((from, to)) => trace.window(from, to),
            None => &trace.samples[..],
        };

        let observed = match amplitude_spectrum(samples, trace.delta, settings.time_bandwidth) {
            Ok(spectrum) => spectrum,
            Err(err) => {
                warn!("trace {}: spectral estimation failed: {}", trace.channel, err);
                skipped += 1;
                continue;
            }
        };

        let mut seed =
            FitSeed::from_spectrum_with_corner(&observed, settings.initial_corner_frequency);
        seed.quality_factor = settings.quality_factor;

        let fit = match fit_spectrum(
            &observed.amplitudes,
            &observed.frequencies,
            traveltime,
            seed.omega_0,
            seed.corner_frequency,
            seed.quality_factor,
        ) {
            Ok(fit) => fit,
            Err(err) => {
                warn!("trace {}: {}", trace.channel, err);
                skipped += 1;
                continue;
            }
        };
        debug!(
            "trace {}: omega_0={:.3e} f_c={:.2} Q={:.0}",
            trace.channel, fit.omega_0, fit.corner_frequency, fit.quality_factor
        );

        let result = PickResult {
            channel: trace.channel.clone(),
            phase,
            omega_0: fit.omega_0,
            corner_frequency: fit.corner_frequency,
            quality_factor: fit.quality_factor,
        };
        match context.insert(result) {
            Ok(()) => accepted += 1,
            Err(err) => {
                warn!("trace {}: result rejected: {}", trace.channel, err);
                skipped += 1;
            }
        }
    }
    (accepted, skipped)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::PhysicalConstants;
    use crate::event::{Origin, StationCoordinates, WaveformSegment};
    use crate::testgen::model_displacement_trace;
    use chrono::{Duration, TimeZone, Utc};

    fn synthetic_event() -> Event {
        let origin_time = Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap();
        let origin = Origin {
            latitude: 48.10,
            longitude: 11.58,
            depth_km: 8.0,
            time: origin_time,
        };
        let pick_time = origin_time + Duration::milliseconds(2500);
        let delta = 0.005;
        let trace = WaveformSegment {
            channel: "BW.RJOB..EHZ".to_string(),
            delta,
            start_time: pick_time,
            samples: model_displacement_trace(4e-6, 7.0, 120.0, 2.5, delta, 2048),
        };
        let stations = [(
            "BW.RJOB".to_string(),
            StationCoordinates {
                latitude: 47.74,
                longitude: 12.80,
                elevation_m: 860.0,
            },
        )];
        Event {
            origin,
            stations: stations.into_iter().collect(),
            picks: vec![Pick {
                channel: "BW.RJOB..EHZ".to_string(),
                phase_hint: Some("P".to_string()),
                time: pick_time,
                window: None,
                traces: vec![trace],
            }],
        }
    }

    fn context_for(event: &Event) -> MagnitudeContext {
        MagnitudeContext::new(
            event.origin,
            PhysicalConstants::default(),
            event.stations.clone(),
        )
    }

    #[test]
    fn test_synthetic_pick_is_accepted() {
        let event = synthetic_event();
        let mut context = context_for(&event);
        let summary = process_event(&event, &EstimatorSettings::default(), &mut context);
        assert_eq!(summary.accepted, 1, "skipped {}", summary.skipped);
        assert!(context.composite().is_some());
        assert_eq!(context.results().len(), 1);
        assert_eq!(context.results()[0].channel, "BW.RJOB..EHZ");
    }

    #[test]
    fn test_pick_without_phase_skipped() {
        let mut event = synthetic_event();
        event.picks[0].phase_hint = None;
        let mut context = context_for(&event);
        let summary = process_event(&event, &EstimatorSettings::default(), &mut context);
        assert_eq!(summary.accepted, 0);
        assert!(summary.skipped >= 1);
        assert!(context.composite().is_none());
    }

    #[test]
    fn test_bad_phase_hint_skipped() {
        let mut event = synthetic_event();
        event.picks[0].phase_hint = Some("Lg".to_string());
        let mut context = context_for(&event);
        let summary = process_event(&event, &EstimatorSettings::default(), &mut context);
        assert_eq!(summary.accepted, 0);
    }

    #[test]
    fn test_pick_before_origin_skipped() {
        let mut event = synthetic_event();
        event.picks[0].time = event.origin.time - Duration::seconds(1);
        let mut context = context_for(&event);
        let summary = process_event(&event, &EstimatorSettings::default(), &mut context);
        assert_eq!(summary.accepted, 0);
    }

    #[test]
    fn test_one_bad_trace_does_not_abort_batch() {
        let mut event = synthetic_event();
        // Second pick with a trace too short for the estimator.
        let mut bad = event.picks[0].clone();
        bad.channel = "BW.RJOB..EHN".to_string();
        bad.traces[0].channel = "BW.RJOB..EHN".to_string();
        bad.traces[0].samples.truncate(4);
        event.picks.insert(0, bad);

        let mut context = context_for(&event);
        let summary = process_event(&event, &EstimatorSettings::default(), &mut context);
        assert_eq!(summary.accepted, 1);
        assert_eq!(summary.skipped, 1);
    }
}
