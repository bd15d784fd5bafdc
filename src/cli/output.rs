//! Output formatting for CLI results

use colorful::Colorful;
use serde::Serialize;

use crate::config::PhysicalConstants;
use crate::core::aggregate::{CompositeResult, PickResult};
use crate::core::pipeline::PipelineSummary;

/// Everything the JSON report carries.
#[derive(Debug, Serialize)]
pub struct Report<'a> {
    pub composite: Option<&'a CompositeResult>,
    pub results: &'a [PickResult],
    pub constants: &'a PhysicalConstants,
    pub accepted: usize,
    pub skipped: usize,
}

/// Terminal table of the accepted pick results.
pub fn format_results_table(results: &[PickResult]) -> String {
    let mut output = String::new();
    output.push_str(&format!(
        "  {:<20} {:<6} {:>12} {:>10} {:>8}\n",
        "channel", "phase", "omega_0", "f_c [Hz]", "Q"
    ));
    for result in results {
        output.push_str(&format!(
            "  {:<20} {:<6} {:>12.3e} {:>10.2} {:>8.1}\n",
            result.channel,
            result.phase.to_string(),
            result.omega_0,
            result.corner_frequency,
            result.quality_factor
        ));
    }
    output
}

/// Terminal summary of the composite result.
pub fn format_composite(composite: &CompositeResult, summary: &PipelineSummary) -> String {
    let mut output = String::new();
    let header = format!(
        "Mw {:.2}  (from {} station/phase groups)",
        composite.moment_magnitude, composite.station_count
    );
    output.push_str(&format!("{}\n", header.green().bold()));
    output.push_str(&format!(
        "  Seismic moment:  {:.3e} Nm\n",
        composite.seismic_moment
    ));
    output.push_str(&format!(
        "  Source radius:   {:.1} m\n",
        composite.source_radius
    ));
    output.push_str(&format!(
        "  Stress drop:     {:.3e} Pa ({:.2} bar)\n",
        composite.stress_drop,
        composite.stress_drop / 1e5
    ));
    output.push_str(&format!(
        "  Mean Q (rough):  {:.1}\n",
        composite.quality_factor
    ));
    output.push_str(&format!(
        "  Picks: {} accepted, {} skipped\n",
        summary.accepted, summary.skipped
    ));
    output
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::source_params::Phase;

    #[test]
    fn test_table_lists_every_result() {
        let results = vec![
            PickResult {
                channel: "BW.RJOB..EHZ".into(),
                phase: Phase::P,
                omega_0: 1.2e-6,
                corner_frequency: 7.5,
                quality_factor: 100.0,
            },
            PickResult {
                channel: "BW.RJOB..EHN".into(),
                phase: Phase::S,
                omega_0: 2.4e-6,
                corner_frequency: 6.0,
                quality_factor: 110.0,
            },
        ];
        let table = format_results_table(&results);
        assert!(table.contains("BW.RJOB..EHZ"));
        assert!(table.contains("BW.RJOB..EHN"));
        assert_eq!(table.lines().count(), 3);
    }

    #[test]
    fn test_composite_formatting() {
        let composite = CompositeResult {
            seismic_moment: 1.0e15,
            moment_magnitude: 3.93,
            source_radius: 450.0,
            stress_drop: 7.0e6,
            quality_factor: 105.0,
            station_count: 3,
        };
        let summary = PipelineSummary {
            accepted: 5,
            skipped: 1,
        };
        let text = format_composite(&composite, &summary);
        assert!(text.contains("Mw 3.93"));
        assert!(text.contains("1.000e15"));
        assert!(text.contains("70.00 bar"));
    }
}
