//! CLI argument parsing

use clap::Parser;
use std::path::PathBuf;

/// Estimate the moment magnitude of an event from a JSON bundle of picks
/// and waveform traces.
#[derive(Parser, Debug)]
#[command(name = "mwcalc")]
#[command(about = "Moment magnitude estimation from spectral fitting of waveform picks")]
pub struct Args {
    /// Input event bundle (JSON)
    pub input: PathBuf,

    /// Rock density in kg/m^3 (default 2700)
    #[arg(long)]
    pub density: Option<f64>,

    /// P-wave velocity in m/s (default 4800)
    #[arg(long)]
    pub vp: Option<f64>,

    /// S-wave velocity in m/s (default 2710)
    #[arg(long)]
    pub vs: Option<f64>,

    /// Time-bandwidth product of the multitaper estimate
    #[arg(long, default_value_t = 2.0)]
    pub time_bandwidth: f64,

    /// Fixed quality factor for the spectrum fit
    #[arg(short, long, default_value_t = 100.0)]
    pub quality_factor: f64,

    /// Corner-frequency seed in Hz
    #[arg(long, default_value_t = 10.0)]
    pub corner_frequency: f64,

    /// Write the full report as JSON to this path
    #[arg(long)]
    pub json: Option<PathBuf>,

    /// Verbose output (per-trace fit logging)
    #[arg(short, long)]
    pub verbose: bool,
}
