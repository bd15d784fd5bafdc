// src/main.rs
use anyhow::{Context, Result};
use clap::Parser;
use colorful::Colorful;
use indicatif::{ProgressBar, ProgressStyle};
use std::fs;

use mwcalc::cli::{format_composite, format_results_table, Args, Report};
use mwcalc::config::{EstimatorSettings, PhysicalConstants};
use mwcalc::core::pipeline::{self, PipelineSummary};
use mwcalc::core::MagnitudeContext;
use mwcalc::event::Event;

fn main() -> Result<()> {
    let args = Args::parse();

    let level = if args.verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level)).init();

    let bundle = fs::read_to_string(&args.input)
        .with_context(|| format!("reading event bundle {}", args.input.display()))?;
    let event: Event = serde_json::from_str(&bundle)
        .with_context(|| format!("parsing event bundle {}", args.input.display()))?;

    let mut constants = PhysicalConstants::default();
    if let Some(density) = args.density {
        constants.density = density;
    }
    if let Some(vp) = args.vp {
        constants.p_wave_velocity = vp;
    }
    if let Some(vs) = args.vs {
        constants.s_wave_velocity = vs;
    }
    let settings = EstimatorSettings {
        time_bandwidth: args.time_bandwidth,
        initial_corner_frequency: args.corner_frequency,
        quality_factor: args.quality_factor,
    };

    println!(
        "Event at ({:.4}, {:.4}), depth {:.1} km, {} pick(s)\n",
        event.origin.latitude,
        event.origin.longitude,
        event.origin.depth_km,
        event.picks.len()
    );

    let progress = ProgressBar::new(event.picks.len() as u64);
    progress.set_style(
        ProgressStyle::with_template("{bar:40} {pos}/{len} {msg}")
            .expect("static progress template"),
    );

    let mut context = MagnitudeContext::new(event.origin, constants, event.stations.clone());
    let mut summary = PipelineSummary::default();
    for pick in &event.picks {
        progress.set_message(pick.channel.clone());
        let (accepted, skipped) = pipeline::process_pick(pick, &event, &settings, &mut context);
        summary.accepted += accepted;
        summary.skipped += skipped;
        progress.inc(1);
    }
    progress.finish_and_clear();

    if !context.results().is_empty() {
        println!("{}", format_results_table(context.results()));
    }
    match context.composite() {
        Some(composite) => println!("{}", format_composite(composite, &summary)),
        None => println!("{}", "No accepted results, composite undefined.".yellow()),
    }

    if let Some(path) = args.json {
        let report = Report {
            composite: context.composite(),
            results: context.results(),
            constants: context.constants(),
            accepted: summary.accepted,
            skipped: summary.skipped,
        };
        let json =
            serde_json::to_string_pretty(&report).context("serializing JSON report")?;
        fs::write(&path, json).with_context(|| format!("writing report {}", path.display()))?;
        println!("Report written to {}", path.display());
    }

    Ok(())
}
