// src/cli/mod.rs
//
// Command-line interface module

mod args;
mod output;

pub use args::Args;
pub use output::{format_composite, format_results_table, Report};
