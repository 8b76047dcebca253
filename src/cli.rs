//! Defines command-line interface options using `clap` for the ncschema binary.

use clap::Parser;
use ncschema::dump::RowFormat;
use std::path::PathBuf;

/// Dump a sub-schema of a NetCDF file as CSV or JSON lines
#[derive(Parser, Debug)]
#[command(
    name = "ncschema",
    version,
    about = "Read NetCDF variables into records through a schema binding"
)]
pub struct Args {
    /// Path to the NetCDF file
    #[arg(short, long)]
    pub file: PathBuf,

    /// List all dimensions and variables, with the type each can be bound as
    #[arg(long)]
    pub list_vars: bool,

    /// Coordinate variable to include, repeatable
    #[arg(short, long = "coordinate", value_name = "VAR")]
    pub coordinates: Vec<String>,

    /// Dimension variable to include, formatted as <dimension>:<variable>, repeatable
    #[arg(short, long = "dimension", value_name = "DIM:VAR", value_parser = parse_dimension_arg)]
    pub dimensions: Vec<(String, String)>,

    /// Output format: csv or jsonl
    #[arg(long, default_value_t = RowFormat::Csv, value_parser = parse_format_arg)]
    pub format: RowFormat,

    /// Path to write rows to. If not set, prints to stdout.
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Stop after this many rows
    #[arg(short, long)]
    pub limit: Option<usize>,

    /// Number of threads to use for parallel reads. Defaults to rayon's choice.
    #[arg(short = 't', long)]
    pub threads: Option<usize>,

    /// Enable verbose output.
    #[arg(short, long, default_value_t = false)]
    pub verbose: bool,
}

fn parse_dimension_arg(s: &str) -> Result<(String, String), String> {
    let parts: Vec<&str> = s.split(':').collect();
    match parts.as_slice() {
        [dim, var] if !dim.is_empty() && !var.is_empty() => Ok((dim.to_string(), var.to_string())),
        [dim] if !dim.is_empty() => Ok((dim.to_string(), dim.to_string())),
        _ => Err("Invalid format: Expected '<dimension>:<variable>'.".to_string()),
    }
}

fn parse_format_arg(s: &str) -> Result<RowFormat, String> {
    s.parse()
}
