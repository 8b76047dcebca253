//! Entry point for the ncschema binary.
//! Handles CLI parsing and logging setup, then either lists the bindable variables
//! of a file or dumps the records of a sub-schema.

use clap::Parser;
use ncschema::dump::{row_schema, write_rows_parallel, DEFAULT_CHUNK_ROWS};
use ncschema::{Hypercube, ParallelConfig, SchemaBoundCube};
use std::fs::File as OutputFile;
use std::io::{self, BufWriter, Write};
use tracing::{debug, info};
use tracing_subscriber::{fmt, EnvFilter};

mod cli;

use cli::Args;

fn init_tracing(verbose: bool) {
    let default_level = if verbose { "ncschema=debug" } else { "ncschema=warn" };
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    // stdout carries the rows
    fmt()
        .with_env_filter(env_filter)
        .with_writer(io::stderr)
        .init();
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();
    init_tracing(args.verbose);

    ParallelConfig::new(args.threads).setup_global_pool()?;

    let file = netcdf::open(&args.file)?;
    info!("Opened NetCDF file: {}", args.file.display());

    if args.list_vars || (args.coordinates.is_empty() && args.dimensions.is_empty()) {
        ncschema::inspect::print_summary(&file);
        return Ok(());
    }

    let schema = row_schema(&file, &args.coordinates, &args.dimensions)?;
    let cube = SchemaBoundCube::from_file(&file, &schema)?;
    drop(file);

    debug!(
        "Reading up to {:?} of {} records over dimensions {:?}",
        args.limit,
        cube.len(),
        cube.dimension_names()
    );

    let written = match &args.output {
        Some(path) => {
            let writer = BufWriter::new(OutputFile::create(path)?);
            let written =
                write_rows_parallel(&cube, args.format, writer, args.limit, DEFAULT_CHUNK_ROWS)?;
            info!("Saved {} rows to {}", written, path.display());
            written
        }
        None => {
            let stdout = io::stdout();
            let mut writer = BufWriter::new(stdout.lock());
            let written = write_rows_parallel(
                &cube,
                args.format,
                &mut writer,
                args.limit,
                DEFAULT_CHUNK_ROWS,
            )?;
            writer.flush()?;
            written
        }
    };
    debug!("Wrote {} rows", written);

    Ok(())
}
