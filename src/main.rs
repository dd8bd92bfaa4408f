//! Binary crate for the alternation-trading lower-bound proof search.

use std::io::{self, Write};

use clap::Parser;
use fs_err as fs;

use trading_lb::options::{CliOptions, SearchOptions, TraceLevel};
use trading_lb::{format_tabulation, run_search, run_tabulation};

fn main() {
    if let Err(error) = run() {
        // discard result as we cannot further propagate a write error
        let _ = write!(io::stderr(), "Error: {}", error);
        std::process::exit(1);
    }
}

/// Initialize the logging framework with the given trace level.
///
/// # Errors
///
/// Returns an error if the logging framework has already been initialized.
fn initialize_logging(level: TraceLevel) -> io::Result<()> {
    env_logger::builder()
        .filter(None, level.into())
        .format_timestamp_millis()
        .try_init()
        .map_err(|e| io::Error::new(io::ErrorKind::AlreadyExists, e))
}

/// Parses options, initializes logging, runs the search or tabulation and writes the
/// output.
///
/// # Errors
///
/// Returns an error if the search itself failed (malformed arguments, an invalid
/// annotation, or a solver failure) or if writing the output failed.
fn run() -> Result<(), Box<dyn std::error::Error>> {
    let options = CliOptions::parse();
    initialize_logging(options.trace_level)?;

    let search_options = SearchOptions::from(&options);
    let output = if search_options.tabulate_from.is_some() || search_options.tabulate_to.is_some()
    {
        let rows = run_tabulation(&search_options)?;
        format_tabulation(&rows)
    } else {
        run_search(&search_options)?.to_string()
    };

    if let Some(output_file) = &options.output_file {
        let mut file = fs::File::create(output_file)?;
        write!(file, "{}", output)?;
    } else {
        write!(io::stdout(), "{}", output)?;
    }
    Ok(())
}
