//! Options for the search procedure.

use clap::{ArgEnum, Parser};

/// Implement [`Display`](std::fmt::Display) with the information in [`clap::ArgEnum`].
///
/// This ensures consistent names for parsing of the default argument.
macro_rules! clap_display {
    ($t:ty) => {
        impl std::fmt::Display for $t
        where
            $t: clap::ArgEnum,
        {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                use clap::ArgEnum as _;
                let self_str = Self::VARIANTS
                    .iter()
                    .find(|s| &Self::from_str(s, false).unwrap() == self)
                    .unwrap();
                write!(f, "{}", self_str)
            }
        }
    };
}

/// The trace level / verbosity for the logging framework.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ArgEnum)]
pub enum TraceLevel {
    /// Turn logging off.
    #[clap(name = "off")]
    Off,
    /// Only print errors.
    #[clap(name = "error")]
    Error,
    /// Print errors and warnings.
    #[clap(name = "warn")]
    Warn,
    /// Print errors, warnings and useful information.
    #[clap(name = "info")]
    Info,
    /// Print errors, warnings, useful and debug information.
    #[clap(name = "debug")]
    Debug,
    /// Print all information, including very verbose output.
    #[clap(name = "trace")]
    Trace,
}
impl Default for TraceLevel {
    fn default() -> Self {
        Self::Error
    }
}
clap_display!(TraceLevel);

impl From<TraceLevel> for log::LevelFilter {
    fn from(level: TraceLevel) -> Self {
        match level {
            TraceLevel::Off => Self::Off,
            TraceLevel::Error => Self::Error,
            TraceLevel::Warn => Self::Warn,
            TraceLevel::Info => Self::Info,
            TraceLevel::Debug => Self::Debug,
            TraceLevel::Trace => Self::Trace,
        }
    }
}

/// Options to control the feasibility search and proof rendering.
///
/// These options can be used directly with [`crate::run_search`] or
/// [`crate::run_tabulation`] when using this crate as a library. For use with [`clap`],
/// use [`CliOptions`] instead.
#[derive(Debug, Clone, Parser)]
pub struct SearchOptions {
    /// Number of proof lines to search over (must be even; internally converted to the
    /// odd annotation length `L = proof_length - 1`).
    #[clap(long = "proof-length", name = "lines")]
    pub proof_length: Option<usize>,
    /// Lower bound of an (inclusive) range of proof-line counts to tabulate instead of
    /// searching a single length.
    #[clap(long = "tabulate-from", name = "from-lines")]
    pub tabulate_from: Option<usize>,
    /// Upper bound of the tabulation range.
    #[clap(long = "tabulate-to", name = "to-lines")]
    pub tabulate_to: Option<usize>,
    /// Starting exponent for the exponential probe.
    #[clap(long = "search-start", name = "c0", default_value = "1.0")]
    pub search_start: f64,
    /// Maximum number of doublings in the exponential probe.
    #[clap(long = "search-cap", name = "K", default_value = "3")]
    pub search_cap: u32,
    /// Maximum number of binary-refinement iterations.
    #[clap(long = "search-depth", name = "D", default_value = "6")]
    pub search_depth: u32,
    /// Generic-slowdown scaling parameter (`1.0` is the original rule).
    #[clap(long = "alpha", name = "alpha", default_value = "1.0")]
    pub alpha: f64,
    /// Also search the randomized (three-quantifier speedup) variants layered over each
    /// base binary annotation, not just the base annotations themselves.
    #[clap(long = "randomized")]
    pub randomized: bool,
}

impl Default for SearchOptions {
    fn default() -> Self {
        Self {
            proof_length: None,
            tabulate_from: None,
            tabulate_to: None,
            search_start: 1.0,
            search_cap: 3,
            search_depth: 6,
            alpha: 1.0,
            randomized: false,
        }
    }
}

/// Command-line options, wrapping [`SearchOptions`] with I/O and logging flags.
///
/// This struct should mainly be used with [`clap`] and not instantiated manually. For
/// using this crate as a library, use [`SearchOptions`] directly instead.
#[derive(Debug, Clone, Parser)]
#[clap(version, about)]
pub struct CliOptions {
    /// Write the rendered proof or tabulation to this file instead of stdout.
    #[clap(short = 'o', long = "output", name = "file")]
    pub output_file: Option<String>,
    /// The trace level to use for instantiating the logging framework.
    #[clap(arg_enum, short = 't', long = "trace", name = "trace-level", default_value_t)]
    pub trace_level: TraceLevel,
    /// The set of options for the feasibility search.
    #[clap(flatten)]
    pub search_options: SearchOptions,
}

impl From<&CliOptions> for SearchOptions {
    fn from(options: &CliOptions) -> Self {
        options.search_options.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn trace_level_default_is_error() {
        assert_eq!(TraceLevel::default(), TraceLevel::Error);
        assert_eq!(log::LevelFilter::from(TraceLevel::default()), log::LevelFilter::Error);
    }

    #[test]
    fn trace_level_display_round_trips() {
        for level in [
            TraceLevel::Off,
            TraceLevel::Error,
            TraceLevel::Warn,
            TraceLevel::Info,
            TraceLevel::Debug,
            TraceLevel::Trace,
        ] {
            let text = level.to_string();
            assert!(!text.is_empty());
        }
    }

    #[test]
    fn search_options_default_matches_spec_defaults() {
        let options = SearchOptions::default();
        assert_eq!(options.search_start, 1.0);
        assert_eq!(options.search_cap, 3);
        assert_eq!(options.search_depth, 6);
        assert_eq!(options.alpha, 1.0);
    }
}
