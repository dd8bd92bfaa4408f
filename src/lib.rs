//! Library crate for synthesizing alternation-trading lower-bound proofs against
//! deterministic time-space bounded machines.

pub mod annotation;
pub mod driver;
pub mod error;
pub mod lp;
pub mod options;
pub mod render;
pub mod search;
pub mod solver;

use std::fmt::{self, Display};

use log::info;

pub use error::{Error, Result};

use driver::{tabulate, DriverResult, TabulationRow};
use options::SearchOptions;
use render::DEFAULT_PRECISION;
use search::SearchConfig;
use solver::{LpBackend, MinilpBackend};

/// The outcome of a single-length search, bundling the driver result with a rendered
/// proof for (one of) the tied best annotations, if any was found.
#[derive(Debug, Clone)]
pub struct SearchResult {
    pub driver_result: DriverResult,
    pub proof_text: Option<String>,
}

impl Display for SearchResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.driver_result.best_c {
            Some(c) => {
                writeln!(
                    f,
                    "best c = {} over {} tied annotation(s)",
                    c,
                    self.driver_result.best_results.len()
                )?;
                if let Some(proof) = &self.proof_text {
                    write!(f, "{}", proof)?;
                }
                Ok(())
            }
            None => writeln!(f, "no feasible annotation found of length {}", self.driver_result.length + 1),
        }
    }
}

fn search_config_from(options: &SearchOptions) -> SearchConfig {
    SearchConfig {
        c_start: options.search_start,
        search_cap: options.search_cap,
        search_depth: options.search_depth,
        alpha: options.alpha,
        randomized: options.randomized,
    }
}

/// Runs the feasibility search over every canonical annotation of the proof length given
/// by `options.proof_length` (a proof-line count, converted internally to the odd
/// annotation length), using the default [`MinilpBackend`].
///
/// # Errors
///
/// Returns [`Error::InvalidArgument`] if `options.proof_length` is missing or odd.
pub fn run_search(options: &SearchOptions) -> Result<SearchResult> {
    run_search_with(&MinilpBackend, options)
}

/// As [`run_search`], but submitting every LP to the given backend instead of the
/// default [`MinilpBackend`].
pub fn run_search_with(backend: &dyn LpBackend, options: &SearchOptions) -> Result<SearchResult> {
    let proof_length = options.proof_length.ok_or_else(|| {
        Error::InvalidArgument("proof-length is required for a single-length search".to_owned())
    })?;
    if proof_length % 2 != 0 {
        return Err(Error::InvalidArgument(format!(
            "proof-length must be even, got {}",
            proof_length
        )));
    }
    let length = proof_length - 1;
    let config = search_config_from(options);
    let driver_result = driver::run(backend, length, &config)?;
    if let Some(c) = driver_result.best_c {
        info!("search over length {} complete: best c = {}", length, c);
    }
    let proof_text = driver_result.best_results.first().and_then(|result| {
        let witness = result.witness.as_ref()?;
        let c = result.best_c?;
        let instance = lp::Builder::build(&result.annotation, c, config.alpha).ok()?;
        Some(render::render(&result.annotation, &instance, witness, DEFAULT_PRECISION))
    });
    Ok(SearchResult {
        driver_result,
        proof_text,
    })
}

/// Runs the driver across the tabulation range given by `options.tabulate_from` and
/// `options.tabulate_to`, using the default [`MinilpBackend`].
///
/// # Errors
///
/// Returns [`Error::InvalidArgument`] if either bound is missing or odd, or if
/// `tabulate_from > tabulate_to`.
pub fn run_tabulation(options: &SearchOptions) -> Result<Vec<TabulationRow>> {
    run_tabulation_with(&MinilpBackend, options)
}

/// As [`run_tabulation`], but submitting every LP to the given backend.
pub fn run_tabulation_with(
    backend: &dyn LpBackend,
    options: &SearchOptions,
) -> Result<Vec<TabulationRow>> {
    let from = options.tabulate_from.ok_or_else(|| {
        Error::InvalidArgument("tabulate-from is required for a tabulation run".to_owned())
    })?;
    let to = options.tabulate_to.ok_or_else(|| {
        Error::InvalidArgument("tabulate-to is required for a tabulation run".to_owned())
    })?;
    let config = search_config_from(options);
    tabulate(backend, from, to, &config)
}

/// Formats a tabulation as the plain-text table described in the external interfaces.
pub fn format_tabulation(rows: &[TabulationRow]) -> String {
    let mut out = String::new();
    for row in rows {
        let proof_lines = row.length + 1;
        match row.best_c {
            Some(c) => {
                let annotations: Vec<String> = row
                    .best_results
                    .iter()
                    .map(|r| r.annotation.to_string())
                    .collect();
                out.push_str(&format!(
                    "{} lines: best c = {} [{}]\n",
                    proof_lines,
                    c,
                    annotations.join(", ")
                ));
            }
            None => out.push_str(&format!("{} lines: no feasible annotation\n", proof_lines)),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn run_search_requires_proof_length() {
        let options = SearchOptions::default();
        assert!(run_search(&options).is_err());
    }

    #[test]
    fn run_search_rejects_odd_proof_length() {
        let options = SearchOptions {
            proof_length: Some(5),
            ..SearchOptions::default()
        };
        assert!(run_search(&options).is_err());
    }

    #[test]
    fn run_search_over_length_four_lines_finds_a_result() {
        let options = SearchOptions {
            proof_length: Some(4),
            ..SearchOptions::default()
        };
        let result = run_search(&options).unwrap();
        assert!(result.driver_result.best_c.is_some());
        assert!(result.proof_text.is_some());
    }

    #[test]
    fn run_tabulation_requires_both_bounds() {
        let options = SearchOptions {
            tabulate_from: Some(4),
            ..SearchOptions::default()
        };
        assert!(run_tabulation(&options).is_err());
    }

    #[test]
    fn format_tabulation_includes_one_line_per_row() {
        let options = SearchOptions {
            tabulate_from: Some(4),
            tabulate_to: Some(6),
            search_cap: 1,
            search_depth: 2,
            ..SearchOptions::default()
        };
        let rows = run_tabulation(&options).unwrap();
        let text = format_tabulation(&rows);
        assert_eq!(text.lines().count(), rows.len());
    }
}
