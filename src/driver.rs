//! Iterates over enumerated annotations of a requested length and tracks the global best
//! feasible exponent, with optional tabulation across a range of lengths.

use log::info;

use crate::annotation::{Enumerator, RandomizedEnumerator};
use crate::error::{Error, Result};
use crate::search::{search, AnnotationResult, SearchConfig};
use crate::solver::LpBackend;

/// The tolerance within which two annotations' best exponents are considered tied.
pub const TIE_TOLERANCE: f64 = 1e-9;

/// The outcome of running the driver over all annotations of a single proof length.
#[derive(Debug, Clone)]
pub struct DriverResult {
    pub length: usize,
    pub best_c: Option<f64>,
    pub best_results: Vec<AnnotationResult>,
}

/// Runs the feasibility search over every canonical annotation of length `length`,
/// tracking the tied set of global best results.
///
/// # Errors
///
/// Returns [`Error::InvalidArgument`] if `length` is even or less than 3.
pub fn run(backend: &dyn LpBackend, length: usize, config: &SearchConfig) -> Result<DriverResult> {
    let enumerator = Enumerator::new(length)?;
    let mut best_c: Option<f64> = None;
    let mut best_results: Vec<AnnotationResult> = Vec::new();

    let mut consider = |result: AnnotationResult| {
        let c = match result.best_c {
            Some(c) => c,
            None => return,
        };
        match best_c {
            None => {
                info!("new best c={} at annotation {}", c, result.annotation);
                best_c = Some(c);
                best_results = vec![result];
            }
            Some(current) if c > current + TIE_TOLERANCE => {
                info!("new best c={} at annotation {} (previous best {})", c, result.annotation, current);
                best_c = Some(c);
                best_results = vec![result];
            }
            Some(current) if (c - current).abs() <= TIE_TOLERANCE => {
                best_results.push(result);
            }
            _ => {}
        }
    };

    for annotation in enumerator {
        if config.randomized {
            for variant in RandomizedEnumerator::new(annotation.clone())? {
                let result = search(backend, &variant, config)?;
                consider(result);
            }
        }
        let result = search(backend, &annotation, config)?;
        consider(result);
    }

    Ok(DriverResult {
        length,
        best_c,
        best_results,
    })
}

/// One row of a tabulation run: the best exponent (if any) found for a given proof length.
#[derive(Debug, Clone)]
pub struct TabulationRow {
    pub length: usize,
    pub best_c: Option<f64>,
    pub best_results: Vec<AnnotationResult>,
}

/// Runs the driver across every odd annotation length in `[from, to]`, for a fixed
/// `config`. `from` and `to` are user-facing even proof-line
/// counts; each is converted to the corresponding odd annotation length internally.
///
/// # Errors
///
/// Returns [`Error::InvalidArgument`] if `from` or `to` is odd, or `from > to`.
pub fn tabulate(
    backend: &dyn LpBackend,
    from_line_count: usize,
    to_line_count: usize,
    config: &SearchConfig,
) -> Result<Vec<TabulationRow>> {
    if from_line_count % 2 != 0 || to_line_count % 2 != 0 {
        return Err(Error::InvalidArgument(
            "tabulation bounds must be even proof-line counts".to_owned(),
        ));
    }
    if from_line_count > to_line_count {
        return Err(Error::InvalidArgument(
            "tabulate-from must not exceed tabulate-to".to_owned(),
        ));
    }
    let mut rows = Vec::new();
    let mut line_count = from_line_count;
    while line_count <= to_line_count {
        let length = line_count - 1;
        let result = run(backend, length, config)?;
        rows.push(TabulationRow {
            length,
            best_c: result.best_c,
            best_results: result.best_results,
        });
        line_count += 2;
    }
    Ok(rows)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::solver::MinilpBackend;

    #[test]
    fn run_over_length_three_finds_some_feasible_annotation() {
        let result = run(&MinilpBackend, 3, &SearchConfig::default()).unwrap();
        assert!(result.best_c.is_some());
        assert_eq!(result.best_results.len(), 1);
    }

    #[test]
    fn run_rejects_even_length() {
        assert!(run(&MinilpBackend, 4, &SearchConfig::default()).is_err());
    }

    #[test]
    fn tabulate_rejects_odd_bounds() {
        assert!(tabulate(&MinilpBackend, 3, 10, &SearchConfig::default()).is_err());
    }

    #[test]
    fn tabulate_produces_one_row_per_even_length() {
        let rows = tabulate(&MinilpBackend, 4, 8, &SearchConfig::default()).unwrap();
        assert_eq!(rows.len(), 3);
        assert_eq!(rows[0].length, 3);
        assert_eq!(rows[1].length, 5);
        assert_eq!(rows[2].length, 7);
    }

    #[test]
    fn feasibility_is_monotone_below_the_discovered_best_c() {
        use crate::lp::Builder;
        use crate::solver::FeasibilityStatus;

        let result = run(&MinilpBackend, 3, &SearchConfig::default()).unwrap();
        let best = result.best_results.first().unwrap();
        let best_c = best.best_c.unwrap();

        let is_feasible = |c: f64| {
            let instance = Builder::build(&best.annotation, c, 1.0).unwrap();
            matches!(
                MinilpBackend.solve(&instance).unwrap(),
                FeasibilityStatus::Feasible(_)
            )
        };

        assert!(is_feasible(best_c));
        for fraction in [0.9, 0.5, 0.1, 0.01] {
            let c = best_c * fraction;
            assert!(is_feasible(c), "expected c={} < best_c={} to stay feasible", c, best_c);
        }
    }

    #[test]
    fn randomized_run_never_does_worse_than_the_base_only_run() {
        let base_config = SearchConfig::default();
        let randomized_config = SearchConfig {
            randomized: true,
            ..SearchConfig::default()
        };
        let base = run(&MinilpBackend, 5, &base_config).unwrap();
        let randomized = run(&MinilpBackend, 5, &randomized_config).unwrap();
        assert!(randomized.best_c.is_some());
        assert!(randomized.best_c.unwrap() >= base.best_c.unwrap() - TIE_TOLERANCE);
    }
}
