//! Per-annotation feasibility search: exponential probe followed by binary refinement.

use log::{debug, trace, warn};

use crate::annotation::Annotation;
use crate::error::Result;
use crate::lp::Builder;
use crate::solver::{FeasibilityStatus, LpBackend, Witness};

/// Tunables for [`search`], mirroring the CLI flags.
#[derive(Debug, Clone, Copy)]
pub struct SearchConfig {
    pub c_start: f64,
    pub search_cap: u32,
    pub search_depth: u32,
    pub alpha: f64,
    /// Whether the driver should also search the randomized (three-quantifier speedup)
    /// variants layered over each base binary annotation.
    pub randomized: bool,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            c_start: 1.0,
            search_cap: 3,
            search_depth: 6,
            alpha: 1.0,
            randomized: false,
        }
    }
}

/// Outcome of searching a single annotation for its best feasible exponent.
#[derive(Debug, Clone)]
pub struct AnnotationResult {
    pub annotation: Annotation,
    /// The best exponent `c` found feasible for this annotation, if any.
    pub best_c: Option<f64>,
    pub witness: Option<Witness>,
    /// Set when doubling never found an infeasible `c` within `search_cap` steps: the
    /// true supremum may exceed `best_c`.
    pub cap_reached: bool,
}

fn check(
    backend: &dyn LpBackend,
    annotation: &Annotation,
    c: f64,
    alpha: f64,
) -> Result<Option<Witness>> {
    let instance = Builder::build(annotation, c, alpha)?;
    trace!("built LP for annotation {} at c={}: {} constraints", annotation, c, instance.constraints.len());
    match backend.solve(&instance)? {
        FeasibilityStatus::Feasible(witness) => Ok(Some(witness)),
        FeasibilityStatus::Infeasible => Ok(None),
    }
}

/// Runs the exponential-probe/binary-refinement search for a single annotation.
pub fn search(
    backend: &dyn LpBackend,
    annotation: &Annotation,
    config: &SearchConfig,
) -> Result<AnnotationResult> {
    let start_witness = check(backend, annotation, config.c_start, config.alpha)?;
    let start_witness = match start_witness {
        Some(w) => w,
        None => {
            trace!("annotation {} infeasible already at c_start={}", annotation, config.c_start);
            return Ok(AnnotationResult {
                annotation: annotation.clone(),
                best_c: None,
                witness: None,
                cap_reached: false,
            });
        }
    };

    let mut low = config.c_start;
    let mut low_witness = start_witness;
    let mut high = None;

    for _ in 0..config.search_cap {
        let candidate = low * 2.0;
        match check(backend, annotation, candidate, config.alpha)? {
            Some(witness) => {
                low = candidate;
                low_witness = witness;
            }
            None => {
                high = Some(candidate);
                break;
            }
        }
    }

    let high = match high {
        Some(h) => h,
        None => {
            warn!(
                "search cap reached for annotation {} without finding an infeasible c (last feasible c={})",
                annotation, low
            );
            return Ok(AnnotationResult {
                annotation: annotation.clone(),
                best_c: Some(low),
                witness: Some(low_witness),
                cap_reached: true,
            });
        }
    };

    let mut lo = low;
    let mut hi = high;
    let mut lo_witness = low_witness;
    for _ in 0..config.search_depth {
        let mid = (lo + hi) / 2.0;
        match check(backend, annotation, mid, config.alpha)? {
            Some(witness) => {
                lo = mid;
                lo_witness = witness;
            }
            None => {
                hi = mid;
            }
        }
    }

    debug!("annotation {} best_c={}", annotation, lo);
    Ok(AnnotationResult {
        annotation: annotation.clone(),
        best_c: Some(lo),
        witness: Some(lo_witness),
        cap_reached: false,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::annotation::Step;
    use crate::solver::MinilpBackend;

    fn trivial_annotation() -> Annotation {
        Annotation::new(vec![Step::Speedup2, Step::Slowdown, Step::Slowdown]).unwrap()
    }

    #[test]
    fn search_finds_feasible_start_for_trivial_annotation() {
        let annotation = trivial_annotation();
        let config = SearchConfig {
            c_start: 1.0,
            search_cap: 2,
            search_depth: 4,
            alpha: 1.0,
            randomized: false,
        };
        let result = search(&MinilpBackend, &annotation, &config).unwrap();
        assert!(result.best_c.is_some());
        assert!(result.best_c.unwrap() >= config.c_start);
    }

    #[test]
    fn search_skips_annotation_infeasible_at_start() {
        struct AlwaysInfeasible;
        impl LpBackend for AlwaysInfeasible {
            fn solve(&self, _instance: &crate::lp::LpInstance) -> Result<FeasibilityStatus> {
                Ok(FeasibilityStatus::Infeasible)
            }
        }
        let annotation = trivial_annotation();
        let result = search(&AlwaysInfeasible, &annotation, &SearchConfig::default()).unwrap();
        assert!(result.best_c.is_none());
        assert!(!result.cap_reached);
    }

    #[test]
    fn search_reports_cap_reached_when_always_feasible() {
        struct AlwaysFeasible;
        impl LpBackend for AlwaysFeasible {
            fn solve(&self, instance: &crate::lp::LpInstance) -> Result<FeasibilityStatus> {
                Ok(FeasibilityStatus::Feasible(Witness {
                    values: vec![0.0; instance.num_vars()],
                }))
            }
        }
        let annotation = trivial_annotation();
        let config = SearchConfig {
            c_start: 1.0,
            search_cap: 2,
            search_depth: 4,
            alpha: 1.0,
            randomized: false,
        };
        let result = search(&AlwaysFeasible, &annotation, &config).unwrap();
        assert!(result.cap_reached);
        assert_eq!(result.best_c, Some(4.0));
    }

    #[test]
    fn probe_result_stays_within_the_doubling_bracket() {
        let annotation = trivial_annotation();
        let config = SearchConfig {
            c_start: 1.0,
            search_cap: 1,
            search_depth: 4,
            alpha: 1.0,
            randomized: false,
        };
        struct AlwaysFeasible;
        impl LpBackend for AlwaysFeasible {
            fn solve(&self, instance: &crate::lp::LpInstance) -> Result<FeasibilityStatus> {
                Ok(FeasibilityStatus::Feasible(Witness {
                    values: vec![0.0; instance.num_vars()],
                }))
            }
        }
        let result = search(&AlwaysFeasible, &annotation, &config).unwrap();
        assert!(result.cap_reached);
        assert_eq!(result.best_c, Some(config.c_start * 2.0));
    }
}
