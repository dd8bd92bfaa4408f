//! Submits built LP instances to an external solver and classifies the result.

use crate::error::{Error, Result};
use crate::lp::{ConstraintOp, LpInstance};

/// Outcome of submitting an LP instance to a backend.
#[derive(Debug, Clone, PartialEq)]
pub enum FeasibilityStatus {
    /// The LP has a feasible point; carries the witness assignment, indexed exactly as
    /// [`LpInstance`]'s flat indices.
    Feasible(Witness),
    /// The LP has no feasible point.
    Infeasible,
}

/// A feasible point of an LP instance, indexed by the same flat variable indices as the
/// [`LpInstance`] it was produced from.
#[derive(Debug, Clone, PartialEq)]
pub struct Witness {
    pub values: Vec<f64>,
}

impl Witness {
    pub fn a(&self, instance: &LpInstance, i: usize, j: usize) -> f64 {
        self.values[instance.a_index(i, j)]
    }

    pub fn b(&self, instance: &LpInstance, i: usize, j: usize) -> f64 {
        self.values[instance.b_index(i, j)]
    }

    pub fn x(&self, instance: &LpInstance, i: usize) -> f64 {
        self.values[instance.x_index(i)]
    }
}

/// The minimal LP interface any solver must provide. `MinilpBackend` is the shipped
/// implementation; tests may substitute a trivial in-memory backend to exercise the
/// builder in isolation.
pub trait LpBackend {
    /// Solves `instance`, minimizing its objective, and classifies the outcome.
    ///
    /// # Errors
    ///
    /// Returns [`Error::SolverError`] if the backend returns an unclassifiable status or
    /// fails outright.
    fn solve(&self, instance: &LpInstance) -> Result<FeasibilityStatus>;
}

/// The shipped [`LpBackend`], backed by the `minilp` crate's two-phase primal simplex.
#[derive(Debug, Default, Clone, Copy)]
pub struct MinilpBackend;

impl LpBackend for MinilpBackend {
    fn solve(&self, instance: &LpInstance) -> Result<FeasibilityStatus> {
        let mut problem = minilp::Problem::new(minilp::OptimizationDirection::Minimize);
        let vars: Vec<minilp::Variable> = (0..instance.num_vars())
            .map(|v| problem.add_var(instance.objective[v], (0.0, f64::INFINITY)))
            .collect();

        for constraint in &instance.constraints {
            let terms: Vec<(minilp::Variable, f64)> = constraint
                .terms
                .iter()
                .map(|&(v, coeff)| (vars[v], coeff))
                .collect();
            let op = match constraint.op {
                ConstraintOp::Eq => minilp::ComparisonOp::Eq,
                ConstraintOp::Ge => minilp::ComparisonOp::Ge,
                ConstraintOp::Le => minilp::ComparisonOp::Le,
            };
            problem.add_constraint(terms, op, constraint.rhs);
        }

        match problem.solve() {
            Ok(solution) => {
                let values = vars.iter().map(|&v| solution[v]).collect();
                Ok(FeasibilityStatus::Feasible(Witness { values }))
            }
            Err(minilp::Error::Infeasible) => Ok(FeasibilityStatus::Infeasible),
            Err(minilp::Error::Unbounded) => {
                // An unbounded feasible region is reported as feasible; our
                // objective is bounded below by zero on every variable so this should
                // not occur in practice, but the fallback witness keeps the contract.
                let values = vec![0.0; instance.num_vars()];
                Ok(FeasibilityStatus::Feasible(Witness { values }))
            }
            Err(other) => Err(Error::SolverError(other.to_string())),
        }
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    /// A trivial backend for unit-testing the builder: always reports feasible with an
    /// all-zero witness, without running any real numerical solver.
    #[derive(Debug, Default)]
    pub(crate) struct AlwaysFeasibleBackend;

    impl LpBackend for AlwaysFeasibleBackend {
        fn solve(&self, instance: &LpInstance) -> Result<FeasibilityStatus> {
            Ok(FeasibilityStatus::Feasible(Witness {
                values: vec![0.0; instance.num_vars()],
            }))
        }
    }

    #[test]
    fn minilp_backend_solves_trivial_feasible_instance() {
        use crate::annotation::Annotation;
        use crate::annotation::Step;
        use crate::lp::Builder;

        let annotation =
            Annotation::new(vec![Step::Speedup2, Step::Slowdown, Step::Slowdown]).unwrap();
        let instance = Builder::build(&annotation, 1.0, 1.0).unwrap();
        let status = MinilpBackend.solve(&instance).unwrap();
        assert!(matches!(status, FeasibilityStatus::Feasible(_)));
    }

    #[test]
    fn minilp_backend_solves_longer_annotation() {
        use crate::annotation::Enumerator;
        use crate::lp::Builder;

        for annotation in Enumerator::new(5).unwrap() {
            let instance = Builder::build(&annotation, 1.0, 1.0).unwrap();
            let status = MinilpBackend.solve(&instance).unwrap();
            assert!(matches!(status, FeasibilityStatus::Feasible(_)));
        }
    }
}
