//! Translates an annotation, trial exponent and generic-slowdown parameter into an LP
//! instance.

use crate::annotation::{Annotation, Step};
use crate::error::{Error, Result};

/// A single linear constraint over the flattened variable space, in the form
/// `Σ coeff·var (op) rhs`.
#[derive(Debug, Clone)]
pub struct Constraint {
    pub terms: Vec<(usize, f64)>,
    pub op: ConstraintOp,
    pub rhs: f64,
}

/// The comparison operator of a [`Constraint`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConstraintOp {
    Eq,
    Ge,
    Le,
}

/// A flattened LP instance ready to be submitted to an [`crate::solver::LpBackend`].
///
/// Variables are indexed `0..num_vars`; [`LpInstance::a_index`], [`LpInstance::b_index`]
/// and [`LpInstance::x_index`] translate builder-level `(i, j)`/`i` coordinates into flat
/// indices.
#[derive(Debug, Clone)]
pub struct LpInstance {
    n: usize,
    m: usize,
    pub constraints: Vec<Constraint>,
    /// Objective coefficient of each variable (minimization): 1 for every `b` and `x`
    /// variable, 0 for every `a` variable, forming a "mild" objective that never changes
    /// feasibility.
    pub objective: Vec<f64>,
}

impl LpInstance {
    /// Number of proof lines (`n = L+1`).
    pub fn num_lines(&self) -> usize {
        self.n
    }

    /// Variable width per line (`m`).
    pub fn width(&self) -> usize {
        self.m
    }

    /// Total number of flattened variables: `n*(2m+1)` (`a`, `b` each `n*m`, `x` is `n`).
    pub fn num_vars(&self) -> usize {
        self.n * (2 * self.m + 1)
    }

    /// Flat index of `a[i,j]`.
    pub fn a_index(&self, i: usize, j: usize) -> usize {
        i * self.m + j
    }

    /// Flat index of `b[i,j]`.
    pub fn b_index(&self, i: usize, j: usize) -> usize {
        self.n * self.m + i * self.m + j
    }

    /// Flat index of `x[i]`.
    pub fn x_index(&self, i: usize) -> usize {
        2 * self.n * self.m + i
    }
}

/// Translates annotations into [`LpInstance`]s.
pub struct Builder;

impl Builder {
    /// Builds the LP instance for `annotation` under trial exponent `c` and generic-slowdown
    /// scaling `alpha`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidAnnotation`] if `annotation` was somehow constructed without
    /// going through its validating constructor (defensive; should be unreachable in
    /// practice since [`Annotation::new`] already validates).
    pub fn build(annotation: &Annotation, c: f64, alpha: f64) -> Result<LpInstance> {
        let steps = annotation.steps();
        let n = annotation.num_lines();
        let m = annotation.width();
        if steps.is_empty() {
            return Err(Error::InvalidAnnotation("empty annotation".to_owned()));
        }

        let mut instance = LpInstance {
            n,
            m,
            constraints: Vec::new(),
            objective: vec![0.0; n * (2 * m + 1)],
        };
        for i in 0..n {
            for j in 0..m {
                instance.objective[instance.b_index(i, j)] = 1.0;
            }
            instance.objective[instance.x_index(i)] = 1.0;
        }

        Self::emit_boundary(&mut instance, 0);
        Self::emit_boundary(&mut instance, n - 1);
        instance.constraints.push(ge(
            &[(instance.a_index(0, 0), 1.0), (instance.a_index(n - 1, 0), -1.0)],
            0.0,
        ));

        Self::emit_first_speedup(&mut instance, steps[0]);

        // Line `i` (for `2 <= i <= n-1`) takes its rule from `steps[i-1]`: `steps[0]` was
        // already consumed by the first-speedup line above. Line `n-1` is also a boundary
        // line, but it additionally gets the rule for the last step (always a slowdown,
        // per the annotation invariants), linking it back to line `n-2`; omitting this
        // leaves `a[n-1,0]` disconnected from the rest of the proof and makes every LP
        // trivially feasible regardless of `c`.
        for i in 2..n {
            let step = steps[i - 1];
            match step {
                Step::Slowdown => Self::emit_slowdown(&mut instance, i, c, alpha),
                Step::Speedup2 => Self::emit_speedup_two(&mut instance, i),
                Step::Speedup3 => Self::emit_speedup_three(&mut instance, i),
            }
        }

        Ok(instance)
    }

    fn emit_boundary(instance: &mut LpInstance, i: usize) {
        instance.constraints.push(ge(&[(instance.a_index(i, 0), 1.0)], 1.0));
        instance.constraints.push(eq(&[(instance.b_index(i, 0), 1.0)], 1.0));
        for k in 1..instance.m {
            instance.constraints.push(eq(&[(instance.a_index(i, k), 1.0)], 0.0));
            instance.constraints.push(eq(&[(instance.b_index(i, k), 1.0)], 0.0));
        }
    }

    fn emit_first_speedup(instance: &mut LpInstance, first_step: Step) {
        let a = |i: usize, j: usize| instance.a_index(i, j);
        let b = |i: usize, j: usize| instance.b_index(i, j);
        let x1 = instance.x_index(1);

        // a[1,0] = a[0,0] - x[1]
        instance
            .constraints
            .push(eq(&[(a(1, 0), 1.0), (a(0, 0), -1.0), (x1, 1.0)], 0.0));
        instance.constraints.push(eq(&[(b(1, 0), 1.0)], 1.0));

        instance.constraints.push(eq(&[(a(1, 1), 1.0)], 0.0));
        instance.constraints.push(ge(&[(b(1, 1), 1.0), (x1, -1.0)], 0.0));
        instance.constraints.push(ge(&[(b(1, 1), 1.0)], 1.0));

        instance
            .constraints
            .push(eq(&[(a(1, 2), 1.0), (x1, -1.0)], 0.0));
        instance.constraints.push(eq(&[(b(1, 2), 1.0)], 1.0));

        let start = if first_step == Step::Speedup3 {
            instance.constraints.push(eq(&[(a(1, 3), 1.0)], 0.0));
            instance.constraints.push(eq(&[(b(1, 3), 1.0)], 1.0));
            4
        } else {
            3
        };
        for k in start..instance.m {
            instance.constraints.push(eq(&[(a(1, k), 1.0)], 0.0));
            instance.constraints.push(eq(&[(b(1, k), 1.0)], 0.0));
        }
    }

    fn emit_speedup_two(instance: &mut LpInstance, i: usize) {
        let a = |ii: usize, j: usize| instance.a_index(ii, j);
        let b = |ii: usize, j: usize| instance.b_index(ii, j);
        let xi = instance.x_index(i);

        instance.constraints.push(ge(&[(a(i, 0), 1.0)], 1.0));
        instance
            .constraints
            .push(ge(&[(a(i, 0), 1.0), (a(i - 1, 0), -1.0), (xi, 1.0)], 0.0));
        instance
            .constraints
            .push(ge(&[(b(i, 0), 1.0), (b(i - 1, 0), -1.0)], 0.0));

        instance.constraints.push(eq(&[(a(i, 1), 1.0)], 0.0));
        instance.constraints.push(ge(&[(b(i, 1), 1.0), (xi, -1.0)], 0.0));
        instance
            .constraints
            .push(ge(&[(b(i, 1), 1.0), (b(i - 1, 0), -1.0)], 0.0));

        instance
            .constraints
            .push(ge(&[(a(i, 2), 1.0), (a(i - 1, 1), -1.0)], 0.0));
        instance.constraints.push(ge(&[(a(i, 2), 1.0), (xi, -1.0)], 0.0));
        instance
            .constraints
            .push(ge(&[(b(i, 2), 1.0), (b(i - 1, 1), -1.0)], 0.0));

        for k in 3..instance.m {
            instance
                .constraints
                .push(eq(&[(a(i, k), 1.0), (a(i - 1, k - 1), -1.0)], 0.0));
            instance
                .constraints
                .push(eq(&[(b(i, k), 1.0), (b(i - 1, k - 1), -1.0)], 0.0));
        }
    }

    fn emit_speedup_three(instance: &mut LpInstance, i: usize) {
        let a = |ii: usize, j: usize| instance.a_index(ii, j);
        let b = |ii: usize, j: usize| instance.b_index(ii, j);
        let xi = instance.x_index(i);

        instance.constraints.push(ge(&[(a(i, 0), 1.0)], 1.0));
        instance
            .constraints
            .push(ge(&[(a(i, 0), 1.0), (a(i - 1, 0), -1.0), (xi, 1.0)], 0.0));
        instance
            .constraints
            .push(ge(&[(b(i, 0), 1.0), (b(i - 1, 0), -1.0)], 0.0));

        instance.constraints.push(eq(&[(a(i, 1), 1.0)], 0.0));
        instance.constraints.push(ge(&[(b(i, 1), 1.0), (xi, -1.0)], 0.0));
        instance
            .constraints
            .push(ge(&[(b(i, 1), 1.0), (b(i - 1, 0), -1.0)], 0.0));

        instance
            .constraints
            .push(ge(&[(a(i, 2), 1.0), (a(i - 1, 1), -1.0)], 0.0));
        instance.constraints.push(ge(&[(a(i, 2), 1.0), (xi, -1.0)], 0.0));
        instance
            .constraints
            .push(ge(&[(b(i, 2), 1.0), (b(i - 1, 1), -1.0)], 0.0));

        if instance.m > 3 {
            instance.constraints.push(eq(&[(a(i, 3), 1.0)], 0.0));
            instance
                .constraints
                .push(eq(&[(b(i, 3), 1.0), (b(i - 1, 1), -1.0)], 0.0));
        }
        for k in 4..instance.m {
            instance
                .constraints
                .push(eq(&[(a(i, k), 1.0), (a(i - 1, k - 2), -1.0)], 0.0));
            instance
                .constraints
                .push(eq(&[(b(i, k), 1.0), (b(i - 1, k - 2), -1.0)], 0.0));
        }
    }

    fn emit_slowdown(instance: &mut LpInstance, i: usize, c: f64, alpha: f64) {
        let a = |ii: usize, j: usize| instance.a_index(ii, j);
        let b = |ii: usize, j: usize| instance.b_index(ii, j);

        instance
            .constraints
            .push(ge(&[(a(i, 0), 1.0), (a(i - 1, 0), -(c * alpha))], 0.0));
        instance
            .constraints
            .push(ge(&[(a(i, 0), 1.0), (a(i - 1, 1), -c)], 0.0));
        instance
            .constraints
            .push(ge(&[(a(i, 0), 1.0), (b(i - 1, 0), -c)], 0.0));
        instance
            .constraints
            .push(ge(&[(a(i, 0), 1.0), (b(i - 1, 1), -c)], 0.0));
        instance.constraints.push(ge(&[(a(i, 0), 1.0)], 1.0));

        instance
            .constraints
            .push(eq(&[(b(i, 0), 1.0), (b(i - 1, 1), -1.0)], 0.0));

        for k in 1..=instance.m - 2 {
            instance
                .constraints
                .push(eq(&[(a(i, k), 1.0), (a(i - 1, k + 1), -1.0)], 0.0));
            instance
                .constraints
                .push(eq(&[(b(i, k), 1.0), (b(i - 1, k + 1), -1.0)], 0.0));
        }
        instance.constraints.push(eq(&[(a(i, instance.m - 1), 1.0)], 0.0));
        instance.constraints.push(eq(&[(b(i, instance.m - 1), 1.0)], 0.0));
    }
}

fn eq(terms: &[(usize, f64)], rhs: f64) -> Constraint {
    Constraint {
        terms: terms.to_vec(),
        op: ConstraintOp::Eq,
        rhs,
    }
}

fn ge(terms: &[(usize, f64)], rhs: f64) -> Constraint {
    Constraint {
        terms: terms.to_vec(),
        op: ConstraintOp::Ge,
        rhs,
    }
}
