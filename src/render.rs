//! Formats a feasible witness into a human-readable alternating-quantifier proof.

use std::fmt::Write as _;

use crate::annotation::Annotation;
use crate::lp::LpInstance;
use crate::solver::Witness;

/// Decimal places to which witness values are rounded before being printed.
pub const DEFAULT_PRECISION: usize = 4;

fn round(value: f64, precision: usize) -> f64 {
    let factor = 10f64.powi(precision as i32);
    (value * factor).round() / factor
}

/// Renders one proof line: walks `j` from `m-1` down to `0`, alternating the quantifier
/// symbol starting from `∃` at the outermost nonzero block, skipping blocks whose `b` value
/// rounds to zero, and finishing with the innermost `DTS[n^a]` term.
fn render_line(instance: &LpInstance, witness: &Witness, i: usize, precision: usize) -> String {
    let mut out = String::new();
    let mut exists = true;
    for j in (1..instance.width()).rev() {
        let b = round(witness.b(instance, i, j), precision);
        if b == 0.0 {
            continue;
        }
        let a = round(witness.a(instance, i, j), precision);
        let quant = if exists { '\u{2203}' } else { '\u{2200}' };
        write!(out, "({} n^{})^{} ", quant, a, b).expect("writing to a String cannot fail");
        exists = !exists;
    }
    let a0 = round(witness.a(instance, i, 0), precision);
    write!(out, "DTS[n^{}]", a0).expect("writing to a String cannot fail");
    out
}

/// Renders every line of `annotation`'s proof from `witness`, one per output line.
pub fn render(
    annotation: &Annotation,
    instance: &LpInstance,
    witness: &Witness,
    precision: usize,
) -> String {
    let mut out = String::new();
    for i in 0..annotation.num_lines() {
        out.push_str(&render_line(instance, witness, i, precision));
        out.push('\n');
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::annotation::Step;
    use crate::lp::Builder;
    use crate::solver::{FeasibilityStatus, LpBackend, MinilpBackend};

    #[test]
    fn render_produces_one_line_per_proof_line() {
        let annotation =
            Annotation::new(vec![Step::Speedup2, Step::Slowdown, Step::Slowdown]).unwrap();
        let instance = Builder::build(&annotation, 1.0, 1.0).unwrap();
        let witness = match MinilpBackend.solve(&instance).unwrap() {
            FeasibilityStatus::Feasible(w) => w,
            FeasibilityStatus::Infeasible => panic!("expected feasible instance"),
        };
        let text = render(&annotation, &instance, &witness, DEFAULT_PRECISION);
        assert_eq!(text.lines().count(), annotation.num_lines());
        for line in text.lines() {
            assert!(line.contains("DTS[n^"));
        }
    }

    #[test]
    fn rounding_snaps_to_requested_precision() {
        assert_eq!(round(1.23456, 2), 1.23);
        assert_eq!(round(0.00001, 4), 0.0);
    }
}
