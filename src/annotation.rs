//! Canonical enumeration of valid alternation-trading annotations.

use std::fmt;

use crate::error::{Error, Result};

/// A single step of an annotation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    /// Closes a quantifier block under the assumed containment. Contributes `-1` to the
    /// running quantifier count.
    Slowdown,
    /// Opens a single quantifier block. Contributes `+1` to the running quantifier count
    /// (or `+2` if it is the very first step of the annotation).
    Speedup2,
    /// Opens two quantifier blocks at once (the randomized, three-quantifier rule).
    /// Contributes `+2` to the running quantifier count (or `+2` still, unchanged, if it
    /// is the very first step — the first step's bonus quantifier is already folded into
    /// that flat `+2`); only legal immediately after a [`Step::Slowdown`] or as the first
    /// step.
    Speedup3,
}

impl Step {
    fn code(self) -> u8 {
        match self {
            Self::Slowdown => 0,
            Self::Speedup2 => 1,
            Self::Speedup3 => 2,
        }
    }

}

impl fmt::Display for Step {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

/// A canonical encoding of a proof's rule sequence.
///
/// An annotation of length `L` encodes an `(L+1)`-line proof: it always starts with a
/// speedup and ends with a slowdown, and its running quantifier count never goes negative
/// and returns to zero only at its very start and very end.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Annotation {
    steps: Vec<Step>,
}

impl Annotation {
    /// Wraps `steps` as an annotation after checking its structural invariants.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidAnnotation`] if `steps` does not begin with a speedup, does
    /// not end with a slowdown, has a running quantifier count that goes negative, touches
    /// zero anywhere but its two boundary lines, does not return to zero at the end, or
    /// places a `SPEEDUP3` step anywhere but directly after a slowdown (or first).
    pub fn new(steps: Vec<Step>) -> Result<Self> {
        let annotation = Self { steps };
        annotation.validate()?;
        Ok(annotation)
    }

    /// The number of steps in this annotation (`L`).
    pub fn len(&self) -> usize {
        self.steps.len()
    }

    /// Whether this annotation has no steps. Never true for a validated annotation, since
    /// `L >= 3` is required, but provided for API completeness.
    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    /// The number of proof lines this annotation encodes (`n = L+1`).
    pub fn num_lines(&self) -> usize {
        self.len() + 1
    }

    /// The steps of this annotation, in order.
    pub fn steps(&self) -> &[Step] {
        &self.steps
    }

    /// The running quantifier count at each of the `n = L+1` proof lines, starting
    /// and ending at zero. A non-first [`Step::Speedup3`] contributes `+2` rather than
    /// [`Step::Speedup2`]'s `+1`, matching the LP builder's shift-by-two indexing for the
    /// three-quantifier rule.
    pub fn quantifier_counts(&self) -> Vec<i64> {
        let mut counts = Vec::with_capacity(self.num_lines());
        counts.push(0);
        let mut count = 0i64;
        for (i, step) in self.steps.iter().enumerate() {
            count += if i == 0 {
                2
            } else {
                match step {
                    Step::Slowdown => -1,
                    Step::Speedup2 => 1,
                    Step::Speedup3 => 2,
                }
            };
            counts.push(count);
        }
        counts
    }

    /// The maximum running quantifier count over all proof lines plus 2, i.e. the LP
    /// variable width `m` of the LP builder.
    pub fn width(&self) -> usize {
        let max_count = self.quantifier_counts().into_iter().max().unwrap_or(0);
        (max_count.max(0) as usize) + 2
    }

    fn validate(&self) -> Result<()> {
        let n = self.steps.len();
        // Odd length is a consequence of the quantifier count returning to zero when every
        // non-first step moves it by exactly 1 (the pure two-quantifier case). A `SPEEDUP3`
        // moves it by 2, so an annotation using the three-quantifier rule can legitimately
        // have even length; the count-balance checks below are the real invariant and catch
        // any genuinely malformed sequence regardless of parity.
        let has_speedup3 = self.steps.iter().any(|s| *s == Step::Speedup3);
        if n < 3 || (!has_speedup3 && n % 2 == 0) {
            return Err(Error::InvalidAnnotation(format!(
                "length must be odd and at least 3, got {}",
                n
            )));
        }
        if self.steps[0] == Step::Slowdown {
            return Err(Error::InvalidAnnotation(
                "annotation must start with a speedup".to_owned(),
            ));
        }
        if self.steps[n - 1] != Step::Slowdown {
            return Err(Error::InvalidAnnotation(
                "annotation must end with a slowdown".to_owned(),
            ));
        }
        let counts = self.quantifier_counts();
        for (i, &count) in counts.iter().enumerate() {
            if count < 0 {
                return Err(Error::InvalidAnnotation(format!(
                    "quantifier count went negative at line {}",
                    i
                )));
            }
            let is_boundary = i == 0 || i == counts.len() - 1;
            if count == 0 && !is_boundary {
                return Err(Error::InvalidAnnotation(format!(
                    "quantifier count returned to zero at interior line {}",
                    i
                )));
            }
        }
        if counts[counts.len() - 1] != 0 {
            return Err(Error::InvalidAnnotation(
                "quantifier count must end at zero".to_owned(),
            ));
        }
        for (i, step) in self.steps.iter().enumerate() {
            if *step == Step::Speedup3 {
                let after_slowdown = i == 0 || self.steps[i - 1] == Step::Slowdown;
                if !after_slowdown {
                    return Err(Error::InvalidAnnotation(format!(
                        "SPEEDUP3 at position {} is not first and not preceded by a slowdown",
                        i
                    )));
                }
            }
        }
        Ok(())
    }
}

impl fmt::Display for Annotation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for step in &self.steps {
            write!(f, "{}", step)?;
        }
        Ok(())
    }
}

/// Choice made at one position during backtracking: [`Step::Speedup2`] is always tried
/// first, [`Step::Slowdown`] is the fallback once speedup has been exhausted at that
/// position.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Choice {
    Speedup,
    Slowdown,
}

/// Canonical, duplicate-free, pull-driven enumerator of length-`L` annotations over the
/// binary alphabet `{SLOWDOWN, SPEEDUP2}`.
///
/// Implements `Iterator` directly; holds only the partial sequence and per-position choice
/// flags as state (`O(L)`), in the spirit of Semba's well-balanced-parenthesis enumeration.
#[derive(Debug)]
pub struct Enumerator {
    length: usize,
    /// Steps chosen so far at each position, once a complete candidate has been built.
    path: Vec<Choice>,
    /// Running quantifier count after each position in `path` (parallel to `path`, offset
    /// by one from `quantifier_counts`: `counts[i]` is the count after taking `path[i]`).
    counts: Vec<i64>,
    started: bool,
    exhausted: bool,
}

impl Enumerator {
    /// Creates an enumerator for annotations of length `length`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidArgument`] if `length` is even or less than 3.
    pub fn new(length: usize) -> Result<Self> {
        if length < 3 || length % 2 == 0 {
            return Err(Error::InvalidArgument(format!(
                "annotation length must be odd and at least 3, got {}",
                length
            )));
        }
        Ok(Self {
            length,
            path: Vec::with_capacity(length),
            counts: Vec::with_capacity(length),
            started: false,
            exhausted: false,
        })
    }

    fn count_after(&self, choice: Choice, position: usize) -> i64 {
        let previous = if position == 0 {
            0
        } else {
            self.counts[position - 1]
        };
        previous
            + if position == 0 {
                2
            } else if choice == Choice::Speedup {
                1
            } else {
                -1
            }
    }

    /// Whether placing `choice` at `position` (with `path[..position]` already fixed) can
    /// possibly lead to a complete, valid annotation.
    fn admissible(&self, choice: Choice, position: usize) -> bool {
        let count = self.count_after(choice, position);
        if count < 0 {
            return false;
        }
        let remaining = self.length - position - 1;
        // Every remaining step changes the count by at most 1, so the count must be
        // able to reach exactly 0 within `remaining` further steps, and the last step
        // must land exactly on 0 (a boundary), not before.
        if count > remaining as i64 {
            return false;
        }
        if (count as usize) % 1 != 0 {
            // unreachable, kept for clarity of the parity argument below
        }
        // Parity: count and remaining must have the same parity, since each step moves
        // the count by exactly 1.
        if (count - remaining as i64) % 2 != 0 {
            return false;
        }
        let is_last = position == self.length - 1;
        if is_last && count != 0 {
            return false;
        }
        if !is_last && count == 0 {
            // would touch the floor at an interior line
            return false;
        }
        true
    }

    /// Greedily extends `self.path` (trying [`Choice::Speedup`] before [`Choice::Slowdown`]
    /// at each position) from its current length up to a complete annotation, backtracking
    /// on dead ends. Returns `false` if no completion exists from the current prefix.
    fn extend_to_completion(&mut self) -> bool {
        loop {
            if self.path.len() == self.length {
                return true;
            }
            let position = self.path.len();
            if self.try_place(Choice::Speedup, position) {
                continue;
            }
            if self.try_place(Choice::Slowdown, position) {
                continue;
            }
            // neither choice works here: backtrack
            if !self.backtrack() {
                return false;
            }
        }
    }

    fn try_place(&mut self, choice: Choice, position: usize) -> bool {
        if !self.admissible(choice, position) {
            return false;
        }
        let count = self.count_after(choice, position);
        self.path.push(choice);
        self.counts.push(count);
        true
    }

    /// Pops positions off `self.path` until one is found that was [`Choice::Speedup`] and
    /// can be flipped to [`Choice::Slowdown`]; flips it and returns `true`. Returns `false`
    /// once the whole path has been unwound (enumeration exhausted).
    fn backtrack(&mut self) -> bool {
        while let Some(last) = self.path.pop() {
            self.counts.pop();
            let position = self.path.len();
            if last == Choice::Speedup && self.try_place(Choice::Slowdown, position) {
                return true;
            }
            // `last` was already Slowdown (or Speedup with no Slowdown alternative):
            // keep unwinding further left.
        }
        false
    }

    fn path_to_annotation(&self) -> Annotation {
        let steps = self
            .path
            .iter()
            .map(|choice| match choice {
                Choice::Speedup => Step::Speedup2,
                Choice::Slowdown => Step::Slowdown,
            })
            .collect();
        Annotation { steps }
    }
}

impl Iterator for Enumerator {
    type Item = Annotation;

    fn next(&mut self) -> Option<Annotation> {
        if self.exhausted {
            return None;
        }
        let found = if !self.started {
            self.started = true;
            self.extend_to_completion()
        } else if self.backtrack() {
            self.extend_to_completion()
        } else {
            false
        };
        if found {
            Some(self.path_to_annotation())
        } else {
            self.exhausted = true;
            None
        }
    }
}

/// A single promotion of a [`Step::Speedup2`] at `position` (0-indexed into the base binary
/// annotation) to [`Step::Speedup3`], together with the position in the *output* sequence
/// at which the compensating extra [`Step::Slowdown`] is inserted. A promotion at
/// `position == 0` never carries a compensating slowdown: the first step already
/// contributes a flat `+2` to the running count regardless of which speedup variant opens
/// it, so promoting it changes nothing about the count trajectory.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Promotion {
    /// Index into the base annotation of the promoted speedup.
    position: usize,
    /// How many steps after `position` (in the base annotation's indexing) the
    /// compensating slowdown is inserted; `0` means immediately after the promoted step.
    /// Unused (always irrelevant) when `position == 0`.
    offset: usize,
}

/// Enumerates, for a single base binary annotation, every way to promote eligible
/// `SPEEDUP2` steps to `SPEEDUP3` and insert matching compensating slowdowns (the
/// randomized variant), in lexicographic order of the promoted-position set and then of
/// insertion offsets.
///
/// Promoting a non-first `SPEEDUP2` to `SPEEDUP3` raises its contribution to the running
/// quantifier count from `+1` to `+2`, a one-unit excess that must be closed by exactly one
/// extra `SLOWDOWN` inserted somewhere downstream; promoting the first step needs no such
/// insertion, since the first step's count contribution is a flat `+2` for either variant.
pub struct RandomizedEnumerator {
    base: Annotation,
    eligible: Vec<usize>,
    /// Bitmask over `eligible` of which positions are promoted in the current candidate.
    mask: u64,
    /// Index into the lexicographically-ordered Cartesian product of offset choices for
    /// the current mask's interior (non-zero-position) promotions.
    combo: u128,
    done: bool,
}

impl RandomizedEnumerator {
    /// Creates a randomized-variant enumerator layered over a single base binary
    /// annotation. `base` must not itself contain any `SPEEDUP3` steps.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidArgument`] if `base` already contains a `SPEEDUP3` step, or
    /// if it has more than 63 eligible promotion sites (a generous bound; real proof
    /// lengths are far smaller).
    pub fn new(base: Annotation) -> Result<Self> {
        if base.steps.iter().any(|s| *s == Step::Speedup3) {
            return Err(Error::InvalidArgument(
                "base annotation for randomized enumeration must be binary".to_owned(),
            ));
        }
        let eligible: Vec<usize> = base
            .steps
            .iter()
            .enumerate()
            .filter(|(i, s)| {
                **s == Step::Speedup2 && (*i == 0 || base.steps[*i - 1] == Step::Slowdown)
            })
            .map(|(i, _)| i)
            .collect();
        if eligible.len() > 63 {
            return Err(Error::InvalidArgument(
                "too many eligible promotion sites for randomized enumeration".to_owned(),
            ));
        }
        Ok(Self {
            base,
            eligible,
            mask: 0,
            combo: 0,
            done: false,
        })
    }

    /// For a promotion at `position`, the furthest offset (inclusive) a compensating
    /// slowdown may be placed at: the end of the base annotation. `Annotation::new`
    /// rejects any placement that leaves the count touching the floor early or going
    /// negative, so trying every offset up to this bound and filtering is sufficient.
    fn max_offset(&self, position: usize) -> usize {
        self.base.len() - position - 1
    }

    /// The positions promoted in `mask`, excluding position `0` (which never takes a
    /// compensating-slowdown offset).
    fn interior_promotions(&self, mask: u64) -> Vec<usize> {
        (0..self.eligible.len())
            .filter(|bit| mask & (1 << bit) != 0 && self.eligible[*bit] != 0)
            .collect()
    }

    /// The number of distinct offset assignments available for `mask`'s interior
    /// promotions (the size of the Cartesian product of their individual offset ranges).
    fn combo_count(&self, mask: u64) -> u128 {
        self.interior_promotions(mask)
            .iter()
            .map(|&bit| u128::from(self.max_offset(self.eligible[bit]) as u64) + 1)
            .product::<u128>()
            .max(1)
    }

    /// Decodes `combo` (a mixed-radix index, most-significant digit first) into one offset
    /// per interior promotion of `mask`, in lexicographic order of the promotion list.
    fn decode_offsets(&self, mask: u64, combo: u128) -> Vec<Promotion> {
        let interior = self.interior_promotions(mask);
        let radixes: Vec<u128> = interior
            .iter()
            .map(|&bit| u128::from(self.max_offset(self.eligible[bit]) as u64) + 1)
            .collect();
        let mut offsets = vec![0u128; interior.len()];
        let mut remaining = combo;
        for i in (0..interior.len()).rev() {
            offsets[i] = remaining % radixes[i];
            remaining /= radixes[i];
        }
        interior
            .iter()
            .zip(offsets.iter())
            .map(|(&bit, &offset)| Promotion {
                position: self.eligible[bit],
                offset: offset as usize,
            })
            .collect()
    }

    fn build_for_mask(&self, mask: u64, promotions: &[Promotion]) -> Result<Annotation> {
        let promoted_at: Vec<usize> = (0..self.eligible.len())
            .filter(|bit| mask & (1 << bit) != 0)
            .map(|bit| self.eligible[bit])
            .collect();
        let insert_after: Vec<usize> = promotions
            .iter()
            .map(|p| p.position + p.offset)
            .collect();
        let mut steps = Vec::with_capacity(self.base.len() + insert_after.len());
        for (i, step) in self.base.steps.iter().enumerate() {
            if promoted_at.contains(&i) {
                steps.push(Step::Speedup3);
            } else {
                steps.push(*step);
            }
            let extra = insert_after.iter().filter(|&&pos| pos == i).count();
            for _ in 0..extra {
                steps.push(Step::Slowdown);
            }
        }
        Annotation::new(steps)
    }
}

impl Iterator for RandomizedEnumerator {
    type Item = Annotation;

    fn next(&mut self) -> Option<Annotation> {
        if self.done {
            return None;
        }
        let total_masks = 1u64 << self.eligible.len();
        while self.mask < total_masks {
            let mask = self.mask;
            if mask == 0 {
                self.mask += 1;
                continue;
            }
            let total_combos = self.combo_count(mask);
            if self.combo >= total_combos {
                self.mask += 1;
                self.combo = 0;
                continue;
            }
            let promotions = self.decode_offsets(mask, self.combo);
            self.combo += 1;
            if let Ok(annotation) = self.build_for_mask(mask, &promotions) {
                return Some(annotation);
            }
        }
        self.done = true;
        None
    }
}
