//! Plotting-denominator sweep construction.
//!
//! ## Purpose
//!
//! The limit curves are evaluated over a sweep of denominator values rather
//! than only at the observed denominators: a regular grid keeps the curves
//! smooth, and folding the observed denominators into the grid guarantees
//! that every plotted data point sits exactly on the curve.
//!
//! ## Key concepts
//!
//! * **Grid**: `1, 1 + s, 1 + 2s, …` up to 110% of the largest observed
//!   denominator, with step `s` equal to 1% of that maximum.
//! * **Union**: observed denominators are merged into the grid, the result
//!   is sorted ascending and exact duplicates are removed.
//!
//! ## Invariants
//!
//! * The output is sorted ascending and free of exact duplicates.
//! * Every finite observed denominator appears in the output.
//! * Empty input produces an empty sweep.

use core::cmp::Ordering::Equal;

/// Fraction of the maximum denominator used as the grid step.
const GRID_STEP_FRACTION: f64 = 0.01;

/// Upper bound of the grid relative to the maximum denominator.
const GRID_SPAN_FACTOR: f64 = 1.1;

/// Build the sorted, deduplicated denominator sweep for limit evaluation.
pub fn plotting_denominators(observed: &[f64]) -> Vec<f64> {
    if observed.is_empty() {
        return Vec::new();
    }

    let max = observed.iter().copied().fold(f64::NAN, f64::max);
    if !max.is_finite() || max <= 0.0 {
        // Degenerate input: fall back to the observed values alone.
        let mut out = observed.to_vec();
        sort_dedup(&mut out);
        return out;
    }

    let step = max * GRID_STEP_FRACTION;
    let limit = max * GRID_SPAN_FACTOR;

    let mut sweep = Vec::with_capacity(observed.len() + 128);

    // Index-based generation avoids accumulated addition drift.
    let mut i: u32 = 0;
    loop {
        let value = 1.0 + f64::from(i) * step;
        if value > limit {
            break;
        }
        sweep.push(value);
        i += 1;
    }

    sweep.extend_from_slice(observed);
    sort_dedup(&mut sweep);
    sweep
}

fn sort_dedup(values: &mut Vec<f64>) {
    values.sort_by(|a, b| a.partial_cmp(b).unwrap_or(Equal));
    values.dedup();
}
