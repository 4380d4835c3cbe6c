//! Limit-calculation executor.
//!
//! ## Purpose
//!
//! This module runs a full limit calculation: it decides the
//! overdispersion mode, computes the targets and the six quantile points,
//! builds the denominator sweep, evaluates every limit at every sweep
//! point, and suppresses non-monotonic limit segments.
//!
//! ## Design notes
//!
//! * The executor is stateless: one call consumes a configuration and the
//!   data, and returns a complete table. Nothing is cached between calls,
//!   so re-entry from any context is safe.
//! * All arithmetic is in `f64`, the kernels' native precision; the API
//!   layer converts to and from the caller's float type.
//! * The six standard limits cover 68%, 95%, and 99.8% two-sided bands,
//!   derived through the normal quantile at run time.
//!
//! ## Invariants
//!
//! * Every observed denominator appears as a sweep row.
//! * A limit value is `None` only where the monotonicity pass nulled it.
//! * Empty data produces an empty, well-formed output.
//!
//! ## Non-goals
//!
//! * This module does not validate input data (handled by `validator`).
//! * This module does not format results (handled by `output`).

use crate::distributions::normal;
use crate::primitives::sweep::plotting_denominators;
use crate::statistics::charts::{ChartKind, LimitArgs};
use crate::statistics::dispersion::{self, OdAdjustment};

use super::output::Transform;

// ============================================================================
// Configuration
// ============================================================================

/// Configuration for one limit calculation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ExecutorConfig {
    /// Chart kind the formulas are taken from.
    pub chart: ChartKind,

    /// Overdispersion-adjustment policy.
    pub od_adjustment: OdAdjustment,

    /// Optional secondary reference line, echoed into every row.
    pub alt_target: Option<f64>,

    /// Display-scale transform applied to the assembled table.
    pub transform: Transform,
}

/// Probabilities of the six standard limits, ascending.
pub const LIMIT_PROBABILITIES: [f64; 6] = [0.001, 0.025, 0.16, 0.84, 0.975, 0.999];

/// Number of lower/upper band pairs.
const BANDS: usize = 3;

// ============================================================================
// Raw Output
// ============================================================================

/// One sweep row before display transformation: the six limits ordered as
/// `[ll99, ll95, ll68, ul68, ul95, ul99]`.
#[derive(Debug, Clone, Copy)]
pub struct RawRow {
    pub denominator: f64,
    pub limits: [Option<f64>; 6],
    pub target: f64,
    pub alt_target: Option<f64>,
}

/// Output of the executor, still in `f64`.
#[derive(Debug, Clone)]
pub struct ExecutorOutput {
    /// Limit table over the denominator sweep.
    pub rows: Vec<RawRow>,

    /// Per-observation z-scores (un-Winsorised, overdispersion scale).
    pub z_scores: Vec<f64>,

    /// Per-observation standard errors on the scale the limits use.
    /// Empty for unadjusted standardised-ratio charts, whose limits are
    /// exact rather than normal-approximate.
    pub standard_errors: Vec<f64>,

    /// Pooled target on the natural scale.
    pub target: f64,

    /// Pooled target on the variance-stabilised scale.
    pub target_transformed: f64,

    /// Dispersion ratio.
    pub phi: f64,

    /// Between-unit variance estimate.
    pub tau2: f64,

    /// Whether the limits were overdispersion-adjusted.
    pub od_applied: bool,
}

// ============================================================================
// Execution
// ============================================================================

/// Run one complete limit calculation.
pub fn run(config: &ExecutorConfig, numerators: &[f64], denominators: &[f64]) -> ExecutorOutput {
    let kind = config.chart;

    // Dispersion first: the Auto decision depends on it, and the z-scores
    // are part of the output regardless of the decision.
    let (estimate, z_scores) = dispersion::estimate(kind, numerators, denominators);

    let od_applied = match config.od_adjustment {
        OdAdjustment::No => false,
        OdAdjustment::Yes => true,
        OdAdjustment::Auto => estimate.tau2 > 0.0,
    };
    let tau2 = if od_applied { estimate.tau2 } else { 0.0 };

    let target = kind.target(numerators, denominators, false);
    let target_transformed = kind.target(numerators, denominators, true);

    let standard_errors = if od_applied {
        kind.se_od(numerators, denominators)
    } else {
        kind.se(numerators, denominators)
    };

    // The z-values for the six bands, via the quantile kernel.
    let quantiles: [f64; 6] =
        core::array::from_fn(|i| normal::quantile(LIMIT_PROBABILITIES[i], 0.0, 1.0, true, false));

    let sweep = plotting_denominators(denominators);

    let mut rows: Vec<RawRow> = Vec::with_capacity(sweep.len());
    for &denominator in &sweep {
        let standard_error = kind.se_at(target, denominator, od_applied);

        let mut limits = [None; 6];
        for (slot, (&probability, &quantile)) in
            limits.iter_mut().zip(LIMIT_PROBABILITIES.iter().zip(&quantiles))
        {
            let args = LimitArgs {
                probability,
                quantile,
                target,
                target_transformed,
                standard_error,
                tau2,
                denominator,
            };
            *slot = Some(if od_applied {
                kind.limit_od(&args)
            } else {
                kind.limit(&args)
            });
        }

        rows.push(RawRow {
            denominator,
            limits,
            target,
            alt_target: config.alt_target,
        });
    }

    suppress_non_monotonic(&mut rows);
    apply_transform(config.transform, &mut rows);

    ExecutorOutput {
        rows,
        z_scores,
        standard_errors,
        target,
        target_transformed,
        phi: estimate.phi,
        tau2: estimate.tau2,
        od_applied,
    }
}

// ============================================================================
// Monotonicity Post-Pass
// ============================================================================

/// Null out limit values where the curve turns back on itself.
///
/// The normal approximation misbehaves at small denominators: lower limits
/// can fall and upper limits rise as the denominator grows, which renders
/// as crossing lines. Rather than repairing the curve, the offending
/// values become `None` so the segment is simply not drawn.
///
/// For each row but the last, per band: a lower limit at least as large as
/// the next row's is nulled; an upper limit no larger than the next row's
/// is nulled; and if the surviving pair crosses, both go.
pub fn suppress_non_monotonic(rows: &mut [RawRow]) {
    if rows.len() < 2 {
        return;
    }

    for i in 0..rows.len() - 1 {
        for band in 0..BANDS {
            let lower_idx = band;
            let upper_idx = 5 - band;

            let next_lower = rows[i + 1].limits[lower_idx];
            let next_upper = rows[i + 1].limits[upper_idx];

            let row = &mut rows[i];
            if let (Some(cur), Some(next)) = (row.limits[lower_idx], next_lower) {
                if cur >= next {
                    row.limits[lower_idx] = None;
                }
            }
            if let (Some(cur), Some(next)) = (row.limits[upper_idx], next_upper) {
                if cur <= next {
                    row.limits[upper_idx] = None;
                }
            }
            if let (Some(lo), Some(hi)) = (row.limits[lower_idx], row.limits[upper_idx]) {
                if lo >= hi {
                    row.limits[lower_idx] = None;
                    row.limits[upper_idx] = None;
                }
            }
        }
    }
}

// ============================================================================
// Display Transform
// ============================================================================

/// Apply the display-scale transform to every value column.
fn apply_transform(transform: Transform, rows: &mut [RawRow]) {
    if transform == Transform::Identity {
        return;
    }
    for row in rows {
        for limit in &mut row.limits {
            *limit = limit.map(|v| transform.apply(v));
        }
        row.target = transform.apply(row.target);
        row.alt_target = row.alt_target.map(|v| transform.apply(v));
    }
}
