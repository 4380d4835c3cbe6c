#![cfg(feature = "dev")]
//! Tests for the limit-calculation executor.
//!
//! These tests verify the orchestration layer:
//! - The denominator sweep and its union with observed values
//! - Overdispersion mode selection
//! - The monotonicity post-pass
//! - Empty-input behaviour and the display transform
//!
//! ## Test Organization
//!
//! 1. **Sweep** - Grid construction, dedup, observed passthrough
//! 2. **Monotonicity** - Suppression of non-monotonic segments
//! 3. **Execution** - Mode selection, row structure, transforms

use approx::assert_relative_eq;

use funnel::internals::engine::executor::{
    run, suppress_non_monotonic, ExecutorConfig, RawRow, LIMIT_PROBABILITIES,
};
use funnel::internals::engine::output::Transform;
use funnel::internals::primitives::sweep::plotting_denominators;
use funnel::internals::statistics::charts::ChartKind;
use funnel::internals::statistics::dispersion::OdAdjustment;

// ============================================================================
// Helper Functions
// ============================================================================

fn config(chart: ChartKind, od: OdAdjustment) -> ExecutorConfig {
    ExecutorConfig {
        chart,
        od_adjustment: od,
        alt_target: None,
        transform: Transform::Identity,
    }
}

fn row(denominator: f64, limits: [Option<f64>; 6]) -> RawRow {
    RawRow {
        denominator,
        limits,
        target: 0.5,
        alt_target: None,
    }
}

// ============================================================================
// Sweep Tests
// ============================================================================

/// The sweep unions the 1%-step grid with the observed denominators,
/// sorted and deduplicated.
#[test]
fn test_sweep_construction() {
    let observed = [5.0, 4.0, 10.0, 3.0, 4.0];
    let sweep = plotting_denominators(&observed);

    // Sorted ascending, no exact duplicates.
    for pair in sweep.windows(2) {
        assert!(pair[0] < pair[1]);
    }
    // Every observed denominator is present.
    for d in observed {
        assert!(sweep.contains(&d), "missing observed denominator {d}");
    }
    // Grid runs from 1 to 110% of the maximum.
    assert_relative_eq!(sweep[0], 1.0);
    assert!(*sweep.last().unwrap() <= 10.0 * 1.1 + 1e-12);
    // Step of 1% of max: the grid alone has about 100 points.
    assert!(sweep.len() >= 100);
}

/// Empty input produces an empty sweep.
#[test]
fn test_sweep_empty() {
    assert!(plotting_denominators(&[]).is_empty());
}

// ============================================================================
// Monotonicity Tests
// ============================================================================

/// A lower limit that rises then falls loses its non-monotonic value.
#[test]
fn test_monotonicity_lower_limit_suppressed() {
    let mut rows = vec![
        row(1.0, [Some(1.0), None, None, None, None, Some(9.0)]),
        row(2.0, [Some(2.0), None, None, None, None, Some(8.0)]),
        row(3.0, [Some(1.5), None, None, None, None, Some(7.0)]),
    ];
    suppress_non_monotonic(&mut rows);

    assert_eq!(rows[0].limits[0], Some(1.0)); // 1.0 < 2.0: keeps
    assert_eq!(rows[1].limits[0], None); // 2.0 >= 1.5: suppressed
    assert_eq!(rows[2].limits[0], Some(1.5)); // last row untouched
    // Uppers were strictly decreasing: all kept.
    assert_eq!(rows[0].limits[5], Some(9.0));
    assert_eq!(rows[1].limits[5], Some(8.0));
}

/// An upper limit that is not strictly decreasing is suppressed.
#[test]
fn test_monotonicity_upper_limit_suppressed() {
    let mut rows = vec![
        row(1.0, [None, None, None, None, None, Some(5.0)]),
        row(2.0, [None, None, None, None, None, Some(5.0)]),
    ];
    suppress_non_monotonic(&mut rows);
    assert_eq!(rows[0].limits[5], None); // 5.0 <= 5.0: suppressed
    assert_eq!(rows[1].limits[5], Some(5.0));
}

/// A crossed pair (lower at or above upper) is removed entirely.
#[test]
fn test_monotonicity_crossed_pair() {
    let mut rows = vec![
        row(1.0, [Some(3.0), None, None, None, None, Some(2.0)]),
        row(2.0, [Some(4.0), None, None, None, None, Some(1.0)]),
    ];
    suppress_non_monotonic(&mut rows);
    assert_eq!(rows[0].limits[0], None);
    assert_eq!(rows[0].limits[5], None);
}

/// Bands are treated independently.
#[test]
fn test_monotonicity_bands_independent() {
    let mut rows = vec![
        row(1.0, [Some(1.0), Some(5.0), None, None, Some(9.0), Some(9.0)]),
        row(2.0, [Some(2.0), Some(4.0), None, None, Some(8.0), Some(8.5)]),
    ];
    suppress_non_monotonic(&mut rows);
    assert_eq!(rows[0].limits[0], Some(1.0)); // ll99 rising: kept
    assert_eq!(rows[0].limits[1], None); // ll95 falling: suppressed
    assert_eq!(rows[0].limits[4], Some(9.0)); // ul95 falling: kept
    assert_eq!(rows[0].limits[5], Some(9.0)); // ul99 falling: kept
}

// ============================================================================
// Execution Tests
// ============================================================================

/// The probability set is the standard three-band, two-sided one.
#[test]
fn test_limit_probabilities() {
    assert_eq!(LIMIT_PROBABILITIES, [0.001, 0.025, 0.16, 0.84, 0.975, 0.999]);
}

/// Empty input yields an empty, well-formed output without errors.
#[test]
fn test_run_empty_input() {
    let out = run(&config(ChartKind::Proportion, OdAdjustment::Auto), &[], &[]);
    assert!(out.rows.is_empty());
    assert!(out.z_scores.is_empty());
    assert!(out.target.is_nan());
    assert!(!out.od_applied);
}

/// Overdispersion mode selection: No and Yes are unconditional, Auto
/// follows the dispersion test.
#[test]
fn test_run_od_mode_selection() {
    // Perfectly consistent data: Auto must not adjust.
    let nums = [2.0, 4.0, 6.0];
    let dens = [10.0, 20.0, 30.0];
    let auto = run(&config(ChartKind::Proportion, OdAdjustment::Auto), &nums, &dens);
    assert!(!auto.od_applied);
    assert_eq!(auto.tau2, 0.0);

    let yes = run(&config(ChartKind::Proportion, OdAdjustment::Yes), &nums, &dens);
    assert!(yes.od_applied);

    // Wildly dispersed data: Auto adjusts.
    let nums = [10.0, 90.0, 15.0, 85.0];
    let dens = [100.0; 4];
    let auto = run(&config(ChartKind::Proportion, OdAdjustment::Auto), &nums, &dens);
    assert!(auto.od_applied);
    assert!(auto.tau2 > 0.0);

    let no = run(&config(ChartKind::Proportion, OdAdjustment::No), &nums, &dens);
    assert!(!no.od_applied);
}

/// Rows carry the observed denominators, limits ordered within each row.
#[test]
fn test_run_row_structure() {
    let nums = [30.0, 50.0, 75.0];
    let dens = [100.0, 160.0, 240.0];
    let out = run(&config(ChartKind::Proportion, OdAdjustment::No), &nums, &dens);

    // Observed denominators appear as rows.
    for &d in &dens {
        assert!(
            out.rows.iter().any(|r| r.denominator == d),
            "no row at observed denominator {d}"
        );
    }

    // At a comfortably large denominator every limit survives the
    // monotonicity pass and the six values are ordered.
    let r = out
        .rows
        .iter()
        .find(|r| r.denominator == 240.0)
        .expect("row exists");
    let vals: Vec<f64> = r.limits.iter().map(|l| l.unwrap()).collect();
    for pair in vals.windows(2) {
        assert!(pair[0] < pair[1], "limits out of order: {vals:?}");
    }
    // Bracketing the target.
    assert!(vals[2] < r.target && r.target < vals[3]);

    assert_eq!(out.z_scores.len(), 3);
    assert_eq!(out.standard_errors.len(), 3);
}

/// The display transform maps every value column.
#[test]
fn test_run_display_transform() {
    let nums = [5.0, 9.0];
    let dens = [50.0, 70.0];
    let identity = run(&config(ChartKind::Rate, OdAdjustment::No), &nums, &dens);
    let mut ln_config = config(ChartKind::Rate, OdAdjustment::No);
    ln_config.transform = Transform::Ln;
    let logged = run(&ln_config, &nums, &dens);

    assert_eq!(identity.rows.len(), logged.rows.len());
    for (a, b) in identity.rows.iter().zip(&logged.rows) {
        assert_relative_eq!(a.target.ln(), b.target, max_relative = 1e-12);
        match (a.limits[5], b.limits[5]) {
            (Some(x), Some(y)) => assert_relative_eq!(x.ln(), y, max_relative = 1e-12),
            (None, None) => {}
            other => panic!("transform changed suppression: {other:?}"),
        }
    }
}

/// The alt-target is echoed into every row.
#[test]
fn test_run_alt_target() {
    let mut cfg = config(ChartKind::Proportion, OdAdjustment::No);
    cfg.alt_target = Some(0.25);
    let out = run(&cfg, &[3.0, 6.0], &[10.0, 20.0]);
    assert!(out.rows.iter().all(|r| r.alt_target == Some(0.25)));
}
