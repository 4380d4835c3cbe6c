//! Tests for the high-level funnel API.
//!
//! These tests verify the builder pattern, validation, and complete
//! workflows:
//! - Builder construction and duplicate-parameter detection
//! - Input validation and error reporting
//! - End-to-end limit calculation per chart kind
//! - Result helpers and display formatting
//!
//! ## Test Organization
//!
//! 1. **Builder** - Defaults, duplicates, parameter validation
//! 2. **Input Validation** - Length mismatches, non-finite members
//! 3. **End-to-End** - Proportion, standardised-ratio, and rate runs
//! 4. **Result Helpers** - Queries, outliers, display

use approx::assert_relative_eq;

use funnel::prelude::*;

// ============================================================================
// Helper Functions
// ============================================================================

fn proportion_model() -> FunnelModel<f64> {
    Funnel::new()
        .chart(Proportion)
        .od_adjustment(No)
        .build()
        .expect("valid configuration")
}

// ============================================================================
// Builder Tests
// ============================================================================

/// Defaults build successfully.
#[test]
fn test_builder_defaults() {
    let model: FunnelModel<f64> = Funnel::new().build().unwrap();
    let result = model.calculate(&[1.0, 2.0], &[10.0, 12.0]).unwrap();
    assert!(!result.is_empty());
}

/// Setting the same parameter twice is an error at build time.
#[test]
fn test_builder_duplicate_parameter() {
    let err = Funnel::<f64>::new()
        .chart(Proportion)
        .chart(Rate)
        .build()
        .unwrap_err();
    assert_eq!(err, FunnelError::DuplicateParameter { parameter: "chart" });

    let err = Funnel::<f64>::new()
        .od_adjustment(No)
        .od_adjustment(Auto)
        .build()
        .unwrap_err();
    assert_eq!(
        err,
        FunnelError::DuplicateParameter {
            parameter: "od_adjustment"
        }
    );
}

/// A non-finite secondary target is rejected.
#[test]
fn test_builder_invalid_alt_target() {
    let err = Funnel::new()
        .chart(Proportion)
        .alt_target(f64::NAN)
        .build()
        .unwrap_err();
    assert!(matches!(err, FunnelError::InvalidNumericValue(_)));
}

// ============================================================================
// Input Validation Tests
// ============================================================================

/// Mismatched array lengths are reported with both lengths.
#[test]
fn test_mismatched_inputs() {
    let err = proportion_model()
        .calculate(&[1.0], &[1.0, 2.0])
        .unwrap_err();
    assert_eq!(
        err,
        FunnelError::MismatchedInputs {
            numerators_len: 1,
            denominators_len: 2,
        }
    );
}

/// Non-finite members are rejected with their position.
#[test]
fn test_non_finite_inputs() {
    let err = proportion_model()
        .calculate(&[1.0, f64::NAN], &[5.0, 6.0])
        .unwrap_err();
    match err {
        FunnelError::InvalidNumericValue(msg) => assert!(msg.contains("numerators[1]")),
        other => panic!("unexpected error: {other:?}"),
    }

    let err = proportion_model()
        .calculate(&[1.0, 2.0], &[5.0, f64::INFINITY])
        .unwrap_err();
    assert!(matches!(err, FunnelError::InvalidNumericValue(_)));
}

/// Empty inputs are not an error: the result is simply empty.
#[test]
fn test_empty_inputs() {
    let result = proportion_model().calculate(&[], &[]).unwrap();
    assert!(result.is_empty());
    assert_eq!(result.len(), 0);
    assert!(result.z_scores.is_empty());
    assert!(result.target.is_nan());
}

// ============================================================================
// End-to-End Tests
// ============================================================================

/// Proportion chart on a small worked example: target, standard error, and
/// the 99.8% band at an observed denominator.
#[test]
fn test_proportion_end_to_end() {
    let numerators = [0.0, 2.0, 3.0, 1.0];
    let denominators = [5.0, 4.0, 10.0, 3.0];

    let result = proportion_model()
        .calculate(&numerators, &denominators)
        .unwrap();

    let target = 6.0 / 22.0;
    assert_relative_eq!(result.target, target, max_relative = 1e-12);
    assert_relative_eq!(
        result.target_transformed,
        target.sqrt().asin(),
        max_relative = 1e-12
    );
    assert!(!result.od_applied);

    // Per-unit outputs parallel the inputs.
    assert_eq!(result.z_scores.len(), 4);
    assert_eq!(result.standard_errors.len(), 4);
    assert_relative_eq!(
        result.standard_errors[0],
        (target * (1.0 - target) / 5.0f64).sqrt(),
        max_relative = 1e-12
    );

    // The row at the observed denominator 5.
    let row = result.row_at(5.0).expect("row at observed denominator");
    let ul99 = row.ul99.expect("upper limit defined");
    assert!(ul99 > target && ul99 < 1.0);
    match row.ll99 {
        // Small denominators may lose their lower limit to the
        // monotonicity pass; when present it must bracket the target.
        Some(ll99) => assert!(ll99 >= 0.0 && ll99 < target),
        None => {}
    }
}

/// Standardised-ratio chart: unit target, exact limits around 1.
#[test]
fn test_standardised_ratio_end_to_end() {
    let observed = [48.0, 85.0, 130.0];
    let expected = [50.0, 80.0, 120.0];

    let model = Funnel::new()
        .chart(StandardisedRatio)
        .od_adjustment(No)
        .build()
        .unwrap();
    let result = model.calculate(&observed, &expected).unwrap();

    assert_relative_eq!(result.target, 1.0);
    // Unadjusted SR charts have no normal standard errors.
    assert!(result.standard_errors.is_empty());

    let row = result.row_at(120.0).unwrap();
    let ll95 = row.ll95.unwrap();
    let ul95 = row.ul95.unwrap();
    assert!(ll95 > 0.0 && ll95 < 1.0 && 1.0 < ul95);
}

/// Rate chart: positive ordered limits around the pooled rate.
#[test]
fn test_rate_end_to_end() {
    let events = [5.0, 11.0, 3.0];
    let exposure = [120.0, 150.0, 90.0];

    let model = Funnel::new().chart(Rate).od_adjustment(No).build().unwrap();
    let result = model.calculate(&events, &exposure).unwrap();

    assert_relative_eq!(result.target, 19.0 / 360.0, max_relative = 1e-12);

    let row = result.row_at(150.0).unwrap();
    let ll99 = row.ll99.unwrap();
    let ul99 = row.ul99.unwrap();
    assert!(0.0 < ll99 && ll99 < result.target && result.target < ul99);
}

/// The dispersion test surfaces through the public API: consistent data
/// yields tau2 of exactly zero and no Auto adjustment.
#[test]
fn test_auto_adjustment_decision() {
    let model = Funnel::new()
        .chart(Proportion)
        .od_adjustment(Auto)
        .build()
        .unwrap();

    let result = model.calculate(&[2.0, 4.0, 6.0], &[10.0, 20.0, 30.0]).unwrap();
    assert_eq!(result.tau2, 0.0);
    assert!(!result.od_applied);

    let result = model
        .calculate(&[10.0, 90.0, 12.0, 88.0], &[100.0, 100.0, 100.0, 100.0])
        .unwrap();
    assert!(result.tau2 > 0.0);
    assert!(result.od_applied);
}

/// Overdispersion-adjusted limits are wider than unadjusted ones.
#[test]
fn test_adjusted_limits_wider() {
    // Modest between-unit variation: the adjusted band widens without
    // folding past the angular bound.
    let numerators = [18.0, 26.0, 20.0, 30.0];
    let denominators = [100.0; 4];

    let unadjusted = proportion_model()
        .calculate(&numerators, &denominators)
        .unwrap();
    let adjusted = Funnel::new()
        .chart(Proportion)
        .od_adjustment(Yes)
        .build()
        .unwrap()
        .calculate(&numerators, &denominators)
        .unwrap();

    let row_u = unadjusted.row_at(100.0).unwrap();
    let row_a = adjusted.row_at(100.0).unwrap();
    assert!(row_a.ul99.unwrap() > row_u.ul99.unwrap());
}

/// The secondary target is carried into every row.
#[test]
fn test_alt_target_carried() {
    let model = Funnel::new()
        .chart(Proportion)
        .alt_target(0.4)
        .build()
        .unwrap();
    let result = model.calculate(&[3.0, 5.0], &[10.0, 14.0]).unwrap();
    assert_eq!(result.alt_target, Some(0.4));
    assert!(result.limits.iter().all(|r| r.alt_target == Some(0.4)));
}

/// The display transform rescales the output table.
#[test]
fn test_transform_applied() {
    let plain = Funnel::<f64>::new()
        .chart(Rate)
        .build()
        .unwrap()
        .calculate(&[4.0, 9.0], &[80.0, 120.0])
        .unwrap();
    let logged = Funnel::<f64>::new()
        .chart(Rate)
        .transform(Log10)
        .build()
        .unwrap()
        .calculate(&[4.0, 9.0], &[80.0, 120.0])
        .unwrap();

    let a = plain.row_at(80.0).unwrap();
    let b = logged.row_at(80.0).unwrap();
    assert_relative_eq!(a.target.log10(), b.target, max_relative = 1e-12);
}

/// Single-precision input works end to end.
#[test]
fn test_f32_inputs() {
    let model: FunnelModel<f32> = Funnel::new().chart(Proportion).build().unwrap();
    let result = model.calculate(&[2.0f32, 5.0], &[9.0f32, 16.0]).unwrap();
    assert!(result.target > 0.0f32 && result.target < 1.0f32);
}

// ============================================================================
// Result Helper Tests
// ============================================================================

/// Extreme units are flagged by their z-scores.
#[test]
fn test_outlier_flagging() {
    let model = Funnel::new()
        .chart(Proportion)
        .od_adjustment(No)
        .build()
        .unwrap();
    // Three consistent units and one far-out unit.
    let result = model
        .calculate(&[20.0, 40.0, 60.0, 40.0], &[100.0, 200.0, 300.0, 100.0])
        .unwrap();

    let flagged = result.outliers(3.0);
    assert_eq!(flagged, vec![3]);
}

/// The formatted result includes the summary and the table header.
#[test]
fn test_display_formatting() {
    let result = proportion_model()
        .calculate(&[3.0, 8.0], &[12.0, 30.0])
        .unwrap();
    let text = format!("{result}");
    assert!(text.contains("Summary:"));
    assert!(text.contains("Control Limits:"));
    assert!(text.contains("Target"));
}
