//! Tests for the prelude module.
//!
//! These tests verify that the prelude exports everything needed for
//! ordinary use of the funnel API: the builder, the chart kinds, the
//! adjustment policies, the transforms, and the result/error types.
//!
//! ## Test Organization
//!
//! 1. **Import Verification** - All prelude exports are accessible
//! 2. **Builder Pattern** - Complete workflows work with prelude imports

use funnel::prelude::*;

// ============================================================================
// Import Verification Tests
// ============================================================================

/// All prelude imports resolve and a full workflow compiles against them.
#[test]
fn test_prelude_imports() {
    let numerators = vec![3.0, 10.0, 7.0];
    let denominators = vec![20.0, 40.0, 35.0];

    // Chart kinds and policies are importable as bare variants.
    for chart in [Proportion, StandardisedRatio, Rate] {
        for od in [No, Yes, Auto] {
            let model = Funnel::new().chart(chart).od_adjustment(od).build().unwrap();
            let result = model.calculate(&numerators, &denominators).unwrap();
            assert!(!result.limits.is_empty());
        }
    }
}

/// Transforms and the error type are usable without qualification.
#[test]
fn test_prelude_types() {
    for transform in [Identity, Ln, Log10, Sqrt] {
        let model: FunnelModel<f64> = Funnel::new().transform(transform).build().unwrap();
        let _result: FunnelResult<f64> = model.calculate(&[1.0], &[9.0]).unwrap();
    }

    let err: FunnelError = Funnel::<f64>::new()
        .transform(Ln)
        .transform(Sqrt)
        .build()
        .unwrap_err();
    assert!(matches!(err, FunnelError::DuplicateParameter { .. }));

    // Row cells are plain options.
    let model: FunnelModel<f64> = Funnel::new().build().unwrap();
    let result = model.calculate(&[2.0, 3.0], &[8.0, 12.0]).unwrap();
    let row: &LimitRow<f64> = &result.limits[0];
    let _ = row.ul99;
}
