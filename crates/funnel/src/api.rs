//! High-level API for funnel limit calculation.
//!
//! ## Purpose
//!
//! This module provides the primary user-facing entry point. It implements
//! a fluent builder pattern for configuring the chart kind, the
//! overdispersion policy, an optional secondary target, and the display
//! transform, and a model type that runs calculations against data.
//!
//! ## Design notes
//!
//! * **Ergonomic**: Fluent builder with sensible defaults for all
//!   parameters.
//! * **Validated**: Parameters are checked when `build()` is called;
//!   setting the same parameter twice is reported as an error rather than
//!   silently keeping one of the values.
//! * **Type-Safe**: Generic over `Float` input types; computation runs at
//!   double precision internally.
//!
//! ### Configuration Flow
//!
//! 1. Create a [`FunnelBuilder`] via `Funnel::new()`.
//! 2. Chain configuration methods (`.chart()`, `.od_adjustment()`, ...).
//! 3. Call `.build()` for a [`FunnelModel`], then `.calculate()` per
//!    update.

use num_traits::Float;

use crate::engine::executor::{self, ExecutorConfig};
use crate::engine::validator::Validator;

// Publicly re-exported types
pub use crate::engine::output::{FunnelResult, LimitRow, Transform};
pub use crate::primitives::errors::FunnelError;
pub use crate::statistics::charts::{ChartKind, LimitArgs};
pub use crate::statistics::dispersion::{DispersionEstimate, OdAdjustment};

// ============================================================================
// Funnel Builder
// ============================================================================

/// Fluent builder for configuring a funnel limit calculation.
#[derive(Debug, Clone)]
pub struct FunnelBuilder<T> {
    /// Chart kind.
    pub chart: Option<ChartKind>,

    /// Overdispersion-adjustment policy.
    pub od_adjustment: Option<OdAdjustment>,

    /// Secondary reference line.
    pub alt_target: Option<T>,

    /// Display-scale transform.
    pub transform: Option<Transform>,

    /// Tracks if any parameter was set multiple times (for validation).
    #[doc(hidden)]
    pub duplicate_param: Option<&'static str>,
}

impl<T: Float> Default for FunnelBuilder<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Float> FunnelBuilder<T> {
    /// Create a new builder with default settings.
    pub fn new() -> Self {
        Self {
            chart: None,
            od_adjustment: None,
            alt_target: None,
            transform: None,
            duplicate_param: None,
        }
    }

    /// Set the chart kind.
    pub fn chart(mut self, kind: ChartKind) -> Self {
        if self.chart.is_some() {
            self.duplicate_param = Some("chart");
        }
        self.chart = Some(kind);
        self
    }

    /// Set the overdispersion-adjustment policy.
    pub fn od_adjustment(mut self, policy: OdAdjustment) -> Self {
        if self.od_adjustment.is_some() {
            self.duplicate_param = Some("od_adjustment");
        }
        self.od_adjustment = Some(policy);
        self
    }

    /// Set a secondary reference line, drawn alongside the target.
    pub fn alt_target(mut self, value: T) -> Self {
        if self.alt_target.is_some() {
            self.duplicate_param = Some("alt_target");
        }
        self.alt_target = Some(value);
        self
    }

    /// Set the display-scale transform applied to the output table.
    pub fn transform(mut self, transform: Transform) -> Self {
        if self.transform.is_some() {
            self.duplicate_param = Some("transform");
        }
        self.transform = Some(transform);
        self
    }

    // ========================================================================
    // Build Method
    // ========================================================================

    /// Build the model.
    pub fn build(self) -> Result<FunnelModel<T>, FunnelError> {
        // Check for duplicate parameter configuration
        Validator::validate_no_duplicates(self.duplicate_param)?;

        // Validate the secondary target
        if let Some(t) = self.alt_target {
            Validator::validate_scalar(t, "alt_target")?;
        }

        Ok(FunnelModel {
            chart: self.chart.unwrap_or_default(),
            od_adjustment: self.od_adjustment.unwrap_or_default(),
            alt_target: self.alt_target,
            transform: self.transform.unwrap_or_default(),
        })
    }
}

// ============================================================================
// Funnel Model
// ============================================================================

/// Configured funnel model, ready to calculate limit tables.
#[derive(Debug, Clone)]
pub struct FunnelModel<T> {
    chart: ChartKind,
    od_adjustment: OdAdjustment,
    alt_target: Option<T>,
    transform: Transform,
}

impl<T: Float> FunnelModel<T> {
    /// Compute the control-limit table for the provided data.
    ///
    /// The slices are parallel: one numerator and one denominator per unit.
    /// Empty inputs yield an empty, well-formed result.
    pub fn calculate(
        &self,
        numerators: &[T],
        denominators: &[T],
    ) -> Result<FunnelResult<T>, FunnelError> {
        Validator::validate_inputs(numerators, denominators)?;

        let num: Vec<f64> = numerators.iter().map(to_f64).collect();
        let den: Vec<f64> = denominators.iter().map(to_f64).collect();

        let config = ExecutorConfig {
            chart: self.chart,
            od_adjustment: self.od_adjustment,
            alt_target: self.alt_target.as_ref().map(to_f64),
            transform: self.transform,
        };

        let out = executor::run(&config, &num, &den);

        Ok(FunnelResult {
            limits: out
                .rows
                .iter()
                .map(|row| LimitRow {
                    denominator: from_f64(row.denominator),
                    ll99: row.limits[0].map(from_f64::<T>),
                    ll95: row.limits[1].map(from_f64::<T>),
                    ll68: row.limits[2].map(from_f64::<T>),
                    ul68: row.limits[3].map(from_f64::<T>),
                    ul95: row.limits[4].map(from_f64::<T>),
                    ul99: row.limits[5].map(from_f64::<T>),
                    target: from_f64(row.target),
                    alt_target: row.alt_target.map(from_f64::<T>),
                })
                .collect(),
            z_scores: out.z_scores.iter().map(|&z| from_f64(z)).collect(),
            standard_errors: out
                .standard_errors
                .iter()
                .map(|&se| from_f64(se))
                .collect(),
            target: from_f64(out.target),
            target_transformed: from_f64(out.target_transformed),
            alt_target: self.alt_target,
            phi: from_f64(out.phi),
            tau2: from_f64(out.tau2),
            od_applied: out.od_applied,
        })
    }

    /// The configured chart kind.
    pub fn chart(&self) -> ChartKind {
        self.chart
    }

    /// The configured overdispersion policy.
    pub fn od_adjustment(&self) -> OdAdjustment {
        self.od_adjustment
    }
}

// ============================================================================
// Conversions
// ============================================================================

fn to_f64<T: Float>(value: &T) -> f64 {
    value.to_f64().unwrap_or(f64::NAN)
}

fn from_f64<T: Float>(value: f64) -> T {
    T::from(value).unwrap_or_else(T::nan)
}
