//! # funnel — control-limit statistics for funnel plots
//!
//! Funnel plots are control charts for institutional comparison: each unit
//! (a hospital, a surgeon, a laboratory) contributes a numerator and a
//! denominator, and the chart draws the unit's indicator value against its
//! denominator together with control limits that fan in as the denominator
//! grows. This crate computes those limits.
//!
//! ## What it provides
//!
//! * Reference-precision distribution kernels (normal, gamma, chi-squared:
//!   density, CDF, quantile, with `lower_tail` / `log_p` conventions) in
//!   [`distributions`].
//! * Three chart kinds: proportions, indirectly standardised ratios, and
//!   rates, each with its own standard-error, target, and limit formulas.
//! * Winsorised z-score dispersion estimation and a DerSimonian–Laird style
//!   additive overdispersion adjustment.
//! * A limit table over a smooth denominator sweep, with non-monotonic
//!   segments suppressed.
//!
//! ## Quick Start
//!
//! ```rust
//! use funnel::prelude::*;
//!
//! let numerators = vec![3.0, 10.0, 7.0, 22.0];
//! let denominators = vec![20.0, 40.0, 35.0, 80.0];
//!
//! // Build the model
//! let model = Funnel::new()
//!     .chart(Proportion)       // proportion chart (numerator / denominator)
//!     .od_adjustment(Auto)     // adjust limits only if overdispersion is detected
//!     .build()?;
//!
//! // Compute the limit table
//! let result = model.calculate(&numerators, &denominators)?;
//!
//! assert!(result.target > 0.0 && result.target < 1.0);
//! assert_eq!(result.z_scores.len(), numerators.len());
//! # Result::<(), FunnelError>::Ok(())
//! ```
//!
//! ## Result and Error Handling
//!
//! `calculate` returns `Result<FunnelResult<T>, FunnelError>`. Structural
//! problems (mismatched input lengths, non-finite members, invalid builder
//! parameters) are reported as errors; statistical edge cases are not.
//! Empty inputs yield an empty, well-formed table, and invalid distribution
//! parameters inside the kernels produce NaN values that propagate
//! arithmetically — never a panic and never an `Err`.
//!
//! ```rust
//! use funnel::prelude::*;
//!
//! let model = Funnel::new().chart(Rate).build()?;
//!
//! match model.calculate(&[5.0, 8.0], &[120.0, 90.0]) {
//!     Ok(result) => println!("{}", result),
//!     Err(e) => eprintln!("calculation failed: {}", e),
//! }
//! # Result::<(), FunnelError>::Ok(())
//! ```
//!
//! ## References
//!
//! * Spiegelhalter, D. J. (2005). "Funnel plots for comparing institutional
//!   performance"
//! * DerSimonian, R. and Laird, N. (1986). "Meta-analysis in clinical trials"

// Layer 1: Primitives - errors and sweep utilities.
mod primitives;

// Layer 2: Math - special-function building blocks.
mod math;

// Layer 3: Distributions - normal/gamma/chi-squared kernels.
pub mod distributions;

// Layer 4: Statistics - chart-kind formulas and dispersion estimation.
mod statistics;

// Layer 5: Engine - validation, orchestration, and output assembly.
mod engine;

// High-level fluent API for funnel limit calculation.
mod api;

// Standard funnel prelude.
pub mod prelude {
    pub use crate::api::{
        ChartKind,
        ChartKind::{Proportion, Rate, StandardisedRatio},
        FunnelBuilder as Funnel, FunnelError, FunnelModel, FunnelResult, LimitRow, OdAdjustment,
        OdAdjustment::{Auto, No, Yes},
        Transform,
        Transform::{Identity, Ln, Log10, Sqrt},
    };
}

// Internal modules for development and testing.
//
// This module re-exports internal modules for development and testing
// purposes. It is only available with the `dev` feature enabled.
#[cfg(feature = "dev")]
pub mod internals {
    pub mod primitives {
        pub use crate::primitives::*;
    }
    pub mod math {
        pub use crate::math::*;
    }
    pub mod statistics {
        pub use crate::statistics::*;
    }
    pub mod engine {
        pub use crate::engine::*;
    }
    pub mod api {
        pub use crate::api::*;
    }
}
