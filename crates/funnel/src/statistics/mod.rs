//! Layer 4: Statistics
//!
//! # Purpose
//!
//! The funnel-specific statistics on top of the distribution kernels:
//! - Chart-kind formulas: standard errors, targets, variance-stabilised
//!   observations, and control-limit values
//! - Dispersion estimation: Winsorised z-scores and the additive
//!   (random-effects) overdispersion adjustment
//!
//! # Architecture
//!
//! ```text
//! Layer 6: API
//!   ↓
//! Layer 5: Engine
//!   ↓
//! Layer 4: Statistics ← You are here
//!   ↓
//! Layer 3: Distributions
//!   ↓
//! Layer 2: Math
//!   ↓
//! Layer 1: Primitives
//! ```

/// Chart-kind formulas.
pub mod charts;

/// Winsorised dispersion estimation.
pub mod dispersion;
