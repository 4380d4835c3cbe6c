//! Layer 3: Distributions
//!
//! # Purpose
//!
//! Reference-precision kernels for the distributions the funnel limits are
//! built from:
//! - Normal: density, CDF (Cody's piecewise rational), quantile (AS 241)
//! - Gamma: density, CDF (series / continued fraction / asymptotic),
//!   quantile (AS 91 start + Newton refinement)
//! - Chi-squared: the gamma reparameterisation `shape = df/2, scale = 2`
//!
//! # Conventions
//!
//! Every CDF and quantile takes `lower_tail` and `log_p` flags, covering the
//! four combinations of tail and scale; log-scale results stay finite far
//! beyond the point where linear-scale probabilities underflow. Densities
//! take a `give_log` flag.
//!
//! Domain errors (negative standard deviation, shape, or scale;
//! probabilities outside their valid range) return NaN rather than
//! panicking, so element-wise use over arrays needs no per-element error
//! handling. NaN inputs propagate to NaN outputs.
//!
//! # Architecture
//!
//! ```text
//! Layer 6: API
//!   ↓
//! Layer 5: Engine
//!   ↓
//! Layer 4: Statistics
//!   ↓
//! Layer 3: Distributions ← You are here
//!   ↓
//! Layer 2: Math
//!   ↓
//! Layer 1: Primitives
//! ```

/// Chi-squared distribution.
pub mod chi_squared;

/// Gamma distribution.
pub mod gamma;

/// Normal distribution.
pub mod normal;

pub(crate) mod dpq;
