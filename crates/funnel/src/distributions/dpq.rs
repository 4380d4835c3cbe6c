//! Tail/scale bookkeeping shared by the distribution kernels.
//!
//! Probabilities move through the kernels in one of four representations
//! (lower or upper tail, linear or log scale). These helpers centralise the
//! conversions so each kernel reads like its reference algorithm.

use crate::math::logexp::log1m_exp;

/// Probability 0 in the requested representation.
pub fn d_zero(log_p: bool) -> f64 {
    if log_p {
        f64::NEG_INFINITY
    } else {
        0.0
    }
}

/// Probability 1 in the requested representation.
pub fn d_one(log_p: bool) -> f64 {
    if log_p {
        0.0
    } else {
        1.0
    }
}

/// Lower-tail probability 0 respecting the tail flag.
pub fn dt_zero(lower_tail: bool, log_p: bool) -> f64 {
    if lower_tail {
        d_zero(log_p)
    } else {
        d_one(log_p)
    }
}

/// Lower-tail probability 1 respecting the tail flag.
pub fn dt_one(lower_tail: bool, log_p: bool) -> f64 {
    if lower_tail {
        d_one(log_p)
    } else {
        d_zero(log_p)
    }
}

/// `exp(x)` in the requested representation (identity in log scale).
pub fn d_exp(x: f64, log_p: bool) -> f64 {
    if log_p {
        x
    } else {
        x.exp()
    }
}

/// Recover the linear lower-tail probability from any representation.
pub fn dt_qiv(p: f64, lower_tail: bool, log_p: bool) -> f64 {
    if log_p {
        if lower_tail {
            p.exp()
        } else {
            -p.exp_m1()
        }
    } else if lower_tail {
        p
    } else {
        0.5 - p + 0.5
    }
}

/// `log` of the lower-tail probability from any representation.
pub fn dt_log(p: f64, lower_tail: bool, log_p: bool) -> f64 {
    if lower_tail {
        if log_p {
            p
        } else {
            p.ln()
        }
    } else if log_p {
        log1m_exp(p)
    } else {
        (-p).ln_1p()
    }
}

/// `log` of the upper-tail probability from any representation.
pub fn dt_clog(p: f64, lower_tail: bool, log_p: bool) -> f64 {
    dt_log(p, !lower_tail, log_p)
}

/// Shared boundary handling for quantile functions: returns `Some(bound)`
/// when `p` sits on a boundary of its representation, `Some(NaN)` when `p`
/// is outside it, `None` otherwise.
pub fn q_boundaries(
    p: f64,
    left: f64,
    right: f64,
    lower_tail: bool,
    log_p: bool,
) -> Option<f64> {
    if log_p {
        if p > 0.0 {
            return Some(f64::NAN);
        }
        if p == 0.0 {
            return Some(if lower_tail { right } else { left });
        }
        if p == f64::NEG_INFINITY {
            return Some(if lower_tail { left } else { right });
        }
    } else {
        if !(0.0..=1.0).contains(&p) {
            return Some(f64::NAN);
        }
        if p == 0.0 {
            return Some(if lower_tail { left } else { right });
        }
        if p == 1.0 {
            return Some(if lower_tail { right } else { left });
        }
    }
    None
}
