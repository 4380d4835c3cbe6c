//! Normal distribution.
//!
//! ## Purpose
//!
//! Density, CDF, and quantile of the normal distribution at double
//! precision across the whole representable range, including the extreme
//! tails in log scale.
//!
//! ## Design notes
//!
//! * **CDF**: Cody's piecewise rational approximation — one rational on
//!   `|z| <= 0.674`, one up to `sqrt(32)` and an asymptotic `1/z^2`
//!   rational beyond, with the truncate-to-sixteenths split keeping the
//!   `exp(-z^2/2)` factor accurate in the far tail.
//! * **Quantile**: Wichura's AS 241 three-region rational minimax, with the
//!   deep-tail region driven by `sqrt(-log(tail))` so that log-scale
//!   probabilities down to the order of `-1e300` remain meaningful.
//! * **Tails**: past `|z|` of about 37.5 the linear-scale CDF is exactly 0
//!   or 1; that is the double-precision limit, not a defect. Log scale
//!   keeps going.

use crate::distributions::dpq::{d_one, d_zero, dt_one, dt_qiv, dt_zero, q_boundaries};
use crate::math::ieee::trunc_to_sixteenth;

/// `1 / sqrt(2 pi)`
const M_1_SQRT_2PI: f64 = 0.398942280401432677939946059934;

/// `log(sqrt(2 pi))`
const M_LN_SQRT_2PI: f64 = 0.918938533204672741780329736406;

// ============================================================================
// Density
// ============================================================================

/// Normal density.
///
/// Invalid `sd < 0` returns NaN; `sd == 0` is the point mass at `mean`.
pub fn density(x: f64, mean: f64, sd: f64, give_log: bool) -> f64 {
    if x.is_nan() || mean.is_nan() || sd.is_nan() {
        return f64::NAN;
    }
    if sd < 0.0 {
        return f64::NAN;
    }
    if sd == 0.0 {
        return if x == mean {
            f64::INFINITY
        } else if give_log {
            f64::NEG_INFINITY
        } else {
            0.0
        };
    }

    let z = ((x - mean) / sd).abs();
    if !z.is_finite() {
        return if give_log { f64::NEG_INFINITY } else { 0.0 };
    }

    if give_log {
        return -(M_LN_SQRT_2PI + 0.5 * z * z + sd.ln());
    }

    if z < 5.0 {
        return M_1_SQRT_2PI * (-0.5 * z * z).exp() / sd;
    }

    // Far tail: below this the density underflows to zero outright.
    if z > 38.58 {
        return 0.0;
    }

    // Split z into an exactly-squarable high part and a residual so the two
    // exponentials keep the digits a single squaring would lose.
    let z1 = trunc_to_sixteenth(z);
    let z2 = z - z1;
    M_1_SQRT_2PI / sd * ((-0.5 * z1 * z1).exp() * ((-0.5 * z2 - z1) * z2).exp())
}

// ============================================================================
// CDF
// ============================================================================

// Rational coefficients on |z| <= 0.67448975.
const A: [f64; 5] = [
    2.2352520354606839287,
    161.02823106855587881,
    1067.6894854603709582,
    18154.981253343561249,
    0.065682337918207449113,
];
const B: [f64; 4] = [
    47.20258190468824187,
    976.09855173777669322,
    10260.932208618978205,
    45507.789335026729956,
];

// Rational coefficients on 0.67448975 < |z| <= sqrt(32).
const C: [f64; 9] = [
    0.39894151208813466764,
    8.8831497943883759412,
    93.506656132177855979,
    597.27027639480026226,
    2494.5375852903726711,
    6848.1904505362823326,
    16003.184846516838186,
    28288.233532893660174,
    7.7105849500132443926e-20,
];
const D: [f64; 8] = [
    22.266688044328115691,
    235.38790178262499861,
    1519.377599407554805,
    6485.558298266760755,
    18615.571640885098091,
    34900.952721145977266,
    38912.003286093271411,
    19685.429676859990727,
];

// Asymptotic rational coefficients beyond sqrt(32).
const P: [f64; 6] = [
    0.21589853405795699,
    0.1274011611602473639,
    0.022235277870649807,
    0.001421619193227893466,
    2.9112874951168792e-5,
    0.02307344176494017303,
];
const Q: [f64; 5] = [
    1.28426009614491121,
    0.468238212480865118,
    0.0659881378689285515,
    0.00378239633202758244,
    7.29751555083966205e-5,
];

/// Normal CDF.
///
/// Invalid `sd < 0` returns NaN. With `lower_tail = false` the upper tail
/// is computed directly (not as a complement), and with `log_p = true` the
/// result is the log probability, finite far beyond the linear underflow
/// point.
pub fn cdf(x: f64, mean: f64, sd: f64, lower_tail: bool, log_p: bool) -> f64 {
    if x.is_nan() || mean.is_nan() || sd.is_nan() {
        return f64::NAN;
    }
    if sd < 0.0 {
        return f64::NAN;
    }
    if sd == 0.0 {
        // Point mass: a step at mean.
        return if x < mean {
            dt_zero(lower_tail, log_p)
        } else {
            dt_one(lower_tail, log_p)
        };
    }

    let z = (x - mean) / sd;
    if !z.is_finite() {
        // x infinitely far into one tail (or an inf - inf indeterminate).
        if z.is_nan() {
            return f64::NAN;
        }
        return if z < 0.0 {
            dt_zero(lower_tail, log_p)
        } else {
            dt_one(lower_tail, log_p)
        };
    }

    let (cum, ccum) = cdf_both(z, log_p);
    if lower_tail {
        cum
    } else {
        ccum
    }
}

/// Evaluate both tails at once, in the requested scale.
fn cdf_both(x: f64, log_p: bool) -> (f64, f64) {
    let eps = f64::EPSILON * 0.5;
    let y = x.abs();

    if y <= 0.67448975 {
        // qnorm(3/4): the central region.
        let (xnum, xden) = if y > eps {
            let xsq = x * x;
            let mut xnum = A[4] * xsq;
            let mut xden = xsq;
            for i in 0..3 {
                xnum = (xnum + A[i]) * xsq;
                xden = (xden + B[i]) * xsq;
            }
            (xnum, xden)
        } else {
            (0.0, 0.0)
        };

        let temp = x * (xnum + A[3]) / (xden + B[3]);
        let cum = 0.5 + temp;
        let ccum = 0.5 - temp;
        if log_p {
            return (cum.ln(), ccum.ln());
        }
        return (cum, ccum);
    }

    if y <= 5.656854249492380195206754896838 {
        // sqrt(32): the moderate tail.
        let mut xnum = C[8] * y;
        let mut xden = y;
        for i in 0..7 {
            xnum = (xnum + C[i]) * y;
            xden = (xden + D[i]) * y;
        }
        let temp = (xnum + C[7]) / (xden + D[7]);
        return tail_assemble(x, y, temp, log_p);
    }

    // Beyond sqrt(32): asymptotic region, or saturation.
    let log_reachable = log_p && y < 1e170;
    let linear_lower_reachable = -37.5193 < x && x < 8.2924;
    let linear_upper_reachable = -8.2924 < x && x < 37.5193;

    if log_reachable || linear_lower_reachable || linear_upper_reachable {
        let xsq = 1.0 / (x * x);
        let mut xnum = P[5] * xsq;
        let mut xden = xsq;
        for i in 0..4 {
            xnum = (xnum + P[i]) * xsq;
            xden = (xden + Q[i]) * xsq;
        }
        let mut temp = xsq * (xnum + P[4]) / (xden + Q[4]);
        temp = (M_1_SQRT_2PI - temp) / y;
        return tail_assemble(x, y, temp, log_p);
    }

    // Saturated: exactly 0 / 1 (or their logs).
    if x > 0.0 {
        (d_one(log_p), d_zero(log_p))
    } else {
        (d_zero(log_p), d_one(log_p))
    }
}

/// Combine the rational factor with the two-part exponential and orient the
/// tails (the rational approximations compute the smaller tail for `|x|`).
fn tail_assemble(x: f64, y: f64, temp: f64, log_p: bool) -> (f64, f64) {
    let xsq = trunc_to_sixteenth(y);
    let del = (y - xsq) * (y + xsq);

    let (cum, ccum);
    if log_p {
        let lower = -xsq * xsq * 0.5 - del * 0.5 + temp.ln();
        let other = {
            let linear = (-xsq * xsq * 0.5).exp() * (-del * 0.5).exp() * temp;
            (-linear).ln_1p()
        };
        cum = lower;
        ccum = other;
    } else {
        cum = (-xsq * xsq * 0.5).exp() * (-del * 0.5).exp() * temp;
        ccum = 1.0 - cum;
    }

    if x > 0.0 {
        (ccum, cum)
    } else {
        (cum, ccum)
    }
}

// ============================================================================
// Quantile
// ============================================================================

/// Normal quantile (inverse CDF), AS 241.
///
/// Boundary contract: probability 0 maps to `-inf`, probability 1 to
/// `+inf` (lower tail); probabilities outside `[0, 1]` (or above 0 in log
/// scale) return NaN. Accurate to the full double range, including
/// log-scale probabilities near `-1e300`.
pub fn quantile(p: f64, mean: f64, sd: f64, lower_tail: bool, log_p: bool) -> f64 {
    if p.is_nan() || mean.is_nan() || sd.is_nan() {
        return f64::NAN;
    }

    if let Some(b) = q_boundaries(p, f64::NEG_INFINITY, f64::INFINITY, lower_tail, log_p) {
        return b;
    }

    if sd < 0.0 {
        return f64::NAN;
    }
    if sd == 0.0 {
        return mean;
    }

    let p_ = dt_qiv(p, lower_tail, log_p);
    let q = p_ - 0.5;

    let val = if q.abs() <= 0.425 {
        // Central region.
        let r = 0.180625 - q * q;
        q * (((((((r * 2509.0809287301226727 + 33430.575583588128105) * r
            + 67265.770927008700853)
            * r
            + 45921.953931549871457)
            * r
            + 13731.693765509461125)
            * r
            + 1971.5909503065514427)
            * r
            + 133.14166789178437745)
            * r
            + 3.387132872796366608)
            / (((((((r * 5226.495278852545703 + 28729.085735721942674) * r
                + 39307.89580009271061)
                * r
                + 21213.794301586595867)
                * r
                + 5394.1960214247511077)
                * r
                + 687.1870074920579083)
                * r
                + 42.313330701600911252)
                * r
                + 1.0)
    } else {
        // Tail regions, driven by r = sqrt(-log(min tail prob)). When the
        // requested tail is already in log scale, use it directly: this is
        // what keeps precision for probabilities like exp(-1e5).
        let log_tail_direct =
            log_p && ((lower_tail && q <= 0.0) || (!lower_tail && q > 0.0));
        let r0 = if log_tail_direct {
            p
        } else {
            let tail = if q < 0.0 { p_ } else { 0.5 - p_ + 0.5 };
            tail.ln()
        };
        let mut r = (-r0).sqrt();

        let mut val = if r <= 5.0 {
            r -= 1.6;
            (((((((r * 7.7454501427834140764e-4 + 0.0227238449892691845833) * r
                + 0.24178072517745061177)
                * r
                + 1.27045825245236838258)
                * r
                + 3.64784832476320460504)
                * r
                + 5.7694972214606914055)
                * r
                + 4.6303378461565452959)
                * r
                + 1.42343711074968357734)
                / (((((((r * 1.05075007164441684324e-9 + 5.475938084995344946e-4) * r
                    + 0.0151986665636164571966)
                    * r
                    + 0.14810397642748007459)
                    * r
                    + 0.68976733498510000455)
                    * r
                    + 1.6763848301838038494)
                    * r
                    + 2.05319162663775882187)
                    * r
                    + 1.0)
        } else {
            // Deep tail.
            r -= 5.0;
            (((((((r * 2.01033439929228813265e-7 + 2.71155556874348757815e-5) * r
                + 0.0012426609473880784386)
                * r
                + 0.026532189526576123093)
                * r
                + 0.29656057182850489123)
                * r
                + 1.7848265399172913358)
                * r
                + 5.4637849111641143699)
                * r
                + 6.6579046435011037772)
                / (((((((r * 2.04426310338993978564e-15 + 1.4215117583164458887e-7) * r
                    + 1.8463183175100546818e-5)
                    * r
                    + 7.868691311456132591e-4)
                    * r
                    + 0.0148753612908506148525)
                    * r
                    + 0.13692988092273580531)
                    * r
                    + 0.59983220655588793769)
                    * r
                    + 1.0)
        };

        if q < 0.0 {
            val = -val;
        }
        val
    };

    mean + sd * val
}
