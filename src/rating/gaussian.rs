//! Standard normal helpers and the truncated-Gaussian correction functions
//!
//! `v_*` are the additive (mean shift) corrections and `w_*` the
//! multiplicative (variance reduction) corrections used by the TrueSkill
//! update, evaluated at a standardized performance gap and draw margin.

use std::f64::consts::{PI, SQRT_2};

/// Below this the truncation mass is treated as zero
const MIN_DENOMINATOR: f64 = 2.222_758_749e-162;

/// Complementary error function (Chebyshev fit, fractional error < 1.2e-7)
pub fn erfc(x: f64) -> f64 {
    let z = x.abs();
    let t = 1.0 / (1.0 + z / 2.0);
    let r = t * (-z * z - 1.265_512_23
        + t * (1.000_023_68
            + t * (0.374_091_96
                + t * (0.096_784_18
                    + t * (-0.186_288_06
                        + t * (0.278_868_07
                            + t * (-1.135_203_98
                                + t * (1.488_515_87
                                    + t * (-0.822_152_23 + t * 0.170_872_77)))))))))
        .exp();

    if x < 0.0 {
        2.0 - r
    } else {
        r
    }
}

/// Inverse of `erfc` on (0, 2), refined with two Newton steps
pub fn erfcinv(y: f64) -> f64 {
    if y >= 2.0 {
        return -100.0;
    }
    if y <= 0.0 {
        return 100.0;
    }

    let lower_half = y < 1.0;
    let y = if lower_half { y } else { 2.0 - y };

    let t = (-2.0 * (y / 2.0).ln()).sqrt();
    let mut x = -0.707_11 * ((2.307_53 + t * 0.270_61) / (1.0 + t * (0.992_29 + t * 0.044_81)) - t);

    for _ in 0..2 {
        let err = erfc(x) - y;
        x += err / (1.128_379_167_095_512_57 * (-(x * x)).exp() - x * err);
    }

    if lower_half {
        x
    } else {
        -x
    }
}

/// Standard normal density
pub fn pdf(x: f64) -> f64 {
    (-(x * x) / 2.0).exp() / (2.0 * PI).sqrt()
}

/// Standard normal cumulative distribution
pub fn cdf(x: f64) -> f64 {
    0.5 * erfc(-x / SQRT_2)
}

/// Standard normal quantile function
pub fn ppf(p: f64) -> f64 {
    -SQRT_2 * erfcinv(2.0 * p)
}

/// Mean shift for a decisive result
pub fn v_win(diff: f64, draw_margin: f64) -> f64 {
    let x = diff - draw_margin;
    let denom = cdf(x);
    if denom > MIN_DENOMINATOR {
        pdf(x) / denom
    } else {
        -x
    }
}

/// Variance reduction for a decisive result, kept in [0, 1]
pub fn w_win(diff: f64, draw_margin: f64) -> f64 {
    let x = diff - draw_margin;
    if cdf(x) <= MIN_DENOMINATOR {
        return 1.0;
    }
    let v = v_win(diff, draw_margin);
    (v * (v + x)).clamp(0.0, 1.0)
}

/// Mean shift for a drawn result
pub fn v_draw(diff: f64, draw_margin: f64) -> f64 {
    let abs_diff = diff.abs();
    let a = draw_margin - abs_diff;
    let b = -draw_margin - abs_diff;
    let denom = cdf(a) - cdf(b);
    let numer = pdf(b) - pdf(a);

    let v = if denom > MIN_DENOMINATOR { numer / denom } else { a };
    if diff < 0.0 {
        -v
    } else {
        v
    }
}

/// Variance reduction for a drawn result, kept in [0, 1]
pub fn w_draw(diff: f64, draw_margin: f64) -> f64 {
    let abs_diff = diff.abs();
    let a = draw_margin - abs_diff;
    let b = -draw_margin - abs_diff;
    let denom = cdf(a) - cdf(b);
    if denom <= MIN_DENOMINATOR {
        return 1.0;
    }

    let v = v_draw(abs_diff, draw_margin);
    (v * v + (a * pdf(a) - b * pdf(b)) / denom).clamp(0.0, 1.0)
}

/// Performance gap inside which a match counts as drawn
pub fn draw_margin(draw_probability: f64, beta: f64, total_players: usize) -> f64 {
    if draw_probability <= 0.0 {
        return 0.0;
    }
    ppf((draw_probability + 1.0) / 2.0) * (total_players as f64).sqrt() * beta
}
