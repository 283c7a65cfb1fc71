//! Small numeric helpers used throughout the workspace.

/// Remainder of floored division, i.e. `a - n * floor(a / n)`.
///
/// Unlike `%`, the result is always in `[0, n)` for negative `a`, which is
/// what longitude wrapping needs.
pub fn floor_mod(a: f64, n: f64) -> f64 {
    let f = a - n * (a / n).floor();
    // When a is extremely close to a multiple of n, f can round to exactly n,
    // which is outside the required [0, n) range.
    if f == n {
        0.0
    } else {
        f
    }
}

/// Clamp `x` to the range `[low, high]`.
pub fn clamp(x: f64, low: f64, high: f64) -> f64 {
    x.max(low).min(high)
}

/// Fraction of `[low, high]` covered by `x`, after clamping `x` to the range.
///
/// Given bounds `[10, 20]`, returns 1.0 for x >= 20, 0.5 for x = 15 and 0.0
/// for x <= 10.
pub fn proportion(x: f64, low: f64, high: f64) -> f64 {
    (clamp(x, low, high) - low) / (high - low)
}
