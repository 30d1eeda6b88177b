//! Fixed-point money: every amount in this crate is `i64` cents.
//!
//! CRITICAL (carried from the teacher's `models::transaction` convention):
//! all monetary values are `i64` cents, never floating point. Comparisons
//! that spec.md states "within 0.01" are expressed here as integer-cent
//! tolerance so they're exact, not approximate.

/// Tolerance used throughout the invariant catalog ("within 0.01").
pub const TOLERANCE_CENTS: i64 = 1;

/// `a` and `b` agree to within the spec's 0.01 tolerance.
pub fn approx_eq(a: i64, b: i64) -> bool {
    (a - b).abs() <= TOLERANCE_CENTS
}

/// Prorate an APR over a term in days: `apr * terms_days / 365`, rounded to
/// the nearest basis point (1e-4) before being applied to an amount. Returns
/// the rate as a fraction (e.g. `0.0041` for 30-day terms at 5% APR).
pub fn prorate_apr(apr: f64, terms_days: u32) -> f64 {
    let prorated = apr * (terms_days as f64) / 365.0;
    (prorated * 10_000.0).round() / 10_000.0
}

/// Apply a fractional rate to a cents amount, rounding half away from zero.
pub fn apply_rate(amount_cents: i64, rate: f64) -> i64 {
    let scaled = amount_cents as f64 * rate;
    scaled.round() as i64
}

/// `amount * (1 + rate)`, in cents.
pub fn plus_rate(amount_cents: i64, rate: f64) -> i64 {
    amount_cents + apply_rate(amount_cents, rate)
}
