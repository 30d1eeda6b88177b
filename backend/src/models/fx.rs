//! FX rate entity (spec §3, §4.7).

use serde::{Deserialize, Serialize};

/// Freshness window: 60 seconds (spec §3, invariant 204).
pub const FX_FRESHNESS_SECS: i64 = 60;
/// Spread applied over the mid rate (spec §3).
pub const FX_SPREAD: f64 = 0.005;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FxRate {
    from: String,
    to: String,
    mid_rate: f64,
    fetched_at: i64,
}

impl FxRate {
    pub fn new(from: impl Into<String>, to: impl Into<String>, mid_rate: f64, fetched_at: i64) -> Self {
        Self {
            from: from.into(),
            to: to.into(),
            mid_rate,
            fetched_at,
        }
    }

    pub fn from(&self) -> &str {
        &self.from
    }
    pub fn to(&self) -> &str {
        &self.to
    }
    pub fn mid_rate(&self) -> f64 {
        self.mid_rate
    }
    pub fn fetched_at(&self) -> i64 {
        self.fetched_at
    }

    /// `mid * (1 + spread)`.
    pub fn effective_rate(&self) -> f64 {
        self.mid_rate * (1.0 + FX_SPREAD)
    }

    /// Invariant 204: fresh iff age < 60s.
    pub fn is_fresh_at(&self, now_unix_secs: i64) -> bool {
        now_unix_secs - self.fetched_at < FX_FRESHNESS_SECS
    }
}
