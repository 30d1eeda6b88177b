//! Settlement rail entity (spec §3, §4.10, §4.11).

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RailStatus {
    Up,
    Degraded,
    Down,
}

/// A settlement network (e.g. a real-time payments rail), described by the
/// metrics the smart router scores against.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SettlementRail {
    name: String,
    p50_latency_ms: u32,
    p99_latency_ms: u32,
    success_rate: f64,
    cost_per_txn_cents: i64,
    daily_limit_cents: i64,
    current_volume_cents: i64,
    status: RailStatus,
    last_health_check: i64,
}

impl SettlementRail {
    pub fn new(
        name: impl Into<String>,
        p50_latency_ms: u32,
        p99_latency_ms: u32,
        success_rate: f64,
        cost_per_txn_cents: i64,
        daily_limit_cents: i64,
    ) -> Self {
        Self {
            name: name.into(),
            p50_latency_ms,
            p99_latency_ms,
            success_rate,
            cost_per_txn_cents,
            daily_limit_cents,
            current_volume_cents: 0,
            status: RailStatus::Up,
            last_health_check: 0,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }
    pub fn p50_latency_ms(&self) -> u32 {
        self.p50_latency_ms
    }
    pub fn p99_latency_ms(&self) -> u32 {
        self.p99_latency_ms
    }
    pub fn success_rate(&self) -> f64 {
        self.success_rate
    }
    pub fn cost_per_txn_cents(&self) -> i64 {
        self.cost_per_txn_cents
    }
    pub fn daily_limit_cents(&self) -> i64 {
        self.daily_limit_cents
    }
    pub fn current_volume_cents(&self) -> i64 {
        self.current_volume_cents
    }
    pub fn status(&self) -> RailStatus {
        self.status
    }
    pub fn last_health_check(&self) -> i64 {
        self.last_health_check
    }

    /// Record a health check at `now` (invariant 206).
    pub fn record_health_check(&mut self, now_unix_secs: i64, status: RailStatus) {
        self.last_health_check = now_unix_secs;
        self.status = status;
    }

    /// Invariant 206: health-checked within the last 30s and UP.
    pub fn is_healthy_at(&self, now_unix_secs: i64) -> bool {
        matches!(self.status, RailStatus::Up) && now_unix_secs - self.last_health_check < 30
    }

    /// Capacity + success-rate eligibility (spec §3, §4.10).
    pub fn is_eligible_for(&self, amount_cents: i64, now_unix_secs: i64) -> bool {
        self.is_healthy_at(now_unix_secs)
            && self.current_volume_cents + amount_cents <= self.daily_limit_cents
            && self.success_rate > 0.95
    }

    pub(crate) fn add_volume(&mut self, amount_cents: i64) {
        self.current_volume_cents += amount_cents;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn health_check_must_be_recent() {
        let mut rail = SettlementRail::new("RTP", 500, 900, 0.99, 10, 1_000_000_00);
        rail.record_health_check(0, RailStatus::Up);
        assert!(rail.is_healthy_at(29));
        assert!(!rail.is_healthy_at(30));
    }

    #[test]
    fn eligibility_requires_capacity_and_success_rate() {
        let mut rail = SettlementRail::new("RTP", 500, 900, 0.90, 10, 100);
        rail.record_health_check(0, RailStatus::Up);
        assert!(!rail.is_eligible_for(50, 0)); // success_rate too low
        let mut rail = SettlementRail::new("RTP", 500, 900, 0.99, 10, 100);
        rail.record_health_check(0, RailStatus::Up);
        assert!(rail.is_eligible_for(50, 0));
        assert!(!rail.is_eligible_for(101, 0));
    }
}
