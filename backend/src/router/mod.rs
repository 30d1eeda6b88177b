//! Smart Router (C10, spec §4.10): picks a settlement rail from the
//! eligible set by one of three scoring strategies.

use thiserror::Error;

use crate::models::rail::SettlementRail;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RoutingStrategy {
    Speed,
    Cost,
    Balanced,
}

#[derive(Debug, Error, PartialEq, Eq)]
#[error("no settlement rail is eligible for {amount_cents} cents")]
pub struct NoRailAvailable {
    pub amount_cents: i64,
}

/// Lower is better for every strategy's score.
fn score(rail: &SettlementRail, strategy: RoutingStrategy) -> f64 {
    match strategy {
        RoutingStrategy::Speed => rail.p99_latency_ms() as f64,
        RoutingStrategy::Cost => rail.cost_per_txn_cents() as f64,
        RoutingStrategy::Balanced => {
            // Normalize both dimensions to roughly comparable scales before
            // combining; latency in ms and cost in cents differ by orders
            // of magnitude, so weight latency down.
            (rail.p99_latency_ms() as f64) * 0.01 + (rail.cost_per_txn_cents() as f64)
        }
    }
}

/// Select the best-scoring rail that is eligible for `amount_cents` at
/// `now`. Ties broken by rail name ascending for determinism.
pub fn select_rail<'a>(
    rails: &'a [SettlementRail],
    amount_cents: i64,
    strategy: RoutingStrategy,
    now: i64,
) -> Result<&'a SettlementRail, NoRailAvailable> {
    rails
        .iter()
        .filter(|r| r.is_eligible_for(amount_cents, now))
        .min_by(|a, b| {
            score(a, strategy)
                .partial_cmp(&score(b, strategy))
                .unwrap()
                .then_with(|| a.name().cmp(b.name()))
        })
        .ok_or(NoRailAvailable { amount_cents })
}
