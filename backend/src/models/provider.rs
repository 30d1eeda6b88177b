//! Capital provider entity (spec §3, §4.9).

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use super::terms::Terms;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RiskAppetite {
    Low,
    Medium,
    High,
}

impl RiskAppetite {
    /// Base discount rate before jitter (spec §4.9).
    pub fn base_rate(self) -> f64 {
        match self {
            RiskAppetite::Low => 0.04,
            RiskAppetite::Medium => 0.06,
            RiskAppetite::High => 0.09,
        }
    }
}

/// A working-capital provider competing in the auction.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CapitalProvider {
    id: String,
    available_liquidity_cents: i64,
    min_deal_size_cents: i64,
    max_deal_size_cents: i64,
    preferred_terms: HashSet<Terms>,
    risk_appetite: RiskAppetite,
}

impl CapitalProvider {
    pub fn new(
        id: impl Into<String>,
        available_liquidity_cents: i64,
        min_deal_size_cents: i64,
        max_deal_size_cents: i64,
        preferred_terms: HashSet<Terms>,
        risk_appetite: RiskAppetite,
    ) -> Self {
        Self {
            id: id.into(),
            available_liquidity_cents,
            min_deal_size_cents,
            max_deal_size_cents,
            preferred_terms,
            risk_appetite,
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }
    pub fn available_liquidity_cents(&self) -> i64 {
        self.available_liquidity_cents
    }
    pub fn risk_appetite(&self) -> RiskAppetite {
        self.risk_appetite
    }

    /// Eligibility to bid on an invoice (spec §4.9):
    /// `liquidity >= amount AND min_size <= amount <= max_size AND terms in preferred_terms`.
    pub fn is_eligible(&self, amount_cents: i64, terms: Terms) -> bool {
        self.available_liquidity_cents >= amount_cents
            && self.min_deal_size_cents <= amount_cents
            && amount_cents <= self.max_deal_size_cents
            && self.preferred_terms.contains(&terms)
    }

    /// Invariant 503: liquidity reserved at bid time — the settlement
    /// engine's Leg 1 debit (principal advanced to the supplier).
    pub(crate) fn reserve_liquidity(&mut self, amount_cents: i64) {
        self.available_liquidity_cents -= amount_cents;
    }

    /// Settlement Leg 2's credit: the buyer's repayment (principal plus
    /// discount) lands back on the provider's liquidity.
    pub(crate) fn credit_liquidity(&mut self, amount_cents: i64) {
        self.available_liquidity_cents += amount_cents;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn provider() -> CapitalProvider {
        let mut terms = HashSet::new();
        terms.insert(Terms::new(30).unwrap());
        CapitalProvider::new("PROV-1", 1_000_000_00, 1_000_00, 2_000_000_00, terms, RiskAppetite::Low)
    }

    #[test]
    fn eligibility_checks_all_dimensions() {
        let p = provider();
        assert!(p.is_eligible(50_000_00, Terms::new(30).unwrap()));
        assert!(!p.is_eligible(50_000_00, Terms::new(45).unwrap())); // wrong terms
        assert!(!p.is_eligible(3_000_000_00, Terms::new(30).unwrap())); // too big
    }

    #[test]
    fn reserving_liquidity_reduces_availability() {
        let mut p = provider();
        p.reserve_liquidity(100_00);
        assert_eq!(p.available_liquidity_cents(), 1_000_000_00 - 100_00);
    }

    #[test]
    fn crediting_liquidity_increases_availability() {
        let mut p = provider();
        p.reserve_liquidity(100_00);
        p.credit_liquidity(105_00);
        assert_eq!(p.available_liquidity_cents(), 1_000_000_00 - 100_00 + 105_00);
    }
}
