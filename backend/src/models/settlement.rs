//! Settlement entity: the atomic three-leg transfer record (spec §3, §4.12).

use serde::{Deserialize, Serialize};

use crate::money;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SettlementStatus {
    Pending,
    InProgress,
    Completed,
    Failed,
    RolledBack,
}

/// One leg of a settlement: a single account-to-account movement.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SettlementLeg {
    pub account_id: String,
    pub amount_cents: i64,
    pub timestamp: i64,
    pub txn_id: String,
}

/// Settlement deadline: 5 seconds from acceptance (spec §3, invariant 201).
pub const SETTLEMENT_DEADLINE_SECS: i64 = 5;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settlement {
    id: String,
    invoice_id: String,
    supplier_credit: Option<SettlementLeg>,
    buyer_debit: Option<SettlementLeg>,
    capital_advance: Option<SettlementLeg>,
    started_at: i64,
    completed_at: Option<i64>,
    status: SettlementStatus,
    discount_rate: f64,
    amount_cents: i64,
}

impl Settlement {
    pub fn new(invoice_id: impl Into<String>, amount_cents: i64, discount_rate: f64, started_at: i64) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            invoice_id: invoice_id.into(),
            supplier_credit: None,
            buyer_debit: None,
            capital_advance: None,
            started_at,
            completed_at: None,
            status: SettlementStatus::Pending,
            discount_rate,
            amount_cents,
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }
    pub fn invoice_id(&self) -> &str {
        &self.invoice_id
    }
    pub fn started_at(&self) -> i64 {
        self.started_at
    }
    pub fn completed_at(&self) -> Option<i64> {
        self.completed_at
    }
    pub fn status(&self) -> SettlementStatus {
        self.status
    }
    pub fn discount_rate(&self) -> f64 {
        self.discount_rate
    }
    pub fn amount_cents(&self) -> i64 {
        self.amount_cents
    }
    pub fn supplier_credit(&self) -> Option<&SettlementLeg> {
        self.supplier_credit.as_ref()
    }
    pub fn buyer_debit(&self) -> Option<&SettlementLeg> {
        self.buyer_debit.as_ref()
    }
    pub fn capital_advance(&self) -> Option<&SettlementLeg> {
        self.capital_advance.as_ref()
    }

    /// `amount * (1 + discount_rate)` — what the buyer actually pays.
    pub fn buyer_cost_cents(&self) -> i64 {
        money::plus_rate(self.amount_cents, self.discount_rate)
    }

    pub(crate) fn set_status(&mut self, status: SettlementStatus) {
        self.status = status;
    }

    pub(crate) fn record_supplier_credit(&mut self, leg: SettlementLeg) {
        self.supplier_credit = Some(leg);
    }

    pub(crate) fn record_buyer_debit(&mut self, leg: SettlementLeg) {
        self.buyer_debit = Some(leg);
    }

    pub(crate) fn record_capital_advance(&mut self, leg: SettlementLeg) {
        self.capital_advance = Some(leg);
    }

    pub(crate) fn complete(&mut self, completed_at: i64) {
        self.completed_at = Some(completed_at);
        self.status = SettlementStatus::Completed;
    }

    /// Invariant 102: all three legs present.
    pub fn has_all_legs(&self) -> bool {
        self.supplier_credit.is_some() && self.buyer_debit.is_some() && self.capital_advance.is_some()
    }

    /// Invariant 201: completed within 5s of acceptance.
    pub fn within_deadline(&self) -> bool {
        match self.completed_at {
            Some(completed) => completed - self.started_at < SETTLEMENT_DEADLINE_SECS,
            None => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn buyer_cost_includes_discount() {
        let s = Settlement::new("INV-1", 1_000_000, 0.05, 0);
        assert_eq!(s.buyer_cost_cents(), 1_050_000);
    }

    #[test]
    fn missing_leg_fails_completeness_check() {
        let mut s = Settlement::new("INV-1", 1_000_000, 0.05, 0);
        s.record_supplier_credit(SettlementLeg {
            account_id: "SUP-1".into(),
            amount_cents: 1_000_000,
            timestamp: 0,
            txn_id: "t1".into(),
        });
        assert!(!s.has_all_legs());
    }

    #[test]
    fn deadline_measured_from_started_at() {
        let mut s = Settlement::new("INV-1", 1_000_000, 0.05, 10);
        s.complete(14);
        assert!(s.within_deadline());
        let mut s2 = Settlement::new("INV-1", 1_000_000, 0.05, 10);
        s2.complete(15);
        assert!(!s2.within_deadline());
    }
}
