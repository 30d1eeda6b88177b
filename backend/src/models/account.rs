//! Account entity: suppliers, buyers, and capital providers all hold one
//! (spec §3). Balance mutation lives in `crate::balance::AccountLedger`;
//! this type is the record, mirroring the split the teacher keeps between
//! `Agent` (balance mutation) — here we additionally carry compliance
//! status since accounts, not a separate service, own it in this spec.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AccountStatus {
    Active,
    Suspended,
    Frozen,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum KycStatus {
    Verified,
    Pending,
    Rejected,
}

/// A supplier, buyer, or capital-provider settlement account.
///
/// `credit_limit`/`outstanding_balance` are meaningful for buyer accounts
/// only (invariant 005); suppliers and capital providers leave them at 0.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Account {
    id: String,
    status: AccountStatus,
    kyc_status: KycStatus,
    balance_cents: i64,
    credit_limit_cents: i64,
    outstanding_balance_cents: i64,
    sanctioned: bool,
}

impl Account {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            status: AccountStatus::Active,
            kyc_status: KycStatus::Pending,
            balance_cents: 0,
            credit_limit_cents: 0,
            outstanding_balance_cents: 0,
            sanctioned: false,
        }
    }

    pub fn with_status(mut self, status: AccountStatus) -> Self {
        self.status = status;
        self
    }

    pub fn with_kyc(mut self, status: KycStatus) -> Self {
        self.kyc_status = status;
        self
    }

    pub fn with_balance(mut self, balance_cents: i64) -> Self {
        self.balance_cents = balance_cents;
        self
    }

    pub fn with_credit_limit(mut self, credit_limit_cents: i64) -> Self {
        self.credit_limit_cents = credit_limit_cents;
        self
    }

    pub fn sanctioned(mut self) -> Self {
        self.sanctioned = true;
        self
    }

    pub fn id(&self) -> &str {
        &self.id
    }
    pub fn status(&self) -> AccountStatus {
        self.status
    }
    pub fn kyc_status(&self) -> KycStatus {
        self.kyc_status
    }
    pub fn balance_cents(&self) -> i64 {
        self.balance_cents
    }
    pub fn credit_limit_cents(&self) -> i64 {
        self.credit_limit_cents
    }
    pub fn outstanding_balance_cents(&self) -> i64 {
        self.outstanding_balance_cents
    }
    pub fn is_sanctioned(&self) -> bool {
        self.sanctioned
    }

    pub fn is_active(&self) -> bool {
        matches!(self.status, AccountStatus::Active)
    }

    pub fn is_kyc_verified(&self) -> bool {
        matches!(self.kyc_status, KycStatus::Verified)
    }

    /// Invariant 005: `outstanding_balance + new <= credit_limit`.
    pub fn credit_headroom_ok(&self, new_amount_cents: i64) -> bool {
        self.outstanding_balance_cents + new_amount_cents <= self.credit_limit_cents
    }

    pub(crate) fn set_balance(&mut self, balance_cents: i64) {
        self.balance_cents = balance_cents;
    }

    pub(crate) fn set_outstanding_balance(&mut self, outstanding_cents: i64) {
        self.outstanding_balance_cents = outstanding_cents;
    }

    pub(crate) fn set_status(&mut self, status: AccountStatus) {
        self.status = status;
    }

    pub(crate) fn set_sanctioned(&mut self, sanctioned: bool) {
        self.sanctioned = sanctioned;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_account_is_active_pending_kyc() {
        let acct = Account::new("BUY-001");
        assert!(acct.is_active());
        assert!(!acct.is_kyc_verified());
        assert!(!acct.is_sanctioned());
    }

    #[test]
    fn credit_headroom_respects_limit() {
        let acct = Account::new("BUY-001").with_credit_limit(100_000_00);
        assert!(acct.credit_headroom_ok(100_000_00));
        assert!(!acct.credit_headroom_ok(100_000_01));
    }
}
