//! Balance and Rails Adapter (C11, spec §4.11): account balance mutation
//! and rail volume bookkeeping, plus the `RailTransport` port through
//! which an actual transfer is dispatched to an external rail.

use std::collections::HashMap;

use thiserror::Error;

use crate::models::account::{Account, AccountStatus};
use crate::models::rail::SettlementRail;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum BalanceError {
    #[error("no account {0}")]
    NotFound(String),
    #[error("account {id} would go negative: balance {balance} - debit {amount}")]
    InsufficientFunds { id: String, balance: i64, amount: i64 },
    #[error("account {id} would exceed its credit limit")]
    CreditLimitExceeded { id: String },
}

/// In-memory ledger of every account, `Clone` so the enforcement kernel can
/// snapshot it before a mutation and restore it on rollback.
#[derive(Debug, Clone, Default, serde::Serialize)]
pub struct AccountLedger {
    accounts: HashMap<String, Account>,
}

impl AccountLedger {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, account: Account) {
        self.accounts.insert(account.id().to_string(), account);
    }

    pub fn get(&self, id: &str) -> Option<&Account> {
        self.accounts.get(id)
    }

    pub fn credit(&mut self, id: &str, amount_cents: i64) -> Result<(), BalanceError> {
        let account = self.accounts.get_mut(id).ok_or_else(|| BalanceError::NotFound(id.to_string()))?;
        account.set_balance(account.balance_cents() + amount_cents);
        Ok(())
    }

    pub fn debit(&mut self, id: &str, amount_cents: i64) -> Result<(), BalanceError> {
        let account = self.accounts.get_mut(id).ok_or_else(|| BalanceError::NotFound(id.to_string()))?;
        let new_balance = account.balance_cents() - amount_cents;
        if new_balance < -account.credit_limit_cents() {
            return Err(BalanceError::InsufficientFunds {
                id: id.to_string(),
                balance: account.balance_cents(),
                amount: amount_cents,
            });
        }
        account.set_balance(new_balance);
        Ok(())
    }

    /// Book a new outstanding-balance figure for `id` directly — used by
    /// the settlement engine when an obligation is recorded without an
    /// immediate cash debit.
    pub fn set_outstanding_balance(&mut self, id: &str, outstanding_cents: i64) -> Result<(), BalanceError> {
        let account = self.accounts.get_mut(id).ok_or_else(|| BalanceError::NotFound(id.to_string()))?;
        account.set_outstanding_balance(outstanding_cents);
        Ok(())
    }

    /// An advance: debit the buyer's outstanding-balance headroom and
    /// credit the supplier the discounted amount (spec §4.11 three-leg
    /// transfer's account-side two legs; the provider leg lives in the
    /// settlement engine).
    pub fn advance(&mut self, supplier_id: &str, buyer_id: &str, amount_cents: i64) -> Result<(), BalanceError> {
        let buyer = self.accounts.get(buyer_id).ok_or_else(|| BalanceError::NotFound(buyer_id.to_string()))?;
        if !buyer.credit_headroom_ok(amount_cents) {
            return Err(BalanceError::CreditLimitExceeded { id: buyer_id.to_string() });
        }
        let new_outstanding = buyer.outstanding_balance_cents() + amount_cents;
        self.credit(supplier_id, amount_cents)?;
        self.accounts.get_mut(buyer_id).unwrap().set_outstanding_balance(new_outstanding);
        Ok(())
    }

    /// Invariant 402: flag or clear an account's sanctions hold. A
    /// sanctioned account is excluded from settlement by
    /// `crate::settlement::execute` regardless of everything else checking out.
    pub fn sanction(&mut self, id: &str, sanctioned: bool) -> Result<(), BalanceError> {
        let account = self.accounts.get_mut(id).ok_or_else(|| BalanceError::NotFound(id.to_string()))?;
        account.set_sanctioned(sanctioned);
        Ok(())
    }

    /// Move an account between active/suspended/frozen outside of the
    /// compliance-specific sanctions hold above.
    pub fn set_status(&mut self, id: &str, status: AccountStatus) -> Result<(), BalanceError> {
        let account = self.accounts.get_mut(id).ok_or_else(|| BalanceError::NotFound(id.to_string()))?;
        account.set_status(status);
        Ok(())
    }
}

/// Port to the external settlement-rail transport (spec §1: external
/// collaborators are out of core scope). Implementations perform the
/// actual money movement; the in-core side only books the rail's volume.
pub trait RailTransport {
    fn transfer(&self, rail_name: &str, amount_cents: i64) -> Result<(), String>;
}

/// Rails keyed by name, with the volume bookkeeping the router's
/// eligibility check reads.
#[derive(Debug, Clone, Default)]
pub struct RailBook {
    rails: HashMap<String, SettlementRail>,
}

impl RailBook {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, rail: SettlementRail) {
        self.rails.insert(rail.name().to_string(), rail);
    }

    pub fn get(&self, name: &str) -> Option<&SettlementRail> {
        self.rails.get(name)
    }

    pub fn all(&self) -> Vec<&SettlementRail> {
        self.rails.values().collect()
    }

    pub fn record_transfer(
        &mut self,
        transport: &dyn RailTransport,
        rail_name: &str,
        amount_cents: i64,
    ) -> Result<(), String> {
        transport.transfer(rail_name, amount_cents)?;
        if let Some(rail) = self.rails.get_mut(rail_name) {
            rail.add_volume(amount_cents);
        }
        Ok(())
    }
}
