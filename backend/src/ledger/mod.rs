//! Decision Ledger (C1, spec §4.2): the append-only, signature-chained
//! record of every pre/post check outcome and rollback the kernel performs.
//!
//! The ledger is observable only through the methods below — there is no
//! public way to mutate or remove an entry once appended, matching spec
//! §4.2's "direct mutation is forbidden".

use serde::Serialize;

use crate::core::secret::ProcessSecret;
use crate::models::ledger_entry::{DecisionLedgerEntry, EnforcementAction, Phase};

/// Append-only log of invariant-check outcomes.
#[derive(Debug, Default)]
pub struct DecisionLedger {
    entries: Vec<DecisionLedgerEntry>,
}

impl DecisionLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a new, freshly signed entry.
    pub fn record<Ctx: Serialize>(
        &mut self,
        invariant_id: &str,
        phase: Phase,
        result: bool,
        action: EnforcementAction,
        timestamp: i64,
        ctx: &Ctx,
        secret: &ProcessSecret,
    ) {
        let snapshot = serde_json::to_value(ctx).unwrap_or(serde_json::Value::Null);
        let entry = DecisionLedgerEntry::new(invariant_id, phase, result, action, timestamp, snapshot, secret);
        self.entries.push(entry);
    }

    /// The most recent entry whose enforcement action was PROCEED, i.e. the
    /// last known-good state snapshot (spec §4.2 `lastGoodState()`).
    pub fn last_good_state(&self) -> Option<&serde_json::Value> {
        self.entries
            .iter()
            .rev()
            .find(|e| matches!(e.action, EnforcementAction::Proceed))
            .map(|e| &e.state_snapshot)
    }

    /// Recompute every entry's HMAC and confirm it matches what was stored
    /// (invariant 601).
    pub fn verify_chain_integrity(&self, secret: &ProcessSecret) -> bool {
        self.entries.iter().all(|e| e.verify_signature(secret))
    }

    pub fn iter(&self) -> impl Iterator<Item = &DecisionLedgerEntry> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Count of entries whose action was PROCEED — used for the health
    /// snapshot's `passed` total (spec §6 `/health`).
    pub fn passed_count(&self) -> usize {
        self.entries
            .iter()
            .filter(|e| matches!(e.action, EnforcementAction::Proceed))
            .count()
    }

    pub fn rollback_count(&self) -> usize {
        self.entries
            .iter()
            .filter(|e| matches!(e.action, EnforcementAction::Rollback))
            .count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn chain_integrity_holds_for_untampered_ledger() {
        let secret = ProcessSecret::from_bytes(b"secret".to_vec());
        let mut ledger = DecisionLedger::new();
        ledger.record("001", Phase::Pre, true, EnforcementAction::Proceed, 0, &serde_json::json!({"x": 1}), &secret);
        ledger.record("002", Phase::Pre, true, EnforcementAction::Proceed, 1, &serde_json::json!({"x": 2}), &secret);
        assert!(ledger.verify_chain_integrity(&secret));
        assert_eq!(ledger.len(), 2);
    }

    #[test]
    fn last_good_state_skips_non_proceed_entries() {
        let secret = ProcessSecret::from_bytes(b"secret".to_vec());
        let mut ledger = DecisionLedger::new();
        ledger.record("001", Phase::Pre, true, EnforcementAction::Proceed, 0, &serde_json::json!({"tick": 1}), &secret);
        ledger.record("002", Phase::Post, false, EnforcementAction::Rollback, 1, &serde_json::json!({"tick": 2}), &secret);
        assert_eq!(ledger.last_good_state(), Some(&serde_json::json!({"tick": 1})));
    }

    #[test]
    fn wrong_secret_breaks_chain_integrity() {
        let secret = ProcessSecret::from_bytes(b"secret".to_vec());
        let other = ProcessSecret::from_bytes(b"other".to_vec());
        let mut ledger = DecisionLedger::new();
        ledger.record("001", Phase::Pre, true, EnforcementAction::Proceed, 0, &serde_json::json!({}), &secret);
        assert!(!ledger.verify_chain_integrity(&other));
    }
}
