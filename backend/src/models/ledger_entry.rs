//! Decision ledger entry entity (spec §3, §4.2).

use hmac::{Hmac, Mac};
use serde::{Deserialize, Serialize};
use sha2::Sha256;

use crate::core::secret::ProcessSecret;

type HmacSha256 = Hmac<Sha256>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Phase {
    Pre,
    Post,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EnforcementAction {
    Proceed,
    Rollback,
    Freeze,
}

/// One append-only entry in the Decision Ledger: the outcome of a single
/// invariant check, signed with HMAC-SHA256 over `id|result|timestamp`
/// (spec §4.2).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DecisionLedgerEntry {
    pub invariant_id: String,
    pub phase: Phase,
    pub result: bool,
    pub action: EnforcementAction,
    pub timestamp: i64,
    /// Snapshot of whatever state the kernel captured before the action;
    /// opaque to the ledger itself.
    pub state_snapshot: serde_json::Value,
    signature: String,
}

impl DecisionLedgerEntry {
    pub fn new(
        invariant_id: impl Into<String>,
        phase: Phase,
        result: bool,
        action: EnforcementAction,
        timestamp: i64,
        state_snapshot: serde_json::Value,
        secret: &ProcessSecret,
    ) -> Self {
        let invariant_id = invariant_id.into();
        let signature = sign(&invariant_id, result, timestamp, secret);
        Self {
            invariant_id,
            phase,
            result,
            action,
            timestamp,
            state_snapshot,
            signature,
        }
    }

    pub fn signature(&self) -> &str {
        &self.signature
    }

    /// Invariant 601/contract of spec §4.2: recomputing the HMAC over this
    /// entry's fields must match the stored signature.
    pub fn verify_signature(&self, secret: &ProcessSecret) -> bool {
        sign(&self.invariant_id, self.result, self.timestamp, secret) == self.signature
    }
}

fn sign(invariant_id: &str, result: bool, timestamp: i64, secret: &ProcessSecret) -> String {
    let mut mac = HmacSha256::new_from_slice(secret.as_bytes()).expect("HMAC accepts any key length");
    mac.update(invariant_id.as_bytes());
    mac.update(b"|");
    mac.update(result.to_string().as_bytes());
    mac.update(b"|");
    mac.update(timestamp.to_string().as_bytes());
    let bytes = mac.finalize().into_bytes();
    bytes.iter().map(|b| format!("{:02x}", b)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn signature_round_trips() {
        let secret = ProcessSecret::from_bytes(b"test-secret".to_vec());
        let entry = DecisionLedgerEntry::new(
            "001",
            Phase::Pre,
            true,
            EnforcementAction::Proceed,
            100,
            serde_json::json!({}),
            &secret,
        );
        assert!(entry.verify_signature(&secret));
    }

    #[test]
    fn tampering_with_result_invalidates_signature() {
        let secret = ProcessSecret::from_bytes(b"test-secret".to_vec());
        let mut entry = DecisionLedgerEntry::new(
            "001",
            Phase::Pre,
            true,
            EnforcementAction::Proceed,
            100,
            serde_json::json!({}),
            &secret,
        );
        entry.result = false;
        assert!(!entry.verify_signature(&secret));
    }

    #[test]
    fn wrong_secret_fails_verification() {
        let secret = ProcessSecret::from_bytes(b"test-secret".to_vec());
        let other = ProcessSecret::from_bytes(b"other-secret".to_vec());
        let entry = DecisionLedgerEntry::new(
            "001",
            Phase::Pre,
            true,
            EnforcementAction::Proceed,
            100,
            serde_json::json!({}),
            &secret,
        );
        assert!(!entry.verify_signature(&other));
    }
}
