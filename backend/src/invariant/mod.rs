//! Invariant catalog (C2, spec §4.4): the fixed 31-entry table of every
//! invariant the enforcement kernel can check, plus the deterministic
//! topological sort used to order checks within one enforcement call.
//!
//! The catalog here is metadata only — ids, criticality, declared
//! dependencies, decay windows. The actual pre/post/rollback closures are
//! bound per call site (invoice creation binds a different set than
//! settlement does) by `crate::kernel::BoundInvariant`; this mirrors the
//! teacher's split between `policy::tree` definitions and the engine that
//! evaluates them against a concrete tick.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum InvariantCategory {
    State,
    Transition,
    Temporal,
    Probabilistic,
    Security,
    Financial,
    DataIntegrity,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Criticality {
    /// A failed check halts the operation and rolls back.
    Critical,
    /// A failed check is logged and surfaced but does not block.
    Important,
    /// A failed check is advisory only.
    Optional,
}

/// One row of the fixed invariant table (spec §4.4). `id` is the three-digit
/// code used throughout the Decision Ledger and error messages.
#[derive(Debug, Clone, Copy)]
pub struct InvariantSpec {
    pub id: &'static str,
    pub category: InvariantCategory,
    pub statement: &'static str,
    pub criticality: Criticality,
    pub dependencies: &'static [&'static str],
    /// How long a PROCEED outcome remains valid before it must be
    /// re-checked, if bounded (spec §4.4 "decay window").
    pub decay_window_secs: Option<i64>,
}

macro_rules! inv {
    ($id:expr, $cat:ident, $stmt:expr, $crit:ident, [$($dep:expr),*], $decay:expr) => {
        InvariantSpec {
            id: $id,
            category: InvariantCategory::$cat,
            statement: $stmt,
            criticality: Criticality::$crit,
            dependencies: &[$($dep),*],
            decay_window_secs: $decay,
        }
    };
}

/// The full fixed catalog, spec §4.4. Order here is declaration order, not
/// enforcement order — callers select a subset and the kernel topo-sorts it.
pub const CATALOG: &[InvariantSpec] = &[
    inv!("001", State, "invoice ids are globally unique", Critical, [], None),
    inv!("002", State, "invoice amount falls within [100, 10,000,000]", Critical, [], None),
    inv!("003", State, "supplier and buyer accounts are ACTIVE at transaction time", Critical, [], Some(10)),
    inv!("004", State, "invoice content hash is unique across the store", Critical, [], None),
    inv!("005", State, "outstanding_balance plus the new amount does not exceed credit_limit", Critical, ["003"], Some(3600)),
    inv!("006", State, "exactly one Settlement exists per invoice", Critical, [], None),
    inv!("007", State, "terms net-days is one of the supported tiers", Critical, [], None),
    inv!("101", Transition, "status transition is present in the fixed lifecycle table", Critical, [], None),
    inv!("102", Transition, "all three settlement legs succeed, or all revert", Critical, ["101"], None),
    inv!("103", Transition, "no buyer acceptance without a valid pricing quote under 5 minutes old", Critical, ["101"], Some(300)),
    inv!("104", Transition, "only the invoice's buyer may accept it", Critical, ["101"], None),
    inv!("105", Transition, "terminal states never re-enter the table", Critical, ["101"], None),
    inv!("201", Temporal, "settlement completes within 5 seconds of acceptance", Critical, ["102"], Some(5)),
    inv!("202", Temporal, "fraud score is under 24 hours old and below the 0.75 threshold at acceptance", Critical, [], Some(86400)),
    inv!("203", Temporal, "PENDING invoices auto-expire at 48 hours", Important, [], Some(172800)),
    inv!("204", Temporal, "FX rate used is within its 60 second freshness window", Critical, [], Some(60)),
    inv!("205", Temporal, "credit limit is re-fetched once older than 1 hour", Important, ["005"], Some(3600)),
    inv!("206", Temporal, "every settlement rail was health-checked within the last 30 seconds and is UP", Critical, ["102"], Some(30)),
    inv!("207", Temporal, "capital bids are rejected once past their expires_at", Critical, [], None),
    inv!("301", Probabilistic, "rolling 24h window has >=70% of auctions with >=3 active bids, else fallback rate", Important, [], Some(86400)),
    inv!("302", Probabilistic, "zero SETTLED invoices scored >=0.75 in the last 24 hours", Critical, ["202"], Some(86400)),
    inv!("303", Probabilistic, "rolling 7 day settlement success rate is >= 0.999", Critical, ["102"], Some(604800)),
    inv!("401", Security, "neither party appears on the sanctions list", Critical, [], Some(21600)),
    inv!("402", Security, "both parties are KYC VERIFIED", Critical, [], Some(604800)),
    inv!("403", Security, "buyer acceptance carries a signature over the invoice hash verifiable by the buyer's key", Critical, [], None),
    inv!("404", Security, "supplier has not exceeded 100 invoices per hour", Important, [], Some(3600)),
    inv!("501", Financial, "the sum of credits equals the sum of debits within 0.01 after every settlement", Critical, ["102"], None),
    inv!("502", Financial, "actual charge exceeds the quoted total cost by no more than 0.01, else auto-refund", Critical, ["103"], None),
    inv!("503", Financial, "provider available_liquidity is at least the bid capacity at bid time", Critical, [], Some(30)),
    inv!("601", DataIntegrity, "every ledger entry's signature verifies against the process secret", Critical, [], None),
    inv!("602", DataIntegrity, "line item amounts sum to the invoice amount within 0.01", Critical, [], None),
    inv!("603", DataIntegrity, "pricing quote is under 5 minutes old at acceptance (alias 109)", Critical, ["103"], Some(300)),
];

/// Look up a catalog row by id.
pub fn get(id: &str) -> Option<&'static InvariantSpec> {
    CATALOG.iter().find(|i| i.id == id)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn catalog_has_thirty_two_entries() {
        assert_eq!(CATALOG.len(), 32);
    }

    #[test]
    fn catalog_ids_are_unique() {
        let mut ids: Vec<&str> = CATALOG.iter().map(|i| i.id).collect();
        ids.sort_unstable();
        ids.dedup();
        assert_eq!(ids.len(), CATALOG.len());
    }

    #[test]
    fn dependencies_reference_existing_ids() {
        for inv in CATALOG {
            for dep in inv.dependencies {
                assert!(get(dep).is_some(), "{} depends on unknown invariant {}", inv.id, dep);
            }
        }
    }

    #[test]
    fn lookup_finds_known_id() {
        assert!(get("501").is_some());
        assert!(get("999").is_none());
    }
}
