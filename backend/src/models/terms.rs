//! Payment terms, shared by invoices, quotes, auctions, and bids
//! (invariant 007: `terms ∈ {0,15,30,45,60,90}`).

use serde::{Deserialize, Serialize};

/// A validated payment term in days. Only the six values the catalog
/// allows can be constructed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Terms(u16);

pub const ALLOWED_TERMS_DAYS: [u16; 6] = [0, 15, 30, 45, 60, 90];

impl Terms {
    /// Construct from a raw day count, rejecting anything outside the
    /// catalog's allowed set.
    pub fn new(days: u16) -> Option<Self> {
        ALLOWED_TERMS_DAYS.contains(&days).then_some(Self(days))
    }

    pub fn days(self) -> u16 {
        self.0
    }
}

impl std::fmt::Display for Terms {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}d", self.0)
    }
}
