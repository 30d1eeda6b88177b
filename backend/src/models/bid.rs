//! Capital bid entity (spec §3, §4.9).

use serde::{Deserialize, Serialize};

/// Bid window: 10 seconds (spec §3).
pub const BID_VALIDITY_SECS: i64 = 10;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BidStatus {
    Active,
    Accepted,
    Expired,
    Withdrawn,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CapitalBid {
    id: String,
    provider_id: String,
    invoice_id: String,
    discount_rate: f64,
    capacity_cents: i64,
    created_at: i64,
    expires_at: i64,
    status: BidStatus,
}

impl CapitalBid {
    pub fn new(
        provider_id: impl Into<String>,
        invoice_id: impl Into<String>,
        discount_rate: f64,
        capacity_cents: i64,
        created_at: i64,
    ) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            provider_id: provider_id.into(),
            invoice_id: invoice_id.into(),
            discount_rate: discount_rate.clamp(0.02, 0.15),
            capacity_cents,
            created_at,
            expires_at: created_at + BID_VALIDITY_SECS,
            status: BidStatus::Active,
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }
    pub fn provider_id(&self) -> &str {
        &self.provider_id
    }
    pub fn invoice_id(&self) -> &str {
        &self.invoice_id
    }
    pub fn discount_rate(&self) -> f64 {
        self.discount_rate
    }
    pub fn capacity_cents(&self) -> i64 {
        self.capacity_cents
    }
    pub fn created_at(&self) -> i64 {
        self.created_at
    }
    pub fn expires_at(&self) -> i64 {
        self.expires_at
    }
    pub fn status(&self) -> BidStatus {
        self.status
    }

    /// Invariant 207: bids past `expires_at` are rejected, not accepted.
    pub fn is_active_at(&self, now_unix_secs: i64) -> bool {
        matches!(self.status, BidStatus::Active) && now_unix_secs < self.expires_at
    }

    pub(crate) fn set_status(&mut self, status: BidStatus) {
        self.status = status;
    }
}
