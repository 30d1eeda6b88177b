//! Pricing quote entity (spec §3, §4.6).

use serde::{Deserialize, Serialize};

use super::terms::Terms;

/// Quote lifetime: 5 minutes (spec §3).
pub const QUOTE_VALIDITY_SECS: i64 = 5 * 60;

/// An immutable quote bound to exactly one invoice.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PricingQuote {
    invoice_id: String,
    terms: Terms,
    discount_rate: f64,
    total_cost_cents: i64,
    created_at: i64,
    expires_at: i64,
}

impl PricingQuote {
    pub fn new(
        invoice_id: impl Into<String>,
        terms: Terms,
        discount_rate: f64,
        total_cost_cents: i64,
        created_at: i64,
    ) -> Self {
        Self {
            invoice_id: invoice_id.into(),
            terms,
            discount_rate,
            total_cost_cents,
            created_at,
            expires_at: created_at + QUOTE_VALIDITY_SECS,
        }
    }

    pub fn invoice_id(&self) -> &str {
        &self.invoice_id
    }
    pub fn terms(&self) -> Terms {
        self.terms
    }
    pub fn discount_rate(&self) -> f64 {
        self.discount_rate
    }
    pub fn total_cost_cents(&self) -> i64 {
        self.total_cost_cents
    }
    pub fn created_at(&self) -> i64 {
        self.created_at
    }
    pub fn expires_at(&self) -> i64 {
        self.expires_at
    }

    /// Invariants 103/603/109: valid iff age < 5 minutes.
    pub fn is_valid_at(&self, now_unix_secs: i64) -> bool {
        now_unix_secs < self.expires_at
    }
}
