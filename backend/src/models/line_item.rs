//! Invoice line items (spec §3).

use serde::{Deserialize, Serialize};

/// A single billed line on an invoice. `amount()` is always derived, never
/// stored independently, so it cannot drift from `quantity * unit_price`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LineItem {
    description: String,
    quantity: u32,
    /// Unit price in cents.
    unit_price_cents: i64,
}

/// A line item failed construction-time validation.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum LineItemError {
    #[error("quantity must be >= 1")]
    InvalidQuantity,
    #[error("unit_price must be > 0")]
    InvalidUnitPrice,
}

impl LineItem {
    pub fn new(
        description: impl Into<String>,
        quantity: u32,
        unit_price_cents: i64,
    ) -> Result<Self, LineItemError> {
        if quantity < 1 {
            return Err(LineItemError::InvalidQuantity);
        }
        if unit_price_cents <= 0 {
            return Err(LineItemError::InvalidUnitPrice);
        }
        Ok(Self {
            description: description.into(),
            quantity,
            unit_price_cents,
        })
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn quantity(&self) -> u32 {
        self.quantity
    }

    pub fn unit_price_cents(&self) -> i64 {
        self.unit_price_cents
    }

    /// Derived amount: `quantity * unit_price`, in cents.
    pub fn amount_cents(&self) -> i64 {
        self.quantity as i64 * self.unit_price_cents
    }
}
