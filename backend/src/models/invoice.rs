//! Invoice entity and lifecycle status (spec §3, transition table in
//! invariant 101 lives in `crate::lifecycle`).

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use thiserror::Error;

use super::line_item::LineItem;
use super::terms::Terms;
use crate::money;

/// Legal status of an invoice. Transitions are enforced by
/// `crate::lifecycle`, not by this type — `Invoice` only stores the current
/// value, matching the teacher's `Transaction::status` split between model
/// and settlement logic.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum InvoiceStatus {
    Pending,
    Accepted,
    FraudReview,
    Settled,
    Rejected,
    Expired,
    Failed,
}

impl InvoiceStatus {
    /// Terminal states never mutate again (invariant 105).
    pub fn is_terminal(self) -> bool {
        matches!(
            self,
            InvoiceStatus::Settled | InvoiceStatus::Rejected | InvoiceStatus::Expired
        )
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum InvoiceError {
    #[error("amount must be positive")]
    NonPositiveAmount,
    #[error("line items must not be empty")]
    EmptyLineItems,
    #[error("line items sum {sum} does not match invoice amount {amount} (tolerance 0.01)")]
    LineItemsMismatch { sum: i64, amount: i64 },
}

/// A financeable invoice issued by a supplier to a buyer.
///
/// # Example
/// ```
/// use itn_core_rs::models::invoice::Invoice;
/// use itn_core_rs::models::line_item::LineItem;
/// use itn_core_rs::models::terms::Terms;
///
/// let items = vec![
///     LineItem::new("Pumps", 20, 2_500_00).unwrap(),
///     LineItem::new("Install", 1, 5_000_00).unwrap(),
/// ];
/// let invoice = Invoice::new(
///     "SUP-001", "BUY-001", "USD", Terms::new(30).unwrap(), items, 0,
/// ).unwrap();
/// assert_eq!(invoice.amount_cents(), 55_000_00);
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Invoice {
    id: String,
    supplier_id: String,
    buyer_id: String,
    amount_cents: i64,
    currency: String,
    terms: Terms,
    line_items: Vec<LineItem>,
    content_hash: String,
    status: InvoiceStatus,
    created_at: i64,
}

impl Invoice {
    /// Construct a new PENDING invoice. `created_at` is unix seconds,
    /// supplied by the caller (spec §9: time is always injected).
    pub fn new(
        supplier_id: impl Into<String>,
        buyer_id: impl Into<String>,
        currency: impl Into<String>,
        terms: Terms,
        line_items: Vec<LineItem>,
        created_at: i64,
    ) -> Result<Self, InvoiceError> {
        if line_items.is_empty() {
            return Err(InvoiceError::EmptyLineItems);
        }
        let amount_cents: i64 = line_items.iter().map(LineItem::amount_cents).sum();
        if amount_cents <= 0 {
            return Err(InvoiceError::NonPositiveAmount);
        }

        let supplier_id = supplier_id.into();
        let buyer_id = buyer_id.into();
        let currency = currency.into();
        let content_hash = compute_content_hash(&supplier_id, &buyer_id, amount_cents, &currency, &line_items);

        Ok(Self {
            id: uuid::Uuid::new_v4().to_string(),
            supplier_id,
            buyer_id,
            amount_cents,
            currency,
            terms,
            line_items,
            content_hash,
            status: InvoiceStatus::Pending,
            created_at,
        })
    }

    pub fn id(&self) -> &str {
        &self.id
    }
    pub fn supplier_id(&self) -> &str {
        &self.supplier_id
    }
    pub fn buyer_id(&self) -> &str {
        &self.buyer_id
    }
    pub fn amount_cents(&self) -> i64 {
        self.amount_cents
    }
    pub fn currency(&self) -> &str {
        &self.currency
    }
    pub fn terms(&self) -> Terms {
        self.terms
    }
    pub fn line_items(&self) -> &[LineItem] {
        &self.line_items
    }
    pub fn content_hash(&self) -> &str {
        &self.content_hash
    }
    pub fn status(&self) -> InvoiceStatus {
        self.status
    }
    pub fn created_at(&self) -> i64 {
        self.created_at
    }

    /// Only `crate::lifecycle` should call this — it performs no transition
    /// validation itself (invariant 101 enforcement lives one layer up, the
    /// way the teacher keeps `Transaction::settle` unaware of Queue 1/2
    /// policy).
    pub(crate) fn set_status(&mut self, status: InvoiceStatus) {
        self.status = status;
    }

    /// Invariant 602: `Σ line_item.amount = invoice.amount` within 0.01.
    pub fn line_items_sum_matches(&self) -> bool {
        let sum: i64 = self.line_items.iter().map(LineItem::amount_cents).sum();
        money::approx_eq(sum, self.amount_cents)
    }
}

fn compute_content_hash(
    supplier_id: &str,
    buyer_id: &str,
    amount_cents: i64,
    currency: &str,
    line_items: &[LineItem],
) -> String {
    let mut hasher = Sha256::new();
    hasher.update(supplier_id.as_bytes());
    hasher.update(b"|");
    hasher.update(buyer_id.as_bytes());
    hasher.update(b"|");
    hasher.update(amount_cents.to_string().as_bytes());
    hasher.update(b"|");
    hasher.update(currency.as_bytes());
    for item in line_items {
        hasher.update(b"|");
        hasher.update(item.amount_cents().to_string().as_bytes());
    }
    hex::encode(hasher.finalize())
}

/// Minimal hex encoding so we don't pull in a dedicated `hex` crate for one
/// call site; kept private to this module.
mod hex {
    pub fn encode(bytes: impl AsRef<[u8]>) -> String {
        bytes.as_ref().iter().map(|b| format!("{:02x}", b)).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn items() -> Vec<LineItem> {
        vec![
            LineItem::new("Pumps", 20, 2_500_00).unwrap(),
            LineItem::new("Install", 1, 5_000_00).unwrap(),
        ]
    }

    #[test]
    fn amount_derives_from_line_items() {
        let inv = Invoice::new("SUP-001", "BUY-001", "USD", Terms::new(30).unwrap(), items(), 0).unwrap();
        assert_eq!(inv.amount_cents(), 55_000_00);
        assert!(inv.line_items_sum_matches());
    }

    #[test]
    fn identical_content_yields_identical_hash() {
        let a = Invoice::new("SUP-001", "BUY-001", "USD", Terms::new(30).unwrap(), items(), 0).unwrap();
        let b = Invoice::new("SUP-001", "BUY-001", "USD", Terms::new(30).unwrap(), items(), 999).unwrap();
        assert_eq!(a.content_hash(), b.content_hash());
    }

    #[test]
    fn different_amount_yields_different_hash() {
        let a = Invoice::new("SUP-001", "BUY-001", "USD", Terms::new(30).unwrap(), items(), 0).unwrap();
        let mut other_items = items();
        other_items.push(LineItem::new("Extra", 1, 1_00).unwrap());
        let b = Invoice::new("SUP-001", "BUY-001", "USD", Terms::new(30).unwrap(), other_items, 0).unwrap();
        assert_ne!(a.content_hash(), b.content_hash());
    }

    #[test]
    fn terminal_statuses() {
        assert!(InvoiceStatus::Settled.is_terminal());
        assert!(InvoiceStatus::Rejected.is_terminal());
        assert!(InvoiceStatus::Expired.is_terminal());
        assert!(!InvoiceStatus::Pending.is_terminal());
        assert!(!InvoiceStatus::Accepted.is_terminal());
        assert!(!InvoiceStatus::FraudReview.is_terminal());
        assert!(!InvoiceStatus::Failed.is_terminal());
    }
}
