//! Invoice lifecycle transitions (C5, invariant 101's transition table).
//! The only module allowed to call `Invoice::set_status`.

use thiserror::Error;

use crate::models::invoice::{Invoice, InvoiceStatus};

#[derive(Debug, Error, PartialEq, Eq)]
#[error("transition from {from:?} to {to:?} is not in the lifecycle table")]
pub struct InvalidTransition {
    pub from: InvoiceStatus,
    pub to: InvoiceStatus,
}

/// Invariant 101: the fixed set of legal status transitions.
fn is_legal(from: InvoiceStatus, to: InvoiceStatus) -> bool {
    use InvoiceStatus::*;
    matches!(
        (from, to),
        (Pending, Accepted)
            | (Pending, FraudReview)
            | (Pending, Expired)
            | (Pending, Rejected)
            | (FraudReview, Accepted)
            | (FraudReview, Rejected)
            | (Accepted, Settled)
            | (Accepted, Failed)
    )
}

/// Apply a transition, enforcing invariants 101-105 (table membership,
/// settlement-only-from-Accepted, acceptance-only-from-Pending/FraudReview,
/// expiry-only-from-Pending, terminal states never re-enter).
pub fn transition(invoice: &mut Invoice, to: InvoiceStatus) -> Result<(), InvalidTransition> {
    let from = invoice.status();
    if from.is_terminal() || !is_legal(from, to) {
        return Err(InvalidTransition { from, to });
    }
    invoice.set_status(to);
    Ok(())
}
