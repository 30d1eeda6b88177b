//! Recurring generator (C13, spec §4.13): scans templates due for
//! generation and turns each into a concrete pending invoice.

use thiserror::Error;

use crate::models::invoice::{Invoice, InvoiceError};
use crate::models::line_item::{LineItem, LineItemError};
use crate::models::recurring::RecurringTemplate;
use crate::models::terms::Terms;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum RecurringError {
    #[error("template {0} is not due for generation")]
    NotDue(String),
    #[error(transparent)]
    LineItem(#[from] LineItemError),
    #[error(transparent)]
    Invoice(#[from] InvoiceError),
}

/// Generate the next occurrence of `template` if it is due at `now`,
/// recording the generation on the template itself.
pub fn generate_due(
    template: &mut RecurringTemplate,
    terms: Terms,
    now: i64,
) -> Result<Invoice, RecurringError> {
    if !template.should_generate(now) {
        return Err(RecurringError::NotDue(template.id().to_string()));
    }

    let line_items = vec![LineItem::new(template.next_occurrence_id(), 1, template.amount_cents())?];
    let invoice = Invoice::new(
        template.supplier_id(),
        template.buyer_id(),
        template.currency(),
        terms,
        line_items,
        now,
    )?;

    template.record_generation(now);
    Ok(invoice)
}

/// Scan every template in `templates`, generating an occurrence for each
/// one that is due (spec §4.13 "scan interval"). Templates not due are
/// left untouched and simply absent from the returned vec.
pub fn scan_due(templates: &mut [RecurringTemplate], terms: Terms, now: i64) -> Vec<Invoice> {
    templates
        .iter_mut()
        .filter_map(|t| generate_due(t, terms, now).ok())
        .collect()
}
