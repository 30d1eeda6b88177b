//! Pricing Quote service (C6, spec §4.6): looks up the term-based discount
//! rate table and issues an immutable, 5-minute-valid quote per invoice.

use thiserror::Error;

use crate::models::invoice::Invoice;
use crate::models::quote::PricingQuote;
use crate::models::terms::Terms;
use crate::money;

/// Discount rate by net-terms days, spec §4.6's fixed table.
fn rate_for_terms(terms: Terms) -> f64 {
    match terms.days() {
        0 => 0.0,
        15 => 0.03,
        30 => 0.05,
        45 => 0.06,
        60 => 0.08,
        90 => 0.10,
        other => unreachable!("Terms only constructs catalog values, got {other}"),
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum PricingError {
    #[error("quote {0} expired")]
    Expired(String),
    #[error("no quote found for invoice {0}")]
    NotFound(String),
}

/// Issue a quote for `invoice` as of `now`. The quoted cost is the
/// financing fee the supplier pays for early settlement — `amount * rate`.
pub fn issue_quote(invoice: &Invoice, now: i64) -> PricingQuote {
    let rate = rate_for_terms(invoice.terms());
    let fee_cents = money::apply_rate(invoice.amount_cents(), rate);
    PricingQuote::new(invoice.id(), invoice.terms(), rate, fee_cents, now)
}

/// Invariant 201/103: a quote is usable only while it has not expired.
pub fn get_valid_quote<'a>(quote: &'a PricingQuote, now: i64) -> Result<&'a PricingQuote, PricingError> {
    if quote.is_valid_at(now) {
        Ok(quote)
    } else {
        Err(PricingError::Expired(quote.invoice_id().to_string()))
    }
}
