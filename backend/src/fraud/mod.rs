//! Fraud scoring engine (C8, spec §4.8): eight weighted signals summed into
//! a single score, each signal's weight fixed by the catalog (invariant
//! 301 — the score must be exactly the sum of these and no others).

use crate::models::fraud::{FraudScore, SignalContribution};

/// Facts the engine needs about an invoice to score it. Gathering these
/// facts (querying the store, the account history, geolocation) is the
/// caller's job — this module is pure scoring, the way the teacher keeps
/// `policy` evaluation separate from the data that feeds it.
pub struct FraudContext {
    pub invoices_by_supplier_last_hour: usize,
    pub amount_cents: i64,
    pub supplier_avg_amount_cents: i64,
    pub relationship_age_days: u32,
    pub is_duplicate_content_pattern: bool,
    pub supplier_country: String,
    pub buyer_country: String,
    pub hour_of_day_utc: u8,
    pub seconds_since_quote_issued: i64,
}

struct Signal {
    name: &'static str,
    weight: f64,
    triggered: bool,
    reason: &'static str,
}

impl Signal {
    fn contribution(&self) -> SignalContribution {
        SignalContribution {
            name: self.name.to_string(),
            triggered: self.triggered,
            confidence: 1.0,
            reason: self.reason.to_string(),
            contribution: if self.triggered { self.weight } else { 0.0 },
        }
    }
}

/// Score `ctx` as of `now`, returning the full signal breakdown.
pub fn score(invoice_id: &str, ctx: &FraudContext, now: i64) -> FraudScore {
    let signals = [
        Signal {
            name: "velocity_spike",
            weight: 0.25,
            triggered: ctx.invoices_by_supplier_last_hour > 5,
            reason: "supplier filed more than five invoices in the last hour",
        },
        Signal {
            name: "unusual_amount",
            weight: 0.20,
            triggered: ctx.supplier_avg_amount_cents > 0
                && ctx.amount_cents > ctx.supplier_avg_amount_cents * 3,
            reason: "amount exceeds 3x the supplier's historical average",
        },
        Signal {
            name: "new_relationship",
            weight: 0.15,
            triggered: ctx.relationship_age_days < 30,
            reason: "supplier-buyer relationship is under 30 days old",
        },
        Signal {
            name: "duplicate_pattern",
            weight: 0.15,
            triggered: ctx.is_duplicate_content_pattern,
            reason: "line items closely match a recent invoice",
        },
        Signal {
            name: "geographic_mismatch",
            weight: 0.10,
            triggered: ctx.supplier_country != ctx.buyer_country,
            reason: "supplier and buyer are registered in different countries",
        },
        Signal {
            name: "off_hours",
            weight: 0.05,
            triggered: !(6..20).contains(&ctx.hour_of_day_utc),
            reason: "invoice was filed outside 06:00-20:00 UTC",
        },
        Signal {
            name: "round_amount",
            weight: 0.05,
            triggered: ctx.amount_cents % 100_000_00 == 0,
            reason: "amount is a round figure",
        },
        Signal {
            name: "rapid_acceptance",
            weight: 0.05,
            triggered: ctx.seconds_since_quote_issued >= 0 && ctx.seconds_since_quote_issued < 2,
            reason: "buyer accepted within two seconds of the quote being issued",
        },
    ];

    let contributions = signals.iter().map(Signal::contribution).collect();
    FraudScore::new(invoice_id, contributions, now)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::fraud::{FraudAction, FraudClassification};

    fn clean_ctx() -> FraudContext {
        FraudContext {
            invoices_by_supplier_last_hour: 1,
            amount_cents: 123_45,
            supplier_avg_amount_cents: 100_00,
            relationship_age_days: 365,
            is_duplicate_content_pattern: false,
            supplier_country: "US".to_string(),
            buyer_country: "US".to_string(),
            hour_of_day_utc: 12,
            seconds_since_quote_issued: 120,
        }
    }

    #[test]
    fn clean_context_scores_low() {
        let s = score("INV-1", &clean_ctx(), 0);
        assert_eq!(s.classification(), FraudClassification::Low);
        assert_eq!(s.classification().action(), FraudAction::Approve);
    }

    #[test]
    fn stacked_signals_reach_critical() {
        let mut ctx = clean_ctx();
        ctx.invoices_by_supplier_last_hour = 10;
        ctx.amount_cents = 1_000_00;
        ctx.supplier_avg_amount_cents = 100_00;
        ctx.relationship_age_days = 1;
        ctx.is_duplicate_content_pattern = true;
        ctx.supplier_country = "US".to_string();
        ctx.buyer_country = "DE".to_string();
        let s = score("INV-2", &ctx, 0);
        assert!(s.score() >= 0.75);
        assert_eq!(s.classification(), FraudClassification::Critical);
    }

    #[test]
    fn exactly_eight_signals_are_reported() {
        let s = score("INV-3", &clean_ctx(), 0);
        assert_eq!(s.signals().len(), 8);
    }
}
