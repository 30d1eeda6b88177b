//! Fraud score entity and classification (spec §3, §4.8).

use serde::{Deserialize, Serialize};

/// Freshness window: 24 hours (spec §3).
pub const FRAUD_SCORE_FRESHNESS_SECS: i64 = 24 * 60 * 60;
/// Acceptance threshold (invariant 202).
pub const FRAUD_REJECT_THRESHOLD: f64 = 0.75;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FraudClassification {
    Low,
    Medium,
    High,
    Critical,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FraudAction {
    Approve,
    Review,
    Reject,
}

impl FraudClassification {
    pub fn from_score(score: f64) -> Self {
        if score >= 0.75 {
            FraudClassification::Critical
        } else if score >= 0.50 {
            FraudClassification::High
        } else if score >= 0.25 {
            FraudClassification::Medium
        } else {
            FraudClassification::Low
        }
    }

    pub fn action(self) -> FraudAction {
        match self {
            FraudClassification::Low => FraudAction::Approve,
            FraudClassification::Medium | FraudClassification::High => FraudAction::Review,
            FraudClassification::Critical => FraudAction::Reject,
        }
    }
}

/// One signal's contribution to the total score.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SignalContribution {
    pub name: String,
    pub triggered: bool,
    pub confidence: f64,
    pub reason: String,
    pub contribution: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FraudScore {
    invoice_id: String,
    score: f64,
    signals: Vec<SignalContribution>,
    calculated_at: i64,
}

impl FraudScore {
    pub fn new(invoice_id: impl Into<String>, signals: Vec<SignalContribution>, calculated_at: i64) -> Self {
        let score = signals.iter().map(|s| s.contribution).sum::<f64>().min(1.0);
        Self {
            invoice_id: invoice_id.into(),
            score,
            signals,
            calculated_at,
        }
    }

    pub fn invoice_id(&self) -> &str {
        &self.invoice_id
    }
    pub fn score(&self) -> f64 {
        self.score
    }
    pub fn signals(&self) -> &[SignalContribution] {
        &self.signals
    }
    pub fn calculated_at(&self) -> i64 {
        self.calculated_at
    }

    pub fn classification(&self) -> FraudClassification {
        FraudClassification::from_score(self.score)
    }

    /// Invariant 202: fresh iff age < 24h.
    pub fn is_fresh_at(&self, now_unix_secs: i64) -> bool {
        now_unix_secs - self.calculated_at < FRAUD_SCORE_FRESHNESS_SECS
    }
}
