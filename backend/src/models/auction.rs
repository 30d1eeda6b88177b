//! Auction entity (spec §3, §4.9).

use serde::{Deserialize, Serialize};

use super::bid::{BidStatus, CapitalBid};
use super::terms::Terms;

/// Auction window: 10 seconds (spec §3).
pub const AUCTION_WINDOW_SECS: i64 = 10;
/// Rate applied when no competitive bids exist (spec §3, §4.9).
pub const FALLBACK_RATE: f64 = 0.10;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AuctionStatus {
    Open,
    Completed,
    Failed,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Auction {
    id: String,
    invoice_id: String,
    amount_cents: i64,
    terms: Terms,
    started_at: i64,
    ends_at: i64,
    bids: Vec<CapitalBid>,
    winner_bid_id: Option<String>,
    status: AuctionStatus,
}

impl Auction {
    pub fn new(invoice_id: impl Into<String>, amount_cents: i64, terms: Terms, started_at: i64) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            invoice_id: invoice_id.into(),
            amount_cents,
            terms,
            started_at,
            ends_at: started_at + AUCTION_WINDOW_SECS,
            bids: Vec::new(),
            winner_bid_id: None,
            status: AuctionStatus::Open,
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }
    pub fn invoice_id(&self) -> &str {
        &self.invoice_id
    }
    pub fn amount_cents(&self) -> i64 {
        self.amount_cents
    }
    pub fn terms(&self) -> Terms {
        self.terms
    }
    pub fn started_at(&self) -> i64 {
        self.started_at
    }
    pub fn ends_at(&self) -> i64 {
        self.ends_at
    }
    pub fn bids(&self) -> &[CapitalBid] {
        &self.bids
    }
    pub fn winner_bid_id(&self) -> Option<&str> {
        self.winner_bid_id.as_deref()
    }
    pub fn status(&self) -> AuctionStatus {
        self.status
    }

    pub fn is_open_at(&self, now_unix_secs: i64) -> bool {
        matches!(self.status, AuctionStatus::Open) && now_unix_secs < self.ends_at
    }

    pub(crate) fn push_bid(&mut self, bid: CapitalBid) {
        self.bids.push(bid);
    }

    pub(crate) fn finalize(&mut self, winner_bid_id: String, status: AuctionStatus) {
        self.winner_bid_id = Some(winner_bid_id);
        self.status = status;
    }

    /// Active (non-expired) bids at finalization time.
    pub fn active_bids_at(&self, now_unix_secs: i64) -> Vec<&CapitalBid> {
        self.bids.iter().filter(|b| b.is_active_at(now_unix_secs)).collect()
    }

    /// A provider withdraws its bid before the window closes. Returns
    /// `false` if no active bid from that provider exists.
    pub fn withdraw_bid(&mut self, provider_id: &str) -> bool {
        match self.bids.iter_mut().find(|b| b.provider_id() == provider_id && b.status() == BidStatus::Active) {
            Some(bid) => {
                bid.set_status(BidStatus::Withdrawn);
                true
            }
            None => false,
        }
    }
}
