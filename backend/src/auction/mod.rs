//! Capital auction engine (C9, spec §4.9): solicits bids from eligible
//! providers, applies RNG-sourced jitter to each provider's base rate, and
//! selects the cheapest active bid when the 10-second window closes.

use thiserror::Error;

use crate::models::auction::{Auction, AuctionStatus};
use crate::models::bid::CapitalBid;
use crate::models::provider::CapitalProvider;
use crate::models::terms::Terms;
use crate::rng::RngManager;

/// Platform-supplied provider id used when no competitive bid survives to
/// finalization (spec §4.9 fallback rate).
pub const FALLBACK_PROVIDER_ID: &str = "PLATFORM-FALLBACK";

/// Jitter applied to each provider's base rate, uniformly in `[-0.01, 0.01]`
/// (invariant 303: jitter is drawn only from the injected RNG).
fn jittered_rate(base_rate: f64, rng: &mut RngManager) -> f64 {
    let jitter_bp = rng.range(-100, 101);
    (base_rate + (jitter_bp as f64) / 10_000.0).clamp(0.02, 0.15)
}

/// Open an auction and solicit a bid from every eligible provider.
pub fn run_auction(
    invoice_id: &str,
    amount_cents: i64,
    terms: Terms,
    providers: &[CapitalProvider],
    rng: &mut RngManager,
    now: i64,
) -> Auction {
    let mut auction = Auction::new(invoice_id, amount_cents, terms, now);
    for provider in providers.iter().filter(|p| p.is_eligible(amount_cents, terms)) {
        let rate = jittered_rate(provider.risk_appetite().base_rate(), rng);
        let bid = CapitalBid::new(provider.id(), invoice_id, rate, amount_cents, now);
        auction.push_bid(bid);
    }
    auction
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum AuctionError {
    #[error("auction for invoice {0} has not closed yet")]
    WindowStillOpen(String),
}

/// Close the auction at `now`: pick the lowest-rate active bid, breaking
/// ties by provider id ascending for determinism. If no bid is active, a
/// synthetic fallback bid is finalized at the catalog's fallback rate so
/// settlement can still proceed.
pub fn finalize_auction(auction: &mut Auction, now: i64) -> Result<CapitalBid, AuctionError> {
    if auction.is_open_at(now) {
        return Err(AuctionError::WindowStillOpen(auction.invoice_id().to_string()));
    }

    // Bid validity and the auction window share the same 10s duration, so a
    // bid placed at auction open expires at the same instant the window
    // closes. Judge bids as they stood the instant before close, not at
    // whatever time `finalize_auction` happens to be called.
    let winner = auction
        .active_bids_at(auction.ends_at() - 1)
        .into_iter()
        .min_by(|a, b| {
            a.discount_rate()
                .partial_cmp(&b.discount_rate())
                .unwrap()
                .then_with(|| a.provider_id().cmp(b.provider_id()))
        })
        .cloned();

    let winner = match winner {
        Some(bid) => bid,
        None => {
            let fallback = CapitalBid::new(
                FALLBACK_PROVIDER_ID,
                auction.invoice_id(),
                crate::models::auction::FALLBACK_RATE,
                auction.amount_cents(),
                now,
            );
            auction.push_bid(fallback.clone());
            fallback
        }
    };

    auction.finalize(winner.id().to_string(), AuctionStatus::Completed);
    Ok(winner)
}

/// A provider withdraws its bid while the auction is still open. No-op
/// once the window has closed.
pub fn withdraw(auction: &mut Auction, provider_id: &str, now: i64) -> bool {
    if !auction.is_open_at(now) {
        return false;
    }
    auction.withdraw_bid(provider_id)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::provider::RiskAppetite;
    use std::collections::HashSet;

    fn provider(id: &str, risk: RiskAppetite) -> CapitalProvider {
        let mut terms = HashSet::new();
        terms.insert(Terms::new(30).unwrap());
        CapitalProvider::new(id, 10_000_000_00, 1_000_00, 5_000_000_00, terms, risk)
    }

    #[test]
    fn eligible_providers_each_submit_one_bid() {
        let providers = vec![provider("P1", RiskAppetite::Low), provider("P2", RiskAppetite::High)];
        let mut rng = RngManager::new(1);
        let auction = run_auction("INV-1", 100_000_00, Terms::new(30).unwrap(), &providers, &mut rng, 0);
        assert_eq!(auction.bids().len(), 2);
    }

    #[test]
    fn finalize_picks_cheapest_active_bid() {
        let providers = vec![provider("P1", RiskAppetite::Low), provider("P2", RiskAppetite::High)];
        let mut rng = RngManager::new(1);
        let mut auction = run_auction("INV-1", 100_000_00, Terms::new(30).unwrap(), &providers, &mut rng, 0);
        let winner = finalize_auction(&mut auction, 10).unwrap();
        let cheapest = auction.bids().iter().min_by(|a, b| a.discount_rate().partial_cmp(&b.discount_rate()).unwrap()).unwrap();
        assert_eq!(winner.id(), cheapest.id());
        assert_eq!(auction.winner_bid_id(), Some(winner.id()));
    }

    #[test]
    fn no_eligible_bids_falls_back() {
        let mut rng = RngManager::new(1);
        let mut auction = run_auction("INV-1", 100_000_00, Terms::new(30).unwrap(), &[], &mut rng, 0);
        let winner = finalize_auction(&mut auction, 10).unwrap();
        assert_eq!(winner.provider_id(), FALLBACK_PROVIDER_ID);
        assert_eq!(winner.discount_rate(), crate::models::auction::FALLBACK_RATE);
    }

    #[test]
    fn still_open_window_is_rejected() {
        let mut rng = RngManager::new(1);
        let mut auction = run_auction("INV-1", 100_000_00, Terms::new(30).unwrap(), &[], &mut rng, 0);
        assert!(matches!(finalize_auction(&mut auction, 5), Err(AuctionError::WindowStillOpen(id)) if id == "INV-1"));
    }

    #[test]
    fn withdrawn_bid_is_excluded_from_finalization() {
        let providers = vec![provider("P1", RiskAppetite::Low), provider("P2", RiskAppetite::High)];
        let mut rng = RngManager::new(1);
        let mut auction = run_auction("INV-1", 100_000_00, Terms::new(30).unwrap(), &providers, &mut rng, 0);
        let cheapest_id = auction
            .bids()
            .iter()
            .min_by(|a, b| a.discount_rate().partial_cmp(&b.discount_rate()).unwrap())
            .unwrap()
            .provider_id()
            .to_string();

        assert!(withdraw(&mut auction, &cheapest_id, 5));
        assert!(!withdraw(&mut auction, &cheapest_id, 5), "already withdrawn");

        let winner = finalize_auction(&mut auction, 10).unwrap();
        assert_ne!(winner.provider_id(), cheapest_id);
    }

    #[test]
    fn jitter_is_deterministic_given_seed() {
        let mut rng_a = RngManager::new(7);
        let mut rng_b = RngManager::new(7);
        assert_eq!(jittered_rate(0.05, &mut rng_a), jittered_rate(0.05, &mut rng_b));
    }
}
