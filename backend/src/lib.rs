//! Invoice financing and instant-settlement network — core engine.
//!
//! High-performance, deterministic invariant-enforcement and settlement
//! kernel for a B2B invoice-financing network.
//!
//! # Architecture
//!
//! - **core**: logical clock and HMAC secret shared by every component
//! - **models**: domain entities (Invoice, Account, Settlement, ...)
//! - **ledger**: append-only, signature-chained decision log
//! - **invariant**: the 32-entry invariant catalog and topological ordering
//! - **kernel**: the enforcement algorithm every mutation passes through
//! - **store**: invoice storage with hash/rate-limit indexes
//! - **lifecycle**: invoice status transitions
//! - **pricing**: term-based pricing quotes
//! - **fx**: currency conversion with freshness enforcement
//! - **fraud**: weighted multi-signal fraud scoring
//! - **auction**: capital-provider bidding and winner selection
//! - **router**: settlement-rail selection
//! - **balance**: account and rail mutation with snapshot/restore
//! - **settlement**: the atomic three-leg settlement engine
//! - **recurring**: recurring invoice template generation
//! - **versioning**: artifact version graph and migrations
//! - **orchestrator**: glues the above into create → accept → settle
//!
//! # Critical invariants
//!
//! 1. All money values are `i64` cents.
//! 2. All randomness and all "now" reads are injected (`RngManager`, `Clock`).
//! 3. The enforcement kernel is the only path that mutates a persisted
//!    entity; bypassing it is the one forbidden behavior (spec §4.3).
//!    Invoice creation, buyer acceptance, and settlement all run their
//!    state change through `EnforcementKernel::enforce`. Auction
//!    finalization picks a winner from in-memory bids already gathered
//!    by `auction::run_auction` and writes nothing persisted itself — its
//!    result is only applied once `orchestrator::settle_invoice` carries
//!    it into the settlement kernel call.

pub mod auction;
pub mod balance;
pub mod core;
pub mod fraud;
pub mod fx;
pub mod invariant;
pub mod kernel;
pub mod ledger;
pub mod lifecycle;
pub mod models;
pub mod money;
pub mod orchestrator;
pub mod pricing;
pub mod recurring;
pub mod rng;
pub mod router;
pub mod settlement;
pub mod store;
pub mod versioning;

pub use core::{Clock, ManualClock, ProcessSecret, SystemClock};
pub use kernel::{EnforcementKernel, InvariantViolation, SystemCompromised};
pub use ledger::DecisionLedger;
pub use orchestrator::Orchestrator;
pub use rng::RngManager;
