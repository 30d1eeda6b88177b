//! Domain entities (spec §3). Each file owns one entity, the teacher's
//! `models::agent` / `models::transaction` split.

pub mod account;
pub mod auction;
pub mod bid;
pub mod fraud;
pub mod fx;
pub mod invoice;
pub mod ledger_entry;
pub mod line_item;
pub mod provider;
pub mod quote;
pub mod rail;
pub mod recurring;
pub mod settlement;
pub mod terms;
pub mod version;

pub use account::{Account, AccountStatus, KycStatus};
pub use auction::{Auction, AuctionStatus, FALLBACK_RATE};
pub use bid::{BidStatus, CapitalBid};
pub use fraud::{FraudAction, FraudClassification, FraudScore, SignalContribution};
pub use fx::FxRate;
pub use invoice::{Invoice, InvoiceError, InvoiceStatus};
pub use ledger_entry::{DecisionLedgerEntry, EnforcementAction, Phase};
pub use line_item::{LineItem, LineItemError};
pub use provider::{CapitalProvider, RiskAppetite};
pub use quote::PricingQuote;
pub use rail::{RailStatus, SettlementRail};
pub use recurring::{Frequency, RecurringTemplate, TemplateStatus};
pub use settlement::{Settlement, SettlementLeg, SettlementStatus};
pub use terms::Terms;
pub use version::{ArtifactVersion, ChangeType, SemVer};
