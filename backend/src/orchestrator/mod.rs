//! Orchestrator (C15, spec §6): glues invoice creation, pricing, fraud
//! scoring, the capital auction, routing, and settlement into the
//! create → accept → settle flow, and reports a health snapshot.

use std::collections::HashMap;

use serde::Serialize;
use thiserror::Error;

use crate::auction::{self, AuctionError};
use crate::balance::{AccountLedger, BalanceError};
use crate::core::clock::Clock;
use crate::core::secret::ProcessSecret;
use crate::fraud::{self, FraudContext};
use crate::invariant::Criticality;
use crate::kernel::{BoundInvariant, EnforcementKernel, InvariantViolation, KernelError, Phase2};
use crate::ledger::DecisionLedger;
use crate::lifecycle::{self, InvalidTransition};
use crate::models::account::Account;
use crate::models::auction::Auction;
use crate::models::fraud::{FraudAction, FraudScore};
use crate::models::invoice::{Invoice, InvoiceError, InvoiceStatus};
use crate::models::line_item::LineItem;
use crate::models::provider::CapitalProvider;
use crate::models::quote::PricingQuote;
use crate::models::rail::SettlementRail;
use crate::models::settlement::{Settlement, SettlementStatus};
use crate::models::terms::Terms;
use crate::pricing::{self, PricingError};
use crate::rng::RngManager;
use crate::router::{self, NoRailAvailable, RoutingStrategy};
use crate::settlement::{self, SettlementContext};
use crate::store::InvoiceStore;

/// Maximum invoices a single supplier may file per hour (invariant 404).
pub const MAX_INVOICES_PER_HOUR: usize = 100;
/// ISO currencies this instance is configured to accept.
pub const SUPPORTED_CURRENCIES: [&str; 4] = ["USD", "EUR", "GBP", "JPY"];
/// Smallest financeable invoice amount (invariant 002).
pub const MIN_INVOICE_AMOUNT_CENTS: i64 = 100_00;
/// Largest financeable invoice amount (invariant 002).
pub const MAX_INVOICE_AMOUNT_CENTS: i64 = 10_000_000_00;

#[derive(Debug, Error)]
pub enum OrchestratorError {
    #[error(transparent)]
    Invoice(#[from] InvoiceError),
    #[error("creation invariant failed: {0}")]
    Creation(String),
    #[error("no invoice {0}")]
    NotFound(String),
    #[error(transparent)]
    Transition(#[from] InvalidTransition),
    #[error(transparent)]
    Pricing(#[from] PricingError),
    #[error(transparent)]
    Auction(#[from] AuctionError),
    #[error(transparent)]
    Routing(#[from] NoRailAvailable),
    #[error("settlement failed: {0}")]
    Settlement(String),
    #[error(transparent)]
    Balance(#[from] BalanceError),
    #[error("currency {0} is not supported by this instance")]
    UnsupportedCurrency(String),
    #[error("no pricing quote for invoice {0}")]
    NoQuote(String),
    #[error("invariant {} failed in {:?} phase", .0.invariant_id, .0.phase)]
    InvariantViolation(InvariantFailure),
    #[error("rollback of invariant {0} failed; system requires operator intervention")]
    SystemCompromised(String),
}

/// The concrete invariant id and phase a kernel-wrapped mutation failed at,
/// surfaced so callers can match on it instead of parsing an error string.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvariantFailure {
    pub phase: Phase2,
    pub invariant_id: String,
}

impl<E: std::fmt::Debug + std::fmt::Display> From<KernelError<E>> for OrchestratorError {
    fn from(e: KernelError<E>) -> Self {
        match e {
            KernelError::Invariant(InvariantViolation::Failed { phase, invariant_id }) => {
                OrchestratorError::InvariantViolation(InvariantFailure { phase, invariant_id })
            }
            KernelError::Invariant(InvariantViolation::CyclicDependency(id)) => {
                OrchestratorError::Creation(format!("cyclic dependency among invariants: {id}"))
            }
            KernelError::Compromised(c) => OrchestratorError::SystemCompromised(c.invariant_id),
            KernelError::Action(err) => OrchestratorError::Creation(err.to_string()),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
struct CreationContext {
    store: InvoiceStore,
    invoice: Invoice,
    supplier_eligible: bool,
    buyer_eligible: bool,
    distinct_accounts: bool,
    max_per_hour: usize,
}

/// Everything the kernel needs to enforce the §4.5 acceptance invariants.
#[derive(Debug, Clone, Serialize)]
struct AcceptanceContext {
    invoice: Invoice,
    quote: Option<PricingQuote>,
    fraud_score: FraudScore,
    accounts: AccountLedger,
    authenticated_buyer_id: String,
    signature: String,
    expected_signature: String,
}

/// Point-in-time operational health (spec §6 `/health`).
#[derive(Debug, Clone, Serialize)]
pub struct HealthSnapshot {
    pub invoices_stored: usize,
    pub ledger_entries: usize,
    pub ledger_passed: usize,
    pub ledger_rollbacks: usize,
    pub ledger_chain_intact: bool,
    pub active_recurring_templates: usize,
}

/// Owns every component and every piece of mutable state the core engine
/// needs, the way the teacher's top-level simulator struct owns its
/// queues and agents.
pub struct Orchestrator<C: Clock> {
    pub store: InvoiceStore,
    pub accounts: AccountLedger,
    pub rails: Vec<SettlementRail>,
    pub providers: Vec<CapitalProvider>,
    pub ledger: DecisionLedger,
    pub quotes: HashMap<String, PricingQuote>,
    pub fraud_scores: HashMap<String, FraudScore>,
    pub auctions: HashMap<String, Auction>,
    pub settlements: HashMap<String, Settlement>,
    clock: C,
    secret: ProcessSecret,
    rng: RngManager,
}

impl<C: Clock> Orchestrator<C> {
    pub fn new(clock: C, secret: ProcessSecret, rng_seed: u64) -> Self {
        Self {
            store: InvoiceStore::new(),
            accounts: AccountLedger::new(),
            rails: Vec::new(),
            providers: Vec::new(),
            ledger: DecisionLedger::new(),
            quotes: HashMap::new(),
            fraud_scores: HashMap::new(),
            auctions: HashMap::new(),
            settlements: HashMap::new(),
            clock,
            secret,
            rng: RngManager::new(rng_seed),
        }
    }

    pub fn register_account(&mut self, account: Account) {
        self.accounts.insert(account);
    }

    pub fn register_rail(&mut self, rail: SettlementRail) {
        self.rails.push(rail);
    }

    pub fn register_provider(&mut self, provider: CapitalProvider) {
        self.providers.push(provider);
    }

    /// Validate and persist a new invoice through the kernel (invariants
    /// 001, 002, 003, 004, 007, 404, 602).
    pub fn create_invoice(
        &mut self,
        supplier_id: &str,
        buyer_id: &str,
        currency: &str,
        terms: Terms,
        line_items: Vec<LineItem>,
    ) -> Result<Invoice, OrchestratorError> {
        if !SUPPORTED_CURRENCIES.contains(&currency) {
            return Err(OrchestratorError::UnsupportedCurrency(currency.to_string()));
        }

        let now = self.clock.now_unix_secs();
        let invoice = Invoice::new(supplier_id, buyer_id, currency, terms, line_items, now)?;

        let mut ctx = CreationContext {
            store: self.store.clone(),
            invoice: invoice.clone(),
            supplier_eligible: self.accounts.get(supplier_id).map(|a| a.is_active()).unwrap_or(false),
            buyer_eligible: self.accounts.get(buyer_id).map(|a| a.is_active()).unwrap_or(false),
            distinct_accounts: supplier_id != buyer_id,
            max_per_hour: MAX_INVOICES_PER_HOUR,
        };

        let invariants: Vec<BoundInvariant<'_, CreationContext>> = vec![
            BoundInvariant::with_restore(
                "001",
                Criticality::Critical,
                &[],
                |c: &CreationContext| c.store.get(c.invoice.id()).is_none(),
                |c: &CreationContext| c.store.get(c.invoice.id()).map(|i| i.id() == c.invoice.id()).unwrap_or(true),
                |c: &mut CreationContext, pre: &CreationContext| *c = pre.clone(),
            ),
            BoundInvariant::with_restore(
                "002",
                Criticality::Critical,
                &[],
                |c: &CreationContext| {
                    (MIN_INVOICE_AMOUNT_CENTS..=MAX_INVOICE_AMOUNT_CENTS).contains(&c.invoice.amount_cents())
                },
                |c: &CreationContext| {
                    (MIN_INVOICE_AMOUNT_CENTS..=MAX_INVOICE_AMOUNT_CENTS).contains(&c.invoice.amount_cents())
                },
                |c: &mut CreationContext, pre: &CreationContext| *c = pre.clone(),
            ),
            BoundInvariant::with_restore(
                "003",
                Criticality::Critical,
                &[],
                |c: &CreationContext| c.supplier_eligible && c.buyer_eligible && c.distinct_accounts,
                |c: &CreationContext| c.supplier_eligible && c.buyer_eligible && c.distinct_accounts,
                |c: &mut CreationContext, pre: &CreationContext| *c = pre.clone(),
            ),
            BoundInvariant::with_restore(
                "004",
                Criticality::Critical,
                &[],
                |c: &CreationContext| !c.store.has_content_hash(c.invoice.content_hash()),
                |c: &CreationContext| c.store.has_content_hash(c.invoice.content_hash()),
                |c: &mut CreationContext, pre: &CreationContext| *c = pre.clone(),
            ),
            BoundInvariant::with_restore(
                "007",
                Criticality::Critical,
                &[],
                |c: &CreationContext| crate::models::terms::ALLOWED_TERMS_DAYS.contains(&c.invoice.terms().days()),
                |c: &CreationContext| crate::models::terms::ALLOWED_TERMS_DAYS.contains(&c.invoice.terms().days()),
                |c: &mut CreationContext, pre: &CreationContext| *c = pre.clone(),
            ),
            BoundInvariant::with_restore(
                "602",
                Criticality::Critical,
                &[],
                |c: &CreationContext| c.invoice.line_items_sum_matches(),
                |c: &CreationContext| c.invoice.line_items_sum_matches(),
                |c: &mut CreationContext, pre: &CreationContext| *c = pre.clone(),
            ),
            BoundInvariant::with_restore(
                "404",
                Criticality::Important,
                &[],
                |c: &CreationContext| {
                    c.store
                        .rate_limit_ok(c.invoice.supplier_id(), c.invoice.created_at(), c.max_per_hour)
                },
                |_c: &CreationContext| true,
                |c: &mut CreationContext, pre: &CreationContext| *c = pre.clone(),
            ),
        ];

        EnforcementKernel::enforce(&mut self.ledger, &self.secret, now, invariants, &mut ctx, |c| {
            c.store.insert(c.invoice.clone())
        })?;

        self.store = ctx.store;
        Ok(invoice)
    }

    /// Issue a pricing quote for an already-created invoice.
    pub fn issue_quote(&mut self, invoice_id: &str) -> Result<PricingQuote, OrchestratorError> {
        let now = self.clock.now_unix_secs();
        let invoice = self.store.get(invoice_id).ok_or_else(|| OrchestratorError::NotFound(invoice_id.to_string()))?;
        let quote = pricing::issue_quote(invoice, now);
        self.quotes.insert(invoice_id.to_string(), quote.clone());
        Ok(quote)
    }

    /// Compute the HMAC a buyer must present to accept `invoice_id`
    /// (invariant 403) — the crate's stand-in for an asymmetric signature
    /// over the invoice content hash, verifiable only by holders of the
    /// process secret (see DESIGN.md).
    pub fn issue_acceptance_signature(&self, invoice_id: &str, buyer_id: &str) -> Result<String, OrchestratorError> {
        let invoice = self
            .store
            .get(invoice_id)
            .ok_or_else(|| OrchestratorError::NotFound(invoice_id.to_string()))?;
        Ok(Self::sign_acceptance(invoice.content_hash(), buyer_id, &self.secret))
    }

    fn sign_acceptance(content_hash: &str, buyer_id: &str, secret: &ProcessSecret) -> String {
        use hmac::{Hmac, Mac};
        use sha2::Sha256;
        type HmacSha256 = Hmac<Sha256>;
        let mut mac = HmacSha256::new_from_slice(secret.as_bytes()).expect("HMAC accepts any key length");
        mac.update(content_hash.as_bytes());
        mac.update(b"|");
        mac.update(buyer_id.as_bytes());
        let bytes = mac.finalize().into_bytes();
        bytes.iter().map(|b| format!("{:02x}", b)).collect()
    }

    /// Score fraud, then run acceptance through the kernel with invariants
    /// 103, 104, 202, 003, 401, 402, 403 bound (spec §4.5). The invoice
    /// moves to Accepted/FraudReview/Rejected depending on the fraud
    /// classification only if every acceptance invariant holds.
    pub fn accept_invoice(
        &mut self,
        invoice_id: &str,
        buyer_id: &str,
        signature: &str,
        fraud_ctx: FraudContext,
    ) -> Result<FraudAction, OrchestratorError> {
        let now = self.clock.now_unix_secs();
        let invoice = self
            .store
            .get(invoice_id)
            .cloned()
            .ok_or_else(|| OrchestratorError::NotFound(invoice_id.to_string()))?;

        let fraud_score = fraud::score(invoice_id, &fraud_ctx, now);
        let action = fraud_score.classification().action();
        let expected_signature = Self::sign_acceptance(invoice.content_hash(), buyer_id, &self.secret);
        let target_status = match action {
            FraudAction::Reject => InvoiceStatus::Rejected,
            FraudAction::Review => InvoiceStatus::FraudReview,
            FraudAction::Approve => InvoiceStatus::Accepted,
        };

        let mut ctx = AcceptanceContext {
            invoice,
            quote: self.quotes.get(invoice_id).cloned(),
            fraud_score: fraud_score.clone(),
            accounts: self.accounts.clone(),
            authenticated_buyer_id: buyer_id.to_string(),
            signature: signature.to_string(),
            expected_signature,
        };

        let invariants: Vec<BoundInvariant<'_, AcceptanceContext>> = vec![
            BoundInvariant::with_restore(
                "103",
                Criticality::Critical,
                &[],
                move |c: &AcceptanceContext| c.quote.as_ref().map(|q| q.is_valid_at(now)).unwrap_or(false),
                move |c: &AcceptanceContext| c.quote.as_ref().map(|q| q.is_valid_at(now)).unwrap_or(false),
                |c: &mut AcceptanceContext, pre: &AcceptanceContext| *c = pre.clone(),
            ),
            BoundInvariant::with_restore(
                "104",
                Criticality::Critical,
                &[],
                |c: &AcceptanceContext| c.authenticated_buyer_id == c.invoice.buyer_id(),
                |c: &AcceptanceContext| c.authenticated_buyer_id == c.invoice.buyer_id(),
                |c: &mut AcceptanceContext, pre: &AcceptanceContext| *c = pre.clone(),
            ),
            BoundInvariant::with_restore(
                "202",
                Criticality::Critical,
                &[],
                move |c: &AcceptanceContext| c.fraud_score.is_fresh_at(now),
                move |c: &AcceptanceContext| c.fraud_score.is_fresh_at(now),
                |c: &mut AcceptanceContext, pre: &AcceptanceContext| *c = pre.clone(),
            ),
            BoundInvariant::with_restore(
                "003",
                Criticality::Critical,
                &[],
                |c: &AcceptanceContext| {
                    c.accounts.get(c.invoice.supplier_id()).map(|a| a.is_active()).unwrap_or(false)
                        && c.accounts.get(c.invoice.buyer_id()).map(|a| a.is_active()).unwrap_or(false)
                },
                |c: &AcceptanceContext| {
                    c.accounts.get(c.invoice.supplier_id()).map(|a| a.is_active()).unwrap_or(false)
                        && c.accounts.get(c.invoice.buyer_id()).map(|a| a.is_active()).unwrap_or(false)
                },
                |c: &mut AcceptanceContext, pre: &AcceptanceContext| *c = pre.clone(),
            ),
            BoundInvariant::with_restore(
                "401",
                Criticality::Critical,
                &[],
                |c: &AcceptanceContext| {
                    !c.accounts.get(c.invoice.supplier_id()).map(|a| a.is_sanctioned()).unwrap_or(true)
                        && !c.accounts.get(c.invoice.buyer_id()).map(|a| a.is_sanctioned()).unwrap_or(true)
                },
                |c: &AcceptanceContext| {
                    !c.accounts.get(c.invoice.supplier_id()).map(|a| a.is_sanctioned()).unwrap_or(true)
                        && !c.accounts.get(c.invoice.buyer_id()).map(|a| a.is_sanctioned()).unwrap_or(true)
                },
                |c: &mut AcceptanceContext, pre: &AcceptanceContext| *c = pre.clone(),
            ),
            BoundInvariant::with_restore(
                "402",
                Criticality::Critical,
                &[],
                |c: &AcceptanceContext| {
                    c.accounts.get(c.invoice.supplier_id()).map(|a| a.is_kyc_verified()).unwrap_or(false)
                        && c.accounts.get(c.invoice.buyer_id()).map(|a| a.is_kyc_verified()).unwrap_or(false)
                },
                |c: &AcceptanceContext| {
                    c.accounts.get(c.invoice.supplier_id()).map(|a| a.is_kyc_verified()).unwrap_or(false)
                        && c.accounts.get(c.invoice.buyer_id()).map(|a| a.is_kyc_verified()).unwrap_or(false)
                },
                |c: &mut AcceptanceContext, pre: &AcceptanceContext| *c = pre.clone(),
            ),
            BoundInvariant::with_restore(
                "403",
                Criticality::Critical,
                &[],
                |c: &AcceptanceContext| c.signature == c.expected_signature,
                |c: &AcceptanceContext| c.signature == c.expected_signature,
                |c: &mut AcceptanceContext, pre: &AcceptanceContext| *c = pre.clone(),
            ),
        ];

        EnforcementKernel::enforce(&mut self.ledger, &self.secret, now, invariants, &mut ctx, |c| {
            lifecycle::transition(&mut c.invoice, target_status)
        })?;

        self.fraud_scores.insert(invoice_id.to_string(), fraud_score);
        let invoice_mut = self
            .store
            .get_mut(invoice_id)
            .ok_or_else(|| OrchestratorError::NotFound(invoice_id.to_string()))?;
        *invoice_mut = ctx.invoice;

        Ok(action)
    }

    /// Run the capital auction, route to a settlement rail, and execute
    /// the atomic three-leg transfer.
    pub fn settle_invoice(&mut self, invoice_id: &str, strategy: RoutingStrategy) -> Result<Settlement, OrchestratorError> {
        let now = self.clock.now_unix_secs();
        let invoice = self
            .store
            .get(invoice_id)
            .ok_or_else(|| OrchestratorError::NotFound(invoice_id.to_string()))?
            .clone();

        let mut auction = auction::run_auction(
            invoice_id,
            invoice.amount_cents(),
            invoice.terms(),
            &self.providers,
            &mut self.rng,
            now,
        );
        let winner = auction::finalize_auction(&mut auction, now + 11)?;
        self.auctions.insert(invoice_id.to_string(), auction);

        let rail = router::select_rail(&self.rails, invoice.amount_cents(), strategy, now)?;
        let rail_name = rail.name().to_string();
        let rail = rail.clone();

        let already_settled = self
            .settlements
            .get(invoice_id)
            .map(|s| s.status() == SettlementStatus::Completed)
            .unwrap_or(false);

        let settlement = Settlement::new(invoice_id, invoice.amount_cents(), winner.discount_rate(), now);
        let providers_by_id: HashMap<String, CapitalProvider> =
            self.providers.iter().map(|p| (p.id().to_string(), p.clone())).collect();

        let ctx = SettlementContext {
            accounts: self.accounts.clone(),
            providers: providers_by_id,
            settlement,
            supplier_id: invoice.supplier_id().to_string(),
            buyer_id: invoice.buyer_id().to_string(),
            provider_id: winner.provider_id().to_string(),
            rail,
            already_settled,
        };

        let result = settlement::execute(&mut self.ledger, &self.secret, now, ctx).map_err(|e| {
            self.settlements.insert(invoice_id.to_string(), e.settlement.clone());
            OrchestratorError::Settlement(e.to_string())
        })?;

        self.accounts = result.accounts.clone();
        if let Some(p) = self.providers.iter_mut().find(|p| p.id() == winner.provider_id()) {
            if let Some(updated) = result.providers.get(p.id()) {
                *p = updated.clone();
            }
        }

        let invoice_mut = self
            .store
            .get_mut(invoice_id)
            .ok_or_else(|| OrchestratorError::NotFound(invoice_id.to_string()))?;
        lifecycle::transition(invoice_mut, InvoiceStatus::Settled)?;

        if let Some(r) = self.rails.iter_mut().find(|r| r.name() == rail_name) {
            r.add_volume(invoice.amount_cents());
        }

        self.settlements.insert(invoice_id.to_string(), result.settlement.clone());
        Ok(result.settlement)
    }

    /// Point-in-time health snapshot (spec §6).
    pub fn health(&self, active_recurring_templates: usize) -> HealthSnapshot {
        HealthSnapshot {
            invoices_stored: self.store.len(),
            ledger_entries: self.ledger.len(),
            ledger_passed: self.ledger.passed_count(),
            ledger_rollbacks: self.ledger.rollback_count(),
            ledger_chain_intact: self.ledger.verify_chain_integrity(&self.secret),
            active_recurring_templates,
        }
    }
}
