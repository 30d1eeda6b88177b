//! Settlement engine (C12, spec §4.12): the atomic three-leg transfer that
//! moves an accepted invoice to SETTLED, run entirely through the
//! enforcement kernel so a failed leg rolls back every other leg.

use std::collections::HashMap;

use serde::Serialize;
use thiserror::Error;

use crate::balance::{AccountLedger, BalanceError};
use crate::core::secret::ProcessSecret;
use crate::invariant::Criticality;
use crate::kernel::{BoundInvariant, EnforcementKernel, KernelError};
use crate::ledger::DecisionLedger;
use crate::models::provider::CapitalProvider;
use crate::models::rail::SettlementRail;
use crate::models::settlement::{Settlement, SettlementLeg, SettlementStatus};
use crate::money;

#[derive(Debug, Error)]
pub enum SettlementError {
    #[error("capital provider {0} not found")]
    ProviderNotFound(String),
    #[error(transparent)]
    Balance(#[from] BalanceError),
}

/// A settlement attempt that the kernel rolled back. Carries the
/// `Settlement` record (marked `Failed`, legs cleared) alongside the
/// triggering error so the orchestrator can keep it in its history.
#[derive(Debug)]
pub struct SettlementExecuteError {
    pub kernel: KernelError<SettlementError>,
    pub settlement: Settlement,
}

impl std::fmt::Display for SettlementExecuteError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.kernel)
    }
}

impl std::error::Error for SettlementExecuteError {}

/// Everything the kernel needs snapshotted around a settlement attempt.
#[derive(Debug, Clone, Serialize)]
pub struct SettlementContext {
    pub accounts: AccountLedger,
    pub providers: HashMap<String, CapitalProvider>,
    pub settlement: Settlement,
    pub supplier_id: String,
    pub buyer_id: String,
    pub provider_id: String,
    /// The rail selected for this settlement (invariant 206).
    pub rail: SettlementRail,
    /// Whether a completed `Settlement` already exists for this invoice
    /// (invariant 006) — set by the caller from its settlement history.
    pub already_settled: bool,
}

/// Run the three legs (capital advance, supplier credit, buyer obligation
/// booking) under the kernel with the deadline/financial invariants bound.
pub fn execute(
    ledger: &mut DecisionLedger,
    secret: &ProcessSecret,
    now: i64,
    mut ctx: SettlementContext,
) -> Result<SettlementContext, SettlementExecuteError> {
    /// Restore accounts/providers from the pre-action snapshot and mark the
    /// settlement record `Failed` rather than silently reverting it to its
    /// pre-attempt `Pending` state — a rolled-back settlement should still
    /// say so in the history the orchestrator keeps.
    fn restore_and_fail(c: &mut SettlementContext, pre: &SettlementContext) {
        c.accounts = pre.accounts.clone();
        c.providers = pre.providers.clone();
        let mut settlement = pre.settlement.clone();
        settlement.set_status(SettlementStatus::Failed);
        c.settlement = settlement;
    }

    let invariants: Vec<BoundInvariant<'_, SettlementContext>> = vec![
        BoundInvariant::with_restore(
            "006",
            Criticality::Critical,
            &[],
            |c: &SettlementContext| !c.already_settled,
            |c: &SettlementContext| !c.already_settled,
            restore_and_fail,
        ),
        BoundInvariant::with_restore(
            "102",
            Criticality::Critical,
            &["006"],
            |_c: &SettlementContext| true,
            |c: &SettlementContext| c.settlement.has_all_legs(),
            restore_and_fail,
        ),
        BoundInvariant::with_restore(
            "201",
            Criticality::Critical,
            &["102"],
            |_c: &SettlementContext| true,
            |c: &SettlementContext| {
                c.settlement
                    .completed_at()
                    .map(|done| done - c.settlement.started_at() < 5)
                    .unwrap_or(false)
            },
            restore_and_fail,
        ),
        BoundInvariant::with_restore(
            "206",
            Criticality::Critical,
            &["102"],
            move |c: &SettlementContext| c.rail.is_healthy_at(now),
            move |c: &SettlementContext| c.rail.is_healthy_at(now),
            restore_and_fail,
        ),
        BoundInvariant::with_restore(
            "501",
            Criticality::Critical,
            &["102"],
            |_c: &SettlementContext| true,
            |c: &SettlementContext| c.settlement.has_all_legs() && reconciles(&c.settlement),
            restore_and_fail,
        ),
    ];

    match EnforcementKernel::enforce(ledger, secret, now, invariants, &mut ctx, |c| run_legs(c, now)) {
        Ok(()) => Ok(ctx),
        Err(kernel) => Err(SettlementExecuteError { kernel, settlement: ctx.settlement }),
    }
}

/// spec §4.12 step 3: Leg 1 transfers `amount` from capital_provider to
/// supplier; Leg 2 transfers `amount*(1+discount_rate)` from buyer to
/// capital_provider; Leg 3 records the capital-advance ledger event.
fn run_legs(ctx: &mut SettlementContext, now: i64) -> Result<(), SettlementError> {
    let amount_cents = ctx.settlement.amount_cents();
    let buyer_cost_cents = ctx.settlement.buyer_cost_cents();

    // Leg 1: debit capital_provider, credit supplier.
    let provider = ctx
        .providers
        .get_mut(&ctx.provider_id)
        .ok_or_else(|| SettlementError::ProviderNotFound(ctx.provider_id.clone()))?;
    provider.reserve_liquidity(amount_cents);
    ctx.accounts.credit(&ctx.supplier_id, amount_cents)?;

    // Leg 2: debit buyer, credit capital_provider.
    ctx.accounts.debit(&ctx.buyer_id, buyer_cost_cents)?;
    let buyer = ctx.accounts.get(&ctx.buyer_id).ok_or_else(|| BalanceError::NotFound(ctx.buyer_id.clone()))?;
    let new_outstanding = buyer.outstanding_balance_cents() + buyer_cost_cents;
    ctx.accounts.set_outstanding_balance(&ctx.buyer_id, new_outstanding)?;
    let provider = ctx
        .providers
        .get_mut(&ctx.provider_id)
        .ok_or_else(|| SettlementError::ProviderNotFound(ctx.provider_id.clone()))?;
    provider.credit_liquidity(buyer_cost_cents);

    // Leg 3: record the capital-advance ledger event.
    ctx.settlement.record_capital_advance(leg(&ctx.provider_id, amount_cents, now));
    ctx.settlement.record_supplier_credit(leg(&ctx.supplier_id, amount_cents, now));
    ctx.settlement.record_buyer_debit(leg(&ctx.buyer_id, buyer_cost_cents, now));
    ctx.settlement.complete(now);

    Ok(())
}

/// Invariant 501: the credit side of the three legs (supplier's principal,
/// the provider's repayment) equals the debit side (the provider's
/// principal outlay, the buyer's repayment) within 0.01.
fn reconciles(settlement: &Settlement) -> bool {
    let supplier_credit = settlement.supplier_credit().map(|l| l.amount_cents).unwrap_or(0);
    let buyer_debit = settlement.buyer_debit().map(|l| l.amount_cents).unwrap_or(0);
    let capital_advance = settlement.capital_advance().map(|l| l.amount_cents).unwrap_or(0);

    let credits = supplier_credit + buyer_debit;
    let debits = capital_advance + buyer_debit;
    money::approx_eq(credits, debits)
}

fn leg(account_id: &str, amount_cents: i64, timestamp: i64) -> SettlementLeg {
    SettlementLeg {
        account_id: account_id.to_string(),
        amount_cents,
        timestamp,
        txn_id: uuid::Uuid::new_v4().to_string(),
    }
}
