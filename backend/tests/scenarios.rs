//! End-to-end scenarios exercised through the public `Orchestrator` API,
//! one per concrete case in the network's testable-properties list.

use std::collections::HashSet;

use itn_core_rs::auction;
use itn_core_rs::core::clock::ManualClock;
use itn_core_rs::core::secret::ProcessSecret;
use itn_core_rs::fraud::FraudContext;
use itn_core_rs::models::account::{Account, AccountStatus, KycStatus};
use itn_core_rs::models::fraud::FraudAction;
use itn_core_rs::models::invoice::InvoiceStatus;
use itn_core_rs::models::line_item::LineItem;
use itn_core_rs::models::provider::{CapitalProvider, RiskAppetite};
use itn_core_rs::models::rail::{RailStatus, SettlementRail};
use itn_core_rs::models::recurring::{Frequency, RecurringTemplate};
use itn_core_rs::models::terms::Terms;
use itn_core_rs::models::version::{ArtifactVersion, ChangeType, SemVer};
use itn_core_rs::kernel::Phase2;
use itn_core_rs::orchestrator::{Orchestrator, OrchestratorError};
use itn_core_rs::recurring;
use itn_core_rs::router::RoutingStrategy;
use itn_core_rs::rng::RngManager;
use itn_core_rs::versioning::VersionGraph;

fn orchestrator() -> Orchestrator<ManualClock> {
    let mut orch = Orchestrator::new(ManualClock::new(0), ProcessSecret::from_bytes(b"scenario-secret".to_vec()), 11);
    orch.register_account(Account::new("SUP-001").with_status(AccountStatus::Active).with_kyc(KycStatus::Verified));
    orch.register_account(
        Account::new("BUY-001")
            .with_status(AccountStatus::Active)
            .with_kyc(KycStatus::Verified)
            .with_credit_limit(10_000_000_00),
    );
    let mut rail = SettlementRail::new("RTP", 500, 900, 0.99, 10, 1_000_000_000_00);
    rail.record_health_check(0, RailStatus::Up);
    orch.register_rail(rail);
    orch
}

fn terms30() -> HashSet<Terms> {
    let mut t = HashSet::new();
    t.insert(Terms::new(30).unwrap());
    t
}

fn clean_fraud_ctx() -> FraudContext {
    FraudContext {
        invoices_by_supplier_last_hour: 1,
        amount_cents: 10_000_00,
        supplier_avg_amount_cents: 10_000_00,
        relationship_age_days: 365,
        is_duplicate_content_pattern: false,
        supplier_country: "US".to_string(),
        buyer_country: "US".to_string(),
        hour_of_day_utc: 12,
        seconds_since_quote_issued: 60,
    }
}

/// Scenario 1: create INV with supplier=SUP-001, buyer=BUY-001, items
/// {Pumps,20,2500}+{Install,1,5000}, terms=30 -> PENDING, amount 55,000,
/// content hash H; re-creating the identical invoice is rejected and the
/// store is left unchanged.
#[test]
fn scenario_1_duplicate_content_hash_is_rejected_and_store_unchanged() {
    let mut orch = orchestrator();
    let items = || vec![LineItem::new("Pumps", 20, 2_500_00).unwrap(), LineItem::new("Install", 1, 5_000_00).unwrap()];

    let invoice = orch.create_invoice("SUP-001", "BUY-001", "USD", Terms::new(30).unwrap(), items()).unwrap();
    assert_eq!(invoice.status(), InvoiceStatus::Pending);
    assert_eq!(invoice.amount_cents(), 55_000_00);

    let before = orch.store.len();
    let result = orch.create_invoice("SUP-001", "BUY-001", "USD", Terms::new(30).unwrap(), items());
    match result {
        Err(OrchestratorError::InvariantViolation(failure)) => {
            assert_eq!(failure.invariant_id, "004");
            assert_eq!(failure.phase, Phase2::Pre);
        }
        other => panic!("expected InvariantViolation(004, Pre), got {other:?}"),
    }
    assert_eq!(orch.store.len(), before, "store must be unchanged after a rejected duplicate");
}

/// Scenario 2: an invoice below the catalog's minimum financeable amount
/// is rejected before it ever reaches the store.
#[test]
fn scenario_2_below_minimum_amount_is_rejected() {
    let mut orch = orchestrator();
    let items = vec![LineItem::new("Small", 1, 50_00).unwrap()];
    let before = orch.store.len();

    let result = orch.create_invoice("SUP-001", "BUY-001", "USD", Terms::new(30).unwrap(), items);
    match result {
        Err(OrchestratorError::InvariantViolation(failure)) => {
            assert_eq!(failure.invariant_id, "002");
            assert_eq!(failure.phase, Phase2::Pre);
        }
        other => panic!("expected InvariantViolation(002, Pre), got {other:?}"),
    }
    assert_eq!(orch.store.len(), before);
}

/// Scenario 3: a suspended buyer cannot be party to a new invoice.
#[test]
fn scenario_3_suspended_buyer_is_rejected_at_creation() {
    let mut orch = orchestrator();
    orch.register_account(
        Account::new("BUY-002")
            .with_status(AccountStatus::Suspended)
            .with_kyc(KycStatus::Verified)
            .with_credit_limit(10_000_000_00),
    );
    let items = vec![LineItem::new("Goods", 1, 10_000_00).unwrap()];

    let result = orch.create_invoice("SUP-001", "BUY-002", "USD", Terms::new(30).unwrap(), items);
    match result {
        Err(OrchestratorError::InvariantViolation(failure)) => {
            assert_eq!(failure.invariant_id, "003");
            assert_eq!(failure.phase, Phase2::Pre);
        }
        other => panic!("expected InvariantViolation(003, Pre), got {other:?}"),
    }
}

/// Scenario 4: accept then settle leaves exactly one advance and the
/// supplier/buyer legs tied to the invoice, ledger balanced, completed
/// well within the settlement deadline.
#[test]
fn scenario_4_accept_then_settle_balances_all_three_legs() {
    let mut orch = orchestrator();
    orch.register_provider(CapitalProvider::new("PROV-001", 10_000_000_00, 1_00, 10_000_000_00, terms30(), RiskAppetite::Low));

    let items = vec![LineItem::new("Goods", 1, 50_000_00).unwrap()];
    let invoice = orch.create_invoice("SUP-001", "BUY-001", "USD", Terms::new(30).unwrap(), items).unwrap();
    orch.issue_quote(invoice.id()).unwrap();
    let signature = orch.issue_acceptance_signature(invoice.id(), "BUY-001").unwrap();
    let action = orch.accept_invoice(invoice.id(), "BUY-001", &signature, clean_fraud_ctx()).unwrap();
    assert_eq!(action, FraudAction::Approve);

    let settlement = orch.settle_invoice(invoice.id(), RoutingStrategy::Balanced).unwrap();
    assert!(settlement.has_all_legs());

    let supplier = orch.accounts.get("SUP-001").unwrap();
    let buyer = orch.accounts.get("BUY-001").unwrap();
    let provider = orch.providers.iter().find(|p| p.id() == "PROV-001").unwrap();
    let buyer_cost_cents = settlement.buyer_cost_cents();

    assert_eq!(supplier.balance_cents(), 50_000_00, "supplier is credited the full invoice amount instantly");
    assert!(
        buyer_cost_cents > 50_000_00,
        "buyer's actual charge includes the financing fee on top of principal"
    );
    assert_eq!(buyer.balance_cents(), -buyer_cost_cents, "buyer's cash balance is debited the full charge, not just booked");
    assert_eq!(buyer.outstanding_balance_cents(), buyer_cost_cents);
    assert_eq!(
        provider.available_liquidity_cents(),
        10_000_000_00 - 50_000_00 + buyer_cost_cents,
        "provider nets the financing fee after advancing principal and collecting repayment"
    );
    assert_eq!(orch.store.get(invoice.id()).unwrap().status(), InvoiceStatus::Settled);

    let health = orch.health(0);
    assert!(health.ledger_chain_intact);
    assert_eq!(health.ledger_rollbacks, 0);
}

/// Scenario 5: an auction with four eligible providers draws at least
/// three active bids and the winner is the cheapest rate.
#[test]
fn scenario_5_auction_with_four_providers_is_competitive() {
    let providers = vec![
        CapitalProvider::new("P1", 10_000_000_00, 1_00, 10_000_000_00, terms30(), RiskAppetite::Low),
        CapitalProvider::new("P2", 10_000_000_00, 1_00, 10_000_000_00, terms30(), RiskAppetite::Low),
        CapitalProvider::new("P3", 10_000_000_00, 1_00, 10_000_000_00, terms30(), RiskAppetite::Medium),
        CapitalProvider::new("P4", 10_000_000_00, 1_00, 10_000_000_00, terms30(), RiskAppetite::High),
    ];
    let mut rng = RngManager::new(42);
    let mut the_auction = auction::run_auction("INV-001", 100_000_00, Terms::new(30).unwrap(), &providers, &mut rng, 0);
    assert!(the_auction.active_bids_at(0).len() >= 3);

    let winner = auction::finalize_auction(&mut the_auction, 11).unwrap();
    let cheapest = the_auction
        .bids()
        .iter()
        .min_by(|a, b| a.discount_rate().partial_cmp(&b.discount_rate()).unwrap())
        .unwrap();
    assert_eq!(winner.id(), cheapest.id());
}

/// Scenario 6: a stacked-signal fraud construction crosses the 0.75
/// critical threshold and the invoice is rejected rather than settled.
#[test]
fn scenario_6_fraud_construction_blocks_invoice_before_settlement() {
    let mut orch = orchestrator();
    let items = vec![LineItem::new("Suspicious bulk order", 1, 500_000_00).unwrap()];
    let invoice = orch.create_invoice("SUP-001", "BUY-001", "USD", Terms::new(30).unwrap(), items).unwrap();
    orch.issue_quote(invoice.id()).unwrap();

    let suspicious_ctx = FraudContext {
        invoices_by_supplier_last_hour: 25,
        amount_cents: 500_000_00,
        supplier_avg_amount_cents: 5_000_00,
        relationship_age_days: 0,
        is_duplicate_content_pattern: true,
        supplier_country: "US".to_string(),
        buyer_country: "US".to_string(),
        hour_of_day_utc: 12,
        seconds_since_quote_issued: 60,
    };

    let signature = orch.issue_acceptance_signature(invoice.id(), "BUY-001").unwrap();
    let action = orch.accept_invoice(invoice.id(), "BUY-001", &signature, suspicious_ctx).unwrap();
    assert_eq!(action, FraudAction::Reject);
    assert_eq!(orch.store.get(invoice.id()).unwrap().status(), InvoiceStatus::Rejected);
    assert!(orch.settlements.is_empty(), "no settlement should ever be created for a rejected invoice");
}

/// Scenario 7: a monthly recurring template produces one occurrence per
/// scan at the expected cadence and completes once it hits its
/// `max_occurrences` cap.
#[test]
fn scenario_7_recurring_template_generates_until_max_occurrences() {
    let start = 0;
    let mut template =
        RecurringTemplate::new("TPL-1", "SUP-001", "BUY-001", 10_000_00, "USD", Frequency::Monthly, start, None, Some(12));

    let occ1 = recurring::generate_due(&mut template, Terms::new(30).unwrap(), start).unwrap();
    assert_eq!(occ1.amount_cents(), 10_000_00);
    assert_eq!(template.occurrences_created(), 1);

    recurring::generate_due(&mut template, Terms::new(30).unwrap(), start + 30 * 86_400).unwrap();
    assert_eq!(template.occurrences_created(), 2);
    recurring::generate_due(&mut template, Terms::new(30).unwrap(), start + 60 * 86_400).unwrap();
    assert_eq!(template.occurrences_created(), 3);
    assert_eq!(template.next_occurrence_id(), "TPL-1-OCC-004");

    // Advance to the 12th occurrence (T0 + 330 days at a 30-day cadence).
    for i in 4..=12 {
        let due_at = start + (i - 1) * 30 * 86_400;
        recurring::generate_due(&mut template, Terms::new(30).unwrap(), due_at).unwrap();
    }
    assert_eq!(template.occurrences_created(), 12);
    assert_eq!(template.status(), itn_core_rs::models::recurring::TemplateStatus::Completed);
    assert!(!template.should_generate(start + 1_000 * 86_400));
}

/// Scenario 8: migrating 1.0.0 -> 2.1.0 walks through every intermediate
/// version's feature set; rolling back to 1.1.0 drops the later features
/// while keeping what 1.1.0 already introduced.
#[test]
fn scenario_8_migration_and_rollback_change_the_active_feature_set() {
    fn active_features(graph: &VersionGraph, registered: &[ArtifactVersion]) -> Vec<String> {
        let current = graph.current().unwrap();
        registered
            .iter()
            .filter(|v| v.version <= current)
            .flat_map(|v| v.changes.iter().cloned())
            .collect()
    }

    let registered = vec![
        ArtifactVersion::new(SemVer::new(1, 0, 0), ChangeType::Major, vec!["base".into()], false, 0),
        ArtifactVersion::new(SemVer::new(1, 1, 0), ChangeType::Minor, vec!["timestamps".into()], false, 5),
        ArtifactVersion::new(
            SemVer::new(2, 0, 0),
            ChangeType::Major,
            vec!["multi_currency".into(), "fx_rates".into(), "security".into()],
            true,
            30,
        ),
        ArtifactVersion::new(SemVer::new(2, 1, 0), ChangeType::Minor, vec!["security_hardening".into()], false, 10),
    ];

    let mut graph = VersionGraph::new();
    for v in &registered {
        graph.register(v.clone());
    }

    graph.migrate(SemVer::new(2, 1, 0), 100).unwrap();
    assert_eq!(graph.current(), Some(SemVer::new(2, 1, 0)));
    assert_eq!(graph.log().len(), 3);
    let after_migrate = active_features(&graph, &registered);
    for feature in ["timestamps", "multi_currency", "fx_rates", "security", "security_hardening"] {
        assert!(after_migrate.iter().any(|f| f == feature), "missing {feature} after migrating to 2.1.0");
    }

    // Roll back step by step to 1.1.0: 2.1.0 -> 2.0.0 -> 1.1.0.
    graph.rollback(200).unwrap();
    graph.rollback(200).unwrap();
    assert_eq!(graph.current(), Some(SemVer::new(1, 1, 0)));

    let after_rollback = active_features(&graph, &registered);
    assert!(after_rollback.iter().any(|f| f == "timestamps"), "1.1.0's own feature must survive rollback");
    for feature in ["multi_currency", "fx_rates", "security", "security_hardening"] {
        assert!(!after_rollback.iter().any(|f| f == feature), "{feature} must be gone after rolling back to 1.1.0");
    }
}
