//! Enforcement Kernel (C3, spec §4.3): the only path allowed to mutate a
//! persisted entity. Every mutation is wrapped in topologically-ordered
//! pre-checks, the action itself, topologically-ordered post-checks, and —
//! on any failure — a reverse-order compensating rollback.

use serde::Serialize;
use thiserror::Error;

use crate::core::secret::ProcessSecret;
use crate::invariant::Criticality;
use crate::ledger::DecisionLedger;
use crate::models::ledger_entry::{EnforcementAction, Phase};

/// An invariant bound to a concrete enforcement context: its metadata from
/// the catalog plus the closures that actually evaluate it against `Ctx`.
pub struct BoundInvariant<'a, Ctx> {
    pub id: &'static str,
    pub criticality: Criticality,
    pub dependencies: &'static [&'static str],
    pre: Box<dyn Fn(&Ctx) -> bool + 'a>,
    post: Box<dyn Fn(&Ctx) -> bool + 'a>,
    rollback: Box<dyn Fn(&mut Ctx, &Ctx) -> bool + 'a>,
}

impl<'a, Ctx> BoundInvariant<'a, Ctx> {
    pub fn new(
        id: &'static str,
        criticality: Criticality,
        dependencies: &'static [&'static str],
        pre: impl Fn(&Ctx) -> bool + 'a,
        post: impl Fn(&Ctx) -> bool + 'a,
        rollback: impl Fn(&mut Ctx, &Ctx) -> bool + 'a,
    ) -> Self {
        Self {
            id,
            criticality,
            dependencies,
            pre: Box::new(pre),
            post: Box::new(post),
            rollback: Box::new(rollback),
        }
    }

    /// An invariant whose rollback is a no-op restore of a `Clone`-captured
    /// pre-state via a caller-supplied assignment closure.
    pub fn with_restore(
        id: &'static str,
        criticality: Criticality,
        dependencies: &'static [&'static str],
        pre: impl Fn(&Ctx) -> bool + 'a,
        post: impl Fn(&Ctx) -> bool + 'a,
        restore: impl Fn(&mut Ctx, &Ctx) + 'a,
    ) -> Self {
        Self::new(id, criticality, dependencies, pre, post, move |ctx, pre_state| {
            restore(ctx, pre_state);
            true
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase2 {
    Pre,
    Post,
}

#[derive(Debug, Error)]
pub enum InvariantViolation {
    #[error("invariant {invariant_id} failed in {phase:?} phase")]
    Failed { phase: Phase2, invariant_id: String },
    #[error("cyclic dependency detected among invariants: {0}")]
    CyclicDependency(String),
}

#[derive(Debug, Error)]
#[error("rollback of invariant {invariant_id} failed; system requires operator intervention")]
pub struct SystemCompromised {
    pub invariant_id: String,
}

#[derive(Debug, Error)]
pub enum KernelError<E: std::fmt::Debug + std::fmt::Display> {
    #[error(transparent)]
    Invariant(#[from] InvariantViolation),
    #[error(transparent)]
    Compromised(#[from] SystemCompromised),
    #[error("action failed: {0}")]
    Action(E),
}

pub struct EnforcementKernel;

impl EnforcementKernel {
    /// Run `action` under the given set of invariants. Pre-checks run in
    /// dependency order; on first failure the kernel freezes and returns
    /// without running the action. Post-check or action failure triggers a
    /// reverse-order rollback using the pre-action snapshot.
    #[allow(clippy::too_many_arguments)]
    pub fn enforce<Ctx, E>(
        ledger: &mut DecisionLedger,
        secret: &ProcessSecret,
        now: i64,
        invariants: Vec<BoundInvariant<'_, Ctx>>,
        ctx: &mut Ctx,
        action: impl FnOnce(&mut Ctx) -> Result<(), E>,
    ) -> Result<(), KernelError<E>>
    where
        Ctx: Clone + Serialize,
        E: std::fmt::Debug + std::fmt::Display,
    {
        let order = topo_sort(&invariants)
            .map_err(|id| KernelError::Invariant(InvariantViolation::CyclicDependency(id)))?;
        let pre_state = ctx.clone();

        for &i in &order {
            let inv = &invariants[i];
            let ok = (inv.pre)(ctx);
            let action_taken = if ok { EnforcementAction::Proceed } else { EnforcementAction::Freeze };
            ledger.record(inv.id, Phase::Pre, ok, action_taken, now, ctx, secret);
            if !ok {
                return Err(KernelError::Invariant(InvariantViolation::Failed {
                    phase: Phase2::Pre,
                    invariant_id: inv.id.to_string(),
                }));
            }
        }

        if let Err(e) = action(ctx) {
            Self::rollback(ledger, secret, now, &invariants, &order, ctx, &pre_state)?;
            return Err(KernelError::Action(e));
        }

        for &i in &order {
            let inv = &invariants[i];
            let ok = (inv.post)(ctx);
            let action_taken = if ok { EnforcementAction::Proceed } else { EnforcementAction::Rollback };
            ledger.record(inv.id, Phase::Post, ok, action_taken, now, ctx, secret);
            if !ok {
                Self::rollback(ledger, secret, now, &invariants, &order, ctx, &pre_state)?;
                return Err(KernelError::Invariant(InvariantViolation::Failed {
                    phase: Phase2::Post,
                    invariant_id: inv.id.to_string(),
                }));
            }
        }

        Ok(())
    }

    fn rollback<Ctx, E>(
        ledger: &mut DecisionLedger,
        secret: &ProcessSecret,
        now: i64,
        invariants: &[BoundInvariant<'_, Ctx>],
        order: &[usize],
        ctx: &mut Ctx,
        pre_state: &Ctx,
    ) -> Result<(), KernelError<E>>
    where
        Ctx: Serialize,
        E: std::fmt::Debug + std::fmt::Display,
    {
        for &i in order.iter().rev() {
            let inv = &invariants[i];
            let ok = (inv.rollback)(ctx, pre_state);
            ledger.record(inv.id, Phase::Post, ok, EnforcementAction::Rollback, now, ctx, secret);
            if !ok {
                return Err(KernelError::Compromised(SystemCompromised {
                    invariant_id: inv.id.to_string(),
                }));
            }
        }
        Ok(())
    }
}

/// Kahn's algorithm over declared dependencies, ties broken by ascending
/// invariant id for determinism (spec §4.3 "deterministic iteration order").
fn topo_sort<Ctx>(invariants: &[BoundInvariant<'_, Ctx>]) -> Result<Vec<usize>, String> {
    let n = invariants.len();
    let index_of = |id: &str| invariants.iter().position(|inv| inv.id == id);

    let mut in_degree = vec![0usize; n];
    let mut dependents: Vec<Vec<usize>> = vec![Vec::new(); n];
    for (i, inv) in invariants.iter().enumerate() {
        for dep in inv.dependencies {
            if let Some(d) = index_of(dep) {
                dependents[d].push(i);
                in_degree[i] += 1;
            }
        }
    }

    let mut ready: Vec<usize> = (0..n).filter(|&i| in_degree[i] == 0).collect();
    let mut order = Vec::with_capacity(n);
    while !ready.is_empty() {
        ready.sort_by_key(|&i| invariants[i].id);
        let i = ready.remove(0);
        order.push(i);
        for &dep in &dependents[i] {
            in_degree[dep] -= 1;
            if in_degree[dep] == 0 {
                ready.push(dep);
            }
        }
    }

    if order.len() != n {
        let stuck = (0..n).find(|&i| in_degree[i] > 0).map(|i| invariants[i].id.to_string());
        return Err(stuck.unwrap_or_else(|| "unknown".to_string()));
    }
    Ok(order)
}
