//! Actions (operators and axioms) and their derived views.

use std::collections::{BTreeMap, BTreeSet};

use sasplus_utils::{VarId};

use crate::factset::{Fact, FactSet};

/// Distinguishes an operator from an axiom for pruning/codec bookkeeping.
/// Both are folded into "all actions" for backward relevance and forward
/// reachability; axioms are always zero-cost and never counted towards the
/// plan-cost metric (spec §9, the "axioms as zero-cost actions" open
/// question).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Role {
    Operator,
    Axiom,
}

/// A named precondition/effect/cost record. Preconditions and effects each
/// mention a given variable at most once.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Action {
    pub name: String,
    pub precondition: Vec<Fact>,
    pub effect: Vec<Fact>,
    pub cost: u64,
    pub role: Role,
}

impl Action {
    pub fn new_operator(
        name: impl Into<String>,
        precondition: Vec<Fact>,
        effect: Vec<Fact>,
        cost: u64,
    ) -> Self {
        Self {
            name: name.into(),
            precondition,
            effect,
            cost,
            role: Role::Operator,
        }
    }

    pub fn new_axiom(name: impl Into<String>, precondition: Vec<Fact>, effect: Fact) -> Self {
        Self {
            name: name.into(),
            precondition,
            effect: vec![effect],
            cost: 0,
            role: Role::Axiom,
        }
    }

    fn effect_map(&self) -> BTreeMap<&VarId, &sasplus_utils::ValId> {
        self.effect.iter().map(|(v, x)| (v, x)).collect()
    }

    /// Precondition facts whose variable is not written by the effect, or
    /// is written only to the same value it already holds.
    pub fn prevail(&self) -> Vec<Fact> {
        let effect_map = self.effect_map();
        self.precondition
            .iter()
            .filter(|(var, val)| match effect_map.get(var) {
                None => true,
                Some(&effect_val) => effect_val == val,
            })
            .cloned()
            .collect()
    }

    /// The effect facts that are not prevail facts, each paired with the
    /// precondition value that applies to the same variable, if any.
    /// `None` marks a "don't-care" (any value) precondition -- the `-1`
    /// encoding belongs only at the codec boundary, never in this view.
    pub fn pre_post(&self) -> Vec<(VarId, Option<sasplus_utils::ValId>, sasplus_utils::ValId)> {
        let prevail: BTreeSet<&VarId> = self.prevail().iter().map(|(v, _)| v).collect();
        let precond_map: BTreeMap<&VarId, &sasplus_utils::ValId> =
            self.precondition.iter().map(|(v, x)| (v, x)).collect();
        self.effect
            .iter()
            .filter(|(var, _)| !prevail.contains(var))
            .map(|(var, post)| (var.clone(), precond_map.get(var).map(|v| **v), *post))
            .collect()
    }

    /// The equivalence-class key for merging: the effect restricted to
    /// `relevant_vars`, sorted, paired with the action's cost.
    pub fn effect_fingerprint(&self, relevant_vars: &BTreeSet<VarId>) -> (Vec<Fact>, u64) {
        let mut restricted: Vec<Fact> = self
            .effect
            .iter()
            .filter(|(v, _)| relevant_vars.contains(v))
            .cloned()
            .collect();
        restricted.sort();
        (restricted, self.cost)
    }

    /// True iff every precondition fact is satisfied by `state`.
    pub fn applicable(&self, state: &FactSet) -> bool {
        self.precondition.iter().all(|(var, val)| state.contains(var, *val))
    }

    /// The effective cost contributed to the plan metric: axioms never
    /// count, regardless of what `cost` holds.
    pub fn metric_cost(&self) -> u64 {
        match self.role {
            Role::Operator => self.cost,
            Role::Axiom => 0,
        }
    }
}
