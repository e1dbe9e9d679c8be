//! The `Task`: aggregate container for a scoped or unscoped SAS+ planning
//! problem.

use std::collections::BTreeMap;

use sasplus_utils::{VarId, ValId};

use crate::action::Action;
use crate::factset::{Fact, FactSet};
use crate::mutex::MutexGroup;

#[derive(Clone, Debug, Default)]
pub struct Task {
    pub domains: FactSet,
    pub init: Vec<Fact>,
    pub goal: Vec<Fact>,
    pub actions: Vec<Action>,
    pub axioms: Vec<Action>,
    pub mutexes: Vec<MutexGroup>,
    pub metric: bool,
    pub value_names: BTreeMap<VarId, Vec<String>>,
    /// The codec's per-variable axiom layer (`-1` for a variable no axiom
    /// ever writes). Carried alongside `value_names` purely so the codec
    /// can regenerate a well-formed `begin_variable` block; no analysis in
    /// `sasplus-opt` reads it.
    pub axiom_layers: BTreeMap<VarId, i64>,
    /// The literal `<name>` line declared for a variable in its
    /// `begin_variable` block. `VarId` itself is the `"var{i}"` column-index
    /// key every analysis uses; this table exists only so an unmodified
    /// parse-then-emit round-trip doesn't have to regenerate that name.
    pub var_names: BTreeMap<VarId, String>,
}

impl Task {
    /// Operators and axioms together, the set every analysis in
    /// `sasplus-opt` actually iterates over. Axioms contribute to
    /// relevance/reachability like any other action but are always
    /// zero-cost (spec §9).
    pub fn all_actions(&self) -> impl Iterator<Item = &Action> {
        self.actions.iter().chain(self.axioms.iter())
    }

    /// A one-variable task whose goal can never be reached: the init value
    /// and the only achievable value differ, and no action changes it.
    /// Used when forward reachability proves the original goal unreachable
    /// (spec §7, error kind 3).
    pub fn canonical_trivially_false() -> Self {
        let var = VarId::new("unsolvable");
        let mut domains = FactSet::new();
        domains.add(var.clone(), ValId::new(0));
        domains.add(var.clone(), ValId::new(1));
        Task {
            domains,
            init: vec![(var.clone(), ValId::new(0))],
            goal: vec![(var.clone(), ValId::new(1))],
            actions: vec![],
            axioms: vec![],
            mutexes: vec![],
            metric: false,
            value_names: BTreeMap::new(),
            axiom_layers: BTreeMap::new(),
            var_names: BTreeMap::new(),
        }
    }

    /// A one-variable task whose goal is already satisfied by the initial
    /// state (spec §7, error kind 4: simplification reduces the goal to
    /// empty).
    pub fn canonical_trivially_true() -> Self {
        let var = VarId::new("solved");
        let mut domains = FactSet::new();
        domains.add(var.clone(), ValId::new(0));
        Task {
            domains,
            init: vec![(var.clone(), ValId::new(0))],
            goal: vec![],
            actions: vec![],
            axioms: vec![],
            mutexes: vec![],
            metric: false,
            value_names: BTreeMap::new(),
            axiom_layers: BTreeMap::new(),
            var_names: BTreeMap::new(),
        }
    }

    /// Restrict the value-name table to the surviving variables and
    /// values of `surviving`.
    pub fn restrict_value_names(&self, surviving: &FactSet) -> BTreeMap<VarId, Vec<String>> {
        self.value_names
            .iter()
            .filter(|(var, _)| surviving.variables().any(|v| v == *var))
            .map(|(var, names)| {
                let kept = surviving
                    .values(var)
                    .iter()
                    .filter_map(|val| names.get(val.index()).cloned())
                    .collect();
                (var.clone(), kept)
            })
            .collect()
    }

    /// Restrict the axiom-layer table to the surviving variables of
    /// `surviving`.
    pub fn restrict_axiom_layers(&self, surviving: &FactSet) -> BTreeMap<VarId, i64> {
        self.axiom_layers
            .iter()
            .filter(|(var, _)| surviving.variables().any(|v| v == *var))
            .map(|(var, layer)| (var.clone(), *layer))
            .collect()
    }

    /// Structural equality under a canonical ordering of actions, mutexes
    /// and init/goal facts, per spec §3.
    pub fn structurally_eq(&self, other: &Task) -> bool {
        if self.domains != other.domains || self.metric != other.metric {
            return false;
        }
        let mut a_init = self.init.clone();
        let mut b_init = other.init.clone();
        a_init.sort();
        b_init.sort();
        if a_init != b_init {
            return false;
        }
        let mut a_goal = self.goal.clone();
        let mut b_goal = other.goal.clone();
        a_goal.sort();
        b_goal.sort();
        if a_goal != b_goal {
            return false;
        }
        if self.actions.len() != other.actions.len() {
            return false;
        }
        let mut a_actions: Vec<&Action> = self.actions.iter().collect();
        let mut b_actions: Vec<&Action> = other.actions.iter().collect();
        a_actions.sort_by_key(|a| a.name.clone());
        b_actions.sort_by_key(|a| a.name.clone());
        if a_actions != b_actions {
            return false;
        }
        let mut a_mutexes: Vec<Vec<Fact>> =
            self.mutexes.iter().map(|m| sorted(&m.facts)).collect();
        let mut b_mutexes: Vec<Vec<Fact>> =
            other.mutexes.iter().map(|m| sorted(&m.facts)).collect();
        a_mutexes.sort();
        b_mutexes.sort();
        a_mutexes == b_mutexes
    }
}

fn sorted(facts: &[Fact]) -> Vec<Fact> {
    let mut v = facts.to_vec();
    v.sort();
    v
}

impl PartialEq for Task {
    fn eq(&self, other: &Self) -> bool {
        self.structurally_eq(other)
    }
}
