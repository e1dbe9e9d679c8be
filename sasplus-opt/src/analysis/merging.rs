//! Collapse a group of effect/cost-equivalent actions down to the
//! precondition facts that actually need to survive pruning.
//!
//! A "spanning variable" is one whose precondition facts, across the group,
//! already cover its whole domain -- keeping it around buys nothing, since
//! every value is reachable by *some* action in the group regardless of
//! which fact held beforehand. Collapsing those variables one at a time
//! (rather than all together) is what lets the merge catch partial
//! coverage: a variable can be dropped only once every action that still
//! mentions it is accounted for under the *other* spanning variables already
//! removed.

use std::collections::{BTreeMap, BTreeSet};

use sasplus_ir::{Action, Fact, FactSet};
use sasplus_utils::{Error, SasResult, VarId};

/// Per-call bookkeeping for [`merge`], folded into the driver's running
/// counters.
#[derive(Clone, Copy, Debug, Default)]
pub struct MergeInfo {
    pub attempts: u64,
}

fn precondition_facts(action: &Action) -> FactSet {
    action.precondition.iter().cloned().collect()
}

/// Spanning variables in ascending `(domain size, variable key)` order, so
/// the collapse order is deterministic and favors removing small, cheaply
/// saturated variables first.
fn spanning_vars(precond_facts: &FactSet, domains: &FactSet) -> Vec<VarId> {
    let mut vars: Vec<VarId> = precond_facts
        .variables()
        .filter(|v| precond_facts.values(v) == domains.values(v))
        .cloned()
        .collect();
    vars.sort_by_key(|v| (domains.values(v).len(), v.clone()));
    vars
}

fn precond_without_var(action: &Action, var: &VarId) -> Vec<Fact> {
    let mut facts: Vec<Fact> = action
        .precondition
        .iter()
        .filter(|(v, _)| v != var)
        .cloned()
        .collect();
    facts.sort();
    facts
}

/// The relevant precondition facts for one effect/cost-equivalent group of
/// actions, per spec §4.2.
pub fn merge(actions: &[&Action], relevant_vars: &BTreeSet<VarId>, domains: &FactSet) -> SasResult<(FactSet, MergeInfo)> {
    let mut info = MergeInfo::default();

    if actions.is_empty() {
        return Ok((FactSet::new(), info));
    }
    if actions.len() == 1 {
        return Ok((precondition_facts(actions[0]), info));
    }

    let (fp0, cost0) = actions[0].effect_fingerprint(relevant_vars);
    for a in &actions[1..] {
        let (fp, cost) = a.effect_fingerprint(relevant_vars);
        if fp != fp0 || cost != cost0 {
            return Err(Error::merge_invariant(
                "attempted to merge actions with differing effect fingerprints",
            ));
        }
    }
    info.attempts += 1;

    let mut precond_facts = FactSet::new();
    let mut any_empty_precondition = false;
    for &a in actions {
        precond_facts.union(&precondition_facts(a));
        if a.precondition.is_empty() {
            any_empty_precondition = true;
        }
    }
    if any_empty_precondition {
        if actions.iter().all(|a| a.precondition.is_empty()) {
            info.attempts = 0;
        }
        return Ok((FactSet::new(), info));
    }

    let spanning = spanning_vars(&precond_facts, domains);
    if spanning.is_empty() {
        return Ok((precond_facts, info));
    }

    let mut relevant = FactSet::new();
    let mut visited: BTreeSet<usize> = BTreeSet::new();

    for var_to_remove in &spanning {
        let matching: Vec<usize> = (0..actions.len())
            .filter(|&i| actions[i].precondition.iter().any(|(v, _)| v == var_to_remove))
            .collect();
        if matching.is_empty() {
            continue;
        }

        let mut by_precond: BTreeMap<Vec<Fact>, Vec<usize>> = BTreeMap::new();
        for &i in &matching {
            by_precond
                .entry(precond_without_var(actions[i], var_to_remove))
                .or_default()
                .push(i);
        }

        for partial_precond in by_precond.keys() {
            let considered: Vec<usize> = (0..actions.len())
                .filter(|&i| &precond_without_var(actions[i], var_to_remove) == partial_precond)
                .collect();

            let mut covered_values = BTreeSet::new();
            for &i in &considered {
                let own_value = actions[i]
                    .precondition
                    .iter()
                    .find(|(v, _)| v == var_to_remove)
                    .map(|(_, val)| *val);
                match own_value {
                    Some(val) => {
                        covered_values.insert(val);
                    }
                    None => covered_values.extend(domains.values(var_to_remove)),
                }
            }

            if &covered_values != domains.values(var_to_remove) {
                relevant.add_iter(covered_values.iter().map(|v| (var_to_remove.clone(), *v)));
            }
            relevant.add_iter(partial_precond.iter().cloned());

            for i in considered {
                visited.insert(i);
            }
        }
    }

    for (i, a) in actions.iter().enumerate() {
        if !visited.contains(&i) {
            relevant.add_iter(a.precondition.iter().cloned());
        }
    }

    Ok((relevant, info))
}

#[cfg(test)]
mod tests {
    use super::*;
    use sasplus_utils::ValId;

    fn v(s: &str) -> VarId {
        VarId::new(s)
    }
    fn x(n: u32) -> ValId {
        ValId::new(n)
    }

    fn domains() -> FactSet {
        let mut d = FactSet::new();
        for val in [0, 1] {
            d.add(v("loc"), x(val));
        }
        d.add(v("held"), x(0));
        d.add(v("held"), x(1));
        d
    }

    #[test]
    fn single_action_keeps_its_whole_precondition() {
        let a = Action::new_operator("a", vec![(v("loc"), x(0))], vec![(v("x"), x(1))], 1);
        let relevant: BTreeSet<VarId> = [v("x")].into_iter().collect();
        let (facts, info) = merge(&[&a], &relevant, &domains()).unwrap();
        assert_eq!(info.attempts, 0);
        assert!(facts.contains(&v("loc"), x(0)));
    }

    #[test]
    fn spanning_variable_collapses_when_fully_covered() {
        let a0 = Action::new_operator("a0", vec![(v("loc"), x(0))], vec![(v("x"), x(1))], 1);
        let a1 = Action::new_operator("a1", vec![(v("loc"), x(1))], vec![(v("x"), x(1))], 1);
        let relevant: BTreeSet<VarId> = [v("x")].into_iter().collect();
        let (facts, info) = merge(&[&a0, &a1], &relevant, &domains()).unwrap();
        assert_eq!(info.attempts, 1);
        assert!(facts.is_empty());
    }

    #[test]
    fn spanning_variable_keeps_facts_when_partially_covered() {
        let a0 = Action::new_operator("a0", vec![(v("loc"), x(0))], vec![(v("x"), x(1))], 1);
        let a1 = Action::new_operator(
            "a1",
            vec![(v("loc"), x(0)), (v("held"), x(1))],
            vec![(v("x"), x(1))],
            1,
        );
        let relevant: BTreeSet<VarId> = [v("x")].into_iter().collect();
        let (facts, _) = merge(&[&a0, &a1], &relevant, &domains()).unwrap();
        assert!(facts.contains(&v("loc"), x(0)));
    }

    #[test]
    fn mismatched_fingerprints_is_a_merge_invariant_error() {
        let a0 = Action::new_operator("a0", vec![], vec![(v("x"), x(1))], 1);
        let a1 = Action::new_operator("a1", vec![], vec![(v("x"), x(2))], 1);
        let relevant: BTreeSet<VarId> = [v("x")].into_iter().collect();
        assert!(merge(&[&a0, &a1], &relevant, &domains()).is_err());
    }
}
