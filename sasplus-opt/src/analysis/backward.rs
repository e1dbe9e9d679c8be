//! Backward goal-relevance: a least-fixed-point computation that grows the
//! set of goal-relevant facts and actions by alternating a causal-link
//! filter, a coarsening step, and action merging.
//!
//! Actions and axioms are addressed by their position in `task.actions`
//! followed by `task.axioms` -- the same order [`Task::all_actions`]
//! iterates -- since `Action` carries no identity beyond its name and axiom
//! names are not required to be unique.

use std::collections::BTreeSet;

use itertools::Itertools;
use sasplus_ir::{Action, FactSet, Task, VarId};
use sasplus_utils::SasResult;

use super::merging::{self, MergeInfo};

/// The three toggles the backward step reads. `forward_pass` and `loop_`
/// live one level up, in the driver: they don't change what a single
/// backward fixed point computes.
#[derive(Clone, Copy, Debug)]
pub struct BackwardConfig {
    pub causal_links: bool,
    pub merging: bool,
    pub fact_based: bool,
}

/// Facts removed by the causal-link filter are not threatened by any
/// currently-relevant action and already hold in the initial state, so no
/// action needs to produce them -- unless a later iteration's merge step
/// reintroduces them as someone's precondition.
fn filter_causal_links(
    relevant_facts: &FactSet,
    init: &FactSet,
    all_actions: &[&Action],
    relevant_idxs: &BTreeSet<usize>,
    fact_based: bool,
) -> FactSet {
    let mut kept = FactSet::new();
    for (var, vals) in relevant_facts.iter() {
        for &val in vals {
            if !init.contains(var, val) {
                kept.add(var.clone(), val);
                continue;
            }
            let effect_vals: BTreeSet<_> = relevant_idxs
                .iter()
                .filter_map(|&i| {
                    all_actions[i]
                        .effect
                        .iter()
                        .find(|(v, _)| v == var)
                        .map(|(_, x)| *x)
                })
                .collect();
            let unthreatened = if effect_vals.is_empty() {
                true
            } else if fact_based {
                effect_vals.len() == 1 && effect_vals.contains(&val)
            } else {
                false
            };
            if !unthreatened {
                kept.add(var.clone(), val);
            }
        }
    }
    kept
}

fn step(
    task: &Task,
    all_actions: &[&Action],
    init: &FactSet,
    relevant_facts: &FactSet,
    relevant_idxs: &BTreeSet<usize>,
    config: BackwardConfig,
) -> SasResult<(FactSet, BTreeSet<usize>, MergeInfo)> {
    let mut filtered = if config.causal_links {
        filter_causal_links(relevant_facts, init, all_actions, relevant_idxs, config.fact_based)
    } else {
        relevant_facts.clone()
    };
    if !config.fact_based {
        filtered.coarsen_to_variables(&task.domains);
    }

    let new_idxs: BTreeSet<usize> = all_actions
        .iter()
        .enumerate()
        .filter(|(_, a)| a.effect.iter().any(|(v, x)| filtered.contains(v, *x)))
        .map(|(i, _)| i)
        .collect();

    let relevant_vars: BTreeSet<VarId> = filtered.variables().cloned().collect();
    let mut new_relevant_facts = FactSet::new();
    let mut merge_info = MergeInfo::default();

    if config.merging {
        let groups = new_idxs
            .iter()
            .map(|&i| all_actions[i])
            .into_group_map_by(|a| a.effect_fingerprint(&relevant_vars));
        for group in groups.values() {
            let (facts, info) = merging::merge(group, &relevant_vars, &task.domains)?;
            merge_info.attempts += info.attempts;
            new_relevant_facts.union(&facts);
        }
    } else {
        for &i in &new_idxs {
            let (facts, info) = merging::merge(&[all_actions[i]], &relevant_vars, &task.domains)?;
            merge_info.attempts += info.attempts;
            new_relevant_facts.union(&facts);
        }
    }

    filtered.union(&new_relevant_facts);
    Ok((filtered, new_idxs, merge_info))
}

/// Computes the least fixed point of goal-relevant facts and actions. The
/// returned action set indexes `task.actions` followed by `task.axioms`.
pub fn compute_goal_relevance(
    task: &Task,
    config: BackwardConfig,
) -> SasResult<(FactSet, BTreeSet<usize>, MergeInfo)> {
    let all_actions: Vec<&Action> = task.actions.iter().chain(task.axioms.iter()).collect();
    let init: FactSet = task.init.iter().cloned().collect();

    let mut relevant_facts: FactSet = task.goal.iter().cloned().collect();
    if !config.fact_based {
        relevant_facts.coarsen_to_variables(&task.domains);
    }
    let mut relevant_idxs: BTreeSet<usize> = BTreeSet::new();
    let mut total = MergeInfo::default();

    let mut iteration = 0u32;
    loop {
        iteration += 1;
        let (new_facts, new_idxs, info) =
            step(task, &all_actions, &init, &relevant_facts, &relevant_idxs, config)?;
        total.attempts += info.attempts;
        let stable = new_facts == relevant_facts && new_idxs == relevant_idxs;
        log::debug!(
            "backward relevance: iteration {iteration}, {} facts, {} actions, stable={stable}",
            new_facts.n_facts(),
            new_idxs.len()
        );
        relevant_facts = new_facts;
        relevant_idxs = new_idxs;
        if stable {
            break;
        }
    }

    relevant_facts.add_iter(task.init.iter().cloned());
    Ok((relevant_facts, relevant_idxs, total))
}

#[cfg(test)]
mod tests {
    use super::*;
    use sasplus_ir::{Action, ValId};

    fn v(s: &str) -> VarId {
        VarId::new(s)
    }
    fn x(n: u32) -> ValId {
        ValId::new(n)
    }

    fn domain(task: &mut Task, var: &str, range: u32) {
        for i in 0..range {
            task.domains.add(v(var), x(i));
        }
    }

    // The §8 S1 fixture: vanilla chain, variables-only, single goal.
    fn s1_task() -> Task {
        let mut task = Task::default();
        domain(&mut task, "x", 3);
        domain(&mut task, "y", 2);
        domain(&mut task, "z", 3);
        task.init = vec![(v("x"), x(0)), (v("y"), x(0)), (v("z"), x(0))];
        task.goal = vec![(v("x"), x(1))];
        task.actions = vec![
            Action::new_operator("a1", vec![(v("x"), x(0))], vec![(v("x"), x(1))], 1),
            Action::new_operator("a2", vec![(v("x"), x(1))], vec![(v("y"), x(1))], 1),
            Action::new_operator("a3", vec![(v("y"), x(1))], vec![(v("z"), x(1))], 1),
            Action::new_operator("b1", vec![(v("y"), x(0))], vec![(v("x"), x(2))], 1),
            Action::new_operator("b2", vec![(v("z"), x(0))], vec![(v("z"), x(2))], 1),
        ];
        task
    }

    #[test]
    fn s1_vanilla_chain_variables_only() {
        let task = s1_task();
        let config = BackwardConfig {
            causal_links: false,
            merging: false,
            fact_based: false,
        };
        let (facts, idxs, _) = compute_goal_relevance(&task, config).unwrap();

        let xs: BTreeSet<ValId> = [x(0), x(1), x(2)].into_iter().collect();
        let ys: BTreeSet<ValId> = [x(0), x(1)].into_iter().collect();
        let zs: BTreeSet<ValId> = [x(0)].into_iter().collect();
        assert_eq!(facts.values(&v("x")), &xs);
        assert_eq!(facts.values(&v("y")), &ys);
        assert_eq!(facts.values(&v("z")), &zs);

        let names: BTreeSet<&str> = idxs.iter().map(|&i| task.actions[i].name.as_str()).collect();
        assert_eq!(names, BTreeSet::from(["a1", "a2", "b1"]));
    }

    // The §8 S3 fixture: same chain, causal links on, fact-based on, init
    // x=0, y=1, z=0.
    #[test]
    fn s3_causal_link_prunes_init_only_variable() {
        let mut task = s1_task();
        task.init = vec![(v("x"), x(0)), (v("y"), x(1)), (v("z"), x(0))];
        task.goal = vec![(v("z"), x(1))];

        let config = BackwardConfig {
            causal_links: true,
            merging: false,
            fact_based: true,
        };
        let (facts, idxs, _) = compute_goal_relevance(&task, config).unwrap();

        assert!(facts.contains(&v("x"), x(0)));
        assert!(facts.contains(&v("y"), x(1)));
        assert!(facts.contains(&v("z"), x(0)));
        assert!(facts.contains(&v("z"), x(1)));

        let names: BTreeSet<&str> = idxs.iter().map(|&i| task.actions[i].name.as_str()).collect();
        assert_eq!(names, BTreeSet::from(["a3"]));
    }

    #[test]
    fn axioms_are_folded_into_relevant_actions_as_zero_cost() {
        let mut task = Task::default();
        domain(&mut task, "x", 2);
        domain(&mut task, "y", 2);
        task.init = vec![(v("x"), x(0)), (v("y"), x(0))];
        task.goal = vec![(v("y"), x(1))];
        task.axioms = vec![Action::new_axiom("", vec![(v("x"), x(1))], (v("y"), x(1)))];
        task.actions = vec![Action::new_operator("a", vec![], vec![(v("x"), x(1))], 1)];

        let config = BackwardConfig {
            causal_links: false,
            merging: true,
            fact_based: true,
        };
        let (facts, idxs, _) = compute_goal_relevance(&task, config).unwrap();
        assert!(facts.contains(&v("x"), x(1)));
        // one of the two indices (actions then axioms) must be the axiom.
        assert_eq!(idxs.len(), 2);
    }

    // The §8 S2 fixture: merging collapses the ancestor chain down to the
    // two actions that write z directly, whichever value y held.
    fn merge_task() -> Task {
        let mut task = Task::default();
        domain(&mut task, "x", 3);
        domain(&mut task, "y", 2);
        domain(&mut task, "z", 4);
        domain(&mut task, "w", 2);
        task.init = vec![(v("x"), x(0)), (v("y"), x(0)), (v("z"), x(0))];
        task.goal = vec![(v("z"), x(1))];
        task.actions = vec![
            Action::new_operator("a1", vec![(v("x"), x(0))], vec![(v("x"), x(1))], 1),
            Action::new_operator("a2", vec![(v("x"), x(1))], vec![(v("y"), x(1))], 1),
            Action::new_operator(
                "a3",
                vec![(v("y"), x(1))],
                vec![(v("z"), x(1)), (v("w"), x(1))],
                1,
            ),
            Action::new_operator(
                "a4",
                vec![(v("y"), x(0))],
                vec![(v("z"), x(1)), (v("w"), x(0))],
                1,
            ),
        ];
        task
    }

    #[test]
    fn s2_merge_collapses_ancestor() {
        let task = merge_task();
        let config = BackwardConfig {
            causal_links: false,
            merging: true,
            fact_based: true,
        };
        let (facts, idxs, _) = compute_goal_relevance(&task, config).unwrap();

        assert!(facts.contains(&v("x"), x(0)));
        assert!(facts.contains(&v("y"), x(0)));
        assert!(facts.contains(&v("z"), x(0)));
        assert!(facts.contains(&v("z"), x(1)));

        let names: BTreeSet<&str> = idxs.iter().map(|&i| task.actions[i].name.as_str()).collect();
        assert_eq!(names, BTreeSet::from(["a3", "a4"]));
    }

    #[test]
    fn s2_without_merging_keeps_the_whole_ancestor_chain() {
        let task = merge_task();
        let config = BackwardConfig {
            causal_links: false,
            merging: false,
            fact_based: true,
        };
        let (_, idxs, _) = compute_goal_relevance(&task, config).unwrap();
        let names: BTreeSet<&str> = idxs.iter().map(|&i| task.actions[i].name.as_str()).collect();
        assert_eq!(names, BTreeSet::from(["a1", "a2", "a3", "a4"]));
    }
}
