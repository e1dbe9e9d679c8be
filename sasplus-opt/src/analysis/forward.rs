//! Forward reachability: a dual least fixed point over facts reachable from
//! the initial state under each action's unconditional-effect semantics.
//! This is a classical delete-relaxation-like overapproximation -- sound for
//! scoping, since it never excludes a fact a real plan could produce.

use std::collections::BTreeSet;

use sasplus_ir::{Action, FactSet, Task};

/// Actions are addressed the same way as in [`super::backward`]: position in
/// `task.actions` followed by `task.axioms`.
pub struct ForwardResult {
    pub reachable: FactSet,
    pub applied: BTreeSet<usize>,
    pub goal_reachable: bool,
}

/// Runs the fixed point to completion and reports whether the task's goal
/// is a subset of the reachable facts.
pub fn compute_reachability(task: &Task) -> ForwardResult {
    let all_actions: Vec<&Action> = task.actions.iter().chain(task.axioms.iter()).collect();
    let mut reachable: FactSet = task.init.iter().cloned().collect();
    let mut applied: BTreeSet<usize> = BTreeSet::new();

    loop {
        let mut newly_applied = Vec::new();
        for (i, a) in all_actions.iter().enumerate() {
            if applied.contains(&i) {
                continue;
            }
            if a.applicable(&reachable) {
                newly_applied.push(i);
            }
        }
        if newly_applied.is_empty() {
            break;
        }
        for i in newly_applied {
            reachable.add_iter(all_actions[i].effect.iter().cloned());
            applied.insert(i);
        }
    }

    let goal: FactSet = task.goal.iter().cloned().collect();
    let goal_reachable = reachable.is_superset_of(&goal);
    log::debug!(
        "forward reachability: {} facts, {} actions applied, goal_reachable={goal_reachable}",
        reachable.n_facts(),
        applied.len()
    );

    ForwardResult {
        reachable,
        applied,
        goal_reachable,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sasplus_ir::{Action, ValId, VarId};

    fn v(s: &str) -> VarId {
        VarId::new(s)
    }
    fn x(n: u32) -> ValId {
        ValId::new(n)
    }

    // The §8 S4 fixture: only actions that advance x upward exist, so a
    // goal on y is never reachable.
    #[test]
    fn s4_forward_unreachability() {
        let mut task = Task::default();
        for var in ["x", "y", "z"] {
            for val in 0..3 {
                task.domains.add(v(var), x(val));
            }
        }
        task.init = vec![(v("x"), x(2)), (v("y"), x(1)), (v("z"), x(2))];
        task.goal = vec![(v("y"), x(0))];
        task.actions = vec![
            Action::new_operator("advance0", vec![(v("x"), x(0))], vec![(v("x"), x(1))], 1),
            Action::new_operator("advance1", vec![(v("x"), x(1))], vec![(v("x"), x(2))], 1),
        ];

        let result = compute_reachability(&task);
        assert!(!result.goal_reachable);
        assert!(result.applied.is_empty());
    }

    #[test]
    fn reaches_facts_transitively() {
        let mut task = Task::default();
        task.domains.add(v("x"), x(0));
        task.domains.add(v("x"), x(1));
        task.domains.add(v("x"), x(2));
        task.init = vec![(v("x"), x(0))];
        task.goal = vec![(v("x"), x(2))];
        task.actions = vec![
            Action::new_operator("a", vec![(v("x"), x(0))], vec![(v("x"), x(1))], 1),
            Action::new_operator("b", vec![(v("x"), x(1))], vec![(v("x"), x(2))], 1),
        ];

        let result = compute_reachability(&task);
        assert!(result.goal_reachable);
        assert_eq!(result.applied.len(), 2);
    }
}
