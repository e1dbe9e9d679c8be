//! Rewrites a task down to a set of surviving variables, actions and
//! mutexes, per spec §4.5. Used after both the backward and the forward
//! analysis -- the only difference between the two calls is which fact set
//! and which action-index set drive the rewrite.

use std::collections::BTreeSet;

use sasplus_ir::{Action, Fact, FactSet, MutexGroup, Role, Task, VarId};

/// Drop any variable whose surviving value set has cardinality ≤ 1: it is a
/// constant in the pruned task and carries no information.
fn surviving_variables(surviving_facts: &FactSet) -> BTreeSet<VarId> {
    surviving_facts
        .variables()
        .filter(|v| surviving_facts.values(v).len() > 1)
        .cloned()
        .collect()
}

fn restrict(facts: &[Fact], survived: &BTreeSet<VarId>) -> Vec<Fact> {
    facts.iter().filter(|(v, _)| survived.contains(v)).cloned().collect()
}

fn rewrite_action(a: &Action, survived: &BTreeSet<VarId>) -> Action {
    Action {
        name: a.name.clone(),
        precondition: restrict(&a.precondition, survived),
        effect: restrict(&a.effect, survived),
        cost: a.cost,
        role: a.role,
    }
}

fn rewrite_mutexes(mutexes: &[MutexGroup], survived: &BTreeSet<VarId>) -> Vec<MutexGroup> {
    let mut seen: BTreeSet<Vec<Fact>> = BTreeSet::new();
    let mut out = Vec::new();
    for m in mutexes {
        let group = MutexGroup::new(restrict(&m.facts, survived));
        if !group.is_well_formed() {
            continue;
        }
        let mut key = group.facts.clone();
        key.sort();
        if seen.insert(key) {
            out.push(group);
        }
    }
    out
}

/// Rewrites `task` to the facts in `surviving_facts` and the actions/axioms
/// indexed by `surviving_action_idxs` (position in `task.actions` followed
/// by `task.axioms`, matching [`Task::all_actions`]).
pub fn prune(task: &Task, surviving_facts: &FactSet, surviving_action_idxs: &BTreeSet<usize>) -> Task {
    let survived = surviving_variables(surviving_facts);

    let mut domains = FactSet::new();
    for var in &survived {
        domains.union_var(var.clone(), surviving_facts.values(var));
    }

    let init = restrict(&task.init, &survived);
    let goal = restrict(&task.goal, &survived);

    let all_actions: Vec<&Action> = task.actions.iter().chain(task.axioms.iter()).collect();
    let mut actions = Vec::new();
    let mut axioms = Vec::new();
    for (i, a) in all_actions.iter().enumerate() {
        if !surviving_action_idxs.contains(&i) {
            continue;
        }
        match a.role {
            Role::Axiom => {
                // An axiom's single effect fact is its reason for existing;
                // if its variable didn't survive, the axiom produces nothing.
                let (ev, _) = a.effect[0];
                if !survived.contains(&ev) {
                    continue;
                }
                axioms.push(rewrite_action(a, &survived));
            }
            Role::Operator => actions.push(rewrite_action(a, &survived)),
        }
    }

    let mutexes = rewrite_mutexes(&task.mutexes, &survived);
    let value_names = task.restrict_value_names(&domains);
    let axiom_layers = task.restrict_axiom_layers(&domains);
    let var_names = task
        .var_names
        .iter()
        .filter(|(v, _)| survived.contains(v))
        .map(|(v, n)| (v.clone(), n.clone()))
        .collect();

    Task {
        domains,
        init,
        goal,
        actions,
        axioms,
        mutexes,
        metric: task.metric,
        value_names,
        axiom_layers,
        var_names,
    }
}
