//! Bridges the raw, index-keyed `SasFile` AST and the opaquely-keyed
//! `sasplus_ir::Task` analyses operate on. Variable identity crosses the
//! boundary as `VarId::from_index(column)`; the codec's `-1` "don't-care"
//! precondition is normalized away here and nowhere else, per spec §9.
//!
//! The format's effect-line conditions (`<cond-count> [<c-var> <c-val>]...`)
//! encode PDDL conditional effects. `Action` has one flat precondition list
//! and no notion of a conditional effect, so an effect's own conditions are
//! folded into the action's ordinary precondition alongside the prevail
//! facts -- sound for the unconditional-effect tasks this scoper targets,
//! since in practice the translator only emits a non-empty effect condition
//! when a domain uses conditional effects, which this tool does not claim to
//! scope correctly.

use std::collections::BTreeMap;

use sasplus_ir::{Action, Fact, FactSet, Task};
use sasplus_utils::{Error, SasResult, ValId, VarId};

use crate::ast::{AxiomAst, EffectAst, MutexGroupAst, OperatorAst, SasFile, VariableAst};

/// Convert a parsed SAS+ file into the internal task representation used
/// by every analysis in `sasplus-opt`.
pub fn to_task(file: &SasFile) -> SasResult<Task> {
    if file.init.len() != file.variables.len() {
        return Err(Error::invariant(format!(
            "initial state has {} values but there are {} variables",
            file.init.len(),
            file.variables.len()
        )));
    }

    let mut domains = FactSet::new();
    let mut value_names = BTreeMap::new();
    let mut axiom_layers = BTreeMap::new();
    let mut var_names = BTreeMap::new();

    for (i, var) in file.variables.iter().enumerate() {
        let id = VarId::from_index(i);
        for v in 0..var.range {
            domains.add(id.clone(), ValId::new(v));
        }
        value_names.insert(id.clone(), var.value_names.clone());
        axiom_layers.insert(id.clone(), var.axiom_layer);
        var_names.insert(id, var.name.clone());
    }

    let init: Vec<Fact> = file
        .init
        .iter()
        .enumerate()
        .map(|(i, &val)| (VarId::from_index(i), ValId::new(val)))
        .collect();

    let goal: Vec<Fact> = file
        .goal
        .iter()
        .map(|&(var, val)| (VarId::from_index(var as usize), ValId::new(val)))
        .collect();

    let actions = file
        .operators
        .iter()
        .map(to_action)
        .collect::<SasResult<Vec<_>>>()?;
    let axioms = file.axioms.iter().map(to_axiom_action).collect();
    let mutexes = file.mutex_groups.iter().map(to_mutex).collect();

    Ok(Task {
        domains,
        init,
        goal,
        actions,
        axioms,
        mutexes,
        metric: file.metric != 0,
        value_names,
        axiom_layers,
        var_names,
    })
}

fn pair_fact((var, val): &(u32, u32)) -> Fact {
    (VarId::from_index(*var as usize), ValId::new(*val))
}

fn to_action(op: &OperatorAst) -> SasResult<Action> {
    let mut precondition: Vec<Fact> = op.prevail.iter().map(pair_fact).collect();
    let mut effect = Vec::with_capacity(op.effects.len());
    for e in &op.effects {
        precondition.extend(e.condition.iter().map(pair_fact));
        if let Some(pre) = e.pre {
            precondition.push((VarId::from_index(e.affected_var as usize), ValId::new(pre)));
        }
        effect.push((VarId::from_index(e.affected_var as usize), ValId::new(e.post)));
    }
    Ok(Action::new_operator(op.name.clone(), precondition, effect, op.cost))
}

fn to_axiom_action(axiom: &AxiomAst) -> Action {
    let mut precondition: Vec<Fact> = axiom.condition.iter().map(pair_fact).collect();
    if let Some(pre) = axiom.pre {
        precondition.push((
            VarId::from_index(axiom.affected_var as usize),
            ValId::new(pre),
        ));
    }
    let effect = (
        VarId::from_index(axiom.affected_var as usize),
        ValId::new(axiom.post),
    );
    Action::new_axiom(String::new(), precondition, effect)
}

fn to_mutex(group: &MutexGroupAst) -> sasplus_ir::MutexGroup {
    sasplus_ir::MutexGroup::new(group.facts.iter().map(pair_fact).collect())
}

/// The inverse of [`to_task`]: renumbers the task's surviving variables
/// into contiguous column indices (ascending by their original index, so an
/// unpruned task round-trips with the same numbering it started with) and
/// rebuilds the per-section AST.
pub fn from_task(task: &Task) -> SasFile {
    let mut vars: Vec<&VarId> = task.domains.variables().collect();
    vars.sort_by(|a, b| sort_key(*a).cmp(&sort_key(*b)));
    let index: BTreeMap<&VarId, u32> = vars.iter().enumerate().map(|(i, v)| (*v, i as u32)).collect();

    let variables = vars
        .iter()
        .map(|var| {
            let range = task.domains.values(*var).len() as u32;
            let name = task
                .var_names
                .get(*var)
                .cloned()
                .unwrap_or_else(|| format!("var{}", index[*var]));
            let axiom_layer = task.axiom_layers.get(*var).copied().unwrap_or(-1);
            let value_names = task
                .value_names
                .get(*var)
                .cloned()
                .unwrap_or_else(|| (0..range).map(|v| v.to_string()).collect());
            VariableAst {
                name,
                axiom_layer,
                range,
                value_names,
            }
        })
        .collect();

    let mutex_groups = task
        .mutexes
        .iter()
        .map(|m| MutexGroupAst {
            facts: m.facts.iter().map(|f| to_pair(&index, f)).collect(),
        })
        .collect();

    let mut init_by_var: BTreeMap<&VarId, u32> = BTreeMap::new();
    for (var, val) in &task.init {
        init_by_var.insert(var, val.0);
    }
    let init = vars
        .iter()
        .map(|var| *init_by_var.get(*var).unwrap_or(&0))
        .collect();

    let mut goal: Vec<(u32, u32)> = task.goal.iter().map(|f| to_pair(&index, f)).collect();
    goal.sort();

    let operators = task.actions.iter().map(|a| from_action(a, &index)).collect();
    let axioms = task.axioms.iter().map(|a| from_axiom_action(a, &index)).collect();

    SasFile {
        version: 3,
        metric: task.metric as u32,
        variables,
        mutex_groups,
        init,
        goal,
        operators,
        axioms,
    }
}

fn sort_key(var: &VarId) -> (u64, &str) {
    let s = var.as_str();
    match s.strip_prefix("var").and_then(|rest| rest.parse::<u64>().ok()) {
        Some(n) => (n, s),
        None => (u64::MAX, s),
    }
}

fn to_pair(index: &BTreeMap<&VarId, u32>, (var, val): &Fact) -> (u32, u32) {
    (*index.get(var).expect("fact variable must be a surviving domain key"), val.0)
}

fn from_action(action: &Action, index: &BTreeMap<&VarId, u32>) -> OperatorAst {
    let prevail = action.prevail().iter().map(|f| to_pair(index, f)).collect();
    let effects = action
        .pre_post()
        .into_iter()
        .map(|(var, pre, post)| EffectAst {
            condition: Vec::new(),
            affected_var: *index.get(&var).expect("effect variable must survive"),
            pre: pre.map(|v| v.0),
            post: post.0,
        })
        .collect();
    OperatorAst {
        name: action.name.clone(),
        prevail,
        effects,
        cost: action.cost,
    }
}

fn from_axiom_action(action: &Action, index: &BTreeMap<&VarId, u32>) -> AxiomAst {
    let (var, pre, post) = action
        .pre_post()
        .into_iter()
        .next()
        .expect("an axiom always has exactly one effect fact");
    AxiomAst {
        condition: action.prevail().iter().map(|f| to_pair(index, f)).collect(),
        affected_var: *index.get(&var).expect("axiom variable must survive"),
        pre: pre.map(|v| v.0),
        post: post.0,
    }
}
