//! The scoping driver: wraps backward relevance, (optional) forward
//! reachability and pruning into the outer loop of spec §4.6/§4.8, plus the
//! counters a caller reports alongside the scoped task.

use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

use sasplus_ir::{Action, Task, VarId};
use sasplus_utils::SasResult;

use crate::analysis::backward;
use crate::analysis::backward::BackwardConfig;
use crate::analysis::forward;
use crate::passes::pruning;

/// The five scoping toggles plus the CLI's output-writing flag, travelling
/// as an explicit record rather than a global option bag (spec §9).
#[derive(Clone, Copy, Debug)]
pub struct ScopingOptions {
    pub causal_links: bool,
    pub merging: bool,
    pub fact_based: bool,
    pub forward_pass: bool,
    pub loop_: bool,
    pub write_output_file: bool,
}

impl Default for ScopingOptions {
    fn default() -> Self {
        ScopingOptions {
            causal_links: true,
            merging: true,
            fact_based: true,
            forward_pass: true,
            loop_: true,
            write_output_file: false,
        }
    }
}

/// Before/after counts for one outer iteration of the driver.
#[derive(Clone, Copy, Debug, Default)]
pub struct IterationStats {
    pub variables_before: usize,
    pub variables_after: usize,
    pub facts_before: usize,
    pub facts_after: usize,
    pub operators_before: usize,
    pub operators_after: usize,
    pub merge_attempts: u64,
}

/// The aggregated outcome of a `scope` call, accumulated across every outer
/// iteration (the original implementation's `aggregated_info`).
#[derive(Clone, Debug, Default)]
pub struct ScopingReport {
    pub iterations: Vec<IterationStats>,
    pub infeasible: bool,
    pub trivially_solved: bool,
}

impl ScopingReport {
    pub fn total_merge_attempts(&self) -> u64 {
        self.iterations.iter().map(|i| i.merge_attempts).sum()
    }
}

/// Spec §7's "close over action facts": beyond the backward fixed point
/// itself, the precondition facts of every surviving action are unioned in
/// (a merge may have dropped some), and so is any effect fact of a relevant
/// action whose variable is read by some relevant action's precondition --
/// otherwise pruning could drop a fact a sibling action still needs.
fn close_over_action_facts(
    all_actions: &[&Action],
    relevant_facts: &sasplus_ir::FactSet,
    relevant_idxs: &BTreeSet<usize>,
) -> sasplus_ir::FactSet {
    let mut facts = relevant_facts.clone();
    for &i in relevant_idxs {
        facts.add_iter(all_actions[i].precondition.iter().cloned());
    }
    let precond_vars: BTreeSet<VarId> = relevant_idxs
        .iter()
        .flat_map(|&i| all_actions[i].precondition.iter().map(|(v, _)| v.clone()))
        .collect();
    for &i in relevant_idxs {
        for (var, val) in &all_actions[i].effect {
            if precond_vars.contains(var) {
                facts.add(var.clone(), *val);
            }
        }
    }
    facts
}

/// One pass of the state machine in spec §4.8: backward relevance + prune,
/// then (if enabled) forward reachability + prune. Returns `None` if
/// forward reachability proves the goal unreachable.
fn scope_once(task: &Task, options: ScopingOptions, report: &mut ScopingReport) -> SasResult<Option<Task>> {
    let vars_before = task.domains.variables().count();
    let facts_before = task.domains.n_facts();
    let ops_before = task.actions.len();

    let all_actions: Vec<&Action> = task.actions.iter().chain(task.axioms.iter()).collect();
    let config = BackwardConfig {
        causal_links: options.causal_links,
        merging: options.merging,
        fact_based: options.fact_based,
    };
    let (relevant_facts, relevant_idxs, merge_info) = backward::compute_goal_relevance(task, config)?;
    let closed = close_over_action_facts(&all_actions, &relevant_facts, &relevant_idxs);
    let mut pruned = pruning::prune(task, &closed, &relevant_idxs);

    if task.goal.len() > 0 && pruned.goal.is_empty() {
        report.trivially_solved = true;
        return Ok(None);
    }

    let mut infeasible = false;
    if options.forward_pass {
        let fwd = forward::compute_reachability(&pruned);
        if !fwd.goal_reachable {
            infeasible = true;
        } else {
            pruned = pruning::prune(&pruned, &fwd.reachable, &fwd.applied);
        }
    }

    report.iterations.push(IterationStats {
        variables_before: vars_before,
        variables_after: pruned.domains.variables().count(),
        facts_before,
        facts_after: pruned.domains.n_facts(),
        operators_before: ops_before,
        operators_after: pruned.actions.len(),
        merge_attempts: merge_info.attempts,
    });

    if infeasible {
        report.infeasible = true;
        return Ok(None);
    }

    Ok(Some(pruned))
}

/// Scopes `task` per `options`, returning the pruned task and the
/// accumulated counters. Pure and deterministic in the facts/actions'
/// iteration order -- every analysis underneath is set-semantic.
pub fn scope(task: &Task, options: ScopingOptions) -> SasResult<(Task, ScopingReport)> {
    let mut report = ScopingReport::default();
    let mut current = task.clone();

    loop {
        match scope_once(&current, options, &mut report)? {
            None if report.trivially_solved => {
                return Ok((Task::canonical_trivially_true(), report));
            }
            None => {
                return Ok((Task::canonical_trivially_false(), report));
            }
            Some(pruned) => {
                let changed = !pruned.structurally_eq(&current);
                log::info!(
                    "scoping iteration {}: {} -> {} variables, {} -> {} facts, {} -> {} operators",
                    report.iterations.len(),
                    report.iterations.last().unwrap().variables_before,
                    pruned.domains.variables().count(),
                    report.iterations.last().unwrap().facts_before,
                    pruned.domains.n_facts(),
                    report.iterations.last().unwrap().operators_before,
                    pruned.actions.len(),
                );
                current = pruned;
                if !(options.loop_ && options.forward_pass && changed) {
                    return Ok((current, report));
                }
            }
        }
    }
}

/// Chooses the `_scoped` sibling path the CLI writes its output to:
/// `foo.sas` becomes `foo_scoped.sas`, `foo` becomes `foo_scoped`.
fn scoped_sibling_path(path: &Path) -> PathBuf {
    let stem = path.file_stem().map(|s| s.to_string_lossy().into_owned()).unwrap_or_default();
    match path.extension() {
        Some(ext) => path.with_file_name(format!("{stem}_scoped.{}", ext.to_string_lossy())),
        None => path.with_file_name(format!("{stem}_scoped")),
    }
}

/// The file-level wrapper of spec §6.3: parses `path`, scopes the resulting
/// task, and (if `options.write_output_file`) writes the scoped task next
/// to the input under the `_scoped` sibling convention.
pub fn scope_sas_file(path: &Path, options: ScopingOptions) -> SasResult<ScopingReport> {
    let text = std::fs::read_to_string(path)?;
    let sas_file = sasplus_frontend::parse(&text)?;
    let task = sasplus_frontend::to_task(&sas_file)?;
    let (scoped, report) = scope(&task, options)?;

    if options.write_output_file {
        let out_file = sasplus_frontend::from_task(&scoped);
        std::fs::write(scoped_sibling_path(path), sasplus_frontend::emit(&out_file))?;
    }

    Ok(report)
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

    fn chain_task() -> Task {
        let mut task = Task::default();
        for (var, range) in [("x", 3), ("y", 2), ("z", 3)] {
            for val in 0..range {
                task.domains.add(v(var), x(val));
            }
        }
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
    fn enabling_an_option_never_enlarges_the_scoped_task() {
        let task = chain_task();
        let off = ScopingOptions {
            causal_links: false,
            merging: false,
            fact_based: false,
            forward_pass: false,
            loop_: false,
            write_output_file: false,
        };
        let on = ScopingOptions {
            forward_pass: true,
            ..off
        };
        let (scoped_off, _) = scope(&task, off).unwrap();
        let (scoped_on, _) = scope(&task, on).unwrap();
        assert!(scoped_on.domains.n_facts() <= scoped_off.domains.n_facts());
        assert!(scoped_on.actions.len() <= scoped_off.actions.len());
    }

    #[test]
    fn idempotent_once_looped_to_a_fixed_point() {
        let task = chain_task();
        let options = ScopingOptions::default();
        let (once, _) = scope(&task, options).unwrap();
        let (twice, _) = scope(&once, options).unwrap();
        assert!(once.structurally_eq(&twice));
    }

    // The §8 S4 fixture, run through the full driver: forward reachability
    // proves the goal unreachable, so the driver returns the canonical
    // trivially-false task.
    #[test]
    fn infeasible_task_collapses_to_canonical_false_task() {
        let mut task = Task::default();
        for var in ["x", "y"] {
            for val in 0..2 {
                task.domains.add(v(var), x(val));
            }
        }
        task.init = vec![(v("x"), x(0)), (v("y"), x(0))];
        task.goal = vec![(v("y"), x(1))];
        // No action ever writes y.
        task.actions = vec![Action::new_operator("a", vec![(v("x"), x(0))], vec![(v("x"), x(1))], 1)];

        let (scoped, report) = scope(&task, ScopingOptions::default()).unwrap();
        assert!(report.infeasible);
        assert_eq!(scoped, Task::canonical_trivially_false());
    }

    // The §8 S5 fixture: nine actions over five variables, collapsing to the
    // single action `f` once every option is enabled and the driver loops to
    // a fixed point.
    fn nine_action_task() -> Task {
        let mut task = Task::default();
        for (var, range) in [("v", 2), ("w", 2), ("x", 2), ("y", 2), ("z", 3)] {
            for val in 0..range {
                task.domains.add(v(var), x(val));
            }
        }
        task.init = vec![
            (v("v"), x(0)),
            (v("w"), x(0)),
            (v("x"), x(0)),
            (v("y"), x(0)),
            (v("z"), x(0)),
        ];
        task.goal = vec![(v("z"), x(2))];
        task.actions = vec![
            Action::new_operator("a", vec![(v("w"), x(0))], vec![(v("w"), x(1))], 1),
            Action::new_operator("b", vec![(v("w"), x(1))], vec![(v("x"), x(1))], 1),
            Action::new_operator("c", vec![(v("x"), x(1)), (v("y"), x(1))], vec![(v("z"), x(2))], 1),
            Action::new_operator("d", vec![(v("w"), x(0))], vec![(v("x"), x(1))], 1),
            Action::new_operator("e", vec![(v("x"), x(1)), (v("y"), x(0))], vec![(v("z"), x(2))], 1),
            Action::new_operator("f", vec![(v("x"), x(0)), (v("y"), x(0))], vec![(v("z"), x(2))], 1),
            Action::new_operator("g", vec![], vec![(v("v"), x(0))], 1),
            Action::new_operator("h", vec![(v("v"), x(0))], vec![(v("y"), x(0))], 1),
            Action::new_operator("i", vec![(v("x"), x(0))], vec![(v("z"), x(1))], 1),
        ];
        task
    }

    fn action_names(task: &Task) -> BTreeSet<&str> {
        task.actions.iter().map(|a| a.name.as_str()).collect()
    }

    #[test]
    fn s5_every_option_off_keeps_the_whole_task() {
        let task = nine_action_task();
        let options = ScopingOptions {
            causal_links: false,
            merging: false,
            fact_based: false,
            forward_pass: false,
            loop_: false,
            write_output_file: false,
        };
        let (scoped, _) = scope(&task, options).unwrap();
        assert_eq!(scoped.domains.n_facts(), task.domains.n_facts());
        assert_eq!(
            action_names(&scoped),
            BTreeSet::from(["a", "b", "c", "d", "e", "f", "g", "h", "i"])
        );
    }

    #[test]
    fn s5_loop_strictly_improves_on_every_prefix() {
        let task = nine_action_task();
        let merge_vals = ScopingOptions {
            causal_links: false,
            merging: true,
            fact_based: true,
            forward_pass: false,
            loop_: false,
            write_output_file: false,
        };
        let cl_merge_vals = ScopingOptions {
            causal_links: true,
            ..merge_vals
        };
        let forward_cl_merge_vals = ScopingOptions {
            forward_pass: true,
            ..cl_merge_vals
        };
        let everything = ScopingOptions {
            loop_: true,
            ..forward_cl_merge_vals
        };

        let (merge_vals_scoped, _) = scope(&task, merge_vals).unwrap();
        let (cl_merge_vals_scoped, _) = scope(&task, cl_merge_vals).unwrap();
        let (forward_cl_merge_vals_scoped, _) = scope(&task, forward_cl_merge_vals).unwrap();
        let (looped, _) = scope(&task, everything).unwrap();

        assert_eq!(action_names(&merge_vals_scoped), BTreeSet::from(["b", "c", "d", "e", "f", "g", "h"]));
        assert_eq!(action_names(&cl_merge_vals_scoped), BTreeSet::from(["b", "c", "d", "e", "f"]));
        assert_eq!(action_names(&forward_cl_merge_vals_scoped), BTreeSet::from(["d", "e", "f"]));
        assert_eq!(action_names(&looped), BTreeSet::from(["f"]));

        assert_eq!(looped.domains.values(&v("z")), &BTreeSet::from([x(0), x(2)]));
        assert_eq!(looped.domains.variables().count(), 1);
        assert!(looped.domains.n_facts() <= forward_cl_merge_vals_scoped.domains.n_facts());
        assert!(forward_cl_merge_vals_scoped.domains.n_facts() <= cl_merge_vals_scoped.domains.n_facts());
        assert!(cl_merge_vals_scoped.domains.n_facts() <= merge_vals_scoped.domains.n_facts());
    }

    #[test]
    fn already_satisfied_goal_collapses_to_canonical_true_task() {
        let mut task = Task::default();
        task.domains.add(v("x"), x(0));
        task.domains.add(v("x"), x(1));
        task.init = vec![(v("x"), x(0))];
        task.goal = vec![(v("x"), x(0))];
        task.actions = vec![Action::new_operator("a", vec![(v("x"), x(0))], vec![(v("x"), x(1))], 1)];

        let (scoped, report) = scope(&task, ScopingOptions::default()).unwrap();
        assert!(report.trivially_solved);
        assert_eq!(scoped, Task::canonical_trivially_true());
    }
}
