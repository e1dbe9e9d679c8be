//! Serializes a `SasFile` back to the textual SAS+ format. `emit` and
//! `parser::parse` are exact inverses: `parse(&emit(f)) == f` for any `f`
//! produced by `parse`, and `emit(parse(s)) == s` whenever `s` was itself
//! produced by `emit` (or some other canonical writer, since the format has
//! no whitespace or field-order freedom to lose).

use std::fmt::Write as _;

use crate::ast::{AxiomAst, EffectAst, MutexGroupAst, OperatorAst, SasFile, VariableAst};

pub fn emit(file: &SasFile) -> String {
    let mut out = String::new();
    writeln!(out, "begin_version").unwrap();
    writeln!(out, "{}", file.version).unwrap();
    writeln!(out, "end_version").unwrap();
    writeln!(out, "begin_metric").unwrap();
    writeln!(out, "{}", file.metric).unwrap();
    writeln!(out, "end_metric").unwrap();

    writeln!(out, "{}", file.variables.len()).unwrap();
    for var in &file.variables {
        emit_variable(&mut out, var);
    }

    writeln!(out, "{}", file.mutex_groups.len()).unwrap();
    for group in &file.mutex_groups {
        emit_mutex_group(&mut out, group);
    }

    writeln!(out, "begin_state").unwrap();
    for val in &file.init {
        writeln!(out, "{val}").unwrap();
    }
    writeln!(out, "end_state").unwrap();

    writeln!(out, "begin_goal").unwrap();
    writeln!(out, "{}", file.goal.len()).unwrap();
    for (var, val) in &file.goal {
        writeln!(out, "{var} {val}").unwrap();
    }
    writeln!(out, "end_goal").unwrap();

    writeln!(out, "{}", file.operators.len()).unwrap();
    for op in &file.operators {
        emit_operator(&mut out, op);
    }

    writeln!(out, "{}", file.axioms.len()).unwrap();
    for axiom in &file.axioms {
        emit_axiom(&mut out, axiom);
    }

    out
}

fn emit_variable(out: &mut String, var: &VariableAst) {
    writeln!(out, "begin_variable").unwrap();
    writeln!(out, "{}", var.name).unwrap();
    writeln!(out, "{}", var.axiom_layer).unwrap();
    writeln!(out, "{}", var.range).unwrap();
    for name in &var.value_names {
        writeln!(out, "{name}").unwrap();
    }
    writeln!(out, "end_variable").unwrap();
}

fn emit_mutex_group(out: &mut String, group: &MutexGroupAst) {
    writeln!(out, "begin_mutex_group").unwrap();
    writeln!(out, "{}", group.facts.len()).unwrap();
    for (var, val) in &group.facts {
        writeln!(out, "{var} {val}").unwrap();
    }
    writeln!(out, "end_mutex_group").unwrap();
}

fn emit_operator(out: &mut String, op: &OperatorAst) {
    writeln!(out, "begin_operator").unwrap();
    writeln!(out, "{}", op.name).unwrap();
    writeln!(out, "{}", op.prevail.len()).unwrap();
    for (var, val) in &op.prevail {
        writeln!(out, "{var} {val}").unwrap();
    }
    writeln!(out, "{}", op.effects.len()).unwrap();
    for effect in &op.effects {
        emit_effect(out, effect);
    }
    writeln!(out, "{}", op.cost).unwrap();
    writeln!(out, "end_operator").unwrap();
}

fn emit_effect(out: &mut String, effect: &EffectAst) {
    let mut fields = vec![effect.condition.len().to_string()];
    for (var, val) in &effect.condition {
        fields.push(var.to_string());
        fields.push(val.to_string());
    }
    fields.push(effect.affected_var.to_string());
    fields.push(match effect.pre {
        Some(v) => v.to_string(),
        None => "-1".to_string(),
    });
    fields.push(effect.post.to_string());
    writeln!(out, "{}", fields.join(" ")).unwrap();
}

fn emit_axiom(out: &mut String, axiom: &AxiomAst) {
    writeln!(out, "begin_rule").unwrap();
    writeln!(out, "{}", axiom.condition.len()).unwrap();
    for (var, val) in &axiom.condition {
        writeln!(out, "{var} {val}").unwrap();
    }
    let pre = match axiom.pre {
        Some(v) => v.to_string(),
        None => "-1".to_string(),
    };
    writeln!(out, "{} {} {}", axiom.affected_var, pre, axiom.post).unwrap();
    writeln!(out, "end_rule").unwrap();
}
