//! A line-oriented parser for the textual SAS+ format.
//!
//! Every section is `begin_X` / a fixed number of content lines / `end_X`,
//! with counts given either at the top of the section or derivable from the
//! variable count already parsed. A cursor over the line list with small
//! per-section helpers is all that's needed -- no backtracking, no nested
//! grammar.

use sasplus_utils::{Error, SasResult};

use crate::ast::{AxiomAst, EffectAst, MutexGroupAst, OperatorAst, SasFile, VariableAst};

struct Cursor<'a> {
    lines: Vec<&'a str>,
    pos: usize,
}

impl<'a> Cursor<'a> {
    fn new(input: &'a str) -> Self {
        Self {
            lines: input.lines().collect(),
            pos: 0,
        }
    }

    fn next(&mut self, section: &str) -> SasResult<&'a str> {
        let line = self
            .lines
            .get(self.pos)
            .ok_or_else(|| Error::parse_error(section, "unexpected end of file"))?;
        self.pos += 1;
        Ok(*line)
    }

    fn expect(&mut self, section: &str, literal: &str) -> SasResult<()> {
        let line = self.next(section)?;
        if line != literal {
            return Err(Error::parse_error(
                section,
                format!("expected `{literal}`, found `{line}`"),
            ));
        }
        Ok(())
    }

    fn next_u32(&mut self, section: &str) -> SasResult<u32> {
        let line = self.next(section)?;
        line.trim()
            .parse()
            .map_err(|_| Error::parse_error(section, format!("expected an integer, found `{line}`")))
    }

    fn next_i64(&mut self, section: &str) -> SasResult<i64> {
        let line = self.next(section)?;
        line.trim()
            .parse()
            .map_err(|_| Error::parse_error(section, format!("expected an integer, found `{line}`")))
    }
}

/// Parse a complete SAS+ file from its textual form.
pub fn parse(input: &str) -> SasResult<SasFile> {
    let mut cur = Cursor::new(input);

    let version = parse_version(&mut cur)?;
    let metric = parse_metric(&mut cur)?;
    let variables = parse_variables(&mut cur)?;
    let mutex_groups = parse_mutex_groups(&mut cur)?;
    let init = parse_init(&mut cur, variables.len())?;
    let goal = parse_goal(&mut cur)?;
    let operators = parse_operators(&mut cur)?;
    let axioms = parse_axioms(&mut cur)?;

    Ok(SasFile {
        version,
        metric,
        variables,
        mutex_groups,
        init,
        goal,
        operators,
        axioms,
    })
}

fn parse_version(cur: &mut Cursor) -> SasResult<u32> {
    cur.expect("version", "begin_version")?;
    let version = cur.next_u32("version")?;
    cur.expect("version", "end_version")?;
    Ok(version)
}

fn parse_metric(cur: &mut Cursor) -> SasResult<u32> {
    cur.expect("metric", "begin_metric")?;
    let metric = cur.next_u32("metric")?;
    cur.expect("metric", "end_metric")?;
    Ok(metric)
}

fn parse_variables(cur: &mut Cursor) -> SasResult<Vec<VariableAst>> {
    let n = cur.next_u32("variables")?;
    let mut vars = Vec::with_capacity(n as usize);
    for _ in 0..n {
        cur.expect("variable", "begin_variable")?;
        let name = cur.next("variable")?.to_string();
        let axiom_layer = cur.next_i64("variable")?;
        let range = cur.next_u32("variable")?;
        let mut value_names = Vec::with_capacity(range as usize);
        for _ in 0..range {
            value_names.push(cur.next("variable")?.to_string());
        }
        cur.expect("variable", "end_variable")?;
        vars.push(VariableAst {
            name,
            axiom_layer,
            range,
            value_names,
        });
    }
    Ok(vars)
}

fn parse_var_val_pair(cur: &mut Cursor, section: &str) -> SasResult<(u32, u32)> {
    let line = cur.next(section)?;
    let mut parts = line.split_whitespace();
    let var = parts
        .next()
        .ok_or_else(|| Error::parse_error(section, format!("empty var/value pair line `{line}`")))?;
    let val = parts
        .next()
        .ok_or_else(|| Error::parse_error(section, format!("missing value in pair line `{line}`")))?;
    let var: u32 = var
        .parse()
        .map_err(|_| Error::parse_error(section, format!("non-integer variable index in `{line}`")))?;
    let val: u32 = val
        .parse()
        .map_err(|_| Error::parse_error(section, format!("non-integer value index in `{line}`")))?;
    Ok((var, val))
}

fn parse_mutex_groups(cur: &mut Cursor) -> SasResult<Vec<MutexGroupAst>> {
    let n = cur.next_u32("mutex_group")?;
    let mut groups = Vec::with_capacity(n as usize);
    for _ in 0..n {
        cur.expect("mutex_group", "begin_mutex_group")?;
        let n_facts = cur.next_u32("mutex_group")?;
        let mut facts = Vec::with_capacity(n_facts as usize);
        for _ in 0..n_facts {
            facts.push(parse_var_val_pair(cur, "mutex_group")?);
        }
        cur.expect("mutex_group", "end_mutex_group")?;
        groups.push(MutexGroupAst { facts });
    }
    Ok(groups)
}

fn parse_init(cur: &mut Cursor, n_vars: usize) -> SasResult<Vec<u32>> {
    cur.expect("state", "begin_state")?;
    let mut init = Vec::with_capacity(n_vars);
    for _ in 0..n_vars {
        init.push(cur.next_u32("state")?);
    }
    cur.expect("state", "end_state")?;
    Ok(init)
}

fn parse_goal(cur: &mut Cursor) -> SasResult<Vec<(u32, u32)>> {
    cur.expect("goal", "begin_goal")?;
    let n = cur.next_u32("goal")?;
    let mut goal = Vec::with_capacity(n as usize);
    for _ in 0..n {
        goal.push(parse_var_val_pair(cur, "goal")?);
    }
    cur.expect("goal", "end_goal")?;
    Ok(goal)
}

fn parse_effect(cur: &mut Cursor) -> SasResult<EffectAst> {
    let line = cur.next("operator")?;
    let parts: Vec<&str> = line.split_whitespace().collect();
    let n_cond: usize = parts
        .first()
        .ok_or_else(|| Error::parse_error("operator", "empty effect line"))?
        .parse()
        .map_err(|_| Error::parse_error("operator", format!("malformed effect line `{line}`")))?;

    if parts.len() < 1 + n_cond * 2 {
        return Err(Error::parse_error(
            "operator",
            format!("effect line is too short for its condition count: `{line}`"),
        ));
    }
    let mut condition = Vec::with_capacity(n_cond);
    for i in 0..n_cond {
        let var = parts[1 + i * 2]
            .parse()
            .map_err(|_| Error::parse_error("operator", format!("malformed effect condition in `{line}`")))?;
        let val = parts[2 + i * 2]
            .parse()
            .map_err(|_| Error::parse_error("operator", format!("malformed effect condition in `{line}`")))?;
        condition.push((var, val));
    }

    let tail = &parts[1 + n_cond * 2..];
    if tail.len() != 3 {
        return Err(Error::parse_error(
            "operator",
            format!("effect line has the wrong number of fields: `{line}`"),
        ));
    }
    let affected_var: u32 = tail[0]
        .parse()
        .map_err(|_| Error::parse_error("operator", format!("malformed affected variable in `{line}`")))?;
    let pre_raw: i64 = tail[1]
        .parse()
        .map_err(|_| Error::parse_error("operator", format!("malformed pre value in `{line}`")))?;
    let pre = if pre_raw == -1 { None } else { Some(pre_raw as u32) };
    let post: u32 = tail[2]
        .parse()
        .map_err(|_| Error::parse_error("operator", format!("malformed post value in `{line}`")))?;

    Ok(EffectAst {
        condition,
        affected_var,
        pre,
        post,
    })
}

fn parse_operators(cur: &mut Cursor) -> SasResult<Vec<OperatorAst>> {
    let n = cur.next_u32("operator")?;
    let mut ops = Vec::with_capacity(n as usize);
    for _ in 0..n {
        cur.expect("operator", "begin_operator")?;
        let name = cur.next("operator")?.to_string();
        let n_prevail = cur.next_u32("operator")?;
        let mut prevail = Vec::with_capacity(n_prevail as usize);
        for _ in 0..n_prevail {
            prevail.push(parse_var_val_pair(cur, "operator")?);
        }
        let n_effects = cur.next_u32("operator")?;
        let mut effects = Vec::with_capacity(n_effects as usize);
        for _ in 0..n_effects {
            effects.push(parse_effect(cur)?);
        }
        let cost = cur.next_u32("operator")? as u64;
        cur.expect("operator", "end_operator")?;
        ops.push(OperatorAst {
            name,
            prevail,
            effects,
            cost,
        });
    }
    Ok(ops)
}

fn parse_axioms(cur: &mut Cursor) -> SasResult<Vec<AxiomAst>> {
    let n = cur.next_u32("rule")?;
    let mut axioms = Vec::with_capacity(n as usize);
    for _ in 0..n {
        cur.expect("rule", "begin_rule")?;
        let n_cond = cur.next_u32("rule")?;
        let mut condition = Vec::with_capacity(n_cond as usize);
        for _ in 0..n_cond {
            condition.push(parse_var_val_pair(cur, "rule")?);
        }
        let line = cur.next("rule")?;
        let parts: Vec<&str> = line.split_whitespace().collect();
        if parts.len() != 3 {
            return Err(Error::parse_error(
                "rule",
                format!("expected `var pre_or_-1 post`, found `{line}`"),
            ));
        }
        let affected_var: u32 = parts[0]
            .parse()
            .map_err(|_| Error::parse_error("rule", format!("malformed affected variable in `{line}`")))?;
        let pre_raw: i64 = parts[1]
            .parse()
            .map_err(|_| Error::parse_error("rule", format!("malformed pre value in `{line}`")))?;
        let pre = if pre_raw == -1 { None } else { Some(pre_raw as u32) };
        let post: u32 = parts[2]
            .parse()
            .map_err(|_| Error::parse_error("rule", format!("malformed post value in `{line}`")))?;
        cur.expect("rule", "end_rule")?;
        axioms.push(AxiomAst {
            condition,
            affected_var,
            pre,
            post,
        });
    }
    Ok(axioms)
}

#[cfg(test)]
mod tests {
    use super::*;

    const TINY: &str = "begin_version\n3\nend_version\nbegin_metric\n0\nend_metric\n1\nbegin_variable\nvar0\n-1\n2\nval-a\nval-b\nend_variable\n0\nbegin_state\n0\nend_state\nbegin_goal\n1\n0 1\nend_goal\n1\nbegin_operator\n(op1)\n0\n1\n0 0 -1 1\n1\nend_operator\n0\n";

    #[test]
    fn parses_a_minimal_file() {
        let file = parse(TINY).unwrap();
        assert_eq!(file.version, 3);
        assert_eq!(file.metric, 0);
        assert_eq!(file.variables.len(), 1);
        assert_eq!(file.variables[0].value_names, vec!["val-a", "val-b"]);
        assert_eq!(file.init, vec![0]);
        assert_eq!(file.goal, vec![(0, 1)]);
        assert_eq!(file.operators.len(), 1);
        assert_eq!(file.operators[0].effects[0].pre, None);
        assert_eq!(file.operators[0].effects[0].post, 1);
        assert!(file.axioms.is_empty());
    }

    #[test]
    fn rejects_truncated_input() {
        let err = parse("begin_version\n3\n").unwrap_err();
        assert!(err.message().contains("version"));
    }

    #[test]
    fn rejects_mismatched_delimiter() {
        let bad = TINY.replacen("end_version", "end_versio", 1);
        assert!(parse(&bad).is_err());
    }
}
