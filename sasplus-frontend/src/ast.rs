//! The raw SAS+ AST: one struct per `begin_X`/`end_X` section, index-based
//! (variables, values and operators all referred to by position) exactly as
//! the wire format stores them. Distinct from `sasplus_ir::Task`, whose
//! facts carry opaque `VarId`/`ValId` keys -- the mapping between the two
//! lives in `convert`.

/// A variable declaration: `begin_variable` / `end_variable`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct VariableAst {
    pub name: String,
    pub axiom_layer: i64,
    pub range: u32,
    pub value_names: Vec<String>,
}

/// `begin_mutex_group` / `end_mutex_group`: a list of `(var index, value
/// index)` pairs.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MutexGroupAst {
    pub facts: Vec<(u32, u32)>,
}

/// One effect line within an operator: `n_cond (var val)* affected_var
/// pre_or_-1 post`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct EffectAst {
    pub condition: Vec<(u32, u32)>,
    pub affected_var: u32,
    /// `None` encodes the format's `-1`: the effect applies regardless of
    /// the affected variable's current value.
    pub pre: Option<u32>,
    pub post: u32,
}

/// `begin_operator` / `end_operator`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct OperatorAst {
    pub name: String,
    pub prevail: Vec<(u32, u32)>,
    pub effects: Vec<EffectAst>,
    pub cost: u64,
}

/// `begin_rule` / `end_rule`: conditions plus a single `(var, pre_or_-1,
/// post)` triple.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AxiomAst {
    pub condition: Vec<(u32, u32)>,
    pub affected_var: u32,
    pub pre: Option<u32>,
    pub post: u32,
}

/// The whole file, section by section, in the order the format fixes.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SasFile {
    pub version: u32,
    pub metric: u32,
    pub variables: Vec<VariableAst>,
    pub mutex_groups: Vec<MutexGroupAst>,
    /// One value index per variable, same order as `variables`.
    pub init: Vec<u32>,
    pub goal: Vec<(u32, u32)>,
    pub operators: Vec<OperatorAst>,
    pub axioms: Vec<AxiomAst>,
}
