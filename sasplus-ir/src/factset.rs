//! The `FactSet`: a mapping from variable to set of values, and the
//! algebraic core every analysis in `sasplus-opt` is built on.
//!
//! A variable with an empty value set is indistinguishable from an absent
//! variable everywhere in this API -- equality, iteration, and
//! `variables()` all normalize it away.

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

use sasplus_utils::{ValId, VarId};

/// A single `(variable, value)` pair.
pub type Fact = (VarId, ValId);

static EMPTY: BTreeSet<ValId> = BTreeSet::new();

#[derive(Clone, Default)]
pub struct FactSet {
    facts: BTreeMap<VarId, BTreeSet<ValId>>,
}

impl FactSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a single fact. Idempotent.
    pub fn add(&mut self, var: VarId, val: ValId) {
        self.facts.entry(var).or_default().insert(val);
    }

    /// Bulk-add an iterable of facts.
    pub fn add_iter(&mut self, iter: impl IntoIterator<Item = Fact>) {
        for (var, val) in iter {
            self.add(var, val);
        }
    }

    /// In-place union with another `FactSet`. Missing keys are treated as
    /// empty.
    pub fn union(&mut self, other: &FactSet) {
        for (var, values) in &other.facts {
            self.facts.entry(var.clone()).or_default().extend(values.iter().copied());
        }
    }

    /// In-place union of a single variable's value set with `values`.
    pub fn union_var(&mut self, var: VarId, values: &BTreeSet<ValId>) {
        self.facts.entry(var).or_default().extend(values.iter().copied());
    }

    /// The values currently recorded for `var` (empty if absent).
    pub fn values(&self, var: &VarId) -> &BTreeSet<ValId> {
        self.facts.get(var).unwrap_or(&EMPTY)
    }

    /// The set of keys with a non-empty value set.
    pub fn variables(&self) -> impl Iterator<Item = &VarId> {
        self.facts.iter().filter(|(_, v)| !v.is_empty()).map(|(k, _)| k)
    }

    /// Sum of value-set sizes across all variables.
    pub fn n_facts(&self) -> usize {
        self.facts.values().map(|v| v.len()).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.n_facts() == 0
    }

    /// `(var, val) ∈ self`.
    pub fn contains(&self, var: &VarId, val: ValId) -> bool {
        self.facts.get(var).is_some_and(|vals| vals.contains(&val))
    }

    /// `other ⊆ self`: every fact in `other` is also in `self`.
    pub fn is_superset_of(&self, other: &FactSet) -> bool {
        other
            .facts
            .iter()
            .all(|(var, vals)| vals.iter().all(|v| self.contains(var, *v)))
    }

    /// Replace every value set at a variable present in `self` by the
    /// full domain of that variable, per §4.1's coarsen-to-variables
    /// operation.
    pub fn coarsen_to_variables(&mut self, domains: &FactSet) {
        let vars: Vec<VarId> = self.facts.keys().cloned().collect();
        for var in vars {
            let full_domain = domains.values(&var).clone();
            self.facts.insert(var, full_domain);
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = (&VarId, &BTreeSet<ValId>)> {
        self.facts.iter().filter(|(_, v)| !v.is_empty())
    }
}

impl FromIterator<Fact> for FactSet {
    fn from_iter<T: IntoIterator<Item = Fact>>(iter: T) -> Self {
        let mut fs = FactSet::new();
        fs.add_iter(iter);
        fs
    }
}

impl<'a> IntoIterator for &'a FactSet {
    type Item = (&'a VarId, &'a BTreeSet<ValId>);
    type IntoIter = Box<dyn Iterator<Item = Self::Item> + 'a>;

    fn into_iter(self) -> Self::IntoIter {
        Box::new(self.iter())
    }
}

impl PartialEq for FactSet {
    fn eq(&self, other: &Self) -> bool {
        let mut vars: BTreeSet<&VarId> = self.variables().collect();
        vars.extend(other.variables());
        vars.into_iter().all(|v| self.values(v) == other.values(v))
    }
}
impl Eq for FactSet {}

impl fmt::Debug for FactSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map().entries(self.iter()).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fs(pairs: &[(&str, u32)]) -> FactSet {
        pairs
            .iter()
            .map(|(v, x)| (VarId::new(*v), ValId::new(*x)))
            .collect()
    }

    #[test]
    fn empty_key_equals_absent() {
        let mut a = FactSet::new();
        a.add(VarId::new("x"), ValId::new(0));
        let mut b = a.clone();
        b.add(VarId::new("y"), ValId::new(0));
        // remove it again, leaving an empty set behind
        b.facts.get_mut(&VarId::new("y")).unwrap().clear();
        assert_eq!(a, b);
        assert_eq!(b.variables().count(), 1);
    }

    #[test]
    fn union_is_commutative_on_contents() {
        let mut a = fs(&[("x", 0), ("x", 1)]);
        let b = fs(&[("x", 1), ("y", 0)]);
        a.union(&b);
        assert_eq!(a, fs(&[("x", 0), ("x", 1), ("y", 0)]));
    }

    #[test]
    fn superset_check() {
        let big = fs(&[("x", 0), ("x", 1), ("y", 0)]);
        let small = fs(&[("x", 1)]);
        assert!(big.is_superset_of(&small));
        assert!(!small.is_superset_of(&big));
    }

    #[test]
    fn coarsen_replaces_with_full_domain() {
        let domains = fs(&[("x", 0), ("x", 1), ("x", 2)]);
        let mut facts = fs(&[("x", 1)]);
        facts.coarsen_to_variables(&domains);
        assert_eq!(facts, domains);
    }

    #[test]
    fn n_facts_sums_value_sets() {
        let a = fs(&[("x", 0), ("x", 1), ("y", 0)]);
        assert_eq!(a.n_facts(), 3);
    }
}
