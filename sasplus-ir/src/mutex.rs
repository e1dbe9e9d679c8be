//! Mutex groups: facts declared pairwise mutually exclusive in any
//! reachable state.

use crate::factset::{Fact, FactSet};

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MutexGroup {
    pub facts: Vec<Fact>,
}

impl MutexGroup {
    pub fn new(facts: Vec<Fact>) -> Self {
        Self { facts }
    }

    /// A mutex is well-formed once pruned: at least two facts, spanning at
    /// least two variables.
    pub fn is_well_formed(&self) -> bool {
        if self.facts.len() < 2 {
            return false;
        }
        let vars: FactSet = self.facts.iter().cloned().collect();
        vars.variables().count() >= 2
    }
}
