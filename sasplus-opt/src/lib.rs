//! # sasplus-opt
//!
//! The scoping analyses and passes that shrink a SAS+ planning task down to
//! the part of it the goal actually depends on. [`analysis::backward`]
//! computes goal-relevant facts and actions by a least fixed point,
//! [`analysis::forward`] computes reachable facts from the initial state by
//! a dual fixed point, and [`analysis::merging`] is the sub-algorithm the
//! backward step calls to collapse a group of effect-equivalent actions'
//! preconditions. [`passes::pruning`] is the rewrite both analyses drive.
//! [`driver`] wires them into the outer loop a caller actually runs.

pub mod analysis;
pub mod driver;
pub mod passes;

pub use driver::{scope, scope_sas_file, IterationStats, ScopingOptions, ScopingReport};
