//! Internal representation for the sasplus task scoper.
//!
//! `FactSet` is the one algebra every analysis is built from; `Action` and
//! `Task` are otherwise plain value types with no parent/child pointers --
//! unlike a control-flow IR, scoping's data model has no cycles and needs
//! no weak references (spec §9).

mod action;
mod factset;
mod mutex;
mod task;

pub use action::{Action, Role};
pub use factset::{Fact, FactSet};
pub use mutex::MutexGroup;
pub use task::Task;

pub use sasplus_utils::{ValId, VarId};
