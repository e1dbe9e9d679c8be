//! The textual SAS+ file format: a raw, order-preserving AST, a hand-rolled
//! line-oriented parser for it, a matching serializer, and the conversions
//! to and from `sasplus_ir::Task`.
//!
//! The format isn't recursive and has no nested expressions -- each section
//! is a flat run of `begin_X`/`end_X`-delimited lines -- so a grammar engine
//! like `pest` buys nothing here; a line scanner that tracks which section
//! it's in reads the same and has far fewer moving parts.

pub mod ast;
pub mod convert;
pub mod emit;
pub mod parser;

pub use ast::{AxiomAst, MutexGroupAst, OperatorAst, SasFile, VariableAst};
pub use convert::{from_task, to_task};
pub use emit::emit;
pub use parser::parse;
