//! Passes that rewrite a [`sasplus_ir::Task`] given the output of an
//! analysis. Currently just [`pruning`], the one rewrite both the backward
//! and forward analyses drive.

pub mod pruning;
