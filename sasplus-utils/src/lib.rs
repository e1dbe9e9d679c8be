//! Shared utilities for the sasplus scoping tool.
mod errors;
mod id;
mod out_file;

pub use errors::{Error, SasResult};
pub use id::{ValId, VarId};
pub use out_file::OutputFile;
