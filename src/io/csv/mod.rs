//! CSV reading and writing of candidate, agent, label and result tables.

mod read;
mod write;

pub(crate) use read::*;
pub(crate) use write::*;
