//! CSV reading and writing for attribute tables and edge results.

mod read;
mod write;

pub use read::*;
pub use write::*;
