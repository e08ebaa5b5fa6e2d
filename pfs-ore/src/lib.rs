//! Small utilities shared by every `pfs` crate.
//!
//! Keep this crate dependency free, everything else in the workspace links it.

pub mod assert;
pub mod cast;
pub mod env;
