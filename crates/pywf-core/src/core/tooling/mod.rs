//! CLI-facing diagnostics, scoped logging, and outcome shaping.

pub mod diagnostics;
pub mod outcome;
pub mod scope;
