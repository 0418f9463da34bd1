//! External process execution.

pub mod process;

pub use process::{
    open_in_browser, CommandInvocation, CommandRunner, RunOutput, RunStatus, SharedRunner,
    SystemRunner, WorkingDirGuard,
};
