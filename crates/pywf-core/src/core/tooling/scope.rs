//! Scoped, indented operation logging.
//!
//! Every workflow operation enters an [`OperationScope`]; lines logged through
//! [`log`] while a scope is open are prefixed with one `| ` per open scope, so
//! nested operations (an export inside `deps export`, a token lookup inside
//! a codecov setup) read as a tree.

use std::cell::Cell;
use std::fmt::Display;
use std::time::Instant;

thread_local! {
    static DEPTH: Cell<usize> = const { Cell::new(0) };
}

const RULER: &str = "-----";

fn prefix() -> String {
    "| ".repeat(DEPTH.with(Cell::get))
}

/// Logs one line at the current nesting depth.
pub fn log(message: impl Display) {
    tracing::info!("{}{}", prefix(), message);
}

pub fn warn(message: impl Display) {
    tracing::warn!("{}{}", prefix(), message);
}

/// Opens a titled section that logs its elapsed time when dropped.
#[must_use = "the scope ends when this guard is dropped"]
pub struct OperationScope {
    label: &'static str,
    emoji: &'static str,
    start: Instant,
}

impl OperationScope {
    pub fn enter(label: &'static str, emoji: &'static str) -> Self {
        tracing::info!("{}+{RULER} {emoji} Start {label:?} {RULER}+", prefix());
        DEPTH.with(|depth| depth.set(depth.get() + 1));
        Self {
            label,
            emoji,
            start: Instant::now(),
        }
    }
}

impl Drop for OperationScope {
    fn drop(&mut self) {
        DEPTH.with(|depth| depth.set(depth.get().saturating_sub(1)));
        let elapsed = self.start.elapsed().as_secs_f64();
        let emoji = self.emoji;
        let label = self.label;
        tracing::info!(
            "{}+{RULER} {emoji} End {label:?}, elapsed = {elapsed:.2} sec {RULER}+",
            prefix()
        );
    }
}

/// Indents subsequent lines by one level without a titled section.
#[must_use = "the indent ends when this guard is dropped"]
pub struct IndentGuard(());

impl IndentGuard {
    pub fn new() -> Self {
        DEPTH.with(|depth| depth.set(depth.get() + 1));
        Self(())
    }
}

impl Default for IndentGuard {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for IndentGuard {
    fn drop(&mut self) {
        DEPTH.with(|depth| depth.set(depth.get().saturating_sub(1)));
    }
}

#[cfg(test)]
fn depth() -> usize {
    DEPTH.with(Cell::get)
}
