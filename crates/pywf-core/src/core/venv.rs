//! Project virtualenv lifecycle.

use crate::core::context::SharedContext;
use crate::core::error::Result;
use crate::core::fs::remove_dir_if_exists;
use crate::core::tooling::scope::{self, OperationScope};

#[derive(Clone)]
pub struct VenvManager {
    ctx: SharedContext,
}

impl VenvManager {
    pub fn new(ctx: SharedContext) -> Self {
        Self { ctx }
    }

    /// Creates `.venv` with the project's dev Python unless it already exists.
    /// Returns whether a virtualenv was (or would be) created.
    pub fn create_virtualenv(&self, real_run: bool) -> Result<bool> {
        let _scope = OperationScope::enter("Create Virtual Environment", "🐍");
        let dir_venv = self.ctx.paths.dir_venv();
        if dir_venv.exists() {
            scope::log(format_args!(
                "{} already exists, do nothing.",
                dir_venv.display()
            ));
            return Ok(false);
        }
        let manifest = &self.ctx.manifest;
        let python = format!(
            "python{}.{}",
            manifest.py_ver_major(),
            manifest.py_ver_minor()
        );
        let virtualenv = self.ctx.paths.resolve_bin("virtualenv", None);
        let invocation = self
            .ctx
            .command(virtualenv)
            .args(["-p", python.as_str()])
            .arg_path(&dir_venv);
        self.ctx.run(&invocation, real_run)?;
        scope::log("done");
        Ok(true)
    }

    /// Deletes `.venv`. Idempotent; returns whether something was (or would
    /// be) removed.
    pub fn remove_virtualenv(&self, real_run: bool) -> Result<bool> {
        let _scope = OperationScope::enter("Remove Virtual Environment", "🗑");
        let dir_venv = self.ctx.paths.dir_venv();
        if !dir_venv.exists() {
            scope::log(format_args!("{} does not exist, do nothing.", dir_venv.display()));
            return Ok(false);
        }
        scope::log(format_args!("remove {}", dir_venv.display()));
        if real_run {
            remove_dir_if_exists(&dir_venv)?;
        }
        Ok(true)
    }
}
