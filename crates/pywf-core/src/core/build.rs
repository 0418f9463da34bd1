//! Source distribution and wheel builds.

use crate::core::context::SharedContext;
use crate::core::error::Result;
use crate::core::fs::remove_dir_if_exists;
use crate::core::runtime::RunStatus;
use crate::core::tooling::scope::OperationScope;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BuildBackend {
    /// `python -m build`
    #[default]
    Pypa,
    Poetry,
}

#[derive(Clone)]
pub struct BuildManager {
    ctx: SharedContext,
}

impl BuildManager {
    pub fn new(ctx: SharedContext) -> Self {
        Self { ctx }
    }

    pub fn build(&self, backend: BuildBackend, real_run: bool) -> Result<RunStatus> {
        match backend {
            BuildBackend::Pypa => self.python_build(real_run),
            BuildBackend::Poetry => self.poetry_build(real_run),
        }
    }

    /// `python -m build --sdist --wheel` into a fresh `dist`.
    pub fn python_build(&self, real_run: bool) -> Result<RunStatus> {
        let _scope = OperationScope::enter("Build python distribution using pypa-build", "🏗");
        if real_run {
            remove_dir_if_exists(&self.ctx.paths.dir_dist())?;
        }
        let python = self.ctx.paths.resolve_bin("python", None);
        let invocation = self
            .ctx
            .command(python)
            .args(["-m", "build", "--sdist", "--wheel"]);
        self.ctx.run(&invocation, real_run)
    }

    pub fn poetry_build(&self, real_run: bool) -> Result<RunStatus> {
        let _scope = OperationScope::enter("Build python distribution using poetry", "🏗");
        if real_run {
            remove_dir_if_exists(&self.ctx.paths.dir_dist())?;
        }
        let invocation = self.ctx.poetry().arg("build");
        self.ctx.run(&invocation, real_run)
    }
}
