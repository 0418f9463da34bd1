//! Poetry lock, install and requirements export.

pub mod cache;
pub mod export;

use crate::core::context::SharedContext;
use crate::core::error::Result;
use crate::core::runtime::RunStatus;
use crate::core::tooling::scope::OperationScope;

pub use cache::{CacheState, ExportCache, ExportRecord, EXPORT_RECORD_DESCRIPTION};
pub use export::{artifact_groups, ArtifactGroup, DependencyExporter, DependencyGroup};

#[derive(Clone)]
pub struct DepsManager {
    ctx: SharedContext,
}

impl DepsManager {
    pub fn new(ctx: SharedContext) -> Self {
        Self { ctx }
    }

    fn run_poetry<I, S>(&self, args: I, real_run: bool) -> Result<RunStatus>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut invocation = self.ctx.poetry().args(args);
        if self.ctx.quiet {
            invocation = invocation.arg("--quiet");
        }
        self.ctx.run(&invocation, real_run)
    }

    /// `poetry lock`
    pub fn poetry_lock(&self, real_run: bool) -> Result<RunStatus> {
        let _scope = OperationScope::enter("Resolve Dependencies Tree", "🔒");
        self.run_poetry(["lock"], real_run)
    }

    /// Installs only the project package itself.
    pub fn poetry_install_only_root(&self, real_run: bool) -> Result<RunStatus> {
        let _scope = OperationScope::enter("Install Package Itself Only", "💾");
        self.run_poetry(["install", "--only-root"], real_run)
    }

    pub fn poetry_install(&self, real_run: bool) -> Result<RunStatus> {
        let _scope = OperationScope::enter("Install Main Dependencies", "💾");
        self.run_poetry(["install"], real_run)
    }

    /// `poetry install --with <group>`
    pub fn poetry_install_group(
        &self,
        group: DependencyGroup,
        real_run: bool,
    ) -> Result<RunStatus> {
        let _scope = OperationScope::enter(install_label(group), "💾");
        self.run_poetry(["install", "--with", group.as_str()], real_run)
    }

    pub fn poetry_install_dev(&self, real_run: bool) -> Result<RunStatus> {
        self.poetry_install_group(DependencyGroup::Dev, real_run)
    }

    pub fn poetry_install_test(&self, real_run: bool) -> Result<RunStatus> {
        self.poetry_install_group(DependencyGroup::Test, real_run)
    }

    pub fn poetry_install_doc(&self, real_run: bool) -> Result<RunStatus> {
        self.poetry_install_group(DependencyGroup::Doc, real_run)
    }

    pub fn poetry_install_auto(&self, real_run: bool) -> Result<RunStatus> {
        self.poetry_install_group(DependencyGroup::Auto, real_run)
    }

    pub fn poetry_install_all(&self, real_run: bool) -> Result<RunStatus> {
        let _scope = OperationScope::enter("Install All Dependencies", "💾");
        self.run_poetry(["install", "--all-groups"], real_run)
    }

    /// Exports every requirements file; skipped when `poetry.lock` is unchanged
    /// since the last real export. Returns whether export ran.
    pub fn poetry_export(&self, real_run: bool, with_hash: bool) -> Result<bool> {
        let _scope = OperationScope::enter(
            "Export resolved dependencies to requirements-***.txt file",
            "📦",
        );
        DependencyExporter::new(&self.ctx).export(real_run, with_hash)
    }
}

fn install_label(group: DependencyGroup) -> &'static str {
    match group {
        DependencyGroup::Dev => "Install dev dependencies",
        DependencyGroup::Test => "Install test dependencies",
        DependencyGroup::Doc => "Install doc dependencies",
        DependencyGroup::Auto => "Install automation dependencies",
    }
}
