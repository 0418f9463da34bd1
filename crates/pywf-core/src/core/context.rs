use std::path::{Path, PathBuf};
use std::sync::Arc;

use pywf_domain::{ProjectManifest, ProjectPaths};

use crate::core::config::Config;
use crate::core::error::Result;
use crate::core::runtime::{CommandInvocation, RunStatus, SharedRunner};

/// Everything a manager needs about the project it operates on.
pub struct ProjectContext {
    pub manifest: ProjectManifest,
    pub paths: ProjectPaths,
    pub config: Config,
    pub runner: SharedRunner,
    /// Appends `--quiet` to Poetry invocations.
    pub quiet: bool,
}

pub type SharedContext = Arc<ProjectContext>;

impl ProjectContext {
    pub fn new(
        manifest: ProjectManifest,
        config: Config,
        runner: SharedRunner,
        quiet: bool,
    ) -> Self {
        let paths = ProjectPaths::new(&manifest.project_root, &manifest.package_name);
        Self {
            manifest,
            paths,
            config,
            runner,
            quiet,
        }
    }

    #[must_use]
    pub fn root(&self) -> &Path {
        self.paths.root()
    }

    /// An invocation running from the project root.
    pub(crate) fn command(&self, executable: impl Into<PathBuf>) -> CommandInvocation {
        CommandInvocation::new(executable, self.root())
    }

    pub(crate) fn poetry(&self) -> CommandInvocation {
        let poetry = self
            .paths
            .resolve_bin("poetry", self.config.tools().poetry.as_deref());
        self.command(poetry)
    }

    pub(crate) fn run(&self, invocation: &CommandInvocation, real_run: bool) -> Result<RunStatus> {
        self.runner.run(invocation, real_run)
    }
}
