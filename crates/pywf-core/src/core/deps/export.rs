//! Flattened `requirements*.txt` export from `poetry.lock`.

use std::fmt;
use std::path::PathBuf;

use pywf_domain::{sha256_file, ProjectPaths};

use crate::core::context::ProjectContext;
use crate::core::deps::cache::ExportCache;
use crate::core::error::{PywfError, Result};
use crate::core::fs::remove_file_if_exists;
use crate::core::runtime::CommandInvocation;
use crate::core::tooling::scope;

/// Named dependency groups declared in `pyproject.toml`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DependencyGroup {
    Dev,
    Test,
    Doc,
    Auto,
}

impl DependencyGroup {
    pub const ALL: [Self; 4] = [Self::Dev, Self::Test, Self::Doc, Self::Auto];

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Dev => "dev",
            Self::Test => "test",
            Self::Doc => "doc",
            Self::Auto => "auto",
        }
    }

    #[must_use]
    pub fn requirements_path(self, paths: &ProjectPaths) -> PathBuf {
        match self {
            Self::Dev => paths.path_requirements_dev(),
            Self::Test => paths.path_requirements_test(),
            Self::Doc => paths.path_requirements_doc(),
            Self::Auto => paths.path_requirements_automation(),
        }
    }
}

impl fmt::Display for DependencyGroup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArtifactGroup {
    pub group: DependencyGroup,
    pub output_path: PathBuf,
}

impl ArtifactGroup {
    #[must_use]
    pub fn name(&self) -> &'static str {
        self.group.as_str()
    }
}

/// Group artifacts in export order.
#[must_use]
pub fn artifact_groups(paths: &ProjectPaths) -> Vec<ArtifactGroup> {
    DependencyGroup::ALL
        .into_iter()
        .map(|group| ArtifactGroup {
            group,
            output_path: group.requirements_path(paths),
        })
        .collect()
}

pub struct DependencyExporter<'a> {
    ctx: &'a ProjectContext,
    lock_path: PathBuf,
    main_output: PathBuf,
    groups: Vec<ArtifactGroup>,
    cache: ExportCache,
}

impl<'a> DependencyExporter<'a> {
    pub fn new(ctx: &'a ProjectContext) -> Self {
        let paths = &ctx.paths;
        Self {
            ctx,
            lock_path: paths.path_poetry_lock(),
            main_output: paths.path_requirements(),
            groups: artifact_groups(paths),
            cache: ExportCache::new(paths.path_poetry_lock_hash_json()),
        }
    }

    #[must_use]
    pub fn cache(&self) -> &ExportCache {
        &self.cache
    }

    /// Exports the main and every group requirements file unless the lock
    /// file hash matches the recorded one. Returns whether export ran.
    pub fn export(&self, real_run: bool, with_hash: bool) -> Result<bool> {
        if !self.lock_path.is_file() {
            return Err(PywfError::MissingInputFile {
                path: self.lock_path.clone(),
                hint: "run `pywf deps lock` to create poetry.lock first",
            });
        }
        let current_hash = sha256_file(&self.lock_path)
            .map_err(|source| PywfError::io("failed to read", &self.lock_path, source))?;
        if !self.cache.needs_export(&current_hash) {
            scope::log("already did, do nothing");
            return Ok(false);
        }

        self.export_one(&self.main_output, None, real_run, with_hash)?;
        for group in &self.groups {
            self.export_one(&group.output_path, Some(group.name()), real_run, with_hash)?;
        }

        if real_run {
            self.cache.record(&current_hash)?;
        }
        Ok(true)
    }

    fn export_one(
        &self,
        output: &std::path::Path,
        only: Option<&str>,
        real_run: bool,
        with_hash: bool,
    ) -> Result<()> {
        if real_run {
            remove_file_if_exists(output)?;
        }
        let invocation = self.invocation(output, only, with_hash);
        self.ctx.run(&invocation, real_run)?;
        Ok(())
    }

    fn invocation(
        &self,
        output: &std::path::Path,
        only: Option<&str>,
        with_hash: bool,
    ) -> CommandInvocation {
        let mut invocation = self
            .ctx
            .poetry()
            .args(["export", "--format", "requirements.txt", "--output"])
            .arg_path(output);
        if let Some(group) = only {
            invocation = invocation.args(["--only", group]);
        }
        if !with_hash {
            invocation = invocation.arg("--without-hashes");
        }
        if self.ctx.quiet {
            invocation = invocation.arg("--quiet");
        }
        invocation
    }
}
