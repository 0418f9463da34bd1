//! Package upload and release versioning.

use std::fs;
use std::path::PathBuf;

use pywf_domain::{bump, set_version_in_pyproject, BumpAxis, BumpFloors, SemanticVersion};

use crate::core::context::SharedContext;
use crate::core::error::{PywfError, Result};
use crate::core::runtime::RunStatus;
use crate::core::tooling::scope::{self, OperationScope};

#[derive(Clone)]
pub struct PublishManager {
    ctx: SharedContext,
}

impl PublishManager {
    pub fn new(ctx: SharedContext) -> Self {
        Self { ctx }
    }

    fn dist_files(&self) -> Result<Vec<PathBuf>> {
        let dist = self.ctx.paths.dir_dist();
        let entries = match fs::read_dir(&dist) {
            Ok(entries) => entries,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(source) => return Err(PywfError::io("failed to read", dist, source)),
        };
        let mut files: Vec<PathBuf> = entries
            .filter_map(std::result::Result::ok)
            .map(|entry| entry.path())
            .filter(|path| path.is_file())
            .collect();
        files.sort();
        Ok(files)
    }

    /// Uploads everything in `dist` with twine.
    pub fn twine_upload(&self, real_run: bool) -> Result<RunStatus> {
        let _scope = OperationScope::enter("Publish to PyPI via twine", "📦");
        let dist = self.ctx.paths.dir_dist();
        let files = self.dist_files()?;
        let twine = self.ctx.paths.resolve_bin("twine", None);
        let mut invocation = self.ctx.command(twine).arg("upload");
        if files.is_empty() {
            if real_run {
                return Err(PywfError::MissingInputFile {
                    path: dist,
                    hint: "run `pywf build` to create distributions first",
                });
            }
            invocation = invocation.arg(format!("{}/*", dist.display()));
        } else {
            for file in &files {
                invocation = invocation.arg_path(file);
            }
        }
        self.ctx.run(&invocation, real_run)
    }

    pub fn poetry_publish(&self, real_run: bool) -> Result<RunStatus> {
        let _scope = OperationScope::enter("Publish to PyPI via poetry", "📦");
        let invocation = self.ctx.poetry().arg("publish");
        self.ctx.run(&invocation, real_run)
    }

    /// Computes the next release version and writes it to `pyproject.toml`
    /// on a real run.
    pub fn bump_version(
        &self,
        axis: BumpAxis,
        floors: BumpFloors,
        real_run: bool,
    ) -> Result<SemanticVersion> {
        let _scope = OperationScope::enter("Bump Version", "🔼");
        let current = SemanticVersion::parse(&self.ctx.manifest.package_version)?;
        let next = bump(current, axis, floors)?;
        scope::log(format_args!("bump {axis}: {current} -> {next}"));
        if real_run {
            set_version_in_pyproject(&self.ctx.paths.path_pyproject_toml(), &next.to_string())?;
            scope::log(format_args!(
                "updated {}",
                self.ctx.paths.path_pyproject_toml().display()
            ));
        }
        Ok(next)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::test_support::fixture_context;
    use pywf_domain::ProjectManifest;
    use std::sync::Arc;

    #[test]
    fn twine_lists_dist_files() {
        let (_temp, ctx, runner) = fixture_context(false);
        let ctx = Arc::new(ctx);
        let publish = PublishManager::new(ctx.clone());

        assert!(publish.twine_upload(false).unwrap().is_simulated());
        assert!(matches!(
            publish.twine_upload(true),
            Err(PywfError::MissingInputFile { .. })
        ));

        let dist = ctx.paths.dir_dist();
        fs::create_dir_all(&dist).unwrap();
        fs::write(dist.join("demo_pkg-0.1.3.tar.gz"), "").unwrap();
        fs::write(dist.join("demo_pkg-0.1.3-py3-none-any.whl"), "").unwrap();
        publish.twine_upload(true).unwrap();
        let call = &runner.invocations()[0];
        assert_eq!(call.arguments.len(), 3);
        assert_eq!(call.arguments[0], "upload");
        assert!(call.arguments[1].ends_with(".whl"));
        assert!(call.arguments[2].ends_with(".tar.gz"));
    }

    #[test]
    fn bump_rewrites_pyproject_only_on_real_run() {
        let (_temp, ctx, _runner) = fixture_context(false);
        let ctx = Arc::new(ctx);
        let publish = PublishManager::new(ctx.clone());
        let pyproject = ctx.paths.path_pyproject_toml();

        let next = publish
            .bump_version(BumpAxis::Minor, BumpFloors::default(), false)
            .unwrap();
        assert_eq!(next.to_string(), "0.2.0");
        let reloaded = ProjectManifest::from_pyproject_toml(&pyproject).unwrap();
        assert_eq!(reloaded.package_version, "0.1.3");

        let next = publish
            .bump_version(BumpAxis::Patch, BumpFloors::default(), true)
            .unwrap();
        assert_eq!(next.to_string(), "0.1.4");
        let reloaded = ProjectManifest::from_pyproject_toml(&pyproject).unwrap();
        assert_eq!(reloaded.package_version, "0.1.4");
    }

    #[test]
    fn poetry_publish_is_plain_command() {
        let (_temp, ctx, runner) = fixture_context(true);
        PublishManager::new(Arc::new(ctx)).poetry_publish(true).unwrap();
        assert_eq!(runner.invocations()[0].arguments, ["publish"]);
    }
}
