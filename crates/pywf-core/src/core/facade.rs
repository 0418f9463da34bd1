//! The [`PyWf`] facade: one object exposing every lifecycle operation of a
//! Python project.
//!
//! Each concern lives in a named manager (`venv`, `deps`, `tests`, `docs`,
//! `build`, `publish`, `saas`); the facade owns them and forwards. The SaaS
//! manager is built on first use since it needs an HTTP client and secrets.

use std::path::Path;
use std::sync::Arc;

use once_cell::sync::OnceCell;
use pywf_domain::{BumpAxis, BumpFloors, ProjectManifest, ProjectPaths, SemanticVersion};

use crate::core::build::{BuildBackend, BuildManager};
use crate::core::config::Config;
use crate::core::context::{ProjectContext, SharedContext};
use crate::core::deps::DepsManager;
use crate::core::docs::DocsManager;
use crate::core::error::Result;
use crate::core::publish::PublishManager;
use crate::core::runtime::{RunStatus, SharedRunner, SystemRunner};
use crate::core::saas::{ReadthedocsProject, SaasManager};
use crate::core::secrets::{HomeSecretStore, SecretStore};
use crate::core::testing::TestManager;
use crate::core::venv::VenvManager;
use crate::core::version_file::ensure_version_file;

#[derive(Debug, Clone, Copy, Default)]
pub struct PyWfOptions {
    /// Passes `--quiet` to Poetry.
    pub quiet: bool,
    /// Construction only logs the `_version.py` refresh instead of writing it.
    pub dry_run: bool,
}

pub struct PyWf {
    ctx: SharedContext,
    pub venv: VenvManager,
    pub deps: DepsManager,
    pub tests: TestManager,
    pub docs: DocsManager,
    pub build: BuildManager,
    pub publish: PublishManager,
    saas: OnceCell<SaasManager>,
    secrets: Option<Arc<dyn SecretStore>>,
}

impl PyWf {
    /// Loads the project at `path` with the environment configuration, real
    /// process spawning and the home secret file.
    pub fn from_pyproject_toml(path: &Path, options: PyWfOptions) -> Result<Self> {
        let manifest = ProjectManifest::from_pyproject_toml(path)?;
        Self::new(
            manifest,
            Config::from_env(),
            Arc::new(SystemRunner),
            None,
            options,
        )
    }

    /// Like [`PyWf::from_pyproject_toml`] with an injected runner and secrets.
    pub fn with_runner(
        path: &Path,
        config: Config,
        runner: SharedRunner,
        secrets: Arc<dyn SecretStore>,
        options: PyWfOptions,
    ) -> Result<Self> {
        let manifest = ProjectManifest::from_pyproject_toml(path)?;
        Self::new(manifest, config, runner, Some(secrets), options)
    }

    fn new(
        manifest: ProjectManifest,
        config: Config,
        runner: SharedRunner,
        secrets: Option<Arc<dyn SecretStore>>,
        options: PyWfOptions,
    ) -> Result<Self> {
        let ctx = Arc::new(ProjectContext::new(manifest, config, runner, options.quiet));
        ensure_version_file(
            &ctx.manifest,
            &ctx.paths.path_version_py(),
            !options.dry_run,
        )?;
        Ok(Self {
            venv: VenvManager::new(ctx.clone()),
            deps: DepsManager::new(ctx.clone()),
            tests: TestManager::new(ctx.clone()),
            docs: DocsManager::new(ctx.clone()),
            build: BuildManager::new(ctx.clone()),
            publish: PublishManager::new(ctx.clone()),
            saas: OnceCell::new(),
            secrets,
            ctx,
        })
    }

    #[must_use]
    pub fn manifest(&self) -> &ProjectManifest {
        &self.ctx.manifest
    }

    #[must_use]
    pub fn paths(&self) -> &ProjectPaths {
        &self.ctx.paths
    }

    #[must_use]
    pub fn config(&self) -> &Config {
        &self.ctx.config
    }

    /// The SaaS manager, built on first use.
    pub fn saas(&self) -> Result<&SaasManager> {
        self.saas.get_or_try_init(|| {
            let secrets: Arc<dyn SecretStore> = match &self.secrets {
                Some(secrets) => secrets.clone(),
                None => Arc::new(HomeSecretStore::discover(
                    self.ctx.config.home_secret().map(|path| path.as_path()),
                )?),
            };
            SaasManager::new(self.ctx.clone(), secrets)
        })
    }

    pub fn create_virtualenv(&self, real_run: bool) -> Result<bool> {
        self.venv.create_virtualenv(real_run)
    }

    pub fn remove_virtualenv(&self, real_run: bool) -> Result<bool> {
        self.venv.remove_virtualenv(real_run)
    }

    pub fn poetry_lock(&self, real_run: bool) -> Result<RunStatus> {
        self.deps.poetry_lock(real_run)
    }

    pub fn poetry_install_only_root(&self, real_run: bool) -> Result<RunStatus> {
        self.deps.poetry_install_only_root(real_run)
    }

    pub fn poetry_install(&self, real_run: bool) -> Result<RunStatus> {
        self.deps.poetry_install(real_run)
    }

    pub fn poetry_install_dev(&self, real_run: bool) -> Result<RunStatus> {
        self.deps.poetry_install_dev(real_run)
    }

    pub fn poetry_install_test(&self, real_run: bool) -> Result<RunStatus> {
        self.deps.poetry_install_test(real_run)
    }

    pub fn poetry_install_doc(&self, real_run: bool) -> Result<RunStatus> {
        self.deps.poetry_install_doc(real_run)
    }

    pub fn poetry_install_auto(&self, real_run: bool) -> Result<RunStatus> {
        self.deps.poetry_install_auto(real_run)
    }

    pub fn poetry_install_all(&self, real_run: bool) -> Result<RunStatus> {
        self.deps.poetry_install_all(real_run)
    }

    pub fn poetry_export(&self, real_run: bool, with_hash: bool) -> Result<bool> {
        self.deps.poetry_export(real_run, with_hash)
    }

    pub fn run_unit_test(&self, real_run: bool) -> Result<RunStatus> {
        self.tests.run_unit_test(real_run)
    }

    pub fn run_cov_test(&self, real_run: bool) -> Result<RunStatus> {
        self.tests.run_cov_test(real_run)
    }

    pub fn run_int_test(&self, real_run: bool) -> Result<RunStatus> {
        self.tests.run_int_test(real_run)
    }

    pub fn run_load_test(&self, real_run: bool) -> Result<RunStatus> {
        self.tests.run_load_test(real_run)
    }

    pub fn view_cov(&self, real_run: bool) -> Result<RunStatus> {
        self.tests.view_cov(real_run)
    }

    pub fn build_doc(&self, real_run: bool) -> Result<RunStatus> {
        self.docs.build_doc(real_run)
    }

    pub fn view_doc(&self, real_run: bool) -> Result<RunStatus> {
        self.docs.view_doc(real_run)
    }

    pub fn notebook_to_markdown(&self, real_run: bool) -> Result<usize> {
        self.docs.notebook_to_markdown(real_run)
    }

    pub fn deploy_versioned_doc(&self, real_run: bool) -> Result<RunStatus> {
        self.docs.deploy_versioned_doc(real_run)
    }

    pub fn deploy_latest_doc(&self, real_run: bool) -> Result<RunStatus> {
        self.docs.deploy_latest_doc(real_run)
    }

    pub fn python_build(&self, real_run: bool) -> Result<RunStatus> {
        self.build.build(BuildBackend::Pypa, real_run)
    }

    pub fn poetry_build(&self, real_run: bool) -> Result<RunStatus> {
        self.build.build(BuildBackend::Poetry, real_run)
    }

    pub fn twine_upload(&self, real_run: bool) -> Result<RunStatus> {
        self.publish.twine_upload(real_run)
    }

    pub fn poetry_publish(&self, real_run: bool) -> Result<RunStatus> {
        self.publish.poetry_publish(real_run)
    }

    pub fn bump_version(
        &self,
        axis: BumpAxis,
        floors: BumpFloors,
        real_run: bool,
    ) -> Result<SemanticVersion> {
        self.publish.bump_version(axis, floors, real_run)
    }

    pub fn publish_to_github_release(&self, real_run: bool) -> Result<bool> {
        self.saas()?.publish_to_github_release(real_run)
    }

    pub fn edit_github_repo_metadata(&self, real_run: bool) -> Result<bool> {
        self.saas()?.edit_github_repo_metadata(real_run)
    }

    pub fn get_codecov_io_upload_token(&self, real_run: bool) -> Result<Option<String>> {
        self.saas()?.get_codecov_io_upload_token(real_run)
    }

    pub fn setup_codecov_io_upload_token_on_github(&self, real_run: bool) -> Result<bool> {
        self.saas()?.setup_codecov_io_upload_token_on_github(real_run)
    }

    pub fn setup_readthedocs_project(&self, real_run: bool) -> Result<ReadthedocsProject> {
        self.saas()?.setup_readthedocs_project(real_run)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::secrets::StaticSecretStore;
    use crate::core::test_support::{write_project, RecordingRunner};
    use pywf_domain::PYPROJECT_TOML;
    use std::fs;

    fn facade(root: &Path, runner: Arc<RecordingRunner>) -> PyWf {
        PyWf::with_runner(
            &root.join(PYPROJECT_TOML),
            Config::default(),
            runner,
            Arc::new(StaticSecretStore::default()),
            PyWfOptions::default(),
        )
        .unwrap()
    }

    #[test]
    fn construction_writes_version_file() {
        let temp = tempfile::tempdir().unwrap();
        write_project(temp.path());
        let pywf = facade(temp.path(), Arc::new(RecordingRunner::default()));
        let body = fs::read_to_string(pywf.paths().path_version_py()).unwrap();
        assert!(body.contains("__version__ = \"0.1.3\""));
        assert_eq!(pywf.manifest().package_name, "demo_pkg");
    }

    #[test]
    fn forwards_to_managers_through_shared_runner() {
        let temp = tempfile::tempdir().unwrap();
        write_project(temp.path());
        let runner = Arc::new(RecordingRunner::default());
        let pywf = facade(temp.path(), runner.clone());

        pywf.poetry_lock(true).unwrap();
        pywf.run_unit_test(true).unwrap();
        pywf.poetry_build(true).unwrap();
        assert!(pywf.create_virtualenv(false).unwrap());

        let args: Vec<_> = runner
            .invocations()
            .into_iter()
            .map(|call| call.arguments.first().cloned().unwrap_or_default())
            .collect();
        assert_eq!(args.len(), 3);
        assert_eq!(args[0], "lock");
        assert_eq!(args[2], "build");
    }

    #[test]
    fn saas_is_built_once_and_dry_runs_need_no_secrets() {
        let temp = tempfile::tempdir().unwrap();
        write_project(temp.path());
        let pywf = facade(temp.path(), Arc::new(RecordingRunner::default()));
        let first = pywf.saas().unwrap() as *const SaasManager;
        let second = pywf.saas().unwrap() as *const SaasManager;
        assert_eq!(first, second);
        assert!(!pywf.edit_github_repo_metadata(false).unwrap());
        assert_eq!(
            pywf.setup_readthedocs_project(false).unwrap(),
            ReadthedocsProject::Simulated
        );
    }

    #[test]
    fn dry_run_construction_leaves_version_file_alone() {
        let temp = tempfile::tempdir().unwrap();
        write_project(temp.path());
        let options = PyWfOptions {
            dry_run: true,
            ..PyWfOptions::default()
        };
        let pywf = PyWf::with_runner(
            &temp.path().join(PYPROJECT_TOML),
            Config::default(),
            Arc::new(RecordingRunner::default()),
            Arc::new(StaticSecretStore::default()),
            options,
        )
        .unwrap();
        assert!(!pywf.paths().path_version_py().exists());
    }

    #[test]
    fn invalid_project_is_rejected() {
        let temp = tempfile::tempdir().unwrap();
        let path = temp.path().join(PYPROJECT_TOML);
        let err = PyWf::from_pyproject_toml(&path, PyWfOptions::default())
            .err()
            .unwrap();
        assert!(
            matches!(err, crate::core::error::PywfError::Manifest(_)),
            "{err:?}"
        );
    }
}
