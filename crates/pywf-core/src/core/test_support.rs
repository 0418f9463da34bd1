use std::fs;
use std::path::Path;
use std::sync::{Arc, Mutex};

use pywf_domain::{ProjectManifest, PYPROJECT_TOML};
use tempfile::TempDir;

use crate::core::config::Config;
use crate::core::context::ProjectContext;
use crate::core::error::Result;
use crate::core::runtime::{CommandInvocation, CommandRunner, RunOutput};

pub(crate) const PYPROJECT: &str = r#"[project]
name = "demo_pkg"
version = "0.1.3"
description = "Demo package for workflow tests"
license = { text = "MIT" }
authors = [{ name = "Ada Example", email = "ada@example.com" }]
maintainers = [{ name = "Bo Example", email = "bo@example.com" }]

[tool.pywf]
dev_python = "3.11.8"
github_account = "octo"
github_token_name = "full_repo_access"
codecov_account = "octo"
codecov_token_name = "dev"
readthedocs_username = "octo"
readthedocs_project_name = "demo_pkg"
readthedocs_token_name = "dev"
doc_host_aws_profile = "docs"
doc_host_s3_bucket = "docs-bucket"
doc_host_s3_prefix = "projects/python"
"#;

type FailPredicate = Box<dyn Fn(&CommandInvocation) -> bool + Send + Sync>;

/// Records invocations instead of spawning them.
#[derive(Default)]
pub(crate) struct RecordingRunner {
    calls: Mutex<Vec<CommandInvocation>>,
    fail: Mutex<Option<FailPredicate>>,
}

impl RecordingRunner {
    pub(crate) fn invocations(&self) -> Vec<CommandInvocation> {
        self.calls.lock().unwrap().clone()
    }

    pub(crate) fn command_lines(&self) -> Vec<String> {
        self.invocations()
            .iter()
            .map(CommandInvocation::command_line)
            .collect()
    }

    pub(crate) fn fail_when(
        &self,
        predicate: impl Fn(&CommandInvocation) -> bool + Send + Sync + 'static,
    ) {
        *self.fail.lock().unwrap() = Some(Box::new(predicate));
    }
}

impl CommandRunner for RecordingRunner {
    fn execute(&self, invocation: &CommandInvocation) -> Result<RunOutput> {
        self.calls.lock().unwrap().push(invocation.clone());
        let failed = self
            .fail
            .lock()
            .unwrap()
            .as_ref()
            .is_some_and(|predicate| predicate(invocation));
        Ok(RunOutput {
            code: i32::from(failed),
            stdout: String::new(),
            stderr: String::new(),
        })
    }
}

pub(crate) fn write_project(root: &Path) {
    fs::create_dir_all(root.join("demo_pkg")).unwrap();
    fs::write(root.join("demo_pkg").join("__init__.py"), "").unwrap();
    fs::write(root.join(PYPROJECT_TOML), PYPROJECT).unwrap();
}

pub(crate) fn fixture_context(quiet: bool) -> (TempDir, ProjectContext, Arc<RecordingRunner>) {
    fixture_context_with(quiet, Config::default())
}

pub(crate) fn fixture_context_with(
    quiet: bool,
    config: Config,
) -> (TempDir, ProjectContext, Arc<RecordingRunner>) {
    let temp = tempfile::tempdir().unwrap();
    let root = temp.path().join("demo_pkg-project");
    write_project(&root);
    let manifest = ProjectManifest::from_pyproject_toml(&root.join(PYPROJECT_TOML)).unwrap();
    let runner = Arc::new(RecordingRunner::default());
    let ctx = ProjectContext::new(manifest, config, runner.clone(), quiet);
    (temp, ctx, runner)
}
