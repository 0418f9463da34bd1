//! pytest runs and coverage reports.

use std::path::Path;

use crate::core::context::SharedContext;
use crate::core::error::{PywfError, Result};
use crate::core::runtime::{open_in_browser, RunStatus};
use crate::core::tooling::scope::OperationScope;

#[derive(Clone)]
pub struct TestManager {
    ctx: SharedContext,
}

impl TestManager {
    pub fn new(ctx: SharedContext) -> Self {
        Self { ctx }
    }

    fn pytest_on(&self, dir: &Path, real_run: bool) -> Result<RunStatus> {
        let pytest = self.ctx.paths.resolve_bin("pytest", None);
        let invocation = self.ctx.command(pytest).arg_path(dir).arg("-s");
        self.ctx.run(&invocation, real_run)
    }

    pub fn run_unit_test(&self, real_run: bool) -> Result<RunStatus> {
        let _scope = OperationScope::enter("Run Unit Test", "🧪");
        self.pytest_on(&self.ctx.paths.dir_tests(), real_run)
    }

    /// Unit tests with line coverage for the package and an HTML report.
    pub fn run_cov_test(&self, real_run: bool) -> Result<RunStatus> {
        let _scope = OperationScope::enter("Run Code Coverage Test", "🧪");
        let paths = &self.ctx.paths;
        let pytest = paths.resolve_bin("pytest", None);
        let invocation = self
            .ctx
            .command(pytest)
            .args(["-s", "--tb=native"])
            .arg(format!("--rootdir={}", paths.root().display()))
            .arg(format!("--cov={}", self.ctx.manifest.package_name))
            .args(["--cov-report", "term-missing", "--cov-report"])
            .arg(format!("html:{}", paths.dir_htmlcov().display()))
            .arg_path(&paths.dir_tests());
        self.ctx.run(&invocation, real_run)
    }

    pub fn run_int_test(&self, real_run: bool) -> Result<RunStatus> {
        let _scope = OperationScope::enter("Run Integration Test", "🧪");
        let dir = self.ctx.paths.dir_tests_int();
        require_dir(&dir, "create a tests_int directory with integration tests")?;
        self.pytest_on(&dir, real_run)
    }

    pub fn run_load_test(&self, real_run: bool) -> Result<RunStatus> {
        let _scope = OperationScope::enter("Run Load Test", "🧪");
        let dir = self.ctx.paths.dir_tests_load();
        require_dir(&dir, "create a tests_load directory with load tests")?;
        self.pytest_on(&dir, real_run)
    }

    /// Opens `htmlcov/index.html` in the browser.
    pub fn view_cov(&self, real_run: bool) -> Result<RunStatus> {
        let _scope = OperationScope::enter("View Code Coverage Test Result", "👀");
        let index = self.ctx.paths.path_htmlcov_index_html();
        if real_run && !index.is_file() {
            return Err(PywfError::MissingInputFile {
                path: index,
                hint: "run `pywf test cov` to generate the coverage report",
            });
        }
        let invocation = open_in_browser(&index, self.ctx.root());
        self.ctx.run(&invocation, real_run)
    }
}

fn require_dir(dir: &Path, hint: &'static str) -> Result<()> {
    if dir.is_dir() {
        Ok(())
    } else {
        Err(PywfError::MissingInputFile {
            path: dir.to_path_buf(),
            hint,
        })
    }
}
