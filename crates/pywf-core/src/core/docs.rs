//! Sphinx documentation build, notebook conversion and S3 hosting.

use std::path::PathBuf;

use walkdir::WalkDir;

use crate::core::context::SharedContext;
use crate::core::error::{PywfError, Result};
use crate::core::fs::remove_dir_if_exists;
use crate::core::runtime::{open_in_browser, RunStatus};
use crate::core::tooling::scope::{self, OperationScope};
use pywf_domain::ManifestError;

const CHECKPOINTS_DIR: &str = ".ipynb_checkpoints";

/// Where versioned docs are uploaded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DocHost {
    pub aws_profile: String,
    pub s3_bucket: String,
    pub s3_prefix: String,
}

impl DocHost {
    /// `s3://<bucket>/<prefix>/<package>/<tag>/`, skipping an empty prefix.
    #[must_use]
    pub fn s3_uri(&self, package: &str, tag: &str) -> String {
        if self.s3_prefix.is_empty() {
            format!("s3://{}/{package}/{tag}/", self.s3_bucket)
        } else {
            format!("s3://{}/{}/{package}/{tag}/", self.s3_bucket, self.s3_prefix)
        }
    }
}

#[derive(Clone)]
pub struct DocsManager {
    ctx: SharedContext,
}

impl DocsManager {
    pub fn new(ctx: SharedContext) -> Self {
        Self { ctx }
    }

    /// Rebuilds the HTML docs from scratch.
    pub fn build_doc(&self, real_run: bool) -> Result<RunStatus> {
        let _scope = OperationScope::enter("Build Documentation Site Locally", "📔");
        let paths = &self.ctx.paths;
        if real_run {
            remove_dir_if_exists(&paths.dir_sphinx_doc_build())?;
            remove_dir_if_exists(&paths.dir_sphinx_doc_source_python_lib())?;
        }
        let sphinx_build = paths.resolve_bin("sphinx-build", None);
        let invocation = self
            .ctx
            .command(sphinx_build)
            .args(["-M", "html"])
            .arg_path(&paths.dir_sphinx_doc_source())
            .arg_path(&paths.dir_sphinx_doc_build());
        self.ctx.run(&invocation, real_run)
    }

    pub fn view_doc(&self, real_run: bool) -> Result<RunStatus> {
        let _scope = OperationScope::enter("View Documentation Site Locally", "📔");
        let index = self.ctx.paths.path_sphinx_doc_build_index_html();
        if real_run && !index.is_file() {
            return Err(PywfError::MissingInputFile {
                path: index,
                hint: "run `pywf docs build` first",
            });
        }
        let invocation = open_in_browser(&index, self.ctx.root());
        self.ctx.run(&invocation, real_run)
    }

    /// Every notebook under `docs/source`, excluding checkpoint copies, sorted.
    #[must_use]
    pub fn notebooks(&self) -> Vec<PathBuf> {
        let mut found: Vec<PathBuf> = WalkDir::new(self.ctx.paths.dir_sphinx_doc_source())
            .into_iter()
            .filter_entry(|entry| entry.file_name() != CHECKPOINTS_DIR)
            .filter_map(std::result::Result::ok)
            .filter(|entry| entry.file_type().is_file())
            .map(walkdir::DirEntry::into_path)
            .filter(|path| path.extension().is_some_and(|ext| ext == "ipynb"))
            .collect();
        found.sort();
        found
    }

    /// Converts each notebook to `index.md` next to it. Returns how many
    /// notebooks were (or would be) converted.
    pub fn notebook_to_markdown(&self, real_run: bool) -> Result<usize> {
        let _scope = OperationScope::enter("Convert Jupyter Notebook to Markdown", "📔");
        let jupyter = self.ctx.paths.resolve_bin("jupyter", None);
        let notebooks = self.notebooks();
        for notebook in &notebooks {
            let invocation = self
                .ctx
                .command(&jupyter)
                .args(["nbconvert", "--to", "markdown"])
                .arg_path(notebook)
                .args(["--output", "index"]);
            self.ctx.run(&invocation, real_run)?;
        }
        scope::log(format_args!("converted {} notebook(s)", notebooks.len()));
        Ok(notebooks.len())
    }

    fn doc_host(&self) -> Result<DocHost> {
        let settings = &self.ctx.manifest.settings;
        let missing =
            |key: &str| PywfError::from(ManifestError::MissingField(format!("tool.pywf.{key}")));
        Ok(DocHost {
            aws_profile: settings
                .doc_host_aws_profile
                .clone()
                .ok_or_else(|| missing("doc_host_aws_profile"))?,
            s3_bucket: settings
                .doc_host_s3_bucket
                .clone()
                .ok_or_else(|| missing("doc_host_s3_bucket"))?,
            s3_prefix: settings.doc_host_s3_prefix.clone().unwrap_or_default(),
        })
    }

    fn deploy(&self, tag: &str, real_run: bool) -> Result<RunStatus> {
        let host = self.doc_host()?;
        let uri = host.s3_uri(&self.ctx.manifest.package_name, tag);
        let aws = self.ctx.paths.resolve_bin("aws", None);
        let invocation = self
            .ctx
            .command(aws)
            .args(["s3", "sync"])
            .arg_path(&self.ctx.paths.dir_sphinx_doc_build_html())
            .arg(uri)
            .args(["--profile", host.aws_profile.as_str()]);
        self.ctx.run(&invocation, real_run)
    }

    /// Uploads the built HTML under the current package version.
    pub fn deploy_versioned_doc(&self, real_run: bool) -> Result<RunStatus> {
        let _scope =
            OperationScope::enter("Deploy Documentation Site To S3 as Versioned Doc", "🚀");
        let version = self.ctx.manifest.package_version.clone();
        self.deploy(&version, real_run)
    }

    pub fn deploy_latest_doc(&self, real_run: bool) -> Result<RunStatus> {
        let _scope = OperationScope::enter("Deploy Documentation Site To S3 as Latest Doc", "🚀");
        self.deploy("latest", real_run)
    }
}
