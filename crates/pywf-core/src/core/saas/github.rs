use reqwest::blocking::RequestBuilder;
use reqwest::StatusCode;
use serde_json::json;

use super::{ensure_success, http_error, send, SaasManager};
use crate::core::error::{PywfError, Result};
use crate::core::tooling::scope::{self, IndentGuard, OperationScope};

const SERVICE: &str = "GitHub";
const API_VERSION: &str = "2022-11-28";

impl SaasManager {
    fn github_request(&self, request: RequestBuilder, token: &str) -> RequestBuilder {
        request
            .header("accept", "application/vnd.github+json")
            .header("authorization", format!("Bearer {token}"))
            .header("x-github-api-version", API_VERSION)
    }

    fn github_repo_api(&self) -> String {
        format!(
            "{}/repos/{}",
            self.ctx.config.endpoints().github,
            self.ctx.manifest.github_repo_fullname()
        )
    }

    /// Sets the repository description and points its homepage at the docs
    /// site. Returns whether the edit was performed.
    pub fn edit_github_repo_metadata(&self, real_run: bool) -> Result<bool> {
        let _scope = OperationScope::enter("Edit GitHub Repo metadata", "📦");
        let manifest = &self.ctx.manifest;
        {
            let _indent = IndentGuard::new();
            scope::log(format_args!("preview at {}", manifest.github_repo_url()));
        }
        if !real_run {
            return Ok(false);
        }
        let token = self.github_token()?;
        let payload = json!({
            "description": manifest.package_description,
            "homepage": manifest.readthedocs_doc_site_url(),
        });
        let request = self.github_request(self.client.patch(self.github_repo_api()), &token);
        ensure_success(SERVICE, send(SERVICE, request.json(&payload))?)?;
        Ok(true)
    }

    /// Creates a GitHub release tagged with the current version unless one
    /// exists. Returns whether a release was created.
    pub fn publish_to_github_release(&self, real_run: bool) -> Result<bool> {
        let _scope = OperationScope::enter("Create GitHub Release", "🚀");
        let manifest = &self.ctx.manifest;
        let version = &manifest.package_version;
        {
            let _indent = IndentGuard::new();
            scope::log(format_args!(
                "preview at {}",
                manifest.github_versioned_release_url()
            ));
        }
        if !real_run {
            return Ok(false);
        }
        let token = self.github_token()?;
        let repo_api = self.github_repo_api();

        let lookup = self.github_request(
            self.client.get(format!("{repo_api}/releases/tags/{version}")),
            &token,
        );
        let response = send(SERVICE, lookup)?;
        match response.status() {
            StatusCode::OK => {
                scope::log(format_args!("Release {version} already exists, do nothing."));
                return Ok(false);
            }
            StatusCode::NOT_FOUND => {}
            _ => return Err(http_error(SERVICE, response)),
        }

        let payload = json!({
            "tag_name": version,
            "name": version,
            "body": format!("Release {version}"),
            "draft": false,
            "prerelease": false,
        });
        let create = self.github_request(self.client.post(format!("{repo_api}/releases")), &token);
        ensure_success(SERVICE, send(SERVICE, create.json(&payload))?)?;
        scope::log(format_args!("Release {version} created"));
        Ok(true)
    }

    /// Writes a GitHub Actions secret through the `gh` CLI, passing the
    /// value on stdin so it never reaches the logged command line.
    pub(crate) fn create_actions_secret(
        &self,
        name: &str,
        value: Option<&str>,
        real_run: bool,
    ) -> Result<()> {
        let gh = self.ctx.paths.resolve_bin("gh", None);
        if real_run && which::which(&gh).is_err() {
            return Err(PywfError::MissingCapability(
                "the GitHub CLI `gh` is required to set repository secrets".into(),
            ));
        }
        let mut invocation = self
            .ctx
            .command(gh)
            .args(["secret", "set", name, "--repo"])
            .arg(self.ctx.manifest.github_repo_fullname())
            .suppress_output();
        if let Some(value) = value {
            invocation = invocation.with_stdin(value);
        }
        self.ctx.run(&invocation, real_run)?;
        Ok(())
    }
}
