use super::{ensure_success, read_json, send, SaasManager};
use crate::core::error::{PywfError, Result};
use crate::core::tooling::scope::{self, IndentGuard, OperationScope};

const SERVICE: &str = "codecov.io";
const CODECOV_TOKEN_SECRET: &str = "CODECOV_TOKEN";

impl SaasManager {
    fn codecov_get(&self, url: &str, token: &str) -> Result<serde_json::Value> {
        let response = send(
            SERVICE,
            self.client
                .get(url)
                .header("accept", "application/json")
                .header("authorization", format!("Bearer {token}")),
        )?;
        read_json(SERVICE, ensure_success(SERVICE, response)?)
    }

    /// Fetches the repository upload token. `None` on a dry run.
    pub fn get_codecov_io_upload_token(&self, real_run: bool) -> Result<Option<String>> {
        let manifest = &self.ctx.manifest;
        let account = &manifest.settings.github_account;
        let repo = manifest.git_repo_name();
        scope::log("Getting codecov.io upload token...");
        {
            let _indent = IndentGuard::new();
            scope::log(format_args!(
                "preview at https://app.codecov.io/gh/{account}/{repo}/settings"
            ));
        }
        if !real_run {
            return Ok(None);
        }

        let token = self.codecov_token()?;
        let endpoint = &self.ctx.config.endpoints().codecov;
        let repo_url = format!("{endpoint}/github/{account}/repos/{repo}/");
        let details = self.codecov_get(&repo_url, &token)?;
        if details.get("private").and_then(serde_json::Value::as_bool) == Some(true) {
            return Err(PywfError::PrivateRepository(manifest.github_repo_fullname()));
        }

        let config = self.codecov_get(&format!("{repo_url}config/"), &token)?;
        let upload_token = config
            .get("upload_token")
            .and_then(serde_json::Value::as_str)
            .ok_or_else(|| PywfError::Http {
                service: SERVICE,
                status: 200,
                body: "response has no `upload_token`".into(),
            })?;
        Ok(Some(upload_token.to_string()))
    }

    /// Stores the codecov.io upload token as the `CODECOV_TOKEN` Actions
    /// secret. Returns whether the secret was written.
    pub fn setup_codecov_io_upload_token_on_github(&self, real_run: bool) -> Result<bool> {
        let _scope = OperationScope::enter("Setup codecov.io Upload Token on GitHub", "🧪");
        let upload_token = self.get_codecov_io_upload_token(real_run)?;
        scope::log("Setting up codecov.io upload token on GitHub...");
        {
            let _indent = IndentGuard::new();
            scope::log(format_args!(
                "preview at {}",
                self.ctx.manifest.github_actions_secrets_settings_url()
            ));
        }
        self.create_actions_secret(CODECOV_TOKEN_SECRET, upload_token.as_deref(), real_run)?;
        Ok(real_run)
    }
}

#[cfg(test)]
mod tests {
    use super::super::test_support::harness;
    use super::*;
    use httptest::{matchers::*, responders::*, Expectation};
    use serde_json::json;

    const REPO_PATH: &str = "/api/v2/github/octo/repos/demo_pkg-project/";

    #[test]
    fn fetches_upload_token_for_public_repo() {
        let Some(h) = harness() else { return };
        h.server.expect(
            Expectation::matching(all_of![
                request::method_path("GET", REPO_PATH),
                request::headers(contains(("authorization", "Bearer cc-token"))),
            ])
            .respond_with(json_encoded(json!({ "private": false }))),
        );
        h.server.expect(
            Expectation::matching(request::method_path(
                "GET",
                "/api/v2/github/octo/repos/demo_pkg-project/config/",
            ))
            .respond_with(json_encoded(json!({ "upload_token": "upload-123" }))),
        );
        assert_eq!(
            h.saas.get_codecov_io_upload_token(true).unwrap().as_deref(),
            Some("upload-123")
        );
    }

    #[test]
    fn private_repository_is_rejected() {
        let Some(h) = harness() else { return };
        h.server.expect(
            Expectation::matching(request::method_path("GET", REPO_PATH))
                .respond_with(json_encoded(json!({ "private": true }))),
        );
        assert!(matches!(
            h.saas.get_codecov_io_upload_token(true),
            Err(PywfError::PrivateRepository(_))
        ));
    }

    #[test]
    fn dry_run_returns_no_token_and_skips_secret() {
        let Some(h) = harness() else { return };
        assert_eq!(h.saas.get_codecov_io_upload_token(false).unwrap(), None);
        assert!(!h.saas.setup_codecov_io_upload_token_on_github(false).unwrap());
        let lines = h.runner.command_lines();
        assert!(lines.is_empty(), "{lines:?}");
    }

    #[cfg(unix)]
    #[test]
    fn token_is_piped_to_gh_secret_set() {
        use std::os::unix::fs::PermissionsExt;

        let Some(h) = harness() else { return };
        let gh = h.ctx.paths.venv_bin("gh");
        std::fs::create_dir_all(gh.parent().unwrap()).unwrap();
        std::fs::write(&gh, "#!/bin/sh\n").unwrap();
        std::fs::set_permissions(&gh, std::fs::Permissions::from_mode(0o755)).unwrap();

        h.server.expect(
            Expectation::matching(request::method_path("GET", REPO_PATH))
                .respond_with(json_encoded(json!({ "private": false }))),
        );
        h.server.expect(
            Expectation::matching(request::method_path(
                "GET",
                "/api/v2/github/octo/repos/demo_pkg-project/config/",
            ))
            .respond_with(json_encoded(json!({ "upload_token": "upload-123" }))),
        );
        assert!(h.saas.setup_codecov_io_upload_token_on_github(true).unwrap());

        let calls = h.runner.invocations();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].executable, gh);
        assert_eq!(
            calls[0].arguments,
            ["secret", "set", "CODECOV_TOKEN", "--repo", "octo/demo_pkg-project"]
        );
        assert_eq!(calls[0].stdin.as_deref(), Some("upload-123"));
        assert!(!calls[0].command_line().contains("upload-123"));
    }
}
