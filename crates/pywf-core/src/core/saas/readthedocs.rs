use reqwest::StatusCode;
use serde_json::json;

use super::{ensure_success, http_error, send, SaasManager};
use crate::core::error::Result;
use crate::core::tooling::scope::{self, IndentGuard, OperationScope};

const SERVICE: &str = "readthedocs";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReadthedocsProject {
    Created,
    AlreadyExists,
    /// Dry run: nothing was queried or created.
    Simulated,
}

impl SaasManager {
    /// Creates the readthedocs.org project unless it already exists.
    pub fn setup_readthedocs_project(&self, real_run: bool) -> Result<ReadthedocsProject> {
        let _scope = OperationScope::enter("Setup readthedocs.org Project", "📔");
        let manifest = &self.ctx.manifest;
        let slug = manifest.readthedocs_project_name_slug();
        scope::log("Setting up readthedocs project...");
        {
            let _indent = IndentGuard::new();
            scope::log(format_args!(
                "preview at https://app.readthedocs.org/dashboard/{slug}/edit/"
            ));
        }
        if !real_run {
            return Ok(ReadthedocsProject::Simulated);
        }

        let endpoint = &self.ctx.config.endpoints().readthedocs;
        let token = self.readthedocs_token()?;
        let authorization = format!("Token {token}");

        let url = format!("{endpoint}/projects/{slug}/");
        let response = send(
            SERVICE,
            self.client
                .get(&url)
                .header("accept", "application/json")
                .header("authorization", &authorization),
        )?;
        match response.status() {
            StatusCode::OK => {
                scope::log(format_args!(
                    "Project already exists on readthedocs.org, please view it at: https://app.readthedocs.org/projects/{slug}/"
                ));
                return Ok(ReadthedocsProject::AlreadyExists);
            }
            StatusCode::NOT_FOUND => {
                scope::log("Project does not exist on readthedocs.org, creating it...");
            }
            _ => return Err(http_error(SERVICE, response)),
        }

        let payload = json!({
            "name": manifest.settings.readthedocs_project_name,
            "repository": { "url": manifest.github_repo_url(), "type": "git" },
            "homepage": manifest.readthedocs_doc_site_url(),
            "programming_language": "py",
            "language": "en",
            "privacy_level": "public",
            "external_builds_privacy_level": "public",
            "versioning_scheme": "multiple_versions_with_translations",
            "tags": [],
        });
        let response = send(
            SERVICE,
            self.client
                .post(format!("{endpoint}/projects/"))
                .header("accept", "application/json")
                .header("authorization", &authorization)
                .json(&payload),
        )?;
        ensure_success(SERVICE, response)?;
        Ok(ReadthedocsProject::Created)
    }
}

#[cfg(test)]
mod tests {
    use super::super::test_support::harness;
    use super::*;
    use crate::core::error::PywfError;
    use httptest::{matchers::*, responders::*, Expectation};

    #[test]
    fn existing_project_is_left_alone() {
        let Some(h) = harness() else { return };
        h.server.expect(
            Expectation::matching(all_of![
                request::method_path("GET", "/api/v3/projects/demo-pkg/"),
                request::headers(contains(("authorization", "Token rtd-token"))),
            ])
            .respond_with(status_code(200).body("{}")),
        );
        assert_eq!(
            h.saas.setup_readthedocs_project(true).unwrap(),
            ReadthedocsProject::AlreadyExists
        );
    }

    #[test]
    fn missing_project_is_created() {
        let Some(h) = harness() else { return };
        h.server.expect(
            Expectation::matching(request::method_path("GET", "/api/v3/projects/demo-pkg/"))
                .respond_with(status_code(404)),
        );
        h.server.expect(
            Expectation::matching(all_of![
                request::method_path("POST", "/api/v3/projects/"),
                request::body(json_decoded(eq(serde_json::json!({
                    "name": "demo_pkg",
                    "repository": {
                        "url": h.ctx.manifest.github_repo_url(),
                        "type": "git",
                    },
                    "homepage": "https://demo-pkg.readthedocs.io/",
                    "programming_language": "py",
                    "language": "en",
                    "privacy_level": "public",
                    "external_builds_privacy_level": "public",
                    "versioning_scheme": "multiple_versions_with_translations",
                    "tags": [],
                })))),
            ])
            .respond_with(status_code(201).body("{}")),
        );
        assert_eq!(
            h.saas.setup_readthedocs_project(true).unwrap(),
            ReadthedocsProject::Created
        );
    }

    #[test]
    fn unexpected_status_is_an_http_error() {
        let Some(h) = harness() else { return };
        h.server.expect(
            Expectation::matching(request::method_path("GET", "/api/v3/projects/demo-pkg/"))
                .respond_with(status_code(500).body("boom")),
        );
        let err = h.saas.setup_readthedocs_project(true).unwrap_err();
        match err {
            PywfError::Http { status, body, .. } => {
                assert_eq!(status, 500);
                assert_eq!(body, "boom");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn dry_run_makes_no_requests() {
        let Some(h) = harness() else { return };
        assert_eq!(
            h.saas.setup_readthedocs_project(false).unwrap(),
            ReadthedocsProject::Simulated
        );
        assert!(h.runner.invocations().is_empty());
    }
}
