//! Provisioning of the hosted services a project relies on: GitHub repo
//! metadata and releases, the codecov.io upload token, and the
//! readthedocs.org project.

mod codecov;
mod github;
mod readthedocs;

use std::sync::Arc;

use reqwest::blocking::{Client, RequestBuilder, Response};

use crate::core::config::HttpConfig;
use crate::core::context::SharedContext;
use crate::core::error::{PywfError, Result};
use crate::core::secrets::{SecretKey, SecretStore, Service};
use crate::core::PYWF_VERSION;

pub use readthedocs::ReadthedocsProject;

pub(crate) fn build_http_client(config: &HttpConfig) -> reqwest::Result<Client> {
    let builder = Client::builder()
        .user_agent(format!("pywf/{PYWF_VERSION}"))
        .timeout(config.timeout);
    let builder = if config.keep_proxies {
        builder
    } else {
        builder.no_proxy()
    };
    builder.build()
}

pub struct SaasManager {
    ctx: SharedContext,
    client: Client,
    secrets: Arc<dyn SecretStore>,
}

impl SaasManager {
    /// Builds the HTTP client; fails with [`PywfError::MissingCapability`]
    /// when no client can be constructed on this machine.
    pub fn new(ctx: SharedContext, secrets: Arc<dyn SecretStore>) -> Result<Self> {
        let client = build_http_client(ctx.config.http())
            .map_err(|err| PywfError::MissingCapability(format!("HTTP client: {err}")))?;
        Ok(Self {
            ctx,
            client,
            secrets,
        })
    }

    fn github_token(&self) -> Result<String> {
        let settings = &self.ctx.manifest.settings;
        self.secret(Service::Github, &settings.github_account, &settings.github_token_name)
    }

    fn codecov_token(&self) -> Result<String> {
        let settings = &self.ctx.manifest.settings;
        self.secret(Service::Codecov, &settings.codecov_account, &settings.codecov_token_name)
    }

    fn readthedocs_token(&self) -> Result<String> {
        let settings = &self.ctx.manifest.settings;
        self.secret(
            Service::Readthedocs,
            &settings.readthedocs_username,
            &settings.readthedocs_token_name,
        )
    }

    fn secret(&self, service: Service, account: &str, purpose: &str) -> Result<String> {
        let key = SecretKey::new(service, account, purpose);
        tracing::debug!(%key, "resolving secret");
        Ok(self.secrets.resolve(&key)?)
    }
}

fn send(service: &'static str, request: RequestBuilder) -> Result<Response> {
    request
        .send()
        .map_err(|source| PywfError::Transport { service, source })
}

/// Passes 2xx responses through; anything else becomes [`PywfError::Http`].
fn ensure_success(service: &'static str, response: Response) -> Result<Response> {
    if response.status().is_success() {
        return Ok(response);
    }
    Err(http_error(service, response))
}

fn http_error(service: &'static str, response: Response) -> PywfError {
    let status = response.status().as_u16();
    let body = response.text().unwrap_or_default();
    PywfError::Http {
        service,
        status,
        body,
    }
}

fn read_json(service: &'static str, response: Response) -> Result<serde_json::Value> {
    response
        .json()
        .map_err(|source| PywfError::Transport { service, source })
}

#[cfg(test)]
mod test_support {
    use std::panic;
    use std::sync::Arc;

    use httptest::Server;

    use crate::core::config::{Config, EndpointConfig};
    use crate::core::secrets::{SecretKey, Service, StaticSecretStore};
    use crate::core::test_support::{fixture_context_with, RecordingRunner};

    use super::SaasManager;

    pub(super) struct Harness {
        pub(super) server: Server,
        pub(super) saas: SaasManager,
        pub(super) runner: Arc<RecordingRunner>,
        pub(super) ctx: Arc<crate::core::context::ProjectContext>,
        _temp: tempfile::TempDir,
    }

    pub(super) fn secrets() -> StaticSecretStore {
        StaticSecretStore::default()
            .with(
                SecretKey::new(Service::Github, "octo", "full_repo_access"),
                "gh-token",
            )
            .with(SecretKey::new(Service::Codecov, "octo", "dev"), "cc-token")
            .with(SecretKey::new(Service::Readthedocs, "octo", "dev"), "rtd-token")
    }

    /// `None` when the mock server cannot bind in this environment.
    pub(super) fn harness() -> Option<Harness> {
        let Ok(server) = panic::catch_unwind(Server::run) else {
            eprintln!("skipping SaaS test (httptest server unavailable)");
            return None;
        };
        let config = Config::default().with_endpoints(EndpointConfig::all_at(&server.url_str("")));
        let (temp, ctx, runner) = fixture_context_with(false, config);
        let ctx = Arc::new(ctx);
        let saas = SaasManager::new(ctx.clone(), Arc::new(secrets())).unwrap();
        Some(Harness {
            server,
            saas,
            runner,
            ctx,
            _temp: temp,
        })
    }
}
