use std::collections::HashMap;
use std::env;
use std::path::PathBuf;
use std::time::Duration;

use serde::{Deserialize, Serialize};

pub const DEFAULT_GITHUB_API: &str = "https://api.github.com";
pub const DEFAULT_CODECOV_API: &str = "https://api.codecov.io/api/v2";
pub const DEFAULT_READTHEDOCS_API: &str = "https://readthedocs.org/api/v3";
const DEFAULT_HTTP_TIMEOUT_SECS: u64 = 60;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GlobalOptions {
    pub quiet: bool,
    pub verbose: u8,
    pub trace: bool,
    pub json: bool,
    pub dry_run: bool,
}

impl GlobalOptions {
    /// Whether operations perform their side effects or only log them.
    #[must_use]
    pub fn real_run(&self) -> bool {
        !self.dry_run
    }
}

#[derive(Debug, Clone)]
pub(crate) struct EnvSnapshot {
    vars: HashMap<String, String>,
}

impl EnvSnapshot {
    pub(crate) fn capture() -> Self {
        Self {
            vars: env::vars().collect(),
        }
    }

    pub(crate) fn flag_is_enabled(&self, key: &str) -> bool {
        self.var(key).is_some_and(|value| {
            matches!(
                value.trim().to_ascii_lowercase().as_str(),
                "1" | "true" | "yes" | "on"
            )
        })
    }

    pub(crate) fn var(&self, key: &str) -> Option<&str> {
        self.vars
            .get(key)
            .map(String::as_str)
            .filter(|value| !value.trim().is_empty())
    }

    #[cfg(test)]
    pub(crate) fn testing(pairs: &[(&str, &str)]) -> Self {
        let vars = pairs
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        Self { vars }
    }
}

#[derive(Debug, Clone)]
pub struct Config {
    pub(crate) tools: ToolConfig,
    pub(crate) endpoints: EndpointConfig,
    pub(crate) http: HttpConfig,
    pub(crate) home_secret: Option<PathBuf>,
}

impl Config {
    /// Builds a configuration snapshot from the current process environment.
    #[must_use]
    pub fn from_env() -> Self {
        Self::from_snapshot(&EnvSnapshot::capture())
    }

    pub(crate) fn from_snapshot(snapshot: &EnvSnapshot) -> Self {
        let endpoint = |key: &str, default: &str| {
            snapshot
                .var(key)
                .unwrap_or(default)
                .trim_end_matches('/')
                .to_string()
        };
        let timeout_secs = snapshot
            .var("PYWF_HTTP_TIMEOUT_SECS")
            .and_then(|raw| raw.trim().parse::<u64>().ok())
            .filter(|value| *value > 0)
            .unwrap_or(DEFAULT_HTTP_TIMEOUT_SECS);
        Self {
            tools: ToolConfig {
                poetry: snapshot.var("PYWF_POETRY").map(PathBuf::from),
            },
            endpoints: EndpointConfig {
                github: endpoint("PYWF_GITHUB_API", DEFAULT_GITHUB_API),
                codecov: endpoint("PYWF_CODECOV_API", DEFAULT_CODECOV_API),
                readthedocs: endpoint("PYWF_READTHEDOCS_API", DEFAULT_READTHEDOCS_API),
            },
            http: HttpConfig {
                timeout: Duration::from_secs(timeout_secs),
                keep_proxies: snapshot.flag_is_enabled("PYWF_KEEP_PROXIES"),
            },
            home_secret: snapshot.var("PYWF_HOME_SECRET").map(PathBuf::from),
        }
    }

    #[must_use]
    pub fn tools(&self) -> &ToolConfig {
        &self.tools
    }

    #[must_use]
    pub fn endpoints(&self) -> &EndpointConfig {
        &self.endpoints
    }

    #[must_use]
    pub fn http(&self) -> &HttpConfig {
        &self.http
    }

    /// Explicit home secret file, when `PYWF_HOME_SECRET` is set.
    #[must_use]
    pub fn home_secret(&self) -> Option<&PathBuf> {
        self.home_secret.as_ref()
    }

    #[must_use]
    pub fn with_endpoints(mut self, endpoints: EndpointConfig) -> Self {
        self.endpoints = endpoints;
        self
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::from_snapshot(&EnvSnapshot {
            vars: HashMap::new(),
        })
    }
}

#[derive(Debug, Clone, Default)]
pub struct ToolConfig {
    /// Overrides `poetry` discovery.
    pub poetry: Option<PathBuf>,
}

/// Base URLs of the hosted services, without trailing slash.
#[derive(Debug, Clone)]
pub struct EndpointConfig {
    pub github: String,
    pub codecov: String,
    pub readthedocs: String,
}

impl EndpointConfig {
    /// Points every service at one base URL.
    #[must_use]
    pub fn all_at(base: &str) -> Self {
        let base = base.trim_end_matches('/');
        Self {
            github: base.to_string(),
            codecov: format!("{base}/api/v2"),
            readthedocs: format!("{base}/api/v3"),
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub struct HttpConfig {
    pub timeout: Duration,
    pub keep_proxies: bool,
}
