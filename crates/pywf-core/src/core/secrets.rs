//! Symbolic secret lookup.
//!
//! Secrets live in a JSON "home secret" file shared across projects. A
//! [`SecretKey`] names a value by service, account and purpose; the file path
//! is `providers.<service>.accounts.<account>.users.<account>.secrets.<purpose>.value`.

use std::collections::HashMap;
use std::fmt;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use serde_json::Value;

pub const HOME_SECRET_JSON: &str = "home_secret.json";

#[derive(Debug, thiserror::Error)]
pub enum SecretError {
    #[error("secret `{key}` was not found in {path}")]
    NotFound { key: String, path: PathBuf },
    #[error("failed to read home secret file {path}")]
    Unreadable {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("home secret file {path} is not valid JSON")]
    Malformed {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("unable to locate the home directory for the secret file")]
    NoHomeDir,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Service {
    Github,
    Codecov,
    Readthedocs,
}

impl Service {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Github => "github",
            Self::Codecov => "codecov_io",
            Self::Readthedocs => "readthedocs",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SecretKey {
    pub service: Service,
    pub account: String,
    pub purpose: String,
}

impl SecretKey {
    pub fn new(service: Service, account: impl Into<String>, purpose: impl Into<String>) -> Self {
        Self {
            service,
            account: account.into(),
            purpose: purpose.into(),
        }
    }

    fn segments(&self) -> [&str; 9] {
        [
            "providers",
            self.service.as_str(),
            "accounts",
            &self.account,
            "users",
            &self.account,
            "secrets",
            &self.purpose,
            "value",
        ]
    }
}

impl fmt::Display for SecretKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.segments().join("."))
    }
}

/// Resolves secrets by key.
pub trait SecretStore: Send + Sync {
    /// # Errors
    /// Returns [`SecretError`] when the secret cannot be found or the backing
    /// store cannot be read.
    fn resolve(&self, key: &SecretKey) -> Result<String, SecretError>;
}

/// Reads the home secret JSON file on every lookup.
#[derive(Debug, Clone)]
pub struct HomeSecretStore {
    path: PathBuf,
}

impl HomeSecretStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Uses `explicit` when given, otherwise `~/home_secret.json`.
    pub fn discover(explicit: Option<&Path>) -> Result<Self, SecretError> {
        if let Some(path) = explicit {
            return Ok(Self::new(path));
        }
        let home = dirs_next::home_dir().ok_or(SecretError::NoHomeDir)?;
        Ok(Self::new(home.join(HOME_SECRET_JSON)))
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl SecretStore for HomeSecretStore {
    fn resolve(&self, key: &SecretKey) -> Result<String, SecretError> {
        let raw = fs::read_to_string(&self.path).map_err(|source| SecretError::Unreadable {
            path: self.path.clone(),
            source,
        })?;
        let doc: Value = serde_json::from_str(&raw).map_err(|source| SecretError::Malformed {
            path: self.path.clone(),
            source,
        })?;
        let found = key
            .segments()
            .iter()
            .try_fold(&doc, |node, segment| node.get(*segment))
            .and_then(Value::as_str);
        match found {
            Some(value) => Ok(value.to_string()),
            None => Err(SecretError::NotFound {
                key: key.to_string(),
                path: self.path.clone(),
            }),
        }
    }
}

/// Fixed in-memory secrets, for injecting tokens without a secret file.
#[derive(Debug, Clone, Default)]
pub struct StaticSecretStore {
    values: HashMap<SecretKey, String>,
}

impl StaticSecretStore {
    #[must_use]
    pub fn with(mut self, key: SecretKey, value: impl Into<String>) -> Self {
        self.values.insert(key, value.into());
        self
    }
}

impl SecretStore for StaticSecretStore {
    fn resolve(&self, key: &SecretKey) -> Result<String, SecretError> {
        self.values
            .get(key)
            .cloned()
            .ok_or_else(|| SecretError::NotFound {
                key: key.to_string(),
                path: PathBuf::from("<memory>"),
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn write_secrets(dir: &Path) -> PathBuf {
        let path = dir.join(HOME_SECRET_JSON);
        let doc = json!({
            "providers": {
                "github": {
                    "accounts": {
                        "octo": {
                            "users": {
                                "octo": {
                                    "secrets": {
                                        "full_repo_access": { "value": "ghp_test" }
                                    }
                                }
                            }
                        }
                    }
                }
            }
        });
        fs::write(&path, serde_json::to_string_pretty(&doc).unwrap()).unwrap();
        path
    }

    #[test]
    fn resolves_nested_value() {
        let temp = tempfile::tempdir().unwrap();
        let store = HomeSecretStore::new(write_secrets(temp.path()));
        let key = SecretKey::new(Service::Github, "octo", "full_repo_access");
        assert_eq!(store.resolve(&key).unwrap(), "ghp_test");
    }

    #[test]
    fn missing_key_reports_dotted_path() {
        let temp = tempfile::tempdir().unwrap();
        let store = HomeSecretStore::new(write_secrets(temp.path()));
        let key = SecretKey::new(Service::Codecov, "octo", "dev");
        let err = store.resolve(&key).unwrap_err();
        match err {
            SecretError::NotFound { key, .. } => assert_eq!(
                key,
                "providers.codecov_io.accounts.octo.users.octo.secrets.dev.value"
            ),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn unreadable_and_malformed_files_are_typed() {
        let temp = tempfile::tempdir().unwrap();
        let key = SecretKey::new(Service::Readthedocs, "octo", "dev");

        let missing = HomeSecretStore::new(temp.path().join("nope.json"));
        assert!(matches!(
            missing.resolve(&key),
            Err(SecretError::Unreadable { .. })
        ));

        let broken = temp.path().join("broken.json");
        fs::write(&broken, "{ not json").unwrap();
        assert!(matches!(
            HomeSecretStore::new(broken).resolve(&key),
            Err(SecretError::Malformed { .. })
        ));
    }

    #[test]
    fn discover_prefers_explicit_path() {
        let store = HomeSecretStore::discover(Some(Path::new("/tmp/s.json"))).unwrap();
        assert_eq!(store.path(), Path::new("/tmp/s.json"));
    }

    #[test]
    fn static_store_returns_configured_values() {
        let key = SecretKey::new(Service::Github, "octo", "full_repo_access");
        let store = StaticSecretStore::default().with(key.clone(), "token");
        assert_eq!(store.resolve(&key).unwrap(), "token");
        assert!(store
            .resolve(&SecretKey::new(Service::Github, "octo", "other"))
            .is_err());
    }
}
