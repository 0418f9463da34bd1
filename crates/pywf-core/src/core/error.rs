use std::io;
use std::path::PathBuf;

use pywf_domain::{ManifestError, VersionError};

use crate::core::secrets::SecretError;
use crate::core::tooling::diagnostics::codes;

pub type Result<T, E = PywfError> = std::result::Result<T, E>;

/// Errors surfaced by workflow operations.
#[derive(Debug, thiserror::Error)]
pub enum PywfError {
    #[error("required input file is missing: {path}")]
    MissingInputFile { path: PathBuf, hint: &'static str },
    #[error("command failed with exit code {code}: {command_line}")]
    CommandFailed { code: i32, command_line: String },
    #[error("failed to start `{command_line}`")]
    SpawnFailed {
        command_line: String,
        #[source]
        source: io::Error,
    },
    #[error(transparent)]
    Manifest(#[from] ManifestError),
    #[error(transparent)]
    Version(#[from] VersionError),
    #[error(transparent)]
    Secret(#[from] SecretError),
    #[error("missing capability: {0}")]
    MissingCapability(String),
    #[error("{service} API returned HTTP {status}: {body}")]
    Http {
        service: &'static str,
        status: u16,
        body: String,
    },
    #[error("{service} request failed")]
    Transport {
        service: &'static str,
        #[source]
        source: reqwest::Error,
    },
    #[error("you cannot use codecov.io for private repositories ({0})")]
    PrivateRepository(String),
    #[error("{action} {path}")]
    Io {
        action: &'static str,
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

impl PywfError {
    pub(crate) fn io(action: &'static str, path: impl Into<PathBuf>, source: io::Error) -> Self {
        Self::Io {
            action,
            path: path.into(),
            source,
        }
    }

    #[must_use]
    pub fn code(&self) -> &'static str {
        match self {
            Self::MissingInputFile { .. } => codes::MISSING_INPUT,
            Self::CommandFailed { .. } | Self::SpawnFailed { .. } => codes::COMMAND_FAILED,
            Self::Manifest(_) => codes::MANIFEST,
            Self::Version(_) => codes::VERSION,
            Self::Secret(_) => codes::SECRET,
            Self::MissingCapability(_) => codes::CAPABILITY,
            Self::Http { .. } | Self::Transport { .. } | Self::PrivateRepository(_) => {
                codes::REMOTE
            }
            Self::Io { .. } => codes::IO,
        }
    }

    /// Errors the developer can fix by changing input or environment, as
    /// opposed to tool or service failures.
    #[must_use]
    pub fn is_user_error(&self) -> bool {
        matches!(
            self,
            Self::MissingInputFile { .. }
                | Self::Manifest(_)
                | Self::Version(_)
                | Self::Secret(_)
                | Self::MissingCapability(_)
                | Self::PrivateRepository(_)
        )
    }

    #[must_use]
    pub fn hint(&self) -> Option<String> {
        match self {
            Self::MissingInputFile { hint, .. } => Some((*hint).to_string()),
            Self::CommandFailed { command_line, .. } => {
                Some(format!("re-run `{command_line}` to reproduce"))
            }
            Self::Secret(_) => Some(
                "add the token to your home secret file or point PYWF_HOME_SECRET at it".into(),
            ),
            Self::MissingCapability(_) => {
                Some("install the missing tool and make sure it is on PATH".into())
            }
            _ => None,
        }
    }
}
