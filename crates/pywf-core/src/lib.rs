#![deny(clippy::all)]
#![allow(
    clippy::missing_errors_doc,
    clippy::missing_panics_doc,
    clippy::must_use_candidate
)]

mod core;

pub use pywf_domain as domain;

pub use crate::core::build::{BuildBackend, BuildManager};
pub use crate::core::config::{Config, EndpointConfig, GlobalOptions, HttpConfig, ToolConfig};
pub use crate::core::context::{ProjectContext, SharedContext};
pub use crate::core::deps::{
    artifact_groups, ArtifactGroup, CacheState, DependencyExporter, DependencyGroup, DepsManager,
    ExportCache, ExportRecord, EXPORT_RECORD_DESCRIPTION,
};
pub use crate::core::docs::{DocHost, DocsManager};
pub use crate::core::error::{PywfError, Result};
pub use crate::core::facade::{PyWf, PyWfOptions};
pub use crate::core::publish::PublishManager;
pub use crate::core::runtime::{
    open_in_browser, CommandInvocation, CommandRunner, RunOutput, RunStatus, SharedRunner,
    SystemRunner, WorkingDirGuard,
};
pub use crate::core::saas::{ReadthedocsProject, SaasManager};
pub use crate::core::secrets::{
    HomeSecretStore, SecretError, SecretKey, SecretStore, Service, StaticSecretStore,
    HOME_SECRET_JSON,
};
pub use crate::core::testing::TestManager;
pub use crate::core::tooling::diagnostics::codes as diag_codes;
pub use crate::core::tooling::outcome::{
    format_status_message, to_json_response, CommandInfo, CommandStatus, ExecutionOutcome,
};
pub use crate::core::tooling::scope::{IndentGuard, OperationScope};
pub use crate::core::venv::VenvManager;
pub use crate::core::version_file::{ensure_version_file, render_version_file};
pub use crate::core::PYWF_VERSION;
