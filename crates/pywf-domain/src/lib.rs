#![deny(clippy::all)]
#![allow(
    clippy::missing_errors_doc,
    clippy::missing_panics_doc,
    clippy::must_use_candidate
)]

pub mod hash;
pub mod manifest;
pub mod paths;
pub mod version;

pub use hash::{sha256_file, sha256_hex};
pub use manifest::{
    current_project_root, discover_project_root, set_version_in_pyproject, ManifestError, Person,
    ProjectManifest, WorkflowSettings, MIN_PYTHON_MINOR, PYPROJECT_TOML,
};
pub use paths::{ProjectPaths, POETRY_LOCK, POETRY_LOCK_HASH_JSON};
pub use version::{
    bump, bump_version_str, BumpAxis, BumpFloors, SemanticVersion, VersionError,
};
