//! `pyproject.toml` metadata consumed by the workflow.

use std::env;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use toml_edit::{DocumentMut, Item, Table, Value as TomlValue};

use crate::version::{SemanticVersion, VersionError};

pub const PYPROJECT_TOML: &str = "pyproject.toml";

/// Oldest `dev_python` minor release (on major 3) the workflow supports.
pub const MIN_PYTHON_MINOR: u64 = 11;

#[derive(Debug, thiserror::Error)]
pub enum ManifestError {
    #[error("failed to read {path}")]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("failed to write {path}")]
    Write {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("{path} is not valid TOML")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml_edit::TomlError,
    },
    #[error("pyproject.toml is missing `{0}`")]
    MissingField(String),
    #[error("{0} does not have a pyproject.toml file, it might not be a valid project root directory")]
    InvalidProjectRoot(PathBuf),
    #[error("{dir} does not have a __init__.py file, the package name {package} might be invalid")]
    InvalidPackage { dir: PathBuf, package: String },
    #[error("dev_python must be Python 3.{MIN_PYTHON_MINOR}+, got {0}")]
    UnsupportedPython(String),
    #[error("tool.pywf.dev_python is invalid")]
    DevPython(#[source] VersionError),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Person {
    pub name: String,
    pub email: String,
}

/// The `[tool.pywf]` settings block.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorkflowSettings {
    pub dev_python: SemanticVersion,
    pub github_account: String,
    pub github_token_name: String,
    pub codecov_account: String,
    pub codecov_token_name: String,
    pub readthedocs_username: String,
    pub readthedocs_project_name: String,
    pub readthedocs_token_name: String,
    pub doc_host_aws_profile: Option<String>,
    pub doc_host_s3_bucket: Option<String>,
    pub doc_host_s3_prefix: Option<String>,
}

#[derive(Debug, Clone)]
pub struct ProjectManifest {
    pub project_root: PathBuf,
    pub package_name: String,
    pub package_version: String,
    pub package_license: String,
    pub package_description: String,
    pub author: Person,
    pub maintainer: Person,
    pub settings: WorkflowSettings,
}

impl ProjectManifest {
    /// Loads and validates the manifest; the project root is the file's
    /// parent, made absolute so relative paths like `./pyproject.toml` still
    /// yield the repo directory name.
    pub fn from_pyproject_toml(path: &Path) -> Result<Self, ManifestError> {
        if !path.is_file() {
            let parent = path
                .parent()
                .map(Path::to_path_buf)
                .unwrap_or_else(|| PathBuf::from("."));
            return Err(ManifestError::InvalidProjectRoot(parent));
        }
        let canonical = fs::canonicalize(path).map_err(|source| ManifestError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let path = canonical.as_path();
        let project_root = path
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_else(|| PathBuf::from("/"));
        let contents = fs::read_to_string(path).map_err(|source| ManifestError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let manifest = Self::from_str_with_root(&contents, path, project_root)?;
        manifest.validate_package_dir()?;
        Ok(manifest)
    }

    fn from_str_with_root(
        contents: &str,
        path: &Path,
        project_root: PathBuf,
    ) -> Result<Self, ManifestError> {
        let doc: DocumentMut = contents.parse().map_err(|source| ManifestError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        let project = table(doc.as_item(), "project", "project")?;
        let pywf = doc
            .get("tool")
            .and_then(|tool| tool.get("pywf"))
            .and_then(Item::as_table)
            .ok_or_else(|| ManifestError::MissingField("tool.pywf".into()))?;

        let dev_python_raw = string_field(pywf, "dev_python", "tool.pywf")?;
        let dev_python =
            SemanticVersion::parse(&dev_python_raw).map_err(ManifestError::DevPython)?;
        if dev_python.major != 3 || dev_python.minor < MIN_PYTHON_MINOR {
            return Err(ManifestError::UnsupportedPython(dev_python_raw));
        }

        let settings = WorkflowSettings {
            dev_python,
            github_account: string_field(pywf, "github_account", "tool.pywf")?,
            github_token_name: string_field(pywf, "github_token_name", "tool.pywf")?,
            codecov_account: string_field(pywf, "codecov_account", "tool.pywf")?,
            codecov_token_name: string_field(pywf, "codecov_token_name", "tool.pywf")?,
            readthedocs_username: string_field(pywf, "readthedocs_username", "tool.pywf")?,
            readthedocs_project_name: string_field(
                pywf,
                "readthedocs_project_name",
                "tool.pywf",
            )?,
            readthedocs_token_name: string_field(pywf, "readthedocs_token_name", "tool.pywf")?,
            doc_host_aws_profile: optional_string(pywf, "doc_host_aws_profile"),
            doc_host_s3_bucket: optional_string(pywf, "doc_host_s3_bucket"),
            doc_host_s3_prefix: optional_string(pywf, "doc_host_s3_prefix")
                .map(|prefix| prefix.trim_matches('/').to_string()),
        };

        Ok(Self {
            project_root,
            package_name: string_field(project, "name", "project")?,
            package_version: string_field(project, "version", "project")?,
            package_license: license_field(project)?,
            package_description: string_field(project, "description", "project")?,
            author: first_person(project, "authors")?,
            maintainer: first_person(project, "maintainers")?,
            settings,
        })
    }

    fn validate_package_dir(&self) -> Result<(), ManifestError> {
        let dir = self.project_root.join(&self.package_name);
        if !dir.join("__init__.py").is_file() {
            return Err(ManifestError::InvalidPackage {
                dir,
                package: self.package_name.clone(),
            });
        }
        Ok(())
    }

    pub fn py_ver_major(&self) -> u64 {
        self.settings.dev_python.major
    }

    pub fn py_ver_minor(&self) -> u64 {
        self.settings.dev_python.minor
    }

    pub fn py_ver_micro(&self) -> u64 {
        self.settings.dev_python.patch
    }

    /// Repository name on the hosting service; the project root's directory name.
    pub fn git_repo_name(&self) -> String {
        self.project_root
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_default()
    }

    pub fn github_repo_fullname(&self) -> String {
        format!("{}/{}", self.settings.github_account, self.git_repo_name())
    }

    pub fn github_repo_url(&self) -> String {
        format!("https://github.com/{}", self.github_repo_fullname())
    }

    pub fn github_actions_secrets_settings_url(&self) -> String {
        format!("{}/settings/secrets/actions", self.github_repo_url())
    }

    pub fn github_versioned_release_url(&self) -> String {
        format!(
            "{}/releases/tag/{}",
            self.github_repo_url(),
            self.package_version
        )
    }

    pub fn readthedocs_project_name_slug(&self) -> String {
        self.settings
            .readthedocs_project_name
            .trim()
            .to_ascii_lowercase()
            .chars()
            .map(|c| if c == '_' || c == ' ' { '-' } else { c })
            .collect()
    }

    pub fn readthedocs_doc_site_url(&self) -> String {
        format!(
            "https://{}.readthedocs.io/",
            self.readthedocs_project_name_slug()
        )
    }
}

fn table<'a>(parent: &'a Item, key: &str, dotted: &str) -> Result<&'a Table, ManifestError> {
    parent
        .get(key)
        .and_then(Item::as_table)
        .ok_or_else(|| ManifestError::MissingField(dotted.to_string()))
}

fn string_field(table: &Table, key: &str, prefix: &str) -> Result<String, ManifestError> {
    table
        .get(key)
        .and_then(Item::as_str)
        .map(ToString::to_string)
        .ok_or_else(|| ManifestError::MissingField(format!("{prefix}.{key}")))
}

fn optional_string(table: &Table, key: &str) -> Option<String> {
    table
        .get(key)
        .and_then(Item::as_str)
        .map(str::trim)
        .filter(|value| !value.is_empty())
        .map(ToString::to_string)
}

fn license_field(project: &Table) -> Result<String, ManifestError> {
    let missing = || ManifestError::MissingField("project.license".into());
    let item = project.get("license").ok_or_else(missing)?;
    if let Some(value) = item.as_str() {
        return Ok(value.to_string());
    }
    if let Some(inline) = item.as_inline_table() {
        if let Some(text) = inline.get("text").and_then(TomlValue::as_str) {
            return Ok(text.to_string());
        }
    }
    if let Some(table) = item.as_table() {
        if let Some(text) = table.get("text").and_then(Item::as_str) {
            return Ok(text.to_string());
        }
    }
    Err(missing())
}

fn first_person(project: &Table, key: &str) -> Result<Person, ManifestError> {
    let missing = |field: &str| ManifestError::MissingField(format!("project.{key}[0].{field}"));
    let item = project
        .get(key)
        .ok_or_else(|| ManifestError::MissingField(format!("project.{key}")))?;
    // `authors = [{ .. }]` and `[[project.authors]]` are both valid TOML spellings.
    let (name, email) = if let Some(array) = item.as_array() {
        let entry = array
            .get(0)
            .and_then(TomlValue::as_inline_table)
            .ok_or_else(|| ManifestError::MissingField(format!("project.{key}")))?;
        (
            entry.get("name").and_then(TomlValue::as_str),
            entry.get("email").and_then(TomlValue::as_str),
        )
    } else if let Some(tables) = item.as_array_of_tables() {
        let entry = tables
            .get(0)
            .ok_or_else(|| ManifestError::MissingField(format!("project.{key}")))?;
        (
            entry.get("name").and_then(Item::as_str),
            entry.get("email").and_then(Item::as_str),
        )
    } else {
        return Err(ManifestError::MissingField(format!("project.{key}")));
    };
    let name = name.ok_or_else(|| missing("name"))?;
    let email = email.ok_or_else(|| missing("email"))?;
    Ok(Person {
        name: name.to_string(),
        email: email.to_string(),
    })
}

/// Walks up from `start` to the first directory whose `pyproject.toml`
/// carries a `[tool.pywf]` table.
pub fn discover_project_root(start: &Path) -> Result<Option<PathBuf>, ManifestError> {
    let mut dir = start.to_path_buf();
    loop {
        let pyproject = dir.join(PYPROJECT_TOML);
        if pyproject.is_file() && pyproject_has_tool_pywf(&pyproject)? {
            return Ok(Some(dir));
        }
        if !dir.pop() {
            break;
        }
    }
    Ok(None)
}

/// Same as [`discover_project_root`] starting from the process working directory.
pub fn current_project_root() -> Result<Option<PathBuf>, ManifestError> {
    let cwd = env::current_dir().map_err(|source| ManifestError::Read {
        path: PathBuf::from("."),
        source,
    })?;
    discover_project_root(&cwd)
}

fn pyproject_has_tool_pywf(path: &Path) -> Result<bool, ManifestError> {
    let contents = fs::read_to_string(path).map_err(|source| ManifestError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    let Ok(doc) = contents.parse::<DocumentMut>() else {
        return Ok(false);
    };
    Ok(doc
        .get("tool")
        .and_then(Item::as_table)
        .and_then(|tool| tool.get("pywf"))
        .is_some())
}

/// Rewrites `[project].version` in place, preserving the rest of the document.
pub fn set_version_in_pyproject(path: &Path, version: &str) -> Result<(), ManifestError> {
    let contents = fs::read_to_string(path).map_err(|source| ManifestError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    let mut doc: DocumentMut = contents.parse().map_err(|source| ManifestError::Parse {
        path: path.to_path_buf(),
        source,
    })?;
    let project = doc
        .get_mut("project")
        .and_then(Item::as_table_mut)
        .ok_or_else(|| ManifestError::MissingField("project".into()))?;
    if project.get("version").is_none() {
        return Err(ManifestError::MissingField("project.version".into()));
    }
    project["version"] = toml_edit::value(version);
    fs::write(path, doc.to_string()).map_err(|source| ManifestError::Write {
        path: path.to_path_buf(),
        source,
    })
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    pub(crate) const SAMPLE_PYPROJECT: &str = r#"[project]
name = "demo_pkg"
version = "0.1.3"
description = "Demo package for workflow tests"
license = "MIT"
authors = [{ name = "Ada Example", email = "ada@example.com" }]
maintainers = [{ name = "Bo Example", email = "bo@example.com" }]

[tool.poetry]
package-mode = true

[tool.pywf]
dev_python = "3.11.8"
github_account = "octo"
github_token_name = "full_repo_access"
codecov_account = "octo"
codecov_token_name = "dev"
readthedocs_username = "octo"
readthedocs_project_name = "Demo_Pkg"
readthedocs_token_name = "dev"
doc_host_aws_profile = "docs"
doc_host_s3_bucket = "docs-bucket"
doc_host_s3_prefix = "/projects/python/"
"#;

    pub(crate) fn write_project(root: &Path, pyproject: &str) {
        fs::create_dir_all(root.join("demo_pkg")).unwrap();
        fs::write(root.join("demo_pkg").join("__init__.py"), "").unwrap();
        fs::write(root.join(PYPROJECT_TOML), pyproject).unwrap();
    }

    #[test]
    fn parses_project_and_settings() {
        let temp = tempfile::tempdir().unwrap();
        let root = temp.path().join("demo_pkg-project");
        write_project(&root, SAMPLE_PYPROJECT);

        let manifest = ProjectManifest::from_pyproject_toml(&root.join(PYPROJECT_TOML)).unwrap();
        assert_eq!(manifest.package_name, "demo_pkg");
        assert_eq!(manifest.package_version, "0.1.3");
        assert_eq!(manifest.package_license, "MIT");
        assert_eq!(manifest.author.email, "ada@example.com");
        assert_eq!(manifest.maintainer.name, "Bo Example");
        assert_eq!(
            (
                manifest.py_ver_major(),
                manifest.py_ver_minor(),
                manifest.py_ver_micro()
            ),
            (3, 11, 8)
        );
        assert_eq!(manifest.git_repo_name(), "demo_pkg-project");
        assert_eq!(manifest.github_repo_fullname(), "octo/demo_pkg-project");
        assert_eq!(
            manifest.github_versioned_release_url(),
            "https://github.com/octo/demo_pkg-project/releases/tag/0.1.3"
        );
        assert_eq!(
            manifest.settings.doc_host_s3_prefix.as_deref(),
            Some("projects/python")
        );
        assert_eq!(manifest.readthedocs_project_name_slug(), "demo-pkg");
        assert_eq!(
            manifest.readthedocs_doc_site_url(),
            "https://demo-pkg.readthedocs.io/"
        );
    }

    #[test]
    fn license_table_text_is_accepted() {
        let temp = tempfile::tempdir().unwrap();
        let pyproject =
            SAMPLE_PYPROJECT.replace("license = \"MIT\"", "license = { text = \"Apache-2.0\" }");
        write_project(temp.path(), &pyproject);
        let manifest =
            ProjectManifest::from_pyproject_toml(&temp.path().join(PYPROJECT_TOML)).unwrap();
        assert_eq!(manifest.package_license, "Apache-2.0");
    }

    #[test]
    fn array_of_tables_people_are_accepted() {
        let temp = tempfile::tempdir().unwrap();
        let pyproject = SAMPLE_PYPROJECT
            .replace(
                "authors = [{ name = \"Ada Example\", email = \"ada@example.com\" }]\n",
                "",
            )
            .replace(
                "[tool.poetry]",
                concat!(
                    "[[project.authors]]\n",
                    "name = \"Ada Example\"\n",
                    "email = \"ada@example.com\"\n\n",
                    "[tool.poetry]",
                ),
            );
        write_project(temp.path(), &pyproject);
        let manifest =
            ProjectManifest::from_pyproject_toml(&temp.path().join(PYPROJECT_TOML)).unwrap();
        assert_eq!(manifest.author.name, "Ada Example");
        assert_eq!(manifest.author.email, "ada@example.com");
        assert_eq!(manifest.maintainer.name, "Bo Example");
    }

    #[test]
    fn array_of_tables_without_email_names_the_field() {
        let temp = tempfile::tempdir().unwrap();
        let pyproject = SAMPLE_PYPROJECT
            .replace(
                "authors = [{ name = \"Ada Example\", email = \"ada@example.com\" }]\n",
                "",
            )
            .replace(
                "[tool.poetry]",
                "[[project.authors]]\nname = \"Ada Example\"\n\n[tool.poetry]",
            );
        write_project(temp.path(), &pyproject);
        let err = ProjectManifest::from_pyproject_toml(&temp.path().join(PYPROJECT_TOML))
            .unwrap_err();
        let ManifestError::MissingField(field) = &err else {
            panic!("unexpected error: {err:?}");
        };
        assert_eq!(field, "project.authors[0].email");
    }

    #[test]
    fn root_is_absolute_for_non_normalized_paths() {
        let temp = tempfile::tempdir().unwrap();
        let root = temp.path().join("demo_pkg-project");
        write_project(&root, SAMPLE_PYPROJECT);
        fs::create_dir_all(root.join("docs")).unwrap();

        let indirect = root.join("docs").join("..").join(PYPROJECT_TOML);
        let manifest = ProjectManifest::from_pyproject_toml(&indirect).unwrap();
        assert!(manifest.project_root.is_absolute());
        assert_eq!(manifest.git_repo_name(), "demo_pkg-project");
        assert_eq!(manifest.github_repo_fullname(), "octo/demo_pkg-project");
    }

    #[test]
    fn missing_package_dir_is_rejected() {
        let temp = tempfile::tempdir().unwrap();
        fs::write(temp.path().join(PYPROJECT_TOML), SAMPLE_PYPROJECT).unwrap();
        let err = ProjectManifest::from_pyproject_toml(&temp.path().join(PYPROJECT_TOML))
            .unwrap_err();
        assert!(matches!(err, ManifestError::InvalidPackage { .. }), "{err:?}");
    }

    #[test]
    fn missing_manifest_is_invalid_root() {
        let temp = tempfile::tempdir().unwrap();
        let err = ProjectManifest::from_pyproject_toml(&temp.path().join(PYPROJECT_TOML))
            .unwrap_err();
        assert!(matches!(err, ManifestError::InvalidProjectRoot(_)), "{err:?}");
    }

    #[test]
    fn old_python_is_rejected() {
        let temp = tempfile::tempdir().unwrap();
        let pyproject = SAMPLE_PYPROJECT.replace("3.11.8", "3.10.4");
        write_project(temp.path(), &pyproject);
        let err = ProjectManifest::from_pyproject_toml(&temp.path().join(PYPROJECT_TOML))
            .unwrap_err();
        assert!(matches!(err, ManifestError::UnsupportedPython(ref v) if v == "3.10.4"));
    }

    #[test]
    fn missing_setting_names_the_key() {
        let temp = tempfile::tempdir().unwrap();
        let pyproject = SAMPLE_PYPROJECT.replace("codecov_token_name = \"dev\"\n", "");
        write_project(temp.path(), &pyproject);
        let err = ProjectManifest::from_pyproject_toml(&temp.path().join(PYPROJECT_TOML))
            .unwrap_err();
        let ManifestError::MissingField(key) = &err else {
            panic!("unexpected error: {err:?}");
        };
        assert_eq!(key, "tool.pywf.codecov_token_name");
    }

    #[test]
    fn discovers_root_from_nested_directory() {
        let temp = tempfile::tempdir().unwrap();
        write_project(temp.path(), SAMPLE_PYPROJECT);
        let nested = temp.path().join("demo_pkg").join("sub");
        fs::create_dir_all(&nested).unwrap();
        let found = discover_project_root(&nested).unwrap();
        assert_eq!(found.as_deref(), Some(temp.path()));
    }

    #[test]
    fn discovery_ignores_foreign_pyprojects() {
        let temp = tempfile::tempdir().unwrap();
        fs::write(
            temp.path().join(PYPROJECT_TOML),
            "[project]\nname = \"other\"\n",
        )
        .unwrap();
        assert_eq!(discover_project_root(temp.path()).unwrap(), None);
    }

    #[test]
    fn set_version_preserves_formatting() {
        let temp = tempfile::tempdir().unwrap();
        write_project(temp.path(), SAMPLE_PYPROJECT);
        let path = temp.path().join(PYPROJECT_TOML);
        set_version_in_pyproject(&path, "0.2.0").unwrap();
        let rewritten = fs::read_to_string(&path).unwrap();
        assert!(rewritten.contains("version = \"0.2.0\""));
        assert!(rewritten.contains("[tool.pywf]\ndev_python = \"3.11.8\""));
        assert_eq!(rewritten.matches("version =").count(), 1);
    }
}
