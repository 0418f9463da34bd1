//! Well-known locations inside a project checkout.

use std::path::{Path, PathBuf};

use crate::manifest::PYPROJECT_TOML;

pub const POETRY_LOCK: &str = "poetry.lock";
pub const POETRY_LOCK_HASH_JSON: &str = "poetry-lock-hash.json";

#[cfg(windows)]
const VENV_BIN: &str = "Scripts";
#[cfg(not(windows))]
const VENV_BIN: &str = "bin";

#[cfg(windows)]
const EXE_SUFFIX: &str = ".exe";
#[cfg(not(windows))]
const EXE_SUFFIX: &str = "";

#[derive(Debug, Clone)]
pub struct ProjectPaths {
    root: PathBuf,
    package_name: String,
}

impl ProjectPaths {
    pub fn new(root: impl Into<PathBuf>, package_name: impl Into<String>) -> Self {
        Self {
            root: root.into(),
            package_name: package_name.into(),
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn dir_venv(&self) -> PathBuf {
        self.root.join(".venv")
    }

    pub fn dir_venv_bin(&self) -> PathBuf {
        self.dir_venv().join(VENV_BIN)
    }

    /// Path of a console script inside the project virtualenv.
    pub fn venv_bin(&self, name: &str) -> PathBuf {
        self.dir_venv_bin().join(format!("{name}{EXE_SUFFIX}"))
    }

    pub fn path_venv_bin_python(&self) -> PathBuf {
        self.venv_bin("python")
    }

    pub fn path_venv_bin_pip(&self) -> PathBuf {
        self.venv_bin("pip")
    }

    pub fn path_venv_bin_pytest(&self) -> PathBuf {
        self.venv_bin("pytest")
    }

    pub fn path_venv_bin_sphinx_build(&self) -> PathBuf {
        self.venv_bin("sphinx-build")
    }

    pub fn path_venv_bin_jupyter(&self) -> PathBuf {
        self.venv_bin("jupyter")
    }

    pub fn dir_python_lib(&self) -> PathBuf {
        self.root.join(&self.package_name)
    }

    pub fn path_version_py(&self) -> PathBuf {
        self.dir_python_lib().join("_version.py")
    }

    pub fn dir_tests(&self) -> PathBuf {
        self.root.join("tests")
    }

    pub fn dir_tests_int(&self) -> PathBuf {
        self.root.join("tests_int")
    }

    pub fn dir_tests_load(&self) -> PathBuf {
        self.root.join("tests_load")
    }

    pub fn dir_htmlcov(&self) -> PathBuf {
        self.root.join("htmlcov")
    }

    pub fn path_htmlcov_index_html(&self) -> PathBuf {
        self.dir_htmlcov().join("index.html")
    }

    pub fn dir_sphinx_doc(&self) -> PathBuf {
        self.root.join("docs")
    }

    pub fn dir_sphinx_doc_source(&self) -> PathBuf {
        self.dir_sphinx_doc().join("source")
    }

    pub fn path_sphinx_doc_source_conf_py(&self) -> PathBuf {
        self.dir_sphinx_doc_source().join("conf.py")
    }

    /// Generated API reference pages, rebuilt on every doc build.
    pub fn dir_sphinx_doc_source_python_lib(&self) -> PathBuf {
        self.dir_sphinx_doc_source().join(&self.package_name)
    }

    pub fn dir_sphinx_doc_build(&self) -> PathBuf {
        self.dir_sphinx_doc().join("build")
    }

    pub fn dir_sphinx_doc_build_html(&self) -> PathBuf {
        self.dir_sphinx_doc_build().join("html")
    }

    pub fn path_sphinx_doc_build_index_html(&self) -> PathBuf {
        self.dir_sphinx_doc_build_html().join("index.html")
    }

    pub fn path_requirements(&self) -> PathBuf {
        self.root.join("requirements.txt")
    }

    pub fn path_requirements_dev(&self) -> PathBuf {
        self.root.join("requirements-dev.txt")
    }

    pub fn path_requirements_test(&self) -> PathBuf {
        self.root.join("requirements-test.txt")
    }

    pub fn path_requirements_doc(&self) -> PathBuf {
        self.root.join("requirements-doc.txt")
    }

    pub fn path_requirements_automation(&self) -> PathBuf {
        self.root.join("requirements-automation.txt")
    }

    pub fn path_poetry_lock(&self) -> PathBuf {
        self.root.join(POETRY_LOCK)
    }

    pub fn path_poetry_lock_hash_json(&self) -> PathBuf {
        self.root.join(POETRY_LOCK_HASH_JSON)
    }

    pub fn path_pyproject_toml(&self) -> PathBuf {
        self.root.join(PYPROJECT_TOML)
    }

    pub fn dir_build(&self) -> PathBuf {
        self.root.join("build")
    }

    pub fn dir_dist(&self) -> PathBuf {
        self.root.join("dist")
    }

    /// Locates a command line tool.
    ///
    /// Order: explicit override, the project virtualenv, `PATH`, and finally the
    /// bare name so previews still render on machines without the tool.
    pub fn resolve_bin(&self, name: &str, explicit: Option<&Path>) -> PathBuf {
        if let Some(path) = explicit {
            return path.to_path_buf();
        }
        let in_venv = self.venv_bin(name);
        if in_venv.is_file() {
            return in_venv;
        }
        which::which(name).unwrap_or_else(|_| PathBuf::from(name))
    }
}
