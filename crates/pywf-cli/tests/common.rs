#![allow(dead_code)]

use std::{fs, path::PathBuf};

use assert_cmd::assert::Assert;
use serde_json::Value;
use tempfile::TempDir;
use toml_edit::DocumentMut;

pub const PYPROJECT: &str = r#"[project]
name = "demo_pkg"
version = "0.1.3"
description = "Demo package for workflow tests"
license = { text = "MIT" }
authors = [{ name = "Ada Example", email = "ada@example.com" }]
maintainers = [{ name = "Bo Example", email = "bo@example.com" }]

[tool.pywf]
dev_python = "3.11.8"
github_account = "octo"
github_token_name = "full_repo_access"
codecov_account = "octo"
codecov_token_name = "dev"
readthedocs_username = "octo"
readthedocs_project_name = "demo_pkg"
readthedocs_token_name = "dev"
"#;

/// Lays out a minimal project: manifest, package dir, and optionally a lock.
pub fn prepare_project(prefix: &str, with_lock: bool) -> (TempDir, PathBuf) {
    let temp = tempfile::Builder::new()
        .prefix(prefix)
        .tempdir()
        .expect("tempdir");
    let root = temp.path().join("demo_pkg-project");
    fs::create_dir_all(root.join("demo_pkg")).expect("package dir");
    fs::write(root.join("pyproject.toml"), PYPROJECT).expect("write pyproject");
    fs::write(root.join("demo_pkg").join("__init__.py"), "").expect("write __init__");
    if with_lock {
        fs::write(root.join("poetry.lock"), "# lock\n[[package]]\nname = \"attrs\"\n")
            .expect("write lock");
    }
    (temp, root)
}

pub fn parse_json(assert: &Assert) -> Value {
    serde_json::from_slice(&assert.get_output().stdout).expect("valid json")
}

pub fn project_version(root: &std::path::Path) -> String {
    let contents = fs::read_to_string(root.join("pyproject.toml")).expect("read pyproject");
    let doc: DocumentMut = contents.parse().expect("valid pyproject");
    doc["project"]["version"]
        .as_str()
        .expect("version string")
        .to_string()
}
