//! `<package>/_version.py`, regenerated from `pyproject.toml` metadata.

use std::fs;
use std::path::Path;

use pywf_domain::ProjectManifest;

use crate::core::error::{PywfError, Result};
use crate::core::tooling::scope;

fn py_str(value: &str) -> String {
    let escaped = value
        .replace('\\', "\\\\")
        .replace('"', "\\\"")
        .replace('\n', "\\n");
    format!("\"{escaped}\"")
}

#[must_use]
pub fn render_version_file(manifest: &ProjectManifest) -> String {
    let mut out = String::from("# -*- coding: utf-8 -*-\n\n");
    out.push_str("# Generated from pyproject.toml by pywf; edits are overwritten.\n\n");
    let fields = [
        ("__version__", manifest.package_version.as_str()),
        ("__short_description__", manifest.package_description.as_str()),
        ("__license__", manifest.package_license.as_str()),
        ("__author__", manifest.author.name.as_str()),
        ("__author_email__", manifest.author.email.as_str()),
        ("__maintainer__", manifest.maintainer.name.as_str()),
        ("__maintainer_email__", manifest.maintainer.email.as_str()),
    ];
    for (name, value) in fields {
        out.push_str(&format!("{name} = {}\n", py_str(value)));
    }
    out.push_str("\nif __name__ == \"__main__\":  # pragma: no cover\n    print(__version__)\n");
    out
}

/// Writes the version module when its content differs. Returns whether the
/// file was (or on a dry run, would be) written.
pub fn ensure_version_file(
    manifest: &ProjectManifest,
    path: &Path,
    real_run: bool,
) -> Result<bool> {
    let contents = render_version_file(manifest);
    if fs::read_to_string(path).is_ok_and(|existing| existing == contents) {
        return Ok(false);
    }
    if !real_run {
        scope::log(format_args!("would update {}", path.display()));
        return Ok(true);
    }
    fs::write(path, contents).map_err(|source| PywfError::io("failed to write", path, source))?;
    tracing::debug!(path = %path.display(), "updated version file");
    Ok(true)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::test_support::fixture_context;

    #[test]
    fn renders_metadata_and_skips_unchanged() {
        let (_temp, ctx, _runner) = fixture_context(false);
        let path = ctx.paths.path_version_py();

        assert!(ensure_version_file(&ctx.manifest, &path, true).unwrap());
        let body = fs::read_to_string(&path).unwrap();
        assert!(body.contains("__version__ = \"0.1.3\""));
        assert!(body.contains("__license__ = \"MIT\""));
        assert!(body.contains("__maintainer_email__ = \"bo@example.com\""));

        assert!(!ensure_version_file(&ctx.manifest, &path, true).unwrap());
    }

    #[test]
    fn dry_run_reports_pending_write_without_touching_disk() {
        let (_temp, ctx, _runner) = fixture_context(false);
        let path = ctx.paths.path_version_py();
        let _ = fs::remove_file(&path);

        assert!(ensure_version_file(&ctx.manifest, &path, false).unwrap());
        assert!(!path.exists());

        fs::write(&path, "__version__ = \"0.0.1\"\n").unwrap();
        assert!(ensure_version_file(&ctx.manifest, &path, false).unwrap());
        assert_eq!(fs::read_to_string(&path).unwrap(), "__version__ = \"0.0.1\"\n");
    }

    #[test]
    fn escapes_quotes() {
        let (_temp, ctx, _runner) = fixture_context(false);
        let mut manifest = ctx.manifest.clone();
        manifest.package_description = "say \"hi\"".into();
        let body = render_version_file(&manifest);
        assert!(body.contains(r#"__short_description__ = "say \"hi\"""#));
    }
}
