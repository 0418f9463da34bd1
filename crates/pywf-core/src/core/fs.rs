use std::fs;
use std::io::ErrorKind;
use std::path::Path;

use crate::core::error::{PywfError, Result};

/// Removes a file; a missing file is not an error. Returns whether a file was removed.
pub(crate) fn remove_file_if_exists(path: &Path) -> Result<bool> {
    match fs::remove_file(path) {
        Ok(()) => Ok(true),
        Err(err) if err.kind() == ErrorKind::NotFound => Ok(false),
        Err(source) => Err(PywfError::io("failed to remove", path, source)),
    }
}

/// Removes a directory tree, clearing read-only bits first; a missing
/// directory is not an error. Returns whether anything was removed.
pub(crate) fn remove_dir_if_exists(path: &Path) -> Result<bool> {
    let meta = match fs::symlink_metadata(path) {
        Ok(meta) => meta,
        Err(err) if err.kind() == ErrorKind::NotFound => return Ok(false),
        Err(source) => return Err(PywfError::io("failed to stat", path, source)),
    };
    if meta.file_type().is_symlink() || !meta.is_dir() {
        fs::remove_file(path).map_err(|source| PywfError::io("failed to remove", path, source))?;
        return Ok(true);
    }
    make_writable_recursive(path);
    fs::remove_dir_all(path).map_err(|source| PywfError::io("failed to remove", path, source))?;
    Ok(true)
}

/// Best-effort recursive permission reset for trees that were made read-only.
fn make_writable_recursive(path: &Path) {
    let Ok(meta) = fs::symlink_metadata(path) else {
        return;
    };
    if meta.file_type().is_symlink() {
        return;
    }
    let mut perms = meta.permissions();
    if perms.readonly() {
        #[allow(clippy::permissions_set_readonly_false)]
        perms.set_readonly(false);
        let _ = fs::set_permissions(path, perms);
    }
    if meta.is_dir() {
        if let Ok(entries) = fs::read_dir(path) {
            for entry in entries.flatten() {
                make_writable_recursive(&entry.path());
            }
        }
    }
}
