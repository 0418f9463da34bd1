//! Content hashing used for change detection.

use std::fs;
use std::io;
use std::path::Path;

use sha2::{Digest, Sha256};

/// Lowercase hex SHA-256 of `bytes` (64 characters).
pub fn sha256_hex(bytes: &[u8]) -> String {
    hex::encode(Sha256::digest(bytes))
}

/// Reads `path` and hashes its bytes.
pub fn sha256_file(path: &Path) -> io::Result<String> {
    let bytes = fs::read(path)?;
    Ok(sha256_hex(&bytes))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn digest_is_stable_for_identical_bytes() {
        let first = sha256_hex(b"hello world");
        let second = sha256_hex(b"hello world");
        assert_eq!(first, second);
        assert_eq!(
            first,
            "b94d27b9934d3e08a52e52d7da7dabfac484efe37a5380ee9088f7ace2efcde9"
        );
    }

    #[test]
    fn digest_differs_for_distinct_bytes() {
        assert_ne!(sha256_hex(b"poetry.lock v1"), sha256_hex(b"poetry.lock v2"));
        assert_ne!(sha256_hex(b""), sha256_hex(b"\0"));
    }

    #[test]
    fn digest_is_lowercase_hex() {
        let digest = sha256_hex(b"");
        assert_eq!(digest.len(), 64);
        assert!(digest
            .chars()
            .all(|c| c.is_ascii_digit() || ('a'..='f').contains(&c)));
    }

    #[test]
    fn file_digest_matches_byte_digest() -> io::Result<()> {
        let dir = tempfile::tempdir()?;
        let path = dir.path().join("poetry.lock");
        fs::write(&path, b"[[package]]\nname = \"requests\"\n")?;
        assert_eq!(
            sha256_file(&path)?,
            sha256_hex(b"[[package]]\nname = \"requests\"\n")
        );
        Ok(())
    }
}
