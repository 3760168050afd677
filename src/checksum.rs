//! Content checksums for baseline comparison.
//!
//! SHA-256 here is an equality check over file contents, not a security
//! primitive; the digest only needs to be stable and collision-resistant
//! enough to detect byte-level drift between trees.

use std::collections::BTreeMap;
use std::io;
use std::path::Path;

use sha2::{Digest, Sha256};

/// Computes the SHA-256 hex digest of a byte slice.
pub fn bytes_digest(data: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(data);
    hasher
        .finalize()
        .iter()
        .map(|b| format!("{:02x}", b))
        .collect()
}

/// Computes the SHA-256 hex digest of a file's contents.
pub fn file_digest(path: &Path) -> io::Result<String> {
    let data = std::fs::read(path)?;
    Ok(bytes_digest(&data))
}

/// Computes digests for every file under `root`, keyed by relative path.
///
/// Uses the shared walk rules, so excluded subtrees never contribute entries.
pub fn tree_digests(root: &Path) -> io::Result<BTreeMap<String, String>> {
    let mut digests = BTreeMap::new();
    for relative in crate::walk::list_files(root)? {
        let digest = file_digest(&root.join(&relative))?;
        digests.insert(relative, digest);
    }
    Ok(digests)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn digest_is_content_stable_across_paths() {
        let temp = TempDir::new().unwrap();
        let a = temp.path().join("a.txt");
        let b = temp.path().join("nested").join("b.txt");
        std::fs::create_dir_all(b.parent().unwrap()).unwrap();
        std::fs::write(&a, b"same bytes").unwrap();
        std::fs::write(&b, b"same bytes").unwrap();

        assert_eq!(file_digest(&a).unwrap(), file_digest(&b).unwrap());
    }

    #[test]
    fn digest_changes_with_a_single_byte() {
        let h1 = bytes_digest(b"payload-1");
        let h2 = bytes_digest(b"payload-2");
        assert_ne!(h1, h2);
    }

    #[test]
    fn digest_is_deterministic() {
        assert_eq!(bytes_digest(b"fixed"), bytes_digest(b"fixed"));
    }

    #[test]
    fn tree_digests_keyed_by_relative_path() {
        let temp = TempDir::new().unwrap();
        std::fs::create_dir_all(temp.path().join("app")).unwrap();
        std::fs::write(temp.path().join("package.json"), b"{}").unwrap();
        std::fs::write(temp.path().join("app/page.tsx"), b"export {}").unwrap();

        let digests = tree_digests(temp.path()).unwrap();

        assert_eq!(digests.len(), 2);
        assert!(digests.contains_key("package.json"));
        assert!(digests.contains_key("app/page.tsx"));
    }

    #[test]
    fn tree_digests_skip_excluded_dirs() {
        let temp = TempDir::new().unwrap();
        std::fs::create_dir_all(temp.path().join("node_modules/pkg")).unwrap();
        std::fs::write(temp.path().join("node_modules/pkg/index.js"), b"x").unwrap();
        std::fs::write(temp.path().join("index.ts"), b"y").unwrap();

        let digests = tree_digests(temp.path()).unwrap();
        assert_eq!(digests.len(), 1);
        assert!(digests.contains_key("index.ts"));
    }
}
