//! Directory traversal shared by structure validation and baseline diffing.
//!
//! The walk is iterative (explicit work stack) so pathological tree depth in
//! a generated project cannot overflow the call stack.

use std::io;
use std::path::{Path, PathBuf};

/// Directory names never descended into during a walk.
///
/// These hold install/build output, not generated source, and would make
/// listings enormous and non-reproducible.
pub const EXCLUDED_DIRS: &[&str] = &["node_modules", ".next", ".git"];

/// Lists every file under `root` as a sorted vector of relative paths.
///
/// Paths use `/` separators regardless of platform so they compare directly
/// against manifest entries and baseline listings. The output is sorted, so
/// repeated walks of an unchanged tree are identical.
pub fn list_files(root: &Path) -> io::Result<Vec<String>> {
    let mut files = Vec::new();
    let mut stack: Vec<PathBuf> = vec![root.to_path_buf()];

    while let Some(dir) = stack.pop() {
        for entry in std::fs::read_dir(&dir)? {
            let entry = entry?;
            let path = entry.path();
            let file_type = entry.file_type()?;

            if file_type.is_dir() {
                let name = entry.file_name();
                if EXCLUDED_DIRS.iter().any(|ex| name == std::ffi::OsStr::new(ex)) {
                    continue;
                }
                stack.push(path);
            } else if file_type.is_file() {
                files.push(relative_key(root, &path));
            }
            // Symlinks and other special entries are ignored.
        }
    }

    files.sort();
    Ok(files)
}

/// Normalizes `path` relative to `root` with `/` separators.
fn relative_key(root: &Path, path: &Path) -> String {
    let relative = path.strip_prefix(root).unwrap_or(path);
    relative
        .components()
        .map(|c| c.as_os_str().to_string_lossy())
        .collect::<Vec<_>>()
        .join("/")
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn touch(path: &Path) {
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        std::fs::write(path, b"").unwrap();
    }

    #[test]
    fn list_files_returns_sorted_relative_paths() {
        let temp = TempDir::new().unwrap();
        touch(&temp.path().join("b.txt"));
        touch(&temp.path().join("a/nested.txt"));
        touch(&temp.path().join("a/deep/leaf.txt"));

        let files = list_files(temp.path()).unwrap();

        assert_eq!(files, vec!["a/deep/leaf.txt", "a/nested.txt", "b.txt"]);
    }

    #[test]
    fn list_files_skips_excluded_subtrees() {
        let temp = TempDir::new().unwrap();
        touch(&temp.path().join("src/index.ts"));
        touch(&temp.path().join("node_modules/react/index.js"));
        touch(&temp.path().join(".next/build-manifest.json"));
        touch(&temp.path().join(".git/HEAD"));

        let files = list_files(temp.path()).unwrap();

        assert_eq!(files, vec!["src/index.ts"]);
    }

    #[test]
    fn list_files_is_deterministic() {
        let temp = TempDir::new().unwrap();
        touch(&temp.path().join("x/one.txt"));
        touch(&temp.path().join("y/two.txt"));
        touch(&temp.path().join("three.txt"));

        let first = list_files(temp.path()).unwrap();
        let second = list_files(temp.path()).unwrap();

        assert_eq!(first, second);
    }

    #[test]
    fn list_files_on_empty_dir_is_empty() {
        let temp = TempDir::new().unwrap();
        assert!(list_files(temp.path()).unwrap().is_empty());
    }

    #[test]
    fn list_files_handles_deep_nesting() {
        let temp = TempDir::new().unwrap();
        let mut path = temp.path().to_path_buf();
        for i in 0..200 {
            path = path.join(format!("d{}", i));
        }
        touch(&path.join("leaf.txt"));

        let files = list_files(temp.path()).unwrap();
        assert_eq!(files.len(), 1);
        assert!(files[0].ends_with("/leaf.txt"));
    }
}
