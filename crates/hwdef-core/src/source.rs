//! File access used by the parser
//!
//! The parser only needs to read files, check they exist, canonicalize paths
//! for cache keys and list board folders. [`LocalTree`] does this against the
//! filesystem; [`MemoryTree`] holds files already fetched by some other means.

use std::collections::BTreeMap;
use std::io;
use std::path::{Component, Path, PathBuf};

pub trait SourceTree: Send + Sync {
    /// Read the raw bytes of a file
    fn read(&self, path: &Path) -> io::Result<Vec<u8>>;

    /// Whether a regular file exists at `path`
    fn is_file(&self, path: &Path) -> bool;

    /// Absolute, normalized form of `path`; falls back to the lexical form
    fn canonicalize(&self, path: &Path) -> PathBuf;

    /// Immediate sub-directories of `dir`
    fn list_dirs(&self, dir: &Path) -> io::Result<Vec<PathBuf>>;

    /// Read a file as text, replacing invalid UTF-8
    fn read_text(&self, path: &Path) -> io::Result<String> {
        let bytes = self.read(path)?;
        Ok(String::from_utf8_lossy(&bytes).into_owned())
    }
}

/// The local filesystem
#[derive(Debug, Clone, Copy, Default)]
pub struct LocalTree;

impl SourceTree for LocalTree {
    fn read(&self, path: &Path) -> io::Result<Vec<u8>> {
        std::fs::read(path)
    }

    fn is_file(&self, path: &Path) -> bool {
        path.is_file()
    }

    fn canonicalize(&self, path: &Path) -> PathBuf {
        std::fs::canonicalize(path).unwrap_or_else(|_| normalize(path))
    }

    fn list_dirs(&self, dir: &Path) -> io::Result<Vec<PathBuf>> {
        let mut dirs = Vec::new();
        for entry in std::fs::read_dir(dir)? {
            let entry = entry?;
            if entry.file_type()?.is_dir() {
                dirs.push(entry.path());
            }
        }
        Ok(dirs)
    }
}

/// In-memory file tree keyed by normalized path
#[derive(Debug, Clone, Default)]
pub struct MemoryTree {
    files: BTreeMap<PathBuf, Vec<u8>>,
}

impl MemoryTree {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add or replace a file
    pub fn insert(&mut self, path: impl AsRef<Path>, content: impl Into<Vec<u8>>) {
        self.files.insert(normalize(path.as_ref()), content.into());
    }

    /// Builder-style [`MemoryTree::insert`]
    pub fn with_file(mut self, path: impl AsRef<Path>, content: impl Into<Vec<u8>>) -> Self {
        self.insert(path, content);
        self
    }

    pub fn remove(&mut self, path: impl AsRef<Path>) {
        self.files.remove(&normalize(path.as_ref()));
    }
}

impl SourceTree for MemoryTree {
    fn read(&self, path: &Path) -> io::Result<Vec<u8>> {
        self.files
            .get(&normalize(path))
            .cloned()
            .ok_or_else(|| io::Error::new(io::ErrorKind::NotFound, path.display().to_string()))
    }

    fn is_file(&self, path: &Path) -> bool {
        self.files.contains_key(&normalize(path))
    }

    fn canonicalize(&self, path: &Path) -> PathBuf {
        normalize(path)
    }

    fn list_dirs(&self, dir: &Path) -> io::Result<Vec<PathBuf>> {
        let dir = normalize(dir);
        let mut dirs: Vec<PathBuf> = self
            .files
            .keys()
            .filter_map(|p| p.strip_prefix(&dir).ok())
            .filter(|rest| rest.components().count() > 1)
            .filter_map(|rest| rest.components().next())
            .map(|first| dir.join(first))
            .collect();
        dirs.dedup();
        Ok(dirs)
    }
}

/// Resolve `.` and `..` lexically
fn normalize(path: &Path) -> PathBuf {
    let mut out = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                if !out.pop() {
                    out.push("..");
                }
            }
            other => out.push(other.as_os_str()),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_normalize() {
        assert_eq!(normalize(Path::new("/a/b/../c/./d")), PathBuf::from("/a/c/d"));
        assert_eq!(normalize(Path::new("a/../../b")), PathBuf::from("../b"));
    }

    #[test]
    fn test_memory_tree() {
        let tree = MemoryTree::new()
            .with_file("/hwdef/BoardA/hwdef.dat", "MCU STM32F4xx STM32F405xx")
            .with_file("/hwdef/BoardA/defaults.parm", "")
            .with_file("/hwdef/BoardB/hwdef.dat", "")
            .with_file("/hwdef/common.inc", "");

        assert!(tree.is_file(Path::new("/hwdef/BoardA/../BoardA/hwdef.dat")));
        assert!(!tree.is_file(Path::new("/hwdef/BoardC/hwdef.dat")));

        let dirs = tree.list_dirs(Path::new("/hwdef")).unwrap();
        assert_eq!(
            dirs,
            vec![PathBuf::from("/hwdef/BoardA"), PathBuf::from("/hwdef/BoardB")]
        );

        let text = tree.read_text(Path::new("/hwdef/BoardA/hwdef.dat")).unwrap();
        assert_eq!(text, "MCU STM32F4xx STM32F405xx");
    }

    #[test]
    fn test_local_tree() {
        let temp_dir = TempDir::new().unwrap();
        std::fs::create_dir(temp_dir.path().join("BoardA")).unwrap();
        std::fs::write(temp_dir.path().join("notes.txt"), b"\xffok").unwrap();

        let tree = LocalTree;
        let dirs = tree.list_dirs(temp_dir.path()).unwrap();
        assert_eq!(dirs.len(), 1);

        // Invalid UTF-8 is replaced, not rejected
        let text = tree.read_text(&temp_dir.path().join("notes.txt")).unwrap();
        assert!(text.ends_with("ok"));
    }
}
