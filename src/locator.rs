//! Resolution of dictionary and rule-data files on disk.

use std::io;
use std::path::{Path, PathBuf};

/// Resolves relative data-file names to concrete paths.
///
/// Backends never hardcode absolute paths; they ask a locator. The default
/// implementation probes the filesystem, but hosts with bundled assets can
/// substitute their own.
pub trait DataLocator: Send + Sync {
    /// Return the first existing path for `relative`, if any.
    fn resolve(&self, relative: &str) -> Option<PathBuf>;

    /// Read a resolved file fully into memory.
    ///
    /// Substitution seam for hosts whose assets are not plain files (an
    /// archive, an embedded bundle). The built-in dictionary loaders read
    /// resolved paths through async file I/O and do not call this.
    fn read_bytes(&self, path: &Path) -> io::Result<Vec<u8>> {
        std::fs::read(path)
    }
}

/// Filesystem locator probing an ordered list of root directories.
///
/// Default roots, in order: the per-user data directory
/// (`~/.phonemizer-rs/`), the system share directory, and the current
/// working directory.
#[derive(Debug, Clone)]
pub struct FileSystemLocator {
    roots: Vec<PathBuf>,
}

impl FileSystemLocator {
    pub fn new() -> Self {
        let mut roots = Vec::new();
        if let Some(home) = dirs::home_dir() {
            roots.push(home.join(".phonemizer-rs"));
        }
        roots.push(PathBuf::from("/usr/share/phonemizer-rs"));
        if let Ok(cwd) = std::env::current_dir() {
            roots.push(cwd);
        }
        Self { roots }
    }

    /// A locator that probes `root` before the default locations.
    pub fn with_root(root: PathBuf) -> Self {
        let mut locator = Self::new();
        locator.roots.insert(0, root);
        locator
    }

    /// A locator restricted to exactly the given roots.
    pub fn from_roots(roots: Vec<PathBuf>) -> Self {
        Self { roots }
    }

    pub fn roots(&self) -> &[PathBuf] {
        &self.roots
    }
}

impl Default for FileSystemLocator {
    fn default() -> Self {
        Self::new()
    }
}

impl DataLocator for FileSystemLocator {
    fn resolve(&self, relative: &str) -> Option<PathBuf> {
        for root in &self.roots {
            let candidate = root.join(relative);
            if candidate.is_file() {
                log::debug!("resolved data file {relative:?} at {candidate:?}");
                return Some(candidate);
            }
        }
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn resolves_file_under_explicit_root() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("lexicon.tsv");
        let mut f = std::fs::File::create(&path).unwrap();
        writeln!(f, "hola\to l a").unwrap();

        let locator = FileSystemLocator::from_roots(vec![dir.path().to_path_buf()]);
        assert_eq!(locator.resolve("lexicon.tsv"), Some(path));
    }

    #[test]
    fn read_bytes_returns_file_contents() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("data.bin");
        std::fs::write(&path, b"abc").unwrap();

        let locator = FileSystemLocator::from_roots(vec![dir.path().to_path_buf()]);
        let resolved = locator.resolve("data.bin").unwrap();
        assert_eq!(locator.read_bytes(&resolved).unwrap(), b"abc");
    }

    #[test]
    fn returns_none_for_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let locator = FileSystemLocator::from_roots(vec![dir.path().to_path_buf()]);
        assert!(locator.resolve("does-not-exist.dict").is_none());
    }

    #[test]
    fn explicit_root_is_probed_first() {
        let locator = FileSystemLocator::with_root(PathBuf::from("/tmp/phonemizer-data"));
        assert_eq!(locator.roots()[0], PathBuf::from("/tmp/phonemizer-data"));
    }
}
