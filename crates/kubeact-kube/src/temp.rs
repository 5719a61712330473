//! Temporary file and directory registry
//!
//! Every generated manifest lives under one root directory owned by the
//! registry. The root is removed on [`TempPathsRegistry::cleanup`] or when the
//! registry is dropped.

use std::path::{Path, PathBuf};
use std::sync::Mutex;

use tempfile::TempDir;

use crate::error::Result;

/// Allocator of temp paths shared by all actions of a host
#[derive(Debug)]
pub struct TempPathsRegistry {
    /// Where roots are created, the system temp directory when `None`
    parent: Option<PathBuf>,
    root: Mutex<Option<TempDir>>,
    counter: Mutex<u64>,
}

impl TempPathsRegistry {
    /// Create a registry rooted in the system temp directory
    pub fn new() -> Result<Self> {
        Self::with_parent(None)
    }

    /// Create a registry rooted in a fresh directory under `parent`
    pub fn new_in(parent: impl AsRef<Path>) -> Result<Self> {
        Self::with_parent(Some(parent.as_ref().to_path_buf()))
    }

    fn with_parent(parent: Option<PathBuf>) -> Result<Self> {
        let root = create_root(parent.as_deref())?;
        Ok(Self {
            parent,
            root: Mutex::new(Some(root)),
            counter: Mutex::new(0),
        })
    }

    /// Root directory, recreated under the same parent if the registry was cleaned up
    pub fn root(&self) -> Result<PathBuf> {
        let mut root = self.root.lock().unwrap_or_else(|e| e.into_inner());
        if root.is_none() {
            *root = Some(create_root(self.parent.as_deref())?);
        }
        Ok(root
            .as_ref()
            .map(|dir| dir.path().to_path_buf())
            .unwrap_or_default())
    }

    fn next_name(&self, prefix: &str) -> String {
        let mut counter = self.counter.lock().unwrap_or_else(|e| e.into_inner());
        *counter += 1;
        format!("{}-{}", prefix, counter)
    }

    /// Reserve a path for a new file with the given extension
    ///
    /// The file itself is not created.
    pub fn create_temp_file(&self, extension: &str) -> Result<PathBuf> {
        let name = self.next_name("manifest");
        Ok(self
            .root()?
            .join(format!("{}.{}", name, extension.trim_start_matches('.'))))
    }

    /// Create a new empty directory
    pub fn create_temp_dir(&self) -> Result<PathBuf> {
        let dir = self.root()?.join(self.next_name("dir"));
        std::fs::create_dir_all(&dir)?;
        Ok(dir)
    }

    /// Remove every path handed out so far
    pub fn cleanup(&self) -> Result<()> {
        let root = self.root.lock().unwrap_or_else(|e| e.into_inner()).take();
        if let Some(dir) = root {
            dir.close()?;
        }
        Ok(())
    }
}

fn create_root(parent: Option<&Path>) -> std::io::Result<TempDir> {
    let mut builder = tempfile::Builder::new();
    builder.prefix("kubeact-");
    match parent {
        Some(parent) => builder.tempdir_in(parent),
        None => builder.tempdir(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_paths_are_unique_and_under_root() {
        let parent = TempDir::new().unwrap();
        let registry = TempPathsRegistry::new_in(parent.path()).unwrap();
        let root = registry.root().unwrap();

        let a = registry.create_temp_file("yaml").unwrap();
        let b = registry.create_temp_file(".json").unwrap();
        let dir = registry.create_temp_dir().unwrap();

        assert_ne!(a, b);
        assert!(a.starts_with(&root));
        assert_eq!(a.extension().unwrap(), "yaml");
        assert_eq!(b.extension().unwrap(), "json");
        assert!(!a.exists());
        assert!(dir.is_dir());
    }

    #[test]
    fn test_root_recreated_under_parent_after_cleanup() {
        let parent = TempDir::new().unwrap();
        let registry = TempPathsRegistry::new_in(parent.path()).unwrap();
        let first = registry.root().unwrap();

        registry.cleanup().unwrap();
        let dir = registry.create_temp_dir().unwrap();
        let second = registry.root().unwrap();

        assert_ne!(first, second);
        assert!(second.starts_with(parent.path()));
        assert!(dir.starts_with(&second));
        assert!(dir.is_dir());
    }

    #[test]
    fn test_cleanup_removes_root() {
        let registry = TempPathsRegistry::new().unwrap();
        let root = registry.root().unwrap();
        let dir = registry.create_temp_dir().unwrap();

        registry.cleanup().unwrap();

        assert!(!dir.exists());
        assert!(!root.exists());
    }
}
