//! Directory listing seam for the package scanner

use std::io;
use std::path::{Path, PathBuf};

#[cfg(test)]
use mockall::automock;

/// Trait for listing the files of a repository directory
#[cfg_attr(test, automock)]
pub trait FileLister: Send + Sync {
    /// List the regular files directly inside `dir` (non-recursive)
    ///
    /// # Returns
    /// * `Ok(paths)` - Full paths of the files, in no particular order
    /// * `Err(io::Error)` - If the directory cannot be read
    fn list(&self, dir: &Path) -> io::Result<Vec<PathBuf>>;
}

/// Lists files using the local filesystem
#[derive(Debug, Default, Clone, Copy)]
pub struct DirLister;

impl FileLister for DirLister {
    fn list(&self, dir: &Path) -> io::Result<Vec<PathBuf>> {
        let mut files = Vec::new();
        for entry in std::fs::read_dir(dir)? {
            let entry = entry?;
            // Follow symlinks so linked package files are still seen
            let is_file = std::fs::metadata(entry.path())
                .map(|meta| meta.is_file())
                .unwrap_or(false);
            if is_file {
                files.push(entry.path());
            }
        }
        Ok(files)
    }
}
