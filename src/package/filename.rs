//! Package file name parsing
//!
//! Package files are named `<name>-<pkgver>-<pkgrel>-<arch>.pkg.tar[.<ext>]`.

use std::path::Path;

use regex::Regex;

use crate::package::types::Package;
use crate::package::version::Version;

/// Error returned when a package candidate does not match the file name grammar
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FilenameError {
    #[error("file name is not valid UTF-8")]
    NotUtf8,

    #[error("does not match <name>-<pkgver>-<pkgrel>-<arch>.pkg.tar[.ext]")]
    Malformed,

    #[error("invalid version: {0}")]
    InvalidVersion(String),
}

/// Parser for package file names
pub struct FilenameParser {
    /// `name-pkgver-pkgrel-arch.pkg.tar(.ext)?`; name is greedy so it may contain hyphens
    package_re: Regex,
}

impl FilenameParser {
    pub fn new() -> Self {
        Self {
            package_re: Regex::new(
                r"^(?P<name>.+)-(?P<pkgver>[^-/]+)-(?P<pkgrel>[^-/]+)-(?P<arch>[^-/.]+)\.pkg\.tar(?:\.(?:gz|bz2|xz|zst|lz4|lrz|lzo|Z|lz))?$",
            )
            .expect("package file name regex is valid"),
        }
    }

    /// Returns true if the file looks like a package at all
    ///
    /// Databases, signatures, and unrelated files in the repository
    /// directory are not candidates and are skipped without a warning.
    pub fn is_candidate(&self, path: &Path) -> bool {
        let Some(file_name) = path.file_name().and_then(|name| name.to_str()) else {
            // Undecodable names still get reported by `parse`
            return path.file_name().is_some();
        };
        file_name.contains(".pkg.tar") && !file_name.ends_with(".sig")
    }

    /// Parse a package file path into a `Package`
    pub fn parse(&self, path: &Path) -> Result<Package, FilenameError> {
        let file_name = path
            .file_name()
            .and_then(|name| name.to_str())
            .ok_or(FilenameError::NotUtf8)?;

        let caps = self
            .package_re
            .captures(file_name)
            .ok_or(FilenameError::Malformed)?;

        let version_str = format!("{}-{}", &caps["pkgver"], &caps["pkgrel"]);
        let version = Version::parse(&version_str)
            .map_err(|e| FilenameError::InvalidVersion(e.to_string()))?;

        Ok(Package::new(&caps["name"], version, path, &caps["arch"]))
    }
}

impl Default for FilenameParser {
    fn default() -> Self {
        Self::new()
    }
}
