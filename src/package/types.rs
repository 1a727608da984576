//! Common package types

use std::path::PathBuf;

use serde::Serialize;

use crate::package::version::Version;

/// A package as found in the repository directory or database
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Package {
    /// Package name (identity)
    pub name: String,
    pub version: Version,
    /// Path to the backing package file
    pub filename: PathBuf,
    /// Target architecture (e.g., x86_64, any)
    pub architecture: String,
}

impl Package {
    pub fn new(
        name: impl Into<String>,
        version: Version,
        filename: impl Into<PathBuf>,
        architecture: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            version,
            filename: filename.into(),
            architecture: architecture.into(),
        }
    }

    /// File name component of `filename`, for display
    pub fn basename(&self) -> String {
        self.filename
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| self.filename.to_string_lossy().into_owned())
    }

    pub fn older_than(&self, other: &Package) -> bool {
        self.version.older_than(&other.version)
    }

    pub fn newer_than(&self, other: &Package) -> bool {
        self.version.newer_than(&other.version)
    }
}

/// Version metadata for one name as reported by the upstream service
///
/// `version == None` means the service does not know the package.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RemoteRecord {
    pub name: String,
    pub version: Option<Version>,
}

impl RemoteRecord {
    pub fn found(name: impl Into<String>, version: Version) -> Self {
        Self {
            name: name.into(),
            version: Some(version),
        }
    }

    pub fn not_found(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            version: None,
        }
    }

    pub fn is_found(&self) -> bool {
        self.version.is_some()
    }
}
