//! Repository directory scanning
//!
//! Groups the package files of a directory by name and splits each group into
//! its current package and outdated duplicates.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use serde::Serialize;
use tracing::{debug, trace};

use crate::error::ScanError;
use crate::local::lister::FileLister;
use crate::package::filename::FilenameParser;
use crate::package::{Package, Version};

/// Recoverable problem with a single local file
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ScanWarning {
    /// File looks like a package but its name does not parse
    UnparsableFilename { path: PathBuf, reason: String },
    /// Several files of one package carry the same version
    DuplicateVersion {
        name: String,
        version: Version,
        filenames: Vec<PathBuf>,
    },
}

impl std::fmt::Display for ScanWarning {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ScanWarning::UnparsableFilename { path, reason } => {
                write!(f, "cannot parse package file {}: {}", path.display(), reason)
            }
            ScanWarning::DuplicateVersion {
                name,
                version,
                filenames,
            } => {
                let files: Vec<_> = filenames.iter().map(|p| p.display().to_string()).collect();
                write!(
                    f,
                    "package {} has several files at version {}: {}",
                    name,
                    version,
                    files.join(", ")
                )
            }
        }
    }
}

/// All packages sharing one name, drawn from one source
#[derive(Debug, Clone)]
pub struct PackageGroup {
    name: String,
    members: Vec<Package>,
}

/// A group split into its current package and the rest
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedGroup {
    pub current: Package,
    pub outdated: Vec<Package>,
    /// Set when the maximum version is shared by more than one file
    pub duplicate: Option<ScanWarning>,
}

impl PackageGroup {
    pub fn new(first: Package) -> Self {
        Self {
            name: first.name.clone(),
            members: vec![first],
        }
    }

    /// Add a package; it must carry the group's name
    pub fn push(&mut self, package: Package) {
        debug_assert_eq!(package.name, self.name);
        self.members.push(package);
    }

    /// Pick the current package
    ///
    /// The current package has the maximum version. Among files tied at that
    /// version the lexicographically smallest file name wins, and the tie is
    /// surfaced as a `DuplicateVersion` warning.
    pub fn resolve(mut self) -> ResolvedGroup {
        self.members.sort_by(|a, b| {
            b.version
                .cmp(&a.version)
                .then_with(|| a.filename.cmp(&b.filename))
        });

        // Never empty: `new` takes the first member
        let current = self.members.remove(0);
        let outdated = self.members;

        let tied: Vec<PathBuf> = outdated
            .iter()
            .filter(|p| p.version == current.version)
            .map(|p| p.filename.clone())
            .collect();

        let duplicate = (!tied.is_empty()).then(|| ScanWarning::DuplicateVersion {
            name: self.name.clone(),
            version: current.version.clone(),
            filenames: std::iter::once(current.filename.clone())
                .chain(tied)
                .collect(),
        });

        ResolvedGroup {
            current,
            outdated,
            duplicate,
        }
    }
}

/// Output of a directory scan
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ScanResult {
    /// One package per name, sorted by name
    pub current: Vec<Package>,
    /// Every non-current package across all names
    pub outdated: Vec<Package>,
    pub warnings: Vec<ScanWarning>,
}

/// Scans a repository directory for package files
pub struct PackageScanner {
    lister: Arc<dyn FileLister>,
    parser: FilenameParser,
}

impl PackageScanner {
    pub fn new(lister: Arc<dyn FileLister>) -> Self {
        Self {
            lister,
            parser: FilenameParser::new(),
        }
    }

    /// Group the files in `dir` by package name
    ///
    /// Only a failure to list the directory is fatal. Unparsable package
    /// files are reported in `warnings` and left out.
    pub fn group(
        &self,
        dir: &Path,
    ) -> Result<(BTreeMap<String, PackageGroup>, Vec<ScanWarning>), ScanError> {
        let mut files = self.lister.list(dir).map_err(|source| ScanError {
            path: dir.to_path_buf(),
            source,
        })?;
        // Listing order is arbitrary; sort so every run sees the same input
        files.sort();
        debug!("Listed {} files in {:?}", files.len(), dir);

        let mut groups: BTreeMap<String, PackageGroup> = BTreeMap::new();
        let mut warnings = Vec::new();

        for path in files {
            if !self.parser.is_candidate(&path) {
                trace!("Skipping non-package file {:?}", path);
                continue;
            }

            match self.parser.parse(&path) {
                Ok(package) => match groups.get_mut(&package.name) {
                    Some(group) => group.push(package),
                    None => {
                        groups.insert(package.name.clone(), PackageGroup::new(package));
                    }
                },
                Err(e) => {
                    debug!("Unparsable package file {:?}: {}", path, e);
                    warnings.push(ScanWarning::UnparsableFilename {
                        path,
                        reason: e.to_string(),
                    });
                }
            }
        }

        Ok((groups, warnings))
    }

    /// Scan `dir` and split its packages into current and outdated
    pub fn scan(&self, dir: &Path) -> Result<ScanResult, ScanError> {
        let (groups, warnings) = self.group(dir)?;

        let mut result = ScanResult {
            warnings,
            ..Default::default()
        };
        for group in groups.into_values() {
            let resolved = group.resolve();
            result.current.push(resolved.current);
            result.outdated.extend(resolved.outdated);
            if let Some(warning) = resolved.duplicate {
                result.warnings.push(warning);
            }
        }

        debug!(
            "Scanned {:?}: {} current, {} outdated, {} warnings",
            dir,
            result.current.len(),
            result.outdated.len(),
            result.warnings.len()
        );

        Ok(result)
    }
}
