//! Repository database reading
//!
//! A pacman repository database is a (usually compressed) tar archive with one
//! directory per package. Each directory holds a `desc` file made of
//! `%FIELD%` paragraphs:
//!
//! ```text
//! %FILENAME%
//! foo-1.0-1-x86_64.pkg.tar.zst
//!
//! %NAME%
//! foo
//!
//! %VERSION%
//! 1.0-1
//! ```

use std::collections::HashMap;
use std::io::Read;
use std::path::{Path, PathBuf};
use std::sync::Arc;

#[cfg(test)]
use mockall::automock;
use flate2::read::GzDecoder;
use tar::Archive;
use tracing::{debug, trace};
use xz2::read::XzDecoder;

use crate::error::DatabaseError;
use crate::package::{Package, Version};

const GZIP_MAGIC: &[u8] = &[0x1f, 0x8b];
const XZ_MAGIC: &[u8] = &[0xfd, b'7', b'z', b'X', b'Z', 0x00];
const ZSTD_MAGIC: &[u8] = &[0x28, 0xb5, 0x2f, 0xfd];

/// One package record as stored in the database
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawRecord {
    pub name: String,
    pub version: String,
    /// Package file name as recorded, usually relative to the database directory
    pub filename: String,
    pub architecture: Option<String>,
}

/// Trait for reading raw records out of a repository database
#[cfg_attr(test, automock)]
pub trait DatabaseSource: Send + Sync {
    /// Read every record of the database at `path`
    ///
    /// # Returns
    /// * `Err(DatabaseError::Io)` - If the database cannot be opened
    /// * `Err(DatabaseError::Corrupt)` - If the format is invalid
    fn read_records(&self, path: &Path) -> Result<Vec<RawRecord>, DatabaseError>;
}

/// Reads pacman `.db.tar.*` databases
#[derive(Debug, Default, Clone, Copy)]
pub struct PacmanDatabase;

impl PacmanDatabase {
    /// Pick a decoder from the leading magic bytes; anything else is read as plain tar
    fn decoder<'a>(data: &'a [u8]) -> Result<Box<dyn Read + 'a>, std::io::Error> {
        if data.starts_with(GZIP_MAGIC) {
            Ok(Box::new(GzDecoder::new(data)))
        } else if data.starts_with(XZ_MAGIC) {
            Ok(Box::new(XzDecoder::new(data)))
        } else if data.starts_with(ZSTD_MAGIC) {
            Ok(Box::new(zstd::stream::read::Decoder::new(data)?))
        } else {
            Ok(Box::new(data))
        }
    }

    /// Parse the `%FIELD%` paragraphs of a desc file
    fn parse_desc(content: &str) -> HashMap<String, Vec<String>> {
        let mut fields = HashMap::new();
        let mut current_field: Option<String> = None;
        let mut values: Vec<String> = Vec::new();

        for line in content.lines() {
            let trimmed = line.trim();

            if trimmed.len() > 2 && trimmed.starts_with('%') && trimmed.ends_with('%') {
                if let Some(field) = current_field.take() {
                    fields.insert(field, std::mem::take(&mut values));
                }
                current_field = Some(trimmed[1..trimmed.len() - 1].to_string());
            } else if !trimmed.is_empty() {
                values.push(trimmed.to_string());
            }
        }

        if let Some(field) = current_field {
            fields.insert(field, values);
        }

        fields
    }

    fn record_from_desc(entry: &Path, content: &str) -> Result<RawRecord, String> {
        let fields = Self::parse_desc(content);
        let first = |key: &str| fields.get(key).and_then(|v| v.first()).cloned();
        let required = |key: &str| {
            first(key).ok_or_else(|| format!("{}: missing %{}% field", entry.display(), key))
        };

        Ok(RawRecord {
            name: required("NAME")?,
            version: required("VERSION")?,
            filename: required("FILENAME")?,
            architecture: first("ARCH"),
        })
    }
}

impl DatabaseSource for PacmanDatabase {
    fn read_records(&self, path: &Path) -> Result<Vec<RawRecord>, DatabaseError> {
        let data = std::fs::read(path).map_err(|source| DatabaseError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        debug!("Reading database {:?} ({} bytes)", path, data.len());

        let corrupt = |reason: String| DatabaseError::corrupt(path, reason);

        // Even an empty repository database is a non-empty archive
        if data.is_empty() {
            return Err(corrupt("empty database file".to_string()));
        }

        let decoder = Self::decoder(&data).map_err(|e| corrupt(e.to_string()))?;
        let mut archive = Archive::new(decoder);
        let mut records = Vec::new();

        let entries = archive
            .entries()
            .map_err(|e| corrupt(format!("failed to read archive: {}", e)))?;
        for entry in entries {
            let mut entry = entry.map_err(|e| corrupt(format!("failed to read entry: {}", e)))?;
            let entry_path = entry
                .path()
                .map_err(|e| corrupt(format!("invalid path in archive: {}", e)))?
                .into_owned();

            if entry_path.file_name().is_none_or(|name| name != "desc") {
                trace!("Skipping archive entry {:?}", entry_path);
                continue;
            }

            let mut content = String::new();
            entry
                .read_to_string(&mut content)
                .map_err(|e| corrupt(format!("{}: {}", entry_path.display(), e)))?;

            records.push(Self::record_from_desc(&entry_path, &content).map_err(corrupt)?);
        }

        debug!("Read {} records from {:?}", records.len(), path);
        Ok(records)
    }
}

/// A database package plus whether its backing file exists
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DatabaseEntry {
    pub package: Package,
    pub file_exists: bool,
}

/// Everything read from a repository database
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DatabaseContents {
    pub entries: HashMap<String, DatabaseEntry>,
}

/// Turns raw database records into `DatabaseEntry` values
pub struct DatabaseReader {
    source: Arc<dyn DatabaseSource>,
}

impl DatabaseReader {
    pub fn new(source: Arc<dyn DatabaseSource>) -> Self {
        Self { source }
    }

    /// Read the database at `path`
    ///
    /// Package file names are resolved against the directory holding the
    /// database. If a name appears more than once, the highest version wins.
    pub fn read(&self, path: &Path) -> Result<DatabaseContents, DatabaseError> {
        let records = self.source.read_records(path)?;
        let base_dir = path.parent().unwrap_or_else(|| Path::new(""));

        let mut entries: HashMap<String, DatabaseEntry> = HashMap::new();
        for record in records {
            let version = Version::parse(&record.version).map_err(|e| {
                DatabaseError::corrupt(path, format!("package {}: {}", record.name, e))
            })?;

            let filename = resolve_filename(base_dir, &record.filename);
            let file_exists = filename.is_file();
            let package = Package::new(
                record.name,
                version,
                filename,
                record.architecture.unwrap_or_default(),
            );

            match entries.get(&package.name) {
                Some(existing) if !package.newer_than(&existing.package) => {
                    debug!("Ignoring older duplicate database record for {}", package.name);
                }
                _ => {
                    entries.insert(
                        package.name.clone(),
                        DatabaseEntry {
                            package,
                            file_exists,
                        },
                    );
                }
            }
        }

        Ok(DatabaseContents { entries })
    }
}

fn resolve_filename(base_dir: &Path, filename: &str) -> PathBuf {
    let filename = Path::new(filename);
    if filename.is_absolute() {
        filename.to_path_buf()
    } else {
        base_dir.join(filename)
    }
}
