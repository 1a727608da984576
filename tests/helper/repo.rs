//! Temporary repository directories with a pacman database

use std::path::{Path, PathBuf};

use flate2::Compression;
use flate2::write::GzEncoder;
use tempfile::TempDir;

/// A repository directory plus the database records to write into it
pub struct TestRepo {
    dir: TempDir,
    records: Vec<(String, String, String)>,
}

impl TestRepo {
    pub fn new() -> Self {
        Self {
            dir: TempDir::new().unwrap(),
            records: Vec::new(),
        }
    }

    pub fn dir(&self) -> &Path {
        self.dir.path()
    }

    pub fn db_path(&self) -> PathBuf {
        self.dir.path().join("test.db.tar.gz")
    }

    /// Create an (empty) package file in the directory
    pub fn with_file(self, file_name: &str) -> Self {
        std::fs::write(self.dir.path().join(file_name), b"").unwrap();
        self
    }

    /// Add a database record; the backing file is not created
    pub fn with_record(mut self, name: &str, version: &str, file_name: &str) -> Self {
        self.records
            .push((name.to_string(), version.to_string(), file_name.to_string()));
        self
    }

    /// Write the database archive
    pub fn build(self) -> Self {
        let file = std::fs::File::create(self.db_path()).unwrap();
        let mut builder = tar::Builder::new(GzEncoder::new(file, Compression::default()));
        for (name, version, file_name) in &self.records {
            let desc = format!(
                "%FILENAME%\n{file_name}\n\n%NAME%\n{name}\n\n%VERSION%\n{version}\n\n%ARCH%\nx86_64\n\n"
            );
            let mut header = tar::Header::new_gnu();
            header.set_size(desc.len() as u64);
            header.set_mode(0o644);
            header.set_cksum();
            builder
                .append_data(&mut header, format!("{name}-{version}/desc"), desc.as_bytes())
                .unwrap();
        }
        builder.into_inner().unwrap().finish().unwrap();
        self
    }
}
