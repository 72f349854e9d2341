//! Creating new, empty migration script files.

use std::cell::Cell;
use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use toolbox_db::{
    next_script_timestamp, parse_timestamp_prefix, sanitize_script_name, script_file_name,
    script_template,
};

use crate::error::{CliError, Result};

/// Writes timestamped script files into one directory.
///
/// Every file gets a prefix strictly greater than any prefix already in the
/// directory or issued earlier by this generator, so scripts generated within
/// the same second still sort in creation order.
#[derive(Debug)]
pub struct ScriptGenerator {
    dir: PathBuf,
    last_issued: Cell<Option<DateTime<Utc>>>,
}

impl ScriptGenerator {
    /// Creates a generator writing into `dir`.
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: dir.into(),
            last_issued: Cell::new(None),
        }
    }

    /// Target directory.
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Generates `<timestamp>-<script_name>.sql` and returns its path.
    pub fn generate(&self, script_name: &str) -> Result<PathBuf> {
        self.generate_at(script_name, Utc::now())
    }

    /// Like [`generate`](Self::generate) with an explicit clock reading.
    pub fn generate_at(&self, script_name: &str, now: DateTime<Utc>) -> Result<PathBuf> {
        let name = sanitize_script_name(script_name)
            .ok_or_else(|| CliError::InvalidScriptName(script_name.to_string()))?;

        let latest = self.last_issued.get().max(self.latest_in_dir());
        let timestamp = next_script_timestamp(now, latest);
        let path = self.dir.join(script_file_name(timestamp, name));

        write_new_file(&path, &script_template(name)).map_err(|source| CliError::Generate {
            path: path.clone(),
            source,
        })?;
        self.last_issued.set(Some(timestamp));
        Ok(path)
    }

    /// Newest timestamp prefix among the directory's files.
    fn latest_in_dir(&self) -> Option<DateTime<Utc>> {
        fs::read_dir(&self.dir)
            .ok()?
            .filter_map(|entry| entry.ok())
            .filter_map(|entry| entry.file_name().to_str().and_then(parse_timestamp_prefix))
            .max()
    }
}

fn write_new_file(path: &Path, content: &str) -> std::io::Result<()> {
    let mut file = OpenOptions::new().write(true).create_new(true).open(path)?;
    file.write_all(content.as_bytes())?;
    file.sync_all()
}
