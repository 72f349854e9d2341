//! Where migration scripts come from.
//!
//! The engine only needs a flat, directory-like view: list the entries under
//! the source root and read one of them. [`DirSource`] serves scripts from the
//! filesystem and [`MemorySource`] from a map, which covers scripts embedded
//! with `include_str!` as well as test fixtures.
//!
//! ```
//! use toolbox_db::{MemorySource, load_scripts};
//!
//! let source = MemorySource::new()
//!     .with_script("02-b.sql", "-- +migrate Up\nSELECT 2;\n")
//!     .with_script("01-a.sql", "-- +migrate Up\nSELECT 1;\n")
//!     .with_script("README.md", "ignored");
//!
//! let scripts = load_scripts(&source).unwrap();
//! let names: Vec<_> = scripts.iter().map(|s| s.name.as_str()).collect();
//! assert_eq!(names, ["01-a.sql", "02-b.sql"]);
//! ```

use std::collections::BTreeMap;
use std::fmt;
use std::path::{Path, PathBuf};

use crate::error::{Result, ScriptError};
use crate::script::MigrationScript;

/// File extension of migration scripts.
pub const SCRIPT_EXTENSION: &str = "sql";

/// A directory-like collection of script files.
pub trait ScriptSource: fmt::Debug {
    /// Lists the file names directly under the source root.
    fn entries(&self) -> Result<Vec<String>>;

    /// Reads the content of the entry called `name`.
    fn read(&self, name: &str) -> Result<String>;
}

impl<S: ScriptSource + ?Sized> ScriptSource for Box<S> {
    fn entries(&self) -> Result<Vec<String>> {
        (**self).entries()
    }

    fn read(&self, name: &str) -> Result<String> {
        (**self).read(name)
    }
}

/// Loads and parses every `.sql` entry of `source`, sorted by name.
///
/// Script names are expected to carry a sortable timestamp prefix, so the
/// lexicographic order is the apply order.
///
/// # Errors
///
/// Returns [`ScriptError::Io`] if the source cannot be read, or
/// [`ScriptError::Parse`] for the first malformed script.
pub fn load_scripts(source: &dyn ScriptSource) -> Result<Vec<MigrationScript>> {
    let mut names: Vec<String> = source
        .entries()?
        .into_iter()
        .filter(|name| is_script_name(name))
        .collect();
    names.sort();
    names.dedup();

    names
        .into_iter()
        .map(|name| {
            let content = source.read(&name)?;
            MigrationScript::parse(name, &content)
        })
        .collect()
}

fn is_script_name(name: &str) -> bool {
    Path::new(name).extension().and_then(|ext| ext.to_str()) == Some(SCRIPT_EXTENSION)
}

/// Scripts stored as files in a single directory.
#[derive(Debug, Clone)]
pub struct DirSource {
    root: PathBuf,
}

impl DirSource {
    /// Serves scripts from `root`. Subdirectories are not traversed.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Returns the directory scripts are read from.
    pub fn root(&self) -> &Path {
        &self.root
    }
}

impl ScriptSource for DirSource {
    fn entries(&self) -> Result<Vec<String>> {
        let read_dir = std::fs::read_dir(&self.root).map_err(|e| ScriptError::io(&self.root, e))?;
        let mut names = Vec::new();
        for entry in read_dir {
            let entry = entry.map_err(|e| ScriptError::io(&self.root, e))?;
            let is_file = entry
                .file_type()
                .map_err(|e| ScriptError::io(entry.path(), e))?
                .is_file();
            if is_file {
                names.push(entry.file_name().to_string_lossy().into_owned());
            }
        }
        Ok(names)
    }

    fn read(&self, name: &str) -> Result<String> {
        let path = self.root.join(name);
        std::fs::read_to_string(&path).map_err(|e| ScriptError::io(path, e))
    }
}

/// Scripts held in memory, keyed by file name.
#[derive(Debug, Clone, Default)]
pub struct MemorySource {
    scripts: BTreeMap<String, String>,
}

impl MemorySource {
    /// Creates an empty source.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds or replaces a script.
    pub fn with_script(mut self, name: impl Into<String>, content: impl Into<String>) -> Self {
        self.insert(name, content);
        self
    }

    /// Adds or replaces a script in place.
    pub fn insert(&mut self, name: impl Into<String>, content: impl Into<String>) {
        self.scripts.insert(name.into(), content.into());
    }

    /// Removes a script, returning its content.
    pub fn remove(&mut self, name: &str) -> Option<String> {
        self.scripts.remove(name)
    }
}

impl ScriptSource for MemorySource {
    fn entries(&self) -> Result<Vec<String>> {
        Ok(self.scripts.keys().cloned().collect())
    }

    fn read(&self, name: &str) -> Result<String> {
        self.scripts
            .get(name)
            .cloned()
            .ok_or_else(|| ScriptError::NotFound(name.to_string()))
    }
}
