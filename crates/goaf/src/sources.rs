//! Where a subject's source tables come from.

use std::collections::BTreeSet;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use indexmap::IndexMap;

use crate::error::{GoafError, Result};
use crate::registry::{LogicalTable, TableRegistry};

/// A set of source tables for one subject.
pub trait SourceSet {
    /// Fetch the bytes for a table.
    ///
    /// `Ok(None)` means the table has no source. An error means a source
    /// exists but could not be read.
    fn fetch(&self, table: &LogicalTable) -> Result<Option<Vec<u8>>>;

    /// Human-readable location of a table's source, for reports and logs.
    fn describe(&self, table: &LogicalTable) -> String;
}

/// Source files laid out as `{subject}-{table label}.{ext}` in one directory.
#[derive(Debug, Clone)]
pub struct SourceDirectory {
    dir: PathBuf,
    subject_name: String,
    extension: String,
}

impl SourceDirectory {
    pub fn new(
        dir: impl Into<PathBuf>,
        subject_name: impl Into<String>,
        extension: impl Into<String>,
    ) -> Self {
        Self {
            dir: dir.into(),
            subject_name: subject_name.into(),
            extension: extension.into(),
        }
    }

    /// Path of a table's source file.
    ///
    /// The extension matches without regard to ASCII case, the same rule
    /// [`discover_subjects`] applies. When no file exists the conventional
    /// `{subject}-{label}.{ext}` path is returned.
    pub fn path_for(&self, table: &LogicalTable) -> PathBuf {
        let literal = self
            .dir
            .join(table.file_name(&self.subject_name, &self.extension));
        if literal.is_file() {
            return literal;
        }

        let stem = format!("{}-{}", self.subject_name, table.external_name);
        fs::read_dir(&self.dir)
            .into_iter()
            .flatten()
            .filter_map(|entry| entry.ok().map(|e| e.path()))
            .find(|path| {
                has_extension(path, &self.extension)
                    && path.file_stem().is_some_and(|s| s.to_string_lossy() == stem)
                    && path.is_file()
            })
            .unwrap_or(literal)
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn subject_name(&self) -> &str {
        &self.subject_name
    }
}

impl SourceSet for SourceDirectory {
    fn fetch(&self, table: &LogicalTable) -> Result<Option<Vec<u8>>> {
        let path = self.path_for(table);
        match fs::read(&path) {
            Ok(bytes) => Ok(Some(bytes)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(GoafError::io(path, e)),
        }
    }

    fn describe(&self, table: &LogicalTable) -> String {
        self.path_for(table).display().to_string()
    }
}

/// Source bytes held in memory, keyed by table id, label, or internal key.
#[derive(Debug, Clone, Default)]
pub struct MemorySources {
    entries: IndexMap<String, Vec<u8>>,
}

impl MemorySources {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a table's bytes under any of its names.
    pub fn insert(&mut self, table_name: impl Into<String>, bytes: impl Into<Vec<u8>>) {
        self.entries.insert(table_name.into(), bytes.into());
    }

    /// Builder form of [`MemorySources::insert`].
    pub fn with(mut self, table_name: impl Into<String>, bytes: impl Into<Vec<u8>>) -> Self {
        self.insert(table_name, bytes);
        self
    }

    fn lookup(&self, table: &LogicalTable) -> Option<&Vec<u8>> {
        [&table.table_id, &table.external_name, &table.internal_key]
            .into_iter()
            .find_map(|name| self.entries.get(name.as_str()))
    }
}

impl SourceSet for MemorySources {
    fn fetch(&self, table: &LogicalTable) -> Result<Option<Vec<u8>>> {
        Ok(self.lookup(table).cloned())
    }

    fn describe(&self, table: &LogicalTable) -> String {
        format!("<memory:{}>", table.external_name)
    }
}

/// Find subject names that have at least one source file in a directory.
///
/// A file belongs to a subject when its stem ends with `-{table label}` for
/// one of the registry's tables. Names are returned sorted.
pub fn discover_subjects(
    dir: impl AsRef<Path>,
    registry: &TableRegistry,
    extension: &str,
) -> Result<Vec<String>> {
    let dir = dir.as_ref();
    let entries = fs::read_dir(dir).map_err(|e| GoafError::io(dir, e))?;

    let mut subjects = BTreeSet::new();
    for entry in entries {
        let entry = entry.map_err(|e| GoafError::io(dir, e))?;
        let path = entry.path();

        if !has_extension(&path, extension) || !path.is_file() {
            continue;
        }

        let Some(stem) = path.file_stem().map(|s| s.to_string_lossy().into_owned()) else {
            continue;
        };

        if let Some(subject) = subject_from_stem(&stem, registry) {
            subjects.insert(subject);
        }
    }

    Ok(subjects.into_iter().collect())
}

/// True when a path's extension equals `extension`, ignoring ASCII case.
fn has_extension(path: &Path, extension: &str) -> bool {
    path.extension()
        .is_some_and(|e| e.to_string_lossy().eq_ignore_ascii_case(extension))
}

/// Subject part of a source file stem, if the stem names a known table.
pub fn subject_from_stem(stem: &str, registry: &TableRegistry) -> Option<String> {
    registry.tables().iter().find_map(|table| {
        stem.strip_suffix(table.external_name.as_str())
            .and_then(|rest| rest.strip_suffix('-'))
            .filter(|subject| !subject.is_empty())
            .map(str::to_string)
    })
}
