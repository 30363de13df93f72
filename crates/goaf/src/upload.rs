//! Scoped staging of uploaded source files.

use std::fs;
use std::path::{Path, PathBuf};

use tempfile::TempDir;
use tracing::debug;

use crate::error::{GoafError, Result};
use crate::registry::TableRegistry;
use crate::sources::{subject_from_stem, SourceDirectory};

/// A temporary directory holding uploaded files for one request.
///
/// The directory and everything in it is removed when the session drops.
#[derive(Debug)]
pub struct UploadSession {
    dir: TempDir,
    staged: Vec<PathBuf>,
}

impl UploadSession {
    pub fn new() -> Result<Self> {
        let dir = tempfile::Builder::new()
            .prefix("goaf-upload-")
            .tempdir()
            .map_err(|e| GoafError::io(std::env::temp_dir(), e))?;
        debug!(dir = %dir.path().display(), "upload session opened");
        Ok(Self {
            dir,
            staged: Vec::new(),
        })
    }

    /// Stage one uploaded file under its own name.
    ///
    /// Names carrying a path separator or a parent reference are rejected.
    pub fn write(&mut self, name: &str, bytes: &[u8]) -> Result<PathBuf> {
        if name.is_empty()
            || name == "."
            || name == ".."
            || name.contains(['/', '\\'])
            || Path::new(name).file_name().map(|n| n != name).unwrap_or(true)
        {
            return Err(GoafError::InvalidUpload(name.to_string()));
        }

        let path = self.dir.path().join(name);
        fs::write(&path, bytes).map_err(|e| GoafError::io(&path, e))?;
        self.staged.push(path.clone());
        Ok(path)
    }

    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    /// Paths staged so far, in upload order.
    pub fn staged(&self) -> &[PathBuf] {
        &self.staged
    }

    /// Source set over the staged files for a subject.
    pub fn sources(&self, subject_name: &str, extension: &str) -> SourceDirectory {
        SourceDirectory::new(self.dir.path(), subject_name, extension)
    }

    /// Subject named by the first staged file that follows the naming scheme.
    pub fn subject(&self, registry: &TableRegistry) -> Option<String> {
        self.staged.iter().find_map(|path| {
            path.file_stem()
                .and_then(|stem| subject_from_stem(&stem.to_string_lossy(), registry))
        })
    }
}
