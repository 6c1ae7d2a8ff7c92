use std::fs;
use std::path::{Path, PathBuf};

use crate::error::{CatalogueError, Result};

// ---------------------------------------------------------------------------
// Results directory layout
// ---------------------------------------------------------------------------

/// Where a batch of fit results lives and where derived products go.
///
/// Passed explicitly to whatever needs it; there is no process-wide default
/// directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResultsLayout {
    /// Directory holding one statistics file per object.
    pub results_dir: PathBuf,
    /// Subdirectory of `results_dir` receiving catalogues and tables.
    pub output_subdir: String,
    /// File-name ending that identifies statistics files.
    pub file_suffix: String,
}

impl ResultsLayout {
    pub fn new(results_dir: impl Into<PathBuf>) -> Self {
        Self {
            results_dir: results_dir.into(),
            output_subdir: "pybangs".to_string(),
            file_suffix: "_BANGS_MNstats.dat".to_string(),
        }
    }

    pub fn with_file_suffix(mut self, suffix: impl Into<String>) -> Self {
        self.file_suffix = suffix.into();
        self
    }

    pub fn with_output_subdir(mut self, subdir: impl Into<String>) -> Self {
        self.output_subdir = subdir.into();
        self
    }

    /// Statistics files in `results_dir`, sorted by file name.
    pub fn stats_files(&self) -> Result<Vec<PathBuf>> {
        let dir = &self.results_dir;
        let entries = fs::read_dir(dir).map_err(|e| CatalogueError::io(dir, e))?;

        let mut files = Vec::new();
        for entry in entries {
            let entry = entry.map_err(|e| CatalogueError::io(dir, e))?;
            let path = entry.path();
            let matches = path
                .file_name()
                .and_then(|n| n.to_str())
                .is_some_and(|n| n.ends_with(&self.file_suffix));
            if matches && path.is_file() {
                files.push(path);
            }
        }
        files.sort();
        log::debug!(
            "found {} statistics file(s) in {}",
            files.len(),
            dir.display()
        );
        Ok(files)
    }

    /// Directory receiving derived products.
    pub fn output_dir(&self) -> PathBuf {
        self.results_dir.join(&self.output_subdir)
    }

    /// Path of `file_name` inside the output directory, which is created when absent.
    pub fn output_path(&self, file_name: impl AsRef<Path>) -> Result<PathBuf> {
        let dir = self.output_dir();
        fs::create_dir_all(&dir).map_err(|e| CatalogueError::io(&dir, e))?;
        Ok(dir.join(file_name))
    }
}
