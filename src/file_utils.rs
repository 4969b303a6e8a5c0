use anyhow::{Context, Result};
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

// @module: Input discovery for the ingest command

// @const: Extension of plain-text journal exports
pub const JOURNAL_EXTENSION: &str = "txt";

// @struct: File operations utility
pub struct FileManager;

impl FileManager {
    // @checks: File existence
    pub fn file_exists<P: AsRef<Path>>(path: P) -> bool {
        path.as_ref().is_file()
    }

    // @checks: Directory existence
    pub fn dir_exists<P: AsRef<Path>>(path: P) -> bool {
        path.as_ref().is_dir()
    }

    /// Find files with a specific extension under a directory, sorted by path
    pub fn find_files<P: AsRef<Path>>(dir: P, extension: &str) -> Result<Vec<PathBuf>> {
        let wanted = extension.trim_start_matches('.');
        let mut result = Vec::new();

        for entry in WalkDir::new(dir.as_ref()).follow_links(true) {
            let entry = entry.context("Failed to read directory entry")?;
            let path = entry.path();

            let matches = path
                .extension()
                .is_some_and(|ext| ext.to_string_lossy().eq_ignore_ascii_case(wanted));
            if path.is_file() && matches {
                result.push(path.to_path_buf());
            }
        }

        result.sort();
        Ok(result)
    }

    /// Expand CLI inputs: files are kept as given, directories are searched
    /// recursively for journal exports. Duplicates are dropped.
    pub fn collect_inputs(inputs: &[PathBuf]) -> Result<Vec<PathBuf>> {
        let mut files = Vec::new();

        for input in inputs {
            if Self::dir_exists(input) {
                files.extend(Self::find_files(input, JOURNAL_EXTENSION)?);
            } else if Self::file_exists(input) {
                files.push(input.clone());
            } else {
                return Err(anyhow::anyhow!("Input does not exist: {:?}", input));
            }
        }

        let mut seen = std::collections::HashSet::new();
        files.retain(|f| seen.insert(f.clone()));
        Ok(files)
    }
}
