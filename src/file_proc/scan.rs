use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use tracing::{error, trace};
use walkdir::WalkDir;

use crate::config::AppConfig;
use crate::error::{Error, Result};
use crate::utils::path::{dotted_extension, file_name_string};

/// A direct child of a scanned directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceEntry {
    pub path: PathBuf,
    pub is_dir: bool,
    pub extension: String,
}

impl SourceEntry {
    pub fn name(&self) -> String {
        file_name_string(&self.path)
    }
}

/// List the direct children of `dir`, sorted by name.
///
/// An unreadable `dir` is fatal for the caller. Entries whose metadata cannot
/// be read are logged and left out.
pub fn list_children(dir: &Path) -> Result<Vec<SourceEntry>> {
    let entries = fs::read_dir(dir).map_err(|source| Error::SourceRoot {
        path: dir.to_path_buf(),
        source,
    })?;

    let mut children: Vec<SourceEntry> = Vec::new();
    for entry_result in entries {
        let entry = match entry_result {
            Ok(entry) => entry,
            Err(err) => {
                error!("Error reading entry in directory {}: {}", dir.display(), err);
                continue;
            }
        };

        let path = entry.path();
        let metadata = match fs::metadata(&path) {
            Ok(metadata) => metadata,
            Err(err) => {
                error!("Error getting metadata for {}: {}", path.display(), err);
                continue;
            }
        };

        trace!("Found {}", path.display());
        children.push(SourceEntry {
            extension: dotted_extension(&path),
            is_dir: metadata.is_dir(),
            path,
        });
    }

    children.sort_by(|a, b| a.path.file_name().cmp(&b.path.file_name()));
    Ok(children)
}

/// Every file under `dir` (recursively) whose extension is an accepted archive format.
pub fn find_archives(dir: &Path, config: &AppConfig) -> Vec<PathBuf> {
    WalkDir::new(dir)
        .sort_by_file_name()
        .into_iter()
        .filter_map(|entry| match entry {
            Ok(entry) => Some(entry),
            Err(err) => {
                error!("Error walking {}: {}", dir.display(), err);
                None
            }
        })
        .filter(|entry| entry.file_type().is_file() && config.is_accepted(entry.path()))
        .map(|entry| entry.into_path())
        .collect()
}

/// Every regular file under `dir`, recursively.
pub fn find_files(dir: &Path) -> io::Result<Vec<PathBuf>> {
    let mut files = Vec::new();
    for entry in WalkDir::new(dir).sort_by_file_name() {
        let entry = entry.map_err(io::Error::from)?;
        if entry.file_type().is_file() {
            files.push(entry.into_path());
        }
    }
    Ok(files)
}
