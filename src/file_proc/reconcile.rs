//! Move-with-merge-on-collision, shared by bucketing and the archive merge.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

use super::scan::{find_archives, find_files};
use super::transfer::{move_entry, prune_empty_dirs};
use crate::config::AppConfig;
use crate::error::{Error, Result};
use crate::utils::path::file_name_string;
use crate::utils::Prompter;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SkipReason {
    NotADirectory,
    Declined { residual: Vec<PathBuf> },
    /// Entries that clash with an entry of the other kind (file or directory) at the destination.
    Conflicting { residual: Vec<PathBuf> },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MergeOutcome {
    /// Everything was transferred and the source directory is gone.
    FullyMerged,
    /// Residual duplicates were found and deleted after confirmation.
    PartiallyMerged { residual: Vec<PathBuf> },
    /// The source directory was left untouched.
    Skipped(SkipReason),
}

impl MergeOutcome {
    pub fn is_fully_merged(&self) -> bool {
        matches!(self, MergeOutcome::FullyMerged)
    }
}

/// What to do with source files whose name already exists at the destination.
pub enum DuplicatePolicy<'a> {
    /// Destination wins; the source copy is deleted straight away.
    DeleteSource,
    /// Leftover archives are listed and deleted only if the prompter agrees.
    Confirm(&'a mut dyn Prompter),
}

#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct TransferStats {
    pub moved: usize,
    pub duplicates: usize,
    /// Source entries whose name is taken by an entry of the other kind.
    pub conflicts: Vec<PathBuf>,
}

/// Bring `source` into `destination`.
///
/// A missing destination is a plain rename. An existing destination
/// directory receives the source's files one by one, never overwriting; what
/// is left over is settled according to `policy`.
pub fn reconcile_directory(
    source: &Path,
    destination: &Path,
    config: &AppConfig,
    policy: DuplicatePolicy<'_>,
) -> Result<MergeOutcome> {
    if !source.is_dir() {
        return Ok(MergeOutcome::Skipped(SkipReason::NotADirectory));
    }

    if !destination.exists() {
        if let Some(parent) = destination.parent() {
            fs::create_dir_all(parent)?;
        }
        debug!("Renaming {} to {}", source.display(), destination.display());
        move_entry(source, destination)?;
        return Ok(MergeOutcome::FullyMerged);
    }

    if !destination.is_dir() {
        return Err(Error::DestinationOccupied(destination.to_path_buf()));
    }

    let delete_duplicates = matches!(policy, DuplicatePolicy::DeleteSource);
    let stats = transfer_missing(source, destination, delete_duplicates)?;
    debug!(
        "{} -> {}: {} moved, {} duplicates, {} conflicts",
        source.display(),
        destination.display(),
        stats.moved,
        stats.duplicates,
        stats.conflicts.len()
    );

    settle(source, config, policy, &stats.conflicts)
}

/// Move every file of `source` that is absent from `destination`, recursing
/// into sub-directories. Files already present at the destination are
/// duplicates and are deleted from the source when `delete_duplicates` is set.
/// A file facing a directory (or the reverse) is a conflict and stays put.
pub fn transfer_missing(
    source: &Path,
    destination: &Path,
    delete_duplicates: bool,
) -> io::Result<TransferStats> {
    let mut stats = TransferStats::default();

    let mut children: Vec<PathBuf> = fs::read_dir(source)?
        .map(|entry| entry.map(|e| e.path()))
        .collect::<io::Result<_>>()?;
    children.sort();

    for child in children {
        let target = destination.join(child.file_name().unwrap_or_default());

        if child.is_dir() {
            if !target.exists() {
                move_entry(&child, &target)?;
                stats.moved += 1;
            } else if target.is_dir() {
                let nested = transfer_missing(&child, &target, delete_duplicates)?;
                stats.moved += nested.moved;
                stats.duplicates += nested.duplicates;
                stats.conflicts.extend(nested.conflicts);
            } else {
                warn!(
                    "Cannot merge directory {} into file {}",
                    child.display(),
                    target.display()
                );
                stats.conflicts.push(child);
            }
        } else if target.is_dir() {
            warn!(
                "Cannot merge file {} into directory {}",
                child.display(),
                target.display()
            );
            stats.conflicts.push(child);
        } else if target.exists() {
            stats.duplicates += 1;
            if delete_duplicates {
                warn!(
                    "\"{}\" already exists at {}, deleting...",
                    file_name_string(&child),
                    target.display()
                );
                fs::remove_file(&child)?;
            }
        } else {
            move_entry(&child, &target)?;
            stats.moved += 1;
        }
    }

    Ok(stats)
}

/// Entries of `source` whose counterpart in `destination` is of the other
/// kind (file against directory), recursing into directories present on both sides.
pub fn find_conflicts(source: &Path, destination: &Path) -> io::Result<Vec<PathBuf>> {
    let mut conflicts = Vec::new();
    if !destination.is_dir() {
        return Ok(conflicts);
    }

    for entry in fs::read_dir(source)? {
        let child = entry?.path();
        let target = destination.join(child.file_name().unwrap_or_default());
        if !target.exists() {
            continue;
        }
        match (child.is_dir(), target.is_dir()) {
            (true, true) => conflicts.extend(find_conflicts(&child, &target)?),
            (true, false) | (false, true) => conflicts.push(child),
            (false, false) => {}
        }
    }

    conflicts.sort();
    Ok(conflicts)
}

/// Decide the fate of `source` after its files have been transferred.
///
/// `conflicts` are the entries that could not be transferred because the
/// destination holds something of the other kind under the same name; they
/// are never deleted.
pub fn settle(
    source: &Path,
    config: &AppConfig,
    policy: DuplicatePolicy<'_>,
    conflicts: &[PathBuf],
) -> Result<MergeOutcome> {
    match policy {
        DuplicatePolicy::DeleteSource => {
            if !source.exists() || prune_empty_dirs(source)? {
                return Ok(MergeOutcome::FullyMerged);
            }
            // only conflicting entries can survive a delete-source transfer
            let residual = find_files(source)?;
            warn!(
                "{} entries could not be merged out of {}",
                residual.len(),
                source.display()
            );
            Ok(MergeOutcome::Skipped(SkipReason::Conflicting { residual }))
        }
        DuplicatePolicy::Confirm(prompter) => {
            if !conflicts.is_empty() {
                warn!(
                    "{} entries in {} clash with the destination, leaving it in place",
                    conflicts.len(),
                    source.display()
                );
                for entry in conflicts {
                    warn!("    * {}", entry.display());
                }
                let residual = conflicting_files(conflicts)?;
                return Ok(MergeOutcome::Skipped(SkipReason::Conflicting { residual }));
            }

            let residual = find_archives(source, config);
            if residual.is_empty() {
                debug!("Clearing out everything in {}", source.display());
                fs::remove_dir_all(source)?;
                return Ok(MergeOutcome::FullyMerged);
            }

            warn!("Unmoved archives have been detected in {}", source.display());
            for file in &residual {
                warn!("    * {}", file_name_string(file));
            }

            let question = format!(
                "{} file(s) left in {} are most likely duplicates, delete them?",
                residual.len(),
                source.display()
            );
            if !prompter.confirm(&question).map_err(Error::Prompt)? {
                info!("Leaving {} untouched", source.display());
                return Ok(MergeOutcome::Skipped(SkipReason::Declined { residual }));
            }

            for file in &residual {
                fs::remove_file(file)?;
            }
            fs::remove_dir_all(source)?;
            info!("Residual files and {} have been deleted", source.display());
            Ok(MergeOutcome::PartiallyMerged { residual })
        }
    }
}

fn conflicting_files(conflicts: &[PathBuf]) -> io::Result<Vec<PathBuf>> {
    let mut files = Vec::new();
    for entry in conflicts {
        if entry.is_dir() {
            files.extend(find_files(entry)?);
        } else {
            files.push(entry.clone());
        }
    }
    Ok(files)
}
