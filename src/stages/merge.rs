use std::ffi::OsString;
use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;
use std::time::Duration;
use tracing::{debug, error, info};

use crate::config::{AppConfig, SyncMethod};
use crate::error::{Error, Result};
use crate::file_proc::reconcile::{find_conflicts, settle};
use crate::file_proc::{list_children, reconcile_directory, DuplicatePolicy, MergeOutcome, SkipReason};
use crate::progress::{ProgressReporter, Stage};
use crate::utils::stats::StatsTimer;
use crate::utils::Prompter;

#[derive(Debug, Default)]
pub struct MergeReport {
    pub outcomes: Vec<(PathBuf, MergeOutcome)>,
    pub failed: Vec<(PathBuf, String)>,
    pub duration: Duration,
}

impl MergeReport {
    pub fn outcome_for(&self, path: &Path) -> Option<&MergeOutcome> {
        self.outcomes
            .iter()
            .find(|(p, _)| p == path)
            .map(|(_, outcome)| outcome)
    }
}

/// Synchronize every top-level staging directory into the archive root.
///
/// Existing archive files are never overwritten. A staging directory is
/// removed outright once nothing but non-archive leftovers remain; residual
/// archives are only deleted when `prompter` agrees.
pub fn merge_staging_into_archive(
    config: &AppConfig,
    prompter: &mut dyn Prompter,
    reporter: &dyn ProgressReporter,
) -> Result<MergeReport> {
    let mut timer = StatsTimer::new();
    let mut report = MergeReport::default();
    reporter.on_stage_start(Stage::Merge);
    info!("Now merging subdirectories into {}...", config.archive_root.display());

    fs::create_dir_all(&config.archive_root)?;

    if config.staging_root.is_dir() {
        for entry in list_children(&config.staging_root)? {
            if !entry.is_dir {
                debug!("Skipping {} since it is not a directory", entry.name());
                report
                    .outcomes
                    .push((entry.path, MergeOutcome::Skipped(SkipReason::NotADirectory)));
                continue;
            }

            reporter.on_entry(Stage::Merge, &entry.name());
            let destination = if config.keep_bucket_dirs {
                config.archive_root.join(entry.name())
            } else {
                config.archive_root.clone()
            };

            match merge_one(&entry.path, &destination, config, &mut *prompter) {
                Ok(outcome) => report.outcomes.push((entry.path, outcome)),
                Err(err) => {
                    error!("Failed to merge {}: {}", entry.path.display(), err);
                    report.failed.push((entry.path, err.to_string()));
                }
            }
        }
    }

    report.duration = timer.finish();
    reporter.on_stage_complete(Stage::Merge, report.outcomes.len(), timer.get_duration_secs());
    Ok(report)
}

fn merge_one(
    source: &Path,
    destination: &Path,
    config: &AppConfig,
    prompter: &mut dyn Prompter,
) -> Result<MergeOutcome> {
    match config.sync_method {
        SyncMethod::InProcess => {
            reconcile_directory(source, destination, config, DuplicatePolicy::Confirm(prompter))
        }
        SyncMethod::Rsync => {
            // a tree that clashes with the destination is not handed to rsync
            let conflicts = find_conflicts(source, destination)?;
            if conflicts.is_empty() {
                rsync(source, destination)?;
            }
            settle(source, config, DuplicatePolicy::Confirm(prompter), &conflicts)
        }
    }
}

/// Copy the contents of `source` into `destination` with rsync, skipping
/// existing files and removing each source file once transferred.
fn rsync(source: &Path, destination: &Path) -> Result<()> {
    fs::create_dir_all(destination)?;

    let mut from = OsString::from(source.as_os_str());
    from.push("/");
    let mut to = OsString::from(destination.as_os_str());
    to.push("/");

    let mut command = Command::new("rsync");
    command
        .args(["-aL", "--ignore-existing", "--remove-source-files"])
        .arg(&from)
        .arg(&to);
    debug!("Running the following rsync command: {:?}", command);

    let status = command
        .status()
        .map_err(|e| Error::Sync(format!("failed to start rsync: {}", e)))?;
    if !status.success() {
        return Err(Error::Sync(format!(
            "rsync exited with {} for {}",
            status,
            source.display()
        )));
    }
    Ok(())
}
