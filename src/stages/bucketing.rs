use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{debug, error, info};

use crate::config::AppConfig;
use crate::error::{Error, Result};
use crate::file_proc::{copy_tree_missing, list_children, reconcile_directory, DuplicatePolicy, MergeOutcome};
use crate::progress::{ProgressReporter, Stage};
use crate::script::{is_latin1, scripts_of, UNKNOWN_BUCKET};
use crate::utils::stats::StatsTimer;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PlacementKind {
    /// Content copied; the directory also matched a later bucket.
    Copied,
    Moved(MergeOutcome),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Placement {
    pub directory: String,
    pub bucket: String,
    pub kind: PlacementKind,
}

#[derive(Debug, Default)]
pub struct BucketingReport {
    pub placements: Vec<Placement>,
    pub failed: Vec<(PathBuf, String)>,
    pub duration: Duration,
}

/// Buckets an artist directory belongs to.
///
/// Eastern-script names go to every matching language bucket and never to a
/// letter bucket. Other names outside Latin-1 go to `[Unknown]`; the rest go
/// to the upper-cased first character.
pub fn bucket_names(directory_name: &str) -> Vec<String> {
    let scripts = scripts_of(directory_name);
    if !scripts.is_empty() {
        return scripts.iter().map(|s| s.bucket_name().to_string()).collect();
    }

    if !is_latin1(directory_name) {
        return vec![UNKNOWN_BUCKET.to_string()];
    }

    match directory_name.chars().next() {
        Some(first) => vec![first.to_uppercase().collect()],
        None => vec![UNKNOWN_BUCKET.to_string()],
    }
}

/// Route every artist directory of the source root into the staging tree.
///
/// Fails only when the staging root cannot be created or the source root
/// cannot be read; a directory that cannot be placed is reported and skipped.
pub fn bucket_artist_directories(
    config: &AppConfig,
    reporter: &dyn ProgressReporter,
) -> Result<BucketingReport> {
    let mut timer = StatsTimer::new();
    let mut report = BucketingReport::default();
    reporter.on_stage_start(Stage::Bucketing);

    fs::create_dir_all(&config.staging_root).map_err(|source| Error::StagingRoot {
        path: config.staging_root.clone(),
        source,
    })?;

    let reserved = [&config.staging_root, &config.archive_root];
    for entry in list_children(&config.source_root)? {
        if !entry.is_dir || reserved.iter().any(|r| same_path(&entry.path, r)) {
            continue;
        }

        let name = entry.name();
        reporter.on_entry(Stage::Bucketing, &name);
        debug!("Testing {}", entry.path.display());

        let buckets = bucket_names(&name);
        let last = buckets.len() - 1;
        for (i, bucket) in buckets.iter().enumerate() {
            let destination = config.staging_root.join(bucket).join(&name);
            info!("Moving {} to {}...", name, config.staging_root.join(bucket).display());

            let placed = if i < last {
                copy_into_bucket(&entry.path, &destination)
            } else {
                reconcile_directory(&entry.path, &destination, config, DuplicatePolicy::DeleteSource)
                    .map(PlacementKind::Moved)
            };

            match placed {
                Ok(kind) => report.placements.push(Placement {
                    directory: name.clone(),
                    bucket: bucket.clone(),
                    kind,
                }),
                Err(err) => {
                    error!("Failed to place {} into {}: {}", entry.path.display(), bucket, err);
                    report.failed.push((entry.path.clone(), err.to_string()));
                }
            }
        }
    }

    report.duration = timer.finish();
    reporter.on_stage_complete(Stage::Bucketing, report.placements.len(), timer.get_duration_secs());
    Ok(report)
}

fn copy_into_bucket(source: &Path, destination: &Path) -> Result<PlacementKind> {
    if destination.exists() && !destination.is_dir() {
        return Err(Error::DestinationOccupied(destination.to_path_buf()));
    }
    fs::create_dir_all(destination)?;
    let copied = copy_tree_missing(source, destination)?;
    debug!("Copied {} files into {}", copied, destination.display());
    Ok(PlacementKind::Copied)
}

fn same_path(a: &Path, b: &Path) -> bool {
    match (fs::canonicalize(a), fs::canonicalize(b)) {
        (Ok(a), Ok(b)) => a == b,
        _ => a == b,
    }
}
