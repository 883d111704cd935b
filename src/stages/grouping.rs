use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{debug, error, info};

use crate::config::AppConfig;
use crate::error::{Error, Result};
use crate::file_proc::{list_children, move_entry};
use crate::parser::{capitalize_words, resolve_artist_name, UNKNOWN_ARTIST};
use crate::progress::{ProgressReporter, Stage};
use crate::utils::path::{file_name_string, file_stem_string};
use crate::utils::stats::StatsTimer;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GroupedFile {
    pub file_name: String,
    pub artist: String,
}

#[derive(Debug, Default)]
pub struct GroupingReport {
    pub grouped: Vec<GroupedFile>,
    pub skipped: Vec<PathBuf>,
    pub failed: Vec<(PathBuf, String)>,
    pub duration: Duration,
}

/// Move every accepted archive in the source root into a sibling directory
/// named after its artist, recording each decision in the audit log.
///
/// Directories already in the source root are left alone. A failed move is
/// reported and the scan carries on.
pub fn group_by_artist(config: &AppConfig, reporter: &dyn ProgressReporter) -> Result<GroupingReport> {
    let mut timer = StatsTimer::new();
    let mut report = GroupingReport::default();
    reporter.on_stage_start(Stage::Grouping);

    let children = list_children(&config.source_root)?;
    let mut audit_log = BufWriter::new(File::create(config.audit_log_path())?);

    for entry in children {
        if entry.is_dir {
            continue;
        }

        let file_name = entry.name();
        if !config.is_accepted(&entry.path) {
            info!("SKIPPING {}...", file_name);
            report.skipped.push(entry.path);
            continue;
        }

        let artist = directory_name(&resolve_artist_name(&file_stem_string(&entry.path)));
        reporter.on_entry(Stage::Grouping, &file_name);
        info!("Placing {} into {}/ ...", file_name, artist);

        match place_in_artist_dir(&entry.path, &config.source_root.join(&artist)) {
            Ok(()) => {
                writeln!(audit_log, "Filename: \"{}\"", file_name)?;
                writeln!(audit_log, "Artist Name: {}", artist)?;
                writeln!(audit_log)?;
                report.grouped.push(GroupedFile { file_name, artist });
            }
            Err(err) => {
                error!("Failed to move {}: {}", entry.path.display(), err);
                report.failed.push((entry.path, err.to_string()));
            }
        }
    }

    audit_log.flush()?;

    report.duration = timer.finish();
    reporter.on_stage_complete(Stage::Grouping, report.grouped.len(), timer.get_duration_secs());
    debug!(
        "Grouping: {} grouped, {} skipped, {} failed",
        report.grouped.len(),
        report.skipped.len(),
        report.failed.len()
    );
    Ok(report)
}

fn place_in_artist_dir(file: &Path, artist_dir: &Path) -> Result<()> {
    if artist_dir.exists() && !artist_dir.is_dir() {
        return Err(Error::DestinationOccupied(artist_dir.to_path_buf()));
    }
    fs::create_dir_all(artist_dir)?;
    move_entry(file, &artist_dir.join(file_name_string(file)))?;
    Ok(())
}

/// Keep the artist name a single, real path component.
fn directory_name(artist: &str) -> String {
    let name = artist.replace(&['/', '\\'][..], "_");
    match name.as_str() {
        "." | ".." => capitalize_words(&UNKNOWN_ARTIST.to_lowercase()),
        _ => name,
    }
}
