use std::collections::BTreeMap;
use std::fs;
use std::path::Path;
use std::process::Command;
use tempfile::tempdir;

use doujin_sorter::stages::{
    bucket_artist_directories, group_by_artist, merge_staging_into_archive, PlacementKind,
};
use doujin_sorter::utils::ScriptedPrompter;
use doujin_sorter::{
    AppConfig, Error, MergeOutcome, Pipeline, SilentReporter, SkipReason, SyncMethod,
};

/// Layout:
///   collection/
///     incoming/          <- source root
///     Doujins by Author/ <- archive root
fn test_config(root: &Path) -> AppConfig {
    let source = root.join("incoming");
    fs::create_dir_all(&source).unwrap();
    let mut config = AppConfig::for_root(&source);
    config.pause_ms = 0;
    config
}

fn touch(path: &Path, content: &str) {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).unwrap();
    }
    fs::write(path, content).unwrap();
}

fn dir_names(dir: &Path) -> Vec<String> {
    let mut names: Vec<String> = fs::read_dir(dir)
        .unwrap()
        .flatten()
        .map(|e| e.file_name().to_string_lossy().into_owned())
        .collect();
    names.sort();
    names
}

fn rsync_available() -> bool {
    Command::new("rsync")
        .arg("--version")
        .output()
        .map(|output| output.status.success())
        .unwrap_or(false)
}

#[test]
fn test_grouping_creates_artist_directory() {
    let tmp = tempdir().unwrap();
    let config = test_config(tmp.path());
    let name = "(ConventionX) [Circle (John Doe)] My Doujin.zip";
    touch(&config.source_root.join(name), "pages");

    let report = group_by_artist(&config, &SilentReporter).unwrap();

    assert_eq!(report.grouped.len(), 1);
    assert_eq!(report.grouped[0].artist, "John Doe");
    assert!(config.source_root.join("John Doe").join(name).is_file());
    assert!(!config.source_root.join(name).exists());
}

#[test]
fn test_grouping_skips_unaccepted_and_keeps_directories() {
    let tmp = tempdir().unwrap();
    let config = test_config(tmp.path());
    touch(&config.source_root.join("[Artist] Title.pdf"), "x");
    touch(&config.source_root.join("Existing").join("[Other] Book.zip"), "y");
    touch(&config.source_root.join("[Studio XYZ (Alice, Bob)] Title.cbz"), "z");

    let report = group_by_artist(&config, &SilentReporter).unwrap();

    assert_eq!(report.skipped, vec![config.source_root.join("[Artist] Title.pdf")]);
    assert!(config.source_root.join("[Artist] Title.pdf").is_file());
    assert!(config.source_root.join("Existing").join("[Other] Book.zip").is_file());
    assert!(config
        .source_root
        .join("Studio Xyz")
        .join("[Studio XYZ (Alice, Bob)] Title.cbz")
        .is_file());
}

#[test]
fn test_grouping_writes_audit_log() {
    let tmp = tempdir().unwrap();
    let config = test_config(tmp.path());
    touch(&config.source_root.join("[Artist] Title.zip"), "a");
    touch(&config.source_root.join("untitled.rar"), "b");
    fs::write(config.audit_log_path(), "stale contents").unwrap();

    group_by_artist(&config, &SilentReporter).unwrap();

    let log = fs::read_to_string(config.audit_log_path()).unwrap();
    assert!(!log.contains("stale contents"));
    assert!(log.contains("Filename: \"[Artist] Title.zip\"\nArtist Name: Artist\n"));
    assert!(log.contains("Filename: \"untitled.rar\"\nArtist Name: Unknown Artist\n"));
    assert!(config.source_root.join("Unknown Artist").join("untitled.rar").is_file());
}

#[test]
fn test_grouping_is_idempotent() {
    let tmp = tempdir().unwrap();
    let config = test_config(tmp.path());
    touch(&config.source_root.join("[Alpha] One.zip"), "1");
    touch(&config.source_root.join("[Beta] Two.zip"), "2");

    let first = group_by_artist(&config, &SilentReporter).unwrap();
    assert_eq!(first.grouped.len(), 2);

    let second = group_by_artist(&config, &SilentReporter).unwrap();
    assert!(second.grouped.is_empty());
    assert!(second.failed.is_empty());
    assert!(config.source_root.join("Alpha").join("[Alpha] One.zip").is_file());
}

#[test]
fn test_grouping_failure_is_per_entry() {
    let tmp = tempdir().unwrap();
    let config = test_config(tmp.path());
    // a file squatting on the artist directory name
    touch(&config.source_root.join("Blocked"), "not a directory");
    touch(&config.source_root.join("[Blocked] Title.zip"), "b");
    touch(&config.source_root.join("[Free] Title.zip"), "f");

    let report = group_by_artist(&config, &SilentReporter).unwrap();

    assert_eq!(report.failed.len(), 1);
    assert!(config.source_root.join("[Blocked] Title.zip").is_file());
    assert!(config.source_root.join("Free").join("[Free] Title.zip").is_file());
}

#[test]
fn test_bucketing_han_name_lands_in_japanese_and_chinese() {
    let tmp = tempdir().unwrap();
    let config = test_config(tmp.path());
    touch(&config.source_root.join("葵").join("book.zip"), "aoi");

    let report = bucket_artist_directories(&config, &SilentReporter).unwrap();

    assert!(config.staging_root.join("[Japanese]").join("葵").join("book.zip").is_file());
    assert!(config.staging_root.join("[Chinese]").join("葵").join("book.zip").is_file());
    assert!(!config.source_root.join("葵").exists());
    assert_eq!(dir_names(&config.staging_root), vec!["[Chinese]", "[Japanese]"]);
    assert_eq!(report.placements.len(), 2);
    assert_eq!(report.placements[0].kind, PlacementKind::Copied);
    assert_eq!(
        report.placements[1].kind,
        PlacementKind::Moved(MergeOutcome::FullyMerged)
    );
}

#[test]
fn test_bucketing_letter_and_unknown_buckets() {
    let tmp = tempdir().unwrap();
    let config = test_config(tmp.path());
    touch(&config.source_root.join("Charlie").join("a.zip"), "a");
    touch(&config.source_root.join("alice").join("b.zip"), "b");
    touch(&config.source_root.join("Привет").join("c.zip"), "c");
    touch(&config.source_root.join("김철수").join("d.zip"), "d");
    touch(&config.source_root.join("loose.zip"), "stays");

    let report = bucket_artist_directories(&config, &SilentReporter).unwrap();

    assert!(report.failed.is_empty());
    assert!(config.staging_root.join("C").join("Charlie").join("a.zip").is_file());
    assert!(config.staging_root.join("A").join("alice").join("b.zip").is_file());
    assert!(config.staging_root.join("[Unknown]").join("Привет").join("c.zip").is_file());
    assert!(config.staging_root.join("[Korean]").join("김철수").join("d.zip").is_file());
    assert!(config.source_root.join("loose.zip").is_file());
    assert_eq!(dir_names(&config.source_root), vec!["dummy_directory", "loose.zip"]);
}

#[test]
fn test_bucketing_merges_into_existing_bucket() {
    let tmp = tempdir().unwrap();
    let config = test_config(tmp.path());
    touch(&config.staging_root.join("C").join("Charlie").join("old.zip"), "staged");
    touch(&config.source_root.join("Charlie").join("old.zip"), "incoming copy");
    touch(&config.source_root.join("Charlie").join("new.zip"), "new");

    bucket_artist_directories(&config, &SilentReporter).unwrap();

    let staged = config.staging_root.join("C").join("Charlie");
    assert_eq!(fs::read_to_string(staged.join("old.zip")).unwrap(), "staged");
    assert!(staged.join("new.zip").is_file());
    assert!(!config.source_root.join("Charlie").exists());
}

#[test]
fn test_bucketing_is_deterministic() {
    let names = ["Charlie", "alice", "Bob", "葵", "さくら", "김철수", "Ωmega"];

    let layout = |names: &[&str]| -> BTreeMap<String, Vec<String>> {
        let tmp = tempdir().unwrap();
        let config = test_config(tmp.path());
        for name in names {
            touch(&config.source_root.join(name).join("x.zip"), "x");
        }
        bucket_artist_directories(&config, &SilentReporter).unwrap();
        let buckets: BTreeMap<String, Vec<String>> = dir_names(&config.staging_root)
            .into_iter()
            .map(|bucket| {
                let members = dir_names(&config.staging_root.join(&bucket));
                (bucket, members)
            })
            .collect();
        buckets
    };

    let first = layout(&names);
    let second = layout(&names);
    assert_eq!(first, second);
    assert_eq!(first["[Japanese]"], vec!["さくら", "葵"]);
    assert_eq!(first["[Chinese]"], vec!["葵"]);
    assert_eq!(first["[Unknown]"], vec!["Ωmega"]);
    assert_eq!(first["B"], vec!["Bob"]);
}

#[test]
fn test_bucketing_failure_is_per_entry() {
    let tmp = tempdir().unwrap();
    let config = test_config(tmp.path());
    // a file squatting on the "C" bucket
    touch(&config.staging_root.join("C"), "not a bucket");
    touch(&config.source_root.join("Charlie").join("c.zip"), "c");
    touch(&config.source_root.join("Dana").join("d.zip"), "d");

    let report = bucket_artist_directories(&config, &SilentReporter).unwrap();

    assert_eq!(report.failed.len(), 1);
    assert_eq!(report.failed[0].0, config.source_root.join("Charlie"));
    assert!(config.source_root.join("Charlie").join("c.zip").is_file());
    assert!(config.staging_root.join("D").join("Dana").join("d.zip").is_file());
    assert_eq!(report.placements.len(), 1);
}

#[test]
fn test_bucketing_keeps_file_facing_staged_directory() {
    let tmp = tempdir().unwrap();
    let config = test_config(tmp.path());
    fs::create_dir_all(config.staging_root.join("C").join("Charlie").join("extra.zip")).unwrap();
    touch(&config.source_root.join("Charlie").join("extra.zip"), "unique");

    let report = bucket_artist_directories(&config, &SilentReporter).unwrap();

    assert_eq!(
        report.placements[0].kind,
        PlacementKind::Moved(MergeOutcome::Skipped(SkipReason::Conflicting {
            residual: vec![config.source_root.join("Charlie").join("extra.zip")]
        }))
    );
    assert_eq!(
        fs::read_to_string(config.source_root.join("Charlie").join("extra.zip")).unwrap(),
        "unique"
    );
}

#[test]
fn test_bucketing_rerun_only_does_remaining_work() {
    let tmp = tempdir().unwrap();
    let config = test_config(tmp.path());
    touch(&config.source_root.join("Charlie").join("a.zip"), "a");
    touch(&config.source_root.join("葵").join("b.zip"), "b");

    bucket_artist_directories(&config, &SilentReporter).unwrap();
    let layout = dir_names(&config.staging_root);

    let second = bucket_artist_directories(&config, &SilentReporter).unwrap();
    assert!(second.placements.is_empty());
    assert!(second.failed.is_empty());
    assert_eq!(dir_names(&config.staging_root), layout);
    assert!(config.staging_root.join("C").join("Charlie").join("a.zip").is_file());
}

#[test]
fn test_bucketing_fails_when_staging_root_cannot_be_created() {
    let tmp = tempdir().unwrap();
    let mut config = test_config(tmp.path());
    let blocker = tmp.path().join("blocker");
    touch(&blocker, "a file");
    config.staging_root = blocker.join("stage");
    touch(&config.source_root.join("Charlie").join("a.zip"), "a");

    let result = bucket_artist_directories(&config, &SilentReporter);

    assert!(matches!(result, Err(Error::StagingRoot { .. })));
    assert!(config.source_root.join("Charlie").join("a.zip").is_file());
}

#[test]
fn test_merge_clean_directory_is_fully_merged_without_prompt() {
    let tmp = tempdir().unwrap();
    let config = test_config(tmp.path());
    touch(&config.staging_root.join("D").join("Dana").join("one.zip"), "1");

    let mut prompter = ScriptedPrompter::default();
    let report = merge_staging_into_archive(&config, &mut prompter, &SilentReporter).unwrap();

    let bucket = config.staging_root.join("D");
    assert_eq!(report.outcome_for(&bucket), Some(&MergeOutcome::FullyMerged));
    assert!(prompter.asked.is_empty());
    assert!(!bucket.exists());
    assert!(config.archive_root.join("Dana").join("one.zip").is_file());
}

#[test]
fn test_merge_residual_duplicate_requires_confirmation() {
    let tmp = tempdir().unwrap();
    let config = test_config(tmp.path());
    touch(&config.archive_root.join("Charlie").join("page1.zip"), "archived");
    let staged = config.staging_root.join("C").join("Charlie");
    touch(&staged.join("page1.zip"), "staged duplicate");
    touch(&staged.join("page2.zip"), "new");

    let mut prompter = ScriptedPrompter::new([false]);
    let report = merge_staging_into_archive(&config, &mut prompter, &SilentReporter).unwrap();

    let bucket = config.staging_root.join("C");
    assert_eq!(
        report.outcome_for(&bucket),
        Some(&MergeOutcome::Skipped(SkipReason::Declined {
            residual: vec![staged.join("page1.zip")]
        }))
    );
    assert_eq!(prompter.asked.len(), 1);
    assert!(config.archive_root.join("Charlie").join("page2.zip").is_file());
    assert_eq!(
        fs::read_to_string(config.archive_root.join("Charlie").join("page1.zip")).unwrap(),
        "archived"
    );
    assert!(staged.join("page1.zip").is_file());
    assert!(!staged.join("page2.zip").exists());

    // second pass, this time the operator agrees
    let mut prompter = ScriptedPrompter::new([true]);
    let report = merge_staging_into_archive(&config, &mut prompter, &SilentReporter).unwrap();
    assert_eq!(
        report.outcome_for(&bucket),
        Some(&MergeOutcome::PartiallyMerged {
            residual: vec![staged.join("page1.zip")]
        })
    );
    assert!(!bucket.exists());
    assert_eq!(
        fs::read_to_string(config.archive_root.join("Charlie").join("page1.zip")).unwrap(),
        "archived"
    );
}

#[test]
fn test_merge_skips_stray_files_in_staging_root() {
    let tmp = tempdir().unwrap();
    let config = test_config(tmp.path());
    touch(&config.staging_root.join("stray.zip"), "s");

    let mut prompter = ScriptedPrompter::default();
    let report = merge_staging_into_archive(&config, &mut prompter, &SilentReporter).unwrap();

    assert_eq!(
        report.outcome_for(&config.staging_root.join("stray.zip")),
        Some(&MergeOutcome::Skipped(SkipReason::NotADirectory))
    );
    assert!(config.staging_root.join("stray.zip").is_file());
}

#[test]
fn test_merge_can_keep_bucket_directories() {
    let tmp = tempdir().unwrap();
    let mut config = test_config(tmp.path());
    config.keep_bucket_dirs = true;
    touch(&config.staging_root.join("E").join("Eve").join("e.zip"), "e");

    let mut prompter = ScriptedPrompter::default();
    merge_staging_into_archive(&config, &mut prompter, &SilentReporter).unwrap();

    assert!(config.archive_root.join("E").join("Eve").join("e.zip").is_file());
    assert!(!config.staging_root.join("E").exists());
}

#[test]
fn test_merge_never_deletes_entries_clashing_with_archive() {
    let tmp = tempdir().unwrap();
    let config = test_config(tmp.path());
    touch(&config.archive_root.join("Alice"), "a file, not an artist directory");
    let staged = config.staging_root.join("A").join("Alice").join("never_archived.zip");
    touch(&staged, "only copy");

    let mut prompter = ScriptedPrompter::new([true]);
    let report = merge_staging_into_archive(&config, &mut prompter, &SilentReporter).unwrap();

    assert_eq!(
        report.outcome_for(&config.staging_root.join("A")),
        Some(&MergeOutcome::Skipped(SkipReason::Conflicting {
            residual: vec![staged.clone()]
        }))
    );
    assert!(prompter.asked.is_empty());
    assert_eq!(fs::read_to_string(&staged).unwrap(), "only copy");
}

#[test]
fn test_merge_rerun_on_merged_tree_is_a_no_op() {
    let tmp = tempdir().unwrap();
    let config = test_config(tmp.path());
    touch(&config.staging_root.join("D").join("Dana").join("one.zip"), "1");

    let mut prompter = ScriptedPrompter::default();
    merge_staging_into_archive(&config, &mut prompter, &SilentReporter).unwrap();
    let second = merge_staging_into_archive(&config, &mut prompter, &SilentReporter).unwrap();

    assert!(second.outcomes.is_empty());
    assert!(second.failed.is_empty());
    assert!(prompter.asked.is_empty());
    assert_eq!(dir_names(&config.archive_root), vec!["Dana"]);
    assert!(config.archive_root.join("Dana").join("one.zip").is_file());
}

#[test]
fn test_merge_with_rsync() {
    if !rsync_available() {
        eprintln!("rsync not found, skipping");
        return;
    }

    let tmp = tempdir().unwrap();
    let mut config = test_config(tmp.path());
    config.sync_method = SyncMethod::Rsync;
    touch(&config.archive_root.join("Charlie").join("page1.zip"), "archived");
    let staged = config.staging_root.join("C").join("Charlie");
    touch(&staged.join("page1.zip"), "staged duplicate");
    touch(&staged.join("page2.zip"), "new");

    let mut prompter = ScriptedPrompter::new([true]);
    let report = merge_staging_into_archive(&config, &mut prompter, &SilentReporter).unwrap();

    let bucket = config.staging_root.join("C");
    assert!(report.failed.is_empty());
    assert_eq!(
        report.outcome_for(&bucket),
        Some(&MergeOutcome::PartiallyMerged {
            residual: vec![staged.join("page1.zip")]
        })
    );
    assert_eq!(prompter.asked.len(), 1);
    assert_eq!(
        fs::read_to_string(config.archive_root.join("Charlie").join("page1.zip")).unwrap(),
        "archived"
    );
    assert_eq!(
        fs::read_to_string(config.archive_root.join("Charlie").join("page2.zip")).unwrap(),
        "new"
    );
    assert!(!bucket.exists());
}

#[test]
fn test_full_pipeline() {
    let tmp = tempdir().unwrap();
    let config = test_config(tmp.path());
    touch(&config.source_root.join("(C100) [Circle (John Doe)] Story.zip"), "jd");
    touch(&config.source_root.join("[葵] Book.zip"), "aoi");
    touch(&config.source_root.join("[Charlie] page1.zip"), "dup");
    touch(&config.archive_root.join("Charlie").join("[Charlie] page1.zip"), "archived");
    touch(&config.source_root.join("readme.txt"), "ignored");

    // merge? yes; residual duplicate in C? yes; the copy of 葵 already merged
    // from [Chinese] shows up as a residual of [Japanese]? yes
    let mut prompter = ScriptedPrompter::new([true, true, true]);
    let report = Pipeline::new(config.clone())
        .run(&mut prompter, &SilentReporter)
        .unwrap();

    assert_eq!(report.grouping.grouped.len(), 3);
    let merge = report.merge.expect("merge should have run");
    assert!(merge.failed.is_empty());
    assert_eq!(prompter.asked.len(), 3);

    let archive = &config.archive_root;
    assert!(archive.join("John Doe").join("(C100) [Circle (John Doe)] Story.zip").is_file());
    assert!(archive.join("葵").join("[葵] Book.zip").is_file());
    assert_eq!(
        fs::read_to_string(archive.join("Charlie").join("[Charlie] page1.zip")).unwrap(),
        "archived"
    );
    assert!(dir_names(&config.staging_root).is_empty());
    assert!(config.source_root.join("readme.txt").is_file());
}

#[test]
fn test_pipeline_declining_merge_leaves_staging_tree() {
    let tmp = tempdir().unwrap();
    let config = test_config(tmp.path());
    touch(&config.source_root.join("[Zed] Z.zip"), "z");

    let mut prompter = ScriptedPrompter::new([false]);
    let report = Pipeline::new(config.clone())
        .run(&mut prompter, &SilentReporter)
        .unwrap();

    assert!(report.merge.is_none());
    assert!(config.staging_root.join("Z").join("Zed").join("[Zed] Z.zip").is_file());
    assert!(!config.archive_root.exists());
}
