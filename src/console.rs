use colored::*;
use indicatif::{ProgressBar, ProgressStyle};
use std::io;
use std::sync::Mutex;
use std::time::Duration;

use doujin_sorter::stages::{BucketingReport, GroupingReport, MergeReport, PlacementKind};
use doujin_sorter::utils::prompt::prompt_confirm;
use doujin_sorter::utils::Prompter;
use doujin_sorter::{MergeOutcome, ProgressReporter, SkipReason, Stage};

/// CLI progress reporter: one spinner per stage.
pub struct CliReporter {
    bar: Mutex<Option<ProgressBar>>,
}

impl CliReporter {
    pub fn new() -> Self {
        Self {
            bar: Mutex::new(None),
        }
    }

    fn set_bar(&self, pb: ProgressBar) {
        if let Ok(mut guard) = self.bar.lock() {
            if let Some(old) = guard.take() {
                old.finish_and_clear();
            }
            *guard = Some(pb);
        }
    }

    fn finish_bar(&self) {
        if let Ok(mut guard) = self.bar.lock() {
            if let Some(pb) = guard.take() {
                pb.finish_and_clear();
            }
        }
    }

    /// Run `f` with the spinner hidden, so prompts are not drawn over.
    pub fn suspend<R>(&self, f: impl FnOnce() -> R) -> R {
        let bar = self.bar.lock().ok().and_then(|guard| guard.clone());
        match bar {
            Some(pb) => pb.suspend(f),
            None => f(),
        }
    }
}

impl ProgressReporter for CliReporter {
    fn on_stage_start(&self, stage: Stage) {
        let pb = ProgressBar::new_spinner();
        if let Ok(style) = ProgressStyle::with_template("{spinner:.cyan} {msg}") {
            pb.set_style(style.tick_chars("⠋⠙⠹⠸⠼⠴⠦⠧⠇⠏"));
        }
        pb.set_message(format!("{}...", stage));
        pb.enable_steady_tick(Duration::from_millis(80));
        self.set_bar(pb);
    }

    fn on_entry(&self, stage: Stage, name: &str) {
        if let Ok(guard) = self.bar.lock() {
            if let Some(pb) = guard.as_ref() {
                pb.set_message(format!("{}... {}", stage, name));
            }
        }
    }

    fn on_stage_complete(&self, stage: Stage, entries: usize, duration_secs: f64) {
        self.finish_bar();
        eprintln!(
            "  {} {}: {} entries in {:.2}s",
            "✓".green(),
            stage,
            entries,
            duration_secs
        );
    }
}

/// Terminal prompter that hides the spinner while waiting for an answer.
pub struct ConsolePrompter<'a> {
    reporter: &'a CliReporter,
}

impl<'a> ConsolePrompter<'a> {
    pub fn new(reporter: &'a CliReporter) -> Self {
        Self { reporter }
    }
}

impl Prompter for ConsolePrompter<'_> {
    fn confirm(&mut self, question: &str) -> io::Result<bool> {
        self.reporter
            .suspend(|| prompt_confirm(&question.bold().to_string(), Some(false)))
    }
}

fn print_line() {
    println!("{}", "-".repeat(80));
}

pub fn print_grouping(report: &GroupingReport) {
    print_line();
    for grouped in &report.grouped {
        println!("{} -> {}/", grouped.file_name, grouped.artist.cyan());
    }
    for skipped in &report.skipped {
        println!("SKIPPING {}", skipped.display());
    }
    for (path, err) in &report.failed {
        println!("{}", format!("FAILED {}: {}", path.display(), err).red());
    }
    println!(
        "{} grouped, {} skipped, {} failed",
        report.grouped.len().to_string().green(),
        report.skipped.len(),
        report.failed.len().to_string().red()
    );
}

pub fn print_bucketing(report: &BucketingReport) {
    print_line();
    for placement in &report.placements {
        let how = match &placement.kind {
            PlacementKind::Copied => "copied",
            PlacementKind::Moved(MergeOutcome::FullyMerged) => "moved",
            PlacementKind::Moved(_) => "partially moved",
        };
        println!("{} {} into {}", placement.directory, how, placement.bucket.cyan());
    }
    for (path, err) in &report.failed {
        println!("{}", format!("FAILED {}: {}", path.display(), err).red());
    }
}

pub fn print_merge(report: &MergeReport) {
    print_line();
    for (path, outcome) in &report.outcomes {
        match outcome {
            MergeOutcome::FullyMerged => {
                println!("{} {}", "merged".green(), path.display())
            }
            MergeOutcome::PartiallyMerged { residual } => println!(
                "{}",
                format!(
                    "{}: {} duplicate(s) and the directory have been deleted",
                    path.display(),
                    residual.len()
                )
                .blue()
            ),
            MergeOutcome::Skipped(SkipReason::NotADirectory) => {
                println!("skipped {} (not a directory)", path.display())
            }
            MergeOutcome::Skipped(SkipReason::Declined { residual })
            | MergeOutcome::Skipped(SkipReason::Conflicting { residual }) => {
                println!("{}", format!("Unmoved archives remain in {}", path.display()).red());
                for file in residual {
                    println!("{}", format!("    * {}", file.display()).red());
                }
            }
        }
    }
    for (path, err) in &report.failed {
        println!("{}", format!("FAILED {}: {}", path.display(), err).red());
    }
    println!("Complete!");
}
