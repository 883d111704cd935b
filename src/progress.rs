use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Grouping,
    Bucketing,
    Merge,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Stage::Grouping => "Organizing by artist",
            Stage::Bucketing => "Placing artist directories into buckets",
            Stage::Merge => "Merging buckets into the archive",
        };
        f.write_str(label)
    }
}

/// Trait for reporting stage progress.
///
/// The CLI implements it with indicatif spinners. All methods have default
/// no-op implementations.
pub trait ProgressReporter {
    fn on_stage_start(&self, _stage: Stage) {}
    fn on_entry(&self, _stage: Stage, _name: &str) {}
    fn on_stage_complete(&self, _stage: Stage, _entries: usize, _duration_secs: f64) {}
}

/// No-op progress reporter for silent operation.
pub struct SilentReporter;

impl ProgressReporter for SilentReporter {}
