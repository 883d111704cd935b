pub mod config;
pub mod error;
pub mod file_proc;
pub mod parser;
pub mod pipeline;
pub mod progress;
pub mod script;
pub mod stages;
pub mod utils;

pub use config::{AppConfig, SyncMethod};
pub use error::{Error, Result};
pub use file_proc::{MergeOutcome, SkipReason};
pub use pipeline::{Pipeline, PipelineReport};
pub use progress::{ProgressReporter, SilentReporter, Stage};
