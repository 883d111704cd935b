use tracing::{debug, info};

use crate::config::AppConfig;
use crate::error::{Error, Result};
use crate::progress::ProgressReporter;
use crate::stages::{
    bucket_artist_directories, group_by_artist, merge_staging_into_archive, BucketingReport,
    GroupingReport, MergeReport,
};
use crate::utils::{pace, Prompter};

pub struct Pipeline {
    config: AppConfig,
}

#[derive(Debug)]
pub struct PipelineReport {
    pub grouping: GroupingReport,
    pub bucketing: BucketingReport,
    /// `None` when the operator chose not to merge.
    pub merge: Option<MergeReport>,
}

impl Pipeline {
    pub fn new(config: AppConfig) -> Self {
        Self { config }
    }

    /// Run the full reorganization:
    /// 1. Group archives into per-artist directories
    /// 2. Route artist directories into the staging buckets
    /// 3. Ask, then merge the staging tree into the archive
    pub fn run(
        &self,
        prompter: &mut dyn Prompter,
        reporter: &dyn ProgressReporter,
    ) -> Result<PipelineReport> {
        debug!("Pipeline config: {:?}", self.config);

        pace(self.config.pause());
        let grouping = group_by_artist(&self.config, reporter)?;

        pace(self.config.pause());
        let bucketing = bucket_artist_directories(&self.config, reporter)?;

        let question = format!(
            "Do you want to merge the subdirectories into {}?",
            self.config.archive_root.display()
        );
        let merge = if prompter.confirm(&question).map_err(Error::Prompt)? {
            pace(self.config.pause());
            Some(merge_staging_into_archive(&self.config, prompter, reporter)?)
        } else {
            info!("Merge skipped");
            None
        };

        Ok(PipelineReport {
            grouping,
            bucketing,
            merge,
        })
    }
}
