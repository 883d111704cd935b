use clap::{Parser, Subcommand};
use std::path::PathBuf;

use doujin_sorter::config::{load_configuration, load_configuration_in};
use doujin_sorter::{AppConfig, Result, SyncMethod};

#[derive(Debug, Parser)]
#[command(name = "doujin-sorter")]
#[command(about = "Sort archives by artist and merge them into the collection", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Directory holding the unsorted archives (default: current directory)
    #[arg(long, global = true)]
    pub source: Option<PathBuf>,

    /// Staging tree for the letter and script buckets
    #[arg(long, global = true)]
    pub staging: Option<PathBuf>,

    /// Permanent archive the buckets are merged into
    #[arg(long, global = true)]
    pub archive: Option<PathBuf>,

    /// Skip the pause between stages
    #[arg(long, global = true)]
    pub no_pause: bool,

    /// Use rsync for the merge transfer
    #[arg(long, global = true)]
    pub rsync: bool,

    /// Answer yes to every question
    #[arg(short, long, global = true)]
    pub yes: bool,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Group, bucket, then offer to merge (the default)
    Run,
    /// Move archives into per-artist directories
    Group,
    /// Move artist directories into the staging buckets
    Bucket,
    /// Merge the staging buckets into the archive
    Merge,
    /// Print configuration values
    PrintConfig,
}

impl Cli {
    /// Configuration from `Config.toml`/environment with command-line overrides on top.
    pub fn resolve_config(&self) -> Result<AppConfig> {
        let mut config = match &self.source {
            Some(source) => load_configuration_in(source)?,
            None => load_configuration()?,
        };

        if let Some(staging) = &self.staging {
            config.staging_root = config.resolve_path(staging);
        }
        if let Some(archive) = &self.archive {
            config.archive_root = config.resolve_path(archive);
        }
        if self.no_pause {
            config.pause_ms = 0;
        }
        if self.rsync {
            config.sync_method = SyncMethod::Rsync;
        }
        Ok(config)
    }
}
