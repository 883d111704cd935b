use std::io;
use std::path::PathBuf;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    #[error("Configuration error: {0}")]
    Config(#[from] config::ConfigError),

    #[error("Cannot read source root {}: {source}", path.display())]
    SourceRoot { path: PathBuf, source: io::Error },

    #[error("Cannot create staging root {}: {source}", path.display())]
    StagingRoot { path: PathBuf, source: io::Error },

    #[error("Destination {} is occupied by a non-directory", .0.display())]
    DestinationOccupied(PathBuf),

    #[error("Sync error: {0}")]
    Sync(String),

    #[error("Prompt error: {0}")]
    Prompt(io::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
