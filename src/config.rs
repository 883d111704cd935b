use config::{Config, Environment, File as ConfigFile};
use serde::Deserialize;
use std::env;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::error::Result;

pub const DEFAULT_ACCEPTED_FORMATS: [&str; 3] = [".zip", ".rar", ".cbz"];
pub const DEFAULT_STAGING_DIR: &str = "dummy_directory";
pub const DEFAULT_ARCHIVE_DIR: &str = "Doujins by Author";
pub const DEFAULT_AUDIT_LOG: &str = "output.txt";
const DEFAULT_PAUSE_MS: u64 = 1000;

/// How the merge stage moves files into the archive.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SyncMethod {
    #[default]
    InProcess,
    Rsync,
}

/// Values as read from `Config.toml` and `DOUJIN_*` variables; every key is optional.
#[derive(Debug, Default, Deserialize)]
struct RawConfig {
    source_root: Option<PathBuf>,
    staging_root: Option<PathBuf>,
    archive_root: Option<PathBuf>,
    accepted_formats: Option<Vec<String>>,
    audit_log: Option<String>,
    pause_ms: Option<u64>,
    sync_method: Option<SyncMethod>,
    keep_bucket_dirs: Option<bool>,
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub source_root: PathBuf,
    pub staging_root: PathBuf,
    pub archive_root: PathBuf,
    pub accepted_formats: Vec<String>,
    pub audit_log: String,
    pub pause_ms: u64,
    pub sync_method: SyncMethod,
    pub keep_bucket_dirs: bool,
}

impl AppConfig {
    /// Default layout rooted at `source_root`: staging inside it, archive beside it.
    pub fn for_root(source_root: impl Into<PathBuf>) -> Self {
        let source_root = source_root.into();
        let archive_parent = source_root
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_else(|| source_root.clone());
        Self {
            staging_root: source_root.join(DEFAULT_STAGING_DIR),
            archive_root: archive_parent.join(DEFAULT_ARCHIVE_DIR),
            accepted_formats: DEFAULT_ACCEPTED_FORMATS.iter().map(|s| s.to_string()).collect(),
            audit_log: DEFAULT_AUDIT_LOG.to_string(),
            pause_ms: DEFAULT_PAUSE_MS,
            sync_method: SyncMethod::default(),
            keep_bucket_dirs: false,
            source_root,
        }
    }

    pub fn with_accepted_formats<I, S>(mut self, formats: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.accepted_formats = formats
            .into_iter()
            .map(|f| normalize_format(f.as_ref()))
            .collect();
        self
    }

    /// True when the file's extension is one of the accepted archive formats.
    pub fn is_accepted(&self, path: &Path) -> bool {
        match path.extension().and_then(|e| e.to_str()) {
            Some(ext) => {
                let ext = format!(".{}", ext.to_lowercase());
                self.accepted_formats.iter().any(|f| *f == ext)
            }
            None => false,
        }
    }

    pub fn audit_log_path(&self) -> PathBuf {
        self.source_root.join(&self.audit_log)
    }

    pub fn pause(&self) -> Duration {
        Duration::from_millis(self.pause_ms)
    }

    /// `path` as given when absolute, otherwise relative to the source root.
    pub fn resolve_path(&self, path: impl Into<PathBuf>) -> PathBuf {
        resolve(&self.source_root, path.into())
    }

    fn apply(mut self, raw: RawConfig) -> Self {
        if let Some(staging_root) = raw.staging_root {
            self.staging_root = resolve(&self.source_root, staging_root);
        }
        if let Some(archive_root) = raw.archive_root {
            self.archive_root = resolve(&self.source_root, archive_root);
        }
        if let Some(formats) = raw.accepted_formats {
            self = self.with_accepted_formats(formats);
        }
        if let Some(audit_log) = raw.audit_log {
            self.audit_log = audit_log;
        }
        if let Some(pause_ms) = raw.pause_ms {
            self.pause_ms = pause_ms;
        }
        if let Some(sync_method) = raw.sync_method {
            self.sync_method = sync_method;
        }
        if let Some(keep_bucket_dirs) = raw.keep_bucket_dirs {
            self.keep_bucket_dirs = keep_bucket_dirs;
        }
        self
    }
}

/// Load `Config.toml` (optional) and `DOUJIN_*` overrides from the current directory.
pub fn load_configuration() -> Result<AppConfig> {
    let cwd = env::current_dir()?;
    load_configuration_in(&cwd)
}

pub fn load_configuration_in(dir: &Path) -> Result<AppConfig> {
    let builder = Config::builder()
        .add_source(ConfigFile::from(dir.join("Config")).required(false))
        .add_source(
            Environment::with_prefix("DOUJIN")
                .try_parsing(true)
                .list_separator(",")
                .with_list_parse_key("accepted_formats"),
        )
        .build()?;
    let raw = builder.try_deserialize::<RawConfig>()?;

    let source_root = match &raw.source_root {
        Some(root) => resolve(dir, root.clone()),
        None => dir.to_path_buf(),
    };

    Ok(AppConfig::for_root(source_root).apply(raw))
}

fn resolve(base: &Path, path: PathBuf) -> PathBuf {
    if path.is_absolute() {
        path
    } else {
        base.join(path)
    }
}

fn normalize_format(format: &str) -> String {
    let format = format.trim().to_lowercase();
    if format.starts_with('.') {
        format
    } else {
        format!(".{}", format)
    }
}
