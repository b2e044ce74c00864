use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("no config file at {}; create one or pass --config", .0.display())]
    NotFound(PathBuf),
    #[error("failed to read {}: {source}", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse {}: {source}", .path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
    #[error("missing {0}; set it in the config file or the environment")]
    MissingValue(&'static str),
}

#[derive(Debug, Error)]
pub enum SyncError {
    #[error("sheet range {range} already contains data. If it's for a new sprint please clear it first using the clear operation")]
    BacklogNotEmpty { range: String },
    #[error(transparent)]
    Remote(#[from] anyhow::Error),
}
