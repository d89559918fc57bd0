use thiserror::Error;

pub type PagerResult<T> = Result<T, PagerErr>;

pub type StoreResult<T> = Result<T, StoreError>;

#[derive(Error, Debug)]
pub enum PagerErr {
    #[error("invalid pager config: {0}")]
    InvalidConfig(String),

    /// The worker task has exited, either after `shutdown` or because the
    /// handle's receiving side went away.
    #[error("pager worker is no longer running")]
    WorkerGone,

    #[error("failed to parse config {path}: {source}")]
    ConfigParse {
        path: String,
        #[source]
        source: toml::de::Error,
    },

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

/// Failure reported by a [`crate::RecordStore`]. The pager treats every
/// variant as "no records returned".
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("store unavailable: {0}")]
    Unavailable(String),

    #[error("store query failed: {0}")]
    Query(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}
