use std::path::PathBuf;

use thiserror::Error;

pub type HistoryResult<T> = Result<T, HistoryError>;

#[derive(Error, Debug)]
pub enum HistoryError {
    #[error("failed to read fixture {}: {source}", path.display())]
    ReadFixture {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid fixture {}: {source}", path.display())]
    ParseFixture {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("duplicate record id `{0}`")]
    DuplicateId(String),
}
