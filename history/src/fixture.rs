use std::path::Path;

use serde::Deserialize;
use serde::Serialize;
use serde::de::DeserializeOwned;
use strum_macros::Display;
use strum_macros::EnumString;
use tokio::fs;

use crate::HistoryError;
use crate::HistoryResult;

/// Which history screen a fixture file feeds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display, EnumString)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum HistoryKind {
    Snapshot,
    Web3,
}

/// Read a JSON array of records from `path`.
pub async fn load_fixture<R: DeserializeOwned>(path: &Path) -> HistoryResult<Vec<R>> {
    let contents = fs::read_to_string(path)
        .await
        .map_err(|source| HistoryError::ReadFixture {
            path: path.to_path_buf(),
            source,
        })?;
    let records: Vec<R> =
        serde_json::from_str(&contents).map_err(|source| HistoryError::ParseFixture {
            path: path.to_path_buf(),
            source,
        })?;
    tracing::info!("loaded {} records from {}", records.len(), path.display());
    Ok(records)
}
