use std::io;
use std::path::Path;

use serde::Deserialize;
use tokio::fs;

use crate::error::PagerErr;
use crate::error::PagerResult;

pub const CONFIG_TOML_FILE: &str = "ledger.toml";

pub const DEFAULT_PAGE_SIZE: usize = 50;
pub const DEFAULT_REFILL_THRESHOLD: usize = 5;

/// Effective pager settings, fixed at construction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PagerConfig {
    /// Number of records requested per query.
    pub page_size: usize,
    /// Distance from an edge, in rows, at which the next load is triggered.
    /// Always strictly less than `page_size`.
    pub refill_threshold: usize,
}

impl Default for PagerConfig {
    fn default() -> Self {
        Self {
            page_size: DEFAULT_PAGE_SIZE,
            refill_threshold: DEFAULT_REFILL_THRESHOLD,
        }
    }
}

impl PagerConfig {
    pub fn validate(self) -> PagerResult<Self> {
        if self.page_size == 0 {
            return Err(PagerErr::InvalidConfig(
                "page_size must be greater than zero".to_string(),
            ));
        }
        if self.refill_threshold == 0 || self.refill_threshold >= self.page_size {
            return Err(PagerErr::InvalidConfig(format!(
                "refill_threshold must be in 1..{}, got {}",
                self.page_size, self.refill_threshold
            )));
        }
        Ok(self)
    }

    /// Resolve the file layer and explicit overrides into a validated config.
    pub fn load_from_toml_with_overrides(
        cfg: ConfigToml,
        overrides: ConfigOverrides,
    ) -> PagerResult<Self> {
        let pager = cfg.pager.unwrap_or_default();
        let defaults = Self::default();
        Self {
            page_size: overrides
                .page_size
                .or(pager.page_size)
                .unwrap_or(defaults.page_size),
            refill_threshold: overrides
                .refill_threshold
                .or(pager.refill_threshold)
                .unwrap_or(defaults.refill_threshold),
        }
        .validate()
    }
}

/// On-disk representation of `ledger.toml`.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ConfigToml {
    pub pager: Option<PagerToml>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PagerToml {
    pub page_size: Option<usize>,
    pub refill_threshold: Option<usize>,
}

/// Values supplied on the command line; they win over the file.
#[derive(Debug, Clone, Copy, Default)]
pub struct ConfigOverrides {
    pub page_size: Option<usize>,
    pub refill_threshold: Option<usize>,
}

/// Read `path` as a [`ConfigToml`]. A missing file yields the defaults.
pub async fn load_config_toml(path: &Path) -> PagerResult<ConfigToml> {
    match fs::read_to_string(path).await {
        Ok(contents) => toml::from_str(&contents).map_err(|source| {
            tracing::error!("Failed to parse {}: {source}", path.display());
            PagerErr::ConfigParse {
                path: path.display().to_string(),
                source,
            }
        }),
        Err(err) if err.kind() == io::ErrorKind::NotFound => {
            tracing::info!("{} not found, using defaults", path.display());
            Ok(ConfigToml::default())
        }
        Err(err) => {
            tracing::error!("Failed to read {}: {err}", path.display());
            Err(err.into())
        }
    }
}
