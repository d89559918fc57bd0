//! `ledger-history`: page through a wallet history fixture the way a
//! history screen would, and print the resulting list.

mod output;
mod session;

use std::path::PathBuf;

use anyhow::Context;
use chrono::DateTime;
use chrono::NaiveDate;
use chrono::NaiveTime;
use chrono::TimeDelta;
use chrono::Utc;
use clap::Parser;
use ledger_history::HistoryFilter;
use ledger_history::HistoryKind;
use ledger_history::LedgerEntry;
use ledger_history::SafeSnapshot;
use ledger_history::Web3Transaction;
use ledger_history::load_fixture;
use ledger_pager::CONFIG_TOML_FILE;
use ledger_pager::ConfigOverrides;
use ledger_pager::Order;
use ledger_pager::PagerConfig;
use ledger_pager::PagerRecord;
use ledger_pager::load_config_toml;
use serde::Serialize;
use serde::de::DeserializeOwned;
use supports_color::Stream;
use tracing_subscriber::EnvFilter;

pub use output::HumanOutput;
pub use output::JsonReport;
pub use session::PagedHistory;
pub use session::page_through;

/// Page through a wallet history fixture.
#[derive(Debug, Parser)]
#[clap(author, version, bin_name = "ledger-history")]
pub struct Cli {
    /// JSON file holding an array of history records.
    #[arg(long, value_name = "FILE")]
    pub fixture: PathBuf,

    /// Record type stored in the fixture.
    #[arg(long, default_value_t = HistoryKind::Snapshot)]
    pub kind: HistoryKind,

    /// newest, oldest, most_valuable or biggest_amount.
    #[arg(long, default_value_t = Order::Newest)]
    pub order: Order,

    /// Only show these assets. Repeatable.
    #[arg(long = "token", value_name = "ASSET")]
    pub tokens: Vec<String>,

    /// Only show these counterparts. Repeatable.
    #[arg(long = "counterpart", value_name = "ID")]
    pub counterparts: Vec<String>,

    /// Only show records with this type tag, e.g. `deposit` or `send`.
    #[arg(long = "type", value_name = "TAG")]
    pub type_tag: Option<String>,

    /// First day to include (YYYY-MM-DD, UTC).
    #[arg(long)]
    pub since: Option<NaiveDate>,

    /// Last day to include (YYYY-MM-DD, UTC).
    #[arg(long)]
    pub until: Option<NaiveDate>,

    /// Additional pages to load by scrolling past the edge trigger.
    #[arg(long, default_value_t = 0)]
    pub pages: usize,

    #[arg(long)]
    pub page_size: Option<usize>,

    #[arg(long)]
    pub refill_threshold: Option<usize>,

    /// Config file; defaults to `ledger.toml` in the working directory.
    #[arg(long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Print the final list as JSON.
    #[arg(long, default_value_t = false)]
    pub json: bool,
}

impl Cli {
    pub fn history_filter(&self) -> anyhow::Result<HistoryFilter> {
        if let (Some(since), Some(until)) = (self.since, self.until)
            && since > until
        {
            anyhow::bail!("--since {since} is after --until {until}");
        }
        let since = self.since.map(start_of_day);
        // `until` names the last included day.
        let until = self
            .until
            .map(|day| start_of_day(day) + TimeDelta::days(1));
        let mut filter = HistoryFilter::default()
            .with_tokens(self.tokens.iter().cloned())
            .with_counterparts(self.counterparts.iter().cloned())
            .between(since, until);
        if let Some(type_tag) = &self.type_tag {
            filter = filter.with_type_tag(type_tag.clone());
        }
        Ok(filter)
    }

    fn config_overrides(&self) -> ConfigOverrides {
        ConfigOverrides {
            page_size: self.page_size,
            refill_threshold: self.refill_threshold,
        }
    }
}

fn start_of_day(day: NaiveDate) -> DateTime<Utc> {
    day.and_time(NaiveTime::MIN).and_utc()
}

/// Install the stderr log subscriber. `RUST_LOG` overrides the default
/// filter.
pub fn init_tracing() {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new("ledger_pager=info,ledger_history=info,ledger_cli=info")
    });
    let _ = tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}

pub async fn run_main(cli: Cli) -> anyhow::Result<()> {
    let config_path = cli
        .config
        .clone()
        .unwrap_or_else(|| PathBuf::from(CONFIG_TOML_FILE));
    let config_toml = load_config_toml(&config_path).await?;
    let config = PagerConfig::load_from_toml_with_overrides(config_toml, cli.config_overrides())
        .context("invalid pager settings")?;
    let filter = cli.history_filter()?;

    let rendered = match cli.kind {
        HistoryKind::Snapshot => render::<SafeSnapshot>(&cli, filter, config).await?,
        HistoryKind::Web3 => render::<Web3Transaction>(&cli, filter, config).await?,
    };
    print!("{rendered}");
    Ok(())
}

async fn render<R>(cli: &Cli, filter: HistoryFilter, config: PagerConfig) -> anyhow::Result<String>
where
    R: PagerRecord + LedgerEntry + DeserializeOwned + Serialize,
{
    let records: Vec<R> = load_fixture(&cli.fixture)
        .await
        .with_context(|| format!("failed to load {}", cli.fixture.display()))?;
    let paged = page_through(records, filter, cli.order, config, cli.pages).await?;

    if cli.json {
        let report = JsonReport::new(cli.kind, &paged);
        let mut json = serde_json::to_string_pretty(&report)?;
        json.push('\n');
        Ok(json)
    } else {
        let with_ansi = supports_color::on_cached(Stream::Stdout).is_some();
        Ok(HumanOutput::create_with_ansi(with_ansi).render(&paged))
    }
}
