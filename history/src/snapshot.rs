use chrono::DateTime;
use chrono::Utc;
use ledger_pager::Order;
use ledger_pager::PagerRecord;
use rust_decimal::Decimal;
use serde::Deserialize;
use serde::Serialize;
use strum_macros::AsRefStr;
use strum_macros::Display;
use strum_macros::EnumString;

use crate::LedgerEntry;
use crate::LedgerSortKey;
use crate::day_bucket;
use crate::entry::sort_key;

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, AsRefStr, Display, EnumString,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum SnapshotKind {
    Deposit,
    Withdrawal,
    Transfer,
    Pending,
}

/// One balance change of a custodial wallet.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SafeSnapshot {
    pub snapshot_id: String,
    pub kind: SnapshotKind,
    pub asset_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub opponent_id: Option<String>,
    /// Positive for incoming funds.
    pub amount: Decimal,
    #[serde(default)]
    pub price_usd: Decimal,
    pub created_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub memo: Option<String>,
}

impl LedgerEntry for SafeSnapshot {
    fn entry_id(&self) -> &str {
        &self.snapshot_id
    }

    fn asset_id(&self) -> &str {
        &self.asset_id
    }

    fn counterpart(&self) -> Option<&str> {
        self.opponent_id.as_deref()
    }

    fn type_tag(&self) -> &str {
        self.kind.as_ref()
    }

    fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    fn amount(&self) -> Decimal {
        self.amount
    }

    fn usd_value(&self) -> Decimal {
        self.amount.abs() * self.price_usd
    }
}

impl PagerRecord for SafeSnapshot {
    type SortKey = LedgerSortKey;

    fn id(&self) -> &str {
        &self.snapshot_id
    }

    fn group_key(&self) -> String {
        day_bucket(self.created_at)
    }

    fn sort_key(&self, order: Order) -> LedgerSortKey {
        sort_key(self, order)
    }
}
