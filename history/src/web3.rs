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
pub enum Web3TransactionKind {
    Send,
    Receive,
    Swap,
    Approve,
}

#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum TransactionStatus {
    Pending,
    #[default]
    Success,
    Failed,
}

/// On-chain transfer seen by a self-custody wallet.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Web3Transaction {
    pub transaction_hash: String,
    pub chain_id: String,
    pub kind: Web3TransactionKind,
    /// Token contract or asset id.
    pub token: String,
    /// Address on the other side of the transfer.
    pub counterpart_address: String,
    pub amount: Decimal,
    #[serde(default)]
    pub usd_value: Decimal,
    #[serde(default)]
    pub status: TransactionStatus,
    pub transacted_at: DateTime<Utc>,
}

impl Web3Transaction {
    pub fn is_pending(&self) -> bool {
        self.status == TransactionStatus::Pending
    }
}

impl LedgerEntry for Web3Transaction {
    fn entry_id(&self) -> &str {
        &self.transaction_hash
    }

    fn asset_id(&self) -> &str {
        &self.token
    }

    fn counterpart(&self) -> Option<&str> {
        Some(&self.counterpart_address)
    }

    fn type_tag(&self) -> &str {
        self.kind.as_ref()
    }

    fn created_at(&self) -> DateTime<Utc> {
        self.transacted_at
    }

    fn amount(&self) -> Decimal {
        match self.kind {
            Web3TransactionKind::Send => -self.amount.abs(),
            _ => self.amount,
        }
    }

    fn usd_value(&self) -> Decimal {
        self.usd_value.abs()
    }
}

impl PagerRecord for Web3Transaction {
    type SortKey = LedgerSortKey;

    fn id(&self) -> &str {
        &self.transaction_hash
    }

    fn group_key(&self) -> String {
        day_bucket(self.transacted_at)
    }

    fn sort_key(&self, order: Order) -> LedgerSortKey {
        sort_key(self, order)
    }
}
