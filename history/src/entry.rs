use chrono::DateTime;
use chrono::Utc;
use ledger_pager::Order;
use rust_decimal::Decimal;

/// Fields shared by every history record, used for filtering, grouping and
/// ordering.
pub trait LedgerEntry {
    fn entry_id(&self) -> &str;

    /// Asset (token) the entry moves.
    fn asset_id(&self) -> &str;

    /// The other party: a user id for snapshots, an address on chain.
    fn counterpart(&self) -> Option<&str>;

    /// Type tag, e.g. `deposit` or `receive`.
    fn type_tag(&self) -> &str;

    fn created_at(&self) -> DateTime<Utc>;

    /// Signed amount in asset units.
    fn amount(&self) -> Decimal;

    /// Value of [`LedgerEntry::amount`] in USD, ignoring sign.
    fn usd_value(&self) -> Decimal;
}

/// Sort key shared by history records. The order-dependent value comes
/// first, then time, then id so that keys are unique.
pub type LedgerSortKey = (Decimal, DateTime<Utc>, String);

pub(crate) fn sort_key<E: LedgerEntry>(entry: &E, order: Order) -> LedgerSortKey {
    let primary = match order {
        Order::Newest | Order::Oldest => Decimal::ZERO,
        Order::MostValuable => entry.usd_value(),
        Order::BiggestAmount => entry.amount().abs(),
    };
    (primary, entry.created_at(), entry.entry_id().to_string())
}

/// Date bucket label for `at`, e.g. `2024-06-01` (UTC).
pub fn day_bucket(at: DateTime<Utc>) -> String {
    at.format("%Y-%m-%d").to_string()
}
