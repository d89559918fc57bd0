//! Wallet history records and the in-memory store that backs the history
//! screens.

mod entry;
mod error;
mod filter;
mod fixture;
mod snapshot;
mod store;
mod web3;

pub use entry::LedgerEntry;
pub use entry::LedgerSortKey;
pub use entry::day_bucket;
pub use error::HistoryError;
pub use error::HistoryResult;
pub use filter::HistoryFilter;
pub use fixture::HistoryKind;
pub use fixture::load_fixture;
pub use snapshot::SafeSnapshot;
pub use snapshot::SnapshotKind;
pub use store::CHANGE_FEED_CAPACITY;
pub use store::MemoryStore;
pub use web3::TransactionStatus;
pub use web3::Web3Transaction;
pub use web3::Web3TransactionKind;
