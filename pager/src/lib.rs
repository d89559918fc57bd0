//! Cursor-based pagination engine for sectioned history lists.
//!
//! A [`CursorPager`] owns the list model of one screen. It loads pages from a
//! [`RecordStore`] on a serial worker, merges them into a [`ViewModel`] and
//! hands every new snapshot to the UI as a [`ListUpdate`].

mod config;
mod error;
mod order;
mod pager;
mod record;
mod scroll;
mod store;
mod triggers;
mod update;
mod view_model;

pub mod changes;

pub use config::CONFIG_TOML_FILE;
pub use config::ConfigOverrides;
pub use config::ConfigToml;
pub use config::DEFAULT_PAGE_SIZE;
pub use config::DEFAULT_REFILL_THRESHOLD;
pub use config::PagerConfig;
pub use config::PagerToml;
pub use config::load_config_toml;
pub use error::PagerErr;
pub use error::PagerResult;
pub use error::StoreError;
pub use error::StoreResult;
pub use order::Offset;
pub use order::Order;
pub use pager::CursorPager;
pub use pager::PagerOp;
pub use record::PagerRecord;
pub use record::RecordChange;
pub use record::RecordFilter;
pub use scroll::Pin;
pub use scroll::ScrollAdjustment;
pub use scroll::Viewport;
pub use scroll::compensated_offset;
pub use store::RecordStore;
pub use triggers::Edge;
pub use triggers::EdgeTriggers;
pub use update::ListUpdate;
pub use update::UpdateKind;
pub use view_model::IndexPath;
pub use view_model::Section;
pub use view_model::ViewModel;
