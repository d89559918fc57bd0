use serde::Deserialize;
use serde::Serialize;
use strum_macros::Display;
use strum_macros::EnumString;

/// Sort order of a history list.
///
/// Chronological orders group records into date sections; value orders place
/// every record into a single unnamed section.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum Order {
    #[default]
    Newest,
    Oldest,
    MostValuable,
    BiggestAmount,
}

impl Order {
    pub fn is_chronological(self) -> bool {
        matches!(self, Order::Newest | Order::Oldest)
    }

    /// Whether records with a larger sort key are listed first.
    pub fn is_descending(self) -> bool {
        !matches!(self, Order::Oldest)
    }
}

/// Query window relative to a known anchor record.
#[derive(Debug, Clone, PartialEq)]
pub enum Offset<R> {
    /// Start of the order.
    None,
    /// The page immediately preceding `anchor` in display order. Stores
    /// return it nearest-to-anchor first.
    Before { anchor: R, includes_anchor: bool },
    /// The page immediately following `anchor` in display order.
    After { anchor: R, includes_anchor: bool },
}

impl<R> Offset<R> {
    pub fn anchor(&self) -> Option<&R> {
        match self {
            Offset::None => None,
            Offset::Before { anchor, .. } | Offset::After { anchor, .. } => Some(anchor),
        }
    }
}
