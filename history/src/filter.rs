use std::collections::BTreeSet;

use chrono::DateTime;
use chrono::Utc;
use ledger_pager::RecordFilter;
use serde::Deserialize;
use serde::Serialize;

use crate::LedgerEntry;

/// Filter chosen on a history screen. Empty sets match everything.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoryFilter {
    #[serde(default)]
    pub tokens: BTreeSet<String>,
    #[serde(default)]
    pub counterparts: BTreeSet<String>,
    #[serde(default)]
    pub type_tag: Option<String>,
    /// Inclusive lower bound.
    #[serde(default)]
    pub since: Option<DateTime<Utc>>,
    /// Exclusive upper bound.
    #[serde(default)]
    pub until: Option<DateTime<Utc>>,
}

impl HistoryFilter {
    pub fn with_tokens<I, S>(mut self, tokens: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.tokens.extend(tokens.into_iter().map(Into::into));
        self
    }

    pub fn with_counterparts<I, S>(mut self, counterparts: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.counterparts
            .extend(counterparts.into_iter().map(Into::into));
        self
    }

    pub fn with_type_tag(mut self, type_tag: impl Into<String>) -> Self {
        self.type_tag = Some(type_tag.into());
        self
    }

    pub fn between(mut self, since: Option<DateTime<Utc>>, until: Option<DateTime<Utc>>) -> Self {
        self.since = since;
        self.until = until;
        self
    }

    pub fn matches<E: LedgerEntry>(&self, entry: &E) -> bool {
        if !self.tokens.is_empty() && !self.tokens.contains(entry.asset_id()) {
            return false;
        }
        if !self.counterparts.is_empty() {
            match entry.counterpart() {
                Some(counterpart) if self.counterparts.contains(counterpart) => {}
                _ => return false,
            }
        }
        if let Some(type_tag) = &self.type_tag
            && entry.type_tag() != type_tag
        {
            return false;
        }
        let at = entry.created_at();
        if self.since.is_some_and(|since| at < since) {
            return false;
        }
        if self.until.is_some_and(|until| at >= until) {
            return false;
        }
        true
    }
}

impl<R: LedgerEntry> RecordFilter<R> for HistoryFilter {
    fn is_included(&self, record: &R) -> bool {
        self.matches(record)
    }
}
