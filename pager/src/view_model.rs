use std::cmp::Ordering;
use std::collections::HashMap;
use std::collections::HashSet;

use serde::Serialize;

use crate::Order;
use crate::PagerRecord;

/// Position of a row inside the sectioned list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct IndexPath {
    pub section: usize,
    pub row: usize,
}

impl IndexPath {
    pub fn new(section: usize, row: usize) -> Self {
        Self { section, row }
    }
}

/// One group of rows. `title` is the date bucket under chronological orders
/// and `None` for the single section used by value orders.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Section {
    pub title: Option<String>,
    pub ids: Vec<String>,
}

/// Section-grouped list model owned by a single pager.
///
/// Every id in `sections` has exactly one entry in `items` and appears in
/// exactly one position.
#[derive(Debug, Clone)]
pub struct ViewModel<R> {
    order: Order,
    sections: Vec<Section>,
    items: HashMap<String, R>,
}

enum Side {
    Head,
    Tail,
}

impl<R: PagerRecord> ViewModel<R> {
    pub fn new(order: Order) -> Self {
        Self {
            order,
            sections: Vec::new(),
            items: HashMap::new(),
        }
    }

    pub fn order(&self) -> Order {
        self.order
    }

    pub fn sections(&self) -> &[Section] {
        &self.sections
    }

    pub fn len(&self) -> usize {
        self.sections.iter().map(|s| s.ids.len()).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.sections.iter().all(|s| s.ids.is_empty())
    }

    pub fn contains(&self, id: &str) -> bool {
        self.items.contains_key(id)
    }

    pub fn record(&self, id: &str) -> Option<&R> {
        self.items.get(id)
    }

    pub fn record_at(&self, index_path: IndexPath) -> Option<&R> {
        self.id_at(index_path).and_then(|id| self.items.get(id))
    }

    pub fn id_at(&self, index_path: IndexPath) -> Option<&str> {
        self.sections
            .get(index_path.section)
            .and_then(|s| s.ids.get(index_path.row))
            .map(String::as_str)
    }

    /// Id of the row at `index` when the sections are flattened.
    pub fn id_at_flat(&self, index: usize) -> Option<&str> {
        self.ids().nth(index)
    }

    pub fn index_path_of(&self, id: &str) -> Option<IndexPath> {
        self.sections.iter().enumerate().find_map(|(section, s)| {
            s.ids
                .iter()
                .position(|candidate| candidate == id)
                .map(|row| IndexPath { section, row })
        })
    }

    pub fn flat_index_of(&self, id: &str) -> Option<usize> {
        self.ids().position(|candidate| candidate == id)
    }

    pub fn first(&self) -> Option<&R> {
        self.ids().next().and_then(|id| self.items.get(id))
    }

    pub fn last(&self) -> Option<&R> {
        self.sections
            .iter()
            .rev()
            .find_map(|s| s.ids.last())
            .and_then(|id| self.items.get(id))
    }

    /// Ids in display order.
    pub fn ids(&self) -> impl Iterator<Item = &str> {
        self.sections
            .iter()
            .flat_map(|s| s.ids.iter().map(String::as_str))
    }

    /// Records in display order.
    pub fn records(&self) -> impl Iterator<Item = &R> {
        self.ids().filter_map(|id| self.items.get(id))
    }

    /// Replace the whole model with `records`, which are in display order.
    pub fn reload(&mut self, records: Vec<R>) -> usize {
        self.sections.clear();
        self.items.clear();
        self.append(records)
    }

    /// Merge a page that follows the current tail. Returns the number of new
    /// rows.
    pub fn append(&mut self, records: Vec<R>) -> usize {
        let chunks = self.chunk(records);
        let mut inserted = 0;
        for (title, ids) in chunks {
            inserted += ids.len();
            match self.section_index(title.as_deref()) {
                Some(idx) => self.merge_into(idx, ids, Side::Tail),
                None => self.sections.push(Section { title, ids }),
            }
        }
        inserted
    }

    /// Merge a page that precedes the current head. `records` arrive the way
    /// a backwards query returns them, nearest-to-anchor first, and are
    /// reversed into display order here. Returns the number of new rows.
    pub fn prepend(&mut self, mut records: Vec<R>) -> usize {
        records.reverse();
        let chunks = self.chunk(records);
        let mut inserted = 0;
        for (title, ids) in chunks.into_iter().rev() {
            inserted += ids.len();
            match self.section_index(title.as_deref()) {
                Some(idx) => self.merge_into(idx, ids, Side::Head),
                None => self.sections.insert(0, Section { title, ids }),
            }
        }
        inserted
    }

    /// Drop `anchor_id` and every row after it, then append `records`.
    ///
    /// Returns `false` and leaves the model untouched when the anchor is not
    /// loaded.
    pub fn replace_from(&mut self, anchor_id: &str, records: Vec<R>) -> bool {
        let Some(start) = self.index_path_of(anchor_id) else {
            return false;
        };
        let mut removed: Vec<String> = Vec::new();
        for section in self.sections.iter_mut().skip(start.section + 1) {
            removed.append(&mut section.ids);
        }
        self.sections.truncate(start.section + 1);
        if let Some(section) = self.sections.get_mut(start.section) {
            removed.extend(section.ids.drain(start.row..));
        }
        self.sections.retain(|s| !s.ids.is_empty());
        for id in &removed {
            self.items.remove(id);
        }
        self.append(records);
        true
    }

    /// Swap the stored record for one with the same id without moving it.
    pub fn replace_record(&mut self, record: R) -> bool {
        match self.items.get_mut(record.id()) {
            Some(slot) => {
                *slot = record;
                true
            }
            None => false,
        }
    }

    fn section_index(&self, title: Option<&str>) -> Option<usize> {
        self.sections.iter().position(|s| s.title.as_deref() == title)
    }

    /// Group consecutive records by section title, skipping ids that are
    /// already placed. Records that are already loaded still refresh their
    /// stored value.
    fn chunk(&mut self, records: Vec<R>) -> Vec<(Option<String>, Vec<String>)> {
        let mut chunks: Vec<(Option<String>, Vec<String>)> = Vec::new();
        let mut seen: HashSet<String> = HashSet::new();
        for record in records {
            let id = record.id().to_string();
            if !seen.insert(id.clone()) {
                continue;
            }
            if self.items.contains_key(&id) {
                self.items.insert(id, record);
                continue;
            }
            let title = self.order.is_chronological().then(|| record.group_key());
            self.items.insert(id.clone(), record);
            match chunks.last_mut() {
                Some((last_title, ids)) if *last_title == title => ids.push(id),
                _ => chunks.push((title, vec![id])),
            }
        }
        chunks
    }

    fn merge_into(&mut self, idx: usize, incoming: Vec<String>, side: Side) {
        let order = self.order;
        let items = &self.items;
        let Some(section) = self.sections.get_mut(idx) else {
            return;
        };
        let existing = std::mem::take(&mut section.ids);
        let mut merged = match side {
            Side::Tail => [existing, incoming].concat(),
            Side::Head => [incoming, existing].concat(),
        };
        if order.is_chronological() {
            // Stable, so equal keys keep their page order.
            merged.sort_by(|a, b| display_ordering(order, items.get(a), items.get(b)));
        }
        section.ids = merged;
    }
}

fn display_ordering<R: PagerRecord>(order: Order, a: Option<&R>, b: Option<&R>) -> Ordering {
    match (a, b) {
        (Some(a), Some(b)) => {
            let ordering = a.sort_key(order).cmp(&b.sort_key(order));
            if order.is_descending() {
                ordering.reverse()
            } else {
                ordering
            }
        }
        _ => Ordering::Equal,
    }
}

#[cfg(test)]
#[path = "view_model_tests.rs"]
mod tests;
