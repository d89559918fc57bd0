use serde::Serialize;

use crate::PagerRecord;
use crate::ViewModel;

/// Which edge a fired trigger asks to extend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Edge {
    Head,
    Tail,
}

/// Row ids that start the next edge load when displayed.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct EdgeTriggers {
    pub next: Option<String>,
    pub previous: Option<String>,
}

impl EdgeTriggers {
    /// Arm the tail trigger `refill_threshold` rows before the tail when the
    /// last page was full, clear it otherwise.
    pub(crate) fn arm_next<R: PagerRecord>(
        &mut self,
        vm: &ViewModel<R>,
        page_len: usize,
        page_size: usize,
        refill_threshold: usize,
    ) {
        self.next = if page_len >= page_size {
            vm.len()
                .checked_sub(refill_threshold)
                .and_then(|idx| vm.id_at_flat(idx))
                .map(str::to_string)
        } else {
            None
        };
    }

    /// Arm the head trigger on any non-empty backwards page, clear it on an
    /// empty one.
    pub(crate) fn arm_previous<R: PagerRecord>(
        &mut self,
        vm: &ViewModel<R>,
        page_len: usize,
        refill_threshold: usize,
    ) {
        self.previous = if page_len > 0 {
            let idx = refill_threshold.saturating_sub(1).min(vm.len().saturating_sub(1));
            vm.id_at_flat(idx).map(str::to_string)
        } else {
            None
        };
    }

    /// Move the head trigger back onto a loaded row when the row it named
    /// has left the model.
    pub(crate) fn rearm_dropped_previous<R: PagerRecord>(
        &mut self,
        vm: &ViewModel<R>,
        refill_threshold: usize,
    ) {
        if self.previous.as_deref().is_some_and(|id| !vm.contains(id)) {
            let idx = refill_threshold.saturating_sub(1).min(vm.len().saturating_sub(1));
            self.previous = vm.id_at_flat(idx).map(str::to_string);
        }
    }

    /// Consume the trigger matching `record_id`, if any. A trigger fires at
    /// most once.
    pub(crate) fn fire(&mut self, record_id: &str) -> Option<Edge> {
        if self.next.as_deref() == Some(record_id) {
            self.next = None;
            return Some(Edge::Tail);
        }
        if self.previous.as_deref() == Some(record_id) {
            self.previous = None;
            return Some(Edge::Head);
        }
        None
    }
}
