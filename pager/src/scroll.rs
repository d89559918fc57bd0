use serde::Serialize;

/// Whether the list is held against one of its edges.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub enum Pin {
    Top,
    Bottom,
    #[default]
    Free,
}

impl Pin {
    /// Classify a scroll offset. Top wins when all content fits on screen.
    pub fn from_offsets(offset: u64, content_height: u64, viewport_height: u64) -> Self {
        let max_offset = content_height.saturating_sub(viewport_height);
        if offset == 0 {
            Pin::Top
        } else if offset >= max_offset {
            Pin::Bottom
        } else {
            Pin::Free
        }
    }
}

/// What the UI last reported about its scroll position.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Viewport {
    /// Id of the topmost row that is at least partially visible.
    pub first_visible: Option<String>,
    pub pin: Pin,
}

/// How the UI should move its scroll position when applying an update.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ScrollAdjustment {
    /// Jump to the top of the list.
    ResetToTop,
    /// Keep the current offset; nothing above the viewport changed.
    Preserve,
    /// Stay pinned to the top edge.
    KeepTop,
    /// Stay pinned to the bottom edge.
    KeepBottom,
    /// Keep `record_id` at the same on-screen position. `rows_above_delta`
    /// rows were inserted (positive) or removed (negative) above it; the UI
    /// offsets by their rendered height, see [`compensated_offset`].
    KeepVisible {
        record_id: String,
        rows_above_delta: isize,
    },
}

impl ScrollAdjustment {
    /// Adjustment for content that changed above `viewport.first_visible`.
    pub(crate) fn for_change_above(viewport: &Viewport, rows_above_delta: isize) -> Self {
        match viewport.pin {
            Pin::Top => ScrollAdjustment::KeepTop,
            Pin::Bottom => ScrollAdjustment::KeepBottom,
            Pin::Free => match &viewport.first_visible {
                Some(id) if rows_above_delta != 0 => ScrollAdjustment::KeepVisible {
                    record_id: id.clone(),
                    rows_above_delta,
                },
                _ => ScrollAdjustment::Preserve,
            },
        }
    }
}

/// Offset that keeps content still after rows of the given heights were
/// inserted above the viewport.
pub fn compensated_offset(offset: u64, inserted_heights: impl IntoIterator<Item = u64>) -> u64 {
    inserted_heights
        .into_iter()
        .fold(offset, u64::saturating_add)
}
