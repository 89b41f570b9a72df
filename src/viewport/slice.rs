//! Visible row slice and slice-local feature coordinates

use crate::analysis::{AlignmentRow, FeatureSpan};
use crate::config::ViewportConfig;

/// Half-open range of rows to render plus the pixel offset of its first row
/// inside the full-height scroll area.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RowWindow {
    pub start: usize,
    pub end: usize,
    pub offset_px: f32,
}

impl RowWindow {
    /// Every row, no offset
    pub fn all(row_count: usize) -> Self {
        Self {
            start: 0,
            end: row_count,
            offset_px: 0.0,
        }
    }

    pub fn len(&self) -> usize {
        self.end - self.start
    }

    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }

    pub fn contains(&self, row: usize) -> bool {
        self.start <= row && row < self.end
    }

    /// Global row index -> index within the window
    pub fn to_local(&self, row: usize) -> Option<usize> {
        self.contains(row).then(|| row - self.start)
    }
}

/// Rows to render for a scroll position.
///
/// Below the row threshold every row is rendered with zero offset.
pub fn visible_row_window(
    row_count: usize,
    scroll_top: f32,
    container_height: f32,
    config: &ViewportConfig,
) -> RowWindow {
    let row_height = config.row_height;
    let viewport_rows = (container_height.max(0.0) / row_height).ceil() as usize;
    let visible_count = config
        .min_visible_rows
        .max(viewport_rows + 2 * config.overscan);

    if row_count <= visible_count {
        return RowWindow::all(row_count);
    }

    let first_on_screen = (scroll_top.max(0.0) / row_height).floor() as usize;
    let start = first_on_screen
        .saturating_sub(config.overscan)
        .min(row_count);
    let end = (start + visible_count).min(row_count);

    RowWindow {
        start,
        end,
        offset_px: start as f32 * row_height,
    }
}

/// Rows handed to the tile widget together with where they sit
#[derive(Debug, Clone, Copy)]
pub struct VisibleSlice<'a> {
    pub rows: &'a [AlignmentRow],
    pub window: RowWindow,
}

impl<'a> VisibleSlice<'a> {
    pub fn new(all_rows: &'a [AlignmentRow], window: RowWindow) -> Self {
        let end = window.end.min(all_rows.len());
        let start = window.start.min(end);
        Self {
            rows: &all_rows[start..end],
            window: RowWindow { start, end, ..window },
        }
    }

    /// Index of the first visible row in the full set
    pub fn row_offset(&self) -> usize {
        self.window.start
    }

    pub fn offset_px(&self) -> f32 {
        self.window.offset_px
    }

    /// Iterate `(global_index, row)` pairs
    pub fn iter_global(&self) -> impl Iterator<Item = (usize, &'a AlignmentRow)> + '_ {
        let offset = self.window.start;
        self.rows.iter().enumerate().map(move |(i, row)| (offset + i, row))
    }
}

/// Re-base globally indexed spans onto a row window.
///
/// Spans outside the window are dropped, spans crossing its edge are clipped.
/// Column coordinates are left global.
pub fn rebase_features(spans: &[FeatureSpan], window: &RowWindow) -> Vec<FeatureSpan> {
    spans
        .iter()
        .filter(|span| span.row_start < window.end && span.row_end >= window.start)
        .map(|span| FeatureSpan {
            row_start: span.row_start.max(window.start) - window.start,
            row_end: span.row_end.min(window.end - 1) - window.start,
            ..span.clone()
        })
        .collect()
}
