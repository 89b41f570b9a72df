//! Scroll offset and horizontal display window
//!
//! The controller is the only writer of `ViewportState`. Every transition
//! clamps its result, so callers can feed it raw input without checking
//! bounds first.

use super::input::ViewerCommand;
use super::slice::{visible_row_window, RowWindow};
use crate::config::ViewportConfig;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PanDirection {
    Left,
    Right,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ZoomDirection {
    In,
    Out,
}

/// Display columns are 1-based and inclusive.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ViewportState {
    pub scroll_top: f32,
    pub display_start: usize,
    pub display_end: usize,
    pub container_height: f32,
}

impl Default for ViewportState {
    fn default() -> Self {
        Self {
            scroll_top: 0.0,
            display_start: 1,
            display_end: 1,
            container_height: 0.0,
        }
    }
}

#[derive(Debug, Clone)]
pub struct ViewportController {
    state: ViewportState,
    config: ViewportConfig,
    row_count: usize,
    sequence_length: usize,
    virtualized: bool,
}

impl ViewportController {
    pub fn new(config: ViewportConfig) -> Self {
        Self {
            state: ViewportState::default(),
            config,
            row_count: 0,
            sequence_length: 0,
            virtualized: true,
        }
    }

    pub fn state(&self) -> &ViewportState {
        &self.state
    }

    pub fn config(&self) -> &ViewportConfig {
        &self.config
    }

    pub fn row_count(&self) -> usize {
        self.row_count
    }

    pub fn sequence_length(&self) -> usize {
        self.sequence_length
    }

    pub fn is_virtualized(&self) -> bool {
        self.virtualized
    }

    /// Turning virtualization off renders every row on the next frame
    pub fn set_virtualized(&mut self, virtualized: bool) {
        self.virtualized = virtualized;
    }

    pub fn display_range(&self) -> (usize, usize) {
        (self.state.display_start, self.state.display_end)
    }

    pub fn window_width(&self) -> usize {
        self.state.display_end - self.state.display_start
    }

    /// Full scrollable height as if every row were rendered
    pub fn total_height(&self) -> f32 {
        self.row_count as f32 * self.config.row_height
    }

    pub fn max_scroll(&self) -> f32 {
        (self.total_height() - self.state.container_height).max(0.0)
    }

    fn has_window(&self) -> bool {
        self.sequence_length >= 2
    }

    fn min_width(&self) -> usize {
        self.config.min_window.min(self.sequence_length.saturating_sub(1))
    }

    fn max_width(&self) -> usize {
        self.sequence_length.saturating_sub(1)
    }

    /// Reset for a new alignment: top of the rows, window centred on the
    /// middle column, or the whole sequence when it fits.
    pub fn initialize(&mut self, row_count: usize, sequence_length: usize, container_height: f32) {
        self.row_count = row_count;
        self.sequence_length = sequence_length;

        // The starting window is never narrower than the zoom minimum
        let half = self
            .config
            .half_window
            .max(self.config.min_window.div_ceil(2))
            .max(1);
        let (start, end) = if sequence_length <= half * 2 {
            (1, sequence_length.max(1))
        } else {
            let center = (sequence_length + 1) / 2;
            (center - half, center + half)
        };

        self.state = ViewportState {
            scroll_top: 0.0,
            display_start: start,
            display_end: end,
            container_height: container_height.max(0.0),
        };
        log::debug!(
            "Viewport initialized: {} rows, length {}, window {}..{}",
            row_count,
            sequence_length,
            start,
            end
        );
    }

    pub fn scroll(&mut self, scroll_top: f32) {
        self.state.scroll_top = if scroll_top.is_finite() {
            scroll_top.clamp(0.0, self.max_scroll())
        } else {
            0.0
        };
    }

    pub fn scroll_by_rows(&mut self, rows: i64) {
        let delta = rows as f32 * self.config.row_height;
        self.scroll(self.state.scroll_top + delta);
    }

    /// New container height from layout; keeps the scroll offset valid
    pub fn resize(&mut self, container_height: f32) {
        self.state.container_height = container_height.max(0.0);
        self.scroll(self.state.scroll_top);
    }

    pub fn pan(&mut self, direction: PanDirection) {
        if !self.has_window() {
            return;
        }
        let width = self.window_width();
        let len = self.sequence_length;
        let step = ((width as f64 * self.config.pan_fraction).floor() as usize).max(1);
        let (start, end) = match direction {
            PanDirection::Left => {
                let start = self.state.display_start.saturating_sub(step).max(1);
                (start, start + width)
            }
            PanDirection::Right => {
                let end = (self.state.display_end + step).min(len);
                (end - width, end)
            }
        };
        self.state.display_start = start;
        self.state.display_end = end;
    }

    pub fn zoom(&mut self, direction: ZoomDirection) {
        if !self.has_window() {
            return;
        }
        let width = self.window_width();
        let step = ((width as f64 * self.config.zoom_fraction).floor() as usize).max(1);
        let new_width = match direction {
            ZoomDirection::In => {
                if width <= self.min_width() {
                    return;
                }
                width.saturating_sub(step).max(self.min_width())
            }
            ZoomDirection::Out => {
                if width >= self.max_width() {
                    return;
                }
                (width + step).min(self.max_width())
            }
        };
        let center = (self.state.display_start + self.state.display_end) / 2;
        self.place_window(center.saturating_sub(new_width / 2), new_width);
    }

    pub fn jump_home(&mut self) {
        if !self.has_window() {
            return;
        }
        let width = self.window_width();
        self.state.display_start = 1;
        self.state.display_end = (1 + width).min(self.sequence_length);
    }

    pub fn jump_end(&mut self) {
        if !self.has_window() {
            return;
        }
        let width = self.window_width();
        self.state.display_end = self.sequence_length;
        self.state.display_start = self.sequence_length.saturating_sub(width).max(1);
    }

    /// Range requested by the navigation ruler. The requested width is kept
    /// (within the zoom limits) and the window slides back inside the
    /// sequence, the way Pan does.
    pub fn set_display_range(&mut self, start: usize, end: usize) {
        if !self.has_window() {
            return;
        }
        let (lo, hi) = if start <= end { (start, end) } else { (end, start) };
        let width = (hi - lo).clamp(self.min_width(), self.max_width());
        self.place_window(lo, width);
    }

    /// Bring a 0-based row and 1-based column into view, moving as little
    /// as possible.
    pub fn reveal(&mut self, row: usize, column: usize) {
        if row < self.row_count {
            let row_top = row as f32 * self.config.row_height;
            let row_bottom = row_top + self.config.row_height;
            let view_bottom = self.state.scroll_top + self.state.container_height;
            if row_top < self.state.scroll_top {
                self.scroll(row_top);
            } else if row_bottom > view_bottom {
                self.scroll(row_bottom - self.state.container_height);
            }
        }

        if self.has_window()
            && (column < self.state.display_start || column > self.state.display_end)
        {
            let width = self.window_width();
            self.place_window(column.saturating_sub(width / 2), width);
        }
    }

    /// Put a window of `width` at `start`, shifting it back inside `[1, len]`.
    fn place_window(&mut self, start: usize, width: usize) {
        let len = self.sequence_length;
        let width = width.min(len.saturating_sub(1));
        let start = start.clamp(1, len - width);
        self.state.display_start = start;
        self.state.display_end = start + width;
    }

    /// Returns false for commands that are not viewport transitions
    pub fn apply(&mut self, command: ViewerCommand) -> bool {
        match command {
            ViewerCommand::Pan(direction) => self.pan(direction),
            ViewerCommand::Zoom(direction) => self.zoom(direction),
            ViewerCommand::ScrollRows(rows) => self.scroll_by_rows(rows),
            ViewerCommand::JumpHome => self.jump_home(),
            ViewerCommand::JumpEnd => self.jump_end(),
            ViewerCommand::CloseFullScreen => return false,
        }
        true
    }

    /// Rows that must be rendered for the current scroll position
    pub fn visible_rows(&self) -> RowWindow {
        if !self.virtualized {
            return RowWindow::all(self.row_count);
        }
        visible_row_window(
            self.row_count,
            self.state.scroll_top,
            self.state.container_height,
            &self.config,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn controller(len: usize) -> ViewportController {
        let mut c = ViewportController::new(ViewportConfig::default());
        c.initialize(100, len, 600.0);
        c
    }

    fn assert_valid(c: &ViewportController) {
        let (start, end) = c.display_range();
        assert!(start >= 1, "start {} < 1", start);
        assert!(start < end, "inverted window {}..{}", start, end);
        assert!(end <= c.sequence_length(), "end {} past length", end);
    }

    #[test]
    fn test_initialize_centered_window() {
        let c = controller(1000);
        assert_eq!(c.display_range(), (475, 525));
        assert_eq!(c.state().scroll_top, 0.0);

        let c = controller(40);
        assert_eq!(c.display_range(), (1, 40));

        let mut wide = ViewportConfig::default();
        wide.half_window = 50;
        let mut c = ViewportController::new(wide);
        c.initialize(3, 1000, 0.0);
        assert_eq!(c.display_range(), (450, 550));
    }

    #[test]
    fn test_zoom_in_from_full_window() {
        let mut c = controller(40);
        c.zoom(ZoomDirection::In);
        assert_eq!(c.window_width(), 32);
        assert_eq!(c.display_range(), (4, 36));
        assert_valid(&c);
    }

    #[test]
    fn test_zoom_in_monotonic_until_minimum() {
        let mut c = controller(1000);
        let mut last = c.window_width();
        for _ in 0..50 {
            c.zoom(ZoomDirection::In);
            let width = c.window_width();
            if last > 10 {
                assert!(width < last);
            } else {
                assert_eq!(width, last);
            }
            assert!(width >= 10);
            assert_valid(&c);
            last = width;
        }
        assert_eq!(last, 10);
    }

    #[test]
    fn test_zoom_out_caps_at_sequence() {
        let mut c = controller(200);
        for _ in 0..50 {
            c.zoom(ZoomDirection::Out);
            assert_valid(&c);
        }
        assert_eq!(c.display_range(), (1, 200));
    }

    #[test]
    fn test_pan_right_clamps_at_end() {
        let mut c = controller(1000);
        let width = c.window_width();
        c.pan(PanDirection::Right);
        assert_eq!(c.display_range(), (480, 530));
        for _ in 0..500 {
            c.pan(PanDirection::Right);
            assert_valid(&c);
            assert_eq!(c.window_width(), width);
        }
        assert_eq!(c.display_range(), (950, 1000));
    }

    #[test]
    fn test_pan_left_clamps_at_start() {
        let mut c = controller(1000);
        for _ in 0..500 {
            c.pan(PanDirection::Left);
            assert_valid(&c);
        }
        assert_eq!(c.display_range(), (1, 51));
    }

    #[test]
    fn test_jump_preserves_width() {
        let mut c = controller(1000);
        c.jump_end();
        assert_eq!(c.display_range(), (950, 1000));
        c.jump_home();
        assert_eq!(c.display_range(), (1, 51));
    }

    #[test]
    fn test_navigation_range_clamped() {
        let mut c = controller(300);
        c.set_display_range(250, 900);
        assert_eq!(c.display_range(), (1, 300));
        c.set_display_range(0, 3);
        assert_eq!(c.display_range(), (1, 11));
        c.set_display_range(120, 80);
        assert_eq!(c.display_range(), (80, 120));
    }

    #[test]
    fn test_navigation_drag_keeps_width_at_edges() {
        let mut c = controller(1000);
        c.set_display_range(965, 1015);
        assert_eq!(c.display_range(), (950, 1000));
        c.set_display_range(0, 50);
        assert_eq!(c.display_range(), (1, 51));
        c.set_display_range(600, 650);
        assert_eq!(c.display_range(), (600, 650));
    }

    #[test]
    fn test_initialize_respects_min_window() {
        for half in [0, 1, 4] {
            let mut config = ViewportConfig::default();
            config.half_window = half;
            let mut c = ViewportController::new(config);
            c.initialize(3, 100, 0.0);
            let (start, end) = c.display_range();
            assert!(start < end);
            assert!(end - start >= 10, "window {}..{}", start, end);
            assert_valid(&c);
        }
    }

    #[test]
    fn test_degenerate_lengths_are_noops() {
        for len in [0, 1] {
            let mut c = controller(len);
            let before = c.display_range();
            assert_eq!(before, (1, 1));
            c.pan(PanDirection::Right);
            c.zoom(ZoomDirection::Out);
            c.jump_end();
            c.set_display_range(5, 50);
            assert_eq!(c.display_range(), before);
        }
    }

    #[test]
    fn test_short_sequence_min_width() {
        let mut c = controller(5);
        for _ in 0..5 {
            c.zoom(ZoomDirection::In);
        }
        assert_eq!(c.window_width(), 4);
        assert_valid(&c);
    }

    #[test]
    fn test_scroll_clamped() {
        let mut c = controller(1000);
        // 100 rows * 36px - 600px
        c.scroll(1e9);
        assert_eq!(c.state().scroll_top, 3000.0);
        c.scroll(-5.0);
        assert_eq!(c.state().scroll_top, 0.0);
        c.scroll_by_rows(3);
        assert_eq!(c.state().scroll_top, 108.0);
        c.scroll_by_rows(-10);
        assert_eq!(c.state().scroll_top, 0.0);
    }

    #[test]
    fn test_scroll_leaves_window_alone() {
        let mut c = controller(1000);
        let range = c.display_range();
        c.scroll(720.0);
        assert_eq!(c.display_range(), range);
        assert_eq!(c.visible_rows().start, 10);
    }

    #[test]
    fn test_reveal_moves_row_and_column_into_view() {
        let mut c = controller(1000);
        c.reveal(80, 900);
        let view_bottom = c.state().scroll_top + 600.0;
        assert!(81.0 * 36.0 <= view_bottom);
        let (start, end) = c.display_range();
        assert!(start <= 900 && 900 <= end);
        assert_eq!(c.window_width(), 50);

        c.reveal(0, 2);
        assert_eq!(c.state().scroll_top, 0.0);
        assert_eq!(c.display_range(), (1, 51));
    }

    #[test]
    fn test_non_virtualized_renders_everything() {
        let mut c = controller(1000);
        c.scroll(1500.0);
        c.set_virtualized(false);
        assert_eq!(c.visible_rows(), RowWindow::all(100));
    }

    #[test]
    fn test_apply_commands() {
        let mut c = controller(1000);
        assert!(c.apply(ViewerCommand::JumpHome));
        assert_eq!(c.display_range().0, 1);
        assert!(c.apply(ViewerCommand::ScrollRows(3)));
        assert_eq!(c.state().scroll_top, 108.0);
        assert!(!c.apply(ViewerCommand::CloseFullScreen));
    }
}
