//! Painter-based alignment widgets
//!
//! Every widget takes the display window in global columns and lays it out
//! with the same `ColumnScale`, so tiles, track markers and graph points
//! line up vertically.

use egui::{Align2, Color32, FontId, Pos2, Rect, Sense, Shape, Stroke, StrokeKind, Ui};

use super::colors::{residue_color, rgb, ColorScheme, TEXT};
use super::frame::MsaFrame;
use crate::analysis::{ConservationPoint, FeatureShape, TrackFeature};

/// Maps 1-based display columns onto a horizontal pixel span
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ColumnScale {
    pub left: f32,
    pub width: f32,
    pub start: usize,
    pub end: usize,
}

impl ColumnScale {
    pub fn new(left: f32, width: f32, start: usize, end: usize) -> Self {
        Self {
            left,
            width: width.max(1.0),
            start,
            end: end.max(start),
        }
    }

    pub fn column_count(&self) -> usize {
        self.end + 1 - self.start
    }

    pub fn column_width(&self) -> f32 {
        self.width / self.column_count() as f32
    }

    /// Left edge of a column
    pub fn x_of(&self, column: usize) -> f32 {
        self.left + (column as f32 - self.start as f32) * self.column_width()
    }

    pub fn center_of(&self, column: usize) -> f32 {
        self.x_of(column) + self.column_width() / 2.0
    }

    /// Column under `x`, `None` outside the window
    pub fn column_at(&self, x: f32) -> Option<usize> {
        if x < self.left || x >= self.left + self.width {
            return None;
        }
        let offset = ((x - self.left) / self.column_width()).floor() as usize;
        Some((self.start + offset).min(self.end))
    }

    /// Pixel span of an inclusive column range, clipped to the window
    pub fn span(&self, first: usize, last: usize) -> Option<(f32, f32)> {
        let first = first.max(self.start);
        let last = last.min(self.end);
        (first <= last).then(|| (self.x_of(first), self.x_of(last + 1)))
    }
}

/// Sizes shared by the tile painter
#[derive(Debug, Clone, Copy)]
pub struct TileStyle {
    pub scheme: ColorScheme,
    pub row_height: f32,
    pub tile_height: f32,
    pub max_tile_width: f32,
}

#[derive(Debug, Default, Clone, Copy)]
pub struct TileResponse {
    /// Global row and 1-based column under the pointer
    pub hovered: Option<(usize, usize)>,
    pub clicked: Option<(usize, usize)>,
}

/// Paint the visible slice inside a scroll area.
///
/// The full content height is allocated so the scrollbar behaves as if every
/// row were drawn; only the slice rows are painted, at the slice offset.
pub fn msa_tiles(ui: &mut Ui, frame: &MsaFrame<'_>, style: &TileStyle) -> TileResponse {
    let width = ui.available_width();
    let (response, painter) = ui.allocate_painter(
        egui::vec2(width, frame.total_height.max(style.row_height)),
        Sense::click(),
    );
    let origin = response.rect.min;
    let scale = ColumnScale::new(
        origin.x + frame.label_width,
        (width - frame.label_width).min(frame.column_count() as f32 * style.max_tile_width),
        frame.display_start,
        frame.display_end,
    );
    let tile_w = scale.column_width();
    let font_size = (tile_w.min(style.tile_height) * 0.7).clamp(6.0, 16.0);
    let draw_letters = tile_w >= 7.0;
    let pad = ((style.row_height - style.tile_height) / 2.0).max(0.0);

    let row_top = |local: usize| origin.y + frame.slice.offset_px() + local as f32 * style.row_height;
    let clip = painter.clip_rect();

    for (local, row) in frame.slice.rows.iter().enumerate() {
        let top = row_top(local);
        if top > clip.bottom() || top + style.row_height < clip.top() {
            continue;
        }
        painter.text(
            egui::pos2(origin.x + frame.label_width - 6.0, top + style.row_height / 2.0),
            Align2::RIGHT_CENTER,
            &row.name,
            FontId::monospace(12.0),
            Color32::LIGHT_GRAY,
        );

        for column in frame.display_start..=frame.display_end {
            let Some(residue) = row.residue_at(column - 1) else {
                break;
            };
            let conservation = frame
                .conservation
                .get(column - 1)
                .map(|p| p.value)
                .unwrap_or(0.0);
            let rect = Rect::from_min_size(
                egui::pos2(scale.x_of(column), top + pad),
                egui::vec2(tile_w - 1.0, style.tile_height),
            );
            painter.rect_filled(rect, 1.0, residue_color(style.scheme, residue, conservation));
            if draw_letters {
                painter.text(
                    rect.center(),
                    Align2::CENTER_CENTER,
                    residue as char,
                    FontId::monospace(font_size),
                    TEXT,
                );
            }
        }
    }

    let pointer = response.hover_pos();
    let cell_at = |pos: Pos2| -> Option<(usize, usize)> {
        let column = scale.column_at(pos.x)?;
        let offset = pos.y - origin.y - frame.slice.offset_px();
        if offset < 0.0 {
            return None;
        }
        let local = (offset / style.row_height).floor() as usize;
        (local < frame.slice.rows.len()).then(|| (frame.slice.row_offset() + local, column))
    };

    for span in &frame.features {
        let Some((x0, x1)) = scale.span(span.column_start, span.column_end) else {
            continue;
        };
        let rect = Rect::from_min_max(
            egui::pos2(x0, row_top(span.row_start) + pad),
            egui::pos2(x1 - 1.0, row_top(span.row_end) + pad + style.tile_height),
        );
        let hovered = pointer.is_some_and(|p| rect.contains(p));
        let fill = if hovered {
            span.style.hover_fill_color.map(rgb)
        } else {
            let c = span.style.fill_color;
            Some(Color32::from_rgba_unmultiplied(c[0], c[1], c[2], 60))
        };
        if let Some(fill) = fill {
            painter.rect_filled(rect, 1.0, fill);
        }
        painter.rect_stroke(
            rect,
            1.0,
            Stroke::new(1.5, rgb(span.style.border_color)),
            StrokeKind::Outside,
        );
    }

    let hovered = pointer.and_then(cell_at);
    if let Some((_, column)) = hovered {
        let x = scale.x_of(column);
        painter.rect_stroke(
            Rect::from_min_max(
                egui::pos2(x, clip.top()),
                egui::pos2(x + tile_w - 1.0, clip.bottom()),
            ),
            0.0,
            Stroke::new(1.0, Color32::WHITE),
            StrokeKind::Inside,
        );
    }
    let clicked = if response.clicked() {
        response.interact_pointer_pos().and_then(cell_at)
    } else {
        None
    };

    TileResponse { hovered, clicked }
}

/// Tick spacing giving roughly `target` ticks over `span` columns
pub fn tick_step(span: usize, target: usize) -> usize {
    let raw = (span.max(1) as f64 / target.max(1) as f64).max(1.0);
    let magnitude = 10f64.powi(raw.log10().floor() as i32);
    let step = [1.0, 2.0, 5.0, 10.0]
        .iter()
        .map(|m| m * magnitude)
        .find(|s| *s >= raw)
        .unwrap_or(10.0 * magnitude);
    step as usize
}

/// Whole-sequence ruler with the display window highlighted.
///
/// Clicking or dragging centres the window on the pointer; the returned
/// range still needs clamping by the controller.
pub fn navigation_ruler(
    ui: &mut Ui,
    sequence_length: usize,
    display: (usize, usize),
    label_width: f32,
    height: f32,
) -> Option<(usize, usize)> {
    let width = ui.available_width();
    let (response, painter) =
        ui.allocate_painter(egui::vec2(width, height), Sense::click_and_drag());
    if sequence_length == 0 {
        return None;
    }
    let rect = response.rect;
    let scale = ColumnScale::new(rect.left() + label_width, width - label_width, 1, sequence_length);
    let baseline = rect.top() + height * 0.6;

    painter.line_segment(
        [
            egui::pos2(scale.left, baseline),
            egui::pos2(scale.left + scale.width, baseline),
        ],
        Stroke::new(1.0, Color32::GRAY),
    );
    let step = tick_step(sequence_length, 10);
    let mut tick = step;
    while tick <= sequence_length {
        let x = scale.center_of(tick);
        painter.line_segment(
            [egui::pos2(x, baseline - 4.0), egui::pos2(x, baseline + 4.0)],
            Stroke::new(1.0, Color32::GRAY),
        );
        painter.text(
            egui::pos2(x, baseline - 6.0),
            Align2::CENTER_BOTTOM,
            tick.to_string(),
            FontId::proportional(10.0),
            Color32::GRAY,
        );
        tick += step;
    }

    let (start, end) = display;
    if let Some((x0, x1)) = scale.span(start, end) {
        let window = Rect::from_min_max(
            egui::pos2(x0, rect.top() + 2.0),
            egui::pos2(x1.max(x0 + 2.0), rect.bottom() - 2.0),
        );
        painter.rect_filled(window, 2.0, Color32::from_rgba_unmultiplied(100, 150, 255, 50));
        painter.rect_stroke(
            window,
            2.0,
            Stroke::new(1.0, Color32::from_rgb(100, 150, 255)),
            StrokeKind::Inside,
        );
    }

    if !(response.clicked() || response.dragged()) {
        return None;
    }
    let pointer = response.interact_pointer_pos()?;
    let x = pointer.x.clamp(scale.left, scale.left + scale.width - 1.0);
    let column = scale.column_at(x)?;
    let width = end - start;
    let new_start = column.saturating_sub(width / 2).max(1);
    Some((new_start, new_start + width))
}

/// Variant markers in global columns, one lane per overlap level
pub fn variant_track(
    ui: &mut Ui,
    track: &[TrackFeature],
    display: (usize, usize),
    label_width: f32,
    lane_height: f32,
    track_height: f32,
) {
    let width = ui.available_width();
    let (response, painter) = ui.allocate_painter(egui::vec2(width, track_height), Sense::hover());
    let rect = response.rect;
    let scale = ColumnScale::new(rect.left() + label_width, width - label_width, display.0, display.1);
    painter.text(
        egui::pos2(rect.left() + label_width - 6.0, rect.top() + lane_height / 2.0),
        Align2::RIGHT_CENTER,
        "Variants",
        FontId::proportional(11.0),
        Color32::LIGHT_GRAY,
    );

    let fill = Color32::GRAY;
    let mut hovered: Option<&TrackFeature> = None;
    for feature in track {
        let Some((x0, x1)) = scale.span(feature.start, feature.end) else {
            continue;
        };
        let top = rect.top() + feature.lane as f32 * lane_height;
        let marker = Rect::from_min_max(
            egui::pos2(x0, top + 1.0),
            egui::pos2(x1.max(x0 + lane_height * 0.6), top + lane_height - 1.0),
        );
        painter.add(marker_shape(feature.shape, marker, fill));
        if response.hover_pos().is_some_and(|p| marker.contains(p)) {
            hovered = Some(feature);
        }
    }

    if let Some(feature) = hovered {
        response.on_hover_text(format!(
            "{}\nColumns {}-{}",
            feature.accession, feature.start, feature.end
        ));
    }
}

fn marker_shape(shape: FeatureShape, rect: Rect, fill: Color32) -> Shape {
    let c = rect.center();
    let points = match shape {
        FeatureShape::Diamond => vec![
            egui::pos2(c.x, rect.top()),
            egui::pos2(rect.right(), c.y),
            egui::pos2(c.x, rect.bottom()),
            egui::pos2(rect.left(), c.y),
        ],
        FeatureShape::Triangle => vec![
            egui::pos2(c.x, rect.top()),
            egui::pos2(rect.right(), rect.bottom()),
            egui::pos2(rect.left(), rect.bottom()),
        ],
        FeatureShape::Chevron => vec![
            egui::pos2(rect.left(), rect.top()),
            egui::pos2(c.x, c.y),
            egui::pos2(rect.right(), rect.top()),
            egui::pos2(rect.right(), rect.bottom()),
            egui::pos2(c.x, rect.bottom() - rect.height() * 0.4),
            egui::pos2(rect.left(), rect.bottom()),
        ],
    };
    match shape {
        // Concave outline, drawn as a closed line
        FeatureShape::Chevron => Shape::closed_line(points, Stroke::new(1.5, fill)),
        _ => Shape::convex_polygon(points, fill, Stroke::NONE),
    }
}

/// Conservation over the display window as a 0-100 line graph
pub fn line_graph(
    ui: &mut Ui,
    profile: &[ConservationPoint],
    display: (usize, usize),
    label_width: f32,
    height: f32,
) {
    let width = ui.available_width();
    let (response, painter) = ui.allocate_painter(egui::vec2(width, height), Sense::hover());
    let rect = response.rect;
    let scale = ColumnScale::new(rect.left() + label_width, width - label_width, display.0, display.1);
    let y_of = |value: f64| rect.bottom() - 2.0 - (value / 100.0) as f32 * (height - 4.0);

    painter.text(
        egui::pos2(rect.left() + label_width - 6.0, rect.center().y),
        Align2::RIGHT_CENTER,
        "Conservation",
        FontId::proportional(11.0),
        Color32::LIGHT_GRAY,
    );
    painter.line_segment(
        [
            egui::pos2(scale.left, y_of(0.0)),
            egui::pos2(scale.left + scale.width, y_of(0.0)),
        ],
        Stroke::new(0.5, Color32::DARK_GRAY),
    );

    let points: Vec<Pos2> = profile
        .iter()
        .filter(|p| p.position >= display.0 && p.position <= display.1)
        .map(|p| egui::pos2(scale.center_of(p.position), y_of(p.value)))
        .collect();
    if points.len() >= 2 {
        painter.add(Shape::line(points, Stroke::new(1.5, Color32::from_rgb(100, 180, 255))));
    }

    if let Some(column) = response.hover_pos().and_then(|p| scale.column_at(p.x)) {
        if let Some(point) = profile.get(column - 1) {
            response.on_hover_text(format!("Position {}: {:.1}%", point.position, point.value));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_column_scale_mapping() {
        let scale = ColumnScale::new(100.0, 500.0, 11, 60);
        assert_eq!(scale.column_count(), 50);
        assert_eq!(scale.column_width(), 10.0);
        assert_eq!(scale.x_of(11), 100.0);
        assert_eq!(scale.x_of(12), 110.0);
        assert_eq!(scale.column_at(105.0), Some(11));
        assert_eq!(scale.column_at(599.0), Some(60));
        assert_eq!(scale.column_at(99.0), None);
        assert_eq!(scale.column_at(600.0), None);
    }

    #[test]
    fn test_span_clipped_to_window() {
        let scale = ColumnScale::new(0.0, 100.0, 1, 10);
        assert_eq!(scale.span(3, 4), Some((20.0, 40.0)));
        assert_eq!(scale.span(8, 40), Some((70.0, 100.0)));
        assert_eq!(scale.span(11, 12), None);
    }

    #[test]
    fn test_tick_step() {
        assert_eq!(tick_step(100, 10), 10);
        assert_eq!(tick_step(1000, 10), 100);
        assert_eq!(tick_step(350, 10), 50);
        assert_eq!(tick_step(15, 10), 2);
        assert_eq!(tick_step(5, 10), 1);
    }
}
