//! Per-frame inputs for the alignment widgets
//!
//! Columns stay in global alignment space everywhere. Rows handed to the
//! tile painter are the visible slice only, so feature rows are re-based onto
//! that slice here.

use crate::analysis::{AlignmentAnalytics, ConservationPoint, FeatureSpan, TrackFeature};
use crate::config::RenderConfig;
use crate::viewport::{rebase_features, ViewportController, VisibleSlice};

pub struct MsaFrame<'a> {
    pub slice: VisibleSlice<'a>,
    /// Spans with slice-local rows
    pub features: Vec<FeatureSpan>,
    pub display_start: usize,
    pub display_end: usize,
    pub sequence_length: usize,
    /// Height of the scroll content as if every row were drawn
    pub total_height: f32,
    /// `None` when no variant lands on a visible row
    pub track: Option<&'a [TrackFeature]>,
    pub track_height: f32,
    pub conservation: &'a [ConservationPoint],
    pub label_width: f32,
}

impl MsaFrame<'_> {
    /// Number of columns inside the display window, inclusive
    pub fn column_count(&self) -> usize {
        self.display_end + 1 - self.display_start
    }
}

pub fn build_frame<'a>(
    analytics: &'a AlignmentAnalytics,
    controller: &ViewportController,
    render: &RenderConfig,
) -> MsaFrame<'a> {
    let window = controller.visible_rows();
    let slice = VisibleSlice::new(analytics.set().rows(), window);
    let all = analytics.features();
    let features = rebase_features(&all.spans, &slice.window);
    let (display_start, display_end) = controller.display_range();

    MsaFrame {
        track: (!features.is_empty()).then_some(all.track.as_slice()),
        track_height: all.track_height(render.lane_height),
        features,
        slice,
        display_start,
        display_end,
        sequence_length: analytics.sequence_length(),
        total_height: controller.total_height(),
        conservation: analytics.conservation(),
        label_width: analytics.label_width(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::{AlignmentRow, AlignmentSet, SeqInfo, SeqInfoDict, VariantAnnotation};
    use crate::config::ViewportConfig;
    use std::sync::Arc;

    fn variant(id: &str, pos: usize) -> VariantAnnotation {
        serde_json::from_value(serde_json::json!({
            "alignment_start_pos": pos,
            "alignment_end_pos": pos,
            "variant_id": id,
            "seq_substitution_type": "deletion",
        }))
        .unwrap()
    }

    fn analytics(rows: usize) -> AlignmentAnalytics {
        let set = AlignmentSet::new(
            (0..rows)
                .map(|i| AlignmentRow::new(format!("seq{}", i), "MKLVAAGT".repeat(20)))
                .collect(),
        );
        let mut dict = SeqInfoDict::new();
        dict.insert(
            "seq150".to_string(),
            SeqInfo {
                embedded_variants: Some(vec![variant("rs1", 140)]),
                error: None,
            },
        );
        AlignmentAnalytics::new(Arc::new(set), Arc::new(dict), 9.0)
    }

    #[test]
    fn test_frame_rebases_rows_not_columns() {
        let a = analytics(500);
        let mut c = ViewportController::new(ViewportConfig::default());
        c.initialize(500, a.sequence_length(), 600.0);
        // Rows 140.. on screen, slice starts at 130
        c.scroll(140.0 * 36.0);
        let frame = build_frame(&a, &c, &RenderConfig::default());

        assert_eq!(frame.slice.row_offset(), 130);
        assert_eq!(frame.features.len(), 1);
        assert_eq!(frame.features[0].row_start, 20);
        assert_eq!(frame.features[0].column_start, 140);
        assert_eq!(frame.slice.rows[20].name, "seq150");
        assert_eq!(frame.track.map(|t| t.len()), Some(1));
        assert_eq!(frame.track_height, 15.0);
        assert_eq!(frame.total_height, 500.0 * 36.0);
        assert_eq!(frame.conservation.len(), 160);
        assert_eq!(frame.label_width, 54.0);
    }

    #[test]
    fn test_track_hidden_when_variant_rows_off_screen() {
        let a = analytics(500);
        let mut c = ViewportController::new(ViewportConfig::default());
        c.initialize(500, a.sequence_length(), 600.0);
        let frame = build_frame(&a, &c, &RenderConfig::default());
        assert!(frame.features.is_empty());
        assert!(frame.track.is_none());
        assert_eq!(frame.column_count(), 51);
    }
}
