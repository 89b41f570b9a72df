//! Per-position analytics derived from a parsed alignment
//!
//! Everything here is a pure function of the alignment and its variant
//! metadata. None of it depends on the viewport, so results are computed
//! once per alignment (see `memo`) and reused across scroll/pan/zoom.

use rayon::prelude::*;
use std::collections::HashMap;

use super::residues::{iupac_code_for, is_gap, residue_properties, MoleculeType};
use super::types::{
    AlignmentSet, AlleleInfo, AlignmentStats, ConservationLevel, ConservationPoint, FeatureSpan,
    FeatureStyle, PositionData, ResidueCount, SeqInfo, SeqInfoDict, TrackFeature, VariantFeatures,
};

/// Longest row in the set, 0 when empty
pub fn sequence_length(set: &AlignmentSet) -> usize {
    set.rows()
        .iter()
        .map(|row| row.sequence.len())
        .max()
        .unwrap_or(0)
}

/// Conservation score for every column.
///
/// The score is the count of the most frequent non-gap residue divided by
/// the total row count, in percent. Rows shorter than the column count as
/// absent. Fewer than two rows gives an empty profile.
pub fn conservation_profile(set: &AlignmentSet) -> Vec<ConservationPoint> {
    let length = sequence_length(set);
    let total = set.len();
    if total < 2 || length == 0 {
        return Vec::new();
    }

    let rows: Vec<&[u8]> = set.rows().iter().map(|r| r.sequence.as_bytes()).collect();

    (0..length)
        .into_par_iter()
        .map(|pos| ConservationPoint {
            position: pos + 1,
            value: column_conservation(&rows, pos, total),
        })
        .collect()
}

fn column_conservation(rows: &[&[u8]], pos: usize, total: usize) -> f64 {
    let mut counts = [0u32; 256];
    let mut max_count = 0u32;
    for row in rows {
        if let Some(&b) = row.get(pos) {
            if is_gap(b) {
                continue;
            }
            let count = &mut counts[b as usize];
            *count += 1;
            if *count > max_count {
                max_count = *count;
            }
        }
    }
    if max_count == 0 {
        0.0
    } else {
        (max_count as f64 / total as f64) * 100.0
    }
}

/// Project variant metadata onto alignment rows.
///
/// Spans use global row indices and the annotations' 1-based columns as-is.
/// The track gets one marker per variant, laid out in non-overlapping lanes.
pub fn variant_features(
    set: &AlignmentSet,
    row_index_by_name: &HashMap<&str, usize>,
    variants: &SeqInfoDict,
) -> VariantFeatures {
    let mut rows: Vec<(usize, &str, &SeqInfo)> = Vec::new();
    for (name, info) in variants {
        match row_index_by_name.get(name.as_str()) {
            Some(&row_index) if row_index < set.len() => {
                rows.push((row_index, name.as_str(), info))
            }
            _ if !info.variants().is_empty() => {
                log::debug!("Variants for '{}' have no alignment row", name);
            }
            _ => {}
        }
    }
    // Vertical order, so spans follow the rows they sit on
    rows.sort_by_key(|&(row_index, _, _)| row_index);

    let mut spans = Vec::new();
    let mut track = Vec::new();

    for (row_index, name, info) in rows {
        for variant in info.variants() {
            spans.push(FeatureSpan {
                row_start: row_index,
                row_end: row_index,
                column_start: variant.alignment_start_pos,
                column_end: variant.alignment_end_pos,
                id: format!("feature_{}_{}", name, variant.variant_id),
                style: FeatureStyle::default(),
            });
            track.push(TrackFeature {
                accession: variant.variant_id.clone(),
                start: variant.alignment_start_pos,
                end: variant.alignment_end_pos,
                shape: variant.substitution_type().into(),
                lane: 0,
            });
        }
    }

    let max_overlap = max_overlap(&track);
    assign_lanes(&mut track);

    VariantFeatures {
        spans,
        track,
        max_overlap,
    }
}

/// Highest number of inclusive `[start, end]` ranges covering one column
fn max_overlap(track: &[TrackFeature]) -> usize {
    let mut events: Vec<(usize, i64)> = Vec::with_capacity(track.len() * 2);
    for feature in track.iter().filter(|f| f.start <= f.end) {
        events.push((feature.start, 1));
        events.push((feature.end + 1, -1));
    }
    // Closing events sort before openings at the same column
    events.sort_unstable();

    let mut current = 0i64;
    let mut best = 0i64;
    for (_, delta) in events {
        current += delta;
        best = best.max(current);
    }
    best as usize
}

/// Greedy interval layout: each marker takes the first lane whose last
/// marker ends before it starts.
fn assign_lanes(track: &mut [TrackFeature]) {
    let mut order: Vec<usize> = (0..track.len()).collect();
    order.sort_by_key(|&i| (track[i].start, track[i].end));

    let mut lane_ends: Vec<usize> = Vec::new();
    for i in order {
        let feature = &mut track[i];
        match lane_ends.iter().position(|&end| end < feature.start) {
            Some(lane) => {
                lane_ends[lane] = feature.end;
                feature.lane = lane;
            }
            None => {
                feature.lane = lane_ends.len();
                lane_ends.push(feature.end);
            }
        }
    }
}

/// Pixel width for row labels, sized to the longest name
pub fn label_width(set: &AlignmentSet, char_width: f32) -> f32 {
    let longest = set
        .rows()
        .iter()
        .map(|row| row.name.chars().count())
        .max()
        .unwrap_or(0);
    longest as f32 * char_width
}

/// Summary numbers for the whole alignment
pub fn alignment_stats(set: &AlignmentSet, variants: &SeqInfoDict) -> AlignmentStats {
    let sequence_count = set.len();
    let alignment_length = sequence_length(set);

    let mut total_chars = 0usize;
    let mut total_gaps = 0usize;
    for row in set.rows() {
        total_chars += row.sequence.len();
        total_gaps += row.sequence.bytes().filter(|&b| is_gap(b)).count();
    }
    let gap_percentage = if total_chars > 0 {
        (total_gaps as f64 / total_chars as f64) * 100.0
    } else {
        0.0
    };

    let conservation_score = if alignment_length > 0 && sequence_count > 1 {
        let rows: Vec<&[u8]> = set.rows().iter().map(|r| r.sequence.as_bytes()).collect();
        let conserved = (0..alignment_length)
            .into_par_iter()
            .filter(|&pos| is_fully_conserved(&rows, pos))
            .count();
        (conserved as f64 / alignment_length as f64) * 100.0
    } else {
        0.0
    };

    let variants_count = variants.values().map(|info| info.variants().len()).sum();
    let failures_count = variants.values().filter(|info| info.error.is_some()).count();

    AlignmentStats {
        sequence_count,
        alignment_length,
        conservation_score,
        gap_percentage,
        variants_count,
        failures_count,
    }
}

/// A column is fully conserved when it holds exactly one distinct
/// (case-insensitive) non-gap residue.
fn is_fully_conserved(rows: &[&[u8]], pos: usize) -> bool {
    let mut seen: Option<u8> = None;
    for row in rows {
        let Some(&b) = row.get(pos) else {
            continue;
        };
        if is_gap(b) {
            continue;
        }
        let b = b.to_ascii_uppercase();
        match seen {
            None => seen = Some(b),
            Some(s) if s != b => return false,
            Some(_) => {}
        }
    }
    seen.is_some()
}

/// Details for a 1-based column; `None` outside the alignment
pub fn position_info(
    set: &AlignmentSet,
    profile: &[ConservationPoint],
    variants: &SeqInfoDict,
    molecule: MoleculeType,
    position: usize,
) -> Option<PositionData> {
    if position == 0 || position > sequence_length(set) {
        return None;
    }
    let column = position - 1;
    let total = set.len();

    let mut counts: HashMap<u8, usize> = HashMap::new();
    let mut gap_count = 0usize;
    for row in set.rows() {
        match row.residue_at(column) {
            Some(b) if !is_gap(b) => *counts.entry(b.to_ascii_uppercase()).or_insert(0) += 1,
            _ => gap_count += 1,
        }
    }

    let mut residues: Vec<ResidueCount> = counts
        .into_iter()
        .map(|(residue, count)| {
            let props = residue_properties(residue);
            ResidueCount {
                residue: residue as char,
                count,
                percentage: (count as f64 / total as f64) * 100.0,
                name: props.name,
                property: props.property,
            }
        })
        .collect();
    // Sort by count descending, ties alphabetical
    residues.sort_by(|a, b| b.count.cmp(&a.count).then(a.residue.cmp(&b.residue)));

    let conservation = profile
        .get(column)
        .map(|p| p.value / 100.0)
        .unwrap_or(0.0);

    let ambiguity_code = match molecule {
        MoleculeType::Nucleotide => {
            iupac_code_for(set.rows().iter().filter_map(|r| r.residue_at(column)))
        }
        MoleculeType::Protein => None,
    };

    let mut covering = Vec::new();
    for row in set.rows() {
        if let Some(info) = variants.get(&row.name) {
            for variant in info.variants().iter().filter(|v| v.covers(position)) {
                covering.push((row.name.clone(), variant.clone()));
            }
        }
    }

    Some(PositionData {
        position,
        consensus_residue: residues.first().map(|r| r.residue),
        residues,
        conservation,
        level: ConservationLevel::from_fraction(conservation),
        gap_count,
        total_sequences: total,
        ambiguity_code,
        variants: covering,
    })
}

/// Flatten every variant into display records, ordered by row name
pub fn allele_info(variants: &SeqInfoDict) -> Vec<AlleleInfo> {
    let mut alleles = Vec::new();
    for (seq_name, info) in variants {
        for variant in info.variants() {
            let location = format!(
                "{}:{}-{}",
                variant.genomic_seq_id.as_deref().unwrap_or("?"),
                variant
                    .genomic_start_pos
                    .map(|p| p.to_string())
                    .unwrap_or_else(|| "?".to_string()),
                variant
                    .genomic_end_pos
                    .map(|p| p.to_string())
                    .unwrap_or_else(|| "?".to_string()),
            );
            alleles.push(AlleleInfo {
                seq_name: seq_name.clone(),
                variant_id: variant.variant_id.clone(),
                ref_seq: variant.genomic_ref_seq.clone().unwrap_or_else(|| "-".to_string()),
                alt_seq: variant.genomic_alt_seq.clone().unwrap_or_else(|| "-".to_string()),
                position: location,
                kind: variant.seq_substitution_type.clone(),
            });
        }
    }
    alleles
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::types::{AlignmentRow, FeatureShape, SeqInfo, VariantAnnotation};

    fn set_of(rows: &[(&str, &str)]) -> AlignmentSet {
        AlignmentSet::new(
            rows.iter()
                .map(|(name, seq)| AlignmentRow::new(*name, *seq))
                .collect(),
        )
    }

    fn variant(id: &str, start: usize, end: usize, kind: &str) -> VariantAnnotation {
        VariantAnnotation {
            alignment_start_pos: start,
            alignment_end_pos: end,
            variant_id: id.to_string(),
            seq_substitution_type: kind.to_string(),
            seq_start_pos: None,
            seq_end_pos: None,
            seq_length: None,
            genomic_seq_id: Some("chr17".to_string()),
            genomic_start_pos: Some(7_676_154),
            genomic_end_pos: None,
            genomic_ref_seq: Some("C".to_string()),
            genomic_alt_seq: None,
        }
    }

    fn dict(entries: Vec<(&str, Vec<VariantAnnotation>)>) -> SeqInfoDict {
        entries
            .into_iter()
            .map(|(name, vs)| {
                (
                    name.to_string(),
                    SeqInfo {
                        embedded_variants: Some(vs),
                        error: None,
                    },
                )
            })
            .collect()
    }

    #[test]
    fn test_sequence_length() {
        assert_eq!(sequence_length(&AlignmentSet::default()), 0);
        assert_eq!(sequence_length(&set_of(&[("a", "AC"), ("b", "ACGT-")])), 5);
    }

    #[test]
    fn test_conservation_single_mismatch_column() {
        let set = set_of(&[("a", "AAAAAAAAAA"), ("b", "AAAAAAAAAT"), ("c", "AAAAAAAAAA")]);
        let profile = conservation_profile(&set);
        assert_eq!(profile.len(), 10);
        for point in &profile[..9] {
            assert_eq!(point.value, 100.0);
        }
        assert_eq!(profile[9].position, 10);
        assert!((profile[9].value - 200.0 / 3.0).abs() < 1e-9);
    }

    #[test]
    fn test_conservation_gaps_and_bounds() {
        let set = set_of(&[("a", "A-C."), ("b", "A-G"), ("c", "T.")]);
        let profile = conservation_profile(&set);
        assert_eq!(profile.len(), sequence_length(&set));
        // all-gap column
        assert_eq!(profile[1].value, 0.0);
        // "A", "A", "T": plurality over all rows
        assert!((profile[0].value - 200.0 / 3.0).abs() < 1e-9);
        // c is too short for column 3 and still counts in the denominator
        assert!((profile[2].value - 100.0 / 3.0).abs() < 1e-9);
        assert!(profile.iter().all(|p| (0.0..=100.0).contains(&p.value)));
    }

    #[test]
    fn test_conservation_needs_two_rows() {
        assert!(conservation_profile(&set_of(&[("a", "ACGT")])).is_empty());
        assert!(conservation_profile(&AlignmentSet::default()).is_empty());
    }

    #[test]
    fn test_variant_features_projection() {
        let set = set_of(&[("a", "MKLV"), ("b", "MKLV"), ("c", "MKLV")]);
        let variants = dict(vec![
            ("c", vec![variant("rs1", 2, 3, "deletion"), variant("rs2", 3, 3, "insertion")]),
            ("a", vec![variant("rs3", 1, 4, "missense")]),
            ("not_in_alignment", vec![variant("rs4", 1, 1, "missense")]),
        ]);
        let features = variant_features(&set, &set.row_index_by_name(), &variants);

        assert_eq!(features.spans.len(), 3);
        assert_eq!(features.spans[0].row_start, 0);
        assert_eq!(features.spans[0].id, "feature_a_rs3");
        assert_eq!(features.spans[1].row_start, 2);
        assert_eq!(features.spans[1].row_end, 2);
        assert_eq!((features.spans[1].column_start, features.spans[1].column_end), (2, 3));

        // column 3 is covered by all three variants
        assert_eq!(features.max_overlap, 3);
        assert_eq!(features.track_height(15.0), 45.0);

        let shapes: Vec<FeatureShape> = features.track.iter().map(|t| t.shape).collect();
        assert_eq!(
            shapes,
            vec![FeatureShape::Diamond, FeatureShape::Triangle, FeatureShape::Chevron]
        );
        let mut lanes: Vec<usize> = features.track.iter().map(|t| t.lane).collect();
        lanes.sort_unstable();
        assert_eq!(lanes, vec![0, 1, 2]);
    }

    #[test]
    fn test_variant_features_follow_row_index() {
        let set = set_of(&[("a", "MKLV"), ("b", "MKLV"), ("a", "MKLV")]);
        let index = set.row_index_by_name();
        assert_eq!(index["a"], 0);
        assert_eq!(index["b"], 1);

        let variants = dict(vec![
            ("b", vec![variant("rs1", 1, 1, "deletion")]),
            ("a", vec![variant("rs2", 2, 2, "deletion")]),
        ]);
        let features = variant_features(&set, &index, &variants);
        let rows: Vec<usize> = features.spans.iter().map(|s| s.row_start).collect();
        assert_eq!(rows, vec![0, 1]);
        assert_eq!(features.spans[0].id, "feature_a_rs2");
    }

    #[test]
    fn test_track_lanes_reuse_free_space() {
        let set = set_of(&[("a", "MKLVMKLV")]);
        let variants = dict(vec![(
            "a",
            vec![variant("x", 1, 2, ""), variant("y", 3, 4, ""), variant("z", 2, 3, "")],
        )]);
        let features = variant_features(&set, &set.row_index_by_name(), &variants);
        assert_eq!(features.max_overlap, 2);
        assert_eq!(features.track[0].lane, 0);
        assert_eq!(features.track[1].lane, 0);
        assert_eq!(features.track[2].lane, 1);
    }

    #[test]
    fn test_empty_inputs() {
        let empty = AlignmentSet::default();
        let features = variant_features(&empty, &empty.row_index_by_name(), &SeqInfoDict::new());
        assert!(features.is_empty());
        assert_eq!(features.track_height(15.0), 15.0);
        assert_eq!(label_width(&empty, 9.0), 0.0);
        let stats = alignment_stats(&empty, &SeqInfoDict::new());
        assert_eq!(stats.alignment_length, 0);
        assert_eq!(stats.gap_percentage, 0.0);
    }

    #[test]
    fn test_label_width() {
        let set = set_of(&[("short", "A"), ("longer_name", "A")]);
        assert_eq!(label_width(&set, 9.0), 99.0);
    }

    #[test]
    fn test_alignment_stats() {
        let set = set_of(&[("a", "MK-L"), ("b", "mKQL"), ("c", "MR-L")]);
        let mut variants = dict(vec![("a", vec![variant("rs1", 1, 1, "missense")])]);
        variants.insert(
            "b".to_string(),
            SeqInfo {
                embedded_variants: None,
                error: Some("lookup failed".to_string()),
            },
        );
        let stats = alignment_stats(&set, &variants);
        assert_eq!(stats.sequence_count, 3);
        assert_eq!(stats.alignment_length, 4);
        // columns 1, 3 and 4 are fully conserved (case-insensitive)
        assert!((stats.conservation_score - 75.0).abs() < 1e-9);
        assert!((stats.gap_percentage - 2.0 / 12.0 * 100.0).abs() < 1e-9);
        assert_eq!(stats.variants_count, 1);
        assert_eq!(stats.failures_count, 1);
    }

    #[test]
    fn test_position_info() {
        let set = set_of(&[("a", "ACGT"), ("b", "ACGA"), ("c", "AC-A"), ("d", "TC")]);
        let profile = conservation_profile(&set);
        let variants = dict(vec![("b", vec![variant("rs9", 3, 4, "substitution")])]);

        let info = position_info(&set, &profile, &variants, MoleculeType::Nucleotide, 4).unwrap();
        assert_eq!(info.total_sequences, 4);
        // d is too short and counts as a gap
        assert_eq!(info.gap_count, 1);
        assert_eq!(info.consensus_residue, Some('A'));
        assert_eq!(info.residues[0].count, 2);
        assert_eq!(info.residues[0].percentage, 50.0);
        assert_eq!(info.ambiguity_code, Some('W'));
        assert_eq!(info.conservation, 0.5);
        assert_eq!(info.level, ConservationLevel::ModeratelyConserved);
        assert_eq!(info.variants.len(), 1);
        assert_eq!(info.variants[0].0, "b");

        let first = position_info(&set, &profile, &variants, MoleculeType::Protein, 1).unwrap();
        assert_eq!(first.ambiguity_code, None);
        assert_eq!(first.residues[0].name, "Alanine");

        assert!(position_info(&set, &profile, &variants, MoleculeType::Protein, 0).is_none());
        assert!(position_info(&set, &profile, &variants, MoleculeType::Protein, 5).is_none());
    }

    #[test]
    fn test_allele_info() {
        let variants = dict(vec![("b", vec![variant("rs9", 3, 4, "deletion")])]);
        let alleles = allele_info(&variants);
        assert_eq!(alleles.len(), 1);
        assert_eq!(alleles[0].ref_seq, "C");
        assert_eq!(alleles[0].alt_seq, "-");
        assert_eq!(alleles[0].position, "chr17:7676154-?");
        assert_eq!(alleles[0].kind, "deletion");
    }
}
