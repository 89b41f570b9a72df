//! Data types for alignment analysis

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};

/// One named row of a multiple sequence alignment
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AlignmentRow {
    pub name: String,
    pub sequence: String,
}

impl AlignmentRow {
    pub fn new(name: impl Into<String>, sequence: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            sequence: sequence.into(),
        }
    }

    /// Residue at a 0-based column, `None` past the end of this row
    #[inline]
    pub fn residue_at(&self, column: usize) -> Option<u8> {
        self.sequence.as_bytes().get(column).copied()
    }
}

/// Ordered, immutable set of alignment rows.
///
/// Row order is the vertical rendering order and the index space used when
/// projecting variants onto rows.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AlignmentSet {
    rows: Vec<AlignmentRow>,
}

impl AlignmentSet {
    pub fn new(rows: Vec<AlignmentRow>) -> Self {
        Self { rows }
    }

    pub fn rows(&self) -> &[AlignmentRow] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// First index of each row name
    pub fn row_index_by_name(&self) -> HashMap<&str, usize> {
        let mut index = HashMap::with_capacity(self.rows.len());
        for (i, row) in self.rows.iter().enumerate() {
            index.entry(row.name.as_str()).or_insert(i);
        }
        index
    }
}

/// How a variant changes the sequence
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SubstitutionType {
    Substitution,
    Insertion,
    Deletion,
    Delins,
    Missense,
    Other,
}

impl SubstitutionType {
    pub fn from_label(label: &str) -> Self {
        match label.to_ascii_lowercase().as_str() {
            "substitution" => Self::Substitution,
            "insertion" => Self::Insertion,
            "deletion" => Self::Deletion,
            "delins" => Self::Delins,
            "missense" => Self::Missense,
            _ => Self::Other,
        }
    }
}

/// A variant embedded in one alignment row.
///
/// Alignment positions are 1-based columns, already resolved upstream.
/// Field names follow the pipeline's JSON.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VariantAnnotation {
    pub alignment_start_pos: usize,
    pub alignment_end_pos: usize,
    pub variant_id: String,
    #[serde(default)]
    pub seq_substitution_type: String,
    #[serde(default)]
    pub seq_start_pos: Option<usize>,
    #[serde(default)]
    pub seq_end_pos: Option<usize>,
    #[serde(default)]
    pub seq_length: Option<usize>,
    #[serde(default)]
    pub genomic_seq_id: Option<String>,
    #[serde(default)]
    pub genomic_start_pos: Option<u64>,
    #[serde(default)]
    pub genomic_end_pos: Option<u64>,
    #[serde(default)]
    pub genomic_ref_seq: Option<String>,
    #[serde(default)]
    pub genomic_alt_seq: Option<String>,
}

impl VariantAnnotation {
    pub fn substitution_type(&self) -> SubstitutionType {
        SubstitutionType::from_label(&self.seq_substitution_type)
    }

    /// Whether the variant covers a 1-based alignment column
    pub fn covers(&self, position: usize) -> bool {
        self.alignment_start_pos <= position && position <= self.alignment_end_pos
    }
}

/// Per-row metadata delivered alongside the alignment
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SeqInfo {
    #[serde(default)]
    pub embedded_variants: Option<Vec<VariantAnnotation>>,
    #[serde(default)]
    pub error: Option<String>,
}

impl SeqInfo {
    pub fn variants(&self) -> &[VariantAnnotation] {
        self.embedded_variants.as_deref().unwrap_or(&[])
    }
}

/// Row name -> metadata, ordered by name
pub type SeqInfoDict = BTreeMap<String, SeqInfo>;

/// Conservation at one 1-based column, in percent
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ConservationPoint {
    pub position: usize,
    pub value: f64,
}

/// Colors for a highlighted tile span (RGB)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeatureStyle {
    pub border_color: [u8; 3],
    pub fill_color: [u8; 3],
    /// `None` renders transparent under the pointer
    pub hover_fill_color: Option<[u8; 3]>,
}

impl Default for FeatureStyle {
    fn default() -> Self {
        Self {
            border_color: [0, 0, 0],
            fill_color: [0, 0, 0],
            hover_fill_color: None,
        }
    }
}

/// Highlighted region in row/column coordinates.
///
/// Columns are always 1-based global alignment columns. Rows are 0-based and
/// global until re-based onto a visible slice.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeatureSpan {
    pub row_start: usize,
    pub row_end: usize,
    pub column_start: usize,
    pub column_end: usize,
    pub id: String,
    pub style: FeatureStyle,
}

/// Marker shape in the variant track
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FeatureShape {
    Diamond,
    Triangle,
    Chevron,
}

impl From<SubstitutionType> for FeatureShape {
    fn from(kind: SubstitutionType) -> Self {
        match kind {
            SubstitutionType::Deletion => Self::Triangle,
            SubstitutionType::Insertion => Self::Chevron,
            _ => Self::Diamond,
        }
    }
}

/// One marker in the variant overview track
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrackFeature {
    pub accession: String,
    pub start: usize,
    pub end: usize,
    pub shape: FeatureShape,
    /// Non-overlapping layout lane, 0 = top
    pub lane: usize,
}

/// Everything derived from projecting variants onto the alignment
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct VariantFeatures {
    pub spans: Vec<FeatureSpan>,
    pub track: Vec<TrackFeature>,
    /// Highest number of variants covering any single column
    pub max_overlap: usize,
}

impl VariantFeatures {
    pub fn is_empty(&self) -> bool {
        self.spans.is_empty()
    }

    /// Track height, never less than one lane
    pub fn track_height(&self, lane_height: f32) -> f32 {
        self.max_overlap.max(1) as f32 * lane_height
    }
}

/// Whole-alignment summary numbers
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AlignmentStats {
    pub sequence_count: usize,
    pub alignment_length: usize,
    /// Percent of columns with a single distinct residue
    pub conservation_score: f64,
    pub gap_percentage: f64,
    pub variants_count: usize,
    pub failures_count: usize,
}

/// Count of one residue at a column
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ResidueCount {
    pub residue: char,
    pub count: usize,
    pub percentage: f64,
    pub name: &'static str,
    pub property: &'static str,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ConservationLevel {
    HighlyConserved,
    Conserved,
    ModeratelyConserved,
    Variable,
}

impl ConservationLevel {
    /// Classify a conservation fraction in `[0, 1]`
    pub fn from_fraction(score: f64) -> Self {
        if score >= 0.9 {
            Self::HighlyConserved
        } else if score >= 0.7 {
            Self::Conserved
        } else if score >= 0.5 {
            Self::ModeratelyConserved
        } else {
            Self::Variable
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::HighlyConserved => "Highly Conserved",
            Self::Conserved => "Conserved",
            Self::ModeratelyConserved => "Moderately Conserved",
            Self::Variable => "Variable",
        }
    }
}

/// Details for one clicked column
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PositionData {
    pub position: usize,
    pub residues: Vec<ResidueCount>,
    /// Fraction in `[0, 1]`
    pub conservation: f64,
    pub level: ConservationLevel,
    pub gap_count: usize,
    pub total_sequences: usize,
    pub consensus_residue: Option<char>,
    /// IUPAC code covering the column, nucleotide alignments only
    pub ambiguity_code: Option<char>,
    /// (row name, variant) pairs covering the column
    pub variants: Vec<(String, VariantAnnotation)>,
}

/// Flattened variant description for the allele panel
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AlleleInfo {
    pub seq_name: String,
    pub variant_id: String,
    pub ref_seq: String,
    pub alt_seq: String,
    pub position: String,
    pub kind: String,
}
