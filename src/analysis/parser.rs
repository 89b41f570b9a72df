//! Alignment text parsing and export
//!
//! Input is normally Clustal block format: an optional header line, then
//! blank-line separated blocks of `<name> <sequence chunk> [count]` lines,
//! with the same names recurring in every block. FASTA-formatted alignments
//! are accepted as well.

use serde::Serialize;

use super::analytics::sequence_length;
use super::residues::is_sequence_char;
use super::types::{AlignmentRow, AlignmentSet};
use crate::error::{Result, ViewerError};

/// Residues per line in written alignments
pub const BLOCK_SIZE: usize = 60;

const CLUSTAL_HEADER: &str = "CLUSTAL W (1.83) multiple sequence alignment";

/// Recognized alignment text formats
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AlignmentFormat {
    Clustal,
    Fasta,
}

impl AlignmentFormat {
    /// Guess the format from the first non-blank line
    pub fn detect(text: &str) -> Option<Self> {
        let first = text.lines().map(str::trim).find(|l| !l.is_empty())?;
        if first.starts_with('>') {
            Some(Self::Fasta)
        } else {
            Some(Self::Clustal)
        }
    }
}

/// Formats the alignment can be exported to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportFormat {
    Clustal,
    Fasta,
    Phylip,
    Json,
}

impl ExportFormat {
    pub const ALL: [ExportFormat; 4] = [Self::Clustal, Self::Fasta, Self::Phylip, Self::Json];

    pub fn label(&self) -> &'static str {
        match self {
            Self::Clustal => "Clustal",
            Self::Fasta => "FASTA",
            Self::Phylip => "PHYLIP",
            Self::Json => "JSON",
        }
    }

    pub fn extension(&self) -> &'static str {
        match self {
            Self::Clustal => "aln",
            Self::Fasta => "fasta",
            Self::Phylip => "phy",
            Self::Json => "json",
        }
    }
}

/// Parse alignment text in any supported format.
///
/// Empty input yields `EmptyAlignment`; callers treat every error here as
/// "nothing to render".
pub fn parse_alignment(text: &str) -> Result<AlignmentSet> {
    match AlignmentFormat::detect(text) {
        Some(AlignmentFormat::Fasta) => parse_fasta(text),
        Some(AlignmentFormat::Clustal) => parse_clustal(text),
        None => Err(ViewerError::EmptyAlignment),
    }
}

fn is_header_line(line: &str) -> bool {
    let trimmed = line.trim();
    trimmed.starts_with("CLUSTAL")
        || trimmed.contains("multiple sequence alignment")
        || trimmed.starts_with("MUSCLE")
}

fn is_conservation_line(line: &str) -> bool {
    line.trim()
        .bytes()
        .all(|b| matches!(b, b'*' | b':' | b'.' | b' '))
}

/// Parse Clustal block format. Chunks for a recurring name are concatenated
/// in order of appearance; row order is order of first appearance.
pub fn parse_clustal(text: &str) -> Result<AlignmentSet> {
    let mut rows: Vec<AlignmentRow> = Vec::new();
    let mut index: std::collections::HashMap<String, usize> = std::collections::HashMap::new();
    let mut seen_content = false;

    for (i, line) in text.lines().enumerate() {
        let line_no = i + 1;
        if line.trim().is_empty() {
            continue;
        }

        if !seen_content {
            seen_content = true;
            if is_header_line(line) {
                continue;
            }
        }

        // Conservation lines are indented under the sequence data
        if line.starts_with(char::is_whitespace) {
            if is_conservation_line(line) {
                continue;
            }
            return Err(ViewerError::parse(line_no, "unexpected indented line"));
        }

        let mut parts = line.split_whitespace();
        let Some(name) = parts.next() else {
            continue;
        };
        let Some(chunk) = parts.next() else {
            return Err(ViewerError::parse(
                line_no,
                format!("sequence line for '{}' has no residues", name),
            ));
        };
        if let Some(count) = parts.next() {
            if !count.bytes().all(|b| b.is_ascii_digit()) {
                return Err(ViewerError::parse(
                    line_no,
                    format!("unexpected token '{}' after sequence", count),
                ));
            }
        }
        if parts.next().is_some() {
            return Err(ViewerError::parse(line_no, "too many fields on sequence line"));
        }
        if let Some(bad) = chunk.bytes().find(|&b| !is_sequence_char(b)) {
            return Err(ViewerError::parse(
                line_no,
                format!("invalid character '{}' in sequence '{}'", bad as char, name),
            ));
        }

        match index.get(name) {
            Some(&row) => rows[row].sequence.push_str(chunk),
            None => {
                index.insert(name.to_string(), rows.len());
                rows.push(AlignmentRow::new(name, chunk));
            }
        }
    }

    if rows.is_empty() {
        return Err(ViewerError::EmptyAlignment);
    }
    Ok(AlignmentSet::new(rows))
}

/// Parse FASTA-formatted aligned sequences. Every record becomes one row.
pub fn parse_fasta(text: &str) -> Result<AlignmentSet> {
    let reader = bio::io::fasta::Reader::new(text.as_bytes());
    let mut rows = Vec::new();

    for (i, result) in reader.records().enumerate() {
        let record = result.map_err(|e| ViewerError::parse(1, format!("invalid FASTA: {}", e)))?;
        let seq = record.seq();
        if let Some(&bad) = seq.iter().find(|&&b| !is_sequence_char(b)) {
            return Err(ViewerError::parse(
                0,
                format!(
                    "invalid character '{}' in record {} ('{}')",
                    bad as char,
                    i + 1,
                    record.id()
                ),
            ));
        }
        // Validated ASCII above
        let sequence = String::from_utf8_lossy(seq).into_owned();
        rows.push(AlignmentRow::new(record.id(), sequence));
    }

    if rows.is_empty() {
        return Err(ViewerError::EmptyAlignment);
    }
    Ok(AlignmentSet::new(rows))
}

/// Write Clustal block format with 60 residues per block
pub fn write_clustal(set: &AlignmentSet) -> String {
    let mut out = String::new();
    out.push_str(CLUSTAL_HEADER);
    out.push_str("\n\n");

    let max_name = set.rows().iter().map(|r| r.name.len()).max().unwrap_or(0);
    let width = max_name.max(10) + 4;
    let total = sequence_length(set);

    let mut offset = 0;
    while offset < total {
        let end = (offset + BLOCK_SIZE).min(total);
        for row in set.rows() {
            let seq = &row.sequence;
            let fragment = if offset < seq.len() {
                &seq[offset..end.min(seq.len())]
            } else {
                ""
            };
            // Ragged rows are gap-filled so every line carries a full chunk
            let pad = end - offset - fragment.len();
            out.push_str(&format!(
                "{:<width$}{}{}\n",
                row.name,
                fragment,
                "-".repeat(pad),
                width = width
            ));
        }
        out.push('\n');
        offset = end;
    }
    out
}

/// Write FASTA with 60 residues per line
pub fn write_fasta(set: &AlignmentSet) -> String {
    let mut out = String::new();
    for row in set.rows() {
        out.push('>');
        out.push_str(&row.name);
        out.push('\n');
        for chunk in row.sequence.as_bytes().chunks(BLOCK_SIZE) {
            out.push_str(&String::from_utf8_lossy(chunk));
            out.push('\n');
        }
    }
    out
}

/// Write sequential PHYLIP; names are cut to 10 characters
pub fn write_phylip(set: &AlignmentSet) -> String {
    let mut out = format!(" {} {}\n", set.len(), sequence_length(set));
    for row in set.rows() {
        let name: String = row.name.chars().take(10).collect();
        out.push_str(&format!("{:<10} {}\n", name, row.sequence));
    }
    out
}

#[derive(Serialize)]
struct JsonSequence<'a> {
    id: &'a str,
    sequence: &'a str,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct JsonExport<'a> {
    job_id: Option<&'a str>,
    sequence_count: usize,
    alignment_length: usize,
    sequences: Vec<JsonSequence<'a>>,
}

/// Serialize rows as pretty JSON
pub fn write_json(set: &AlignmentSet, job_id: Option<&str>) -> Result<String> {
    let export = JsonExport {
        job_id,
        sequence_count: set.len(),
        alignment_length: sequence_length(set),
        sequences: set
            .rows()
            .iter()
            .map(|r| JsonSequence {
                id: &r.name,
                sequence: &r.sequence,
            })
            .collect(),
    };
    Ok(serde_json::to_string_pretty(&export)?)
}

/// Render the alignment in the requested export format
pub fn export_alignment(set: &AlignmentSet, format: ExportFormat, job_id: Option<&str>) -> Result<String> {
    match format {
        ExportFormat::Clustal => Ok(write_clustal(set)),
        ExportFormat::Fasta => Ok(write_fasta(set)),
        ExportFormat::Phylip => Ok(write_phylip(set)),
        ExportFormat::Json => write_json(set, job_id),
    }
}
