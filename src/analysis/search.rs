//! Searching rows by residue text, regex, column or variant id

use rayon::prelude::*;
use regex::RegexBuilder;
use serde::{Deserialize, Serialize};

use super::types::{AlignmentRow, AlignmentSet, SeqInfoDict};
use crate::error::{Result, ViewerError};

/// Residues of context kept on each side of a match
pub const CONTEXT_RESIDUES: usize = 5;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SearchType {
    Sequence,
    Pattern,
    Position,
    Variant,
}

impl SearchType {
    pub const ALL: [SearchType; 4] = [
        SearchType::Sequence,
        SearchType::Pattern,
        SearchType::Position,
        SearchType::Variant,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            Self::Sequence => "Sequence",
            Self::Pattern => "Pattern (Regex)",
            Self::Position => "Position",
            Self::Variant => "Variant",
        }
    }
}

/// One hit. `start`/`end` are 1-based inclusive alignment columns.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchMatch {
    pub row_index: usize,
    pub sequence_name: String,
    pub start: usize,
    pub end: usize,
    pub matched_text: String,
    pub context: String,
}

impl SearchMatch {
    fn new(row_index: usize, row: &AlignmentRow, start0: usize, end0: usize) -> Self {
        let seq = &row.sequence;
        let ctx_start = start0.saturating_sub(CONTEXT_RESIDUES);
        let ctx_end = (end0 + CONTEXT_RESIDUES).min(seq.len());
        Self {
            row_index,
            sequence_name: row.name.clone(),
            start: start0 + 1,
            end: end0,
            matched_text: seq.get(start0..end0).unwrap_or_default().to_string(),
            context: seq.get(ctx_start..ctx_end).unwrap_or_default().to_string(),
        }
    }
}

/// Run a query over every row. Blank queries match nothing.
///
/// Results are ordered by row, then by start column.
pub fn search(
    set: &AlignmentSet,
    variants: &SeqInfoDict,
    query: &str,
    kind: SearchType,
) -> Result<Vec<SearchMatch>> {
    let query = query.trim();
    if query.is_empty() {
        return Ok(Vec::new());
    }

    let matches = match kind {
        SearchType::Sequence => search_sequence(set, query),
        SearchType::Pattern => search_pattern(set, query)?,
        SearchType::Position => {
            let position: usize = query
                .parse()
                .ok()
                .filter(|&p| p >= 1)
                .ok_or_else(|| ViewerError::InvalidPosition {
                    input: query.to_string(),
                })?;
            search_position(set, position)
        }
        SearchType::Variant => search_variant(set, variants, query),
    };
    log::debug!("{:?} search for '{}': {} matches", kind, query, matches.len());
    Ok(matches)
}

/// Case-insensitive substring search, overlapping hits included
fn search_sequence(set: &AlignmentSet, query: &str) -> Vec<SearchMatch> {
    let needle = query.to_ascii_uppercase().into_bytes();
    set.rows()
        .par_iter()
        .enumerate()
        .flat_map_iter(|(i, row)| {
            let hay = row.sequence.to_ascii_uppercase().into_bytes();
            let n = needle.len();
            let hits: Vec<SearchMatch> = if n > hay.len() {
                Vec::new()
            } else {
                (0..=hay.len() - n)
                    .filter(|&s| hay[s..s + n] == needle[..])
                    .map(|s| SearchMatch::new(i, row, s, s + n))
                    .collect()
            };
            hits
        })
        .collect()
}

fn search_pattern(set: &AlignmentSet, pattern: &str) -> Result<Vec<SearchMatch>> {
    let re = RegexBuilder::new(pattern)
        .case_insensitive(true)
        .build()
        .map_err(|e| ViewerError::InvalidPattern {
            message: e.to_string(),
        })?;

    Ok(set
        .rows()
        .par_iter()
        .enumerate()
        .flat_map_iter(|(i, row)| {
            re.find_iter(&row.sequence)
                .filter(|m| !m.is_empty())
                .map(|m| SearchMatch::new(i, row, m.start(), m.end()))
                .collect::<Vec<_>>()
        })
        .collect())
}

fn search_position(set: &AlignmentSet, position: usize) -> Vec<SearchMatch> {
    set.rows()
        .iter()
        .enumerate()
        .filter(|(_, row)| position <= row.sequence.len())
        .map(|(i, row)| SearchMatch::new(i, row, position - 1, position))
        .collect()
}

/// Variant ids containing the query, reported on the row that carries them
fn search_variant(set: &AlignmentSet, variants: &SeqInfoDict, query: &str) -> Vec<SearchMatch> {
    let needle = query.to_lowercase();
    let mut matches = Vec::new();
    for (i, row) in set.rows().iter().enumerate() {
        let Some(info) = variants.get(&row.name) else {
            continue;
        };
        for variant in info.variants() {
            if !variant.variant_id.to_lowercase().contains(&needle) {
                continue;
            }
            let start = variant.alignment_start_pos.max(1);
            let end = variant.alignment_end_pos.max(start).min(row.sequence.len());
            if start > end {
                continue;
            }
            matches.push(SearchMatch::new(i, row, start - 1, end));
        }
    }
    matches
}

/// Current position in a result list, wrapping at both ends
#[derive(Debug, Clone, Default)]
pub struct SearchCursor {
    matches: Vec<SearchMatch>,
    current: usize,
}

impl SearchCursor {
    pub fn new(matches: Vec<SearchMatch>) -> Self {
        Self {
            matches,
            current: 0,
        }
    }

    pub fn matches(&self) -> &[SearchMatch] {
        &self.matches
    }

    pub fn len(&self) -> usize {
        self.matches.len()
    }

    pub fn is_empty(&self) -> bool {
        self.matches.is_empty()
    }

    pub fn index(&self) -> usize {
        self.current
    }

    pub fn current(&self) -> Option<&SearchMatch> {
        self.matches.get(self.current)
    }

    pub fn next(&mut self) -> Option<&SearchMatch> {
        if self.matches.is_empty() {
            return None;
        }
        self.current = (self.current + 1) % self.matches.len();
        self.current()
    }

    pub fn prev(&mut self) -> Option<&SearchMatch> {
        if self.matches.is_empty() {
            return None;
        }
        self.current = (self.current + self.matches.len() - 1) % self.matches.len();
        self.current()
    }

    pub fn select(&mut self, index: usize) -> Option<&SearchMatch> {
        if index < self.matches.len() {
            self.current = index;
        }
        self.current()
    }
}
