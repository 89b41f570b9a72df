//! Residue alphabets, gap symbols and per-residue property tables

use once_cell::sync::Lazy;
use std::collections::HashMap;

use super::types::AlignmentSet;

/// Gap characters
pub const GAP_CHARS: [u8; 2] = [b'-', b'.'];

/// Physico-chemical description of one residue code
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ResidueProperties {
    pub name: &'static str,
    pub property: &'static str,
    /// Kyte-Doolittle hydropathy, 0.0 for non amino-acid codes
    pub hydropathy: f64,
}

const UNKNOWN: ResidueProperties = ResidueProperties {
    name: "Unknown",
    property: "Unknown",
    hydropathy: 0.0,
};

/// Amino acid code -> properties
pub static RESIDUE_PROPERTIES: Lazy<HashMap<u8, ResidueProperties>> = Lazy::new(|| {
    let table: [(u8, &str, &str, f64); 22] = [
        (b'A', "Alanine", "Hydrophobic", 1.8),
        (b'R', "Arginine", "Positive", -4.5),
        (b'N', "Asparagine", "Polar", -3.5),
        (b'D', "Aspartic Acid", "Negative", -3.5),
        (b'C', "Cysteine", "Special", 2.5),
        (b'Q', "Glutamine", "Polar", -3.5),
        (b'E', "Glutamic Acid", "Negative", -3.5),
        (b'G', "Glycine", "Special", -0.4),
        (b'H', "Histidine", "Positive", -3.2),
        (b'I', "Isoleucine", "Hydrophobic", 4.5),
        (b'L', "Leucine", "Hydrophobic", 3.8),
        (b'K', "Lysine", "Positive", -3.9),
        (b'M', "Methionine", "Hydrophobic", 1.9),
        (b'F', "Phenylalanine", "Hydrophobic", 2.8),
        (b'P', "Proline", "Special", -1.6),
        (b'S', "Serine", "Polar", -0.8),
        (b'T', "Threonine", "Polar", -0.7),
        (b'W', "Tryptophan", "Hydrophobic", -0.9),
        (b'Y', "Tyrosine", "Polar", -1.3),
        (b'V', "Valine", "Hydrophobic", 4.2),
        (b'-', "Gap", "Gap", 0.0),
        (b'X', "Unknown", "Unknown", 0.0),
    ];
    table
        .into_iter()
        .map(|(code, name, property, hydropathy)| {
            (
                code,
                ResidueProperties {
                    name,
                    property,
                    hydropathy,
                },
            )
        })
        .collect()
});

/// Properties for a residue byte, case-insensitive; unknown codes map to "Unknown"
pub fn residue_properties(residue: u8) -> &'static ResidueProperties {
    let key = if residue == b'.' {
        b'-'
    } else {
        residue.to_ascii_uppercase()
    };
    RESIDUE_PROPERTIES.get(&key).unwrap_or(&UNKNOWN)
}

/// Check if a byte is a gap symbol
#[inline]
pub fn is_gap(b: u8) -> bool {
    matches!(b, b'-' | b'.')
}

/// Check if a byte may appear in an aligned sequence
#[inline]
pub fn is_sequence_char(b: u8) -> bool {
    b.is_ascii_alphabetic() || is_gap(b) || b == b'*'
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MoleculeType {
    Protein,
    Nucleotide,
}

/// Guess whether an alignment holds nucleotides: at least 90% of residues
/// must be plain A/C/G/T/U/N.
pub fn detect_molecule(set: &AlignmentSet) -> MoleculeType {
    let mut residues = 0usize;
    let mut nucleotides = 0usize;
    for row in set.rows() {
        for &b in row.sequence.as_bytes() {
            if is_gap(b) {
                continue;
            }
            residues += 1;
            if matches!(b.to_ascii_uppercase(), b'A' | b'C' | b'G' | b'T' | b'U' | b'N') {
                nucleotides += 1;
            }
        }
    }
    if residues > 0 && nucleotides * 10 >= residues * 9 {
        MoleculeType::Nucleotide
    } else {
        MoleculeType::Protein
    }
}

// ── Bitmask-based IUPAC codes (bit 0 = A, 1 = C, 2 = G, 3 = T) ─────────────

/// Lookup table: 4-bit bitmask index -> IUPAC code byte.
/// Index 0 (no bases) maps to b'?'.
pub const IUPAC_FROM_MASK: [u8; 16] = [
    b'?', // 0b0000 - no bases
    b'A', // 0b0001
    b'C', // 0b0010
    b'M', // 0b0011 - A|C
    b'G', // 0b0100
    b'R', // 0b0101 - A|G
    b'S', // 0b0110 - C|G
    b'V', // 0b0111 - A|C|G
    b'T', // 0b1000
    b'W', // 0b1001 - A|T
    b'Y', // 0b1010 - C|T
    b'H', // 0b1011 - A|C|T
    b'K', // 0b1100 - G|T
    b'D', // 0b1101 - A|G|T
    b'B', // 0b1110 - C|G|T
    b'N', // 0b1111 - A|C|G|T
];

/// Convert a nucleotide byte to its bitmask. U counts as T.
/// Returns 0 for unrecognized bytes.
#[inline]
pub fn base_to_bit(b: u8) -> u8 {
    match b {
        b'A' => 0b0001,
        b'C' => 0b0010,
        b'G' => 0b0100,
        b'T' | b'U' => 0b1000,
        b'R' => 0b0101,
        b'Y' => 0b1010,
        b'S' => 0b0110,
        b'W' => 0b1001,
        b'K' => 0b1100,
        b'M' => 0b0011,
        b'B' => 0b1110,
        b'D' => 0b1101,
        b'H' => 0b1011,
        b'V' => 0b0111,
        b'N' => 0b1111,
        _ => 0,
    }
}

/// IUPAC code covering every nucleotide in `residues`; gaps are skipped.
/// Returns `None` if any residue is not a nucleotide or no residue remains.
pub fn iupac_code_for(residues: impl IntoIterator<Item = u8>) -> Option<char> {
    let mut mask = 0u8;
    for b in residues {
        if is_gap(b) {
            continue;
        }
        let bit = base_to_bit(b.to_ascii_uppercase());
        if bit == 0 {
            return None;
        }
        mask |= bit;
    }
    if mask == 0 {
        None
    } else {
        Some(IUPAC_FROM_MASK[mask as usize] as char)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::types::AlignmentRow;

    #[test]
    fn test_bitmask_roundtrip() {
        let codes = b"ACGTRYSWKMBDHVN";
        for &code in codes {
            let mask = base_to_bit(code);
            assert_eq!(
                IUPAC_FROM_MASK[mask as usize], code,
                "Roundtrip failed for '{}'", code as char
            );
        }
    }

    #[test]
    fn test_iupac_code_for_column() {
        assert_eq!(iupac_code_for(b"AAG".iter().copied()), Some('R'));
        assert_eq!(iupac_code_for(b"a-c".iter().copied()), Some('M'));
        assert_eq!(iupac_code_for(b"--".iter().copied()), None);
        assert_eq!(iupac_code_for(b"AL".iter().copied()), None);
    }

    #[test]
    fn test_residue_properties_lookup() {
        assert_eq!(residue_properties(b'w').name, "Tryptophan");
        assert_eq!(residue_properties(b'.').property, "Gap");
        assert_eq!(residue_properties(b'Z').name, "Unknown");
        assert_eq!(residue_properties(b'I').hydropathy, 4.5);
    }

    #[test]
    fn test_detect_molecule() {
        let dna = AlignmentSet::new(vec![
            AlignmentRow::new("a", "ACGT-ACGT"),
            AlignmentRow::new("b", "ACGTTACGN"),
        ]);
        assert_eq!(detect_molecule(&dna), MoleculeType::Nucleotide);

        let protein = AlignmentSet::new(vec![AlignmentRow::new("p", "MKLVW-EEQ")]);
        assert_eq!(detect_molecule(&protein), MoleculeType::Protein);
        assert_eq!(detect_molecule(&AlignmentSet::default()), MoleculeType::Protein);
    }

    #[test]
    fn test_gap_symbols() {
        assert!(GAP_CHARS.iter().all(|&b| is_gap(b)));
        assert!(!is_gap(b'A'));
        assert!(is_sequence_char(b'*'));
        assert!(!is_sequence_char(b'1'));
    }
}
