//! Identity-keyed caching of alignment derivations
//!
//! An `AlignmentAnalytics` is bound to one `Arc<AlignmentSet>` and one
//! `Arc<SeqInfoDict>`. Each derivation is computed on first use and then
//! reused until the owner swaps in a different alignment or variant dict.

use once_cell::unsync::OnceCell;
use std::sync::Arc;

use super::analytics::{
    alignment_stats, allele_info, conservation_profile, label_width, position_info,
    sequence_length, variant_features,
};
use super::residues::{detect_molecule, MoleculeType};
use super::types::{
    AlignmentSet, AlleleInfo, AlignmentStats, ConservationPoint, PositionData, SeqInfoDict,
    VariantFeatures,
};

pub struct AlignmentAnalytics {
    set: Arc<AlignmentSet>,
    variants: Arc<SeqInfoDict>,
    label_char_width: f32,
    sequence_length: OnceCell<usize>,
    conservation: OnceCell<Vec<ConservationPoint>>,
    molecule: OnceCell<MoleculeType>,
    label_width: OnceCell<f32>,
    features: OnceCell<VariantFeatures>,
    stats: OnceCell<AlignmentStats>,
    alleles: OnceCell<Vec<AlleleInfo>>,
}

impl AlignmentAnalytics {
    pub fn new(set: Arc<AlignmentSet>, variants: Arc<SeqInfoDict>, label_char_width: f32) -> Self {
        Self {
            set,
            variants,
            label_char_width,
            sequence_length: OnceCell::new(),
            conservation: OnceCell::new(),
            molecule: OnceCell::new(),
            label_width: OnceCell::new(),
            features: OnceCell::new(),
            stats: OnceCell::new(),
            alleles: OnceCell::new(),
        }
    }

    pub fn set(&self) -> &Arc<AlignmentSet> {
        &self.set
    }

    pub fn variants(&self) -> &Arc<SeqInfoDict> {
        &self.variants
    }

    /// True if this cache was built from exactly these inputs
    pub fn is_for(&self, set: &Arc<AlignmentSet>, variants: &Arc<SeqInfoDict>) -> bool {
        Arc::ptr_eq(&self.set, set) && Arc::ptr_eq(&self.variants, variants)
    }

    /// Swap the variant dict, keeping every derivation that only depends on
    /// the alignment itself.
    pub fn with_variants(self, variants: Arc<SeqInfoDict>) -> Self {
        if Arc::ptr_eq(&self.variants, &variants) {
            return self;
        }
        Self {
            variants,
            features: OnceCell::new(),
            stats: OnceCell::new(),
            alleles: OnceCell::new(),
            ..self
        }
    }

    pub fn sequence_length(&self) -> usize {
        *self.sequence_length.get_or_init(|| sequence_length(&self.set))
    }

    pub fn conservation(&self) -> &[ConservationPoint] {
        self.conservation.get_or_init(|| {
            log::debug!(
                "Computing conservation for {} rows x {} columns",
                self.set.len(),
                self.sequence_length()
            );
            conservation_profile(&self.set)
        })
    }

    pub fn molecule(&self) -> MoleculeType {
        *self.molecule.get_or_init(|| detect_molecule(&self.set))
    }

    pub fn label_width(&self) -> f32 {
        *self
            .label_width
            .get_or_init(|| label_width(&self.set, self.label_char_width))
    }

    pub fn features(&self) -> &VariantFeatures {
        self.features
            .get_or_init(|| {
                variant_features(&self.set, &self.set.row_index_by_name(), &self.variants)
            })
    }

    pub fn stats(&self) -> &AlignmentStats {
        self.stats
            .get_or_init(|| alignment_stats(&self.set, &self.variants))
    }

    pub fn alleles(&self) -> &[AlleleInfo] {
        self.alleles.get_or_init(|| allele_info(&self.variants))
    }

    /// Column details; not cached since it is only asked for on click
    pub fn position_info(&self, position: usize) -> Option<PositionData> {
        position_info(
            &self.set,
            self.conservation(),
            &self.variants,
            self.molecule(),
            position,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::types::{AlignmentRow, SeqInfo, VariantAnnotation};

    fn analytics() -> AlignmentAnalytics {
        let set = AlignmentSet::new(vec![
            AlignmentRow::new("a", "MKLV"),
            AlignmentRow::new("b", "MKQV"),
        ]);
        AlignmentAnalytics::new(Arc::new(set), Arc::new(SeqInfoDict::new()), 9.0)
    }

    #[test]
    fn test_derivations_computed_once() {
        let a = analytics();
        let first = a.conservation().as_ptr();
        let second = a.conservation().as_ptr();
        assert!(std::ptr::eq(first, second));
        assert_eq!(a.conservation().len(), a.sequence_length());
        assert_eq!(a.label_width(), 9.0);
    }

    #[test]
    fn test_identity_check() {
        let a = analytics();
        let same_set = a.set().clone();
        let same_variants = a.variants().clone();
        assert!(a.is_for(&same_set, &same_variants));

        let equal_but_distinct = Arc::new((**a.set()).clone());
        assert!(!a.is_for(&equal_but_distinct, &same_variants));
    }

    #[test]
    fn test_with_variants_keeps_conservation() {
        let a = analytics();
        assert!(a.features().is_empty());
        let conservation = a.conservation().as_ptr();

        let mut dict = SeqInfoDict::new();
        dict.insert(
            "b".to_string(),
            SeqInfo {
                embedded_variants: Some(vec![VariantAnnotation {
                    alignment_start_pos: 3,
                    alignment_end_pos: 3,
                    variant_id: "rs1".to_string(),
                    seq_substitution_type: "missense".to_string(),
                    seq_start_pos: None,
                    seq_end_pos: None,
                    seq_length: None,
                    genomic_seq_id: None,
                    genomic_start_pos: None,
                    genomic_end_pos: None,
                    genomic_ref_seq: None,
                    genomic_alt_seq: None,
                }]),
                error: None,
            },
        );
        let a = a.with_variants(Arc::new(dict));
        assert!(std::ptr::eq(conservation, a.conservation().as_ptr()));
        assert_eq!(a.features().spans.len(), 1);
        assert_eq!(a.features().spans[0].row_start, 1);
        assert_eq!(a.stats().variants_count, 1);
        assert_eq!(a.alleles().len(), 1);
    }

    #[test]
    fn test_position_info_uses_cached_profile() {
        let a = analytics();
        let info = a.position_info(3).unwrap();
        assert_eq!(info.conservation, 0.5);
        assert_eq!(info.residues.len(), 2);
    }
}
