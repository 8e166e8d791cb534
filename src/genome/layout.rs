//! Genomic structure shared by every individual of a population.
//!
//! A `GenomeLayout` describes ploidy, chromosomes with their locus positions
//! and types, and the names of per-individual information fields. Derived
//! indexing data (cumulative locus offsets, location of the sex and
//! customized chromosomes) is computed once at construction so that
//! transmitters can address the flat genotype buffer cheaply.

use crate::errors::LayoutError;
use serde::{Deserialize, Serialize};
use std::ops::Range;

/// Allele value stored at a single locus.
pub type Allele = u8;

/// Biological sex of an individual.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Sex {
    Male,
    Female,
}

/// Type of a chromosome, which determines how it is transmitted.
///
/// `Customized` chromosomes are excluded from Mendelian segregation and
/// recombination; they are handled by dedicated strategies such as the
/// mitochondrial transmitter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ChromosomeType {
    Autosome,
    X,
    Y,
    Customized,
}

/// A single chromosome: a name, ordered locus positions, and a type.
///
/// No unit is assumed for positions; recombination intensity is a direct
/// multiplier on the distance between adjacent positions.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChromosomeSpec {
    name: String,
    positions: Vec<f64>,
    kind: ChromosomeType,
}

impl ChromosomeSpec {
    /// Create a chromosome from explicit locus positions.
    pub fn new(
        name: impl Into<String>,
        positions: Vec<f64>,
        kind: ChromosomeType,
    ) -> Result<Self, LayoutError> {
        let name = name.into();
        if positions.is_empty() {
            return Err(LayoutError::EmptyChromosome(name));
        }
        if positions.windows(2).any(|w| w[1] <= w[0]) {
            return Err(LayoutError::PositionsNotIncreasing(name));
        }
        Ok(Self {
            name,
            positions,
            kind,
        })
    }

    /// Create a chromosome with `num_loci` loci at positions 0, 1, 2, ...
    pub fn uniform(
        name: impl Into<String>,
        num_loci: usize,
        kind: ChromosomeType,
    ) -> Result<Self, LayoutError> {
        Self::new(name, (0..num_loci).map(|i| i as f64).collect(), kind)
    }

    #[inline]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[inline]
    pub fn num_loci(&self) -> usize {
        self.positions.len()
    }

    /// Physical positions of the loci, strictly increasing.
    #[inline]
    pub fn positions(&self) -> &[f64] {
        &self.positions
    }

    #[inline]
    pub fn kind(&self) -> ChromosomeType {
        self.kind
    }
}

/// Immutable genomic structure of a population.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GenomeLayout {
    ploidy: usize,
    chromosomes: Vec<ChromosomeSpec>,
    info_fields: Vec<String>,
    // Derived at construction.
    chrom_offsets: Vec<usize>,
    total_loci: usize,
    chrom_x: Option<usize>,
    chrom_y: Option<usize>,
    customized: Vec<usize>,
}

impl GenomeLayout {
    /// Create a layout from ploidy, chromosomes, and information field names.
    ///
    /// # Errors
    /// Returns an error if ploidy is zero, more than one X or Y chromosome is
    /// declared, or a Y chromosome appears without an X.
    pub fn new(
        ploidy: usize,
        chromosomes: Vec<ChromosomeSpec>,
        info_fields: Vec<String>,
    ) -> Result<Self, LayoutError> {
        if ploidy == 0 {
            return Err(LayoutError::ZeroPloidy);
        }

        let mut chrom_offsets = Vec::with_capacity(chromosomes.len() + 1);
        let mut total_loci = 0;
        let mut chrom_x = None;
        let mut chrom_y = None;
        let mut customized = Vec::new();

        for (idx, chrom) in chromosomes.iter().enumerate() {
            chrom_offsets.push(total_loci);
            total_loci += chrom.num_loci();
            match chrom.kind() {
                ChromosomeType::X => {
                    if chrom_x.replace(idx).is_some() {
                        return Err(LayoutError::DuplicateSexChromosome("X"));
                    }
                }
                ChromosomeType::Y => {
                    if chrom_y.replace(idx).is_some() {
                        return Err(LayoutError::DuplicateSexChromosome("Y"));
                    }
                }
                ChromosomeType::Customized => customized.push(idx),
                ChromosomeType::Autosome => {}
            }
        }
        chrom_offsets.push(total_loci);

        if chrom_y.is_some() && chrom_x.is_none() {
            return Err(LayoutError::YWithoutX);
        }

        Ok(Self {
            ploidy,
            chromosomes,
            info_fields,
            chrom_offsets,
            total_loci,
            chrom_x,
            chrom_y,
            customized,
        })
    }

    /// Convenience constructor: diploid autosomes only, no info fields.
    pub fn diploid_autosomes(loci_per_chrom: &[usize]) -> Result<Self, LayoutError> {
        let chromosomes = loci_per_chrom
            .iter()
            .enumerate()
            .map(|(i, &n)| ChromosomeSpec::uniform(format!("chr{}", i + 1), n, ChromosomeType::Autosome))
            .collect::<Result<Vec<_>, _>>()?;
        Self::new(2, chromosomes, Vec::new())
    }

    #[inline]
    pub fn ploidy(&self) -> usize {
        self.ploidy
    }

    #[inline]
    pub fn num_chromosomes(&self) -> usize {
        self.chromosomes.len()
    }

    #[inline]
    pub fn chromosomes(&self) -> &[ChromosomeSpec] {
        &self.chromosomes
    }

    #[inline]
    pub fn chromosome(&self, idx: usize) -> &ChromosomeSpec {
        &self.chromosomes[idx]
    }

    /// Total number of loci on one homologous set.
    #[inline]
    pub fn total_loci(&self) -> usize {
        self.total_loci
    }

    /// Length of the flat genotype buffer of one individual.
    #[inline]
    pub fn genotype_len(&self) -> usize {
        self.ploidy * self.total_loci
    }

    /// Global locus index range covered by chromosome `idx`.
    #[inline]
    pub fn locus_range(&self, idx: usize) -> Range<usize> {
        self.chrom_offsets[idx]..self.chrom_offsets[idx + 1]
    }

    /// Index of the X chromosome, if any.
    #[inline]
    pub fn chrom_x(&self) -> Option<usize> {
        self.chrom_x
    }

    /// Index of the Y chromosome, if any.
    #[inline]
    pub fn chrom_y(&self) -> Option<usize> {
        self.chrom_y
    }

    /// Indices of all customized chromosomes, in order.
    #[inline]
    pub fn customized_chromosomes(&self) -> &[usize] {
        &self.customized
    }

    pub fn has_sex_chromosomes(&self) -> bool {
        self.chrom_x.is_some() || self.chrom_y.is_some()
    }

    #[inline]
    pub fn info_fields(&self) -> &[String] {
        &self.info_fields
    }

    /// Resolve an information field name to its index.
    pub fn info_index(&self, name: &str) -> Option<usize> {
        self.info_fields.iter().position(|f| f == name)
    }

    /// Structural equality: ploidy, chromosome layout (locus counts,
    /// positions, types) and information fields all match.
    pub fn schema_eq(&self, other: &GenomeLayout) -> bool {
        self.ploidy == other.ploidy
            && self.info_fields == other.info_fields
            && self.chromosomes.len() == other.chromosomes.len()
            && self
                .chromosomes
                .iter()
                .zip(&other.chromosomes)
                .all(|(a, b)| {
                    a.kind() == b.kind() && a.positions() == b.positions()
                })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn xy_layout() -> GenomeLayout {
        GenomeLayout::new(
            2,
            vec![
                ChromosomeSpec::uniform("chr1", 10, ChromosomeType::Autosome).unwrap(),
                ChromosomeSpec::uniform("chrX", 5, ChromosomeType::X).unwrap(),
                ChromosomeSpec::uniform("chrY", 5, ChromosomeType::Y).unwrap(),
                ChromosomeSpec::uniform("mt", 4, ChromosomeType::Customized).unwrap(),
            ],
            vec!["ind_id".into()],
        )
        .unwrap()
    }

    #[test]
    fn test_chromosome_spec_uniform() {
        let chrom = ChromosomeSpec::uniform("chr1", 4, ChromosomeType::Autosome).unwrap();
        assert_eq!(chrom.num_loci(), 4);
        assert_eq!(chrom.positions(), &[0.0, 1.0, 2.0, 3.0]);
    }

    #[test]
    fn test_chromosome_spec_empty() {
        let result = ChromosomeSpec::new("chr1", vec![], ChromosomeType::Autosome);
        assert!(matches!(result, Err(LayoutError::EmptyChromosome(_))));
    }

    #[test]
    fn test_chromosome_spec_unsorted_positions() {
        let result = ChromosomeSpec::new("chr1", vec![0.0, 2.0, 1.0], ChromosomeType::Autosome);
        assert!(matches!(result, Err(LayoutError::PositionsNotIncreasing(_))));
    }

    #[test]
    fn test_layout_offsets() {
        let layout = xy_layout();
        assert_eq!(layout.total_loci(), 24);
        assert_eq!(layout.genotype_len(), 48);
        assert_eq!(layout.locus_range(0), 0..10);
        assert_eq!(layout.locus_range(1), 10..15);
        assert_eq!(layout.locus_range(3), 20..24);
    }

    #[test]
    fn test_layout_special_chromosomes() {
        let layout = xy_layout();
        assert_eq!(layout.chrom_x(), Some(1));
        assert_eq!(layout.chrom_y(), Some(2));
        assert_eq!(layout.customized_chromosomes(), &[3]);
        assert!(layout.has_sex_chromosomes());
    }

    #[test]
    fn test_layout_zero_ploidy() {
        let result = GenomeLayout::new(0, vec![], vec![]);
        assert!(matches!(result, Err(LayoutError::ZeroPloidy)));
    }

    #[test]
    fn test_layout_duplicate_x() {
        let result = GenomeLayout::new(
            2,
            vec![
                ChromosomeSpec::uniform("x1", 3, ChromosomeType::X).unwrap(),
                ChromosomeSpec::uniform("x2", 3, ChromosomeType::X).unwrap(),
            ],
            vec![],
        );
        assert!(matches!(result, Err(LayoutError::DuplicateSexChromosome("X"))));
    }

    #[test]
    fn test_layout_y_without_x() {
        let result = GenomeLayout::new(
            2,
            vec![ChromosomeSpec::uniform("y", 3, ChromosomeType::Y).unwrap()],
            vec![],
        );
        assert!(matches!(result, Err(LayoutError::YWithoutX)));
    }

    #[test]
    fn test_layout_info_index() {
        let layout = xy_layout();
        assert_eq!(layout.info_index("ind_id"), Some(0));
        assert_eq!(layout.info_index("missing"), None);
    }

    #[test]
    fn test_schema_eq() {
        let a = xy_layout();
        let b = xy_layout();
        assert!(a.schema_eq(&b));

        let c = GenomeLayout::diploid_autosomes(&[10]).unwrap();
        assert!(!a.schema_eq(&c));
    }

    #[test]
    fn test_schema_eq_ignores_names() {
        let a = GenomeLayout::new(
            2,
            vec![ChromosomeSpec::uniform("first", 10, ChromosomeType::Autosome).unwrap()],
            vec![],
        )
        .unwrap();
        let b = GenomeLayout::new(
            2,
            vec![ChromosomeSpec::uniform("second", 10, ChromosomeType::Autosome).unwrap()],
            vec![],
        )
        .unwrap();
        assert!(a.schema_eq(&b));
    }

    #[test]
    fn test_layout_serde_round_trip() {
        let layout = xy_layout();
        let json = serde_json::to_string(&layout).unwrap();
        let back: GenomeLayout = serde_json::from_str(&json).unwrap();
        assert!(layout.schema_eq(&back));
    }
}
