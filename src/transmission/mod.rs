//! Genotype transmission strategies.
//!
//! A transmitter copies, recombines, or converts genetic material from one or
//! two parents into an offspring. Every strategy shares the same lifecycle:
//! `initialize` caches derived layout data (a [`TransmissionPlan`]) for the
//! population's genomic structure, and `transmit` fills the offspring's
//! genotype during mating. A plan is immutable once computed; applying a
//! transmitter to an individual whose genotype does not match the cached
//! structure fails fast rather than operating on stale layout data.

pub mod clone;
pub mod mendelian;
pub mod mitochondrial;
pub mod recombinator;

pub use clone::CloneTransmitter;
pub use mendelian::{HaplodiploidTransmitter, MendelianTransmitter, SelfingTransmitter};
pub use mitochondrial::MitochondrialTransmitter;
pub use recombinator::{
    ConversionMode, ConversionSpec, RecombinationRates, RecombinationRecord, Recombinator,
};

use crate::errors::TransmitError;
use crate::genome::{ChromosomeType, GenomeLayout, Individual};
use rand::RngCore;
use std::ops::Range;

/// Derived layout data cached by a transmitter at `initialize` time.
///
/// Holds everything a strategy needs to address the flat genotype buffer:
/// ploidy, per-chromosome global locus ranges, and the location of the sex
/// and customized chromosomes.
#[derive(Debug, Clone, PartialEq)]
pub struct TransmissionPlan {
    ploidy: usize,
    total_loci: usize,
    genotype_len: usize,
    chrom_ranges: Vec<Range<usize>>,
    chrom_kinds: Vec<ChromosomeType>,
    chrom_x: Option<usize>,
    chrom_y: Option<usize>,
    customized: Vec<usize>,
}

impl TransmissionPlan {
    pub fn from_layout(layout: &GenomeLayout) -> Self {
        Self {
            ploidy: layout.ploidy(),
            total_loci: layout.total_loci(),
            genotype_len: layout.genotype_len(),
            chrom_ranges: (0..layout.num_chromosomes())
                .map(|c| layout.locus_range(c))
                .collect(),
            chrom_kinds: layout.chromosomes().iter().map(|c| c.kind()).collect(),
            chrom_x: layout.chrom_x(),
            chrom_y: layout.chrom_y(),
            customized: layout.customized_chromosomes().to_vec(),
        }
    }

    #[inline]
    pub fn ploidy(&self) -> usize {
        self.ploidy
    }

    #[inline]
    pub fn num_chromosomes(&self) -> usize {
        self.chrom_ranges.len()
    }

    #[inline]
    pub fn chrom_range(&self, chrom: usize) -> Range<usize> {
        self.chrom_ranges[chrom].clone()
    }

    #[inline]
    pub fn chrom_kind(&self, chrom: usize) -> ChromosomeType {
        self.chrom_kinds[chrom]
    }

    #[inline]
    pub fn chrom_x(&self) -> Option<usize> {
        self.chrom_x
    }

    #[inline]
    pub fn chrom_y(&self) -> Option<usize> {
        self.chrom_y
    }

    #[inline]
    pub fn customized(&self) -> &[usize] {
        &self.customized
    }

    /// Fail fast if `ind` does not match the structure this plan was built
    /// for.
    pub fn check(&self, ind: &Individual) -> Result<(), TransmitError> {
        if ind.genotype_len() != self.genotype_len {
            return Err(TransmitError::StructureMismatch {
                expected: self.genotype_len,
                found: ind.genotype_len(),
            });
        }
        Ok(())
    }

    /// Copy one chromosome from a parent homologous set into an offspring
    /// homologous set.
    pub fn copy_chromosome(
        &self,
        parent: &Individual,
        par_ploidy: usize,
        offspring: &mut Individual,
        ploidy: usize,
        chrom: usize,
    ) {
        offspring.copy_segment_from(parent, par_ploidy, ploidy, self.chrom_range(chrom));
    }

    /// Zero one chromosome on an offspring homologous set.
    pub fn clear_chromosome(&self, offspring: &mut Individual, ploidy: usize, chrom: usize) {
        offspring.clear_segment(ploidy, self.chrom_range(chrom));
    }

    /// Copy a full homologous set from parent to offspring, skipping
    /// customized chromosomes.
    pub fn copy_homologous_set(
        &self,
        parent: &Individual,
        par_ploidy: usize,
        offspring: &mut Individual,
        ploidy: usize,
    ) {
        for chrom in 0..self.num_chromosomes() {
            if self.chrom_kinds[chrom] == ChromosomeType::Customized {
                continue;
            }
            self.copy_chromosome(parent, par_ploidy, offspring, ploidy, chrom);
        }
    }
}

/// A genotype transmission strategy.
///
/// `transmit` receives the father and/or mother as the mating scheme supplies
/// them; which parents are required depends on the strategy. The offspring's
/// sex must already be assigned, since sex-chromosome routing depends on it.
pub trait GenoTransmitter {
    /// Cache derived layout data for a genomic structure. Must be called
    /// again whenever the structure changes.
    fn initialize(&mut self, layout: &GenomeLayout) -> Result<(), TransmitError>;

    /// Fill the offspring's genotype from the given parents.
    fn transmit(
        &mut self,
        father: Option<&Individual>,
        mother: Option<&Individual>,
        offspring: &mut Individual,
        rng: &mut dyn RngCore,
    ) -> Result<(), TransmitError>;

    /// One-line human-readable description, used by pipeline reports.
    fn describe(&self) -> String;

    /// Flush any output sink once a run completes.
    fn finish(&mut self) -> Result<(), TransmitError> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::genome::{ChromosomeSpec, Sex};

    fn layout() -> GenomeLayout {
        GenomeLayout::new(
            2,
            vec![
                ChromosomeSpec::uniform("chr1", 6, ChromosomeType::Autosome).unwrap(),
                ChromosomeSpec::uniform("mt", 3, ChromosomeType::Customized).unwrap(),
            ],
            vec![],
        )
        .unwrap()
    }

    #[test]
    fn test_plan_from_layout() {
        let plan = TransmissionPlan::from_layout(&layout());
        assert_eq!(plan.ploidy(), 2);
        assert_eq!(plan.num_chromosomes(), 2);
        assert_eq!(plan.chrom_range(0), 0..6);
        assert_eq!(plan.chrom_range(1), 6..9);
        assert_eq!(plan.customized(), &[1]);
        assert_eq!(plan.chrom_x(), None);
    }

    #[test]
    fn test_plan_check_mismatch() {
        let plan = TransmissionPlan::from_layout(&layout());
        let other = GenomeLayout::diploid_autosomes(&[4]).unwrap();
        let ind = Individual::new(&other, Sex::Female);
        assert!(matches!(
            plan.check(&ind),
            Err(TransmitError::StructureMismatch { .. })
        ));
    }

    #[test]
    fn test_copy_homologous_set_skips_customized() {
        let layout = layout();
        let plan = TransmissionPlan::from_layout(&layout);

        let mut parent = Individual::new(&layout, Sex::Female);
        parent.genotype_mut().fill(4);

        let mut child = Individual::new(&layout, Sex::Male);
        plan.copy_homologous_set(&parent, 1, &mut child, 0);

        // Autosome copied.
        assert_eq!(child.segment(0, 0..6), &[4; 6]);
        // Customized chromosome untouched.
        assert_eq!(child.segment(0, 6..9), &[0; 3]);
        // Other homolog untouched.
        assert_eq!(child.homolog(1), &[0; 9]);
    }

    #[test]
    fn test_clear_chromosome() {
        let layout = layout();
        let plan = TransmissionPlan::from_layout(&layout);
        let mut ind = Individual::new(&layout, Sex::Female);
        ind.genotype_mut().fill(2);
        plan.clear_chromosome(&mut ind, 1, 1);
        assert_eq!(ind.segment(1, 6..9), &[0; 3]);
        assert_eq!(ind.segment(1, 0..6), &[2; 6]);
    }
}
