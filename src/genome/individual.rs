//! A single individual: flat genotype buffer, sex, and information fields.

use crate::genome::{Allele, GenomeLayout, Sex};
use std::ops::Range;

/// An individual with a flat, ploidy-major genotype.
///
/// The genotype buffer holds `ploidy * total_loci` alleles: the full first
/// homologous set, then the second, and so on. Within a set, loci are laid
/// out chromosome by chromosome in layout order. The individual does not
/// hold a reference to its layout; callers address the buffer through the
/// global locus ranges the layout provides.
#[derive(Debug, Clone, PartialEq)]
pub struct Individual {
    genotype: Vec<Allele>,
    /// Loci per homologous set; the buffer length is a multiple of this.
    loci: usize,
    sex: Sex,
    info: Vec<f64>,
}

impl Individual {
    /// Create an individual with an all-zero genotype matching `layout`.
    pub fn new(layout: &GenomeLayout, sex: Sex) -> Self {
        Self {
            genotype: vec![0; layout.genotype_len()],
            loci: layout.total_loci(),
            sex,
            info: vec![0.0; layout.info_fields().len()],
        }
    }

    #[inline]
    pub fn sex(&self) -> Sex {
        self.sex
    }

    #[inline]
    pub fn set_sex(&mut self, sex: Sex) {
        self.sex = sex;
    }

    /// Number of homologous sets this individual carries.
    #[inline]
    pub fn ploidy(&self) -> usize {
        if self.loci == 0 {
            0
        } else {
            self.genotype.len() / self.loci
        }
    }

    /// Length of the full genotype buffer.
    #[inline]
    pub fn genotype_len(&self) -> usize {
        self.genotype.len()
    }

    /// The whole genotype buffer.
    #[inline]
    pub fn genotype(&self) -> &[Allele] {
        &self.genotype
    }

    #[inline]
    pub fn genotype_mut(&mut self) -> &mut [Allele] {
        &mut self.genotype
    }

    /// One full homologous set.
    #[inline]
    pub fn homolog(&self, ploidy: usize) -> &[Allele] {
        &self.genotype[ploidy * self.loci..(ploidy + 1) * self.loci]
    }

    /// Alleles of `loci` (a global locus range) on homologous set `ploidy`.
    #[inline]
    pub fn segment(&self, ploidy: usize, loci: Range<usize>) -> &[Allele] {
        let base = ploidy * self.loci;
        &self.genotype[base + loci.start..base + loci.end]
    }

    #[inline]
    pub fn segment_mut(&mut self, ploidy: usize, loci: Range<usize>) -> &mut [Allele] {
        let base = ploidy * self.loci;
        &mut self.genotype[base + loci.start..base + loci.end]
    }

    /// Single allele at (`ploidy`, global `locus`).
    #[inline]
    pub fn allele(&self, ploidy: usize, locus: usize) -> Allele {
        self.genotype[ploidy * self.loci + locus]
    }

    #[inline]
    pub fn set_allele(&mut self, ploidy: usize, locus: usize, value: Allele) {
        self.genotype[ploidy * self.loci + locus] = value;
    }

    /// Set every allele of `loci` on homologous set `ploidy` to zero.
    pub fn clear_segment(&mut self, ploidy: usize, loci: Range<usize>) {
        self.segment_mut(ploidy, loci).fill(0);
    }

    /// Copy a genotype segment from `src`, same range, possibly different
    /// homologous sets.
    pub fn copy_segment_from(
        &mut self,
        src: &Individual,
        src_ploidy: usize,
        dst_ploidy: usize,
        loci: Range<usize>,
    ) {
        self.segment_mut(dst_ploidy, loci.clone())
            .copy_from_slice(src.segment(src_ploidy, loci));
    }

    #[inline]
    pub fn info(&self) -> &[f64] {
        &self.info
    }

    #[inline]
    pub fn info_at(&self, idx: usize) -> f64 {
        self.info[idx]
    }

    #[inline]
    pub fn set_info(&mut self, idx: usize, value: f64) {
        self.info[idx] = value;
    }

    /// Copy all information fields from another individual.
    pub fn copy_info_from(&mut self, src: &Individual) {
        self.info.copy_from_slice(&src.info);
    }

    /// Reset every information field to zero.
    pub fn clear_info(&mut self) {
        self.info.fill(0.0);
    }
}
