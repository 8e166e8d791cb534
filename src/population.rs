//! Population container: individuals sharing one genomic layout.
//!
//! The evolution driver and the transmitters consume populations through a
//! narrow surface: sizing, indexed individual access, subpopulation
//! boundaries, schema compatibility, and the generation-swap used by the
//! driver's borrow/produce/swap mating protocol.

use crate::errors::SimulatorError;
use crate::genome::{GenomeLayout, Individual, Sex};
use std::ops::Range;
use std::sync::Arc;

/// A population of individuals with a shared genomic layout.
#[derive(Debug, Clone)]
pub struct Population {
    layout: Arc<GenomeLayout>,
    individuals: Vec<Individual>,
    /// Cumulative end offsets of the subpopulations. A single subpopulation
    /// covering every individual is represented by one entry.
    subpop_ends: Vec<usize>,
}

impl Population {
    /// Create a population with a single subpopulation.
    pub fn new(layout: Arc<GenomeLayout>, individuals: Vec<Individual>) -> Self {
        let total = individuals.len();
        Self {
            layout,
            individuals,
            subpop_ends: vec![total],
        }
    }

    /// Create a population partitioned into subpopulations of the given sizes.
    ///
    /// # Errors
    /// Returns a validation error if the sizes do not sum to the number of
    /// individuals supplied.
    pub fn with_subpops(
        layout: Arc<GenomeLayout>,
        individuals: Vec<Individual>,
        sizes: &[usize],
    ) -> Result<Self, SimulatorError> {
        let total: usize = sizes.iter().sum();
        if total != individuals.len() {
            return Err(SimulatorError::Validation(format!(
                "Subpopulation sizes sum to {total} but {} individuals were supplied",
                individuals.len()
            )));
        }
        let mut subpop_ends = Vec::with_capacity(sizes.len());
        let mut acc = 0;
        for &s in sizes {
            acc += s;
            subpop_ends.push(acc);
        }
        Ok(Self {
            layout,
            individuals,
            subpop_ends,
        })
    }

    /// Create a population of `size` zero-genotype individuals.
    pub fn zeroed(layout: Arc<GenomeLayout>, size: usize, sex: Sex) -> Self {
        let individuals = (0..size).map(|_| Individual::new(&layout, sex)).collect();
        Self::new(layout, individuals)
    }

    /// An empty population with the same layout, usable as a scratch buffer.
    pub fn scratch_like(&self) -> Self {
        Self::new(Arc::clone(&self.layout), Vec::new())
    }

    #[inline]
    pub fn layout(&self) -> &Arc<GenomeLayout> {
        &self.layout
    }

    #[inline]
    pub fn size(&self) -> usize {
        self.individuals.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.individuals.is_empty()
    }

    #[inline]
    pub fn individuals(&self) -> &[Individual] {
        &self.individuals
    }

    #[inline]
    pub fn individuals_mut(&mut self) -> &mut [Individual] {
        &mut self.individuals
    }

    /// Individual by index.
    ///
    /// # Errors
    /// Returns an index error when out of range.
    pub fn individual(&self, idx: usize) -> Result<&Individual, SimulatorError> {
        self.individuals.get(idx).ok_or(SimulatorError::Index {
            index: idx,
            len: self.individuals.len(),
        })
    }

    pub fn individual_mut(&mut self, idx: usize) -> Result<&mut Individual, SimulatorError> {
        let len = self.individuals.len();
        self.individuals
            .get_mut(idx)
            .ok_or(SimulatorError::Index { index: idx, len })
    }

    #[inline]
    pub fn num_subpops(&self) -> usize {
        self.subpop_ends.len()
    }

    /// Index range of subpopulation `idx` within the individual vector.
    pub fn subpop_range(&self, idx: usize) -> Result<Range<usize>, SimulatorError> {
        if idx >= self.subpop_ends.len() {
            return Err(SimulatorError::Index {
                index: idx,
                len: self.subpop_ends.len(),
            });
        }
        let start = if idx == 0 { 0 } else { self.subpop_ends[idx - 1] };
        Ok(start..self.subpop_ends[idx])
    }

    /// Whether another population has the same genomic structure.
    pub fn schema_compatible(&self, other: &Population) -> bool {
        self.layout.schema_eq(&other.layout)
    }

    /// Replace the contents with `size` zero-genotype individuals in one
    /// subpopulation, reusing existing allocations where possible.
    pub fn reset_offspring(&mut self, size: usize, sex: Sex) {
        self.individuals.truncate(size);
        for ind in &mut self.individuals {
            ind.genotype_mut().fill(0);
            ind.clear_info();
            ind.set_sex(sex);
        }
        while self.individuals.len() < size {
            self.individuals.push(Individual::new(&self.layout, sex));
        }
        self.subpop_ends.clear();
        self.subpop_ends.push(size);
    }

    /// Exchange individuals and subpopulation boundaries with `other`.
    ///
    /// Used by the evolution driver to swap a produced offspring generation
    /// out of the scratch buffer. Layouts are not exchanged; both
    /// populations must already be schema compatible.
    pub fn swap_generation(&mut self, other: &mut Population) {
        debug_assert!(self.schema_compatible(other));
        std::mem::swap(&mut self.individuals, &mut other.individuals);
        std::mem::swap(&mut self.subpop_ends, &mut other.subpop_ends);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::genome::GenomeLayout;

    fn layout() -> Arc<GenomeLayout> {
        Arc::new(GenomeLayout::diploid_autosomes(&[4, 4]).unwrap())
    }

    #[test]
    fn test_population_new() {
        let pop = Population::zeroed(layout(), 5, Sex::Female);
        assert_eq!(pop.size(), 5);
        assert_eq!(pop.num_subpops(), 1);
        assert_eq!(pop.subpop_range(0).unwrap(), 0..5);
    }

    #[test]
    fn test_population_with_subpops() {
        let l = layout();
        let inds = (0..6).map(|_| Individual::new(&l, Sex::Male)).collect();
        let pop = Population::with_subpops(l, inds, &[2, 4]).unwrap();
        assert_eq!(pop.num_subpops(), 2);
        assert_eq!(pop.subpop_range(0).unwrap(), 0..2);
        assert_eq!(pop.subpop_range(1).unwrap(), 2..6);
        assert!(pop.subpop_range(2).is_err());
    }

    #[test]
    fn test_population_with_subpops_size_mismatch() {
        let l = layout();
        let inds = (0..6).map(|_| Individual::new(&l, Sex::Male)).collect();
        let result = Population::with_subpops(l, inds, &[2, 5]);
        assert!(matches!(result, Err(SimulatorError::Validation(_))));
    }

    #[test]
    fn test_individual_out_of_range() {
        let pop = Population::zeroed(layout(), 3, Sex::Female);
        assert!(pop.individual(2).is_ok());
        assert!(matches!(
            pop.individual(3),
            Err(SimulatorError::Index { index: 3, len: 3 })
        ));
    }

    #[test]
    fn test_schema_compatible() {
        let a = Population::zeroed(layout(), 2, Sex::Female);
        let b = Population::zeroed(layout(), 9, Sex::Male);
        assert!(a.schema_compatible(&b));

        let other = Arc::new(GenomeLayout::diploid_autosomes(&[3]).unwrap());
        let c = Population::zeroed(other, 2, Sex::Female);
        assert!(!a.schema_compatible(&c));
    }

    #[test]
    fn test_reset_offspring() {
        let mut pop = Population::zeroed(layout(), 2, Sex::Female);
        pop.individuals_mut()[0].genotype_mut().fill(3);

        pop.reset_offspring(4, Sex::Male);
        assert_eq!(pop.size(), 4);
        assert!(pop
            .individuals()
            .iter()
            .all(|ind| ind.genotype().iter().all(|&a| a == 0)));
        assert!(pop.individuals().iter().all(|ind| ind.sex() == Sex::Male));
    }

    #[test]
    fn test_reset_offspring_clears_info_fields() {
        let l = Arc::new(
            GenomeLayout::new(
                2,
                vec![crate::genome::ChromosomeSpec::uniform(
                    "chr1",
                    4,
                    crate::genome::ChromosomeType::Autosome,
                )
                .unwrap()],
                vec!["ind_id".into()],
            )
            .unwrap(),
        );
        let mut pop = Population::zeroed(l, 3, Sex::Female);
        for (i, ind) in pop.individuals_mut().iter_mut().enumerate() {
            ind.set_info(0, 10.0 + i as f64);
        }

        // Reused offspring slots must not carry ids from a previous
        // generation.
        pop.reset_offspring(3, Sex::Female);
        assert!(pop.individuals().iter().all(|ind| ind.info_at(0) == 0.0));
    }

    #[test]
    fn test_swap_generation() {
        let mut parents = Population::zeroed(layout(), 3, Sex::Female);
        parents.individuals_mut()[0].genotype_mut().fill(1);

        let mut scratch = parents.scratch_like();
        scratch.reset_offspring(5, Sex::Female);
        scratch.individuals_mut()[0].genotype_mut().fill(2);

        parents.swap_generation(&mut scratch);

        assert_eq!(parents.size(), 5);
        assert_eq!(parents.individuals()[0].genotype()[0], 2);
        assert_eq!(scratch.size(), 3);
        assert_eq!(scratch.individuals()[0].genotype()[0], 1);
    }
}
