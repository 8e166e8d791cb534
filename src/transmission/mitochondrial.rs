//! Maternal transmission of customized (organelle) chromosomes.

use crate::errors::TransmitError;
use crate::genome::{ChromosomeType, GenomeLayout, Individual};
use crate::transmission::{GenoTransmitter, TransmissionPlan};
use rand::RngCore;

/// Transmits organelle chromosomes maternally.
///
/// For each chromosome of the transmitted set the offspring's first
/// homologous set receives the mother's first homologous set of the same
/// chromosome; the remaining homologous sets of that chromosome are
/// cleared. The set defaults to every customized chromosome of the layout
/// and can be narrowed to an explicit subset; all of its chromosomes must
/// be customized and carry the same number of loci. Chromosomes outside
/// the set are not touched, so this strategy composes with a nuclear
/// transmitter applied to the same offspring.
#[derive(Debug, Default)]
pub struct MitochondrialTransmitter {
    chromosomes: Option<Vec<usize>>,
    active: Vec<usize>,
    plan: Option<TransmissionPlan>,
}

impl MitochondrialTransmitter {
    pub fn new() -> Self {
        Self {
            chromosomes: None,
            active: Vec::new(),
            plan: None,
        }
    }

    /// Restrict transmission to an explicit set of chromosome indices
    /// instead of every customized chromosome. Validated at `initialize`.
    pub fn with_chromosomes(mut self, chromosomes: Vec<usize>) -> Self {
        self.chromosomes = Some(chromosomes);
        self
    }
}

impl GenoTransmitter for MitochondrialTransmitter {
    fn initialize(&mut self, layout: &GenomeLayout) -> Result<(), TransmitError> {
        let active = match &self.chromosomes {
            Some(chroms) => {
                for &idx in chroms {
                    if idx >= layout.num_chromosomes() {
                        return Err(TransmitError::Unsupported(
                            "Mitochondrial transmission names an out-of-range chromosome",
                        ));
                    }
                    if layout.chromosome(idx).kind() != ChromosomeType::Customized {
                        return Err(TransmitError::Unsupported(
                            "Mitochondrial transmission only applies to customized chromosomes",
                        ));
                    }
                }
                chroms.clone()
            }
            None => layout.customized_chromosomes().to_vec(),
        };
        if let Some((&first, rest)) = active.split_first() {
            let expected = layout.chromosome(first).num_loci();
            for &idx in rest {
                let found = layout.chromosome(idx).num_loci();
                if found != expected {
                    return Err(TransmitError::MitochondrialLociMismatch { expected, found });
                }
            }
        }
        self.active = active;
        self.plan = Some(TransmissionPlan::from_layout(layout));
        Ok(())
    }

    fn transmit(
        &mut self,
        _father: Option<&Individual>,
        mother: Option<&Individual>,
        offspring: &mut Individual,
        _rng: &mut dyn RngCore,
    ) -> Result<(), TransmitError> {
        let plan = self
            .plan
            .as_ref()
            .ok_or(TransmitError::Uninitialized("MitochondrialTransmitter"))?;
        let mother = mother.ok_or(TransmitError::MissingParent("maternal"))?;
        plan.check(mother)?;
        plan.check(offspring)?;

        for &chrom in &self.active {
            plan.copy_chromosome(mother, 0, offspring, 0, chrom);
            for ploidy in 1..plan.ploidy() {
                plan.clear_chromosome(offspring, ploidy, chrom);
            }
        }
        Ok(())
    }

    fn describe(&self) -> String {
        "mitochondrial inheritance".into()
    }
}
