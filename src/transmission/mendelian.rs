//! Mendelian segregation and its selfing / haplodiploid specializations.

use crate::errors::TransmitError;
use crate::genome::{ChromosomeType, GenomeLayout, Individual, Sex};
use crate::transmission::{GenoTransmitter, TransmissionPlan};
use rand::{Rng, RngCore};

/// Transmits genotypes following Mendel's laws.
///
/// For each autosome, one of the two parental homologs is chosen uniformly at
/// random and written whole into the target homologous set; this strategy
/// performs no intra-chromosome recombination. Sex chromosomes are routed
/// deterministically from the parent role and the offspring's sex: the mother
/// always contributes an X (a random one of her two), the father contributes
/// his X to daughters and his Y to sons. The convention for carriers of one X
/// and one Y is X on homolog 0 and Y on homolog 1; the unused sex-chromosome
/// slot is cleared. Customized chromosomes are left untouched.
#[derive(Debug, Default)]
pub struct MendelianTransmitter {
    plan: Option<TransmissionPlan>,
}

impl MendelianTransmitter {
    pub fn new() -> Self {
        Self { plan: None }
    }

    fn plan(&self) -> Result<&TransmissionPlan, TransmitError> {
        self.plan
            .as_ref()
            .ok_or(TransmitError::Uninitialized("MendelianTransmitter"))
    }

    /// Fill homologous set `ploidy` of the offspring from one parent.
    ///
    /// `ploidy` 0 is the maternal contribution, 1 the paternal one; the
    /// distinction only matters for sex chromosomes.
    pub fn transmit_genotype<R: Rng + ?Sized>(
        &self,
        parent: &Individual,
        offspring: &mut Individual,
        ploidy: usize,
        rng: &mut R,
    ) -> Result<(), TransmitError> {
        let plan = self.plan()?;
        plan.check(parent)?;
        plan.check(offspring)?;

        for chrom in 0..plan.num_chromosomes() {
            match plan.chrom_kind(chrom) {
                ChromosomeType::Customized => {}
                // X and Y are resolved together when the X is reached.
                ChromosomeType::Y => {}
                ChromosomeType::X => {
                    transmit_sex_chromosomes(plan, parent, offspring, ploidy, chrom, rng);
                }
                ChromosomeType::Autosome => {
                    let par_ploidy = usize::from(rng.random::<f64>() < 0.5);
                    plan.copy_chromosome(parent, par_ploidy, offspring, ploidy, chrom);
                }
            }
        }
        Ok(())
    }
}

fn transmit_sex_chromosomes<R: Rng + ?Sized>(
    plan: &TransmissionPlan,
    parent: &Individual,
    offspring: &mut Individual,
    ploidy: usize,
    x: usize,
    rng: &mut R,
) {
    let y = plan.chrom_y();

    if ploidy == 1 {
        // Paternal contribution: X to daughters, Y to sons.
        match offspring.sex() {
            Sex::Female => {
                plan.copy_chromosome(parent, 0, offspring, 1, x);
                if let Some(y) = y {
                    plan.clear_chromosome(offspring, 1, y);
                }
            }
            Sex::Male => {
                if let Some(y) = y {
                    plan.copy_chromosome(parent, 1, offspring, 1, y);
                }
                plan.clear_chromosome(offspring, 1, x);
            }
        }
    } else {
        // Maternal contribution: always a random one of the mother's two X's.
        let par_ploidy = usize::from(rng.random::<f64>() < 0.5);
        plan.copy_chromosome(parent, par_ploidy, offspring, 0, x);
        if let Some(y) = y {
            plan.clear_chromosome(offspring, 0, y);
        }
    }
}

fn check_diploid(layout: &GenomeLayout) -> Result<(), TransmitError> {
    if layout.ploidy() != 2 {
        return Err(TransmitError::Unsupported(
            "Mendelian transmission requires a diploid population",
        ));
    }
    Ok(())
}

impl GenoTransmitter for MendelianTransmitter {
    fn initialize(&mut self, layout: &GenomeLayout) -> Result<(), TransmitError> {
        check_diploid(layout)?;
        self.plan = Some(TransmissionPlan::from_layout(layout));
        Ok(())
    }

    fn transmit(
        &mut self,
        father: Option<&Individual>,
        mother: Option<&Individual>,
        offspring: &mut Individual,
        rng: &mut dyn RngCore,
    ) -> Result<(), TransmitError> {
        let mother = mother.ok_or(TransmitError::MissingParent("maternal"))?;
        let father = father.ok_or(TransmitError::MissingParent("paternal"))?;
        self.transmit_genotype(mother, offspring, 0, rng)?;
        self.transmit_genotype(father, offspring, 1, rng)
    }

    fn describe(&self) -> String {
        "Mendelian inheritance".into()
    }
}

/// Self-fertilization: one parent supplies both homolog draws.
///
/// A thin composition over [`MendelianTransmitter`]; the same individual
/// serves as the maternal and paternal parent.
#[derive(Debug, Default)]
pub struct SelfingTransmitter {
    inner: MendelianTransmitter,
}

impl SelfingTransmitter {
    pub fn new() -> Self {
        Self {
            inner: MendelianTransmitter::new(),
        }
    }
}

impl GenoTransmitter for SelfingTransmitter {
    fn initialize(&mut self, layout: &GenomeLayout) -> Result<(), TransmitError> {
        self.inner.initialize(layout)
    }

    fn transmit(
        &mut self,
        father: Option<&Individual>,
        mother: Option<&Individual>,
        offspring: &mut Individual,
        rng: &mut dyn RngCore,
    ) -> Result<(), TransmitError> {
        let parent = mother
            .or(father)
            .ok_or(TransmitError::MissingParent("selfing"))?;
        self.inner.transmit_genotype(parent, offspring, 0, rng)?;
        self.inner.transmit_genotype(parent, offspring, 1, rng)
    }

    fn describe(&self) -> String {
        "self-fertilization".into()
    }
}

/// Haplodiploid transmission.
///
/// The mother is diploid, the father haploid (only his first homologous set
/// is valid). Daughters receive a Mendelian draw from the mother and the
/// father's single homologous set; sons receive only the maternal draw and
/// their paternal set is not touched. Sex chromosomes are not meaningful in
/// haplodiploid populations and are rejected at initialization.
#[derive(Debug, Default)]
pub struct HaplodiploidTransmitter {
    inner: MendelianTransmitter,
}

impl HaplodiploidTransmitter {
    pub fn new() -> Self {
        Self {
            inner: MendelianTransmitter::new(),
        }
    }
}

impl GenoTransmitter for HaplodiploidTransmitter {
    fn initialize(&mut self, layout: &GenomeLayout) -> Result<(), TransmitError> {
        if layout.has_sex_chromosomes() {
            return Err(TransmitError::Unsupported(
                "Haplodiploid transmission does not support sex chromosomes",
            ));
        }
        self.inner.initialize(layout)
    }

    fn transmit(
        &mut self,
        father: Option<&Individual>,
        mother: Option<&Individual>,
        offspring: &mut Individual,
        rng: &mut dyn RngCore,
    ) -> Result<(), TransmitError> {
        let mother = mother.ok_or(TransmitError::MissingParent("maternal"))?;
        self.inner.transmit_genotype(mother, offspring, 0, rng)?;

        if offspring.sex() == Sex::Female {
            let father = father.ok_or(TransmitError::MissingParent("paternal"))?;
            let plan = self.inner.plan()?;
            plan.check(father)?;
            plan.copy_homologous_set(father, 0, offspring, 1);
        }
        Ok(())
    }

    fn describe(&self) -> String {
        "haplodiploid inheritance".into()
    }
}
