//! Mating schemes: producing one offspring generation from a parental one.
//!
//! The driver hands a scheme the parental population and an exclusive scratch
//! buffer; the scheme fills the scratch with the offspring generation and the
//! driver swaps it in afterwards. A scheme owns its transmitter, so the
//! transmission strategy is fixed at configuration time.

use crate::errors::SimulatorError;
use crate::evolution::operator::OpFlow;
use crate::genome::{GenomeLayout, Sex};
use crate::population::Population;
use crate::transmission::GenoTransmitter;
use rand::{Rng, RngCore};

/// Produces an offspring generation into a scratch population.
pub trait MatingScheme {
    /// Prepare for a run on populations with the given structure. Called by
    /// the driver before the first generation.
    fn initialize(&mut self, layout: &GenomeLayout) -> Result<(), SimulatorError>;

    /// Fill `scratch` with the next generation bred from `parents`.
    ///
    /// `Ok(OpFlow::StopReplicate)` means this replicate cannot mate (for
    /// example one sex died out) and is deactivated without counting the
    /// generation. Errors are defects, not stop conditions.
    fn mate(
        &mut self,
        parents: &Population,
        scratch: &mut Population,
        rng: &mut dyn RngCore,
    ) -> Result<OpFlow, SimulatorError>;

    /// One-line human-readable description, used by pipeline reports.
    fn describe(&self) -> String;

    /// Release transmitter resources once evolution completes.
    fn finish(&mut self) -> Result<(), SimulatorError> {
        Ok(())
    }
}

/// Random mating with replacement.
///
/// Each offspring draws an independent random father from the parental males
/// and mother from the parental females, receives a uniformly random sex,
/// and gets its genotype from the configured transmitter. The offspring
/// generation keeps the parental size unless an explicit size is set.
pub struct RandomMating {
    transmitter: Box<dyn GenoTransmitter>,
    offspring_size: Option<usize>,
}

impl RandomMating {
    pub fn new(transmitter: Box<dyn GenoTransmitter>) -> Self {
        Self {
            transmitter,
            offspring_size: None,
        }
    }

    /// Fix the offspring generation size instead of keeping the parental one.
    pub fn with_offspring_size(mut self, size: usize) -> Self {
        self.offspring_size = Some(size);
        self
    }
}

impl MatingScheme for RandomMating {
    fn initialize(&mut self, layout: &GenomeLayout) -> Result<(), SimulatorError> {
        self.transmitter.initialize(layout)?;
        Ok(())
    }

    fn mate(
        &mut self,
        parents: &Population,
        scratch: &mut Population,
        rng: &mut dyn RngCore,
    ) -> Result<OpFlow, SimulatorError> {
        let size = self.offspring_size.unwrap_or(parents.size());
        if size == 0 {
            return Ok(OpFlow::StopReplicate);
        }

        let males: Vec<usize> = (0..parents.size())
            .filter(|&i| parents.individuals()[i].sex() == Sex::Male)
            .collect();
        let females: Vec<usize> = (0..parents.size())
            .filter(|&i| parents.individuals()[i].sex() == Sex::Female)
            .collect();
        if males.is_empty() || females.is_empty() {
            return Ok(OpFlow::StopReplicate);
        }

        scratch.reset_offspring(size, Sex::Female);
        for i in 0..size {
            let father = parents.individual(males[rng.random_range(0..males.len())])?;
            let mother = parents.individual(females[rng.random_range(0..females.len())])?;
            let sex = if rng.random::<f64>() < 0.5 {
                Sex::Male
            } else {
                Sex::Female
            };

            let offspring = scratch.individual_mut(i)?;
            offspring.set_sex(sex);
            self.transmitter
                .transmit(Some(father), Some(mother), offspring, rng)?;
        }
        Ok(OpFlow::Continue)
    }

    fn describe(&self) -> String {
        format!("random mating with {}", self.transmitter.describe())
    }

    fn finish(&mut self) -> Result<(), SimulatorError> {
        self.transmitter.finish()?;
        Ok(())
    }
}
