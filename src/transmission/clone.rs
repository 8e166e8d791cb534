//! Clonal genotype transmission.

use crate::errors::TransmitError;
use crate::genome::{GenomeLayout, Individual};
use crate::transmission::{GenoTransmitter, TransmissionPlan};
use rand::RngCore;

/// Copies the parental genotype directly to the offspring.
///
/// The full genotype is copied: every homologous set and every chromosome,
/// including customized ones. If both parents are supplied, the maternal
/// genotype is used. Sex and all information fields are propagated from the
/// same parent. No randomness is involved.
#[derive(Debug, Default)]
pub struct CloneTransmitter {
    plan: Option<TransmissionPlan>,
}

impl CloneTransmitter {
    pub fn new() -> Self {
        Self { plan: None }
    }
}

impl GenoTransmitter for CloneTransmitter {
    fn initialize(&mut self, layout: &GenomeLayout) -> Result<(), TransmitError> {
        self.plan = Some(TransmissionPlan::from_layout(layout));
        Ok(())
    }

    fn transmit(
        &mut self,
        father: Option<&Individual>,
        mother: Option<&Individual>,
        offspring: &mut Individual,
        _rng: &mut dyn RngCore,
    ) -> Result<(), TransmitError> {
        let plan = self
            .plan
            .as_ref()
            .ok_or(TransmitError::Uninitialized("CloneTransmitter"))?;
        let parent = mother
            .or(father)
            .ok_or(TransmitError::MissingParent("maternal"))?;
        plan.check(parent)?;
        plan.check(offspring)?;

        offspring.genotype_mut().copy_from_slice(parent.genotype());
        offspring.set_sex(parent.sex());
        offspring.copy_info_from(parent);
        Ok(())
    }

    fn describe(&self) -> String {
        "clonal inheritance".into()
    }
}
