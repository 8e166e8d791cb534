//! Operator pipeline interface.
//!
//! Operators act on one replicate's population at defined points of a
//! generation (init, pre-mating, post-mating, final). Stops are ordinary
//! return values, not unwinding: an operator answers with an [`OpFlow`] and
//! the driver propagates it.

use crate::errors::SimulatorError;
use crate::population::Population;
use rand::RngCore;

/// Control-flow outcome of an operator or mating call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OpFlow {
    /// Keep going.
    Continue,
    /// Deactivate the current replicate; others continue unaffected.
    StopReplicate,
    /// Deactivate every replicate and end the run, with an optional message.
    StopAll(Option<String>),
}

/// Per-call context handed to operators.
#[derive(Debug)]
pub struct OperatorContext<'a> {
    /// Index of the replicate being processed.
    pub replicate: usize,
    /// The replicate's current generation number (not yet incremented for
    /// the generation in progress).
    pub generation: usize,
    /// First generation number the run will not evolve, when the generation
    /// count is fixed.
    pub end_generation: Option<usize>,
    /// Active flags of every replicate at the start of this replicate's turn.
    pub active: &'a [bool],
}

/// A population operator applied during evolution.
pub trait Operator {
    /// Whether the operator fires for this replicate at this generation.
    /// Inactive operators are skipped without affecting control flow.
    fn is_active(&self, _ctx: &OperatorContext) -> bool {
        true
    }

    /// Apply the operator to one replicate's population.
    fn apply(
        &mut self,
        pop: &mut Population,
        ctx: &OperatorContext,
        rng: &mut dyn RngCore,
    ) -> OpFlow;

    /// One-line human-readable description, used by pipeline reports.
    fn describe(&self) -> String;

    /// Schema check against the population structure, run once before any
    /// generation executes.
    fn validate(&self, _pop: &Population) -> Result<(), SimulatorError> {
        Ok(())
    }

    /// Release any resources (output streams) once evolution completes.
    fn finish(&mut self) -> Result<(), SimulatorError> {
        Ok(())
    }
}

/// Adapter turning a closure into an operator.
pub struct FnOperator<F> {
    name: String,
    f: F,
}

impl<F> FnOperator<F>
where
    F: FnMut(&mut Population, &OperatorContext) -> OpFlow,
{
    pub fn new(name: impl Into<String>, f: F) -> Self {
        Self {
            name: name.into(),
            f,
        }
    }
}

impl<F> Operator for FnOperator<F>
where
    F: FnMut(&mut Population, &OperatorContext) -> OpFlow,
{
    fn apply(
        &mut self,
        pop: &mut Population,
        ctx: &OperatorContext,
        _rng: &mut dyn RngCore,
    ) -> OpFlow {
        (self.f)(pop, ctx)
    }

    fn describe(&self) -> String {
        self.name.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::genome::{GenomeLayout, Sex};
    use rand::SeedableRng;
    use rand_xoshiro::Xoshiro256PlusPlus;
    use std::sync::Arc;

    #[test]
    fn test_fn_operator() {
        let layout = Arc::new(GenomeLayout::diploid_autosomes(&[4]).unwrap());
        let mut pop = Population::zeroed(layout, 3, Sex::Female);
        let mut rng = Xoshiro256PlusPlus::seed_from_u64(1);

        let mut op = FnOperator::new("zero first allele", |pop: &mut Population, _ctx: &OperatorContext| {
            pop.individuals_mut()[0].set_allele(0, 0, 7);
            OpFlow::Continue
        });

        let active = [true];
        let ctx = OperatorContext {
            replicate: 0,
            generation: 0,
            end_generation: Some(1),
            active: &active,
        };
        assert!(op.is_active(&ctx));
        assert_eq!(op.apply(&mut pop, &ctx, &mut rng), OpFlow::Continue);
        assert_eq!(pop.individuals()[0].allele(0, 0), 7);
        assert_eq!(op.describe(), "zero first allele");
    }
}
