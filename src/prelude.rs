//! Commonly used imports for convenience.
//!
//! # Example
//!
//! ```
//! use popforge::prelude::*;
//! use std::sync::Arc;
//!
//! let layout = Arc::new(GenomeLayout::diploid_autosomes(&[100]).unwrap());
//! let pop = Population::zeroed(layout, 50, Sex::Female);
//! assert_eq!(pop.size(), 50);
//! ```

pub use crate::errors;
pub use crate::evolution::{
    describe_pipeline, FnOperator, MatingScheme, OpFlow, Operator, OperatorContext, RandomMating,
    RunReport, Simulator,
};
pub use crate::genome::{Allele, ChromosomeSpec, ChromosomeType, GenomeLayout, Individual, Sex};
pub use crate::population::Population;
pub use crate::transmission::{
    CloneTransmitter, ConversionMode, ConversionSpec, GenoTransmitter, HaplodiploidTransmitter,
    MendelianTransmitter, MitochondrialTransmitter, RecombinationRates, Recombinator,
    SelfingTransmitter,
};
