//! # popforge
//!
//! Forward-time, discrete-generation population-genetics simulation engine.
//! It provides a genome and population model, a polymorphic family of
//! genotype transmission strategies (clonal, Mendelian, selfing,
//! haplodiploid, mitochondrial, and recombining), and an evolution driver
//! that advances replicate populations through operator pipelines and a
//! mating scheme.

pub mod errors;
pub mod evolution;
pub mod genome;
pub mod population;
pub mod prelude;
pub mod sampler;
pub mod transmission;

pub use genome::{Allele, GenomeLayout, Individual, Sex};
pub use population::Population;
