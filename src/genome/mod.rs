//! Genomic structure and individual genotype storage.

pub mod individual;
pub mod layout;

pub use individual::Individual;
pub use layout::{Allele, ChromosomeSpec, ChromosomeType, GenomeLayout, Sex};
