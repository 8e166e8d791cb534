//! Evolution driver, operator pipeline, and mating schemes.

pub mod driver;
pub mod mating;
pub mod operator;
pub mod report;

pub use driver::{ReplicateState, Simulator};
pub use mating::{MatingScheme, RandomMating};
pub use operator::{FnOperator, OpFlow, Operator, OperatorContext};
pub use report::{describe_pipeline, ReplicateSummary, RunReport};
