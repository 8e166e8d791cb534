use std::error;
use std::fmt;

/// Errors raised while constructing a `GenomeLayout`.
#[derive(Debug, Clone, PartialEq)]
pub enum LayoutError {
    /// Ploidy must be at least one.
    ZeroPloidy,
    /// A chromosome was declared with no loci.
    EmptyChromosome(String),
    /// Locus positions on a chromosome must be strictly increasing.
    PositionsNotIncreasing(String),
    /// More than one chromosome of type X or Y was declared.
    DuplicateSexChromosome(&'static str),
    /// A Y chromosome was declared without an X chromosome.
    YWithoutX,
}

impl fmt::Display for LayoutError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ZeroPloidy => write!(f, "Ploidy must be at least 1"),
            Self::EmptyChromosome(name) => {
                write!(f, "Chromosome '{name}' has no loci")
            }
            Self::PositionsNotIncreasing(name) => {
                write!(
                    f,
                    "Locus positions on chromosome '{name}' must be strictly increasing"
                )
            }
            Self::DuplicateSexChromosome(kind) => {
                write!(f, "More than one chromosome of type {kind}")
            }
            Self::YWithoutX => {
                write!(f, "A Y chromosome requires an X chromosome")
            }
        }
    }
}

impl error::Error for LayoutError {}

/// Errors raised by genotype transmitters.
///
/// These correspond to invariant violations: a transmitter used before
/// `initialize`, or applied to individuals whose genotype does not match the
/// cached layout. They indicate a defect in the calling code and are never
/// recovered from.
#[derive(Debug, Clone, PartialEq)]
pub enum TransmitError {
    /// `transmit` was called before `initialize`.
    Uninitialized(&'static str),
    /// The individual's genotype length does not match the cached layout.
    StructureMismatch { expected: usize, found: usize },
    /// A required parent was not supplied.
    MissingParent(&'static str),
    /// The configured mitochondrial chromosomes have different locus counts.
    MitochondrialLociMismatch { expected: usize, found: usize },
    /// The strategy does not support the population's structure (ploidy or
    /// chromosome types).
    Unsupported(&'static str),
    /// The configured identifier information field does not exist.
    UnknownInfoField(String),
    /// Writing a recombination record to the output sink failed.
    Output(String),
}

impl fmt::Display for TransmitError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Uninitialized(name) => {
                write!(f, "{name} must be initialized before transmitting genotype")
            }
            Self::StructureMismatch { expected, found } => {
                write!(
                    f,
                    "Genotype length {found} does not match initialized structure ({expected})"
                )
            }
            Self::MissingParent(which) => {
                write!(f, "Missing required {which} parent")
            }
            Self::MitochondrialLociMismatch { expected, found } => {
                write!(
                    f,
                    "Mitochondrial chromosomes must have the same number of loci ({expected} vs {found})"
                )
            }
            Self::Unsupported(msg) => write!(f, "{msg}"),
            Self::UnknownInfoField(name) => {
                write!(f, "Information field '{name}' does not exist")
            }
            Self::Output(msg) => write!(f, "Failed to write recombination record: {msg}"),
        }
    }
}

impl error::Error for TransmitError {}

impl From<std::io::Error> for TransmitError {
    fn from(e: std::io::Error) -> Self {
        Self::Output(e.to_string())
    }
}

/// Errors raised while constructing a `Recombinator` or a `ConversionSpec`.
#[derive(Debug, Clone, PartialEq)]
pub enum RecombinatorError {
    /// A rate or probability was outside [0.0, 1.0].
    InvalidProbability(&'static str, f64),
    /// The conversion length parameter must be positive.
    InvalidParameter(&'static str, f64),
    /// The per-locus rate list was empty.
    EmptyRateList,
    /// Recombination intensity must be non-negative.
    NegativeIntensity(f64),
}

impl fmt::Display for RecombinatorError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidProbability(name, val) => {
                write!(
                    f,
                    "Invalid probability for {name}: {val} (must be between 0.0 and 1.0)"
                )
            }
            Self::InvalidParameter(name, val) => {
                write!(f, "Invalid {name}: {val} (must be positive)")
            }
            Self::EmptyRateList => {
                write!(
                    f,
                    "Per-locus recombination rates require at least one (locus, rate) pair"
                )
            }
            Self::NegativeIntensity(val) => {
                write!(f, "Recombination intensity must be non-negative, got {val}")
            }
        }
    }
}

impl error::Error for RecombinatorError {}

/// Errors surfaced by the evolution driver.
///
/// Per-replicate and global stops are ordinary control flow (`OpFlow`) and
/// never appear here. `Validation` is always raised before the first
/// generation runs; `Internal` indicates a bookkeeping defect and is fatal.
#[derive(Debug)]
pub enum SimulatorError {
    /// Operator or mating scheme is incompatible with the population
    /// structure, or the evolve call itself is malformed.
    Validation(String),
    /// Out-of-range replicate index.
    Index { index: usize, len: usize },
    /// Invariant violation inside the driver.
    Internal(String),
    /// A transmitter failed during mating.
    Transmit(TransmitError),
}

impl fmt::Display for SimulatorError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Validation(msg) => write!(f, "Validation error: {msg}"),
            Self::Index { index, len } => {
                write!(
                    f,
                    "Replicate index {index} out of range (0 to {})",
                    len.saturating_sub(1)
                )
            }
            Self::Internal(msg) => write!(f, "Internal error: {msg}"),
            Self::Transmit(e) => write!(f, "Transmission failed: {e}"),
        }
    }
}

impl error::Error for SimulatorError {
    fn source(&self) -> Option<&(dyn error::Error + 'static)> {
        match self {
            Self::Transmit(e) => Some(e),
            _ => None,
        }
    }
}

impl From<TransmitError> for SimulatorError {
    fn from(e: TransmitError) -> Self {
        Self::Transmit(e)
    }
}
