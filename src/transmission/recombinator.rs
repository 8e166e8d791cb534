//! Mendelian transmission augmented with crossover and gene conversion.
//!
//! The recombinator walks each chromosome locus by locus, switching the
//! active source homolog wherever a sampled crossover outcome is true. A
//! crossover can additionally trigger a gene conversion, a short reversal
//! that flips back to the pre-switch homolog after a marker count or a
//! physical tract length. Breakpoints can be streamed to a text sink as one
//! record per transmitted homologous set.

use crate::errors::{RecombinatorError, TransmitError};
use crate::genome::{ChromosomeType, GenomeLayout, Individual, Sex};
use crate::sampler;
use crate::transmission::{GenoTransmitter, TransmissionPlan};
use rand::{Rng, RngCore};
use rand_distr::{Exp, Geometric};
use std::fmt;
use std::io::Write;
use std::ops::Range;

/// Where per-gap crossover probabilities come from. The three sources are
/// mutually exclusive by construction.
#[derive(Debug, Clone, PartialEq)]
pub enum RecombinationRates {
    /// One rate for every within-chromosome gap.
    Uniform(f64),
    /// Distinct rates for the gap after each named global locus; unnamed
    /// gaps never recombine.
    AtLoci(Vec<(usize, f64)>),
    /// The gap rate is the physical distance between the flanking loci times
    /// this multiplier, capped at 1.
    Intensity(f64),
}

impl RecombinationRates {
    fn validate(&self) -> Result<(), RecombinatorError> {
        match self {
            Self::Uniform(r) => {
                if !(0.0..=1.0).contains(r) {
                    return Err(RecombinatorError::InvalidProbability(
                        "recombination rate",
                        *r,
                    ));
                }
            }
            Self::AtLoci(pairs) => {
                if pairs.is_empty() {
                    return Err(RecombinatorError::EmptyRateList);
                }
                for &(_, r) in pairs {
                    if !(0.0..=1.0).contains(&r) {
                        return Err(RecombinatorError::InvalidProbability(
                            "recombination rate",
                            r,
                        ));
                    }
                }
            }
            Self::Intensity(i) => {
                if *i < 0.0 {
                    return Err(RecombinatorError::NegativeIntensity(*i));
                }
            }
        }
        Ok(())
    }
}

/// How far a triggered gene conversion extends before flipping back.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ConversionMode {
    /// Flip back after exactly this many markers.
    FixedMarkers(usize),
    /// Flip back after a geometric number of markers (minimum 1) with this
    /// success parameter.
    GeometricMarkers(f64),
    /// Flip back at the first locus whose position exceeds the tract end,
    /// where the tract starts at the midpoint of the triggering gap and has
    /// this fixed length.
    FixedTract(f64),
    /// As `FixedTract`, with the length drawn from an exponential
    /// distribution with this mean.
    ExponentialTract(f64),
}

/// Gene-conversion configuration: a trigger probability per crossover and an
/// extent mode.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ConversionSpec {
    probability: f64,
    mode: ConversionMode,
}

impl ConversionSpec {
    pub fn new(probability: f64, mode: ConversionMode) -> Result<Self, RecombinatorError> {
        if !(0.0..=1.0).contains(&probability) {
            return Err(RecombinatorError::InvalidProbability(
                "conversion probability",
                probability,
            ));
        }
        match mode {
            ConversionMode::FixedMarkers(0) => {
                return Err(RecombinatorError::InvalidParameter(
                    "conversion marker count",
                    0.0,
                ));
            }
            ConversionMode::GeometricMarkers(p) if !(p > 0.0 && p <= 1.0) => {
                return Err(RecombinatorError::InvalidProbability(
                    "conversion marker parameter",
                    p,
                ));
            }
            ConversionMode::FixedTract(len) | ConversionMode::ExponentialTract(len)
                if len <= 0.0 =>
            {
                return Err(RecombinatorError::InvalidParameter(
                    "conversion tract length",
                    len,
                ));
            }
            _ => {}
        }
        Ok(Self { probability, mode })
    }

    #[inline]
    pub fn probability(&self) -> f64 {
        self.probability
    }

    #[inline]
    pub fn mode(&self) -> ConversionMode {
        self.mode
    }
}

/// Breakpoints of one transmitted homologous set.
///
/// Breakpoints are global locus indices of the left flank of the gap at
/// which the strand switched, in walk order. Conversion flip-backs appear as
/// ordinary breakpoints.
#[derive(Debug, Clone, PartialEq)]
pub struct RecombinationRecord {
    pub offspring_id: u64,
    pub parent_id: u64,
    pub starting_ploidy: usize,
    pub breakpoints: Vec<usize>,
}

impl fmt::Display for RecombinationRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {} {}",
            self.offspring_id, self.parent_id, self.starting_ploidy
        )?;
        for bp in &self.breakpoints {
            write!(f, " {bp}")?;
        }
        Ok(())
    }
}

/// Recombining genotype transmitter.
///
/// Sex chromosomes follow the same routing as plain Mendelian transmission;
/// the maternal X pair recombines like an autosome, the paternal
/// contribution is copied whole. Customized chromosomes are never touched.
pub struct Recombinator {
    rates: RecombinationRates,
    conversion: Option<ConversionSpec>,
    id_field: Option<String>,
    sink: Option<Box<dyn Write + Send>>,
    plan: Option<TransmissionPlan>,
    /// Crossover probability for the gap ending at each global locus. The
    /// first locus of every chromosome has probability 0.
    gap_probs: Vec<f64>,
    /// Physical position of every locus, global-indexed.
    positions: Vec<f64>,
    id_index: Option<usize>,
}

impl fmt::Debug for Recombinator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Recombinator")
            .field("rates", &self.rates)
            .field("conversion", &self.conversion)
            .field("id_field", &self.id_field)
            .field("initialized", &self.plan.is_some())
            .finish()
    }
}

impl Recombinator {
    pub fn new(rates: RecombinationRates) -> Result<Self, RecombinatorError> {
        rates.validate()?;
        Ok(Self {
            rates,
            conversion: None,
            id_field: None,
            sink: None,
            plan: None,
            gap_probs: Vec::new(),
            positions: Vec::new(),
            id_index: None,
        })
    }

    /// Enable gene conversion.
    pub fn with_conversion(mut self, spec: ConversionSpec) -> Self {
        self.conversion = Some(spec);
        self
    }

    /// Stream one breakpoint record per transmitted homologous set to
    /// `sink`, identifying individuals through the `id_field` information
    /// field. Identifiers must already be assigned when `transmit` runs.
    pub fn with_records(
        mut self,
        id_field: impl Into<String>,
        sink: Box<dyn Write + Send>,
    ) -> Self {
        self.id_field = Some(id_field.into());
        self.sink = Some(sink);
        self
    }

    /// Fill homologous set `ploidy` of the offspring from one parent,
    /// recombining between the parent's homologs.
    ///
    /// `ploidy` 0 is the maternal contribution, 1 the paternal one. `start`
    /// pins the initial source homolog; `None` picks one uniformly at
    /// random. Later chromosomes segregate independently.
    pub fn transmit_genotype<R: Rng + ?Sized>(
        &mut self,
        parent: &Individual,
        offspring: &mut Individual,
        ploidy: usize,
        start: Option<usize>,
        rng: &mut R,
    ) -> Result<(), TransmitError> {
        let plan = self
            .plan
            .clone()
            .ok_or(TransmitError::Uninitialized("Recombinator"))?;
        plan.check(parent)?;
        plan.check(offspring)?;

        let starting = start.unwrap_or_else(|| usize::from(rng.random::<f64>() < 0.5));
        let mut breakpoints = Vec::new();
        let mut first = true;

        for chrom in 0..plan.num_chromosomes() {
            match plan.chrom_kind(chrom) {
                ChromosomeType::Customized => {}
                // Resolved together with the X.
                ChromosomeType::Y => {}
                ChromosomeType::X if ploidy == 1 => {
                    // Paternal sex chromosomes carry no crossover; copy whole.
                    match offspring.sex() {
                        Sex::Female => {
                            plan.copy_chromosome(parent, 0, offspring, 1, chrom);
                            if let Some(y) = plan.chrom_y() {
                                plan.clear_chromosome(offspring, 1, y);
                            }
                        }
                        Sex::Male => {
                            if let Some(y) = plan.chrom_y() {
                                plan.copy_chromosome(parent, 1, offspring, 1, y);
                            }
                            plan.clear_chromosome(offspring, 1, chrom);
                        }
                    }
                }
                ChromosomeType::X => {
                    // Maternal X pair recombines like an autosome.
                    let src = if first {
                        starting
                    } else {
                        usize::from(rng.random::<f64>() < 0.5)
                    };
                    first = false;
                    self.walk_chromosome(
                        plan.chrom_range(chrom),
                        parent,
                        offspring,
                        ploidy,
                        src,
                        &mut breakpoints,
                        rng,
                    );
                    if let Some(y) = plan.chrom_y() {
                        plan.clear_chromosome(offspring, 0, y);
                    }
                }
                ChromosomeType::Autosome => {
                    let src = if first {
                        starting
                    } else {
                        usize::from(rng.random::<f64>() < 0.5)
                    };
                    first = false;
                    self.walk_chromosome(
                        plan.chrom_range(chrom),
                        parent,
                        offspring,
                        ploidy,
                        src,
                        &mut breakpoints,
                        rng,
                    );
                }
            }
        }

        if let Some(idx) = self.id_index {
            let record = RecombinationRecord {
                offspring_id: offspring.info_at(idx) as u64,
                parent_id: parent.info_at(idx) as u64,
                starting_ploidy: starting,
                breakpoints,
            };
            if let Some(sink) = self.sink.as_mut() {
                writeln!(sink, "{record}")?;
            }
        }
        Ok(())
    }

    /// Copy one chromosome locus by locus, switching strands at sampled
    /// crossovers and scheduled conversion flip-backs.
    ///
    /// While a conversion tract is open, sampled outcomes are ignored until
    /// the flip-back lands; a conversion truncated by the chromosome end
    /// never flips back.
    #[allow(clippy::too_many_arguments)]
    fn walk_chromosome<R: Rng + ?Sized>(
        &self,
        range: Range<usize>,
        parent: &Individual,
        offspring: &mut Individual,
        ploidy: usize,
        mut src: usize,
        breakpoints: &mut Vec<usize>,
        rng: &mut R,
    ) {
        let n = range.len();
        let outcomes = sampler::sample(&self.gap_probs[range.start + 1..range.end], rng);
        let positions = &self.positions[range.clone()];
        let mut flip_back: Option<usize> = None;

        offspring.set_allele(ploidy, range.start, parent.allele(src, range.start));
        for i in 1..n {
            if let Some(fb) = flip_back {
                // Sampled outcomes are ignored while a conversion is in
                // progress; the tract ends with its own strand flip.
                if fb == i {
                    src ^= 1;
                    breakpoints.push(range.start + i - 1);
                    flip_back = None;
                }
            } else if outcomes[i - 1] {
                src ^= 1;
                breakpoints.push(range.start + i - 1);
                if let Some(spec) = self.conversion {
                    if rng.random::<f64>() < spec.probability() {
                        let markers = conversion_markers(&spec, positions, i, rng);
                        if markers > 0 {
                            flip_back = Some(i + markers);
                        }
                    }
                }
            }
            offspring.set_allele(ploidy, range.start + i, parent.allele(src, range.start + i));
        }
    }
}

/// Number of markers a triggered conversion covers before flipping back;
/// 0 means the conversion does not take effect.
fn conversion_markers<R: Rng + ?Sized>(
    spec: &ConversionSpec,
    positions: &[f64],
    i: usize,
    rng: &mut R,
) -> usize {
    match spec.mode() {
        ConversionMode::FixedMarkers(n) => n,
        ConversionMode::GeometricMarkers(p) => {
            let geo = Geometric::new(p).expect("parameter validated at construction");
            rng.sample(geo) as usize + 1
        }
        ConversionMode::FixedTract(len) => tract_markers(positions, i, len),
        ConversionMode::ExponentialTract(mean) => {
            let exp = Exp::new(1.0 / mean).expect("parameter validated at construction");
            tract_markers(positions, i, rng.sample(exp))
        }
    }
}

/// Loci covered by a tract starting at the midpoint of the gap before locus
/// `i` and extending `tract` position units.
fn tract_markers(positions: &[f64], i: usize, tract: f64) -> usize {
    let mid = (positions[i - 1] + positions[i]) / 2.0;
    let end = mid + tract;
    positions[i..].iter().take_while(|&&p| p <= end).count()
}

impl GenoTransmitter for Recombinator {
    fn initialize(&mut self, layout: &GenomeLayout) -> Result<(), TransmitError> {
        if layout.ploidy() != 2 {
            return Err(TransmitError::Unsupported(
                "Recombination requires a diploid population",
            ));
        }

        let mut positions = Vec::with_capacity(layout.total_loci());
        let mut gap_probs = vec![0.0; layout.total_loci()];
        for chrom in 0..layout.num_chromosomes() {
            let range = layout.locus_range(chrom);
            let pos = layout.chromosome(chrom).positions();
            positions.extend_from_slice(pos);
            match &self.rates {
                RecombinationRates::Uniform(r) => {
                    for gap in gap_probs[range.start + 1..range.end].iter_mut() {
                        *gap = *r;
                    }
                }
                RecombinationRates::Intensity(intensity) => {
                    for (k, gap) in gap_probs[range.start + 1..range.end].iter_mut().enumerate() {
                        *gap = ((pos[k + 1] - pos[k]) * intensity).min(1.0);
                    }
                }
                RecombinationRates::AtLoci(_) => {}
            }
        }
        if let RecombinationRates::AtLoci(pairs) = &self.rates {
            for &(locus, r) in pairs {
                let within_chromosome = (0..layout.num_chromosomes()).any(|c| {
                    let range = layout.locus_range(c);
                    range.contains(&locus) && locus + 1 < range.end
                });
                if !within_chromosome {
                    return Err(TransmitError::Unsupported(
                        "A per-locus recombination rate must name a locus that has a successor on the same chromosome",
                    ));
                }
                gap_probs[locus + 1] = r;
            }
        }

        self.id_index = match &self.id_field {
            Some(name) => Some(
                layout
                    .info_index(name)
                    .ok_or_else(|| TransmitError::UnknownInfoField(name.clone()))?,
            ),
            None => None,
        };
        self.positions = positions;
        self.gap_probs = gap_probs;
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
        self.transmit_genotype(mother, offspring, 0, None, rng)?;
        self.transmit_genotype(father, offspring, 1, None, rng)
    }

    fn describe(&self) -> String {
        match &self.conversion {
            Some(_) => "genetic recombination with gene conversion".into(),
            None => "genetic recombination".into(),
        }
    }

    fn finish(&mut self) -> Result<(), TransmitError> {
        if let Some(sink) = self.sink.as_mut() {
            sink.flush()?;
        }
        Ok(())
    }
}
