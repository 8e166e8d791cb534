//! Evolution driver: replicate populations advancing generation by
//! generation.
//!
//! The driver owns every replicate and one scratch population reused for
//! mating. Replicates are processed strictly in index order within a
//! generation; a global stop triggered mid-generation leaves higher-indexed
//! replicates unprocessed for that generation.

use crate::errors::SimulatorError;
use crate::evolution::mating::MatingScheme;
use crate::evolution::operator::{OpFlow, Operator, OperatorContext};
use crate::evolution::report::RunReport;
use crate::population::Population;
use log::{debug, info};
use rand::SeedableRng;
use rand_xoshiro::Xoshiro256PlusPlus;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// One independently evolving population plus its bookkeeping.
#[derive(Debug, Clone)]
pub struct ReplicateState {
    population: Population,
    generation: usize,
    evolved: usize,
    active: bool,
}

impl ReplicateState {
    fn new(population: Population) -> Self {
        Self {
            population,
            generation: 0,
            evolved: 0,
            active: true,
        }
    }

    #[inline]
    pub fn population(&self) -> &Population {
        &self.population
    }

    /// Current generation number. Monotonic; never decremented.
    #[inline]
    pub fn generation(&self) -> usize {
        self.generation
    }

    /// Cumulative generations evolved across all `evolve` calls.
    #[inline]
    pub fn evolved(&self) -> usize {
        self.evolved
    }

    #[inline]
    pub fn is_active(&self) -> bool {
        self.active
    }
}

/// Forward-time simulator over a set of replicate populations.
///
/// All run state (random engine, replicate set, scratch buffer, interrupt
/// flag) lives in this object; there is no process-wide state.
#[derive(Debug)]
pub struct Simulator {
    replicates: Vec<ReplicateState>,
    scratch: Population,
    rng: Xoshiro256PlusPlus,
    interrupt: Arc<AtomicBool>,
    last_stop: Option<String>,
}

impl Simulator {
    /// Create a simulator holding `replicate_count` independent copies of
    /// `population`.
    pub fn new(
        population: Population,
        replicate_count: usize,
        seed: u64,
    ) -> Result<Self, SimulatorError> {
        if replicate_count == 0 {
            return Err(SimulatorError::Validation(
                "A simulator needs at least one replicate".into(),
            ));
        }
        let scratch = population.scratch_like();
        let mut replicates = Vec::with_capacity(replicate_count);
        for _ in 0..replicate_count - 1 {
            replicates.push(ReplicateState::new(population.clone()));
        }
        replicates.push(ReplicateState::new(population));
        Ok(Self {
            replicates,
            scratch,
            rng: Xoshiro256PlusPlus::seed_from_u64(seed),
            interrupt: Arc::new(AtomicBool::new(false)),
            last_stop: None,
        })
    }

    #[inline]
    pub fn num_replicates(&self) -> usize {
        self.replicates.len()
    }

    pub fn replicate(&self, rep: usize) -> Result<&ReplicateState, SimulatorError> {
        self.replicates.get(rep).ok_or(SimulatorError::Index {
            index: rep,
            len: self.replicates.len(),
        })
    }

    pub fn population(&self, rep: usize) -> Result<&Population, SimulatorError> {
        Ok(&self.replicate(rep)?.population)
    }

    pub fn population_mut(&mut self, rep: usize) -> Result<&mut Population, SimulatorError> {
        let len = self.replicates.len();
        self.replicates
            .get_mut(rep)
            .map(|r| &mut r.population)
            .ok_or(SimulatorError::Index { index: rep, len })
    }

    /// Remove a replicate and take ownership of its population. The
    /// remaining replicates shift down; their bookkeeping is unaffected.
    pub fn extract(&mut self, rep: usize) -> Result<Population, SimulatorError> {
        if rep >= self.replicates.len() {
            return Err(SimulatorError::Index {
                index: rep,
                len: self.replicates.len(),
            });
        }
        Ok(self.replicates.remove(rep).population)
    }

    /// Append a population as a fresh replicate with a zero generation
    /// counter. It must be schema compatible with the existing replicates.
    pub fn add(&mut self, population: Population) -> Result<(), SimulatorError> {
        if let Some(first) = self.replicates.first() {
            if !first.population.schema_compatible(&population) {
                return Err(SimulatorError::Validation(
                    "Added population does not match the replicates' genomic structure".into(),
                ));
            }
        }
        self.replicates.push(ReplicateState::new(population));
        Ok(())
    }

    /// Handle for requesting a global stop from outside the evolve loop.
    /// Polled once per replicate per generation; cleared when `evolve`
    /// starts.
    pub fn interrupt_flag(&self) -> Arc<AtomicBool> {
        Arc::clone(&self.interrupt)
    }

    /// Summary of per-replicate progress after the latest `evolve` call.
    pub fn report(&self) -> RunReport {
        RunReport::from_replicates(&self.replicates, self.last_stop.clone())
    }

    /// Human-readable summary of the replicate set. Diagnostic only.
    pub fn describe(&self) -> String {
        self.report().to_string()
    }

    /// Advance every replicate through `generations` generations (`None`
    /// runs until an operator signals termination).
    ///
    /// `init_ops` run once per replicate before the loop and `final_ops`
    /// once after it, both unconditionally. Within a generation each active
    /// replicate applies `pre_ops`, mates into the scratch buffer, swaps the
    /// offspring in, and applies `post_ops`. A `StopReplicate` from an
    /// operator or the mating scheme deactivates only that replicate; a
    /// `StopAll` or an external interrupt deactivates every replicate. A
    /// generation counts as evolved once mating succeeded, even when a
    /// post-mating operator deactivates the replicate afterwards.
    ///
    /// Returns the number of generations each replicate evolved during this
    /// call, in replicate order.
    ///
    /// # Errors
    /// Fails with a validation error before any generation runs when the
    /// pipeline is incompatible with the population structure, or when
    /// unbounded evolution is requested with no operator that could stop it.
    pub fn evolve(
        &mut self,
        init_ops: &mut [Box<dyn Operator>],
        pre_ops: &mut [Box<dyn Operator>],
        mating: &mut dyn MatingScheme,
        post_ops: &mut [Box<dyn Operator>],
        final_ops: &mut [Box<dyn Operator>],
        generations: Option<usize>,
    ) -> Result<Vec<usize>, SimulatorError> {
        let n = self.replicates.len();
        if n == 0 {
            return Err(SimulatorError::Validation(
                "Cannot evolve: every replicate has been extracted".into(),
            ));
        }
        if generations.is_none() && pre_ops.is_empty() && post_ops.is_empty() {
            return Err(SimulatorError::Validation(
                "Unbounded evolution requires at least one pre- or post-mating operator that can stop it"
                    .into(),
            ));
        }

        // Validate the whole pipeline before anything runs, including a
        // zero-generation call.
        {
            let first = &self.replicates[0].population;
            for op in init_ops
                .iter()
                .chain(pre_ops.iter())
                .chain(post_ops.iter())
                .chain(final_ops.iter())
            {
                op.validate(first)?;
            }
            mating.initialize(first.layout())?;
        }
        if generations == Some(0) {
            return Ok(vec![0; n]);
        }

        self.interrupt.store(false, Ordering::Relaxed);
        self.last_stop = None;
        for rep in &mut self.replicates {
            rep.active = true;
        }
        let end_generations: Vec<Option<usize>> = self
            .replicates
            .iter()
            .map(|r| generations.map(|g| r.generation + g))
            .collect();

        let Self {
            replicates,
            scratch,
            rng,
            interrupt,
            last_stop,
        } = self;

        // initOps never affect control flow.
        {
            let mask: Vec<bool> = replicates.iter().map(|r| r.active).collect();
            for idx in 0..n {
                let ctx = OperatorContext {
                    replicate: idx,
                    generation: replicates[idx].generation,
                    end_generation: end_generations[idx],
                    active: &mask,
                };
                for op in init_ops.iter_mut() {
                    op.apply(&mut replicates[idx].population, &ctx, rng);
                }
            }
        }

        let mut evolved = vec![0usize; n];
        let mut remaining = generations;
        'evolution: loop {
            for idx in 0..n {
                if interrupt.load(Ordering::Relaxed) {
                    info!("evolution interrupted, stopping all replicates");
                    deactivate_all(replicates, last_stop, Some("interrupted".into()));
                    break 'evolution;
                }
                if !replicates[idx].active {
                    continue;
                }

                let mask: Vec<bool> = replicates.iter().map(|r| r.active).collect();
                let ctx = OperatorContext {
                    replicate: idx,
                    generation: replicates[idx].generation,
                    end_generation: end_generations[idx],
                    active: &mask,
                };

                // Pre-mating operators. A failure here means the generation
                // is not evolved for this replicate.
                let mut flow = OpFlow::Continue;
                for op in pre_ops.iter_mut() {
                    if !op.is_active(&ctx) {
                        continue;
                    }
                    flow = op.apply(&mut replicates[idx].population, &ctx, rng);
                    if flow != OpFlow::Continue {
                        break;
                    }
                }
                match flow {
                    OpFlow::Continue => {}
                    OpFlow::StopReplicate => {
                        debug!("replicate {idx} deactivated by a pre-mating operator");
                        replicates[idx].active = false;
                        continue;
                    }
                    OpFlow::StopAll(msg) => {
                        deactivate_all(replicates, last_stop, msg);
                        continue;
                    }
                }

                // Borrow the parents, produce into the scratch, swap the
                // offspring generation in on success.
                match mating.mate(&replicates[idx].population, scratch, rng)? {
                    OpFlow::Continue => {
                        if !replicates[idx].population.schema_compatible(scratch) {
                            return Err(SimulatorError::Internal(
                                "mating produced offspring with a different genomic structure"
                                    .into(),
                            ));
                        }
                        replicates[idx].population.swap_generation(scratch);
                    }
                    OpFlow::StopReplicate => {
                        debug!("replicate {idx} deactivated by failed mating");
                        replicates[idx].active = false;
                        continue;
                    }
                    OpFlow::StopAll(msg) => {
                        deactivate_all(replicates, last_stop, msg);
                        continue;
                    }
                }

                // Post-mating operators. Mating already succeeded, so the
                // generation counts even if the replicate is deactivated
                // here.
                let mut flow = OpFlow::Continue;
                for op in post_ops.iter_mut() {
                    if !op.is_active(&ctx) {
                        continue;
                    }
                    flow = op.apply(&mut replicates[idx].population, &ctx, rng);
                    if flow != OpFlow::Continue {
                        break;
                    }
                }
                match flow {
                    OpFlow::Continue => {}
                    OpFlow::StopReplicate => {
                        debug!("replicate {idx} deactivated by a post-mating operator");
                        replicates[idx].active = false;
                    }
                    OpFlow::StopAll(msg) => deactivate_all(replicates, last_stop, msg),
                }

                replicates[idx].generation += 1;
                replicates[idx].evolved += 1;
                evolved[idx] += 1;
            }

            if let Some(rem) = remaining.as_mut() {
                *rem -= 1;
                if *rem == 0 {
                    break;
                }
            }
            if replicates.iter().all(|r| !r.active) {
                break;
            }
        }

        // finalOps run once per replicate, unconditionally.
        {
            let mask: Vec<bool> = replicates.iter().map(|r| r.active).collect();
            for idx in 0..n {
                let ctx = OperatorContext {
                    replicate: idx,
                    generation: replicates[idx].generation,
                    end_generation: end_generations[idx],
                    active: &mask,
                };
                for op in final_ops.iter_mut() {
                    op.apply(&mut replicates[idx].population, &ctx, rng);
                }
            }
        }

        // Close any output streams the pipeline opened.
        for op in init_ops
            .iter_mut()
            .chain(pre_ops.iter_mut())
            .chain(post_ops.iter_mut())
            .chain(final_ops.iter_mut())
        {
            op.finish()?;
        }
        mating.finish()?;

        Ok(evolved)
    }
}

fn deactivate_all(
    replicates: &mut [ReplicateState],
    last_stop: &mut Option<String>,
    msg: Option<String>,
) {
    match &msg {
        Some(m) => info!("evolution stopped: {m}"),
        None => info!("evolution stopped by operator signal"),
    }
    for rep in replicates.iter_mut() {
        rep.active = false;
    }
    *last_stop = msg;
}
