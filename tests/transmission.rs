//! Transmission strategy properties exercised through the public API.

use popforge::prelude::*;
use rand::SeedableRng;
use rand_xoshiro::Xoshiro256PlusPlus;
use std::io::{self, Write};
use std::sync::{Arc, Mutex};

/// Write sink shared with the test so record output can be inspected.
#[derive(Clone, Default)]
struct SharedSink(Arc<Mutex<Vec<u8>>>);

impl SharedSink {
    fn contents(&self) -> String {
        String::from_utf8(self.0.lock().unwrap().clone()).unwrap()
    }
}

impl Write for SharedSink {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.lock().unwrap().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

fn tagged_parent(layout: &GenomeLayout, sex: Sex, a: u8, b: u8) -> Individual {
    let mut ind = Individual::new(layout, sex);
    let loci = layout.total_loci();
    ind.genotype_mut()[..loci].fill(a);
    ind.genotype_mut()[loci..].fill(b);
    ind
}

#[test]
fn mendelian_never_mixes_within_a_chromosome() {
    let layout = GenomeLayout::diploid_autosomes(&[12, 7, 3]).unwrap();
    let mut rng = Xoshiro256PlusPlus::seed_from_u64(17);
    let mom = tagged_parent(&layout, Sex::Female, 1, 2);
    let dad = tagged_parent(&layout, Sex::Male, 3, 4);

    let mut tx = MendelianTransmitter::new();
    tx.initialize(&layout).unwrap();

    for _ in 0..100 {
        let mut child = Individual::new(&layout, Sex::Female);
        tx.transmit(Some(&dad), Some(&mom), &mut child, &mut rng)
            .unwrap();
        for chrom in 0..layout.num_chromosomes() {
            let maternal = child.segment(0, layout.locus_range(chrom));
            assert!(maternal.iter().all(|&x| x == 1) || maternal.iter().all(|&x| x == 2));
            let paternal = child.segment(1, layout.locus_range(chrom));
            assert!(paternal.iter().all(|&x| x == 3) || paternal.iter().all(|&x| x == 4));
        }
    }
}

#[test]
fn full_rate_recombination_interleaves_and_records_every_gap() {
    let loci = 16;
    let layout = GenomeLayout::new(
        2,
        vec![ChromosomeSpec::uniform("chr1", loci, ChromosomeType::Autosome).unwrap()],
        vec!["ind_id".into()],
    )
    .unwrap();
    let mut rng = Xoshiro256PlusPlus::seed_from_u64(23);
    let mut mom = tagged_parent(&layout, Sex::Female, 1, 2);
    mom.set_info(0, 1.0);

    let sink = SharedSink::default();
    let mut rec = Recombinator::new(RecombinationRates::Uniform(1.0))
        .unwrap()
        .with_records("ind_id", Box::new(sink.clone()));
    rec.initialize(&layout).unwrap();

    let mut child = Individual::new(&layout, Sex::Female);
    child.set_info(0, 2.0);
    rec.transmit_genotype(&mom, &mut child, 0, Some(0), &mut rng)
        .unwrap();
    rec.finish().unwrap();

    // Maximal interleaving: the strand flips at every locus.
    let expect: Vec<u8> = (0..loci).map(|i| if i % 2 == 0 { 1 } else { 2 }).collect();
    assert_eq!(child.homolog(0), &expect[..]);

    // One record with L-1 breakpoints.
    let line = sink.contents();
    let fields: Vec<&str> = line.trim().split(' ').collect();
    assert_eq!(&fields[..3], &["2", "1", "0"]);
    let breakpoints: Vec<usize> = fields[3..].iter().map(|s| s.parse().unwrap()).collect();
    assert_eq!(breakpoints, (0..loci - 1).collect::<Vec<_>>());
}

#[test]
fn conversion_pairs_every_crossover_with_a_flip_back() {
    let loci = 40;
    let markers = 3;
    let layout = GenomeLayout::new(
        2,
        vec![ChromosomeSpec::uniform("chr1", loci, ChromosomeType::Autosome).unwrap()],
        vec!["ind_id".into()],
    )
    .unwrap();
    let mut rng = Xoshiro256PlusPlus::seed_from_u64(31);
    let mom = tagged_parent(&layout, Sex::Female, 1, 2);

    let sink = SharedSink::default();
    let mut rec = Recombinator::new(RecombinationRates::Uniform(0.2))
        .unwrap()
        .with_conversion(ConversionSpec::new(1.0, ConversionMode::FixedMarkers(markers)).unwrap())
        .with_records("ind_id", Box::new(sink.clone()));
    rec.initialize(&layout).unwrap();

    for _ in 0..50 {
        let mut child = Individual::new(&layout, Sex::Female);
        rec.transmit_genotype(&mom, &mut child, 0, Some(0), &mut rng)
            .unwrap();
    }
    rec.finish().unwrap();

    // Every crossover is followed by exactly one flip-back `markers` gaps
    // later, unless the chromosome ends first.
    for line in sink.contents().lines() {
        let breakpoints: Vec<usize> = line
            .split(' ')
            .skip(3)
            .map(|s| s.parse().unwrap())
            .collect();
        let mut i = 0;
        while i < breakpoints.len() {
            let primary = breakpoints[i];
            if primary + markers <= loci - 2 {
                assert_eq!(
                    breakpoints.get(i + 1),
                    Some(&(primary + markers)),
                    "crossover at {primary} lacks its flip-back in {breakpoints:?}"
                );
                i += 2;
            } else {
                // Truncated by the chromosome end; must be the last event.
                assert_eq!(i, breakpoints.len() - 1);
                i += 1;
            }
        }
    }
}

#[test]
fn mitochondrial_follows_the_maternal_line() {
    let layout = GenomeLayout::new(
        2,
        vec![
            ChromosomeSpec::uniform("chr1", 5, ChromosomeType::Autosome).unwrap(),
            ChromosomeSpec::uniform("mt", 4, ChromosomeType::Customized).unwrap(),
        ],
        vec![],
    )
    .unwrap();
    let mut rng = Xoshiro256PlusPlus::seed_from_u64(2);
    let mt_range = layout.locus_range(1);

    let mut mom = Individual::new(&layout, Sex::Female);
    mom.segment_mut(0, mt_range.clone()).fill(7);
    mom.segment_mut(1, mt_range.clone()).fill(8);

    let mut tx = MitochondrialTransmitter::new();
    tx.initialize(&layout).unwrap();

    let mut child = Individual::new(&layout, Sex::Male);
    child.genotype_mut().fill(1);
    tx.transmit(None, Some(&mom), &mut child, &mut rng).unwrap();

    // Homolog 0 of the organelle chromosome matches the mother's homolog 0;
    // every further homolog is zeroed.
    assert_eq!(child.segment(0, mt_range.clone()), &[7; 4]);
    assert_eq!(child.segment(1, mt_range), &[0; 4]);
}

#[test]
fn recombining_population_preserves_the_allele_pool() {
    // Under recombination the offspring shuffle parental material but can
    // never invent alleles.
    let layout = Arc::new(GenomeLayout::diploid_autosomes(&[20]).unwrap());
    let individuals: Vec<Individual> = (0..12)
        .map(|i| {
            let sex = if i % 2 == 0 { Sex::Female } else { Sex::Male };
            let mut ind = Individual::new(&layout, sex);
            let loci = layout.total_loci();
            ind.genotype_mut()[..loci].fill(1);
            ind.genotype_mut()[loci..].fill(2);
            ind
        })
        .collect();
    let pop = Population::new(layout, individuals);

    let mut sim = Simulator::new(pop, 1, 8).unwrap();
    let rec = Recombinator::new(RecombinationRates::Uniform(0.1)).unwrap();
    let mut mating = RandomMating::new(Box::new(rec));

    sim.evolve(
        &mut Vec::new(),
        &mut Vec::new(),
        &mut mating,
        &mut Vec::new(),
        &mut Vec::new(),
        Some(10),
    )
    .unwrap();

    let pop = sim.population(0).unwrap();
    assert!(pop
        .individuals()
        .iter()
        .all(|ind| ind.genotype().iter().all(|&a| a == 1 || a == 2)));
}

#[test]
fn selfing_population_stays_viable_without_males() {
    // Selfing uses a single parent, so an all-female population keeps
    // reproducing when the mating scheme draws only mothers.
    let layout = GenomeLayout::diploid_autosomes(&[6]).unwrap();
    let mut rng = Xoshiro256PlusPlus::seed_from_u64(5);
    let parent = tagged_parent(&layout, Sex::Female, 1, 2);

    let mut tx = SelfingTransmitter::new();
    tx.initialize(&layout).unwrap();

    let mut child = Individual::new(&layout, Sex::Female);
    tx.transmit(None, Some(&parent), &mut child, &mut rng)
        .unwrap();
    assert!(child.genotype().iter().all(|&a| a == 1 || a == 2));
}
