// SPDX-License-Identifier: Apache-2.0

//! The generational loop: decode and score every circuit, track the best
//! fitness seen, rank, copy elite genes over the weakest slots and mutate.

use std::cmp::Ordering as CmpOrdering;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Instant;

use anyhow::{ensure, Result};
use serde::Serialize;
use tgates::decode::{decode, Gene, GeneLayout};
use tgates::fitness::{score_counts, Target};
use tgates::network::Network;
use tgates::network_sim::SimScratch;
use tgates::topo::{analyze_with_scratch, TopoScratch, TopoSummary};

use crate::mutation::{mutate, random_genes, MutationRates};
use crate::rng::RandomSource;
use crate::EvolveOptions;

/// One member of the population. Each circuit owns its gate pool, so the
/// per-gate memoization caches persist across generations.
pub struct Circuit {
    pub genes: Vec<Gene>,
    network: Network,
    scratch: SimScratch,
    pub fitness: f64,
}

impl Circuit {
    fn new(options: &EvolveOptions, layout: &GeneLayout, genes: Vec<Gene>) -> Self {
        let network = layout.make_pool(options.primitive.into());
        let scratch = SimScratch::new(&network);
        Self {
            genes,
            network,
            scratch,
            fitness: 0.0,
        }
    }

    /// Rewires the pool from the current genes and rescores it.
    fn evaluate(&mut self, layout: &GeneLayout, target: &dyn Target) -> f64 {
        decode(layout, &self.genes, &mut self.network);
        self.fitness = score_counts(&mut self.network, target, &mut self.scratch).fraction();
        self.fitness
    }

    pub fn network(&self) -> &Network {
        &self.network
    }
}

/// Best fitness seen so far plus the topology of the circuit that holds the
/// record.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct BestRecord {
    pub fitness: f64,
    pub effective_visits: usize,
    pub cyclic: bool,
}

impl BestRecord {
    /// Folds one scored circuit into `best`. `summarize` is only invoked when
    /// the circuit matches or beats the record.
    ///
    /// A strictly better fitness replaces the record. On a tie an acyclic
    /// circuit clears the cyclic flag, and a smaller visit count replaces
    /// both visit count and flag. Returns true if the fitness improved.
    pub fn offer(
        best: &mut Option<BestRecord>,
        fitness: f64,
        summarize: impl FnOnce() -> TopoSummary,
    ) -> bool {
        match best {
            Some(record) if fitness < record.fitness => false,
            Some(record) if fitness == record.fitness => {
                let summary = summarize();
                if record.cyclic && !summary.cyclic {
                    record.cyclic = false;
                }
                if summary.effective_visits < record.effective_visits {
                    record.effective_visits = summary.effective_visits;
                    record.cyclic = summary.cyclic;
                }
                false
            }
            _ => {
                let summary = summarize();
                *best = Some(BestRecord {
                    fitness,
                    effective_visits: summary.effective_visits,
                    cyclic: summary.cyclic,
                });
                true
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RunOutcome {
    /// Generation index (0-based) in which a perfect circuit appeared.
    pub reached: Option<u64>,
    /// Number of generations scored.
    pub generations: u64,
    pub interrupted: bool,
    pub best: Option<BestRecord>,
    /// Genes of the top-ranked circuit when the run stopped.
    pub champion: Vec<Gene>,
    /// Topology of the champion; `None` if no generation was scored.
    pub champion_topology: Option<TopoSummary>,
}

fn by_fitness(a: &Circuit, b: &Circuit) -> CmpOrdering {
    a.fitness.partial_cmp(&b.fitness).unwrap_or(CmpOrdering::Equal)
}

/// Copies the genes of the top `elite` circuits over the bottom slots
/// (slot `i` takes slot `len - 1 - i`) and mutates each copy, then mutates
/// the middle slots `[elite, len - elite - 1)`. The top `elite + 1` slots are
/// left as they are. `population` must be sorted ascending by fitness.
fn breed<R: RandomSource + ?Sized>(
    population: &mut [Circuit],
    elite: usize,
    layout: &GeneLayout,
    rates: MutationRates,
    rng: &mut R,
) {
    let len = population.len();
    assert!(
        2 * elite < len,
        "elite count {} too large for population {}",
        elite,
        len
    );
    for i in 0..elite {
        let (low, high) = population.split_at_mut(len - 1 - i);
        low[i].genes.copy_from_slice(&high[0].genes);
        mutate(&mut low[i].genes, layout, rates, rng);
    }
    for circuit in population[elite..len - elite - 1].iter_mut() {
        mutate(&mut circuit.genes, layout, rates, rng);
    }
}

/// Runs one search from a random population until some circuit scores 1.0,
/// `max_generations` is hit, or `running` is cleared.
pub fn time_to_perfect<R: RandomSource + ?Sized>(
    options: &EvolveOptions,
    rng: &mut R,
    running: &AtomicBool,
) -> Result<RunOutcome> {
    time_to_perfect_from(options, Vec::new(), rng, running)
}

/// Like `time_to_perfect`, but the first slots of the initial population take
/// `seeds`; the remaining slots are drawn at random.
pub fn time_to_perfect_from<R: RandomSource + ?Sized>(
    options: &EvolveOptions,
    seeds: Vec<Vec<Gene>>,
    rng: &mut R,
    running: &AtomicBool,
) -> Result<RunOutcome> {
    options.validate()?;
    let layout = options.layout();
    let target = options.target.target();
    let population_size = options.population;

    ensure!(
        seeds.len() <= population_size,
        "{} seed circuits do not fit in a population of {}",
        seeds.len(),
        population_size
    );
    for (i, genes) in seeds.iter().enumerate() {
        ensure!(
            genes.len() == layout.gene_count(),
            "seed circuit {} has {} genes; layout expects {}",
            i,
            genes.len(),
            layout.gene_count()
        );
        ensure!(
            genes.iter().all(|g| (*g as usize) < layout.address_count()),
            "seed circuit {} has a gene outside [0, {})",
            i,
            layout.address_count()
        );
    }

    let mut seeds = seeds.into_iter();
    let mut population: Vec<Circuit> = (0..population_size)
        .map(|_| {
            let genes = match seeds.next() {
                Some(genes) => genes,
                None => random_genes(&layout, &mut *rng),
            };
            Circuit::new(options, &layout, genes)
        })
        .collect();
    let mut topo_scratch = TopoScratch::new(population[0].network());

    let mut best: Option<BestRecord> = None;
    let mut reached = None;
    let mut generation: u64 = 0;
    let start_time = Instant::now();

    loop {
        if !running.load(Ordering::SeqCst) {
            break;
        }
        if let Some(limit) = options.max_generations {
            if generation >= limit {
                break;
            }
        }

        for circuit in population.iter_mut() {
            let fitness = circuit.evaluate(&layout, target);
            let improved = BestRecord::offer(&mut best, fitness, || {
                analyze_with_scratch(circuit.network(), &mut topo_scratch)
            });
            if improved {
                log::debug!("generation {}: best fitness now {:.6}", generation, fitness);
            }
        }
        population.sort_by(by_fitness);
        let index = generation;
        generation += 1;

        if best.map_or(false, |b| b.fitness == 1.0) {
            reached = Some(index);
            break;
        }

        breed(&mut population, options.elite, &layout, options.rates, rng);

        if generation % options.report_interval == 0 {
            if let (Some(record), Some(top)) = (best, population.last()) {
                log::info!(
                    "{}: {:.6} {:.6} (visits: {}; cyclic: {}) [{:.1}s]",
                    generation,
                    top.fitness,
                    record.fitness,
                    record.effective_visits,
                    record.cyclic,
                    start_time.elapsed().as_secs_f64()
                );
            }
        }
    }

    let interrupted = !running.load(Ordering::SeqCst);
    // The top slot is never bred, so its pool is still wired to its genes.
    let (champion, champion_topology) = match population.last() {
        Some(top) if generation > 0 => (
            top.genes.clone(),
            Some(analyze_with_scratch(top.network(), &mut topo_scratch)),
        ),
        Some(top) => (top.genes.clone(), None),
        None => (Vec::new(), None),
    };
    Ok(RunOutcome {
        reached,
        generations: generation,
        interrupted,
        best,
        champion,
        champion_topology,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{render_genes, TargetKind};
    use pretty_assertions::assert_eq;
    use rand::SeedableRng;
    use rand_pcg::Pcg64Mcg;
    use tgates::fitness::score;
    use tgates::test_utils::goal1_nand_network;
    use tgates::topo::analyze;

    fn summary(cyclic: bool, effective_visits: usize) -> TopoSummary {
        TopoSummary {
            cyclic,
            effective_visits,
        }
    }

    fn small_options() -> EvolveOptions {
        EvolveOptions {
            target: TargetKind::Goal1,
            gates: 10,
            population: 40,
            elite: 10,
            max_generations: Some(4),
            report_interval: 2,
            ..EvolveOptions::default()
        }
    }

    #[test]
    fn test_first_offer_sets_record() {
        let mut best = None;
        assert!(BestRecord::offer(&mut best, 0.5, || summary(true, 9)));
        assert_eq!(
            best,
            Some(BestRecord {
                fitness: 0.5,
                effective_visits: 9,
                cyclic: true
            })
        );
    }

    #[test]
    fn test_worse_offer_skips_analysis() {
        let mut best = Some(BestRecord {
            fitness: 0.75,
            effective_visits: 5,
            cyclic: false,
        });
        let before = best;
        assert!(!BestRecord::offer(&mut best, 0.5, || panic!("analyzed")));
        assert_eq!(best, before);
    }

    #[test]
    fn test_tie_with_acyclic_clears_flag_only() {
        let mut best = Some(BestRecord {
            fitness: 0.75,
            effective_visits: 5,
            cyclic: true,
        });
        assert!(!BestRecord::offer(&mut best, 0.75, || summary(false, 8)));
        assert_eq!(
            best,
            Some(BestRecord {
                fitness: 0.75,
                effective_visits: 5,
                cyclic: false
            })
        );
    }

    #[test]
    fn test_tie_with_fewer_visits_replaces_both() {
        let mut best = Some(BestRecord {
            fitness: 0.75,
            effective_visits: 5,
            cyclic: false,
        });
        BestRecord::offer(&mut best, 0.75, || summary(true, 4));
        assert_eq!(
            best,
            Some(BestRecord {
                fitness: 0.75,
                effective_visits: 4,
                cyclic: true
            })
        );
    }

    #[test]
    fn test_better_offer_replaces_record() {
        let mut best = Some(BestRecord {
            fitness: 0.5,
            effective_visits: 3,
            cyclic: false,
        });
        assert!(BestRecord::offer(&mut best, 0.875, || summary(true, 12)));
        assert_eq!(best.map(|b| b.effective_visits), Some(12));
    }

    #[test]
    fn test_bounded_run_stops_at_limit() {
        let _ = env_logger::builder().is_test(true).try_init();
        let options = small_options();
        let mut rng = Pcg64Mcg::seed_from_u64(18);
        let running = AtomicBool::new(true);
        let outcome = time_to_perfect(&options, &mut rng, &running).unwrap();
        assert!(!outcome.interrupted);
        match outcome.reached {
            Some(g) => assert_eq!(outcome.generations, g + 1),
            None => assert_eq!(outcome.generations, 4),
        }
        let best = outcome.best.unwrap();
        assert!((0.0..=1.0).contains(&best.fitness));
        assert_eq!(outcome.champion.len(), options.layout().gene_count());
    }

    /// `goal1_nand_network` expressed as genes over a 4-input, 10-gate pool.
    const GOAL1_NAND_GENES: [Gene; 21] = [
        0, 1, 2, 3, 2, 4, 0, 5, 1, 5, 3, 4, 6, 9, 7, 8, 10, 11, 12, 12, 13,
    ];

    #[test]
    fn test_goal1_genes_decode_to_fixture() {
        let options = small_options();
        assert_eq!(
            render_genes(&options, &GOAL1_NAND_GENES),
            goal1_nand_network().to_string()
        );
    }

    #[test]
    fn test_seeded_perfect_circuit_stops_in_first_generation() {
        let _ = env_logger::builder().is_test(true).try_init();
        let options = small_options();
        let mut rng = Pcg64Mcg::seed_from_u64(7);
        let running = AtomicBool::new(true);
        let outcome =
            time_to_perfect_from(&options, vec![GOAL1_NAND_GENES.to_vec()], &mut rng, &running)
                .unwrap();
        assert_eq!(outcome.reached, Some(0));
        assert_eq!(outcome.generations, 1);
        assert!(!outcome.interrupted);
        assert_eq!(outcome.best.map(|b| b.fitness), Some(1.0));

        let layout = options.layout();
        let mut n = layout.make_pool(options.primitive.into());
        decode(&layout, &outcome.champion, &mut n);
        assert_eq!(score(&mut n, options.target.target()), 1.0);
        assert_eq!(outcome.champion_topology, Some(analyze(&n)));
    }

    #[test]
    fn test_malformed_seed_is_reported() {
        let options = small_options();
        let mut rng = Pcg64Mcg::seed_from_u64(7);
        let running = AtomicBool::new(true);
        let err = time_to_perfect_from(&options, vec![vec![0; 3]], &mut rng, &running)
            .unwrap_err();
        assert!(err.to_string().contains("layout expects 21"), "{}", err);
    }

    fn constant_population(options: &EvolveOptions, layout: &GeneLayout) -> Vec<Circuit> {
        (0..options.population)
            .map(|i| Circuit::new(options, layout, vec![i as Gene; layout.gene_count()]))
            .collect()
    }

    fn genes_of(population: &[Circuit]) -> Vec<Vec<Gene>> {
        population.iter().map(|c| c.genes.clone()).collect()
    }

    #[test]
    fn test_breed_copies_elite_over_bottom_slots() {
        let options = EvolveOptions {
            population: 7,
            elite: 2,
            ..small_options()
        };
        let layout = options.layout();
        let mut population = constant_population(&options, &layout);
        let before = genes_of(&population);
        let rates = MutationRates {
            gate: 0.0,
            locus: 1.0,
        };
        let mut rng = Pcg64Mcg::seed_from_u64(18);
        breed(&mut population, options.elite, &layout, rates, &mut rng);
        let after = genes_of(&population);

        assert_eq!(after[0], before[6]);
        assert_eq!(after[1], before[5]);
        assert_eq!(&after[2..], &before[2..]);
    }

    #[test]
    fn test_breed_mutates_middle_and_keeps_top() {
        let options = EvolveOptions {
            population: 7,
            elite: 2,
            ..small_options()
        };
        let layout = options.layout();
        let mut population = constant_population(&options, &layout);
        let before = genes_of(&population);
        let rates = MutationRates {
            gate: 1.0,
            locus: 1.0,
        };
        let mut rng = Pcg64Mcg::seed_from_u64(18);
        breed(&mut population, options.elite, &layout, rates, &mut rng);
        let after = genes_of(&population);

        // Slots 0 and 1 are mutated copies, 2 and 3 are mutated in place,
        // and the top three are untouched.
        for i in 0..4 {
            assert_ne!(after[i], before[i], "slot {} unchanged", i);
            assert!(after[i]
                .iter()
                .all(|g| (*g as usize) < layout.address_count()));
        }
        assert_eq!(&after[4..], &before[4..]);
    }

    #[test]
    fn test_same_seed_same_outcome() {
        let options = small_options();
        let running = AtomicBool::new(true);
        let mut a = Pcg64Mcg::seed_from_u64(18);
        let mut b = Pcg64Mcg::seed_from_u64(18);
        assert_eq!(
            time_to_perfect(&options, &mut a, &running).unwrap(),
            time_to_perfect(&options, &mut b, &running).unwrap()
        );
    }

    #[test]
    fn test_cleared_flag_stops_before_first_generation() {
        let options = small_options();
        let mut rng = Pcg64Mcg::seed_from_u64(18);
        let running = AtomicBool::new(false);
        let outcome = time_to_perfect(&options, &mut rng, &running).unwrap();
        assert!(outcome.interrupted);
        assert_eq!(outcome.generations, 0);
        assert_eq!(outcome.best, None);
        assert_eq!(outcome.reached, None);
    }

    #[test]
    fn test_invalid_options_are_reported() {
        let options = EvolveOptions {
            population: 4,
            elite: 2,
            ..small_options()
        };
        let mut rng = Pcg64Mcg::seed_from_u64(18);
        let running = AtomicBool::new(true);
        assert!(time_to_perfect(&options, &mut rng, &running).is_err());
    }
}
