// SPDX-License-Identifier: Apache-2.0

//! Repeated genetic searches for a feedback-capable gate network realizing a
//! fixed target function.

use anyhow::Result;
use clap::Parser;
use rand::SeedableRng;
use rand_pcg::Pcg64Mcg;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use tgates_evolve::experiments::run_experiments;
use tgates_evolve::mutation::MutationRates;
use tgates_evolve::{render_genes, EvolveOptions, PoolPrimitive, TargetKind};

#[derive(Parser, Debug)]
#[clap(author, version, about, long_about = None)]
struct CliArgs {
    /// Target function to search for.
    #[clap(long, value_enum, default_value_t = TargetKind::Rivest)]
    target: TargetKind,

    /// Internal gates per circuit.
    #[clap(long, value_parser, default_value_t = 20)]
    gates: usize,

    /// Primitive every internal gate uses.
    #[clap(long, value_enum, default_value_t = PoolPrimitive::Nand)]
    primitive: PoolPrimitive,

    /// Circuits per generation.
    #[clap(long, value_parser, default_value_t = 2000)]
    population: usize,

    /// Top circuits copied over the weakest slots each generation.
    #[clap(long, value_parser, default_value_t = 800)]
    elite: usize,

    /// Probability that a circuit is mutated in a generation.
    #[clap(long, value_parser, default_value_t = 0.7)]
    mutation: f64,

    /// Per-locus redraw probability within a mutation.
    #[clap(long, value_parser, default_value_t = 0.001)]
    locus_mutation: f64,

    /// Random seed
    #[clap(short = 'S', long, value_parser, default_value_t = 18)]
    seed: u64,

    /// Number of independent searches.
    #[clap(short = 'n', long, value_parser, default_value_t = 50)]
    experiments: usize,

    /// Give up on a search after this many generations.
    #[clap(long, value_parser)]
    max_generations: Option<u64>,

    /// Log progress every this many generations.
    #[clap(long, value_parser, default_value_t = 100)]
    report_interval: u64,

    /// Print the experiment summary as JSON on stdout.
    #[clap(long)]
    json: bool,
}

impl CliArgs {
    fn to_options(&self) -> EvolveOptions {
        EvolveOptions {
            target: self.target,
            gates: self.gates,
            primitive: self.primitive,
            population: self.population,
            elite: self.elite,
            rates: MutationRates {
                gate: self.mutation,
                locus: self.locus_mutation,
            },
            max_generations: self.max_generations,
            report_interval: self.report_interval,
        }
    }
}

fn main() -> Result<()> {
    let _ = env_logger::builder().try_init();

    let cli = CliArgs::parse();
    log::info!("evolve-driver started with args: {:?}", cli);

    let options = cli.to_options();
    options.validate()?;

    let running = Arc::new(AtomicBool::new(true));
    let r = running.clone();
    ctrlc::set_handler(move || {
        r.store(false, Ordering::SeqCst);
        eprintln!("\nCtrl+C received, attempting to shut down gracefully...");
    })?;

    let mut rng = Pcg64Mcg::seed_from_u64(cli.seed);
    let summary = run_experiments(&options, cli.experiments, &mut rng, &running)?;

    if !running.load(Ordering::SeqCst) {
        log::warn!("search was interrupted");
    }

    if let Some(last) = summary.experiments.last() {
        if let Some(best) = last.outcome.best {
            log::info!(
                "last experiment best: fitness={:.6} visits={} cyclic={}",
                best.fitness,
                best.effective_visits,
                best.cyclic
            );
        }
        if let Some(topology) = last.outcome.champion_topology {
            log::info!(
                "top circuit topology: visits={} cyclic={}",
                topology.effective_visits,
                topology.cyclic
            );
        }
        if !last.outcome.champion.is_empty() {
            log::info!(
                "top circuit:\n{}",
                render_genes(&options, &last.outcome.champion)
            );
        }
    }

    if cli.json {
        println!("{}", serde_json::to_string_pretty(&summary)?);
    } else {
        match summary.average_generations {
            Some(average) => println!(
                "{} of {} searches reached a perfect {} circuit; average generations {:.2}",
                summary.perfect_runs,
                summary.experiments.len(),
                summary.target,
                average
            ),
            None => println!(
                "no perfect {} circuit found in {} searches",
                summary.target,
                summary.experiments.len()
            ),
        }
    }

    Ok(())
}
