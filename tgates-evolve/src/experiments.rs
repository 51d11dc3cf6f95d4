// SPDX-License-Identifier: Apache-2.0

//! Repeated independent searches sharing one generator.

use std::sync::atomic::{AtomicBool, Ordering};

use anyhow::Result;
use serde::Serialize;

use crate::rng::RandomSource;
use crate::search::{time_to_perfect, RunOutcome};
use crate::EvolveOptions;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ExperimentRecord {
    /// 1-based experiment number.
    pub index: usize,
    pub outcome: RunOutcome,
    /// Mean generations-to-perfect over the experiments so far that reached
    /// a perfect circuit.
    pub running_average: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ExperimentSummary {
    pub target: String,
    pub experiments: Vec<ExperimentRecord>,
    pub perfect_runs: usize,
    pub average_generations: Option<f64>,
}

impl ExperimentSummary {
    fn new(options: &EvolveOptions) -> Self {
        Self {
            target: options.target.target().name().to_string(),
            experiments: Vec::new(),
            perfect_runs: 0,
            average_generations: None,
        }
    }
}

/// Runs up to `count` searches back to back, drawing from `rng` throughout so
/// the whole batch is reproducible from one seed. Stops early if `running` is
/// cleared.
pub fn run_experiments<R: RandomSource + ?Sized>(
    options: &EvolveOptions,
    count: usize,
    rng: &mut R,
    running: &AtomicBool,
) -> Result<ExperimentSummary> {
    options.validate()?;
    let mut summary = ExperimentSummary::new(options);
    let mut total_generations: u64 = 0;

    for index in 1..=count {
        if !running.load(Ordering::SeqCst) {
            break;
        }
        let outcome = time_to_perfect(options, rng, running)?;
        if outcome.interrupted {
            log::info!("experiment {} interrupted", index);
            break;
        }
        if let Some(reached) = outcome.reached {
            total_generations += reached;
            summary.perfect_runs += 1;
            summary.average_generations =
                Some(total_generations as f64 / summary.perfect_runs as f64);
        }
        match (outcome.reached, summary.average_generations) {
            (Some(reached), Some(average)) => {
                log::info!("{}: {} ({:.2})", index, reached, average)
            }
            _ => log::info!(
                "{}: no perfect circuit in {} generations",
                index,
                outcome.generations
            ),
        }
        summary.experiments.push(ExperimentRecord {
            index,
            outcome,
            running_average: summary.average_generations,
        });
    }

    Ok(summary)
}
