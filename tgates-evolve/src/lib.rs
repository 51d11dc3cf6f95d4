// SPDX-License-Identifier: Apache-2.0

//! Genetic search for feedback-capable gate networks realizing a fixed
//! target function.

use anyhow::{ensure, Result};
use clap::ValueEnum;
use serde::Serialize;
use tgates::decode::{decode, Gene, GeneLayout};
use tgates::fitness::Target;
use tgates::gate::Primitive;
use tgates::targets;

pub mod experiments;
pub mod mutation;
pub mod rng;
pub mod search;

use mutation::MutationRates;

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TargetKind {
    Goal1,
    Goal2,
    Rivest,
    DigitalDisplay,
}

impl TargetKind {
    pub fn target(self) -> &'static dyn Target {
        match self {
            TargetKind::Goal1 => &targets::GOAL1,
            TargetKind::Goal2 => &targets::GOAL2,
            TargetKind::Rivest => &targets::RIVEST,
            TargetKind::DigitalDisplay => &targets::DIGITAL_DISPLAY,
        }
    }
}

/// Fan-in-2 primitives a gate pool can be built from.
#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PoolPrimitive {
    Nand,
    And,
    Or,
    Xor,
}

impl From<PoolPrimitive> for Primitive {
    fn from(p: PoolPrimitive) -> Self {
        match p {
            PoolPrimitive::Nand => Primitive::Nand,
            PoolPrimitive::And => Primitive::And,
            PoolPrimitive::Or => Primitive::Or,
            PoolPrimitive::Xor => Primitive::Xor,
        }
    }
}

/// Engine-level options for one search.
#[derive(Clone, Debug)]
pub struct EvolveOptions {
    pub target: TargetKind,
    /// Internal gates per circuit.
    pub gates: usize,
    pub primitive: PoolPrimitive,
    pub population: usize,
    /// Number of top circuits whose genes are copied over the bottom slots
    /// each generation.
    pub elite: usize,
    pub rates: MutationRates,
    /// If `None`, the search runs until a perfect circuit is found or it is
    /// interrupted.
    pub max_generations: Option<u64>,
    pub report_interval: u64,
}

impl Default for EvolveOptions {
    fn default() -> Self {
        Self {
            target: TargetKind::Rivest,
            gates: 20,
            primitive: PoolPrimitive::Nand,
            population: 2000,
            elite: 800,
            rates: MutationRates::default(),
            max_generations: None,
            report_interval: 100,
        }
    }
}

impl EvolveOptions {
    pub fn layout(&self) -> GeneLayout {
        let target = self.target.target();
        GeneLayout::new(target.input_count(), self.gates, target.output_count())
    }

    pub fn validate(&self) -> Result<()> {
        ensure!(self.gates > 0, "gate count must be positive");
        ensure!(
            self.population > 0,
            "population must hold at least one circuit"
        );
        ensure!(
            2 * self.elite < self.population,
            "elite count {} too large for population {}; need 2 * elite < population",
            self.elite,
            self.population
        );
        ensure!(
            (0.0..=1.0).contains(&self.rates.gate),
            "gate mutation probability {} outside [0, 1]",
            self.rates.gate
        );
        ensure!(
            (0.0..=1.0).contains(&self.rates.locus),
            "locus mutation probability {} outside [0, 1]",
            self.rates.locus
        );
        ensure!(self.report_interval > 0, "report interval must be positive");
        let address_count = self.layout().address_count();
        ensure!(
            address_count <= Gene::MAX as usize + 1,
            "{} gene addresses do not fit in a {}-bit gene",
            address_count,
            Gene::BITS
        );
        Ok(())
    }
}

/// Text listing of the network `genes` decode to under `options`.
pub fn render_genes(options: &EvolveOptions, genes: &[Gene]) -> String {
    let layout = options.layout();
    let mut network = layout.make_pool(options.primitive.into());
    decode(&layout, genes, &mut network);
    network.to_string()
}
