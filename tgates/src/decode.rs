// SPDX-License-Identifier: Apache-2.0

//! Maps a fixed-length gene sequence onto the wiring of a persistent gate
//! pool.
//!
//! Layout: two address genes per internal gate (in gate order), followed by
//! one address gene per output slot. An address below the input count names
//! that input gate; any other address `a` names internal gate
//! `a - input_count`.

use crate::gate::{GateRef, Primitive};
use crate::network::Network;

pub type Gene = u16;

pub const INPUTS_PER_GATE: usize = 2;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GeneLayout {
    pub inputs: usize,
    pub gates: usize,
    pub outputs: usize,
}

impl GeneLayout {
    pub fn new(inputs: usize, gates: usize, outputs: usize) -> Self {
        Self {
            inputs,
            gates,
            outputs,
        }
    }

    pub fn gene_count(&self) -> usize {
        self.gates * INPUTS_PER_GATE + self.outputs
    }

    /// Genes are drawn from `[0, address_count())`.
    pub fn address_count(&self) -> usize {
        self.gates + self.inputs
    }

    /// Allocates the gate pool a decoded network is wired over.
    pub fn make_pool(&self, primitive: Primitive) -> Network {
        assert_eq!(
            primitive.fan_in(),
            INPUTS_PER_GATE,
            "decoded gates must have fan-in {}; {} has {}",
            INPUTS_PER_GATE,
            primitive.name(),
            primitive.fan_in()
        );
        Network::with_pools(self.inputs, self.gates, primitive)
    }

    fn resolve(&self, network: &Network, gene: Gene) -> GateRef {
        let address = gene as usize;
        assert!(
            address < self.address_count(),
            "gene address {} out of domain [0, {})",
            address,
            self.address_count()
        );
        if address < self.inputs {
            network.inputs[address]
        } else {
            network.gates[address - self.inputs]
        }
    }
}

/// Rewires `network` from scratch according to `genes`. Gate caches are left
/// untouched.
pub fn decode(layout: &GeneLayout, genes: &[Gene], network: &mut Network) {
    assert_eq!(
        genes.len(),
        layout.gene_count(),
        "gene sequence has {} genes; layout expects {}",
        genes.len(),
        layout.gene_count()
    );
    assert_eq!(network.inputs.len(), layout.inputs);
    assert_eq!(network.gates.len(), layout.gates);

    network.reset_wiring();

    let (wiring_genes, output_genes) = genes.split_at(layout.gates * INPUTS_PER_GATE);
    for (i, operand_genes) in wiring_genes.chunks(INPUTS_PER_GATE).enumerate() {
        let target = network.gates[i];
        for gene in operand_genes {
            let source = layout.resolve(network, *gene);
            network.connect(source, target);
        }
    }
    for gene in output_genes {
        let output = layout.resolve(network, *gene);
        network.add_output(output);
    }

    network.check_wiring();
}
