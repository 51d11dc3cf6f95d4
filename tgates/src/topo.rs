// SPDX-License-Identifier: Apache-2.0

//! Backward layered traversal from the outputs, used as a coarse size and
//! cyclicity signal for tie-breaking between equally fit circuits.
//!
//! Gates reached while walking a layer's inputs are `Frontier` until the
//! layer that contains them has been processed, after which they are
//! `Closed`. Reaching a `Closed` gate again means an edge leads back into an
//! already resolved part of the graph and the network is flagged cyclic.
//! This is advisory only: reconvergent paths of unequal length can also trip
//! the flag, and the visit count is a proxy, not a unique-gate count.

use bitvec::vec::BitVec;
use serde::Serialize;

use crate::gate::GateRef;
use crate::network::Network;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct TopoSummary {
    pub cyclic: bool,
    /// One per output slot plus one per input edge that reached an
    /// unvisited or frontier gate.
    pub effective_visits: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Mark {
    Unvisited,
    Frontier,
    Closed,
}

/// Caller-owned traversal buffers; every buffer is bounded by the arena size.
#[derive(Debug, Clone, Default)]
pub struct TopoScratch {
    marks: Vec<Mark>,
    layer: Vec<GateRef>,
    next_layer: Vec<GateRef>,
    queued: BitVec,
}

impl TopoScratch {
    pub fn new(network: &Network) -> Self {
        let node_count = network.node_count();
        Self {
            marks: vec![Mark::Unvisited; node_count],
            layer: Vec::with_capacity(node_count),
            next_layer: Vec::with_capacity(node_count),
            queued: BitVec::repeat(false, node_count),
        }
    }

    fn reset(&mut self, node_count: usize) {
        self.marks.clear();
        self.marks.resize(node_count, Mark::Unvisited);
        self.layer.clear();
        self.next_layer.clear();
        self.queued.clear();
        self.queued.resize(node_count, false);
    }
}

pub fn analyze(network: &Network) -> TopoSummary {
    let mut scratch = TopoScratch::new(network);
    analyze_with_scratch(network, &mut scratch)
}

pub fn analyze_with_scratch(network: &Network, scratch: &mut TopoScratch) -> TopoSummary {
    network.check_wiring();
    scratch.reset(network.node_count());

    let mut cyclic = false;
    let mut effective_visits = network.outputs.len();

    for output in network.outputs.iter() {
        if !scratch.queued[output.id] {
            scratch.queued.set(output.id, true);
            scratch.marks[output.id] = Mark::Frontier;
            scratch.layer.push(*output);
        }
    }

    let mut depth = 0;
    while !scratch.layer.is_empty() {
        for gate_ref in scratch.layer.iter() {
            scratch.queued.set(gate_ref.id, false);
        }
        for gate_ref in scratch.layer.iter() {
            for input in network.get(*gate_ref).inputs() {
                match scratch.marks[input.id] {
                    Mark::Unvisited | Mark::Frontier => {
                        effective_visits += 1;
                        scratch.marks[input.id] = Mark::Frontier;
                        if !scratch.queued[input.id] {
                            scratch.queued.set(input.id, true);
                            scratch.next_layer.push(*input);
                        }
                    }
                    Mark::Closed => {
                        log::trace!(
                            "topo: %{} reads closed %{} at depth {}",
                            gate_ref.id,
                            input.id,
                            depth
                        );
                        cyclic = true;
                    }
                }
            }
        }
        for gate_ref in scratch.layer.iter() {
            scratch.marks[gate_ref.id] = Mark::Closed;
        }
        std::mem::swap(&mut scratch.layer, &mut scratch.next_layer);
        scratch.next_layer.clear();
        depth += 1;
    }

    TopoSummary {
        cyclic,
        effective_visits,
    }
}
