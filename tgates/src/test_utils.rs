// SPDX-License-Identifier: Apache-2.0

//! Hand-wired fixture networks shared by unit tests, integration tests and
//! benches.

use crate::gate::Primitive;
use crate::network::Network;

/// `out = and(in0, in1)`.
pub fn and_network() -> Network {
    let mut n = Network::new();
    let a = n.add_input();
    let b = n.add_input();
    let g = n.add_gate(Primitive::And);
    n.connect(a, g);
    n.connect(b, g);
    n.add_output(g);
    n
}

/// `g0 = and(in0, g1)`, `g1 = or(in1, g0)`, `out = g1`.
///
/// Settles for inputs 00, 01 and 11; with `in0 = 1, in1 = 0` nothing forces
/// the loop and the network does not converge.
pub fn feedback_pair_network() -> Network {
    let mut n = Network::new();
    let in0 = n.add_input();
    let in1 = n.add_input();
    let g0 = n.add_gate(Primitive::And);
    let g1 = n.add_gate(Primitive::Or);
    n.connect(in0, g0);
    n.connect(in1, g1);
    n.connect(g0, g1);
    n.connect(g1, g0);
    n.add_output(g1);
    n
}

/// A ring of six alternating AND/OR gates over three inputs, each gate
/// reading one input and its predecessor in the ring. All six gates are
/// outputs.
///
/// Every binary input vector settles even though the graph is cyclic; see
/// `RING_NETWORK_TABLE`.
pub fn ring_network() -> Network {
    let mut n = Network::new();
    let inputs = [n.add_input(), n.add_input(), n.add_input()];
    let ring: Vec<_> = (0..6)
        .map(|i| {
            n.add_gate(if i % 2 == 0 {
                Primitive::And
            } else {
                Primitive::Or
            })
        })
        .collect();
    for i in 0..6 {
        let predecessor = ring[(i + 5) % 6];
        n.connect(inputs[i % 3], ring[i]);
        n.connect(predecessor, ring[i]);
    }
    for gate in ring.iter() {
        n.add_output(*gate);
    }
    n
}

/// Expected outputs of `ring_network`, one row per binary input vector in
/// MSB-first order (row `r` has `in0` as bit 2 of `r`).
pub const RING_NETWORK_TABLE: [[bool; 6]; 8] = {
    const O: bool = false;
    const I: bool = true;
    [
        [O, O, O, O, O, O],
        [O, O, O, O, O, I],
        [O, I, O, O, O, O],
        [O, I, I, I, I, I],
        [O, O, O, I, O, O],
        [I, I, I, I, O, I],
        [I, I, O, I, I, I],
        [I, I, I, I, I, I],
    ]
};

/// Ten-NAND realization of `(in0 ^ in1) & (in2 ^ in3)`; acyclic.
pub fn goal1_nand_network() -> Network {
    let mut n = Network::new();
    let i: Vec<_> = (0..4).map(|_| n.add_input()).collect();
    let g: Vec<_> = (0..10).map(|_| n.add_gate(Primitive::Nand)).collect();
    let wiring = [
        (i[0], i[1]),
        (i[2], i[3]),
        (i[2], g[0]),
        (i[0], g[1]),
        (i[1], g[1]),
        (i[3], g[0]),
        (g[2], g[5]),
        (g[3], g[4]),
        (g[6], g[7]),
        (g[8], g[8]),
    ];
    for (target, (lhs, rhs)) in g.iter().zip(wiring.iter()) {
        n.connect(*lhs, *target);
        n.connect(*rhs, *target);
    }
    n.add_output(g[9]);
    n
}
