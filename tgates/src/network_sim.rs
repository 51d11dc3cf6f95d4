// SPDX-License-Identifier: Apache-2.0

//! Fixed-point ternary simulation of a wired `Network`.
//!
//! All gates start at `X`. Each round reevaluates, in declared order, every
//! internal gate that has not yet produced a 0 or 1, using whatever values
//! its inputs currently hold. A gate that produces a known value is settled
//! and never revisited; because the extension is monotone, settled values
//! can never be contradicted later. The network converges once every
//! internal gate is settled. A round that settles nothing while gates are
//! still pending means the remaining gates sit on a feedback loop that no
//! input forces, and the evaluation reports non-convergence.

use bitvec::vec::BitVec;

use crate::network::Network;
use crate::ternary::Ternary;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NetworkSimResult {
    /// One value per output slot. All `X` when `converged` is false.
    pub outputs: Vec<Ternary>,
    pub converged: bool,
    /// Number of rounds performed, including the final unproductive one on
    /// non-convergence.
    pub rounds: usize,
}

/// Caller-owned buffers reused across evaluations of the same network.
#[derive(Debug, Clone, Default)]
pub struct SimScratch {
    pending: BitVec,
}

impl SimScratch {
    pub fn new(network: &Network) -> Self {
        Self {
            pending: BitVec::repeat(false, network.gates.len()),
        }
    }
}

pub fn eval(network: &mut Network, inputs: &[Ternary]) -> NetworkSimResult {
    let mut scratch = SimScratch::new(network);
    eval_with_scratch(network, inputs, &mut scratch)
}

pub fn eval_with_scratch(
    network: &mut Network,
    inputs: &[Ternary],
    scratch: &mut SimScratch,
) -> NetworkSimResult {
    assert_eq!(
        inputs.len(),
        network.inputs.len(),
        "eval: got {} input values for {} network inputs",
        inputs.len(),
        network.inputs.len()
    );
    network.check_wiring();

    network.reset_values();
    for (i, value) in inputs.iter().enumerate() {
        let input_ref = network.inputs[i];
        network.get_mut(input_ref).set_value(*value);
    }

    let gate_count = network.gates.len();
    scratch.pending.clear();
    scratch.pending.resize(gate_count, true);
    let mut pending_count = gate_count;
    let mut rounds = 0;

    while pending_count > 0 {
        rounds += 1;
        let mut settled_this_round = 0;
        for i in 0..gate_count {
            if !scratch.pending[i] {
                continue;
            }
            let gate_ref = network.gates[i];
            if network.evaluate_gate(gate_ref).is_known() {
                scratch.pending.set(i, false);
                settled_this_round += 1;
            }
        }
        pending_count -= settled_this_round;
        log::trace!(
            "eval round {}: settled {} gates, {} pending",
            rounds,
            settled_this_round,
            pending_count
        );
        if settled_this_round == 0 {
            return NetworkSimResult {
                outputs: vec![Ternary::X; network.outputs.len()],
                converged: false,
                rounds,
            };
        }
    }

    let outputs = network
        .outputs
        .iter()
        .map(|output| network.value(*output))
        .collect();
    NetworkSimResult {
        outputs,
        converged: true,
        rounds,
    }
}

/// Binary input vector for row `row` of an exhaustive enumeration; the first
/// network input is the most significant bit.
pub fn input_bits_for_row(input_count: usize, row: usize, bits: &mut [bool]) {
    debug_assert_eq!(bits.len(), input_count);
    for j in 0..input_count {
        bits[input_count - j - 1] = (row >> j) & 1 == 1;
    }
}

/// Evaluates every binary input vector, rows in MSB-first order.
pub fn eval_all(network: &mut Network) -> Vec<NetworkSimResult> {
    let input_count = network.inputs.len();
    let mut scratch = SimScratch::new(network);
    let mut bits = vec![false; input_count];
    let mut values = vec![Ternary::X; input_count];
    let mut results = Vec::with_capacity(1 << input_count);
    for row in 0..(1usize << input_count) {
        input_bits_for_row(input_count, row, &mut bits);
        for (value, bit) in values.iter_mut().zip(bits.iter()) {
            *value = Ternary::from_bool(*bit);
        }
        results.push(eval_with_scratch(network, &values, &mut scratch));
    }
    results
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gate::Primitive;
    use crate::test_utils::{and_network, feedback_pair_network};
    use pretty_assertions::assert_eq;

    #[test]
    fn test_input_bits_msb_first() {
        let mut bits = [false; 3];
        input_bits_for_row(3, 0b100, &mut bits);
        assert_eq!(bits, [true, false, false]);
        input_bits_for_row(3, 0b011, &mut bits);
        assert_eq!(bits, [false, true, true]);
    }

    #[test]
    fn test_and_network_rows() {
        let mut n = and_network();
        let outputs: Vec<Vec<Ternary>> = eval_all(&mut n)
            .into_iter()
            .map(|r| r.outputs)
            .collect();
        assert_eq!(
            outputs,
            vec![
                vec![Ternary::Zero],
                vec![Ternary::Zero],
                vec![Ternary::Zero],
                vec![Ternary::One],
            ]
        );
    }

    #[test]
    fn test_indeterminate_input_propagates() {
        let mut n = and_network();
        let r = eval(&mut n, &[Ternary::Zero, Ternary::X]);
        assert!(r.converged);
        assert_eq!(r.outputs, vec![Ternary::Zero]);

        // AND(1, X) never settles: the single gate stays pending.
        let r = eval(&mut n, &[Ternary::One, Ternary::X]);
        assert!(!r.converged);
        assert_eq!(r.outputs, vec![Ternary::X]);
    }

    #[test]
    fn test_feedback_pair_needs_second_round() {
        // in = (1, 1): the OR settles first, the AND only once it can read
        // the OR's value in round two.
        let mut n = feedback_pair_network();
        let r = eval(&mut n, &[Ternary::One, Ternary::One]);
        assert!(r.converged);
        assert_eq!(r.outputs, vec![Ternary::One]);
        assert_eq!(r.rounds, 2);
    }

    #[test]
    fn test_self_loop_without_forcing_input_does_not_converge() {
        let mut n = Network::new();
        let a = n.add_input();
        let g = n.add_gate(Primitive::Or);
        n.connect(a, g);
        n.connect(g, g);
        n.add_output(g);
        assert!(!eval(&mut n, &[Ternary::Zero]).converged);
        let r = eval(&mut n, &[Ternary::One]);
        assert!(r.converged);
        assert_eq!(r.outputs, vec![Ternary::One]);
    }

    #[test]
    fn test_outputs_may_alias_inputs_and_each_other() {
        let mut n = Network::new();
        let a = n.add_input();
        let g = n.add_gate(Primitive::Not);
        n.connect(a, g);
        n.add_output(g);
        n.add_output(a);
        n.add_output(g);
        let r = eval(&mut n, &[Ternary::One]);
        assert!(r.converged);
        assert_eq!(r.outputs, vec![Ternary::Zero, Ternary::One, Ternary::Zero]);
    }

    #[test]
    fn test_network_without_internal_gates_converges() {
        let mut n = Network::new();
        let a = n.add_input();
        n.add_output(a);
        let r = eval(&mut n, &[Ternary::One]);
        assert!(r.converged);
        assert_eq!(r.rounds, 0);
        assert_eq!(r.outputs, vec![Ternary::One]);
    }

    #[test]
    #[should_panic(expected = "wired inputs")]
    fn test_unwired_gate_fails_fast() {
        let mut n = Network::new();
        n.add_input();
        let g = n.add_gate(Primitive::Nand);
        n.add_output(g);
        eval(&mut n, &[Ternary::One]);
    }
}
