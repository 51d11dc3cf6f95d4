// SPDX-License-Identifier: Apache-2.0

use crate::gate::{Gate, GateRef, Primitive, MAX_FAN_IN};
use crate::ternary::Ternary;

/// A directed, possibly cyclic graph of gates.
///
/// All gates (network inputs included) live in one arena and refer to each
/// other by `GateRef`. `inputs` and `gates` list the input gates and the
/// internal gates in declared order; `outputs` holds one entry per output
/// slot and may repeat a gate.
#[derive(Debug, Clone, Default)]
pub struct Network {
    nodes: Vec<Gate>,
    pub inputs: Vec<GateRef>,
    pub gates: Vec<GateRef>,
    pub outputs: Vec<GateRef>,
}

impl Network {
    pub fn new() -> Self {
        Self::default()
    }

    /// Allocates `input_count` input gates followed by `gate_count` internal
    /// gates of `primitive`, all unwired.
    pub fn with_pools(input_count: usize, gate_count: usize, primitive: Primitive) -> Self {
        let mut network = Network::new();
        for _ in 0..input_count {
            network.add_input();
        }
        for _ in 0..gate_count {
            network.add_gate(primitive);
        }
        network
    }

    pub fn add_input(&mut self) -> GateRef {
        let gate_ref = self.push_node(Gate::new(Primitive::Input));
        self.inputs.push(gate_ref);
        gate_ref
    }

    pub fn add_gate(&mut self, primitive: Primitive) -> GateRef {
        assert!(
            primitive != Primitive::Input,
            "internal gates cannot use the input primitive; use add_input"
        );
        let gate_ref = self.push_node(Gate::new(primitive));
        self.gates.push(gate_ref);
        gate_ref
    }

    pub fn add_output(&mut self, gate_ref: GateRef) {
        self.validate_ref(gate_ref);
        self.outputs.push(gate_ref);
    }

    fn push_node(&mut self, gate: Gate) -> GateRef {
        let gate_ref = GateRef {
            id: self.nodes.len(),
        };
        self.nodes.push(gate);
        gate_ref
    }

    pub fn get(&self, gate_ref: GateRef) -> &Gate {
        &self.nodes[gate_ref.id]
    }

    pub fn get_mut(&mut self, gate_ref: GateRef) -> &mut Gate {
        &mut self.nodes[gate_ref.id]
    }

    /// Number of gates in the arena, inputs included.
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn value(&self, gate_ref: GateRef) -> Ternary {
        self.get(gate_ref).value()
    }

    /// Wires `source` into the next operand slot of `target`.
    pub fn connect(&mut self, source: GateRef, target: GateRef) {
        self.validate_ref(source);
        self.validate_ref(target);
        self.nodes[target.id].add_input(source);
        self.nodes[source.id].add_output(target);
    }

    /// Clears all wiring, values and output slots; memoization caches are
    /// retained.
    pub fn reset_wiring(&mut self) {
        for gate in self.nodes.iter_mut() {
            gate.reset();
        }
        self.outputs.clear();
    }

    /// Sets every gate value, inputs included, back to `X`.
    pub fn reset_values(&mut self) {
        for gate in self.nodes.iter_mut() {
            gate.set_value(Ternary::X);
        }
    }

    /// Evaluates one internal gate from the current values of its inputs.
    pub fn evaluate_gate(&mut self, gate_ref: GateRef) -> Ternary {
        let gate = &self.nodes[gate_ref.id];
        assert!(
            gate.is_fully_wired(),
            "gate %{} ({}) has {} wired inputs; fan-in is {}",
            gate_ref.id,
            gate.primitive().name(),
            gate.inputs().len(),
            gate.fan_in()
        );
        let fan_in = gate.fan_in();
        let mut values = [Ternary::X; MAX_FAN_IN];
        for (slot, input) in values.iter_mut().zip(gate.inputs()) {
            *slot = self.nodes[input.id].value();
        }
        self.nodes[gate_ref.id].evaluate(&values[..fan_in])
    }

    /// Panics unless every internal gate carries exactly `fan_in` inputs and
    /// every output slot refers to a gate in the arena.
    pub fn check_wiring(&self) {
        for gate_ref in self.gates.iter() {
            let gate = self.get(*gate_ref);
            assert!(
                gate.is_fully_wired(),
                "gate %{} ({}) has {} wired inputs; fan-in is {}",
                gate_ref.id,
                gate.primitive().name(),
                gate.inputs().len(),
                gate.fan_in()
            );
        }
        for output in self.outputs.iter() {
            self.validate_ref(*output);
        }
    }

    pub fn validate_ref(&self, gate_ref: GateRef) {
        assert!(
            gate_ref.id < self.nodes.len(),
            "GateRef out of bounds: {:?} (nodes.len() = {})",
            gate_ref,
            self.nodes.len()
        );
    }

    fn node_str(&self, gate_ref: GateRef) -> String {
        match self.inputs.iter().position(|r| *r == gate_ref) {
            Some(i) => format!("in[{}]", i),
            None => format!("%{}", gate_ref.id),
        }
    }

    /// Textual listing: one line per internal gate, then one line per output
    /// slot.
    pub fn to_string(&self) -> String {
        let mut s = String::new();
        s.push_str(&format!(
            "network(inputs={}, gates={}, outputs={}) {{\n",
            self.inputs.len(),
            self.gates.len(),
            self.outputs.len()
        ));
        for gate_ref in self.gates.iter() {
            let gate = self.get(*gate_ref);
            let operands = gate
                .inputs()
                .iter()
                .map(|r| self.node_str(*r))
                .collect::<Vec<String>>()
                .join(", ");
            s.push_str(&format!(
                "  %{} = {}({})\n",
                gate_ref.id,
                gate.primitive().name(),
                operands
            ));
        }
        for (i, output) in self.outputs.iter().enumerate() {
            s.push_str(&format!("  out[{}] = {}\n", i, self.node_str(*output)));
        }
        s.push('}');
        s
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn and_of_two_inputs() -> (Network, GateRef) {
        let mut n = Network::new();
        let a = n.add_input();
        let b = n.add_input();
        let g = n.add_gate(Primitive::And);
        n.connect(a, g);
        n.connect(b, g);
        n.add_output(g);
        (n, g)
    }

    #[test]
    fn test_connect_records_back_references_once() {
        let mut n = Network::new();
        let a = n.add_input();
        let g = n.add_gate(Primitive::Nand);
        n.connect(a, g);
        n.connect(a, g);
        assert_eq!(n.get(g).inputs(), &[a, a]);
        assert_eq!(n.get(a).outputs(), &[g]);
    }

    #[test]
    fn test_self_loop_is_allowed() {
        let mut n = Network::new();
        let a = n.add_input();
        let g = n.add_gate(Primitive::Or);
        n.connect(a, g);
        n.connect(g, g);
        n.check_wiring();
        assert_eq!(n.get(g).outputs(), &[g]);
    }

    #[test]
    fn test_evaluate_gate_reads_input_values() {
        let (mut n, g) = and_of_two_inputs();
        let inputs = n.inputs.clone();
        n.get_mut(inputs[0]).set_value(Ternary::One);
        n.get_mut(inputs[1]).set_value(Ternary::X);
        assert_eq!(n.evaluate_gate(g), Ternary::X);
        n.get_mut(inputs[1]).set_value(Ternary::One);
        assert_eq!(n.evaluate_gate(g), Ternary::One);
        assert_eq!(n.value(g), Ternary::One);
    }

    #[test]
    fn test_reset_wiring_keeps_pools() {
        let (mut n, g) = and_of_two_inputs();
        n.reset_wiring();
        assert_eq!(n.inputs.len(), 2);
        assert_eq!(n.gates, vec![g]);
        assert!(n.outputs.is_empty());
        assert!(n.get(g).inputs().is_empty());
    }

    #[test]
    #[should_panic(expected = "has 1 wired inputs")]
    fn test_check_wiring_rejects_partial_gate() {
        let mut n = Network::new();
        let a = n.add_input();
        let g = n.add_gate(Primitive::Xor);
        n.connect(a, g);
        n.check_wiring();
    }

    #[test]
    fn test_to_string() {
        let (n, _) = and_of_two_inputs();
        assert_eq!(
            n.to_string(),
            "network(inputs=2, gates=1, outputs=1) {\n  %2 = and(in[0], in[1])\n  out[0] = %2\n}"
        );
    }
}
