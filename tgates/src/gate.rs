// SPDX-License-Identifier: Apache-2.0

use crate::ternary::{kleene_extend, Ternary};

/// Largest fan-in supported by any primitive.
pub const MAX_FAN_IN: usize = 2;

/// Radix of the memoization key: one digit per input, digit 2 is `X`.
const CACHE_BASE: usize = 3;

#[derive(Debug, Clone, Copy, Hash, Eq, PartialEq)]
pub enum Primitive {
    And,
    Or,
    Xor,
    Not,
    Nand,
    /// Identity over the value carried by a network input.
    Input,
}

impl Primitive {
    pub const ALL: [Primitive; 6] = [
        Primitive::And,
        Primitive::Or,
        Primitive::Xor,
        Primitive::Not,
        Primitive::Nand,
        Primitive::Input,
    ];

    pub fn fan_in(self) -> usize {
        match self {
            Primitive::Not | Primitive::Input => 1,
            Primitive::And | Primitive::Or | Primitive::Xor | Primitive::Nand => 2,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Primitive::And => "and",
            Primitive::Or => "or",
            Primitive::Xor => "xor",
            Primitive::Not => "not",
            Primitive::Nand => "nand",
            Primitive::Input => "input",
        }
    }

    pub fn eval_binary(self, bits: &[bool]) -> bool {
        debug_assert_eq!(bits.len(), self.fan_in());
        match self {
            Primitive::And => bits[0] && bits[1],
            Primitive::Or => bits[0] || bits[1],
            Primitive::Xor => bits[0] ^ bits[1],
            Primitive::Not => !bits[0],
            Primitive::Nand => !(bits[0] && bits[1]),
            Primitive::Input => bits[0],
        }
    }
}

/// Stable index of a gate within a `Network` arena.
#[derive(Debug, Clone, Copy, Hash, Eq, PartialEq, Ord, PartialOrd)]
pub struct GateRef {
    pub id: usize,
}

/// One logic element.
///
/// Wiring is stored as arena indices. `cache` memoizes the extended function
/// per ternary input tuple; it depends only on `primitive`, so it survives
/// `reset` and any rewiring of this gate.
#[derive(Debug, Clone)]
pub struct Gate {
    primitive: Primitive,
    inputs: Vec<GateRef>,
    outputs: Vec<GateRef>,
    value: Ternary,
    cache: Vec<Option<Ternary>>,
}

impl Gate {
    pub fn new(primitive: Primitive) -> Self {
        let fan_in = primitive.fan_in();
        Gate {
            primitive,
            inputs: Vec::with_capacity(fan_in),
            outputs: Vec::with_capacity(1),
            value: Ternary::X,
            cache: vec![None; CACHE_BASE.pow(fan_in as u32)],
        }
    }

    pub fn primitive(&self) -> Primitive {
        self.primitive
    }

    pub fn fan_in(&self) -> usize {
        self.primitive.fan_in()
    }

    pub fn inputs(&self) -> &[GateRef] {
        &self.inputs
    }

    pub fn outputs(&self) -> &[GateRef] {
        &self.outputs
    }

    pub fn value(&self) -> Ternary {
        self.value
    }

    pub fn set_value(&mut self, value: Ternary) {
        self.value = value;
    }

    pub fn cache(&self) -> &[Option<Ternary>] {
        &self.cache
    }

    /// Discards wiring and the current value. The cache is kept.
    pub fn reset(&mut self) {
        self.inputs.clear();
        self.outputs.clear();
        self.value = Ternary::X;
    }

    /// Appends a forward edge. Repeated sources are kept: a gate wired twice
    /// to the same source reads it on both operands.
    pub fn add_input(&mut self, source: GateRef) {
        self.inputs.push(source);
    }

    /// Records a reader of this gate; each reader is recorded once.
    pub fn add_output(&mut self, target: GateRef) {
        if !self.outputs.contains(&target) {
            self.outputs.push(target);
        }
    }

    pub fn is_fully_wired(&self) -> bool {
        self.inputs.len() == self.fan_in()
    }

    /// Base-3 key of an input tuple; the first input is the least
    /// significant digit.
    pub fn cache_key(input_values: &[Ternary]) -> usize {
        let mut key = 0;
        let mut multiplier = 1;
        for value in input_values {
            key += value.digit() * multiplier;
            multiplier *= CACHE_BASE;
        }
        key
    }

    /// Computes this gate's value from the values currently on its inputs,
    /// consulting and filling the memoization table.
    pub fn evaluate(&mut self, input_values: &[Ternary]) -> Ternary {
        assert_eq!(
            input_values.len(),
            self.fan_in(),
            "{} gate evaluated with {} input values; fan-in is {}",
            self.primitive.name(),
            input_values.len(),
            self.fan_in()
        );
        let key = Self::cache_key(input_values);
        let result = match self.cache[key] {
            Some(cached) => cached,
            None => {
                let computed = kleene_extend(self.primitive, input_values);
                self.cache[key] = Some(computed);
                computed
            }
        };
        self.value = result;
        result
    }
}
