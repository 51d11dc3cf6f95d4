// SPDX-License-Identifier: Apache-2.0

use crate::network::Network;
use crate::network_sim::{eval_with_scratch, input_bits_for_row, SimScratch};
use crate::ternary::Ternary;

/// A boolean function over the standard binary domain that a network is
/// scored against.
pub trait Target {
    fn name(&self) -> &str;
    fn input_count(&self) -> usize;
    fn output_count(&self) -> usize;
    /// Fills `outputs` with the expected bits for `inputs`.
    fn expected(&self, inputs: &[bool], outputs: &mut [bool]);
}

/// Single-output target backed by a plain function.
#[derive(Debug, Clone, Copy)]
pub struct ScalarTarget {
    pub name: &'static str,
    pub input_count: usize,
    pub f: fn(&[bool]) -> bool,
}

impl Target for ScalarTarget {
    fn name(&self) -> &str {
        self.name
    }

    fn input_count(&self) -> usize {
        self.input_count
    }

    fn output_count(&self) -> usize {
        1
    }

    fn expected(&self, inputs: &[bool], outputs: &mut [bool]) {
        outputs[0] = (self.f)(inputs);
    }
}

/// Multi-output target backed by a function filling an output vector.
#[derive(Debug, Clone, Copy)]
pub struct VectorTarget {
    pub name: &'static str,
    pub input_count: usize,
    pub output_count: usize,
    pub f: fn(&[bool], &mut [bool]),
}

impl Target for VectorTarget {
    fn name(&self) -> &str {
        self.name
    }

    fn input_count(&self) -> usize {
        self.input_count
    }

    fn output_count(&self) -> usize {
        self.output_count
    }

    fn expected(&self, inputs: &[bool], outputs: &mut [bool]) {
        (self.f)(inputs, outputs)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScoreCounts {
    pub correct: usize,
    pub total: usize,
    /// Input vectors on which the network failed to settle.
    pub nonconverged_rows: usize,
}

impl ScoreCounts {
    pub fn fraction(&self) -> f64 {
        self.correct as f64 / self.total as f64
    }
}

/// Fraction of output components that match `target` across all binary
/// input vectors. A row that does not converge counts every component as
/// wrong.
pub fn score(network: &mut Network, target: &dyn Target) -> f64 {
    let mut scratch = SimScratch::new(network);
    score_counts(network, target, &mut scratch).fraction()
}

pub fn score_counts(
    network: &mut Network,
    target: &dyn Target,
    scratch: &mut SimScratch,
) -> ScoreCounts {
    let input_count = network.inputs.len();
    let output_count = network.outputs.len();
    assert_eq!(
        input_count,
        target.input_count(),
        "network has {} inputs; target {} takes {}",
        input_count,
        target.name(),
        target.input_count()
    );
    assert_eq!(
        output_count,
        target.output_count(),
        "network has {} outputs; target {} produces {}",
        output_count,
        target.name(),
        target.output_count()
    );

    let mut bits = vec![false; input_count];
    let mut values = vec![Ternary::X; input_count];
    let mut want = vec![false; output_count];
    let mut counts = ScoreCounts {
        correct: 0,
        total: 0,
        nonconverged_rows: 0,
    };
    for row in 0..(1usize << input_count) {
        input_bits_for_row(input_count, row, &mut bits);
        for (value, bit) in values.iter_mut().zip(bits.iter()) {
            *value = Ternary::from_bool(*bit);
        }
        let result = eval_with_scratch(network, &values, scratch);
        counts.total += output_count;
        if !result.converged {
            counts.nonconverged_rows += 1;
            continue;
        }
        target.expected(&bits, &mut want);
        counts.correct += result
            .outputs
            .iter()
            .zip(want.iter())
            .filter(|(got, want)| got.to_bool() == Some(**want))
            .count();
    }
    counts
}
