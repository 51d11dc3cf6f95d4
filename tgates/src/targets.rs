// SPDX-License-Identifier: Apache-2.0

//! Fixed target functions the search can be pointed at.

use crate::fitness::{ScalarTarget, Target, VectorTarget};

fn goal1(inputs: &[bool]) -> bool {
    (inputs[0] ^ inputs[1]) & (inputs[2] ^ inputs[3])
}

fn goal2(inputs: &[bool]) -> bool {
    (inputs[0] ^ inputs[1]) | (inputs[2] ^ inputs[3])
}

/// Row index for the 3-input tables: `in[0]` is the least significant bit.
fn table_index(inputs: &[bool]) -> usize {
    inputs
        .iter()
        .take(3)
        .enumerate()
        .map(|(i, bit)| (*bit as usize) << i)
        .sum()
}

const RIVEST_TABLE: [[bool; 6]; 8] = {
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

/// Segment pattern per digit 0..=7.
const DIGITAL_DISPLAY_TABLE: [[bool; 7]; 8] = {
    const O: bool = false;
    const I: bool = true;
    [
        [I, I, I, O, I, I, I],
        [O, O, O, O, O, I, I],
        [O, I, I, I, I, I, O],
        [O, O, I, I, I, I, I],
        [I, O, O, I, O, I, I],
        [I, O, I, I, I, O, I],
        [I, I, O, I, I, O, I],
        [O, O, I, O, O, I, I],
    ]
};

fn rivest(inputs: &[bool], outputs: &mut [bool]) {
    outputs.copy_from_slice(&RIVEST_TABLE[table_index(inputs)]);
}

fn digital_display(inputs: &[bool], outputs: &mut [bool]) {
    outputs.copy_from_slice(&DIGITAL_DISPLAY_TABLE[table_index(inputs)]);
}

/// `(a ^ b) & (c ^ d)`
pub const GOAL1: ScalarTarget = ScalarTarget {
    name: "goal1",
    input_count: 4,
    f: goal1,
};

/// `(a ^ b) | (c ^ d)`
pub const GOAL2: ScalarTarget = ScalarTarget {
    name: "goal2",
    input_count: 4,
    f: goal2,
};

pub const RIVEST: VectorTarget = VectorTarget {
    name: "rivest",
    input_count: 3,
    output_count: 6,
    f: rivest,
};

pub const DIGITAL_DISPLAY: VectorTarget = VectorTarget {
    name: "digital_display",
    input_count: 3,
    output_count: 7,
    f: digital_display,
};

pub fn all_targets() -> Vec<&'static dyn Target> {
    vec![&GOAL1, &GOAL2, &RIVEST, &DIGITAL_DISPLAY]
}

pub fn by_name(name: &str) -> Option<&'static dyn Target> {
    all_targets().into_iter().find(|t| t.name() == name)
}
