// SPDX-License-Identifier: Apache-2.0

//! Three-valued logic used to approximate the settled state of a network
//! that may contain feedback.
//!
//! `Ternary::X` stands for a line whose value cannot (yet) be proven to be a
//! fixed 0 or 1. Binary gate functions are lifted to this domain with the
//! monotone (Kleene) extension: a result is known only when every binary
//! completion of the unknown inputs agrees on it.

use std::fmt;

use crate::gate::{Primitive, MAX_FAN_IN};

#[derive(Debug, Clone, Copy, Hash, Eq, PartialEq)]
pub enum Ternary {
    Zero,
    One,
    X,
}

impl Ternary {
    pub fn from_bool(value: bool) -> Self {
        if value {
            Ternary::One
        } else {
            Ternary::Zero
        }
    }

    /// Returns the concrete bit if this value is known.
    pub fn to_bool(self) -> Option<bool> {
        match self {
            Ternary::Zero => Some(false),
            Ternary::One => Some(true),
            Ternary::X => None,
        }
    }

    pub fn is_known(self) -> bool {
        self != Ternary::X
    }

    /// Digit used for base-3 cache keys: 0, 1, or 2 for indeterminate.
    pub fn digit(self) -> usize {
        match self {
            Ternary::Zero => 0,
            Ternary::One => 1,
            Ternary::X => 2,
        }
    }

    pub fn from_digit(digit: usize) -> Self {
        match digit {
            0 => Ternary::Zero,
            1 => Ternary::One,
            2 => Ternary::X,
            _ => panic!("ternary digit out of range: {}", digit),
        }
    }

    /// True if `bit` is a binary completion of this value.
    pub fn is_consistent_with(self, bit: bool) -> bool {
        match self.to_bool() {
            None => true,
            Some(b) => b == bit,
        }
    }
}

impl From<bool> for Ternary {
    fn from(value: bool) -> Self {
        Ternary::from_bool(value)
    }
}

impl fmt::Display for Ternary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Ternary::Zero => write!(f, "0"),
            Ternary::One => write!(f, "1"),
            Ternary::X => write!(f, "X"),
        }
    }
}

/// Component-wise consistency check between a ternary vector and a binary
/// vector of the same length.
pub fn is_subset(ternary: &[Ternary], bits: &[bool]) -> bool {
    assert_eq!(
        ternary.len(),
        bits.len(),
        "is_subset: length mismatch {} vs {}",
        ternary.len(),
        bits.len()
    );
    ternary
        .iter()
        .zip(bits.iter())
        .all(|(t, b)| t.is_consistent_with(*b))
}

/// Joins two partial values: agreeing or half-known pairs resolve, a
/// conflict or two unknowns stay indeterminate.
pub fn partial_join(lhs: Ternary, rhs: Ternary) -> Ternary {
    match (lhs, rhs) {
        (a, b) if a == b => a,
        (a, Ternary::X) => a,
        (Ternary::X, b) => b,
        _ => Ternary::X,
    }
}

pub fn partial_join_vec(lhs: &[Ternary], rhs: &[Ternary]) -> Vec<Ternary> {
    assert_eq!(lhs.len(), rhs.len());
    lhs.iter()
        .zip(rhs.iter())
        .map(|(a, b)| partial_join(*a, *b))
        .collect()
}

/// Monotone extension of `primitive`'s binary function to `inputs`.
///
/// Enumerates all `2^fan_in` binary vectors, keeps the ones consistent with
/// `inputs` and checks whether they agree on the output.
pub fn kleene_extend(primitive: Primitive, inputs: &[Ternary]) -> Ternary {
    let fan_in = primitive.fan_in();
    assert_eq!(
        inputs.len(),
        fan_in,
        "kleene_extend: {:?} expects {} inputs, got {}",
        primitive,
        fan_in,
        inputs.len()
    );
    let mut can_be_zero = false;
    let mut can_be_one = false;
    let mut bits = [false; MAX_FAN_IN];
    for assignment in 0..(1usize << fan_in) {
        for (j, bit) in bits.iter_mut().enumerate().take(fan_in) {
            *bit = (assignment >> j) & 1 == 1;
        }
        if !is_subset(inputs, &bits[..fan_in]) {
            continue;
        }
        if primitive.eval_binary(&bits[..fan_in]) {
            can_be_one = true;
        } else {
            can_be_zero = true;
        }
    }
    match (can_be_zero, can_be_one) {
        (true, false) => Ternary::Zero,
        (false, true) => Ternary::One,
        _ => Ternary::X,
    }
}

fn enumerate_tuples(fan_in: usize, radix: usize) -> Vec<Vec<Ternary>> {
    let rows = radix.pow(fan_in as u32);
    let mut tuples = Vec::with_capacity(rows);
    for row in 0..rows {
        let mut tuple = vec![Ternary::Zero; fan_in];
        let mut rest = row;
        // The first input is the most significant digit.
        for j in (0..fan_in).rev() {
            tuple[j] = Ternary::from_digit(rest % radix);
            rest /= radix;
        }
        tuples.push(tuple);
    }
    tuples
}

/// Extended output of `primitive` for every ternary input tuple, rows in
/// base-3 order with the first input as the most significant digit.
pub fn ternary_truth_table(primitive: Primitive) -> Vec<Ternary> {
    enumerate_tuples(primitive.fan_in(), 3)
        .iter()
        .map(|tuple| kleene_extend(primitive, tuple))
        .collect()
}

/// Plain binary truth table, rows in the same digit order as
/// `ternary_truth_table`.
pub fn binary_truth_table(primitive: Primitive) -> Vec<bool> {
    enumerate_tuples(primitive.fan_in(), 2)
        .iter()
        .map(|tuple| {
            let bits: Vec<bool> = tuple.iter().map(|t| *t == Ternary::One).collect();
            primitive.eval_binary(&bits)
        })
        .collect()
}
