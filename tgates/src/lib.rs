// SPDX-License-Identifier: Apache-2.0

pub mod decode;
pub mod fitness;
pub mod gate;
pub mod network;
pub mod network_sim;
pub mod targets;
pub mod ternary;
pub mod test_utils;
pub mod topo;
