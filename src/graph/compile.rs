// src/graph/compile.rs

//! Turning the live part of a graph into a `LayeredCircuit`.
//!
//! The grid is walked from the inputs to the outputs. Between two layers the
//! circuit carries one qubit line per live edge still waiting for its target,
//! kept in the order the previous layer produced them. Each layer takes the
//! lines its active nodes consume, passes every other line through a wire,
//! and permutes the incoming lines into the order its operators expect.

use log::{debug, trace, warn};
use num_complex::Complex64;
use num_traits::One;

use super::{CircuitGraph, ZxNode};
use crate::circuits::LayeredCircuit;
use crate::core::{ComplexMatrix, EdgePointer, ZxError};
use crate::operations::{SpiderKind, calculate_operator, wire};

/// Permutation taking qubit lines ordered as `incoming` to the order `required`.
///
/// Line `i` of `incoming` moves to the position `j` where
/// `required[j] == incoming[i]`. Line 0 is the most significant bit. Both
/// slices must hold the same pointers without repeats.
pub fn connection_matrix(incoming: &[EdgePointer], required: &[EdgePointer]) -> Result<ComplexMatrix, ZxError> {
    if incoming.len() != required.len() {
        return Err(ZxError::ConnectionMismatch {
            message: format!("{} incoming lines but {} required", incoming.len(), required.len()),
        });
    }

    let lines = incoming.len();
    let mut target = Vec::with_capacity(lines);
    let mut taken = vec![false; lines];
    for pointer in incoming {
        let mut matches = required.iter().enumerate().filter(|(_, r)| *r == pointer).map(|(j, _)| j);
        let j = matches.next().ok_or_else(|| ZxError::ConnectionMismatch {
            message: format!("line {} has no place in the required order", pointer),
        })?;
        if matches.next().is_some() || taken[j] {
            return Err(ZxError::ConnectionMismatch { message: format!("line {} appears more than once", pointer) });
        }
        taken[j] = true;
        target.push(j);
    }

    let dim = 1usize << lines;
    let mut m = ComplexMatrix::zeros(dim, dim);
    for state in 0..dim {
        let mut remapped = 0;
        for (i, &j) in target.iter().enumerate() {
            let bit = (state >> (lines - 1 - i)) & 1;
            remapped |= bit << (lines - 1 - j);
        }
        m.set(remapped, state, Complex64::one());
    }
    Ok(m)
}

impl CircuitGraph {
    /// Live edges leaving `node`, in output slot order.
    fn active_targets(&self, node: &ZxNode) -> Vec<EdgePointer> {
        node.outputs().iter().flatten().filter(|p| self.at(p.node()).is_active()).copied().collect()
    }

    /// Builds and compiles the circuit denoted by the active nodes.
    ///
    /// Refreshes activity first. The result maps `2^inputs` amplitudes to
    /// `2^outputs`. Every input contributes a green spider: a wire for each
    /// live edge leaving it, or a projection onto `|0>` when none does.
    /// Output nodes always produce exactly one line.
    pub fn generate_circuit(&mut self) -> Result<LayeredCircuit, ZxError> {
        self.active_pass();

        let mut circuit = LayeredCircuit::new();
        let mut unresolved: Vec<EdgePointer> = Vec::new();

        circuit.new_layer();
        for node in &self.grid[0] {
            let targets = self.active_targets(node);
            circuit.add_operator(calculate_operator(SpiderKind::Green, 0.0, false, 1, targets.len())?);
            unresolved.extend(targets);
        }
        circuit.close_layer();

        let outputs = self.output_layer();
        for l in 1..=outputs {
            let incoming = std::mem::take(&mut unresolved);
            let mut required = Vec::with_capacity(incoming.len());
            circuit.new_layer();

            for node in self.grid[l].iter().filter(|n| n.is_active()) {
                let mut inputs = 0;
                for slot in 0..node.arity_in() {
                    let line = node.id().slot(slot);
                    if incoming.contains(&line) {
                        required.push(line);
                        inputs += 1;
                    }
                }

                let produced = if l == outputs {
                    1
                } else {
                    let targets = self.active_targets(node);
                    if targets.is_empty() {
                        warn!("active node {} has no active outputs", node.id());
                    }
                    let count = targets.len();
                    unresolved.extend(targets);
                    count
                };

                trace!("layer {}: {} {} with {} in, {} out", l, node.kind(), node.id(), inputs, produced);
                circuit.add_operator(node.operator(inputs, produced)?);
            }

            for line in &incoming {
                if required.contains(line) {
                    continue;
                }
                if line.layer <= l {
                    warn!("edge to {} is still unresolved at layer {}", line, l);
                }
                circuit.add_operator(wire());
                required.push(*line);
                unresolved.push(*line);
            }

            if incoming.is_empty() {
                circuit.close_layer();
            } else {
                circuit.close_layer_with_connection_matrix(&connection_matrix(&incoming, &required)?);
            }
        }

        circuit.compile();
        debug!(
            "generated circuit from {} active nodes: {} layers, {:?} -> {:?} amplitudes",
            self.nodes().filter(|n| n.is_active()).count(),
            circuit.len(),
            circuit.input_dim(),
            circuit.output_dim()
        );
        Ok(circuit)
    }
}
