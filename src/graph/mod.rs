// src/graph/mod.rs

//! The Cartesian Genetic Programming grid of ZX nodes.
//!
//! A `CircuitGraph` is a jagged arena of `ZxNode`s addressed by `NodeId`.
//! Layer 0 holds the circuit inputs, layers `1..=n` the hidden nodes and
//! layer `n + 1` the outputs. Edges only run from a lower layer to a higher
//! one and are stored on both of their ends.
//!
//! The grid is evolved through the mutation operators in [`mutation`],
//! pruned to its live part by [`activity`] and turned into a
//! [`LayeredCircuit`](crate::circuits::LayeredCircuit) by [`compile`].

pub mod activity;
pub mod compile;
pub mod mutation;
pub mod node;

pub use compile::connection_matrix;
pub use mutation::{ComplexityPolicy, EdgeRewire, MutationConfig, MutationCounts, MutationKind, MutationWeights};
pub use node::ZxNode;

use rand::Rng;
use std::fmt;

use crate::core::{EdgePointer, NodeId, ZxError};
use crate::operations::SpiderKind;

/// The seven construction parameters of a grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct GraphShape {
    /// Number of circuit inputs (qubits consumed).
    pub inputs: usize,
    /// Number of hidden layers.
    pub layers: usize,
    /// Nodes per hidden layer.
    pub width: usize,
    /// Number of circuit outputs (qubits produced).
    pub outputs: usize,
    /// Input slots per hidden node.
    pub arity_in: usize,
    /// Output slots per input and hidden node.
    pub arity_out: usize,
    /// Largest number of live edges allowed across any layer boundary.
    pub complexity_bound: usize,
}

impl GraphShape {
    pub fn new(
        inputs: usize,
        layers: usize,
        width: usize,
        outputs: usize,
        arity_in: usize,
        arity_out: usize,
        complexity_bound: usize,
    ) -> Self {
        Self { inputs, layers, width, outputs, arity_in, arity_out, complexity_bound }
    }

    /// Checks that a grid of this shape can be built and mutated.
    pub fn validate(&self) -> Result<(), ZxError> {
        let fail = |message: &str| Err(ZxError::InvalidConfiguration { message: message.to_string() });
        if self.inputs == 0 {
            return fail("a graph needs at least one input");
        }
        if self.outputs == 0 {
            return fail("a graph needs at least one output");
        }
        if self.arity_out == 0 {
            return fail("output arity must be at least one");
        }
        if self.complexity_bound == 0 {
            return fail("complexity bound must be at least one");
        }
        if self.layers > 0 && self.width == 0 {
            return fail("hidden layers must hold at least one node");
        }
        if self.layers > 0 && self.arity_in == 0 {
            return fail("hidden nodes need at least one input slot");
        }
        Ok(())
    }
}

impl Default for GraphShape {
    fn default() -> Self {
        Self::new(2, 3, 3, 2, 2, 4, 4)
    }
}

/// A layered DAG of ZX nodes evolved by mutation.
#[derive(Debug, Clone, PartialEq)]
pub struct CircuitGraph {
    shape: GraphShape,
    grid: Vec<Vec<ZxNode>>,
    /// Set when a mutation may have altered the live part of the graph.
    changed: bool,
}

impl CircuitGraph {
    /// Builds an unconnected grid. Output nodes start active.
    pub fn new(shape: GraphShape) -> Result<Self, ZxError> {
        shape.validate()?;

        let mut grid = Vec::with_capacity(shape.layers + 2);
        grid.push((0..shape.inputs).map(|i| ZxNode::new(NodeId::new(0, i), 0, shape.arity_out)).collect());
        for l in 1..=shape.layers {
            grid.push(
                (0..shape.width)
                    .map(|i| ZxNode::new(NodeId::new(l, i), shape.arity_in, shape.arity_out))
                    .collect(),
            );
        }
        let last = shape.layers + 1;
        grid.push(
            (0..shape.outputs)
                .map(|i| {
                    let mut node = ZxNode::new(NodeId::new(last, i), 1, 0);
                    node.set_active(true);
                    node
                })
                .collect(),
        );

        Ok(Self { shape, grid, changed: false })
    }

    /// A fresh grid with `mutations` weighted mutations applied.
    pub fn random<R: Rng + ?Sized>(
        shape: GraphShape,
        mutations: usize,
        config: &MutationConfig,
        weights: &MutationWeights,
        rng: &mut R,
    ) -> Result<Self, ZxError> {
        let mut graph = Self::new(shape)?;
        graph.mutate_weighted(mutations, config, weights, rng)?;
        graph.clear_changed();
        Ok(graph)
    }

    /// An independent deep copy with fresh activity flags and a clear dirty flag.
    pub fn copy(&self) -> Self {
        let mut copy = self.clone();
        copy.active_pass();
        copy.changed = false;
        copy
    }

    pub fn shape(&self) -> &GraphShape {
        &self.shape
    }

    /// Index of the output layer, `layers + 1`.
    pub fn output_layer(&self) -> usize {
        self.shape.layers + 1
    }

    /// Whether a mutation since the last `clear_changed` may have altered the live graph.
    pub fn changed(&self) -> bool {
        self.changed
    }

    pub fn clear_changed(&mut self) {
        self.changed = false;
    }

    /// The node at `id`, if it exists.
    pub fn node(&self, id: NodeId) -> Option<&ZxNode> {
        self.grid.get(id.layer).and_then(|layer| layer.get(id.index))
    }

    /// All nodes of layer `layer`.
    pub fn layer(&self, layer: usize) -> Option<&[ZxNode]> {
        self.grid.get(layer).map(Vec::as_slice)
    }

    /// Every node, layer by layer.
    pub fn nodes(&self) -> impl Iterator<Item = &ZxNode> {
        self.grid.iter().flatten()
    }

    pub(crate) fn at(&self, id: NodeId) -> &ZxNode {
        &self.grid[id.layer][id.index]
    }

    pub(crate) fn at_mut(&mut self, id: NodeId) -> &mut ZxNode {
        &mut self.grid[id.layer][id.index]
    }

    fn node_or_err(&self, id: NodeId) -> Result<&ZxNode, ZxError> {
        self.node(id).ok_or_else(|| ZxError::InvalidConfiguration { message: format!("no node at {}", id) })
    }

    fn hidden_or_output(&self, id: NodeId) -> Result<&ZxNode, ZxError> {
        let node = self.node_or_err(id)?;
        if id.layer == 0 {
            return Err(ZxError::InvalidConfiguration { message: format!("input node {} cannot be edited", id) });
        }
        Ok(node)
    }

    /// Connects output slot `out_slot` of `source` to input slot `in_slot` of `target`.
    ///
    /// Any edge already occupying either slot is removed at both of its ends.
    /// The source must lie in an earlier layer than the target and cannot be
    /// an output node.
    pub fn connect(&mut self, source: NodeId, out_slot: usize, target: NodeId, in_slot: usize) -> Result<(), ZxError> {
        let src = self.node_or_err(source)?;
        if out_slot >= src.arity_out() {
            return Err(ZxError::InvalidConfiguration {
                message: format!("{} has no output slot {}", source, out_slot),
            });
        }
        let dst = self.hidden_or_output(target)?;
        if in_slot >= dst.arity_in() {
            return Err(ZxError::InvalidConfiguration {
                message: format!("{} has no input slot {}", target, in_slot),
            });
        }
        if source.layer >= target.layer {
            return Err(ZxError::InvalidConfiguration {
                message: format!("edge {} -> {} does not run forward", source, target),
            });
        }
        self.rewire(target.slot(in_slot), source.slot(out_slot));
        self.active_pass();
        Ok(())
    }

    /// Removes the edge feeding input slot `in_slot` of `target`.
    ///
    /// Returns whether there was an edge to remove.
    pub fn disconnect(&mut self, target: NodeId, in_slot: usize) -> Result<bool, ZxError> {
        let dst = self.hidden_or_output(target)?;
        if in_slot >= dst.arity_in() {
            return Err(ZxError::InvalidConfiguration {
                message: format!("{} has no input slot {}", target, in_slot),
            });
        }
        let removed = self.unlink_input(target.slot(in_slot));
        self.active_pass();
        Ok(removed)
    }

    pub fn set_kind(&mut self, id: NodeId, kind: SpiderKind) -> Result<(), ZxError> {
        self.hidden_or_output(id)?;
        self.at_mut(id).set_kind(kind);
        Ok(())
    }

    pub fn set_phase(&mut self, id: NodeId, phase: f64) -> Result<(), ZxError> {
        self.hidden_or_output(id)?;
        self.at_mut(id).set_phase(phase);
        Ok(())
    }

    pub fn set_controlled(&mut self, id: NodeId, controlled: bool) -> Result<(), ZxError> {
        self.hidden_or_output(id)?;
        self.at_mut(id).set_controlled(controlled);
        Ok(())
    }

    /// Clears the input slot `target` and the output slot at its other end.
    pub(crate) fn unlink_input(&mut self, target: EdgePointer) -> bool {
        match self.at(target.node()).input(target.slot) {
            Some(source) => {
                self.at_mut(source.node()).set_output(source.slot, None);
                self.at_mut(target.node()).set_input(target.slot, None);
                true
            }
            None => false,
        }
    }

    /// Checks that every edge is recorded identically on both of its ends
    /// and runs forward through the layers.
    pub fn verify_edges(&self) -> Result<(), ZxError> {
        for node in self.nodes() {
            let id = node.id();
            for (slot, input) in node.inputs().iter().enumerate() {
                let Some(source) = input else { continue };
                let back = self.node(source.node()).and_then(|n| n.output(source.slot));
                if back != Some(id.slot(slot)) {
                    return Err(ZxError::EdgeInconsistency {
                        node: id,
                        message: format!("input {} points at {} which does not point back", slot, source),
                    });
                }
                if source.layer >= id.layer {
                    return Err(ZxError::EdgeInconsistency {
                        node: id,
                        message: format!("input {} comes from layer {}", slot, source.layer),
                    });
                }
            }
            for (slot, output) in node.outputs().iter().enumerate() {
                let Some(target) = output else { continue };
                let back = self.node(target.node()).and_then(|n| n.input(target.slot));
                if back != Some(id.slot(slot)) {
                    return Err(ZxError::EdgeInconsistency {
                        node: id,
                        message: format!("output {} points at {} which does not point back", slot, target),
                    });
                }
            }
        }
        Ok(())
    }
}

impl fmt::Display for CircuitGraph {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for node in self.nodes() {
            writeln!(f, "{}", node)?;
        }
        Ok(())
    }
}
