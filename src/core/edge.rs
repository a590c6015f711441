// src/core/edge.rs

use std::fmt;

/// Position of a node in the circuit grid.
///
/// Layer 0 holds the inputs, the last layer holds the outputs and the layers
/// in between hold the hidden nodes. `index` counts from the top of the layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId {
    /// Layer (x coordinate) of the node.
    pub layer: usize,
    /// Index within the layer (y coordinate).
    pub index: usize,
}

impl NodeId {
    pub fn new(layer: usize, index: usize) -> Self {
        Self { layer, index }
    }

    /// Pointer to one of this node's slots.
    pub fn slot(self, slot: usize) -> EdgePointer {
        EdgePointer { layer: self.layer, index: self.index, slot }
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({},{})", self.layer, self.index)
    }
}

/// One endpoint of a graph edge.
///
/// Stored on both ends of an edge: a node's input slot holds a pointer to
/// the source node and the output slot it occupies there, and the source's
/// output slot holds a pointer back to the target node and its input slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct EdgePointer {
    /// Layer of the node at the other end.
    pub layer: usize,
    /// Index of the node at the other end.
    pub index: usize,
    /// Which input or output slot of that node is used.
    pub slot: usize,
}

impl EdgePointer {
    pub fn new(layer: usize, index: usize, slot: usize) -> Self {
        Self { layer, index, slot }
    }

    /// The node this pointer refers to.
    pub fn node(&self) -> NodeId {
        NodeId { layer: self.layer, index: self.index }
    }
}

impl fmt::Display for EdgePointer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{} - {}", self.layer, self.index, self.slot)
    }
}
