// src/graph/node.rs

//! A single cell of the CGP grid.

use std::fmt;

use crate::core::{ComplexMatrix, EdgePointer, NodeId, ZxError};
use crate::operations::{SpiderKind, calculate_operator};

/// A ZX node with fixed input and output arity.
///
/// `inputs[s]` points at the `(layer, index, output slot)` feeding input slot
/// `s`; `outputs[k]` points at the `(layer, index, input slot)` fed by output
/// slot `k`. The graph keeps both ends of every edge in agreement.
#[derive(Debug, Clone, PartialEq)]
pub struct ZxNode {
    id: NodeId,
    kind: SpiderKind,
    phase: f64,
    controlled: bool,
    inputs: Vec<Option<EdgePointer>>,
    outputs: Vec<Option<EdgePointer>>,
    active: bool,
}

impl ZxNode {
    /// An unconnected, inactive green node with phase 0.
    pub fn new(id: NodeId, arity_in: usize, arity_out: usize) -> Self {
        Self {
            id,
            kind: SpiderKind::Green,
            phase: 0.0,
            controlled: false,
            inputs: vec![None; arity_in],
            outputs: vec![None; arity_out],
            active: false,
        }
    }

    pub fn id(&self) -> NodeId {
        self.id
    }

    pub fn kind(&self) -> SpiderKind {
        self.kind
    }

    /// Phase in radians.
    pub fn phase(&self) -> f64 {
        self.phase
    }

    pub fn is_controlled(&self) -> bool {
        self.controlled
    }

    /// Whether the node lies on a path to an output, as of the last activity pass.
    pub fn is_active(&self) -> bool {
        self.active
    }

    pub fn arity_in(&self) -> usize {
        self.inputs.len()
    }

    pub fn arity_out(&self) -> usize {
        self.outputs.len()
    }

    pub fn inputs(&self) -> &[Option<EdgePointer>] {
        &self.inputs
    }

    pub fn outputs(&self) -> &[Option<EdgePointer>] {
        &self.outputs
    }

    /// Source of input slot `slot`, if connected.
    pub fn input(&self, slot: usize) -> Option<EdgePointer> {
        self.inputs.get(slot).copied().flatten()
    }

    /// Target of output slot `slot`, if connected.
    pub fn output(&self, slot: usize) -> Option<EdgePointer> {
        self.outputs.get(slot).copied().flatten()
    }

    /// Number of input slots holding an edge.
    pub fn count_connected_inputs(&self) -> usize {
        self.inputs.iter().filter(|p| p.is_some()).count()
    }

    /// Matrix of this node when `inputs` and `outputs` of its legs are live.
    pub fn operator(&self, inputs: usize, outputs: usize) -> Result<ComplexMatrix, ZxError> {
        calculate_operator(self.kind, self.phase, self.controlled, inputs, outputs)
    }

    pub(crate) fn set_input(&mut self, slot: usize, pointer: Option<EdgePointer>) {
        self.inputs[slot] = pointer;
    }

    pub(crate) fn set_output(&mut self, slot: usize, pointer: Option<EdgePointer>) {
        self.outputs[slot] = pointer;
    }

    pub(crate) fn set_active(&mut self, active: bool) {
        self.active = active;
    }

    pub(crate) fn set_kind(&mut self, kind: SpiderKind) {
        self.kind = kind;
    }

    pub(crate) fn set_phase(&mut self, phase: f64) {
        self.phase = phase;
    }

    pub(crate) fn set_controlled(&mut self, controlled: bool) {
        self.controlled = controlled;
    }
}

fn write_pointers(f: &mut fmt::Formatter<'_>, pointers: &[Option<EdgePointer>]) -> fmt::Result {
    for p in pointers {
        match p {
            Some(p) => write!(f, "({}),", p)?,
            None => write!(f, "None, ")?,
        }
    }
    Ok(())
}

impl fmt::Display for ZxNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {} {:.4}", self.id, self.kind, self.phase)?;
        if self.controlled {
            write!(f, " controlled")?;
        }
        if self.active {
            write!(f, " active")?;
        }
        write!(f, "\nInputs: ")?;
        write_pointers(f, &self.inputs)?;
        write!(f, "\nOutputs: ")?;
        write_pointers(f, &self.outputs)
    }
}
