// src/operations/mod.rs

//! Maps ZX-calculus nodes to the matrices they denote.
//!
//! A node's matrix depends on its kind, its phase, whether it is controlled,
//! and on how many of its edges are live once dead code has been removed.
//! The same node can therefore denote different operators as the graph
//! around it changes, which is why these are plain functions of
//! `(kind, phase, controlled, inputs, outputs)` rather than cached values.
//!
//! Matrices are `2^outputs` high and `2^inputs` wide.

use num_complex::Complex64;
use num_traits::One;
use std::fmt;

use crate::core::constants::zx_constants::FRAC_1_SQRT_2;
use crate::core::{ComplexMatrix, ZxError};

/// The function a ZX node performs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SpiderKind {
    /// Z spider: copies in the computational basis and applies `e^(iφ)` to `|1...1>`.
    Green,
    /// X spider: a green spider conjugated by Hadamards on every leg.
    Red,
    /// Hadamard box, with green splitters on either side for multiple legs.
    Hadamard,
}

impl SpiderKind {
    /// Every kind, in a fixed order.
    pub const ALL: [SpiderKind; 3] = [SpiderKind::Green, SpiderKind::Red, SpiderKind::Hadamard];

    /// The two kinds other than `self`, in `ALL` order.
    pub fn others(self) -> [SpiderKind; 2] {
        match self {
            SpiderKind::Green => [SpiderKind::Red, SpiderKind::Hadamard],
            SpiderKind::Red => [SpiderKind::Green, SpiderKind::Hadamard],
            SpiderKind::Hadamard => [SpiderKind::Green, SpiderKind::Red],
        }
    }

    /// Whether the node's phase has any effect on its matrix.
    pub fn uses_phase(self) -> bool {
        !matches!(self, SpiderKind::Hadamard)
    }

    /// One-letter label.
    pub fn symbol(self) -> &'static str {
        match self {
            SpiderKind::Green => "G",
            SpiderKind::Red => "R",
            SpiderKind::Hadamard => "H",
        }
    }
}

impl fmt::Display for SpiderKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.symbol())
    }
}

/// The conventional single-qubit Hadamard gate `[[1, 1], [1, -1]] / √2`.
pub fn hadamard_gate() -> ComplexMatrix {
    let h = Complex64::new(FRAC_1_SQRT_2, 0.0);
    ComplexMatrix::from_rows(vec![vec![h, h], vec![h, -h]])
}

/// A single wire: the 2×2 identity.
pub fn wire() -> ComplexMatrix {
    ComplexMatrix::identity(2)
}

/// Green spider with `inputs` and `outputs` legs.
///
/// The general case is zero everywhere except `|0...0><0...0| = 1` and
/// `|1...1><1...1| = e^(iφ)`. With no inputs the spider is a generator
/// producing `cos φ |0...0> + sin φ |1...1>`; with no outputs it is a
/// destructor, the transpose of that vector. Both have a square sum of one,
/// so neither can increase the trace.
pub fn green(inputs: usize, outputs: usize, phase: f64) -> Result<ComplexMatrix, ZxError> {
    let in_dim = 1usize << inputs;
    let out_dim = 1usize << outputs;

    if inputs == 0 && outputs == 0 {
        return Err(ZxError::InvalidOperator {
            message: "a green spider needs at least one input or output".to_string(),
        });
    }

    let mut m = ComplexMatrix::zeros(out_dim, in_dim);
    if inputs == 0 {
        m.set(0, 0, Complex64::new(phase.cos(), 0.0));
        m.set(out_dim - 1, 0, Complex64::new(phase.sin(), 0.0));
    } else if outputs == 0 {
        m.set(0, 0, Complex64::new(phase.cos(), 0.0));
        m.set(0, in_dim - 1, Complex64::new(phase.sin(), 0.0));
    } else {
        m.set(0, 0, Complex64::one());
        m.set(out_dim - 1, in_dim - 1, Complex64::from_polar(1.0, phase));
    }
    Ok(m)
}

/// Red spider: Hadamards on every output, a green spider, Hadamards on every input.
pub fn red(inputs: usize, outputs: usize, phase: f64) -> Result<ComplexMatrix, ZxError> {
    let h = hadamard_gate();
    let in_layer = ComplexMatrix::tensor_all(std::iter::repeat_n(&h, inputs));
    let out_layer = ComplexMatrix::tensor_all(std::iter::repeat_n(&h, outputs));
    let spider = green(inputs, outputs, phase)?;
    Ok(out_layer.multiply(&spider).multiply(&in_layer))
}

/// Hadamard node: `green(1, outputs, 0) · H · green(inputs, 1, 0)`.
///
/// With one input and one output both splitters are wires and this is the
/// plain Hadamard gate.
pub fn hadamard(inputs: usize, outputs: usize) -> Result<ComplexMatrix, ZxError> {
    let merge = green(inputs, 1, 0.0)?;
    let split = green(1, outputs, 0.0)?;
    Ok(split.multiply(&hadamard_gate()).multiply(&merge))
}

/// Places a 2×2 `target` in the bottom-right block of an identity over
/// `control_bits + 1` qubits: `target` acts on the last qubit when every
/// control qubit is `|1>`.
///
/// # Panics
/// Panics if `target` is not 2×2.
pub fn controlled(control_bits: usize, target: &ComplexMatrix) -> ComplexMatrix {
    assert!(target.width() == 2 && target.height() == 2, "controlled target must be a single-qubit operator");
    let size = 1usize << (control_bits + 1);
    let mut m = ComplexMatrix::identity(size);
    for row in 0..2 {
        for col in 0..2 {
            m.set(size - 2 + row, size - 2 + col, target.get(row, col));
        }
    }
    m
}

/// Matrix of a node of `kind` with `inputs` live inputs and `outputs` live outputs.
///
/// The controlled flag only matters for square nodes on more than one qubit:
/// those become the kind's single-qubit operator controlled by the other
/// `inputs - 1` lines.
pub fn calculate_operator(
    kind: SpiderKind,
    phase: f64,
    controlled_flag: bool,
    inputs: usize,
    outputs: usize,
) -> Result<ComplexMatrix, ZxError> {
    if controlled_flag && inputs == outputs && inputs > 1 {
        let single = calculate_operator(kind, phase, false, 1, 1)?;
        return Ok(controlled(inputs - 1, &single));
    }
    match kind {
        SpiderKind::Green => green(inputs, outputs, phase),
        SpiderKind::Red => red(inputs, outputs, phase),
        SpiderKind::Hadamard => hadamard(inputs, outputs),
    }
}
