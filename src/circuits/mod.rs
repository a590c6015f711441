// src/circuits/mod.rs

//! Layered quantum circuits.
//!
//! A `LayeredCircuit` is an ordered list of layers. Operator layers hold a
//! single matrix, the tensor product of every operator added while the layer
//! was open. Measurement layers list qubits to collapse, in order.
//!
//! Compiling multiplies each run of consecutive operator layers into one
//! matrix and keeps measurement layers where they are. The fused form is
//! stored alongside the source layers and used by `apply` from then on.

use log::{debug, trace};
use rand::Rng;
use std::fmt;

use crate::core::{ComplexMatrix, QuantumState, ZxError};

/// One step of a `LayeredCircuit`.
#[derive(Debug, Clone, PartialEq)]
pub enum Layer {
    /// A linear operator applied to the whole state.
    Operator(ComplexMatrix),
    /// Qubits to measure in the computational basis, one after another.
    Measurement(Vec<usize>),
}

impl Layer {
    /// True for `Layer::Measurement`.
    pub fn is_measurement(&self) -> bool {
        matches!(self, Layer::Measurement(_))
    }
}

/// An ordered sequence of operator and measurement layers.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct LayeredCircuit {
    layers: Vec<Layer>,
    /// Operators of the layer under construction, tensored together on close.
    open_layer: Option<Vec<ComplexMatrix>>,
    compiled: Option<Box<LayeredCircuit>>,
    /// Set on the fused circuit produced by `compile`.
    is_compiled_form: bool,
}

impl LayeredCircuit {
    /// Creates an empty circuit with no open layer.
    pub fn new() -> Self {
        Self::default()
    }

    /// Drops every layer and any compiled form.
    pub fn clear(&mut self) {
        *self = Self::default();
    }

    /// Opens a new operator layer, closing the current one first if it is open.
    pub fn new_layer(&mut self) {
        if self.open_layer.is_some() {
            self.close_layer();
        }
        self.open_layer = Some(Vec::new());
    }

    /// Adds `operator` to the open layer, opening one if needed.
    ///
    /// Operators are tensored in the order they are added, so the first one
    /// acts on the most significant qubits.
    pub fn add_operator(&mut self, operator: ComplexMatrix) {
        self.compiled = None;
        self.open_layer.get_or_insert_with(Vec::new).push(operator);
    }

    /// Tensors the open layer's operators together and appends the result.
    ///
    /// Closing with no open layer appends the 1×1 identity.
    pub fn close_layer(&mut self) {
        let operators = self.open_layer.take().unwrap_or_default();
        let matrix = ComplexMatrix::tensor_all(&operators);
        self.push(Layer::Operator(matrix));
    }

    /// Closes the open layer like `close_layer`, then right-multiplies it by
    /// `connection` so the permutation reorders the incoming lines before the
    /// layer's operators act.
    ///
    /// # Panics
    /// Panics if the closed layer's width differs from `connection`'s height.
    pub fn close_layer_with_connection_matrix(&mut self, connection: &ComplexMatrix) {
        let operators = self.open_layer.take().unwrap_or_default();
        let matrix = ComplexMatrix::tensor_all(&operators).multiply(connection);
        self.push(Layer::Operator(matrix));
    }

    /// Appends a measurement of `qubits`. An open operator layer is closed first.
    pub fn add_measurement_layer(&mut self, qubits: Vec<usize>) {
        if self.open_layer.is_some() {
            self.close_layer();
        }
        self.push(Layer::Measurement(qubits));
    }

    fn push(&mut self, layer: Layer) {
        self.compiled = None;
        self.layers.push(layer);
    }

    /// Fuses each maximal run of operator layers into one matrix.
    ///
    /// An open layer is closed first. Within a run the later layer multiplies
    /// from the left, so the fused matrix applies the layers in order.
    pub fn compile(&mut self) {
        if self.open_layer.is_some() {
            self.close_layer();
        }

        let mut fused = LayeredCircuit { is_compiled_form: true, ..Self::default() };
        let mut run: Option<ComplexMatrix> = None;

        for (i, layer) in self.layers.iter().enumerate() {
            match layer {
                Layer::Measurement(qubits) => {
                    if let Some(m) = run.take() {
                        fused.layers.push(Layer::Operator(m));
                    }
                    trace!("compile: layer {} measures {:?}", i, qubits);
                    fused.layers.push(Layer::Measurement(qubits.clone()));
                }
                Layer::Operator(op) => {
                    trace!("compile: layer {} is a {}x{} operator", i, op.height(), op.width());
                    run = Some(match run {
                        None => op.clone(),
                        Some(earlier) => op.multiply(&earlier),
                    });
                }
            }
        }
        if let Some(m) = run {
            fused.layers.push(Layer::Operator(m));
        }

        debug!("compiled {} layers into {}", self.layers.len(), fused.layers.len());
        self.compiled = Some(Box::new(fused));
    }

    /// Runs the circuit on `state` using the thread-local generator for measurements.
    pub fn apply(&self, state: &QuantumState) -> Result<QuantumState, ZxError> {
        self.apply_with_rng(state, &mut rand::rng())
    }

    /// Runs the circuit on `state`, drawing measurement outcomes from `rng`.
    ///
    /// Uses the compiled form when there is one. Returns
    /// `ZxError::DimensionMismatch` when an operator layer does not fit the
    /// state reaching it.
    pub fn apply_with_rng<R: Rng + ?Sized>(&self, state: &QuantumState, rng: &mut R) -> Result<QuantumState, ZxError> {
        if let Some(compiled) = &self.compiled {
            return compiled.apply_with_rng(state, rng);
        }
        if !self.is_compiled_form {
            debug!("applying a circuit that has not been compiled");
        }

        let mut current = state.clone();
        for (i, layer) in self.layers.iter().enumerate() {
            match layer {
                Layer::Operator(op) => {
                    if op.width() != current.dim() {
                        return Err(ZxError::DimensionMismatch {
                            message: format!(
                                "layer {} expects {} amplitudes but the state has {}",
                                i,
                                op.width(),
                                current.dim()
                            ),
                        });
                    }
                    current = current.apply_operator(op);
                }
                Layer::Measurement(qubits) => {
                    for &qubit in qubits {
                        current = current.measure_qubit(qubit, rng)?;
                    }
                }
            }
        }
        Ok(current)
    }

    /// The source layers, in order.
    pub fn layers(&self) -> &[Layer] {
        &self.layers
    }

    /// The `index`th source layer.
    pub fn layer(&self, index: usize) -> Option<&Layer> {
        self.layers.get(index)
    }

    /// The fused circuit, if `compile` has run since the last change.
    pub fn compiled(&self) -> Option<&LayeredCircuit> {
        self.compiled.as_deref()
    }

    /// Whether a compiled form is present.
    pub fn is_compiled(&self) -> bool {
        self.compiled.is_some()
    }

    /// Number of amplitudes the first operator layer consumes.
    pub fn input_dim(&self) -> Option<usize> {
        self.layers.iter().find_map(|layer| match layer {
            Layer::Operator(op) => Some(op.width()),
            Layer::Measurement(_) => None,
        })
    }

    /// Number of amplitudes the last operator layer produces.
    pub fn output_dim(&self) -> Option<usize> {
        self.layers.iter().rev().find_map(|layer| match layer {
            Layer::Operator(op) => Some(op.height()),
            Layer::Measurement(_) => None,
        })
    }

    /// Number of source layers.
    pub fn len(&self) -> usize {
        self.layers.len()
    }

    /// Returns `true` if no layer has been closed or added.
    pub fn is_empty(&self) -> bool {
        self.layers.is_empty()
    }
}

/// Chained construction of a `LayeredCircuit`.
#[derive(Debug, Default)]
pub struct CircuitBuilder {
    circuit: LayeredCircuit,
}

impl CircuitBuilder {
    /// Creates a builder over an empty circuit.
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends one operator layer holding the tensor product of `operators`.
    pub fn operators<I>(mut self, operators: I) -> Self
    where
        I: IntoIterator<Item = ComplexMatrix>,
    {
        self.circuit.new_layer();
        for op in operators {
            self.circuit.add_operator(op);
        }
        self.circuit.close_layer();
        self
    }

    /// Appends a measurement layer.
    pub fn measure(mut self, qubits: Vec<usize>) -> Self {
        self.circuit.add_measurement_layer(qubits);
        self
    }

    /// Returns the circuit without compiling it.
    pub fn build(self) -> LayeredCircuit {
        self.circuit
    }

    /// Compiles and returns the circuit.
    pub fn build_compiled(mut self) -> LayeredCircuit {
        self.circuit.compile();
        self.circuit
    }
}

impl fmt::Display for LayeredCircuit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let status = if self.is_compiled() { ", compiled" } else { "" };
        writeln!(f, "LayeredCircuit[{} layers{}]", self.layers.len(), status)?;
        for (i, layer) in self.layers.iter().enumerate() {
            match layer {
                Layer::Operator(op) => writeln!(f, "  {}: operator {}x{}", i, op.height(), op.width())?,
                Layer::Measurement(qubits) => writeln!(f, "  {}: measure {:?}", i, qubits)?,
            }
        }
        Ok(())
    }
}
