// src/lib.rs

//! `zxcgp` - Evolving quantum circuits as graphs of ZX spiders
//!
//! A `CircuitGraph` is a Cartesian Genetic Programming grid whose nodes are
//! green, red or Hadamard spiders. Mutations rewire, retype and rephase the
//! nodes; the live part of the grid is compiled into a `LayeredCircuit` of
//! dense complex operators that acts on `QuantumState`s.

pub mod core;
pub mod operations;
pub mod circuits;
pub mod graph;
pub mod simulation;
pub mod validation;

// Re-export the most common types for easier top-level use
pub use core::{ComplexMatrix, EdgePointer, NodeId, QuantumState, ZxError};
pub use operations::{SpiderKind, calculate_operator, controlled, green, hadamard, hadamard_gate, red, wire};
pub use circuits::{CircuitBuilder, Layer, LayeredCircuit};
pub use graph::{
    CircuitGraph,
    ComplexityPolicy,
    EdgeRewire,
    GraphShape,
    MutationConfig,
    MutationCounts,
    MutationKind,
    MutationWeights,
    ZxNode,
    connection_matrix,
};
pub use simulation::{Simulator, SimulationResult, enumerate_branches};
pub use validation::{
    check_normalization,
    fidelity,
    state_error,
    validate_edges,
    validate_state,
};

// Example 1: A CNOT drawn as a ZX graph
// A green copy spider on the control line feeds a red XOR spider on the
// target line. The compiled circuit is a scaled CNOT.
/// ```
/// use zxcgp::{CircuitGraph, GraphShape, NodeId, QuantumState, SpiderKind, ZxError, state_error};
///
/// fn main() -> Result<(), ZxError> {
///     // 2 inputs, 2 hidden layers of 1 node, 2 outputs, arity 2 in and out
///     let mut graph = CircuitGraph::new(GraphShape::new(2, 2, 1, 2, 2, 2, 4))?;
///     let n = NodeId::new;
///     graph.connect(n(0, 0), 0, n(1, 0), 0)?;
///     graph.connect(n(1, 0), 0, n(3, 0), 0)?;
///     graph.connect(n(1, 0), 1, n(2, 0), 1)?;
///     graph.connect(n(0, 1), 0, n(2, 0), 0)?;
///     graph.connect(n(2, 0), 0, n(3, 1), 0)?;
///     graph.set_kind(n(2, 0), SpiderKind::Red)?;
///
///     let circuit = graph.generate_circuit()?;
///     println!("{}", circuit);
///     for (input, expected) in [(0b00, 0b00), (0b01, 0b01), (0b10, 0b11), (0b11, 0b10)] {
///         let out = circuit.apply(&QuantumState::basis(2, input))?;
///         assert_eq!(state_error(&out, &QuantumState::basis(2, expected))?, 0.0);
///     }
///     Ok(())
/// }
/// ```
#[doc(hidden)]
const _: () = (); // Attaches the preceding doc comment block to a hidden item

// Example 2: Exhaustive measurement outcomes
// Every branch of a Bell pair measurement, with its probability.
/// ```
/// use zxcgp::{CircuitBuilder, QuantumState, ZxError, controlled, enumerate_branches, hadamard_gate, red, wire};
/// use std::f64::consts::PI;
///
/// fn main() -> Result<(), ZxError> {
///     let cnot = controlled(1, &red(1, 1, PI)?);
///     let circuit = CircuitBuilder::new()
///         .operators([hadamard_gate(), wire()])
///         .operators([cnot])
///         .measure(vec![0, 1])
///         .build_compiled();
///
///     let result = enumerate_branches(&circuit, &QuantumState::zero(2))?;
///     println!("{}", result);
///     // only |00> and |11> survive
///     assert_eq!(result.len(), 2);
///     assert!((result.total_probability() - 1.0).abs() < 1e-9);
///     assert!((result.outcome_probability(0, true) - 0.5).abs() < 1e-9);
///     Ok(())
/// }
/// ```
#[doc(hidden)]
const _: () = ();

// Example 3: Random graphs stay consistent
/// ```
/// use rand::SeedableRng;
/// use rand::rngs::StdRng;
/// use zxcgp::{CircuitGraph, GraphShape, MutationConfig, MutationWeights, ZxError};
///
/// fn main() -> Result<(), ZxError> {
///     let mut rng = StdRng::seed_from_u64(7);
///     let config = MutationConfig::default();
///     let weights = MutationWeights::default();
///     let mut graph = CircuitGraph::random(GraphShape::default(), 30, &config, &weights, &mut rng)?;
///
///     let child = {
///         let mut child = graph.copy();
///         child.mutate(5, &config, &mut rng)?;
///         child
///     };
///     child.verify_edges()?;
///     assert!(child.check_complexity());
///
///     let circuit = graph.generate_circuit()?;
///     let shape = graph.shape();
///     assert_eq!(circuit.input_dim(), Some(1 << shape.inputs));
///     assert_eq!(circuit.output_dim(), Some(1 << shape.outputs));
///     Ok(())
/// }
/// ```
#[doc(hidden)]
const _: () = ();
