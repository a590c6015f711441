// src/simulation/engine.rs
use crate::circuits::{Layer, LayeredCircuit};
use crate::core::{ComplexMatrix, QuantumState, ZxError};
use crate::simulation::results::{Branch, SimulationResult};
use log::trace;

/// Branches whose probability falls to or below this are dropped.
const NEGLIGIBLE_PROBABILITY: f64 = 1e-15;

/// Follows every measurement outcome of a circuit at once.
///
/// Each live branch carries its own collapsed state, the outcomes that led
/// to it and its probability. Operators act on every branch; a measurement
/// splits each branch in two and drops the halves with no weight.
/// (Internal visibility)
pub(crate) struct BranchEngine {
    branches: Vec<Branch>,
}

impl BranchEngine {
    /// Starts from a single branch holding `state` with probability 1.
    pub(crate) fn init(state: &QuantumState) -> Self {
        Self { branches: vec![Branch::new(Vec::new(), 1.0, state.clone())] }
    }

    /// Applies `op` to every branch.
    pub(crate) fn apply_operator(&mut self, op: &ComplexMatrix) -> Result<(), ZxError> {
        for branch in &mut self.branches {
            if op.width() != branch.state.dim() {
                return Err(ZxError::DimensionMismatch {
                    message: format!("operator expects {} amplitudes but the state has {}", op.width(), branch.state.dim()),
                });
            }
            branch.state = branch.state.apply_operator(op);
        }
        Ok(())
    }

    /// Splits every branch on the value of `qubit`.
    ///
    /// The first split weighs branches by the raw mass of the state, so the
    /// probabilities of the final branches add up to the mass of the input.
    /// Collapsed states are renormalised, which makes later splits conditional.
    pub(crate) fn measure(&mut self, qubit: usize) -> Result<(), ZxError> {
        let mut next = Vec::with_capacity(self.branches.len() * 2);
        for branch in self.branches.drain(..) {
            for value in [false, true] {
                let (state, mass) = branch.state.measure_qubit_to_value(qubit, value)?;
                let probability = branch.probability * mass;
                if probability <= NEGLIGIBLE_PROBABILITY {
                    continue;
                }
                let mut outcomes = branch.outcomes.clone();
                outcomes.push((qubit, value));
                next.push(Branch::new(outcomes, probability, state));
            }
        }
        trace!("measured qubit {}: {} branches", qubit, next.len());
        self.branches = next;
        Ok(())
    }

    pub(crate) fn into_result(self) -> SimulationResult {
        SimulationResult::from_branches(self.branches)
    }
}

/// Expands every measurement outcome of `circuit` applied to `state`.
///
/// Uses the compiled form of the circuit when there is one. Measurements are
/// taken with `QuantumState::measure_qubit_to_value`, so no randomness is
/// involved. Branches with negligible probability are pruned.
pub fn enumerate_branches(circuit: &LayeredCircuit, state: &QuantumState) -> Result<SimulationResult, ZxError> {
    let effective = circuit.compiled().unwrap_or(circuit);
    let mut engine = BranchEngine::init(state);
    for layer in effective.layers() {
        match layer {
            Layer::Operator(op) => engine.apply_operator(op)?,
            Layer::Measurement(qubits) => {
                for &qubit in qubits {
                    engine.measure(qubit)?;
                }
            }
        }
    }
    Ok(engine.into_result())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::circuits::CircuitBuilder;
    use crate::operations::{hadamard_gate, wire};

    const TEST_TOLERANCE: f64 = 1e-9;

    #[test]
    fn test_no_measurement_gives_one_branch() -> Result<(), ZxError> {
        let circuit = CircuitBuilder::new().operators([hadamard_gate()]).build_compiled();
        let result = enumerate_branches(&circuit, &QuantumState::zero(1))?;
        assert_eq!(result.len(), 1);
        let only = &result.branches()[0];
        assert!(only.outcomes().is_empty());
        assert!((only.probability() - 1.0).abs() < TEST_TOLERANCE);
        Ok(())
    }

    #[test]
    fn test_superposition_splits_evenly() -> Result<(), ZxError> {
        let circuit = CircuitBuilder::new()
            .operators([hadamard_gate(), hadamard_gate()])
            .measure(vec![0, 1])
            .build_compiled();
        let result = enumerate_branches(&circuit, &QuantumState::zero(2))?;
        assert_eq!(result.len(), 4);
        for branch in result.branches() {
            assert!((branch.probability() - 0.25).abs() < TEST_TOLERANCE);
            assert_eq!(branch.outcomes().len(), 2);
        }
        assert!((result.total_probability() - 1.0).abs() < TEST_TOLERANCE);
        Ok(())
    }

    #[test]
    fn test_impossible_branches_are_pruned() -> Result<(), ZxError> {
        let circuit = CircuitBuilder::new()
            .operators([hadamard_gate(), wire()])
            .measure(vec![1, 0])
            .build_compiled();
        let result = enumerate_branches(&circuit, &QuantumState::zero(2))?;
        assert_eq!(result.len(), 2);
        for branch in result.branches() {
            assert_eq!(branch.outcomes()[0], (1, false));
        }
        Ok(())
    }

    #[test]
    fn test_probabilities_sum_to_input_mass() -> Result<(), ZxError> {
        let circuit = CircuitBuilder::new().operators([hadamard_gate()]).measure(vec![0]).build();
        let half = QuantumState::new(vec![num_complex::Complex64::new(0.5, 0.0), num_complex::Complex64::new(0.5, 0.0)]);
        let result = enumerate_branches(&circuit, &half)?;
        assert!((result.total_probability() - half.probability_mass()).abs() < TEST_TOLERANCE);
        Ok(())
    }

    #[test]
    fn test_wrong_input_size_is_reported() {
        let circuit = CircuitBuilder::new().operators([wire(), wire()]).build_compiled();
        let result = enumerate_branches(&circuit, &QuantumState::zero(3));
        assert!(matches!(result, Err(ZxError::DimensionMismatch { .. })));
    }
}
