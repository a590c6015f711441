// src/validation/mod.rs

//! Checks and scores for states and graphs.

use num_complex::Complex64;

use crate::core::constants::zx_constants::{DEFAULT_TOLERANCE, ERROR_FLOOR};
use crate::core::{QuantumState, ZxError};
use crate::graph::CircuitGraph;

fn check_same_dim(a: &QuantumState, b: &QuantumState) -> Result<(), ZxError> {
    if a.dim() != b.dim() {
        return Err(ZxError::DimensionMismatch {
            message: format!("cannot compare a state of {} amplitudes with one of {}", a.dim(), b.dim()),
        });
    }
    Ok(())
}

/// Checks that the total probability `Σ|c_i|²` of `state` is 1.
///
/// # Arguments
/// * `state` - The `QuantumState` to check.
/// * `tolerance` - Allowed deviation from 1.0. Defaults to `DEFAULT_TOLERANCE`.
///
/// # Returns
/// * `Ok(())` if normalized within tolerance.
/// * `Err(ZxError::Incoherence)` otherwise.
pub fn check_normalization(state: &QuantumState, tolerance: Option<f64>) -> Result<(), ZxError> {
    let effective_tolerance = tolerance.unwrap_or(DEFAULT_TOLERANCE);
    let mass = state.probability_mass();
    if (mass - 1.0).abs() > effective_tolerance {
        Err(ZxError::Incoherence {
            message: format!("State normalization failed. Sum(|c_i|^2) = {} (Deviation > {})", mass, effective_tolerance),
        })
    } else {
        Ok(())
    }
}

/// Checks that `state` spans whole qubits and is normalized.
pub fn validate_state(state: &QuantumState, norm_tolerance: Option<f64>) -> Result<(), ZxError> {
    if !state.dim().is_power_of_two() {
        return Err(ZxError::DimensionMismatch {
            message: format!("a state of {} amplitudes does not describe whole qubits", state.dim()),
        });
    }
    check_normalization(state, norm_tolerance)
}

/// Distance between the output of a circuit and the state it should produce.
///
/// `actual` is normalized first, since ZX circuits may reduce the trace.
/// The score is the magnitude of the difference; anything at or below
/// `ERROR_FLOOR` counts as an exact match.
///
/// # Returns
/// * `Ok(error)` with `error >= 0`.
/// * `Err(ZxError::DimensionMismatch)` if the states differ in size.
pub fn state_error(actual: &QuantumState, expected: &QuantumState) -> Result<f64, ZxError> {
    check_same_dim(actual, expected)?;
    let error = (&actual.normalize() - expected).magnitude();
    Ok(if error > ERROR_FLOOR { error } else { 0.0 })
}

/// Overlap `|<a|b>|² / (<a|a><b|b>)`, which is 1 for states equal up to
/// scale and global phase. Returns 0 if either state is zero.
pub fn fidelity(a: &QuantumState, b: &QuantumState) -> Result<f64, ZxError> {
    check_same_dim(a, b)?;
    let overlap: Complex64 = a.amplitudes().iter().zip(b.amplitudes()).map(|(x, y)| x.conj() * y).sum();
    let norms = a.probability_mass() * b.probability_mass();
    if norms == 0.0 {
        return Ok(0.0);
    }
    Ok(overlap.norm_sqr() / norms)
}

/// Checks that every edge of `graph` is recorded on both of its ends.
///
/// # Returns
/// * `Ok(())` if the graph is consistent.
/// * `Err(ZxError::EdgeInconsistency)` naming the first node with a dangling pointer.
pub fn validate_edges(graph: &CircuitGraph) -> Result<(), ZxError> {
    graph.verify_edges()
}
