// src/simulation/mod.rs

//! Runs `LayeredCircuit`s against quantum states.
//! This module contains the `Simulator` entry point, which owns the random
//! source used for measurements, and the internal branch engine behind
//! `enumerate_branches`, which follows every measurement outcome instead of
//! sampling one.

mod results;
pub(crate) mod engine;

// Re-export the main public interface types
pub use engine::enumerate_branches;
pub use results::{Branch, SimulationResult};

use log::debug;
use rand::SeedableRng;
use rand::rngs::StdRng;

use crate::circuits::LayeredCircuit;
use crate::core::{QuantumState, ZxError};

/// Executes circuits with a seedable random source for measurements.
///
/// Two simulators built with the same seed produce the same measurement
/// outcomes for the same sequence of runs.
pub struct Simulator {
    rng: StdRng,
}

impl Simulator {
    /// Creates a simulator seeded from operating system entropy.
    pub fn new() -> Self {
        Self { rng: StdRng::from_os_rng() }
    }

    /// Creates a simulator with a fixed seed, for reproducible runs.
    pub fn seeded(seed: u64) -> Self {
        Self { rng: StdRng::seed_from_u64(seed) }
    }

    /// Applies `circuit` to `state`, sampling each measurement.
    ///
    /// # Returns
    /// * `Ok(QuantumState)` with the state after the last layer.
    /// * `Err(ZxError)` if the state does not fit the circuit or a
    ///   measurement addresses a missing qubit.
    pub fn run(&mut self, circuit: &LayeredCircuit, state: &QuantumState) -> Result<QuantumState, ZxError> {
        circuit.apply_with_rng(state, &mut self.rng)
    }

    /// Runs `circuit` on `state` `shots` times.
    pub fn sample(&mut self, circuit: &LayeredCircuit, state: &QuantumState, shots: usize) -> Result<Vec<QuantumState>, ZxError> {
        debug!("sampling {} shots", shots);
        (0..shots).map(|_| self.run(circuit, state)).collect()
    }

    /// Every measurement outcome of `circuit` on `state` with its probability.
    pub fn enumerate(&self, circuit: &LayeredCircuit, state: &QuantumState) -> Result<SimulationResult, ZxError> {
        enumerate_branches(circuit, state)
    }
}

impl Default for Simulator {
    fn default() -> Self {
        Self::new()
    }
}
