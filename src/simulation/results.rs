// src/simulation/results.rs
use crate::core::QuantumState;
use std::fmt;

/// One combination of measurement outcomes and the state it leaves behind.
#[derive(Debug, Clone, PartialEq)]
pub struct Branch {
    pub(crate) outcomes: Vec<(usize, bool)>,
    pub(crate) probability: f64,
    pub(crate) state: QuantumState,
}

impl Branch {
    pub(crate) fn new(outcomes: Vec<(usize, bool)>, probability: f64, state: QuantumState) -> Self {
        Self { outcomes, probability, state }
    }

    /// `(qubit, value)` for every measurement, in the order they were taken.
    pub fn outcomes(&self) -> &[(usize, bool)] {
        &self.outcomes
    }

    pub fn probability(&self) -> f64 {
        self.probability
    }

    /// State after the last layer of the circuit on this branch.
    pub fn state(&self) -> &QuantumState {
        &self.state
    }
}

/// Holds every branch of an exhaustive measurement expansion.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct SimulationResult {
    branches: Vec<Branch>,
}

impl SimulationResult {
    /// Wraps finished branches. (Internal visibility)
    pub(crate) fn from_branches(branches: Vec<Branch>) -> Self {
        Self { branches }
    }

    pub fn branches(&self) -> &[Branch] {
        &self.branches
    }

    pub fn len(&self) -> usize {
        self.branches.len()
    }

    pub fn is_empty(&self) -> bool {
        self.branches.is_empty()
    }

    /// Sum of the branch probabilities.
    pub fn total_probability(&self) -> f64 {
        self.branches.iter().map(|b| b.probability).sum()
    }

    /// The branch with the highest probability, if any.
    pub fn most_likely(&self) -> Option<&Branch> {
        self.branches.iter().max_by(|a, b| a.probability.total_cmp(&b.probability))
    }

    /// Probability that the first measurement of `qubit` gave `value`.
    pub fn outcome_probability(&self, qubit: usize, value: bool) -> f64 {
        self.branches
            .iter()
            .filter(|b| b.outcomes.iter().find(|(q, _)| *q == qubit).is_some_and(|(_, v)| *v == value))
            .map(|b| b.probability)
            .sum()
    }
}

impl fmt::Display for SimulationResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Simulation Results:")?;
        if self.branches.is_empty() {
            return writeln!(f, "  No branch has non-zero probability.");
        }
        for branch in &self.branches {
            let outcomes: Vec<String> =
                branch.outcomes.iter().map(|(q, v)| format!("q{}={}", q, u8::from(*v))).collect();
            writeln!(f, "  [{}] p={:.4}: {}", outcomes.join(" "), branch.probability, branch.state)?;
        }
        Ok(())
    }
}
