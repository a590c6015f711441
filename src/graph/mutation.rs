// src/graph/mutation.rs

//! Mutation operators and their parameters.
//!
//! Every mutation picks a node uniformly among the hidden and output nodes
//! (a uniform layer in `1..=n+1`, then a uniform node in it). Input nodes
//! are never mutated. Before each mutation the activity flags are refreshed
//! so the dirty flag reflects the graph as it was when the node was touched.

use log::{debug, warn};
use rand::Rng;
use rand::distr::Distribution;
use rand::distr::weighted::WeightedIndex;
use rand_distr::Normal;
use std::fmt;

use super::CircuitGraph;
use crate::core::constants::zx_constants::{MAX_MUTATION_ATTEMPTS, TAU};
use crate::core::{EdgePointer, NodeId, ZxError};

/// What to do with an edge rewire that breaks the complexity bound.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ComplexityPolicy {
    /// Undo the rewire and draw a new mutation.
    #[default]
    Reject,
    /// Keep the rewire; callers check `check_complexity` themselves.
    Accept,
}

/// Parameters shared by both mutation schemes.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MutationConfig {
    /// Standard deviation of the Gaussian added by a phase perturbation.
    pub phase_variance: f64,
    /// Phase resets pick from `k · 2π / granularity`, `k` in `0..=granularity`.
    pub phase_reset_granularity: u32,
    /// Probability that an edge mutation in the uniform scheme disconnects
    /// instead of rewiring.
    pub disconnect_rate: f64,
    /// Probability that a function change is followed by a phase reset.
    pub phase_reset_rate: f64,
    pub policy: ComplexityPolicy,
}

impl Default for MutationConfig {
    fn default() -> Self {
        Self {
            phase_variance: 0.3,
            phase_reset_granularity: 16,
            disconnect_rate: 0.0,
            phase_reset_rate: 1.0,
            policy: ComplexityPolicy::Reject,
        }
    }
}

impl MutationConfig {
    pub fn validate(&self) -> Result<(), ZxError> {
        if !self.phase_variance.is_finite() || self.phase_variance < 0.0 {
            return Err(ZxError::InvalidConfiguration {
                message: format!("phase variance must be finite and non-negative, got {}", self.phase_variance),
            });
        }
        if self.phase_reset_granularity == 0 {
            return Err(ZxError::InvalidConfiguration {
                message: "phase reset granularity must be at least one".to_string(),
            });
        }
        for (name, rate) in [("disconnect rate", self.disconnect_rate), ("phase reset rate", self.phase_reset_rate)] {
            if !(0.0..=1.0).contains(&rate) {
                return Err(ZxError::InvalidConfiguration {
                    message: format!("{} must lie in [0, 1], got {}", name, rate),
                });
            }
        }
        Ok(())
    }

    fn normal(&self) -> Result<Normal<f64>, ZxError> {
        Normal::new(0.0, self.phase_variance).map_err(|e| ZxError::InvalidConfiguration {
            message: format!("phase variance: {}", e),
        })
    }
}

/// The six mutation operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MutationKind {
    /// Point a random input slot at a random output slot of an earlier layer.
    EdgeRewire,
    /// Clear a random input slot.
    EdgeDisconnect,
    /// Switch to one of the other two spider kinds.
    FunctionChange,
    /// Add Gaussian noise to the phase.
    PhasePerturb,
    /// Snap the phase to a random multiple of `2π / granularity`.
    PhaseReset,
    /// Toggle the controlled flag.
    ControlFlip,
}

impl MutationKind {
    /// Every kind, in the order `MutationWeights` and `MutationCounts` use.
    pub const ALL: [MutationKind; 6] = [
        MutationKind::EdgeRewire,
        MutationKind::EdgeDisconnect,
        MutationKind::FunctionChange,
        MutationKind::PhasePerturb,
        MutationKind::PhaseReset,
        MutationKind::ControlFlip,
    ];

    fn position(self) -> usize {
        match self {
            MutationKind::EdgeRewire => 0,
            MutationKind::EdgeDisconnect => 1,
            MutationKind::FunctionChange => 2,
            MutationKind::PhasePerturb => 3,
            MutationKind::PhaseReset => 4,
            MutationKind::ControlFlip => 5,
        }
    }
}

impl fmt::Display for MutationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            MutationKind::EdgeRewire => "edge rewire",
            MutationKind::EdgeDisconnect => "edge disconnect",
            MutationKind::FunctionChange => "function change",
            MutationKind::PhasePerturb => "phase perturb",
            MutationKind::PhaseReset => "phase reset",
            MutationKind::ControlFlip => "control flip",
        };
        f.write_str(name)
    }
}

/// Relative frequencies of the mutation kinds in the weighted scheme.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MutationWeights {
    pub rewire: f64,
    pub disconnect: f64,
    pub function: f64,
    pub perturb: f64,
    pub reset: f64,
    pub control: f64,
}

impl Default for MutationWeights {
    fn default() -> Self {
        Self { rewire: 0.4, disconnect: 0.1, function: 0.2, perturb: 0.15, reset: 0.1, control: 0.05 }
    }
}

impl MutationWeights {
    /// Weights in `MutationKind::ALL` order.
    pub fn as_array(&self) -> [f64; 6] {
        [self.rewire, self.disconnect, self.function, self.perturb, self.reset, self.control]
    }

    /// Weights must be finite and non-negative with a positive sum.
    pub fn validate(&self) -> Result<(), ZxError> {
        self.distribution().map(|_| ())
    }

    fn distribution(&self) -> Result<WeightedIndex<f64>, ZxError> {
        let weights = self.as_array();
        if weights.iter().any(|w| !w.is_finite()) {
            return Err(ZxError::InvalidConfiguration { message: format!("mutation weights must be finite: {:?}", weights) });
        }
        WeightedIndex::new(weights).map_err(|e| ZxError::InvalidConfiguration {
            message: format!("mutation weights {:?}: {}", weights, e),
        })
    }
}

/// How many mutations of each kind were applied.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct MutationCounts {
    pub rewire: usize,
    pub disconnect: usize,
    pub function: usize,
    pub perturb: usize,
    pub reset: usize,
    pub control: usize,
}

impl MutationCounts {
    pub fn get(&self, kind: MutationKind) -> usize {
        self.as_array()[kind.position()]
    }

    /// Counts in `MutationKind::ALL` order.
    pub fn as_array(&self) -> [usize; 6] {
        [self.rewire, self.disconnect, self.function, self.perturb, self.reset, self.control]
    }

    pub fn total(&self) -> usize {
        self.as_array().iter().sum()
    }

    fn record(&mut self, kind: MutationKind) {
        let counter = match kind {
            MutationKind::EdgeRewire => &mut self.rewire,
            MutationKind::EdgeDisconnect => &mut self.disconnect,
            MutationKind::FunctionChange => &mut self.function,
            MutationKind::PhasePerturb => &mut self.perturb,
            MutationKind::PhaseReset => &mut self.reset,
            MutationKind::ControlFlip => &mut self.control,
        };
        *counter += 1;
    }
}

/// Everything needed to undo one edge rewire.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EdgeRewire {
    target: EdgePointer,
    source: EdgePointer,
    old_source_out: Option<EdgePointer>,
    old_target_in: Option<EdgePointer>,
}

impl EdgeRewire {
    /// Input slot that received the new edge.
    pub fn target(&self) -> EdgePointer {
        self.target
    }

    /// Output slot the new edge leaves from.
    pub fn source(&self) -> EdgePointer {
        self.source
    }

    /// Input slot that lost its edge because the source output was taken over.
    pub fn displaced_target(&self) -> Option<EdgePointer> {
        self.old_source_out
    }

    /// Output slot that lost its edge because the target input was taken over.
    pub fn displaced_source(&self) -> Option<EdgePointer> {
        self.old_target_in
    }
}

fn edge_mutation<R: Rng + ?Sized>(disconnect_rate: f64, rng: &mut R) -> MutationKind {
    if rng.random_bool(disconnect_rate) {
        MutationKind::EdgeDisconnect
    } else {
        MutationKind::EdgeRewire
    }
}

impl CircuitGraph {
    /// Applies `count` mutations with the uniform scheme.
    ///
    /// Output nodes only receive edge mutations. Hidden nodes receive a
    /// function change, a phase mutation or an edge mutation with equal
    /// probability. A phase mutation snaps to the reset grid with probability
    /// `config.phase_reset_rate` and perturbs the phase otherwise; a function
    /// change is followed by a reset with the same probability. Edge
    /// mutations disconnect with probability `config.disconnect_rate` and
    /// rewire otherwise.
    pub fn mutate<R: Rng + ?Sized>(
        &mut self,
        count: usize,
        config: &MutationConfig,
        rng: &mut R,
    ) -> Result<MutationCounts, ZxError> {
        let outputs = self.output_layer();
        self.run_mutations(count, config, config.phase_reset_rate, rng, |id, rng| {
            if id.layer == outputs {
                return edge_mutation(config.disconnect_rate, rng);
            }
            match rng.random_range(0..3) {
                0 => MutationKind::FunctionChange,
                1 => {
                    if rng.random_bool(config.phase_reset_rate) {
                        MutationKind::PhaseReset
                    } else {
                        MutationKind::PhasePerturb
                    }
                }
                _ => edge_mutation(config.disconnect_rate, rng),
            }
        })
    }

    /// Applies `count` mutations whose kinds are drawn according to `weights`.
    ///
    /// Any hidden or output node can receive any kind. Function changes keep
    /// the node's phase; resets only happen through `PhaseReset`.
    pub fn mutate_weighted<R: Rng + ?Sized>(
        &mut self,
        count: usize,
        config: &MutationConfig,
        weights: &MutationWeights,
        rng: &mut R,
    ) -> Result<MutationCounts, ZxError> {
        let distribution = weights.distribution()?;
        self.run_mutations(count, config, 0.0, rng, |_, rng| MutationKind::ALL[distribution.sample(rng)])
    }

    fn run_mutations<R, F>(
        &mut self,
        count: usize,
        config: &MutationConfig,
        function_reset_rate: f64,
        rng: &mut R,
        mut choose: F,
    ) -> Result<MutationCounts, ZxError>
    where
        R: Rng + ?Sized,
        F: FnMut(NodeId, &mut R) -> MutationKind,
    {
        config.validate()?;
        let noise = config.normal()?;
        self.changed = false;

        let mut counts = MutationCounts::default();
        for _ in 0..count {
            let mut applied = None;
            for _ in 0..MAX_MUTATION_ATTEMPTS {
                self.active_pass();
                let id = self.random_mutable_node(rng);
                let kind = choose(id, &mut *rng);
                if self.apply_mutation(id, kind, config, function_reset_rate, &noise, rng) {
                    applied = Some(kind);
                    break;
                }
            }
            match applied {
                Some(kind) => counts.record(kind),
                None => warn!("no acceptable mutation found in {} attempts, skipping", MAX_MUTATION_ATTEMPTS),
            }
        }
        self.active_pass();
        Ok(counts)
    }

    fn random_mutable_node<R: Rng + ?Sized>(&self, rng: &mut R) -> NodeId {
        let layer = 1 + rng.random_range(0..=self.shape.layers);
        let index = rng.random_range(0..self.grid[layer].len());
        NodeId::new(layer, index)
    }

    /// Returns false only for a rewire rejected by the complexity policy.
    fn apply_mutation<R: Rng + ?Sized>(
        &mut self,
        id: NodeId,
        kind: MutationKind,
        config: &MutationConfig,
        function_reset_rate: f64,
        noise: &Normal<f64>,
        rng: &mut R,
    ) -> bool {
        match kind {
            MutationKind::EdgeRewire => return self.mutate_edge(id, config.policy, rng),
            MutationKind::EdgeDisconnect => self.mutate_disconnect(id, rng),
            MutationKind::FunctionChange => {
                self.mutate_function(id, function_reset_rate, config.phase_reset_granularity, rng)
            }
            MutationKind::PhasePerturb => self.mutate_phase(id, noise, rng),
            MutationKind::PhaseReset => self.reset_phase(id, config.phase_reset_granularity, rng),
            MutationKind::ControlFlip => {
                let node = self.at_mut(id);
                node.set_controlled(!node.is_controlled());
                let active = node.is_active();
                self.changed |= active;
            }
        }
        debug!("{} on {}", kind, id);
        true
    }

    /// Takes over a random input slot of `id` with a random earlier output slot.
    fn mutate_edge<R: Rng + ?Sized>(&mut self, id: NodeId, policy: ComplexityPolicy, rng: &mut R) -> bool {
        let slot = rng.random_range(0..self.at(id).arity_in());
        let layer = if id.layer == 1 { 0 } else { rng.random_range(0..id.layer) };
        let index = rng.random_range(0..self.grid[layer].len());
        let out = rng.random_range(0..self.grid[layer][index].arity_out());
        let source = NodeId::new(layer, index);

        let was_active = self.at(id).is_active();
        let undo = self.rewire(id.slot(slot), source.slot(out));

        if policy == ComplexityPolicy::Reject && !self.check_complexity() {
            self.revert_rewire(undo);
            debug!("rejected rewire {} -> {}: complexity above {}", source.slot(out), id.slot(slot), self.shape.complexity_bound);
            return false;
        }

        let displaced_active = undo.old_source_out.is_some_and(|p| self.at(p.node()).is_active());
        self.changed |= was_active || displaced_active;
        debug!("{} on {}: {} -> slot {}", MutationKind::EdgeRewire, id, source.slot(out), slot);
        true
    }

    /// Connects `source` to `target`, clearing whatever either slot held.
    ///
    /// Activity flags are left as they were; call `active_pass` before
    /// reading them or `count_inactive_inputs`.
    pub fn rewire(&mut self, target: EdgePointer, source: EdgePointer) -> EdgeRewire {
        let old_source_out = self.at(source.node()).output(source.slot);
        let old_target_in = self.at(target.node()).input(target.slot);

        if let Some(stolen) = old_source_out {
            self.at_mut(stolen.node()).set_input(stolen.slot, None);
        }
        if let Some(orphaned) = old_target_in {
            self.at_mut(orphaned.node()).set_output(orphaned.slot, None);
        }
        self.at_mut(target.node()).set_input(target.slot, Some(source));
        self.at_mut(source.node()).set_output(source.slot, Some(target));

        EdgeRewire { target, source, old_source_out, old_target_in }
    }

    /// Restores the graph to its state before `undo` was produced.
    ///
    /// Must be applied to the graph that produced `undo`, with no other
    /// edge changes in between. Like `rewire`, this does not refresh the
    /// activity flags.
    pub fn revert_rewire(&mut self, undo: EdgeRewire) {
        let EdgeRewire { target, source, old_source_out, old_target_in } = undo;
        if let Some(stolen) = old_source_out {
            self.at_mut(stolen.node()).set_input(stolen.slot, Some(source));
        }
        if let Some(orphaned) = old_target_in {
            self.at_mut(orphaned.node()).set_output(orphaned.slot, Some(target));
        }
        self.at_mut(source.node()).set_output(source.slot, old_source_out);
        self.at_mut(target.node()).set_input(target.slot, old_target_in);
    }

    fn mutate_disconnect<R: Rng + ?Sized>(&mut self, id: NodeId, rng: &mut R) {
        let slot = rng.random_range(0..self.at(id).arity_in());
        if self.unlink_input(id.slot(slot)) && self.at(id).is_active() {
            self.changed = true;
        }
    }

    /// Switches to one of the other kinds, then resets the phase with
    /// probability `reset_rate`.
    fn mutate_function<R: Rng + ?Sized>(&mut self, id: NodeId, reset_rate: f64, granularity: u32, rng: &mut R) {
        let others = self.at(id).kind().others();
        let kind = others[rng.random_range(0..others.len())];
        self.at_mut(id).set_kind(kind);
        if reset_rate > 0.0 && rng.random_bool(reset_rate) {
            self.reset_phase(id, granularity, rng);
        }
        let active = self.at(id).is_active();
        self.changed |= active;
    }

    fn mutate_phase<R: Rng + ?Sized>(&mut self, id: NodeId, noise: &Normal<f64>, rng: &mut R) {
        let node = self.at_mut(id);
        node.set_phase((node.phase() + noise.sample(rng)).rem_euclid(TAU));
        let visible = node.is_active() && node.kind().uses_phase();
        self.changed |= visible;
    }

    fn reset_phase<R: Rng + ?Sized>(&mut self, id: NodeId, granularity: u32, rng: &mut R) {
        let k = rng.random_range(0..=granularity);
        let node = self.at_mut(id);
        node.set_phase((f64::from(k) * TAU / f64::from(granularity)).rem_euclid(TAU));
        let visible = node.is_active() && node.kind().uses_phase();
        self.changed |= visible;
    }
}
