// src/graph/activity.rs

//! Live-node analysis and the complexity bound.
//!
//! Both sweeps walk the grid from the outputs back to the inputs. Since
//! every edge runs forward, visiting layers in descending order reaches
//! everything upstream of an output in a single pass.

use std::collections::BTreeSet;

use super::CircuitGraph;
use crate::core::{EdgePointer, NodeId};

impl CircuitGraph {
    /// Recomputes the `active` flag of every non-output node.
    ///
    /// A node is active when some path of edges leads from it to an output.
    /// Output nodes are always active.
    pub fn active_pass(&mut self) {
        let outputs = self.output_layer();
        for layer in &mut self.grid[..outputs] {
            for node in layer {
                node.set_active(false);
            }
        }

        for l in (1..=outputs).rev() {
            for i in 0..self.grid[l].len() {
                let node = &self.grid[l][i];
                if !node.is_active() {
                    continue;
                }
                let sources: Vec<NodeId> = node.inputs().iter().flatten().map(EdgePointer::node).collect();
                for source in sources {
                    self.at_mut(source).set_active(true);
                }
            }
        }
    }

    /// Largest number of live edges crossing any layer boundary.
    ///
    /// Starts from the edges entering the outputs and, layer by layer, swaps
    /// the edges leaving that layer for the edges entering its reached nodes.
    /// Edges that skip layers are counted at every boundary they cross.
    pub fn active_edge_width(&self) -> usize {
        let mut frontier: Vec<EdgePointer> =
            self.grid[self.output_layer()].iter().flat_map(|n| n.inputs().iter().flatten().copied()).collect();
        let mut widest = frontier.len();

        for l in (0..self.output_layer()).rev() {
            let (here, mut rest): (Vec<EdgePointer>, Vec<EdgePointer>) =
                frontier.into_iter().partition(|p| p.layer == l);
            let reached: BTreeSet<NodeId> = here.iter().map(EdgePointer::node).collect();
            for id in reached {
                rest.extend(self.at(id).inputs().iter().flatten().copied());
            }
            frontier = rest;
            widest = widest.max(frontier.len());
        }
        widest
    }

    /// True when no layer boundary carries more live edges than the bound allows.
    pub fn check_complexity(&self) -> bool {
        self.active_edge_width() <= self.shape.complexity_bound
    }

    /// Number of circuit inputs with no path to an output.
    pub fn count_inactive_inputs(&self) -> f64 {
        self.grid[0].iter().filter(|n| !n.is_active()).count() as f64
    }
}
