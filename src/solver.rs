use std::collections::BTreeMap;

use itertools::Itertools;
use log::{debug, info, warn};
use thiserror::Error;

use crate::backend::{DecisionProcedure, VarisatBackend};
use crate::color::{Color, Slot};
use crate::config::SolverConfig;
use crate::graph::Graph;
use crate::logic::{at_most_size, exactly_one};
use crate::node::{Node, NodeId};

/// Colors chosen for each node, keyed by node id.
pub type Assignment = BTreeMap<NodeId, Color>;

/// Reasons a [`ColoringSolver`] may fail.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum SolverFailure {
    /// The decision procedure proved that no coloring satisfies the constraints.
    #[error("no valid coloring exists under current constraints")]
    Infeasible,
    /// The decision procedure could not decide, or the encoding exceeded the [`SolverConfig`] budget.
    #[error("solver could not determine satisfiability: {reason}")]
    Indeterminate { reason: String },
    /// The model returned by the decision procedure did not select a slot for some node.
    /// This should probably never happen.
    #[error("solver model selects no color for node {node}")]
    NoColorFound { node: NodeId },
}

/// Outcome of solving a [`Graph`]: a complete assignment, or the reason there is none.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Solution {
    outcome: Result<Assignment, SolverFailure>,
}

impl Solution {
    pub(crate) fn empty() -> Self {
        Self { outcome: Ok(Assignment::new()) }
    }

    pub fn is_satisfiable(&self) -> bool {
        self.outcome.is_ok()
    }

    /// The color of every node, only present when satisfiable.
    pub fn assignment(&self) -> Option<&Assignment> {
        self.outcome.as_ref().ok()
    }

    pub fn color_of(&self, node: NodeId) -> Option<Color> {
        self.assignment().and_then(|assignment| assignment.get(&node).copied())
    }

    pub fn failure(&self) -> Option<&SolverFailure> {
        self.outcome.as_ref().err()
    }

    /// Human readable explanation of a failed solve.
    pub fn diagnostic(&self) -> Option<String> {
        self.failure().map(ToString::to_string)
    }
}

impl From<Result<Assignment, SolverFailure>> for Solution {
    fn from(outcome: Result<Assignment, SolverFailure>) -> Self {
        Self { outcome }
    }
}

/// Encodes a [`Graph`] coloring problem as boolean satisfiability and decodes the answer.
/// Use [`Self::solve`] to attempt to find a solution.
///
/// The solver borrows the graph for its whole lifetime; all decision procedure state is created and dropped inside each call.
pub struct ColoringSolver<'a> {
    graph: &'a Graph,
    config: SolverConfig,
    // node order for the encoding; ascending id
    nodes: Vec<&'a Node>,
}

impl<'a> From<&'a Graph> for ColoringSolver<'a> {
    fn from(graph: &'a Graph) -> Self {
        Self::new(graph, &SolverConfig::default())
    }
}

impl<'a> ColoringSolver<'a> {
    pub fn new(graph: &'a Graph, config: &SolverConfig) -> Self {
        Self {
            graph,
            config: *config,
            nodes: graph.nodes().collect_vec(),
        }
    }

    #[inline]
    fn num_slots(&self) -> usize {
        self.graph.palette().len()
    }

    /// The slot a pinned node is held to, or `None` if it is unpinned or pinned to a color missing from the palette.
    fn pinned_slot(&self, node: &Node) -> Option<Slot> {
        let color = node.pinned_color()?;
        let slot = self.graph.palette().slot_of(&color);
        if slot.is_none() {
            warn!("node {} is pinned to {color}, which is not in the palette; leaving it unconstrained", node.id());
        }
        slot
    }

    /// Variables and clauses the encoding will produce; pins are counted as if all resolve.
    fn encoding_size(&self) -> (usize, usize) {
        let (n, c) = (self.nodes.len(), self.num_slots());

        let mut variables = n * c;
        let mut clauses = n * (c * c.saturating_sub(1) / 2 + 1)
            + self.graph.edge_count() * c
            + self.nodes.iter().filter(|node| node.is_fixed()).count();

        for constraint in self.graph.palette() {
            let (aux_vars, aux_clauses) = at_most_size(n, constraint.max_usage.get() as usize);
            variables += aux_vars;
            clauses += aux_clauses;
        }

        (variables, clauses)
    }

    /// Solve with the [`varisat`] back end.
    pub fn solve(&self) -> Result<Assignment, SolverFailure> {
        self.solve_using(VarisatBackend::default())
    }

    /// Solve the coloring problem, returning [`Ok`] with the color of every node or [`Err`] with a [`SolverFailure`] reason.
    ///
    /// # Logical setup
    /// Let `x[n, c]` be true iff node `n` takes the color of palette slot `c`.
    ///
    /// ## Nodes
    /// Every node has exactly one slot: at least one of its `x[n, _]` is true and no two are.
    /// With an empty palette the "at least one" clause is empty, so any graph with a node is infeasible.
    ///
    /// A pinned node whose color appears in the palette is held to the first slot with that RGB value by a unit clause.
    /// If the color is nowhere in the palette the pin is dropped and the node is free.
    ///
    /// ## Edges
    /// For every edge `(u, v)` and slot `c`, `x[u, c]` and `x[v, c]` are not both true.
    ///
    /// ## Slots
    /// Slot `c` with cap `m` has at most `m` true variables among `x[_, c]`.
    pub fn solve_using<B: DecisionProcedure>(&self, mut backend: B) -> Result<Assignment, SolverFailure> {
        if self.nodes.is_empty() {
            return Ok(Assignment::new());
        }

        let (variables, clauses) = self.encoding_size();
        debug!("encoding {} nodes over {} slots: {variables} variables, {clauses} clauses", self.nodes.len(), self.num_slots());
        if variables > self.config.max_variables || clauses > self.config.max_clauses {
            return Err(SolverFailure::Indeterminate {
                reason: format!(
                    "encoding needs {variables} variables and {clauses} clauses, over the budget of {} and {}",
                    self.config.max_variables, self.config.max_clauses,
                ),
            });
        }

        let slot_vars = self.nodes.iter()
            .map(|_| self.graph.palette().slots().map(|_| backend.new_lit()).collect_vec())
            .collect_vec();
        let position: BTreeMap<NodeId, usize> = self.nodes.iter()
            .enumerate()
            .map(|(i, node)| (node.id(), i))
            .collect();

        for (node, vars) in self.nodes.iter().zip(&slot_vars) {
            for clause in exactly_one(vars.clone()) {
                backend.add_clause(&clause);
            }

            if let Some(slot) = self.pinned_slot(node) {
                backend.add_clause(&[vars[slot]]);
            }
        }

        for edge in self.graph.edges() {
            let (u, v) = edge.endpoints();
            let (Some(&u), Some(&v)) = (position.get(&u), position.get(&v)) else {
                continue;
            };
            for slot in self.graph.palette().slots() {
                backend.add_clause(&[!slot_vars[u][slot], !slot_vars[v][slot]]);
            }
        }

        for (slot, constraint) in self.graph.palette().iter().enumerate() {
            let column = slot_vars.iter().map(|vars| vars[slot]).collect_vec();
            backend.add_at_most(&column, constraint.max_usage.get() as usize);
        }

        match backend.check() {
            Ok(true) => {}
            Ok(false) => {
                info!("no coloring of {} nodes exists", self.nodes.len());
                return Err(SolverFailure::Infeasible);
            }
            Err(reason) => {
                info!("solver gave up: {reason}");
                return Err(SolverFailure::Indeterminate { reason });
            }
        }

        let mut assignment = Assignment::new();
        for (node, vars) in self.nodes.iter().zip(&slot_vars) {
            let color = vars.iter()
                .position(|var| backend.value(*var) == Some(true))
                .and_then(|slot| self.graph.palette().get(slot))
                .map(|constraint| constraint.color)
                .ok_or(SolverFailure::NoColorFound { node: node.id() })?;
            assignment.insert(node.id(), color);
        }

        info!("colored {} nodes with {} slots", assignment.len(), self.num_slots());
        Ok(assignment)
    }
}
