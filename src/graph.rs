use std::collections::BTreeMap;
use std::sync::atomic::{AtomicU64, Ordering};

use log::debug;
use petgraph::graphmap::UnGraphMap;

use crate::color::{Color, Palette};
use crate::config::SolverConfig;
use crate::node::{Edge, Node, NodeId};
use crate::solver::{ColoringSolver, Solution};

static NEXT_GENERATION: AtomicU64 = AtomicU64::new(0);

/// A constraint graph: nodes, undirected edges between them, and the palette they are colored from.
///
/// Edges are deduplicated irrespective of direction, and self-loops or edges to nodes outside the graph are refused.
/// Every operation is total: invalid requests leave the graph unchanged.
#[derive(Clone, Debug)]
pub struct Graph {
    pub(crate) structure: UnGraphMap<NodeId, ()>,
    pub(crate) nodes: BTreeMap<NodeId, Node>,
    palette: Palette,
    next_id: NodeId,
    // distinguishes independently built graphs whose node ids overlap; clones share it
    pub(crate) generation: u64,
}

impl Default for Graph {
    fn default() -> Self {
        Self {
            structure: UnGraphMap::new(),
            nodes: BTreeMap::new(),
            palette: Palette::default(),
            next_id: 0,
            generation: NEXT_GENERATION.fetch_add(1, Ordering::Relaxed),
        }
    }
}

impl Graph {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_palette(palette: Palette) -> Self {
        Self { palette, ..Self::default() }
    }

    /// Insert a fresh, uncolored node with the next unused id.
    pub fn add_node(&mut self) -> Node {
        let node = Node::new(self.next_id);
        self.next_id += 1;

        self.structure.add_node(node.id);
        self.nodes.insert(node.id, node);
        node
    }

    /// Remove a node along with every edge touching it. Does nothing if the node is absent.
    pub fn remove_node(&mut self, id: NodeId) -> Option<Node> {
        let removed = self.nodes.remove(&id)?;
        self.structure.remove_node(id);
        Some(removed)
    }

    /// Connect `a` and `b`.
    ///
    /// Returns `None`, leaving the graph as it was, if `a == b`, if either endpoint is not in this graph,
    /// or if the pair is already connected.
    pub fn add_edge(&mut self, a: NodeId, b: NodeId) -> Option<Edge> {
        if a == b {
            debug!("refusing self-loop on node {a}");
            return None;
        }
        if !self.nodes.contains_key(&a) || !self.nodes.contains_key(&b) {
            debug!("refusing edge {a}-{b}: endpoint not in graph");
            return None;
        }
        if self.structure.contains_edge(a, b) {
            return None;
        }

        self.structure.add_edge(a, b, ());
        Some(Edge::new(a, b))
    }

    /// Returns whether an edge was actually removed.
    pub fn remove_edge(&mut self, edge: Edge) -> bool {
        let (a, b) = edge.endpoints();
        self.structure.remove_edge(a, b).is_some()
    }

    pub fn contains_edge(&self, a: NodeId, b: NodeId) -> bool {
        self.structure.contains_edge(a, b)
    }

    /// All nodes sharing an edge with `id`, in no particular order.
    pub fn neighbors(&self, id: NodeId) -> Vec<NodeId> {
        if !self.structure.contains_node(id) {
            return Vec::new();
        }
        self.structure.neighbors(id).collect()
    }

    pub fn node(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(&id)
    }

    /// Nodes in ascending id order.
    pub fn nodes(&self) -> impl Iterator<Item = &Node> {
        self.nodes.values()
    }

    pub fn edges(&self) -> impl Iterator<Item = Edge> + '_ {
        self.structure.all_edges().map(|(a, b, _)| Edge::new(a, b))
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn edge_count(&self) -> usize {
        self.structure.edge_count()
    }

    pub fn palette(&self) -> &Palette {
        &self.palette
    }

    pub fn palette_mut(&mut self) -> &mut Palette {
        &mut self.palette
    }

    pub fn set_palette(&mut self, palette: Palette) {
        self.palette = palette;
    }

    /// Set or clear the color of a node as an unpinned value. Clearing the color also clears any pin.
    ///
    /// Returns `false` if the node is absent.
    pub fn assign(&mut self, id: NodeId, color: Option<Color>) -> bool {
        self.set_node_state(id, color, false)
    }

    /// Pin a node to `color`, making it a hard constraint for the solver.
    pub fn pin(&mut self, id: NodeId, color: Color) -> bool {
        self.set_node_state(id, Some(color), true)
    }

    /// Release a pin, keeping the color as an ordinary assignment.
    pub fn unpin(&mut self, id: NodeId) -> bool {
        match self.nodes.get_mut(&id) {
            None => false,
            Some(node) => {
                node.fixed = false;
                true
            }
        }
    }

    pub(crate) fn set_node_state(&mut self, id: NodeId, color: Option<Color>, fixed: bool) -> bool {
        match self.nodes.get_mut(&id) {
            None => false,
            Some(node) => {
                node.set_state(color, fixed);
                true
            }
        }
    }

    /// Write a satisfiable solution onto the nodes, leaving pinned nodes alone.
    ///
    /// Returns the number of nodes updated; a failed solution updates nothing.
    pub fn apply_solution(&mut self, solution: &Solution) -> usize {
        let Some(assignment) = solution.assignment() else {
            return 0;
        };

        let mut updated = 0;
        for (id, color) in assignment {
            if let Some(node) = self.nodes.get_mut(id) {
                if !node.fixed {
                    node.assigned_color = Some(*color);
                    updated += 1;
                }
            }
        }
        updated
    }

    /// Forget every color that is not pinned.
    pub fn clear_solution(&mut self) {
        self.nodes.values_mut()
            .filter(|node| !node.fixed)
            .for_each(|node| node.assigned_color = None);
    }

    /// Solve with the default [`SolverConfig`].
    pub fn solve(&self) -> Solution {
        self.solve_with(&SolverConfig::default())
    }

    /// Solve the coloring problem this graph currently states. See [`ColoringSolver`].
    pub fn solve_with(&self, config: &SolverConfig) -> Solution {
        if self.nodes.is_empty() {
            return Solution::empty();
        }
        Solution::from(ColoringSolver::new(self, config).solve())
    }
}
