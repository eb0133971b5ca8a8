use unordered_pair::UnorderedPair;

use crate::color::Color;

/// Identity of a node within one [`Graph`](crate::Graph). Never reused, even after the node is removed.
pub type NodeId = usize;

/// A colorable unit in the constraint graph.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub struct Node {
    pub(crate) id: NodeId,
    pub(crate) assigned_color: Option<Color>,
    // only ever true while assigned_color is Some
    pub(crate) fixed: bool,
}

impl Node {
    pub(crate) fn new(id: NodeId) -> Self {
        Self { id, assigned_color: None, fixed: false }
    }

    pub fn id(&self) -> NodeId {
        self.id
    }

    pub fn assigned_color(&self) -> Option<Color> {
        self.assigned_color
    }

    /// Whether the assigned color is a hard input constraint rather than a solver output.
    pub fn is_fixed(&self) -> bool {
        self.fixed
    }

    /// The color this node is pinned to, if it is pinned at all.
    pub fn pinned_color(&self) -> Option<Color> {
        self.assigned_color.filter(|_| self.fixed)
    }

    pub(crate) fn set_state(&mut self, color: Option<Color>, fixed: bool) {
        self.assigned_color = color;
        self.fixed = fixed && color.is_some();
    }
}

/// An undirected adjacency constraint. `Edge::new(a, b) == Edge::new(b, a)`.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub struct Edge(pub UnorderedPair<NodeId>);

impl Edge {
    pub fn new(a: NodeId, b: NodeId) -> Self {
        Self(UnorderedPair(a, b))
    }

    pub fn endpoints(&self) -> (NodeId, NodeId) {
        let UnorderedPair(a, b) = self.0;
        (a, b)
    }
}
