use itertools::Itertools;
use log::debug;

use crate::color::{Color, Palette};
use crate::config::SolverConfig;
use crate::graph::Graph;
use crate::node::{Node, NodeId};
use crate::solver::Solution;

/// Identity of a route, unique across every wall of a [`WallSystem`].
pub type RouteId = usize;

/// Graph generation and node id a route was last derived into.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub(crate) struct NodeKey {
    pub(crate) generation: u64,
    pub(crate) node: NodeId,
}

impl NodeKey {
    fn resolve<'g>(&self, graph: &'g Graph) -> Option<&'g Node> {
        (self.generation == graph.generation).then(|| graph.node(self.node)).flatten()
    }
}

/// A placement on a wall, colored through the node derived from it.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Route {
    pub(crate) id: RouteId,
    pub(crate) wall_index: usize,
    pub(crate) route_index: usize,
    pub(crate) assigned_color: Option<Color>,
    pub(crate) fixed: bool,
    // key into the most recently derived graph; stale once that graph is replaced
    pub(crate) node: Option<NodeKey>,
}

impl Route {
    pub(crate) fn new(id: RouteId, wall_index: usize, route_index: usize) -> Self {
        Self {
            id,
            wall_index,
            route_index,
            assigned_color: None,
            fixed: false,
            node: None,
        }
    }

    pub fn id(&self) -> RouteId {
        self.id
    }

    pub fn wall_index(&self) -> usize {
        self.wall_index
    }

    /// Position of this route within its wall.
    pub fn route_index(&self) -> usize {
        self.route_index
    }

    pub fn assigned_color(&self) -> Option<Color> {
        self.assigned_color
    }

    pub fn is_fixed(&self) -> bool {
        self.fixed
    }

    /// The node this route became in the last [`WallSystem::derive_graph`], if any.
    pub fn node(&self) -> Option<NodeId> {
        self.node.map(|key| key.node)
    }

    /// Short label such as `W0R2`.
    pub fn display_name(&self) -> String {
        format!("W{}R{}", self.wall_index, self.route_index)
    }

    pub(crate) fn set_state(&mut self, color: Option<Color>, fixed: bool) {
        self.assigned_color = color;
        self.fixed = fixed && color.is_some();
    }
}

/// A group of routes placed close together. Routes on one wall must all differ in color.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Wall {
    pub(crate) index: usize,
    pub(crate) routes: Vec<Route>,
}

impl Wall {
    pub fn index(&self) -> usize {
        self.index
    }

    pub fn routes(&self) -> &[Route] {
        &self.routes
    }
}

/// An ordered row of walls, from which a constraint [`Graph`] is derived.
///
/// # Adjacency
/// Routes on the same wall are pairwise connected.
/// Every route on wall `k` is connected to every route on wall `k + 1`.
/// Walls further apart than that share no edges.
#[derive(Clone, Debug, Default)]
pub struct WallSystem {
    pub(crate) walls: Vec<Wall>,
    pub(crate) next_route_id: RouteId,
}

impl WallSystem {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn walls(&self) -> &[Wall] {
        &self.walls
    }

    pub fn wall(&self, index: usize) -> Option<&Wall> {
        self.walls.get(index)
    }

    pub fn len(&self) -> usize {
        self.walls.len()
    }

    pub fn is_empty(&self) -> bool {
        self.walls.is_empty()
    }

    /// Every route, wall by wall.
    pub fn routes(&self) -> impl Iterator<Item = &Route> {
        self.walls.iter().flat_map(|wall| wall.routes.iter())
    }

    pub fn route(&self, id: RouteId) -> Option<&Route> {
        self.routes().find(|route| route.id == id)
    }

    pub(crate) fn route_mut(&mut self, id: RouteId) -> Option<&mut Route> {
        self.walls.iter_mut()
            .flat_map(|wall| wall.routes.iter_mut())
            .find(|route| route.id == id)
    }

    /// Reserve `count` consecutive route ids, or `None` once the id space is used up.
    fn fresh_route_ids(&mut self, count: usize) -> Option<std::ops::Range<RouteId>> {
        let start = self.next_route_id;
        self.next_route_id = start.checked_add(count)?;
        Some(start..self.next_route_id)
    }

    /// Append a wall holding `route_count` new routes.
    ///
    /// Returns `None`, adding nothing, if there are not enough unused route ids left.
    pub fn add_wall(&mut self, route_count: usize) -> Option<&Wall> {
        let index = self.walls.len();
        let routes = self.fresh_route_ids(route_count)?
            .enumerate()
            .map(|(route_index, id)| Route::new(id, index, route_index))
            .collect_vec();

        self.walls.push(Wall { index, routes });
        self.walls.last()
    }

    /// Remove the wall at `index`, renumbering the walls after it.
    pub fn remove_wall(&mut self, index: usize) -> Option<Wall> {
        if index >= self.walls.len() {
            return None;
        }
        let removed = self.walls.remove(index);
        self.restamp();
        Some(removed)
    }

    /// Remove the last wall. No other wall moves, so nothing is renumbered.
    pub fn remove_last_wall(&mut self) -> Option<Wall> {
        self.walls.pop()
    }

    /// Swap the wall at `index` with its left neighbor. Does nothing for the first wall.
    pub fn move_wall_left(&mut self, index: usize) -> bool {
        if index == 0 || index >= self.walls.len() {
            return false;
        }
        self.walls.swap(index - 1, index);
        self.restamp();
        true
    }

    /// Swap the wall at `index` with its right neighbor. Does nothing for the last wall.
    pub fn move_wall_right(&mut self, index: usize) -> bool {
        if index + 1 >= self.walls.len() {
            return false;
        }
        self.walls.swap(index, index + 1);
        self.restamp();
        true
    }

    /// Drop every wall and start route ids from zero again.
    pub fn clear(&mut self) {
        self.walls.clear();
        self.next_route_id = 0;
    }

    /// Append a new route to the wall at `wall_index`.
    ///
    /// Returns `None` if there is no such wall or no unused route id is left.
    pub fn add_route(&mut self, wall_index: usize) -> Option<&Route> {
        if wall_index >= self.walls.len() {
            return None;
        }
        let id = self.fresh_route_ids(1)?.start;
        let wall = &mut self.walls[wall_index];
        wall.routes.push(Route::new(id, wall_index, wall.routes.len()));
        wall.routes.last()
    }

    /// Remove the last route of the wall at `wall_index`. Its id is not handed out again.
    pub fn remove_route(&mut self, wall_index: usize) -> Option<Route> {
        self.walls.get_mut(wall_index)?.routes.pop()
    }

    /// Set the color of a route; `fixed` only holds together with a color.
    pub fn set_route_color(&mut self, id: RouteId, color: Option<Color>, fixed: bool) -> bool {
        match self.route_mut(id) {
            None => false,
            Some(route) => {
                route.set_state(color, fixed);
                true
            }
        }
    }

    // wall order is the only source of truth for indices
    pub(crate) fn restamp(&mut self) {
        for (index, wall) in self.walls.iter_mut().enumerate() {
            wall.index = index;
            for (route_index, route) in wall.routes.iter_mut().enumerate() {
                route.wall_index = index;
                route.route_index = route_index;
            }
        }
    }

    /// Build a brand-new [`Graph`] with one node per route, colored from `palette`.
    ///
    /// Each route keeps its color and pin on its node, and remembers the node for [`Self::sync_from_graph`].
    pub fn derive_graph(&mut self, palette: Palette) -> Graph {
        let mut graph = Graph::with_palette(palette);

        let node_ids = self.walls.iter_mut()
            .map(|wall| wall.routes.iter_mut()
                .map(|route| {
                    let id = graph.add_node().id();
                    graph.set_node_state(id, route.assigned_color, route.fixed);
                    route.node = Some(NodeKey { generation: graph.generation, node: id });
                    id
                })
                .collect_vec())
            .collect_vec();

        // complete graph on each wall
        for wall in &node_ids {
            for (a, b) in wall.iter().tuple_combinations() {
                graph.add_edge(*a, *b);
            }
        }

        // complete bipartite graph between each pair of neighboring walls
        for (left, right) in node_ids.iter().tuple_windows() {
            for (a, b) in left.iter().cartesian_product(right) {
                graph.add_edge(*a, *b);
            }
        }

        debug!("derived {} nodes and {} edges from {} walls", graph.node_count(), graph.edge_count(), self.walls.len());
        graph
    }

    /// Copy node colors back onto routes.
    ///
    /// Routes whose node is not in `graph`, including every route when `graph` was not derived from this system, are left as they are.
    pub fn sync_from_graph(&mut self, graph: &Graph) {
        for route in self.walls.iter_mut().flat_map(|wall| wall.routes.iter_mut()) {
            if let Some(node) = route.node.and_then(|key| key.resolve(graph)) {
                route.set_state(node.assigned_color(), node.is_fixed());
            }
        }
    }

    /// Copy route colors onto their nodes in `graph`, the inverse of [`Self::sync_from_graph`].
    pub fn push_to_graph(&self, graph: &mut Graph) {
        for route in self.routes() {
            if let Some(key) = route.node.filter(|key| key.generation == graph.generation) {
                graph.set_node_state(key.node, route.assigned_color, route.fixed);
            }
        }
    }

    /// Derive a graph, solve it, and copy the result back onto the routes.
    ///
    /// Pinned routes keep their colors; on failure no route changes.
    pub fn solve(&mut self, palette: Palette, config: &SolverConfig) -> Solution {
        let mut graph = self.derive_graph(palette);
        let solution = graph.solve_with(config);
        if graph.apply_solution(&solution) > 0 {
            self.sync_from_graph(&graph);
        }
        solution
    }
}
