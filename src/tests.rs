#[cfg(test)]
mod tests {
    use std::collections::HashMap;
    use std::num::NonZero;

    use pretty_assertions::assert_eq;
    use varisat::{Lit, Var};

    use crate::backend::DecisionProcedure;
    use crate::interchange::{palette_from_json, palette_to_json, walls_from_json, walls_to_json, InterchangeError};
    use crate::{Color, ColoringSolver, Edge, Graph, Palette, SolverConfig, SolverFailure, WallSystem};

    const RED: Color = Color::rgb(230, 57, 70);
    const GREEN: Color = Color::rgb(42, 157, 143);
    const BLUE: Color = Color::rgb(69, 123, 157);
    const GOLD: Color = Color::rgb(233, 196, 106);

    fn cap(n: u32) -> NonZero<u32> {
        NonZero::new(n).unwrap()
    }

    fn rgb_palette(max_usage: u32) -> Palette {
        Palette::new()
            .with(RED, cap(max_usage), "red")
            .with(GREEN, cap(max_usage), "green")
            .with(BLUE, cap(max_usage), "blue")
    }

    fn triangle(palette: Palette) -> Graph {
        let mut graph = Graph::with_palette(palette);
        let ids = (0..3).map(|_| graph.add_node().id()).collect::<Vec<_>>();
        graph.add_edge(ids[0], ids[1]);
        graph.add_edge(ids[1], ids[2]);
        graph.add_edge(ids[2], ids[0]);
        graph
    }

    /// Check every solved graph against adjacency, usage limits and pins.
    fn assert_valid(graph: &Graph, solution: &crate::Solution) {
        let assignment = solution.assignment().expect("solution should be satisfiable");
        assert_eq!(assignment.len(), graph.node_count());

        for edge in graph.edges() {
            let (u, v) = edge.endpoints();
            assert_ne!(assignment[&u], assignment[&v], "edge {u}-{v} shares a color");
        }

        let mut usage: HashMap<Color, u32> = HashMap::new();
        for color in assignment.values() {
            *usage.entry(*color).or_default() += 1;
        }
        for (color, count) in usage {
            let limit: u32 = graph.palette().iter()
                .filter(|constraint| constraint.color == color)
                .map(|constraint| constraint.max_usage.get())
                .sum();
            assert!(count <= limit, "{color} used {count} times, limit {limit}");
        }

        for node in graph.nodes() {
            if let Some(pinned) = node.pinned_color().filter(|c| graph.palette().slot_of(c).is_some()) {
                assert!(assignment[&node.id()].same_rgb(&pinned));
            }
        }
    }

    #[test]
    fn node_ids_never_reused() {
        let mut graph = Graph::new();
        let a = graph.add_node().id();
        let b = graph.add_node().id();
        graph.remove_node(b);
        let c = graph.add_node().id();

        assert_eq!((a, b, c), (0, 1, 2));
        assert_eq!(graph.node_count(), 2);
        assert!(graph.node(b).is_none());
    }

    #[test]
    fn edges_are_unordered_and_idempotent() {
        let mut graph = Graph::new();
        let a = graph.add_node().id();
        let b = graph.add_node().id();

        assert_eq!(Edge::new(a, b), Edge::new(b, a));
        assert_eq!(graph.add_edge(a, b), Some(Edge::new(a, b)));
        assert_eq!(graph.add_edge(b, a), None);
        assert_eq!(graph.add_edge(a, b), None);
        assert_eq!(graph.edge_count(), 1);

        assert!(graph.remove_edge(Edge::new(b, a)));
        assert!(!graph.remove_edge(Edge::new(a, b)));
        assert_eq!(graph.edge_count(), 0);
    }

    #[test]
    fn structural_violations_are_no_ops() {
        let mut graph = Graph::new();
        let a = graph.add_node().id();

        assert_eq!(graph.add_edge(a, a), None);
        assert_eq!(graph.add_edge(a, 42), None);
        assert_eq!(graph.remove_node(42), None);
        assert_eq!(graph.edge_count(), 0);
        assert!(graph.neighbors(42).is_empty());
    }

    #[test]
    fn removing_node_removes_incident_edges() {
        let mut graph = triangle(rgb_palette(1));
        let mut neighbors = graph.neighbors(0);
        neighbors.sort();
        assert_eq!(neighbors, vec![1, 2]);

        graph.remove_node(1);
        assert_eq!(graph.edge_count(), 1);
        assert!(graph.contains_edge(2, 0));
        assert_eq!(graph.neighbors(0), vec![2]);
    }

    #[test]
    fn pin_requires_color() {
        let mut graph = Graph::new();
        let a = graph.add_node().id();

        graph.pin(a, RED);
        assert_eq!(graph.node(a).unwrap().pinned_color(), Some(RED));

        graph.assign(a, None);
        assert!(!graph.node(a).unwrap().is_fixed());

        graph.pin(a, GREEN);
        graph.unpin(a);
        let node = graph.node(a).unwrap();
        assert_eq!((node.assigned_color(), node.is_fixed()), (Some(GREEN), false));
    }

    #[test]
    fn derived_edge_counts() {
        let mut walls = WallSystem::new();
        for count in [3, 2, 4] {
            walls.add_wall(count);
        }
        let graph = walls.derive_graph(Palette::new());

        assert_eq!(graph.node_count(), 9);
        // C(3, 2) + C(2, 2) + C(4, 2) within walls, 3 * 2 + 2 * 4 between neighbors
        assert_eq!(graph.edge_count(), 10 + 6 + 8);

        let node_of = |wall: usize, route: usize| walls.wall(wall).unwrap().routes()[route].node().unwrap();
        assert!(graph.contains_edge(node_of(0, 0), node_of(0, 2)));
        assert!(graph.contains_edge(node_of(0, 1), node_of(1, 1)));
        assert!(graph.contains_edge(node_of(2, 3), node_of(1, 0)));
        for a in 0..3 {
            for b in 0..4 {
                assert!(!graph.contains_edge(node_of(0, a), node_of(2, b)));
            }
        }
    }

    #[test]
    fn single_wall_and_empty_walls() {
        let mut walls = WallSystem::new();
        walls.add_wall(1);
        walls.add_wall(0);
        walls.add_wall(2);
        let graph = walls.derive_graph(Palette::new());

        // the empty middle wall separates the other two
        assert_eq!(graph.node_count(), 3);
        assert_eq!(graph.edge_count(), 1);
    }

    #[test]
    fn wall_moves_restamp_indices() {
        let mut walls = WallSystem::new();
        let first = walls.add_wall(2).unwrap().routes()[0].id();
        walls.add_wall(1);
        walls.add_wall(3);

        assert!(walls.move_wall_right(0));
        assert!(!walls.move_wall_right(2));
        assert!(!walls.move_wall_left(0));
        assert_eq!(walls.route(first).unwrap().wall_index(), 1);

        assert!(walls.move_wall_left(2));
        assert_eq!(walls.walls().iter().map(|w| w.routes().len()).collect::<Vec<_>>(), vec![1, 3, 2]);
        assert_eq!(walls.route(first).unwrap().wall_index(), 2);

        walls.remove_wall(0);
        for (index, wall) in walls.walls().iter().enumerate() {
            assert_eq!(wall.index(), index);
            for (position, route) in wall.routes().iter().enumerate() {
                assert_eq!((route.wall_index(), route.route_index()), (index, position));
            }
        }
        assert_eq!(walls.route(first).unwrap().display_name(), "W1R0");
        assert!(walls.remove_wall(5).is_none());
    }

    #[test]
    fn route_ids_are_global_and_monotonic() {
        let mut walls = WallSystem::new();
        walls.add_wall(2);
        walls.add_wall(2);

        let removed = walls.remove_route(0).unwrap().id();
        let added = walls.add_route(0).unwrap().id();
        assert_eq!((removed, added), (1, 4));
        assert_eq!(walls.wall(1).unwrap().routes().len(), 2);
        assert!(walls.add_route(7).is_none());

        walls.clear();
        assert_eq!(walls.add_wall(1).unwrap().routes()[0].id(), 0);
    }

    #[test]
    fn remove_last_wall_keeps_the_rest() {
        let mut walls = WallSystem::new();
        walls.add_wall(1);
        walls.add_wall(3);

        let removed = walls.remove_last_wall().unwrap();
        assert_eq!((removed.index(), removed.routes().len()), (1, 3));
        assert_eq!(walls.walls().len(), 1);
        assert_eq!(walls.route(0).unwrap().display_name(), "W0R0");
        assert!(walls.route(1).is_none());

        // removed ids stay retired
        assert_eq!(walls.add_route(0).unwrap().id(), 4);

        walls.remove_last_wall();
        assert!(walls.remove_last_wall().is_none());
    }

    #[test]
    fn sync_round_trips_through_graph() {
        let mut walls = WallSystem::new();
        let id = walls.add_wall(2).unwrap().routes()[1].id();
        let mut graph = walls.derive_graph(rgb_palette(1));

        let node = walls.route(id).unwrap().node().unwrap();
        graph.pin(node, BLUE);
        walls.sync_from_graph(&graph);
        let route = walls.route(id).unwrap();
        assert_eq!((route.assigned_color(), route.is_fixed()), (Some(BLUE), true));

        walls.set_route_color(id, Some(GOLD), false);
        walls.push_to_graph(&mut graph);
        assert_eq!(graph.node(node).unwrap().assigned_color(), Some(GOLD));
        assert!(!graph.node(node).unwrap().is_fixed());
    }

    #[test]
    fn sync_ignores_foreign_graph() {
        let mut walls = WallSystem::new();
        walls.add_wall(2);
        walls.derive_graph(rgb_palette(1));

        // same node ids, but not the graph the routes were derived into
        let mut other = Graph::new();
        for _ in 0..2 {
            let id = other.add_node().id();
            other.pin(id, RED);
        }
        walls.sync_from_graph(&other);
        assert!(walls.routes().all(|route| route.assigned_color().is_none()));
    }

    #[test]
    fn derive_carries_route_colors() {
        let mut walls = WallSystem::new();
        let id = walls.add_wall(1).unwrap().routes()[0].id();
        walls.set_route_color(id, Some(GREEN), true);

        let graph = walls.derive_graph(rgb_palette(1));
        let node = graph.node(walls.route(id).unwrap().node().unwrap()).unwrap();
        assert_eq!(node.pinned_color(), Some(GREEN));
    }

    #[test]
    fn triangle_needs_three_colors() {
        let graph = triangle(Palette::new().with(RED, cap(3), "red").with(GREEN, cap(3), "green"));
        let solution = graph.solve();

        assert!(!solution.is_satisfiable());
        assert_eq!(solution.failure(), Some(&SolverFailure::Infeasible));
        assert_eq!(solution.diagnostic().as_deref(), Some("no valid coloring exists under current constraints"));
    }

    #[test]
    fn triangle_uses_each_color_once() {
        let graph = triangle(rgb_palette(1));
        let solution = graph.solve();

        assert_valid(&graph, &solution);
        let mut colors = solution.assignment().unwrap().values().copied().collect::<Vec<_>>();
        colors.sort();
        let mut expected = vec![RED, GREEN, BLUE];
        expected.sort();
        assert_eq!(colors, expected);
    }

    #[test]
    fn pinned_slot_pushes_neighbor_away() {
        let mut graph = Graph::with_palette(Palette::new().with(RED, cap(1), "red").with(GREEN, cap(5), "green"));
        let a = graph.add_node().id();
        let b = graph.add_node().id();
        graph.add_edge(a, b);
        graph.pin(a, RED);

        let solution = graph.solve();
        assert_valid(&graph, &solution);
        assert_eq!(solution.color_of(a), Some(RED));
        assert_eq!(solution.color_of(b), Some(GREEN));
    }

    #[test]
    fn pin_matches_on_rgb_only() {
        let mut graph = Graph::with_palette(rgb_palette(1));
        let a = graph.add_node().id();
        graph.pin(a, Color::rgba(BLUE.r, BLUE.g, BLUE.b, 10));

        assert_eq!(graph.solve().color_of(a), Some(BLUE));
    }

    #[test]
    fn pin_outside_palette_is_dropped() {
        let mut graph = Graph::with_palette(Palette::new().with(RED, cap(1), "red"));
        let a = graph.add_node().id();
        graph.pin(a, GOLD);

        let solution = graph.solve();
        assert_eq!(solution.color_of(a), Some(RED));

        // the pin itself survives; applying the solution leaves pinned nodes alone
        assert_eq!(graph.apply_solution(&solution), 0);
        assert_eq!(graph.node(a).unwrap().pinned_color(), Some(GOLD));
    }

    #[test]
    fn conflicting_pins_are_infeasible() {
        let mut graph = triangle(rgb_palette(3));
        graph.pin(0, RED);
        graph.pin(2, RED);

        assert_eq!(graph.solve().failure(), Some(&SolverFailure::Infeasible));
    }

    #[test]
    fn usage_limits_are_per_slot() {
        let mut graph = Graph::with_palette(Palette::new().with(RED, cap(1), "red").with(BLUE, cap(2), "blue"));
        for _ in 0..3 {
            graph.add_node();
        }
        let solution = graph.solve();
        assert_valid(&graph, &solution);

        graph.add_node();
        assert!(!graph.solve().is_satisfiable());

        // a second slot of the same color brings its own limit
        graph.palette_mut().push(crate::ColorConstraint::new(RED, cap(1), "red again"));
        let solution = graph.solve();
        assert_valid(&graph, &solution);
        let reds = solution.assignment().unwrap().values().filter(|c| **c == RED).count();
        assert_eq!(reds, 2);
    }

    #[test]
    fn empty_palette_is_infeasible() {
        let mut graph = Graph::new();
        graph.add_node();

        assert_eq!(graph.solve().failure(), Some(&SolverFailure::Infeasible));
    }

    #[test]
    fn empty_graph_is_trivially_satisfiable() {
        let graph = Graph::new();
        let solution = graph.solve();

        assert!(solution.is_satisfiable());
        assert!(solution.assignment().unwrap().is_empty());
        assert_eq!(ColoringSolver::from(&graph).solve(), Ok(Default::default()));
    }

    #[test]
    fn exceeding_budget_is_indeterminate() {
        let graph = triangle(rgb_palette(1));
        let solution = graph.solve_with(&SolverConfig::new().with_max_variables(4));

        assert!(!solution.is_satisfiable());
        assert!(matches!(solution.failure(), Some(SolverFailure::Indeterminate { .. })));
        assert_ne!(solution.diagnostic(), triangle(Palette::new()).solve().diagnostic());
    }

    struct Undecided {
        vars: usize,
    }

    impl DecisionProcedure for Undecided {
        type Lit = Lit;

        fn new_lit(&mut self) -> Lit {
            self.vars += 1;
            Var::from_index(self.vars - 1).positive()
        }

        fn add_clause(&mut self, _clause: &[Lit]) {}

        fn check(&mut self) -> Result<bool, String> {
            Err(String::from("out of time"))
        }

        fn value(&self, _lit: Lit) -> Option<bool> {
            None
        }
    }

    #[test]
    fn undecided_backend_is_indeterminate() {
        let graph = triangle(rgb_palette(1));
        let result = ColoringSolver::new(&graph, &SolverConfig::default()).solve_using(Undecided { vars: 0 });

        assert_eq!(result, Err(SolverFailure::Indeterminate { reason: String::from("out of time") }));
    }

    #[test]
    fn apply_and_clear_solution() {
        let mut graph = triangle(rgb_palette(1));
        graph.pin(0, RED);

        let solution = graph.solve();
        assert_eq!(graph.apply_solution(&solution), 2);
        assert!(graph.nodes().all(|node| node.assigned_color().is_some()));

        graph.clear_solution();
        assert_eq!(graph.nodes().filter_map(|node| node.assigned_color()).collect::<Vec<_>>(), vec![RED]);
    }

    #[test]
    fn walls_solve_end_to_end() {
        let mut walls = WallSystem::new();
        for count in [3, 2, 4] {
            walls.add_wall(count);
        }
        let pinned = walls.wall(1).unwrap().routes()[0].id();
        walls.set_route_color(pinned, Some(GOLD), true);

        // walls 1 and 2 together hold six routes that must all differ
        let palette = rgb_palette(2)
            .with(GOLD, cap(2), "gold")
            .with(Color::rgb(0, 0, 0), cap(2), "black")
            .with(Color::rgb(255, 255, 255), cap(2), "white");
        let graph = walls.clone().derive_graph(palette.clone());
        let solution = walls.solve(palette, &SolverConfig::default());

        assert_valid(&graph, &solution);
        assert!(walls.routes().all(|route| route.assigned_color().is_some()));
        assert_eq!(walls.route(pinned).unwrap().assigned_color(), Some(GOLD));
        assert!(walls.route(pinned).unwrap().is_fixed());
    }

    #[test]
    fn palette_document_round_trip() {
        let palette = rgb_palette(2).with(Color::rgba(1, 2, 3, 4), cap(7), "translucent");
        let json = palette_to_json(&palette).unwrap();

        assert!(json.contains("\"maxUsage\": 7"));
        assert_eq!(palette_from_json(&json).unwrap(), palette);
    }

    #[test]
    fn palette_document_rejects_zero_usage() {
        let json = r#"{ "colors": [ { "color": { "r": 1, "g": 2, "b": 3 }, "name": "none", "maxUsage": 0 } ] }"#;
        assert!(matches!(palette_from_json(json), Err(InterchangeError::ZeroUsage { name }) if name == "none"));
        assert!(matches!(palette_from_json("{ \"colors\": 3 }"), Err(InterchangeError::Json(_))));
    }

    #[test]
    fn wall_document_round_trip() {
        let mut walls = WallSystem::new();
        walls.add_wall(2);
        walls.add_wall(3);
        walls.remove_route(1);
        walls.set_route_color(0, Some(RED), true);
        walls.set_route_color(3, Some(Color::rgba(9, 8, 7, 6)), false);

        let json = walls_to_json(&walls).unwrap();
        assert!(json.contains("\"displayName\": \"W1R1\""));

        let mut loaded = walls_from_json(&json).unwrap();
        assert_eq!(loaded.routes().cloned().collect::<Vec<_>>(), walls.routes().cloned().collect::<Vec<_>>());
        // ids resume after the largest one loaded
        assert_eq!(loaded.add_route(0).unwrap().id(), 4);
    }

    #[test]
    fn wall_document_is_validated() {
        let duplicate = r#"{ "walls": [
            { "index": 0, "routes": [ { "id": 3, "wallIndex": 0, "routeIndex": 0, "isFixed": false } ] },
            { "index": 1, "routes": [ { "id": 3, "wallIndex": 1, "routeIndex": 0, "isFixed": false } ] } ] }"#;
        assert!(matches!(walls_from_json(duplicate), Err(InterchangeError::DuplicateRoute { id: 3 })));

        let fixed = r#"{ "walls": [ { "index": 0, "routes": [ { "id": 0, "wallIndex": 0, "routeIndex": 0, "isFixed": true } ] } ] }"#;
        assert!(matches!(walls_from_json(fixed), Err(InterchangeError::FixedWithoutColor { id: 0 })));

        // stored indices disagree with document order; order wins
        let shuffled = r#"{ "walls": [
            { "index": 4, "routes": [ { "id": 0, "wallIndex": 4, "routeIndex": 2 } ] },
            { "index": 1, "routes": [ { "id": 1, "wallIndex": 0, "routeIndex": 0 }, { "id": 2, "wallIndex": 9, "routeIndex": 9 } ] } ] }"#;
        let loaded = walls_from_json(shuffled).unwrap();
        assert_eq!(loaded.route(0).unwrap().display_name(), "W0R0");
        assert_eq!(loaded.route(2).unwrap().display_name(), "W1R1");
    }

    #[test]
    fn route_ids_do_not_overflow() {
        let document = |id: usize| format!(r#"{{ "walls": [ {{ "index": 0, "routes": [ {{ "id": {id}, "wallIndex": 0, "routeIndex": 0 }} ] }} ] }}"#);
        assert!(matches!(walls_from_json(&document(usize::MAX)), Err(InterchangeError::RouteIdOverflow { id: usize::MAX })));

        let mut walls = walls_from_json(&document(usize::MAX - 1)).unwrap();
        assert!(walls.add_route(0).is_none());
        assert!(walls.add_wall(1).is_none());
        assert_eq!(walls.walls().len(), 1);

        // an empty wall needs no ids
        assert!(walls.add_wall(0).is_some());
    }

    #[cfg(feature = "wasm")]
    #[test]
    fn solve_walls_colors_every_route() {
        let mut walls = WallSystem::new();
        walls.add_wall(2);
        walls.add_wall(1);
        let palette_json = palette_to_json(&rgb_palette(1)).unwrap();
        let walls_json = walls_to_json(&walls).unwrap();

        let solved = walls_from_json(&crate::wasm::solve_walls(&palette_json, &walls_json).unwrap()).unwrap();
        assert_eq!(solved.routes().count(), 3);
        assert!(solved.routes().all(|route| route.assigned_color().is_some()));
        assert_ne!(solved.route(0).unwrap().assigned_color(), solved.route(1).unwrap().assigned_color());
    }
}
