#![warn(missing_docs)]

//! # `vermilion`
//!
//! A solver for graph coloring under usage limits: every node gets one color from a palette,
//! adjacent nodes never share a color, each palette entry may be used only so many times,
//! and some nodes may be pinned to a color up front.
//!
//! Build a [`Graph`] by hand, or lay out walls of routes in a [`WallSystem`] and let it derive the graph.
//! Give the graph a [`Palette`], then call [`solve()`](Graph::solve) to get a [`Solution`].
//!
//! # Internals
//! The problem is expressed as Boolean satisfiability, handed to a decision procedure, and the model read back as colors.
//!
//! For node `n` and palette slot `c` a variable `x[n, c]` states that `n` has the color of `c`. We assert:
//! 1. Every node has exactly one slot, using the pairwise encoding of "at most one".
//! 2. For every edge `(u, v)` and every slot `c`, not both `x[u, c]` and `x[v, c]`.
//! 3. For every slot `c` with limit `m`, at most `m` nodes have `x[_, c]`, lowered to clauses with a sequential counter.
//! 4. Every pinned node whose color is in the palette has the variable for the first slot of that color.
//!
//! Slots, not colors, are what get assigned: two palette entries of the same color are separate slots with separate limits.
//! The decision procedure sits behind [`DecisionProcedure`](backend::DecisionProcedure); [`varisat`] is used by default.
//!
//! A [`WallSystem`] connects every pair of routes on one wall and every route on a wall to every route on the walls beside it.

pub use color::{Color, ColorConstraint, Palette, Slot};
pub use config::SolverConfig;
pub use graph::Graph;
pub use node::{Edge, Node, NodeId};
pub use solver::{Assignment, ColoringSolver, Solution, SolverFailure};
pub use walls::{Route, RouteId, Wall, WallSystem};

pub mod backend;
pub(crate) mod color;
pub(crate) mod config;
pub(crate) mod graph;
pub mod interchange;
pub(crate) mod logic;
pub(crate) mod node;
pub(crate) mod solver;
mod tests;
pub(crate) mod walls;
#[cfg(feature = "wasm")]
pub mod wasm;
