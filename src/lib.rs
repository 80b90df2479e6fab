//! Depth-first solver for the liquid sorting puzzle.
//!
//! [`graph`] defines the state/action capabilities, [`dfs`] searches any
//! implementation of them, and [`model`] is the puzzle itself. [`solver`],
//! [`generator`] and [`renderer`] serve the binaries.

pub mod dfs;
pub mod error;
pub mod generator;
pub mod graph;
pub mod model;
pub mod renderer;
pub mod solver;

pub use dfs::{DfsSearcher, PathStep};
pub use error::PuzzleError;
pub use graph::{Action, State};
pub use model::{Color, PourAction, PuzzleState, Tube, DEFAULT_CAPACITY, DEMO_LAYOUT};
