use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PuzzleError {
    /// A pour that fails the legality check for the state it was applied to.
    #[error("cannot pour from tube {from} into tube {to}")]
    InvalidAction { from: usize, to: usize },
    #[error("tube capacity must be at least 1")]
    ZeroCapacity,
    #[error("tube {index} holds {len} units but the capacity is {capacity}")]
    OverfullTube {
        index: usize,
        len: usize,
        capacity: usize,
    },
    #[error("invalid color label {0:?}")]
    InvalidColorLabel(String),
    #[error("tube {index} has an empty slot below a unit")]
    FloatingUnit { index: usize },
    #[error("tube {index} has {found} slots, expected {expected}")]
    RaggedLayout {
        index: usize,
        found: usize,
        expected: usize,
    },
    #[error("layout contains no tubes")]
    EmptyLayout,
    #[error("the solver thread stopped without a result")]
    SolverStopped,
}
