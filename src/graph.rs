//! Capabilities a domain must provide to be explored by [`crate::dfs::DfsSearcher`].

use std::fmt::{Debug, Display};
use std::hash::Hash;

/// One transition between states. Equal actions must hash identically.
pub trait Action: Clone + Eq + Hash + Display + Debug {}

/// One configuration of the search space.
///
/// States are values: [`State::apply_action`] returns a new state and never
/// touches the receiver. Equality and hashing define which states the
/// searcher treats as already visited.
pub trait State: Clone + Eq + Hash + Display + Debug {
    type Action: Action;
    type Error: std::error::Error;

    /// Every action legal from this state. The searcher tries them in the
    /// order returned.
    fn possible_actions(&self) -> Vec<Self::Action>;

    fn is_goal(&self) -> bool;

    /// Returns the successor state, or an error when `action` is not valid here.
    fn apply_action(&self, action: &Self::Action) -> Result<Self, Self::Error>;

    fn is_valid_action(&self, action: &Self::Action) -> bool;
}
