//! Exhaustive depth-first search with a global visited set.

use std::collections::HashSet;

use macroquad::prelude::debug;

use crate::graph::State;

/// A state on the solution path and the action that produced it. The first
/// step of a path has no action.
pub type PathStep<S> = (S, Option<<S as State>::Action>);

enum Visit {
    Goal,
    Expanded,
    Pruned,
}

/// Depth-first searcher over any [`State`] implementation.
///
/// A state is explored at most once per [`DfsSearcher::search`] call: once it
/// has been entered it stays in the visited set even after the branch through
/// it is abandoned. The first goal reached wins; the returned path is not
/// necessarily the shortest one.
pub struct DfsSearcher<S: State> {
    initial_state: S,
    visited_states: HashSet<S>,
    path_to_goal: Vec<PathStep<S>>,
}

impl<S: State> DfsSearcher<S> {
    pub fn new(initial_state: S) -> Self {
        Self {
            initial_state,
            visited_states: HashSet::new(),
            path_to_goal: Vec::new(),
        }
    }

    /// Searches from the initial state, optionally bounded to `max_depth`
    /// actions. Returns `Ok(true)` if a goal was reached, in which case
    /// [`DfsSearcher::solution`] holds the path from the initial state to the
    /// goal. Results of a previous call are discarded first.
    ///
    /// # Errors
    ///
    /// Propagates the first error returned by [`State::apply_action`]. The
    /// solution is empty afterwards.
    pub fn search(&mut self, max_depth: Option<usize>) -> Result<bool, S::Error> {
        self.visited_states.clear();
        self.path_to_goal.clear();
        debug!("Starting depth-first search (max depth: {:?})", max_depth);

        let result = self.explore(max_depth);
        match &result {
            Ok(found) => debug!(
                "Search finished: goal found = {}, {} states visited, path length {}",
                found,
                self.visited_states.len(),
                self.path_to_goal.len()
            ),
            Err(_) => self.path_to_goal.clear(),
        }
        result
    }

    /// Iterative form of the recursive backtracking walk. `frames[d]` holds the
    /// untried actions of `path_to_goal[d]`, so both stacks grow and shrink
    /// together.
    fn explore(&mut self, max_depth: Option<usize>) -> Result<bool, S::Error> {
        let mut frames: Vec<std::vec::IntoIter<S::Action>> = Vec::new();
        match self.visit(self.initial_state.clone(), None, 0, max_depth, &mut frames) {
            Visit::Goal => return Ok(true),
            Visit::Pruned => return Ok(false),
            Visit::Expanded => {}
        }

        while let Some(actions) = frames.last_mut() {
            let Some(action) = actions.next() else {
                // Dead end: drop it from the path but keep it marked visited.
                frames.pop();
                self.path_to_goal.pop();
                continue;
            };
            let depth = frames.len();
            let Some((parent, _)) = self.path_to_goal.last() else {
                break;
            };
            let next_state = parent.apply_action(&action)?;
            if let Visit::Goal = self.visit(next_state, Some(action), depth, max_depth, &mut frames)
            {
                return Ok(true);
            }
        }
        Ok(false)
    }

    fn visit(
        &mut self,
        state: S,
        action: Option<S::Action>,
        depth: usize,
        max_depth: Option<usize>,
        frames: &mut Vec<std::vec::IntoIter<S::Action>>,
    ) -> Visit {
        if self.visited_states.contains(&state) {
            return Visit::Pruned;
        }
        self.visited_states.insert(state.clone());

        if state.is_goal() {
            self.path_to_goal.push((state, action));
            return Visit::Goal;
        }
        if max_depth.is_some_and(|limit| depth >= limit) {
            return Visit::Pruned;
        }
        frames.push(state.possible_actions().into_iter());
        self.path_to_goal.push((state, action));
        Visit::Expanded
    }

    /// The path found by the most recent successful search, root first.
    /// Empty before the first search and after an unsuccessful one.
    pub fn solution(&self) -> &[PathStep<S>] {
        &self.path_to_goal
    }

    /// Every distinct state entered by the most recent search.
    pub fn visited_states(&self) -> &HashSet<S> {
        &self.visited_states
    }

    pub fn visited_count(&self) -> usize {
        self.visited_states.len()
    }

    pub fn initial_state(&self) -> &S {
        &self.initial_state
    }
}
