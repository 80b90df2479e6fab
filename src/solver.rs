use std::sync::mpsc::{self, Receiver, TryRecvError};

use crate::dfs::{DfsSearcher, PathStep};
use crate::error::PuzzleError;
use crate::model::*;
use macroquad::prelude::debug;
use rayon::prelude::*;

pub type SolutionStep = PathStep<PuzzleState>;

#[derive(Clone, Debug)]
pub struct SolveReport {
    /// Root-to-goal path when a goal was found.
    pub solution: Option<Vec<SolutionStep>>,
    pub visited_states: usize,
    /// The color counts alone ruled out a goal, so no search was run.
    pub pruned_by_precheck: bool,
}

impl SolveReport {
    pub fn is_solved(&self) -> bool {
        self.solution.is_some()
    }

    /// Number of pours in the solution.
    pub fn step_count(&self) -> Option<usize> {
        self.solution.as_ref().map(|path| path.len().saturating_sub(1))
    }

    pub fn moves(&self) -> Vec<PourAction> {
        self.solution
            .iter()
            .flatten()
            .filter_map(|(_, action)| *action)
            .collect()
    }
}

pub struct Solver {
    starting_state: PuzzleState,
    max_depth: Option<usize>,
}

impl Solver {
    pub fn new(starting_state: PuzzleState) -> Solver {
        Solver {
            starting_state,
            max_depth: None,
        }
    }

    pub fn with_max_depth(mut self, max_depth: Option<usize>) -> Solver {
        self.max_depth = max_depth;
        self
    }

    pub fn solve(&self) -> Result<SolveReport, PuzzleError> {
        if self.starting_state.is_definitely_unsolvable() {
            debug!("Color counts rule out every goal state, skipping search.");
            return Ok(SolveReport {
                solution: None,
                visited_states: 0,
                pruned_by_precheck: true,
            });
        }
        let mut searcher = DfsSearcher::new(self.starting_state.clone());
        let found = searcher.search(self.max_depth)?;
        Ok(SolveReport {
            solution: found.then(|| searcher.solution().to_vec()),
            visited_states: searcher.visited_count(),
            pruned_by_precheck: false,
        })
    }
}

/// Solves independent puzzles in parallel. Each puzzle gets its own searcher;
/// results are in input order.
pub fn solve_batch(
    states: &[PuzzleState],
    max_depth: Option<usize>,
) -> Vec<Result<SolveReport, PuzzleError>> {
    debug!("Solving a batch of {} puzzles", states.len());
    states
        .par_iter()
        .map(|state| Solver::new(state.clone()).with_max_depth(max_depth).solve())
        .collect()
}

/// A solve running on the rayon pool, for callers that cannot block.
pub struct PendingSolve {
    receiver: Receiver<Result<SolveReport, PuzzleError>>,
}

impl PendingSolve {
    pub fn spawn(solver: Solver) -> PendingSolve {
        let (sender, receiver) = mpsc::channel();
        rayon::spawn(move || {
            // The receiver may already be gone if the caller moved on.
            let _ = sender.send(solver.solve());
        });
        PendingSolve { receiver }
    }

    /// The result once the solve has finished, `None` while it is running.
    pub fn poll(&self) -> Option<Result<SolveReport, PuzzleError>> {
        match self.receiver.try_recv() {
            Ok(result) => Some(result),
            Err(TryRecvError::Empty) => None,
            Err(TryRecvError::Disconnected) => Some(Err(PuzzleError::SolverStopped)),
        }
    }
}

impl PuzzleState {
    /// True when no arrangement of the current units can be a goal state:
    /// a goal needs every color to fill whole tubes exactly, and enough tubes
    /// to hold them. False does not mean a goal is reachable by pours.
    pub fn is_definitely_unsolvable(&self) -> bool {
        let capacity = self.get_capacity();
        let mut tubes_needed = 0;
        for (color, count) in self.get_color_counts() {
            if count % capacity != 0 {
                debug!(
                    "Color {} has {} units, not a multiple of capacity {}.",
                    color, count, capacity
                );
                return true;
            }
            tubes_needed += count / capacity;
        }
        tubes_needed > self.get_tubes().len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::State;

    fn demo_state() -> PuzzleState {
        PuzzleState::from_labels(
            &[
                &["R", "R", "G", "Y"],
                &["Y", "G", "Y", "G"],
                &["R", "R", "Y", "G"],
                &[],
                &[],
            ],
            DEFAULT_CAPACITY,
        )
        .unwrap()
    }

    #[test]
    fn solves_demo_puzzle() {
        let report = Solver::new(demo_state()).solve().unwrap();
        assert!(report.is_solved());
        assert!(!report.pruned_by_precheck);
        assert!(report.step_count().unwrap() > 0);
        assert_eq!(report.moves().len(), report.step_count().unwrap());
        let path = report.solution.as_ref().unwrap();
        assert!(path.last().unwrap().0.is_goal());
        assert!(report.visited_states >= path.len());
    }

    #[test]
    fn precheck_rejects_uneven_color_counts() {
        let state = PuzzleState::from_labels(&[&["R", "R", "B"], &["B"], &[]], 3).unwrap();
        assert!(state.is_definitely_unsolvable());
        let report = Solver::new(state).solve().unwrap();
        assert!(report.pruned_by_precheck);
        assert!(!report.is_solved());
        assert_eq!(report.visited_states, 0);
        assert_eq!(report.step_count(), None);
    }

    #[test]
    fn precheck_accepts_balanced_puzzles() {
        assert!(!demo_state().is_definitely_unsolvable());
        let empty = PuzzleState::from_labels(&[&[], &[]], 4).unwrap();
        assert!(!empty.is_definitely_unsolvable());
    }

    #[test]
    fn depth_bound_is_forwarded_to_the_search() {
        let state = PuzzleState::from_labels(&[&["R", "B"], &["B"], &["R"]], 2).unwrap();
        let unbounded = Solver::new(state.clone()).solve().unwrap();
        assert!(unbounded.is_solved());

        let bounded = Solver::new(state).with_max_depth(Some(0)).solve().unwrap();
        assert!(!bounded.is_solved());
        assert_eq!(bounded.visited_states, 1);
    }

    fn wait_for(pending: &PendingSolve) -> Result<SolveReport, PuzzleError> {
        loop {
            if let Some(result) = pending.poll() {
                return result;
            }
            std::thread::yield_now();
        }
    }

    #[test]
    fn pending_solve_reports_from_the_pool() {
        let pending = PendingSolve::spawn(Solver::new(demo_state()).with_max_depth(Some(20)));
        let report = wait_for(&pending).unwrap();
        assert!(report.is_solved());
        assert_eq!(report.step_count(), Some(11));
    }

    #[test]
    fn batch_results_follow_input_order() {
        let unsolvable = PuzzleState::from_labels(&[&["R", "B"], &[]], 4).unwrap();
        let solved = PuzzleState::from_labels(&[&["R"], &[]], 1).unwrap();
        let results = solve_batch(&[demo_state(), unsolvable, solved], None);
        assert_eq!(results.len(), 3);
        assert!(results[0].as_ref().unwrap().is_solved());
        assert!(results[1].as_ref().unwrap().pruned_by_precheck);
        let third = results[2].as_ref().unwrap();
        assert_eq!(third.step_count(), Some(0));
        assert!(third.moves().is_empty());
    }
}
