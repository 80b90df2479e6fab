use std::collections::HashSet;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use water_sort_dfs::generator::generate;
use water_sort_dfs::solver::Solver;
use water_sort_dfs::{
    DEFAULT_CAPACITY, DEMO_LAYOUT, DfsSearcher, PourAction, PuzzleError, PuzzleState, State,
};

fn demo() -> PuzzleState {
    PuzzleState::new_from_repr(DEMO_LAYOUT).unwrap()
}

/// Random legal pours from `state`; stops early when nothing is legal.
fn random_walk(state: &PuzzleState, moves: usize, rng: &mut StdRng) -> PuzzleState {
    let mut current = state.clone();
    for _ in 0..moves {
        let actions = current.possible_actions();
        if actions.is_empty() {
            break;
        }
        let action = actions[rng.random_range(0..actions.len())];
        current = current.apply_action(&action).unwrap();
    }
    current
}

/// Reachable, mostly unsolved states with 3 colors in 5 tubes.
fn random_states(seed: u64, count: usize) -> Vec<PuzzleState> {
    let mut rng = StdRng::seed_from_u64(seed);
    (0..count)
        .map(|_| {
            let start = generate(3, 2, DEFAULT_CAPACITY, &mut rng).unwrap();
            let moves = rng.random_range(0..12);
            random_walk(&start, moves, &mut rng)
        })
        .collect()
}

fn assert_valid_path(searcher: &DfsSearcher<PuzzleState>) {
    let path = searcher.solution();
    assert!(!path.is_empty());
    assert_eq!(&path[0].0, searcher.initial_state());
    assert!(path[0].1.is_none());
    assert!(path.last().unwrap().0.is_goal());
    for pair in path.windows(2) {
        let (state, _) = &pair[0];
        let (next, action) = &pair[1];
        let action = action.expect("every step after the first has an action");
        assert!(state.is_valid_action(&action));
        assert_eq!(&state.apply_action(&action).unwrap(), next);
    }
    let distinct: HashSet<&PuzzleState> = path.iter().map(|(s, _)| s).collect();
    assert_eq!(distinct.len(), path.len());
}

#[test]
fn demo_puzzle_is_solved() {
    let mut searcher = DfsSearcher::new(demo());
    assert!(searcher.search(None).unwrap());
    assert_valid_path(&searcher);
    assert_eq!(searcher.solution().len() - 1, 11);
    assert_eq!(searcher.visited_count(), 12);

    let moves: Vec<PourAction> = searcher.solution().iter().filter_map(|(_, a)| *a).collect();
    let expected = [
        (0, 3),
        (0, 4),
        (1, 4),
        (1, 3),
        (1, 4),
        (1, 3),
        (2, 1),
        (1, 4),
        (2, 1),
        (0, 2),
        (1, 3),
    ];
    let expected: Vec<PourAction> = expected.iter().map(|&(f, t)| PourAction::new(f, t)).collect();
    assert_eq!(moves, expected);
}

#[test]
fn demo_puzzle_under_depth_bounds() {
    let mut searcher = DfsSearcher::new(demo());

    assert!(!searcher.search(Some(8)).unwrap());
    assert!(searcher.solution().is_empty());
    assert_eq!(searcher.visited_count(), 163);

    assert!(searcher.search(Some(9)).unwrap());
    assert_eq!(searcher.solution().len(), 10);
    assert_eq!(searcher.visited_count(), 19);
    assert_valid_path(&searcher);

    // Symmetric pours into the two empty tubes lead to one state.
    assert!(!searcher.search(Some(1)).unwrap());
    assert_eq!(searcher.visited_count(), 4);
}

#[test]
fn single_pour_moves_the_unit() {
    let state = PuzzleState::from_labels(&[&["R"], &[]], DEFAULT_CAPACITY).unwrap();
    assert_eq!(state.possible_actions(), vec![PourAction::new(0, 1)]);
    let next = state.apply_action(&PourAction::new(0, 1)).unwrap();
    assert_eq!(next.get_text_representation(), "....\nR...");
    // A lone unit is not a full tube.
    assert!(!next.is_goal());

    let full = PuzzleState::from_labels(&[&["R"], &[]], 1).unwrap();
    let next = full.apply_action(&PourAction::new(0, 1)).unwrap();
    assert!(next.is_goal());
}

#[test]
fn mismatched_tops_cannot_pour() {
    let state = PuzzleState::from_labels(&[&["R", "B"], &["G"]], DEFAULT_CAPACITY).unwrap();
    let action = PourAction::new(0, 1);
    assert!(!state.is_valid_action(&action));
    assert!(state.possible_actions().is_empty());
    assert_eq!(
        state.apply_action(&action),
        Err(PuzzleError::InvalidAction { from: 0, to: 1 })
    );

    let mut searcher = DfsSearcher::new(state);
    assert!(!searcher.search(None).unwrap());
    assert!(searcher.solution().is_empty());
    assert_eq!(searcher.visited_count(), 1);
}

#[test]
fn repeated_searches_are_reproducible() {
    let mut searcher = DfsSearcher::new(demo());
    assert!(searcher.search(None).unwrap());
    let first = searcher.solution().to_vec();
    let visited = searcher.visited_count();
    for _ in 0..3 {
        assert!(searcher.search(None).unwrap());
        assert_eq!(searcher.solution().len(), first.len());
        for ((a, x), (b, y)) in searcher.solution().iter().zip(&first) {
            assert_eq!(a.get_text_representation(), b.get_text_representation());
            assert_eq!(x, y);
        }
        assert_eq!(searcher.visited_count(), visited);
    }
}

#[test]
fn goal_predicate_matches_definition() {
    for state in random_states(11, 200) {
        let capacity = state.get_capacity();
        let expected = state
            .get_tubes()
            .iter()
            .all(|t| {
                let units = t.get_units();
                units.is_empty() || (units.len() == capacity && units.iter().all(|c| *c == units[0]))
            });
        assert_eq!(state.is_goal(), expected, "{state}");
    }
}

#[test]
fn illegal_pours_are_never_offered() {
    for state in random_states(12, 200) {
        let capacity = state.get_capacity();
        let tubes = state.get_tubes();
        let offered = state.possible_actions();
        for from in 0..tubes.len() {
            for to in 0..tubes.len() {
                let action = PourAction::new(from, to);
                let illegal = from == to
                    || tubes[from].is_empty()
                    || tubes[to].len() == capacity
                    || (!tubes[to].is_empty() && tubes[to].get_top_color() != tubes[from].get_top_color());
                assert_eq!(offered.contains(&action), !illegal, "{action} on\n{state}");
                if from != to {
                    assert_eq!(state.is_valid_action(&action), !illegal);
                }
            }
        }
    }
}

#[test]
fn pours_preserve_units_and_other_tubes() {
    for state in random_states(13, 100) {
        for action in state.possible_actions() {
            let amount = state.get_pourable_amount(&action);
            let next = state.apply_action(&action).unwrap();
            assert!(amount >= 1);
            assert_eq!(next.get_color_counts(), state.get_color_counts());
            assert_eq!(next.get_capacity(), state.get_capacity());
            let before = state.get_tubes();
            let after = next.get_tubes();
            assert_eq!(after[action.from].len(), before[action.from].len() - amount);
            assert_eq!(after[action.to].len(), before[action.to].len() + amount);
            for i in (0..before.len()).filter(|&i| i != action.from && i != action.to) {
                assert_eq!(after[i], before[i]);
            }
        }
    }
}

#[test]
fn exact_reverse_pour_restores_the_state() {
    let mut checked = 0;
    for state in random_states(14, 200) {
        for action in state.possible_actions() {
            let amount = state.get_pourable_amount(&action);
            let next = state.apply_action(&action).unwrap();
            let back = action.reversed();
            if next.get_pourable_amount(&back) != amount {
                continue;
            }
            assert_eq!(next.apply_action(&back).unwrap(), state);
            checked += 1;
        }
    }
    assert!(checked > 0);
}

#[test]
fn tube_order_does_not_change_identity() {
    let mut rng = StdRng::seed_from_u64(15);
    for state in random_states(16, 100) {
        let repr = state.get_text_representation();
        let mut layout: Vec<&str> = repr.lines().collect();
        for i in (1..layout.len()).rev() {
            let j = rng.random_range(0..=i);
            layout.swap(i, j);
        }
        let shuffled = PuzzleState::new_from_repr(&layout.join("\n")).unwrap();
        assert_eq!(shuffled, state);
        let set: HashSet<PuzzleState> = [state.clone(), shuffled].into_iter().collect();
        assert_eq!(set.len(), 1);
    }
}

#[test]
fn found_paths_are_valid_and_depth_bounded() {
    for (n, state) in random_states(17, 30).into_iter().enumerate() {
        let mut searcher = DfsSearcher::new(state.clone());
        if searcher.search(None).unwrap() {
            assert_valid_path(&searcher);
        } else {
            assert!(searcher.solution().is_empty());
        }
        assert!(searcher.visited_count() >= searcher.solution().len());

        let bound = n % 6;
        if searcher.search(Some(bound)).unwrap() {
            assert!(searcher.solution().len() <= bound + 1);
            assert_valid_path(&searcher);
        }
    }
}

#[test]
fn solver_agrees_with_searcher() {
    for state in random_states(18, 20) {
        let report = Solver::new(state.clone()).solve().unwrap();
        let mut searcher = DfsSearcher::new(state);
        let found = searcher.search(None).unwrap();
        assert_eq!(report.is_solved(), found);
        assert_eq!(report.visited_states, searcher.visited_count());
    }
}
