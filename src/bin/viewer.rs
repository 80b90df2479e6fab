use clipboard_rs::{Clipboard, ClipboardContext};
use macroquad::prelude::*;

use water_sort_dfs::generator::generate;
use water_sort_dfs::renderer::Renderer;
use water_sort_dfs::solver::{PendingSolve, SolveReport, Solver};
use water_sort_dfs::{DEFAULT_CAPACITY, DEMO_LAYOUT, PuzzleState};

const HELP: &str = "Left/Right: step   Home/End: first/last   C: copy   V: paste   G: random";

/// A puzzle, its solve (running or finished) and the step currently on screen.
struct Playback {
    initial_state: PuzzleState,
    pending: Option<PendingSolve>,
    report: Option<SolveReport>,
    cursor: usize,
}

impl Playback {
    fn solve(initial_state: PuzzleState) -> Self {
        let pending = PendingSolve::spawn(Solver::new(initial_state.clone()));
        Self {
            initial_state,
            pending: Some(pending),
            report: None,
            cursor: 0,
        }
    }

    /// Picks up the solver result once it is ready.
    fn update(&mut self) {
        let Some(result) = self.pending.as_ref().and_then(PendingSolve::poll) else {
            return;
        };
        self.pending = None;
        match result {
            Ok(report) => {
                info!(
                    "Solved: {:?} steps, {} states visited",
                    report.step_count(),
                    report.visited_states
                );
                self.report = Some(report);
            }
            Err(e) => warn!("Search failed: {}", e),
        }
    }

    fn step_count(&self) -> usize {
        self.report
            .as_ref()
            .and_then(SolveReport::step_count)
            .unwrap_or(0)
    }

    fn current_state(&self) -> &PuzzleState {
        self.report
            .as_ref()
            .and_then(|r| r.solution.as_ref())
            .and_then(|path| path.get(self.cursor))
            .map_or(&self.initial_state, |(state, _)| state)
    }

    fn move_cursor(&mut self, delta: isize) {
        self.cursor = self.cursor.saturating_add_signed(delta).min(self.step_count());
    }

    fn title(&self) -> String {
        if self.pending.is_some() {
            return "Solving...".to_string();
        }
        let Some(report) = &self.report else {
            return "Search failed".to_string();
        };
        match &report.solution {
            None if report.pruned_by_precheck => "Unsolvable: colors do not fill whole tubes".to_string(),
            None => "No solution found".to_string(),
            Some(path) => match path.get(self.cursor).and_then(|(_, action)| *action) {
                None => format!("Initial state ({} steps to solve)", self.step_count()),
                Some(action) => format!("Step {}/{}: {}", self.cursor, self.step_count(), action),
            },
        }
    }

    fn status(&self) -> String {
        let visited = self.report.as_ref().map_or(0, |r| r.visited_states);
        format!("{visited} states visited   {HELP}")
    }
}

fn get_clipboard() -> Option<String> {
    let ctx = ClipboardContext::new()
        .map_err(|e| warn!("Clipboard unavailable: {}", e))
        .ok()?;
    ctx.get_text().ok()
}

fn set_clipboard(content: &str) {
    match ClipboardContext::new() {
        Ok(ctx) => {
            if let Err(e) = ctx.set_text(content.to_string()) {
                warn!("Could not copy to clipboard: {}", e);
            }
        }
        Err(e) => warn!("Clipboard unavailable: {}", e),
    }
}

#[macroquad::main("Water Sort DFS Viewer")]
async fn main() {
    let initial_state = match PuzzleState::new_from_repr(DEMO_LAYOUT) {
        Ok(state) => state,
        Err(e) => {
            error!("Invalid demo layout: {}", e);
            return;
        }
    };
    let mut playback = Playback::solve(initial_state);
    let mut renderer = Renderer::new();

    loop {
        playback.update();
        if is_key_pressed(KeyCode::Right) {
            playback.move_cursor(1);
        }
        if is_key_pressed(KeyCode::Left) {
            playback.move_cursor(-1);
        }
        if is_key_pressed(KeyCode::Home) {
            playback.cursor = 0;
        }
        if is_key_pressed(KeyCode::End) {
            playback.cursor = playback.step_count();
        }
        if is_key_pressed(KeyCode::C) {
            set_clipboard(&playback.current_state().get_text_representation());
        }
        if is_key_pressed(KeyCode::V)
            && let Some(text) = get_clipboard()
        {
            match PuzzleState::new_from_repr(&text) {
                Ok(state) => playback = Playback::solve(state),
                Err(e) => warn!("Clipboard does not hold a puzzle layout: {}", e),
            }
        }
        if is_key_pressed(KeyCode::G) {
            match generate(4, 2, DEFAULT_CAPACITY, &mut ::rand::rng()) {
                Ok(state) => playback = Playback::solve(state),
                Err(e) => warn!("Could not generate a puzzle: {}", e),
            }
        }

        renderer.autoset_viewport();
        renderer.render_step(playback.current_state(), &playback.title(), &playback.status());
        next_frame().await;
    }
}
