use std::fs;
use std::str::FromStr;

use macroquad::prelude::{info, warn};
use rand::SeedableRng;
use rand::rngs::StdRng;

use water_sort_dfs::generator::generate;
use water_sort_dfs::solver::solve_batch;
use water_sort_dfs::{DEFAULT_CAPACITY, DEMO_LAYOUT, DfsSearcher, PuzzleState};

const USAGE: &str = "Usage:
  water_sort_dfs [--max-depth <N>] [--file <PATH>]
  water_sort_dfs batch [--count <N>] [--colors <C>] [--empty <E>] [--capacity <K>] [--seed <S>] [--max-depth <N>]";

fn usage_error(message: &str) -> ! {
    eprintln!("{message}\n\n{USAGE}");
    std::process::exit(2);
}

fn parse_value<T: FromStr>(args: &[String], i: usize) -> T
where
    T::Err: std::fmt::Display,
{
    let flag = &args[i];
    let Some(v) = args.get(i + 1) else {
        usage_error(&format!("{flag} requires a value"));
    };
    match v.parse() {
        Ok(x) => x,
        Err(e) => usage_error(&format!("invalid {flag} {v}: {e}")),
    }
}

fn main() {
    let args: Vec<String> = std::env::args().skip(1).collect();
    match args.first().map(String::as_str) {
        Some("batch") => run_batch(&args[1..]),
        _ => run_single(&args),
    }
}

fn run_single(args: &[String]) {
    let mut max_depth: Option<usize> = None;
    let mut file: Option<String> = None;

    let mut i = 0;
    while i < args.len() {
        match args[i].as_str() {
            "--max-depth" => {
                max_depth = Some(parse_value(args, i));
                i += 2;
            }
            "--file" => {
                file = Some(parse_value(args, i));
                i += 2;
            }
            "-h" | "--help" => {
                println!("{USAGE}");
                return;
            }
            x => usage_error(&format!("Unknown option: {x}")),
        }
    }

    let layout = match &file {
        Some(path) => match fs::read_to_string(path) {
            Ok(text) => text,
            Err(e) => {
                eprintln!("cannot read {path}: {e}");
                std::process::exit(1);
            }
        },
        None => DEMO_LAYOUT.to_string(),
    };
    let initial_state = match PuzzleState::new_from_repr(&layout) {
        Ok(state) => state,
        Err(e) => {
            eprintln!("invalid puzzle layout: {e}");
            std::process::exit(1);
        }
    };

    println!("Initial state:");
    println!("{initial_state}");
    println!();

    let mut searcher = DfsSearcher::new(initial_state);
    let found = match searcher.search(max_depth) {
        Ok(found) => found,
        Err(e) => {
            eprintln!("search failed: {e}");
            std::process::exit(1);
        }
    };

    if found {
        let path = searcher.solution();
        println!("Solution found in {} steps", path.len() - 1);
        println!();
        for (i, (state, action)) in path.iter().enumerate() {
            match action {
                None => println!("Initial state:"),
                Some(action) => {
                    println!("Step {i}:");
                    println!("Action: {action}");
                }
            }
            println!("{state}");
            println!();
        }
    } else {
        println!("No solution found");
    }
    println!("Visited states: {}", searcher.visited_count());
}

#[derive(Debug, PartialEq)]
struct BatchOptions {
    count: usize,
    colors: usize,
    empty: usize,
    capacity: usize,
    seed: u64,
    max_depth: Option<usize>,
}

impl Default for BatchOptions {
    fn default() -> Self {
        BatchOptions {
            count: 8,
            colors: 4,
            empty: 2,
            capacity: DEFAULT_CAPACITY,
            seed: 0,
            max_depth: None,
        }
    }
}

impl BatchOptions {
    /// `None` when help was requested.
    fn parse(args: &[String]) -> Option<BatchOptions> {
        let mut options = BatchOptions::default();
        let mut i = 0;
        while i < args.len() {
            match args[i].as_str() {
                "--count" => options.count = parse_value(args, i),
                "--colors" => options.colors = parse_value(args, i),
                "--empty" => options.empty = parse_value(args, i),
                "--capacity" => options.capacity = parse_value(args, i),
                "--seed" => options.seed = parse_value(args, i),
                "--max-depth" => options.max_depth = Some(parse_value(args, i)),
                "-h" | "--help" => return None,
                x => usage_error(&format!("Unknown option: {x}")),
            }
            i += 2;
        }
        Some(options)
    }
}

fn run_batch(args: &[String]) {
    let Some(BatchOptions {
        count,
        colors,
        empty,
        capacity,
        seed,
        max_depth,
    }) = BatchOptions::parse(args)
    else {
        println!("{USAGE}");
        return;
    };

    let mut puzzles = Vec::with_capacity(count);
    for n in 0..count {
        let mut rng = StdRng::seed_from_u64(seed.wrapping_add(n as u64));
        match generate(colors, empty, capacity, &mut rng) {
            Ok(state) => puzzles.push(state),
            Err(e) => usage_error(&format!("cannot generate puzzle: {e}")),
        }
    }
    info!("Generated {} puzzles, solving in parallel", puzzles.len());

    let mut solved = 0;
    for (n, (puzzle, result)) in puzzles.iter().zip(solve_batch(&puzzles, max_depth)).enumerate() {
        match result {
            Ok(report) => {
                let outcome = match report.step_count() {
                    Some(steps) => {
                        solved += 1;
                        format!("solved in {steps} steps")
                    }
                    None if report.pruned_by_precheck => "unsolvable".to_string(),
                    None => "no solution found".to_string(),
                };
                println!(
                    "#{n}: {outcome}, {} states visited\n{}\n",
                    report.visited_states,
                    puzzle.get_text_representation()
                );
            }
            Err(e) => warn!("Puzzle #{} failed: {}", n, e),
        }
    }
    println!("{solved}/{} puzzles solved", puzzles.len());
}
