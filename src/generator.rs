use rand::Rng;
use rand::seq::SliceRandom;

use crate::error::PuzzleError;
use crate::model::{Color, PuzzleState, Tube};

/// Deals `capacity` units of each of `colors` colors (labelled `A`, `B`, ...),
/// shuffled, into `colors` full tubes, then appends `empty_tubes` empty ones.
pub fn generate<R: Rng + ?Sized>(
    colors: usize,
    empty_tubes: usize,
    capacity: usize,
    rng: &mut R,
) -> Result<PuzzleState, PuzzleError> {
    if capacity == 0 {
        return Err(PuzzleError::ZeroCapacity);
    }
    let mut units: Vec<Color> = (0..colors)
        .flat_map(|color_id| std::iter::repeat_n(Color::from_index(color_id), capacity))
        .collect();
    units.shuffle(rng);

    let mut tubes: Vec<Tube> = units
        .chunks(capacity)
        .map(|chunk| Tube::from_units(chunk.to_vec()))
        .collect();
    tubes.extend(std::iter::repeat_with(Tube::new).take(empty_tubes));
    PuzzleState::new(tubes, capacity)
}
