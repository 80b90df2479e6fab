use std::collections::BTreeMap;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::str::FromStr;
use std::sync::Arc;

use crate::error::PuzzleError;
use crate::graph::{Action, State};

pub const DEFAULT_CAPACITY: usize = 4;

/// Three colors in five tubes; solvable.
pub const DEMO_LAYOUT: &str = "RRGY\nYGYG\nRRYG\n....\n....";

/// One unit of colored liquid. Colors are opaque labels compared by their
/// exact text, so `R`, `r` and `赤` are three different colors.
#[derive(Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Debug)]
pub struct Color {
    label: Arc<str>,
}

impl Color {
    /// Any non-empty label without whitespace, `,` or `.`, which the text
    /// layout reserves.
    pub fn from_label(label: &str) -> Result<Self, PuzzleError> {
        let reserved = |ch: char| ch.is_whitespace() || ch == ',' || ch == '.';
        if label.is_empty() || label.chars().any(reserved) {
            return Err(PuzzleError::InvalidColorLabel(label.to_string()));
        }
        Ok(Color {
            label: Arc::from(label),
        })
    }

    /// Letter label for the `index`-th generated color: A, ..., Z, AA, AB, ...
    pub fn from_index(index: usize) -> Self {
        let mut letters = Vec::new();
        let mut id = index;
        loop {
            letters.push((b'A' + (id % 26) as u8) as char);
            if id < 26 {
                break;
            }
            id = id / 26 - 1;
        }
        let label: String = letters.iter().rev().collect();
        Color {
            label: Arc::from(label),
        }
    }

    pub fn get_label(&self) -> &str {
        &self.label
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.label)
    }
}

impl FromStr for Color {
    type Err = PuzzleError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Color::from_label(s)
    }
}

/// A stack of units, bottom first. Capacity is owned by the puzzle, not the tube.
#[derive(Clone, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Tube {
    units: Vec<Color>,
}

impl Tube {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_units(units: Vec<Color>) -> Self {
        Tube { units }
    }

    /// Parses one tube of the text layout. Returns the tube and its slot count.
    fn new_from_repr(repr: &str, index: usize) -> Result<(Self, usize), PuzzleError> {
        let tokens: Vec<String> = if repr.contains(',') {
            let repr = repr.strip_suffix(',').unwrap_or(repr);
            repr.split(',').map(|t| t.trim().to_string()).collect()
        } else {
            repr.chars().map(|ch| ch.to_string()).collect()
        };

        let mut units = Vec::new();
        let mut saw_empty_slot = false;
        for token in &tokens {
            if token.is_empty() || token == "." {
                saw_empty_slot = true;
                continue;
            }
            if saw_empty_slot {
                return Err(PuzzleError::FloatingUnit { index });
            }
            units.push(Color::from_label(token)?);
        }
        Ok((Tube { units }, tokens.len()))
    }

    pub fn get_units(&self) -> &[Color] {
        &self.units
    }

    pub fn len(&self) -> usize {
        self.units.len()
    }

    pub fn is_empty(&self) -> bool {
        self.units.is_empty()
    }

    pub fn is_full(&self, capacity: usize) -> bool {
        self.units.len() >= capacity
    }

    pub fn is_uniform(&self) -> bool {
        self.units.windows(2).all(|w| w[0] == w[1])
    }

    pub fn get_empty_space(&self, capacity: usize) -> usize {
        capacity.saturating_sub(self.units.len())
    }

    pub fn get_top_color(&self) -> Option<&Color> {
        self.units.last()
    }

    /// Length of the run of same-colored units at the top.
    pub fn get_top_run_depth(&self) -> usize {
        let Some(top) = self.get_top_color() else {
            return 0;
        };
        self.units.iter().rev().take_while(|&c| c == top).count()
    }

    /// How many units a pour from `self` into `other` moves; 0 when the pour
    /// is not allowed.
    pub fn get_pourable_amount(&self, other: &Tube, capacity: usize) -> usize {
        if self.is_empty() || other.is_full(capacity) {
            return 0;
        }
        if !other.is_empty() && self.get_top_color() != other.get_top_color() {
            return 0;
        }
        self.get_top_run_depth().min(other.get_empty_space(capacity))
    }

    fn slot_labels(&self, capacity: usize) -> Vec<String> {
        let mut repr: Vec<String> = self.units.iter().map(Color::to_string).collect();
        while repr.len() < capacity {
            repr.push(".".to_string());
        }
        repr
    }
}

/// Pour the top run of tube `from` into tube `to`.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct PourAction {
    pub from: usize,
    pub to: usize,
}

impl PourAction {
    pub fn new(from: usize, to: usize) -> Self {
        PourAction { from, to }
    }

    /// The pour in the opposite direction.
    pub fn reversed(&self) -> Self {
        PourAction::new(self.to, self.from)
    }
}

impl fmt::Display for PourAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Pour tube {} into tube {}", self.from, self.to)
    }
}

impl Action for PourAction {}

/// A puzzle configuration: tubes in index order plus the capacity shared by
/// every tube.
///
/// Equality and hashing ignore tube order: two states holding the same
/// multiset of tubes are the same state. The capacity is not part of the
/// identity. Display keeps index order.
#[derive(Clone, Debug)]
pub struct PuzzleState {
    tubes: Vec<Tube>,
    capacity: usize,
}

impl PuzzleState {
    pub fn new(tubes: Vec<Tube>, capacity: usize) -> Result<Self, PuzzleError> {
        if capacity == 0 {
            return Err(PuzzleError::ZeroCapacity);
        }
        if let Some((index, tube)) = tubes.iter().enumerate().find(|(_, t)| t.len() > capacity) {
            return Err(PuzzleError::OverfullTube {
                index,
                len: tube.len(),
                capacity,
            });
        }
        Ok(PuzzleState { tubes, capacity })
    }

    pub fn with_default_capacity(tubes: Vec<Tube>) -> Result<Self, PuzzleError> {
        Self::new(tubes, DEFAULT_CAPACITY)
    }

    /// Builds a state from color labels, each tube listed bottom to top.
    pub fn from_labels(layout: &[&[&str]], capacity: usize) -> Result<Self, PuzzleError> {
        let tubes = layout
            .iter()
            .map(|labels| {
                labels
                    .iter()
                    .map(|label| Color::from_label(label))
                    .collect::<Result<Vec<_>, _>>()
                    .map(Tube::from_units)
            })
            .collect::<Result<Vec<_>, _>>()?;
        Self::new(tubes, capacity)
    }

    /// Parses the text layout: one tube per line, bottom slot first, `.` for
    /// an empty slot. Slots are single characters, or comma separated when a
    /// line contains a comma. Every line must have the same number of slots,
    /// which becomes the capacity.
    pub fn new_from_repr(repr: &str) -> Result<Self, PuzzleError> {
        let mut tubes = Vec::new();
        let mut capacity = None;
        for (index, line) in repr.lines().map(str::trim).filter(|l| !l.is_empty()).enumerate() {
            let (tube, slots) = Tube::new_from_repr(line, index)?;
            match capacity {
                None => capacity = Some(slots),
                Some(expected) if expected != slots => {
                    return Err(PuzzleError::RaggedLayout {
                        index,
                        found: slots,
                        expected,
                    });
                }
                Some(_) => {}
            }
            tubes.push(tube);
        }
        let capacity = capacity.ok_or(PuzzleError::EmptyLayout)?;
        Self::new(tubes, capacity)
    }

    /// Inverse of [`PuzzleState::new_from_repr`].
    pub fn get_text_representation(&self) -> String {
        let has_multi_char = self
            .tubes
            .iter()
            .flat_map(|t| t.get_units())
            .any(|c| c.get_label().chars().count() > 1);
        let lines: Vec<String> = self
            .tubes
            .iter()
            .map(|tube| {
                let slots = tube.slot_labels(self.capacity);
                if !has_multi_char {
                    slots.concat()
                } else if slots.len() == 1 {
                    // A lone slot needs the separator to be read back as one token.
                    format!("{},", slots[0])
                } else {
                    slots.join(",")
                }
            })
            .collect();
        lines.join("\n")
    }

    pub fn get_tubes(&self) -> &[Tube] {
        &self.tubes
    }

    pub fn get_tube(&self, index: usize) -> Option<&Tube> {
        self.tubes.get(index)
    }

    pub fn get_capacity(&self) -> usize {
        self.capacity
    }

    /// Units moved by `action`, or 0 when it is not legal here.
    pub fn get_pourable_amount(&self, action: &PourAction) -> usize {
        if !self.is_valid_action(action) {
            return 0;
        }
        self.tubes[action.from].get_pourable_amount(&self.tubes[action.to], self.capacity)
    }

    /// Number of units of each color present.
    pub fn get_color_counts(&self) -> BTreeMap<Color, usize> {
        let mut counts = BTreeMap::new();
        for color in self.tubes.iter().flat_map(|t| t.get_units()) {
            *counts.entry(color.clone()).or_insert(0) += 1;
        }
        counts
    }

    fn canonical_tubes(&self) -> Vec<&Tube> {
        let mut sorted: Vec<&Tube> = self.tubes.iter().collect();
        sorted.sort();
        sorted
    }
}

impl PartialEq for PuzzleState {
    fn eq(&self, other: &Self) -> bool {
        self.tubes.len() == other.tubes.len() && self.canonical_tubes() == other.canonical_tubes()
    }
}

impl Eq for PuzzleState {}

impl Hash for PuzzleState {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.canonical_tubes().hash(state);
    }
}

impl fmt::Display for PuzzleState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, tube) in self.tubes.iter().enumerate() {
            if i > 0 {
                writeln!(f)?;
            }
            if tube.is_empty() {
                write!(f, "Tube {i}: [empty]")?;
            } else {
                let labels: Vec<&str> = tube.get_units().iter().map(Color::get_label).collect();
                write!(f, "Tube {i}: [{}]", labels.join(","))?;
            }
        }
        Ok(())
    }
}

impl State for PuzzleState {
    type Action = PourAction;
    type Error = PuzzleError;

    fn possible_actions(&self) -> Vec<PourAction> {
        let mut actions = Vec::new();
        for from in 0..self.tubes.len() {
            for to in 0..self.tubes.len() {
                if from == to {
                    continue;
                }
                let action = PourAction::new(from, to);
                if self.is_valid_action(&action) {
                    actions.push(action);
                }
            }
        }
        actions
    }

    /// Every tube is empty, or full of a single color.
    fn is_goal(&self) -> bool {
        self.tubes
            .iter()
            .all(|t| t.is_empty() || (t.len() == self.capacity && t.is_uniform()))
    }

    fn apply_action(&self, action: &PourAction) -> Result<Self, PuzzleError> {
        if !self.is_valid_action(action) {
            return Err(PuzzleError::InvalidAction {
                from: action.from,
                to: action.to,
            });
        }
        let amount =
            self.tubes[action.from].get_pourable_amount(&self.tubes[action.to], self.capacity);

        let mut tubes = self.tubes.clone();
        let source = &mut tubes[action.from].units;
        let start = source.len() - amount;
        let poured: Vec<Color> = source.drain(start..).collect();
        tubes[action.to].units.extend(poured);

        Ok(PuzzleState {
            tubes,
            capacity: self.capacity,
        })
    }

    fn is_valid_action(&self, action: &PourAction) -> bool {
        let (Some(source), Some(destination)) =
            (self.tubes.get(action.from), self.tubes.get(action.to))
        else {
            return false;
        };
        if source.is_empty() || destination.is_full(self.capacity) {
            return false;
        }
        if !destination.is_empty() && destination.get_top_color() != source.get_top_color() {
            return false;
        }
        true
    }
}
