use core::ops::Index;
use ndarray::Array2;
use serde::{Deserialize, Serialize};

pub use card::*;
pub use deck::*;
pub use engine::*;
pub use error::*;
pub use observer::*;
pub use save::*;
pub use types::*;

mod card;
mod deck;
mod engine;
mod error;
mod observer;
mod save;
mod types;

/// Bounds accepted by the manual grid-size entry boundary.
pub const MIN_MANUAL_SIZE: Coord = 2;
pub const MAX_MANUAL_SIZE: Coord = 10;

/// Validated grid dimensions: both axes within the manual bounds and an
/// even number of cards overall, so every card can be paired.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct GridSpec {
    rows: Coord,
    cols: Coord,
}

impl GridSpec {
    pub const fn new_unchecked(rows: Coord, cols: Coord) -> Self {
        Self { rows, cols }
    }

    pub fn new(rows: Coord, cols: Coord) -> Result<Self> {
        let in_bounds = |axis| (MIN_MANUAL_SIZE..=MAX_MANUAL_SIZE).contains(&axis);
        if !in_bounds(rows) || !in_bounds(cols) || mult(rows, cols) % 2 != 0 {
            return Err(GameError::InvalidGridSize { rows, cols });
        }
        Ok(Self::new_unchecked(rows, cols))
    }

    pub const fn rows(&self) -> Coord {
        self.rows
    }

    pub const fn cols(&self) -> Coord {
        self.cols
    }

    pub const fn total_cards(&self) -> CardCount {
        mult(self.rows, self.cols)
    }

    pub const fn total_pairs(&self) -> CardCount {
        self.total_cards() / 2
    }
}

/// Owned collection of cards laid out as `rows x cols`.
///
/// The grid is the single source of truth for card state; completion counts
/// and reveal-all sweeps query it directly instead of scanning any wider
/// scope. Traversal order (row-major) is stable and shared with the
/// persistence schema.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Grid {
    cards: Array2<Card>,
}

impl Grid {
    /// Torn-down grid, as left behind by a full engine reset.
    pub fn empty() -> Self {
        let cards = Array2::from_shape_vec((0, 0), Vec::new()).expect("empty shape");
        Self { cards }
    }

    pub fn from_cards(spec: GridSpec, cards: Vec<Card>) -> Result<Self> {
        if cards.len() != usize::from(spec.total_cards()) {
            return Err(GameError::InvalidGridSize {
                rows: spec.rows(),
                cols: spec.cols(),
            });
        }
        let shape = (usize::from(spec.rows()), usize::from(spec.cols()));
        let cards = Array2::from_shape_vec(shape, cards).expect("card count matches grid shape");
        Ok(Self { cards })
    }

    /// Builds the grid from a shuffled deck, one card per assignment slot.
    pub fn from_deck(spec: GridSpec, deck: &Deck) -> Result<Self> {
        let cards = deck
            .ids()
            .iter()
            .map(|&id| {
                let kind = deck.kind_name(id).expect("identity assigned by this deck");
                Card::new(id, kind)
            })
            .collect();
        Self::from_cards(spec, cards)
    }

    pub fn size(&self) -> Coord2 {
        let dim = self.cards.dim();
        (dim.0.try_into().unwrap(), dim.1.try_into().unwrap())
    }

    pub fn rows(&self) -> Coord {
        self.size().0
    }

    pub fn cols(&self) -> Coord {
        self.size().1
    }

    pub fn card_count(&self) -> CardCount {
        self.cards.len().try_into().unwrap()
    }

    pub fn total_pairs(&self) -> CardCount {
        self.card_count() / 2
    }

    pub fn is_empty(&self) -> bool {
        self.cards.is_empty()
    }

    pub fn validate_coords(&self, coords: Coord2) -> Result<Coord2> {
        let size = self.size();
        if coords.0 < size.0 && coords.1 < size.1 {
            Ok(coords)
        } else {
            Err(GameError::InvalidCoords)
        }
    }

    pub fn card_at(&self, coords: Coord2) -> &Card {
        &self.cards[coords.to_nd_index()]
    }

    pub(crate) fn card_at_mut(&mut self, coords: Coord2) -> &mut Card {
        &mut self.cards[coords.to_nd_index()]
    }

    /// Cards in row-major traversal order.
    pub fn iter(&self) -> impl Iterator<Item = &Card> {
        self.cards.iter()
    }

    /// Coordinates in row-major traversal order.
    pub fn coords(&self) -> impl Iterator<Item = Coord2> + use<> {
        let (rows, cols) = self.size();
        (0..rows).flat_map(move |row| (0..cols).map(move |col| (row, col)))
    }
}

impl Index<Coord2> for Grid {
    type Output = Card;

    fn index(&self, coords: Coord2) -> &Self::Output {
        self.card_at(coords)
    }
}

/// What a click did to the engine.
#[derive(Copy, Clone, Debug, PartialEq)]
pub enum ClickOutcome {
    /// Defined no-op: face-up card or duplicate queue entry.
    Ignored,
    Queued,
    ResolutionStarted,
}

impl ClickOutcome {
    pub const fn accepted(self) -> bool {
        !matches!(self, Self::Ignored)
    }
}

/// What an elapsed delay did to the engine.
#[derive(Copy, Clone, Debug, PartialEq)]
pub enum TickOutcome {
    /// The delay no longer matches the current phase; it was superseded.
    Stale,
    Advanced,
}

impl TickOutcome {
    pub const fn advanced(self) -> bool {
        matches!(self, Self::Advanced)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn grid_spec_rejects_out_of_bounds_axes() {
        assert_eq!(
            GridSpec::new(1, 4),
            Err(GameError::InvalidGridSize { rows: 1, cols: 4 })
        );
        assert_eq!(
            GridSpec::new(4, 11),
            Err(GameError::InvalidGridSize { rows: 4, cols: 11 })
        );
    }

    #[test]
    fn grid_spec_rejects_odd_card_counts() {
        assert_eq!(
            GridSpec::new(3, 3),
            Err(GameError::InvalidGridSize { rows: 3, cols: 3 })
        );
        assert!(GridSpec::new(3, 4).is_ok());
    }

    #[test]
    fn grid_traversal_is_row_major() {
        let spec = GridSpec::new_unchecked(2, 2);
        let cards = vec![
            Card::new(0, "a"),
            Card::new(0, "a"),
            Card::new(1, "b"),
            Card::new(1, "b"),
        ];
        let grid = Grid::from_cards(spec, cards).unwrap();

        let ids: Vec<CardId> = grid.iter().map(Card::id).collect();
        assert_eq!(ids, vec![0, 0, 1, 1]);
        assert_eq!(grid[(1, 0)].id(), 1);
        assert_eq!(
            grid.coords().collect::<Vec<_>>(),
            vec![(0, 0), (0, 1), (1, 0), (1, 1)]
        );
    }

    #[test]
    fn from_cards_rejects_shape_mismatch() {
        let spec = GridSpec::new_unchecked(2, 2);
        let cards = vec![Card::new(0, "a"), Card::new(0, "a")];

        assert_eq!(
            Grid::from_cards(spec, cards),
            Err(GameError::InvalidGridSize { rows: 2, cols: 2 })
        );
    }
}
