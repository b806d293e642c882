use crate::Coord;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum GameError {
    #[error("Card kind pool is empty")]
    EmptyKindPool,
    #[error("Duplicate kind {0:?} in pool")]
    DuplicateKind(String),
    #[error("Invalid grid size {rows}x{cols}")]
    InvalidGridSize { rows: Coord, cols: Coord },
    #[error("Invalid coordinates")]
    InvalidCoords,
    #[error("No saved session")]
    NoSavedSession,
    #[error("Corrupt save record: {0}")]
    CorruptSave(String),
}

pub type Result<T> = core::result::Result<T, GameError>;
