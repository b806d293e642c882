use serde::{Deserialize, Serialize};

use crate::CardId;

/// Per-card notification kinds delivered to observers.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum CardEvent {
    Flipped,
    Matched,
    Mismatched,
}

/// A single tile of the grid: a pair identity, a display kind, and a face.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Card {
    id: CardId,
    kind: String,
    face_up: bool,
}

impl Card {
    pub fn new(id: CardId, kind: impl Into<String>) -> Self {
        Self {
            id,
            kind: kind.into(),
            face_up: false,
        }
    }

    pub fn restored(id: CardId, kind: impl Into<String>, face_up: bool) -> Self {
        Self {
            id,
            kind: kind.into(),
            face_up,
        }
    }

    pub const fn id(&self) -> CardId {
        self.id
    }

    pub fn kind(&self) -> &str {
        &self.kind
    }

    pub const fn is_face_up(&self) -> bool {
        self.face_up
    }

    /// Idempotent target-state transition; a repeated request to the same
    /// face simply overwrites the previous one.
    pub(crate) fn set_face(&mut self, face_up: bool) -> bool {
        let changed = self.face_up != face_up;
        self.face_up = face_up;
        changed
    }
}
