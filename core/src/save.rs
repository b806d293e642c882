use serde::{Deserialize, Serialize};

use crate::*;

/// Well-known single-slot key under which the session record is stored.
pub const SAVE_KEY: &str = "flipmatch:save:v1";

/// Storage collaborator boundary: one record per session, overwritten on
/// each save. The core never touches bytes on disk itself.
pub trait SaveStore {
    fn exists(&self) -> bool;
    fn read(&self) -> Result<String>;
    fn write(&mut self, contents: &str) -> Result<()>;
}

/// In-memory store, for tests and headless hosts.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct MemoryStore {
    slot: Option<String>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn contents(&self) -> Option<&str> {
        self.slot.as_deref()
    }
}

impl SaveStore for MemoryStore {
    fn exists(&self) -> bool {
        self.slot.is_some()
    }

    fn read(&self) -> Result<String> {
        self.slot.clone().ok_or(GameError::NoSavedSession)
    }

    fn write(&mut self, contents: &str) -> Result<()> {
        self.slot = Some(contents.to_owned());
        Ok(())
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CardRecord {
    pub identity: CardId,
    pub face_up: bool,
    pub kind_name: String,
}

/// Flat snapshot of engine + grid state, sufficient to resume a session.
///
/// `score` is the resolved pair count; cards appear in the grid's row-major
/// traversal order, which reconstruction relies on.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SaveRecord {
    pub rows: Coord,
    pub columns: Coord,
    pub score: CardCount,
    pub moves: u32,
    pub combo_streak: u32,
    pub combo_multiplier: u32,
    pub completed: bool,
    pub cards: Vec<CardRecord>,
}

impl SaveRecord {
    /// Pure projection of the current session; mutates nothing.
    pub fn snapshot(engine: &MatchEngine) -> Self {
        let grid = engine.grid();
        Self {
            rows: grid.rows(),
            columns: grid.cols(),
            score: engine.score(),
            moves: engine.moves(),
            combo_streak: engine.combo_streak(),
            combo_multiplier: engine.combo_multiplier(),
            completed: engine.is_completed(),
            cards: grid
                .iter()
                .map(|card| CardRecord {
                    identity: card.id(),
                    face_up: card.is_face_up(),
                    kind_name: card.kind().to_owned(),
                })
                .collect(),
        }
    }

    /// Rebuilds the grid and re-hydrates the engine counters.
    ///
    /// Matched identities are inferred from the face-up flag alone; a card
    /// saved face-up is treated as matched on restore. Completion is
    /// re-evaluated without re-firing when the record already carries it.
    pub fn restore(&self) -> Result<MatchEngine> {
        let spec = GridSpec::new(self.rows, self.columns)
            .map_err(|err| GameError::CorruptSave(err.to_string()))?;
        if self.cards.len() != usize::from(spec.total_cards()) {
            return Err(GameError::CorruptSave(format!(
                "expected {} cards, record holds {}",
                spec.total_cards(),
                self.cards.len()
            )));
        }

        let cards = self
            .cards
            .iter()
            .map(|record| Card::restored(record.identity, record.kind_name.clone(), record.face_up))
            .collect();
        let grid = Grid::from_cards(spec, cards)?;

        Ok(MatchEngine::from_restored(
            grid,
            RestoredCounters {
                matched_pairs: self.score,
                // the legacy record collapses the display score into `score`
                matches_found: self.score.into(),
                moves: self.moves,
                combo_streak: self.combo_streak,
                combo_multiplier: self.combo_multiplier,
                completed: self.completed,
            },
        ))
    }

    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string_pretty(self).map_err(|err| GameError::CorruptSave(err.to_string()))
    }

    pub fn from_json(json: &str) -> Result<Self> {
        serde_json::from_str(json).map_err(|err| GameError::CorruptSave(err.to_string()))
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum SaveOutcome {
    Saved,
    /// Nothing worth persisting yet; the store was left untouched.
    Skipped,
}

/// Persists the session, unless no matches have occurred yet. A zero-score
/// save request is a defined no-op, not an error.
pub fn save_game<S: SaveStore>(store: &mut S, engine: &MatchEngine) -> Result<SaveOutcome> {
    if engine.score() == 0 {
        log::debug!("no matches yet, skipping save");
        return Ok(SaveOutcome::Skipped);
    }

    let record = SaveRecord::snapshot(engine);
    store.write(&record.to_json()?)?;
    Ok(SaveOutcome::Saved)
}

/// Resumes the stored session. A missing record is reported as
/// [`GameError::NoSavedSession`] and should be treated as "no saved
/// session", never as fatal.
pub fn load_game<S: SaveStore>(store: &S) -> Result<MatchEngine> {
    if !store.exists() {
        log::debug!("no save record found");
        return Err(GameError::NoSavedSession);
    }

    SaveRecord::from_json(&store.read()?)?.restore()
}
