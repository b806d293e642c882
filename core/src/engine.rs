use core::time::Duration;
use std::collections::{BTreeSet, VecDeque};

use crate::*;

/// Cooperative suspension points of the resolution and preview protocols.
///
/// The engine owns no thread: it asks the host to arm a timer by emitting
/// [`Effect::Schedule`] and advances when the host calls
/// [`MatchEngine::delay_elapsed`]. Tests drive it with no clock at all.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Delay {
    /// Minimum time a player needs to read both revealed faces.
    Reveal,
    /// Lets the mismatch cue register before the pair flips back.
    Mismatch,
    /// The window during which all cards are shown at game start.
    PreviewHold,
    /// Grace period after the preview hides before input is processed.
    PreviewSettle,
}

impl Delay {
    pub const fn duration(self) -> Duration {
        match self {
            Self::Reveal => Duration::from_millis(500),
            Self::Mismatch => Duration::from_millis(100),
            Self::PreviewHold => Duration::from_millis(1500),
            Self::PreviewSettle => Duration::from_millis(500),
        }
    }
}

/// How long the UI keeps the combo banner on screen.
pub const COMBO_BANNER_HOLD: Duration = Duration::from_millis(1500);

/// How long the UI keeps a grid-size validation warning on screen.
pub const WARNING_HOLD: Duration = Duration::from_secs(3);

/// State changes and notifications produced by engine operations, in order.
///
/// Rendering and audio collaborators consume these; `Schedule` is addressed
/// to the host scheduler and `Combo` to the banner widget (a multiplier of
/// 1 clears it).
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Effect {
    Flip { at: Coord2, face_up: bool },
    Schedule(Delay),
    Matched { at: Coord2 },
    Mismatched { at: Coord2 },
    Combo { multiplier: u32 },
    Completed,
}

/// Resolution state machine: at most one pair is ever in flight.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Default)]
enum Phase {
    #[default]
    Idle,
    PreviewHold,
    PreviewSettle,
    Revealing { a: Coord2, b: Coord2 },
    Mismatching { a: Coord2, b: Coord2 },
}

/// Counters re-hydrated from a save record.
#[derive(Clone, Debug, PartialEq)]
pub(crate) struct RestoredCounters {
    pub matched_pairs: CardCount,
    pub matches_found: u32,
    pub moves: u32,
    pub combo_streak: u32,
    pub combo_multiplier: u32,
    pub completed: bool,
}

/// Turns card clicks into grid state changes, score and combo updates, and
/// completion detection.
///
/// Clicks arriving while a pair is under resolution are queued FIFO and
/// drained once the resolution finishes. All bookkeeping for one judgement
/// happens within a single call; only the display of the outcome is
/// time-delayed.
#[derive(Clone, Debug, PartialEq)]
pub struct MatchEngine {
    grid: Grid,
    click_queue: VecDeque<Coord2>,
    phase: Phase,
    matched_pairs: CardCount,
    matches_found: u32,
    moves: u32,
    combo_streak: u32,
    combo_multiplier: u32,
    matched_ids: BTreeSet<CardId>,
    completed: bool,
    effects: Vec<Effect>,
}

impl MatchEngine {
    pub fn new(grid: Grid) -> Self {
        Self {
            grid,
            click_queue: VecDeque::new(),
            phase: Phase::Idle,
            matched_pairs: 0,
            matches_found: 0,
            moves: 0,
            combo_streak: 0,
            combo_multiplier: 1,
            matched_ids: BTreeSet::new(),
            completed: false,
            effects: Vec::new(),
        }
    }

    /// Rolls a random grid size within the new-game bounds, generates a
    /// shuffled pair assignment, and builds a fresh engine around it.
    pub fn new_game(seed: u64, kinds: &KindPool) -> Result<Self> {
        use rand::prelude::*;

        let mut rng = SmallRng::seed_from_u64(seed);
        let spec = random_grid_spec(&mut rng, RANDOM_GRID_MIN, RANDOM_GRID_MAX);
        let deck = RandomDeckGenerator::new(rng.random()).generate(spec, kinds)?;
        Ok(Self::new(Grid::from_deck(spec, &deck)?))
    }

    pub(crate) fn from_restored(grid: Grid, counters: RestoredCounters) -> Self {
        let matched_ids = grid
            .iter()
            .filter(|card| card.is_face_up())
            .map(Card::id)
            .collect();

        let mut engine = Self::new(grid);
        engine.matched_pairs = counters.matched_pairs;
        engine.matches_found = counters.matches_found;
        engine.moves = counters.moves;
        engine.combo_streak = counters.combo_streak;
        engine.combo_multiplier = counters.combo_multiplier.max(1);
        engine.matched_ids = matched_ids;
        engine.completed = counters.completed;
        engine.check_completion();
        engine
    }

    // --- accessors -------------------------------------------------------

    pub fn grid(&self) -> &Grid {
        &self.grid
    }

    /// True exactly while a queued pair is under timed resolution (or the
    /// initial preview window is open).
    pub fn comparing(&self) -> bool {
        self.phase != Phase::Idle
    }

    /// Resolved pair count. This is the value persisted as `score`.
    pub const fn score(&self) -> CardCount {
        self.matched_pairs
    }

    /// Combo-weighted display score.
    pub const fn matches_found(&self) -> u32 {
        self.matches_found
    }

    pub const fn moves(&self) -> u32 {
        self.moves
    }

    pub const fn combo_streak(&self) -> u32 {
        self.combo_streak
    }

    pub const fn combo_multiplier(&self) -> u32 {
        self.combo_multiplier
    }

    pub fn matched_ids(&self) -> &BTreeSet<CardId> {
        &self.matched_ids
    }

    pub const fn is_completed(&self) -> bool {
        self.completed
    }

    pub fn queued_clicks(&self) -> usize {
        self.click_queue.len()
    }

    /// Takes the effects accumulated since the last drain, in emission order.
    pub fn drain_effects(&mut self) -> Vec<Effect> {
        core::mem::take(&mut self.effects)
    }

    // --- input -----------------------------------------------------------

    /// Reveals the clicked card, queues it, and attempts resolution.
    ///
    /// A click on a face-up card or on a card already in the queue is a
    /// defined no-op, silent and without notification.
    pub fn on_card_clicked(&mut self, at: Coord2) -> Result<ClickOutcome> {
        let at = self.grid.validate_coords(at)?;

        if self.grid[at].is_face_up() || self.click_queue.contains(&at) {
            log::trace!("click ignored at {:?}", at);
            return Ok(ClickOutcome::Ignored);
        }

        self.flip_card(at, true);
        self.click_queue.push_back(at);

        Ok(if self.try_resolve() {
            ClickOutcome::ResolutionStarted
        } else {
            ClickOutcome::Queued
        })
    }

    /// Advances the protocol when a scheduled delay fires.
    ///
    /// A delay that no longer matches the current phase was superseded and
    /// is ignored; flips are idempotent target-state transitions, so the
    /// overwrite is safe.
    pub fn delay_elapsed(&mut self, delay: Delay) -> TickOutcome {
        match (self.phase, delay) {
            (Phase::PreviewHold, Delay::PreviewHold) => {
                let face_up: Vec<Coord2> = self
                    .grid
                    .coords()
                    .filter(|&at| self.grid[at].is_face_up())
                    .collect();
                for at in face_up {
                    self.flip_card(at, false);
                }
                self.phase = Phase::PreviewSettle;
                self.effects.push(Effect::Schedule(Delay::PreviewSettle));
            }
            (Phase::PreviewSettle, Delay::PreviewSettle) => {
                self.phase = Phase::Idle;
                self.try_resolve();
            }
            (Phase::Revealing { a, b }, Delay::Reveal) => self.judge(a, b),
            (Phase::Mismatching { a, b }, Delay::Mismatch) => {
                self.flip_card(a, false);
                self.flip_card(b, false);
                self.phase = Phase::Idle;
                self.try_resolve();
            }
            (phase, delay) => {
                log::trace!("stale delay {:?} in phase {:?}", delay, phase);
                return TickOutcome::Stale;
            }
        }
        TickOutcome::Advanced
    }

    // --- game flow -------------------------------------------------------

    /// Reveals every card for the preview window; clicks are ignored while
    /// the faces show and merely queued during the settle period.
    pub fn start_preview(&mut self) {
        self.phase = Phase::PreviewHold;
        let face_down: Vec<Coord2> = self
            .grid
            .coords()
            .filter(|&at| !self.grid[at].is_face_up())
            .collect();
        for at in face_down {
            self.flip_card(at, true);
        }
        self.effects.push(Effect::Schedule(Delay::PreviewHold));
    }

    /// Zeroes all counters and clears the queue, leaving the grid alone.
    /// Rebuilding the grid is the caller's responsibility.
    pub fn reset_for_new_grid(&mut self) {
        self.click_queue.clear();
        self.phase = Phase::Idle;
        self.matched_pairs = 0;
        self.matches_found = 0;
        self.moves = 0;
        self.combo_streak = 0;
        self.combo_multiplier = 1;
        self.matched_ids.clear();
        self.completed = false;
        self.effects.clear();
    }

    /// Full reset: counters, queue, and the grid itself.
    pub fn reset(&mut self) {
        self.reset_for_new_grid();
        self.grid = Grid::empty();
    }

    /// Swaps in a freshly generated grid for the next round. The caller
    /// starts the preview once the new grid is on screen.
    pub fn next_game(&mut self, seed: u64, kinds: &KindPool) -> Result<()> {
        use rand::prelude::*;

        let mut rng = SmallRng::seed_from_u64(seed);
        let spec = random_grid_spec(&mut rng, RANDOM_GRID_MIN, RANDOM_GRID_MAX);
        let deck = RandomDeckGenerator::new(rng.random()).generate(spec, kinds)?;

        self.reset_for_new_grid();
        self.grid = Grid::from_deck(spec, &deck)?;
        Ok(())
    }

    // --- resolution protocol ---------------------------------------------

    /// Dequeues the two oldest clicks and begins timed resolution. No-op
    /// while a resolution is in flight or fewer than two cards are queued.
    fn try_resolve(&mut self) -> bool {
        if self.phase != Phase::Idle || self.click_queue.len() < 2 {
            return false;
        }

        let a = self.click_queue.pop_front().unwrap();
        let b = self.click_queue.pop_front().unwrap();

        self.phase = Phase::Revealing { a, b };
        // cards flip on click, so these only catch faces turned back down
        // between enqueue and resolution
        self.flip_card(a, true);
        self.flip_card(b, true);
        self.effects.push(Effect::Schedule(Delay::Reveal));
        true
    }

    fn judge(&mut self, a: Coord2, b: Coord2) {
        self.moves += 1;

        if self.grid[a].id() == self.grid[b].id() {
            self.combo_streak += 1;
            self.combo_multiplier = if self.combo_streak >= 2 {
                self.combo_streak
            } else {
                1
            };
            self.matches_found += self.combo_multiplier;
            self.matched_pairs += 1;
            self.matched_ids.insert(self.grid[a].id());

            self.effects.push(Effect::Matched { at: a });
            self.effects.push(Effect::Matched { at: b });
            self.effects.push(Effect::Combo {
                multiplier: self.combo_multiplier,
            });

            self.phase = Phase::Idle;
            self.check_completion();
            self.try_resolve();
        } else {
            self.combo_streak = 0;
            self.combo_multiplier = 1;

            self.effects.push(Effect::Mismatched { at: a });
            self.effects.push(Effect::Mismatched { at: b });
            self.effects.push(Effect::Combo { multiplier: 1 });
            self.effects.push(Effect::Schedule(Delay::Mismatch));
            self.phase = Phase::Mismatching { a, b };
        }
    }

    /// Monotonic: fires `Completed` once, on the first transition only.
    fn check_completion(&mut self) {
        if !self.completed && self.matched_pairs == self.grid.total_pairs() {
            self.completed = true;
            self.effects.push(Effect::Completed);
        }
    }

    fn flip_card(&mut self, at: Coord2, face_up: bool) {
        if self.grid.card_at_mut(at).set_face(face_up) {
            self.effects.push(Effect::Flip { at, face_up });
        }
    }
}
