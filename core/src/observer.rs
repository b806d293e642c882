use crate::*;

/// Listener capability for rendering and audio collaborators. Polymorphic
/// over capability, not inheritance: implement only what you care about.
pub trait GameObserver {
    fn on_card(&mut self, at: Coord2, card: &Card, event: CardEvent);

    fn on_completed(&mut self) {}
}

/// Fan-out registry that turns a drained effect batch into per-card
/// notifications against the grid.
///
/// `Schedule` and `Combo` effects are addressed to the host scheduler and
/// the banner widget respectively and are not broadcast here.
#[derive(Default)]
pub struct ObserverRegistry {
    observers: Vec<Box<dyn GameObserver>>,
}

impl ObserverRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn attach(&mut self, observer: Box<dyn GameObserver>) {
        self.observers.push(observer);
    }

    pub fn len(&self) -> usize {
        self.observers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.observers.is_empty()
    }

    pub fn dispatch(&mut self, grid: &Grid, effects: &[Effect]) {
        for effect in effects {
            match *effect {
                Effect::Flip { at, .. } => self.notify(grid, at, CardEvent::Flipped),
                Effect::Matched { at } => self.notify(grid, at, CardEvent::Matched),
                Effect::Mismatched { at } => self.notify(grid, at, CardEvent::Mismatched),
                Effect::Completed => {
                    for observer in &mut self.observers {
                        observer.on_completed();
                    }
                }
                Effect::Schedule(_) | Effect::Combo { .. } => {}
            }
        }
    }

    fn notify(&mut self, grid: &Grid, at: Coord2, event: CardEvent) {
        let card = grid.card_at(at);
        for observer in &mut self.observers {
            observer.on_card(at, card, event);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::rc::Rc;

    #[derive(Default)]
    struct Recorder {
        cards: Rc<RefCell<Vec<(Coord2, CardEvent)>>>,
        completions: Rc<RefCell<u32>>,
    }

    impl GameObserver for Recorder {
        fn on_card(&mut self, at: Coord2, _card: &Card, event: CardEvent) {
            self.cards.borrow_mut().push((at, event));
        }

        fn on_completed(&mut self) {
            *self.completions.borrow_mut() += 1;
        }
    }

    #[test]
    fn dispatch_maps_effects_onto_card_notifications() {
        let grid = Grid::from_cards(
            GridSpec::new_unchecked(2, 2),
            vec![
                Card::new(1, "owl"),
                Card::new(2, "fox"),
                Card::new(1, "owl"),
                Card::new(2, "fox"),
            ],
        )
        .unwrap();
        let mut engine = MatchEngine::new(grid);

        let recorder = Recorder::default();
        let cards = Rc::clone(&recorder.cards);
        let completions = Rc::clone(&recorder.completions);
        let mut registry = ObserverRegistry::new();
        registry.attach(Box::new(recorder));

        engine.on_card_clicked((0, 0)).unwrap();
        engine.on_card_clicked((1, 0)).unwrap();
        engine.delay_elapsed(Delay::Reveal);

        let effects = engine.drain_effects();
        registry.dispatch(engine.grid(), &effects);

        let seen = cards.borrow();
        assert!(seen.contains(&((0, 0), CardEvent::Flipped)));
        assert!(seen.contains(&((0, 0), CardEvent::Matched)));
        assert!(seen.contains(&((1, 0), CardEvent::Matched)));
        assert_eq!(*completions.borrow(), 0);
    }

    #[test]
    fn completion_reaches_every_observer_once() {
        let grid = Grid::from_cards(
            GridSpec::new_unchecked(2, 2),
            vec![
                Card::new(1, "owl"),
                Card::new(1, "owl"),
                Card::new(2, "fox"),
                Card::new(2, "fox"),
            ],
        )
        .unwrap();
        let mut engine = MatchEngine::new(grid);

        let recorder = Recorder::default();
        let completions = Rc::clone(&recorder.completions);
        let mut registry = ObserverRegistry::new();
        registry.attach(Box::new(recorder));

        for pair in [[(0, 0), (0, 1)], [(1, 0), (1, 1)]] {
            engine.on_card_clicked(pair[0]).unwrap();
            engine.on_card_clicked(pair[1]).unwrap();
            engine.delay_elapsed(Delay::Reveal);
        }

        let effects = engine.drain_effects();
        registry.dispatch(engine.grid(), &effects);

        assert!(engine.is_completed());
        assert_eq!(*completions.borrow(), 1);
    }
}
