use crate::*;
pub use random::*;

mod random;

pub trait DeckGenerator {
    fn generate(self, spec: GridSpec, kinds: &KindPool) -> Result<Deck>;
}

/// Ordered, non-empty pool of distinct card kind names.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct KindPool(Vec<String>);

impl KindPool {
    pub fn new(kinds: Vec<String>) -> Result<Self> {
        if kinds.is_empty() {
            return Err(GameError::EmptyKindPool);
        }
        for (i, kind) in kinds.iter().enumerate() {
            if kinds[..i].contains(kind) {
                return Err(GameError::DuplicateKind(kind.clone()));
            }
        }
        Ok(Self(kinds))
    }

    pub fn from_names<I>(names: I) -> Result<Self>
    where
        I: IntoIterator,
        I::Item: Into<String>,
    {
        Self::new(names.into_iter().map(Into::into).collect())
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(String::as_str)
    }
}

/// A shuffled pair assignment: one identity per grid slot, plus the stable
/// identity-to-kind mapping assigned during generation.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Deck {
    ids: Vec<CardId>,
    kinds_by_id: Vec<String>,
}

impl Deck {
    pub(crate) fn new(ids: Vec<CardId>, kinds_by_id: Vec<String>) -> Self {
        Self { ids, kinds_by_id }
    }

    pub fn ids(&self) -> &[CardId] {
        &self.ids
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    pub fn kind_name(&self, id: CardId) -> Option<&str> {
        self.kinds_by_id.get(usize::from(id)).map(String::as_str)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kind_pool_rejects_empty_input() {
        assert_eq!(
            KindPool::from_names(Vec::<String>::new()),
            Err(GameError::EmptyKindPool)
        );
    }

    #[test]
    fn kind_pool_rejects_duplicates() {
        assert_eq!(
            KindPool::from_names(["owl", "fox", "owl"]),
            Err(GameError::DuplicateKind("owl".into()))
        );
    }

    #[test]
    fn kind_name_is_none_for_an_unassigned_identity() {
        let deck = Deck::new(vec![0, 0], vec!["owl".to_owned()]);

        assert_eq!(deck.kind_name(0), Some("owl"));
        assert_eq!(deck.kind_name(1), None);
    }
}
