use rand::Rng;
use rand::seq::SliceRandom;

use super::catalog::Catalog;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Variant {
    Achievement,
    Theme,
}

impl Variant {
    pub const BOTH: [Variant; 2] = [Variant::Achievement, Variant::Theme];
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct InstanceId(u64);

impl InstanceId {
    pub fn raw(self) -> u64 {
        self.0
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct CardInstance {
    pub instance_id: InstanceId,
    pub source_id: u32,
    pub variant: Variant,
    pub face_up: bool,
}

impl CardInstance {
    pub fn pairs_with(&self, other: &CardInstance) -> bool {
        self.source_id == other.source_id && self.variant != other.variant
    }
}

/// Hands out instance ids that stay unique across every deck a controller builds.
#[derive(Debug, Default)]
pub struct InstanceAllocator {
    next: u64,
}

impl InstanceAllocator {
    pub fn next_id(&mut self) -> InstanceId {
        self.next = self.next.wrapping_add(1);
        InstanceId(self.next)
    }
}

#[derive(Clone, Debug, Default)]
pub struct Deck {
    cards: Vec<CardInstance>,
}

impl Deck {
    pub fn build<R: Rng + ?Sized>(
        catalog: &Catalog,
        ids: &mut InstanceAllocator,
        rng: &mut R,
    ) -> Self {
        let mut cards: Vec<CardInstance> = catalog
            .records()
            .iter()
            .flat_map(|record| Variant::BOTH.map(|variant| (record.id, variant)))
            .map(|(source_id, variant)| CardInstance {
                instance_id: ids.next_id(),
                source_id,
                variant,
                face_up: false,
            })
            .collect();
        cards.shuffle(rng);
        Deck { cards }
    }

    pub fn cards(&self) -> &[CardInstance] {
        &self.cards
    }

    pub fn len(&self) -> usize {
        self.cards.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cards.is_empty()
    }

    pub fn position(&self, id: InstanceId) -> Option<usize> {
        self.cards.iter().position(|card| card.instance_id == id)
    }

    pub fn get(&self, id: InstanceId) -> Option<&CardInstance> {
        self.cards.iter().find(|card| card.instance_id == id)
    }

    pub fn get_mut(&mut self, id: InstanceId) -> Option<&mut CardInstance> {
        self.cards.iter_mut().find(|card| card.instance_id == id)
    }

    pub fn at(&self, index: usize) -> Option<&CardInstance> {
        self.cards.get(index)
    }

    pub fn set_face_up(&mut self, id: InstanceId, face_up: bool) {
        if let Some(card) = self.get_mut(id) {
            card.face_up = face_up;
        }
    }

    pub fn instances_of(&self, source_id: u32) -> impl Iterator<Item = &CardInstance> {
        self.cards
            .iter()
            .filter(move |card| card.source_id == source_id)
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use rand::SeedableRng;
    use rand::rngs::StdRng;

    use super::*;

    #[test]
    fn deck_doubles_the_catalog_with_both_variants() {
        let catalog = Catalog::bundled().unwrap();
        let mut ids = InstanceAllocator::default();
        let mut rng = StdRng::seed_from_u64(7);
        let deck = Deck::build(&catalog, &mut ids, &mut rng);

        assert_eq!(deck.len(), catalog.len() * 2);
        for record in catalog.records() {
            let variants: Vec<Variant> = deck.instances_of(record.id).map(|c| c.variant).collect();
            assert_eq!(variants.len(), 2);
            assert_ne!(variants[0], variants[1]);
        }
        assert!(deck.cards().iter().all(|card| !card.face_up));
    }

    #[test]
    fn instance_ids_never_repeat_across_rebuilds() {
        let catalog = Catalog::bundled().unwrap();
        let mut ids = InstanceAllocator::default();
        let mut rng = StdRng::seed_from_u64(1);
        let first = Deck::build(&catalog, &mut ids, &mut rng);
        let second = Deck::build(&catalog, &mut ids, &mut rng);

        let all: HashSet<InstanceId> = first
            .cards()
            .iter()
            .chain(second.cards())
            .map(|card| card.instance_id)
            .collect();
        assert_eq!(all.len(), first.len() + second.len());
    }

    #[test]
    fn same_seed_gives_same_order() {
        let catalog = Catalog::bundled().unwrap();
        let order = |seed| {
            let mut ids = InstanceAllocator::default();
            let mut rng = StdRng::seed_from_u64(seed);
            Deck::build(&catalog, &mut ids, &mut rng)
                .cards()
                .iter()
                .map(|card| (card.source_id, card.variant))
                .collect::<Vec<_>>()
        };
        assert_eq!(order(42), order(42));
    }

    #[test]
    fn pairs_with_requires_same_source_and_other_variant() {
        let card = |source_id, variant| CardInstance {
            instance_id: InstanceId(source_id as u64),
            source_id,
            variant,
            face_up: false,
        };
        assert!(card(1, Variant::Achievement).pairs_with(&card(1, Variant::Theme)));
        assert!(!card(1, Variant::Theme).pairs_with(&card(1, Variant::Theme)));
        assert!(!card(1, Variant::Achievement).pairs_with(&card(2, Variant::Theme)));
    }
}
