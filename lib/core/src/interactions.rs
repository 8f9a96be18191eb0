//! Click history indexed for set queries.

use crate::{ItemId, UserId};
use ahash::AHashMap;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// A single recorded user-item engagement
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Interaction {
    pub user_id: UserId,
    pub item_id: ItemId,
}

impl Interaction {
    #[inline]
    #[must_use]
    pub fn new(user_id: UserId, item_id: ItemId) -> Self {
        Self { user_id, item_id }
    }
}

impl From<(UserId, ItemId)> for Interaction {
    fn from((user_id, item_id): (UserId, ItemId)) -> Self {
        Interaction::new(user_id, item_id)
    }
}

/// Read-only interaction table.
///
/// Keeps the distinct item universe and a per-user seen set, both ordered,
/// so candidate pools come out in a stable order.
#[derive(Debug, Clone, Default)]
pub struct InteractionStore {
    universe: BTreeSet<ItemId>,
    seen: AHashMap<UserId, BTreeSet<ItemId>>,
    interaction_count: usize,
}

impl InteractionStore {
    pub fn new<I>(interactions: I) -> Self
    where
        I: IntoIterator<Item = Interaction>,
    {
        let mut store = Self::default();
        for interaction in interactions {
            store.universe.insert(interaction.item_id);
            store
                .seen
                .entry(interaction.user_id)
                .or_default()
                .insert(interaction.item_id);
            store.interaction_count += 1;
        }
        store
    }

    /// Build from raw `(user_id, item_id)` pairs
    pub fn from_pairs<I>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (UserId, ItemId)>,
    {
        Self::new(pairs.into_iter().map(Interaction::from))
    }

    /// Number of recorded interactions, duplicates included
    pub fn len(&self) -> usize {
        self.interaction_count
    }

    pub fn is_empty(&self) -> bool {
        self.interaction_count == 0
    }

    pub fn user_count(&self) -> usize {
        self.seen.len()
    }

    pub fn item_count(&self) -> usize {
        self.universe.len()
    }

    /// Every item clicked by at least one user
    pub fn universe(&self) -> &BTreeSet<ItemId> {
        &self.universe
    }

    /// Items the user has interacted with; `None` for an unknown user
    pub fn seen_by(&self, user_id: UserId) -> Option<&BTreeSet<ItemId>> {
        self.seen.get(&user_id)
    }

    pub fn has_seen(&self, user_id: UserId, item_id: ItemId) -> bool {
        self.seen
            .get(&user_id)
            .is_some_and(|items| items.contains(&item_id))
    }

    /// Universe minus the user's seen set, in ascending item order
    pub fn unseen_by(&self, user_id: UserId) -> Vec<ItemId> {
        match self.seen.get(&user_id) {
            Some(seen) => self.universe.difference(seen).copied().collect(),
            None => self.universe.iter().copied().collect(),
        }
    }
}

impl FromIterator<Interaction> for InteractionStore {
    fn from_iter<I: IntoIterator<Item = Interaction>>(iter: I) -> Self {
        InteractionStore::new(iter)
    }
}
