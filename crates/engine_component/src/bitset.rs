use std::fmt;

use crate::component::{ComponentTypeId, MAX_COMPONENTS};

const WORDS: usize = MAX_COMPONENTS.div_ceil(64);

/// Fixed-width bitset indexed by [`ComponentTypeId`].
///
/// An entity's membership bitset has bit `k` set exactly when it holds a
/// component whose kind id is `k`. System signatures use the same type.
#[derive(Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct ComponentBitSet {
    words: [u64; WORDS],
}

impl ComponentBitSet {
    /// Create an empty bitset.
    #[must_use]
    pub const fn new() -> Self {
        Self { words: [0; WORDS] }
    }

    /// Build a bitset from a list of ids.
    #[must_use]
    pub fn from_ids(ids: impl IntoIterator<Item = ComponentTypeId>) -> Self {
        let mut set = Self::new();
        for id in ids {
            set.insert(id);
        }
        set
    }

    /// Set the bit for `id`.
    pub fn insert(&mut self, id: ComponentTypeId) {
        let (word, bit) = Self::locate(id);
        self.words[word] |= bit;
    }

    /// Clear the bit for `id`.
    pub fn remove(&mut self, id: ComponentTypeId) {
        let (word, bit) = Self::locate(id);
        self.words[word] &= !bit;
    }

    /// Returns `true` if the bit for `id` is set.
    #[must_use]
    pub fn contains(&self, id: ComponentTypeId) -> bool {
        let (word, bit) = Self::locate(id);
        self.words[word] & bit != 0
    }

    /// Returns `true` if every bit set in `other` is also set in `self`.
    #[must_use]
    pub fn contains_all(&self, other: &Self) -> bool {
        self.words
            .iter()
            .zip(other.words.iter())
            .all(|(mine, theirs)| mine & theirs == *theirs)
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.words.iter().all(|word| *word == 0)
    }

    /// Number of set bits.
    #[must_use]
    pub fn count(&self) -> usize {
        self.words.iter().map(|word| word.count_ones() as usize).sum()
    }

    /// Iterate over the set bit indices in ascending order.
    pub fn iter(&self) -> impl Iterator<Item = usize> + '_ {
        self.words.iter().enumerate().flat_map(|(index, word)| {
            (0..64usize)
                .filter(move |bit| word & (1u64 << bit) != 0)
                .map(move |bit| index * 64 + bit)
        })
    }

    fn locate(id: ComponentTypeId) -> (usize, u64) {
        let index = id.index();
        (index / 64, 1u64 << (index % 64))
    }
}

impl fmt::Debug for ComponentBitSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.iter()).finish()
    }
}
