// Copyright 2026 the Shadowtree Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! A small insertion-ordered map keyed by [`Tag`].
//!
//! The differ keeps a handful of these per parent while matching one layer
//! against another. They rarely hold more than a few dozen entries, so a
//! linear scan over an inline vector beats hashing, and erasing leaves a
//! tombstone that is swept up lazily.
//!
//! This is not a general-purpose map: inserts do not check for duplicates,
//! and lookups are `O(n)`.

use smallvec::SmallVec;

use crate::node::Tag;

/// A handle to a live entry, returned by [`TinyMap::find`].
///
/// A slot stays valid until the next call that may compact the map
/// ([`find`](TinyMap::find), [`iter`](TinyMap::iter) and the helpers built on
/// them).
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Slot<V> {
    index: usize,
    /// The entry's key.
    pub key: Tag,
    /// The entry's value.
    pub value: V,
}

/// Insertion-ordered map from non-zero [`Tag`] to a `Copy` value.
#[derive(Clone, Debug)]
pub struct TinyMap<V: Copy> {
    entries: SmallVec<[Option<(Tag, V)>; 16]>,
    /// Tombstones anywhere in `entries`.
    num_erased: usize,
    /// Length of the tombstoned prefix of `entries`.
    erased_at_front: usize,
}

impl<V: Copy> Default for TinyMap<V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<V: Copy> TinyMap<V> {
    /// Creates an empty map.
    #[must_use]
    pub fn new() -> Self {
        Self {
            entries: SmallVec::new(),
            num_erased: 0,
            erased_at_front: 0,
        }
    }

    /// Appends an entry.
    ///
    /// Duplicates are not checked for; lookups see the first live entry.
    ///
    /// # Panics
    ///
    /// Panics if `key` is [`Tag::NONE`].
    pub fn insert(&mut self, key: Tag, value: V) {
        assert!(!key.is_none(), "Tag::NONE cannot be a map key");
        self.entries.push(Some((key, value)));
    }

    /// Finds the live entry for `key`.
    pub fn find(&mut self, key: Tag) -> Option<Slot<V>> {
        if key.is_none() {
            return None;
        }
        self.compact(false);
        self.entries
            .iter()
            .enumerate()
            .skip(self.erased_at_front)
            .find_map(|(index, entry)| match *entry {
                Some((k, value)) if k == key => Some(Slot { index, key, value }),
                _ => None,
            })
    }

    /// Returns the value for `key`.
    pub fn get(&mut self, key: Tag) -> Option<V> {
        self.find(key).map(|slot| slot.value)
    }

    /// Returns `true` if `key` has a live entry.
    pub fn contains(&mut self, key: Tag) -> bool {
        self.find(key).is_some()
    }

    /// Tombstones the entry `slot` refers to.
    pub fn erase(&mut self, slot: Slot<V>) {
        let entry = &mut self.entries[slot.index];
        debug_assert!(
            entry.is_some_and(|(k, _)| k == slot.key),
            "stale slot for key {:?}",
            slot.key
        );
        if entry.take().is_none() {
            return;
        }
        self.num_erased += 1;
        if slot.index == self.erased_at_front {
            self.erased_at_front += 1;
        }
    }

    /// Removes the entry for `key`, returning its value.
    pub fn remove(&mut self, key: Tag) -> Option<V> {
        let slot = self.find(key)?;
        self.erase(slot);
        Some(slot.value)
    }

    /// Number of live entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len() - self.num_erased
    }

    /// Returns `true` if there are no live entries.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Iterates live entries in insertion order.
    ///
    /// Interior tombstones are swept first; the erased prefix is skipped.
    pub fn iter(&mut self) -> impl Iterator<Item = (Tag, V)> + '_ {
        self.compact(self.erased_at_front != self.num_erased);
        self.entries[self.erased_at_front..].iter().flatten().copied()
    }

    /// Sweeps tombstones once they make up half the store, or always when
    /// `force` is set. A store whose only tombstones form its prefix is left
    /// alone, since the prefix is skipped anyway.
    fn compact(&mut self, force: bool) {
        if (self.num_erased < self.entries.len() / 2 && !force)
            || self.entries.is_empty()
            || self.num_erased == 0
            || self.num_erased == self.erased_at_front
        {
            return;
        }
        if self.num_erased == self.entries.len() {
            self.entries.clear();
        } else {
            self.entries.retain(|entry| entry.is_some());
        }
        self.num_erased = 0;
        self.erased_at_front = 0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn keys(map: &mut TinyMap<u32>) -> Vec<i32> {
        map.iter().map(|(k, _)| k.0).collect()
    }

    #[test]
    fn insert_find_erase() {
        let mut map = TinyMap::new();
        map.insert(Tag(3), 30_u32);
        map.insert(Tag(1), 10);
        assert_eq!(map.len(), 2);
        assert_eq!(map.get(Tag(1)), Some(10));
        assert!(!map.contains(Tag(2)));

        let slot = map.find(Tag(3)).unwrap();
        map.erase(slot);
        assert_eq!(map.len(), 1);
        assert!(!map.contains(Tag(3)));
        assert_eq!(keys(&mut map), vec![1]);
    }

    #[test]
    fn iteration_keeps_insertion_order_around_tombstones() {
        let mut map = TinyMap::new();
        for k in 1..=6 {
            map.insert(Tag(k), k as u32);
        }
        assert_eq!(map.remove(Tag(1)), Some(1));
        assert_eq!(map.remove(Tag(4)), Some(4));
        assert_eq!(keys(&mut map), vec![2, 3, 5, 6]);
        map.insert(Tag(9), 9);
        assert_eq!(keys(&mut map), vec![2, 3, 5, 6, 9]);
    }

    #[test]
    fn erasing_everything_empties_the_store() {
        let mut map = TinyMap::new();
        for k in 1..=20 {
            map.insert(Tag(k), 0_u32);
        }
        for k in 1..=20 {
            assert!(map.remove(Tag(k)).is_some());
        }
        assert!(map.is_empty());
        assert_eq!(keys(&mut map), Vec::<i32>::new());
        map.insert(Tag(4), 1);
        assert_eq!(map.get(Tag(4)), Some(1));
    }

    #[test]
    fn compaction_after_many_interior_erases() {
        let mut map = TinyMap::new();
        for k in 1..=40 {
            map.insert(Tag(k), k as u32 * 2);
        }
        for k in (2..=40).step_by(2) {
            map.remove(Tag(k));
        }
        assert_eq!(map.len(), 20);
        assert_eq!(map.get(Tag(39)), Some(78));
        assert_eq!(map.get(Tag(40)), None);
        assert_eq!(map.iter().count(), 20);
    }

    #[test]
    fn none_key_is_never_found() {
        let mut map: TinyMap<u32> = TinyMap::new();
        assert!(map.find(Tag::NONE).is_none());
    }

    #[test]
    #[should_panic(expected = "Tag::NONE cannot be a map key")]
    fn none_key_rejected() {
        let mut map = TinyMap::new();
        map.insert(Tag::NONE, 1_u32);
    }
}
