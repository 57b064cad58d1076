// Copyright 2026 the Cambium Authors
// SPDX-License-Identifier: Apache-2.0

//! Keymap-aware matching of key bindings.
//!
//! Entries are stored in an arena with a reverse index for O(1) removal;
//! the keycode index is a pure function of the entry list and the current
//! keymap, dropped and lazily rebuilt whenever the keymap's generation
//! moves.

use std::hash::Hash;
use std::sync::Arc;

use hashbrown::HashMap;
use smallvec::SmallVec;
use tracing::trace;

use crate::input::{Keycode, Keymap, KeymapKey, Keyval, ModifierIntent, ModifierMask};

struct HashEntry<T> {
    keyval: Keyval,
    modifiers: ModifierMask,
    value: T,
    /// Keymap positions producing `keyval`; filled when the keycode index
    /// is built.
    keys: SmallVec<[KeymapKey; 2]>,
}

/// Maps raw key events to the binding entries that match them.
pub struct KeyHash<T> {
    keymap: Arc<dyn Keymap>,
    entries: Vec<HashEntry<T>>,
    reverse: HashMap<T, usize>,
    buckets: Option<HashMap<Keycode, Vec<usize>>>,
    built_generation: u64,
}

impl<T> std::fmt::Debug for KeyHash<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("KeyHash")
            .field("n_entries", &self.entries.len())
            .field("indexed", &self.buckets.is_some())
            .finish()
    }
}

impl<T: Copy + Eq + Hash> KeyHash<T> {
    /// Creates an empty key hash over `keymap`.
    pub fn new(keymap: Arc<dyn Keymap>) -> Self {
        Self {
            keymap,
            entries: Vec::new(),
            reverse: HashMap::new(),
            buckets: None,
            built_generation: 0,
        }
    }

    /// The keymap this hash resolves against.
    pub fn keymap(&self) -> &Arc<dyn Keymap> {
        &self.keymap
    }

    /// Number of entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the hash holds no entries.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Inserts a keyval/modifiers pair carrying `value`.
    ///
    /// `value` must be unique within this hash; it is the removal handle.
    pub fn add_entry(&mut self, keyval: Keyval, modifiers: ModifierMask, value: T) {
        let index = self.entries.len();
        let mut entry = HashEntry {
            keyval,
            modifiers,
            value,
            keys: SmallVec::new(),
        };
        if self.index_is_current() {
            entry.keys = self.keymap.entries_for_keyval(keyval).into();
            if let Some(buckets) = self.buckets.as_mut() {
                for key in &entry.keys {
                    buckets.entry(key.keycode).or_default().push(index);
                }
            }
        }
        self.entries.push(entry);
        self.reverse.insert(value, index);
    }

    /// Removes the entry previously added with `value`.
    pub fn remove_entry(&mut self, value: &T) {
        let Some(index) = self.reverse.remove(value) else {
            return;
        };
        if self.index_is_current()
            && let Some(buckets) = self.buckets.as_mut()
        {
            let keys = std::mem::take(&mut self.entries[index].keys);
            for key in &keys {
                if let Some(bucket) = buckets.get_mut(&key.keycode) {
                    bucket.retain(|&i| i != index);
                    if bucket.is_empty() {
                        buckets.remove(&key.keycode);
                    }
                }
            }
        }

        // Swap-and-pop; the moved entry's index changes, so patch the
        // reverse map and any bucket references.
        let last = self.entries.len() - 1;
        if index != last {
            if self.index_is_current()
                && let Some(buckets) = self.buckets.as_mut()
            {
                for key in &self.entries[last].keys {
                    if let Some(bucket) = buckets.get_mut(&key.keycode) {
                        for slot in bucket.iter_mut() {
                            if *slot == last {
                                *slot = index;
                            }
                        }
                    }
                }
            }
            self.reverse.insert(self.entries[last].value, index);
        }
        self.entries.swap_remove(index);
    }

    /// Discards the keycode index; it is rebuilt on the next lookup.
    ///
    /// Callers observing the keymap's change notification use this; the
    /// generation check catches the change regardless.
    pub fn keys_changed(&mut self) {
        self.buckets = None;
    }

    fn index_is_current(&self) -> bool {
        self.buckets.is_some() && self.built_generation == self.keymap.generation()
    }

    fn ensure_index(&mut self) {
        if self.index_is_current() {
            return;
        }
        trace!(n_entries = self.entries.len(), "rebuilding keycode index");
        let mut buckets: HashMap<Keycode, Vec<usize>> = HashMap::new();
        for (index, entry) in self.entries.iter_mut().enumerate() {
            entry.keys = self.keymap.entries_for_keyval(entry.keyval).into();
            for key in &entry.keys {
                buckets.entry(key.keycode).or_default().push(index);
            }
        }
        self.buckets = Some(buckets);
        self.built_generation = self.keymap.generation();
    }

    /// Whether `keyval` is reachable in keyboard group `group`.
    fn keyval_in_group(&self, keyval: Keyval, group: i32) -> bool {
        self.keymap
            .entries_for_keyval(keyval)
            .iter()
            .any(|key| key.group == group)
    }

    /// Looks up the best matching entries for a raw key event.
    ///
    /// Matches are exact (keyval agrees, and the shift-group bit agrees
    /// when the group modifier takes part in the accelerator mask) or fuzzy
    /// (keycode and level agree, group does not). As long as there is any
    /// exact match only exact matches are returned; fuzzy matches are
    /// returned only when they don't shadow a possible exact match in the
    /// current group. Results are sorted so entries with fewer modifiers
    /// come first.
    pub fn lookup(
        &mut self,
        hardware_keycode: Keycode,
        state: ModifierMask,
        mask: ModifierMask,
        group: i32,
    ) -> Vec<T> {
        self.ensure_index();

        // Caps Lock never participates in binding lookups.
        let state = state & !ModifierMask::LOCK;

        let Some(translated) =
            self.keymap
                .translate_accel_state(hardware_keycode, state, group)
        else {
            return Vec::new();
        };

        // If the group-toggling modifier is part of the accelerator mask,
        // entries must also agree on it.
        let shift_group_mask = self.keymap.modifier_mask(ModifierIntent::ShiftGroup);
        let group_mod_is_accel_mod = mask.intersects(shift_group_mask);

        let mut mask = mask;
        self.keymap.map_virtual_modifiers(&mut mask);
        let mut state = state;
        self.keymap.add_virtual_modifiers(&mut state);

        trace!(
            keycode = hardware_keycode.0,
            state = state.bits(),
            keyval = translated.keyval.0,
            group = translated.effective_group,
            level = translated.level,
            consumed = translated.consumed.bits(),
            "binding lookup"
        );

        let consumed = translated.consumed;
        let mut results: Vec<usize> = Vec::new();
        let mut have_exact = false;

        let Some(buckets) = self.buckets.as_ref() else {
            return Vec::new();
        };
        let bucket = buckets
            .get(&hardware_keycode)
            .map(Vec::as_slice)
            .unwrap_or(&[]);

        for &index in bucket {
            let entry = &self.entries[index];

            // Virtual Super/Hyper/Meta are also mapped onto some of
            // Mod2–Mod5, so compare twice, ignoring either set. A
            // combination of virtual modifiers only matches when they are
            // mapped to distinct real modifiers.
            let mut modifiers = entry.modifiers;
            if !self.keymap.map_virtual_modifiers(&mut modifiers) {
                continue;
            }
            let agrees = |ignored: ModifierMask| {
                let relevant = !consumed & mask & !ignored;
                (modifiers & relevant) == (state & relevant)
            };
            if !agrees(ModifierMask::VMODS) && !agrees(ModifierMask::XMODS) {
                continue;
            }

            let exact = translated.keyval == entry.keyval
                && (!group_mod_is_accel_mod
                    || (state & shift_group_mask) == (entry.modifiers & shift_group_mask));

            if exact {
                if !have_exact {
                    results.clear();
                }
                have_exact = true;
                results.push(index);
            }

            if !have_exact {
                let fuzzy = entry.keys.iter().any(|key| {
                    key.keycode == hardware_keycode
                        && key.level == translated.level
                        && (!group_mod_is_accel_mod || key.group == translated.effective_group)
                });
                if fuzzy {
                    results.push(index);
                }
            }
        }

        if !have_exact && !results.is_empty() {
            // Fuzzy matches shadowing a keyval reachable in the current
            // group are dropped wholesale: a widget up the stack may have
            // an exact match we must not steal.
            let mut keyvals: Vec<Keyval> =
                results.iter().map(|&i| self.entries[i].keyval).collect();
            keyvals.sort_unstable();
            keyvals.dedup();
            for keyval in keyvals {
                if self.keyval_in_group(keyval, group) {
                    return Vec::new();
                }
            }
        }

        results.sort_by_key(|&i| self.entries[i].modifiers.n_bits());
        results
            .into_iter()
            .map(|i| self.entries[i].value)
            .collect()
    }

    /// Looks up entries whose keyval and modifiers match exactly, sorted by
    /// ascending modifier count.
    ///
    /// The keyval is resolved to an arbitrary keycode; use
    /// [`lookup`](Self::lookup) when the original event is available.
    pub fn lookup_keyval(&mut self, keyval: Keyval, modifiers: ModifierMask) -> Vec<T> {
        if keyval == Keyval::NONE {
            return Vec::new();
        }
        let keys = self.keymap.entries_for_keyval(keyval);
        let Some(first) = keys.first() else {
            return Vec::new();
        };
        self.ensure_index();

        let Some(buckets) = self.buckets.as_ref() else {
            return Vec::new();
        };
        let mut results: Vec<usize> = buckets
            .get(&first.keycode)
            .map(Vec::as_slice)
            .unwrap_or(&[])
            .iter()
            .copied()
            .filter(|&i| {
                let entry = &self.entries[i];
                entry.keyval == keyval && entry.modifiers == modifiers
            })
            .collect();

        results.sort_by_key(|&i| self.entries[i].modifiers.n_bits());
        results
            .into_iter()
            .map(|i| self.entries[i].value)
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::SimKeymap;

    fn keymap() -> Arc<SimKeymap> {
        let keymap = SimKeymap::new();
        // Group 0: keycode 38 -> a (both levels); group 1: keycode 38 -> q.
        keymap.add_key(Keycode(38), 0, 0, Keyval::from_char('a'));
        keymap.add_key(Keycode(38), 0, 1, Keyval::from_char('a'));
        keymap.add_key(Keycode(38), 1, 0, Keyval::from_char('q'));
        keymap.add_key(Keycode(54), 0, 0, Keyval::from_char('c'));
        Arc::new(keymap)
    }

    fn accel_mask() -> ModifierMask {
        crate::binding::accelerator::default_mod_mask()
    }

    #[test]
    fn add_lookup_remove() {
        let keymap = keymap();
        let mut hash: KeyHash<u32> = KeyHash::new(keymap);
        hash.add_entry(Keyval::from_char('a'), ModifierMask::CONTROL, 1);

        let hits = hash.lookup(Keycode(38), ModifierMask::CONTROL, accel_mask(), 0);
        assert_eq!(hits, vec![1]);

        hash.remove_entry(&1);
        let hits = hash.lookup(Keycode(38), ModifierMask::CONTROL, accel_mask(), 0);
        assert!(hits.is_empty());
    }

    #[test]
    fn modifier_count_orders_results() {
        let keymap = keymap();
        let mut hash: KeyHash<u32> = KeyHash::new(keymap);
        hash.add_entry(
            Keyval::from_char('a'),
            ModifierMask::CONTROL | ModifierMask::SHIFT,
            2,
        );
        hash.add_entry(Keyval::from_char('a'), ModifierMask::CONTROL, 1);

        // Shift is consumed producing 'A'; both entries match, fewer
        // modifiers first.
        let hits = hash.lookup(
            Keycode(38),
            ModifierMask::CONTROL | ModifierMask::SHIFT,
            accel_mask(),
            0,
        );
        assert_eq!(hits, vec![1, 2]);
    }

    #[test]
    fn exact_match_discards_fuzzy_candidates() {
        let keymap = keymap();
        let mut hash: KeyHash<u32> = KeyHash::new(keymap);
        hash.add_entry(Keyval::from_char('a'), ModifierMask::CONTROL, 1);
        hash.add_entry(Keyval::from_char('q'), ModifierMask::CONTROL, 2);

        // In group 1, keycode 38 produces 'q': the 'q' entry matches
        // exactly and the fuzzy 'a' candidate is dropped.
        let hits = hash.lookup(Keycode(38), ModifierMask::CONTROL, accel_mask(), 1);
        assert_eq!(hits, vec![2]);
    }

    #[test]
    fn fuzzy_shadowing_discards_the_set() {
        let keymap = SimKeymap::new();
        keymap.add_key(Keycode(38), 0, 0, Keyval::from_char('a'));
        keymap.add_key(Keycode(38), 1, 0, Keyval::from_char('q'));
        // 'a' is also reachable in group 1 through another keycode.
        keymap.add_key(Keycode(50), 1, 0, Keyval::from_char('a'));
        let mut hash: KeyHash<u32> = KeyHash::new(Arc::new(keymap));
        hash.add_entry(Keyval::from_char('a'), ModifierMask::CONTROL, 1);

        // Event in group 1: only a fuzzy match for 'a' exists, but 'a' is
        // reachable in group 1, so the fuzzy set is discarded.
        let hits = hash.lookup(Keycode(38), ModifierMask::CONTROL, accel_mask(), 1);
        assert!(hits.is_empty());
    }

    #[test]
    fn fuzzy_match_survives_when_not_shadowing() {
        let keymap = SimKeymap::new();
        keymap.add_key(Keycode(38), 0, 0, Keyval::from_char('a'));
        keymap.add_key(Keycode(38), 1, 0, Keyval::from_char('q'));
        let mut hash: KeyHash<u32> = KeyHash::new(Arc::new(keymap));
        hash.add_entry(Keyval::from_char('a'), ModifierMask::CONTROL, 1);

        // 'a' is not reachable in group 1, so the fuzzy match stands.
        let hits = hash.lookup(Keycode(38), ModifierMask::CONTROL, accel_mask(), 1);
        assert_eq!(hits, vec![1]);
    }

    #[test]
    fn keymap_change_rebuilds_the_index() {
        let keymap = Arc::new(SimKeymap::new());
        keymap.add_key(Keycode(38), 0, 0, Keyval::from_char('a'));
        let mut hash: KeyHash<u32> = KeyHash::new(keymap.clone());
        hash.add_entry(Keyval::from_char('a'), ModifierMask::empty(), 1);
        assert_eq!(
            hash.lookup(Keycode(38), ModifierMask::empty(), accel_mask(), 0),
            vec![1]
        );

        // Remap 'a' to a different keycode.
        keymap.clear_keys();
        keymap.add_key(Keycode(40), 0, 0, Keyval::from_char('a'));
        assert!(
            hash.lookup(Keycode(38), ModifierMask::empty(), accel_mask(), 0)
                .is_empty()
        );
        assert_eq!(
            hash.lookup(Keycode(40), ModifierMask::empty(), accel_mask(), 0),
            vec![1]
        );
    }

    #[test]
    fn lookup_keyval_matches_exactly() {
        let keymap = keymap();
        let mut hash: KeyHash<u32> = KeyHash::new(keymap);
        hash.add_entry(Keyval::from_char('a'), ModifierMask::CONTROL, 1);
        hash.add_entry(Keyval::from_char('a'), ModifierMask::empty(), 2);

        assert_eq!(
            hash.lookup_keyval(Keyval::from_char('a'), ModifierMask::CONTROL),
            vec![1]
        );
        assert_eq!(
            hash.lookup_keyval(Keyval::from_char('a'), ModifierMask::empty()),
            vec![2]
        );
        assert!(
            hash.lookup_keyval(Keyval::from_char('c'), ModifierMask::empty())
                .is_empty()
        );
    }

    #[test]
    fn removal_patches_swapped_indexes() {
        let keymap = keymap();
        let mut hash: KeyHash<u32> = KeyHash::new(keymap);
        hash.add_entry(Keyval::from_char('a'), ModifierMask::empty(), 1);
        hash.add_entry(Keyval::from_char('c'), ModifierMask::empty(), 2);
        hash.add_entry(Keyval::from_char('q'), ModifierMask::empty(), 3);
        // Build the index, then remove the first entry so the last one is
        // swapped into its slot.
        let _ = hash.lookup(Keycode(54), ModifierMask::empty(), accel_mask(), 0);
        hash.remove_entry(&1);

        assert_eq!(
            hash.lookup(Keycode(38), ModifierMask::empty(), accel_mask(), 1),
            vec![3]
        );
        assert_eq!(
            hash.lookup(Keycode(54), ModifierMask::empty(), accel_mask(), 0),
            vec![2]
        );
    }
}
