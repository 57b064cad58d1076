// Copyright 2026 the Cambium Authors
// SPDX-License-Identifier: Apache-2.0

//! A table-driven keymap for tests.

use std::cell::RefCell;
use std::fmt;

use crate::binding::accelerator::default_mod_mask;
use crate::input::{
    AccelTranslation, Keycode, Keymap, KeymapKey, Keyval, ModifierIntent, ModifierMask,
};

#[derive(Clone, Copy)]
struct SimKey {
    keycode: Keycode,
    group: i32,
    level: i32,
    keyval: Keyval,
}

struct SimKeymapState {
    keys: Vec<SimKey>,
    /// `(virtual, real)` aliases, e.g. Super → Mod4.
    virtual_aliases: Vec<(ModifierMask, ModifierMask)>,
    shift_group_mask: ModifierMask,
    generation: u64,
}

/// A keymap whose layout is configured by the test.
///
/// Every mutation bumps the generation, so caches keyed on it rebuild just
/// like after a real keys-changed notification.
pub struct SimKeymap {
    state: RefCell<SimKeymapState>,
}

impl fmt::Debug for SimKeymap {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = self.state.borrow();
        f.debug_struct("SimKeymap")
            .field("n_keys", &state.keys.len())
            .field("generation", &state.generation)
            .finish()
    }
}

impl Default for SimKeymap {
    fn default() -> Self {
        Self::new()
    }
}

impl SimKeymap {
    /// An empty keymap.
    pub fn new() -> Self {
        Self {
            state: RefCell::new(SimKeymapState {
                keys: Vec::new(),
                virtual_aliases: Vec::new(),
                shift_group_mask: ModifierMask::empty(),
                generation: 1,
            }),
        }
    }

    /// Maps `(keycode, group, level)` to `keyval`.
    pub fn add_key(&self, keycode: Keycode, group: i32, level: i32, keyval: Keyval) {
        let mut state = self.state.borrow_mut();
        state.keys.push(SimKey {
            keycode,
            group,
            level,
            keyval,
        });
        state.generation += 1;
    }

    /// Drops all key mappings.
    pub fn clear_keys(&self) {
        let mut state = self.state.borrow_mut();
        state.keys.clear();
        state.generation += 1;
    }

    /// Aliases a virtual modifier to a real one (e.g. Super → Mod4).
    pub fn alias_virtual(&self, virtual_mod: ModifierMask, real_mod: ModifierMask) {
        let mut state = self.state.borrow_mut();
        state.virtual_aliases.push((virtual_mod, real_mod));
        state.generation += 1;
    }

    /// Declares which modifier toggles keyboard groups.
    pub fn set_shift_group_mask(&self, mask: ModifierMask) {
        let mut state = self.state.borrow_mut();
        state.shift_group_mask = mask;
        state.generation += 1;
    }
}

impl Keymap for SimKeymap {
    fn entries_for_keyval(&self, keyval: Keyval) -> Vec<KeymapKey> {
        self.state
            .borrow()
            .keys
            .iter()
            .filter(|key| key.keyval == keyval)
            .map(|key| KeymapKey {
                keycode: key.keycode,
                group: key.group,
                level: key.level,
            })
            .collect()
    }

    fn translate_accel_state(
        &self,
        keycode: Keycode,
        state: ModifierMask,
        group: i32,
    ) -> Option<AccelTranslation> {
        let keymap = self.state.borrow();
        let for_code: Vec<&SimKey> = keymap
            .keys
            .iter()
            .filter(|key| key.keycode == keycode)
            .collect();
        if for_code.is_empty() {
            return None;
        }

        // Keys lacking the requested group fall back to their first group.
        let effective_group = if for_code.iter().any(|key| key.group == group) {
            group
        } else {
            for_code[0].group
        };

        let at_level = |level: i32| {
            for_code
                .iter()
                .find(|key| key.group == effective_group && key.level == level)
                .map(|key| key.keyval)
        };

        let shifted = state.contains(ModifierMask::SHIFT) && at_level(1).is_some();
        let level = i32::from(shifted);
        let keyval = at_level(level)?;
        let consumed = if shifted {
            ModifierMask::SHIFT
        } else {
            ModifierMask::empty()
        };

        Some(AccelTranslation {
            keyval,
            effective_group,
            level,
            consumed,
        })
    }

    fn map_virtual_modifiers(&self, mask: &mut ModifierMask) -> bool {
        let state = self.state.borrow();
        // Two virtual modifiers aliased to the same real modifier can't
        // both be matched.
        for (i, (virt_a, real_a)) in state.virtual_aliases.iter().enumerate() {
            for (virt_b, real_b) in &state.virtual_aliases[i + 1..] {
                if real_a == real_b && mask.contains(*virt_a) && mask.contains(*virt_b) {
                    return false;
                }
            }
        }
        for (virt, real) in &state.virtual_aliases {
            if mask.intersects(*virt) {
                *mask |= *real;
            }
        }
        true
    }

    fn add_virtual_modifiers(&self, state_mask: &mut ModifierMask) {
        let state = self.state.borrow();
        for (virt, real) in &state.virtual_aliases {
            if state_mask.intersects(*real) {
                *state_mask |= *virt;
            }
        }
    }

    fn modifier_mask(&self, intent: ModifierIntent) -> ModifierMask {
        match intent {
            ModifierIntent::PrimaryAccelerator => ModifierMask::CONTROL,
            ModifierIntent::ShiftGroup => self.state.borrow().shift_group_mask,
            ModifierIntent::DefaultModMask => default_mod_mask(),
        }
    }

    fn generation(&self) -> u64 {
        self.state.borrow().generation
    }
}
