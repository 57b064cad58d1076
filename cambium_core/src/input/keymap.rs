// Copyright 2026 the Cambium Authors
// SPDX-License-Identifier: Apache-2.0

//! The keymap contract consumed by key-binding resolution.

use std::fmt;

use crate::input::keyval::Keyval;
use crate::input::modifiers::{ModifierIntent, ModifierMask};

/// A hardware scancode.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Keycode(pub u16);

impl fmt::Debug for Keycode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Keycode({})", self.0)
    }
}

/// One position in the keymap that produces a given keyval.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct KeymapKey {
    /// Hardware keycode.
    pub keycode: Keycode,
    /// Keymap group (layout layer).
    pub group: i32,
    /// Shift level within the group.
    pub level: i32,
}

/// The result of translating a raw key event for accelerator matching.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AccelTranslation {
    /// The produced symbolic key.
    pub keyval: Keyval,
    /// The group actually used (after fallback for single-group keys).
    pub effective_group: i32,
    /// The shift level actually used.
    pub level: i32,
    /// Modifiers that participated in producing the keyval and must be
    /// ignored during accelerator comparison.
    pub consumed: ModifierMask,
}

/// Layout information provided by the display backend.
///
/// A keymap is long-lived; when the server reconfigures it, implementations
/// bump [`generation`](Self::generation) so dependent caches rebuild on their
/// next query.
pub trait Keymap {
    /// Every position that produces `keyval`.
    fn entries_for_keyval(&self, keyval: Keyval) -> Vec<KeymapKey>;

    /// Translates a raw event to a keyval, or `None` if the keycode produces
    /// nothing in this layout.
    fn translate_accel_state(
        &self,
        keycode: Keycode,
        state: ModifierMask,
        group: i32,
    ) -> Option<AccelTranslation>;

    /// Replaces virtual modifiers in `mask` by the real modifiers they are
    /// mapped to (keeping the virtual bits).
    ///
    /// Returns `false` when two virtual modifiers in `mask` map to the same
    /// real modifier, which makes the combination unmatchable.
    fn map_virtual_modifiers(&self, mask: &mut ModifierMask) -> bool;

    /// Adds the virtual names of any mapped real modifiers present in
    /// `state`.
    fn add_virtual_modifiers(&self, state: &mut ModifierMask);

    /// The modifier mask serving `intent` in this layout.
    fn modifier_mask(&self, intent: ModifierIntent) -> ModifierMask;

    /// Monotonic counter, bumped whenever the layout changes.
    fn generation(&self) -> u64;
}

/// The raw fields of a keyboard event, as handed over by the display
/// backend.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct KeyEvent {
    /// Hardware keycode.
    pub keycode: Keycode,
    /// Modifier state at event time.
    pub state: ModifierMask,
    /// Keymap group at event time.
    pub group: i32,
    /// Whether this is a key release.
    pub is_release: bool,
}
