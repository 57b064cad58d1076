// Copyright 2026 the Cambium Authors
// SPDX-License-Identifier: Apache-2.0

//! Modifier masks.
//!
//! The bit layout follows the X11 convention: real modifiers in the low
//! bits, buttons from bit 8, the keyboard group in bits 13–14, and the
//! virtual Super/Hyper/Meta names in high bits so they can coexist with
//! whatever real modifiers they alias.

use bitflags::bitflags;

bitflags! {
    /// A set of keyboard modifiers and pointer buttons.
    #[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
    pub struct ModifierMask: u32 {
        /// Shift.
        const SHIFT = 1 << 0;
        /// Caps Lock.
        const LOCK = 1 << 1;
        /// Control.
        const CONTROL = 1 << 2;
        /// Mod1, usually Alt.
        const MOD1 = 1 << 3;
        /// Mod2, usually Num Lock.
        const MOD2 = 1 << 4;
        /// Mod3.
        const MOD3 = 1 << 5;
        /// Mod4, usually Super.
        const MOD4 = 1 << 6;
        /// Mod5.
        const MOD5 = 1 << 7;
        /// Primary pointer button.
        const BUTTON1 = 1 << 8;
        /// Middle pointer button.
        const BUTTON2 = 1 << 9;
        /// Secondary pointer button.
        const BUTTON3 = 1 << 10;
        /// Back button.
        const BUTTON4 = 1 << 11;
        /// Forward button.
        const BUTTON5 = 1 << 12;
        /// Low bit of the keyboard group.
        const GROUP_BIT_0 = 1 << 13;
        /// High bit of the keyboard group.
        const GROUP_BIT_1 = 1 << 14;
        /// Virtual Super.
        const SUPER = 1 << 26;
        /// Virtual Hyper.
        const HYPER = 1 << 27;
        /// Virtual Meta.
        const META = 1 << 28;
        /// Marks a binding that fires on key release.
        const RELEASE = 1 << 30;
    }
}

impl ModifierMask {
    /// The physical Mod2–Mod5 modifiers virtual names may alias to.
    pub const XMODS: Self = Self::MOD2
        .union(Self::MOD3)
        .union(Self::MOD4)
        .union(Self::MOD5);

    /// The virtual Super/Hyper/Meta modifiers.
    pub const VMODS: Self = Self::SUPER.union(Self::HYPER).union(Self::META);

    /// Encodes a keyboard group into the group bits.
    pub fn for_group(group: i32) -> Self {
        Self::from_bits_retain(((group as u32) & 0x3) << 13)
    }

    /// Number of set bits; fewer-modifier matches sort first.
    pub fn n_bits(self) -> u32 {
        self.bits().count_ones()
    }
}

/// Purposes a keymap can report modifier masks for.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ModifierIntent {
    /// The primary accelerator modifier (usually Control).
    PrimaryAccelerator,
    /// The modifier that switches keyboard groups, if it acts as one.
    ShiftGroup,
    /// All modifiers considered for accelerator matching.
    DefaultModMask,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn group_encoding() {
        assert_eq!(ModifierMask::for_group(0), ModifierMask::empty());
        assert_eq!(ModifierMask::for_group(1), ModifierMask::GROUP_BIT_0);
        assert_eq!(
            ModifierMask::for_group(3),
            ModifierMask::GROUP_BIT_0 | ModifierMask::GROUP_BIT_1
        );
    }

    #[test]
    fn bit_counting() {
        let mask = ModifierMask::CONTROL | ModifierMask::SHIFT;
        assert_eq!(mask.n_bits(), 2);
        assert_eq!(ModifierMask::empty().n_bits(), 0);
    }
}
