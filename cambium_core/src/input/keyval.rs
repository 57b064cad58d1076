// Copyright 2026 the Cambium Authors
// SPDX-License-Identifier: Apache-2.0

//! Symbolic key identifiers.

use std::fmt;

/// A symbolic key identifier, independent of keyboard layout.
///
/// Values follow the X11 keysym encoding: printable Latin-1 keys are their
/// character code, function and navigation keys live in the `0xff00` page.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Keyval(pub u32);

impl Keyval {
    /// The absent keyval; produced by keys with no symbol.
    pub const NONE: Self = Self(0);

    /// `BackSpace`.
    pub const BACKSPACE: Self = Self(0xff08);
    /// `Tab`.
    pub const TAB: Self = Self(0xff09);
    /// `Return`.
    pub const RETURN: Self = Self(0xff0d);
    /// `Escape`.
    pub const ESCAPE: Self = Self(0xff1b);
    /// `Left`.
    pub const LEFT: Self = Self(0xff51);
    /// `Up`.
    pub const UP: Self = Self(0xff52);
    /// `Right`.
    pub const RIGHT: Self = Self(0xff53);
    /// `Down`.
    pub const DOWN: Self = Self(0xff54);
    /// `Delete`.
    pub const DELETE: Self = Self(0xffff);
    /// `space`.
    pub const SPACE: Self = Self(0x20);
    /// The shifted counterpart of `Tab`.
    pub const ISO_LEFT_TAB: Self = Self(0xfe20);

    /// `F1`; `F1..=F35` are consecutive.
    pub const F1: Self = Self(0xffbe);

    /// The function key `Fn`, for `n` in `1..=35`.
    pub fn function(n: u32) -> Self {
        debug_assert!((1..=35).contains(&n), "function keys are F1..=F35");
        Self(Self::F1.0 + (n - 1))
    }

    /// Creates a keyval from a character.
    pub fn from_char(c: char) -> Self {
        Self(c as u32)
    }

    /// Lowercases letter keyvals; everything else passes through.
    pub fn to_lower(self) -> Self {
        match char::from_u32(self.0) {
            Some(c) if c.is_ascii_uppercase() => Self(self.0 + 0x20),
            _ if self == Self::ISO_LEFT_TAB => Self::TAB,
            _ => self,
        }
    }

    /// Uppercases letter keyvals; everything else passes through.
    pub fn to_upper(self) -> Self {
        match char::from_u32(self.0) {
            Some(c) if c.is_ascii_lowercase() => Self(self.0 - 0x20),
            _ => self,
        }
    }

    /// The key's name, as used in accelerator strings.
    pub fn name(self) -> String {
        if let Some(name) = named_keyvals()
            .iter()
            .find(|(_, v)| *v == self)
            .map(|(n, _)| *n)
        {
            return name.to_string();
        }
        if (Self::F1.0..Self::F1.0 + 35).contains(&self.0) {
            return format!("F{}", self.0 - Self::F1.0 + 1);
        }
        match char::from_u32(self.0) {
            Some(c) if c.is_ascii_graphic() => c.to_string(),
            _ => format!("0x{:x}", self.0),
        }
    }

    /// Resolves a key name. The reverse of [`name`](Self::name).
    pub fn from_name(name: &str) -> Option<Self> {
        if let Some((_, v)) = named_keyvals()
            .iter()
            .find(|(n, _)| n.eq_ignore_ascii_case(name))
        {
            return Some(*v);
        }
        if let Some(n) = name.strip_prefix(['F', 'f'])
            && let Ok(n) = n.parse::<u32>()
            && (1..=35).contains(&n)
        {
            return Some(Self::function(n));
        }
        let mut chars = name.chars();
        match (chars.next(), chars.next()) {
            (Some(c), None) => Some(Self::from_char(c)),
            _ => None,
        }
    }
}

fn named_keyvals() -> &'static [(&'static str, Keyval)] {
    &[
        ("BackSpace", Keyval::BACKSPACE),
        ("Tab", Keyval::TAB),
        ("ISO_Left_Tab", Keyval::ISO_LEFT_TAB),
        ("Return", Keyval::RETURN),
        ("Escape", Keyval::ESCAPE),
        ("space", Keyval::SPACE),
        ("Left", Keyval::LEFT),
        ("Up", Keyval::UP),
        ("Right", Keyval::RIGHT),
        ("Down", Keyval::DOWN),
        ("Delete", Keyval::DELETE),
    ]
}

impl fmt::Debug for Keyval {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Keyval({})", self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn case_mapping() {
        assert_eq!(Keyval::from_char('A').to_lower(), Keyval::from_char('a'));
        assert_eq!(Keyval::from_char('a').to_upper(), Keyval::from_char('A'));
        assert_eq!(Keyval::TAB.to_lower(), Keyval::TAB);
        assert_eq!(Keyval::ISO_LEFT_TAB.to_lower(), Keyval::TAB);
    }

    #[test]
    fn names_round_trip() {
        for name in ["a", "F10", "Tab", "Return", "space", "Left"] {
            let keyval = Keyval::from_name(name).unwrap();
            assert_eq!(keyval.name(), name);
        }
        assert_eq!(Keyval::from_name("F10"), Some(Keyval::function(10)));
        assert_eq!(Keyval::from_name("NoSuchKey"), None);
    }
}
