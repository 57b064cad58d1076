// Copyright 2026 the Cambium Authors
// SPDX-License-Identifier: Apache-2.0

//! Accelerator strings: `<Control><Shift>a`, `<Release>F10`, …

use std::fmt::Write;

use crate::input::{Keyval, ModifierMask};

/// The modifiers considered when matching accelerators.
pub fn default_mod_mask() -> ModifierMask {
    ModifierMask::CONTROL
        | ModifierMask::SHIFT
        | ModifierMask::MOD1
        | ModifierMask::SUPER
        | ModifierMask::HYPER
        | ModifierMask::META
}

/// The accelerator mask plus the release bit; entries store modifiers
/// masked to this.
pub fn binding_mod_mask() -> ModifierMask {
    default_mod_mask() | ModifierMask::RELEASE
}

fn modifier_by_name(name: &str) -> Option<ModifierMask> {
    let mask = match name.to_ascii_lowercase().as_str() {
        "shift" | "shft" => ModifierMask::SHIFT,
        "control" | "ctrl" | "ctl" | "primary" => ModifierMask::CONTROL,
        "alt" | "mod1" => ModifierMask::MOD1,
        "mod2" => ModifierMask::MOD2,
        "mod3" => ModifierMask::MOD3,
        "mod4" => ModifierMask::MOD4,
        "mod5" => ModifierMask::MOD5,
        "super" => ModifierMask::SUPER,
        "hyper" => ModifierMask::HYPER,
        "meta" => ModifierMask::META,
        "release" => ModifierMask::RELEASE,
        _ => return None,
    };
    Some(mask)
}

/// Parses an accelerator string into a keyval and modifier mask.
///
/// Returns `None` for malformed input or unknown key names; the keyval is
/// returned as written (callers lowercase where they need to).
pub fn accelerator_parse(accelerator: &str) -> Option<(Keyval, ModifierMask)> {
    let mut rest = accelerator.trim();
    let mut modifiers = ModifierMask::empty();

    while let Some(tail) = rest.strip_prefix('<') {
        let end = tail.find('>')?;
        modifiers |= modifier_by_name(&tail[..end])?;
        rest = &tail[end + 1..];
    }

    if rest.is_empty() {
        return None;
    }
    let keyval = Keyval::from_name(rest)?;
    Some((keyval, modifiers))
}

/// The canonical, re-parsable name of an accelerator.
pub fn accelerator_name(keyval: Keyval, modifiers: ModifierMask) -> String {
    let mut out = String::new();
    for (mask, name) in [
        (ModifierMask::RELEASE, "<Release>"),
        (ModifierMask::SHIFT, "<Shift>"),
        (ModifierMask::CONTROL, "<Control>"),
        (ModifierMask::MOD1, "<Alt>"),
        (ModifierMask::MOD2, "<Mod2>"),
        (ModifierMask::MOD3, "<Mod3>"),
        (ModifierMask::MOD4, "<Mod4>"),
        (ModifierMask::MOD5, "<Mod5>"),
        (ModifierMask::SUPER, "<Super>"),
        (ModifierMask::HYPER, "<Hyper>"),
        (ModifierMask::META, "<Meta>"),
    ] {
        if modifiers.contains(mask) {
            let _ = write!(out, "{name}");
        }
    }
    out.push_str(&keyval.name());
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_modifiers_and_key() {
        let (keyval, mods) = accelerator_parse("<Control><Shift>a").unwrap();
        assert_eq!(keyval, Keyval::from_char('a'));
        assert_eq!(mods, ModifierMask::CONTROL | ModifierMask::SHIFT);
    }

    #[test]
    fn modifier_names_are_case_insensitive() {
        let (_, mods) = accelerator_parse("<ctrl><SHIFT>x").unwrap();
        assert_eq!(mods, ModifierMask::CONTROL | ModifierMask::SHIFT);
    }

    #[test]
    fn named_keys_and_release() {
        let (keyval, mods) = accelerator_parse("<Release>F10").unwrap();
        assert_eq!(keyval, Keyval::function(10));
        assert!(mods.contains(ModifierMask::RELEASE));
    }

    #[test]
    fn name_round_trips() {
        for accel in ["<Control>a", "<Shift><Alt>Tab", "<Release>F10", "space"] {
            let (keyval, mods) = accelerator_parse(accel).unwrap();
            let name = accelerator_name(keyval, mods);
            assert_eq!(accelerator_parse(&name).unwrap(), (keyval, mods));
        }
    }

    #[test]
    fn garbage_is_rejected() {
        assert!(accelerator_parse("").is_none());
        assert!(accelerator_parse("<NoSuchMod>a").is_none());
        assert!(accelerator_parse("<Control>").is_none());
        assert!(accelerator_parse("<Control").is_none());
    }
}
