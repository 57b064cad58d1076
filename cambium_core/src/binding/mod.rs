// Copyright 2026 the Cambium Authors
// SPDX-License-Identifier: Apache-2.0

//! Key bindings.
//!
//! A [`BindingWorld`] holds named sets of bindings; each binding maps a
//! keyval and modifier mask to an ordered list of signal emissions. Raw key
//! events resolve through a keymap-aware [`KeyHash`] into a priority-ordered
//! candidate list, which activation walks across the target's style-attached
//! sets and class ancestry.

pub mod accelerator;
mod activate;
mod key_hash;
mod registry;
mod signal;

pub use accelerator::{accelerator_name, accelerator_parse};
pub use activate::{BindingTarget, binding_sets_from_style};
pub use key_hash::KeyHash;
pub use registry::{BindingSetId, BindingWorld, EntryId};
pub use signal::{
    BindingArg, EnumClass, EnumMember, FlagsClass, FlagsMember, ParamKind, ReturnKind, SignalCall,
    SignalSpec, SignalTable, SignalValue, compose_params, transform_arg,
};

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::input::{KeyEvent, Keycode, Keyval, ModifierMask};
    use crate::style::{ArrayValue, IdentValue, StaticStyle, Style, property};
    use crate::testing::{SimKeymap, TestObject};

    fn keymap() -> Arc<SimKeymap> {
        let keymap = SimKeymap::new();
        keymap.add_key(Keycode(38), 0, 0, Keyval::from_char('a'));
        keymap.add_key(Keycode(38), 1, 0, Keyval::from_char('q'));
        keymap.add_key(Keycode(50), 1, 0, Keyval::from_char('a'));
        keymap.add_key(Keycode(76), 0, 0, Keyval::function(10));
        Arc::new(keymap)
    }

    fn press(keycode: u16, state: ModifierMask, group: i32) -> KeyEvent {
        KeyEvent {
            keycode: Keycode(keycode),
            state,
            group,
            is_release: false,
        }
    }

    #[test]
    fn exact_match_beats_fuzzy_in_other_group() {
        let world = BindingWorld::new();
        let set = world.set_by_class("TestObject");
        world.entry_add_signal(set, Keyval::from_char('a'), ModifierMask::CONTROL, "on-a", []);
        world.entry_add_signal(set, Keyval::from_char('q'), ModifierMask::CONTROL, "on-q", []);

        let mut target = TestObject::new(keymap());
        target.declare_action0("on-a");
        target.declare_action0("on-q");

        // Group 1 maps keycode 38 to 'q'; the exact q binding fires and the
        // fuzzy 'a' candidate is discarded.
        assert!(world.activate_event(&mut target, &press(38, ModifierMask::CONTROL, 1)));
        assert_eq!(target.emitted(), vec!["on-q".to_string()]);
    }

    #[test]
    fn unbound_sentinel_shadows_lower_priority_sets() {
        let world = BindingWorld::new();
        // Class-ancestry order: the derived set skips F10, the base set
        // binds it.
        let derived = world.set_by_class("TestObject");
        let base = world.set_by_class("Object");
        world.entry_skip(derived, Keyval::function(10), ModifierMask::empty());
        world.entry_add_signal(base, Keyval::function(10), ModifierMask::empty(), "quit", []);

        let mut target = TestObject::new(keymap());
        target.declare_action0("quit");

        assert!(!world.activate_event(&mut target, &press(76, ModifierMask::empty(), 0)));
        assert!(target.emitted().is_empty());
    }

    #[test]
    fn style_attached_sets_outrank_class_sets() {
        let world = BindingWorld::new();
        let class_set = world.set_by_class("TestObject");
        let css_set = world.set_new("FromTheme");
        world.entry_add_signal(class_set, Keyval::from_char('a'), ModifierMask::empty(), "class-a", []);
        world.entry_add_signal(css_set, Keyval::from_char('a'), ModifierMask::empty(), "css-a", []);

        let style = StaticStyle::new(crate::style::PropertyRegistry::builtin()).with_value(
            property::BINDING_SETS,
            ArrayValue::new(vec![IdentValue::new("FromTheme")]),
        );
        let style: Arc<dyn Style> = Arc::new(style);

        let mut target = TestObject::new(keymap()).with_style(style);
        target.declare_action0("class-a");
        target.declare_action0("css-a");

        assert!(world.activate_event(&mut target, &press(38, ModifierMask::empty(), 0)));
        assert_eq!(target.emitted(), vec!["css-a".to_string()]);
    }

    #[test]
    fn release_bindings_only_fire_on_release() {
        let world = BindingWorld::new();
        let set = world.set_by_class("TestObject");
        world.entry_add_signal(
            set,
            Keyval::from_char('a'),
            ModifierMask::RELEASE,
            "on-release",
            [],
        );

        let mut target = TestObject::new(keymap());
        target.declare_action0("on-release");

        assert!(!world.activate_event(&mut target, &press(38, ModifierMask::empty(), 0)));
        let release = KeyEvent {
            is_release: true,
            ..press(38, ModifierMask::empty(), 0)
        };
        assert!(world.activate_event(&mut target, &release));
        assert_eq!(target.emitted(), vec!["on-release".to_string()]);
    }

    #[test]
    fn unmatched_event_propagates_unhandled() {
        let world = BindingWorld::new();
        let _ = world.set_by_class("TestObject");
        let mut target = TestObject::new(keymap());
        assert!(!world.activate_event(&mut target, &press(38, ModifierMask::CONTROL, 0)));
    }

    #[test]
    fn unknown_signal_is_skipped_but_others_fire() {
        let world = BindingWorld::new();
        let set = world.set_by_class("TestObject");
        world.entry_add_signal(set, Keyval::from_char('a'), ModifierMask::empty(), "missing", []);
        world.entry_add_signal(set, Keyval::from_char('a'), ModifierMask::empty(), "present", []);

        let mut target = TestObject::new(keymap());
        target.declare_action0("present");

        assert!(world.activate_event(&mut target, &press(38, ModifierMask::empty(), 0)));
        assert_eq!(target.emitted(), vec!["present".to_string()]);
    }

    #[test]
    fn bool_signal_return_decides_handled() {
        let world = BindingWorld::new();
        let set = world.set_by_class("TestObject");
        world.entry_add_signal(set, Keyval::from_char('a'), ModifierMask::empty(), "maybe", []);

        let mut target = TestObject::new(keymap());
        target.declare_action0_bool("maybe", false);
        assert!(!world.activate_event(&mut target, &press(38, ModifierMask::empty(), 0)));

        let mut target = TestObject::new(keymap());
        target.declare_action0_bool("maybe", true);
        assert!(world.activate_event(&mut target, &press(38, ModifierMask::empty(), 0)));
    }

    #[test]
    fn entry_removed_during_emission_is_deferred() {
        let world = Arc::new(BindingWorld::new());
        let set = world.set_by_class("TestObject");
        world.entry_add_signal(set, Keyval::from_char('a'), ModifierMask::empty(), "first", []);
        world.entry_add_signal(set, Keyval::from_char('a'), ModifierMask::empty(), "second", []);

        let mut target = TestObject::new(keymap());
        target.declare_action0("first");
        target.declare_action0("second");
        // The handler for "first" removes the very binding being emitted.
        let world_in_handler = world.clone();
        target.on_emit(move |signal| {
            if signal == "first" {
                world_in_handler.entry_remove(
                    world_in_handler.set_find("TestObject").unwrap(),
                    Keyval::from_char('a'),
                    ModifierMask::empty(),
                );
            }
        });

        // The removal mid-emission stops the signal walk but must not
        // crash or fire the second signal.
        assert!(world.activate_event(&mut target, &press(38, ModifierMask::empty(), 0)));
        assert_eq!(target.emitted(), vec!["first".to_string()]);

        // The entry is gone afterwards.
        assert!(!world.activate_event(&mut target, &press(38, ModifierMask::empty(), 0)));
    }

    #[test]
    fn activate_by_keyval_matches_exact_modifiers() {
        let world = BindingWorld::new();
        let set = world.set_by_class("TestObject");
        world.entry_add_signal(set, Keyval::from_char('a'), ModifierMask::CONTROL, "go", []);

        let mut target = TestObject::new(keymap());
        target.declare_action0("go");

        assert!(world.activate(&mut target, Keyval::from_char('a'), ModifierMask::CONTROL));
        assert!(!world.activate(&mut target, Keyval::from_char('a'), ModifierMask::empty()));
    }
}
