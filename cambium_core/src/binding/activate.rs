// Copyright 2026 the Cambium Authors
// SPDX-License-Identifier: Apache-2.0

//! Binding activation: from a key event to signal emissions on a target.

use std::sync::Arc;

use tracing::{debug, info_span, trace};

use crate::binding::accelerator::binding_mod_mask;
use crate::binding::registry::{BindingSetId, BindingWorld, EntryId, warn_signal};
use crate::binding::signal::{SignalTable, SignalValue, compose_params};
use crate::input::{KeyEvent, Keymap, Keyval, ModifierMask};
use crate::style::{ArrayValue, IdentValue, Style, property};

/// An object key bindings can activate signals on.
///
/// Widgets implement this; the binding walk consults the target's
/// style-attached binding sets first, then the sets named after each type
/// in its class chain.
pub trait BindingTarget {
    /// The target's type names, most derived first.
    fn class_chain(&self) -> &[&'static str];

    /// The keymap of the target's display.
    fn keymap(&self) -> Arc<dyn Keymap>;

    /// The target's resolved style, for the `-binding-sets` property.
    fn style(&self) -> Option<Arc<dyn Style>> {
        None
    }

    /// The signals this target declares.
    fn signals(&self) -> &SignalTable;

    /// Emits a signal.
    ///
    /// Returns `None` for void signals and `Some(handled)` for boolean
    /// ones. Callers treat void emissions and `Some(true)` as handled.
    fn emit(&mut self, signal: &str, args: &[SignalValue]) -> Option<bool>;
}

/// The binding-set names a style attaches, highest priority first.
pub fn binding_sets_from_style(style: &dyn Style) -> Vec<String> {
    let value = style.get_value(property::BINDING_SETS);
    let Some(array) = value.downcast_ref::<ArrayValue>() else {
        return Vec::new();
    };
    array
        .iter()
        .filter_map(|v| v.downcast_ref::<IdentValue>())
        .map(|ident| ident.name().to_string())
        .filter(|name| name != "none")
        .collect()
}

enum SetOutcome {
    Handled,
    Pass,
    Unbound,
}

impl BindingWorld {
    /// Finds a key binding matching `keyval` and `modifiers` and activates
    /// it on `target`. Returns `true` if a binding was found and handled.
    pub fn activate(
        &self,
        target: &mut dyn BindingTarget,
        keyval: Keyval,
        modifiers: ModifierMask,
    ) -> bool {
        let _span = info_span!("bindings_activate").entered();
        let is_release = modifiers.contains(ModifierMask::RELEASE);
        let modifiers = modifiers & binding_mod_mask() & !ModifierMask::RELEASE;

        let keymap = target.keymap();
        let candidates = {
            let mut inner = self.inner.borrow_mut();
            let index = inner.key_hash_for_keymap(&keymap);
            inner.key_hash_at(index).lookup_keyval(keyval, modifiers)
        };
        self.activate_list(target, &candidates, is_release)
    }

    /// Finds and activates a key binding for a raw key event.
    ///
    /// Unlike [`activate`](Self::activate), this can use fuzzy keymap
    /// matches (same keycode and level, different group).
    pub fn activate_event(&self, target: &mut dyn BindingTarget, event: &KeyEvent) -> bool {
        let _span = info_span!("bindings_activate_event").entered();
        let keymap = target.keymap();
        let candidates = {
            let mut inner = self.inner.borrow_mut();
            let index = inner.key_hash_for_keymap(&keymap);
            inner.key_hash_at(index).lookup(
                event.keycode,
                event.state,
                binding_mod_mask() & !ModifierMask::RELEASE,
                event.group,
            )
        };
        self.activate_list(target, &candidates, event.is_release)
    }

    /// Activates the binding for `(keyval, modifiers)` within one set.
    pub fn set_activate(
        &self,
        set: BindingSetId,
        keyval: Keyval,
        modifiers: ModifierMask,
        target: &mut dyn BindingTarget,
    ) -> bool {
        let keyval = keyval.to_lower();
        let modifiers = modifiers & binding_mod_mask();
        let entry = self.inner.borrow().lookup_entry(set, keyval, modifiers);
        match entry {
            Some(entry) => self.entry_activate(entry, target),
            None => false,
        }
    }

    /// Walks the target's binding sets with a candidate list.
    ///
    /// Style-attached sets come first, then class-ancestry sets from most
    /// derived to root. The walk stops at the first handled entry; an
    /// unbound sentinel aborts the whole walk unhandled.
    fn activate_list(
        &self,
        target: &mut dyn BindingTarget,
        candidates: &[EntryId],
        is_release: bool,
    ) -> bool {
        if candidates.is_empty() {
            return false;
        }
        trace!(n_candidates = candidates.len(), is_release, "activating binding candidates");

        if let Some(style) = target.style() {
            for name in binding_sets_from_style(style.as_ref()) {
                let Some(set) = self.set_find(&name) else {
                    continue;
                };
                match self.set_activate_candidates(set, candidates, target, is_release) {
                    SetOutcome::Handled => return true,
                    SetOutcome::Unbound => return false,
                    SetOutcome::Pass => {}
                }
            }
        }

        let class_chain: Vec<&'static str> = target.class_chain().to_vec();
        for class_name in class_chain {
            let Some(set) = self.set_find(class_name) else {
                continue;
            };
            match self.set_activate_candidates(set, candidates, target, is_release) {
                SetOutcome::Handled => return true,
                SetOutcome::Unbound => return false,
                SetOutcome::Pass => {}
            }
        }

        false
    }

    /// Tries the first candidate belonging to `set`.
    fn set_activate_candidates(
        &self,
        set: BindingSetId,
        candidates: &[EntryId],
        target: &mut dyn BindingTarget,
        is_release: bool,
    ) -> SetOutcome {
        let found = {
            let inner = self.inner.borrow();
            candidates.iter().copied().find_map(|id| {
                let data = inner.entry(id)?;
                if data.destroyed || data.set != set {
                    return None;
                }
                Some((id, data.modifiers.contains(ModifierMask::RELEASE), data.marks_unbound))
            })
        };
        let Some((entry, wants_release, marks_unbound)) = found else {
            return SetOutcome::Pass;
        };
        if is_release != wants_release {
            return SetOutcome::Pass;
        }
        if marks_unbound {
            return SetOutcome::Unbound;
        }
        if self.entry_activate(entry, target) {
            SetOutcome::Handled
        } else {
            SetOutcome::Pass
        }
    }

    /// Emits an entry's signal list on `target`.
    ///
    /// The entry is flagged `in_emission` for the duration so a handler
    /// removing it only defers the free; nested activation of the same
    /// entry restores the outer flag on unwind.
    pub(crate) fn entry_activate(&self, entry: EntryId, target: &mut dyn BindingTarget) -> bool {
        let (signals, keyval, modifiers, set_name, old_emission) = {
            let mut inner = self.inner.borrow_mut();
            let set_name: Box<str> = match inner.entry(entry) {
                Some(data) => inner.sets[data.set.0 as usize].name.clone(),
                None => return false,
            };
            let Some(data) = inner.entry_mut(entry) else {
                return false;
            };
            let old_emission = data.in_emission;
            data.in_emission = true;
            (
                data.signals.clone(),
                data.keyval,
                data.modifiers,
                set_name,
                old_emission,
            )
        };

        let target_type = target.class_chain().first().copied().unwrap_or("unknown");
        let mut handled = false;

        for call in &signals {
            let Some(spec) = target.signals().lookup(&call.signal_name) else {
                warn_signal(
                    &set_name,
                    keyval,
                    modifiers,
                    &call.signal_name,
                    target_type,
                    "could not be found",
                );
                continue;
            };
            if spec.params.len() != call.args.len() {
                warn_signal(
                    &set_name,
                    keyval,
                    modifiers,
                    &call.signal_name,
                    target_type,
                    "has a signature mismatch",
                );
                continue;
            }
            let Some(params) = compose_params(&call.args, spec) else {
                warn_signal(
                    &set_name,
                    keyval,
                    modifiers,
                    &call.signal_name,
                    target_type,
                    "has a signature mismatch",
                );
                continue;
            };
            if !spec.action {
                warn_signal(
                    &set_name,
                    keyval,
                    modifiers,
                    &call.signal_name,
                    target_type,
                    "cannot be used for action emissions",
                );
                continue;
            }

            debug!(signal = &*call.signal_name, "emitting binding signal");
            // No world borrow is held here; the handler may re-enter.
            let result = target.emit(&call.signal_name, &params);
            handled |= result.unwrap_or(true);

            let destroyed = {
                let inner = self.inner.borrow();
                inner.entry(entry).is_none_or(|data| data.destroyed)
            };
            if destroyed {
                break;
            }
        }

        {
            let mut inner = self.inner.borrow_mut();
            if let Some(data) = inner.entry_mut(entry) {
                data.in_emission = old_emission;
                if data.destroyed && !data.in_emission {
                    inner.entries[entry.0 as usize] = None;
                }
            }
        }

        handled
    }
}
