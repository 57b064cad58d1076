// Copyright 2026 the Cambium Authors
// SPDX-License-Identifier: Apache-2.0

//! The binding registry: named sets of key bindings.
//!
//! All registry state lives behind one [`BindingWorld`] handle. Signal
//! handlers may re-enter the world during activation (to add or remove
//! bindings), so the interior state is only borrowed between emissions and
//! entry destruction mid-emission is deferred until the emission unwinds.

use std::cell::RefCell;
use std::fmt;
use std::sync::Arc;

use hashbrown::HashMap;
use smallvec::SmallVec;
use tracing::warn;

use crate::binding::accelerator::{accelerator_parse, binding_mod_mask};
use crate::binding::key_hash::KeyHash;
use crate::binding::signal::{BindingArg, SignalCall};
use crate::input::{Keymap, Keyval, ModifierMask};
use crate::style::{ParseError, Parser};

/// Identifies a binding set within its world.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct BindingSetId(pub(crate) u32);

impl fmt::Debug for BindingSetId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "BindingSetId({})", self.0)
    }
}

/// Identifies a binding entry within its world.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct EntryId(pub(crate) u32);

impl fmt::Debug for EntryId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "EntryId({})", self.0)
    }
}

pub(crate) struct SetData {
    pub(crate) name: Box<str>,
    pub(crate) entries: Vec<EntryId>,
}

pub(crate) struct EntryData {
    pub(crate) keyval: Keyval,
    pub(crate) modifiers: ModifierMask,
    pub(crate) set: BindingSetId,
    pub(crate) signals: Vec<SignalCall>,
    /// A sentinel that aborts the set walk without firing.
    pub(crate) marks_unbound: bool,
    /// The entry is currently emitting; destruction is deferred.
    pub(crate) in_emission: bool,
    /// Destroyed while emitting; freed when the emission unwinds.
    pub(crate) destroyed: bool,
}

pub(crate) struct WorldInner {
    pub(crate) sets: Vec<SetData>,
    set_by_name: HashMap<Box<str>, BindingSetId>,
    pub(crate) entries: Vec<Option<EntryData>>,
    entry_lookup: HashMap<(BindingSetId, Keyval, ModifierMask), EntryId>,
    /// One key hash per keymap seen, keyed by keymap identity.
    key_hashes: Vec<(usize, KeyHash<EntryId>)>,
}

/// The process-wide binding state, as an explicit handle.
///
/// Production code creates one world at toolkit startup; tests create a
/// fresh world each to avoid cross-test leakage.
#[derive(Default)]
pub struct BindingWorld {
    pub(crate) inner: RefCell<WorldInner>,
}

impl Default for WorldInner {
    fn default() -> Self {
        Self {
            sets: Vec::new(),
            set_by_name: HashMap::new(),
            entries: Vec::new(),
            entry_lookup: HashMap::new(),
            key_hashes: Vec::new(),
        }
    }
}

impl fmt::Debug for BindingWorld {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let inner = self.inner.borrow();
        f.debug_struct("BindingWorld")
            .field("n_sets", &inner.sets.len())
            .field("n_entries", &inner.entries.iter().filter(|e| e.is_some()).count())
            .finish()
    }
}

impl BindingWorld {
    /// An empty world.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a binding set under `name`.
    ///
    /// Names are not deduplicated; when several sets share a name,
    /// [`set_find`](Self::set_find) resolves to the most recently created.
    pub fn set_new(&self, name: &str) -> BindingSetId {
        let mut inner = self.inner.borrow_mut();
        let id = BindingSetId(inner.sets.len() as u32);
        inner.sets.push(SetData {
            name: name.into(),
            entries: Vec::new(),
        });
        inner.set_by_name.insert(name.into(), id);
        id
    }

    /// Finds a binding set by name.
    pub fn set_find(&self, name: &str) -> Option<BindingSetId> {
        self.inner.borrow().set_by_name.get(name).copied()
    }

    /// The binding set named after a type, created on demand.
    pub fn set_by_class(&self, type_name: &str) -> BindingSetId {
        if let Some(id) = self.set_find(type_name) {
            return id;
        }
        self.set_new(type_name)
    }

    /// A set's name.
    pub fn set_name(&self, set: BindingSetId) -> String {
        self.inner.borrow().sets[set.0 as usize].name.to_string()
    }

    /// The number of live entries in `set`.
    pub fn set_len(&self, set: BindingSetId) -> usize {
        let inner = self.inner.borrow();
        inner.sets[set.0 as usize]
            .entries
            .iter()
            .filter(|id| inner.entry(**id).is_some())
            .count()
    }

    /// Appends a signal emission to the binding for `(keyval, modifiers)`,
    /// installing the binding if it doesn't exist yet.
    ///
    /// The keyval is stored lowercased; `modifiers` is masked to the
    /// accelerator modifiers plus the release bit.
    pub fn entry_add_signal(
        &self,
        set: BindingSetId,
        keyval: Keyval,
        modifiers: ModifierMask,
        signal_name: &str,
        args: impl IntoIterator<Item = BindingArg>,
    ) {
        let keyval = keyval.to_lower();
        let modifiers = modifiers & binding_mod_mask();
        let call = SignalCall {
            signal_name: signal_name.into(),
            args: args.into_iter().collect(),
        };

        let mut inner = self.inner.borrow_mut();
        let entry = match inner.lookup_entry(set, keyval, modifiers) {
            Some(entry) => entry,
            None => inner.entry_new(set, keyval, modifiers),
        };
        if let Some(data) = inner.entry_mut(entry) {
            data.signals.push(call);
        }
    }

    /// Replaces the binding for `(keyval, modifiers)` with an unbound
    /// sentinel: lookups hitting it abort without firing, preventing lower
    /// priority sets from activating.
    pub fn entry_skip(&self, set: BindingSetId, keyval: Keyval, modifiers: ModifierMask) {
        let keyval = keyval.to_lower();
        let modifiers = modifiers & binding_mod_mask();

        let mut inner = self.inner.borrow_mut();
        if let Some(entry) = inner.lookup_entry(set, keyval, modifiers) {
            inner.entry_destroy(entry);
        }
        let entry = inner.entry_new(set, keyval, modifiers);
        if let Some(data) = inner.entry_mut(entry) {
            data.marks_unbound = true;
        }
    }

    /// Removes the binding for `(keyval, modifiers)`.
    pub fn entry_remove(&self, set: BindingSetId, keyval: Keyval, modifiers: ModifierMask) {
        let keyval = keyval.to_lower();
        let modifiers = modifiers & binding_mod_mask();

        let mut inner = self.inner.borrow_mut();
        if let Some(entry) = inner.lookup_entry(set, keyval, modifiers) {
            inner.entry_destroy(entry);
        }
    }

    /// Replaces the binding for `(keyval, modifiers)` with a fresh, empty
    /// one (no signals, not unbound).
    pub fn entry_clear(&self, set: BindingSetId, keyval: Keyval, modifiers: ModifierMask) {
        let keyval = keyval.to_lower();
        let modifiers = modifiers & binding_mod_mask();

        let mut inner = self.inner.borrow_mut();
        if let Some(entry) = inner.lookup_entry(set, keyval, modifiers) {
            inner.entry_destroy(entry);
        }
        inner.entry_new(set, keyval, modifiers);
    }

    /// Parses a signal description into `set`.
    ///
    /// ```text
    /// bind "<Control>Right" { "move-cursor" (words, 1) "noop" () }
    /// unbind "<Control>Left"
    /// ```
    pub fn add_signal_from_string(
        &self,
        set: BindingSetId,
        description: &str,
    ) -> Result<(), ParseError> {
        let mut p = Parser::new(description);
        let unbind = match p.try_ident() {
            Some("bind") => false,
            Some("unbind") => true,
            _ => return Err(p.error("expected 'bind' or 'unbind'")),
        };

        let accel = p
            .try_string()
            .ok_or_else(|| p.error("expected a quoted accelerator"))?;
        let Some((keyval, modifiers)) = accelerator_parse(accel) else {
            return Err(p.error(format!("cannot parse accelerator \"{accel}\"")));
        };
        let modifiers = modifiers & binding_mod_mask();

        if unbind {
            self.entry_skip(set, keyval, modifiers);
            return Ok(());
        }

        p.expect_literal("{")?;
        self.entry_clear(set, keyval, modifiers);

        while !p.begins_with('}') {
            if p.is_eof() {
                return Err(p.error("expected '}'"));
            }
            let (signal, args) = parse_signal_call(&mut p)?;
            self.entry_add_signal(set, keyval, modifiers, signal, args);
        }
        p.expect_literal("}")?;
        Ok(())
    }
}

fn parse_signal_call<'a>(
    p: &mut Parser<'a>,
) -> Result<(&'a str, SmallVec<[BindingArg; 3]>), ParseError> {
    let signal = p
        .try_string()
        .ok_or_else(|| p.error("expected a quoted signal name"))?;
    p.expect_literal("(")?;

    let mut args: SmallVec<[BindingArg; 3]> = SmallVec::new();
    if !p.begins_with(')') {
        loop {
            args.push(parse_arg(p)?);
            if !p.try_literal(",") {
                break;
            }
        }
    }
    p.expect_literal(")")?;
    // Signal calls may be separated by an optional semicolon.
    let _ = p.try_literal(";");
    Ok((signal, args))
}

fn parse_arg(p: &mut Parser<'_>) -> Result<BindingArg, ParseError> {
    if let Some(s) = p.try_string() {
        return Ok(BindingArg::Str(s.into()));
    }
    // Numbers before identifiers: a leading '-' reads as an identifier
    // character otherwise.
    let before = p.position();
    if let Some(value) = p.try_double() {
        let text = p.consumed_since(before);
        if text.contains(['.', 'e', 'E']) {
            return Ok(BindingArg::Double(value));
        }
        return Ok(BindingArg::Long(value as i64));
    }
    if let Some(ident) = p.try_ident() {
        return Ok(BindingArg::Ident(ident.into()));
    }
    Err(p.error("expected a signal argument"))
}

impl WorldInner {
    pub(crate) fn entry(&self, id: EntryId) -> Option<&EntryData> {
        self.entries.get(id.0 as usize)?.as_ref()
    }

    pub(crate) fn entry_mut(&mut self, id: EntryId) -> Option<&mut EntryData> {
        self.entries.get_mut(id.0 as usize)?.as_mut()
    }

    pub(crate) fn lookup_entry(
        &self,
        set: BindingSetId,
        keyval: Keyval,
        modifiers: ModifierMask,
    ) -> Option<EntryId> {
        self.entry_lookup.get(&(set, keyval, modifiers)).copied()
    }

    /// The keyval and modifiers an entry is inserted into key hashes under:
    /// shifted bindings match the uppercase keyval, and the release bit is
    /// not part of hash matching.
    fn hash_position(keyval: Keyval, modifiers: ModifierMask) -> (Keyval, ModifierMask) {
        let hash_keyval = if modifiers.contains(ModifierMask::SHIFT) {
            if keyval == Keyval::TAB {
                Keyval::ISO_LEFT_TAB
            } else {
                keyval.to_upper()
            }
        } else {
            keyval
        };
        (hash_keyval, modifiers & !ModifierMask::RELEASE)
    }

    pub(crate) fn entry_new(
        &mut self,
        set: BindingSetId,
        keyval: Keyval,
        modifiers: ModifierMask,
    ) -> EntryId {
        let id = EntryId(self.entries.len() as u32);
        self.entries.push(Some(EntryData {
            keyval,
            modifiers,
            set,
            signals: Vec::new(),
            marks_unbound: false,
            in_emission: false,
            destroyed: false,
        }));
        self.sets[set.0 as usize].entries.push(id);
        self.entry_lookup.insert((set, keyval, modifiers), id);

        let (hash_keyval, hash_modifiers) = Self::hash_position(keyval, modifiers);
        for (_, key_hash) in &mut self.key_hashes {
            key_hash.add_entry(hash_keyval, hash_modifiers, id);
        }
        id
    }

    pub(crate) fn entry_destroy(&mut self, id: EntryId) {
        let Some(data) = self.entry(id) else {
            return;
        };
        let set = data.set;
        let key = (set, data.keyval, data.modifiers);
        let in_emission = data.in_emission;

        self.sets[set.0 as usize].entries.retain(|&e| e != id);
        if self.entry_lookup.get(&key) == Some(&id) {
            self.entry_lookup.remove(&key);
        }
        for (_, key_hash) in &mut self.key_hashes {
            key_hash.remove_entry(&id);
        }

        if in_emission {
            // Freed when the emission unwinds.
            if let Some(data) = self.entry_mut(id) {
                data.destroyed = true;
            }
        } else {
            self.entries[id.0 as usize] = None;
        }
    }

    /// The key hash for `keymap`, created and back-filled on first use.
    pub(crate) fn key_hash_for_keymap(&mut self, keymap: &Arc<dyn Keymap>) -> usize {
        let key = Arc::as_ptr(keymap) as *const () as usize;
        if let Some(index) = self.key_hashes.iter().position(|(k, _)| *k == key) {
            return index;
        }
        let mut key_hash = KeyHash::new(keymap.clone());
        for (index, slot) in self.entries.iter().enumerate() {
            let Some(data) = slot else { continue };
            if data.destroyed {
                continue;
            }
            let (hash_keyval, hash_modifiers) =
                Self::hash_position(data.keyval, data.modifiers);
            key_hash.add_entry(hash_keyval, hash_modifiers, EntryId(index as u32));
        }
        self.key_hashes.push((key, key_hash));
        self.key_hashes.len() - 1
    }

    pub(crate) fn key_hash_at(&mut self, index: usize) -> &mut KeyHash<EntryId> {
        &mut self.key_hashes[index].1
    }
}

/// Reports a skipped signal with the binding it came from.
pub(crate) fn warn_signal(
    set_name: &str,
    keyval: Keyval,
    modifiers: ModifierMask,
    signal: &str,
    target_type: &str,
    problem: &str,
) {
    let accelerator = crate::binding::accelerator::accelerator_name(keyval, modifiers);
    warn!(
        "binding \"{set_name}::{accelerator}\": signal \"{signal}\" in the '{target_type}' \
         class ancestry {problem}"
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::binding::signal::BindingArg;

    #[test]
    fn sets_are_interned_by_name() {
        let world = BindingWorld::new();
        let a = world.set_new("EntryView");
        assert_eq!(world.set_find("EntryView"), Some(a));
        assert_eq!(world.set_find("Missing"), None);
        assert_eq!(world.set_by_class("EntryView"), a);

        let b = world.set_by_class("TreeView");
        assert_eq!(world.set_find("TreeView"), Some(b));
        assert_eq!(world.set_name(b), "TreeView");
    }

    #[test]
    fn add_signal_creates_one_entry_per_chord() {
        let world = BindingWorld::new();
        let set = world.set_new("S");
        world.entry_add_signal(
            set,
            Keyval::from_char('A'),
            ModifierMask::CONTROL,
            "first",
            [],
        );
        world.entry_add_signal(
            set,
            Keyval::from_char('a'),
            ModifierMask::CONTROL,
            "second",
            [BindingArg::Long(3)],
        );
        // The uppercase spelling normalized to the same entry.
        assert_eq!(world.set_len(set), 1);

        let inner = world.inner.borrow();
        let entry = inner
            .lookup_entry(set, Keyval::from_char('a'), ModifierMask::CONTROL)
            .unwrap();
        let data = inner.entry(entry).unwrap();
        assert_eq!(data.signals.len(), 2);
        assert_eq!(&*data.signals[1].signal_name, "second");
    }

    #[test]
    fn remove_and_skip() {
        let world = BindingWorld::new();
        let set = world.set_new("S");
        let key = Keyval::function(10);
        world.entry_add_signal(set, key, ModifierMask::empty(), "quit", []);
        assert_eq!(world.set_len(set), 1);

        world.entry_remove(set, key, ModifierMask::empty());
        assert_eq!(world.set_len(set), 0);

        world.entry_skip(set, key, ModifierMask::empty());
        let inner = world.inner.borrow();
        let entry = inner.lookup_entry(set, key, ModifierMask::empty()).unwrap();
        assert!(inner.entry(entry).unwrap().marks_unbound);
    }

    #[test]
    fn parse_bind_with_signals() {
        let world = BindingWorld::new();
        let set = world.set_new("S");
        world
            .add_signal_from_string(
                set,
                r#"bind "<Control>Right" { "move-cursor" (visual-positions, 3, 0); "noop" () }"#,
            )
            .unwrap();

        let inner = world.inner.borrow();
        let entry = inner
            .lookup_entry(set, Keyval::RIGHT, ModifierMask::CONTROL)
            .unwrap();
        let data = inner.entry(entry).unwrap();
        assert_eq!(data.signals.len(), 2);
        assert_eq!(
            data.signals[0].args.as_slice(),
            &[
                BindingArg::Ident("visual-positions".into()),
                BindingArg::Long(3),
                BindingArg::Long(0),
            ]
        );
    }

    #[test]
    fn parse_unbind_marks_unbound() {
        let world = BindingWorld::new();
        let set = world.set_new("S");
        world
            .add_signal_from_string(set, r#"unbind "F10""#)
            .unwrap();
        let inner = world.inner.borrow();
        let entry = inner
            .lookup_entry(set, Keyval::function(10), ModifierMask::empty())
            .unwrap();
        assert!(inner.entry(entry).unwrap().marks_unbound);
    }

    #[test]
    fn parse_rejects_bad_input() {
        let world = BindingWorld::new();
        let set = world.set_new("S");
        assert!(world.add_signal_from_string(set, "rebind \"a\"").is_err());
        assert!(
            world
                .add_signal_from_string(set, r#"bind "<NoSuchMod>a" { }"#)
                .is_err()
        );
        assert!(
            world
                .add_signal_from_string(set, r#"bind "a" { "sig" (1,2 }"#)
                .is_err()
        );
        // The failed parses left no binding behind for the bad accelerator.
        assert_eq!(world.set_find("S"), Some(set));
    }

    #[test]
    fn parse_negative_and_float_args() {
        let world = BindingWorld::new();
        let set = world.set_new("S");
        world
            .add_signal_from_string(set, r#"bind "a" { "scroll" (-3, 0.5, "text") }"#)
            .unwrap();
        let inner = world.inner.borrow();
        let entry = inner
            .lookup_entry(set, Keyval::from_char('a'), ModifierMask::empty())
            .unwrap();
        assert_eq!(
            inner.entry(entry).unwrap().signals[0].args.as_slice(),
            &[
                BindingArg::Long(-3),
                BindingArg::Double(0.5),
                BindingArg::Str("text".into()),
            ]
        );
    }
}
