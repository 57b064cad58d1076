// Copyright 2026 the Cambium Authors
// SPDX-License-Identifier: Apache-2.0

//! A minimal binding target for tests.

use std::fmt;
use std::sync::Arc;

use hashbrown::HashMap;

use crate::binding::{BindingTarget, ReturnKind, SignalSpec, SignalTable, SignalValue};
use crate::input::Keymap;
use crate::style::Style;

type EmitHook = Box<dyn FnMut(&str)>;

/// A binding target that records every emission.
///
/// Its class chain is `TestObject` → `Object`, so tests can exercise the
/// class-ancestry walk with two per-class sets.
pub struct TestObject {
    keymap: Arc<dyn Keymap>,
    style: Option<Arc<dyn Style>>,
    signals: SignalTable,
    bool_responses: HashMap<&'static str, bool>,
    emitted: Vec<(String, Vec<SignalValue>)>,
    on_emit: Option<EmitHook>,
}

impl fmt::Debug for TestObject {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TestObject")
            .field("n_emitted", &self.emitted.len())
            .finish()
    }
}

impl TestObject {
    /// A target with no declared signals.
    pub fn new(keymap: Arc<impl Keymap + 'static>) -> Self {
        Self {
            keymap,
            style: None,
            signals: SignalTable::new(),
            bool_responses: HashMap::new(),
            emitted: Vec::new(),
            on_emit: None,
        }
    }

    /// Attaches a resolved style (for `-binding-sets`).
    pub fn with_style(mut self, style: Arc<dyn Style>) -> Self {
        self.style = Some(style);
        self
    }

    /// Declares a zero-argument void action signal.
    pub fn declare_action0(&mut self, name: &'static str) {
        self.signals
            .register(name, SignalSpec::action([], ReturnKind::Void));
    }

    /// Declares a zero-argument boolean action signal with a fixed return.
    pub fn declare_action0_bool(&mut self, name: &'static str, response: bool) {
        self.signals
            .register(name, SignalSpec::action([], ReturnKind::Bool));
        self.bool_responses.insert(name, response);
    }

    /// Declares a signal with an explicit spec.
    pub fn declare_signal(&mut self, name: &'static str, spec: SignalSpec) {
        self.signals.register(name, spec);
    }

    /// Runs `hook` on every emission, before it is recorded.
    pub fn on_emit(&mut self, hook: impl FnMut(&str) + 'static) {
        self.on_emit = Some(Box::new(hook));
    }

    /// The emitted signal names, in order.
    pub fn emitted(&self) -> Vec<String> {
        self.emitted.iter().map(|(name, _)| name.clone()).collect()
    }

    /// The emitted calls with their arguments.
    pub fn emitted_calls(&self) -> &[(String, Vec<SignalValue>)] {
        &self.emitted
    }
}

impl BindingTarget for TestObject {
    fn class_chain(&self) -> &[&'static str] {
        &["TestObject", "Object"]
    }

    fn keymap(&self) -> Arc<dyn Keymap> {
        self.keymap.clone()
    }

    fn style(&self) -> Option<Arc<dyn Style>> {
        self.style.clone()
    }

    fn signals(&self) -> &SignalTable {
        &self.signals
    }

    fn emit(&mut self, signal: &str, args: &[SignalValue]) -> Option<bool> {
        if let Some(hook) = self.on_emit.as_mut() {
            hook(signal);
        }
        self.emitted.push((signal.to_string(), args.to_vec()));
        match self.signals.lookup(signal).map(|spec| spec.return_kind) {
            Some(ReturnKind::Bool) => Some(*self.bool_responses.get(signal).unwrap_or(&true)),
            _ => None,
        }
    }
}
