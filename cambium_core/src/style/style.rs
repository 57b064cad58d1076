// Copyright 2026 the Cambium Authors
// SPDX-License-Identifier: Apache-2.0

//! The style contract and the plain property store.

use std::fmt;
use std::sync::Arc;

use crate::style::animated::AnimatedStyle;
use crate::style::property::{PropertyDelta, PropertyId, PropertyRegistry};
use crate::style::value::{Section, Value};

/// A resolved set of property values.
///
/// `get_value` never fails: absent properties resolve to their registered
/// initial value.
pub trait Style: fmt::Debug {
    /// The registry this style's ids index into.
    fn registry(&self) -> &Arc<PropertyRegistry>;

    /// The value of `id`. Falls back to the registered initial value.
    fn get_value(&self, id: PropertyId) -> Value;

    /// The origin of the value of `id`, when known.
    fn get_section(&self, _id: PropertyId) -> Option<Section> {
        None
    }

    /// `true` iff no held value varies with time.
    fn is_static(&self) -> bool {
        true
    }

    /// Downcast hook for the animated overlay.
    fn as_animated(&self) -> Option<&AnimatedStyle> {
        None
    }
}

struct StyleEntry {
    value: Value,
    section: Option<Section>,
}

/// A style with explicitly stored values.
pub struct StaticStyle {
    registry: Arc<PropertyRegistry>,
    entries: Vec<Option<StyleEntry>>,
}

impl StaticStyle {
    /// An empty style; every lookup resolves to the initial value.
    pub fn new(registry: Arc<PropertyRegistry>) -> Self {
        let entries = (0..registry.n_properties()).map(|_| None).collect();
        Self { registry, entries }
    }

    /// Builder-style [`set_value`](Self::set_value).
    pub fn with_value(mut self, id: PropertyId, value: Value) -> Self {
        self.set_value(id, value);
        self
    }

    /// Stores a value for `id`.
    pub fn set_value(&mut self, id: PropertyId, value: Value) {
        self.set_value_with_section(id, value, None);
    }

    /// Stores a value for `id` together with its origin.
    pub fn set_value_with_section(
        &mut self,
        id: PropertyId,
        value: Value,
        section: Option<Section>,
    ) {
        if !self.registry.contains(id) {
            debug_panic!("unknown property id {id:?}");
            return;
        }
        self.entries[id.0 as usize] = Some(StyleEntry { value, section });
    }
}

impl Style for StaticStyle {
    fn registry(&self) -> &Arc<PropertyRegistry> {
        &self.registry
    }

    fn get_value(&self, id: PropertyId) -> Value {
        self.entries
            .get(id.0 as usize)
            .and_then(|e| e.as_ref())
            .map(|e| e.value.clone())
            .unwrap_or_else(|| self.registry.initial(id))
    }

    fn get_section(&self, id: PropertyId) -> Option<Section> {
        self.entries
            .get(id.0 as usize)
            .and_then(|e| e.as_ref())
            .and_then(|e| e.section.clone())
    }
}

impl fmt::Debug for StaticStyle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StaticStyle")
            .field(
                "n_set",
                &self.entries.iter().filter(|e| e.is_some()).count(),
            )
            .finish()
    }
}

/// Collects the ids whose values differ between the two styles.
pub fn difference(a: &dyn Style, b: &dyn Style) -> PropertyDelta {
    let mut delta = PropertyDelta::EMPTY;
    for id in a.registry().ids() {
        if !a.get_value(id).equal(&b.get_value(id)) {
            delta.insert(id);
        }
    }
    delta
}

/// Serializes a style, one `name: value;` line per property.
///
/// With `skip_initial`, properties whose value equals the registered initial
/// are omitted.
pub fn style_to_string(style: &dyn Style, indent: usize, skip_initial: bool) -> String {
    let registry = style.registry();
    let mut out = String::new();
    for id in registry.ids() {
        let value = style.get_value(id);
        if skip_initial && value.equal(&registry.initial(id)) {
            continue;
        }
        for _ in 0..indent {
            out.push(' ');
        }
        out.push_str(registry.name(id));
        out.push_str(": ");
        value.print(&mut out);
        out.push_str(";\n");
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::style::number::NumberValue;
    use crate::style::property::{FONT_SIZE, OPACITY};

    #[test]
    fn absent_properties_resolve_to_initial() {
        let registry = PropertyRegistry::builtin();
        let style = StaticStyle::new(registry.clone());
        assert!(style.get_value(OPACITY).equal(&registry.initial(OPACITY)));
        assert!(style.get_section(OPACITY).is_none());
    }

    #[test]
    fn sections_are_reported_when_present(){
        let registry = PropertyRegistry::builtin();
        let mut style = StaticStyle::new(registry);
        style.set_value_with_section(
            FONT_SIZE,
            NumberValue::px(12.0),
            Some(Section::new("theme.css:10")),
        );
        assert_eq!(
            style.get_section(FONT_SIZE).unwrap().description(),
            "theme.css:10"
        );
    }

    #[test]
    fn difference_reports_changed_ids() {
        let registry = PropertyRegistry::builtin();
        let a = StaticStyle::new(registry.clone()).with_value(FONT_SIZE, NumberValue::px(12.0));
        let b = StaticStyle::new(registry.clone())
            .with_value(FONT_SIZE, NumberValue::px(14.0))
            .with_value(OPACITY, NumberValue::number(0.5));
        let delta = difference(&a, &b);
        assert!(delta.contains(FONT_SIZE));
        assert!(delta.contains(OPACITY));
        assert!(!delta.contains(crate::style::property::TRANSFORM));
    }

    #[test]
    fn print_skips_initial_values() {
        let registry = PropertyRegistry::builtin();
        let style = StaticStyle::new(registry).with_value(FONT_SIZE, NumberValue::px(12.0));
        let s = style_to_string(&style, 2, true);
        assert_eq!(s, "  font-size: 12px;\n");
    }
}
