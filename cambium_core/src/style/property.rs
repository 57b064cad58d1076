// Copyright 2026 the Cambium Authors
// SPDX-License-Identifier: Apache-2.0

//! The style property registry.
//!
//! Property ids are indexes into a fixed table established at startup; the
//! table records each property's name, its initial value, and whether it
//! participates in transitions.

use std::fmt;
use std::sync::Arc;

use hashbrown::HashMap;

use crate::style::array::{ArrayValue, IdentValue};
use crate::style::bg_size::BgSizeValue;
use crate::style::color::ColorValue;
use crate::style::ease::EaseValue;
use crate::style::number::NumberValue;
use crate::style::palette::PaletteValue;
use crate::style::transform::TransformValue;
use crate::style::value::Value;

/// Identifies a style property; an index into the [`PropertyRegistry`].
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PropertyId(pub u16);

impl fmt::Debug for PropertyId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "PropertyId({})", self.0)
    }
}

/// The foreground color.
pub const COLOR: PropertyId = PropertyId(0);
/// The font size, in pixels once computed.
pub const FONT_SIZE: PropertyId = PropertyId(1);
/// Element opacity.
pub const OPACITY: PropertyId = PropertyId(2);
/// The transform list.
pub const TRANSFORM: PropertyId = PropertyId(3);
/// The background sizing rule.
pub const BACKGROUND_SIZE: PropertyId = PropertyId(4);
/// The named color palette.
pub const COLOR_PALETTE: PropertyId = PropertyId(5);
/// Which properties transition; an array of property names or `all`.
pub const TRANSITION_PROPERTY: PropertyId = PropertyId(6);
/// Transition durations, in seconds, indexed per transition property.
pub const TRANSITION_DURATION: PropertyId = PropertyId(7);
/// Transition delays, in seconds.
pub const TRANSITION_DELAY: PropertyId = PropertyId(8);
/// Transition timing functions.
pub const TRANSITION_TIMING_FUNCTION: PropertyId = PropertyId(9);
/// The binding sets attached to a widget, highest priority first.
pub const BINDING_SETS: PropertyId = PropertyId(10);

struct PropertyDef {
    name: &'static str,
    animated: bool,
    initial: Value,
}

/// The table of known style properties.
pub struct PropertyRegistry {
    defs: Vec<PropertyDef>,
    by_name: HashMap<&'static str, PropertyId>,
}

impl fmt::Debug for PropertyRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PropertyRegistry")
            .field("n_properties", &self.defs.len())
            .finish()
    }
}

impl PropertyRegistry {
    /// The built-in property table.
    pub fn builtin() -> Arc<Self> {
        let defs = vec![
            PropertyDef {
                name: "color",
                animated: true,
                initial: ColorValue::rgb8(0, 0, 0),
            },
            PropertyDef {
                name: "font-size",
                animated: true,
                initial: NumberValue::px(10.0),
            },
            PropertyDef {
                name: "opacity",
                animated: true,
                initial: NumberValue::number(1.0),
            },
            PropertyDef {
                name: "transform",
                animated: true,
                initial: TransformValue::none(),
            },
            PropertyDef {
                name: "background-size",
                animated: true,
                initial: BgSizeValue::auto(),
            },
            PropertyDef {
                name: "-color-palette",
                animated: true,
                initial: PaletteValue::default_palette(),
            },
            PropertyDef {
                name: "transition-property",
                animated: false,
                initial: ArrayValue::new(vec![IdentValue::new("all")]),
            },
            PropertyDef {
                name: "transition-duration",
                animated: false,
                initial: ArrayValue::new(vec![NumberValue::seconds(0.0)]),
            },
            PropertyDef {
                name: "transition-delay",
                animated: false,
                initial: ArrayValue::new(vec![NumberValue::seconds(0.0)]),
            },
            PropertyDef {
                name: "transition-timing-function",
                animated: false,
                initial: ArrayValue::new(vec![EaseValue::ease()]),
            },
            PropertyDef {
                name: "-binding-sets",
                animated: false,
                initial: ArrayValue::new(Vec::new()),
            },
        ];
        let by_name = defs
            .iter()
            .enumerate()
            .map(|(i, def)| (def.name, PropertyId(i as u16)))
            .collect();
        Arc::new(Self { defs, by_name })
    }

    /// Number of registered properties.
    pub fn n_properties(&self) -> u16 {
        self.defs.len() as u16
    }

    /// Whether `id` names a registered property.
    pub fn contains(&self, id: PropertyId) -> bool {
        (id.0 as usize) < self.defs.len()
    }

    /// Looks a property up by name.
    pub fn lookup(&self, name: &str) -> Option<PropertyId> {
        self.by_name.get(name).copied()
    }

    /// The property's name.
    pub fn name(&self, id: PropertyId) -> &'static str {
        self.defs[id.0 as usize].name
    }

    /// The registered initial value.
    pub fn initial(&self, id: PropertyId) -> Value {
        self.defs[id.0 as usize].initial.clone()
    }

    /// Whether the property participates in transitions.
    pub fn is_animated(&self, id: PropertyId) -> bool {
        self.defs[id.0 as usize].animated
    }

    /// Iterates all property ids.
    pub fn ids(&self) -> impl Iterator<Item = PropertyId> + '_ {
        (0..self.n_properties()).map(PropertyId)
    }
}

/// A set of changed property ids, as produced by
/// [`difference`](crate::style::difference).
#[derive(Clone, Copy, Default, PartialEq, Eq)]
pub struct PropertyDelta(u64);

impl PropertyDelta {
    /// The empty set.
    pub const EMPTY: Self = Self(0);

    /// Adds a property.
    pub fn insert(&mut self, id: PropertyId) {
        debug_assert!(id.0 < 64, "PropertyDelta only tracks the first 64 ids");
        self.0 |= 1 << id.0;
    }

    /// Whether `id` is in the set.
    pub fn contains(self, id: PropertyId) -> bool {
        self.0 & (1 << id.0) != 0
    }

    /// Whether the set is empty.
    pub fn is_empty(self) -> bool {
        self.0 == 0
    }

    /// Iterates the contained ids in ascending order.
    pub fn iter(self) -> impl Iterator<Item = PropertyId> {
        (0..64_u16).filter(move |i| self.0 & (1 << i) != 0).map(PropertyId)
    }
}

impl fmt::Debug for PropertyDelta {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.iter()).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builtin_ids_line_up_with_names() {
        let registry = PropertyRegistry::builtin();
        assert_eq!(registry.lookup("color"), Some(COLOR));
        assert_eq!(registry.lookup("transform"), Some(TRANSFORM));
        assert_eq!(registry.lookup("-binding-sets"), Some(BINDING_SETS));
        assert_eq!(registry.lookup("nope"), None);
        assert_eq!(registry.name(OPACITY), "opacity");
    }

    #[test]
    fn delta_roundtrip() {
        let mut delta = PropertyDelta::EMPTY;
        delta.insert(COLOR);
        delta.insert(TRANSFORM);
        assert!(delta.contains(COLOR));
        assert!(!delta.contains(OPACITY));
        assert_eq!(delta.iter().collect::<Vec<_>>(), vec![COLOR, TRANSFORM]);
    }
}
