// Copyright 2026 the Cambium Authors
// SPDX-License-Identifier: Apache-2.0

//! Named color palettes.

use hashbrown::HashMap;
use once_cell::sync::Lazy;
use peniko::Color;

use crate::style::color::{lerp_color, print_color};
use crate::style::parser::Parser;
use crate::style::property::PropertyId;
use crate::style::value::{Value, ValueOps};

/// A mapping from color names to RGBA colors.
#[derive(Debug)]
pub struct PaletteValue {
    colors: HashMap<Box<str>, Color>,
}

static DEFAULT: Lazy<Value> = Lazy::new(|| {
    PaletteValue::new([
        ("error", Color::from_rgba8(204, 0, 0, 255)),
        ("warning", Color::from_rgba8(245, 121, 0, 255)),
        ("success", Color::from_rgba8(78, 154, 6, 255)),
    ])
});

impl PaletteValue {
    /// The shared default palette (`error`, `warning`, `success`).
    pub fn default_palette() -> Value {
        DEFAULT.clone()
    }

    /// Builds a palette from name/color pairs.
    pub fn new<'a>(colors: impl IntoIterator<Item = (&'a str, Color)>) -> Value {
        Value::new(Self {
            colors: colors
                .into_iter()
                .map(|(name, color)| (Box::from(name), color))
                .collect(),
        })
    }

    /// Looks up a color by name.
    pub fn lookup(&self, name: &str) -> Option<Color> {
        self.colors.get(name).copied()
    }

    /// Number of named colors.
    pub fn len(&self) -> usize {
        self.colors.len()
    }

    /// Whether the palette is empty.
    pub fn is_empty(&self) -> bool {
        self.colors.is_empty()
    }

    /// Parses `default` or a comma-separated list of `name color` pairs.
    /// A name appearing twice keeps the later entry.
    pub fn parse(parser: &mut Parser<'_>) -> Option<Value> {
        if parser.try_literal("default") {
            return Some(Self::default_palette());
        }
        let mut colors = HashMap::new();
        loop {
            let name = parser.try_ident()?;
            let color = crate::style::color::ColorValue::parse(parser)?;
            let color = color
                .downcast_ref::<crate::style::color::ColorValue>()?
                .color();
            colors.insert(Box::from(name), color);
            if !parser.try_literal(",") {
                break;
            }
        }
        Some(Value::new(Self { colors }))
    }
}

impl ValueOps for PaletteValue {
    fn equal(&self, other: &Value) -> bool {
        let Some(other) = other.downcast_ref::<Self>() else {
            return false;
        };
        self.colors.len() == other.colors.len()
            && self.colors.iter().all(|(name, color)| {
                other.colors.get(name).map(|c| c.components) == Some(color.components)
            })
    }

    fn transition(
        &self,
        start: &Value,
        end: &Value,
        _property_id: PropertyId,
        progress: f64,
    ) -> Option<Value> {
        let other = end.downcast_ref::<Self>()?;
        // Interpolation needs the same set of names on both sides.
        if self.colors.len() != other.colors.len()
            || !self.colors.keys().all(|k| other.colors.contains_key(k))
        {
            return None;
        }
        if progress == 0.0 {
            return Some(start.clone());
        }
        if progress == 1.0 {
            return Some(end.clone());
        }
        let colors = self
            .colors
            .iter()
            .map(|(name, color)| (name.clone(), lerp_color(*color, other.colors[name], progress)))
            .collect();
        Some(Value::new(Self { colors }))
    }

    fn print(&self, out: &mut String) {
        let mut names: Vec<&str> = self.colors.keys().map(|k| &**k).collect();
        names.sort_unstable();
        for (i, name) in names.into_iter().enumerate() {
            if i > 0 {
                out.push_str(", ");
            }
            out.push_str(name);
            out.push(' ');
            print_color(out, self.colors[name]);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(s: &str) -> Value {
        let mut p = Parser::new(s);
        PaletteValue::parse(&mut p).unwrap()
    }

    #[test]
    fn lookup_and_absent_names() {
        let v = PaletteValue::default_palette();
        let palette = v.downcast_ref::<PaletteValue>().unwrap();
        assert!(palette.lookup("error").is_some());
        assert!(palette.lookup("missing").is_none());
    }

    #[test]
    fn later_entry_wins() {
        let v = parse("accent rgb(1,2,3), accent rgb(7,8,9)");
        let palette = v.downcast_ref::<PaletteValue>().unwrap();
        assert_eq!(palette.len(), 1);
        assert_eq!(palette.lookup("accent").unwrap().to_rgba8().r, 7);
    }

    #[test]
    fn print_parse_round_trip() {
        let v = parse("b rgb(0,0,255), a rgb(255,0,0)");
        let reparsed = parse(&v.to_css_string());
        assert!(v.equal(&reparsed));
    }

    #[test]
    fn transition_requires_matching_names() {
        let a = parse("accent rgb(0,0,0)");
        let b = parse("accent rgb(255,255,255)");
        let c = parse("other rgb(255,255,255)");
        let mid = a
            .transition(&b, crate::style::property::COLOR_PALETTE, 0.5)
            .unwrap();
        let palette = mid.downcast_ref::<PaletteValue>().unwrap();
        assert!((palette.lookup("accent").unwrap().components[0] - 0.5).abs() < 1e-6);
        assert!(a.transition(&c, crate::style::property::COLOR_PALETTE, 0.5).is_none());
    }
}
