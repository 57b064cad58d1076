// Copyright 2026 the Cambium Authors
// SPDX-License-Identifier: Apache-2.0

//! Color values, including the `currentColor` token.

use std::fmt::Write;

use peniko::Color;

use crate::style::parser::Parser;
use crate::style::property::{self, PropertyId};
use crate::style::value::{ComputeContext, Value, ValueOps};

/// A concrete RGBA color.
#[derive(Debug)]
pub struct ColorValue {
    color: Color,
}

impl ColorValue {
    /// Wraps a color.
    pub fn new(color: Color) -> Value {
        Value::new(Self { color })
    }

    /// A color from 8-bit channels.
    pub fn rgb8(r: u8, g: u8, b: u8) -> Value {
        Self::new(Color::from_rgba8(r, g, b, 255))
    }

    /// The wrapped color.
    pub fn color(&self) -> Color {
        self.color
    }

    /// Parses `#rrggbb`, `#rgb`, `rgb()`, `rgba()`, a named color, or
    /// `currentColor`.
    pub fn parse(parser: &mut Parser<'_>) -> Option<Value> {
        if parser.try_literal("currentColor") {
            return Some(CurrentColor::new());
        }
        if parser.try_literal("#") {
            return Self::parse_hex(parser);
        }
        if parser.try_literal("rgba(") {
            return Self::parse_rgb_body(parser, true);
        }
        if parser.try_literal("rgb(") {
            return Self::parse_rgb_body(parser, false);
        }
        let name = parser.try_ident()?;
        named_color(name).map(Self::new)
    }

    fn parse_hex(parser: &mut Parser<'_>) -> Option<Value> {
        let rest = parser.remaining();
        let len = rest.chars().take_while(|c| c.is_ascii_hexdigit()).count();
        let digits = &rest[..len];
        let (r, g, b) = match len {
            6 => (
                u8::from_str_radix(&digits[0..2], 16).ok()?,
                u8::from_str_radix(&digits[2..4], 16).ok()?,
                u8::from_str_radix(&digits[4..6], 16).ok()?,
            ),
            3 => {
                let c = |i: usize| u8::from_str_radix(&digits[i..i + 1], 16).map(|v| v * 17);
                (c(0).ok()?, c(1).ok()?, c(2).ok()?)
            }
            _ => return None,
        };
        let _ = parser.expect_literal(digits);
        Some(Self::rgb8(r, g, b))
    }

    fn parse_rgb_body(parser: &mut Parser<'_>, with_alpha: bool) -> Option<Value> {
        let r = parser.try_double()?;
        parser.try_literal(",").then_some(())?;
        let g = parser.try_double()?;
        parser.try_literal(",").then_some(())?;
        let b = parser.try_double()?;
        let a = if with_alpha {
            parser.try_literal(",").then_some(())?;
            parser.try_double()?
        } else {
            1.0
        };
        parser.try_literal(")").then_some(())?;
        let channel = |v: f64| (v.clamp(0.0, 255.0)) as u8;
        Some(Self::new(
            Color::from_rgba8(channel(r), channel(g), channel(b), 255).with_alpha(a as f32),
        ))
    }
}

impl ValueOps for ColorValue {
    fn equal(&self, other: &Value) -> bool {
        let Some(other) = other.downcast_ref::<Self>() else {
            return false;
        };
        self.color.components == other.color.components
    }

    fn transition(
        &self,
        start: &Value,
        end: &Value,
        _property_id: PropertyId,
        progress: f64,
    ) -> Option<Value> {
        let other = end.downcast_ref::<Self>()?;
        if progress == 0.0 {
            return Some(start.clone());
        }
        if progress == 1.0 {
            return Some(end.clone());
        }
        Some(Self::new(lerp_color(self.color, other.color, progress)))
    }

    fn print(&self, out: &mut String) {
        print_color(out, self.color);
    }
}

pub(crate) fn lerp_color(a: Color, b: Color, t: f64) -> Color {
    let t = t as f32;
    let mut components = [0.0_f32; 4];
    for (i, out) in components.iter_mut().enumerate() {
        *out = a.components[i] + (b.components[i] - a.components[i]) * t;
    }
    Color::new(components)
}

pub(crate) fn print_color(out: &mut String, color: Color) {
    let rgba = color.to_rgba8();
    if rgba.a == 255 {
        let _ = write!(out, "rgb({},{},{})", rgba.r, rgba.g, rgba.b);
    } else {
        let _ = write!(
            out,
            "rgba({},{},{},{})",
            rgba.r,
            rgba.g,
            rgba.b,
            color.components[3]
        );
    }
}

fn named_color(name: &str) -> Option<Color> {
    let (r, g, b, a) = match name {
        "black" => (0, 0, 0, 255),
        "white" => (255, 255, 255, 255),
        "red" => (255, 0, 0, 255),
        "green" => (0, 128, 0, 255),
        "lime" => (0, 255, 0, 255),
        "blue" => (0, 0, 255, 255),
        "yellow" => (255, 255, 0, 255),
        "orange" => (255, 165, 0, 255),
        "gray" | "grey" => (128, 128, 128, 255),
        "transparent" => (0, 0, 0, 0),
        _ => return None,
    };
    Some(Color::from_rgba8(r, g, b, a))
}

/// The `currentColor` token; computes to the style's `color` property.
#[derive(Debug)]
pub struct CurrentColor;

impl CurrentColor {
    /// The token value.
    pub fn new() -> Value {
        Value::new(Self)
    }
}

impl ValueOps for CurrentColor {
    fn compute(&self, value: &Value, property_id: PropertyId, ctx: &ComputeContext<'_>) -> Value {
        // The color property can't refer to itself; it inherits instead.
        let reference = if property_id == property::COLOR {
            ctx.parent_style
        } else {
            ctx.style
        };
        match reference {
            Some(style) => style.get_value(property::COLOR),
            None => value.clone(),
        }
    }

    fn equal(&self, other: &Value) -> bool {
        other.downcast_ref::<Self>().is_some()
    }

    fn transition(
        &self,
        start: &Value,
        end: &Value,
        _property_id: PropertyId,
        _progress: f64,
    ) -> Option<Value> {
        end.downcast_ref::<Self>().map(|_| start.clone())
    }

    fn print(&self, out: &mut String) {
        out.push_str("currentColor");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(s: &str) -> Value {
        let mut p = Parser::new(s);
        ColorValue::parse(&mut p).unwrap()
    }

    #[test]
    fn hex_parsing() {
        assert!(parse("#ff0000").equal(&parse("red")));
        assert!(parse("#f00").equal(&parse("red")));
    }

    #[test]
    fn rgb_round_trip() {
        let v = parse("rgb(10,20,30)");
        assert_eq!(v.to_css_string(), "rgb(10,20,30)");
    }

    #[test]
    fn transition_midpoint() {
        let a = parse("rgb(0,0,0)");
        let b = parse("rgb(255,255,255)");
        let mid = a.transition(&b, property::COLOR, 0.5).unwrap();
        let c = mid.downcast_ref::<ColorValue>().unwrap().color();
        assert!((c.components[0] - 0.5).abs() < 1e-6);
    }

    #[test]
    fn incompatible_with_numbers() {
        let c = parse("red");
        let n = crate::style::number::NumberValue::px(4.0);
        assert!(c.transition(&n, property::COLOR, 0.5).is_none());
    }
}
