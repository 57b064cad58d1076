// Copyright 2026 the Cambium Authors
// SPDX-License-Identifier: Apache-2.0

//! The numeric value family.
//!
//! All units share one payload type, so a transition between two numbers
//! always reaches [`ValueOps::transition`] regardless of their units.

use std::fmt;

use crate::style::parser::Parser;
use crate::style::property::{self, PropertyId};
use crate::style::value::{ComputeContext, Value, ValueOps};
use crate::util::write_css_number;

/// The unit a [`NumberValue`] is expressed in.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Unit {
    /// A plain number (scale factors, iteration counts).
    Number,
    /// Logical pixels.
    Px,
    /// Multiples of the style's font size. Resolved to pixels by `compute`.
    Em,
    /// Percent of a context-supplied reference, resolved at point of use.
    Percent,
    /// Degrees.
    Deg,
    /// Seconds.
    Seconds,
}

/// Which units a parse call accepts.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum NumberParse {
    /// `Number` only.
    Number,
    /// Lengths: `px`, `em`, `%`, or a bare `0`.
    Length,
    /// Angles: `deg`, or a bare `0`.
    Angle,
    /// Durations: `s`, `ms`.
    Time,
}

/// A number with a unit.
#[derive(Debug)]
pub struct NumberValue {
    value: f64,
    unit: Unit,
}

impl NumberValue {
    /// A plain number value.
    pub fn number(value: f64) -> Value {
        Value::new(Self {
            value,
            unit: Unit::Number,
        })
    }

    /// A length in logical pixels.
    pub fn px(value: f64) -> Value {
        Value::new(Self {
            value,
            unit: Unit::Px,
        })
    }

    /// A font-size-relative length.
    pub fn em(value: f64) -> Value {
        Value::new(Self {
            value,
            unit: Unit::Em,
        })
    }

    /// A percentage. `value` is in percent units (`50.0` is half).
    pub fn percent(value: f64) -> Value {
        Value::new(Self {
            value,
            unit: Unit::Percent,
        })
    }

    /// An angle in degrees.
    pub fn deg(value: f64) -> Value {
        Value::new(Self {
            value,
            unit: Unit::Deg,
        })
    }

    /// A duration in seconds.
    pub fn seconds(value: f64) -> Value {
        Value::new(Self {
            value,
            unit: Unit::Seconds,
        })
    }

    /// The raw numeric value, in `unit`.
    pub fn raw(&self) -> f64 {
        self.value
    }

    /// The unit.
    pub fn unit(&self) -> Unit {
        self.unit
    }

    /// Resolves the value against a reference for percentages.
    ///
    /// For non-percent units this is the raw value; percentages resolve
    /// against `one_hundred_percent`.
    pub fn get(&self, one_hundred_percent: f64) -> f64 {
        match self.unit {
            Unit::Percent => self.value * one_hundred_percent / 100.0,
            _ => self.value,
        }
    }

    /// Parses a number with an accepted unit set.
    pub fn parse(parser: &mut Parser<'_>, accept: NumberParse) -> Option<Value> {
        let mut value = parser.try_double()?;
        let unit = if parser.try_literal("px") {
            Unit::Px
        } else if parser.try_literal("em") {
            Unit::Em
        } else if parser.try_literal("%") {
            Unit::Percent
        } else if parser.try_literal("deg") {
            Unit::Deg
        } else if parser.try_literal("ms") {
            value /= 1000.0;
            Unit::Seconds
        } else if parser.try_literal("s") {
            Unit::Seconds
        } else {
            Unit::Number
        };
        let ok = match accept {
            NumberParse::Number => unit == Unit::Number,
            NumberParse::Length => {
                matches!(unit, Unit::Px | Unit::Em | Unit::Percent)
                    || (unit == Unit::Number && value == 0.0)
            }
            NumberParse::Angle => unit == Unit::Deg || (unit == Unit::Number && value == 0.0),
            NumberParse::Time => unit == Unit::Seconds,
        };
        if !ok {
            return None;
        }
        // A unitless zero is a valid length or angle.
        let unit = match (accept, unit) {
            (NumberParse::Length, Unit::Number) => Unit::Px,
            (NumberParse::Angle, Unit::Number) => Unit::Deg,
            (_, unit) => unit,
        };
        Some(Value::new(Self { value, unit }))
    }

    fn with_unit(value: f64, unit: Unit) -> Value {
        Value::new(Self { value, unit })
    }
}

impl ValueOps for NumberValue {
    fn compute(&self, value: &Value, property_id: PropertyId, ctx: &ComputeContext<'_>) -> Value {
        match self.unit {
            Unit::Em => {
                // font-size itself computes against the parent's size.
                let reference = if property_id == property::FONT_SIZE {
                    ctx.parent_style
                } else {
                    ctx.style
                };
                let Some(style) = reference else {
                    return value.clone();
                };
                let font_size = style.get_value(property::FONT_SIZE);
                let Some(number) = font_size.downcast_ref::<Self>() else {
                    return value.clone();
                };
                Self::with_unit(self.value * number.get(0.0), Unit::Px)
            }
            _ => value.clone(),
        }
    }

    fn equal(&self, other: &Value) -> bool {
        let Some(other) = other.downcast_ref::<Self>() else {
            return false;
        };
        self.unit == other.unit && self.value == other.value
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
        // Mixed units interpolate only when one side is zero; a real mix
        // would need calc()-style sums.
        let unit = if self.unit == other.unit {
            self.unit
        } else if self.value == 0.0 {
            other.unit
        } else if other.value == 0.0 {
            self.unit
        } else {
            return None;
        };
        Some(Self::with_unit(
            self.value + (other.value - self.value) * progress,
            unit,
        ))
    }

    fn print(&self, out: &mut String) {
        write_css_number(out, self.value);
        out.push_str(match self.unit {
            Unit::Number => "",
            Unit::Px => "px",
            Unit::Em => "em",
            Unit::Percent => "%",
            Unit::Deg => "deg",
            Unit::Seconds => "s",
        });
    }
}

impl fmt::Display for Unit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Number => "number",
            Self::Px => "px",
            Self::Em => "em",
            Self::Percent => "percent",
            Self::Deg => "deg",
            Self::Seconds => "s",
        };
        write!(f, "{s}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::style::property::{FONT_SIZE, OPACITY, PropertyRegistry};
    use crate::style::style::StaticStyle;

    #[test]
    fn parse_and_print_round_trip() {
        for s in ["4px", "1.5em", "50%", "30deg", "0.25s", "2"] {
            let accept = match s {
                "30deg" => NumberParse::Angle,
                "0.25s" => NumberParse::Time,
                "2" => NumberParse::Number,
                _ => NumberParse::Length,
            };
            let mut p = Parser::new(s);
            let v = NumberValue::parse(&mut p, accept).unwrap();
            assert_eq!(v.to_css_string(), s);
        }
    }

    #[test]
    fn unitless_zero_is_a_length() {
        let mut p = Parser::new("0");
        let v = NumberValue::parse(&mut p, NumberParse::Length).unwrap();
        assert_eq!(v.downcast_ref::<NumberValue>().unwrap().unit(), Unit::Px);
    }

    #[test]
    fn transition_endpoints_are_recovered() {
        let a = NumberValue::px(10.0);
        let b = NumberValue::px(20.0);
        assert!(a.transition(&b, OPACITY, 0.0).unwrap().equal(&a));
        assert!(a.transition(&b, OPACITY, 1.0).unwrap().equal(&b));
        let mid = a.transition(&b, OPACITY, 0.5).unwrap();
        assert_eq!(mid.downcast_ref::<NumberValue>().unwrap().raw(), 15.0);
    }

    #[test]
    fn mixed_units_are_incompatible_unless_zero() {
        let px = NumberValue::px(10.0);
        let deg = NumberValue::deg(20.0);
        assert!(px.transition(&deg, OPACITY, 0.5).is_none());

        let zero = NumberValue::px(0.0);
        let mid = zero.transition(&deg, OPACITY, 0.5).unwrap();
        assert_eq!(mid.downcast_ref::<NumberValue>().unwrap().raw(), 10.0);
        assert_eq!(mid.downcast_ref::<NumberValue>().unwrap().unit(), Unit::Deg);
    }

    #[test]
    fn em_computes_against_font_size() {
        let registry = PropertyRegistry::builtin();
        let style = StaticStyle::new(registry).with_value(FONT_SIZE, NumberValue::px(16.0));
        let ctx = ComputeContext {
            provider: None,
            style: Some(&style),
            parent_style: None,
        };
        let v = NumberValue::em(2.0);
        let computed = v.compute(OPACITY, &ctx);
        let n = computed.downcast_ref::<NumberValue>().unwrap();
        assert_eq!(n.raw(), 32.0);
        assert_eq!(n.unit(), Unit::Px);
    }
}
