// Copyright 2026 the Cambium Authors
// SPDX-License-Identifier: Apache-2.0

//! Timing function values.

use std::fmt::Write;

use crate::style::parser::Parser;
use crate::style::property::PropertyId;
use crate::style::value::{Value, ValueOps};
use crate::util::write_css_number;

/// A CSS timing function.
///
/// `linear` is the identity; everything else is a cubic bezier through
/// `(0,0)`, `(x1,y1)`, `(x2,y2)`, `(1,1)` with `x1, x2 ∈ [0, 1]`.
#[derive(Debug, PartialEq)]
pub enum EaseValue {
    /// The identity timing function.
    Linear,
    /// A cubic bezier.
    Cubic {
        /// First control point x, in `[0, 1]`.
        x1: f64,
        /// First control point y.
        y1: f64,
        /// Second control point x, in `[0, 1]`.
        x2: f64,
        /// Second control point y.
        y2: f64,
    },
}

impl EaseValue {
    /// The `ease` keyword.
    pub fn ease() -> Value {
        Self::cubic(0.25, 0.1, 0.25, 1.0)
    }

    /// The `ease-in` keyword.
    pub fn ease_in() -> Value {
        Self::cubic(0.42, 0.0, 1.0, 1.0)
    }

    /// The `ease-out` keyword.
    pub fn ease_out() -> Value {
        Self::cubic(0.0, 0.0, 0.58, 1.0)
    }

    /// The `ease-in-out` keyword.
    pub fn ease_in_out() -> Value {
        Self::cubic(0.42, 0.0, 0.58, 1.0)
    }

    /// The `linear` keyword.
    pub fn linear() -> Value {
        Value::new(Self::Linear)
    }

    /// An explicit cubic bezier.
    pub fn cubic(x1: f64, y1: f64, x2: f64, y2: f64) -> Value {
        Value::new(Self::Cubic { x1, y1, x2, y2 })
    }

    /// Parses a timing function.
    pub fn parse(parser: &mut Parser<'_>) -> Option<Value> {
        if parser.try_literal("ease-in-out") {
            return Some(Self::ease_in_out());
        }
        if parser.try_literal("ease-in") {
            return Some(Self::ease_in());
        }
        if parser.try_literal("ease-out") {
            return Some(Self::ease_out());
        }
        if parser.try_literal("ease") {
            return Some(Self::ease());
        }
        if parser.try_literal("linear") {
            return Some(Self::linear());
        }
        if parser.try_literal("cubic-bezier(") {
            let x1 = parser.try_double()?;
            parser.try_literal(",").then_some(())?;
            let y1 = parser.try_double()?;
            parser.try_literal(",").then_some(())?;
            let x2 = parser.try_double()?;
            parser.try_literal(",").then_some(())?;
            let y2 = parser.try_double()?;
            parser.try_literal(")").then_some(())?;
            if !(0.0..=1.0).contains(&x1) || !(0.0..=1.0).contains(&x2) {
                return None;
            }
            return Some(Self::cubic(x1, y1, x2, y2));
        }
        None
    }

    /// Maps linear progress through the timing function.
    pub fn transform(&self, progress: f64) -> f64 {
        match *self {
            Self::Linear => progress,
            Self::Cubic { x1, y1, x2, y2 } => {
                if progress <= 0.0 {
                    return 0.0;
                }
                if progress >= 1.0 {
                    return 1.0;
                }
                let t = solve_bezier_t(progress, x1, x2);
                bezier(t, y1, y2)
            }
        }
    }
}

/// One-dimensional cubic bezier with endpoints 0 and 1.
fn bezier(t: f64, p1: f64, p2: f64) -> f64 {
    let u = 1.0 - t;
    3.0 * u * u * t * p1 + 3.0 * u * t * t * p2 + t * t * t
}

fn bezier_derivative(t: f64, p1: f64, p2: f64) -> f64 {
    let u = 1.0 - t;
    3.0 * u * u * p1 + 6.0 * u * t * (p2 - p1) + 3.0 * t * t * (1.0 - p2)
}

/// Finds `t` with `bezier(t, x1, x2) == x`. Newton iteration with a
/// bisection fallback; `x1, x2 ∈ [0, 1]` makes the curve monotonic in x.
fn solve_bezier_t(x: f64, x1: f64, x2: f64) -> f64 {
    let mut t = x;
    for _ in 0..8 {
        let err = bezier(t, x1, x2) - x;
        if err.abs() < 1e-7 {
            return t;
        }
        let d = bezier_derivative(t, x1, x2);
        if d.abs() < 1e-6 {
            break;
        }
        t -= err / d;
    }
    let (mut lo, mut hi) = (0.0_f64, 1.0_f64);
    t = x;
    for _ in 0..32 {
        let v = bezier(t, x1, x2);
        if (v - x).abs() < 1e-7 {
            break;
        }
        if v < x {
            lo = t;
        } else {
            hi = t;
        }
        t = (lo + hi) / 2.0;
    }
    t
}

impl ValueOps for EaseValue {
    fn equal(&self, other: &Value) -> bool {
        let Some(other) = other.downcast_ref::<Self>() else {
            return false;
        };
        self == other
    }

    fn transition(
        &self,
        start: &Value,
        end: &Value,
        _property_id: PropertyId,
        _progress: f64,
    ) -> Option<Value> {
        if start.equal(end) { Some(start.clone()) } else { None }
    }

    fn print(&self, out: &mut String) {
        match *self {
            Self::Linear => out.push_str("linear"),
            Self::Cubic { x1, y1, x2, y2 } => {
                let _ = write!(out, "cubic-bezier(");
                for (i, v) in [x1, y1, x2, y2].into_iter().enumerate() {
                    if i > 0 {
                        out.push_str(", ");
                    }
                    write_css_number(out, v);
                }
                out.push(')');
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn linear_is_identity() {
        let v = EaseValue::linear();
        let ease = v.downcast_ref::<EaseValue>().unwrap();
        assert_eq!(ease.transform(0.3), 0.3);
    }

    #[test]
    fn cubic_endpoints() {
        let v = EaseValue::ease_in_out();
        let ease = v.downcast_ref::<EaseValue>().unwrap();
        assert_eq!(ease.transform(0.0), 0.0);
        assert_eq!(ease.transform(1.0), 1.0);
        // Symmetric curve crosses the diagonal at the midpoint.
        assert!((ease.transform(0.5) - 0.5).abs() < 1e-6);
    }

    #[test]
    fn parse_keywords() {
        let mut p = Parser::new("ease-in");
        let v = EaseValue::parse(&mut p).unwrap();
        assert!(v.equal(&EaseValue::ease_in()));
    }
}
