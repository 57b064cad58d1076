// Copyright 2026 the Cambium Authors
// SPDX-License-Identifier: Apache-2.0

//! Background-size values.

use once_cell::sync::Lazy;

use crate::style::number::{NumberParse, NumberValue};
use crate::style::parser::Parser;
use crate::style::property::PropertyId;
use crate::style::value::{ComputeContext, Value, ValueOps};

/// A `background-size` value: `cover`, `contain`, or an explicit pair where
/// `None` is `auto`.
#[derive(Debug)]
pub enum BgSizeValue {
    /// Scale to the smallest size covering the whole container.
    Cover,
    /// Scale to the largest size contained in the container.
    Contain,
    /// Explicit per-axis sizes; `None` means `auto`.
    Explicit {
        /// Horizontal size, or `auto`.
        x: Option<Value>,
        /// Vertical size, or `auto`.
        y: Option<Value>,
    },
}

static AUTO: Lazy<Value> = Lazy::new(|| Value::new(BgSizeValue::Explicit { x: None, y: None }));
static COVER: Lazy<Value> = Lazy::new(|| Value::new(BgSizeValue::Cover));
static CONTAIN: Lazy<Value> = Lazy::new(|| Value::new(BgSizeValue::Contain));

impl BgSizeValue {
    /// The shared `auto` value.
    pub fn auto() -> Value {
        AUTO.clone()
    }

    /// The shared `cover` value.
    pub fn cover() -> Value {
        COVER.clone()
    }

    /// The shared `contain` value.
    pub fn contain() -> Value {
        CONTAIN.clone()
    }

    /// An explicit size pair.
    pub fn explicit(x: Option<Value>, y: Option<Value>) -> Value {
        if x.is_none() && y.is_none() {
            Self::auto()
        } else {
            Value::new(Self::Explicit { x, y })
        }
    }

    /// Parses `cover`, `contain`, or one or two of `auto` | length | percent.
    pub fn parse(parser: &mut Parser<'_>) -> Option<Value> {
        if parser.try_literal("cover") {
            return Some(Self::cover());
        }
        if parser.try_literal("contain") {
            return Some(Self::contain());
        }
        let axis = |parser: &mut Parser<'_>| -> Option<Option<Value>> {
            if parser.try_literal("auto") {
                Some(None)
            } else {
                NumberValue::parse(parser, NumberParse::Length).map(Some)
            }
        };
        let x = axis(parser)?;
        let y = if parser.is_eof() || parser.begins_with(';') {
            None
        } else {
            axis(parser)?
        };
        Some(Self::explicit(x, y))
    }

    /// Resolves the value against a container and the image's intrinsic
    /// size, returning the concrete render size.
    pub fn concrete_size(
        &self,
        container_width: f64,
        container_height: f64,
        image_width: f64,
        image_height: f64,
    ) -> (f64, f64) {
        let aspect = if image_height > 0.0 {
            image_width / image_height
        } else {
            1.0
        };
        match self {
            Self::Cover => {
                if container_width / container_height >= aspect {
                    (container_width, container_width / aspect)
                } else {
                    (container_height * aspect, container_height)
                }
            }
            Self::Contain => {
                if container_width / container_height <= aspect {
                    (container_width, container_width / aspect)
                } else {
                    (container_height * aspect, container_height)
                }
            }
            Self::Explicit { x, y } => {
                let resolve = |axis: &Option<Value>, reference: f64| {
                    axis.as_ref().and_then(|v| {
                        v.downcast_ref::<NumberValue>().map(|n| n.get(reference))
                    })
                };
                match (resolve(x, container_width), resolve(y, container_height)) {
                    (Some(w), Some(h)) => (w, h),
                    // `auto` follows the image's concrete-size rule: keep
                    // the intrinsic aspect against the specified axis.
                    (Some(w), None) => (w, w / aspect),
                    (None, Some(h)) => (h * aspect, h),
                    (None, None) => (image_width, image_height),
                }
            }
        }
    }
}

impl ValueOps for BgSizeValue {
    fn compute(&self, value: &Value, property_id: PropertyId, ctx: &ComputeContext<'_>) -> Value {
        match self {
            Self::Cover | Self::Contain => value.clone(),
            Self::Explicit { x, y } => {
                let one = |axis: &Option<Value>| -> (Option<Value>, bool) {
                    match axis {
                        None => (None, true),
                        Some(v) => {
                            let c = v.compute(property_id, ctx);
                            let same = c.ptr_eq(v);
                            (Some(c), same)
                        }
                    }
                };
                let (cx, sx) = one(x);
                let (cy, sy) = one(y);
                if sx && sy {
                    value.clone()
                } else {
                    Self::explicit(cx, cy)
                }
            }
        }
    }

    fn equal(&self, other: &Value) -> bool {
        let Some(other) = other.downcast_ref::<Self>() else {
            return false;
        };
        let axis_equal = |a: &Option<Value>, b: &Option<Value>| match (a, b) {
            (None, None) => true,
            (Some(a), Some(b)) => a.equal(b),
            _ => false,
        };
        match (self, other) {
            (Self::Cover, Self::Cover) | (Self::Contain, Self::Contain) => true,
            (Self::Explicit { x: ax, y: ay }, Self::Explicit { x: bx, y: by }) => {
                axis_equal(ax, bx) && axis_equal(ay, by)
            }
            _ => false,
        }
    }

    fn transition(
        &self,
        start: &Value,
        end: &Value,
        property_id: PropertyId,
        progress: f64,
    ) -> Option<Value> {
        let other = end.downcast_ref::<Self>()?;
        match (self, other) {
            // The keyword singletons only transition to themselves.
            (Self::Cover, Self::Cover) | (Self::Contain, Self::Contain) => Some(start.clone()),
            (Self::Explicit { x: ax, y: ay }, Self::Explicit { x: bx, y: by }) => {
                // Both axes must be concrete on both sides.
                let (ax, ay, bx, by) =
                    (ax.as_ref()?, ay.as_ref()?, bx.as_ref()?, by.as_ref()?);
                if progress == 0.0 {
                    return Some(start.clone());
                }
                if progress == 1.0 {
                    return Some(end.clone());
                }
                Some(Self::explicit(
                    Some(ax.transition(bx, property_id, progress)?),
                    Some(ay.transition(by, property_id, progress)?),
                ))
            }
            _ => None,
        }
    }

    fn print(&self, out: &mut String) {
        match self {
            Self::Cover => out.push_str("cover"),
            Self::Contain => out.push_str("contain"),
            Self::Explicit { x, y } => {
                match x {
                    Some(v) => v.print(out),
                    None => out.push_str("auto"),
                }
                out.push(' ');
                match y {
                    Some(v) => v.print(out),
                    None => out.push_str("auto"),
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::style::property::BACKGROUND_SIZE;

    fn parse(s: &str) -> Value {
        let mut p = Parser::new(s);
        BgSizeValue::parse(&mut p).unwrap()
    }

    fn concrete(v: &Value, cw: f64, ch: f64, iw: f64, ih: f64) -> (f64, f64) {
        v.downcast_ref::<BgSizeValue>()
            .unwrap()
            .concrete_size(cw, ch, iw, ih)
    }

    #[test]
    fn keyword_singletons_are_shared() {
        assert!(parse("cover").ptr_eq(&BgSizeValue::cover()));
        assert!(parse("auto").ptr_eq(&BgSizeValue::auto()));
        assert!(parse("auto auto").ptr_eq(&BgSizeValue::auto()));
    }

    #[test]
    fn cover_fills_both_axes() {
        // Container 200x100, image aspect 1: wide container wins.
        assert_eq!(concrete(&parse("cover"), 200.0, 100.0, 50.0, 50.0), (200.0, 200.0));
        // Tall container: height wins.
        assert_eq!(concrete(&parse("cover"), 100.0, 200.0, 50.0, 50.0), (200.0, 200.0));
    }

    #[test]
    fn contain_fits_both_axes() {
        assert_eq!(concrete(&parse("contain"), 200.0, 100.0, 50.0, 50.0), (100.0, 100.0));
    }

    #[test]
    fn explicit_sizes_resolve_percentages() {
        assert_eq!(
            concrete(&parse("50% 100%"), 200.0, 100.0, 50.0, 50.0),
            (100.0, 100.0)
        );
    }

    #[test]
    fn auto_inherits_from_intrinsic_dimensions() {
        assert_eq!(concrete(&parse("auto"), 200.0, 100.0, 30.0, 40.0), (30.0, 40.0));
        // One axis specified: the other follows the image aspect.
        assert_eq!(concrete(&parse("60px"), 200.0, 100.0, 30.0, 40.0), (60.0, 80.0));
    }

    #[test]
    fn transition_requires_concrete_axes() {
        let a = parse("10px 10px");
        let b = parse("30px 30px");
        let mid = a.transition(&b, BACKGROUND_SIZE, 0.5).unwrap();
        assert!(mid.equal(&parse("20px 20px")));

        assert!(parse("auto").transition(&b, BACKGROUND_SIZE, 0.5).is_none());
        assert!(parse("cover").transition(&b, BACKGROUND_SIZE, 0.5).is_none());
        assert!(
            parse("cover")
                .transition(&parse("cover"), BACKGROUND_SIZE, 0.5)
                .unwrap()
                .equal(&BgSizeValue::cover())
        );
    }
}
