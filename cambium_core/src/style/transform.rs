// Copyright 2026 the Cambium Authors
// SPDX-License-Identifier: Apache-2.0

//! Transform-list values.
//!
//! A transform value holds an ordered list of operations. Operations apply to
//! a point in reverse list order (the leftmost operation is outermost), which
//! is what accumulating `acc * op` produces.

use std::f64::consts::PI;

use kurbo::Affine;
use once_cell::sync::Lazy;
use smallvec::SmallVec;

use crate::style::number::{NumberParse, NumberValue};
use crate::style::parser::{ParseError, Parser};
use crate::style::property::PropertyId;
use crate::style::value::{ComputeContext, Value, ValueOps};

/// One operation in a transform list.
#[derive(Debug, Clone)]
pub enum TransformOp {
    /// An explicit affine matrix, `matrix(a, b, c, d, e, f)`.
    Matrix(Affine),
    /// `translate(x, y)`; operands are lengths.
    Translate {
        /// Horizontal offset.
        x: Value,
        /// Vertical offset.
        y: Value,
    },
    /// `rotate(angle)`; the operand is an angle.
    Rotate {
        /// Rotation angle.
        angle: Value,
    },
    /// `scale(x, y)`; operands are plain numbers.
    Scale {
        /// Horizontal factor.
        x: Value,
        /// Vertical factor.
        y: Value,
    },
    /// `skew(x, y)`; operands are angles.
    Skew {
        /// Horizontal skew angle.
        x: Value,
        /// Vertical skew angle.
        y: Value,
    },
    /// `skewX(angle)`.
    SkewX {
        /// Skew angle.
        angle: Value,
    },
    /// `skewY(angle)`.
    SkewY {
        /// Skew angle.
        angle: Value,
    },
}

/// Discriminant used for pairwise type agreement.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum OpKind {
    Matrix,
    Translate,
    Rotate,
    Scale,
    Skew,
    SkewX,
    SkewY,
}

impl TransformOp {
    fn kind(&self) -> OpKind {
        match self {
            Self::Matrix(_) => OpKind::Matrix,
            Self::Translate { .. } => OpKind::Translate,
            Self::Rotate { .. } => OpKind::Rotate,
            Self::Scale { .. } => OpKind::Scale,
            Self::Skew { .. } => OpKind::Skew,
            Self::SkewX { .. } => OpKind::SkewX,
            Self::SkewY { .. } => OpKind::SkewY,
        }
    }

    /// The identity operation of the same kind, used to pad the shorter list
    /// during equality checks and transitions.
    fn identity(kind: OpKind) -> Self {
        match kind {
            OpKind::Matrix => Self::Matrix(Affine::IDENTITY),
            OpKind::Translate => Self::Translate {
                x: NumberValue::px(0.0),
                y: NumberValue::px(0.0),
            },
            OpKind::Rotate => Self::Rotate {
                angle: NumberValue::deg(0.0),
            },
            OpKind::Scale => Self::Scale {
                x: NumberValue::number(1.0),
                y: NumberValue::number(1.0),
            },
            OpKind::Skew => Self::Skew {
                x: NumberValue::deg(0.0),
                y: NumberValue::deg(0.0),
            },
            OpKind::SkewX => Self::SkewX {
                angle: NumberValue::deg(0.0),
            },
            OpKind::SkewY => Self::SkewY {
                angle: NumberValue::deg(0.0),
            },
        }
    }

    fn get(value: &Value, one_hundred_percent: f64) -> f64 {
        value
            .downcast_ref::<NumberValue>()
            .map(|n| n.get(one_hundred_percent))
            .unwrap_or(0.0)
    }

    /// Folds this operation into the accumulated matrix.
    fn apply(&self, matrix: Affine) -> Affine {
        match self {
            Self::Matrix(m) => matrix * *m,
            Self::Translate { x, y } => {
                matrix * Affine::translate((Self::get(x, 100.0), Self::get(y, 100.0)))
            }
            Self::Rotate { angle } => matrix * Affine::rotate(Self::get(angle, 100.0) * PI / 180.0),
            Self::Scale { x, y } => {
                matrix * Affine::scale_non_uniform(Self::get(x, 1.0), Self::get(y, 1.0))
            }
            Self::Skew { x, y } => {
                let x = (Self::get(x, 100.0) * PI / 180.0).tan();
                let y = (Self::get(y, 100.0) * PI / 180.0).tan();
                matrix * Affine::new([1.0, y, x, 1.0, 0.0, 0.0])
            }
            Self::SkewX { angle } => {
                let x = (Self::get(angle, 100.0) * PI / 180.0).tan();
                matrix * Affine::new([1.0, 0.0, x, 1.0, 0.0, 0.0])
            }
            Self::SkewY { angle } => {
                let y = (Self::get(angle, 100.0) * PI / 180.0).tan();
                matrix * Affine::new([1.0, y, 0.0, 1.0, 0.0, 0.0])
            }
        }
    }

    fn compute(&self, property_id: PropertyId, ctx: &ComputeContext<'_>) -> (Self, bool) {
        let one = |v: &Value| {
            let c = v.compute(property_id, ctx);
            let same = c.ptr_eq(v);
            (c, same)
        };
        match self {
            Self::Matrix(m) => (Self::Matrix(*m), true),
            Self::Translate { x, y } => {
                let (x, sx) = one(x);
                let (y, sy) = one(y);
                (Self::Translate { x, y }, sx && sy)
            }
            Self::Rotate { angle } => {
                let (angle, s) = one(angle);
                (Self::Rotate { angle }, s)
            }
            Self::Scale { x, y } => {
                let (x, sx) = one(x);
                let (y, sy) = one(y);
                (Self::Scale { x, y }, sx && sy)
            }
            Self::Skew { x, y } => {
                let (x, sx) = one(x);
                let (y, sy) = one(y);
                (Self::Skew { x, y }, sx && sy)
            }
            Self::SkewX { angle } => {
                let (angle, s) = one(angle);
                (Self::SkewX { angle }, s)
            }
            Self::SkewY { angle } => {
                let (angle, s) = one(angle);
                (Self::SkewY { angle }, s)
            }
        }
    }

    fn op_equal(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Matrix(a), Self::Matrix(b)) => a.as_coeffs() == b.as_coeffs(),
            (Self::Translate { x: ax, y: ay }, Self::Translate { x: bx, y: by })
            | (Self::Scale { x: ax, y: ay }, Self::Scale { x: bx, y: by })
            | (Self::Skew { x: ax, y: ay }, Self::Skew { x: bx, y: by }) => {
                ax.equal(bx) && ay.equal(by)
            }
            (Self::Rotate { angle: a }, Self::Rotate { angle: b })
            | (Self::SkewX { angle: a }, Self::SkewX { angle: b })
            | (Self::SkewY { angle: a }, Self::SkewY { angle: b }) => a.equal(b),
            _ => false,
        }
    }

    fn op_transition(&self, other: &Self, property_id: PropertyId, progress: f64) -> Option<Self> {
        let lerp = |a: &Value, b: &Value| a.transition(b, property_id, progress);
        match (self, other) {
            (Self::Matrix(a), Self::Matrix(b)) => {
                Some(Self::Matrix(matrix_transition(*a, *b, progress)))
            }
            (Self::Translate { x: ax, y: ay }, Self::Translate { x: bx, y: by }) => {
                Some(Self::Translate {
                    x: lerp(ax, bx)?,
                    y: lerp(ay, by)?,
                })
            }
            (Self::Rotate { angle: a }, Self::Rotate { angle: b }) => Some(Self::Rotate {
                angle: lerp(a, b)?,
            }),
            (Self::Scale { x: ax, y: ay }, Self::Scale { x: bx, y: by }) => Some(Self::Scale {
                x: lerp(ax, bx)?,
                y: lerp(ay, by)?,
            }),
            (Self::Skew { x: ax, y: ay }, Self::Skew { x: bx, y: by }) => Some(Self::Skew {
                x: lerp(ax, bx)?,
                y: lerp(ay, by)?,
            }),
            (Self::SkewX { angle: a }, Self::SkewX { angle: b }) => Some(Self::SkewX {
                angle: lerp(a, b)?,
            }),
            (Self::SkewY { angle: a }, Self::SkewY { angle: b }) => Some(Self::SkewY {
                angle: lerp(a, b)?,
            }),
            _ => None,
        }
    }

    fn print(&self, out: &mut String) {
        match self {
            Self::Matrix(m) => {
                out.push_str("matrix(");
                for (i, c) in m.as_coeffs().into_iter().enumerate() {
                    if i > 0 {
                        out.push_str(", ");
                    }
                    crate::util::write_css_number(out, c);
                }
                out.push(')');
            }
            Self::Translate { x, y } => {
                out.push_str("translate(");
                x.print(out);
                out.push_str(", ");
                y.print(out);
                out.push(')');
            }
            Self::Rotate { angle } => {
                out.push_str("rotate(");
                angle.print(out);
                out.push(')');
            }
            Self::Scale { x, y } => {
                out.push_str("scale(");
                x.print(out);
                if !x.equal(y) {
                    out.push_str(", ");
                    y.print(out);
                }
                out.push(')');
            }
            Self::Skew { x, y } => {
                out.push_str("skew(");
                x.print(out);
                out.push_str(", ");
                y.print(out);
                out.push(')');
            }
            Self::SkewX { angle } => {
                out.push_str("skewX(");
                angle.print(out);
                out.push(')');
            }
            Self::SkewY { angle } => {
                out.push_str("skewY(");
                angle.print(out);
                out.push(')');
            }
        }
    }
}

/// A transform list. The empty list is the distinguished `none` value.
#[derive(Debug)]
pub struct TransformValue {
    ops: SmallVec<[TransformOp; 2]>,
}

static NONE: Lazy<Value> = Lazy::new(|| {
    Value::new(TransformValue {
        ops: SmallVec::new(),
    })
});

impl TransformValue {
    /// The shared `none` transform.
    pub fn none() -> Value {
        NONE.clone()
    }

    /// Wraps a list of operations.
    pub fn new(ops: impl IntoIterator<Item = TransformOp>) -> Value {
        let ops: SmallVec<[TransformOp; 2]> = ops.into_iter().collect();
        if ops.is_empty() {
            Self::none()
        } else {
            Value::new(Self { ops })
        }
    }

    /// Whether this is the `none` transform.
    pub fn is_none(&self) -> bool {
        self.ops.is_empty()
    }

    /// The operations, outermost first.
    pub fn ops(&self) -> &[TransformOp] {
        &self.ops
    }

    /// Collapses the list into a single affine matrix.
    pub fn to_affine(&self) -> Affine {
        self.ops
            .iter()
            .fold(Affine::IDENTITY, |acc, op| op.apply(acc))
    }

    /// The inverse matrix, or `None` if the transform is singular.
    pub fn inverse_matrix(&self) -> Option<Affine> {
        let m = self.to_affine();
        if m.determinant().abs() < 1e-12 {
            None
        } else {
            Some(m.inverse())
        }
    }

    /// Parses a transform list: `none` or a sequence of operations
    /// terminated by end of input or a `;`.
    pub fn parse(parser: &mut Parser<'_>) -> Result<Value, ParseError> {
        if parser.try_literal("none") {
            return Ok(Self::none());
        }
        let mut ops = SmallVec::new();
        loop {
            ops.push(parse_op(parser)?);
            if parser.is_eof() || parser.begins_with(';') {
                break;
            }
        }
        Ok(Value::new(Self { ops }))
    }
}

fn parse_op(parser: &mut Parser<'_>) -> Result<TransformOp, ParseError> {
    let number = |parser: &mut Parser<'_>, accept: NumberParse, what: &str| {
        NumberValue::parse(parser, accept).ok_or_else(|| parser.error(format!("expected {what}")))
    };
    let op = if parser.try_literal("matrix(") {
        let mut coeffs = [0.0; 6];
        for (i, c) in coeffs.iter_mut().enumerate() {
            if i > 0 && !parser.try_literal(",") {
                return Err(parser.error("invalid syntax for matrix()"));
            }
            *c = parser
                .try_double()
                .ok_or_else(|| parser.error("invalid syntax for matrix()"))?;
        }
        TransformOp::Matrix(Affine::new(coeffs))
    } else if parser.try_literal("translateX(") {
        TransformOp::Translate {
            x: number(parser, NumberParse::Length, "a length")?,
            y: NumberValue::px(0.0),
        }
    } else if parser.try_literal("translateY(") {
        TransformOp::Translate {
            x: NumberValue::px(0.0),
            y: number(parser, NumberParse::Length, "a length")?,
        }
    } else if parser.try_literal("translate(") {
        let x = number(parser, NumberParse::Length, "a length")?;
        let y = if parser.try_literal(",") {
            number(parser, NumberParse::Length, "a length")?
        } else {
            NumberValue::px(0.0)
        };
        TransformOp::Translate { x, y }
    } else if parser.try_literal("scaleX(") {
        TransformOp::Scale {
            x: number(parser, NumberParse::Number, "a number")?,
            y: NumberValue::number(1.0),
        }
    } else if parser.try_literal("scaleY(") {
        TransformOp::Scale {
            x: NumberValue::number(1.0),
            y: number(parser, NumberParse::Number, "a number")?,
        }
    } else if parser.try_literal("scale(") {
        let x = number(parser, NumberParse::Number, "a number")?;
        let y = if parser.try_literal(",") {
            number(parser, NumberParse::Number, "a number")?
        } else {
            x.clone()
        };
        TransformOp::Scale { x, y }
    } else if parser.try_literal("rotate(") {
        TransformOp::Rotate {
            angle: number(parser, NumberParse::Angle, "an angle")?,
        }
    } else if parser.try_literal("skewX(") {
        TransformOp::SkewX {
            angle: number(parser, NumberParse::Angle, "an angle")?,
        }
    } else if parser.try_literal("skewY(") {
        TransformOp::SkewY {
            angle: number(parser, NumberParse::Angle, "an angle")?,
        }
    } else if parser.try_literal("skew(") {
        let x = number(parser, NumberParse::Angle, "an angle")?;
        let y = if parser.try_literal(",") {
            number(parser, NumberParse::Angle, "an angle")?
        } else {
            NumberValue::deg(0.0)
        };
        TransformOp::Skew { x, y }
    } else {
        return Err(parser.error("unknown syntax for transform"));
    };
    parser.expect_literal(")")?;
    Ok(op)
}

impl ValueOps for TransformValue {
    fn compute(&self, value: &Value, property_id: PropertyId, ctx: &ComputeContext<'_>) -> Value {
        // Special case the 99% case of "none".
        if self.is_none() {
            return value.clone();
        }
        let mut changed = false;
        let ops: SmallVec<[TransformOp; 2]> = self
            .ops
            .iter()
            .map(|op| {
                let (computed, same) = op.compute(property_id, ctx);
                changed |= !same;
                computed
            })
            .collect();
        if changed {
            Value::new(Self { ops })
        } else {
            value.clone()
        }
    }

    fn equal(&self, other: &Value) -> bool {
        let Some(other) = other.downcast_ref::<Self>() else {
            return false;
        };
        let n = self.ops.len().min(other.ops.len());
        for i in 0..n {
            if !self.ops[i].op_equal(&other.ops[i]) {
                return false;
            }
        }
        // The tail of the longer list must consist of identity operations.
        let larger = if self.ops.len() > other.ops.len() {
            &self.ops
        } else {
            &other.ops
        };
        larger[n..]
            .iter()
            .all(|op| op.op_equal(&TransformOp::identity(op.kind())))
    }

    fn transition(
        &self,
        start: &Value,
        end: &Value,
        property_id: PropertyId,
        progress: f64,
    ) -> Option<Value> {
        let other = end.downcast_ref::<Self>()?;
        if self.is_none() && other.is_none() {
            return Some(start.clone());
        }
        if progress == 0.0 {
            return Some(start.clone());
        }
        if progress == 1.0 {
            return Some(end.clone());
        }
        let n = if self.is_none() || other.is_none() {
            0
        } else {
            self.ops.len().min(other.ops.len())
        };

        // Pairwise-incompatible lists interpolate between their collapsed
        // matrices instead.
        for i in 0..n {
            if self.ops[i].kind() != other.ops[i].kind() {
                let m =
                    matrix_transition(self.to_affine(), other.to_affine(), progress);
                return Some(Self::new([TransformOp::Matrix(m)]));
            }
        }

        let mut ops = SmallVec::with_capacity(self.ops.len().max(other.ops.len()));
        for i in 0..n {
            ops.push(self.ops[i].op_transition(&other.ops[i], property_id, progress)?);
        }
        for op in &self.ops[n..] {
            let identity = TransformOp::identity(op.kind());
            ops.push(op.op_transition(&identity, property_id, progress)?);
        }
        for op in &other.ops[other.ops.len().min(n)..] {
            let identity = TransformOp::identity(op.kind());
            ops.push(identity.op_transition(op, property_id, progress)?);
        }
        Some(Value::new(Self { ops }))
    }

    fn print(&self, out: &mut String) {
        if self.is_none() {
            out.push_str("none");
            return;
        }
        for (i, op) in self.ops.iter().enumerate() {
            if i > 0 {
                out.push(' ');
            }
            op.print(out);
        }
    }
}

// --- MARK: DECOMPOSITION

/// A matrix split into interpolable parts, following the CSS 2d
/// decomposition.
struct Decomposed {
    translate: [f64; 2],
    scale: [f64; 2],
    /// Degrees.
    angle: f64,
    /// Rotation-removed residual, row-major `[m11, m12, m21, m22]`.
    residual: [f64; 4],
}

fn decompose(matrix: Affine) -> Decomposed {
    let [a, b, c, d, e, f] = matrix.as_coeffs();
    let (mut row0x, mut row0y) = (a, b);
    let (mut row1x, mut row1y) = (c, d);

    let mut scale = [row0x.hypot(row0y), row1x.hypot(row1y)];

    // If the determinant is negative, one axis was flipped; flip the axis
    // with the smaller unit-vector dot product.
    let determinant = row0x * row1y - row0y * row1x;
    if determinant < 0.0 {
        if row0x < row1y {
            scale[0] = -scale[0];
        } else {
            scale[1] = -scale[1];
        }
    }

    if scale[0] != 0.0 {
        row0x /= scale[0];
        row0y /= scale[0];
    }
    if scale[1] != 0.0 {
        row1x /= scale[1];
        row1y /= scale[1];
    }

    let angle = row0y.atan2(row0x);
    let (sin, cos) = angle.sin_cos();
    // Rotate the normalized matrix by -angle to strip the rotation.
    let residual = [
        cos * row0x + sin * row0y,
        cos * row0y - sin * row0x,
        cos * row1x + sin * row1y,
        cos * row1y - sin * row1x,
    ];

    Decomposed {
        translate: [e, f],
        scale,
        angle: angle * 180.0 / PI,
        residual,
    }
}

fn interpolate_decomposed(start: &Decomposed, end: &Decomposed, progress: f64) -> Decomposed {
    let lerp = |a: f64, b: f64| a + (b - a) * progress;

    let mut scale;
    let start_angle;
    let end_angle;
    // If the x axis of one is flipped and the y axis of the other, convert
    // to an unflipped rotation.
    if (start.scale[0] < 0.0 && end.scale[1] < 0.0)
        || (start.scale[1] < 0.0 && end.scale[0] < 0.0)
    {
        scale = [-start.scale[0], -start.scale[1]];
        start_angle = if start.angle < 0.0 {
            start.angle + 180.0
        } else {
            start.angle - 180.0
        };
        end_angle = end.angle;
    } else {
        scale = start.scale;
        start_angle = start.angle;
        end_angle = end.angle;
    }
    scale[0] = lerp(scale[0], end.scale[0]);
    scale[1] = lerp(scale[1], end.scale[1]);

    // Don't rotate the long way around.
    let mut start_angle = if start_angle == 0.0 { 360.0 } else { start_angle };
    let mut end_angle = if end_angle == 0.0 { 360.0 } else { end_angle };
    if (start_angle - end_angle).abs() > 180.0 {
        if start_angle > end_angle {
            start_angle -= 360.0;
        } else {
            end_angle -= 360.0;
        }
    }

    Decomposed {
        translate: [
            lerp(start.translate[0], end.translate[0]),
            lerp(start.translate[1], end.translate[1]),
        ],
        scale,
        angle: lerp(start_angle, end_angle),
        residual: [
            lerp(start.residual[0], end.residual[0]),
            lerp(start.residual[1], end.residual[1]),
            lerp(start.residual[2], end.residual[2]),
            lerp(start.residual[3], end.residual[3]),
        ],
    }
}

fn recompose(d: &Decomposed) -> Affine {
    let residual = Affine::new([d.residual[0], d.residual[1], d.residual[2], d.residual[3], 0.0, 0.0]);
    Affine::translate((d.translate[0], d.translate[1]))
        * Affine::rotate(d.angle * PI / 180.0)
        * residual
        * Affine::scale_non_uniform(d.scale[0], d.scale[1])
}

/// Interpolates two matrices by decomposing, lerping parts (with shortest-arc
/// angle selection), and recomposing.
fn matrix_transition(start: Affine, end: Affine, progress: f64) -> Affine {
    let dstart = decompose(start);
    let dend = decompose(end);
    recompose(&interpolate_decomposed(&dstart, &dend, progress))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::style::property::TRANSFORM;
    use float_cmp::assert_approx_eq;

    fn parse(s: &str) -> Value {
        let mut p = Parser::new(s);
        TransformValue::parse(&mut p).unwrap()
    }

    #[test]
    fn none_is_a_shared_singleton() {
        assert!(TransformValue::none().ptr_eq(&parse("none")));
    }

    #[test]
    fn parse_print_round_trip() {
        for s in [
            "translate(10px, 0px) rotate(30deg)",
            "matrix(1, 0, 0, 1, 5, 6)",
            "scale(2)",
            "scale(2, 3)",
            "skewX(10deg)",
            "translateX(4px)",
        ] {
            let t = parse(s);
            let reparsed = parse(&t.to_css_string());
            assert!(t.equal(&reparsed), "round trip failed for {s}");
        }
    }

    #[test]
    fn defaults_for_missing_second_argument() {
        assert!(parse("translate(5px)").equal(&parse("translate(5px, 0px)")));
        assert!(parse("scale(2)").equal(&parse("scale(2, 2)")));
        assert!(parse("skew(10deg)").equal(&parse("skew(10deg, 0deg)")));
    }

    #[test]
    fn equal_pads_with_identity() {
        let a = parse("rotate(10deg) scale(1)");
        let b = parse("rotate(10deg)");
        assert!(a.equal(&b));

        let c = parse("rotate(10deg) scale(2)");
        assert!(!c.equal(&b));
    }

    #[test]
    fn compatible_lists_interpolate_componentwise() {
        let a = parse("translate(0px) rotate(0deg)");
        let b = parse("translate(10px) rotate(90deg)");
        let mid = a.transition(&b, TRANSFORM, 0.5).unwrap();
        assert!(mid.equal(&parse("translate(5px, 0px) rotate(45deg)")));
    }

    #[test]
    fn longer_list_tail_interpolates_against_identity() {
        let a = parse("rotate(0deg)");
        let b = parse("rotate(90deg) scale(3)");
        let mid = a.transition(&b, TRANSFORM, 0.5).unwrap();
        assert!(mid.equal(&parse("rotate(45deg) scale(2)")));
    }

    #[test]
    fn incompatible_lists_collapse_to_matrix() {
        let a = parse("translate(10px, 0px) rotate(30deg)");
        let b = parse("rotate(60deg) translate(20px, 0px)");
        let mid = a.transition(&b, TRANSFORM, 0.5).unwrap();
        let transform = mid.downcast_ref::<TransformValue>().unwrap();
        assert_eq!(transform.ops().len(), 1);
        let TransformOp::Matrix(m) = &transform.ops()[0] else {
            panic!("expected a matrix result");
        };
        let [a_, b_, c_, d_, e_, f_] = m.as_coeffs();
        let quarter = 45.0_f64.to_radians();
        assert_approx_eq!(f64, a_, quarter.cos(), epsilon = 1e-6);
        assert_approx_eq!(f64, b_, quarter.sin(), epsilon = 1e-6);
        assert_approx_eq!(f64, c_, -quarter.sin(), epsilon = 1e-6);
        assert_approx_eq!(f64, d_, quarter.cos(), epsilon = 1e-6);
        // Translate components are the average of (10, 0) and the rotated
        // (20cos60, 20sin60) = (10, 17.32...).
        assert_approx_eq!(f64, e_, 10.0, epsilon = 1e-6);
        assert_approx_eq!(f64, f_, 10.0 * 60.0_f64.to_radians().sin(), epsilon = 1e-6);
    }

    #[test]
    fn decompose_recompose_round_trips() {
        let m = Affine::translate((3.0, 4.0))
            * Affine::rotate(0.7)
            * Affine::scale_non_uniform(2.0, 0.5);
        let d = decompose(m);
        let back = recompose(&d);
        for (a, b) in m.as_coeffs().iter().zip(back.as_coeffs().iter()) {
            assert_approx_eq!(f64, *a, *b, epsilon = 1e-9);
        }
    }

    #[test]
    fn transition_at_endpoints_recovers_inputs() {
        let a = parse("rotate(10deg)");
        let b = parse("rotate(70deg)");
        assert!(a.transition(&b, TRANSFORM, 0.0).unwrap().equal(&a));
        assert!(a.transition(&b, TRANSFORM, 1.0).unwrap().equal(&b));
    }

    #[test]
    fn singular_transform_has_no_inverse() {
        let t = parse("scale(0)");
        let transform = t.downcast_ref::<TransformValue>().unwrap();
        assert!(transform.inverse_matrix().is_none());
        let u = parse("scale(2)");
        assert!(u.downcast_ref::<TransformValue>().unwrap().inverse_matrix().is_some());
    }
}
