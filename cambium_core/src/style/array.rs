// Copyright 2026 the Cambium Authors
// SPDX-License-Identifier: Apache-2.0

//! Identifier and array values.
//!
//! The `transition-*` properties hold arrays whose elements are consulted per
//! animated property; lookups cycle, so a single-element array applies to
//! every property.

use crate::style::parser::Parser;
use crate::style::property::PropertyId;
use crate::style::value::{ComputeContext, Value, ValueOps};

/// A keyword value (`all`, `none`, a property name, a binding-set name).
#[derive(Debug)]
pub struct IdentValue {
    name: Box<str>,
}

impl IdentValue {
    /// Wraps an identifier.
    pub fn new(name: impl Into<Box<str>>) -> Value {
        Value::new(Self { name: name.into() })
    }

    /// The identifier text.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Parses one identifier.
    pub fn parse(parser: &mut Parser<'_>) -> Option<Value> {
        parser.try_ident().map(Self::new)
    }
}

impl ValueOps for IdentValue {
    fn equal(&self, other: &Value) -> bool {
        let Some(other) = other.downcast_ref::<Self>() else {
            return false;
        };
        self.name == other.name
    }

    fn transition(
        &self,
        start: &Value,
        end: &Value,
        _property_id: PropertyId,
        _progress: f64,
    ) -> Option<Value> {
        // Keywords only transition to themselves.
        if start.equal(end) { Some(start.clone()) } else { None }
    }

    fn print(&self, out: &mut String) {
        out.push_str(&self.name);
    }
}

/// An ordered list of values.
#[derive(Debug)]
pub struct ArrayValue {
    values: Vec<Value>,
}

impl ArrayValue {
    /// Wraps a list of values.
    pub fn new(values: Vec<Value>) -> Value {
        Value::new(Self { values })
    }

    /// The number of elements.
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Whether the array is empty.
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// The `i`-th element, cycling past the end.
    ///
    /// Returns `None` only for an empty array.
    pub fn get_nth(&self, i: usize) -> Option<&Value> {
        if self.values.is_empty() {
            None
        } else {
            Some(&self.values[i % self.values.len()])
        }
    }

    /// Iterates the elements in order.
    pub fn iter(&self) -> impl Iterator<Item = &Value> {
        self.values.iter()
    }

    /// Parses a comma-separated list using `element` for each item.
    pub fn parse(
        parser: &mut Parser<'_>,
        mut element: impl FnMut(&mut Parser<'_>) -> Option<Value>,
    ) -> Option<Value> {
        let mut values = vec![element(parser)?];
        while parser.try_literal(",") {
            values.push(element(parser)?);
        }
        Some(Self::new(values))
    }
}

impl ValueOps for ArrayValue {
    fn compute(&self, value: &Value, property_id: PropertyId, ctx: &ComputeContext<'_>) -> Value {
        let mut changed = false;
        let computed: Vec<Value> = self
            .values
            .iter()
            .map(|v| {
                let c = v.compute(property_id, ctx);
                changed |= !c.ptr_eq(v);
                c
            })
            .collect();
        if changed {
            Self::new(computed)
        } else {
            value.clone()
        }
    }

    fn equal(&self, other: &Value) -> bool {
        let Some(other) = other.downcast_ref::<Self>() else {
            return false;
        };
        self.values.len() == other.values.len()
            && self
                .values
                .iter()
                .zip(&other.values)
                .all(|(a, b)| a.equal(b))
    }

    fn transition(
        &self,
        start: &Value,
        end: &Value,
        property_id: PropertyId,
        progress: f64,
    ) -> Option<Value> {
        let other = end.downcast_ref::<Self>()?;
        if self.values.len() != other.values.len() {
            return None;
        }
        if progress == 0.0 {
            return Some(start.clone());
        }
        if progress == 1.0 {
            return Some(end.clone());
        }
        let values: Option<Vec<Value>> = self
            .values
            .iter()
            .zip(&other.values)
            .map(|(a, b)| a.transition(b, property_id, progress))
            .collect();
        Some(Self::new(values?))
    }

    fn print(&self, out: &mut String) {
        for (i, v) in self.values.iter().enumerate() {
            if i > 0 {
                out.push_str(", ");
            }
            v.print(out);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::style::number::NumberValue;
    use crate::style::property::OPACITY;

    #[test]
    fn get_nth_cycles() {
        let v = ArrayValue::new(vec![NumberValue::number(1.0), NumberValue::number(2.0)]);
        let array = v.downcast_ref::<ArrayValue>().unwrap();
        assert_eq!(
            array
                .get_nth(5)
                .unwrap()
                .downcast_ref::<NumberValue>()
                .unwrap()
                .raw(),
            2.0
        );
    }

    #[test]
    fn ident_transitions_to_itself_only() {
        let a = IdentValue::new("all");
        let b = IdentValue::new("all");
        let c = IdentValue::new("none");
        assert!(a.transition(&b, OPACITY, 0.3).is_some());
        assert!(a.transition(&c, OPACITY, 0.3).is_none());
    }

    #[test]
    fn array_length_mismatch_is_incompatible() {
        let a = ArrayValue::new(vec![NumberValue::number(1.0)]);
        let b = ArrayValue::new(vec![NumberValue::number(1.0), NumberValue::number(2.0)]);
        assert!(a.transition(&b, OPACITY, 0.5).is_none());
    }
}
