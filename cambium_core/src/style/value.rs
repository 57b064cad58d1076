// Copyright 2026 the Cambium Authors
// SPDX-License-Identifier: Apache-2.0

//! The reference-counted style value and its operation vtable.

use std::any::Any;
use std::fmt;
use std::sync::Arc;

use peniko::Color;

use crate::style::property::PropertyId;
use crate::style::style::Style;

/// Context available to [`ValueOps::compute`].
///
/// Any field may be absent; implementations fall back to returning the value
/// unchanged when the context they need is missing.
pub struct ComputeContext<'a> {
    /// The provider that produced the style, for out-of-style lookups.
    pub provider: Option<&'a dyn StyleProvider>,
    /// The style the value belongs to.
    pub style: Option<&'a dyn Style>,
    /// The parent style, for inherited lookups (e.g. the parent font size
    /// when computing the `font-size` property itself).
    pub parent_style: Option<&'a dyn Style>,
}

impl ComputeContext<'_> {
    /// A context with nothing in it. `compute` against this is the identity.
    pub const EMPTY: ComputeContext<'static> = ComputeContext {
        provider: None,
        style: None,
        parent_style: None,
    };
}

impl fmt::Debug for ComputeContext<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ComputeContext")
            .field("provider", &self.provider.is_some())
            .field("style", &self.style.is_some())
            .field("parent_style", &self.parent_style.is_some())
            .finish()
    }
}

/// Out-of-style lookups consumed during value computation.
///
/// The theme machinery implements this; [`crate::testing`] has a trivial
/// implementation for tests.
pub trait StyleProvider {
    /// Resolves a theme-defined named color.
    fn lookup_color(&self, _name: &str) -> Option<Color> {
        None
    }
}

/// The operations every style value implements.
///
/// One implementation of this trait is one "value class"; compatibility
/// checks in [`Value::transition`] are by implementation type, so a family of
/// values that should interpolate across each other (the numeric units) must
/// share a single implementing type.
pub trait ValueOps: Any + fmt::Debug + Send + Sync {
    /// Resolves context-dependent tokens and returns the computed value.
    ///
    /// Returns `value` itself (cheap handle clone) when nothing changes.
    /// Must be idempotent for already-computed values.
    fn compute(&self, value: &Value, _property_id: PropertyId, _ctx: &ComputeContext<'_>) -> Value {
        value.clone()
    }

    /// Structural equality against another value of any class.
    ///
    /// Callers guarantee `other` is not the same allocation; the pointer
    /// short-circuit lives in [`Value::equal`].
    fn equal(&self, other: &Value) -> bool;

    /// Interpolates from `start` (which is `self`) toward `end`.
    ///
    /// Returns `None` when the two values cannot be interpolated.
    fn transition(
        &self,
        start: &Value,
        end: &Value,
        property_id: PropertyId,
        progress: f64,
    ) -> Option<Value>;

    /// Appends the canonical textual form, suitable for re-parsing.
    fn print(&self, out: &mut String);
}

/// An immutable, reference-counted style value.
///
/// Cloning a `Value` is a handle clone; the payload is shared and never
/// mutated after construction.
#[derive(Clone)]
pub struct Value(Arc<dyn ValueOps>);

impl Value {
    /// Wraps a concrete value payload.
    pub fn new(ops: impl ValueOps) -> Self {
        Self(Arc::new(ops))
    }

    /// Accesses the payload if it is a `T`.
    pub fn downcast_ref<T: ValueOps>(&self) -> Option<&T> {
        let any: &dyn Any = &*self.0;
        any.downcast_ref::<T>()
    }

    /// Resolves context-dependent tokens, returning `self` when nothing
    /// changes.
    pub fn compute(&self, property_id: PropertyId, ctx: &ComputeContext<'_>) -> Self {
        self.0.compute(self, property_id, ctx)
    }

    /// Structural equality.
    ///
    /// The same allocation always compares equal without consulting the
    /// payload.
    pub fn equal(&self, other: &Self) -> bool {
        if Arc::ptr_eq(&self.0, &other.0) {
            return true;
        }
        self.0.equal(other)
    }

    /// Interpolates toward `end` at `progress` in `[0, 1]`.
    ///
    /// Returns `None` when the values are incompatible.
    pub fn transition(&self, end: &Self, property_id: PropertyId, progress: f64) -> Option<Self> {
        self.0.transition(self, end, property_id, progress)
    }

    /// Appends the canonical textual form to `out`.
    pub fn print(&self, out: &mut String) {
        self.0.print(out);
    }

    /// The canonical textual form.
    pub fn to_css_string(&self) -> String {
        let mut out = String::new();
        self.print(&mut out);
        out
    }

    /// Whether the two handles share one allocation.
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }
}

impl fmt::Debug for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_css_string())
    }
}

/// The origin of a style value, reported for diagnostics.
///
/// Carries an opaque description such as a selector or a theme location.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Section(Arc<str>);

impl Section {
    /// Creates a section from its description.
    pub fn new(description: impl Into<Arc<str>>) -> Self {
        Self(description.into())
    }

    /// The description this section was created with.
    pub fn description(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Section {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::style::number::NumberValue;

    #[test]
    fn equal_is_reflexive_on_shared_handles() {
        let v = NumberValue::px(4.0);
        let w = v.clone();
        assert!(v.equal(&w));
        assert!(v.ptr_eq(&w));
    }

    #[test]
    fn compute_with_empty_context_is_identity() {
        let v = NumberValue::em(2.0);
        let computed = v.compute(crate::style::property::FONT_SIZE, &ComputeContext::EMPTY);
        assert!(v.ptr_eq(&computed));
    }
}
