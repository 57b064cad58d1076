// Copyright 2026 the Cambium Authors
// SPDX-License-Identifier: Apache-2.0

//! Animated styles: a base style with an overlay of running animations.

use std::fmt;
use std::sync::Arc;

use tracing::trace;

use crate::style::array::{ArrayValue, IdentValue};
use crate::style::ease::EaseValue;
use crate::style::number::NumberValue;
use crate::style::property::{self, PropertyId, PropertyRegistry};
use crate::style::style::Style;
use crate::style::value::{ComputeContext, Section, StyleProvider, Value};

/// A running animation contributing values to an [`AnimatedStyle`].
///
/// Animations are immutable; advancing returns a (possibly shared) handle
/// evaluated against the style's current timestamp.
pub trait StyleAnimation: std::any::Any + fmt::Debug + Send + Sync {
    /// Whether the animation has finished by `at` (nanoseconds).
    fn is_finished(&self, at: i64) -> bool;

    /// Whether the animation's output can no longer change after `at`.
    fn is_static(&self, at: i64) -> bool;

    /// Re-anchors the animation at a new timestamp.
    fn advance(self: Arc<Self>, timestamp: i64) -> Arc<dyn StyleAnimation>;

    /// Writes the animation's output values into the overlay.
    fn apply_values(&self, style: &mut AnimatedStyle);
}

/// A CSS transition: interpolates one property from a recorded start value
/// toward the base style's value.
pub struct Transition {
    property: PropertyId,
    start: Value,
    ease: Value,
    /// Start of the active interval (delay already folded in), nanoseconds.
    start_time: i64,
    duration_ns: i64,
}

impl Transition {
    /// Creates a transition beginning at `timestamp + delay_ns`.
    pub fn new(
        property: PropertyId,
        start: Value,
        ease: Value,
        timestamp: i64,
        duration_ns: i64,
        delay_ns: i64,
    ) -> Arc<Self> {
        Arc::new(Self {
            property,
            start,
            ease,
            start_time: timestamp + delay_ns,
            duration_ns,
        })
    }

    /// The property this transition drives.
    pub fn property(&self) -> PropertyId {
        self.property
    }

    fn progress(&self, now: i64) -> f64 {
        if self.duration_ns <= 0 {
            return 1.0;
        }
        ((now - self.start_time) as f64 / self.duration_ns as f64).clamp(0.0, 1.0)
    }
}

impl fmt::Debug for Transition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Transition")
            .field("property", &self.property)
            .field("start_time", &self.start_time)
            .field("duration_ns", &self.duration_ns)
            .finish()
    }
}

impl StyleAnimation for Transition {
    fn is_finished(&self, at: i64) -> bool {
        at >= self.start_time + self.duration_ns
    }

    fn is_static(&self, at: i64) -> bool {
        self.is_finished(at)
    }

    fn advance(self: Arc<Self>, _timestamp: i64) -> Arc<dyn StyleAnimation> {
        // A transition's timeline is fixed at creation; the style's
        // timestamp drives evaluation.
        self
    }

    fn apply_values(&self, style: &mut AnimatedStyle) {
        if !style.registry().contains(self.property) {
            // A stale animation for a property the base doesn't know.
            return;
        }
        let progress = self.progress(style.current_time());
        let eased = self
            .ease
            .downcast_ref::<EaseValue>()
            .map(|e| e.transform(progress))
            .unwrap_or(progress);
        let end = style.get_intrinsic_value(self.property);
        let value = match self.start.transition(&end, self.property, eased) {
            Some(value) => value,
            // Non-interpolable pairs snap at the halfway point.
            None if eased < 0.5 => self.start.clone(),
            None => end,
        };
        style.set_animated_value(self.property, value);
    }
}

/// A style wrapping a base style with animated value overlays.
pub struct AnimatedStyle {
    base: Arc<dyn Style>,
    /// Indexed by property id; `None` slots fall through to the base.
    animated: Vec<Option<Value>>,
    current_time: i64,
    /// Least important first; later animations overwrite earlier output.
    animations: Vec<Arc<dyn StyleAnimation>>,
}

impl AnimatedStyle {
    /// Wraps `base` with an empty overlay.
    pub fn with_base(base: Arc<dyn Style>, timestamp: i64) -> Self {
        let n = base.registry().n_properties() as usize;
        Self {
            base,
            animated: vec![None; n],
            current_time: timestamp,
            animations: Vec::new(),
        }
    }

    /// Builds an animated style for a freshly computed `base`, starting
    /// transitions against `previous` and adopting its still-running ones.
    ///
    /// Returns `base` unchanged when nothing animates (or at timestamp 0,
    /// which disables animation entirely).
    pub fn new(
        base: Arc<dyn Style>,
        parent: Option<&dyn Style>,
        timestamp: i64,
        provider: Option<&dyn StyleProvider>,
        previous: Option<&Arc<dyn Style>>,
    ) -> Arc<dyn Style> {
        if timestamp == 0 {
            return base;
        }
        let mut animations = Vec::new();
        if let Some(previous) = previous {
            create_transitions(
                &mut animations,
                &base,
                timestamp,
                provider,
                parent,
                previous,
            );
        }
        if animations.is_empty() {
            return base;
        }
        trace!(
            n_animations = animations.len(),
            "starting animated style"
        );
        let mut style = Self::with_base(base, timestamp);
        style.animations = animations;
        style.apply_animations();
        Arc::new(style)
    }

    /// Advances a previously animated style to `timestamp` over a new base.
    ///
    /// Retires finished animations and rebuilds the overlay from scratch;
    /// returns the bare base when no animation remains.
    pub fn advance(source: &Self, base: Arc<dyn Style>, timestamp: i64) -> Arc<dyn Style> {
        if timestamp == 0 || timestamp == source.current_time {
            return base;
        }
        if timestamp < source.current_time {
            debug_panic!("style advanced backwards in time");
            return base;
        }
        let animations: Vec<Arc<dyn StyleAnimation>> = source
            .animations
            .iter()
            .filter(|a| !a.is_finished(timestamp))
            .map(|a| a.clone().advance(timestamp))
            .collect();
        if animations.is_empty() {
            return base;
        }
        let mut style = Self::with_base(base, timestamp);
        style.animations = animations;
        style.apply_animations();
        Arc::new(style)
    }

    /// Installs an overlay value; subsequent `get_value` calls return it.
    pub fn set_animated_value(&mut self, id: PropertyId, value: Value) {
        if !self.base.registry().contains(id) {
            debug_panic!("unknown property id {id:?}");
            return;
        }
        self.animated[id.0 as usize] = Some(value);
    }

    /// The base value, bypassing the overlay.
    pub fn get_intrinsic_value(&self, id: PropertyId) -> Value {
        self.base.get_value(id)
    }

    /// The timestamp the overlay was evaluated at, in nanoseconds.
    pub fn current_time(&self) -> i64 {
        self.current_time
    }

    /// The running animations, least important first.
    pub fn animations(&self) -> &[Arc<dyn StyleAnimation>] {
        &self.animations
    }

    fn find_transition(&self, property: PropertyId) -> Option<&Arc<dyn StyleAnimation>> {
        self.animations.iter().find(|a| {
            let any: &dyn std::any::Any = a.as_ref();
            any.downcast_ref::<Transition>()
                .is_some_and(|t| t.property() == property)
        })
    }

    fn apply_animations(&mut self) {
        let animations = self.animations.clone();
        for animation in &animations {
            animation.apply_values(self);
        }
    }
}

impl Style for AnimatedStyle {
    fn registry(&self) -> &Arc<PropertyRegistry> {
        self.base.registry()
    }

    fn get_value(&self, id: PropertyId) -> Value {
        if let Some(Some(value)) = self.animated.get(id.0 as usize) {
            return value.clone();
        }
        self.get_intrinsic_value(id)
    }

    fn get_section(&self, id: PropertyId) -> Option<Section> {
        self.base.get_section(id)
    }

    fn is_static(&self) -> bool {
        self.animations
            .iter()
            .all(|a| a.is_static(self.current_time))
    }

    fn as_animated(&self) -> Option<&Self> {
        Some(self)
    }
}

impl fmt::Debug for AnimatedStyle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AnimatedStyle")
            .field("current_time", &self.current_time)
            .field("n_animations", &self.animations.len())
            .finish()
    }
}

const NS_PER_SECOND: f64 = 1_000_000_000.0;

/// Starts transitions for the properties whose old and new values differ,
/// per the new base's `transition-*` settings. Still-running transitions of
/// unchanged properties are adopted from `previous`.
fn create_transitions(
    animations: &mut Vec<Arc<dyn StyleAnimation>>,
    base: &Arc<dyn Style>,
    timestamp: i64,
    provider: Option<&dyn StyleProvider>,
    parent: Option<&dyn Style>,
    previous: &Arc<dyn Style>,
) {
    let registry = base.registry();
    let n = registry.n_properties() as usize;

    // Which array index configures each property, if any.
    let mut info: Vec<Option<usize>> = vec![None; n];
    let transition_property = base.get_value(property::TRANSITION_PROPERTY);
    let Some(names) = transition_property.downcast_ref::<ArrayValue>() else {
        return;
    };
    for (index, name) in names.iter().enumerate() {
        let Some(ident) = name.downcast_ref::<IdentValue>() else {
            continue;
        };
        if ident.name().eq_ignore_ascii_case("all") {
            for id in registry.ids() {
                if registry.is_animated(id) {
                    info[id.0 as usize] = Some(index);
                }
            }
        } else if let Some(id) = registry.lookup(ident.name()) {
            if registry.is_animated(id) {
                info[id.0 as usize] = Some(index);
            }
        }
    }

    let durations = base.get_value(property::TRANSITION_DURATION);
    let delays = base.get_value(property::TRANSITION_DELAY);
    let eases = base.get_value(property::TRANSITION_TIMING_FUNCTION);
    let seconds_at = |array: &Value, i: usize| -> f64 {
        array
            .downcast_ref::<ArrayValue>()
            .and_then(|a| a.get_nth(i))
            .and_then(|v| v.downcast_ref::<NumberValue>().map(|n| n.get(0.0)))
            .unwrap_or(0.0)
    };

    for id in registry.ids() {
        let Some(index) = info[id.0 as usize] else {
            continue;
        };
        let duration = seconds_at(&durations, index);
        let delay = seconds_at(&delays, index);
        if duration + delay == 0.0 {
            continue;
        }

        if let Some(prev_animated) = previous.as_animated() {
            let start = prev_animated.get_intrinsic_value(id);
            let end = base.get_value(id);
            if start.equal(&end) {
                // The underlying value didn't change; keep any transition
                // that's still running toward it.
                if let Some(animation) = prev_animated.find_transition(id) {
                    animations.push(animation.clone().advance(timestamp));
                }
                continue;
            }
        }

        if previous.get_value(id).equal(&base.get_value(id)) {
            continue;
        }

        let ease = eases
            .downcast_ref::<ArrayValue>()
            .and_then(|a| a.get_nth(index))
            .cloned()
            .unwrap_or_else(EaseValue::ease);
        let ctx = ComputeContext {
            provider,
            style: Some(base.as_ref()),
            parent_style: parent,
        };
        let start = previous.get_value(id).compute(id, &ctx);
        animations.push(Transition::new(
            id,
            start,
            ease,
            timestamp,
            (duration * NS_PER_SECOND) as i64,
            (delay * NS_PER_SECOND) as i64,
        ));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::style::style::StaticStyle;
    use property::{FONT_SIZE, OPACITY, TRANSITION_DURATION, TRANSITION_PROPERTY};

    fn style_with(values: &[(PropertyId, Value)]) -> Arc<dyn Style> {
        let mut style = StaticStyle::new(PropertyRegistry::builtin());
        for (id, value) in values {
            style.set_value(*id, value.clone());
        }
        Arc::new(style)
    }

    fn with_transition(values: &[(PropertyId, Value)], duration_s: f64) -> Arc<dyn Style> {
        let mut all = values.to_vec();
        all.push((
            TRANSITION_PROPERTY,
            ArrayValue::new(vec![IdentValue::new("all")]),
        ));
        all.push((
            TRANSITION_DURATION,
            ArrayValue::new(vec![NumberValue::seconds(duration_s)]),
        ));
        style_with(&all)
    }

    #[test]
    fn overlay_shadows_base_but_intrinsic_does_not() {
        let base = style_with(&[(FONT_SIZE, NumberValue::px(10.0))]);
        let mut animated = AnimatedStyle::with_base(base, 1);
        animated.set_animated_value(FONT_SIZE, NumberValue::px(25.0));
        assert!(animated.get_value(FONT_SIZE).equal(&NumberValue::px(25.0)));
        assert!(
            animated
                .get_intrinsic_value(FONT_SIZE)
                .equal(&NumberValue::px(10.0))
        );
    }

    #[test]
    fn new_without_changes_returns_base() {
        let previous = style_with(&[(FONT_SIZE, NumberValue::px(10.0))]);
        let base = with_transition(&[(FONT_SIZE, NumberValue::px(10.0))], 1.0);
        let result = AnimatedStyle::new(base.clone(), None, 1_000, None, Some(&previous));
        assert!(result.as_animated().is_none());
    }

    #[test]
    fn timestamp_zero_disables_animation() {
        let previous = style_with(&[(FONT_SIZE, NumberValue::px(10.0))]);
        let base = with_transition(&[(FONT_SIZE, NumberValue::px(20.0))], 1.0);
        let result = AnimatedStyle::new(base, None, 0, None, Some(&previous));
        assert!(result.as_animated().is_none());
    }

    #[test]
    fn changed_value_starts_a_transition() {
        let previous = style_with(&[(FONT_SIZE, NumberValue::px(10.0))]);
        // Linear 1s transition from 10px to 20px.
        let mut base_style = StaticStyle::new(PropertyRegistry::builtin());
        base_style.set_value(FONT_SIZE, NumberValue::px(20.0));
        base_style.set_value(
            TRANSITION_PROPERTY,
            ArrayValue::new(vec![IdentValue::new("font-size")]),
        );
        base_style.set_value(
            TRANSITION_DURATION,
            ArrayValue::new(vec![NumberValue::seconds(1.0)]),
        );
        base_style.set_value(
            property::TRANSITION_TIMING_FUNCTION,
            ArrayValue::new(vec![EaseValue::linear()]),
        );
        let base: Arc<dyn Style> = Arc::new(base_style);

        let t0 = 1_000;
        let result = AnimatedStyle::new(base.clone(), None, t0, None, Some(&previous));
        let animated = result.as_animated().expect("expected an animated style");
        // At the starting timestamp the overlay holds the old value.
        assert!(animated.get_value(FONT_SIZE).equal(&NumberValue::px(10.0)));
        assert!(!result.is_static());

        // Halfway through.
        let half = AnimatedStyle::advance(animated, base.clone(), t0 + 500_000_000);
        let half_animated = half.as_animated().unwrap();
        assert!(
            half_animated
                .get_value(FONT_SIZE)
                .equal(&NumberValue::px(15.0))
        );

        // Past the end every animation retires and the base comes back.
        let done = AnimatedStyle::advance(half_animated, base.clone(), t0 + 2_000_000_000);
        assert!(done.as_animated().is_none());
        assert!(done.get_value(FONT_SIZE).equal(&NumberValue::px(20.0)));
    }

    #[test]
    fn unchanged_timestamp_returns_base() {
        let previous = style_with(&[(OPACITY, NumberValue::number(0.0))]);
        let base = with_transition(&[(OPACITY, NumberValue::number(1.0))], 1.0);
        let result = AnimatedStyle::new(base.clone(), None, 500, None, Some(&previous));
        let animated = result.as_animated().unwrap();
        let same = AnimatedStyle::advance(animated, base, 500);
        assert!(same.as_animated().is_none());
    }

    #[test]
    fn running_transition_is_adopted_when_base_is_stable() {
        let previous = style_with(&[(OPACITY, NumberValue::number(0.0))]);
        let base = with_transition(&[(OPACITY, NumberValue::number(1.0))], 1.0);
        let t0 = 1_000;
        let first = AnimatedStyle::new(base.clone(), None, t0, None, Some(&previous));
        let first_animated = first.as_animated().unwrap();

        // Recompute against an equal base mid-flight; the transition keeps
        // its original timeline instead of restarting.
        let recomputed = with_transition(&[(OPACITY, NumberValue::number(1.0))], 1.0);
        let second =
            AnimatedStyle::new(recomputed, None, t0 + 500_000_000, None, Some(&first));
        let second_animated = second.as_animated().expect("transition should be adopted");
        let mid = second_animated.get_value(OPACITY);
        let raw = mid.downcast_ref::<NumberValue>().unwrap().raw();
        assert!(raw > 0.0 && raw < 1.0, "expected mid-flight value, got {raw}");
    }
}
