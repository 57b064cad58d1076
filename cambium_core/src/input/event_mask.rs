// Copyright 2026 the Cambium Authors
// SPDX-License-Identifier: Apache-2.0

//! Event-mask selection and its XInput translation.

use bitflags::bitflags;

bitflags! {
    /// Which events a window (or grab) wants delivered.
    #[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
    pub struct EventMask: u32 {
        /// All pointer motion.
        const POINTER_MOTION = 1 << 2;
        /// Pointer motion hints (compressed motion).
        const POINTER_MOTION_HINT = 1 << 3;
        /// Motion while any button is held.
        const BUTTON_MOTION = 1 << 4;
        /// Motion while button 1 is held.
        const BUTTON1_MOTION = 1 << 5;
        /// Motion while button 2 is held.
        const BUTTON2_MOTION = 1 << 6;
        /// Motion while button 3 is held.
        const BUTTON3_MOTION = 1 << 7;
        /// Button presses.
        const BUTTON_PRESS = 1 << 8;
        /// Button releases.
        const BUTTON_RELEASE = 1 << 9;
        /// Key presses.
        const KEY_PRESS = 1 << 10;
        /// Key releases.
        const KEY_RELEASE = 1 << 11;
        /// Pointer entering the window.
        const ENTER_NOTIFY = 1 << 12;
        /// Pointer leaving the window.
        const LEAVE_NOTIFY = 1 << 13;
        /// Keyboard focus changes.
        const FOCUS_CHANGE = 1 << 14;
        /// Discrete scroll events.
        const SCROLL = 1 << 21;
        /// Touch sequences.
        const TOUCH = 1 << 22;
        /// Smooth (valuator-driven) scroll events.
        const SMOOTH_SCROLL = 1 << 23;
    }
}

/// XInput event type codes, used as bit indexes in an [`XiEventMask`].
pub mod xi_event {
    /// `XI_KeyPress`.
    pub const KEY_PRESS: u32 = 2;
    /// `XI_KeyRelease`.
    pub const KEY_RELEASE: u32 = 3;
    /// `XI_ButtonPress`.
    pub const BUTTON_PRESS: u32 = 4;
    /// `XI_ButtonRelease`.
    pub const BUTTON_RELEASE: u32 = 5;
    /// `XI_Motion`.
    pub const MOTION: u32 = 6;
    /// `XI_Enter`.
    pub const ENTER: u32 = 7;
    /// `XI_Leave`.
    pub const LEAVE: u32 = 8;
    /// `XI_FocusIn`.
    pub const FOCUS_IN: u32 = 9;
    /// `XI_FocusOut`.
    pub const FOCUS_OUT: u32 = 10;
    /// `XI_TouchBegin`.
    pub const TOUCH_BEGIN: u32 = 18;
    /// `XI_TouchUpdate`.
    pub const TOUCH_UPDATE: u32 = 19;
    /// `XI_TouchEnd`.
    pub const TOUCH_END: u32 = 20;
}

/// A set of XInput event types, one bit per event code.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct XiEventMask(u32);

impl XiEventMask {
    /// The empty set.
    pub fn new() -> Self {
        Self(0)
    }

    /// Adds an event code.
    pub fn set(&mut self, event: u32) {
        self.0 |= 1 << event;
    }

    /// Whether `event` is selected.
    pub fn contains(self, event: u32) -> bool {
        self.0 & (1 << event) != 0
    }

    /// Whether nothing is selected.
    pub fn is_empty(self) -> bool {
        self.0 == 0
    }
}

/// Builds the XInput event bits corresponding to `mask`.
///
/// Touch selection requires XInput minor version 2.
pub fn translate_event_mask(mask: EventMask, xi_minor: u32) -> XiEventMask {
    use xi_event::*;
    let mut bits = XiEventMask::new();

    if mask.intersects(EventMask::POINTER_MOTION | EventMask::POINTER_MOTION_HINT) {
        bits.set(MOTION);
    }

    if mask.intersects(
        EventMask::BUTTON_MOTION
            | EventMask::BUTTON1_MOTION
            | EventMask::BUTTON2_MOTION
            | EventMask::BUTTON3_MOTION,
    ) {
        bits.set(BUTTON_PRESS);
        bits.set(BUTTON_RELEASE);
        bits.set(MOTION);
    }

    if mask.intersects(EventMask::SCROLL | EventMask::SMOOTH_SCROLL) {
        bits.set(BUTTON_PRESS);
        bits.set(BUTTON_RELEASE);
    }

    if mask.contains(EventMask::BUTTON_PRESS) {
        bits.set(BUTTON_PRESS);
    }
    if mask.contains(EventMask::BUTTON_RELEASE) {
        bits.set(BUTTON_RELEASE);
    }
    if mask.contains(EventMask::KEY_PRESS) {
        bits.set(KEY_PRESS);
    }
    if mask.contains(EventMask::KEY_RELEASE) {
        bits.set(KEY_RELEASE);
    }
    if mask.contains(EventMask::ENTER_NOTIFY) {
        bits.set(ENTER);
    }
    if mask.contains(EventMask::LEAVE_NOTIFY) {
        bits.set(LEAVE);
    }
    if mask.contains(EventMask::FOCUS_CHANGE) {
        bits.set(FOCUS_IN);
        bits.set(FOCUS_OUT);
    }

    // Multitouch arrived in XInput 2.2.
    if xi_minor >= 2 && mask.contains(EventMask::TOUCH) {
        bits.set(TOUCH_BEGIN);
        bits.set(TOUCH_UPDATE);
        bits.set(TOUCH_END);
    }

    bits
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scroll_selects_buttons() {
        let bits = translate_event_mask(EventMask::SCROLL, 2);
        assert!(bits.contains(xi_event::BUTTON_PRESS));
        assert!(bits.contains(xi_event::BUTTON_RELEASE));
        assert!(!bits.contains(xi_event::MOTION));
    }

    #[test]
    fn touch_requires_minor_2() {
        assert!(translate_event_mask(EventMask::TOUCH, 1).is_empty());
        let bits = translate_event_mask(EventMask::TOUCH, 2);
        assert!(bits.contains(xi_event::TOUCH_BEGIN));
        assert!(bits.contains(xi_event::TOUCH_END));
    }

    #[test]
    fn focus_selects_both_directions() {
        let bits = translate_event_mask(EventMask::FOCUS_CHANGE, 2);
        assert!(bits.contains(xi_event::FOCUS_IN));
        assert!(bits.contains(xi_event::FOCUS_OUT));
    }
}
