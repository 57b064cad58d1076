// Copyright 2026 the Cambium Authors
// SPDX-License-Identifier: Apache-2.0

//! The XI2 (input extension) device implementation.
//!
//! XI2 devices add per-device event selection, scroll valuators with
//! hardware increments, and group state reported alongside modifiers.

use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

use cursor_icon::CursorIcon;
use smallvec::{SmallVec, smallvec};
use tracing::warn;

use crate::input::device::{
    AxisVector, Device, DeviceKind, DeviceShared, DeviceType, GrabStatus, QueryState,
    descend_to_pointer_window, toplevel_under_pointer_untrusted,
};
use crate::input::display::{DeviceId, Display, RawDeviceState, Timestamp, WindowId};
use crate::input::event_mask::{EventMask, translate_event_mask};
use crate::input::modifiers::ModifierMask;

/// The direction a scroll valuator reports.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ScrollDirection {
    /// Away from the user.
    Up,
    /// Toward the user.
    Down,
    /// Leftward.
    Left,
    /// Rightward.
    Right,
}

#[derive(Clone, Debug)]
struct ScrollValuator {
    n_valuator: u32,
    direction: ScrollDirection,
    increment: f64,
    last_value: f64,
    last_value_valid: bool,
}

/// An input-extension device.
pub struct Xi2Device {
    shared: DeviceShared,
    scroll_valuators: RefCell<SmallVec<[ScrollValuator; 2]>>,
    last_axes: RefCell<Vec<f64>>,
}

impl fmt::Debug for Xi2Device {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Xi2Device")
            .field("shared", &self.shared)
            .field("n_scroll_valuators", &self.scroll_valuators.borrow().len())
            .finish()
    }
}

/// Builds a modifier mask from XI2 state parts: the effective modifiers,
/// the first three buttons, and the effective group shifted to the group
/// bits.
pub fn translate_state(raw: &RawDeviceState) -> ModifierMask {
    let mut mask = ModifierMask::from_bits_truncate(raw.mods);

    // Only the first three buttons participate in the mask.
    for button in 0..3_u32 {
        if raw.buttons & (1 << button) != 0 {
            mask |= ModifierMask::from_bits_truncate(ModifierMask::BUTTON1.bits() << button);
        }
    }

    mask | ModifierMask::for_group(raw.group)
}

impl Xi2Device {
    /// Creates an XI2 device.
    pub fn new(
        display: Rc<Display>,
        id: DeviceId,
        name: impl Into<String>,
        kind: DeviceKind,
        device_type: DeviceType,
    ) -> Self {
        Self {
            shared: DeviceShared::new(display, id, name, kind, device_type),
            scroll_valuators: RefCell::new(SmallVec::new()),
            last_axes: RefCell::new(Vec::new()),
        }
    }

    /// Registers a scroll valuator discovered in the device's class list.
    pub fn add_scroll_valuator(&self, n_valuator: u32, direction: ScrollDirection, increment: f64) {
        if increment == 0.0 {
            warn!(n_valuator, "ignoring scroll valuator with zero increment");
            return;
        }
        if (n_valuator as usize) >= self.shared.n_axes() {
            warn!(n_valuator, "scroll valuator index out of axis range");
            return;
        }
        self.scroll_valuators.borrow_mut().push(ScrollValuator {
            n_valuator,
            direction,
            increment,
            last_value: 0.0,
            last_value_valid: false,
        });
    }

    /// Converts a valuator observation to a scroll delta.
    ///
    /// Returns `None` for valuators that are not scroll valuators. The
    /// first observation after a reset yields a delta of 0 and records the
    /// base value.
    pub fn scroll_delta(&self, n_valuator: u32, value: f64) -> Option<(ScrollDirection, f64)> {
        let mut valuators = self.scroll_valuators.borrow_mut();
        let scroll = valuators
            .iter_mut()
            .find(|s| s.n_valuator == n_valuator)?;

        let delta = if scroll.last_value_valid {
            (value - scroll.last_value) / scroll.increment
        } else {
            scroll.last_value_valid = true;
            0.0
        };
        scroll.last_value = value;
        Some((scroll.direction, delta))
    }

    /// Forgets the last seen values (pointer left our windows); the next
    /// observation per valuator yields a delta of 0.
    pub fn reset_scroll_valuators(&self) {
        for scroll in self.scroll_valuators.borrow_mut().iter_mut() {
            scroll.last_value_valid = false;
        }
    }

    /// Drops all scroll valuators (device reconfiguration).
    pub fn unset_scroll_valuators(&self) {
        self.scroll_valuators.borrow_mut().clear();
    }

    /// Stores the axis vector of the last event from this device.
    pub fn store_axes(&self, axes: &[f64]) {
        *self.last_axes.borrow_mut() = axes.to_vec();
    }

    /// The last stored value of axis `n`, or 0 when unknown.
    pub fn last_axis_value(&self, n: usize) -> f64 {
        if n >= self.shared.n_axes() {
            return 0.0;
        }
        self.last_axes.borrow().get(n).copied().unwrap_or(0.0)
    }
}

impl Device for Xi2Device {
    fn shared(&self) -> &DeviceShared {
        &self.shared
    }

    fn get_state(&self, window: WindowId) -> Option<(AxisVector, ModifierMask)> {
        let backend = self.shared.display().backend();
        let query = backend.query_device_pointer(self.shared.id(), window)?;
        let scale = backend.window_scale();
        let axes: AxisVector = smallvec![query.win_x / scale, query.win_y / scale];
        Some((axes, translate_state(&query.raw)))
    }

    fn set_window_cursor(&self, window: WindowId, cursor: Option<CursorIcon>) {
        self.shared
            .display()
            .backend()
            .set_window_cursor(self.shared.id(), window, cursor);
    }

    fn warp(&self, position: dpi::LogicalPosition<f64>) {
        self.shared.warp_with_backend(position);
    }

    fn query_state(&self, window: WindowId) -> Option<QueryState> {
        let backend = self.shared.display().backend();
        let query = backend.query_device_pointer(self.shared.id(), window)?;
        let scale = backend.window_scale();
        Some(QueryState {
            root: query.root,
            child: query.child,
            root_pos: (query.root_x / scale, query.root_y / scale),
            win_pos: (query.win_x / scale, query.win_y / scale),
            mask: translate_state(&query.raw),
        })
    }

    fn grab(
        &self,
        window: WindowId,
        owner_events: bool,
        event_mask: EventMask,
        confine_to: Option<WindowId>,
        cursor: Option<CursorIcon>,
        time: Timestamp,
    ) -> GrabStatus {
        self.shared
            .grab_with_backend(window, owner_events, event_mask, confine_to, cursor, time)
    }

    fn ungrab(&self, time: Timestamp) {
        self.shared.ungrab_with_backend(time);
    }

    fn window_at_position(
        &self,
        get_toplevel: bool,
    ) -> (Option<WindowId>, f64, f64, ModifierMask) {
        let display = self.shared.display();
        let backend = display.backend();
        let device = self.shared.id();

        let trap = display.error_trap();
        // The descent is only accurate while the pointer holds still.
        display.grab();

        let start = if backend.is_trusted_client() {
            backend
                .query_device_pointer(device, backend.root_window())
                .map(|q| q.child.unwrap_or(q.root))
        } else {
            toplevel_under_pointer_untrusted(display, device)
        };

        let (window, win_x, win_y, raw) = match start {
            Some(start) => descend_to_pointer_window(display, device, start, get_toplevel),
            None => (None, -1.0, -1.0, RawDeviceState::default()),
        };

        display.ungrab();

        if trap.pop() != 0 {
            return (None, -1.0, -1.0, ModifierMask::empty());
        }

        let scale = backend.window_scale();
        (
            window,
            win_x / scale,
            win_y / scale,
            translate_state(&raw),
        )
    }

    fn select_window_events(&self, window: WindowId, mask: EventMask) {
        let backend = self.shared.display().backend();
        let bits = translate_event_mask(mask, backend.xi_minor_version());
        backend.select_device_events(self.shared.id(), window, &bits);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn translate_state_folds_group_and_buttons() {
        let raw = RawDeviceState {
            mods: ModifierMask::CONTROL.bits(),
            buttons: 0b101, // buttons 1 and 3
            group: 2,
        };
        let mask = translate_state(&raw);
        assert!(mask.contains(ModifierMask::CONTROL));
        assert!(mask.contains(ModifierMask::BUTTON1));
        assert!(!mask.contains(ModifierMask::BUTTON2));
        assert!(mask.contains(ModifierMask::BUTTON3));
        assert_eq!(
            mask & (ModifierMask::GROUP_BIT_0 | ModifierMask::GROUP_BIT_1),
            ModifierMask::for_group(2)
        );
    }

    #[test]
    fn buttons_past_three_are_ignored() {
        let raw = RawDeviceState {
            mods: 0,
            buttons: 0b11000, // buttons 4 and 5
            group: 0,
        };
        assert_eq!(translate_state(&raw), ModifierMask::empty());
    }
}
