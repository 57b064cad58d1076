// Copyright 2026 the Cambium Authors
// SPDX-License-Identifier: Apache-2.0

//! The core-protocol device implementation.
//!
//! Core devices predate the input extension: one pointer, one keyboard,
//! modifier state delivered as a single mask with buttons folded in.

use std::fmt;
use std::rc::Rc;

use cursor_icon::CursorIcon;
use smallvec::smallvec;

use crate::input::device::{
    AxisVector, Device, DeviceKind, DeviceShared, DeviceType, GrabStatus, QueryState,
    descend_to_pointer_window, toplevel_under_pointer_untrusted,
};
use crate::input::display::{DeviceId, Display, RawDeviceState, Timestamp, WindowId};
use crate::input::event_mask::EventMask;
use crate::input::modifiers::ModifierMask;

/// A core-protocol pointer or keyboard.
pub struct CoreDevice {
    shared: DeviceShared,
}

impl fmt::Debug for CoreDevice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CoreDevice")
            .field("shared", &self.shared)
            .finish()
    }
}

impl CoreDevice {
    /// Creates a core device. `kind` is `Pointer` or `Keyboard`.
    pub fn new(display: Rc<Display>, id: DeviceId, name: impl Into<String>, kind: DeviceKind) -> Self {
        Self {
            shared: DeviceShared::new(display, id, name, kind, DeviceType::Master),
        }
    }
}

/// Builds a modifier mask from core-protocol state.
///
/// The core state field already carries buttons at the button bits; groups
/// are not reported.
pub fn translate_state(raw: &RawDeviceState) -> ModifierMask {
    let mut mask = ModifierMask::from_bits_truncate(raw.mods);
    for button in 0..5_u32 {
        if raw.buttons & (1 << button) != 0 {
            mask |= ModifierMask::from_bits_truncate(ModifierMask::BUTTON1.bits() << button);
        }
    }
    mask
}

impl Device for CoreDevice {
    fn shared(&self) -> &DeviceShared {
        &self.shared
    }

    fn get_state(&self, window: WindowId) -> Option<(AxisVector, ModifierMask)> {
        let query = self
            .shared
            .display()
            .backend()
            .query_device_pointer(self.shared.id(), window)?;
        let scale = self.shared.display().backend().window_scale();
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
        self.shared
            .display()
            .backend()
            .select_window_events(window, mask);
    }
}
