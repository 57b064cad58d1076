// Copyright 2026 the Cambium Authors
// SPDX-License-Identifier: Apache-2.0

//! Per-device grab bookkeeping.
//!
//! Grab requests return synchronously but take effect at the next server
//! flush, so each grab records the request serial it was issued at; cleanup
//! on unmap/destroy closes the right interval even when requests raced.

use cursor_icon::CursorIcon;
use hashbrown::HashMap;

use crate::input::display::{DeviceId, Timestamp, WindowId};
use crate::input::event_mask::EventMask;

/// One grab's bookkeeping entry.
#[derive(Clone, Debug)]
pub struct DeviceGrab {
    /// The grab window.
    pub window: WindowId,
    /// Whether events within the application report their real window.
    pub owner_events: bool,
    /// Events delivered while the grab is active.
    pub event_mask: EventMask,
    /// Pointer confinement window, if any.
    pub confine_to: Option<WindowId>,
    /// Grab cursor, if any.
    pub cursor: Option<CursorIcon>,
    /// The grab time handed to the server.
    pub time: Timestamp,
    /// Serial of the grab request.
    pub serial_start: u64,
    /// Serial at which the grab ended; `None` while active.
    pub serial_end: Option<u64>,
    /// Set when the grab was closed by an unmap or destroy rather than an
    /// explicit ungrab.
    pub implicit_ungrab: bool,
}

impl DeviceGrab {
    /// Whether the grab covers `serial`.
    pub fn covers(&self, serial: u64) -> bool {
        serial >= self.serial_start && self.serial_end.is_none_or(|end| serial < end)
    }

    /// Whether the grab is still open.
    pub fn is_active(&self) -> bool {
        self.serial_end.is_none()
    }
}

/// Tracks grabs per device for one display.
#[derive(Debug, Default)]
pub struct GrabTracker {
    grabs: HashMap<DeviceId, Vec<DeviceGrab>>,
}

impl GrabTracker {
    /// An empty tracker.
    pub fn new() -> Self {
        Self::default()
    }

    /// Records a new grab, ordered by start serial.
    ///
    /// Any previously active grab on the device is closed at the new grab's
    /// start serial: at most one grab per device is active.
    pub fn add_grab(&mut self, device: DeviceId, mut grab: DeviceGrab) {
        let grabs = self.grabs.entry(device).or_default();

        let insert_at = grabs
            .iter()
            .position(|other| grab.serial_start < other.serial_start)
            .unwrap_or(grabs.len());

        // Close the new grab before any later one, and the previous one at
        // this grab's start.
        if let Some(next) = grabs.get(insert_at) {
            grab.serial_end = Some(next.serial_start);
        }
        if insert_at > 0
            && let Some(previous) = grabs.get_mut(insert_at - 1)
            && previous.serial_end.is_none()
        {
            previous.serial_end = Some(grab.serial_start);
        }

        grabs.insert(insert_at, grab);
    }

    /// Closes the active grab at `serial` after an explicit ungrab.
    ///
    /// A no-op when no grab is active (including grabs already closed
    /// implicitly).
    pub fn end_grab(&mut self, device: DeviceId, serial: u64) {
        if let Some(grabs) = self.grabs.get_mut(&device)
            && let Some(grab) = grabs.iter_mut().rev().find(|g| g.is_active())
        {
            grab.serial_end = Some(serial);
        }
    }

    /// Implicitly closes active grabs whose window satisfies `affected`.
    ///
    /// The serial interval collapses (`serial_end = serial_start`) so later
    /// events never match the dead grab.
    pub fn implicit_ungrab(&mut self, affected: impl Fn(WindowId) -> bool) {
        for grabs in self.grabs.values_mut() {
            for grab in grabs.iter_mut() {
                if grab.is_active() && affected(grab.window) {
                    grab.serial_end = Some(grab.serial_start);
                    grab.implicit_ungrab = true;
                }
            }
        }
    }

    /// The active grab for `device`, if any.
    pub fn active_grab(&self, device: DeviceId) -> Option<&DeviceGrab> {
        self.grabs
            .get(&device)?
            .iter()
            .rev()
            .find(|g| g.is_active())
    }

    /// The grab covering `serial` for `device`, if any.
    pub fn grab_covering(&self, device: DeviceId, serial: u64) -> Option<&DeviceGrab> {
        self.grabs
            .get(&device)?
            .iter()
            .rev()
            .find(|g| g.covers(serial))
    }

    /// The most recent grab entry (active or not); for diagnostics.
    pub fn last_grab(&self, device: DeviceId) -> Option<&DeviceGrab> {
        self.grabs.get(&device)?.last()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn grab(window: u64, serial: u64) -> DeviceGrab {
        DeviceGrab {
            window: WindowId(window),
            owner_events: false,
            event_mask: EventMask::BUTTON_PRESS,
            confine_to: None,
            cursor: None,
            time: 0,
            serial_start: serial,
            serial_end: None,
            implicit_ungrab: false,
        }
    }

    const DEVICE: DeviceId = DeviceId(1);

    #[test]
    fn one_active_grab_per_device() {
        let mut tracker = GrabTracker::new();
        tracker.add_grab(DEVICE, grab(1, 10));
        tracker.add_grab(DEVICE, grab(2, 20));

        let active = tracker.active_grab(DEVICE).unwrap();
        assert_eq!(active.window, WindowId(2));
        // The first grab was closed at the second one's start.
        assert_eq!(tracker.grab_covering(DEVICE, 15).unwrap().window, WindowId(1));
        assert_eq!(tracker.grab_covering(DEVICE, 25).unwrap().window, WindowId(2));
    }

    #[test]
    fn explicit_ungrab_ends_the_active_grab() {
        let mut tracker = GrabTracker::new();
        tracker.add_grab(DEVICE, grab(1, 10));
        tracker.end_grab(DEVICE, 30);
        assert!(tracker.active_grab(DEVICE).is_none());
        assert!(tracker.grab_covering(DEVICE, 30).is_none());
        assert!(tracker.grab_covering(DEVICE, 29).is_some());
    }

    #[test]
    fn implicit_ungrab_collapses_the_interval() {
        let mut tracker = GrabTracker::new();
        tracker.add_grab(DEVICE, grab(7, 10));
        tracker.implicit_ungrab(|w| w == WindowId(7));

        let dead = tracker.last_grab(DEVICE).unwrap();
        assert_eq!(dead.serial_end, Some(dead.serial_start));
        assert!(dead.implicit_ungrab);

        // A later explicit ungrab is a no-op.
        tracker.end_grab(DEVICE, 40);
        let still = tracker.last_grab(DEVICE).unwrap();
        assert_eq!(still.serial_end, Some(10));
    }
}
