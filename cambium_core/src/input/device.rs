// Copyright 2026 the Cambium Authors
// SPDX-License-Identifier: Apache-2.0

//! The polymorphic input-device contract.

use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

use cursor_icon::CursorIcon;
use dpi::LogicalPosition;
use smallvec::SmallVec;
use tracing::trace;

use crate::input::display::{DeviceId, Display, Timestamp, WindowId};
use crate::input::event_mask::EventMask;
use crate::input::grab::DeviceGrab;
use crate::input::modifiers::ModifierMask;

/// What kind of hardware a device is.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DeviceKind {
    /// A relative pointing device.
    Pointer,
    /// A keyboard.
    Keyboard,
    /// A direct-touch screen.
    Touchscreen,
    /// A tablet stylus.
    Pen,
    /// A tablet pad (buttons/rings/strips).
    Pad,
}

/// A device's role in the master/slave hierarchy.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DeviceType {
    /// A virtual device events are routed through.
    Master,
    /// A physical device attached to a master.
    Slave,
    /// A physical device not attached to any master.
    Floating,
}

/// What an axis measures.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AxisUse {
    /// Unused axis.
    Ignore,
    /// Horizontal position.
    X,
    /// Vertical position.
    Y,
    /// Stylus pressure.
    Pressure,
    /// Stylus x tilt.
    XTilt,
    /// Stylus y tilt.
    YTilt,
    /// Wheel rotation.
    Wheel,
    /// Hover distance.
    Distance,
    /// Barrel rotation.
    Rotation,
    /// Slider position.
    Slider,
}

/// One axis of a device.
#[derive(Clone, Debug)]
pub struct AxisInfo {
    /// What the axis measures.
    pub use_: AxisUse,
    /// Smallest raw value the hardware reports.
    pub min_value: f64,
    /// Largest raw value the hardware reports.
    pub max_value: f64,
    /// Lower bound of the translated range.
    pub min_axis: f64,
    /// Upper bound of the translated range.
    pub max_axis: f64,
    /// Hardware resolution.
    pub resolution: f64,
}

impl AxisInfo {
    /// Maps a raw valuator value into the axis range.
    ///
    /// Positional axes pass through; everything else normalizes the
    /// hardware range onto `[min_axis, max_axis]`.
    pub fn translate(&self, value: f64) -> f64 {
        match self.use_ {
            AxisUse::X | AxisUse::Y | AxisUse::Ignore => value,
            _ => {
                let width = self.max_value - self.min_value;
                if width == 0.0 {
                    return self.min_axis;
                }
                (self.max_axis - self.min_axis) * (value - self.min_value) / width
                    + self.min_axis
            }
        }
    }
}

/// The outcome of a grab request.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum GrabStatus {
    /// The grab is in effect.
    Success,
    /// Another client holds a conflicting grab.
    AlreadyGrabbed,
    /// The request's timestamp is older than the current grab time.
    InvalidTime,
    /// The grab window is not viewable.
    NotViewable,
    /// The device is frozen by another grab.
    Frozen,
}

impl GrabStatus {
    /// Maps a raw X-style status code.
    pub fn from_raw(status: i32) -> Self {
        match status {
            0 => Self::Success,
            1 => Self::AlreadyGrabbed,
            2 => Self::InvalidTime,
            3 => Self::NotViewable,
            _ => Self::Frozen,
        }
    }

    /// Whether the grab took effect.
    pub fn is_success(self) -> bool {
        self == Self::Success
    }
}

/// A pointer query answer in CSS pixels.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct QueryState {
    /// The screen's root window.
    pub root: WindowId,
    /// The child containing the pointer, if any.
    pub child: Option<WindowId>,
    /// Position relative to the root.
    pub root_pos: (f64, f64),
    /// Position relative to the queried window.
    pub win_pos: (f64, f64),
    /// Modifier and button state.
    pub mask: ModifierMask,
}

/// Axis values reported by [`Device::get_state`].
pub type AxisVector = SmallVec<[f64; 4]>;

/// The uniform contract every input device implements.
///
/// Core-protocol and XI2 devices expose the same capability set; callers
/// never need to know which backend path serves them.
pub trait Device: fmt::Debug {
    /// The device's bookkeeping record.
    fn shared(&self) -> &DeviceShared;

    /// Current axis values and modifier state relative to `window`.
    fn get_state(&self, window: WindowId) -> Option<(AxisVector, ModifierMask)>;

    /// Assigns the cursor shown while the pointer is over `window`.
    fn set_window_cursor(&self, window: WindowId, cursor: Option<CursorIcon>);

    /// Warps the pointer to a screen position in CSS pixels.
    fn warp(&self, position: LogicalPosition<f64>);

    /// Queries pointer position and state relative to `window`.
    fn query_state(&self, window: WindowId) -> Option<QueryState>;

    /// Grabs the device.
    fn grab(
        &self,
        window: WindowId,
        owner_events: bool,
        event_mask: EventMask,
        confine_to: Option<WindowId>,
        cursor: Option<CursorIcon>,
        time: Timestamp,
    ) -> GrabStatus;

    /// Releases a grab taken with [`grab`](Self::grab).
    fn ungrab(&self, time: Timestamp);

    /// Finds the window under the pointer.
    ///
    /// Returns the window (a toplevel when `get_toplevel` is set), the
    /// window-relative position in CSS pixels, and the modifier state.
    fn window_at_position(&self, get_toplevel: bool)
    -> (Option<WindowId>, f64, f64, ModifierMask);

    /// Selects which events `window` receives from this device.
    fn select_window_events(&self, window: WindowId, mask: EventMask);
}

/// State common to every device implementation.
pub struct DeviceShared {
    name: String,
    kind: DeviceKind,
    device_type: DeviceType,
    display: Rc<Display>,
    id: DeviceId,
    axes: RefCell<Vec<AxisInfo>>,
}

impl fmt::Debug for DeviceShared {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DeviceShared")
            .field("name", &self.name)
            .field("id", &self.id)
            .field("kind", &self.kind)
            .field("device_type", &self.device_type)
            .finish()
    }
}

impl DeviceShared {
    /// Creates the record for a device.
    pub fn new(
        display: Rc<Display>,
        id: DeviceId,
        name: impl Into<String>,
        kind: DeviceKind,
        device_type: DeviceType,
    ) -> Self {
        Self {
            name: name.into(),
            kind,
            device_type,
            display,
            id,
            axes: RefCell::new(Vec::new()),
        }
    }

    /// The device's human-readable name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The device's id on its display.
    pub fn id(&self) -> DeviceId {
        self.id
    }

    /// What kind of hardware this is.
    pub fn kind(&self) -> DeviceKind {
        self.kind
    }

    /// Master, slave, or floating.
    pub fn device_type(&self) -> DeviceType {
        self.device_type
    }

    /// The owning display.
    pub fn display(&self) -> &Rc<Display> {
        &self.display
    }

    /// Appends an axis; returns its index.
    pub fn add_axis(&self, axis: AxisInfo) -> usize {
        let mut axes = self.axes.borrow_mut();
        axes.push(axis);
        axes.len() - 1
    }

    /// Drops all axes (device reconfiguration).
    pub fn clear_axes(&self) {
        self.axes.borrow_mut().clear();
    }

    /// Number of axes.
    pub fn n_axes(&self) -> usize {
        self.axes.borrow().len()
    }

    /// A copy of the axis table.
    pub fn axes(&self) -> Vec<AxisInfo> {
        self.axes.borrow().clone()
    }

    /// The axis at `index`, if any.
    pub fn axis(&self, index: usize) -> Option<AxisInfo> {
        self.axes.borrow().get(index).cloned()
    }

    /// The translated value of the first axis with `use_`, if present in
    /// `values`.
    pub fn get_axis(&self, values: &[f64], use_: AxisUse) -> Option<f64> {
        let axes = self.axes.borrow();
        axes.iter()
            .zip(values)
            .find(|(axis, _)| axis.use_ == use_)
            .map(|(axis, value)| axis.translate(*value))
    }

    /// Issues a grab through the display, recording serials and the grab
    /// table entry on success.
    pub(crate) fn grab_with_backend(
        &self,
        window: WindowId,
        owner_events: bool,
        event_mask: EventMask,
        confine_to: Option<WindowId>,
        cursor: Option<CursorIcon>,
        time: Timestamp,
    ) -> GrabStatus {
        let display = &self.display;
        let backend = display.backend();
        let serial_start = backend.next_request_serial();

        let status = if display.grabs_disabled() {
            GrabStatus::Success
        } else {
            let bits = crate::input::event_mask::translate_event_mask(
                event_mask,
                backend.xi_minor_version(),
            );
            GrabStatus::from_raw(backend.grab_device(
                self.id,
                window,
                owner_events,
                &bits,
                confine_to,
                cursor,
                time,
            ))
        };

        trace!(device = ?self.id, ?window, ?status, serial_start, "device grab");
        display.update_grab_info(
            self.id,
            status,
            status.is_success().then(|| DeviceGrab {
                window,
                owner_events,
                event_mask,
                confine_to,
                cursor,
                time,
                serial_start,
                serial_end: None,
                implicit_ungrab: false,
            }),
        );
        status
    }

    /// Issues an ungrab through the display, recording the ending serial.
    pub(crate) fn ungrab_with_backend(&self, time: Timestamp) {
        let display = &self.display;
        let backend = display.backend();
        let serial = backend.next_request_serial();
        if !display.grabs_disabled() {
            backend.ungrab_device(self.id, time);
        }
        display.update_grab_info_ungrab(self.id, time, serial);
    }

    /// Warps the pointer, scaling CSS pixels to device pixels.
    pub(crate) fn warp_with_backend(&self, position: LogicalPosition<f64>) {
        let backend = self.display.backend();
        let physical = position.to_physical::<f64>(backend.window_scale());
        backend.warp_pointer(self.id, physical.x, physical.y);
    }
}

/// Descends from `start` to the deepest window containing the pointer.
///
/// When `get_toplevel` is set, stops at the first window known to this
/// client below the root.
pub(crate) fn descend_to_pointer_window(
    display: &Rc<Display>,
    device: DeviceId,
    start: WindowId,
    get_toplevel: bool,
) -> (Option<WindowId>, f64, f64, crate::input::display::RawDeviceState) {
    let backend = display.backend();
    let mut window = Some(start);
    let mut last = None;
    let mut win_x = -1.0;
    let mut win_y = -1.0;
    let mut raw = crate::input::display::RawDeviceState::default();

    while let Some(w) = window {
        last = Some(w);
        let Some(query) = backend.query_device_pointer(device, w) else {
            break;
        };
        win_x = query.win_x;
        win_y = query.win_y;
        raw = query.raw;

        if get_toplevel
            && w != query.root
            && backend.window_geometry(w).is_some()
        {
            break;
        }
        window = query.child;
    }

    (last, win_x, win_y, raw)
}

/// Finds the toplevel under the pointer without querying at the root.
///
/// Untrusted clients may not query the root window, so each registered
/// toplevel is probed: if a direct query reports a child, that toplevel is
/// it; otherwise a 1×1 input-only window is mapped at the reported
/// coordinates and the query retried. If the probe comes back as the child,
/// the pointer is over that toplevel.
///
/// The search abandons on the first hit. Like the original backend code,
/// this path is not safe against concurrent multi-device use: it assumes
/// the pointer holds still while the probes run.
pub(crate) fn toplevel_under_pointer_untrusted(
    display: &Rc<Display>,
    device: DeviceId,
) -> Option<WindowId> {
    let backend = display.backend();
    for toplevel in backend.toplevel_windows() {
        let Some(query) = backend.query_device_pointer(device, toplevel) else {
            continue;
        };
        if query.child.is_some() {
            return Some(toplevel);
        }
        let Some(geometry) = backend.window_geometry(toplevel) else {
            continue;
        };
        if geometry.contains(query.win_x, query.win_y) {
            // A childless toplevel, or below another window? A probe child
            // at the pointer tells the two apart.
            let probe =
                backend.create_input_probe(toplevel, query.win_x as i32, query.win_y as i32);
            let requery = backend.query_device_pointer(device, toplevel);
            backend.destroy_window(probe);
            if requery.and_then(|q| q.child) == Some(probe) {
                return Some(toplevel);
            }
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn axis_translation_normalizes_range() {
        let axis = AxisInfo {
            use_: AxisUse::Pressure,
            min_value: 0.0,
            max_value: 2048.0,
            min_axis: 0.0,
            max_axis: 1.0,
            resolution: 1.0,
        };
        assert_eq!(axis.translate(0.0), 0.0);
        assert_eq!(axis.translate(1024.0), 0.5);
        assert_eq!(axis.translate(2048.0), 1.0);
    }

    #[test]
    fn positional_axes_pass_through() {
        let axis = AxisInfo {
            use_: AxisUse::X,
            min_value: 0.0,
            max_value: 1000.0,
            min_axis: 0.0,
            max_axis: 1.0,
            resolution: 1.0,
        };
        assert_eq!(axis.translate(123.0), 123.0);
    }

    #[test]
    fn grab_status_mapping_is_total() {
        assert_eq!(GrabStatus::from_raw(0), GrabStatus::Success);
        assert_eq!(GrabStatus::from_raw(1), GrabStatus::AlreadyGrabbed);
        assert_eq!(GrabStatus::from_raw(2), GrabStatus::InvalidTime);
        assert_eq!(GrabStatus::from_raw(3), GrabStatus::NotViewable);
        assert_eq!(GrabStatus::from_raw(4), GrabStatus::Frozen);
        assert_eq!(GrabStatus::from_raw(99), GrabStatus::Frozen);
    }
}
