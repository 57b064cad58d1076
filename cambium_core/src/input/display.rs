// Copyright 2026 the Cambium Authors
// SPDX-License-Identifier: Apache-2.0

//! The display handle and the server interface it consumes.

use std::cell::{Cell, RefCell};
use std::fmt;
use std::rc::Rc;
use std::sync::Arc;

use cursor_icon::CursorIcon;
use tracing::{debug, warn};

use crate::input::device::GrabStatus;
use crate::input::event_mask::{EventMask, XiEventMask};
use crate::input::grab::{DeviceGrab, GrabTracker};
use crate::input::keymap::Keymap;

/// Identifies a server-side window.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct WindowId(pub u64);

impl fmt::Debug for WindowId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "WindowId({})", self.0)
    }
}

/// Identifies an input device on its display.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct DeviceId(pub u32);

impl fmt::Debug for DeviceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "DeviceId({})", self.0)
    }
}

/// A server timestamp, in milliseconds.
pub type Timestamp = u32;

/// A window's position and size, in device pixels, relative to its parent.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct WindowGeometry {
    /// X offset.
    pub x: i32,
    /// Y offset.
    pub y: i32,
    /// Width.
    pub width: i32,
    /// Height.
    pub height: i32,
}

impl WindowGeometry {
    /// Whether the window-relative point is inside.
    pub fn contains(&self, x: f64, y: f64) -> bool {
        x >= 0.0 && y >= 0.0 && x < self.width as f64 && y < self.height as f64
    }
}

/// Raw device state as the server reports it.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct RawDeviceState {
    /// Effective modifier bits, in the X modifier layout.
    pub mods: u32,
    /// Pressed buttons as a bitmask; bit `n` is button `n + 1`.
    pub buttons: u32,
    /// Effective keyboard group.
    pub group: i32,
}

/// A pointer query answer, relative to the queried window.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PointerQuery {
    /// The root window of the queried screen.
    pub root: WindowId,
    /// The child of the queried window containing the pointer, if any.
    pub child: Option<WindowId>,
    /// Pointer x relative to the root, device pixels.
    pub root_x: f64,
    /// Pointer y relative to the root, device pixels.
    pub root_y: f64,
    /// Pointer x relative to the queried window, device pixels.
    pub win_x: f64,
    /// Pointer y relative to the queried window, device pixels.
    pub win_y: f64,
    /// Modifier, button, and group state.
    pub raw: RawDeviceState,
}

/// The wire-protocol surface the input core drives.
///
/// The display backend (X11, Wayland, Quartz) implements this; every method
/// corresponds to one or a few requests. Raw grab status codes use the X
/// encoding and are mapped through [`GrabStatus::from_raw`].
pub trait ServerBackend {
    /// The serial the next request will be assigned.
    fn next_request_serial(&self) -> u64;

    /// Whether this client may query the pointer at the root window.
    fn is_trusted_client(&self) -> bool;

    /// The HiDPI scale between CSS pixels and device pixels.
    fn window_scale(&self) -> f64 {
        1.0
    }

    /// The XInput minor version, for event-mask capabilities.
    fn xi_minor_version(&self) -> u32 {
        2
    }

    /// Grabs the server (exclusive request processing).
    fn grab_server(&self);

    /// Releases a server grab.
    fn ungrab_server(&self);

    /// Starts trapping protocol errors.
    fn push_error_trap(&self);

    /// Stops trapping; returns the first trapped error code, 0 for none.
    fn pop_error_trap(&self) -> i32;

    /// The root window of the default screen.
    fn root_window(&self) -> WindowId;

    /// The currently registered toplevel windows.
    fn toplevel_windows(&self) -> Vec<WindowId>;

    /// The geometry of a window known to this client.
    fn window_geometry(&self, window: WindowId) -> Option<WindowGeometry>;

    /// The parent of `window`, `None` for roots and unknown windows.
    fn window_parent(&self, window: WindowId) -> Option<WindowId>;

    /// Queries the pointer of `device` relative to `window`.
    fn query_device_pointer(&self, device: DeviceId, window: WindowId) -> Option<PointerQuery>;

    /// Issues a device grab; returns a raw status code.
    fn grab_device(
        &self,
        device: DeviceId,
        window: WindowId,
        owner_events: bool,
        events: &XiEventMask,
        confine_to: Option<WindowId>,
        cursor: Option<CursorIcon>,
        time: Timestamp,
    ) -> i32;

    /// Releases a device grab.
    fn ungrab_device(&self, device: DeviceId, time: Timestamp);

    /// Warps the pointer to root coordinates, in device pixels.
    fn warp_pointer(&self, device: DeviceId, root_x: f64, root_y: f64);

    /// Sets the per-device cursor of a window.
    fn set_window_cursor(&self, device: DeviceId, window: WindowId, cursor: Option<CursorIcon>);

    /// Selects XInput events on a window for one device.
    fn select_device_events(&self, device: DeviceId, window: WindowId, events: &XiEventMask);

    /// Selects core-protocol events on a window.
    fn select_window_events(&self, window: WindowId, events: EventMask);

    /// Creates and maps a 1×1 input-only child of `parent` at `(x, y)`.
    fn create_input_probe(&self, parent: WindowId, x: i32, y: i32) -> WindowId;

    /// Destroys a window created by this client.
    fn destroy_window(&self, window: WindowId);
}

/// A display connection as seen by the input core.
///
/// Owns the grab table and the reentrant server-grab counter; everything
/// else delegates to the [`ServerBackend`].
pub struct Display {
    backend: Rc<dyn ServerBackend>,
    keymap: Arc<dyn Keymap>,
    grabs: RefCell<GrabTracker>,
    last_grab_status: RefCell<hashbrown::HashMap<DeviceId, GrabStatus>>,
    server_grab_depth: Cell<u32>,
    no_grabs: bool,
}

impl fmt::Debug for Display {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Display")
            .field("server_grab_depth", &self.server_grab_depth.get())
            .field("no_grabs", &self.no_grabs)
            .finish()
    }
}

impl Display {
    /// Wraps a backend connection.
    ///
    /// Reads `CAMBIUM_NO_GRABS` once; when set, device grabs report success
    /// without server effect.
    pub fn new(backend: Rc<dyn ServerBackend>, keymap: Arc<dyn Keymap>) -> Rc<Self> {
        let no_grabs = std::env::var("CAMBIUM_NO_GRABS").is_ok_and(|v| !v.is_empty());
        if no_grabs {
            debug!("device grabs disabled by CAMBIUM_NO_GRABS");
        }
        Rc::new(Self {
            backend,
            keymap,
            grabs: RefCell::new(GrabTracker::new()),
            last_grab_status: RefCell::new(hashbrown::HashMap::new()),
            server_grab_depth: Cell::new(0),
            no_grabs,
        })
    }

    /// The wire backend.
    pub fn backend(&self) -> &Rc<dyn ServerBackend> {
        &self.backend
    }

    /// The display's keymap.
    pub fn keymap(&self) -> &Arc<dyn Keymap> {
        &self.keymap
    }

    /// Whether grabs are disabled for debugging.
    pub fn grabs_disabled(&self) -> bool {
        self.no_grabs
    }

    /// Takes a display-wide server grab. Reentrant; only the first level
    /// issues a request.
    pub fn grab(&self) {
        let depth = self.server_grab_depth.get();
        if depth == 0 {
            self.backend.grab_server();
        }
        self.server_grab_depth.set(depth + 1);
    }

    /// Releases one level of server grab.
    pub fn ungrab(&self) {
        let depth = self.server_grab_depth.get();
        if depth == 0 {
            debug_panic!("display ungrab without matching grab");
            return;
        }
        self.server_grab_depth.set(depth - 1);
        if depth == 1 {
            self.backend.ungrab_server();
        }
    }

    /// Starts trapping protocol errors; the guard pops on drop.
    pub fn error_trap(self: &Rc<Self>) -> ErrorTrap {
        self.backend.push_error_trap();
        ErrorTrap {
            display: self.clone(),
            popped: Cell::new(false),
        }
    }

    /// Records the outcome of a grab request.
    ///
    /// Successful grabs enter the grab table; failures only update the
    /// last-status diagnostic and leave the table untouched.
    pub fn update_grab_info(
        &self,
        device: DeviceId,
        status: GrabStatus,
        grab: Option<DeviceGrab>,
    ) {
        self.last_grab_status.borrow_mut().insert(device, status);
        match (status, grab) {
            (GrabStatus::Success, Some(grab)) => {
                self.grabs.borrow_mut().add_grab(device, grab);
            }
            (GrabStatus::Success, None) => {}
            (failure, _) => {
                debug!(?device, ?failure, "device grab failed");
            }
        }
    }

    /// Records an ungrab issued at `serial`.
    pub fn update_grab_info_ungrab(&self, device: DeviceId, _time: Timestamp, serial: u64) {
        self.grabs.borrow_mut().end_grab(device, serial);
    }

    /// The active grab on `device`, if any.
    pub fn device_grab(&self, device: DeviceId) -> Option<DeviceGrab> {
        self.grabs.borrow().active_grab(device).cloned()
    }

    /// The most recent grab entry for `device`, active or not.
    pub fn last_device_grab(&self, device: DeviceId) -> Option<DeviceGrab> {
        self.grabs.borrow().last_grab(device).cloned()
    }

    /// The status the last grab request on `device` returned.
    pub fn last_grab_status(&self, device: DeviceId) -> Option<GrabStatus> {
        self.last_grab_status.borrow().get(&device).copied()
    }

    /// Handles a window being unmapped: grabs targeting it (or a window
    /// inside it) are implicitly released.
    pub fn window_unmapped(&self, window: WindowId) {
        self.implicit_ungrab_for(window);
    }

    /// Handles a window being destroyed; grab-wise identical to unmapping.
    pub fn window_destroyed(&self, window: WindowId) {
        self.implicit_ungrab_for(window);
    }

    fn implicit_ungrab_for(&self, window: WindowId) {
        let backend = &self.backend;
        self.grabs.borrow_mut().implicit_ungrab(|grabbed| {
            // The affected window is the grab window or an ancestor of it.
            let mut current = Some(grabbed);
            while let Some(w) = current {
                if w == window {
                    return true;
                }
                current = backend.window_parent(w);
            }
            false
        });
    }
}

/// A scoped error trap; pops on drop, discarding any trapped error.
///
/// Call [`pop`](Self::pop) instead to observe the error code.
pub struct ErrorTrap {
    display: Rc<Display>,
    popped: Cell<bool>,
}

impl ErrorTrap {
    /// Ends the trap, returning the first trapped error code (0 for none).
    pub fn pop(self) -> i32 {
        self.popped.set(true);
        self.display.backend.pop_error_trap()
    }
}

impl Drop for ErrorTrap {
    fn drop(&mut self) {
        if !self.popped.get() {
            let code = self.display.backend.pop_error_trap();
            if code != 0 {
                warn!(code, "discarding trapped display error");
            }
        }
    }
}

impl fmt::Debug for ErrorTrap {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ErrorTrap")
            .field("popped", &self.popped.get())
            .finish()
    }
}
