// Copyright 2026 the Cambium Authors
// SPDX-License-Identifier: Apache-2.0

//! A simulated display server for tests.

use std::cell::RefCell;
use std::fmt;

use cursor_icon::CursorIcon;
use hashbrown::HashMap;

use crate::input::{
    DeviceId, EventMask, PointerQuery, RawDeviceState, ServerBackend, Timestamp, WindowGeometry,
    WindowId, XiEventMask,
};

/// The root window id of the simulated screen.
pub const SIM_ROOT: WindowId = WindowId(1);

#[derive(Clone, Debug)]
struct SimWindow {
    parent: Option<WindowId>,
    /// Relative to the parent, device pixels.
    geometry: WindowGeometry,
    mapped: bool,
    toplevel: bool,
}

struct SimServerState {
    /// Serial of the last request issued.
    serial: u64,
    windows: HashMap<WindowId, SimWindow>,
    window_order: Vec<WindowId>,
    next_window: u64,
    /// Pointer position in root coordinates, device pixels.
    pointer: (f64, f64),
    raw_state: RawDeviceState,
    trusted: bool,
    scale: f64,
    grab_holder: Option<DeviceId>,
    forced_grab_result: Option<i32>,
    server_grab_depth: u32,
    trap_depth: u32,
    next_trapped_error: i32,
    warped_to: Option<(f64, f64)>,
    cursors: HashMap<(DeviceId, WindowId), Option<CursorIcon>>,
    selected_core: HashMap<WindowId, EventMask>,
    selected_xi: HashMap<(DeviceId, WindowId), XiEventMask>,
}

/// An in-process stand-in for the display server.
///
/// Windows form a tree under [`SIM_ROOT`]; every request-shaped method
/// advances the request serial like a real connection would.
pub struct SimServer {
    state: RefCell<SimServerState>,
}

impl fmt::Debug for SimServer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = self.state.borrow();
        f.debug_struct("SimServer")
            .field("serial", &state.serial)
            .field("n_windows", &state.windows.len())
            .finish()
    }
}

impl Default for SimServer {
    fn default() -> Self {
        Self::new()
    }
}

impl SimServer {
    /// A server with a 1000×1000 root window and a trusted client.
    pub fn new() -> Self {
        let mut windows = HashMap::new();
        windows.insert(
            SIM_ROOT,
            SimWindow {
                parent: None,
                geometry: WindowGeometry {
                    x: 0,
                    y: 0,
                    width: 1000,
                    height: 1000,
                },
                mapped: true,
                toplevel: false,
            },
        );
        Self {
            state: RefCell::new(SimServerState {
                serial: 0,
                windows,
                window_order: vec![SIM_ROOT],
                next_window: 2,
                pointer: (0.0, 0.0),
                raw_state: RawDeviceState::default(),
                trusted: true,
                scale: 1.0,
                grab_holder: None,
                forced_grab_result: None,
                server_grab_depth: 0,
                trap_depth: 0,
                next_trapped_error: 0,
                warped_to: None,
                cursors: HashMap::new(),
                selected_core: HashMap::new(),
                selected_xi: HashMap::new(),
            }),
        }
    }

    /// Marks the client untrusted: root pointer queries fail.
    pub fn set_trusted(&self, trusted: bool) {
        self.state.borrow_mut().trusted = trusted;
    }

    /// Sets the HiDPI scale.
    pub fn set_scale(&self, scale: f64) {
        self.state.borrow_mut().scale = scale;
    }

    /// Moves the simulated pointer, in root coordinates (device pixels).
    pub fn set_pointer(&self, x: f64, y: f64) {
        self.state.borrow_mut().pointer = (x, y);
    }

    /// Sets the raw modifier/button/group state queries report.
    pub fn set_raw_state(&self, raw: RawDeviceState) {
        self.state.borrow_mut().raw_state = raw;
    }

    /// Forces the next grab requests to return `status` (X encoding).
    pub fn force_grab_result(&self, status: Option<i32>) {
        self.state.borrow_mut().forced_grab_result = status;
    }

    /// Creates a mapped toplevel window at root coordinates.
    pub fn add_toplevel(&self, x: i32, y: i32, width: i32, height: i32) -> WindowId {
        let mut state = self.state.borrow_mut();
        let id = WindowId(state.next_window);
        state.next_window += 1;
        state.windows.insert(
            id,
            SimWindow {
                parent: Some(SIM_ROOT),
                geometry: WindowGeometry {
                    x,
                    y,
                    width,
                    height,
                },
                mapped: true,
                toplevel: true,
            },
        );
        state.window_order.push(id);
        id
    }

    /// Creates a mapped child window, parent-relative.
    pub fn add_child(&self, parent: WindowId, x: i32, y: i32, width: i32, height: i32) -> WindowId {
        let mut state = self.state.borrow_mut();
        let id = WindowId(state.next_window);
        state.next_window += 1;
        state.windows.insert(
            id,
            SimWindow {
                parent: Some(parent),
                geometry: WindowGeometry {
                    x,
                    y,
                    width,
                    height,
                },
                mapped: true,
                toplevel: false,
            },
        );
        state.window_order.push(id);
        id
    }

    /// Unmaps a window. This is a request; the serial advances.
    pub fn unmap_window(&self, window: WindowId) {
        let mut state = self.state.borrow_mut();
        state.serial += 1;
        if let Some(w) = state.windows.get_mut(&window) {
            w.mapped = false;
        }
    }

    /// The device currently holding a grab, if any.
    pub fn grab_holder(&self) -> Option<DeviceId> {
        self.state.borrow().grab_holder
    }

    /// Where the pointer was last warped to, in device pixels.
    pub fn warped_to(&self) -> Option<(f64, f64)> {
        self.state.borrow().warped_to
    }

    /// The current server-grab depth, for asserting reentrancy.
    pub fn server_grab_depth(&self) -> u32 {
        self.state.borrow().server_grab_depth
    }

    /// The cursor last assigned for `(device, window)`.
    pub fn cursor_for(&self, device: DeviceId, window: WindowId) -> Option<Option<CursorIcon>> {
        self.state.borrow().cursors.get(&(device, window)).copied()
    }

    /// The XI events selected for `(device, window)`.
    pub fn xi_selection(&self, device: DeviceId, window: WindowId) -> Option<XiEventMask> {
        self.state.borrow().selected_xi.get(&(device, window)).copied()
    }

    /// The core events selected for `window`.
    pub fn core_selection(&self, window: WindowId) -> Option<EventMask> {
        self.state.borrow().selected_core.get(&window).copied()
    }

    /// Makes the next error trap observe `code`.
    pub fn inject_error(&self, code: i32) {
        self.state.borrow_mut().next_trapped_error = code;
    }

    fn absolute_origin(state: &SimServerState, window: WindowId) -> Option<(f64, f64)> {
        let mut x = 0.0;
        let mut y = 0.0;
        let mut current = Some(window);
        while let Some(id) = current {
            let w = state.windows.get(&id)?;
            x += w.geometry.x as f64;
            y += w.geometry.y as f64;
            current = w.parent;
        }
        Some((x, y))
    }

    /// The topmost mapped child of `window` containing the pointer.
    fn child_at_pointer(state: &SimServerState, window: WindowId) -> Option<WindowId> {
        let (px, py) = state.pointer;
        // Later-created windows stack above earlier siblings.
        state
            .window_order
            .iter()
            .rev()
            .copied()
            .find(|&id| {
                let Some(w) = state.windows.get(&id) else {
                    return false;
                };
                if w.parent != Some(window) || !w.mapped {
                    return false;
                }
                let Some((ax, ay)) = Self::absolute_origin(state, id) else {
                    return false;
                };
                w.geometry.contains(px - ax, py - ay)
            })
    }
}

impl ServerBackend for SimServer {
    fn next_request_serial(&self) -> u64 {
        self.state.borrow().serial + 1
    }

    fn is_trusted_client(&self) -> bool {
        self.state.borrow().trusted
    }

    fn window_scale(&self) -> f64 {
        self.state.borrow().scale
    }

    fn grab_server(&self) {
        let mut state = self.state.borrow_mut();
        state.serial += 1;
        state.server_grab_depth += 1;
    }

    fn ungrab_server(&self) {
        let mut state = self.state.borrow_mut();
        state.serial += 1;
        state.server_grab_depth = state.server_grab_depth.saturating_sub(1);
    }

    fn push_error_trap(&self) {
        self.state.borrow_mut().trap_depth += 1;
    }

    fn pop_error_trap(&self) -> i32 {
        let mut state = self.state.borrow_mut();
        state.trap_depth = state.trap_depth.saturating_sub(1);
        std::mem::take(&mut state.next_trapped_error)
    }

    fn root_window(&self) -> WindowId {
        SIM_ROOT
    }

    fn toplevel_windows(&self) -> Vec<WindowId> {
        let state = self.state.borrow();
        state
            .window_order
            .iter()
            .copied()
            .filter(|id| state.windows.get(id).is_some_and(|w| w.toplevel && w.mapped))
            .collect()
    }

    fn window_geometry(&self, window: WindowId) -> Option<WindowGeometry> {
        self.state.borrow().windows.get(&window).map(|w| w.geometry)
    }

    fn window_parent(&self, window: WindowId) -> Option<WindowId> {
        self.state.borrow().windows.get(&window)?.parent
    }

    fn query_device_pointer(&self, _device: DeviceId, window: WindowId) -> Option<PointerQuery> {
        let mut state = self.state.borrow_mut();
        state.serial += 1;
        let state = &*state;

        if !state.trusted && window == SIM_ROOT {
            return None;
        }
        state.windows.get(&window)?;
        let (ax, ay) = Self::absolute_origin(state, window)?;
        let (px, py) = state.pointer;
        Some(PointerQuery {
            root: SIM_ROOT,
            child: Self::child_at_pointer(state, window),
            root_x: px,
            root_y: py,
            win_x: px - ax,
            win_y: py - ay,
            raw: state.raw_state,
        })
    }

    fn grab_device(
        &self,
        device: DeviceId,
        _window: WindowId,
        _owner_events: bool,
        _events: &XiEventMask,
        _confine_to: Option<WindowId>,
        _cursor: Option<CursorIcon>,
        _time: Timestamp,
    ) -> i32 {
        let mut state = self.state.borrow_mut();
        state.serial += 1;
        if let Some(forced) = state.forced_grab_result {
            return forced;
        }
        match state.grab_holder {
            Some(holder) if holder != device => 1, // AlreadyGrabbed
            _ => {
                state.grab_holder = Some(device);
                0
            }
        }
    }

    fn ungrab_device(&self, device: DeviceId, _time: Timestamp) {
        let mut state = self.state.borrow_mut();
        state.serial += 1;
        if state.grab_holder == Some(device) {
            state.grab_holder = None;
        }
    }

    fn warp_pointer(&self, _device: DeviceId, root_x: f64, root_y: f64) {
        let mut state = self.state.borrow_mut();
        state.serial += 1;
        state.pointer = (root_x, root_y);
        state.warped_to = Some((root_x, root_y));
    }

    fn set_window_cursor(&self, device: DeviceId, window: WindowId, cursor: Option<CursorIcon>) {
        let mut state = self.state.borrow_mut();
        state.serial += 1;
        state.cursors.insert((device, window), cursor);
    }

    fn select_device_events(&self, device: DeviceId, window: WindowId, events: &XiEventMask) {
        let mut state = self.state.borrow_mut();
        state.serial += 1;
        state.selected_xi.insert((device, window), *events);
    }

    fn select_window_events(&self, window: WindowId, events: EventMask) {
        let mut state = self.state.borrow_mut();
        state.serial += 1;
        state.selected_core.insert(window, events);
    }

    fn create_input_probe(&self, parent: WindowId, x: i32, y: i32) -> WindowId {
        let mut state = self.state.borrow_mut();
        state.serial += 1;
        let id = WindowId(state.next_window);
        state.next_window += 1;
        state.windows.insert(
            id,
            SimWindow {
                parent: Some(parent),
                geometry: WindowGeometry {
                    x,
                    y,
                    width: 1,
                    height: 1,
                },
                mapped: true,
                toplevel: false,
            },
        );
        state.window_order.push(id);
        id
    }

    fn destroy_window(&self, window: WindowId) {
        let mut state = self.state.borrow_mut();
        state.serial += 1;
        state.windows.remove(&window);
        state.window_order.retain(|&id| id != window);
    }
}
