// Copyright 2026 the Cambium Authors
// SPDX-License-Identifier: Apache-2.0

//! Input devices, grabs, and the keymap contract.
//!
//! [`Device`] is the uniform capability set shared by the core-protocol and
//! XI2 implementations; [`Display`] owns the per-display grab table and the
//! reentrant server-grab counter. The wire protocol itself lives behind
//! [`ServerBackend`].

mod core_device;
mod device;
mod display;
mod event_mask;
mod grab;
mod keymap;
mod keyval;
mod modifiers;
mod xi2;

pub use core_device::CoreDevice;
pub use device::{
    AxisInfo, AxisUse, AxisVector, Device, DeviceKind, DeviceShared, DeviceType, GrabStatus,
    QueryState,
};
pub use display::{
    DeviceId, Display, ErrorTrap, PointerQuery, RawDeviceState, ServerBackend, Timestamp,
    WindowGeometry, WindowId,
};
pub use event_mask::{EventMask, XiEventMask, translate_event_mask, xi_event};
pub use grab::{DeviceGrab, GrabTracker};
pub use keymap::{AccelTranslation, KeyEvent, Keycode, Keymap, KeymapKey};
pub use keyval::Keyval;
pub use modifiers::{ModifierIntent, ModifierMask};
pub use xi2::{ScrollDirection, Xi2Device};

/// Core-protocol modifier-state translation.
pub use core_device::translate_state as translate_core_state;
/// XI2 modifier-state translation.
pub use xi2::translate_state as translate_xi2_state;
