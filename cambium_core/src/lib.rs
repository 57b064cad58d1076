// Copyright 2026 the Cambium Authors
// SPDX-License-Identifier: Apache-2.0

//! Cambium Core provides the input and styling engine for the Cambium toolkit.
//!
//! It sits between a display backend (which speaks the wire protocol) and a
//! widget tree (which owns layout and drawing), and covers three subsystems:
//!
//! - [`binding`]: named sets of key bindings, a keymap-aware hash that turns
//!   raw key events into priority-ordered candidate lists, and the activation
//!   chain that walks a widget's style-attached and class-ancestry sets.
//! - [`style`]: immutable reference-counted property values with per-type
//!   compute/equal/transition/print operations, static property stores, and
//!   animated styles that overlay running transitions on a base style.
//! - [`input`]: a polymorphic device contract shared by the core-protocol and
//!   XI2 implementations, plus per-display grab bookkeeping with request-serial
//!   tracking.
//!
//! Cambium Core does not open display connections, create windows, or run an
//! event loop. The display backend implements [`input::ServerBackend`] and
//! [`input::Keymap`]; widgets implement [`binding::BindingTarget`]. The
//! [`testing`] module ships simulated collaborators for the test suite.
//!
//! # Environment variables
//!
//! - `CAMBIUM_NO_GRABS`: when set to a non-empty value, all device grab calls
//!   report success without issuing server requests. Useful when debugging
//!   under a debugger that would otherwise deadlock against an active grab.

// LINEBENDER LINT SET - lib.rs - v3
// See https://linebender.org/wiki/canonical-lints/
// These lints shouldn't apply to examples or tests.
#![cfg_attr(not(test), warn(unused_crate_dependencies))]
// These lints shouldn't apply to examples.
#![warn(clippy::print_stdout, clippy::print_stderr)]
// Targeting e.g. 32-bit means structs containing usize can give false positives for 64-bit.
#![cfg_attr(target_pointer_width = "64", warn(clippy::trivially_copy_pass_by_ref))]
// END LINEBENDER LINT SET
#![cfg_attr(
    test,
    expect(
        unused_crate_dependencies,
        reason = "False-positive with dev-dependencies only used in some tests"
    )
)]

#[macro_use]
pub mod util;

pub mod binding;
pub mod input;
pub mod style;
pub mod testing;

pub use {bitflags, cursor_icon, dpi, kurbo, peniko, smallvec};
