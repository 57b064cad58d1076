// Copyright 2026 the Cambium Authors
// SPDX-License-Identifier: Apache-2.0

//! Helper tools for writing tests against the input and binding engine.
//!
//! This module provides simulated collaborators: a table-driven
//! [`SimKeymap`], an in-process [`SimServer`] display backend, and a
//! [`TestObject`] binding target that records emissions.

mod sim_keymap;
mod sim_server;
mod test_object;

pub use sim_keymap::SimKeymap;
pub use sim_server::{SIM_ROOT, SimServer};
pub use test_object::TestObject;

use crate::style::StyleProvider;

/// A style provider that resolves nothing.
#[derive(Debug, Default)]
pub struct StubProvider;

impl StyleProvider for StubProvider {}

/// Initializes tracing output for a test run.
///
/// Uses the `RUST_LOG` environment variable for filtering and is a no-op
/// when a subscriber is already installed (tests share one process).
pub fn init_test_tracing() {
    use tracing_subscriber::EnvFilter;
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}
