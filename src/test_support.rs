//! Test utilities shared across the crate.
//!
//! This module is only compiled during tests (`#[cfg(test)]`).

use crate::core::endpoint::{DEFAULT_PORT, Endpoint};
use crate::core::state::App;

/// Creates a test App pointed at `localhost:8443` with verification off.
pub fn test_app() -> App {
    App::new(Endpoint::new("localhost", DEFAULT_PORT), false)
}

/// Creates a test App that already holds an open connection.
pub fn connected_app() -> App {
    let mut app = test_app();
    app.status = crate::core::state::ConnectionStatus::Connected;
    app
}
