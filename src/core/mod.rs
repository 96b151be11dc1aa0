//! # Core Application Logic
//!
//! This module contains the chat client's business logic.
//! It knows nothing about terminals or sockets.
//!
//! ```text
//!                    ┌─────────────────────────┐
//!                    │         CORE            │
//!                    │  (this module)          │
//!                    │                         │
//!                    │  • State (app data)     │
//!                    │  • Action (events)      │
//!                    │  • update() (reducer)   │
//!                    └───────────┬─────────────┘
//!                                │
//!                  ┌─────────────┴─────────────┐
//!                  ▼                           ▼
//!           ┌────────────┐              ┌────────────┐
//!           │    TUI     │              │    NET     │
//!           │  Adapter   │              │ (TLS, I/O) │
//!           │ (ratatui)  │              │            │
//!           └────────────┘              └────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`state`]: The `App` struct, all display state in one place
//! - [`action`]: The `Action` enum and the `update()` reducer
//! - [`config`]: Config file, env and CLI resolution
//! - [`endpoint`]: Server host and port
//! - [`certificate`]: Certificate path lookup and existence check

pub mod action;
pub mod certificate;
pub mod config;
pub mod endpoint;
pub mod state;
