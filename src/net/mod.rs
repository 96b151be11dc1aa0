//! # Network Layer
//!
//! Everything that touches the socket. The core only ever sees `Action`
//! values coming out of here and `Effect::Send` bytes going in.
//!
//! - [`tls`]: rustls client configuration (insecure by default, or verifying)
//! - [`connect`]: connect-with-retry over TCP + TLS
//! - [`launch`]: certificate check and TLS setup before any socket is opened
//! - [`session`]: concurrent receive/send tasks over an open connection

pub mod connect;
pub mod launch;
pub mod session;
pub mod tls;

pub use connect::{ClientStream, ConnectError, RetryPolicy, connect_with_retry};
pub use launch::{Launch, LaunchError, prepare};
pub use session::{Session, SessionOptions, StopFlag};
pub use tls::{TlsSetupError, build_connector};
