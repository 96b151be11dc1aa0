//! Connection manager: TCP connect plus TLS handshake, retried a fixed number
//! of times with a fixed delay. Every failure kind is handled the same way.

use std::fmt;
use std::io;
use std::time::Duration;

use log::{debug, info, warn};
use rustls::pki_types::ServerName;
use tokio::net::TcpStream;
use tokio::sync::mpsc::UnboundedSender;
use tokio_rustls::TlsConnector;
use tokio_rustls::client::TlsStream;

use crate::core::action::Action;
use crate::core::endpoint::Endpoint;
use crate::core::state::Emphasis;

pub type ClientStream = TlsStream<TcpStream>;

pub const DEFAULT_ATTEMPTS: u32 = 3;
pub const DEFAULT_RETRY_DELAY: Duration = Duration::from_secs(2);
pub const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Total attempts, including the first. Treated as at least 1.
    pub attempts: u32,
    /// Fixed pause between attempts. No backoff, no jitter.
    pub retry_delay: Duration,
    /// Bound on TCP connect plus handshake for a single attempt.
    pub connect_timeout: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            attempts: DEFAULT_ATTEMPTS,
            retry_delay: DEFAULT_RETRY_DELAY,
            connect_timeout: DEFAULT_CONNECT_TIMEOUT,
        }
    }
}

#[derive(Debug)]
pub enum ConnectError {
    /// Host is neither a DNS name nor an IP address. Not retried.
    InvalidServerName(String),
    /// Retry budget spent.
    Exhausted { attempts: u32, last_error: String },
}

impl fmt::Display for ConnectError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConnectError::InvalidServerName(host) => write!(f, "invalid server name: {host}"),
            ConnectError::Exhausted {
                attempts,
                last_error,
            } => write!(f, "gave up after {attempts} attempt(s): {last_error}"),
        }
    }
}

impl std::error::Error for ConnectError {}

/// Open a TLS connection to `endpoint`, retrying per `policy`.
///
/// Progress is reported on `events` as it happens so the display can show
/// each attempt.
pub async fn connect_with_retry(
    endpoint: &Endpoint,
    policy: &RetryPolicy,
    connector: &TlsConnector,
    events: &UnboundedSender<Action>,
) -> Result<ClientStream, ConnectError> {
    let server_name = match ServerName::try_from(endpoint.host().to_string()) {
        Ok(name) => name,
        Err(e) => {
            warn!("Invalid server name {:?}: {}", endpoint.host(), e);
            report(
                events,
                Action::Notice {
                    text: format!("Invalid server name: {}", endpoint.host()),
                    emphasis: Emphasis::Error,
                },
            );
            return Err(ConnectError::InvalidServerName(endpoint.host().to_string()));
        }
    };

    let attempts = policy.attempts.max(1);
    let mut last_error = String::new();

    for attempt in 1..=attempts {
        info!("Connecting to {} (attempt {}/{})", endpoint, attempt, attempts);
        report(events, Action::ConnectAttempt { attempt, of: attempts });

        match connect_once(endpoint, server_name.clone(), connector, policy.connect_timeout).await {
            Ok(stream) => {
                info!("Connected to {}", endpoint);
                report(events, Action::Connected);
                return Ok(stream);
            }
            Err(e) => {
                warn!("Connection attempt {} to {} failed: {}", attempt, endpoint, e);
                let retry_in = (attempt < attempts).then_some(policy.retry_delay);
                last_error = e.to_string();
                report(
                    events,
                    Action::AttemptFailed {
                        attempt,
                        reason: last_error.clone(),
                        retry_in,
                    },
                );
                if let Some(delay) = retry_in {
                    tokio::time::sleep(delay).await;
                }
            }
        }
    }

    report(events, Action::ConnectFailed { attempts });
    Err(ConnectError::Exhausted {
        attempts,
        last_error,
    })
}

async fn connect_once(
    endpoint: &Endpoint,
    server_name: ServerName<'static>,
    connector: &TlsConnector,
    timeout: Duration,
) -> io::Result<ClientStream> {
    let handshake = async {
        let tcp = TcpStream::connect((endpoint.host(), endpoint.port())).await?;
        tcp.set_nodelay(true)?;
        connector.connect(server_name, tcp).await
    };

    tokio::time::timeout(timeout, handshake)
        .await
        .map_err(|_| {
            io::Error::new(
                io::ErrorKind::TimedOut,
                format!("timed out after {}s", timeout.as_secs_f64()),
            )
        })?
}

fn report(events: &UnboundedSender<Action>, action: Action) {
    if events.send(action).is_err() {
        debug!("Dropping connection event: receiver closed");
    }
}
