//! Startup gate. A [`Launch`] is the only way to open a connection, and
//! [`prepare`] only hands one out once the certificate check has passed and
//! the TLS client is configured.

use std::fmt;
use std::path::PathBuf;

use log::info;
use tokio::sync::mpsc::UnboundedSender;
use tokio_rustls::TlsConnector;

use crate::core::action::Action;
use crate::core::certificate::check_certificate;
use crate::core::config::ResolvedConfig;
use crate::core::endpoint::Endpoint;
use crate::net::connect::{ClientStream, ConnectError, RetryPolicy, connect_with_retry};
use crate::net::tls::{TlsSetupError, build_connector};

#[derive(Debug)]
pub enum LaunchError {
    MissingCertificate(PathBuf),
    Tls(TlsSetupError),
}

impl fmt::Display for LaunchError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LaunchError::MissingCertificate(path) => {
                write!(f, "Certificate not found at {}", path.display())
            }
            LaunchError::Tls(e) => write!(f, "{e}"),
        }
    }
}

impl std::error::Error for LaunchError {}

/// A checked, ready-to-dial connection target.
pub struct Launch {
    endpoint: Endpoint,
    retry: RetryPolicy,
    connector: TlsConnector,
}

/// Run the startup checks for `host` under `config`. Touches the filesystem
/// only; no socket is opened here.
pub fn prepare(config: &ResolvedConfig, host: impl Into<String>) -> Result<Launch, LaunchError> {
    if !check_certificate(&config.cert_path) {
        return Err(LaunchError::MissingCertificate(config.cert_path.clone()));
    }
    let connector =
        build_connector(config.verify_server, &config.cert_path).map_err(LaunchError::Tls)?;

    let endpoint = Endpoint::new(host, config.port);
    info!("Ready to connect to {}", endpoint);
    Ok(Launch {
        endpoint,
        retry: config.retry.clone(),
        connector,
    })
}

impl Launch {
    pub fn endpoint(&self) -> &Endpoint {
        &self.endpoint
    }

    /// Open the connection, retrying per the configured policy.
    pub async fn connect(
        &self,
        events: &UnboundedSender<Action>,
    ) -> Result<ClientStream, ConnectError> {
        connect_with_retry(&self.endpoint, &self.retry, &self.connector, events).await
    }
}
