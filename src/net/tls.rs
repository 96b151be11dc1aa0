//! TLS client configuration.
//!
//! Two flavours exist. The default accepts any server certificate, which is
//! only acceptable on a trusted test network and is logged as such every time
//! a connector is built. The verifying flavour trusts exactly the
//! certificates found in the configured PEM file.

use std::fmt;
use std::fs::File;
use std::io::{self, BufReader};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use log::{info, warn};
use rustls::client::danger::{HandshakeSignatureValid, ServerCertVerified, ServerCertVerifier};
use rustls::crypto::{CryptoProvider, WebPkiSupportedAlgorithms};
use rustls::pki_types::{CertificateDer, ServerName, UnixTime};
use rustls::{ClientConfig, DigitallySignedStruct, RootCertStore, SignatureScheme};
use tokio_rustls::TlsConnector;

#[derive(Debug)]
pub enum TlsSetupError {
    /// Could not read the trust root file.
    Io(io::Error),
    /// The trust root file held no PEM certificates.
    NoCertificates(PathBuf),
    Rustls(rustls::Error),
}

impl fmt::Display for TlsSetupError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TlsSetupError::Io(e) => write!(f, "TLS setup I/O error: {e}"),
            TlsSetupError::NoCertificates(path) => {
                write!(f, "no certificates found in {}", path.display())
            }
            TlsSetupError::Rustls(e) => write!(f, "TLS configuration error: {e}"),
        }
    }
}

impl std::error::Error for TlsSetupError {}

fn crypto_provider() -> Arc<CryptoProvider> {
    Arc::new(rustls::crypto::ring::default_provider())
}

/// Build the connector the client will use.
///
/// With `verify_server` off any certificate is accepted and `cert_path` is not
/// read. With it on, `cert_path` becomes the only trust root.
pub fn build_connector(verify_server: bool, cert_path: &Path) -> Result<TlsConnector, TlsSetupError> {
    if verify_server {
        verifying_connector(cert_path)
    } else {
        insecure_connector()
    }
}

/// Connector that accepts any server certificate.
pub fn insecure_connector() -> Result<TlsConnector, TlsSetupError> {
    let provider = crypto_provider();
    let verifier = AcceptAnyCertificate {
        algorithms: provider.signature_verification_algorithms,
    };

    let config = ClientConfig::builder_with_provider(provider)
        .with_safe_default_protocol_versions()
        .map_err(TlsSetupError::Rustls)?
        .dangerous()
        .with_custom_certificate_verifier(Arc::new(verifier))
        .with_no_client_auth();

    warn!("Server certificate verification is DISABLED: any certificate will be accepted");
    Ok(TlsConnector::from(Arc::new(config)))
}

/// Connector that trusts only the PEM certificates in `cert_path`.
pub fn verifying_connector(cert_path: &Path) -> Result<TlsConnector, TlsSetupError> {
    let roots = load_roots(cert_path)?;
    info!(
        "Verifying server certificates against {} root(s) from {}",
        roots.len(),
        cert_path.display()
    );

    let config = ClientConfig::builder_with_provider(crypto_provider())
        .with_safe_default_protocol_versions()
        .map_err(TlsSetupError::Rustls)?
        .with_root_certificates(roots)
        .with_no_client_auth();

    Ok(TlsConnector::from(Arc::new(config)))
}

fn load_roots(cert_path: &Path) -> Result<RootCertStore, TlsSetupError> {
    let file = File::open(cert_path).map_err(TlsSetupError::Io)?;
    let mut reader = BufReader::new(file);

    let mut roots = RootCertStore::empty();
    for cert in rustls_pemfile::certs(&mut reader) {
        let cert = cert.map_err(TlsSetupError::Io)?;
        roots.add(cert).map_err(TlsSetupError::Rustls)?;
    }

    if roots.is_empty() {
        return Err(TlsSetupError::NoCertificates(cert_path.to_path_buf()));
    }
    Ok(roots)
}

/// Certificate verifier that accepts any certificate chain.
///
/// Handshake signatures are still checked against the presented key, so the
/// peer must hold the private key of whatever certificate it sends.
#[derive(Debug)]
struct AcceptAnyCertificate {
    algorithms: WebPkiSupportedAlgorithms,
}

impl ServerCertVerifier for AcceptAnyCertificate {
    fn verify_server_cert(
        &self,
        _end_entity: &CertificateDer<'_>,
        _intermediates: &[CertificateDer<'_>],
        _server_name: &ServerName<'_>,
        _ocsp_response: &[u8],
        _now: UnixTime,
    ) -> Result<ServerCertVerified, rustls::Error> {
        Ok(ServerCertVerified::assertion())
    }

    fn verify_tls12_signature(
        &self,
        message: &[u8],
        cert: &CertificateDer<'_>,
        dss: &DigitallySignedStruct,
    ) -> Result<HandshakeSignatureValid, rustls::Error> {
        rustls::crypto::verify_tls12_signature(message, cert, dss, &self.algorithms)
    }

    fn verify_tls13_signature(
        &self,
        message: &[u8],
        cert: &CertificateDer<'_>,
        dss: &DigitallySignedStruct,
    ) -> Result<HandshakeSignatureValid, rustls::Error> {
        rustls::crypto::verify_tls13_signature(message, cert, dss, &self.algorithms)
    }

    fn supported_verify_schemes(&self) -> Vec<SignatureScheme> {
        self.algorithms.supported_schemes()
    }
}
