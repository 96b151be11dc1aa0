//! # Certificate Lookup
//!
//! The client expects the server certificate next to the install, at
//! `../certs/server.crt` relative to the directory holding the executable.
//! Startup refuses to touch the network when it is missing.

use log::{info, warn};
use std::io;
use std::path::{Path, PathBuf};

/// Location of the certificate relative to the executable's directory.
const RELATIVE_CERT_PATH: [&str; 3] = ["..", "certs", "server.crt"];

/// Resolve the certificate path relative to a base directory.
pub fn cert_path_in(base_dir: &Path) -> PathBuf {
    RELATIVE_CERT_PATH
        .iter()
        .fold(base_dir.to_path_buf(), |path, part| path.join(part))
}

/// Resolve the certificate path relative to the running executable.
pub fn default_cert_path() -> io::Result<PathBuf> {
    let exe = std::env::current_exe()?;
    let dir = exe
        .parent()
        .ok_or_else(|| io::Error::new(io::ErrorKind::NotFound, "executable has no parent directory"))?;
    Ok(cert_path_in(dir))
}

/// Returns `true` if a certificate file exists at `path`.
///
/// Only existence is checked here. Whether the contents are used for
/// verification is decided by the TLS configuration.
pub fn check_certificate(path: &Path) -> bool {
    match path.try_exists() {
        Ok(true) if path.is_file() => {
            info!("Found certificate at {}", path.display());
            true
        }
        Ok(_) => {
            warn!("Certificate not found at {}", path.display());
            false
        }
        Err(e) => {
            warn!("Error checking certificate {}: {}", path.display(), e);
            false
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn test_cert_path_is_sibling_certs_dir() {
        let path = cert_path_in(Path::new("/opt/tlschat/bin"));
        assert_eq!(path, PathBuf::from("/opt/tlschat/bin/../certs/server.crt"));
    }

    #[test]
    fn test_missing_certificate_fails_check() {
        let dir = tempfile::tempdir().unwrap();
        assert!(!check_certificate(&dir.path().join("server.crt")));
    }

    #[test]
    fn test_directory_is_not_a_certificate() {
        let dir = tempfile::tempdir().unwrap();
        assert!(!check_certificate(dir.path()));
    }

    #[test]
    fn test_present_certificate_passes_check() {
        let dir = tempfile::tempdir().unwrap();
        let bin = dir.path().join("bin");
        fs::create_dir_all(&bin).unwrap();
        fs::create_dir_all(dir.path().join("certs")).unwrap();
        fs::write(dir.path().join("certs").join("server.crt"), "-----BEGIN CERTIFICATE-----").unwrap();

        assert!(check_certificate(&cert_path_in(&bin)));
    }
}
