//! # Configuration
//!
//! Centralizes all settings with a clear override hierarchy:
//! defaults → config file → env vars → CLI arguments.
//!
//! Config lives at `~/.tlschat/config.toml`. If missing on first run, a
//! commented-out default is generated so users can discover all options.

use log::{debug, info, warn};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::core::certificate;
use crate::core::endpoint::DEFAULT_PORT;
use crate::net::connect::RetryPolicy;
use crate::net::session::SessionOptions;

// ============================================================================
// Config Structs (all fields Option<T> for sparse TOML)
// ============================================================================

#[derive(Debug, Default, Deserialize, Serialize)]
pub struct TlschatConfig {
    #[serde(default)]
    pub connection: ConnectionConfig,
    #[serde(default)]
    pub tls: TlsConfig,
    #[serde(default)]
    pub ui: UiConfig,
}

#[derive(Debug, Default, Deserialize, Serialize)]
pub struct ConnectionConfig {
    pub host: Option<String>,
    pub port: Option<u16>,
    pub attempts: Option<u32>,
    pub retry_delay_secs: Option<u64>,
    pub connect_timeout_secs: Option<u64>,
    pub read_timeout_ms: Option<u64>,
    pub join_timeout_ms: Option<u64>,
}

#[derive(Debug, Default, Deserialize, Serialize)]
pub struct TlsConfig {
    pub cert_path: Option<String>,
    pub verify_server: Option<bool>,
}

#[derive(Debug, Default, Deserialize, Serialize)]
pub struct UiConfig {
    pub input_poll_ms: Option<u64>,
}

// ============================================================================
// Defaults
// ============================================================================

pub const DEFAULT_INPUT_POLL: Duration = Duration::from_millis(25);

// ============================================================================
// Resolved Config (concrete values, no Options except the host)
// ============================================================================

#[derive(Debug, Clone)]
pub struct ResolvedConfig {
    /// `None` means nobody supplied one; the caller prompts for it.
    pub host: Option<String>,
    pub port: u16,
    pub retry: RetryPolicy,
    pub session: SessionOptions,
    pub cert_path: PathBuf,
    pub verify_server: bool,
    pub input_poll: Duration,
}

// ============================================================================
// Error Type
// ============================================================================

#[derive(Debug)]
pub enum ConfigError {
    Io(std::io::Error),
    Parse(toml::de::Error),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::Io(e) => write!(f, "config I/O error: {e}"),
            ConfigError::Parse(e) => write!(f, "config parse error: {e}"),
        }
    }
}

impl std::error::Error for ConfigError {}

// ============================================================================
// Loading
// ============================================================================

/// Returns the path to `~/.tlschat/config.toml`.
pub fn config_path() -> Option<PathBuf> {
    dirs::home_dir().map(|h| h.join(".tlschat").join("config.toml"))
}

/// Load config from `~/.tlschat/config.toml`.
///
/// If the file doesn't exist, generates a commented-out default and
/// returns `TlschatConfig::default()`. If it exists but is malformed,
/// returns `ConfigError::Parse`.
pub fn load_config() -> Result<TlschatConfig, ConfigError> {
    let path = match config_path() {
        Some(p) => p,
        None => {
            warn!("Could not determine home directory, using default config");
            return Ok(TlschatConfig::default());
        }
    };

    if !path.exists() {
        info!("No config file found, generating default at {}", path.display());
        generate_default_config(&path);
        return Ok(TlschatConfig::default());
    }

    load_config_from(&path)
}

/// Parse a config file at an explicit path.
pub fn load_config_from(path: &Path) -> Result<TlschatConfig, ConfigError> {
    let contents = fs::read_to_string(path).map_err(ConfigError::Io)?;
    let config: TlschatConfig = toml::from_str(&contents).map_err(ConfigError::Parse)?;
    info!("Loaded config from {}", path.display());
    debug!("Config: {:?}", config);
    Ok(config)
}

/// Generates a commented-out default config file at the given path.
fn generate_default_config(path: &Path) {
    let default_content = r#"# tlschat configuration
# All settings are optional; defaults are used for anything not specified.
# Override hierarchy: defaults → this file → env vars → CLI arguments.

# [connection]
# host = "172.17.8.200"              # Or pass it as the first argument / TLSCHAT_HOST
# port = 8443                        # Or --port / TLSCHAT_PORT
# attempts = 3                       # Connection attempts before giving up
# retry_delay_secs = 2               # Fixed pause between attempts
# connect_timeout_secs = 10          # Per attempt, TCP connect + TLS handshake
# read_timeout_ms = 500              # How often the receiver re-checks for shutdown
# join_timeout_ms = 1000             # Grace period for the receiver on exit

# [tls]
# cert_path = "/path/to/server.crt"  # Default: ../certs/server.crt next to the binary
# verify_server = false              # false accepts ANY server certificate (test networks only)

# [ui]
# input_poll_ms = 25                 # Or ESCDELAY; lower is snappier
"#;

    if let Some(parent) = path.parent() {
        if let Err(e) = fs::create_dir_all(parent) {
            warn!("Failed to create config directory: {}", e);
            return;
        }
    }
    if let Err(e) = fs::write(path, default_content) {
        warn!("Failed to write default config: {}", e);
    }
}

// ============================================================================
// Resolution
// ============================================================================

/// Resolve the final config by collapsing: defaults → config file → env vars → CLI.
///
/// `cli_host` and `cli_port` are from CLI arguments (None = not specified).
pub fn resolve(
    config: &TlschatConfig,
    cli_host: Option<&str>,
    cli_port: Option<u16>,
) -> ResolvedConfig {
    resolve_with_env(config, cli_host, cli_port, |key| std::env::var(key).ok())
}

/// Same as [`resolve`], reading environment variables through `env`.
pub fn resolve_with_env(
    config: &TlschatConfig,
    cli_host: Option<&str>,
    cli_port: Option<u16>,
    env: impl Fn(&str) -> Option<String>,
) -> ResolvedConfig {
    let conn = &config.connection;

    // Host: CLI → env → config → prompt later
    let host = cli_host
        .map(|s| s.to_string())
        .or_else(|| env("TLSCHAT_HOST"))
        .or_else(|| conn.host.clone())
        .filter(|h| !h.trim().is_empty());

    // Port: CLI → env → config → default
    let port = cli_port
        .or_else(|| parse_env(&env, "TLSCHAT_PORT"))
        .or(conn.port)
        .unwrap_or(DEFAULT_PORT);

    // Certificate: env → config → next to the executable
    let cert_path = env("TLSCHAT_CERT")
        .or_else(|| config.tls.cert_path.clone())
        .map(PathBuf::from)
        .unwrap_or_else(default_cert_path);

    // Input poll: ESCDELAY → config → default
    let input_poll = parse_env::<u64>(&env, "ESCDELAY")
        .or(config.ui.input_poll_ms)
        .map(Duration::from_millis)
        .unwrap_or(DEFAULT_INPUT_POLL);

    let defaults = RetryPolicy::default();
    let retry = RetryPolicy {
        attempts: conn.attempts.unwrap_or(defaults.attempts),
        retry_delay: conn
            .retry_delay_secs
            .map(Duration::from_secs)
            .unwrap_or(defaults.retry_delay),
        connect_timeout: conn
            .connect_timeout_secs
            .map(Duration::from_secs)
            .unwrap_or(defaults.connect_timeout),
    };

    let session_defaults = SessionOptions::default();
    let session = SessionOptions {
        read_timeout: conn
            .read_timeout_ms
            .map(Duration::from_millis)
            .unwrap_or(session_defaults.read_timeout),
        join_timeout: conn
            .join_timeout_ms
            .map(Duration::from_millis)
            .unwrap_or(session_defaults.join_timeout),
    };

    ResolvedConfig {
        host,
        port,
        retry,
        session,
        cert_path,
        verify_server: config.tls.verify_server.unwrap_or(false),
        input_poll,
    }
}

fn parse_env<T: std::str::FromStr>(env: &impl Fn(&str) -> Option<String>, key: &str) -> Option<T> {
    let raw = env(key)?;
    match raw.trim().parse() {
        Ok(value) => Some(value),
        Err(_) => {
            warn!("Ignoring {}={:?}: not a valid value", key, raw);
            None
        }
    }
}

fn default_cert_path() -> PathBuf {
    certificate::default_cert_path().unwrap_or_else(|e| {
        warn!("Could not locate executable ({}), resolving certificate from cwd", e);
        certificate::cert_path_in(Path::new("."))
    })
}
