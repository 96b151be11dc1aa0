use std::fmt;

/// Port the chat server listens on unless told otherwise.
pub const DEFAULT_PORT: u16 = 8443;

/// Host and port of the chat server. Immutable once built.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Endpoint {
    host: String,
    port: u16,
}

impl Endpoint {
    pub fn new(host: impl Into<String>, port: u16) -> Self {
        Self {
            host: host.into(),
            port,
        }
    }

    pub fn host(&self) -> &str {
        &self.host
    }

    pub fn port(&self) -> u16 {
        self.port
    }
}

impl fmt::Display for Endpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.host, self.port)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_joins_host_and_port() {
        let endpoint = Endpoint::new("localhost", DEFAULT_PORT);
        assert_eq!(endpoint.to_string(), "localhost:8443");
    }

    #[test]
    fn test_accessors() {
        let endpoint = Endpoint::new("172.17.8.200".to_string(), 9000);
        assert_eq!(endpoint.host(), "172.17.8.200");
        assert_eq!(endpoint.port(), 9000);
    }
}
