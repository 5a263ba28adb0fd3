//! `[server]` configuration.

use std::net::{IpAddr, Ipv4Addr, SocketAddr};

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServerSettings {
    #[serde(default = "ServerSettings::default_bind_address", alias = "bind")]
    pub bind_address: IpAddr,
    #[serde(default = "ServerSettings::default_port")]
    pub port: u16,
    /// Prefix of every route, e.g. `/webterm`.
    #[serde(default = "ServerSettings::default_base_path")]
    pub base_path: String,
    #[serde(default)]
    pub enable_cors: bool,
    /// Allowed origins when CORS is enabled; empty allows any origin.
    #[serde(default)]
    pub allow_origins: Vec<String>,
    #[serde(default = "ServerSettings::default_max_request_body_size")]
    pub max_request_body_size: usize,
    /// Header carrying the user name set by a trusted reverse proxy.
    #[serde(default)]
    pub trusted_user_header: Option<String>,
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            bind_address: Self::default_bind_address(),
            port: Self::default_port(),
            base_path: Self::default_base_path(),
            enable_cors: false,
            allow_origins: Vec::new(),
            max_request_body_size: Self::default_max_request_body_size(),
            trusted_user_header: None,
        }
    }
}

impl ServerSettings {
    const fn default_bind_address() -> IpAddr {
        IpAddr::V4(Ipv4Addr::LOCALHOST)
    }

    const fn default_port() -> u16 {
        8080
    }

    fn default_base_path() -> String {
        "/webterm".to_string()
    }

    const fn default_max_request_body_size() -> usize {
        5 * 1024 * 1024
    }

    #[must_use]
    pub fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.bind_address, self.port)
    }

    /// Base path with a leading slash and no trailing slash; empty for the
    /// root.
    #[must_use]
    pub fn normalized_base_path(&self) -> String {
        let trimmed = self.base_path.trim().trim_matches('/');
        if trimmed.is_empty() {
            String::new()
        } else {
            format!("/{trimmed}")
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let settings: ServerSettings = toml::from_str("").unwrap();
        assert_eq!(settings, ServerSettings::default());
        assert_eq!(settings.socket_addr().to_string(), "127.0.0.1:8080");
        assert_eq!(settings.max_request_body_size, 5 * 1024 * 1024);
    }

    #[test]
    fn base_path_normalization() {
        let mut settings = ServerSettings::default();
        for (raw, expected) in [
            ("/webterm", "/webterm"),
            ("webterm/", "/webterm"),
            ("/a/b/", "/a/b"),
            ("/", ""),
            ("", ""),
        ] {
            settings.base_path = raw.to_string();
            assert_eq!(settings.normalized_base_path(), expected, "{raw:?}");
        }
    }

    #[test]
    fn parses_overrides() {
        let settings: ServerSettings = toml::from_str(
            r#"
            bind_address = "0.0.0.0"
            port = 9000
            enable_cors = true
            allow_origins = ["https://example.org"]
            trusted_user_header = "x-forwarded-user"
            "#,
        )
        .unwrap();
        assert_eq!(settings.socket_addr().to_string(), "0.0.0.0:9000");
        assert!(settings.enable_cors);
        assert_eq!(settings.trusted_user_header.as_deref(), Some("x-forwarded-user"));
    }
}
