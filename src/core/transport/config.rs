//! Transport configuration types.

use serde::{Deserialize, Serialize};

/// Transport configuration options.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum TransportConfig {
    /// Standard input/output transport.
    #[cfg(feature = "stdio")]
    Stdio,

    /// HTTP transport with JSON-RPC over POST.
    #[cfg(feature = "http")]
    Http(HttpConfig),
}

/// HTTP transport configuration.
#[cfg(feature = "http")]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HttpConfig {
    /// Host address to bind to.
    pub host: String,

    /// Port number to listen on.
    pub port: u16,

    /// Path for the JSON-RPC endpoint.
    pub rpc_path: String,

    /// Allowed CORS origins; `*` allows any origin, an empty list disables CORS.
    pub cors_origins: Vec<String>,

    /// Maximum request body size in bytes.
    pub max_request_size: usize,
}

#[cfg(feature = "http")]
impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8000,
            rpc_path: "/mcp".to_string(),
            cors_origins: vec!["*".to_string()],
            max_request_size: 10 * 1024 * 1024,
        }
    }
}

impl Default for TransportConfig {
    fn default() -> Self {
        #[cfg(feature = "http")]
        {
            Self::Http(HttpConfig::default())
        }

        #[cfg(all(not(feature = "http"), feature = "stdio"))]
        {
            Self::Stdio
        }

        #[cfg(not(any(feature = "stdio", feature = "http")))]
        {
            compile_error!("At least one transport feature must be enabled: stdio or http");
        }
    }
}

impl TransportConfig {
    /// Create a STDIO transport config.
    #[cfg(feature = "stdio")]
    pub fn stdio() -> Self {
        Self::Stdio
    }

    /// Create an HTTP transport config.
    #[cfg(feature = "http")]
    pub fn http(port: u16, host: impl Into<String>) -> Self {
        Self::Http(HttpConfig {
            port,
            host: host.into(),
            ..Default::default()
        })
    }

    /// Build a transport from its name (`stdio` or `http`), keeping the
    /// HTTP settings of `self` when switching to HTTP.
    pub fn with_kind(self, kind: &str) -> Option<Self> {
        match kind.to_lowercase().as_str() {
            #[cfg(feature = "stdio")]
            "stdio" => Some(Self::Stdio),
            #[cfg(feature = "http")]
            "http" => Some(match self {
                Self::Http(cfg) => Self::Http(cfg),
                #[allow(unreachable_patterns)]
                _ => Self::Http(HttpConfig::default()),
            }),
            _ => None,
        }
    }

    /// HTTP settings, if this is the HTTP transport.
    #[cfg(feature = "http")]
    pub fn http_mut(&mut self) -> Option<&mut HttpConfig> {
        match self {
            Self::Http(cfg) => Some(cfg),
            #[allow(unreachable_patterns)]
            _ => None,
        }
    }

    /// Get a description of this transport for logging.
    pub fn description(&self) -> String {
        match self {
            #[cfg(feature = "stdio")]
            Self::Stdio => "STDIO (standard MCP mode)".to_string(),
            #[cfg(feature = "http")]
            Self::Http(cfg) => format!("HTTP on {}:{}{}", cfg.host, cfg.port, cfg.rpc_path),
        }
    }

    /// Check if this transport is the standard STDIO mode.
    pub fn is_stdio(&self) -> bool {
        #[cfg(feature = "stdio")]
        {
            matches!(self, Self::Stdio)
        }
        #[cfg(not(feature = "stdio"))]
        {
            false
        }
    }
}

#[cfg(all(test, feature = "stdio", feature = "http"))]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_http() {
        let config = TransportConfig::default();
        assert!(!config.is_stdio());
        assert_eq!(config.description(), "HTTP on 0.0.0.0:8000/mcp");
    }

    #[test]
    fn test_with_kind_keeps_http_settings() {
        let config = TransportConfig::http(9000, "127.0.0.1");
        let same = config.with_kind("HTTP").unwrap();
        assert_eq!(same.description(), "HTTP on 127.0.0.1:9000/mcp");

        let stdio = TransportConfig::default().with_kind("stdio").unwrap();
        assert!(stdio.is_stdio());
        let back = stdio.with_kind("http").unwrap();
        assert_eq!(back.description(), "HTTP on 0.0.0.0:8000/mcp");

        assert!(TransportConfig::default().with_kind("tcp").is_none());
    }

    #[test]
    fn test_serde_shape() {
        let json = r#"{"type": "http", "port": 9001}"#;
        let config: TransportConfig = serde_json::from_str(json).unwrap();
        match config {
            TransportConfig::Http(http) => {
                assert_eq!(http.port, 9001);
                assert_eq!(http.rpc_path, "/mcp");
                assert_eq!(http.cors_origins, vec!["*"]);
            }
            TransportConfig::Stdio => panic!("expected http"),
        }
    }
}
