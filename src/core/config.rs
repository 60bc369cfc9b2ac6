//! Configuration management for the MCP server.
//!
//! Configuration is layered, later layers overriding earlier ones:
//!
//! 1. Built-in defaults
//! 2. The config path (`--config`, else `CONFIG_PATH`, else `./config`).
//!    A directory may hold `config.json` (a whole config) and the section
//!    files `branding.json`, `server.json`, `docs.json` and `prompts.json`.
//!    A file is read as a whole config.
//! 3. Environment variables (a `.env` file is loaded first)
//!
//! CLI flags are applied on top by the binary.

use std::fs;
use std::path::{Path, PathBuf};

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use super::error::{Error, Result};
use super::transport::TransportConfig;
#[cfg(feature = "http")]
use super::transport::HttpConfig;

/// Default config location when neither `--config` nor `CONFIG_PATH` is set.
pub const DEFAULT_CONFIG_PATH: &str = "./config";

/// Main configuration structure for the MCP server.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Server identification and metadata.
    pub server: ServerConfig,

    /// Presentation details shown to clients.
    pub branding: BrandingConfig,

    /// Logging configuration.
    pub logging: LoggingConfig,

    /// Transport configuration.
    pub transport: TransportConfig,

    /// Tools domain configuration.
    pub tools: ToolsConfig,

    /// Resources domain configuration.
    pub resources: ResourcesConfig,

    /// Prompts domain configuration.
    pub prompts: PromptsConfig,

    /// Weather API client configuration.
    pub weather: WeatherConfig,

    /// External API credentials configuration.
    #[serde(skip_serializing)]
    pub credentials: CredentialsConfig,
}

/// Server identification configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// The name of the server as reported to clients.
    pub name: String,

    /// The version of the server.
    pub version: String,

    /// Debug mode forces the `debug` log level.
    pub debug: bool,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            name: "aytch-mcp".to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
            debug: false,
        }
    }
}

/// Branding configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BrandingConfig {
    pub name: String,
    pub description: String,
    pub logo_url: Option<String>,
    /// Primary brand color (hex).
    pub primary_color: String,
    /// Secondary brand color (hex).
    pub secondary_color: String,
}

impl Default for BrandingConfig {
    fn default() -> Self {
        Self {
            name: "Aytch4K MCP".to_string(),
            description: "Aytch4K Model Context Protocol Server".to_string(),
            logo_url: None,
            primary_color: "#4A90E2".to_string(),
            secondary_color: "#50E3C2".to_string(),
        }
    }
}

/// Logging configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level filter (e.g., "info", "debug", "trace").
    pub level: String,

    /// Whether to include timestamps in log output.
    pub with_timestamps: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            with_timestamps: true,
        }
    }
}

/// Configuration for the tools domain.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ToolsConfig {
    /// Names of the tools to register.
    pub enabled: Vec<String>,

    pub calculator: CalculatorConfig,
}

impl Default for ToolsConfig {
    fn default() -> Self {
        Self {
            enabled: vec![
                "echo".to_string(),
                "weather".to_string(),
                "calculator".to_string(),
            ],
            calculator: CalculatorConfig::default(),
        }
    }
}

/// Limits and defaults of the calculator tool.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CalculatorConfig {
    /// Decimal places used when a call gives no precision.
    pub default_precision: u32,

    /// Longest accepted expression, in characters.
    pub max_expression_length: usize,

    /// Deepest accepted nesting of parentheses and unary operators.
    pub max_nesting_depth: usize,
}

impl Default for CalculatorConfig {
    fn default() -> Self {
        Self {
            default_precision: 6,
            max_expression_length: 1000,
            max_nesting_depth: 64,
        }
    }
}

/// Configuration for the resources domain.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ResourcesConfig {
    /// Names of the resources to register.
    pub enabled: Vec<String>,

    /// Directory served by the documentation resource.
    pub docs_dir: PathBuf,
}

impl Default for ResourcesConfig {
    fn default() -> Self {
        Self {
            enabled: vec!["system_info".to_string(), "documentation".to_string()],
            docs_dir: PathBuf::from("./docs"),
        }
    }
}

/// Configuration for the prompts domain.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PromptsConfig {
    /// Directory scanned for `*.json` and `*.txt` prompt templates.
    pub prompts_dir: PathBuf,
}

impl Default for PromptsConfig {
    fn default() -> Self {
        Self {
            prompts_dir: PathBuf::from("./prompts"),
        }
    }
}

/// Configuration of the OpenWeatherMap client.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct WeatherConfig {
    pub api_base_url: String,

    /// Per-request timeout.
    pub timeout_secs: u64,
}

impl Default for WeatherConfig {
    fn default() -> Self {
        Self {
            api_base_url: "https://api.openweathermap.org/data/2.5".to_string(),
            timeout_secs: 10,
        }
    }
}

/// Configuration for external API credentials.
#[derive(Clone, Default, Deserialize)]
#[serde(default)]
pub struct CredentialsConfig {
    /// OpenWeatherMap API key. Without it the weather tool serves mock data.
    pub openweather_api_key: Option<String>,
}

/// Custom Debug implementation to redact secrets from logs.
impl std::fmt::Debug for CredentialsConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CredentialsConfig")
            .field(
                "openweather_api_key",
                &self.openweather_api_key.as_ref().map(|_| "[REDACTED]"),
            )
            .finish()
    }
}

/// Contents of `server.json`: the HTTP settings plus logging switches.
#[cfg(feature = "http")]
#[derive(Debug, Default, Serialize, Deserialize)]
#[serde(default)]
struct ServerFile {
    #[serde(flatten)]
    http: HttpConfig,
    #[serde(skip_serializing_if = "Option::is_none")]
    log_level: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    debug: Option<bool>,
}

/// Contents of `docs.json`.
#[derive(Debug, Deserialize)]
struct DocsFile {
    docs_dir: PathBuf,
}

fn read_json<T: DeserializeOwned>(path: &Path) -> Result<T> {
    let raw = fs::read_to_string(path)?;
    serde_json::from_str(&raw)
        .map_err(|e| Error::config(format!("{}: {}", path.display(), e)))
}

fn write_json<T: Serialize>(path: &Path, value: &T) -> Result<()> {
    let text = serde_json::to_string_pretty(value)?;
    fs::write(path, text + "\n")?;
    Ok(())
}

fn parse_bool(value: &str) -> bool {
    matches!(value.to_lowercase().as_str(), "true" | "1" | "yes")
}

impl Config {
    /// Create a new configuration with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Load the full layered configuration.
    ///
    /// `path` overrides `CONFIG_PATH`. A missing path only yields defaults.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        dotenvy::dotenv().ok();

        let path = match path {
            Some(path) => path.to_path_buf(),
            None => std::env::var_os("CONFIG_PATH")
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_PATH)),
        };

        let mut config = Self::from_path(&path)?;
        config.apply_env();
        Ok(config)
    }

    /// Load configuration from a directory or a single file, without the
    /// environment layer.
    pub fn from_path(path: &Path) -> Result<Self> {
        if path.is_file() {
            info!("Loading configuration from {}", path.display());
            return read_json(path);
        }
        if !path.is_dir() {
            debug!("No configuration at {}, using defaults", path.display());
            return Ok(Self::default());
        }

        info!("Loading configuration from directory {}", path.display());
        let mut config = Self::default();

        let main = path.join("config.json");
        if main.is_file() {
            config = read_json(&main)?;
        }

        let branding = path.join("branding.json");
        if branding.is_file() {
            config.branding = read_json(&branding)?;
        }

        #[cfg(feature = "http")]
        {
            let server = path.join("server.json");
            if server.is_file() {
                let file: ServerFile = read_json(&server)?;
                config.transport = TransportConfig::Http(file.http);
                if let Some(level) = file.log_level {
                    config.logging.level = level.to_lowercase();
                }
                if let Some(debug) = file.debug {
                    config.server.debug = debug;
                }
            }
        }

        let docs = path.join("docs.json");
        if docs.is_file() {
            let file: DocsFile = read_json(&docs)?;
            config.resources.docs_dir = file.docs_dir;
        }

        let prompts = path.join("prompts.json");
        if prompts.is_file() {
            config.prompts = read_json(&prompts)?;
        }

        Ok(config)
    }

    /// Override settings from `MCP_*` and `OPENWEATHER_API_KEY` variables.
    pub fn apply_env(&mut self) {
        let var = |name: &str| std::env::var(name).ok().filter(|v| !v.is_empty());

        if let Some(name) = var("MCP_SERVER_NAME") {
            self.server.name = name;
        }
        if let Some(level) = var("MCP_LOG_LEVEL") {
            self.logging.level = level.to_lowercase();
        }
        if let Some(debug) = var("MCP_DEBUG") {
            self.server.debug = parse_bool(&debug);
        }

        if let Some(kind) = var("MCP_TRANSPORT") {
            match self.transport.clone().with_kind(&kind) {
                Some(transport) => self.transport = transport,
                None => warn!("Ignoring unsupported MCP_TRANSPORT value: {}", kind),
            }
        }

        #[cfg(feature = "http")]
        if let Some(http) = self.transport.http_mut() {
            if let Some(host) = var("MCP_HOST") {
                http.host = host;
            }
            if let Some(port) = var("MCP_PORT") {
                match port.parse() {
                    Ok(port) => http.port = port,
                    Err(_) => warn!("Ignoring invalid MCP_PORT value: {}", port),
                }
            }
            if let Some(path) = var("MCP_HTTP_PATH") {
                http.rpc_path = path;
            }
            if let Some(origins) = var("MCP_CORS_ORIGINS") {
                http.cors_origins = origins
                    .split(',')
                    .map(str::trim)
                    .filter(|o| !o.is_empty())
                    .map(str::to_string)
                    .collect();
            }
        }

        if let Some(key) = var("OPENWEATHER_API_KEY") {
            self.credentials.openweather_api_key = Some(key);
            info!("OpenWeatherMap API key loaded from environment");
        }
    }

    /// The log level to use, taking debug mode into account.
    pub fn effective_log_level(&self) -> &str {
        if self.server.debug {
            "debug"
        } else {
            &self.logging.level
        }
    }

    /// Write default `config.json`, `branding.json` and `server.json` into
    /// `dir`, creating it if needed. Returns the written paths.
    pub fn write_defaults(dir: &Path) -> Result<Vec<PathBuf>> {
        fs::create_dir_all(dir)?;
        let mut written = Vec::new();

        let main = dir.join("config.json");
        write_json(&main, &Self::default())?;
        written.push(main);

        let branding = dir.join("branding.json");
        write_json(&branding, &BrandingConfig::default())?;
        written.push(branding);

        #[cfg(feature = "http")]
        {
            let server = dir.join("server.json");
            let file = ServerFile {
                log_level: Some(LoggingConfig::default().level),
                debug: Some(false),
                ..ServerFile::default()
            };
            write_json(&server, &file)?;
            written.push(server);
        }

        Ok(written)
    }
}
