use crate::workflows::budget::{AuthorRouting, MappingMode, QuotaPolicy, DEFAULT_SUMMARY_LIMIT};
use std::env;
use std::fmt;
use std::net::{IpAddr, SocketAddr};
use std::path::PathBuf;

/// Distinguishes runtime behavior for different stages of the service.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppEnvironment {
    Development,
    Test,
    Production,
}

impl AppEnvironment {
    fn from_str(value: &str) -> Self {
        match value.trim().to_ascii_lowercase().as_str() {
            "prod" | "production" => Self::Production,
            "test" | "ci" => Self::Test,
            _ => Self::Development,
        }
    }
}

/// Top-level configuration for the application.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub environment: AppEnvironment,
    pub server: ServerConfig,
    pub telemetry: TelemetryConfig,
    pub quota: QuotaConfig,
}

impl AppConfig {
    /// Read `.env` (when present) and the process environment.
    pub fn load() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        Ok(Self {
            environment: AppEnvironment::from_str(
                non_empty_var("APP_ENV").as_deref().unwrap_or("development"),
            ),
            server: ServerConfig::from_env()?,
            telemetry: TelemetryConfig {
                log_level: non_empty_var("APP_LOG_LEVEL").unwrap_or_else(|| "info".to_string()),
            },
            quota: QuotaConfig::from_env()?,
        })
    }
}

/// Settings controlling the HTTP server binding.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

impl ServerConfig {
    fn from_env() -> Result<Self, ConfigError> {
        let port = match non_empty_var("APP_PORT") {
            Some(raw) => raw.parse::<u16>().map_err(|_| ConfigError::InvalidPort)?,
            None => 3000,
        };

        Ok(Self {
            host: non_empty_var("APP_HOST").unwrap_or_else(|| "127.0.0.1".to_string()),
            port,
        })
    }

    pub fn socket_addr(&self) -> Result<SocketAddr, ConfigError> {
        if self.host.eq_ignore_ascii_case("localhost") {
            return Ok(SocketAddr::new(IpAddr::from([127, 0, 0, 1]), self.port));
        }

        let ip: IpAddr = self
            .host
            .parse()
            .map_err(|source| ConfigError::InvalidHost { source })?;

        Ok(SocketAddr::new(ip, self.port))
    }
}

/// Tracing controls.
#[derive(Debug, Clone)]
pub struct TelemetryConfig {
    pub log_level: String,
}

/// Resolution policy plus the location of the record snapshot.
#[derive(Debug, Clone, Default)]
pub struct QuotaConfig {
    pub policy: QuotaPolicy,
    pub snapshot_dir: Option<PathBuf>,
}

impl QuotaConfig {
    fn from_env() -> Result<Self, ConfigError> {
        let summary_limit = match non_empty_var("FUND_QUOTA_SUMMARY_LIMIT") {
            Some(raw) => raw
                .parse::<usize>()
                .ok()
                .filter(|limit| *limit > 0)
                .ok_or(ConfigError::InvalidSummaryLimit { value: raw })?,
            None => DEFAULT_SUMMARY_LIMIT,
        };

        let dedicated_subcategory_id = non_empty_var("FUND_AUTHOR_ROUTED_SUBCATEGORY_ID")
            .map(|raw| {
                raw.parse::<i64>()
                    .map_err(|_| ConfigError::InvalidSubcategoryId { value: raw })
            })
            .transpose()?;

        let mapping_mode = match non_empty_var("FUND_MAPPING_MODE") {
            Some(raw) => {
                MappingMode::from_label(&raw).ok_or(ConfigError::InvalidMappingMode { value: raw })?
            }
            None => MappingMode::default(),
        };

        Ok(Self {
            policy: QuotaPolicy {
                mapping_mode,
                summary_limit,
                author_routing: AuthorRouting {
                    dedicated_subcategory_id,
                },
            },
            snapshot_dir: non_empty_var("FUND_SNAPSHOT_DIR").map(PathBuf::from),
        })
    }
}

fn non_empty_var(name: &str) -> Option<String> {
    env::var(name)
        .ok()
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
}

#[derive(Debug)]
pub enum ConfigError {
    InvalidPort,
    InvalidHost { source: std::net::AddrParseError },
    InvalidSummaryLimit { value: String },
    InvalidSubcategoryId { value: String },
    InvalidMappingMode { value: String },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::InvalidPort => write!(f, "APP_PORT must be a valid u16"),
            ConfigError::InvalidHost { .. } => {
                write!(f, "APP_HOST must parse to an IPv4 or IPv6 address")
            }
            ConfigError::InvalidSummaryLimit { value } => write!(
                f,
                "FUND_QUOTA_SUMMARY_LIMIT must be a positive integer, got '{}'",
                value
            ),
            ConfigError::InvalidSubcategoryId { value } => write!(
                f,
                "FUND_AUTHOR_ROUTED_SUBCATEGORY_ID must be an integer id, got '{}'",
                value
            ),
            ConfigError::InvalidMappingMode { value } => write!(
                f,
                "FUND_MAPPING_MODE must be 'fixed' or 'configured', got '{}'",
                value
            ),
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ConfigError::InvalidHost { source } => Some(source),
            ConfigError::InvalidPort
            | ConfigError::InvalidSummaryLimit { .. }
            | ConfigError::InvalidSubcategoryId { .. }
            | ConfigError::InvalidMappingMode { .. } => None,
        }
    }
}
