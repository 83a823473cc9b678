/// Configuration management for the hostel complaints service
use crate::error::{AppError, AppResult};
use serde::{Deserialize, Serialize};
use std::env;
use std::path::PathBuf;
use std::str::FromStr;

/// Main server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    pub service: ServiceConfig,
    pub storage: StorageConfig,
    pub session: SessionConfig,
    pub branding: BrandingConfig,
    pub logging: LoggingConfig,
}

/// Service-level configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServiceConfig {
    pub hostname: String,
    pub port: u16,
    pub version: String,
}

/// Storage configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    pub data_directory: PathBuf,
    pub database_location: PathBuf,
    pub max_connections: u32,
}

/// Session cookie configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionConfig {
    #[serde(skip_serializing)]
    pub secret: String,
    pub cookie_name: String,
    pub ttl_hours: i64,
    pub cookie_secure: bool,
}

/// Names and logo shown on every page
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BrandingConfig {
    pub college_name: String,
    pub system_name: String,
    pub logo_url: String,
}

impl Default for BrandingConfig {
    fn default() -> Self {
        Self {
            college_name: "Tagore Engineering College".to_string(),
            system_name: "Hostel Complaint Management System".to_string(),
            logo_url: "https://tagore-engg.ac.in/images/tagore-logo.png".to_string(),
        }
    }
}

/// Logging output format
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    Pretty,
    Json,
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    pub level: String,
    pub format: LogFormat,
}

/// Parse an optional variable, falling back to `default` when unset
fn parse_var<T: FromStr>(
    lookup: &impl Fn(&str) -> Option<String>,
    key: &str,
    default: T,
) -> AppResult<T> {
    match lookup(key) {
        None => Ok(default),
        Some(raw) => raw
            .trim()
            .parse()
            .map_err(|_| AppError::Config(format!("Invalid value for {}: {:?}", key, raw))),
    }
}

impl ServerConfig {
    /// Load configuration from environment variables (and `.env` if present)
    pub fn from_env() -> AppResult<Self> {
        dotenv::dotenv().ok();
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build configuration from any key lookup
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> AppResult<Self> {
        let hostname = lookup("HOSTEL_HOSTNAME").unwrap_or_else(|| "127.0.0.1".to_string());
        let port = parse_var(&lookup, "HOSTEL_PORT", 5000)?;
        let version = env!("CARGO_PKG_VERSION").to_string();

        let data_directory: PathBuf = lookup("HOSTEL_DATA_DIRECTORY")
            .unwrap_or_else(|| "./data".to_string())
            .into();
        let database_location = lookup("HOSTEL_DATABASE_LOCATION")
            .map(PathBuf::from)
            .unwrap_or_else(|| data_directory.join("hostel_complaints.sqlite"));
        let max_connections = parse_var(&lookup, "HOSTEL_DATABASE_MAX_CONNECTIONS", 5)?;

        let secret = lookup("HOSTEL_SESSION_SECRET")
            .ok_or_else(|| AppError::Config("Session secret required".to_string()))?;
        let cookie_name = lookup("HOSTEL_SESSION_COOKIE_NAME")
            .unwrap_or_else(|| "hostel_session".to_string());
        let ttl_hours = parse_var(&lookup, "HOSTEL_SESSION_TTL_HOURS", 12)?;
        let cookie_secure = parse_var(&lookup, "HOSTEL_SESSION_COOKIE_SECURE", false)?;

        let defaults = BrandingConfig::default();
        let branding = BrandingConfig {
            college_name: lookup("HOSTEL_COLLEGE_NAME").unwrap_or(defaults.college_name),
            system_name: lookup("HOSTEL_SYSTEM_NAME").unwrap_or(defaults.system_name),
            logo_url: lookup("HOSTEL_LOGO_URL").unwrap_or(defaults.logo_url),
        };

        let level = lookup("RUST_LOG")
            .unwrap_or_else(|| "hostel_complaints=info,tower_http=info".to_string());
        let format = match lookup("HOSTEL_LOG_FORMAT").as_deref() {
            None | Some("pretty") => LogFormat::Pretty,
            Some("json") => LogFormat::Json,
            Some(other) => {
                return Err(AppError::Config(format!("Unknown log format: {}", other)));
            }
        };

        Ok(ServerConfig {
            service: ServiceConfig {
                hostname,
                port,
                version,
            },
            storage: StorageConfig {
                data_directory,
                database_location,
                max_connections,
            },
            session: SessionConfig {
                secret,
                cookie_name,
                ttl_hours,
                cookie_secure,
            },
            branding,
            logging: LoggingConfig { level, format },
        })
    }

    /// Validate configuration
    pub fn validate(&self) -> AppResult<()> {
        if self.service.hostname.is_empty() {
            return Err(AppError::Config("Hostname cannot be empty".to_string()));
        }

        if self.session.secret.len() < 32 {
            return Err(AppError::Config(
                "Session secret must be at least 32 characters".to_string(),
            ));
        }

        if self.session.ttl_hours <= 0 {
            return Err(AppError::Config(
                "Session lifetime must be at least one hour".to_string(),
            ));
        }

        if self.session.cookie_name.is_empty() {
            return Err(AppError::Config("Session cookie name cannot be empty".to_string()));
        }

        if self.storage.max_connections == 0 {
            return Err(AppError::Config(
                "Database needs at least one connection".to_string(),
            ));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    const SECRET: &str = "0123456789abcdef0123456789abcdef";

    #[test]
    fn test_defaults() {
        let config = ServerConfig::from_lookup(lookup_from(&[("HOSTEL_SESSION_SECRET", SECRET)]))
            .unwrap();
        assert_eq!(config.service.hostname, "127.0.0.1");
        assert_eq!(config.service.port, 5000);
        assert_eq!(
            config.storage.database_location,
            PathBuf::from("./data").join("hostel_complaints.sqlite")
        );
        assert_eq!(config.session.cookie_name, "hostel_session");
        assert_eq!(config.session.ttl_hours, 12);
        assert!(!config.session.cookie_secure);
        assert_eq!(config.branding, BrandingConfig::default());
        assert_eq!(config.logging.format, LogFormat::Pretty);
        config.validate().unwrap();
    }

    #[test]
    fn test_overrides() {
        let config = ServerConfig::from_lookup(lookup_from(&[
            ("HOSTEL_SESSION_SECRET", SECRET),
            ("HOSTEL_PORT", "8080"),
            ("HOSTEL_DATA_DIRECTORY", "/var/lib/hostel"),
            ("HOSTEL_COLLEGE_NAME", "Example College"),
            ("HOSTEL_LOG_FORMAT", "json"),
        ]))
        .unwrap();
        assert_eq!(config.service.port, 8080);
        assert_eq!(
            config.storage.database_location,
            PathBuf::from("/var/lib/hostel/hostel_complaints.sqlite")
        );
        assert_eq!(config.branding.college_name, "Example College");
        assert_eq!(config.logging.format, LogFormat::Json);
    }

    #[test]
    fn test_missing_secret_is_rejected() {
        assert!(matches!(
            ServerConfig::from_lookup(lookup_from(&[])),
            Err(AppError::Config(_))
        ));
    }

    #[test]
    fn test_bad_port_is_rejected() {
        let result = ServerConfig::from_lookup(lookup_from(&[
            ("HOSTEL_SESSION_SECRET", SECRET),
            ("HOSTEL_PORT", "not-a-port"),
        ]));
        assert!(matches!(result, Err(AppError::Config(_))));

        let result = ServerConfig::from_lookup(lookup_from(&[
            ("HOSTEL_SESSION_SECRET", SECRET),
            ("HOSTEL_SESSION_COOKIE_SECURE", "yes"),
        ]));
        assert!(matches!(result, Err(AppError::Config(_))));
    }

    #[test]
    fn test_short_secret_fails_validation() {
        let config =
            ServerConfig::from_lookup(lookup_from(&[("HOSTEL_SESSION_SECRET", "short")])).unwrap();
        assert!(config.validate().is_err());
    }
}
