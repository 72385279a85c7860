/// Configuration management for MIRA
use crate::error::{MiraError, MiraResult};
use serde::{Deserialize, Serialize};
use std::env;
use std::path::PathBuf;

/// Main server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    pub service: ServiceConfig,
    pub storage: StorageConfig,
    pub session: SessionConfig,
    pub video_host: Option<VideoHostConfig>,
    /// Account promoted to admin at startup
    pub bootstrap_admin: Option<AdminBootstrap>,
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
    pub database: PathBuf,
}

/// Session token configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionConfig {
    pub secret: String,
    pub ttl_hours: i64,
}

/// Mux credentials and upload settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VideoHostConfig {
    pub api_url: String,
    pub token_id: String,
    pub token_secret: String,
    /// Origin allowed to PUT the file to a direct upload URL
    pub upload_cors_origin: String,
}

/// Admin account ensured on startup
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AdminBootstrap {
    pub email: String,
    pub name: Option<String>,
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    pub level: String,
}

impl ServerConfig {
    /// Load configuration from environment variables
    pub fn from_env() -> MiraResult<Self> {
        dotenv::dotenv().ok();

        let hostname = env::var("MIRA_HOSTNAME").unwrap_or_else(|_| "localhost".to_string());
        let port = env::var("MIRA_PORT")
            .unwrap_or_else(|_| "3000".to_string())
            .parse()
            .map_err(|_| MiraError::Validation("Invalid port number".to_string()))?;
        let version = env!("CARGO_PKG_VERSION").to_string();

        let data_directory: PathBuf = env::var("MIRA_DATA_DIRECTORY")
            .unwrap_or_else(|_| "./data".to_string())
            .into();
        let database = env::var("MIRA_DATABASE_PATH")
            .map(PathBuf::from)
            .unwrap_or_else(|_| data_directory.join("mira.sqlite"));

        let secret = env::var("MIRA_SESSION_SECRET")
            .map_err(|_| MiraError::Validation("Session secret required".to_string()))?;
        let ttl_hours = env::var("MIRA_SESSION_TTL_HOURS")
            .unwrap_or_else(|_| "720".to_string())
            .parse()
            .unwrap_or(720);

        let video_host = match (env::var("MUX_TOKEN_ID"), env::var("MUX_TOKEN_SECRET")) {
            (Ok(token_id), Ok(token_secret)) => Some(VideoHostConfig {
                api_url: env::var("MUX_API_URL")
                    .unwrap_or_else(|_| "https://api.mux.com".to_string()),
                token_id,
                token_secret,
                upload_cors_origin: env::var("MIRA_UPLOAD_CORS_ORIGIN")
                    .unwrap_or_else(|_| "*".to_string()),
            }),
            _ => None,
        };

        let bootstrap_admin = env::var("MIRA_ADMIN_EMAIL")
            .ok()
            .filter(|email| !email.trim().is_empty())
            .map(|email| AdminBootstrap {
                email: email.trim().to_string(),
                name: env::var("MIRA_ADMIN_NAME").ok(),
            });

        let log_level = env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string());

        Ok(ServerConfig {
            service: ServiceConfig {
                hostname,
                port,
                version,
            },
            storage: StorageConfig {
                data_directory,
                database,
            },
            session: SessionConfig { secret, ttl_hours },
            video_host,
            bootstrap_admin,
            logging: LoggingConfig { level: log_level },
        })
    }

    /// Validate configuration
    pub fn validate(&self) -> MiraResult<()> {
        if self.service.hostname.is_empty() {
            return Err(MiraError::Validation("Hostname cannot be empty".to_string()));
        }

        if self.session.secret.len() < 32 {
            return Err(MiraError::Validation(
                "Session secret must be at least 32 characters".to_string(),
            ));
        }

        Ok(())
    }

    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.service.hostname, self.service.port)
    }

    /// Configuration for tests: in-memory database, no video host
    pub fn for_tests(secret: &str) -> Self {
        ServerConfig {
            service: ServiceConfig {
                hostname: "localhost".to_string(),
                port: 0,
                version: env!("CARGO_PKG_VERSION").to_string(),
            },
            storage: StorageConfig {
                data_directory: PathBuf::from("."),
                database: PathBuf::from(":memory:"),
            },
            session: SessionConfig {
                secret: secret.to_string(),
                ttl_hours: 1,
            },
            video_host: None,
            bootstrap_admin: None,
            logging: LoggingConfig {
                level: "debug".to_string(),
            },
        }
    }
}
