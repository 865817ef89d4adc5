use serde::{Deserialize, Serialize};
use std::env;
use std::time::Duration;
use thiserror::Error;

/// Development-only signing key; production refuses to start without JWT_SECRET.
const DEV_JWT_SECRET: &str = "items-api-development-secret";

pub const MAX_JWT_EXPIRY_HOURS: u64 = 24 * 365 * 10;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("{0} not set in environment")]
    Missing(&'static str),

    #[error("Invalid value for {name}: {value}")]
    Invalid { name: &'static str, value: String },
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    pub environment: Environment,
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub security: SecurityConfig,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Environment {
    Development,
    Production,
}

impl Environment {
    /// Reads `ENVIRONMENT`; anything other than "production" is development.
    pub fn from_env() -> Self {
        match env::var("ENVIRONMENT") {
            Ok(v) if v.eq_ignore_ascii_case("production") => Environment::Production,
            _ => Environment::Development,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

impl ServerConfig {
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum StoreBackend {
    Mongo,
    Memory,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    pub backend: StoreBackend,
    pub host: String,
    pub port: u16,
    pub user: Option<String>,
    #[serde(skip_serializing)]
    pub password: Option<String>,
    pub database: String,
    pub collection: String,
    /// Upper bound for every individual store call, in seconds
    pub call_timeout_secs: u64,
}

impl DatabaseConfig {
    /// Local hosts get a plain `mongodb://` URI; anything else is treated as an
    /// SRV cluster address.
    pub fn connection_uri(&self) -> String {
        if self.host.eq_ignore_ascii_case("localhost") {
            format!("mongodb://{}:{}", self.host, self.port)
        } else {
            format!("mongodb+srv://{}/?retryWrites=true&w=majority", self.host)
        }
    }

    pub fn call_timeout(&self) -> Duration {
        Duration::from_secs(self.call_timeout_secs)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SecurityConfig {
    #[serde(skip_serializing)]
    pub jwt_secret: String,
    pub jwt_expiry_hours: u64,
    /// Empty means any origin
    pub cors_origins: Vec<String>,
}

impl AppConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        let environment = Environment::from_env();

        let database = env::var("MONGO_DB")
            .ok()
            .filter(|v| !v.is_empty())
            .ok_or(ConfigError::Missing("MONGO_DB"))?;

        let jwt_secret = match (env::var("JWT_SECRET").ok().filter(|v| !v.is_empty()), environment) {
            (Some(secret), _) => secret,
            (None, Environment::Development) => DEV_JWT_SECRET.to_string(),
            (None, Environment::Production) => return Err(ConfigError::Missing("JWT_SECRET")),
        };

        let backend = match env::var("STORE_BACKEND").as_deref() {
            Ok("memory") => StoreBackend::Memory,
            Ok("mongo") | Ok("mongodb") | Err(_) => StoreBackend::Mongo,
            Ok(other) => {
                return Err(ConfigError::Invalid {
                    name: "STORE_BACKEND",
                    value: other.to_string(),
                })
            }
        };

        let mut config = Self::defaults(environment, database, jwt_secret);
        config.database.backend = backend;
        config.with_env_overrides()
    }

    fn defaults(environment: Environment, database: String, jwt_secret: String) -> Self {
        Self {
            environment,
            server: ServerConfig {
                host: "0.0.0.0".to_string(),
                port: 8080,
            },
            database: DatabaseConfig {
                backend: StoreBackend::Mongo,
                host: "localhost".to_string(),
                port: 27017,
                user: None,
                password: None,
                database,
                collection: "items".to_string(),
                call_timeout_secs: 10,
            },
            security: SecurityConfig {
                jwt_secret,
                jwt_expiry_hours: 24,
                cors_origins: Vec::new(),
            },
        }
    }

    fn with_env_overrides(mut self) -> Result<Self, ConfigError> {
        // Server overrides
        if let Some(v) = non_empty("PORT") {
            self.server.port = parse_var("PORT", &v)?;
        }

        // Database overrides
        if let Some(v) = non_empty("MONGO_HOST") {
            self.database.host = v;
        }
        if let Some(v) = non_empty("MONGO_PORT") {
            self.database.port = parse_var("MONGO_PORT", &v)?;
        }
        self.database.user = non_empty("MONGO_USER");
        self.database.password = non_empty("MONGO_PASS");
        if let Some(v) = non_empty("MONGO_TIMEOUT_SECS") {
            self.database.call_timeout_secs = parse_var("MONGO_TIMEOUT_SECS", &v)?;
        }

        // Security overrides
        if let Some(v) = non_empty("JWT_EXPIRY_HOURS") {
            self.security.jwt_expiry_hours = parse_expiry_hours(&v)?;
        }
        if let Some(v) = non_empty("CORS_ORIGINS") {
            self.security.cors_origins = v
                .split(',')
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty() && s != "*")
                .collect();
        }

        Ok(self)
    }
}

/// Token lifetime must be at least an hour and at most ten years.
fn parse_expiry_hours(value: &str) -> Result<u64, ConfigError> {
    let hours: u64 = parse_var("JWT_EXPIRY_HOURS", value)?;
    if (1..=MAX_JWT_EXPIRY_HOURS).contains(&hours) {
        Ok(hours)
    } else {
        Err(ConfigError::Invalid {
            name: "JWT_EXPIRY_HOURS",
            value: value.to_string(),
        })
    }
}

fn non_empty(name: &str) -> Option<String> {
    env::var(name).ok().filter(|v| !v.trim().is_empty())
}

fn parse_var<T: std::str::FromStr>(name: &'static str, value: &str) -> Result<T, ConfigError> {
    value.trim().parse().map_err(|_| ConfigError::Invalid {
        name,
        value: value.to_string(),
    })
}
