use std::env;

use auth::HashingCost;
use config::Config as ConfigBuilder;
use config::ConfigError;
use config::Environment;
use config::File;
use secrecy::ExposeSecret;
use secrecy::SecretString;
use serde::Deserialize;
use serde::Deserializer;

const MIN_SECRET_BYTES: usize = 32;
const MAX_TTL_MINUTES: i64 = 60 * 24 * 365;

#[derive(Debug, Deserialize)]
pub struct Config {
    pub database: DatabaseConfig,
    pub server: ServerConfig,
    pub jwt: JwtConfig,
    #[serde(default)]
    pub password: PasswordConfig,
    #[serde(default)]
    pub session: SessionConfig,
}

#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum DatabaseBackend {
    #[default]
    Postgres,
    Memory,
}

#[derive(Debug, Deserialize, Clone)]
pub struct DatabaseConfig {
    #[serde(default)]
    pub backend: DatabaseBackend,
    #[serde(default)]
    pub url: String,
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,
    pub http_port: u16,
}

#[derive(Debug, Deserialize)]
pub struct JwtConfig {
    #[serde(deserialize_with = "deserialize_secret")]
    pub secret: SecretString,
    pub issuer: String,
    #[serde(default = "default_ttl_minutes")]
    pub ttl_minutes: i64,
}

impl JwtConfig {
    pub fn secret_bytes(&self) -> &[u8] {
        self.secret.expose_secret().as_bytes()
    }

    pub fn ttl(&self) -> Result<chrono::Duration, ConfigError> {
        chrono::Duration::try_minutes(self.ttl_minutes).ok_or_else(|| {
            ConfigError::Message(format!(
                "jwt.ttl_minutes out of range: {}",
                self.ttl_minutes
            ))
        })
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct PasswordConfig {
    pub memory_kib: u32,
    pub iterations: u32,
    pub parallelism: u32,
}

impl Default for PasswordConfig {
    fn default() -> Self {
        let cost = HashingCost::default();
        Self {
            memory_kib: cost.memory_kib,
            iterations: cost.iterations,
            parallelism: cost.parallelism,
        }
    }
}

impl PasswordConfig {
    pub fn cost(&self) -> HashingCost {
        HashingCost {
            memory_kib: self.memory_kib,
            iterations: self.iterations,
            parallelism: self.parallelism,
        }
    }
}

/// How the session token travels between client and server.
#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum TransportKind {
    #[default]
    Cookie,
    Bearer,
}

#[derive(Debug, Deserialize, Clone)]
pub struct SessionConfig {
    #[serde(default)]
    pub transport: TransportKind,
    #[serde(default = "default_cookie_name")]
    pub cookie_name: String,
    #[serde(default = "default_cookie_path")]
    pub cookie_path: String,
    #[serde(default = "default_cookie_secure")]
    pub cookie_secure: bool,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            transport: TransportKind::default(),
            cookie_name: default_cookie_name(),
            cookie_path: default_cookie_path(),
            cookie_secure: default_cookie_secure(),
        }
    }
}

fn default_max_connections() -> u32 {
    5
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_ttl_minutes() -> i64 {
    30
}

fn default_cookie_name() -> String {
    "token".to_string()
}

fn default_cookie_path() -> String {
    "/".to_string()
}

fn default_cookie_secure() -> bool {
    true
}

fn deserialize_secret<'de, D>(deserializer: D) -> Result<SecretString, D::Error>
where
    D: Deserializer<'de>,
{
    String::deserialize(deserializer).map(SecretString::from)
}

impl Config {
    /// Load configuration from files with environment variable overrides
    ///
    /// Priority (highest to lowest):
    /// 1. Environment variables (APP_JWT__SECRET, APP_SERVER__HTTP_PORT, etc.)
    /// 2. Environment-specific config file (config/{environment}.toml)
    /// 3. Default config file (config/default.toml)
    ///
    /// The signing secret has no default and must come from the environment
    /// or a deployment-specific file.
    pub fn load() -> Result<Self, ConfigError> {
        let run_mode = env::var("RUN_MODE").unwrap_or_else(|_| "development".to_string());

        let configuration = ConfigBuilder::builder()
            .add_source(File::with_name("config/default").required(false))
            .add_source(File::with_name(&format!("config/{}", run_mode)).required(false))
            // Example: APP_JWT__SECRET=... overrides jwt.secret
            .add_source(
                Environment::with_prefix("APP")
                    .prefix_separator("_")
                    .separator("__"),
            )
            .build()?;

        Self::from_configuration(configuration)
    }

    fn from_configuration(configuration: ConfigBuilder) -> Result<Self, ConfigError> {
        let config: Config = configuration.try_deserialize()?;
        config.validate()?;
        Ok(config)
    }

    /// Reject settings the server must not start with.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let secret_len = self.jwt.secret.expose_secret().len();
        if secret_len < MIN_SECRET_BYTES {
            return Err(ConfigError::Message(format!(
                "jwt.secret must be at least {} bytes, got {}",
                MIN_SECRET_BYTES, secret_len
            )));
        }

        if self.jwt.issuer.trim().is_empty() {
            return Err(ConfigError::Message("jwt.issuer must not be empty".to_string()));
        }

        if self.jwt.ttl_minutes <= 0 || self.jwt.ttl_minutes > MAX_TTL_MINUTES {
            return Err(ConfigError::Message(format!(
                "jwt.ttl_minutes must be between 1 and {}, got {}",
                MAX_TTL_MINUTES, self.jwt.ttl_minutes
            )));
        }
        self.jwt.ttl()?;

        if self.database.backend == DatabaseBackend::Postgres && self.database.url.is_empty() {
            return Err(ConfigError::Message(
                "database.url is required for the postgres backend".to_string(),
            ));
        }

        if self.session.cookie_name.is_empty() {
            return Err(ConfigError::Message(
                "session.cookie_name must not be empty".to_string(),
            ));
        }

        Ok(())
    }
}
