//! # DevCamper Config
//!
//! Configuration loaded once from environment variables at startup.
//!
//! - [`server`]: port, environment and public base URL
//! - [`database`]: connection string and pool size
//! - [`jwt`]: token secret and lifetimes
//! - [`email`]: SMTP settings
//! - [`cors`]: allowed origins
//! - [`upload`]: photo upload directory and size ceiling
//! - [`geocoder`]: geocoding provider settings
//!
//! ```ignore
//! use devcamper_config::AppConfig;
//!
//! dotenvy::dotenv().ok();
//! let config = AppConfig::from_env()?;
//! ```

pub mod cors;
pub mod database;
pub mod email;
pub mod geocoder;
pub mod jwt;
pub mod server;
pub mod upload;

pub use cors::CorsConfig;
pub use database::DatabaseConfig;
pub use email::EmailConfig;
pub use geocoder::GeocoderConfig;
pub use jwt::JwtConfig;
pub use server::{Environment, ServerConfig};
pub use upload::UploadConfig;

#[derive(Clone, Debug)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub jwt: JwtConfig,
    pub email: EmailConfig,
    pub cors: CorsConfig,
    pub upload: UploadConfig,
    pub geocoder: GeocoderConfig,
}

impl AppConfig {
    /// Reads every section from the environment.
    ///
    /// Fails only when a required variable (`DATABASE_URL`) is missing.
    pub fn from_env() -> Result<Self, ConfigError> {
        let server = ServerConfig::from_env();
        Ok(Self {
            database: DatabaseConfig::from_env()?,
            jwt: JwtConfig::from_env(),
            email: EmailConfig::from_env(),
            cors: CorsConfig::from_env(),
            upload: UploadConfig::from_env(),
            geocoder: GeocoderConfig::from_env(),
            server,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    Missing(&'static str),
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Missing(var) => write!(f, "{} must be set", var),
        }
    }
}

impl std::error::Error for ConfigError {}
