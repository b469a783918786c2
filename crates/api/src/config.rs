use std::fmt::Display;
use std::net::SocketAddr;
use std::str::FromStr;
use std::time::Duration;

use crate::auth::jwt::JwtConfig;

/// Default SQLite location, created on first start.
pub const DEFAULT_DATABASE_URL: &str = "sqlite://templates.db?mode=rwc";

/// Process configuration, read once at startup.
///
/// | Env Var                | Default                          |
/// |------------------------|----------------------------------|
/// | `HOST`                 | `0.0.0.0`                        |
/// | `PORT`                 | `3000`                           |
/// | `CORS_ORIGINS`         | `http://localhost:5173`          |
/// | `REQUEST_TIMEOUT_SECS` | `30`                             |
/// | `DATABASE_URL`         | `sqlite://templates.db?mode=rwc` |
///
/// Token settings come from [`JwtConfig::from_env`] and SMTP settings from
/// `stencil_mailer::MailConfig::from_env`.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    /// Browser origins allowed to call the API (comma-separated in the env).
    pub cors_origins: Vec<String>,
    pub request_timeout_secs: u64,
    pub database_url: String,
    pub jwt: JwtConfig,
}

impl ServerConfig {
    /// # Panics
    ///
    /// Panics if `PORT` or `REQUEST_TIMEOUT_SECS` is set but does not parse.
    pub fn from_env() -> Self {
        Self {
            host: env_or("HOST", "0.0.0.0".to_string()),
            port: env_or("PORT", 3000),
            cors_origins: parse_origins(
                &std::env::var("CORS_ORIGINS").unwrap_or_else(|_| "http://localhost:5173".into()),
            ),
            request_timeout_secs: env_or("REQUEST_TIMEOUT_SECS", 30),
            database_url: env_or("DATABASE_URL", DEFAULT_DATABASE_URL.to_string()),
            jwt: JwtConfig::from_env(),
        }
    }

    /// Address the listener binds to.
    pub fn bind_addr(&self) -> Result<SocketAddr, std::net::AddrParseError> {
        Ok(SocketAddr::new(self.host.parse()?, self.port))
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

fn env_or<T>(key: &str, default: T) -> T
where
    T: FromStr,
    T::Err: Display,
{
    match std::env::var(key) {
        Ok(raw) => raw
            .parse()
            .unwrap_or_else(|e| panic!("{key} has an invalid value '{raw}': {e}")),
        Err(_) => default,
    }
}

fn parse_origins(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}
