//! Process settings read from environment variables (a `.env` file is loaded by the binary).

use crate::error::SettingsError;
use std::str::FromStr;
use std::time::Duration;

const DEFAULT_JWT_SECRET: &str = "dev";

#[derive(Clone, Debug)]
pub struct Settings {
    pub database_url: String,
    pub bind_addr: String,
    pub max_connections: u32,
    pub body_limit_bytes: usize,
    /// Directory served at `/` for the front-end, if any.
    pub static_dir: Option<String>,
    pub auth: AuthSettings,
    /// Upper bound for one bulk config transaction.
    pub bulk_timeout: Duration,
}

#[derive(Clone, Debug)]
pub struct AuthSettings {
    pub jwt_secret: String,
    pub token_ttl_hours: i64,
}

impl Settings {
    pub fn from_env() -> Result<Self, SettingsError> {
        Self::from_lookup(|var| std::env::var(var).ok())
    }

    /// Build settings from any variable lookup. `from_env` passes the process environment.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, SettingsError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let jwt_secret = lookup("JWT_SECRET").filter(|s| !s.is_empty()).unwrap_or_else(|| {
            tracing::warn!("JWT_SECRET not set, using the development secret");
            DEFAULT_JWT_SECRET.into()
        });
        Ok(Settings {
            database_url: lookup("DATABASE_URL")
                .unwrap_or_else(|| "postgres://localhost/cotizador".into()),
            bind_addr: lookup("BIND_ADDR").unwrap_or_else(|| "0.0.0.0:3000".into()),
            max_connections: parse_var(&lookup, "DB_MAX_CONNECTIONS", 5)?,
            body_limit_bytes: parse_var(&lookup, "BODY_LIMIT_BYTES", 1024 * 1024)?,
            static_dir: lookup("STATIC_DIR").filter(|s| !s.is_empty()),
            auth: AuthSettings {
                jwt_secret,
                token_ttl_hours: parse_var(&lookup, "TOKEN_TTL_HOURS", 8)?,
            },
            bulk_timeout: Duration::from_millis(parse_var(&lookup, "BULK_TIMEOUT_MS", 5000)?),
        })
    }
}

fn parse_var<F, T>(lookup: &F, var: &'static str, default: T) -> Result<T, SettingsError>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
{
    match lookup(var) {
        None => Ok(default),
        Some(raw) => raw
            .trim()
            .parse()
            .map_err(|_| SettingsError::Invalid { var, value: raw }),
    }
}
