use std::{env, fmt::Display, path::PathBuf, str::FromStr, time::Duration};

use axum::http::HeaderValue;
use tracing::{info, warn};
use url::Url;

use crate::error::AppError;

const DEV_ORIGINS: [&str; 2] = ["http://localhost:3000", "http://127.0.0.1:3000"];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Environment {
    Development,
    Production,
}

#[derive(Debug, Clone)]
pub struct Config {
    pub port: u16,
    pub environment: Environment,
    pub backend_url: Url,
    pub backend_timeout: Duration,
    pub allowed_origins: Vec<HeaderValue>,
    pub rate_limit_per_second: u64,
    pub rate_limit_burst: u32,
    pub static_dir: PathBuf,
}

impl Config {
    pub fn from_env() -> Result<Self, AppError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self, AppError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let environment = match lookup("RUST_ENV").as_deref() {
            Some("production") => Environment::Production,
            _ => Environment::Development,
        };

        let backend_url = lookup("BACKEND_URL")
            .ok_or_else(|| AppError::Config("BACKEND_URL must be set".to_string()))?;
        let backend_url = parse_base_url(&backend_url)?;

        let allowed_origins = parse_origins(lookup("ALLOWED_ORIGINS").as_deref());
        let allowed_origins = if allowed_origins.is_empty() {
            if environment == Environment::Production {
                return Err(AppError::Config(
                    "ALLOWED_ORIGINS must contain at least one valid origin in production".to_string(),
                ));
            }
            DEV_ORIGINS.iter().map(|o| HeaderValue::from_static(*o)).collect()
        } else {
            allowed_origins
        };

        Ok(Self {
            port: try_load(&lookup, "PORTAL_PORT", 8080)?,
            environment,
            backend_url,
            backend_timeout: Duration::from_secs(try_load(&lookup, "BACKEND_TIMEOUT_SECS", 15)?),
            allowed_origins,
            rate_limit_per_second: try_load(&lookup, "RATE_LIMIT_PER_SECOND", 1200)?,
            rate_limit_burst: try_load(&lookup, "RATE_LIMIT_BURST", 2400)?,
            static_dir: lookup("STATIC_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from("static")),
        })
    }
}

/// Base URLs are joined against relative endpoint paths, so they need a trailing slash.
pub fn parse_base_url(raw: &str) -> Result<Url, AppError> {
    let trimmed = raw.trim();
    let with_slash = if trimmed.ends_with('/') {
        trimmed.to_string()
    } else {
        format!("{trimmed}/")
    };
    let url = Url::parse(&with_slash)
        .map_err(|e| AppError::Config(format!("invalid BACKEND_URL {trimmed}: {e}")))?;
    if url.cannot_be_a_base() {
        return Err(AppError::Config(format!("BACKEND_URL {trimmed} cannot be a base URL")));
    }
    Ok(url)
}

fn parse_origins(raw: Option<&str>) -> Vec<HeaderValue> {
    let Some(raw) = raw else {
        return Vec::new();
    };
    raw.split(',')
        .filter_map(|s| {
            let trimmed = s.trim();
            if trimmed.is_empty() {
                return None;
            }
            match trimmed.parse::<HeaderValue>() {
                Ok(value) => Some(value),
                Err(_) => {
                    warn!("Ignoring invalid ALLOWED_ORIGINS entry: {}", trimmed);
                    None
                }
            }
        })
        .collect()
}

fn try_load<F, T>(lookup: &F, key: &str, default: T) -> Result<T, AppError>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr + Display,
    T::Err: Display,
{
    match lookup(key) {
        Some(raw) => raw
            .trim()
            .parse()
            .map_err(|e| AppError::Config(format!("invalid {key} value {raw:?}: {e}"))),
        None => {
            info!("{key} not set, using default: {default}");
            Ok(default)
        }
    }
}
