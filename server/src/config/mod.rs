use std::env;
use std::path::PathBuf;
use std::str::FromStr;

use crate::auth::jwt::{JwtConfig, DEFAULT_EXPIRY_HOURS, DEFAULT_JWT_SECRET};

pub mod cors;
pub mod security;

pub use cors::create_cors_layer;
pub use security::create_security_headers_layer;

pub const DEFAULT_ALLOWED_ORIGINS: &str = "http://localhost:3000,http://localhost:5173";

const DEFAULT_HOST: &str = "0.0.0.0";
const DEFAULT_PORT: u16 = 5000;
const DEFAULT_MAX_CONNECTIONS: u32 = 5;
const DEFAULT_UPLOAD_DIR: &str = "uploads";
const DEFAULT_MAX_UPLOAD_BYTES: usize = 10 * 1024 * 1024;

/// Runtime configuration.
///
/// | Env Var                    | Default                                       |
/// |----------------------------|-----------------------------------------------|
/// | `HOST`                     | `0.0.0.0`                                     |
/// | `PORT`                     | `5000`                                        |
/// | `DATABASE_URL`             | unset: in-memory store                        |
/// | `DATABASE_MAX_CONNECTIONS` | `5`                                           |
/// | `JWT_SECRET`               | `your-secret-key`                             |
/// | `JWT_EXPIRY_HOURS`         | `24`                                          |
/// | `UPLOAD_DIR`               | `uploads`                                     |
/// | `MAX_UPLOAD_BYTES`         | `10485760`                                    |
/// | `CORS_ALLOWED_ORIGINS`     | `http://localhost:3000,http://localhost:5173` |
/// | `RUST_ENV`                 | `production` enables HSTS                     |
#[derive(Debug, Clone)]
pub struct Config {
    pub host: String,
    pub port: u16,
    pub database_url: Option<String>,
    pub database_max_connections: u32,
    pub jwt: JwtConfig,
    pub upload_dir: PathBuf,
    pub max_upload_bytes: usize,
    pub cors_allowed_origins: Vec<String>,
    pub production: bool,
}

impl Config {
    pub fn from_env() -> Self {
        Self::from_vars(|key| env::var(key).ok())
    }

    pub fn from_vars(get: impl Fn(&str) -> Option<String>) -> Self {
        let var = |key: &str| get(key).filter(|v| !v.trim().is_empty());

        let jwt_secret = var("JWT_SECRET").unwrap_or_else(|| DEFAULT_JWT_SECRET.to_string());
        let expiry_hours = parse_or(
            var("JWT_EXPIRY_HOURS"),
            "JWT_EXPIRY_HOURS",
            DEFAULT_EXPIRY_HOURS,
        );

        Self {
            host: var("HOST").unwrap_or_else(|| DEFAULT_HOST.to_string()),
            port: parse_or(var("PORT"), "PORT", DEFAULT_PORT),
            database_url: var("DATABASE_URL"),
            database_max_connections: parse_or(
                var("DATABASE_MAX_CONNECTIONS"),
                "DATABASE_MAX_CONNECTIONS",
                DEFAULT_MAX_CONNECTIONS,
            ),
            jwt: JwtConfig::new(jwt_secret, expiry_hours),
            upload_dir: var("UPLOAD_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from(DEFAULT_UPLOAD_DIR)),
            max_upload_bytes: parse_or(
                var("MAX_UPLOAD_BYTES"),
                "MAX_UPLOAD_BYTES",
                DEFAULT_MAX_UPLOAD_BYTES,
            ),
            cors_allowed_origins: split_origins(
                &var("CORS_ALLOWED_ORIGINS")
                    .unwrap_or_else(|| DEFAULT_ALLOWED_ORIGINS.to_string()),
            ),
            production: var("RUST_ENV")
                .map(|v| v.eq_ignore_ascii_case("production"))
                .unwrap_or(false),
        }
    }

    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

fn parse_or<T: FromStr>(value: Option<String>, key: &str, default: T) -> T {
    match value {
        Some(raw) => raw.trim().parse().unwrap_or_else(|_| {
            tracing::warn!(key, value = %raw, "Invalid value, using default");
            default
        }),
        None => default,
    }
}

fn split_origins(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}
