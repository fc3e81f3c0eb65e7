//! Application configuration loaded from environment variables.

use std::env;

use inkpost_infra::{DatabaseConfig, JwtConfig};

/// Credentials of an account created at start-up when missing.
#[derive(Debug, Clone)]
pub struct AdminBootstrap {
    pub username: String,
    pub password: String,
}

/// Application configuration.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub host: String,
    pub port: u16,
    /// `None` runs the blog on in-memory repositories.
    pub database: Option<DatabaseConfig>,
    pub jwt: JwtConfig,
    /// Mark the session cookie `Secure` (HTTPS deployments).
    pub cookie_secure: bool,
    pub admin: Option<AdminBootstrap>,
}

impl AppConfig {
    /// Load configuration from environment variables.
    pub fn from_env() -> Self {
        let database = env::var("DATABASE_URL").ok().map(|url| {
            let mut config = DatabaseConfig::new(url);
            if let Some(max) = parse_var("DB_MAX_CONNECTIONS") {
                config.max_connections = max;
            }
            if let Some(min) = parse_var("DB_MIN_CONNECTIONS") {
                config.min_connections = min;
            }
            if let Ok(flag) = env::var("DB_AUTO_MIGRATE") {
                config.auto_migrate = is_truthy(&flag);
            }
            config
        });

        let admin = match (
            env::var("INKPOST_ADMIN_USERNAME"),
            env::var("INKPOST_ADMIN_PASSWORD"),
        ) {
            (Ok(username), Ok(password)) if !username.is_empty() => {
                Some(AdminBootstrap { username, password })
            }
            _ => None,
        };

        Self {
            host: env::var("HOST").unwrap_or_else(|_| "127.0.0.1".to_string()),
            port: parse_var("PORT").unwrap_or(8000),
            database,
            jwt: JwtConfig::from_env(),
            cookie_secure: env::var("COOKIE_SECURE")
                .map(|v| is_truthy(&v))
                .unwrap_or(false),
            admin,
        }
    }
}

fn parse_var<T: std::str::FromStr>(key: &str) -> Option<T> {
    env::var(key).ok().and_then(|s| s.parse().ok())
}

fn is_truthy(value: &str) -> bool {
    !matches!(value.to_lowercase().as_str(), "false" | "0" | "no" | "off" | "")
}
