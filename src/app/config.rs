use std::time::Duration;

use crate::error::AppError;

const DEFAULT_PORT: u16 = 3000;
const DEFAULT_CORS_ORIGIN: &str = "http://localhost:5173";
const DEFAULT_RATE_LIMIT_PER_MINUTE: u64 = 120;

#[derive(Debug, Clone)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u32,
    pub min_connections: u32,
    pub acquire_timeout: Duration,
    pub run_migrations: bool,
}

/// Runtime settings read from the environment (optionally seeded from `.env`).
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub database: DatabaseConfig,
    pub port: u16,
    pub cors_origin: String,
    pub jwt_secret: String,
    pub redis_url: Option<String>,
    pub rate_limit_per_minute: u64,
}

impl AppConfig {
    pub fn from_env() -> Result<Self, AppError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup<F>(lookup: F) -> Result<Self, AppError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let url = non_empty(&lookup, "DATABASE_URL")
            .ok_or_else(|| AppError::Internal("DATABASE_URL missing".to_string()))?;
        let jwt_secret = non_empty(&lookup, "JWT_SECRET")
            .ok_or_else(|| AppError::Internal("JWT_SECRET missing".to_string()))?;

        let database = DatabaseConfig {
            url,
            max_connections: parse(&lookup, "DATABASE_MAX_CONNECTIONS").unwrap_or(20),
            min_connections: parse(&lookup, "DATABASE_MIN_CONNECTIONS").unwrap_or(5),
            acquire_timeout: Duration::from_secs(
                parse(&lookup, "DATABASE_ACQUIRE_TIMEOUT_SECS").unwrap_or(15),
            ),
            run_migrations: parse(&lookup, "DATABASE_RUN_MIGRATIONS").unwrap_or(false),
        };

        Ok(Self {
            database,
            port: parse(&lookup, "SERVER_PORT").unwrap_or(DEFAULT_PORT),
            cors_origin: non_empty(&lookup, "CORS_ALLOWED_ORIGIN")
                .unwrap_or_else(|| DEFAULT_CORS_ORIGIN.to_string()),
            jwt_secret,
            redis_url: non_empty(&lookup, "REDIS_URL"),
            rate_limit_per_minute: parse(&lookup, "RATE_LIMIT_PER_MINUTE")
                .unwrap_or(DEFAULT_RATE_LIMIT_PER_MINUTE),
        })
    }
}

fn non_empty<F>(lookup: &F, key: &str) -> Option<String>
where
    F: Fn(&str) -> Option<String>,
{
    lookup(key)
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
}

fn parse<F, T>(lookup: &F, key: &str) -> Option<T>
where
    F: Fn(&str) -> Option<String>,
    T: std::str::FromStr,
{
    non_empty(lookup, key).and_then(|value| value.parse::<T>().ok())
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

    #[test]
    fn applies_defaults() {
        let config = AppConfig::from_lookup(lookup_from(&[
            ("DATABASE_URL", "postgres://localhost/review"),
            ("JWT_SECRET", "s3cret"),
        ]))
        .expect("config");

        assert_eq!(config.port, 3000);
        assert_eq!(config.database.max_connections, 20);
        assert_eq!(config.database.min_connections, 5);
        assert_eq!(config.database.acquire_timeout, Duration::from_secs(15));
        assert!(!config.database.run_migrations);
        assert_eq!(config.cors_origin, "http://localhost:5173");
        assert!(config.redis_url.is_none());
        assert_eq!(config.rate_limit_per_minute, 120);
    }

    #[test]
    fn malformed_numbers_fall_back_to_defaults() {
        let config = AppConfig::from_lookup(lookup_from(&[
            ("DATABASE_URL", "postgres://localhost/review"),
            ("JWT_SECRET", "s3cret"),
            ("SERVER_PORT", "not-a-port"),
            ("DATABASE_MAX_CONNECTIONS", "8"),
            ("DATABASE_RUN_MIGRATIONS", "true"),
        ]))
        .expect("config");

        assert_eq!(config.port, 3000);
        assert_eq!(config.database.max_connections, 8);
        assert!(config.database.run_migrations);
    }

    #[test]
    fn requires_database_url() {
        let result = AppConfig::from_lookup(lookup_from(&[("JWT_SECRET", "s3cret")]));
        assert!(matches!(result, Err(AppError::Internal(_))));
    }

    #[test]
    fn requires_jwt_secret() {
        let result =
            AppConfig::from_lookup(lookup_from(&[("DATABASE_URL", "postgres://localhost/x")]));
        assert!(matches!(result, Err(AppError::Internal(_))));
    }
}
