use sqlx::PgPool;
use tracing::warn;

use crate::{app::config::AppConfig, auth::jwt::JwtConfig};

#[derive(Clone)]
pub struct AppState {
    pub db: PgPool,
    pub jwt_config: JwtConfig,
    pub redis: Option<redis::Client>,
    pub rate_limit_per_minute: u64,
}

impl AppState {
    pub fn new(db: PgPool, config: &AppConfig) -> Self {
        let redis = config
            .redis_url
            .as_deref()
            .and_then(|url| match redis::Client::open(url) {
                Ok(client) => Some(client),
                Err(err) => {
                    warn!("Rate limiting disabled, invalid REDIS_URL: {}", err);
                    None
                }
            });

        Self {
            db,
            jwt_config: JwtConfig::from_env(config.jwt_secret.clone()),
            redis,
            rate_limit_per_minute: config.rate_limit_per_minute,
        }
    }
}
