use anyhow::{Context, Result};
use serde::Deserialize;
use std::{env, time::Duration};

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub database: DatabaseConfig,
    pub server: ServerConfig,
    pub security: SecurityConfig,
    pub feed: FeedConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u32,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    /// Directory of a built frontend to serve as the fallback route
    pub frontend_dir: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SecurityConfig {
    pub jwt_secret: String,
    pub token_ttl_hours: i64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct FeedConfig {
    /// How often idle live-feed channels are swept
    pub cleanup_interval_secs: u64,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok();

        let database = DatabaseConfig {
            url: env::var("DATABASE_URL")
                .unwrap_or_else(|_| "sqlite://bongii.db".to_string()),
            max_connections: env::var("DATABASE_MAX_CONNECTIONS")
                .unwrap_or_else(|_| "10".to_string())
                .parse()
                .context("DATABASE_MAX_CONNECTIONS must be a number")?,
        };

        let server = ServerConfig {
            host: env::var("HOST")
                .unwrap_or_else(|_| "0.0.0.0".to_string()),
            port: env::var("PORT")
                .unwrap_or_else(|_| "3001".to_string())
                .parse()
                .context("PORT must be a number")?,
            frontend_dir: env::var("FRONTEND_DIR").ok().filter(|dir| !dir.is_empty()),
        };

        let security = SecurityConfig {
            jwt_secret: env::var("JWT_SECRET")
                .context("JWT_SECRET must be set")?,
            token_ttl_hours: env::var("TOKEN_TTL_HOURS")
                .unwrap_or_else(|_| "1".to_string())
                .parse()
                .context("TOKEN_TTL_HOURS must be a number")?,
        };

        let feed = FeedConfig {
            cleanup_interval_secs: env::var("FEED_CLEANUP_SECS")
                .unwrap_or_else(|_| "15".to_string())
                .parse()
                .context("FEED_CLEANUP_SECS must be a number")?,
        };

        Ok(Config {
            database,
            server,
            security,
            feed,
        })
    }

    /// Configuration for tests and embedded servers: in-memory database,
    /// ephemeral port, no static frontend
    pub fn for_tests(jwt_secret: &str) -> Self {
        Config {
            database: DatabaseConfig {
                url: "sqlite::memory:".to_string(),
                max_connections: 1,
            },
            server: ServerConfig {
                host: "127.0.0.1".to_string(),
                port: 0,
                frontend_dir: None,
            },
            security: SecurityConfig {
                jwt_secret: jwt_secret.to_string(),
                token_ttl_hours: 1,
            },
            feed: FeedConfig {
                cleanup_interval_secs: 15,
            },
        }
    }

    pub fn database_url(&self) -> &str {
        &self.database.url
    }

    pub fn server_addr(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }

    pub fn feed_cleanup_interval(&self) -> Duration {
        Duration::from_secs(self.feed.cleanup_interval_secs.max(1))
    }
}
