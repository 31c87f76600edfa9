// config.rs
// Runtime configuration read from the environment (.env is loaded by main).

use std::env;

pub const DEFAULT_SESSION_TTL_SECONDS: u64 = 60 * 60 * 24; // 1 day

#[derive(Debug, Clone)]
pub struct Config {
    pub mongodb_uri: String,
    pub mongodb_db: String,
    pub bind_addr: String,
    pub session_ttl_seconds: u64,
    pub admin_email: String,
    pub admin_name: String,
    pub admin_secret: Option<String>,
}

impl Config {
    pub fn from_env() -> Self {
        Config {
            mongodb_uri: env::var("MONGODB_URI")
                .unwrap_or_else(|_| "mongodb://localhost:27017".to_string()),
            mongodb_db: env::var("MONGODB_DB").unwrap_or_else(|_| "cocofarm".to_string()),
            bind_addr: env::var("BIND_ADDR").unwrap_or_else(|_| "0.0.0.0:8080".to_string()),
            session_ttl_seconds: env::var("SESSION_TTL_SECONDS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(DEFAULT_SESSION_TTL_SECONDS),
            admin_email: env::var("ADMIN_EMAIL").unwrap_or_else(|_| "admin@example.com".to_string()),
            admin_name: env::var("ADMIN_NAME").unwrap_or_else(|_| "Administrator".to_string()),
            admin_secret: env::var("ADMIN_SECRET").ok().filter(|s| !s.trim().is_empty()),
        }
    }
}
