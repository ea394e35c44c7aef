use dotenvy::dotenv;
use std::env;

#[derive(Clone)]
pub struct Config {
    /// Postgres connection string; when unset or unreachable the store
    /// falls back to SQLite.
    pub database_url: Option<String>,
    pub sqlite_path: String,
    pub jwt_secret: String,
    pub server_addr: String,
    /// Access token lifetime in seconds.
    pub token_ttl: usize,

    // Rate limiting
    pub rate_signup_per_min: u32,
    pub rate_login_per_min: u32,
    pub rate_api_per_min: u32,
}

impl Config {
    pub fn from_env() -> Self {
        dotenv().ok();

        Self {
            server_addr: env::var("SERVER_ADDR").expect("SERVER_ADDR must be set"),
            jwt_secret: env::var("JWT_SECRET").expect("JWT_SECRET must be set"),
            database_url: env::var("DATABASE_URL").ok(),
            sqlite_path: env::var("SQLITE_PATH").unwrap_or_else(|_| "dev.sqlite3".to_string()),
            token_ttl: env::var("TOKEN_TTL")
                .unwrap_or_else(|_| "3600".to_string()) // default 1 hour
                .parse()
                .unwrap(),

            rate_signup_per_min: env::var("RATE_SIGNUP_PER_MIN")
                .unwrap_or_else(|_| "30".to_string())
                .parse()
                .unwrap(),
            rate_login_per_min: env::var("RATE_LOGIN_PER_MIN")
                .unwrap_or_else(|_| "60".to_string())
                .parse()
                .unwrap(),
            rate_api_per_min: env::var("RATE_API_PER_MIN")
                .unwrap_or_else(|_| "1000".to_string())
                .parse()
                .unwrap(),
        }
    }
}
