use std::env;

/// Application configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct Config {
    // ClickHouse (analytics store)
    pub clickhouse_url: String,
    pub clickhouse_database: String,

    // MongoDB (document mirror)
    pub mongo_uri: String,
    pub mongo_database: String,

    // HTTP server
    pub http_host: String,
    pub http_port: u16,

    // Upper bound on any single backing-store call, in seconds
    pub store_timeout_secs: u64,
}

impl Config {
    /// Load configuration from environment variables.
    /// Every variable has a default suited to the docker-compose setup.
    pub fn from_env() -> Self {
        Self {
            clickhouse_url: env::var("CLICKHOUSE_URL")
                .unwrap_or_else(|_| "http://clickhouse-server:8123".to_string()),
            clickhouse_database: env::var("CLICKHOUSE_DATABASE")
                .unwrap_or_else(|_| "playtrace".to_string()),
            mongo_uri: env::var("MONGO_URI")
                .unwrap_or_else(|_| "mongodb://mongodb:27017".to_string()),
            mongo_database: env::var("MONGO_DATABASE")
                .unwrap_or_else(|_| "playtrace".to_string()),
            http_host: env::var("HTTP_HOST").unwrap_or_else(|_| "0.0.0.0".to_string()),
            http_port: env::var("HTTP_PORT")
                .unwrap_or_else(|_| "1234".to_string())
                .parse()
                .expect("HTTP_PORT must be a number"),
            store_timeout_secs: env::var("STORE_TIMEOUT_SECS")
                .unwrap_or_else(|_| "10".to_string())
                .parse()
                .expect("STORE_TIMEOUT_SECS must be a number"),
        }
    }
}
