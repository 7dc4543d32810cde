use std::env;

/// Application configuration loaded from environment variables
#[derive(Debug, Clone)]
pub struct Config {
    // Server
    pub port: u16,
    pub node_env: String,

    // Upstream catalog API
    pub upstream_base_url: String,

    // Fetch resilience
    pub fetch_timeout_ms: u64,
    pub fetch_max_attempts: u32,
    pub fetch_backoff_base_ms: u64,

    // Feed
    pub feed_page_size: usize,

    // Misc
    pub user_agent: String,
}

impl Config {
    /// Load configuration from environment variables with defaults
    pub fn from_env() -> Self {
        Self {
            // Server
            port: env::var("PORT")
                .unwrap_or_else(|_| "3000".to_string())
                .parse()
                .unwrap_or(3000),
            node_env: env::var("NODE_ENV").unwrap_or_else(|_| "development".to_string()),

            // Upstream
            upstream_base_url: env::var("UPSTREAM_BASE_URL")
                .unwrap_or_else(|_| "https://api.sansekai.my.id/api/dramabox".to_string()),

            // Fetch resilience
            fetch_timeout_ms: env::var("FETCH_TIMEOUT_MS")
                .unwrap_or_else(|_| "9000".to_string())
                .parse()
                .unwrap_or(9_000), // 9 seconds per attempt

            fetch_max_attempts: env::var("FETCH_MAX_ATTEMPTS")
                .unwrap_or_else(|_| "3".to_string())
                .parse()
                .unwrap_or(3),

            fetch_backoff_base_ms: env::var("FETCH_BACKOFF_BASE_MS")
                .unwrap_or_else(|_| "350".to_string())
                .parse()
                .unwrap_or(350),

            // Feed
            feed_page_size: env::var("FEED_PAGE_SIZE")
                .unwrap_or_else(|_| "18".to_string())
                .parse()
                .unwrap_or(18),

            // Misc
            user_agent: env::var("USER_AGENT")
                .unwrap_or_else(|_| "PanStream/1.0".to_string()),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::from_env()
    }
}
