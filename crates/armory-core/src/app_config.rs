use std::path::PathBuf;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Environment {
    Development,
    Test,
    Production,
}

impl std::fmt::Display for Environment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Environment::Development => write!(f, "development"),
            Environment::Test => write!(f, "test"),
            Environment::Production => write!(f, "production"),
        }
    }
}

#[derive(Clone)]
pub struct AppConfig {
    pub database_url: String,
    pub env: Environment,
    pub log_level: String,
    pub db_max_connections: u32,
    pub db_min_connections: u32,
    pub db_acquire_timeout_secs: u64,
    pub request_timeout_secs: u64,
    pub feed_host: String,
    pub feed_port: u16,
    pub feed_user: Option<String>,
    pub feed_pass: Option<String>,
    pub feed_http_mirror: Option<String>,
    pub feed_dir: PathBuf,
    pub search_app_id: Option<String>,
    pub search_admin_key: Option<String>,
    pub search_index_name: String,
    pub search_host: Option<String>,
    pub index_batch_size: usize,
    pub index_batch_delay_ms: u64,
    pub search_max_retries: u32,
    pub search_backoff_base_ms: u64,
    pub media_endpoint: Option<String>,
    pub media_region: String,
    pub media_bucket: Option<String>,
    pub media_access_key: Option<String>,
    pub media_secret_key: Option<String>,
    pub image_dir: PathBuf,
    pub pricing_rules_path: Option<PathBuf>,
}

impl std::fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppConfig")
            .field("env", &self.env)
            .field("log_level", &self.log_level)
            .field("database_url", &"[redacted]")
            .field("db_max_connections", &self.db_max_connections)
            .field("db_min_connections", &self.db_min_connections)
            .field("db_acquire_timeout_secs", &self.db_acquire_timeout_secs)
            .field("request_timeout_secs", &self.request_timeout_secs)
            .field("feed_host", &self.feed_host)
            .field("feed_port", &self.feed_port)
            .field("feed_user", &self.feed_user)
            .field("feed_pass", &self.feed_pass.as_ref().map(|_| "[redacted]"))
            .field("feed_http_mirror", &self.feed_http_mirror)
            .field("feed_dir", &self.feed_dir)
            .field("search_app_id", &self.search_app_id)
            .field(
                "search_admin_key",
                &self.search_admin_key.as_ref().map(|_| "[redacted]"),
            )
            .field("search_index_name", &self.search_index_name)
            .field("search_host", &self.search_host)
            .field("index_batch_size", &self.index_batch_size)
            .field("index_batch_delay_ms", &self.index_batch_delay_ms)
            .field("search_max_retries", &self.search_max_retries)
            .field("search_backoff_base_ms", &self.search_backoff_base_ms)
            .field("media_endpoint", &self.media_endpoint)
            .field("media_region", &self.media_region)
            .field("media_bucket", &self.media_bucket)
            .field(
                "media_access_key",
                &self.media_access_key.as_ref().map(|_| "[redacted]"),
            )
            .field(
                "media_secret_key",
                &self.media_secret_key.as_ref().map(|_| "[redacted]"),
            )
            .field("image_dir", &self.image_dir)
            .field("pricing_rules_path", &self.pricing_rules_path)
            .finish()
    }
}
