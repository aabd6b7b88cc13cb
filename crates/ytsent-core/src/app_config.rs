use std::net::SocketAddr;
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
    pub env: Environment,
    pub bind_addr: SocketAddr,
    pub log_level: String,
    pub google_api_key: String,
    pub youtube_base_url: String,
    pub vectorizer_path: PathBuf,
    pub model_path: PathBuf,
    /// Timeout applied to each comment page request.
    pub request_timeout_secs: u64,
    /// Upper bound on one full analysis, fetch through summary.
    pub analyze_deadline_secs: u64,
    pub max_pages: usize,
    /// `None` fetches every top-level comment.
    pub max_comments: Option<usize>,
    pub max_retries: u32,
    pub retry_backoff_base_ms: u64,
    pub rate_limit_per_minute: usize,
}

impl std::fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppConfig")
            .field("env", &self.env)
            .field("bind_addr", &self.bind_addr)
            .field("log_level", &self.log_level)
            .field("google_api_key", &"[redacted]")
            .field("youtube_base_url", &self.youtube_base_url)
            .field("vectorizer_path", &self.vectorizer_path)
            .field("model_path", &self.model_path)
            .field("request_timeout_secs", &self.request_timeout_secs)
            .field("analyze_deadline_secs", &self.analyze_deadline_secs)
            .field("max_pages", &self.max_pages)
            .field("max_comments", &self.max_comments)
            .field("max_retries", &self.max_retries)
            .field("retry_backoff_base_ms", &self.retry_backoff_base_ms)
            .field("rate_limit_per_minute", &self.rate_limit_per_minute)
            .finish()
    }
}
