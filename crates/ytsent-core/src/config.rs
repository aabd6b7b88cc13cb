use crate::app_config::{AppConfig, Environment};
use crate::ConfigError;

/// Load application configuration from environment variables.
///
/// Calls `dotenvy::dotenv().ok()` to load `.env` files before reading env vars.
///
/// # Errors
///
/// Returns `ConfigError` if required env vars are missing or values are invalid.
pub fn load_app_config() -> Result<AppConfig, ConfigError> {
    dotenvy::dotenv().ok();
    load_app_config_from_env()
}

/// Load application configuration from environment variables already in the process.
///
/// Unlike [`load_app_config`], this does NOT load `.env` files.
///
/// # Errors
///
/// Returns `ConfigError` if required env vars are missing or values are invalid.
pub fn load_app_config_from_env() -> Result<AppConfig, ConfigError> {
    build_app_config(|key| std::env::var(key))
}

/// Build application configuration using the provided env-var lookup function.
///
/// Decoupled from the process environment so tests can drive it with a
/// plain `HashMap`.
fn build_app_config<F>(lookup: F) -> Result<AppConfig, ConfigError>
where
    F: Fn(&str) -> Result<String, std::env::VarError>,
{
    use std::net::SocketAddr;
    use std::path::PathBuf;

    let require = |var: &str| -> Result<String, ConfigError> {
        lookup(var)
            .ok()
            .filter(|v| !v.trim().is_empty())
            .ok_or_else(|| ConfigError::MissingEnvVar(var.to_string()))
    };

    let or_default = |var: &str, default: &str| -> String {
        lookup(var).unwrap_or_else(|_| default.to_string())
    };

    let invalid = |var: &str, reason: String| ConfigError::InvalidEnvVar {
        var: var.to_string(),
        reason,
    };

    let parse_u32 = |var: &str, default: &str| -> Result<u32, ConfigError> {
        or_default(var, default)
            .parse::<u32>()
            .map_err(|e| invalid(var, e.to_string()))
    };

    let parse_u64 = |var: &str, default: &str| -> Result<u64, ConfigError> {
        or_default(var, default)
            .parse::<u64>()
            .map_err(|e| invalid(var, e.to_string()))
    };

    let parse_usize = |var: &str, default: &str| -> Result<usize, ConfigError> {
        or_default(var, default)
            .parse::<usize>()
            .map_err(|e| invalid(var, e.to_string()))
    };

    let google_api_key = require("GOOGLE_API_KEY")?;

    let env = parse_environment(&or_default("YTSENT_ENV", "development"));

    let bind_addr = or_default("YTSENT_BIND_ADDR", "127.0.0.1:5000")
        .parse::<SocketAddr>()
        .map_err(|e| invalid("YTSENT_BIND_ADDR", e.to_string()))?;
    let log_level = or_default("YTSENT_LOG_LEVEL", "info");
    let youtube_base_url = or_default(
        "YTSENT_YOUTUBE_BASE_URL",
        "https://www.googleapis.com/youtube/v3/",
    );
    let vectorizer_path = PathBuf::from(or_default(
        "YTSENT_VECTORIZER_PATH",
        "./models/tfidf_vectorizer.json",
    ));
    let model_path = PathBuf::from(or_default(
        "YTSENT_MODEL_PATH",
        "./models/review_sentiment_model.json",
    ));

    let request_timeout_secs = parse_u64("YTSENT_REQUEST_TIMEOUT_SECS", "15")?;
    let analyze_deadline_secs = parse_u64("YTSENT_ANALYZE_DEADLINE_SECS", "120")?;
    let max_pages = parse_usize("YTSENT_MAX_PAGES", "200")?;
    if max_pages == 0 {
        return Err(invalid("YTSENT_MAX_PAGES", "must be at least 1".to_string()));
    }

    let max_comments = match lookup("YTSENT_MAX_COMMENTS") {
        Ok(raw) if !raw.trim().is_empty() => {
            let n = raw
                .trim()
                .parse::<usize>()
                .map_err(|e| invalid("YTSENT_MAX_COMMENTS", e.to_string()))?;
            if n == 0 {
                return Err(invalid(
                    "YTSENT_MAX_COMMENTS",
                    "must be at least 1 when set".to_string(),
                ));
            }
            Some(n)
        }
        _ => None,
    };

    let max_retries = parse_u32("YTSENT_MAX_RETRIES", "2")?;
    let retry_backoff_base_ms = parse_u64("YTSENT_RETRY_BACKOFF_BASE_MS", "500")?;
    let rate_limit_per_minute = parse_usize("YTSENT_RATE_LIMIT_PER_MINUTE", "60")?;
    if rate_limit_per_minute == 0 {
        return Err(invalid(
            "YTSENT_RATE_LIMIT_PER_MINUTE",
            "must be at least 1".to_string(),
        ));
    }

    Ok(AppConfig {
        env,
        bind_addr,
        log_level,
        google_api_key,
        youtube_base_url,
        vectorizer_path,
        model_path,
        request_timeout_secs,
        analyze_deadline_secs,
        max_pages,
        max_comments,
        max_retries,
        retry_backoff_base_ms,
        rate_limit_per_minute,
    })
}

/// Parse a string into an `Environment` variant.
///
/// Unrecognized values default to `Environment::Development`.
fn parse_environment(s: &str) -> Environment {
    match s {
        "production" => Environment::Production,
        "test" => Environment::Test,
        _ => Environment::Development,
    }
}
