use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use behuman_core::config::{AppConfig, LoadOptions};
use toml::Value;

pub fn run() -> String {
    let config = match AppConfig::load(LoadOptions::default()) {
        Ok(config) => config,
        Err(error) => return format!("config validation failed: {error}"),
    };

    let config_file_path = detect_config_path();
    let config_file_doc = load_config_file_doc(config_file_path.as_deref());

    let rng_seed = config
        .recommendation
        .rng_seed
        .map(|seed| seed.to_string())
        .unwrap_or_else(|| "<entropy>".to_string());

    let fields: [(&str, String, &[&str]); 11] = [
        ("database.url", redact_database_url(&config.database.url), &["BEHUMAN_DATABASE_URL"]),
        (
            "database.max_connections",
            config.database.max_connections.to_string(),
            &["BEHUMAN_DATABASE_MAX_CONNECTIONS"],
        ),
        (
            "database.timeout_secs",
            config.database.timeout_secs.to_string(),
            &["BEHUMAN_DATABASE_TIMEOUT_SECS"],
        ),
        ("server.bind_address", config.server.bind_address.clone(), &["BEHUMAN_SERVER_BIND_ADDRESS"]),
        ("server.port", config.server.port.to_string(), &["BEHUMAN_SERVER_PORT"]),
        (
            "server.graceful_shutdown_secs",
            config.server.graceful_shutdown_secs.to_string(),
            &["BEHUMAN_SERVER_GRACEFUL_SHUTDOWN_SECS"],
        ),
        (
            "recommendation.top_n",
            config.recommendation.top_n.to_string(),
            &["BEHUMAN_RECOMMENDATION_TOP_N"],
        ),
        (
            "recommendation.persist_requests",
            config.recommendation.persist_requests.to_string(),
            &["BEHUMAN_RECOMMENDATION_PERSIST_REQUESTS"],
        ),
        ("recommendation.rng_seed", rng_seed, &["BEHUMAN_RECOMMENDATION_RNG_SEED"]),
        ("logging.level", config.logging.level.clone(), &["BEHUMAN_LOGGING_LEVEL", "BEHUMAN_LOG_LEVEL"]),
        (
            "logging.format",
            format!("{:?}", config.logging.format).to_lowercase(),
            &["BEHUMAN_LOGGING_FORMAT", "BEHUMAN_LOG_FORMAT"],
        ),
    ];

    let mut lines = vec!["effective config (source precedence: env > file > default):".to_string()];
    for (key, value, env_keys) in fields {
        let source =
            field_source(key, env_keys, config_file_doc.as_ref(), config_file_path.as_deref());
        lines.push(render_line(key, &value, source));
    }

    lines.join("\n")
}

fn detect_config_path() -> Option<PathBuf> {
    let root = PathBuf::from("behuman.toml");
    if root.exists() {
        return Some(root);
    }

    let nested = PathBuf::from("config/behuman.toml");
    if nested.exists() {
        return Some(nested);
    }

    None
}

fn load_config_file_doc(path: Option<&Path>) -> Option<Value> {
    let path = path?;
    let raw = fs::read_to_string(path).ok()?;
    raw.parse::<Value>().ok()
}

fn field_source(
    key_path: &str,
    env_keys: &[&str],
    config_file_doc: Option<&Value>,
    config_file_path: Option<&Path>,
) -> String {
    if let Some(env_key) = env_keys.iter().find(|key| env::var_os(key).is_some()) {
        return format!("env ({env_key})");
    }

    if let Some(doc) = config_file_doc {
        if contains_path(doc, key_path) {
            let file_path = config_file_path
                .map(|path| path.display().to_string())
                .unwrap_or_else(|| "config file".to_string());
            return format!("file ({file_path})");
        }
    }

    "default".to_string()
}

fn contains_path(root: &Value, key_path: &str) -> bool {
    let mut current = root;
    for key in key_path.split('.') {
        let Some(next) = current.get(key) else {
            return false;
        };
        current = next;
    }
    true
}

fn render_line(key: &str, value: &str, source: String) -> String {
    format!("- {key} = {value} (source: {source})")
}

/// Hides query parameters, which may carry credentials for hosted SQLite services.
fn redact_database_url(url: &str) -> String {
    match url.split_once('?') {
        Some((base, query)) if query.contains("password") || query.contains("token") => {
            format!("{base}?<redacted>")
        }
        _ => url.to_string(),
    }
}
