use std::env;
use std::fs;
use std::path::Path;

use proposer_core::config::{resolve_config_path, AppConfig};
use serde::Serialize;
use toml::Value;

use crate::commands::{load_config, CommandResult};

const HEADER: &str = "effective config (source precedence: env > file > default)";

#[derive(Debug, Serialize)]
pub struct ConfigEntry {
    pub key: &'static str,
    pub value: String,
    pub source: String,
}

pub fn run() -> CommandResult {
    let config = match load_config("config") {
        Ok(config) => config,
        Err(failure) => return failure,
    };

    let config_file_path = resolve_config_path(None);
    let config_file_doc = load_config_file_doc(config_file_path.as_deref());
    let entries = effective_entries(&config, config_file_doc.as_ref(), config_file_path.as_deref());

    let message = std::iter::once(format!("{HEADER}:"))
        .chain(entries.iter().map(render_line))
        .collect::<Vec<_>>()
        .join("\n");
    CommandResult::success_with_data("config", message, &entries)
}

fn effective_entries(
    config: &AppConfig,
    doc: Option<&Value>,
    path: Option<&Path>,
) -> Vec<ConfigEntry> {
    let fields: [(&'static str, &[&str], String); 8] = [
        ("database.url", &["PROPOSER_DATABASE_URL"], config.database.url.clone()),
        (
            "database.max_connections",
            &["PROPOSER_DATABASE_MAX_CONNECTIONS"],
            config.database.max_connections.to_string(),
        ),
        (
            "database.timeout_secs",
            &["PROPOSER_DATABASE_TIMEOUT_SECS"],
            config.database.timeout_secs.to_string(),
        ),
        ("catalog.default", &["PROPOSER_CATALOG_DEFAULT"], config.catalog.default.to_string()),
        (
            "proposal.validity_days",
            &["PROPOSER_PROPOSAL_VALIDITY_DAYS"],
            config.proposal.validity_days.to_string(),
        ),
        (
            "proposal.notes_max_len",
            &["PROPOSER_PROPOSAL_NOTES_MAX_LEN"],
            config.proposal.notes_max_len.to_string(),
        ),
        (
            "logging.level",
            &["PROPOSER_LOGGING_LEVEL", "PROPOSER_LOG_LEVEL"],
            config.logging.level.clone(),
        ),
        (
            "logging.format",
            &["PROPOSER_LOGGING_FORMAT", "PROPOSER_LOG_FORMAT"],
            format!("{:?}", config.logging.format).to_ascii_lowercase(),
        ),
    ];

    fields
        .into_iter()
        .map(|(key, env_keys, value)| ConfigEntry {
            key,
            value,
            source: field_source(key, env_keys, doc, path),
        })
        .collect()
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

fn render_line(entry: &ConfigEntry) -> String {
    format!("- {} = {} (source: {})", entry.key, entry.value, entry.source)
}
