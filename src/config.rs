use crate::i18n::default_locales;
use crate::problem::DEFAULT_TYPE_BASE_URI;
use anyhow::{bail, Context, Result};

#[derive(Debug, Clone)]
pub struct Config {
    // Server
    pub port: u16,

    // Locales
    pub supported_locales: Vec<String>,

    // Message bundles
    pub messages_dir: String,
    pub messages_basename: String,

    // Problem documents
    pub problem_type_base_uri: String,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        let port = match std::env::var("PORT") {
            Ok(value) => value
                .trim()
                .parse()
                .with_context(|| format!("PORT must be a valid port number, got '{}'", value))?,
            Err(_) => 8080,
        };

        let supported_locales = std::env::var("SUPPORTED_LOCALES")
            .map(|value| parse_locale_list(&value))
            .unwrap_or_else(|_| default_locales().iter().map(|s| s.to_string()).collect());
        if supported_locales.is_empty() {
            bail!("SUPPORTED_LOCALES must list at least one locale");
        }

        Ok(Self {
            port,
            supported_locales,

            // Message bundles
            messages_dir: std::env::var("MESSAGES_DIR").unwrap_or_else(|_| "messages".to_string()),
            messages_basename: std::env::var("MESSAGES_BASENAME")
                .unwrap_or_else(|_| "error_messages".to_string()),

            // Problem documents
            problem_type_base_uri: std::env::var("PROBLEM_TYPE_BASE_URI")
                .unwrap_or_else(|_| DEFAULT_TYPE_BASE_URI.to_string()),
        })
    }
}

/// Split a comma-separated locale list, dropping empty entries.
fn parse_locale_list(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}
