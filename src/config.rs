use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use dotenvy::dotenv;
use serde::Deserialize;

use crate::error::{AppError, Result};

const DEFAULT_API_BASE_URL: &str = "http://localhost:8080/api";

fn default_max_file_size() -> usize {
    // 10 MB in bytes
    10 * 1024 * 1024
}

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub api_base_url: String,
    pub auth_base_url: String,
    pub session_file: PathBuf,
    pub search_debounce_ms: u64,
    pub preview_row_limit: u32,
    pub max_visible_columns: usize,
    pub page_window_radius: u32,
    pub page_sizes: Vec<u32>,
    pub default_page_size: u32,
    pub max_file_size: usize,
    pub request_timeout_secs: u64,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            api_base_url: DEFAULT_API_BASE_URL.to_string(),
            auth_base_url: DEFAULT_API_BASE_URL.to_string(),
            session_file: PathBuf::from(".sheet_console/session.json"),
            search_debounce_ms: 500,
            preview_row_limit: 25,
            max_visible_columns: 5,
            page_window_radius: 2,
            page_sizes: vec![25, 50, 100, 200],
            default_page_size: 50,
            max_file_size: default_max_file_size(),
            request_timeout_secs: 30,
        }
    }
}

impl Config {
    pub fn new() -> Result<Self> {
        // Load .env file first
        dotenv().ok();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds a config from an arbitrary key lookup, falling back to defaults
    /// for every key the lookup does not know.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Config::default();

        let api_base_url = lookup("API_BASE_URL")
            .map(|url| url.trim_end_matches('/').to_string())
            .unwrap_or(defaults.api_base_url);
        let auth_base_url = lookup("AUTH_BASE_URL")
            .map(|url| url.trim_end_matches('/').to_string())
            .unwrap_or_else(|| api_base_url.clone());

        let config = Config {
            api_base_url,
            auth_base_url,
            session_file: lookup("SESSION_FILE")
                .map(PathBuf::from)
                .unwrap_or(defaults.session_file),
            search_debounce_ms: parse_or(&lookup, "SEARCH_DEBOUNCE_MS", defaults.search_debounce_ms)?,
            preview_row_limit: parse_or(&lookup, "PREVIEW_ROW_LIMIT", defaults.preview_row_limit)?,
            max_visible_columns: parse_or(&lookup, "MAX_VISIBLE_COLUMNS", defaults.max_visible_columns)?,
            page_window_radius: parse_or(&lookup, "PAGE_WINDOW_RADIUS", defaults.page_window_radius)?,
            page_sizes: defaults.page_sizes,
            default_page_size: parse_or(&lookup, "DEFAULT_PAGE_SIZE", defaults.default_page_size)?,
            max_file_size: parse_or(&lookup, "MAX_FILE_SIZE", defaults.max_file_size)?,
            request_timeout_secs: parse_or(&lookup, "REQUEST_TIMEOUT_SECS", defaults.request_timeout_secs)?,
        };

        if !config.page_sizes.contains(&config.default_page_size) {
            return Err(AppError::Config(format!(
                "DEFAULT_PAGE_SIZE must be one of {:?}",
                config.page_sizes
            )));
        }

        Ok(config)
    }

    pub fn search_debounce(&self) -> Duration {
        Duration::from_millis(self.search_debounce_ms)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

fn parse_or<F, T>(lookup: &F, key: &str, default: T) -> Result<T>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match lookup(key) {
        Some(raw) => raw
            .trim()
            .parse()
            .map_err(|e| AppError::Config(format!("Failed to parse {}: {}", key, e))),
        None => Ok(default),
    }
}
