//! Server configuration
//!
//! Configuration is loaded from environment variables over built-in defaults.

use std::env;
use std::path::PathBuf;
use std::time::Duration;

use crate::i18n::Language;

/// Main server configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// Server bind address
    pub host: String,
    /// Server port
    pub port: u16,

    /// Backing service configuration
    pub backend: BackendConfig,

    /// Session manager configuration
    pub session: SessionConfig,

    /// Language used when a request does not name one
    pub default_language: Language,

    /// Demo configuration
    pub demo: DemoConfig,
}

/// Which backing service to talk to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BackendMode {
    /// In-process tables (development and demos)
    Memory,
    /// Hosted auth and table-store API
    Remote,
}

/// Backing service configuration
#[derive(Debug, Clone)]
pub struct BackendConfig {
    pub mode: BackendMode,
    /// Base URL of the hosted API
    pub url: String,
    /// Public (anonymous) API key sent with every request
    pub anon_key: String,
    /// Per-request timeout
    pub request_timeout: Duration,
    /// File the issued session is kept in between runs
    pub session_file: Option<PathBuf>,
}

/// Session-related configuration
#[derive(Debug, Clone, Default)]
pub struct SessionConfig {
    /// Serialize sign-in/sign-up/sign-out/profile mutations in call order
    pub serialize_mutations: bool,
}

/// Demo mode configuration
#[derive(Debug, Clone, Default)]
pub struct DemoConfig {
    /// Seed the in-memory backend with a demo account
    pub seed: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 8080,
            backend: BackendConfig::default(),
            session: SessionConfig::default(),
            default_language: Language::En,
            demo: DemoConfig::default(),
        }
    }
}

impl Default for BackendConfig {
    fn default() -> Self {
        Self {
            mode: BackendMode::Memory,
            url: "http://localhost:54321".to_string(),
            anon_key: String::new(),
            request_timeout: Duration::from_secs(10),
            session_file: None,
        }
    }
}

fn parse_flag(val: &str) -> bool {
    val.to_lowercase() == "true" || val == "1"
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Load configuration from an arbitrary key lookup
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let mut config = Self::default();

        // Server config
        if let Some(host) = lookup("HOST") {
            config.host = host;
        }
        if let Some(port) = lookup("PORT")
            && let Ok(p) = port.parse()
        {
            config.port = p;
        }

        // Backend config
        if let Some(mode) = lookup("BACKEND_MODE") {
            match mode.to_lowercase().as_str() {
                "remote" => config.backend.mode = BackendMode::Remote,
                "memory" => config.backend.mode = BackendMode::Memory,
                _ => {}
            }
        }
        if let Some(url) = lookup("BACKEND_URL")
            && !url.is_empty()
        {
            config.backend.url = url;
        }
        if let Some(key) = lookup("BACKEND_ANON_KEY") {
            config.backend.anon_key = key;
        }
        if let Some(val) = lookup("REQUEST_TIMEOUT_SECS")
            && let Ok(secs) = val.parse::<u64>()
        {
            config.backend.request_timeout = Duration::from_secs(secs);
        }
        if let Some(path) = lookup("BACKEND_SESSION_FILE")
            && !path.is_empty()
        {
            config.backend.session_file = Some(PathBuf::from(path));
        }

        // Session config
        if let Some(val) = lookup("SERIALIZE_SESSION_MUTATIONS") {
            config.session.serialize_mutations = parse_flag(&val);
        }

        if let Some(val) = lookup("DEFAULT_LANGUAGE")
            && let Ok(language) = val.parse::<Language>()
        {
            config.default_language = language;
        }

        // Demo config
        if let Some(val) = lookup("DEMO_SEED") {
            config.demo.seed = parse_flag(&val);
        }

        config
    }
}
