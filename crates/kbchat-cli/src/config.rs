use config::{Config as ConfigLoader, ConfigError, File};
use serde::Deserialize;
use std::path::{Path, PathBuf};

use kbchat_client::{ClientConfig, DEFAULT_API_BASE};
use kbchat_session::ExchangeConfig;

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub api: ApiConfig,
    pub store: StoreConfig,
    pub chat: ChatConfig,
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ApiConfig {
    pub base_url: String,
    /// Connection timeout in seconds; 0 disables it
    pub timeout_secs: u64,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_API_BASE.to_string(),
            timeout_secs: 120,
        }
    }
}

impl From<&ApiConfig> for ClientConfig {
    fn from(api: &ApiConfig) -> Self {
        ClientConfig::new(api.base_url.clone()).with_timeout_secs(api.timeout_secs)
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct StoreConfig {
    /// Directory holding the conversation history
    pub dir: PathBuf,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            dir: PathBuf::from(".kbchat"),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ChatConfig {
    pub top_k: u32,
    pub temperature: f32,
    pub use_cache: bool,
    pub stream_mode: bool,
}

impl Default for ChatConfig {
    fn default() -> Self {
        let defaults = ExchangeConfig::default();
        Self {
            top_k: defaults.top_k,
            temperature: defaults.temperature,
            use_cache: defaults.use_cache,
            stream_mode: defaults.stream_mode,
        }
    }
}

impl From<&ChatConfig> for ExchangeConfig {
    fn from(chat: &ChatConfig) -> Self {
        ExchangeConfig::new()
            .with_top_k(chat.top_k)
            .with_temperature(chat.temperature)
            .with_cache(chat.use_cache)
            .with_stream_mode(chat.stream_mode)
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: String,
    pub format: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "warn".to_string(),
            format: "pretty".to_string(),
        }
    }
}

/// Environment variables and the keys they override
const ENV_OVERRIDES: &[(&str, &str)] = &[
    ("API_BASE_URL", "api.base_url"),
    ("API_TIMEOUT_SECS", "api.timeout_secs"),
    ("STORE_DIR", "store.dir"),
    ("CHAT_TOP_K", "chat.top_k"),
    ("CHAT_TEMPERATURE", "chat.temperature"),
    ("CHAT_USE_CACHE", "chat.use_cache"),
    ("CHAT_STREAM_MODE", "chat.stream_mode"),
    ("LOG_LEVEL", "logging.level"),
    ("LOG_FORMAT", "logging.format"),
];

impl Config {
    /// Load configuration from TOML files and environment variables
    ///
    /// Hierarchy (weakest to strongest):
    /// 1. config/default.toml
    /// 2. config/{ENV}.toml (if ENV is set)
    /// 3. Environment variables (API_, STORE_, CHAT_, LOG_ prefixes)
    pub fn load() -> Result<Self, ConfigError> {
        let env = std::env::var("ENV").unwrap_or_else(|_| "dev".to_string());

        let mut builder = ConfigLoader::builder()
            .add_source(File::with_name("config/default").required(false))
            .add_source(File::with_name(&format!("config/{}", env)).required(false));

        for (var, key) in ENV_OVERRIDES {
            builder = builder.set_override_option(*key, std::env::var(var).ok())?;
        }

        builder.build()?.try_deserialize()
    }

    /// Load config from a specific path (useful for testing)
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let builder = ConfigLoader::builder().add_source(File::from(path.as_ref()));

        builder.build()?.try_deserialize()
    }

    pub fn exchange(&self) -> ExchangeConfig {
        ExchangeConfig::from(&self.chat)
    }

    pub fn client(&self) -> ClientConfig {
        ClientConfig::from(&self.api)
    }
}
