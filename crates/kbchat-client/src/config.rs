// Client configuration, deserializable from the application's config file

use crate::http::{HttpChatClient, DEFAULT_API_BASE};
use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::time::Duration;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClientConfig {
    #[serde(default = "default_base_url")]
    pub base_url: String,
    /// Connection timeout in seconds; `0` disables it
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

fn default_base_url() -> String {
    DEFAULT_API_BASE.to_string()
}

fn default_timeout_secs() -> u64 {
    30
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

impl ClientConfig {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            ..Self::default()
        }
    }

    pub fn with_timeout_secs(mut self, secs: u64) -> Self {
        self.timeout_secs = secs;
        self
    }

    /// Build the HTTP client described by this config
    pub fn build_client(&self) -> Result<HttpChatClient> {
        let mut builder = HttpChatClient::builder().base_url(self.base_url.clone());
        if self.timeout_secs > 0 {
            builder = builder.connect_timeout(Duration::from_secs(self.timeout_secs));
        }
        builder.build()
    }
}
