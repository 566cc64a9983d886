use kbchat_client::ChatOptions;
use serde::{Deserialize, Serialize};
use std::ops::RangeInclusive;

use crate::error::SessionError;

pub const TOP_K_RANGE: RangeInclusive<u32> = 1..=20;
pub const TEMPERATURE_RANGE: RangeInclusive<f32> = 0.0..=2.0;

/// Resolved per-exchange settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExchangeConfig {
    pub top_k: u32,
    pub temperature: f32,
    pub use_cache: bool,
    pub stream_mode: bool,
}

impl Default for ExchangeConfig {
    fn default() -> Self {
        Self {
            top_k: 5,
            temperature: 0.1,
            use_cache: true,
            stream_mode: true,
        }
    }
}

impl ExchangeConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_top_k(mut self, top_k: u32) -> Self {
        self.top_k = top_k;
        self
    }

    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = temperature;
        self
    }

    pub fn with_cache(mut self, enabled: bool) -> Self {
        self.use_cache = enabled;
        self
    }

    pub fn with_stream_mode(mut self, enabled: bool) -> Self {
        self.stream_mode = enabled;
        self
    }

    pub fn validate(&self) -> Result<(), SessionError> {
        if !TOP_K_RANGE.contains(&self.top_k) {
            return Err(SessionError::InvalidConfig(format!(
                "top_k must be between {} and {}, got {}",
                TOP_K_RANGE.start(),
                TOP_K_RANGE.end(),
                self.top_k
            )));
        }
        // NaN fails the range check too
        if !TEMPERATURE_RANGE.contains(&self.temperature) {
            return Err(SessionError::InvalidConfig(format!(
                "temperature must be between {} and {}, got {}",
                TEMPERATURE_RANGE.start(),
                TEMPERATURE_RANGE.end(),
                self.temperature
            )));
        }
        Ok(())
    }

    /// Request options sent to the API
    pub fn chat_options(&self) -> ChatOptions {
        ChatOptions::new()
            .top_k(self.top_k)
            .temperature(self.temperature)
            .use_cache(self.use_cache)
    }
}
