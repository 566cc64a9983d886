mod client;

pub use client::{HttpChatClient, HttpChatClientBuilder, DEFAULT_API_BASE};
