pub mod request;
pub mod source;

pub use request::{ChatOptions, ChatRequest, ChatResponse};
pub use source::{Source, SourceMetadata, SNIPPET_PREVIEW_CHARS, UNKNOWN_FILENAME};
