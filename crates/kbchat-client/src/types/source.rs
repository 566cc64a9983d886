use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Filename shown when a source carries no `metadata.filename`
pub const UNKNOWN_FILENAME: &str = "unknown";

/// Snippet length (in characters) used by [`Source::preview`]
pub const SNIPPET_PREVIEW_CHARS: usize = 100;

/// A knowledge-base snippet cited by an answer
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Source {
    /// Relevance score in `0.0..=1.0`
    pub score: f64,

    pub text: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<SourceMetadata>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct SourceMetadata {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub filename: Option<String>,

    /// Any other metadata the server attached (page, chunk id, ...)
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Source {
    pub fn new(score: f64, text: impl Into<String>) -> Self {
        Self {
            score,
            text: text.into(),
            metadata: None,
        }
    }

    pub fn with_filename(mut self, filename: impl Into<String>) -> Self {
        self.metadata
            .get_or_insert_with(SourceMetadata::default)
            .filename = Some(filename.into());
        self
    }

    /// Originating filename, or [`UNKNOWN_FILENAME`]
    pub fn filename(&self) -> &str {
        self.metadata
            .as_ref()
            .and_then(|m| m.filename.as_deref())
            .unwrap_or(UNKNOWN_FILENAME)
    }

    pub fn score_percent(&self) -> f64 {
        self.score * 100.0
    }

    /// Score formatted with one decimal, e.g. `0.92` -> `"92.0%"`
    pub fn score_label(&self) -> String {
        format!("{:.1}%", self.score_percent())
    }

    /// Snippet cut to [`SNIPPET_PREVIEW_CHARS`] characters with a `...` marker
    pub fn preview(&self) -> String {
        if self.text.chars().count() > SNIPPET_PREVIEW_CHARS {
            let head: String = self.text.chars().take(SNIPPET_PREVIEW_CHARS).collect();
            format!("{}...", head)
        } else {
            self.text.clone()
        }
    }
}
