mod registry;
pub mod reverse_image;
pub mod web_search;

pub use registry::ToolRegistry;
pub use reverse_image::{format_lens_report, ReverseImageSearch, REVERSE_IMAGE_ERROR_PREFIX};
pub use web_search::{WebSearch, WEB_SEARCH_ERROR_PREFIX};

use async_trait::async_trait;
use serde_json::Value;

/// Result of running a tool: either a payload for the model or the reason it failed.
///
/// Both arms are plain text so the reasoning loop can always continue.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ToolOutcome {
    Success(String),
    Failure(String),
}

impl ToolOutcome {
    pub fn is_failure(&self) -> bool {
        matches!(self, ToolOutcome::Failure(_))
    }

    pub fn text(&self) -> &str {
        match self {
            ToolOutcome::Success(text) | ToolOutcome::Failure(text) => text,
        }
    }

    pub fn into_text(self) -> String {
        match self {
            ToolOutcome::Success(text) | ToolOutcome::Failure(text) => text,
        }
    }
}

#[async_trait]
pub trait Tool: Send + Sync {
    fn name(&self) -> &str;

    fn description(&self) -> &str;

    /// JSON schema for the tool's arguments.
    fn input_schema(&self) -> Value;

    async fn call(&self, arguments: &Value) -> ToolOutcome;
}
