mod message;
mod run_config;
mod tool;

pub use message::Message;
pub use run_config::{resolve_model_name, Provider, RunConfig, GEMINI_FALLBACK_MODEL};
pub use tool::{ToolCall, ToolSpec};
