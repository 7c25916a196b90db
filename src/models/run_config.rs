use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Model substituted when a Gemini run is configured with an OpenAI model name.
pub const GEMINI_FALLBACK_MODEL: &str = "gemini-2.5-pro";

const OPENAI_MODELS: &[&str] = &["gpt-4o", "gpt-4-turbo", "gpt-3.5-turbo"];
const GEMINI_MODELS: &[&str] = &["gemini-2.5-pro", "gemini-2.5-flash"];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Provider {
    #[serde(alias = "open_ai")]
    OpenAi,
    #[serde(alias = "google")]
    Gemini,
}

impl Provider {
    pub fn as_str(&self) -> &'static str {
        match self {
            Provider::OpenAi => "openai",
            Provider::Gemini => "gemini",
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            Provider::OpenAi => "OpenAI",
            Provider::Gemini => "Google Gemini",
        }
    }

    /// The fixed list of models offered for this provider; the first is the default.
    pub fn models(&self) -> &'static [&'static str] {
        match self {
            Provider::OpenAi => OPENAI_MODELS,
            Provider::Gemini => GEMINI_MODELS,
        }
    }

    pub fn default_model(&self) -> &'static str {
        self.models()[0]
    }

    pub fn supports_model(&self, model: &str) -> bool {
        self.models().contains(&model)
    }
}

impl Default for Provider {
    fn default() -> Self {
        Provider::OpenAi
    }
}

impl fmt::Display for Provider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Provider {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "openai" | "open_ai" => Ok(Provider::OpenAi),
            "gemini" | "google" | "google gemini" => Ok(Provider::Gemini),
            other => Err(format!(
                "Unknown provider '{}' (expected 'openai' or 'gemini')",
                other
            )),
        }
    }
}

/// Selection for a single user turn. Built fresh for every turn and never persisted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunConfig {
    pub provider: Provider,
    pub model: String,
    pub thread_id: String,
}

impl RunConfig {
    pub fn new(provider: Provider, model: impl Into<String>, thread_id: impl Into<String>) -> Self {
        Self {
            provider,
            model: model.into(),
            thread_id: thread_id.into(),
        }
    }

    /// The model name that will actually be sent to the provider.
    pub fn effective_model(&self) -> String {
        resolve_model_name(self.provider, &self.model)
    }
}

/// Replace a model name that cannot belong to the selected provider.
///
/// Only the Gemini side is corrected: any name containing `gpt` falls back to
/// [`GEMINI_FALLBACK_MODEL`]. OpenAI names pass through untouched.
pub fn resolve_model_name(provider: Provider, requested: &str) -> String {
    match provider {
        Provider::Gemini if requested.contains("gpt") => GEMINI_FALLBACK_MODEL.to_string(),
        _ => requested.to_string(),
    }
}
