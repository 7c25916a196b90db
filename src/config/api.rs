use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct ApiConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub openai_base_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gemini_base_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tavily_base_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub serpapi_base_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stream_timeout: Option<u64>,
}

/// Credentials read from the environment. Never loaded from config files.
#[derive(Clone, Default)]
pub struct ApiKeys {
    pub openai: Option<String>,
    pub google: Option<String>,
    pub serpapi: Option<String>,
    pub tavily: Option<String>,
}

impl std::fmt::Debug for ApiKeys {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mask = |k: &Option<String>| if k.is_some() { "set" } else { "unset" };
        f.debug_struct("ApiKeys")
            .field("openai", &mask(&self.openai))
            .field("google", &mask(&self.google))
            .field("serpapi", &mask(&self.serpapi))
            .field("tavily", &mask(&self.tavily))
            .finish()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Endpoints {
    pub openai: String,
    pub gemini: String,
    pub tavily: String,
    pub serpapi: String,
}
