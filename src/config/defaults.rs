pub const DEFAULT_OPENAI_BASE_URL: &str = "https://api.openai.com/v1";
pub const DEFAULT_GEMINI_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";
pub const DEFAULT_TAVILY_BASE_URL: &str = "https://api.tavily.com";
pub const DEFAULT_SERPAPI_BASE_URL: &str = "https://serpapi.com";

pub fn default_stream_timeout() -> u64 {
    120
}

/// Upper bound on model invocations within one run.
pub fn default_max_iterations() -> usize {
    25
}
