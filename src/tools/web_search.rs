use super::{Tool, ToolOutcome};
use crate::error::{FactCheckError, Result};
use async_trait::async_trait;
use serde::Serialize;
use serde_json::{json, Value};
use tracing::debug;

pub const WEB_SEARCH_ERROR_PREFIX: &str = "Error executing web search:";

const MAX_RESULTS: u32 = 5;

/// Request sent to the Tavily search API.
///
/// Image results are left to the reverse image tool.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SearchRequest {
    pub query: String,
    pub max_results: u32,
    pub search_depth: &'static str,
    pub include_answer: bool,
    pub include_raw_content: bool,
    pub include_images: bool,
}

impl SearchRequest {
    pub fn new(query: impl Into<String>) -> Self {
        Self {
            query: query.into(),
            max_results: MAX_RESULTS,
            search_depth: "advanced",
            include_answer: true,
            include_raw_content: true,
            include_images: false,
        }
    }
}

pub struct WebSearch {
    client: reqwest::Client,
    endpoint: String,
    api_key: Option<String>,
}

impl WebSearch {
    pub fn new(client: reqwest::Client, base_url: &str, api_key: Option<String>) -> Self {
        Self {
            client,
            endpoint: format!("{}/search", base_url.trim_end_matches('/')),
            api_key,
        }
    }

    pub async fn search(&self, query: &str) -> Result<Value> {
        let api_key = self.api_key.as_deref().ok_or_else(|| {
            FactCheckError::ConfigError("TAVILY_API_KEY environment variable not set".to_string())
        })?;

        debug!(query, "Tavily search");
        let response = self
            .client
            .post(&self.endpoint)
            .bearer_auth(api_key)
            .json(&SearchRequest::new(query))
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(FactCheckError::from_response(response).await);
        }

        Ok(response.json::<Value>().await?)
    }
}

#[async_trait]
impl Tool for WebSearch {
    fn name(&self) -> &str {
        "web_fact_checker"
    }

    fn description(&self) -> &str {
        "Search the web to verify factual claims, news events and general knowledge. \
         Returns up to 5 sources with their full article text and a summarized answer. \
         Input should be a specific search query."
    }

    fn input_schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "query": {
                    "type": "string",
                    "description": "Search query describing the claim to verify"
                }
            },
            "required": ["query"],
            "additionalProperties": false
        })
    }

    async fn call(&self, arguments: &Value) -> ToolOutcome {
        let Some(query) = arguments.get("query").and_then(|q| q.as_str()) else {
            return ToolOutcome::Failure(format!(
                "{} Missing required argument: query",
                WEB_SEARCH_ERROR_PREFIX
            ));
        };

        match self.search(query).await {
            Ok(results) => ToolOutcome::Success(results.to_string()),
            Err(e) => ToolOutcome::Failure(format!("{} {}", WEB_SEARCH_ERROR_PREFIX, e)),
        }
    }
}
