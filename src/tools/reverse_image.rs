use super::{Tool, ToolOutcome};
use crate::error::{FactCheckError, Result};
use async_trait::async_trait;
use serde_json::{json, Value};
use tracing::debug;

pub const REVERSE_IMAGE_ERROR_PREFIX: &str = "Error executing reverse image search:";

const TOP_MATCHES: usize = 5;

/// Google Lens lookup through SerpApi.
pub struct ReverseImageSearch {
    client: reqwest::Client,
    endpoint: String,
    api_key: Option<String>,
}

impl ReverseImageSearch {
    pub fn new(client: reqwest::Client, base_url: &str, api_key: Option<String>) -> Self {
        Self {
            client,
            endpoint: format!("{}/search.json", base_url.trim_end_matches('/')),
            api_key,
        }
    }

    pub async fn lookup(&self, image_url: &str) -> Result<Value> {
        let api_key = self.api_key.as_deref().ok_or_else(|| {
            FactCheckError::ConfigError("SERPAPI_API_KEY environment variable not set".to_string())
        })?;

        debug!(image_url, "Google Lens lookup");
        let response = self
            .client
            .get(&self.endpoint)
            .query(&[
                ("engine", "google_lens"),
                ("url", image_url),
                ("api_key", api_key),
                ("hl", "en"),
                ("gl", "us"),
            ])
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(FactCheckError::from_response(response).await);
        }

        let results: Value = response.json().await?;
        if let Some(error) = results.get("error").and_then(|e| e.as_str()) {
            return Err(FactCheckError::ToolError(error.to_string()));
        }
        Ok(results)
    }

    pub async fn report(&self, image_url: &str) -> Result<String> {
        let results = self.lookup(image_url).await?;
        format_lens_report(&results).map_err(FactCheckError::ToolError)
    }
}

#[async_trait]
impl Tool for ReverseImageSearch {
    fn name(&self) -> &str {
        "reverse_image_search"
    }

    fn description(&self) -> &str {
        "Performs a reverse image search using Google Lens. Use this tool whenever the \
         user provides an image URL to check its provenance. Returns the identified \
         subject (if any) and the top pages containing visually matching images."
    }

    fn input_schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "image_url": {
                    "type": "string",
                    "description": "The public URL of the image to analyze"
                }
            },
            "required": ["image_url"],
            "additionalProperties": false
        })
    }

    async fn call(&self, arguments: &Value) -> ToolOutcome {
        let Some(image_url) = arguments.get("image_url").and_then(|u| u.as_str()) else {
            return ToolOutcome::Failure(format!(
                "{} Missing required argument: image_url",
                REVERSE_IMAGE_ERROR_PREFIX
            ));
        };

        match self.report(image_url).await {
            Ok(report) => ToolOutcome::Success(report),
            Err(e) => ToolOutcome::Failure(format!("{} {}", REVERSE_IMAGE_ERROR_PREFIX, e)),
        }
    }
}

/// Summarize a Google Lens response as plain text for the model.
///
/// The knowledge graph may be an object or a list of candidate entities; the
/// first entity wins. A missing `visual_matches` key counts as zero matches.
pub fn format_lens_report(results: &Value) -> std::result::Result<String, String> {
    let mut lines = Vec::new();

    let entity = match results.get("knowledge_graph") {
        Some(Value::Array(items)) => items.first(),
        Some(Value::Null) | None => None,
        Some(other) => Some(other),
    };
    if let Some(entity) = entity.filter(|e| !is_empty_object(e)) {
        let title = str_field(entity, "title").unwrap_or("Unknown Entity");
        let subtitle = str_field(entity, "subtitle").unwrap_or("");
        lines.push(format!("identified_entity: {} ({})", title, subtitle));
    }

    let matches: &[Value] = match results.get("visual_matches") {
        Some(Value::Array(items)) => items,
        Some(Value::Null) | None => &[],
        Some(_) => return Err("unexpected format for visual_matches".to_string()),
    };
    lines.push(format!("visual_matches_count: {}", matches.len()));

    if !matches.is_empty() {
        lines.push("top_matches:".to_string());
        for (i, item) in matches.iter().take(TOP_MATCHES).enumerate() {
            lines.push(format!(
                "  {}. Title: {} | Source: {} | Link: {}",
                i + 1,
                str_field(item, "title").unwrap_or("No Title"),
                str_field(item, "source").unwrap_or("Unknown Source"),
                str_field(item, "link").unwrap_or(""),
            ));
        }
    }

    Ok(lines.join("\n"))
}

fn str_field<'a>(value: &'a Value, key: &str) -> Option<&'a str> {
    value.get(key).and_then(|v| v.as_str())
}

fn is_empty_object(value: &Value) -> bool {
    value.as_object().map(|m| m.is_empty()).unwrap_or(false)
}
