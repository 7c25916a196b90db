use super::sse::data_stream;
use super::{ChatModel, ChunkContent, ModelDelta, ModelRequest, ModelStream};
use crate::error::{FactCheckError, Result};
use crate::models::{Message, Provider, ToolCall, ToolSpec};
use async_trait::async_trait;
use futures::StreamExt;
use serde::Deserialize;
use serde_json::{json, Map, Value};
use tracing::{debug, warn};
use uuid::Uuid;

/// Google Gemini `streamGenerateContent` client.
pub struct GeminiChatModel {
    client: reqwest::Client,
    base_url: String,
    api_key: String,
    model: String,
    stream_timeout: u64,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct StreamResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
    prompt_feedback: Option<PromptFeedback>,
    error: Option<Value>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct Candidate {
    content: Option<CandidateContent>,
    finish_reason: Option<String>,
}

/// Finish reasons that mean the answer was withheld rather than completed.
const BLOCKING_FINISH_REASONS: &[&str] = &["SAFETY", "RECITATION", "PROHIBITED_CONTENT", "BLOCKLIST"];

#[derive(Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<Value>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct PromptFeedback {
    block_reason: Option<String>,
}

impl GeminiChatModel {
    pub fn new(
        client: reqwest::Client,
        base_url: &str,
        api_key: String,
        model: String,
        stream_timeout: u64,
    ) -> Self {
        Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key,
            model,
            stream_timeout,
        }
    }

    fn endpoint(&self) -> String {
        format!(
            "{}/models/{}:streamGenerateContent?alt=sse",
            self.base_url, self.model
        )
    }

    pub fn build_request_body(&self, request: &ModelRequest) -> Value {
        let mut body = Map::new();
        body.insert(
            "systemInstruction".into(),
            json!({"parts": [{"text": request.system_prompt}]}),
        );
        body.insert("contents".into(), Value::Array(to_contents(&request.messages)));
        body.insert("generationConfig".into(), json!({"temperature": 0}));
        if !request.tools.is_empty() {
            body.insert(
                "tools".into(),
                json!([{"functionDeclarations": function_declarations(&request.tools)}]),
            );
        }
        Value::Object(body)
    }
}

#[async_trait]
impl ChatModel for GeminiChatModel {
    fn provider(&self) -> Provider {
        Provider::Gemini
    }

    fn model_id(&self) -> &str {
        &self.model
    }

    async fn stream(&self, request: &ModelRequest) -> Result<ModelStream> {
        let body = self.build_request_body(request);
        debug!(model = %self.model, "Gemini stream request");

        let response = self
            .client
            .post(self.endpoint())
            .header("x-goog-api-key", &self.api_key)
            .json(&body)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(FactCheckError::from_response(response).await);
        }

        let mut data = data_stream(response, self.stream_timeout);
        let stream = async_stream::stream! {
            while let Some(item) = data.next().await {
                let payload = match item {
                    Ok(payload) => payload,
                    Err(e) => {
                        yield Err(e);
                        return;
                    }
                };

                let parsed: StreamResponse = match serde_json::from_str(&payload) {
                    Ok(parsed) => parsed,
                    Err(e) => {
                        warn!(error = %e, "skipping unparseable Gemini chunk");
                        continue;
                    }
                };

                if let Some(error) = parsed.error {
                    yield Err(FactCheckError::StreamError(error.to_string()));
                    return;
                }
                if let Some(reason) = parsed.prompt_feedback.and_then(|f| f.block_reason) {
                    yield Err(FactCheckError::StreamError(format!("Prompt blocked by Gemini: {}", reason)));
                    return;
                }

                let Some(candidate) = parsed.candidates.into_iter().next() else {
                    continue;
                };
                let parts = candidate.content.map(|c| c.parts).unwrap_or_default();

                for call in parts.iter().filter_map(function_call) {
                    yield Ok(ModelDelta::ToolCall(call));
                }
                if !parts.is_empty() {
                    yield Ok(ModelDelta::Content(ChunkContent::Fragments(parts)));
                }

                if let Some(reason) = candidate
                    .finish_reason
                    .filter(|r| BLOCKING_FINISH_REASONS.contains(&r.as_str()))
                {
                    yield Err(FactCheckError::StreamError(format!("Response stopped by Gemini: {}", reason)));
                    return;
                }
            }
        };

        Ok(stream.boxed())
    }
}

/// Gemini assigns no ids to function calls; one is generated so tool results can refer back.
fn function_call(part: &Value) -> Option<ToolCall> {
    let call = part.get("functionCall")?;
    let name = call.get("name")?.as_str()?.to_string();
    let arguments = call.get("args").cloned().unwrap_or_else(|| json!({}));
    Some(ToolCall {
        id: format!("call_{}", Uuid::new_v4().simple()),
        name,
        arguments,
    })
}

fn function_declarations(tools: &[ToolSpec]) -> Vec<Value> {
    tools
        .iter()
        .map(|tool| {
            json!({
                "name": tool.name,
                "description": tool.description,
                "parameters": strip_unsupported_schema_keys(&tool.parameters),
            })
        })
        .collect()
}

/// Gemini's schema dialect rejects `additionalProperties` and `$schema`.
fn strip_unsupported_schema_keys(schema: &Value) -> Value {
    match schema {
        Value::Object(map) => Value::Object(
            map.iter()
                .filter(|(key, _)| key.as_str() != "additionalProperties" && key.as_str() != "$schema")
                .map(|(key, value)| (key.clone(), strip_unsupported_schema_keys(value)))
                .collect(),
        ),
        Value::Array(items) => Value::Array(items.iter().map(strip_unsupported_schema_keys).collect()),
        other => other.clone(),
    }
}

/// Convert the conversation into Gemini `contents`, merging consecutive tool
/// results into a single turn as the API expects.
pub fn to_contents(messages: &[Message]) -> Vec<Value> {
    let mut contents: Vec<Value> = Vec::new();
    let mut pending_responses: Vec<Value> = Vec::new();

    let flush = |pending: &mut Vec<Value>, contents: &mut Vec<Value>| {
        if !pending.is_empty() {
            contents.push(json!({"role": "user", "parts": std::mem::take(pending)}));
        }
    };

    for message in messages {
        match message {
            Message::Tool { name, content, .. } => {
                pending_responses.push(json!({
                    "functionResponse": {
                        "name": name,
                        "response": {"content": content},
                    }
                }));
            }
            Message::User { content } => {
                flush(&mut pending_responses, &mut contents);
                contents.push(json!({"role": "user", "parts": [{"text": content}]}));
            }
            Message::Assistant {
                content,
                tool_calls,
            } => {
                if content.is_empty() && tool_calls.is_empty() {
                    // Gemini rejects empty text parts.
                    continue;
                }
                flush(&mut pending_responses, &mut contents);
                let mut parts = Vec::new();
                if !content.is_empty() {
                    parts.push(json!({"text": content}));
                }
                for call in tool_calls {
                    parts.push(json!({
                        "functionCall": {"name": call.name, "args": call.arguments}
                    }));
                }
                contents.push(json!({"role": "model", "parts": parts}));
            }
        }
    }
    flush(&mut pending_responses, &mut contents);

    contents
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn maps_roles_and_merges_tool_results() {
        let messages = vec![
            Message::user("Is the moon made of cheese?"),
            Message::assistant_with_tool_calls(
                "",
                vec![
                    ToolCall {
                        id: "a".into(),
                        name: "web_fact_checker".into(),
                        arguments: json!({"query": "moon composition"}),
                    },
                    ToolCall {
                        id: "b".into(),
                        name: "web_fact_checker".into(),
                        arguments: json!({"query": "moon cheese myth"}),
                    },
                ],
            ),
            Message::tool_result("a", "web_fact_checker", "rock"),
            Message::tool_result("b", "web_fact_checker", "folklore"),
        ];

        let contents = to_contents(&messages);
        assert_eq!(contents.len(), 3);
        assert_eq!(contents[1]["role"], "model");
        assert_eq!(contents[1]["parts"].as_array().unwrap().len(), 2);
        assert_eq!(contents[2]["role"], "user");
        assert_eq!(contents[2]["parts"].as_array().unwrap().len(), 2);
        assert_eq!(
            contents[2]["parts"][1]["functionResponse"]["response"]["content"],
            "folklore"
        );
    }

    #[test]
    fn skips_empty_assistant_turns() {
        let messages = vec![
            Message::user("first claim"),
            Message::assistant(""),
            Message::user("second claim"),
            Message::assistant("Verdict: False"),
        ];

        let contents = to_contents(&messages);

        assert_eq!(contents.len(), 3);
        assert_eq!(contents[0]["role"], "user");
        assert_eq!(contents[1]["role"], "user");
        assert_eq!(contents[2]["parts"][0]["text"], "Verdict: False");
        assert!(contents
            .iter()
            .flat_map(|c| c["parts"].as_array().unwrap())
            .all(|p| p.get("text") != Some(&json!(""))));
    }

    #[test]
    fn extracts_function_call_with_generated_id() {
        let part = json!({"functionCall": {"name": "reverse_image_search", "args": {"image_url": "https://x/y.png"}}});
        let call = function_call(&part).unwrap();
        assert_eq!(call.name, "reverse_image_search");
        assert!(call.id.starts_with("call_"));
        assert_eq!(call.arguments["image_url"], "https://x/y.png");
        assert!(function_call(&json!({"text": "hi"})).is_none());
    }

    #[test]
    fn strips_additional_properties() {
        let schema = json!({
            "type": "object",
            "properties": {"q": {"type": "string"}},
            "additionalProperties": false
        });
        let cleaned = strip_unsupported_schema_keys(&schema);
        assert!(cleaned.get("additionalProperties").is_none());
        assert_eq!(cleaned["properties"]["q"]["type"], "string");
    }
}
