use super::events::{AgentEvent, EventSink, AGENT_NODE};
use crate::error::Result;
use crate::llm::{ChatModel, ModelDelta, ModelRequest};
use crate::models::{Message, ToolSpec};
use futures::StreamExt;
use tracing::debug;

/// Invokes the language model once per step with the tools bound.
pub struct ReasoningNode {
    model: Box<dyn ChatModel>,
    tools: Vec<ToolSpec>,
    system_prompt: String,
}

impl ReasoningNode {
    pub fn new(model: Box<dyn ChatModel>, tools: Vec<ToolSpec>, system_prompt: String) -> Self {
        Self {
            model,
            tools,
            system_prompt,
        }
    }

    pub fn model_id(&self) -> &str {
        self.model.model_id()
    }

    /// Stream one completion, forwarding content as it arrives, and return the
    /// aggregated assistant message. Model errors are returned unchanged.
    pub async fn invoke(&self, messages: &[Message], sink: &EventSink) -> Result<Message> {
        let request = ModelRequest {
            system_prompt: self.system_prompt.clone(),
            messages: messages.to_vec(),
            tools: self.tools.clone(),
        };

        let mut stream = self.model.stream(&request).await?;
        let mut text = String::new();
        let mut tool_calls = Vec::new();

        while let Some(delta) = stream.next().await {
            match delta? {
                ModelDelta::Content(chunk) => {
                    text.push_str(&chunk.text());
                    sink.emit(AgentEvent::ChatModelStream {
                        node: AGENT_NODE.to_string(),
                        chunk,
                    });
                }
                ModelDelta::ToolCall(call) => tool_calls.push(call),
            }
        }

        debug!(
            model = self.model.model_id(),
            chars = text.len(),
            tool_calls = tool_calls.len(),
            "model step finished"
        );
        Ok(Message::assistant_with_tool_calls(text, tool_calls))
    }
}
