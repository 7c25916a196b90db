//! Connects a run's event stream to whatever is displaying it.

use crate::agent::{Agent, AgentEvent, AGENT_NODE};
use crate::conversation::Conversation;
use crate::error::Result;
use crate::models::{Message, RunConfig};
use futures::{Stream, StreamExt};
use serde_json::Value;
use tracing::debug;

/// Display surface for a single turn.
pub trait TurnRenderer {
    /// Called after every non-empty text increment with the accumulated response.
    fn partial(&mut self, full: &str, delta: &str);

    fn tool_started(&mut self, name: &str, input: &Value);

    fn tool_finished(&mut self, name: &str, is_error: bool);

    /// The stream completed; `text` is the final response.
    fn finalize(&mut self, text: &str);
}

/// Drain `events` into `renderer` and return the accumulated response text.
///
/// Only model output attributed to the reasoning node is collected. If the
/// stream yields an error it is returned immediately; whatever was already
/// shown stays shown and `finalize` is not called.
pub async fn consume_events<S, R>(events: S, renderer: &mut R) -> Result<String>
where
    S: Stream<Item = Result<AgentEvent>>,
    R: TurnRenderer + ?Sized,
{
    futures::pin_mut!(events);
    let mut full_response = String::new();

    while let Some(event) = events.next().await {
        match event? {
            AgentEvent::ChatModelStream { node, chunk } => {
                if node != AGENT_NODE {
                    continue;
                }
                let text = chunk.text();
                if !text.is_empty() {
                    full_response.push_str(&text);
                    renderer.partial(&full_response, &text);
                }
            }
            AgentEvent::ToolStart { name, input, .. } => renderer.tool_started(&name, &input),
            AgentEvent::ToolEnd { name, is_error, .. } => renderer.tool_finished(&name, is_error),
        }
    }

    renderer.finalize(&full_response);
    Ok(full_response)
}

/// Run one user turn end to end.
///
/// The user message is appended before the run starts. The assistant reply is
/// appended only when the stream completes; on error the conversation keeps
/// just the user message.
pub async fn run_turn<R>(
    agent: &Agent,
    conversation: &mut Conversation,
    input: &str,
    run: RunConfig,
    renderer: &mut R,
) -> Result<String>
where
    R: TurnRenderer + ?Sized,
{
    conversation.append(Message::user(input));
    debug!(thread_id = %run.thread_id, history = conversation.len(), "starting turn");

    let events = agent.stream_events(conversation.messages().to_vec(), run);
    let response = consume_events(events, renderer).await?;

    conversation.append(Message::assistant(response.clone()));
    Ok(response)
}
