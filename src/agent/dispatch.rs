use super::events::{AgentEvent, EventSink};
use crate::models::{Message, ToolCall};
use crate::tools::ToolRegistry;
use tracing::{debug, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Route {
    Tools,
    End,
}

/// Decide where the run goes after a model step.
pub fn route(last: Option<&Message>) -> Route {
    match last {
        Some(message) if message.has_tool_calls() => Route::Tools,
        _ => Route::End,
    }
}

/// Run each requested call in order and produce one tool-result message per call.
pub async fn execute_tool_calls(
    registry: &ToolRegistry,
    calls: &[ToolCall],
    sink: &EventSink,
) -> Vec<Message> {
    let mut results = Vec::with_capacity(calls.len());

    for call in calls {
        debug!(tool = %call.name, call_id = %call.id, args = %call.arguments, "executing tool");
        sink.emit(AgentEvent::ToolStart {
            name: call.name.clone(),
            call_id: call.id.clone(),
            input: call.arguments.clone(),
        });

        let outcome = registry.call(&call.name, &call.arguments).await;
        if outcome.is_failure() {
            warn!(tool = %call.name, error = outcome.text(), "tool failed");
        }

        sink.emit(AgentEvent::ToolEnd {
            name: call.name.clone(),
            call_id: call.id.clone(),
            output: outcome.text().to_string(),
            is_error: outcome.is_failure(),
        });
        results.push(Message::tool_result(&call.id, &call.name, outcome.into_text()));
    }

    results
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn routes_on_tool_calls() {
        let call = ToolCall {
            id: "c1".into(),
            name: "web_fact_checker".into(),
            arguments: json!({"query": "q"}),
        };
        let asking = Message::assistant_with_tool_calls("", vec![call]);

        assert_eq!(route(Some(&asking)), Route::Tools);
        assert_eq!(route(Some(&Message::assistant("done"))), Route::End);
        assert_eq!(route(None), Route::End);
    }
}
