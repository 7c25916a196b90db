use crate::error::Result;
use crate::llm::ChunkContent;
use futures::channel::mpsc::UnboundedSender;
use serde_json::Value;

/// Name under which the reasoning node reports its streamed output.
pub const AGENT_NODE: &str = "agent";

/// Something observable that happened during a run.
#[derive(Debug, Clone, PartialEq)]
pub enum AgentEvent {
    /// A chunk of model output produced inside `node`.
    ChatModelStream { node: String, chunk: ChunkContent },
    ToolStart {
        name: String,
        call_id: String,
        input: Value,
    },
    ToolEnd {
        name: String,
        call_id: String,
        output: String,
        is_error: bool,
    },
}

/// Where nodes report events. A detached sink drops everything.
#[derive(Clone, Default)]
pub struct EventSink {
    tx: Option<UnboundedSender<Result<AgentEvent>>>,
}

impl EventSink {
    pub fn detached() -> Self {
        Self { tx: None }
    }

    pub fn new(tx: UnboundedSender<Result<AgentEvent>>) -> Self {
        Self { tx: Some(tx) }
    }

    pub fn emit(&self, event: AgentEvent) {
        if let Some(tx) = &self.tx {
            // A closed receiver means nobody is watching; the run carries on.
            let _ = tx.unbounded_send(Ok(event));
        }
    }

    pub(crate) fn fail(&self, error: crate::error::FactCheckError) {
        if let Some(tx) = &self.tx {
            let _ = tx.unbounded_send(Err(error));
        }
    }
}
