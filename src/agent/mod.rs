//! The fact-checking loop: a reasoning node that calls the model, and a
//! dispatch step that runs whatever tools the model asked for, alternating
//! until the model answers without tool calls.

pub mod dispatch;
pub mod events;
mod graph;
pub mod prompt;
pub mod reasoning;

pub use dispatch::{route, Route};
pub use events::{AgentEvent, EventSink, AGENT_NODE};
pub use graph::{Agent, Phase};
pub use prompt::{build_system_prompt, detect_verdict, Verdict, SYSTEM_PROMPT};
pub use reasoning::ReasoningNode;
