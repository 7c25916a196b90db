#![allow(dead_code)]

use async_trait::async_trait;
use factcheck::error::{FactCheckError, Result};
use factcheck::llm::{ChatModel, ChunkContent, ModelDelta, ModelFactory, ModelRequest, ModelStream};
use factcheck::models::{Provider, RunConfig, ToolCall};
use factcheck::tools::{Tool, ToolOutcome};
use futures::stream::{self, StreamExt};
use serde_json::{json, Value};
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

pub type Step = Vec<Result<ModelDelta>>;

pub fn text(s: &str) -> Result<ModelDelta> {
    Ok(ModelDelta::Content(ChunkContent::Text(s.to_string())))
}

pub fn call(id: &str, name: &str, arguments: Value) -> Result<ModelDelta> {
    Ok(ModelDelta::ToolCall(ToolCall {
        id: id.to_string(),
        name: name.to_string(),
        arguments,
    }))
}

/// Replays canned steps; each model invocation consumes one. When `repeat`
/// is set the last step is replayed forever.
pub struct ScriptedFactory {
    shared: Arc<Shared>,
}

struct Shared {
    steps: Mutex<VecDeque<Vec<ScriptedDelta>>>,
    repeat: bool,
    requests: Mutex<Vec<ModelRequest>>,
    runs: Mutex<Vec<RunConfig>>,
}

// `FactCheckError` is not Clone, so steps are stored in a cloneable form.
#[derive(Clone)]
enum ScriptedDelta {
    Delta(ModelDelta),
    Fail(String),
}

impl ScriptedFactory {
    pub fn new(steps: Vec<Step>) -> Self {
        Self::build(steps, false)
    }

    pub fn repeating(step: Step) -> Self {
        Self::build(vec![step], true)
    }

    fn build(steps: Vec<Step>, repeat: bool) -> Self {
        let steps = steps
            .into_iter()
            .map(|step| {
                step.into_iter()
                    .map(|d| match d {
                        Ok(delta) => ScriptedDelta::Delta(delta),
                        Err(e) => ScriptedDelta::Fail(e.to_string()),
                    })
                    .collect()
            })
            .collect();
        Self {
            shared: Arc::new(Shared {
                steps: Mutex::new(steps),
                repeat,
                requests: Mutex::new(Vec::new()),
                runs: Mutex::new(Vec::new()),
            }),
        }
    }

    pub fn requests(&self) -> Vec<ModelRequest> {
        self.shared.requests.lock().unwrap().clone()
    }

    pub fn runs(&self) -> Vec<RunConfig> {
        self.shared.runs.lock().unwrap().clone()
    }
}

impl Shared {
    fn next_step(&self) -> Vec<ScriptedDelta> {
        let mut steps = self.steps.lock().unwrap();
        if self.repeat && steps.len() == 1 {
            return steps[0].clone();
        }
        steps.pop_front().unwrap_or_default()
    }
}

impl ModelFactory for ScriptedFactory {
    fn create(&self, run: &RunConfig) -> Result<Box<dyn ChatModel>> {
        self.shared.runs.lock().unwrap().push(run.clone());
        Ok(Box::new(ScriptedModel {
            shared: Arc::clone(&self.shared),
            provider: run.provider,
            model: run.effective_model(),
        }))
    }
}

struct ScriptedModel {
    shared: Arc<Shared>,
    provider: Provider,
    model: String,
}

#[async_trait]
impl ChatModel for ScriptedModel {
    fn provider(&self) -> Provider {
        self.provider
    }

    fn model_id(&self) -> &str {
        &self.model
    }

    async fn stream(&self, request: &ModelRequest) -> Result<ModelStream> {
        self.shared.requests.lock().unwrap().push(request.clone());
        let items: Vec<Result<ModelDelta>> = self
            .shared
            .next_step()
            .into_iter()
            .map(|d| match d {
                ScriptedDelta::Delta(delta) => Ok(delta),
                ScriptedDelta::Fail(msg) => Err(FactCheckError::StreamError(msg)),
            })
            .collect();
        Ok(stream::iter(items).boxed())
    }
}

/// Tool that answers with a fixed payload and records its inputs.
pub struct StubTool {
    pub name: &'static str,
    pub reply: ToolOutcome,
    pub calls: Arc<Mutex<Vec<Value>>>,
}

impl StubTool {
    pub fn ok(name: &'static str, reply: &str) -> Self {
        Self {
            name,
            reply: ToolOutcome::Success(reply.to_string()),
            calls: Arc::new(Mutex::new(Vec::new())),
        }
    }

    pub fn failing(name: &'static str, reason: &str) -> Self {
        Self {
            name,
            reply: ToolOutcome::Failure(reason.to_string()),
            calls: Arc::new(Mutex::new(Vec::new())),
        }
    }
}

#[async_trait]
impl Tool for StubTool {
    fn name(&self) -> &str {
        self.name
    }

    fn description(&self) -> &str {
        "stub"
    }

    fn input_schema(&self) -> Value {
        json!({"type": "object"})
    }

    async fn call(&self, arguments: &Value) -> ToolOutcome {
        self.calls.lock().unwrap().push(arguments.clone());
        self.reply.clone()
    }
}
