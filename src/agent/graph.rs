use super::dispatch::{execute_tool_calls, route, Route};
use super::events::{AgentEvent, EventSink};
use super::prompt::build_system_prompt;
use super::reasoning::ReasoningNode;
use crate::config::Config;
use crate::error::{FactCheckError, Result};
use crate::llm::{ModelFactory, ProviderModelFactory};
use crate::models::{Message, RunConfig};
use crate::tools::{ReverseImageSearch, ToolRegistry, WebSearch};
use futures::stream::{self, BoxStream};
use futures::StreamExt;
use std::sync::Arc;
use tracing::{debug, info_span, Instrument};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    AwaitingModel,
    ExecutingTools,
}

/// The reasoning/tool loop. Cheap to clone; all collaborators are shared.
#[derive(Clone)]
pub struct Agent {
    models: Arc<dyn ModelFactory>,
    tools: Arc<ToolRegistry>,
    max_iterations: usize,
    date: Option<String>,
}

impl Agent {
    pub fn new(models: Arc<dyn ModelFactory>, tools: ToolRegistry, max_iterations: usize) -> Self {
        Self {
            models,
            tools: Arc::new(tools),
            max_iterations,
            date: None,
        }
    }

    /// Pin the date shown in the system instruction instead of using today's date.
    pub fn with_date(mut self, date: impl Into<String>) -> Self {
        self.date = Some(date.into());
        self
    }

    /// Wire the hosted model providers and both fact-checking tools from configuration.
    pub fn from_config(config: &Config) -> Result<Self> {
        let client = reqwest::Client::builder().build()?;
        let models = ProviderModelFactory::from_config(client.clone(), config);
        let tools = ToolRegistry::new()
            .with(Arc::new(WebSearch::new(
                client.clone(),
                &config.endpoints.tavily,
                config.keys.tavily.clone(),
            )))
            .with(Arc::new(ReverseImageSearch::new(
                client,
                &config.endpoints.serpapi,
                config.keys.serpapi.clone(),
            )));
        Ok(Self::new(Arc::new(models), tools, config.max_iterations))
    }

    /// Run to completion and return the full message list, including the
    /// intermediate assistant and tool messages.
    pub async fn invoke(&self, messages: Vec<Message>, run: RunConfig) -> Result<Vec<Message>> {
        self.run(messages, run, EventSink::detached()).await
    }

    /// Run while streaming events. An error ends the stream as its last item.
    pub fn stream_events(
        &self,
        messages: Vec<Message>,
        run: RunConfig,
    ) -> BoxStream<'static, Result<AgentEvent>> {
        let (tx, rx) = futures::channel::mpsc::unbounded();
        let agent = self.clone();

        // The sender lives inside the driver, so the receiver closes once the run ends.
        let driver = async move {
            let sink = EventSink::new(tx);
            if let Err(e) = agent.run(messages, run, sink.clone()).await {
                sink.fail(e);
            }
        };
        let driver = stream::once(driver).filter_map(|()| async { None::<Result<AgentEvent>> });

        stream::select(driver, rx).boxed()
    }

    async fn run(&self, mut state: Vec<Message>, run: RunConfig, sink: EventSink) -> Result<Vec<Message>> {
        let span = info_span!("run", thread_id = %run.thread_id, provider = %run.provider);
        async move {
            let model = self.models.create(&run)?;
            let date = self
                .date
                .clone()
                .unwrap_or_else(Config::get_current_date);
            let node = ReasoningNode::new(model, self.tools.specs(), build_system_prompt(&date));
            debug!(model = node.model_id(), "starting run");

            let mut phase = Phase::AwaitingModel;
            let mut steps = 0usize;

            loop {
                match phase {
                    Phase::AwaitingModel => {
                        if steps >= self.max_iterations {
                            return Err(FactCheckError::RecursionLimit(self.max_iterations));
                        }
                        steps += 1;

                        let reply = node.invoke(&state, &sink).await?;
                        state.push(reply);

                        match route(state.last()) {
                            Route::Tools => phase = Phase::ExecutingTools,
                            Route::End => {
                                debug!(steps, "run finished");
                                return Ok(state);
                            }
                        }
                    }
                    Phase::ExecutingTools => {
                        let calls = state
                            .last()
                            .map(|m| m.tool_calls().to_vec())
                            .unwrap_or_default();
                        let results = execute_tool_calls(&self.tools, &calls, &sink).await;
                        state.extend(results);
                        phase = Phase::AwaitingModel;
                    }
                }
            }
        }
        .instrument(span)
        .await
    }
}
