use crate::conversation::Conversation;
use crate::models::{Provider, RunConfig};

pub const HELP_TEXT: &str = "Commands:
  /provider <openai|gemini>  switch provider (resets the model)
  /model <name>              pick a model offered by the current provider
  /models                    list available models
  /history                   show this conversation
  /new                       start a new conversation
  /help                      show this help
  /quit                      exit";

/// What the REPL should do after a line was entered.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CommandOutcome {
    /// Plain input; send it to the agent.
    NotACommand,
    Info(String),
    Invalid(String),
    ShowModels,
    ShowHistory,
    Quit,
}

/// Interactive session state: the conversation plus the current model selection.
#[derive(Debug)]
pub struct ChatSession {
    conversation: Conversation,
    provider: Provider,
    model: String,
}

impl ChatSession {
    pub fn new(provider: Provider, model: impl Into<String>) -> Self {
        Self {
            conversation: Conversation::new(),
            provider,
            model: model.into(),
        }
    }

    pub fn provider(&self) -> Provider {
        self.provider
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    pub fn conversation(&self) -> &Conversation {
        &self.conversation
    }

    pub fn conversation_mut(&mut self) -> &mut Conversation {
        &mut self.conversation
    }

    /// Selection for the next turn, tied to this conversation's thread.
    pub fn run_config(&self) -> RunConfig {
        RunConfig::new(self.provider, &self.model, self.conversation.thread_id())
    }

    pub fn set_provider(&mut self, provider: Provider) {
        self.provider = provider;
        self.model = provider.default_model().to_string();
    }

    pub fn reset(&mut self) {
        self.conversation = Conversation::new();
    }

    pub fn handle_command(&mut self, line: &str) -> CommandOutcome {
        let line = line.trim();
        let Some(rest) = line.strip_prefix('/') else {
            return CommandOutcome::NotACommand;
        };
        let (command, arg) = match rest.split_once(char::is_whitespace) {
            Some((command, arg)) => (command, arg.trim()),
            None => (rest, ""),
        };

        match command {
            "provider" => {
                if arg.is_empty() {
                    return CommandOutcome::Info(format!(
                        "Current provider: {}",
                        self.provider.display_name()
                    ));
                }
                match arg.parse::<Provider>() {
                    Ok(provider) => {
                        self.set_provider(provider);
                        CommandOutcome::Info(format!(
                            "Switched to {} ({})",
                            provider.display_name(),
                            self.model
                        ))
                    }
                    Err(e) => CommandOutcome::Invalid(e),
                }
            }
            "model" => {
                if arg.is_empty() {
                    return CommandOutcome::Info(format!("Current model: {}", self.model));
                }
                if !self.provider.supports_model(arg) {
                    return CommandOutcome::Invalid(format!(
                        "'{}' is not offered by {}; try one of: {}",
                        arg,
                        self.provider.display_name(),
                        self.provider.models().join(", ")
                    ));
                }
                self.model = arg.to_string();
                CommandOutcome::Info(format!("Using model {}", self.model))
            }
            "models" => CommandOutcome::ShowModels,
            "history" => CommandOutcome::ShowHistory,
            "new" | "clear" => {
                self.reset();
                CommandOutcome::Info("Started a new conversation.".to_string())
            }
            "help" | "?" => CommandOutcome::Info(HELP_TEXT.to_string()),
            "quit" | "exit" | "q" => CommandOutcome::Quit,
            other => CommandOutcome::Invalid(format!(
                "Unknown command '/{}'. Type /help for a list.",
                other
            )),
        }
    }
}
