use super::markdown::{rule_width, MarkdownStream};
use crate::agent::detect_verdict;
use crate::agent::Verdict;
use crate::bridge::TurnRenderer;
use crate::conversation::Conversation;
use crate::models::{Message, Provider};
use colored::*;
use serde_json::Value;
use std::io::{self, Write};

/// Renders a turn to stdout as it streams.
pub struct TerminalRenderer {
    markdown: MarkdownStream,
    mid_line: bool,
}

impl TerminalRenderer {
    pub fn new() -> Self {
        Self {
            markdown: MarkdownStream::new(),
            mid_line: false,
        }
    }

    fn write(&mut self, text: &str) {
        if text.is_empty() {
            return;
        }
        print!("{}", text);
        self.mid_line = !text.ends_with('\n');
        let _ = io::stdout().flush();
    }

    // Status lines always start on a fresh line, even mid-paragraph.
    fn break_line(&mut self) {
        let pending = self.markdown.finish();
        self.write(&pending);
        if self.mid_line {
            println!();
            self.mid_line = false;
        }
    }
}

impl Default for TerminalRenderer {
    fn default() -> Self {
        Self::new()
    }
}

impl TurnRenderer for TerminalRenderer {
    fn partial(&mut self, _full: &str, delta: &str) {
        let out = self.markdown.push(delta);
        self.write(&out);
    }

    fn tool_started(&mut self, name: &str, input: &Value) {
        self.break_line();
        println!("{} {}", "🛠️ Activating Tool:".yellow().bold(), name.bold());
        let args = serde_json::to_string_pretty(input).unwrap_or_else(|_| input.to_string());
        println!("{}", args.dimmed());
    }

    fn tool_finished(&mut self, name: &str, is_error: bool) {
        if is_error {
            println!("{} {}", "⚠️ Tool Failed:".red().bold(), name);
        } else {
            println!("{} {}", "✅ Tool Completed:".green().bold(), name);
        }
    }

    fn finalize(&mut self, text: &str) {
        self.break_line();
        println!("{}", "─".repeat(rule_width()).dimmed());
        match detect_verdict(text) {
            Some(verdict) => println!(
                "{} {}",
                "Investigation Complete".bold(),
                verdict_badge(verdict)
            ),
            None => println!("{}", "Investigation Complete".bold()),
        }
        println!();
    }
}

pub fn verdict_badge(verdict: Verdict) -> ColoredString {
    let label = format!("[{}]", verdict.label().to_uppercase());
    match verdict {
        Verdict::Verified => label.green().bold(),
        Verdict::False => label.red().bold(),
        Verdict::Misleading => label.yellow().bold(),
        Verdict::Unproven => label.bright_black().bold(),
    }
}

pub fn print_banner(provider: Provider, model: &str) {
    println!("{}", "Fact-Checking Agent".bold().cyan());
    println!(
        "{} {} {}",
        "Using".dimmed(),
        provider.display_name().green(),
        format!("({})", model).dimmed()
    );
    println!("{}", "Type /help for commands, /quit to exit.".dimmed());
    println!();
}

pub fn print_error(error: &dyn std::fmt::Display) {
    eprintln!("{} {}", "Error:".red().bold(), error);
}

pub fn print_info(message: &str) {
    println!("{}", message.cyan());
}

pub fn print_models(current: Provider) {
    for provider in [Provider::OpenAi, Provider::Gemini] {
        let marker = if provider == current { "*" } else { " " };
        println!("{} {}", marker, provider.display_name().bold());
        for model in provider.models() {
            println!("    {}", model);
        }
    }
}

pub fn print_history(conversation: &Conversation) {
    if conversation.is_empty() {
        println!("{}", "No messages yet.".dimmed());
        return;
    }
    for message in conversation {
        let (who, text) = match message {
            Message::User { content } => ("You".blue().bold(), content.as_str()),
            Message::Assistant { content, .. } => ("Agent".green().bold(), content.as_str()),
            Message::Tool { name, content, .. } => {
                println!("{} {}", "Tool".yellow().bold(), name.dimmed());
                println!("{}", content.dimmed());
                continue;
            }
        };
        println!("{}: {}", who, text);
    }
}
