use colored::*;
use std::sync::OnceLock;
use syntect::easy::HighlightLines;
use syntect::highlighting::{Theme, ThemeSet};
use syntect::parsing::SyntaxSet;
use syntect::util::as_24_bit_terminal_escaped;

const THEME: &str = "Solarized (dark)";

fn syntax_set() -> &'static SyntaxSet {
    static SET: OnceLock<SyntaxSet> = OnceLock::new();
    SET.get_or_init(SyntaxSet::load_defaults_newlines)
}

fn theme() -> &'static Theme {
    static THEMES: OnceLock<ThemeSet> = OnceLock::new();
    &THEMES.get_or_init(ThemeSet::load_defaults).themes[THEME]
}

pub fn rule_width() -> usize {
    terminal_size::terminal_size()
        .map(|(terminal_size::Width(w), _)| (w as usize).clamp(20, 60))
        .unwrap_or(60)
}

struct Fence {
    highlighter: HighlightLines<'static>,
}

/// Streaming Markdown printer.
///
/// Prose passes through as soon as it arrives. Fenced code blocks are held
/// line by line so each complete line can be syntax highlighted.
pub struct MarkdownStream {
    pending: String,
    at_line_start: bool,
    fence: Option<Fence>,
}

impl MarkdownStream {
    pub fn new() -> Self {
        Self {
            pending: String::new(),
            at_line_start: true,
            fence: None,
        }
    }

    /// Feed more text; returns what can be printed now.
    pub fn push(&mut self, text: &str) -> String {
        self.pending.push_str(text);
        let mut out = String::new();

        loop {
            if self.fence.is_some() {
                let Some(nl) = self.pending.find('\n') else { break };
                let line: String = self.pending.drain(..=nl).collect();
                if line.trim_start().starts_with("```") {
                    self.close_fence(&mut out);
                } else {
                    self.highlight_into(&line, &mut out);
                }
                continue;
            }

            if self.pending.is_empty() {
                break;
            }

            if self.at_line_start && self.pending.starts_with('`') {
                if self.pending.len() < 3 && "```".starts_with(self.pending.as_str()) {
                    break;
                }
                if self.pending.starts_with("```") {
                    let Some(nl) = self.pending.find('\n') else { break };
                    let line: String = self.pending.drain(..=nl).collect();
                    self.open_fence(line[3..].trim(), &mut out);
                    continue;
                }
            }

            match self.pending.find('\n') {
                Some(nl) => {
                    out.extend(self.pending.drain(..=nl));
                    self.at_line_start = true;
                }
                None => {
                    out.push_str(&self.pending);
                    self.pending.clear();
                    self.at_line_start = false;
                }
            }
        }

        out
    }

    /// Emit everything still buffered, closing an unterminated code block.
    pub fn finish(&mut self) -> String {
        let mut out = String::new();
        let rest = std::mem::take(&mut self.pending);
        if self.fence.is_some() {
            if !rest.is_empty() {
                self.highlight_into(&rest, &mut out);
                out.push('\n');
            }
            self.close_fence(&mut out);
        } else {
            out.push_str(&rest);
        }
        self.at_line_start = true;
        out
    }

    fn open_fence(&mut self, lang: &str, out: &mut String) {
        let syntaxes = syntax_set();
        let syntax = if lang.is_empty() {
            syntaxes.find_syntax_plain_text()
        } else {
            syntaxes
                .find_syntax_by_token(lang)
                .or_else(|| syntaxes.find_syntax_by_extension(lang))
                .unwrap_or_else(|| syntaxes.find_syntax_plain_text())
        };
        let label = if lang.is_empty() { "code" } else { lang };
        out.push_str(&format!(
            "{}[{}]{}\n",
            "┌─".dimmed(),
            label.cyan(),
            "─".repeat(rule_width().saturating_sub(label.len() + 4)).dimmed()
        ));
        self.fence = Some(Fence {
            highlighter: HighlightLines::new(syntax, theme()),
        });
    }

    fn close_fence(&mut self, out: &mut String) {
        self.fence = None;
        self.at_line_start = true;
        out.push_str(&format!("{}\x1b[0m\n", "└".to_string().dimmed()));
    }

    fn highlight_into(&mut self, line: &str, out: &mut String) {
        let Some(fence) = self.fence.as_mut() else {
            out.push_str(line);
            return;
        };
        match fence.highlighter.highlight_line(line, syntax_set()) {
            Ok(ranges) => out.push_str(&as_24_bit_terminal_escaped(&ranges, false)),
            Err(_) => out.push_str(line),
        }
    }
}

impl Default for MarkdownStream {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn plain(s: &str) -> String {
        let ansi = regex::Regex::new(r"\x1b\[[0-9;]*m").unwrap();
        ansi.replace_all(s, "").into_owned()
    }

    #[test]
    fn prose_passes_through_immediately() {
        let mut md = MarkdownStream::new();
        assert_eq!(md.push("The claim is "), "The claim is ");
        assert_eq!(md.push("False.\n"), "False.\n");
        assert_eq!(md.finish(), "");
    }

    #[test]
    fn holds_possible_fence_start() {
        colored::control::set_override(false);
        let mut md = MarkdownStream::new();
        assert_eq!(md.push("`"), "");
        assert_eq!(md.push("`"), "");
        let out = md.push("`json\n{\"a\": 1}\n```\nafter");
        let out = plain(&out);
        assert!(out.contains("[json]"));
        assert!(out.contains("{\"a\": 1}"));
        assert!(out.ends_with("after"));
    }

    #[test]
    fn inline_code_is_not_a_fence() {
        let mut md = MarkdownStream::new();
        assert_eq!(md.push("`x` is fine"), "`x` is fine");
    }

    #[test]
    fn finish_closes_open_fence() {
        colored::control::set_override(false);
        let mut md = MarkdownStream::new();
        md.push("```\nunterminated");
        let out = plain(&md.finish());
        assert!(out.contains("unterminated"));
        assert!(out.contains('└'));
    }
}
