use std::fmt;

pub const SYSTEM_PROMPT: &str = "You are an expert Fact-Checking Agent specializing in digital forensics.
Your goal is to verify user claims and analyze media for authenticity.

PROTOCOL:
1. Decompose the user's input into verifiable facts.
2. Investigate using `web_fact_checker` and `reverse_image_search`.
3. Synthesize evidence and provide a clear verdict: \"Verified\", \"False\", \"Misleading\", or \"Unproven\".
4. ALWAYS cite your sources.
";

/// System instruction for a run started on `date`.
pub fn build_system_prompt(date: &str) -> String {
    format!("{}\nToday's date is {}.", SYSTEM_PROMPT, date)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verdict {
    Verified,
    False,
    Misleading,
    Unproven,
}

impl Verdict {
    pub const ALL: [Verdict; 4] = [
        Verdict::Verified,
        Verdict::False,
        Verdict::Misleading,
        Verdict::Unproven,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            Verdict::Verified => "Verified",
            Verdict::False => "False",
            Verdict::Misleading => "Misleading",
            Verdict::Unproven => "Unproven",
        }
    }
}

impl fmt::Display for Verdict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Find the verdict label in an answer.
///
/// Only lines mentioning "verdict" are considered, plus the first non-empty
/// line after one that carries no label itself (a `### Verdict` heading).
/// Within a line the earliest label wins.
pub fn detect_verdict(answer: &str) -> Option<Verdict> {
    let mut lines = answer.lines();
    while let Some(line) = lines.next() {
        if !line.to_lowercase().contains("verdict") {
            continue;
        }
        if let Some(verdict) = earliest_label(line) {
            return Some(verdict);
        }
        if let Some(verdict) = lines
            .clone()
            .find(|next| !next.trim().is_empty())
            .and_then(earliest_label)
        {
            return Some(verdict);
        }
    }
    None
}

fn earliest_label(line: &str) -> Option<Verdict> {
    Verdict::ALL
        .iter()
        .filter_map(|v| find_word(line, v.label()).map(|pos| (pos, *v)))
        .min_by_key(|(pos, _)| *pos)
        .map(|(_, v)| v)
}

fn find_word(haystack: &str, word: &str) -> Option<usize> {
    haystack.match_indices(word).map(|(i, _)| i).find(|&i| {
        let before = haystack[..i].chars().next_back();
        let after = haystack[i + word.len()..].chars().next();
        !before.map_or(false, char::is_alphanumeric) && !after.map_or(false, char::is_alphanumeric)
    })
}
