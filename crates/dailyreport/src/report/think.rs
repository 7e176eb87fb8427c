//! Removal of reasoning output from model answers.
//!
//! Some models wrap their chain of thought in `<think>` tags, fenced
//! `thinking` blocks or `Reasoning:` lines. None of that belongs in a report.

use regex::Regex;
use tracing::trace;

/// A compiled pattern for reasoning output.
#[derive(Debug)]
pub struct ThinkPattern {
    /// Name of the pattern for identification.
    pub name: &'static str,

    /// The compiled regex.
    regex: Regex,
}

impl ThinkPattern {
    /// Create a new pattern.
    ///
    /// # Panics
    ///
    /// Panics if the regex pattern is invalid.
    #[must_use]
    pub fn new(name: &'static str, pattern: &str) -> Self {
        Self {
            name,
            regex: Regex::new(pattern).expect("Invalid regex pattern"),
        }
    }

    /// Check if the text contains this pattern.
    #[must_use]
    pub fn matches(&self, text: &str) -> bool {
        self.regex.is_match(text)
    }

    /// Remove every match from the text.
    #[must_use]
    pub fn remove(&self, text: &str) -> String {
        self.regex.replace_all(text, "").into_owned()
    }
}

/// Get all built-in reasoning patterns, in the order they are applied.
#[must_use]
pub fn builtin_patterns() -> Vec<ThinkPattern> {
    vec![
        ThinkPattern::new("think_tag", r"(?i)<think>[\s\S]*?</think>"),
        ThinkPattern::new("reasoning_tag", r"(?i)<reasoning>[\s\S]*?</reasoning>"),
        ThinkPattern::new(
            "reasoning_fence",
            r"(?i)```(?:think|thinking|reasoning)[\s\S]*?```",
        ),
        ThinkPattern::new(
            "reasoning_line",
            r"(?im)^[ \t]*(?:reasoning|thought|thinking)[ \t]*:.*$",
        ),
    ]
}

/// Strips reasoning blocks and tidies the remaining whitespace.
#[derive(Debug)]
pub struct ThinkFilter {
    patterns: Vec<ThinkPattern>,
    blank_runs: Regex,
}

impl Default for ThinkFilter {
    fn default() -> Self {
        Self::new()
    }
}

impl ThinkFilter {
    /// Create a filter with the built-in patterns.
    ///
    /// # Panics
    ///
    /// Panics if a built-in regex fails to compile (a bug).
    #[must_use]
    pub fn new() -> Self {
        Self {
            patterns: builtin_patterns(),
            blank_runs: Regex::new(r"\n{3,}").expect("valid blank-run regex"),
        }
    }

    /// Remove reasoning output, collapse runs of blank lines and trim.
    #[must_use]
    pub fn strip(&self, text: &str) -> String {
        let mut out = text.replace("\r\n", "\n");
        for pattern in &self.patterns {
            if pattern.matches(&out) {
                trace!(pattern = %pattern.name, "Removing reasoning output");
                out = pattern.remove(&out);
            }
        }
        self.blank_runs.replace_all(&out, "\n\n").trim().to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strip_think_tags() {
        let filter = ThinkFilter::new();
        let out = filter.strip("<think>\nplan the answer\n</think>\n# Daily Report");
        assert_eq!(out, "# Daily Report");
    }

    #[test]
    fn test_strip_is_case_insensitive_and_non_greedy() {
        let filter = ThinkFilter::new();
        let out = filter.strip("<THINK>a</THINK>keep<think>b</think> me");
        assert_eq!(out, "keep me");
    }

    #[test]
    fn test_strip_reasoning_tag_and_fence() {
        let filter = ThinkFilter::new();
        let text = "<reasoning>x</reasoning>\n```thinking\nsteps\n```\nbody";
        assert_eq!(filter.strip(text), "body");
    }

    #[test]
    fn test_strip_reasoning_lines() {
        let filter = ThinkFilter::new();
        let text = "Reasoning: first I will\n## Metrics\n  thought : hmm\n- ok";
        assert_eq!(filter.strip(text), "## Metrics\n\n- ok");
    }

    #[test]
    fn test_collapses_blank_lines() {
        let filter = ThinkFilter::new();
        assert_eq!(filter.strip("a\n\n\n\n\nb\n\n"), "a\n\nb");
    }

    #[test]
    fn test_plain_text_untouched() {
        let filter = ThinkFilter::new();
        let text = "## What I Did Today\n- thinking about caching is fine here";
        assert_eq!(filter.strip(text), text);
    }

    #[test]
    fn test_builtin_patterns_named() {
        let patterns = builtin_patterns();
        assert_eq!(patterns.len(), 4);
        assert!(patterns.iter().all(|p| !p.name.is_empty()));
    }
}
