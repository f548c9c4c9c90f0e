//! Comment reflow helper.
//!
//! The engine never edits comment content itself; comment tokens are
//! routed through an injected [`CommentsHelper`]. This module defines the
//! trait plus two implementations: [`PassthroughComments`] for callers
//! that want comments untouched, and [`CommentReflower`], which wraps long
//! line comments onto continuation lines, breaking only on whitespace.
//!
//! Comments whose content begins with a protected prefix are never
//! rewrapped; the shipped default protects `MOE:` markers.

use crate::width::Width;

/// Pure comment rewriter injected into the engine.
///
/// `reformat` receives the original comment text, the column the comment
/// starts at, and the line budget; it returns the text to emit, which may
/// span several lines. It must be a pure function: the engine calls it
/// once while measuring and once while writing and relies on getting the
/// same answer.
pub trait CommentsHelper {
    fn reformat(&self, text: &str, start_col: u32, max_width: u32) -> String;
}

/// Helper that leaves every comment exactly as written.
#[derive(Default)]
pub struct PassthroughComments;

impl CommentsHelper for PassthroughComments {
    fn reformat(&self, text: &str, _start_col: u32, _max_width: u32) -> String {
        text.to_owned()
    }
}

/// Reflows long `//` comments onto continuation lines.
///
/// Wrapping only ever happens at whitespace; words longer than the budget
/// are emitted whole. Block comments and protected comments pass through
/// unchanged.
pub struct CommentReflower {
    protected_prefixes: Vec<String>,
}

impl CommentReflower {
    pub fn new() -> Self {
        CommentReflower {
            protected_prefixes: vec!["MOE:".to_owned()],
        }
    }

    /// Replace the protected-prefix set.
    #[must_use]
    pub fn with_protected_prefixes<I, S>(mut self, prefixes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.protected_prefixes = prefixes.into_iter().map(Into::into).collect();
        self
    }

    fn is_protected(&self, content: &str) -> bool {
        let content = content.trim_start();
        self.protected_prefixes
            .iter()
            .any(|p| content.starts_with(p.as_str()))
    }
}

impl Default for CommentReflower {
    fn default() -> Self {
        CommentReflower::new()
    }
}

impl CommentsHelper for CommentReflower {
    fn reformat(&self, text: &str, start_col: u32, max_width: u32) -> String {
        let Some(content) = text.strip_prefix("//") else {
            return text.to_owned();
        };
        if self.is_protected(content) {
            return text.to_owned();
        }
        if Width::of_str(text).add_to_column(start_col) <= max_width {
            return text.to_owned();
        }

        let words: Vec<&str> = content.split_whitespace().collect();
        if words.is_empty() {
            return text.to_owned();
        }

        let mut lines: Vec<String> = Vec::new();
        let mut line = String::from("//");
        let mut line_width = Width::of_str(&line).add_to_column(start_col);
        let mut line_has_words = false;
        for word in words {
            let word_width = Width::of_str(word).add_to_column(1);
            if line_has_words && line_width + word_width > max_width {
                lines.push(std::mem::replace(&mut line, String::from("//")));
                line_width = Width::of_str("//").add_to_column(start_col);
                line_has_words = false;
            }
            line.push(' ');
            line.push_str(word);
            line_width += word_width;
            line_has_words = true;
        }
        lines.push(line);

        let continuation_indent = " ".repeat(start_col as usize);
        let mut out = String::new();
        for (i, line) in lines.iter().enumerate() {
            if i > 0 {
                out.push('\n');
                out.push_str(&continuation_indent);
            }
            out.push_str(line);
        }
        out
    }
}
