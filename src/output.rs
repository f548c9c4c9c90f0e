//! Output sink and the second-pass writer.
//!
//! Layout happens in two passes: the search bakes every decision into a
//! [`State`], then the [`Writer`] walks the tree again and emits text.
//! The writer owns no policy; it only replays what the state says, which
//! is what makes the engine deterministic.

use crate::comments::CommentsHelper;
use crate::doc::{Doc, TokenKind};
use crate::span::Span;
use crate::state::State;
use crate::width::Width;

/// One emitted piece of output. Whitespace the writer synthesizes
/// (newlines, indents, flat break replacements) carries no span.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Chunk {
    pub text: String,
    pub span: Option<Span>,
}

/// Where the writer sends its output.
pub trait Sink {
    /// Emit a text fragment, annotated with where it came from.
    fn append(&mut self, text: &str, span: Option<Span>);

    /// Emit a newline.
    fn newline(&mut self);

    /// Emit indentation as the given number of spaces.
    fn indent(&mut self, columns: u32);
}

/// Chunk-collecting sink for in-memory formatting.
#[derive(Default)]
pub struct TextSink {
    chunks: Vec<Chunk>,
}

impl TextSink {
    pub fn new() -> Self {
        TextSink::default()
    }

    /// The emitted chunks, spans included.
    pub fn chunks(&self) -> &[Chunk] {
        &self.chunks
    }

    /// The emitted text as written so far.
    pub fn text(&self) -> String {
        let mut out = String::new();
        for chunk in &self.chunks {
            out.push_str(&chunk.text);
        }
        out
    }

    /// Finalize the output: drop trailing blank lines and guarantee the
    /// document ends with exactly one newline.
    pub fn finish(self) -> String {
        let mut out = self.text();
        while out.ends_with(' ') || out.ends_with("\n\n") || out.ends_with(" \n") {
            out.pop();
        }
        if !out.ends_with('\n') {
            out.push('\n');
        }
        out
    }

    /// Finalize while keeping the chunk structure.
    pub fn into_chunks(mut self) -> Vec<Chunk> {
        let text = self.text();
        if !text.ends_with('\n') {
            self.chunks.push(Chunk {
                text: "\n".to_owned(),
                span: None,
            });
        }
        self.chunks
    }
}

impl Sink for TextSink {
    fn append(&mut self, text: &str, span: Option<Span>) {
        if text.is_empty() {
            return;
        }
        self.chunks.push(Chunk {
            text: text.to_owned(),
            span,
        });
    }

    fn newline(&mut self) {
        // A flat break replacement followed by a broken inner break would
        // leave its space dangling at the end of the line; drop it. Token
        // chunks are never touched.
        while let Some(last) = self.chunks.last_mut() {
            if last.span.is_none() && last.text.ends_with(' ') {
                let trimmed = last.text.trim_end_matches(' ').len();
                last.text.truncate(trimmed);
                if last.text.is_empty() {
                    self.chunks.pop();
                    continue;
                }
            }
            break;
        }
        self.chunks.push(Chunk {
            text: "\n".to_owned(),
            span: None,
        });
    }

    fn indent(&mut self, columns: u32) {
        if columns == 0 {
            return;
        }
        self.chunks.push(Chunk {
            text: " ".repeat(columns as usize),
            span: None,
        });
    }
}

/// Replays a decided layout over the tree, emitting text to a sink.
pub struct Writer<'a, S: Sink + ?Sized> {
    state: &'a State,
    helper: &'a dyn CommentsHelper,
    max_width: u32,
    sink: &'a mut S,
    column: u32,
}

impl<'a, S: Sink + ?Sized> Writer<'a, S> {
    pub fn new(
        state: &'a State,
        helper: &'a dyn CommentsHelper,
        max_width: u32,
        sink: &'a mut S,
    ) -> Self {
        Writer {
            state,
            helper,
            max_width,
            sink,
            column: 0,
        }
    }

    /// Emit a doc according to the decisions in the state.
    pub fn write(&mut self, doc: &Doc) {
        match doc {
            Doc::Token(token) => match token.kind() {
                TokenKind::Plain => self.append(token.text(), Some(token.span())),
                TokenKind::LineComment | TokenKind::BlockComment => {
                    let text = self
                        .helper
                        .reformat(token.text(), self.column, self.max_width);
                    self.append(&text, Some(token.span()));
                }
            },
            Doc::Space => self.append(" ", None),
            Doc::Tombstone => {}
            Doc::Break(b) => match self.state.break_state(b.id()) {
                Some(decision) if decision.broken => {
                    self.sink.newline();
                    self.sink.indent(decision.indent);
                    self.column = decision.indent;
                }
                _ => self.append(b.flat(), None),
            },
            Doc::Level(level) => {
                if self.state.is_one_line(level.id()) {
                    // Defined because the level's width is finite.
                    self.append(level.flat_text(), level.span());
                } else {
                    for child in level.docs() {
                        self.write(child);
                    }
                }
            }
        }
    }

    fn append(&mut self, text: &str, span: Option<Span>) {
        self.sink.append(text, span);
        match text.rfind('\n') {
            Some(pos) => self.column = Width::of_str(&text[pos + 1..]).add_to_column(0),
            None => self.column = Width::of_str(text).add_to_column(self.column),
        }
    }
}
