//! The document tree.
//!
//! A [`Doc`] is an immutable formatting instruction produced by the
//! upstream translator: literal tokens, candidate break points, and
//! levels that group children into a unit that either fits on one line or
//! breaks along its interior break points. Every node caches its flat
//! width so the search can test one-line candidacy without walking the
//! subtree twice; levels additionally cache their flat text, merged span,
//! and split/break partition.
//!
//! The tree itself never changes during layout. All decisions land in the
//! [`State`] threaded through the search, keyed by the per-node
//! [`NodeId`]s handed out at construction.

pub(crate) mod level;
pub mod visitors;

pub use level::MAX_BRANCHING_COEFFICIENT;

use crate::open_op::{BreakBehaviour, FillMode, LastLevelBreakability, OpenOp, PartialInlineability};
use crate::span::{union, Span};
use crate::state::{BreakState, State};
use crate::width::Width;
use std::ops::Range;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::OnceLock;

/// Stable identity of a level or break, used to key layout decisions.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct NodeId(u32);

static NEXT_NODE_ID: AtomicU32 = AtomicU32::new(0);

impl NodeId {
    fn next() -> NodeId {
        NodeId(NEXT_NODE_ID.fetch_add(1, Ordering::Relaxed))
    }
}

/// What kind of text a token carries. Comments are routed through the
/// injected comment helper; plain tokens are emitted verbatim.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum TokenKind {
    Plain,
    LineComment,
    BlockComment,
}

/// A literal piece of source text.
pub struct Token {
    text: String,
    kind: TokenKind,
    span: Span,
    width: Width,
}

impl Token {
    pub(crate) fn text(&self) -> &str {
        &self.text
    }

    pub(crate) fn kind(&self) -> TokenKind {
        self.kind
    }

    pub(crate) fn span(&self) -> Span {
        self.span
    }

    fn compute_breaks(&self, ctx: &LayoutCtx<'_>, state: State) -> State {
        match self.kind {
            TokenKind::Plain => state.advanced(self.width),
            TokenKind::LineComment | TokenKind::BlockComment => {
                let text = ctx.helper.reformat(&self.text, state.column(), ctx.max_width);
                state.after_text(&text)
            }
        }
    }
}

/// A candidate break point between sibling docs.
///
/// Flat, it renders as its replacement text (usually a single space).
/// Broken, it emits a newline and indents the next line to the enclosing
/// level's indent plus this break's own delta.
pub struct Break {
    id: NodeId,
    fill: FillMode,
    flat: String,
    plus_indent: u32,
    has_column_limit: bool,
    width: Width,
}

impl Break {
    pub fn new(fill: FillMode, flat: &str, plus_indent: u32) -> Break {
        let width = if fill == FillMode::Forced {
            Width::INFINITE
        } else {
            Width::of_str(flat)
        };
        Break {
            id: NodeId::next(),
            fill,
            flat: flat.to_owned(),
            plus_indent,
            has_column_limit: false,
            width,
        }
    }

    /// A forced newline.
    pub fn forced() -> Break {
        Break::new(FillMode::Forced, "", 0)
    }

    /// Mark this break as participating in the enclosing level's
    /// column-limit-before-last-break check.
    #[must_use]
    pub fn with_column_limit(mut self) -> Break {
        self.has_column_limit = true;
        self
    }

    pub(crate) fn id(&self) -> NodeId {
        self.id
    }

    pub(crate) fn fill_mode(&self) -> FillMode {
        self.fill
    }

    pub(crate) fn flat(&self) -> &str {
        &self.flat
    }

    pub(crate) fn width(&self) -> Width {
        self.width
    }

    pub(crate) fn has_column_limit(&self) -> bool {
        self.has_column_limit
    }

    /// Apply the break decision to the state and record it for the
    /// writer's replay.
    pub(crate) fn compute_breaks(&self, state: State, broken: bool) -> State {
        if broken {
            let indent = state.indent() + self.plus_indent;
            state
                .with_lines_added(1)
                .with_column(indent)
                .record_break(self.id, BreakState { broken: true, indent })
        } else {
            let state = state.advanced(self.width);
            state.record_break(self.id, BreakState { broken: false, indent: 0 })
        }
    }
}

/// Partition of a level's children into maximal break-free runs and the
/// breaks separating them. For `k` breaks there are `k + 1` splits, some
/// possibly empty. Computed once per level and memoized.
pub(crate) struct SplitsBreaks {
    splits: Vec<Range<usize>>,
    breaks: Vec<usize>,
}

impl SplitsBreaks {
    pub(crate) fn split_count(&self) -> usize {
        self.splits.len()
    }

    pub(crate) fn break_count(&self) -> usize {
        self.breaks.len()
    }

    pub(crate) fn has_breaks(&self) -> bool {
        !self.breaks.is_empty()
    }

    pub(crate) fn split<'a>(&self, docs: &'a [Doc], i: usize) -> &'a [Doc] {
        &docs[self.splits[i].clone()]
    }

    pub(crate) fn break_doc<'a>(&self, docs: &'a [Doc], i: usize) -> &'a Break {
        match &docs[self.breaks[i]] {
            Doc::Break(b) => b,
            _ => unreachable!("splits_breaks indexed a non-break"),
        }
    }
}

pub(crate) fn split_by_breaks(docs: &[Doc]) -> SplitsBreaks {
    let mut splits = Vec::new();
    let mut breaks = Vec::new();
    let mut split_start = 0;
    for (i, doc) in docs.iter().enumerate() {
        if matches!(doc, Doc::Break(_)) {
            splits.push(split_start..i);
            breaks.push(i);
            split_start = i + 1;
        }
    }
    splits.push(split_start..docs.len());
    SplitsBreaks { splits, breaks }
}

/// A grouping of docs that lays out flat on one line or breaks along its
/// interior breaks, according to its [`OpenOp`].
pub struct Level {
    id: NodeId,
    open_op: OpenOp,
    docs: Vec<Doc>,
    width: OnceLock<Width>,
    flat: OnceLock<String>,
    span: OnceLock<Option<Span>>,
    splits: OnceLock<SplitsBreaks>,
}

impl Level {
    pub fn new(open_op: OpenOp, docs: Vec<Doc>) -> Level {
        Level {
            id: NodeId::next(),
            open_op,
            docs,
            width: OnceLock::new(),
            flat: OnceLock::new(),
            span: OnceLock::new(),
            splits: OnceLock::new(),
        }
    }

    pub(crate) fn id(&self) -> NodeId {
        self.id
    }

    pub(crate) fn docs(&self) -> &[Doc] {
        &self.docs
    }

    pub(crate) fn open_op(&self) -> &OpenOp {
        &self.open_op
    }

    pub(crate) fn plus_indent(&self) -> u32 {
        self.open_op.plus_indent
    }

    pub(crate) fn break_behaviour(&self) -> BreakBehaviour {
        self.open_op.break_behaviour
    }

    pub(crate) fn breakability_if_last_level(&self) -> LastLevelBreakability {
        self.open_op.breakability_if_last_level
    }

    pub(crate) fn partial_inlineability(&self) -> PartialInlineability {
        self.open_op.partial_inlineability
    }

    pub(crate) fn debug_name(&self) -> Option<&'static str> {
        self.open_op.debug_name
    }

    pub(crate) fn width(&self) -> Width {
        *self.width.get_or_init(|| width_of(&self.docs))
    }

    pub(crate) fn flat_text(&self) -> &str {
        self.flat.get_or_init(|| {
            let mut out = String::new();
            for doc in &self.docs {
                doc.flat_into(&mut out);
            }
            out
        })
    }

    pub(crate) fn span(&self) -> Option<Span> {
        *self.span.get_or_init(|| {
            self.docs
                .iter()
                .fold(None, |acc, doc| union(acc, doc.span()))
        })
    }

    pub(crate) fn splits_breaks(&self) -> &SplitsBreaks {
        self.splits.get_or_init(|| split_by_breaks(&self.docs))
    }
}

/// A node of the document tree.
pub enum Doc {
    Token(Token),
    Space,
    Break(Break),
    Level(Level),
    /// Zero-width placeholder for a token an upstream pass deleted.
    Tombstone,
}

impl Doc {
    pub fn token(text: &str, span: Span) -> Doc {
        Doc::Token(Token {
            text: text.to_owned(),
            kind: TokenKind::Plain,
            span,
            width: Width::of_str(text),
        })
    }

    pub fn line_comment(text: &str, span: Span) -> Doc {
        Doc::Token(Token {
            text: text.to_owned(),
            kind: TokenKind::LineComment,
            span,
            width: Width::of_str(text),
        })
    }

    pub fn block_comment(text: &str, span: Span) -> Doc {
        Doc::Token(Token {
            text: text.to_owned(),
            kind: TokenKind::BlockComment,
            span,
            width: Width::of_str(text),
        })
    }

    pub fn space() -> Doc {
        Doc::Space
    }

    pub fn tombstone() -> Doc {
        Doc::Tombstone
    }

    /// Flat width of this node; infinite when the node can never be
    /// rendered on one line.
    pub fn width(&self) -> Width {
        match self {
            Doc::Token(t) => t.width,
            Doc::Space => Width::columns(1),
            Doc::Break(b) => b.width(),
            Doc::Level(l) => l.width(),
            Doc::Tombstone => Width::ZERO,
        }
    }

    pub(crate) fn span(&self) -> Option<Span> {
        match self {
            Doc::Token(t) => Some(t.span),
            Doc::Level(l) => l.span(),
            Doc::Space | Doc::Break(_) | Doc::Tombstone => None,
        }
    }

    pub(crate) fn flat_into(&self, out: &mut String) {
        match self {
            Doc::Token(t) => out.push_str(&t.text),
            Doc::Space => out.push(' '),
            Doc::Break(b) => out.push_str(&b.flat),
            Doc::Level(l) => out.push_str(l.flat_text()),
            Doc::Tombstone => {}
        }
    }

    /// Advance the layout state over this node. For levels this decides
    /// and records the flat/broken choice; for leaves it advances the
    /// column and possibly the line count.
    pub(crate) fn compute_breaks(
        &self,
        ctx: &LayoutCtx<'_>,
        state: State,
        obs: &mut crate::obs::Obs,
        node: crate::obs::ObsNodeId,
    ) -> Result<State, crate::error::LayoutError> {
        match self {
            Doc::Token(t) => Ok(t.compute_breaks(ctx, state)),
            Doc::Space => Ok(state.advanced(Width::columns(1))),
            Doc::Tombstone => Ok(state),
            Doc::Break(b) => {
                let broken = b.fill_mode() == FillMode::Forced || state.must_break();
                Ok(b.compute_breaks(state, broken))
            }
            Doc::Level(l) => l.compute_breaks(ctx, state, obs, node),
        }
    }
}

impl From<Break> for Doc {
    fn from(b: Break) -> Doc {
        Doc::Break(b)
    }
}

impl From<Level> for Doc {
    fn from(l: Level) -> Doc {
        Doc::Level(l)
    }
}

/// Total flat width of a run of docs.
pub(crate) fn width_of(docs: &[Doc]) -> Width {
    docs.iter().map(Doc::width).sum()
}

/// Everything the search needs besides the tree and the state.
pub(crate) struct LayoutCtx<'a> {
    pub helper: &'a dyn crate::comments::CommentsHelper,
    pub max_width: u32,
}
