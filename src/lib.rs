//! Line-layout engine for a source-code pretty-printer.
//!
//! Given a document tree of formatting instructions produced by an
//! upstream translator, the engine decides for every candidate break
//! whether to break or stay flat, then emits the final text under a hard
//! column budget.
//!
//! # Quick Start
//!
//! ```
//! use layline::{render, Break, CommentReflower, Doc, FillMode, LayoutOptions, Level, OpenOp, Span};
//!
//! let body = Level::new(
//!     OpenOp::breaking(2),
//!     vec![
//!         Break::new(FillMode::Unified, " ", 0).into(),
//!         Doc::token("x();", Span::new(9, 13)),
//!     ],
//! );
//! let root = Level::new(
//!     OpenOp::default(),
//!     vec![
//!         Doc::token("class T {", Span::new(0, 9)),
//!         body.into(),
//!         Break::new(FillMode::Unified, " ", 0).into(),
//!         Doc::token("}", Span::new(14, 15)),
//!     ],
//! )
//! .into();
//!
//! let out = render(&root, &CommentReflower::new(), &LayoutOptions::new(10)).unwrap();
//! assert_eq!(out, "class T {\n  x();\n}\n");
//! ```
//!
//! # Architecture
//!
//! Layout is two passes over an immutable tree:
//!
//! 1. **Search** ([`doc::level`]): for each level, try to fit it flat;
//!    otherwise dispatch on its break behaviour, possibly exploring
//!    several alternatives and keeping the one with the fewest lines.
//!    Every decision lands in an immutable [`State`] value.
//! 2. **Write** ([`output`]): replay the decided state over the tree,
//!    emitting `(text, span)` chunks to a [`Sink`].
//!
//! The search is pure and single-threaded; the only I/O is the writer's
//! appends to its sink. Two runs on identical input produce byte-identical
//! output.

pub mod comments;
pub mod config;
pub mod doc;
pub mod error;
pub mod obs;
pub mod open_op;
pub mod output;
pub mod span;
pub mod state;
pub mod width;

pub use comments::{CommentReflower, CommentsHelper, PassthroughComments};
pub use config::{LayoutOptions, MAX_LINE_WIDTH};
pub use doc::visitors::{debug_representation, starts_with_break, StartsWithBreak};
pub use doc::{Break, Doc, Level, NodeId, Token, TokenKind, MAX_BRANCHING_COEFFICIENT};
pub use error::LayoutError;
pub use obs::{Exploration, Obs, ObsNodeId};
pub use open_op::{
    BreakBehaviour, FillMode, LastLevelBreakability, OpenOp, PartialInlineability,
};
pub use output::{Chunk, Sink, TextSink, Writer};
pub use span::Span;
pub use state::{BreakState, State};
pub use width::Width;

use doc::LayoutCtx;

/// A decided layout: the accepted state plus the exploration record.
pub struct Layout {
    state: State,
    obs: Obs,
}

impl Layout {
    /// The accepted final state.
    pub fn state(&self) -> &State {
        &self.state
    }

    /// The exploration record; empty unless
    /// [`LayoutOptions::record_explorations`] was set.
    pub fn obs(&self) -> &Obs {
        &self.obs
    }

    /// Replay the decisions over `doc`, emitting to `sink`.
    pub fn write_to(
        &self,
        doc: &Doc,
        helper: &dyn CommentsHelper,
        options: &LayoutOptions,
        sink: &mut dyn Sink,
    ) {
        Writer::new(&self.state, helper, options.max_width, sink).write(doc);
    }
}

/// Run the layout search over a document tree.
///
/// Pure: the tree is not modified and no output is produced. The returned
/// [`Layout`] carries every break and level decision for the write pass.
pub fn lay_out(
    doc: &Doc,
    helper: &dyn CommentsHelper,
    options: &LayoutOptions,
) -> Result<Layout, LayoutError> {
    let mut obs = Obs::new(options.record_explorations);
    let root = obs.root();
    let ctx = LayoutCtx {
        helper,
        max_width: options.max_width,
    };
    let state = doc.compute_breaks(&ctx, State::new(), &mut obs, root)?;
    Ok(Layout { state, obs })
}

/// Lay out and render a document tree to a string ending in a newline.
pub fn render(
    doc: &Doc,
    helper: &dyn CommentsHelper,
    options: &LayoutOptions,
) -> Result<String, LayoutError> {
    let layout = lay_out(doc, helper, options)?;
    let mut sink = TextSink::new();
    layout.write_to(doc, helper, options, &mut sink);
    Ok(sink.finish())
}

/// Lay out and render a document tree to span-annotated chunks.
pub fn render_chunks(
    doc: &Doc,
    helper: &dyn CommentsHelper,
    options: &LayoutOptions,
) -> Result<Vec<Chunk>, LayoutError> {
    let layout = lay_out(doc, helper, options)?;
    let mut sink = TextSink::new();
    layout.write_to(doc, helper, options, &mut sink);
    Ok(sink.into_chunks())
}
