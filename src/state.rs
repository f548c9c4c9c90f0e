//! Immutable search state.
//!
//! A [`State`] is the value threaded through the layout search: where the
//! cursor is, how deep the indent is, how many lines have been emitted,
//! and every break/level decision taken so far. Updates are functional;
//! methods consume the state and return the successor. Alternatives are
//! explored by cloning at the branch point and discarding the loser, so
//! the decision maps are cloned only as often as the branching coefficient
//! allows.

use crate::doc::NodeId;
use rustc_hash::FxHashMap;

/// The decision baked into a break that the writer replays.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct BreakState {
    /// Whether the break was taken.
    pub broken: bool,
    /// Indent of the line the break opened, meaningful when `broken`.
    pub indent: u32,
}

/// Immutable state of the layout search.
#[derive(Clone, Debug)]
pub struct State {
    column: u32,
    indent: u32,
    num_lines: u32,
    must_break: bool,
    branching: u32,
    level_states: FxHashMap<NodeId, bool>,
    break_states: FxHashMap<NodeId, BreakState>,
}

impl State {
    /// The initial state: column 0, indent 0, no lines emitted.
    pub fn new() -> Self {
        State {
            column: 0,
            indent: 0,
            num_lines: 0,
            must_break: false,
            branching: 0,
            level_states: FxHashMap::default(),
            break_states: FxHashMap::default(),
        }
    }

    /// Current emission column.
    #[inline]
    pub fn column(&self) -> u32 {
        self.column
    }

    /// Current indent, in columns.
    #[inline]
    pub fn indent(&self) -> u32 {
        self.indent
    }

    /// Lines emitted so far; the metric the search minimizes.
    #[inline]
    pub fn num_lines(&self) -> u32 {
        self.num_lines
    }

    /// Whether the next break is forced to break.
    #[inline]
    pub fn must_break(&self) -> bool {
        self.must_break
    }

    /// Non-deterministic choices consumed on the path to this state.
    #[inline]
    pub fn branching_coefficient(&self) -> u32 {
        self.branching
    }

    #[must_use]
    pub fn with_column(mut self, column: u32) -> Self {
        self.column = column;
        self
    }

    #[must_use]
    pub fn with_indent(mut self, indent: u32) -> Self {
        self.indent = indent;
        self
    }

    #[must_use]
    pub fn with_indent_incremented(mut self, plus_indent: u32) -> Self {
        self.indent += plus_indent;
        self
    }

    #[must_use]
    pub fn with_must_break(mut self, must_break: bool) -> Self {
        self.must_break = must_break;
        self
    }

    /// Consume one branching credit.
    #[must_use]
    pub fn with_new_branch(mut self) -> Self {
        self.branching += 1;
        self
    }

    #[must_use]
    pub fn with_lines_added(mut self, lines: u32) -> Self {
        self.num_lines += lines;
        self
    }

    /// Advance the column past single-line text.
    #[must_use]
    pub fn advanced(mut self, width: crate::width::Width) -> Self {
        self.column = width.add_to_column(self.column);
        self
    }

    /// Advance past text that may contain newlines, as produced by the
    /// comment helper. The column ends up at the visible width of the last
    /// line.
    #[must_use]
    pub fn after_text(mut self, text: &str) -> Self {
        match text.rfind('\n') {
            Some(pos) => {
                self.num_lines += text.matches('\n').count() as u32;
                self.column = crate::width::Width::of_str(&text[pos + 1..]).add_to_column(0);
            }
            None => {
                self.column = crate::width::Width::of_str(text).add_to_column(self.column);
            }
        }
        self
    }

    /// Record a level's one-line decision.
    #[must_use]
    pub fn record_level(mut self, id: NodeId, one_line: bool) -> Self {
        self.level_states.insert(id, one_line);
        self
    }

    /// Record a break's decision for the writer to replay.
    #[must_use]
    pub fn record_break(mut self, id: NodeId, decision: BreakState) -> Self {
        self.break_states.insert(id, decision);
        self
    }

    /// Whether the level was decided to fit on one line. Levels without a
    /// recorded decision are treated as broken.
    #[inline]
    pub fn is_one_line(&self, id: NodeId) -> bool {
        self.level_states.get(&id).copied().unwrap_or(false)
    }

    /// The decision recorded for a break, if the search visited it.
    #[inline]
    pub fn break_state(&self, id: NodeId) -> Option<BreakState> {
        self.break_states.get(&id).copied()
    }

    /// Merge the result of laying out an inner level back into the outer
    /// walk: everything the inner layout decided is kept, but the outer
    /// level's indent is restored.
    #[must_use]
    pub fn update_after_level(&self, new_state: State) -> State {
        new_state.with_indent(self.indent)
    }
}

impl Default for State {
    fn default() -> Self {
        State::new()
    }
}
