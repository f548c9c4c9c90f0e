//! The layout search.
//!
//! # Algorithm
//!
//! For every level the search first tries to fit the whole level flat on
//! the current line. If that fails, the level's break behaviour decides
//! what happens next:
//!
//! - `BreakThisLevel` breaks unconditionally.
//! - `PreferBreakingLastInnerLevel` explores both the normal break and an
//!   inline chain that keeps everything but the last inner level on the
//!   current line, then keeps whichever produced fewer lines (ties go to
//!   the normal break).
//! - `BreakOnlyIfInnerLevelsThenFitOnOneLine` lays the level out broken,
//!   and if some inner level broke anyway, tries to re-lay the level with
//!   its own breaks flat so only the inner breaks survive.
//!
//! Alternatives are explored through the observer so the accepted branch
//! is recorded and losers are discarded wholesale. The number of
//! explored alternatives on any path is capped by
//! [`MAX_BRANCHING_COEFFICIENT`]; past the cap only the normal break is
//! taken.

use super::visitors::{count_width_until_break, starts_with_break, StartsWithBreak};
use super::{split_by_breaks, width_of, Break, Doc, LayoutCtx, Level, SplitsBreaks};
use crate::error::LayoutError;
use crate::obs::{Obs, ObsNodeId};
use crate::open_op::{BreakBehaviour, FillMode, LastLevelBreakability, PartialInlineability};
use crate::state::State;
use crate::width::Width;
use tracing::trace;

/// How many times the search may consider breaking vs. not breaking on
/// one path before it stops branching and always breaks.
pub const MAX_BRANCHING_COEFFICIENT: u32 = 20;

impl Level {
    /// Decide this level's layout and fold the decision into the state.
    pub(crate) fn compute_breaks(
        &self,
        ctx: &LayoutCtx<'_>,
        state: State,
        obs: &mut Obs,
        parent: ObsNodeId,
    ) -> Result<State, LayoutError> {
        if let Some(column) = self.fits_on_one_line(ctx.max_width, state.column(), self.docs()) {
            trace!(name = ?self.debug_name(), column, "level fits flat");
            return Ok(state.with_column(column).record_level(self.id(), true));
        }

        let entry_indent = state.indent();
        let level_node = obs.level_node(parent, self.debug_name(), &state);

        let new_state = match self.break_behaviour() {
            BreakBehaviour::BreakThisLevel => {
                let broken = self.break_normally(ctx, state, obs, level_node)?;
                obs.accept(broken)
            }
            BreakBehaviour::PreferBreakingLastInnerLevel { .. } => {
                self.prefer_breaking_last_inner_level(ctx, state, obs, level_node)?
            }
            BreakBehaviour::BreakOnlyIfInnerLevelsThenFitOnOneLine {
                keep_indent_when_inlined,
            } => self.break_only_if_inner_levels_broke(
                ctx,
                state,
                keep_indent_when_inlined,
                obs,
                level_node,
            )?,
        };

        Ok(new_state.with_indent(entry_indent))
    }

    /// Try to fit `docs` onto the current line, honoring this level's
    /// column limit before its last column-limited break. Returns the
    /// column after the run when it fits.
    fn fits_on_one_line(&self, max_width: u32, start_column: u32, docs: &[Doc]) -> Option<u32> {
        let mut column = Width::columns(start_column);
        let mut before_last_limited_break = 0u32;
        for doc in docs {
            match doc {
                Doc::Break(b) if b.has_column_limit() => {
                    before_last_limited_break = column.add_to_column(0);
                    column += b.width();
                }
                Doc::Level(inner) => {
                    // Inner levels may carry their own column limit, so recurse.
                    let col = column.finite()?;
                    column =
                        Width::columns(inner.fits_on_one_line(max_width, col, inner.docs())?);
                }
                other => column += other.width(),
            }
        }
        if let Some(limit) = self.open_op().column_limit_before_last_break {
            if before_last_limited_break > limit {
                return None;
            }
        }
        let column = column.finite()?;
        (column <= max_width).then_some(column)
    }

    fn break_normally(
        &self,
        ctx: &LayoutCtx<'_>,
        state: State,
        obs: &mut Obs,
        level_node: ObsNodeId,
    ) -> Result<crate::obs::Exploration, LayoutError> {
        let state = state.with_indent_incremented(self.plus_indent());
        obs.explore(level_node, "breaking normally", |obs, node| {
            self.compute_broken(ctx, state, obs, node)
        })
    }

    /// Explore the normal break and the inline chain, keep the cheaper.
    fn prefer_breaking_last_inner_level(
        &self,
        ctx: &LayoutCtx<'_>,
        state: State,
        obs: &mut Obs,
        level_node: ObsNodeId,
    ) -> Result<State, LayoutError> {
        let state = state.with_new_branch();
        let broken = self.break_normally(ctx, state.clone(), obs, level_node)?;

        if state.branching_coefficient() < MAX_BRANCHING_COEFFICIENT {
            let inline_state = state.clone();
            let inlined = obs.maybe_explore(level_node, "inline last level", |obs, node| {
                self.try_break_last_level(ctx, inline_state, obs, node, true)
            })?;
            if let Some(inlined) = inlined {
                if inlined.state().num_lines() < broken.state().num_lines() {
                    return Ok(obs.accept(inlined));
                }
            }
        }
        Ok(obs.accept(broken))
    }

    fn break_only_if_inner_levels_broke(
        &self,
        ctx: &LayoutCtx<'_>,
        state: State,
        keep_indent: bool,
        obs: &mut Obs,
        level_node: ObsNodeId,
    ) -> Result<State, LayoutError> {
        let broken_entry = state.clone().with_indent_incremented(self.plus_indent());
        let broken = obs.explore(level_node, "breaking normally", |obs, node| {
            self.compute_broken(ctx, broken_entry, obs, node)
        })?;

        if self.partial_inlineability() == PartialInlineability::Never {
            return Ok(obs.accept(broken));
        }

        let broken_state = broken.state().clone();
        let inlined = obs.maybe_explore(level_node, "inline up to broken inner level", {
            let attempt = state;
            |obs, node| {
                self.try_inline_prefix_of_broken(ctx, attempt, &broken_state, keep_indent, obs, node)
            }
        })?;

        match inlined {
            Some(inlined) => Ok(obs.accept(inlined)),
            None => Ok(obs.accept(broken)),
        }
    }

    /// The inline path of `BreakOnlyIfInnerLevelsThenFitOnOneLine`: if
    /// some inner level broke in the normal layout, re-lay this level
    /// with its own breaks flat, provided everything up to the last
    /// non-empty inner level's first break fits on the line.
    fn try_inline_prefix_of_broken(
        &self,
        ctx: &LayoutCtx<'_>,
        state: State,
        broken_state: &State,
        keep_indent: bool,
        obs: &mut Obs,
        node: ObsNodeId,
    ) -> Result<Option<State>, LayoutError> {
        let any_inner_broken = self.docs().iter().any(|doc| match doc {
            Doc::Level(inner) => !broken_state.is_one_line(inner.id()),
            _ => false,
        });
        if !any_inner_broken {
            return Ok(None);
        }

        // The last non-empty inner level; levels after it (e.g. a closing
        // delimiter group) may be empty and are skipped.
        let mut last: Option<(usize, &Level)> = None;
        for (i, doc) in self.docs().iter().enumerate() {
            if let Doc::Level(inner) = doc {
                if starts_with_break(doc) != StartsWithBreak::Empty {
                    last = Some((i, inner));
                }
            }
        }
        let Some((last_idx, last)) = last else {
            return Err(LayoutError::Inconsistency(
                "inner levels were broken but no non-empty inner level exists",
            ));
        };

        // Everything before the last level, plus the last level's own
        // prefix up to its first break, must fit on the current line.
        let mut leading_width = width_of(&self.docs()[..last_idx]);
        leading_width +=
            count_width_until_break(last, ctx.max_width.saturating_sub(state.indent()));
        if leading_width.add_to_column(state.column()) > ctx.max_width {
            return Ok(None);
        }

        let mut state = state;
        if keep_indent {
            state = state.with_indent_incremented(self.plus_indent());
        }
        self.lay_out_on_one_line(ctx, state, self.docs(), self.splits_breaks(), obs, node)
            .map(Some)
    }

    /// Inline chain for method-chain-like structures: keep everything but
    /// the last inner level on the current line and let the last level
    /// break by itself.
    fn try_break_last_level(
        &self,
        ctx: &LayoutCtx<'_>,
        state: State,
        obs: &mut Obs,
        node: ObsNodeId,
        is_simple_so_far: bool,
    ) -> Result<Option<State>, LayoutError> {
        let Some(Doc::Level(last)) = self.docs().last() else {
            return Ok(None);
        };
        // Only split levels that have declared they want to be split this way.
        if last.breakability_if_last_level() == LastLevelBreakability::Abort {
            return Ok(None);
        }
        if last.partial_inlineability() == PartialInlineability::Never {
            return Ok(None);
        }
        let leading = &self.docs()[..self.docs().len() - 1];
        if self
            .fits_on_one_line(ctx.max_width, state.column(), leading)
            .is_none()
        {
            return Ok(None);
        }

        let prefix = split_by_breaks(leading);
        let is_simple_inlining = is_simple_so_far && self.open_op().simple;

        let laid = self.lay_out_on_one_line(ctx, state.clone(), leading, &prefix, obs, node)?;
        // A break fired even though the leading width fit, e.g. because an
        // inner level carries a column limit. Bail out.
        if laid.num_lines() != state.num_lines() {
            return Ok(None);
        }

        match last.breakability_if_last_level() {
            LastLevelBreakability::AcceptInlineChainIfSimpleOtherwiseCheckInner
                if is_simple_inlining =>
            {
                accept_inline_chain(ctx, last, laid, obs, node)
            }
            LastLevelBreakability::AcceptInlineChainIfSimpleOtherwiseCheckInner
            | LastLevelBreakability::CheckInner => {
                check_inner(ctx, last, is_simple_inlining, laid, obs, node)
            }
            LastLevelBreakability::AcceptInlineChain => {
                accept_inline_chain(ctx, last, laid, obs, node)
            }
            LastLevelBreakability::Abort => Ok(None),
        }
    }

    /// Lay this level out with its own breaks flat; inner levels still
    /// break according to their own behaviour. The resulting `must_break`
    /// is true when the content did not fit on exactly one line.
    fn lay_out_on_one_line(
        &self,
        ctx: &LayoutCtx<'_>,
        mut state: State,
        docs: &[Doc],
        splits_breaks: &SplitsBreaks,
        obs: &mut Obs,
        node: ObsNodeId,
    ) -> Result<State, LayoutError> {
        for i in 0..splits_breaks.split_count() {
            if i > 0 {
                state = splits_breaks.break_doc(docs, i - 1).compute_breaks(state, false);
            }
            let split = splits_breaks.split(docs, i);
            let enough_room = width_of(split).add_to_column(state.column()) <= ctx.max_width;
            state = compute_split(ctx, split, state.with_must_break(false), obs, node)?;
            if !enough_room {
                state = state.with_must_break(true);
            }
        }
        Ok(state)
    }

    /// Lay this level out across multiple lines.
    fn compute_broken(
        &self,
        ctx: &LayoutCtx<'_>,
        mut state: State,
        obs: &mut Obs,
        node: ObsNodeId,
    ) -> Result<State, LayoutError> {
        let splits_breaks = self.splits_breaks();
        if splits_breaks.has_breaks() {
            state = state.record_level(self.id(), false);
        }

        state =
            self.compute_break_and_split(ctx, state, None, splits_breaks.split(self.docs(), 0), obs, node)?;
        for i in 0..splits_breaks.break_count() {
            state = self.compute_break_and_split(
                ctx,
                state,
                Some(splits_breaks.break_doc(self.docs(), i)),
                splits_breaks.split(self.docs(), i + 1),
                obs,
                node,
            )?;
        }
        Ok(state)
    }

    /// Lay out one break-separated group of docs.
    fn compute_break_and_split(
        &self,
        ctx: &LayoutCtx<'_>,
        state: State,
        break_doc: Option<&Break>,
        split: &[Doc],
        obs: &mut Obs,
        node: ObsNodeId,
    ) -> Result<State, LayoutError> {
        let break_width = break_doc.map_or(Width::ZERO, Break::width);
        let should_break = break_doc.is_some_and(|b| b.fill_mode() == FillMode::Unified)
            || state.must_break()
            || break_width.is_infinite()
            || self
                .fits_on_one_line(
                    ctx.max_width,
                    break_width.add_to_column(state.column()),
                    split,
                )
                .is_none();

        let mut state = state;
        if let Some(b) = break_doc {
            state = b.compute_breaks(state, should_break);
        }
        let enough_room = width_of(split).add_to_column(state.column()) <= ctx.max_width;
        state = compute_split(ctx, split, state.with_must_break(false), obs, node)?;
        if !enough_room {
            // Break after, too.
            state = state.with_must_break(true);
        }
        Ok(state)
    }
}

fn compute_split(
    ctx: &LayoutCtx<'_>,
    docs: &[Doc],
    mut state: State,
    obs: &mut Obs,
    node: ObsNodeId,
) -> Result<State, LayoutError> {
    for doc in docs {
        state = doc.compute_breaks(ctx, state, obs, node)?;
    }
    Ok(state)
}

/// Verify there is room for the last level's pre-break prefix, then
/// recurse into its full layout so chains keep collapsing.
fn accept_inline_chain(
    ctx: &LayoutCtx<'_>,
    last: &Level,
    state: State,
    obs: &mut Obs,
    node: ObsNodeId,
) -> Result<Option<State>, LayoutError> {
    let budget = ctx.max_width.saturating_sub(state.indent());
    let extra = count_width_until_break(last, budget);
    if extra.add_to_column(state.column()) > ctx.max_width {
        return Ok(None);
    }

    let child = obs.level_node(node, last.debug_name(), &state);
    let chain_state = state;
    let exploration = obs.explore(child, "end of inline chain", |obs, n| {
        last.compute_breaks(ctx, chain_state, obs, n)
    })?;
    Ok(Some(obs.accept(exploration)))
}

/// Recurse into the last level's own inline attempt. Only levels that
/// prefer breaking their last inner level can be entered this way.
fn check_inner(
    ctx: &LayoutCtx<'_>,
    last: &Level,
    is_simple_inlining: bool,
    state: State,
    obs: &mut Obs,
    node: ObsNodeId,
) -> Result<Option<State>, LayoutError> {
    match last.break_behaviour() {
        BreakBehaviour::PreferBreakingLastInnerLevel {
            keep_indent_when_inlined,
        } => {
            let mut state = state;
            if keep_indent_when_inlined {
                state = state.with_indent_incremented(last.plus_indent());
            }
            let child = obs.level_node(node, last.debug_name(), &state);
            let inner_state = state;
            let exploration = obs.maybe_explore(child, "recurse into inner chain", |obs, n| {
                last.try_break_last_level(ctx, inner_state, obs, n, is_simple_inlining)
            })?;
            Ok(exploration.map(|e| obs.accept(e)))
        }
        _ => Err(LayoutError::MalformedTree(
            "check-inner last level does not prefer breaking its last inner level",
        )),
    }
}
