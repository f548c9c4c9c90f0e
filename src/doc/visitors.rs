//! Small analyses over the document tree.
//!
//! These answer the two questions the inlining paths keep asking: does a
//! doc begin with a break once empty wrappers are peeled away, and how
//! wide is a level's prefix up to its first break. Also home to the
//! indented debug rendering used by exploration dumps.

use super::{Doc, Level};
use crate::open_op::FillMode;
use crate::state::State;
use crate::width::Width;
use std::fmt::Write as _;

/// Answer of [`starts_with_break`].
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum StartsWithBreak {
    /// The doc renders nothing at all (tombstones, empty levels, levels
    /// of empty levels).
    Empty,
    Yes,
    No,
}

/// Whether the first thing this doc would render is a break.
pub fn starts_with_break(doc: &Doc) -> StartsWithBreak {
    match doc {
        Doc::Break(_) => StartsWithBreak::Yes,
        Doc::Token(_) | Doc::Space => StartsWithBreak::No,
        Doc::Tombstone => StartsWithBreak::Empty,
        Doc::Level(level) => {
            for child in level.docs() {
                match starts_with_break(child) {
                    StartsWithBreak::Empty => continue,
                    answer => return answer,
                }
            }
            StartsWithBreak::Empty
        }
    }
}

enum UntilBreak {
    Found(Width),
    NotFound(Width),
    Exceeded,
}

fn width_until_break(level: &Level, budget: u32, so_far: Width) -> UntilBreak {
    let mut acc = so_far;
    for doc in level.docs() {
        match doc {
            Doc::Break(_) => return UntilBreak::Found(acc),
            Doc::Level(inner) => match width_until_break(inner, budget, acc) {
                UntilBreak::Found(w) => return UntilBreak::Found(w),
                UntilBreak::NotFound(w) => acc = w,
                UntilBreak::Exceeded => return UntilBreak::Exceeded,
            },
            other => acc += other.width(),
        }
        if acc > Width::columns(budget) {
            return UntilBreak::Exceeded;
        }
    }
    UntilBreak::NotFound(acc)
}

/// Width from the start of `level` to its first break, in document order,
/// descending into inner levels. Infinite when there is no break or the
/// prefix exceeds `budget`.
pub fn count_width_until_break(level: &Level, budget: u32) -> Width {
    match width_until_break(level, budget, Width::ZERO) {
        UntilBreak::Found(w) => w,
        UntilBreak::NotFound(_) | UntilBreak::Exceeded => Width::INFINITE,
    }
}

/// Indented rendering of a doc tree with each level's decision from
/// `state`, for post-mortem inspection.
pub fn debug_representation(doc: &Doc, state: &State) -> String {
    let mut out = String::new();
    represent(doc, state, 0, &mut out);
    out
}

fn represent(doc: &Doc, state: &State, depth: usize, out: &mut String) {
    for _ in 0..depth {
        out.push_str("  ");
    }
    match doc {
        Doc::Token(t) => {
            let _ = writeln!(out, "token {:?}", t.text());
        }
        Doc::Space => {
            out.push_str("space\n");
        }
        Doc::Tombstone => {
            out.push_str("tombstone\n");
        }
        Doc::Break(b) => {
            let fill = match b.fill_mode() {
                FillMode::Unified => "unified",
                FillMode::Independent => "independent",
                FillMode::Forced => "forced",
            };
            let _ = writeln!(out, "break {:?} ({fill})", b.flat());
        }
        Doc::Level(level) => {
            let decision = if state.is_one_line(level.id()) {
                "flat"
            } else {
                "broken"
            };
            let _ = writeln!(
                out,
                "level {:?} [{decision}]",
                level.debug_name().unwrap_or("?")
            );
            for child in level.docs() {
                represent(child, state, depth + 1, out);
            }
        }
    }
}
