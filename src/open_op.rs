//! Immutable level configuration.
//!
//! An [`OpenOp`] is attached to a level when the upstream translator opens
//! it and never changes afterwards. It carries everything the search needs
//! to decide how the level may break: the extra indent to apply when it
//! does, the break behaviour, and how the level participates in inline
//! chains when it is the last child of its parent.

/// How a break behaves relative to its siblings once the enclosing level
/// has decided to break.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum FillMode {
    /// Breaks together with every other unified break in the level.
    Unified,
    /// Breaks on its own, only when the following split does not fit
    /// (fill layout).
    Independent,
    /// Always breaks; poisons the enclosing level's flat width.
    Forced,
}

/// What a level does when it does not fit on one line.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum BreakBehaviour {
    /// Break unconditionally.
    BreakThisLevel,
    /// Explore breaking only the last inner level and keep the result if
    /// it produces fewer lines than a normal break.
    PreferBreakingLastInnerLevel { keep_indent_when_inlined: bool },
    /// If some inner level broke anyway, try to inline this level's prefix
    /// up to the last non-empty inner level.
    BreakOnlyIfInnerLevelsThenFitOnOneLine { keep_indent_when_inlined: bool },
}

/// How a level may be entered by an inline chain when it is the last child
/// of its parent. Consulted only during [`BreakBehaviour::PreferBreakingLastInnerLevel`]
/// inline attempts.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum LastLevelBreakability {
    /// Never inline into this level.
    Abort,
    /// Recurse into this level's own last-level inline attempt. Requires
    /// the level's behaviour to prefer breaking its last inner level;
    /// anything else is a malformed tree.
    CheckInner,
    /// Inline into this level if its pre-break prefix fits.
    AcceptInlineChain,
    /// Accept the inline chain while the chain is simple, otherwise fall
    /// back to `CheckInner`.
    AcceptInlineChainIfSimpleOtherwiseCheckInner,
}

/// Whether a level may be laid out partially inline at all.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Default)]
pub enum PartialInlineability {
    /// Only normal breaking applies.
    Never,
    /// Partial inlining is allowed when the pre-break prefix fits.
    #[default]
    IfPrefixFits,
}

/// The immutable characteristics of a level, fixed at construction.
#[derive(Clone, Debug)]
pub struct OpenOp {
    /// Additional indent applied when the level breaks.
    pub plus_indent: u32,
    pub break_behaviour: BreakBehaviour,
    pub breakability_if_last_level: LastLevelBreakability,
    pub partial_inlineability: PartialInlineability,
    /// Tighter column cap for the position before the last column-limited
    /// break in the level; the level is not one-lineable past it.
    pub column_limit_before_last_break: Option<u32>,
    /// Name shown in exploration dumps.
    pub debug_name: Option<&'static str>,
    /// Whether the level's structure permits chained inlining.
    pub simple: bool,
}

impl Default for OpenOp {
    fn default() -> Self {
        OpenOp {
            plus_indent: 0,
            break_behaviour: BreakBehaviour::BreakThisLevel,
            breakability_if_last_level: LastLevelBreakability::Abort,
            partial_inlineability: PartialInlineability::default(),
            column_limit_before_last_break: None,
            debug_name: None,
            simple: false,
        }
    }
}

impl OpenOp {
    /// A plain unconditionally-breaking level with the given extra indent.
    pub fn breaking(plus_indent: u32) -> Self {
        OpenOp {
            plus_indent,
            ..OpenOp::default()
        }
    }

    #[must_use]
    pub fn with_debug_name(mut self, name: &'static str) -> Self {
        self.debug_name = Some(name);
        self
    }
}
