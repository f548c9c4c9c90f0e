//! Exploration observer.
//!
//! Every alternative the search tries is registered here as a node in an
//! exploration tree: which level was being laid out, what was attempted,
//! how many lines it cost, and which branch was finally accepted. The
//! engine's correctness does not depend on the tree; it exists so a
//! decision can be inspected after the fact with [`Obs::dump`].
//!
//! Recording is off by default. A disabled observer allocates nothing and
//! every call collapses to running the exploration closure.

use crate::error::LayoutError;
use crate::state::State;
use std::fmt::Write as _;
use tracing::trace;

/// Handle to a node in the exploration tree.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct ObsNodeId(usize);

/// One explored alternative: the state it produced and where it was
/// recorded. Passing it to [`Obs::accept`] designates the branch the
/// writer will follow; dropping it discards the branch.
pub struct Exploration {
    state: State,
    node: ObsNodeId,
}

impl Exploration {
    /// The state this alternative produced.
    pub fn state(&self) -> &State {
        &self.state
    }
}

enum NodeKind {
    Root,
    Level {
        name: Option<&'static str>,
        column: u32,
    },
    Exploration {
        label: &'static str,
    },
}

struct Node {
    kind: NodeKind,
    children: Vec<usize>,
    result_lines: Option<u32>,
    accepted: bool,
}

/// Recorder for the exploration tree.
pub struct Obs {
    record: bool,
    nodes: Vec<Node>,
}

impl Obs {
    /// A new observer; `record` enables the exploration tree.
    pub fn new(record: bool) -> Self {
        let nodes = if record {
            vec![Node {
                kind: NodeKind::Root,
                children: Vec::new(),
                result_lines: None,
                accepted: true,
            }]
        } else {
            Vec::new()
        };
        Obs { record, nodes }
    }

    /// The root node layout starts from.
    pub fn root(&self) -> ObsNodeId {
        ObsNodeId(0)
    }

    fn child(&mut self, parent: ObsNodeId, kind: NodeKind) -> ObsNodeId {
        if !self.record {
            return ObsNodeId(0);
        }
        let id = self.nodes.len();
        self.nodes.push(Node {
            kind,
            children: Vec::new(),
            result_lines: None,
            accepted: false,
        });
        self.nodes[parent.0].children.push(id);
        ObsNodeId(id)
    }

    /// Register the level whose alternatives are about to be explored.
    pub fn level_node(
        &mut self,
        parent: ObsNodeId,
        name: Option<&'static str>,
        state: &State,
    ) -> ObsNodeId {
        self.child(
            parent,
            NodeKind::Level {
                name,
                column: state.column(),
            },
        )
    }

    /// Run one alternative and record its outcome.
    pub fn explore(
        &mut self,
        parent: ObsNodeId,
        label: &'static str,
        f: impl FnOnce(&mut Obs, ObsNodeId) -> Result<State, LayoutError>,
    ) -> Result<Exploration, LayoutError> {
        trace!(label, "explore");
        let node = self.child(parent, NodeKind::Exploration { label });
        let state = f(self, node)?;
        if self.record {
            self.nodes[node.0].result_lines = Some(state.num_lines());
        }
        Ok(Exploration { state, node })
    }

    /// Run one alternative that may decline to produce a layout.
    pub fn maybe_explore(
        &mut self,
        parent: ObsNodeId,
        label: &'static str,
        f: impl FnOnce(&mut Obs, ObsNodeId) -> Result<Option<State>, LayoutError>,
    ) -> Result<Option<Exploration>, LayoutError> {
        trace!(label, "maybe explore");
        let node = self.child(parent, NodeKind::Exploration { label });
        match f(self, node)? {
            Some(state) => {
                if self.record {
                    self.nodes[node.0].result_lines = Some(state.num_lines());
                }
                Ok(Some(Exploration { state, node }))
            }
            None => Ok(None),
        }
    }

    /// Designate the branch the writer will follow and yield its state.
    pub fn accept(&mut self, exploration: Exploration) -> State {
        if self.record {
            self.nodes[exploration.node.0].accepted = true;
        }
        trace!(lines = exploration.state.num_lines(), "accept");
        exploration.state
    }

    /// Number of alternatives explored, accepted or not.
    pub fn exploration_count(&self) -> usize {
        self.nodes
            .iter()
            .filter(|n| matches!(n.kind, NodeKind::Exploration { .. }))
            .count()
    }

    /// Indented rendering of the exploration tree; empty when recording is
    /// off.
    pub fn dump(&self) -> String {
        let mut out = String::new();
        if self.record {
            self.dump_node(0, 0, &mut out);
        }
        out
    }

    fn dump_node(&self, id: usize, depth: usize, out: &mut String) {
        let node = &self.nodes[id];
        for _ in 0..depth {
            out.push_str("  ");
        }
        match node.kind {
            NodeKind::Root => out.push_str("root"),
            NodeKind::Level { name, column } => {
                let _ = write!(out, "level {:?} @ col {}", name.unwrap_or("?"), column);
            }
            NodeKind::Exploration { label } => {
                let _ = write!(out, "explore {label:?}");
                if let Some(lines) = node.result_lines {
                    let _ = write!(out, " -> {lines} lines");
                }
                if node.accepted {
                    out.push_str(" [accepted]");
                }
            }
        }
        out.push('\n');
        for &child in &node.children {
            self.dump_node(child, depth + 1, out);
        }
    }
}
