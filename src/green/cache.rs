//! Deduplication of identical tokens and small nodes during tree
//! construction.
//!
//! Green nodes are fully immutable, so it is fine to hand out the same node
//! for structurally identical subtrees. Nodes carrying diagnostics or
//! annotations are never shared: their identity matters to whoever attached
//! the data.

use fxhash::FxHashSet;

use super::GreenNode;
use crate::kind::SyntaxKind;

/// Only nodes with at most this many children are deduplicated; bigger ones
/// are unlikely to repeat and would make cache probes expensive.
const CHILDREN_CACHE_THRESHOLD: usize = 3;

/// A `NodeCache` deduplicates identical tokens and small nodes during tree
/// construction. Reuse one cache across multiple parses to share structure
/// between the produced trees.
#[derive(Debug, Default)]
pub struct NodeCache {
    nodes: FxHashSet<GreenNode>,
    tokens: FxHashSet<GreenNode>,
    trivia: FxHashSet<GreenNode>,
}

impl NodeCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds an interior node, returning a cached identical node when one
    /// exists.
    pub fn node(&mut self, kind: SyntaxKind, children: Vec<GreenNode>) -> GreenNode {
        let count = children.len();
        let node = GreenNode::node(kind, children);
        if count <= CHILDREN_CACHE_THRESHOLD {
            Self::dedup(&mut self.nodes, node)
        } else {
            node
        }
    }

    /// Builds a list node with the best specialization, deduplicating small
    /// ones.
    pub fn list(&mut self, children: Vec<GreenNode>) -> GreenNode {
        let count = children.len();
        let list = GreenNode::list(children);
        if count <= CHILDREN_CACHE_THRESHOLD {
            Self::dedup(&mut self.nodes, list)
        } else {
            list
        }
    }

    /// Interns a finished token green.
    pub fn token(&mut self, token: GreenNode) -> GreenNode {
        debug_assert!(token.is_token());
        Self::dedup(&mut self.tokens, token)
    }

    /// Interns one piece of trivia.
    pub fn trivia(&mut self, kind: SyntaxKind, text: &str) -> GreenNode {
        let trivia = GreenNode::trivia(kind, text);
        Self::dedup(&mut self.trivia, trivia)
    }

    fn dedup(set: &mut FxHashSet<GreenNode>, green: GreenNode) -> GreenNode {
        if green.contains_diagnostics() || green.contains_annotations() {
            return green;
        }
        match set.get(&green) {
            Some(cached) => cached.clone(),
            None => {
                set.insert(green.clone());
                green
            }
        }
    }
}
