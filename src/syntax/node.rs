//! Red nodes: green nodes with a parent and an absolute position.
//!
//! Child slots are materialized lazily and published through per-slot locks;
//! any thread may materialize a child, the first writer wins. The slots hold
//! weak references so large subtrees can be reclaimed when nobody outside
//! looks at them; a reclaimed child is simply rebuilt from its green node on
//! the next access, and node equality is position + green identity so the
//! rebuild is unobservable. Strong references only ever point from child to
//! parent, which is what keeps the spine of any live node (and nothing else)
//! alive.

use std::{
    fmt,
    hash::Hash,
    sync::{Arc, Weak},
};

use parking_lot::RwLock;
use text_size::{TextRange, TextSize};

use super::{
    element::SyntaxElement,
    iter::{Preorder, SyntaxElementChildren, SyntaxNodeChildren},
    token::{SyntaxToken, TokenData},
    token_list::SyntaxTokenList,
};
use crate::{
    green::GreenNode,
    kind::SyntaxKind,
    util::{NodeOrToken, TokenAtOffset, WalkEvent},
};

pub(crate) enum SlotRef {
    Node(Weak<NodeData>),
    Token(Weak<TokenData>),
}

impl SlotRef {
    fn upgrade(&self) -> Option<SyntaxElement> {
        match self {
            SlotRef::Node(weak) => weak.upgrade().map(|data| NodeOrToken::Node(SyntaxNode { data })),
            SlotRef::Token(weak) => weak
                .upgrade()
                .map(|data| NodeOrToken::Token(SyntaxToken { data })),
        }
    }

    fn downgrade(element: &SyntaxElement) -> SlotRef {
        match element {
            NodeOrToken::Node(node) => SlotRef::Node(Arc::downgrade(&node.data)),
            NodeOrToken::Token(token) => SlotRef::Token(Arc::downgrade(&token.data)),
        }
    }
}

pub(crate) struct NodeData {
    pub(crate) green: GreenNode,
    pub(crate) parent: Option<SyntaxNode>,
    pub(crate) index: u32,
    pub(crate) position: TextSize,
    pub(crate) children: Box<[RwLock<Option<SlotRef>>]>,
}

/// An interior node (or list) of the red tree.
#[derive(Clone)]
pub struct SyntaxNode {
    pub(crate) data: Arc<NodeData>,
}

impl SyntaxNode {
    fn make(
        green: GreenNode,
        parent: Option<SyntaxNode>,
        index: u32,
        position: TextSize,
    ) -> SyntaxNode {
        let slots = green.slot_count();
        let children = (0..slots).map(|_| RwLock::new(None)).collect();
        SyntaxNode {
            data: Arc::new(NodeData {
                green,
                parent,
                index,
                position,
                children,
            }),
        }
    }

    /// Builds a new red tree on top of a green root.
    pub fn new_root(green: GreenNode) -> SyntaxNode {
        debug_assert!(!green.is_token() && !green.is_trivia());
        Self::make(green, None, 0, TextSize::new(0))
    }

    pub fn kind(&self) -> SyntaxKind {
        self.data.green.kind()
    }

    pub fn green(&self) -> &GreenNode {
        &self.data.green
    }

    pub fn parent(&self) -> Option<&SyntaxNode> {
        self.data.parent.as_ref()
    }

    /// This node's slot index in its parent.
    pub fn index(&self) -> usize {
        self.data.index as usize
    }

    /// Absolute start, leading trivia included.
    pub fn position(&self) -> TextSize {
        self.data.position
    }

    pub fn full_span(&self) -> TextRange {
        TextRange::at(self.data.position, self.data.green.full_width())
    }

    /// Span without the leading trivia of the first token and the trailing
    /// trivia of the last.
    pub fn span(&self) -> TextRange {
        TextRange::at(
            self.data.position + self.data.green.leading_trivia_width(),
            self.data.green.width(),
        )
    }

    pub fn text(&self) -> String {
        self.data.green.text()
    }

    pub fn full_text(&self) -> String {
        self.data.green.full_text()
    }

    pub fn is_missing(&self) -> bool {
        self.data.green.is_missing()
    }

    pub fn is_list(&self) -> bool {
        self.data.green.is_list()
    }

    pub fn slot_count(&self) -> usize {
        self.data.green.slot_count()
    }

    pub(crate) fn child_position(&self, index: usize) -> TextSize {
        let mut position = self.data.position;
        for child in &self.green().slots()[..index] {
            position += child.full_width();
        }
        position
    }

    /// The child element in `index`, if there is one.
    pub fn child_or_token(&self, index: usize) -> Option<SyntaxElement> {
        if index >= self.slot_count() {
            return None;
        }
        Some(self.get_or_create_child(index, self.child_position(index)))
    }

    pub(crate) fn get_or_create_child(&self, index: usize, position: TextSize) -> SyntaxElement {
        {
            let slot = self.data.children[index].read();
            if let Some(cached) = slot.as_ref().and_then(SlotRef::upgrade) {
                return cached;
            }
        }
        let mut slot = self.data.children[index].write();
        if let Some(cached) = slot.as_ref().and_then(SlotRef::upgrade) {
            return cached;
        }
        let green = self.data.green.get_slot(index).expect("index checked").clone();
        let element: SyntaxElement = if green.is_token() {
            SyntaxToken::new(green, self.clone(), index as u32, position).into()
        } else {
            Self::make(green, Some(self.clone()), index as u32, position).into()
        };
        *slot = Some(SlotRef::downgrade(&element));
        element
    }

    /// Child nodes, skipping tokens.
    pub fn children(&self) -> SyntaxNodeChildren {
        SyntaxNodeChildren::new(self.clone())
    }

    /// All children, nodes and tokens, in order. The iterator is
    /// double-ended, so `.rev()` walks the slots backwards.
    pub fn children_with_tokens(&self) -> SyntaxElementChildren {
        SyntaxElementChildren::new(self.clone())
    }

    pub fn first_child_or_token(&self) -> Option<SyntaxElement> {
        self.child_or_token(0)
    }

    pub fn last_child_or_token(&self) -> Option<SyntaxElement> {
        self.slot_count()
            .checked_sub(1)
            .and_then(|index| self.child_or_token(index))
    }

    pub fn next_sibling_or_token(&self) -> Option<SyntaxElement> {
        let parent = self.parent()?;
        parent.child_or_token(self.index() + 1)
    }

    pub fn prev_sibling_or_token(&self) -> Option<SyntaxElement> {
        let parent = self.parent()?;
        self.index()
            .checked_sub(1)
            .and_then(|index| parent.child_or_token(index))
    }

    /// This node and its ancestors, root last.
    pub fn ancestors(&self) -> impl Iterator<Item = SyntaxNode> {
        std::iter::successors(Some(self.clone()), |node| node.parent().cloned())
    }

    /// Traverses this subtree, emitting enter/leave events for nodes and
    /// tokens.
    pub fn preorder_with_tokens(&self) -> Preorder {
        Preorder::new(self.clone().into())
    }

    /// All descendant nodes (self included), in preorder.
    pub fn descendants(&self) -> impl Iterator<Item = SyntaxNode> {
        self.preorder_with_tokens().filter_map(|event| match event {
            WalkEvent::Enter(NodeOrToken::Node(node)) => Some(node),
            _ => None,
        })
    }

    /// All descendant elements (self included), in preorder.
    pub fn descendants_with_tokens(&self) -> impl Iterator<Item = SyntaxElement> {
        self.preorder_with_tokens().filter_map(|event| match event {
            WalkEvent::Enter(element) => Some(element),
            WalkEvent::Leave(_) => None,
        })
    }

    /// All tokens under this node, in source order.
    pub fn tokens(&self) -> impl Iterator<Item = SyntaxToken> {
        self.descendants_with_tokens()
            .filter_map(SyntaxElement::into_token)
    }

    pub fn first_token(&self) -> Option<SyntaxToken> {
        for element in self.children_with_tokens() {
            if let Some(token) = element.first_token() {
                return Some(token);
            }
        }
        None
    }

    pub fn last_token(&self) -> Option<SyntaxToken> {
        for element in self.children_with_tokens().rev() {
            if let Some(token) = element.last_token() {
                return Some(token);
            }
        }
        None
    }

    /// A token-list view over the given slot, when that slot holds a single
    /// token or a list made of tokens.
    pub fn token_list(&self, slot: usize) -> Option<SyntaxTokenList> {
        let green = self.green().get_slot(slot)?;
        if green.is_token() {
            return Some(SyntaxTokenList::single(self.clone(), slot as u32));
        }
        if green.is_list() && green.slots().iter().all(GreenNode::is_token) {
            return match self.child_or_token(slot)? {
                NodeOrToken::Node(list) => Some(SyntaxTokenList::list(list)),
                NodeOrToken::Token(_) => None,
            };
        }
        None
    }

    /// The token(s) at `offset`: one token, or the two tokens either side of
    /// a boundary. Zero-width (missing) tokens are skipped.
    ///
    /// # Panics
    /// Panics when `offset` is outside this node's full span.
    pub fn token_at_offset(&self, offset: TextSize) -> TokenAtOffset<SyntaxToken> {
        let span = self.full_span();
        assert!(
            span.start() <= offset && offset <= span.end(),
            "offset {offset:?} is outside of {span:?}"
        );
        let mut found = Vec::new();
        self.collect_tokens_at(offset, &mut found);
        let mut iter = found.into_iter();
        match (iter.next(), iter.next_back()) {
            (None, _) => TokenAtOffset::None,
            (Some(single), None) => TokenAtOffset::Single(single),
            (Some(left), Some(right)) => TokenAtOffset::Between(left, right),
        }
    }

    fn collect_tokens_at(&self, offset: TextSize, found: &mut Vec<SyntaxToken>) {
        for element in self.children_with_tokens() {
            let span = element.full_span();
            if offset < span.start() {
                break;
            }
            if offset > span.end() || span.is_empty() {
                continue;
            }
            match element {
                NodeOrToken::Token(token) => found.push(token),
                NodeOrToken::Node(node) => node.collect_tokens_at(offset, found),
            }
        }
    }
}

impl PartialEq for SyntaxNode {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.data, &other.data)
            || (self.data.position == other.data.position
                && GreenNode::ptr_eq(&self.data.green, &other.data.green)
                && self.data.parent == other.data.parent)
    }
}

impl Eq for SyntaxNode {}

impl Hash for SyntaxNode {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        u32::from(self.data.position).hash(state);
        self.data.green.structural_hash().hash(state);
    }
}

impl fmt::Debug for SyntaxNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}@{:?}", self.kind(), self.span())
    }
}

impl fmt::Display for SyntaxNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.full_text())
    }
}
