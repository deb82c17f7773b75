//! Red tree iterators.
//!
//! The child iterators keep a running position at both ends and advance it
//! by the width of the slot they just handed out, so no slot position is
//! ever recomputed from scratch.

use std::iter::FusedIterator;

use text_size::TextSize;

use super::{element::SyntaxElement, node::SyntaxNode};
use crate::util::{NodeOrToken, WalkEvent};

/// Double-ended iterator over a node's children, tokens included.
#[derive(Clone)]
pub struct SyntaxElementChildren {
    parent: SyntaxNode,
    front_index: usize,
    front_position: TextSize,
    /// Exclusive.
    back_index: usize,
    back_position: TextSize,
}

impl SyntaxElementChildren {
    pub(crate) fn new(parent: SyntaxNode) -> Self {
        let back_index = parent.slot_count();
        let back_position = parent.full_span().end();
        let front_position = parent.position();
        Self {
            parent,
            front_index: 0,
            front_position,
            back_index,
            back_position,
        }
    }
}

impl Iterator for SyntaxElementChildren {
    type Item = SyntaxElement;

    fn next(&mut self) -> Option<SyntaxElement> {
        if self.front_index >= self.back_index {
            return None;
        }
        let width = self.parent.green().slots()[self.front_index].full_width();
        let element = self
            .parent
            .get_or_create_child(self.front_index, self.front_position);
        self.front_index += 1;
        self.front_position += width;
        Some(element)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = self.back_index - self.front_index;
        (remaining, Some(remaining))
    }
}

impl DoubleEndedIterator for SyntaxElementChildren {
    fn next_back(&mut self) -> Option<SyntaxElement> {
        if self.front_index >= self.back_index {
            return None;
        }
        self.back_index -= 1;
        let width = self.parent.green().slots()[self.back_index].full_width();
        self.back_position -= width;
        Some(
            self.parent
                .get_or_create_child(self.back_index, self.back_position),
        )
    }
}

impl ExactSizeIterator for SyntaxElementChildren {}
impl FusedIterator for SyntaxElementChildren {}

/// Double-ended iterator over a node's child nodes.
#[derive(Clone)]
pub struct SyntaxNodeChildren {
    inner: SyntaxElementChildren,
}

impl SyntaxNodeChildren {
    pub(crate) fn new(parent: SyntaxNode) -> Self {
        Self {
            inner: SyntaxElementChildren::new(parent),
        }
    }
}

impl Iterator for SyntaxNodeChildren {
    type Item = SyntaxNode;

    fn next(&mut self) -> Option<SyntaxNode> {
        for element in self.inner.by_ref() {
            if let NodeOrToken::Node(node) = element {
                return Some(node);
            }
        }
        None
    }
}

impl DoubleEndedIterator for SyntaxNodeChildren {
    fn next_back(&mut self) -> Option<SyntaxNode> {
        while let Some(element) = self.inner.next_back() {
            if let NodeOrToken::Node(node) = element {
                return Some(node);
            }
        }
        None
    }
}

impl FusedIterator for SyntaxNodeChildren {}

/// Enter/leave traversal over a subtree.
pub struct Preorder {
    start: SyntaxElement,
    next: Option<WalkEvent<SyntaxElement>>,
}

impl Preorder {
    pub(crate) fn new(start: SyntaxElement) -> Self {
        let next = Some(WalkEvent::Enter(start.clone()));
        Self { start, next }
    }
}

impl Iterator for Preorder {
    type Item = WalkEvent<SyntaxElement>;

    fn next(&mut self) -> Option<WalkEvent<SyntaxElement>> {
        let step = self.next.take()?;
        self.next = match &step {
            WalkEvent::Enter(element) => match element {
                NodeOrToken::Node(node) => match node.first_child_or_token() {
                    Some(child) => Some(WalkEvent::Enter(child)),
                    None => Some(WalkEvent::Leave(element.clone())),
                },
                NodeOrToken::Token(_) => Some(WalkEvent::Leave(element.clone())),
            },
            WalkEvent::Leave(element) => {
                if *element == self.start {
                    None
                } else {
                    match element.next_sibling_or_token() {
                        Some(sibling) => Some(WalkEvent::Enter(sibling)),
                        None => element
                            .parent()
                            .map(|parent| WalkEvent::Leave(NodeOrToken::Node(parent))),
                    }
                }
            }
        };
        Some(step)
    }
}

impl FusedIterator for Preorder {}
