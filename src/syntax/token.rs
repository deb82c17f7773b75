//! Red tokens and trivia.

use std::{fmt, hash::Hash, sync::Arc};

use text_size::{TextRange, TextSize};

use super::{SyntaxElement, SyntaxNode};
use crate::{
    green::{GreenNode, TokenValue},
    kind::SyntaxKind,
};

pub(crate) struct TokenData {
    pub(crate) green: GreenNode,
    pub(crate) parent: SyntaxNode,
    pub(crate) index: u32,
    pub(crate) position: TextSize,
}

/// A token of the red tree: a green token plus its parent and absolute
/// position.
#[derive(Clone)]
pub struct SyntaxToken {
    pub(crate) data: Arc<TokenData>,
}

impl SyntaxToken {
    pub(crate) fn new(
        green: GreenNode,
        parent: SyntaxNode,
        index: u32,
        position: TextSize,
    ) -> Self {
        debug_assert!(green.is_token());
        Self {
            data: Arc::new(TokenData {
                green,
                parent,
                index,
                position,
            }),
        }
    }

    pub fn kind(&self) -> SyntaxKind {
        self.data.green.kind()
    }

    pub fn green(&self) -> &GreenNode {
        &self.data.green
    }

    pub fn parent(&self) -> &SyntaxNode {
        &self.data.parent
    }

    /// This token's slot index in its parent.
    pub fn index(&self) -> usize {
        self.data.index as usize
    }

    /// Span including leading and trailing trivia.
    pub fn full_span(&self) -> TextRange {
        TextRange::at(self.data.position, self.data.green.full_width())
    }

    /// Span of the token text only.
    pub fn span(&self) -> TextRange {
        TextRange::at(
            self.data.position + self.data.green.leading_trivia_width(),
            self.data.green.width(),
        )
    }

    /// The token's own text, trivia excluded.
    pub fn text(&self) -> &str {
        self.data.green.token_text().unwrap_or("")
    }

    pub fn full_text(&self) -> String {
        self.data.green.full_text()
    }

    pub fn value(&self) -> &TokenValue {
        self.data
            .green
            .token_value()
            .expect("red tokens always wrap green tokens")
    }

    pub fn is_missing(&self) -> bool {
        self.data.green.is_missing()
    }

    pub fn leading_trivia(&self) -> SyntaxTriviaList {
        SyntaxTriviaList::new(
            self.clone(),
            self.data.green.leading_trivia_green().cloned(),
            self.data.position,
        )
    }

    pub fn trailing_trivia(&self) -> SyntaxTriviaList {
        let green = &self.data.green;
        let start = self.data.position + green.full_width()
            - green.trailing_trivia_width();
        SyntaxTriviaList::new(self.clone(), green.trailing_trivia_green().cloned(), start)
    }

    pub fn next_sibling_or_token(&self) -> Option<SyntaxElement> {
        self.data.parent.child_or_token(self.index() + 1)
    }

    pub fn prev_sibling_or_token(&self) -> Option<SyntaxElement> {
        self.index()
            .checked_sub(1)
            .and_then(|index| self.data.parent.child_or_token(index))
    }

    /// The next token of the tree, in source order.
    pub fn next_token(&self) -> Option<SyntaxToken> {
        let mut search = self.next_sibling_or_token();
        let mut ancestor = Some(self.data.parent.clone());
        loop {
            while search.is_none() {
                let node = ancestor?;
                search = node.next_sibling_or_token();
                ancestor = node.parent().cloned();
            }
            let element = search.take().expect("loop above ensures a candidate");
            if let Some(token) = element.first_token() {
                return Some(token);
            }
            // A token-less element (e.g. an empty block); move past it.
            search = element.next_sibling_or_token();
        }
    }

    pub fn prev_token(&self) -> Option<SyntaxToken> {
        let mut search = self.prev_sibling_or_token();
        let mut ancestor = Some(self.data.parent.clone());
        loop {
            while search.is_none() {
                let node = ancestor?;
                search = node.prev_sibling_or_token();
                ancestor = node.parent().cloned();
            }
            let element = search.take().expect("loop above ensures a candidate");
            if let Some(token) = element.last_token() {
                return Some(token);
            }
            search = element.prev_sibling_or_token();
        }
    }
}

impl PartialEq for SyntaxToken {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.data, &other.data)
            || (self.data.position == other.data.position
                && GreenNode::ptr_eq(&self.data.green, &other.data.green)
                && self.data.parent == other.data.parent)
    }
}

impl Eq for SyntaxToken {}

impl Hash for SyntaxToken {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        u32::from(self.data.position).hash(state);
        self.data.green.structural_hash().hash(state);
    }
}

impl fmt::Debug for SyntaxToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}@{:?}", self.kind(), self.span())?;
        if self.text().len() < 25 {
            write!(f, " {:?}", self.text())?;
        }
        Ok(())
    }
}

impl fmt::Display for SyntaxToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.text())
    }
}

/// One piece of trivia with its absolute position.
#[derive(Clone)]
pub struct SyntaxTrivia {
    green: GreenNode,
    token: SyntaxToken,
    position: TextSize,
}

impl SyntaxTrivia {
    pub fn kind(&self) -> SyntaxKind {
        self.green.kind()
    }

    pub fn text(&self) -> &str {
        self.green.trivia_text().unwrap_or("")
    }

    pub fn span(&self) -> TextRange {
        TextRange::at(self.position, self.green.full_width())
    }

    /// The token this trivia hangs off.
    pub fn token(&self) -> &SyntaxToken {
        &self.token
    }
}

impl fmt::Debug for SyntaxTrivia {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}@{:?}", self.kind(), self.span())
    }
}

/// The leading or trailing trivia of a token.
#[derive(Clone)]
pub struct SyntaxTriviaList {
    token: SyntaxToken,
    green: Option<GreenNode>,
    position: TextSize,
}

impl SyntaxTriviaList {
    fn new(token: SyntaxToken, green: Option<GreenNode>, position: TextSize) -> Self {
        Self {
            token,
            green,
            position,
        }
    }

    pub fn count(&self) -> usize {
        match &self.green {
            None => 0,
            Some(green) if green.is_list() => green.slot_count(),
            Some(_) => 1,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.count() == 0
    }

    pub fn iter(&self) -> SyntaxTriviaIter {
        SyntaxTriviaIter {
            list: self.clone(),
            index: 0,
            position: self.position,
        }
    }

    fn piece(&self, index: usize) -> Option<GreenNode> {
        match &self.green {
            None => None,
            Some(green) if green.is_list() => green.get_slot(index).cloned(),
            Some(green) => (index == 0).then(|| green.clone()),
        }
    }
}

impl IntoIterator for &SyntaxTriviaList {
    type Item = SyntaxTrivia;
    type IntoIter = SyntaxTriviaIter;

    fn into_iter(self) -> SyntaxTriviaIter {
        self.iter()
    }
}

pub struct SyntaxTriviaIter {
    list: SyntaxTriviaList,
    index: usize,
    position: TextSize,
}

impl Iterator for SyntaxTriviaIter {
    type Item = SyntaxTrivia;

    fn next(&mut self) -> Option<SyntaxTrivia> {
        let green = self.list.piece(self.index)?;
        let trivia = SyntaxTrivia {
            position: self.position,
            token: self.list.token.clone(),
            green: green.clone(),
        };
        self.index += 1;
        self.position += green.full_width();
        Some(trivia)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = self.list.count() - self.index;
        (remaining, Some(remaining))
    }
}

impl ExactSizeIterator for SyntaxTriviaIter {}
