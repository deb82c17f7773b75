//! Token-list views.
//!
//! A [`SyntaxTokenList`] is a read view over one slot of a node that holds
//! either a single token or a list of tokens. The functional editing
//! operations never touch the viewed tree: they produce a fresh green list
//! (re-specialized for its new size) that callers splice into a new tree.

use text_size::TextSize;

use super::{node::SyntaxNode, token::SyntaxToken};
use crate::green::GreenNode;

#[derive(Clone)]
enum Backing {
    /// The slot holds one bare token.
    Single { parent: SyntaxNode, index: u32 },
    /// The slot holds a list node whose slots are the tokens.
    List { node: SyntaxNode },
}

/// A view of consecutive tokens backed by a single green token or a green
/// list.
#[derive(Clone)]
pub struct SyntaxTokenList {
    backing: Option<Backing>,
}

impl SyntaxTokenList {
    pub(crate) fn single(parent: SyntaxNode, index: u32) -> Self {
        Self {
            backing: Some(Backing::Single { parent, index }),
        }
    }

    pub(crate) fn list(node: SyntaxNode) -> Self {
        Self {
            backing: Some(Backing::List { node }),
        }
    }

    pub fn count(&self) -> usize {
        match &self.backing {
            None => 0,
            Some(Backing::Single { .. }) => 1,
            Some(Backing::List { node }) => node.slot_count(),
        }
    }

    /// Whether the list has any tokens.
    pub fn any(&self) -> bool {
        self.count() > 0
    }

    pub fn get(&self, index: usize) -> Option<SyntaxToken> {
        match &self.backing {
            None => None,
            Some(Backing::Single { parent, index: slot }) => (index == 0)
                .then(|| parent.child_or_token(*slot as usize))
                .flatten()
                .and_then(|element| element.into_token()),
            Some(Backing::List { node }) => node
                .child_or_token(index)
                .and_then(|element| element.into_token()),
        }
    }

    pub fn first(&self) -> Option<SyntaxToken> {
        self.get(0)
    }

    pub fn last(&self) -> Option<SyntaxToken> {
        self.count().checked_sub(1).and_then(|index| self.get(index))
    }

    pub fn index_of(&self, token: &SyntaxToken) -> Option<usize> {
        self.iter().position(|candidate| candidate == *token)
    }

    pub fn iter(&self) -> SyntaxTokenListIter {
        let (parent, green, base_index, count, position) = match &self.backing {
            None => (None, None, 0, 0, TextSize::new(0)),
            Some(Backing::Single { parent, index }) => {
                let green = parent.green().get_slot(*index as usize).cloned();
                let position = parent.child_position(*index as usize);
                (Some(parent.clone()), green, *index, 1, position)
            }
            Some(Backing::List { node }) => (
                Some(node.clone()),
                Some(node.green().clone()),
                0,
                node.slot_count(),
                node.position(),
            ),
        };
        SyntaxTokenListIter {
            parent,
            green,
            base_index,
            count,
            index: 0,
            position,
        }
    }

    /// The green tokens currently in the list.
    pub fn to_green(&self) -> Vec<GreenNode> {
        match &self.backing {
            None => Vec::new(),
            Some(Backing::Single { parent, index }) => parent
                .green()
                .get_slot(*index as usize)
                .cloned()
                .into_iter()
                .collect(),
            Some(Backing::List { node }) => node.green().slots().to_vec(),
        }
    }

    /// A new green list with `token` appended.
    pub fn push(&self, token: GreenNode) -> GreenNode {
        let mut tokens = self.to_green();
        tokens.push(token);
        GreenNode::list(tokens)
    }

    /// A new green list with `token` inserted at `index`.
    ///
    /// # Panics
    /// Panics if `index > count`.
    pub fn insert(&self, index: usize, token: GreenNode) -> GreenNode {
        let mut tokens = self.to_green();
        assert!(index <= tokens.len(), "insertion index {index} out of range");
        tokens.insert(index, token);
        GreenNode::list(tokens)
    }

    /// A new green list with `new_tokens` inserted at `index`.
    pub fn insert_range(
        &self,
        index: usize,
        new_tokens: impl IntoIterator<Item = GreenNode>,
    ) -> GreenNode {
        let mut tokens = self.to_green();
        assert!(index <= tokens.len(), "insertion index {index} out of range");
        let tail = tokens.split_off(index);
        tokens.extend(new_tokens);
        tokens.extend(tail);
        GreenNode::list(tokens)
    }

    /// A new green list without the token at `index`.
    ///
    /// # Panics
    /// Panics if `index >= count`.
    pub fn remove_at(&self, index: usize) -> GreenNode {
        let mut tokens = self.to_green();
        assert!(index < tokens.len(), "removal index {index} out of range");
        tokens.remove(index);
        GreenNode::list(tokens)
    }

    /// A new green list without the first occurrence of `token`'s green.
    /// Returns `None` when the token is not in the list.
    pub fn remove(&self, token: &SyntaxToken) -> Option<GreenNode> {
        let index = self.index_of(token)?;
        Some(self.remove_at(index))
    }

    /// A new green list with the token at `index` replaced.
    pub fn replace(&self, index: usize, token: GreenNode) -> GreenNode {
        let mut tokens = self.to_green();
        assert!(index < tokens.len(), "replacement index {index} out of range");
        tokens[index] = token;
        GreenNode::list(tokens)
    }

    /// A new green list with `range_len` tokens starting at `index` replaced
    /// by `new_tokens`.
    pub fn replace_range(
        &self,
        index: usize,
        range_len: usize,
        new_tokens: impl IntoIterator<Item = GreenNode>,
    ) -> GreenNode {
        let mut tokens = self.to_green();
        assert!(
            index + range_len <= tokens.len(),
            "replacement range {index}..{} out of range",
            index + range_len
        );
        tokens.splice(index..index + range_len, new_tokens);
        GreenNode::list(tokens)
    }
}

impl IntoIterator for &SyntaxTokenList {
    type Item = SyntaxToken;
    type IntoIter = SyntaxTokenListIter;

    fn into_iter(self) -> SyntaxTokenListIter {
        self.iter()
    }
}

/// Enumerator over a token list; advances its position by the width of the
/// token it just produced.
pub struct SyntaxTokenListIter {
    parent: Option<SyntaxNode>,
    green: Option<GreenNode>,
    base_index: u32,
    count: usize,
    index: usize,
    position: TextSize,
}

impl Iterator for SyntaxTokenListIter {
    type Item = SyntaxToken;

    fn next(&mut self) -> Option<SyntaxToken> {
        if self.index >= self.count {
            return None;
        }
        let parent = self.parent.as_ref()?;
        let green = self.green.as_ref()?;
        let (slot, width) = if green.is_token() {
            (self.base_index as usize, green.full_width())
        } else {
            let child = green.get_slot(self.index)?;
            (self.index, child.full_width())
        };
        let element = parent.get_or_create_child(slot, self.position);
        self.index += 1;
        self.position += width;
        element.into_token()
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = self.count - self.index;
        (remaining, Some(remaining))
    }
}

impl ExactSizeIterator for SyntaxTokenListIter {}
