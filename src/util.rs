//! Small vocabulary types shared across the tree APIs.

use std::sync::{
    atomic::{AtomicBool, Ordering},
    Arc,
};

/// Either an interior node or a token.
///
/// Lua trees mix the two at every level — an `if` statement holds keyword
/// tokens right next to its condition and body nodes — so the child-facing
/// APIs traffic in this sum instead of committing to one side. The red
/// layer's [`SyntaxElement`](crate::SyntaxElement) is the instantiation used
/// throughout.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeOrToken<N, T> {
    Node(N),
    Token(T),
}

impl<N, T> NodeOrToken<N, T> {
    pub fn as_node(&self) -> Option<&N> {
        match self {
            NodeOrToken::Node(node) => Some(node),
            NodeOrToken::Token(_) => None,
        }
    }

    pub fn as_token(&self) -> Option<&T> {
        match self {
            NodeOrToken::Token(token) => Some(token),
            NodeOrToken::Node(_) => None,
        }
    }

    pub fn into_node(self) -> Option<N> {
        match self {
            NodeOrToken::Node(node) => Some(node),
            NodeOrToken::Token(_) => None,
        }
    }

    pub fn into_token(self) -> Option<T> {
        match self {
            NodeOrToken::Token(token) => Some(token),
            NodeOrToken::Node(_) => None,
        }
    }
}

/// One step of a depth-first walk: every element is announced once on the
/// way down and once on the way back up, so a consumer can track nesting
/// without keeping its own stack.
#[derive(Debug, Clone, Copy)]
pub enum WalkEvent<T> {
    Enter(T),
    Leave(T),
}

/// The answer to "which token covers this source offset?".
///
/// An offset inside a token names that token alone. An offset on the seam
/// between two tokens names both. Nothing is named for an empty chunk, or
/// when only zero-width missing tokens touch the offset (those are skipped —
/// they have no text to land on).
#[derive(Debug, Clone)]
pub enum TokenAtOffset<T> {
    None,
    Single(T),
    Between(T, T),
}

impl<T> TokenAtOffset<T> {
    /// Collapses a seam to the token ending at the offset.
    pub fn left_biased(self) -> Option<T> {
        match self {
            TokenAtOffset::None => None,
            TokenAtOffset::Single(token) | TokenAtOffset::Between(token, _) => Some(token),
        }
    }

    /// Collapses a seam to the token starting at the offset.
    pub fn right_biased(self) -> Option<T> {
        match self {
            TokenAtOffset::None => None,
            TokenAtOffset::Single(token) | TokenAtOffset::Between(_, token) => Some(token),
        }
    }
}

/// A cooperative cancellation signal for long-running parses.
///
/// Cloning shares the underlying flag; `cancel` is sticky. The parser polls
/// the token between statements and expression productions and bails out with
/// [`ParseCancelled`](crate::ParseCancelled) once it observes the flag.
#[derive(Debug, Clone, Default)]
pub struct CancellationToken {
    flag: Arc<AtomicBool>,
}

impl CancellationToken {
    pub fn new() -> Self {
        Self::default()
    }

    /// Signals cancellation to every clone of this token.
    pub fn cancel(&self) {
        self.flag.store(true, Ordering::Release);
    }

    pub fn is_cancelled(&self) -> bool {
        self.flag.load(Ordering::Acquire)
    }
}
