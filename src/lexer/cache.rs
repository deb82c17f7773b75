//! Interning of tokens and simple trivia by hashed text.
//!
//! A fixed-size open-addressed table with a small probe window. On a miss
//! with a full window, the entry sitting farthest from its home bucket is
//! evicted. Tokens that carry diagnostics are returned but never inserted,
//! so a cache hit can never replay stale diagnostics.

use super::quick_scan::fnv1a;
use crate::{green::GreenNode, kind::SyntaxKind};

const CACHE_SIZE_BITS: usize = 11;
const CACHE_SIZE: usize = 1 << CACHE_SIZE_BITS;
const CACHE_MASK: u32 = (CACHE_SIZE - 1) as u32;
const PROBE_WINDOW: usize = 4;

#[derive(Clone)]
struct Entry {
    hash: u32,
    green: GreenNode,
}

pub(crate) struct TokenCache {
    entries: Box<[Option<Entry>]>,
}

impl TokenCache {
    pub(crate) fn new() -> Self {
        Self {
            entries: vec![None; CACHE_SIZE].into_boxed_slice(),
        }
    }

    /// Looks up a whole token (trivia included) by the full text the quick
    /// scanner matched.
    pub(crate) fn find_token(&self, full_text: &str, hash: u32) -> Option<GreenNode> {
        self.find(hash, |green| {
            green.is_token() && green.full_text_matches(full_text)
        })
    }

    /// Looks up a bare identifier-or-keyword token of the given kind.
    pub(crate) fn find_identifier(&self, text: &str, hash: u32, kind: SyntaxKind) -> Option<GreenNode> {
        self.find(hash, |green| {
            green.kind() == kind
                && green.leading_trivia_green().is_none()
                && green.trailing_trivia_green().is_none()
                && green.token_text() == Some(text)
        })
    }

    /// Interns a whitespace or end-of-line trivia piece, creating it on the
    /// first miss.
    pub(crate) fn trivia(&mut self, kind: SyntaxKind, text: &str) -> GreenNode {
        let hash = fnv1a(text.as_bytes());
        if let Some(hit) = self.find(hash, |green| {
            green.kind() == kind && green.trivia_text() == Some(text)
        }) {
            return hit;
        }
        let trivia = GreenNode::trivia(kind, text);
        self.insert(hash, trivia.clone());
        trivia
    }

    fn find(&self, hash: u32, matches: impl Fn(&GreenNode) -> bool) -> Option<GreenNode> {
        let home = hash & CACHE_MASK;
        for probe in 0..PROBE_WINDOW {
            let index = (home as usize + probe) & CACHE_MASK as usize;
            if let Some(entry) = &self.entries[index] {
                if entry.hash == hash && matches(&entry.green) {
                    return Some(entry.green.clone());
                }
            }
        }
        None
    }

    pub(crate) fn insert(&mut self, hash: u32, green: GreenNode) {
        if green.contains_diagnostics() || green.contains_annotations() {
            return;
        }
        let home = hash & CACHE_MASK;
        let mut victim = home as usize;
        let mut victim_distance = 0usize;
        for probe in 0..PROBE_WINDOW {
            let index = (home as usize + probe) & CACHE_MASK as usize;
            match &self.entries[index] {
                None => {
                    self.entries[index] = Some(Entry { hash, green });
                    return;
                }
                Some(entry) => {
                    let distance = probe_distance(entry.hash, index);
                    if distance > victim_distance {
                        victim = index;
                        victim_distance = distance;
                    }
                }
            }
        }
        self.entries[victim] = Some(Entry { hash, green });
    }
}

fn probe_distance(hash: u32, index: usize) -> usize {
    let home = (hash & CACHE_MASK) as usize;
    (index + CACHE_SIZE - home) & CACHE_MASK as usize
}
