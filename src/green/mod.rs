//! The immutable "green" layer.
//!
//! Green nodes are position independent and freely shared: identical tokens
//! and small nodes are deduplicated by [`NodeCache`] and the lexer's token
//! cache, so the green "tree" is really a DAG. Widths, trivia, diagnostics
//! and annotations all live here; parents and absolute positions are the red
//! layer's business ([`crate::syntax`]).
//!
//! A node is a tagged payload over four shapes: interior nodes with children,
//! tokens (carrying their leading/trailing trivia and a decoded value),
//! trivia, and lists with size-specialized representations.

mod cache;
mod iter;
mod list;
mod token;

pub use cache::NodeCache;
pub use iter::GreenChildren;
pub use token::TokenValue;

pub(crate) use list::GreenList;
pub(crate) use token::GreenTokenData;

use std::{
    fmt,
    hash::{Hash, Hasher},
};

use fxhash::FxHasher32;
use text_size::{TextRange, TextSize};
use triomphe::Arc;

use crate::{annotation::SyntaxAnnotation, diagnostic::DiagnosticInfo, kind::SyntaxKind};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub(crate) struct NodeFlags(u8);

impl NodeFlags {
    const CONTAINS_DIAGNOSTICS: u8 = 1 << 0;
    const CONTAINS_ANNOTATIONS: u8 = 1 << 1;
    const IS_MISSING: u8 = 1 << 2;

    fn union(self, other: NodeFlags) -> NodeFlags {
        NodeFlags(self.0 | other.0)
    }

    /// The flags a parent inherits from this child.
    fn inherited(self) -> NodeFlags {
        NodeFlags(self.0 & (Self::CONTAINS_DIAGNOSTICS | Self::CONTAINS_ANNOTATIONS))
    }

    fn with(self, bit: u8, on: bool) -> NodeFlags {
        if on {
            NodeFlags(self.0 | bit)
        } else {
            NodeFlags(self.0 & !bit)
        }
    }

    fn contains_diagnostics(self) -> bool {
        self.0 & Self::CONTAINS_DIAGNOSTICS != 0
    }

    fn contains_annotations(self) -> bool {
        self.0 & Self::CONTAINS_ANNOTATIONS != 0
    }

    fn is_missing(self) -> bool {
        self.0 & Self::IS_MISSING != 0
    }
}

#[derive(Debug, PartialEq, Eq)]
pub(crate) enum GreenDetail {
    Node { children: Box<[GreenNode]> },
    Token(GreenTokenData),
    Trivia { text: Box<str> },
    List(GreenList),
}

#[derive(Debug)]
pub(crate) struct GreenData {
    kind: SyntaxKind,
    flags: NodeFlags,
    full_width: TextSize,
    /// Structural hash, computed once at construction from the children's
    /// stored hashes so hashing a node is O(1).
    hash: u32,
    diagnostics: Box<[DiagnosticInfo]>,
    annotations: Box<[SyntaxAnnotation]>,
    detail: GreenDetail,
}

/// A node of the immutable green tree: an interior node, a token, one piece
/// of trivia, or a list.
#[derive(Clone)]
pub struct GreenNode {
    data: Arc<GreenData>,
}

const EMPTY_SLOTS: &[GreenNode] = &[];

impl GreenNode {
    fn build(
        kind: SyntaxKind,
        detail: GreenDetail,
        diagnostics: Vec<DiagnosticInfo>,
        annotations: Vec<SyntaxAnnotation>,
        missing: bool,
    ) -> GreenNode {
        let full_width = detail_full_width(&detail);
        let child_flags = detail_child_flags(&detail);
        let flags = child_flags
            .with(
                NodeFlags::CONTAINS_DIAGNOSTICS,
                child_flags.contains_diagnostics() || !diagnostics.is_empty(),
            )
            .with(
                NodeFlags::CONTAINS_ANNOTATIONS,
                child_flags.contains_annotations() || !annotations.is_empty(),
            )
            .with(NodeFlags::IS_MISSING, missing);
        let hash = compute_hash(kind, full_width, &detail, &diagnostics, &annotations);
        GreenNode {
            data: Arc::new(GreenData {
                kind,
                flags,
                full_width,
                hash,
                diagnostics: diagnostics.into_boxed_slice(),
                annotations: annotations.into_boxed_slice(),
                detail,
            }),
        }
    }

    /// Creates an interior node. `kind` must be a node kind other than
    /// `List`; the node is flagged missing when every child is.
    pub fn node(kind: SyntaxKind, children: Vec<GreenNode>) -> GreenNode {
        debug_assert!(
            kind.is_node() && kind != SyntaxKind::List,
            "{kind:?} is not an interior node kind"
        );
        let missing = !children.is_empty() && children.iter().all(GreenNode::is_missing);
        Self::build(
            kind,
            GreenDetail::Node {
                children: children.into_boxed_slice(),
            },
            Vec::new(),
            Vec::new(),
            missing,
        )
    }

    /// Creates a list node, picking the cheapest internal representation.
    pub fn list(children: Vec<GreenNode>) -> GreenNode {
        let missing = !children.is_empty() && children.iter().all(GreenNode::is_missing);
        Self::build(
            SyntaxKind::List,
            GreenDetail::List(GreenList::new(children)),
            Vec::new(),
            Vec::new(),
            missing,
        )
    }

    /// Creates a bare token without trivia or value.
    pub fn token(kind: SyntaxKind, text: &str) -> GreenNode {
        Self::token_full(kind, text, TokenValue::None, None, None, Vec::new())
    }

    /// Creates a token with trivia, value and diagnostics. Diagnostic spans
    /// are relative to the token's full start (i.e. the start of `leading`).
    pub fn token_full(
        kind: SyntaxKind,
        text: &str,
        value: TokenValue,
        leading: Option<GreenNode>,
        trailing: Option<GreenNode>,
        diagnostics: Vec<DiagnosticInfo>,
    ) -> GreenNode {
        debug_assert!(kind.is_token(), "{kind:?} is not a token kind");
        if let Some(fixed) = kind.token_text() {
            debug_assert_eq!(
                fixed, text,
                "token {kind:?} must have its fixed text {fixed:?}"
            );
        }
        debug_assert!(leading.iter().all(is_trivia_or_trivia_list));
        debug_assert!(trailing.iter().all(is_trivia_or_trivia_list));
        Self::build(
            kind,
            GreenDetail::Token(GreenTokenData {
                text: text.into(),
                value,
                leading,
                trailing,
            }),
            diagnostics,
            Vec::new(),
            false,
        )
    }

    /// A synthesized zero-width token standing in for syntax the parser
    /// expected but did not find.
    pub fn missing(kind: SyntaxKind, diagnostics: Vec<DiagnosticInfo>) -> GreenNode {
        debug_assert!(kind.is_token(), "{kind:?} is not a token kind");
        Self::build(
            kind,
            GreenDetail::Token(GreenTokenData {
                text: "".into(),
                value: TokenValue::None,
                leading: None,
                trailing: None,
            }),
            diagnostics,
            Vec::new(),
            true,
        )
    }

    /// Creates one piece of trivia.
    pub fn trivia(kind: SyntaxKind, text: &str) -> GreenNode {
        Self::trivia_with_diagnostics(kind, text, Vec::new())
    }

    pub fn trivia_with_diagnostics(
        kind: SyntaxKind,
        text: &str,
        diagnostics: Vec<DiagnosticInfo>,
    ) -> GreenNode {
        debug_assert!(kind.is_trivia(), "{kind:?} is not a trivia kind");
        Self::build(
            kind,
            GreenDetail::Trivia { text: text.into() },
            diagnostics,
            Vec::new(),
            false,
        )
    }

    pub(crate) fn restore(
        kind: SyntaxKind,
        detail: GreenDetail,
        diagnostics: Vec<DiagnosticInfo>,
        annotations: Vec<SyntaxAnnotation>,
        missing: bool,
    ) -> GreenNode {
        Self::build(kind, detail, diagnostics, annotations, missing)
    }

    pub fn kind(&self) -> SyntaxKind {
        self.data.kind
    }

    /// Width including leading and trailing trivia and all descendants.
    pub fn full_width(&self) -> TextSize {
        self.data.full_width
    }

    /// Width without the leading trivia of the first token and the trailing
    /// trivia of the last.
    pub fn width(&self) -> TextSize {
        self.full_width() - self.leading_trivia_width() - self.trailing_trivia_width()
    }

    pub fn leading_trivia_width(&self) -> TextSize {
        match &self.data.detail {
            GreenDetail::Token(token) => token
                .leading
                .as_ref()
                .map(GreenNode::full_width)
                .unwrap_or_default(),
            GreenDetail::Trivia { .. } => TextSize::default(),
            GreenDetail::Node { .. } | GreenDetail::List(_) => self
                .slots()
                .iter()
                .find(|child| child.full_width() != TextSize::default())
                .map(|child| child.leading_trivia_width())
                .unwrap_or_default(),
        }
    }

    pub fn trailing_trivia_width(&self) -> TextSize {
        match &self.data.detail {
            GreenDetail::Token(token) => token
                .trailing
                .as_ref()
                .map(GreenNode::full_width)
                .unwrap_or_default(),
            GreenDetail::Trivia { .. } => TextSize::default(),
            GreenDetail::Node { .. } | GreenDetail::List(_) => self
                .slots()
                .iter()
                .rev()
                .find(|child| child.full_width() != TextSize::default())
                .map(|child| child.trailing_trivia_width())
                .unwrap_or_default(),
        }
    }

    pub(crate) fn slots(&self) -> &[GreenNode] {
        match &self.data.detail {
            GreenDetail::Node { children } => children,
            GreenDetail::List(list) => list.slots(),
            GreenDetail::Token(_) | GreenDetail::Trivia { .. } => EMPTY_SLOTS,
        }
    }

    /// Number of child slots. Tokens and trivia have none.
    pub fn slot_count(&self) -> usize {
        self.slots().len()
    }

    /// The header-sized slot count: capped at 255, larger lists answer the
    /// real number through [`slot_count`](GreenNode::slot_count).
    pub fn raw_slot_count(&self) -> u8 {
        self.slots().len().min(255) as u8
    }

    pub fn get_slot(&self, index: usize) -> Option<&GreenNode> {
        self.slots().get(index)
    }

    pub fn children(&self) -> GreenChildren<'_> {
        GreenChildren {
            inner: self.slots().iter(),
        }
    }

    pub fn is_token(&self) -> bool {
        matches!(self.data.detail, GreenDetail::Token(_))
    }

    pub fn is_trivia(&self) -> bool {
        matches!(self.data.detail, GreenDetail::Trivia { .. })
    }

    pub fn is_list(&self) -> bool {
        matches!(self.data.detail, GreenDetail::List(_))
    }

    pub fn is_node(&self) -> bool {
        matches!(self.data.detail, GreenDetail::Node { .. })
    }

    pub fn is_missing(&self) -> bool {
        self.data.flags.is_missing()
    }

    pub fn is_separated_list(&self) -> bool {
        match &self.data.detail {
            GreenDetail::List(list) => list.is_separated(),
            _ => false,
        }
    }

    /// Elements of a separated list: the even slots.
    pub fn separated_element(&self, index: usize) -> Option<&GreenNode> {
        self.get_slot(2 * index)
    }

    /// Separators of a separated list: the odd slots.
    pub fn separator(&self, index: usize) -> Option<&GreenNode> {
        self.get_slot(2 * index + 1)
    }

    pub fn separated_element_count(&self) -> usize {
        (self.slot_count() + 1) / 2
    }

    /// This node's own diagnostics (spans relative to its full start).
    pub fn diagnostics(&self) -> &[DiagnosticInfo] {
        &self.data.diagnostics
    }

    pub fn annotations(&self) -> &[SyntaxAnnotation] {
        &self.data.annotations
    }

    /// True when this node or any descendant carries diagnostics.
    pub fn contains_diagnostics(&self) -> bool {
        self.data.flags.contains_diagnostics()
    }

    pub fn contains_annotations(&self) -> bool {
        self.data.flags.contains_annotations()
    }

    pub fn has_annotation(&self, annotation: &SyntaxAnnotation) -> bool {
        self.data.annotations.contains(annotation)
    }

    /// Token text, without trivia. `None` for non-tokens.
    pub fn token_text(&self) -> Option<&str> {
        match &self.data.detail {
            GreenDetail::Token(token) => Some(&token.text),
            _ => None,
        }
    }

    pub fn token_value(&self) -> Option<&TokenValue> {
        match &self.data.detail {
            GreenDetail::Token(token) => Some(&token.value),
            _ => None,
        }
    }

    pub fn trivia_text(&self) -> Option<&str> {
        match &self.data.detail {
            GreenDetail::Trivia { text } => Some(text),
            _ => None,
        }
    }

    /// A token's leading trivia green: one trivia or a trivia list.
    pub fn leading_trivia_green(&self) -> Option<&GreenNode> {
        match &self.data.detail {
            GreenDetail::Token(token) => token.leading.as_ref(),
            _ => None,
        }
    }

    pub fn trailing_trivia_green(&self) -> Option<&GreenNode> {
        match &self.data.detail {
            GreenDetail::Token(token) => token.trailing.as_ref(),
            _ => None,
        }
    }

    /// A copy of this node with its own diagnostics replaced. Children are
    /// shared.
    pub fn with_diagnostics(&self, diagnostics: Vec<DiagnosticInfo>) -> GreenNode {
        Self::build(
            self.data.kind,
            clone_detail(&self.data.detail),
            diagnostics,
            self.data.annotations.to_vec(),
            self.data.flags.is_missing(),
        )
    }

    /// A copy of this node with its annotations replaced. Children are
    /// shared.
    pub fn with_annotations(&self, annotations: Vec<SyntaxAnnotation>) -> GreenNode {
        Self::build(
            self.data.kind,
            clone_detail(&self.data.detail),
            self.data.diagnostics.to_vec(),
            annotations,
            self.data.flags.is_missing(),
        )
    }

    /// A copy of this token with different leading trivia. Diagnostic spans
    /// are rebased onto the new full start.
    ///
    /// # Panics
    /// Panics if this green is not a token.
    pub fn with_leading_trivia(&self, leading: Option<GreenNode>) -> GreenNode {
        let token = self.expect_token("with_leading_trivia");
        self.rebuild_token(leading, token.trailing.clone())
    }

    /// A copy of this token with different trailing trivia.
    ///
    /// # Panics
    /// Panics if this green is not a token.
    pub fn with_trailing_trivia(&self, trailing: Option<GreenNode>) -> GreenNode {
        let token = self.expect_token("with_trailing_trivia");
        self.rebuild_token(token.leading.clone(), trailing)
    }

    /// Attaches trivia to a bare token produced by the scanner.
    pub(crate) fn with_trivia(
        &self,
        leading: Option<GreenNode>,
        trailing: Option<GreenNode>,
    ) -> GreenNode {
        self.expect_token("with_trivia");
        self.rebuild_token(leading, trailing)
    }

    /// Inserts extra trivia in front of this token's existing leading trivia,
    /// used by parser error recovery to keep skipped text in the tree.
    pub(crate) fn with_prepended_leading_trivia(&self, extra: GreenNode) -> GreenNode {
        let token = self.expect_token("with_prepended_leading_trivia");
        let mut pieces = vec![extra];
        if let Some(existing) = &token.leading {
            if existing.is_list() {
                pieces.extend(existing.slots().iter().cloned());
            } else {
                pieces.push(existing.clone());
            }
        }
        let leading = if pieces.len() == 1 {
            pieces.pop()
        } else {
            Some(GreenNode::list(pieces))
        };
        self.rebuild_token(leading, token.trailing.clone())
    }

    fn expect_token(&self, operation: &str) -> &GreenTokenData {
        match &self.data.detail {
            GreenDetail::Token(token) => token,
            _ => panic!("{operation} is only valid on tokens, got {:?}", self.kind()),
        }
    }

    fn rebuild_token(&self, leading: Option<GreenNode>, trailing: Option<GreenNode>) -> GreenNode {
        let token = self.expect_token("rebuild_token");
        let old_leading_width = token
            .leading
            .as_ref()
            .map(GreenNode::full_width)
            .unwrap_or_default();
        let new_leading_width = leading
            .as_ref()
            .map(GreenNode::full_width)
            .unwrap_or_default();
        // Own diagnostics are relative to the full start; moving the leading
        // edge moves them too.
        let diagnostics = self
            .data
            .diagnostics
            .iter()
            .map(|diagnostic| {
                let start = diagnostic.span.start() + new_leading_width - old_leading_width;
                DiagnosticInfo {
                    span: TextRange::at(start, diagnostic.span.len()),
                    ..diagnostic.clone()
                }
            })
            .collect();
        Self::build(
            self.data.kind,
            GreenDetail::Token(GreenTokenData {
                text: token.text.clone(),
                value: token.value.clone(),
                leading,
                trailing,
            }),
            diagnostics,
            self.data.annotations.to_vec(),
            self.data.flags.is_missing(),
        )
    }

    /// Writes the full text, trivia included.
    pub fn write_full_text(&self, writer: &mut impl fmt::Write) -> fmt::Result {
        match &self.data.detail {
            GreenDetail::Trivia { text } => writer.write_str(text),
            GreenDetail::Token(token) => {
                if let Some(leading) = &token.leading {
                    leading.write_full_text(writer)?;
                }
                writer.write_str(&token.text)?;
                if let Some(trailing) = &token.trailing {
                    trailing.write_full_text(writer)?;
                }
                Ok(())
            }
            GreenDetail::Node { .. } | GreenDetail::List(_) => {
                for child in self.slots() {
                    child.write_full_text(writer)?;
                }
                Ok(())
            }
        }
    }

    /// The full source text this green covers, trivia included.
    pub fn full_text(&self) -> String {
        let mut text = String::with_capacity(usize::from(self.full_width()));
        self.write_full_text(&mut text)
            .expect("writing to a String cannot fail");
        text
    }

    /// The text without the outermost leading/trailing trivia.
    pub fn text(&self) -> String {
        let full = self.full_text();
        let start = usize::from(self.leading_trivia_width());
        let end = full.len() - usize::from(self.trailing_trivia_width());
        full[start..end].to_owned()
    }

    /// Strips this green's full text from the front of `text`, for
    /// allocation-free cache comparisons.
    pub(crate) fn strip_full_text<'a>(&self, text: &'a str) -> Option<&'a str> {
        match &self.data.detail {
            GreenDetail::Trivia { text: own } => text.strip_prefix(&**own),
            GreenDetail::Token(token) => {
                let text = match &token.leading {
                    Some(leading) => leading.strip_full_text(text)?,
                    None => text,
                };
                let text = text.strip_prefix(&*token.text)?;
                match &token.trailing {
                    Some(trailing) => trailing.strip_full_text(text),
                    None => Some(text),
                }
            }
            GreenDetail::Node { .. } | GreenDetail::List(_) => self
                .slots()
                .iter()
                .try_fold(text, |text, child| child.strip_full_text(text)),
        }
    }

    pub(crate) fn full_text_matches(&self, text: &str) -> bool {
        self.strip_full_text(text) == Some("")
    }

    pub(crate) fn detail(&self) -> &GreenDetail {
        &self.data.detail
    }

    pub fn ptr_eq(a: &GreenNode, b: &GreenNode) -> bool {
        Arc::ptr_eq(&a.data, &b.data)
    }

    pub(crate) fn structural_hash(&self) -> u32 {
        self.data.hash
    }
}

fn is_trivia_or_trivia_list(green: &GreenNode) -> bool {
    green.is_trivia() || (green.is_list() && green.slots().iter().all(GreenNode::is_trivia))
}

fn clone_detail(detail: &GreenDetail) -> GreenDetail {
    match detail {
        GreenDetail::Node { children } => GreenDetail::Node {
            children: children.clone(),
        },
        GreenDetail::Token(token) => GreenDetail::Token(token.clone()),
        GreenDetail::Trivia { text } => GreenDetail::Trivia { text: text.clone() },
        GreenDetail::List(list) => GreenDetail::List(list.clone()),
    }
}

fn detail_full_width(detail: &GreenDetail) -> TextSize {
    match detail {
        GreenDetail::Trivia { text } => TextSize::of(&**text),
        GreenDetail::Token(token) => {
            let leading = token
                .leading
                .as_ref()
                .map(GreenNode::full_width)
                .unwrap_or_default();
            let trailing = token
                .trailing
                .as_ref()
                .map(GreenNode::full_width)
                .unwrap_or_default();
            leading + TextSize::of(&*token.text) + trailing
        }
        GreenDetail::Node { children } => children.iter().map(GreenNode::full_width).sum(),
        GreenDetail::List(list) => list.slots().iter().map(GreenNode::full_width).sum(),
    }
}

fn detail_child_flags(detail: &GreenDetail) -> NodeFlags {
    let mut flags = NodeFlags::default();
    match detail {
        GreenDetail::Trivia { .. } => {}
        GreenDetail::Token(token) => {
            for trivia in token.leading.iter().chain(token.trailing.iter()) {
                flags = flags.union(trivia.data.flags.inherited());
            }
        }
        GreenDetail::Node { children } => {
            for child in children.iter() {
                flags = flags.union(child.data.flags.inherited());
            }
        }
        GreenDetail::List(list) => {
            for child in list.slots() {
                flags = flags.union(child.data.flags.inherited());
            }
        }
    }
    flags
}

fn compute_hash(
    kind: SyntaxKind,
    full_width: TextSize,
    detail: &GreenDetail,
    diagnostics: &[DiagnosticInfo],
    annotations: &[SyntaxAnnotation],
) -> u32 {
    let mut hasher = FxHasher32::default();
    kind.into_raw().hash(&mut hasher);
    u32::from(full_width).hash(&mut hasher);
    match detail {
        GreenDetail::Trivia { text } => {
            0u8.hash(&mut hasher);
            text.hash(&mut hasher);
        }
        GreenDetail::Token(token) => {
            1u8.hash(&mut hasher);
            token.text.hash(&mut hasher);
            token.value.hash(&mut hasher);
            for trivia in token.leading.iter().chain(token.trailing.iter()) {
                trivia.data.hash.hash(&mut hasher);
            }
        }
        GreenDetail::Node { children } => {
            2u8.hash(&mut hasher);
            children.len().hash(&mut hasher);
            for child in children.iter() {
                child.data.hash.hash(&mut hasher);
            }
        }
        GreenDetail::List(list) => {
            3u8.hash(&mut hasher);
            list.slots().len().hash(&mut hasher);
            for child in list.slots() {
                child.data.hash.hash(&mut hasher);
            }
        }
    }
    diagnostics.hash(&mut hasher);
    for annotation in annotations {
        annotation.id().hash(&mut hasher);
    }
    hasher.finish() as u32
}

impl PartialEq for GreenNode {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.data, &other.data)
            || (self.data.kind == other.data.kind
                && self.data.full_width == other.data.full_width
                && self.data.hash == other.data.hash
                && self.data.flags == other.data.flags
                && self.data.diagnostics == other.data.diagnostics
                && self.data.annotations == other.data.annotations
                && self.data.detail == other.data.detail)
    }
}

impl Eq for GreenNode {}

impl Hash for GreenNode {
    fn hash<H: Hasher>(&self, state: &mut H) {
        state.write_u32(self.data.hash);
    }
}

impl fmt::Debug for GreenNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut dbg = f.debug_struct("GreenNode");
        dbg.field("kind", &self.kind())
            .field("full_width", &self.full_width());
        match &self.data.detail {
            GreenDetail::Trivia { text } => {
                dbg.field("text", text);
            }
            GreenDetail::Token(token) => {
                dbg.field("text", &token.text);
            }
            GreenDetail::Node { .. } | GreenDetail::List(_) => {
                dbg.field("slots", &self.slot_count());
            }
        }
        dbg.finish()
    }
}

impl fmt::Display for GreenNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.write_full_text(f)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ws() -> GreenNode {
        GreenNode::trivia(SyntaxKind::Whitespace, " ")
    }

    #[test]
    fn token_widths() {
        let token = GreenNode::token_full(
            SyntaxKind::Identifier,
            "foo",
            TokenValue::None,
            Some(ws()),
            Some(ws()),
            Vec::new(),
        );
        assert_eq!(token.full_width(), TextSize::new(5));
        assert_eq!(token.width(), TextSize::new(3));
        assert_eq!(token.leading_trivia_width(), TextSize::new(1));
        assert_eq!(token.full_text(), " foo ");
        assert_eq!(token.text(), "foo");
    }

    #[test]
    fn node_width_is_sum_of_children() {
        let a = GreenNode::token(SyntaxKind::Identifier, "a");
        let dot = GreenNode::token(SyntaxKind::Dot, ".");
        let b = GreenNode::token(SyntaxKind::Identifier, "b");
        let node = GreenNode::node(SyntaxKind::MemberAccessExpression, vec![a, dot, b]);
        assert_eq!(node.full_width(), TextSize::new(3));
        assert_eq!(node.slot_count(), 3);
        assert_eq!(node.full_text(), "a.b");
    }

    #[test]
    fn structural_equality_across_builds() {
        let build = || {
            GreenNode::node(
                SyntaxKind::NameExpression,
                vec![GreenNode::token(SyntaxKind::Identifier, "x")],
            )
        };
        assert_eq!(build(), build());
        assert!(!GreenNode::ptr_eq(&build(), &build()));
    }

    #[test]
    fn diagnostics_propagate_upward() {
        let diag = DiagnosticInfo::error(
            "LUA1001",
            "unexpected character",
            TextRange::empty(TextSize::new(0)),
        );
        let bad = GreenNode::token_full(
            SyntaxKind::BadToken,
            "$",
            TokenValue::None,
            None,
            None,
            vec![diag],
        );
        let node = GreenNode::node(SyntaxKind::ExpressionStatement, vec![bad]);
        assert!(node.contains_diagnostics());
        assert!(node.diagnostics().is_empty());
    }

    #[test]
    fn with_trivia_rebases_diagnostics() {
        let diag = DiagnosticInfo::error(
            "LUA1006",
            "malformed number",
            TextRange::at(TextSize::new(0), TextSize::new(2)),
        );
        let token = GreenNode::token_full(
            SyntaxKind::Number,
            "1e",
            TokenValue::None,
            None,
            None,
            vec![diag],
        );
        let with_leading = token.with_leading_trivia(Some(ws()));
        assert_eq!(
            with_leading.diagnostics()[0].span,
            TextRange::at(TextSize::new(1), TextSize::new(2))
        );
        assert_eq!(with_leading.full_text(), " 1e");
    }

    #[test]
    fn missing_tokens_flag_their_parents() {
        let missing = GreenNode::missing(SyntaxKind::EndKeyword, Vec::new());
        assert!(missing.is_missing());
        assert_eq!(missing.full_width(), TextSize::new(0));
        let node = GreenNode::node(SyntaxKind::DoStatement, vec![missing]);
        assert!(node.is_missing());
    }

    #[test]
    fn strip_full_text_matches() {
        let token = GreenNode::token_full(
            SyntaxKind::Identifier,
            "foo",
            TokenValue::None,
            Some(ws()),
            None,
            Vec::new(),
        );
        assert!(token.full_text_matches(" foo"));
        assert!(!token.full_text_matches("foo"));
    }
}
