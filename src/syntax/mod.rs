//! The red layer: lazy wrappers around green nodes that add parent pointers
//! and absolute positions, plus the [`SyntaxTree`] tying a parsed root to
//! its source text.

mod element;
mod iter;
mod node;
mod token;
mod token_list;

pub use element::SyntaxElement;
pub use iter::{Preorder, SyntaxElementChildren, SyntaxNodeChildren};
pub use node::SyntaxNode;
pub use token::{SyntaxToken, SyntaxTrivia, SyntaxTriviaIter, SyntaxTriviaList};
pub use token_list::{SyntaxTokenList, SyntaxTokenListIter};

use text_size::{TextRange, TextSize};

use crate::{
    diagnostic::Diagnostic,
    green::GreenNode,
    options::LuaSyntaxOptions,
    parser::{self, ParseCancelled},
    text::SourceText,
    util::CancellationToken,
};

/// A parsed source file: the source text, the dialect it was parsed under,
/// and the red root over the produced green tree.
///
/// Every parse produces a complete tree whose full text equals the input,
/// however malformed that input was; problems surface as [`Diagnostic`]s.
#[derive(Clone)]
pub struct SyntaxTree {
    source: SourceText,
    options: LuaSyntaxOptions,
    root: SyntaxNode,
}

impl SyntaxTree {
    /// Parses `source` into a tree.
    pub fn parse_text(source: SourceText, options: LuaSyntaxOptions) -> SyntaxTree {
        match Self::parse_text_with_cancellation(source, options, &CancellationToken::new()) {
            Ok(tree) => tree,
            Err(cancelled) => unreachable!("a fresh token is never cancelled: {cancelled}"),
        }
    }

    /// Parses `source`, checking `cancellation` between statements and
    /// expression productions. On cancellation no partial tree is produced.
    pub fn parse_text_with_cancellation(
        source: SourceText,
        options: LuaSyntaxOptions,
        cancellation: &CancellationToken,
    ) -> Result<SyntaxTree, ParseCancelled> {
        let green = parser::parse_chunk(source.as_str(), options.clone(), cancellation.clone())?;
        debug_assert_eq!(
            green.full_width(),
            source.len(),
            "the tree must cover the source exactly"
        );
        Ok(SyntaxTree {
            root: SyntaxNode::new_root(green),
            source,
            options,
        })
    }

    #[cfg(feature = "serde1")]
    pub(crate) fn from_parts(source: SourceText, options: LuaSyntaxOptions, green: GreenNode) -> SyntaxTree {
        SyntaxTree {
            root: SyntaxNode::new_root(green),
            source,
            options,
        }
    }

    /// The `Chunk` root node.
    pub fn root(&self) -> &SyntaxNode {
        &self.root
    }

    pub fn green_root(&self) -> &GreenNode {
        self.root.green()
    }

    pub fn source(&self) -> &SourceText {
        &self.source
    }

    pub fn options(&self) -> &LuaSyntaxOptions {
        &self.options
    }

    /// All diagnostics of the tree, in tree (pre-)order, with absolute
    /// source locations.
    pub fn diagnostics(&self) -> Vec<Diagnostic> {
        let mut diagnostics = Vec::new();
        collect_diagnostics(self.green_root(), TextSize::new(0), &mut diagnostics);
        diagnostics
    }
}

impl std::fmt::Debug for SyntaxTree {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SyntaxTree")
            .field("version", &self.options.version)
            .field("root", &self.root)
            .finish()
    }
}

fn collect_diagnostics(green: &GreenNode, position: TextSize, out: &mut Vec<Diagnostic>) {
    if !green.contains_diagnostics() {
        return;
    }
    for info in green.diagnostics() {
        let span = TextRange::at(position + info.span.start(), info.span.len());
        out.push(Diagnostic::from_info(info, span));
    }
    if green.is_token() {
        if let Some(leading) = green.leading_trivia_green() {
            collect_diagnostics(leading, position, out);
        }
        if let Some(trailing) = green.trailing_trivia_green() {
            let start = position + green.full_width() - trailing.full_width();
            collect_diagnostics(trailing, start, out);
        }
        return;
    }
    let mut offset = position;
    for child in green.slots() {
        collect_diagnostics(child, offset, out);
        offset += child.full_width();
    }
}
