//! `loretta` is a lossless front-end for the Lua family of languages: a
//! lexer, a parser and an immutable concrete syntax tree covering Lua
//! 5.1 through 5.4, LuaJIT, Garry's Mod Lua and FiveM flavors.
//!
//! Trees come in two layers. The inner (_green_) layer stores the source in
//! position-independent, freely shared nodes: tokens carry their leading and
//! trailing trivia, every node knows its full width, and identical tokens or
//! small nodes are deduplicated, so the green "tree" is really a DAG. The
//! outer (_red_) layer ([`SyntaxNode`]/[`SyntaxToken`]) is materialized
//! lazily on top and adds what the green layer deliberately lacks: parent
//! pointers and absolute positions. The split is the classic
//! Roslyn/libsyntax design also found in `rowan` and `cstree`.
//!
//! Parsing never fails on bad input. The lexer turns unknown characters into
//! `BadToken`s, the parser synthesizes zero-width _missing_ tokens and folds
//! unparseable stretches into trivia, and all of it surfaces as
//! [`Diagnostic`]s on the tree. Whatever the input, the parsed tree's full
//! text reproduces it byte for byte:
//!
//! ```
//! use loretta::{parse, LuaSyntaxOptions};
//!
//! let source = "local greeting = 'hello' -- say hi";
//! let tree = parse(source, LuaSyntaxOptions::lua54());
//! assert_eq!(tree.root().full_text(), source);
//! assert!(tree.diagnostics().is_empty());
//! ```
//!
//! Dialects are selected through [`LuaSyntaxOptions`] presets; syntax from
//! the wrong dialect still parses and is reported as "not available in this
//! version" diagnostics rather than refused.

mod annotation;
mod diagnostic;
mod green;
mod kind;
mod lexer;
mod options;
mod parser;
mod syntax;
mod text;
mod util;

#[cfg(feature = "serde1")]
mod serde_impls;

// Reexport types for working with spans.
pub use text_size::{TextLen, TextRange, TextSize};

pub use crate::{
    annotation::SyntaxAnnotation,
    diagnostic::{Diagnostic, DiagnosticInfo, Location, Severity},
    green::{GreenChildren, GreenNode, NodeCache, TokenValue},
    kind::{
        category, keyword_kind, kinds_in_category, property, validate_metadata,
        MetadataDiagnostic, PropertyValue, SyntaxKind, UNARY_PRECEDENCE,
    },
    lexer::Lexer,
    options::{LuaSyntaxOptions, LuaVersion},
    parser::ParseCancelled,
    syntax::{
        Preorder, SyntaxElement, SyntaxElementChildren, SyntaxNode, SyntaxNodeChildren,
        SyntaxToken, SyntaxTokenList, SyntaxTokenListIter, SyntaxTree, SyntaxTrivia,
        SyntaxTriviaIter, SyntaxTriviaList,
    },
    text::{FileLinePositionSpan, LineIndex, LinePosition, Lines, SourceText, TextLine},
    util::{CancellationToken, NodeOrToken, TokenAtOffset, WalkEvent},
};

/// Parses `source` under the given dialect options.
pub fn parse(source: impl Into<SourceText>, options: LuaSyntaxOptions) -> SyntaxTree {
    SyntaxTree::parse_text(source.into(), options)
}

/// Parses `source`, polling `cancellation` between productions. Returns
/// [`ParseCancelled`] (and no tree) once the token is cancelled.
pub fn parse_with_cancellation(
    source: impl Into<SourceText>,
    options: LuaSyntaxOptions,
    cancellation: &CancellationToken,
) -> Result<SyntaxTree, ParseCancelled> {
    SyntaxTree::parse_text_with_cancellation(source.into(), options, cancellation)
}
