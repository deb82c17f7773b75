//! The parser: recursive descent for statements, precedence climbing for
//! expressions, both driven by the kind table's operator metadata.
//!
//! The parser never fails on malformed input. Missing syntax is synthesized
//! as zero-width tokens carrying diagnostics, and stretches of unparseable
//! tokens are folded into `SkippedTokens` trivia on the next real token, so
//! the produced tree always covers the input exactly. The only error path
//! out is external cancellation.

use std::{error::Error, fmt};

use text_size::{TextRange, TextSize};

use crate::{
    diagnostic::DiagnosticInfo,
    green::{GreenNode, NodeCache},
    kind::{SyntaxKind, UNARY_PRECEDENCE},
    lexer::Lexer,
    options::LuaSyntaxOptions,
    util::CancellationToken,
};

/// Parsing was cancelled through the caller's [`CancellationToken`]; no tree
/// was produced.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ParseCancelled;

impl fmt::Display for ParseCancelled {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("parsing was cancelled")
    }
}

impl Error for ParseCancelled {}

type PResult<T> = Result<T, ParseCancelled>;

/// Parses `text` into a `Chunk` green node.
pub(crate) fn parse_chunk(
    text: &str,
    options: LuaSyntaxOptions,
    cancellation: CancellationToken,
) -> Result<GreenNode, ParseCancelled> {
    Parser::new(text, options, cancellation).chunk()
}

struct Parser<'s> {
    lexer: Lexer<'s>,
    current: GreenNode,
    next: GreenNode,
    cache: NodeCache,
    options: LuaSyntaxOptions,
    cancellation: CancellationToken,
}

fn is_block_terminator(kind: SyntaxKind) -> bool {
    matches!(
        kind,
        SyntaxKind::EndKeyword
            | SyntaxKind::ElseKeyword
            | SyntaxKind::ElseIfKeyword
            | SyntaxKind::UntilKeyword
            | SyntaxKind::EndOfFileToken
    )
}

fn starts_statement(kind: SyntaxKind) -> bool {
    matches!(
        kind,
        SyntaxKind::Semicolon
            | SyntaxKind::IfKeyword
            | SyntaxKind::WhileKeyword
            | SyntaxKind::DoKeyword
            | SyntaxKind::ForKeyword
            | SyntaxKind::RepeatKeyword
            | SyntaxKind::FunctionKeyword
            | SyntaxKind::LocalKeyword
            | SyntaxKind::ReturnKeyword
            | SyntaxKind::BreakKeyword
            | SyntaxKind::ContinueKeyword
            | SyntaxKind::GotoKeyword
            | SyntaxKind::ColonColon
            | SyntaxKind::Identifier
            | SyntaxKind::OpenParen
    )
}

fn token_description(kind: SyntaxKind) -> String {
    match kind.token_text() {
        Some(text) => format!("'{text}'"),
        None => match kind {
            SyntaxKind::Identifier => "an identifier".to_owned(),
            SyntaxKind::Number => "a number".to_owned(),
            SyntaxKind::StringLiteral => "a string".to_owned(),
            SyntaxKind::EndOfFileToken => "the end of the file".to_owned(),
            _ => format!("{kind:?}"),
        },
    }
}

/// Adds a diagnostic spanning the node's text (trivia excluded).
fn with_node_diagnostic(node: GreenNode, id: &'static str, message: String) -> GreenNode {
    let mut diagnostics = node.diagnostics().to_vec();
    let span = TextRange::new(
        node.leading_trivia_width(),
        node.full_width() - node.trailing_trivia_width(),
    );
    diagnostics.push(DiagnosticInfo::error(id, message, span));
    node.with_diagnostics(diagnostics)
}

impl<'s> Parser<'s> {
    fn new(text: &'s str, options: LuaSyntaxOptions, cancellation: CancellationToken) -> Self {
        let mut lexer = Lexer::new(text, options.clone());
        let current = lexer.next_token();
        let next = lexer.next_token();
        Self {
            lexer,
            current,
            next,
            cache: NodeCache::new(),
            options,
            cancellation,
        }
    }

    fn check_cancellation(&self) -> PResult<()> {
        if self.cancellation.is_cancelled() {
            Err(ParseCancelled)
        } else {
            Ok(())
        }
    }

    fn current_kind(&self) -> SyntaxKind {
        self.current.kind()
    }

    fn peek_kind(&self) -> SyntaxKind {
        self.next.kind()
    }

    fn at(&self, kind: SyntaxKind) -> bool {
        self.current_kind() == kind
    }

    fn bump(&mut self) -> GreenNode {
        let pulled = self.lexer.next_token();
        let next = std::mem::replace(&mut self.next, pulled);
        std::mem::replace(&mut self.current, next)
    }

    /// Consumes the expected token, or synthesizes a missing one carrying an
    /// "expected ..." diagnostic.
    fn expect(&mut self, kind: SyntaxKind) -> GreenNode {
        if self.at(kind) {
            return self.bump();
        }
        let message = format!(
            "expected {} but found {}",
            token_description(kind),
            token_description(self.current_kind())
        );
        GreenNode::missing(
            kind,
            vec![DiagnosticInfo::error(
                "LUA2001",
                message,
                TextRange::empty(TextSize::new(0)),
            )],
        )
    }

    fn node(&mut self, kind: SyntaxKind, children: Vec<GreenNode>) -> GreenNode {
        self.cache.node(kind, children)
    }

    fn list(&mut self, children: Vec<GreenNode>) -> GreenNode {
        self.cache.list(children)
    }

    // ------------------------------------------------------------------
    // blocks & statements
    // ------------------------------------------------------------------

    fn chunk(mut self) -> PResult<GreenNode> {
        let mut statements = Vec::new();
        let mut saw_return = false;
        loop {
            self.statement_list(&mut statements, &mut saw_return)?;
            if self.at(SyntaxKind::EndOfFileToken) {
                break;
            }
            // A stray block terminator at the top level.
            self.skip_one_token();
        }
        let list = self.list(statements);
        let block = self.node(SyntaxKind::Block, vec![list]);
        let eof = self.bump();
        Ok(GreenNode::node(SyntaxKind::Chunk, vec![block, eof]))
    }

    fn block(&mut self) -> PResult<GreenNode> {
        let mut statements = Vec::new();
        let mut saw_return = false;
        self.statement_list(&mut statements, &mut saw_return)?;
        let list = self.list(statements);
        Ok(self.node(SyntaxKind::Block, vec![list]))
    }

    fn statement_list(
        &mut self,
        statements: &mut Vec<GreenNode>,
        saw_return: &mut bool,
    ) -> PResult<()> {
        loop {
            self.check_cancellation()?;
            let kind = self.current_kind();
            if is_block_terminator(kind) {
                return Ok(());
            }
            if !starts_statement(kind) {
                self.skip_unexpected_tokens();
                continue;
            }
            let is_return = kind == SyntaxKind::ReturnKeyword;
            let mut statement = self.statement()?;
            if *saw_return {
                statement = with_node_diagnostic(
                    statement,
                    "LUA2007",
                    "a return statement must be the last statement in a block".to_owned(),
                );
            }
            if is_return {
                *saw_return = true;
            }
            statements.push(statement);
        }
    }

    fn statement(&mut self) -> PResult<GreenNode> {
        match self.current_kind() {
            SyntaxKind::Semicolon => {
                let semicolon = self.bump();
                Ok(self.node(SyntaxKind::EmptyStatement, vec![semicolon]))
            }
            SyntaxKind::IfKeyword => self.if_statement(),
            SyntaxKind::WhileKeyword => self.while_statement(),
            SyntaxKind::DoKeyword => self.do_statement(),
            SyntaxKind::ForKeyword => self.for_statement(),
            SyntaxKind::RepeatKeyword => self.repeat_statement(),
            SyntaxKind::FunctionKeyword => self.function_declaration(),
            SyntaxKind::LocalKeyword => self.local_statement(),
            SyntaxKind::ReturnKeyword => self.return_statement(),
            SyntaxKind::BreakKeyword => {
                let keyword = self.bump();
                Ok(self.node(SyntaxKind::BreakStatement, vec![keyword]))
            }
            SyntaxKind::ContinueKeyword => {
                let keyword = self.bump();
                Ok(self.node(SyntaxKind::ContinueStatement, vec![keyword]))
            }
            SyntaxKind::GotoKeyword => {
                let keyword = self.bump();
                let label = self.expect(SyntaxKind::Identifier);
                Ok(self.node(SyntaxKind::GotoStatement, vec![keyword, label]))
            }
            SyntaxKind::ColonColon => self.label_statement(),
            _ => self.expression_statement(),
        }
    }

    fn if_statement(&mut self) -> PResult<GreenNode> {
        let if_keyword = self.bump();
        let condition = self.expression()?;
        let then_keyword = self.expect(SyntaxKind::ThenKeyword);
        let body = self.block()?;
        let mut children = vec![if_keyword, condition, then_keyword, body];

        let mut else_ifs = Vec::new();
        while self.at(SyntaxKind::ElseIfKeyword) {
            self.check_cancellation()?;
            let keyword = self.bump();
            let condition = self.expression()?;
            let then_keyword = self.expect(SyntaxKind::ThenKeyword);
            let body = self.block()?;
            let clause = self.node(
                SyntaxKind::ElseIfClause,
                vec![keyword, condition, then_keyword, body],
            );
            else_ifs.push(clause);
        }
        if !else_ifs.is_empty() {
            let list = self.list(else_ifs);
            children.push(list);
        }

        if self.at(SyntaxKind::ElseKeyword) {
            let keyword = self.bump();
            let body = self.block()?;
            let clause = self.node(SyntaxKind::ElseClause, vec![keyword, body]);
            children.push(clause);
        }

        children.push(self.expect(SyntaxKind::EndKeyword));
        Ok(self.node(SyntaxKind::IfStatement, children))
    }

    fn while_statement(&mut self) -> PResult<GreenNode> {
        let while_keyword = self.bump();
        let condition = self.expression()?;
        let do_keyword = self.expect(SyntaxKind::DoKeyword);
        let body = self.block()?;
        let end_keyword = self.expect(SyntaxKind::EndKeyword);
        Ok(self.node(
            SyntaxKind::WhileStatement,
            vec![while_keyword, condition, do_keyword, body, end_keyword],
        ))
    }

    fn do_statement(&mut self) -> PResult<GreenNode> {
        let do_keyword = self.bump();
        let body = self.block()?;
        let end_keyword = self.expect(SyntaxKind::EndKeyword);
        Ok(self.node(
            SyntaxKind::DoStatement,
            vec![do_keyword, body, end_keyword],
        ))
    }

    fn repeat_statement(&mut self) -> PResult<GreenNode> {
        let repeat_keyword = self.bump();
        let body = self.block()?;
        let until_keyword = self.expect(SyntaxKind::UntilKeyword);
        let condition = self.expression()?;
        Ok(self.node(
            SyntaxKind::RepeatStatement,
            vec![repeat_keyword, body, until_keyword, condition],
        ))
    }

    fn for_statement(&mut self) -> PResult<GreenNode> {
        let for_keyword = self.bump();
        let first_token = self.expect(SyntaxKind::Identifier);
        let first_name = self.node(SyntaxKind::NameExpression, vec![first_token]);

        if self.at(SyntaxKind::Equals) {
            let equals = self.bump();
            let start = self.expression()?;
            let comma = self.expect(SyntaxKind::Comma);
            let limit = self.expression()?;
            let mut children = vec![for_keyword, first_name, equals, start, comma, limit];
            if self.at(SyntaxKind::Comma) {
                children.push(self.bump());
                children.push(self.expression()?);
            }
            children.push(self.expect(SyntaxKind::DoKeyword));
            children.push(self.block()?);
            children.push(self.expect(SyntaxKind::EndKeyword));
            return Ok(self.node(SyntaxKind::NumericForStatement, children));
        }

        let mut names = vec![first_name];
        while self.at(SyntaxKind::Comma) {
            names.push(self.bump());
            let token = self.expect(SyntaxKind::Identifier);
            let name = self.node(SyntaxKind::NameExpression, vec![token]);
            names.push(name);
        }
        let names = self.list(names);
        let in_keyword = self.expect(SyntaxKind::InKeyword);
        let values = self.expression_list()?;
        let do_keyword = self.expect(SyntaxKind::DoKeyword);
        let body = self.block()?;
        let end_keyword = self.expect(SyntaxKind::EndKeyword);
        Ok(self.node(
            SyntaxKind::GenericForStatement,
            vec![for_keyword, names, in_keyword, values, do_keyword, body, end_keyword],
        ))
    }

    fn label_statement(&mut self) -> PResult<GreenNode> {
        let open = self.bump();
        let name = self.expect(SyntaxKind::Identifier);
        let close = self.expect(SyntaxKind::ColonColon);
        let mut statement = self.node(SyntaxKind::LabelStatement, vec![open, name, close]);
        if !self.options.accept_goto {
            statement = with_node_diagnostic(
                statement,
                "LUA2003",
                format!("labels are not available in {}", self.options.version),
            );
        }
        Ok(statement)
    }

    fn function_declaration(&mut self) -> PResult<GreenNode> {
        let function_keyword = self.bump();
        let name = self.function_name();
        let parameters = self.parameter_list()?;
        let body = self.block()?;
        let end_keyword = self.expect(SyntaxKind::EndKeyword);
        Ok(self.node(
            SyntaxKind::FunctionDeclaration,
            vec![function_keyword, name, parameters, body, end_keyword],
        ))
    }

    fn function_name(&mut self) -> GreenNode {
        let mut parts = vec![self.expect(SyntaxKind::Identifier)];
        while self.at(SyntaxKind::Dot) {
            parts.push(self.bump());
            parts.push(self.expect(SyntaxKind::Identifier));
        }
        if self.at(SyntaxKind::Colon) {
            parts.push(self.bump());
            parts.push(self.expect(SyntaxKind::Identifier));
        }
        self.node(SyntaxKind::FunctionName, parts)
    }

    fn parameter_list(&mut self) -> PResult<GreenNode> {
        let open = self.expect(SyntaxKind::OpenParen);
        let mut items = Vec::new();
        if !self.at(SyntaxKind::CloseParen) && !self.at(SyntaxKind::EndOfFileToken) {
            loop {
                self.check_cancellation()?;
                let parameter = if self.at(SyntaxKind::DotDotDot) {
                    let token = self.bump();
                    self.node(SyntaxKind::VarArgExpression, vec![token])
                } else {
                    let token = self.expect(SyntaxKind::Identifier);
                    self.node(SyntaxKind::NameExpression, vec![token])
                };
                items.push(parameter);
                if self.at(SyntaxKind::Comma) {
                    items.push(self.bump());
                } else {
                    break;
                }
            }
        }
        let items = self.list(items);
        let close = self.expect(SyntaxKind::CloseParen);
        Ok(self.node(SyntaxKind::ParameterList, vec![open, items, close]))
    }

    fn local_statement(&mut self) -> PResult<GreenNode> {
        let local_keyword = self.bump();
        if self.at(SyntaxKind::FunctionKeyword) {
            let function_keyword = self.bump();
            let name = self.expect(SyntaxKind::Identifier);
            let parameters = self.parameter_list()?;
            let body = self.block()?;
            let end_keyword = self.expect(SyntaxKind::EndKeyword);
            return Ok(self.node(
                SyntaxKind::LocalFunctionDeclaration,
                vec![local_keyword, function_keyword, name, parameters, body, end_keyword],
            ));
        }

        let mut names = vec![self.local_name()];
        while self.at(SyntaxKind::Comma) {
            names.push(self.bump());
            names.push(self.local_name());
        }
        let names = self.list(names);
        let mut children = vec![local_keyword, names];
        if self.at(SyntaxKind::Equals) {
            children.push(self.bump());
            children.push(self.expression_list()?);
        }
        Ok(self.node(SyntaxKind::LocalDeclaration, children))
    }

    fn local_name(&mut self) -> GreenNode {
        let name = self.expect(SyntaxKind::Identifier);
        if !self.at(SyntaxKind::Less) {
            return self.node(SyntaxKind::LocalName, vec![name]);
        }
        let open = self.bump();
        let attribute_name = self.expect(SyntaxKind::Identifier);
        let known = matches!(attribute_name.token_text(), Some("const") | Some("close"));
        let close = self.expect(SyntaxKind::Greater);
        let mut attribute = self.node(
            SyntaxKind::NameAttribute,
            vec![open, attribute_name, close],
        );
        if !known {
            attribute = with_node_diagnostic(
                attribute,
                "LUA2008",
                "unknown variable attribute, expected 'const' or 'close'".to_owned(),
            );
        }
        if !self.options.accept_local_attributes {
            attribute = with_node_diagnostic(
                attribute,
                "LUA2003",
                format!("variable attributes are not available in {}", self.options.version),
            );
        }
        self.node(SyntaxKind::LocalName, vec![name, attribute])
    }

    fn return_statement(&mut self) -> PResult<GreenNode> {
        let return_keyword = self.bump();
        let mut children = vec![return_keyword];
        if !is_block_terminator(self.current_kind()) && !self.at(SyntaxKind::Semicolon) {
            children.push(self.expression_list()?);
        }
        if self.at(SyntaxKind::Semicolon) {
            children.push(self.bump());
        }
        Ok(self.node(SyntaxKind::ReturnStatement, children))
    }

    fn expression_statement(&mut self) -> PResult<GreenNode> {
        let expr = self.suffixed_primary()?;
        match self.current_kind() {
            SyntaxKind::Equals | SyntaxKind::Comma => self.finish_assignment(expr),
            kind if kind.is_compound_assignment_operator() => {
                let target = Self::validate_assignment_target(expr);
                let operator = self.bump();
                let value = self.expression()?;
                Ok(self.node(
                    SyntaxKind::CompoundAssignment,
                    vec![target, operator, value],
                ))
            }
            _ => {
                let is_call = matches!(
                    expr.kind(),
                    SyntaxKind::FunctionCallExpression | SyntaxKind::MethodCallExpression
                );
                let mut statement = self.node(SyntaxKind::ExpressionStatement, vec![expr]);
                if !is_call {
                    statement = with_node_diagnostic(
                        statement,
                        "LUA2006",
                        "only function and method calls can be used as statements".to_owned(),
                    );
                }
                Ok(statement)
            }
        }
    }

    fn finish_assignment(&mut self, first: GreenNode) -> PResult<GreenNode> {
        let mut targets = vec![Self::validate_assignment_target(first)];
        while self.at(SyntaxKind::Comma) {
            targets.push(self.bump());
            let target = self.suffixed_primary()?;
            targets.push(Self::validate_assignment_target(target));
        }
        let targets = self.list(targets);
        let equals = self.expect(SyntaxKind::Equals);
        let values = self.expression_list()?;
        Ok(self.node(
            SyntaxKind::Assignment,
            vec![targets, equals, values],
        ))
    }

    fn validate_assignment_target(expr: GreenNode) -> GreenNode {
        if matches!(
            expr.kind(),
            SyntaxKind::NameExpression
                | SyntaxKind::MemberAccessExpression
                | SyntaxKind::ElementAccessExpression
        ) {
            expr
        } else {
            with_node_diagnostic(
                expr,
                "LUA2006",
                "this expression cannot be assigned to".to_owned(),
            )
        }
    }

    /// Skips tokens until something can start a statement (or close a
    /// block), folding them into `SkippedTokens` trivia on the next kept
    /// token.
    fn skip_unexpected_tokens(&mut self) {
        let mut text = String::new();
        let mut diagnostics = Vec::new();
        let mut width = TextSize::new(0);
        while !starts_statement(self.current_kind()) && !is_block_terminator(self.current_kind()) {
            self.consume_into_skipped(&mut text, &mut diagnostics, &mut width);
        }
        self.attach_skipped(text, diagnostics, width);
    }

    /// Skips exactly the current token (used for stray terminators).
    fn skip_one_token(&mut self) {
        let mut text = String::new();
        let mut diagnostics = Vec::new();
        let mut width = TextSize::new(0);
        self.consume_into_skipped(&mut text, &mut diagnostics, &mut width);
        self.attach_skipped(text, diagnostics, width);
    }

    fn consume_into_skipped(
        &mut self,
        text: &mut String,
        diagnostics: &mut Vec<DiagnosticInfo>,
        width: &mut TextSize,
    ) {
        let token = self.bump();
        for diagnostic in token.diagnostics() {
            diagnostics.push(DiagnosticInfo {
                span: TextRange::at(*width + diagnostic.span.start(), diagnostic.span.len()),
                ..diagnostic.clone()
            });
        }
        token
            .write_full_text(text)
            .expect("writing to a String cannot fail");
        *width += token.full_width();
    }

    fn attach_skipped(
        &mut self,
        text: String,
        mut diagnostics: Vec<DiagnosticInfo>,
        width: TextSize,
    ) {
        if text.is_empty() {
            return;
        }
        diagnostics.push(DiagnosticInfo::error(
            "LUA2002",
            "unexpected tokens".to_owned(),
            TextRange::new(TextSize::new(0), width),
        ));
        let trivia =
            GreenNode::trivia_with_diagnostics(SyntaxKind::SkippedTokens, &text, diagnostics);
        self.current = self.current.with_prepended_leading_trivia(trivia);
    }

    // ------------------------------------------------------------------
    // expressions
    // ------------------------------------------------------------------

    fn expression(&mut self) -> PResult<GreenNode> {
        self.binary_expression(1)
    }

    fn expression_list(&mut self) -> PResult<GreenNode> {
        let mut items = vec![self.expression()?];
        while self.at(SyntaxKind::Comma) {
            items.push(self.bump());
            items.push(self.expression()?);
        }
        Ok(self.list(items))
    }

    fn binary_expression(&mut self, min_precedence: u8) -> PResult<GreenNode> {
        self.check_cancellation()?;
        let mut left = self.unary_expression()?;
        while let Some(precedence) = self.current_kind().binary_precedence() {
            if precedence < min_precedence {
                break;
            }
            let operator = self.bump();
            // Right-associative operators re-admit their own precedence on
            // the right-hand side.
            let next_min = if operator.kind().is_right_associative() {
                precedence
            } else {
                precedence + 1
            };
            let right = self.binary_expression(next_min)?;
            left = self.node(SyntaxKind::BinaryExpression, vec![left, operator, right]);
        }
        Ok(left)
    }

    fn unary_expression(&mut self) -> PResult<GreenNode> {
        if self.current_kind().unary_precedence().is_some() {
            let operator = self.bump();
            let operand = self.binary_expression(UNARY_PRECEDENCE)?;
            return Ok(self.node(SyntaxKind::UnaryExpression, vec![operator, operand]));
        }
        self.suffixed_primary()
    }

    fn suffixed_primary(&mut self) -> PResult<GreenNode> {
        match self.current_kind() {
            SyntaxKind::Number
            | SyntaxKind::StringLiteral
            | SyntaxKind::NilKeyword
            | SyntaxKind::TrueKeyword
            | SyntaxKind::FalseKeyword => {
                let token = self.bump();
                Ok(self.node(SyntaxKind::LiteralExpression, vec![token]))
            }
            SyntaxKind::DotDotDot => {
                let token = self.bump();
                Ok(self.node(SyntaxKind::VarArgExpression, vec![token]))
            }
            SyntaxKind::FunctionKeyword => self.function_expression(),
            SyntaxKind::OpenBrace => self.table_constructor(),
            SyntaxKind::Identifier => {
                let token = self.bump();
                let name = self.node(SyntaxKind::NameExpression, vec![token]);
                self.suffixes(name)
            }
            SyntaxKind::OpenParen => {
                let open = self.bump();
                let inner = self.expression()?;
                let close = self.expect(SyntaxKind::CloseParen);
                let paren = self.node(
                    SyntaxKind::ParenthesizedExpression,
                    vec![open, inner, close],
                );
                self.suffixes(paren)
            }
            _ => {
                let message = format!(
                    "expected an expression but found {}",
                    token_description(self.current_kind())
                );
                let missing = GreenNode::missing(
                    SyntaxKind::Identifier,
                    vec![DiagnosticInfo::error(
                        "LUA2004",
                        message,
                        TextRange::empty(TextSize::new(0)),
                    )],
                );
                Ok(self.node(SyntaxKind::NameExpression, vec![missing]))
            }
        }
    }

    fn suffixes(&mut self, mut expr: GreenNode) -> PResult<GreenNode> {
        loop {
            self.check_cancellation()?;
            expr = match self.current_kind() {
                SyntaxKind::Dot => {
                    let dot = self.bump();
                    let name = self.expect(SyntaxKind::Identifier);
                    self.node(SyntaxKind::MemberAccessExpression, vec![expr, dot, name])
                }
                SyntaxKind::OpenBracket => {
                    let open = self.bump();
                    let index = self.expression()?;
                    let close = self.expect(SyntaxKind::CloseBracket);
                    self.node(
                        SyntaxKind::ElementAccessExpression,
                        vec![expr, open, index, close],
                    )
                }
                SyntaxKind::Colon => {
                    let colon = self.bump();
                    let name = self.expect(SyntaxKind::Identifier);
                    let arguments = self.call_arguments()?;
                    self.node(
                        SyntaxKind::MethodCallExpression,
                        vec![expr, colon, name, arguments],
                    )
                }
                SyntaxKind::OpenParen | SyntaxKind::StringLiteral | SyntaxKind::OpenBrace => {
                    let arguments = self.call_arguments()?;
                    self.node(SyntaxKind::FunctionCallExpression, vec![expr, arguments])
                }
                _ => return Ok(expr),
            };
        }
    }

    fn call_arguments(&mut self) -> PResult<GreenNode> {
        match self.current_kind() {
            SyntaxKind::OpenParen => {
                let open = self.bump();
                let arguments = if self.at(SyntaxKind::CloseParen) {
                    self.list(Vec::new())
                } else {
                    self.expression_list()?
                };
                let close = self.expect(SyntaxKind::CloseParen);
                Ok(self.node(SyntaxKind::ArgumentList, vec![open, arguments, close]))
            }
            SyntaxKind::StringLiteral => {
                let token = self.bump();
                Ok(self.node(SyntaxKind::StringArgument, vec![token]))
            }
            SyntaxKind::OpenBrace => {
                let table = self.table_constructor()?;
                Ok(self.node(SyntaxKind::TableArgument, vec![table]))
            }
            _ => {
                let open = self.expect(SyntaxKind::OpenParen);
                let arguments = self.list(Vec::new());
                let close = self.expect(SyntaxKind::CloseParen);
                Ok(self.node(SyntaxKind::ArgumentList, vec![open, arguments, close]))
            }
        }
    }

    fn function_expression(&mut self) -> PResult<GreenNode> {
        let function_keyword = self.bump();
        let parameters = self.parameter_list()?;
        let body = self.block()?;
        let end_keyword = self.expect(SyntaxKind::EndKeyword);
        Ok(self.node(
            SyntaxKind::FunctionExpression,
            vec![function_keyword, parameters, body, end_keyword],
        ))
    }

    fn table_constructor(&mut self) -> PResult<GreenNode> {
        let open = self.expect(SyntaxKind::OpenBrace);
        let mut items = Vec::new();
        loop {
            self.check_cancellation()?;
            if self.at(SyntaxKind::CloseBrace) || self.at(SyntaxKind::EndOfFileToken) {
                break;
            }
            items.push(self.table_field()?);
            if self.at(SyntaxKind::Comma) || self.at(SyntaxKind::Semicolon) {
                items.push(self.bump());
            } else {
                break;
            }
        }
        let fields = self.list(items);
        let close = self.expect(SyntaxKind::CloseBrace);
        Ok(self.node(
            SyntaxKind::TableConstructorExpression,
            vec![open, fields, close],
        ))
    }

    fn table_field(&mut self) -> PResult<GreenNode> {
        match self.current_kind() {
            SyntaxKind::OpenBracket => {
                let open = self.bump();
                let key = self.expression()?;
                let close = self.expect(SyntaxKind::CloseBracket);
                let equals = self.expect(SyntaxKind::Equals);
                let value = self.expression()?;
                Ok(self.node(
                    SyntaxKind::IndexedField,
                    vec![open, key, close, equals, value],
                ))
            }
            SyntaxKind::Identifier if self.peek_kind() == SyntaxKind::Equals => {
                let name = self.bump();
                let equals = self.bump();
                let value = self.expression()?;
                Ok(self.node(SyntaxKind::NamedField, vec![name, equals, value]))
            }
            _ => {
                let value = self.expression()?;
                Ok(self.node(SyntaxKind::PositionalField, vec![value]))
            }
        }
    }
}
