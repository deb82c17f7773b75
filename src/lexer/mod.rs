//! The lexer: source text in, green tokens with attached trivia out.
//!
//! Each call to [`Lexer::next_token`] first tries the quick-scan DFA; on a
//! hit the token cache may return a previously built green token for the
//! same text. Otherwise the slow path scans leading trivia, the token
//! proper and trailing trivia (up to and including the first line break).
//! Malformed input never aborts the lexer: it produces tokens carrying
//! diagnostics, worst case a one-character `BadToken`.

mod cache;
pub(crate) mod quick_scan;
mod window;

pub(crate) use quick_scan::fnv1a;

use text_size::{TextRange, TextSize};

use crate::{
    diagnostic::DiagnosticInfo,
    green::{GreenNode, TokenValue},
    kind::{self, SyntaxKind},
    options::LuaSyntaxOptions,
};

use cache::TokenCache;
use quick_scan::quick_scan;
use window::TextWindow;

pub(crate) fn is_identifier_start(c: char) -> bool {
    c == '_' || c.is_ascii_alphabetic() || (c as u32) >= 0x80
}

pub(crate) fn is_identifier_continue(c: char) -> bool {
    is_identifier_start(c) || c.is_ascii_digit()
}

enum NumberBase {
    Decimal,
    Hex,
    Binary,
}

pub struct Lexer<'s> {
    window: TextWindow<'s>,
    options: LuaSyntaxOptions,
    cache: TokenCache,
    diagnostics: Vec<DiagnosticInfo>,
}

impl<'s> Lexer<'s> {
    pub fn new(text: &'s str, options: LuaSyntaxOptions) -> Self {
        Self {
            window: TextWindow::new(text),
            options,
            cache: TokenCache::new(),
            diagnostics: Vec::new(),
        }
    }

    pub fn options(&self) -> &LuaSyntaxOptions {
        &self.options
    }

    /// The next token, with leading and trailing trivia attached. At the end
    /// of input this returns (repeatedly) an `EndOfFileToken` whose leading
    /// trivia holds whatever trailed the last real token.
    pub fn next_token(&mut self) -> GreenNode {
        // The quick path never runs at offset 0, which keeps the shebang
        // rule entirely on the slow path.
        if self.window.offset() != TextSize::new(0) {
            let rest = self.window.rest();
            if let Some(scan) = quick_scan(rest) {
                let full_text = &rest[..scan.byte_len];
                if let Some(hit) = self.cache.find_token(full_text, scan.hash) {
                    self.window.advance_bytes(scan.byte_len);
                    return hit;
                }
                let start = self.window.offset();
                let token = self.lex_token_slow();
                debug_assert_eq!(
                    usize::from(self.window.offset() - start),
                    scan.byte_len,
                    "quick scan accepted a different boundary than the lexer for {full_text:?}"
                );
                self.cache.insert(scan.hash, token.clone());
                return token;
            }
        }
        self.lex_token_slow()
    }

    fn lex_token_slow(&mut self) -> GreenNode {
        let leading = self.scan_trivia(true);
        let core = self.scan_token_core();
        let trailing = if core.kind() == SyntaxKind::EndOfFileToken {
            None
        } else {
            self.scan_trivia(false)
        };
        if leading.is_none() && trailing.is_none() {
            core
        } else {
            core.with_trivia(leading, trailing)
        }
    }

    // ------------------------------------------------------------------
    // trivia
    // ------------------------------------------------------------------

    fn scan_trivia(&mut self, leading: bool) -> Option<GreenNode> {
        let mut pieces: Vec<GreenNode> = Vec::new();
        loop {
            self.window.start_lexeme();
            let Some(c) = self.window.peek() else { break };
            match c {
                ' ' | '\t' | '\u{B}' | '\u{C}' => {
                    self.window
                        .eat_while(|c| matches!(c, ' ' | '\t' | '\u{B}' | '\u{C}'));
                    let text = self.window.lexeme_text();
                    pieces.push(self.cache.trivia(SyntaxKind::Whitespace, text));
                }
                '\n' | '\r' => {
                    self.scan_end_of_line(c);
                    let text = self.window.lexeme_text();
                    pieces.push(self.cache.trivia(SyntaxKind::EndOfLine, text));
                    if !leading {
                        break;
                    }
                }
                '-' if self.window.peek_at(1) == Some('-') => {
                    pieces.push(self.scan_dash_comment());
                }
                '/' if self.options.accept_c_comments && self.window.peek_at(1) == Some('/') => {
                    self.window.eat_while(|c| c != '\n' && c != '\r');
                    pieces.push(GreenNode::trivia(
                        SyntaxKind::Comment,
                        self.window.lexeme_text(),
                    ));
                }
                '/' if self.options.accept_c_comments && self.window.peek_at(1) == Some('*') => {
                    pieces.push(self.scan_c_block_comment());
                }
                '#' if self.window.offset() == TextSize::new(0)
                    && self.options.accept_shebang
                    && self.window.peek_at(1) == Some('!') =>
                {
                    self.window.eat_while(|c| c != '\n' && c != '\r');
                    pieces.push(GreenNode::trivia(
                        SyntaxKind::Shebang,
                        self.window.lexeme_text(),
                    ));
                }
                _ => break,
            }
        }
        match pieces.len() {
            0 => None,
            1 => pieces.pop(),
            _ => Some(GreenNode::list(pieces)),
        }
    }

    /// Consumes one line break; `\r\n` and `\n\r` both count as a single
    /// break, a lone `\r` is complete on its own.
    fn scan_end_of_line(&mut self, first: char) {
        self.window.next_char();
        match (first, self.window.peek()) {
            ('\r', Some('\n')) | ('\n', Some('\r')) => {
                self.window.next_char();
            }
            _ => {}
        }
    }

    fn scan_dash_comment(&mut self) -> GreenNode {
        self.window.advance_bytes(2); // --
        if self.window.peek() == Some('[') {
            if let Some(level) = self.peek_long_bracket_level() {
                let (terminated, _) = self.scan_long_bracket_body(level);
                let text = self.window.lexeme_text();
                let mut diagnostics = Vec::new();
                if !terminated {
                    diagnostics.push(DiagnosticInfo::error(
                        "LUA1004",
                        "unterminated long comment",
                        TextRange::new(TextSize::new(0), self.window.lexeme_width()),
                    ));
                }
                return GreenNode::trivia_with_diagnostics(
                    SyntaxKind::BlockComment,
                    text,
                    diagnostics,
                );
            }
        }
        self.window.eat_while(|c| c != '\n' && c != '\r');
        GreenNode::trivia(SyntaxKind::Comment, self.window.lexeme_text())
    }

    fn scan_c_block_comment(&mut self) -> GreenNode {
        self.window.advance_bytes(2); // /*
        let mut terminated = false;
        while let Some(c) = self.window.next_char() {
            if c == '*' && self.window.eat('/') {
                terminated = true;
                break;
            }
        }
        let mut diagnostics = Vec::new();
        if !terminated {
            diagnostics.push(DiagnosticInfo::error(
                "LUA1004",
                "unterminated comment",
                TextRange::new(TextSize::new(0), self.window.lexeme_width()),
            ));
        }
        GreenNode::trivia_with_diagnostics(
            SyntaxKind::BlockComment,
            self.window.lexeme_text(),
            diagnostics,
        )
    }

    // ------------------------------------------------------------------
    // tokens
    // ------------------------------------------------------------------

    fn scan_token_core(&mut self) -> GreenNode {
        self.diagnostics.clear();
        self.window.start_lexeme();
        let Some(c) = self.window.peek() else {
            return GreenNode::token(SyntaxKind::EndOfFileToken, "");
        };
        match c {
            '0'..='9' => self.scan_number(),
            '.' if matches!(self.window.peek_at(1), Some('0'..='9')) => self.scan_number(),
            '"' | '\'' => self.scan_short_string(c),
            '`' => self.scan_short_string('`'),
            '[' => {
                if let Some(level) = self.peek_long_bracket_level() {
                    self.scan_long_string(level)
                } else {
                    self.window.next_char();
                    self.fixed(SyntaxKind::OpenBracket)
                }
            }
            c if is_identifier_start(c) => self.scan_identifier(),
            _ => self.scan_operator_or_bad(c),
        }
    }

    fn fixed(&mut self, kind: SyntaxKind) -> GreenNode {
        debug_assert_eq!(Some(self.window.lexeme_text()), kind.token_text());
        self.finish_token(kind, TokenValue::None)
    }

    fn finish_token(&mut self, kind: SyntaxKind, value: TokenValue) -> GreenNode {
        GreenNode::token_full(
            kind,
            self.window.lexeme_text(),
            value,
            None,
            None,
            std::mem::take(&mut self.diagnostics),
        )
    }

    /// Reports `LUA1007` over the whole lexeme when `enabled` is off.
    fn feature_diag(&mut self, enabled: bool, what: &str) {
        if enabled {
            return;
        }
        self.diagnostics.push(DiagnosticInfo::error(
            "LUA1007",
            format!("{what} not available in {}", self.options.version),
            TextRange::new(TextSize::new(0), self.window.lexeme_width()),
        ));
    }

    fn rel_span(&self, start: TextSize) -> TextRange {
        TextRange::new(
            start - self.window.lexeme_start_position(),
            self.window.offset() - self.window.lexeme_start_position(),
        )
    }

    fn scan_operator_or_bad(&mut self, c: char) -> GreenNode {
        self.window.next_char();
        match c {
            '+' | '*' | '%' | '^' | '-' => {
                if self.window.eat('=') {
                    let kind = match c {
                        '+' => SyntaxKind::PlusEquals,
                        '-' => SyntaxKind::MinusEquals,
                        '*' => SyntaxKind::StarEquals,
                        '%' => SyntaxKind::PercentEquals,
                        _ => SyntaxKind::CaretEquals,
                    };
                    self.feature_diag(
                        self.options.accept_compound_assignment,
                        "compound assignment operators are",
                    );
                    self.fixed(kind)
                } else {
                    let kind = match c {
                        '+' => SyntaxKind::Plus,
                        '-' => SyntaxKind::Minus,
                        '*' => SyntaxKind::Star,
                        '%' => SyntaxKind::Percent,
                        _ => SyntaxKind::Caret,
                    };
                    self.fixed(kind)
                }
            }
            '/' => {
                if self.window.eat('/') {
                    self.feature_diag(self.options.accept_floor_division, "floor division is");
                    self.fixed(SyntaxKind::SlashSlash)
                } else if self.window.eat('=') {
                    self.feature_diag(
                        self.options.accept_compound_assignment,
                        "compound assignment operators are",
                    );
                    self.fixed(SyntaxKind::SlashEquals)
                } else {
                    self.fixed(SyntaxKind::Slash)
                }
            }
            '=' => {
                if self.window.eat('=') {
                    self.fixed(SyntaxKind::EqualsEquals)
                } else {
                    self.fixed(SyntaxKind::Equals)
                }
            }
            '~' => {
                if self.window.eat('=') {
                    self.fixed(SyntaxKind::TildeEquals)
                } else {
                    self.feature_diag(self.options.accept_bitwise_operators, "bitwise operators are");
                    self.fixed(SyntaxKind::Tilde)
                }
            }
            '<' => {
                if self.window.eat('=') {
                    self.fixed(SyntaxKind::LessEquals)
                } else if self.window.eat('<') {
                    self.feature_diag(self.options.accept_bitwise_operators, "bitwise operators are");
                    self.fixed(SyntaxKind::LessLess)
                } else {
                    self.fixed(SyntaxKind::Less)
                }
            }
            '>' => {
                if self.window.eat('=') {
                    self.fixed(SyntaxKind::GreaterEquals)
                } else if self.window.eat('>') {
                    self.feature_diag(self.options.accept_bitwise_operators, "bitwise operators are");
                    self.fixed(SyntaxKind::GreaterGreater)
                } else {
                    self.fixed(SyntaxKind::Greater)
                }
            }
            '&' => {
                if self.window.eat('&') {
                    self.feature_diag(self.options.accept_c_operators, "C-style operators are");
                    self.fixed(SyntaxKind::AmpAmp)
                } else {
                    self.feature_diag(self.options.accept_bitwise_operators, "bitwise operators are");
                    self.fixed(SyntaxKind::Ampersand)
                }
            }
            '|' => {
                if self.window.eat('|') {
                    self.feature_diag(self.options.accept_c_operators, "C-style operators are");
                    self.fixed(SyntaxKind::PipePipe)
                } else {
                    self.feature_diag(self.options.accept_bitwise_operators, "bitwise operators are");
                    self.fixed(SyntaxKind::Pipe)
                }
            }
            '!' => {
                if self.window.eat('=') {
                    self.feature_diag(self.options.accept_c_operators, "C-style operators are");
                    self.fixed(SyntaxKind::BangEquals)
                } else {
                    self.feature_diag(self.options.accept_c_operators, "C-style operators are");
                    self.fixed(SyntaxKind::Bang)
                }
            }
            ':' => {
                if self.window.eat(':') {
                    self.fixed(SyntaxKind::ColonColon)
                } else {
                    self.fixed(SyntaxKind::Colon)
                }
            }
            '.' => {
                if self.window.eat('.') {
                    if self.window.eat('.') {
                        self.fixed(SyntaxKind::DotDotDot)
                    } else if self.window.eat('=') {
                        self.feature_diag(
                            self.options.accept_compound_assignment,
                            "compound assignment operators are",
                        );
                        self.fixed(SyntaxKind::DotDotEquals)
                    } else {
                        self.fixed(SyntaxKind::DotDot)
                    }
                } else {
                    self.fixed(SyntaxKind::Dot)
                }
            }
            ';' => self.fixed(SyntaxKind::Semicolon),
            ',' => self.fixed(SyntaxKind::Comma),
            '(' => self.fixed(SyntaxKind::OpenParen),
            ')' => self.fixed(SyntaxKind::CloseParen),
            '{' => self.fixed(SyntaxKind::OpenBrace),
            '}' => self.fixed(SyntaxKind::CloseBrace),
            ']' => self.fixed(SyntaxKind::CloseBracket),
            '#' => self.fixed(SyntaxKind::Hash),
            _ => {
                self.diagnostics.push(DiagnosticInfo::error(
                    "LUA1001",
                    format!("unexpected character {c:?}"),
                    TextRange::new(TextSize::new(0), self.window.lexeme_width()),
                ));
                self.finish_token(SyntaxKind::BadToken, TokenValue::None)
            }
        }
    }

    fn scan_identifier(&mut self) -> GreenNode {
        let mut has_non_ascii = false;
        self.window.eat_while(|c| {
            let ok = is_identifier_continue(c);
            if ok && !c.is_ascii() {
                has_non_ascii = true;
            }
            ok
        });
        if has_non_ascii && !self.options.accept_non_ascii_identifiers {
            self.diagnostics.push(DiagnosticInfo::error(
                "LUA1005",
                format!(
                    "identifiers may not contain non-ASCII characters in {}",
                    self.options.version
                ),
                TextRange::new(TextSize::new(0), self.window.lexeme_width()),
            ));
        }
        let text = self.window.lexeme_text();
        let kind = self.keyword_kind(text).unwrap_or(SyntaxKind::Identifier);
        let value = keyword_value(kind);
        if self.diagnostics.is_empty() {
            let hash = fnv1a(text.as_bytes());
            if let Some(hit) = self.cache.find_identifier(text, hash, kind) {
                return hit;
            }
            let token = self.finish_token(kind, value);
            self.cache.insert(hash, token.clone());
            return token;
        }
        self.finish_token(kind, value)
    }

    /// Keyword recognition, filtered by the dialect's active keyword set.
    fn keyword_kind(&self, text: &str) -> Option<SyntaxKind> {
        let kind = kind::keyword_kind(text)?;
        let enabled = match kind {
            SyntaxKind::ContinueKeyword => self.options.accept_continue,
            SyntaxKind::GotoKeyword => self.options.accept_goto,
            _ => true,
        };
        enabled.then_some(kind)
    }

    // ------------------------------------------------------------------
    // numbers
    // ------------------------------------------------------------------

    fn scan_number(&mut self) -> GreenNode {
        let mut base = NumberBase::Decimal;
        let mut is_float = false;
        let mut malformed = false;
        let mut suffix_len = 0usize;

        if self.window.peek() == Some('0') && matches!(self.window.peek_at(1), Some('x' | 'X')) {
            base = NumberBase::Hex;
            self.window.advance_bytes(2);
            let digits = self.eat_number_digits(16);
            if self.window.eat('.') {
                is_float = true;
                self.eat_number_digits(16);
            }
            if digits == 0 && !is_float {
                malformed = true;
            }
            if matches!(self.window.peek(), Some('p' | 'P')) {
                is_float = true;
                self.window.next_char();
                if matches!(self.window.peek(), Some('+' | '-')) {
                    self.window.next_char();
                }
                if self.eat_number_digits(10) == 0 {
                    malformed = true;
                }
            }
            if is_float {
                self.feature_diag(self.options.accept_hex_floats, "hexadecimal floats are");
            }
        } else if self.window.peek() == Some('0')
            && matches!(self.window.peek_at(1), Some('b' | 'B'))
        {
            base = NumberBase::Binary;
            self.window.advance_bytes(2);
            if self.eat_number_digits(2) == 0 {
                malformed = true;
            }
            self.feature_diag(self.options.accept_binary_numbers, "binary number literals are");
        } else {
            self.eat_number_digits(10);
            // A dot starts a fraction unless it begins `..`.
            if self.window.peek() == Some('.') && self.window.peek_at(1) != Some('.') {
                is_float = true;
                self.window.next_char();
                self.eat_number_digits(10);
            }
            if matches!(self.window.peek(), Some('e' | 'E')) {
                is_float = true;
                self.window.next_char();
                if matches!(self.window.peek(), Some('+' | '-')) {
                    self.window.next_char();
                }
                if self.eat_number_digits(10) == 0 {
                    malformed = true;
                }
            }
        }

        if !is_float && !malformed && self.options.accept_luajit_number_suffixes {
            suffix_len = self.eat_luajit_suffix();
        }

        // Identifier characters glued onto a numeral stay inside the token so
        // the quick scanner and the slow path agree on boundaries.
        let mut adjacent = false;
        self.window.eat_while(|c| {
            let ok = is_identifier_continue(c);
            if ok {
                adjacent = true;
            }
            ok
        });
        if adjacent {
            malformed = true;
        }

        if malformed {
            self.diagnostics.push(DiagnosticInfo::error(
                "LUA1006",
                "malformed number",
                TextRange::new(TextSize::new(0), self.window.lexeme_width()),
            ));
            return self.finish_token(SyntaxKind::Number, TokenValue::None);
        }

        let text = self.window.lexeme_text();
        let value = self.number_value(text, base, is_float, suffix_len);
        self.finish_token(SyntaxKind::Number, value)
    }

    fn eat_number_digits(&mut self, radix: u32) -> usize {
        let allow_underscore = self.options.accept_underscores_in_numbers;
        let mut count = 0usize;
        loop {
            match self.window.peek() {
                Some('_') if allow_underscore => {
                    self.window.next_char();
                }
                Some(c) if c.is_digit(radix) => {
                    self.window.next_char();
                    count += 1;
                }
                _ => break,
            }
        }
        count
    }

    /// `LL`, `ULL` and `i` (case-insensitive), per LuaJIT. Returns the
    /// suffix byte length.
    fn eat_luajit_suffix(&mut self) -> usize {
        let before = self.window.offset();
        match self.window.peek() {
            Some('u' | 'U') => {
                if matches!(self.window.peek_at(1), Some('l' | 'L'))
                    && matches!(self.window.peek_at(2), Some('l' | 'L'))
                {
                    self.window.advance_bytes(3);
                }
            }
            Some('l' | 'L') => {
                if matches!(self.window.peek_at(1), Some('l' | 'L')) {
                    self.window.advance_bytes(2);
                }
            }
            Some('i' | 'I') => {
                // Imaginary suffix only when not starting an identifier.
                if !matches!(self.window.peek_at(1), Some(c) if is_identifier_continue(c)) {
                    self.window.advance_bytes(1);
                }
            }
            _ => {}
        }
        usize::from(self.window.offset() - before)
    }

    fn number_value(
        &self,
        text: &str,
        base: NumberBase,
        is_float: bool,
        suffix_len: usize,
    ) -> TokenValue {
        let digits: String = text[..text.len() - suffix_len]
            .chars()
            .filter(|&c| c != '_')
            .collect();
        let has_integer_suffix = suffix_len > 1; // LL / ULL
        match base {
            NumberBase::Hex => {
                if is_float {
                    TokenValue::Number(parse_hex_float(&digits[2..]))
                } else {
                    let mut value = 0u64;
                    for c in digits[2..].chars() {
                        value = value
                            .wrapping_mul(16)
                            .wrapping_add(u64::from(c.to_digit(16).unwrap_or(0)));
                    }
                    self.integer_value(value as i64, has_integer_suffix)
                }
            }
            NumberBase::Binary => {
                let mut value = 0u64;
                for c in digits[2..].chars() {
                    value = value
                        .wrapping_mul(2)
                        .wrapping_add(u64::from(c.to_digit(2).unwrap_or(0)));
                }
                self.integer_value(value as i64, has_integer_suffix)
            }
            NumberBase::Decimal => {
                if is_float {
                    match digits.parse::<f64>() {
                        Ok(value) => TokenValue::Number(value),
                        Err(_) => TokenValue::None,
                    }
                } else {
                    match digits.parse::<i64>() {
                        Ok(value) => self.integer_value(value, has_integer_suffix),
                        // Decimal integers overflowing the integer range
                        // become floats, like the reference implementation.
                        Err(_) => match digits.parse::<f64>() {
                            Ok(value) => TokenValue::Number(value),
                            Err(_) => TokenValue::None,
                        },
                    }
                }
            }
        }
    }

    fn integer_value(&self, value: i64, has_integer_suffix: bool) -> TokenValue {
        if self.options.integers || has_integer_suffix {
            TokenValue::Integer(value)
        } else {
            TokenValue::Number(value as f64)
        }
    }

    // ------------------------------------------------------------------
    // strings
    // ------------------------------------------------------------------

    fn scan_short_string(&mut self, quote: char) -> GreenNode {
        self.window.next_char();
        let mut value = String::new();
        let mut terminated = false;
        loop {
            match self.window.peek() {
                None | Some('\n' | '\r') => break,
                Some(c) if c == quote => {
                    self.window.next_char();
                    terminated = true;
                    break;
                }
                Some('\\') => self.scan_escape(&mut value),
                Some(c) => {
                    value.push(c);
                    self.window.next_char();
                }
            }
        }
        if !terminated {
            self.diagnostics.push(DiagnosticInfo::error(
                "LUA1002",
                "unterminated string literal",
                TextRange::new(TextSize::new(0), self.window.lexeme_width()),
            ));
        }
        if quote == '`' {
            self.feature_diag(self.options.accept_backtick_strings, "backtick strings are");
        }
        self.finish_token(SyntaxKind::StringLiteral, TokenValue::Str(value.into()))
    }

    fn scan_escape(&mut self, value: &mut String) {
        let escape_start = self.window.offset();
        self.window.next_char(); // backslash
        let Some(c) = self.window.peek() else {
            value.push('\\');
            return;
        };
        match c {
            'a' => self.simple_escape(value, '\u{7}'),
            'b' => self.simple_escape(value, '\u{8}'),
            'f' => self.simple_escape(value, '\u{C}'),
            'n' => self.simple_escape(value, '\n'),
            'r' => self.simple_escape(value, '\r'),
            't' => self.simple_escape(value, '\t'),
            'v' => self.simple_escape(value, '\u{B}'),
            '\\' | '"' | '\'' => self.simple_escape(value, c),
            '\n' | '\r' => {
                // A backslash before a line break continues the string onto
                // the next line; the value receives a single newline.
                self.scan_end_of_line(c);
                value.push('\n');
            }
            'x' => {
                self.window.next_char();
                let mut byte = 0u32;
                let mut digits = 0;
                while digits < 2 {
                    match self.window.peek().and_then(|c| c.to_digit(16)) {
                        Some(digit) => {
                            byte = byte * 16 + digit;
                            self.window.next_char();
                            digits += 1;
                        }
                        None => break,
                    }
                }
                if digits == 0 {
                    self.invalid_escape(escape_start);
                } else if let Some(c) = char::from_u32(byte) {
                    value.push(c);
                }
                self.extended_escape_diag(escape_start, "\\x escapes are");
            }
            'z' => {
                self.window.next_char();
                self.window
                    .eat_while(|c| matches!(c, ' ' | '\t' | '\u{B}' | '\u{C}' | '\r' | '\n'));
                self.extended_escape_diag(escape_start, "the \\z escape is");
            }
            'u' => {
                self.window.next_char();
                if self.window.eat('{') {
                    let mut code = 0u32;
                    let mut digits = 0;
                    while let Some(digit) = self.window.peek().and_then(|c| c.to_digit(16)) {
                        code = code.saturating_mul(16).saturating_add(digit);
                        self.window.next_char();
                        digits += 1;
                    }
                    let closed = self.window.eat('}');
                    match char::from_u32(code) {
                        Some(c) if digits > 0 && closed => value.push(c),
                        _ => self.invalid_escape(escape_start),
                    }
                } else {
                    self.invalid_escape(escape_start);
                }
                self.extended_escape_diag(escape_start, "\\u escapes are");
            }
            '0'..='9' => {
                let mut byte = 0u32;
                let mut digits = 0;
                while digits < 3 {
                    match self.window.peek().and_then(|c| c.to_digit(10)) {
                        Some(digit) => {
                            byte = byte * 10 + digit;
                            self.window.next_char();
                            digits += 1;
                        }
                        None => break,
                    }
                }
                if byte > 255 {
                    self.invalid_escape(escape_start);
                } else if let Some(c) = char::from_u32(byte) {
                    value.push(c);
                }
            }
            other => {
                self.window.next_char();
                if self.options.accept_invalid_escapes {
                    value.push('\\');
                    value.push(other);
                } else {
                    self.invalid_escape(escape_start);
                    value.push(other);
                }
            }
        }
    }

    fn simple_escape(&mut self, value: &mut String, decoded: char) {
        self.window.next_char();
        value.push(decoded);
    }

    fn invalid_escape(&mut self, escape_start: TextSize) {
        let span = self.rel_span(escape_start);
        self.diagnostics.push(DiagnosticInfo::error(
            "LUA1003",
            "invalid escape sequence",
            span,
        ));
    }

    fn extended_escape_diag(&mut self, escape_start: TextSize, what: &str) {
        if self.options.accept_extended_escapes {
            return;
        }
        let span = self.rel_span(escape_start);
        self.diagnostics.push(DiagnosticInfo::error(
            "LUA1007",
            format!("{what} not available in {}", self.options.version),
            span,
        ));
    }

    // ------------------------------------------------------------------
    // long brackets
    // ------------------------------------------------------------------

    /// At a `[`: the level of the long bracket opening here, if any.
    fn peek_long_bracket_level(&self) -> Option<usize> {
        debug_assert_eq!(self.window.peek(), Some('['));
        let mut level = 0;
        loop {
            match self.window.peek_at(1 + level) {
                Some('=') => level += 1,
                Some('[') => return Some(level),
                _ => return None,
            }
        }
    }

    /// Consumes `[==[ ... ]==]` starting at the opening bracket. Returns
    /// whether the closing bracket was found, and the content with the
    /// customary skip of a line break right after the opening.
    fn scan_long_bracket_body(&mut self, level: usize) -> (bool, String) {
        self.window.advance_bytes(level + 2);
        if let Some(c @ ('\r' | '\n')) = self.window.peek() {
            self.scan_end_of_line(c);
        }
        let content_start = self.window.offset();
        loop {
            match self.window.peek() {
                None => {
                    let content = self.window.slice_from(content_start).to_owned();
                    return (false, content);
                }
                Some(']') if self.closes_long_bracket(level) => {
                    let content = self.window.slice_from(content_start).to_owned();
                    self.window.advance_bytes(level + 2);
                    return (true, content);
                }
                Some(_) => {
                    self.window.next_char();
                }
            }
        }
    }

    fn closes_long_bracket(&self, level: usize) -> bool {
        for i in 0..level {
            if self.window.peek_at(1 + i) != Some('=') {
                return false;
            }
        }
        self.window.peek_at(1 + level) == Some(']')
    }

    fn scan_long_string(&mut self, level: usize) -> GreenNode {
        let (terminated, content) = self.scan_long_bracket_body(level);
        if !terminated {
            self.diagnostics.push(DiagnosticInfo::error(
                "LUA1004",
                "unterminated long string literal",
                TextRange::new(TextSize::new(0), self.window.lexeme_width()),
            ));
        }
        self.finish_token(SyntaxKind::StringLiteral, TokenValue::Str(content.into()))
    }
}

fn keyword_value(kind: SyntaxKind) -> TokenValue {
    match kind {
        SyntaxKind::NilKeyword => TokenValue::Nil,
        SyntaxKind::TrueKeyword => TokenValue::Bool(true),
        SyntaxKind::FalseKeyword => TokenValue::Bool(false),
        _ => TokenValue::None,
    }
}

fn parse_hex_float(digits: &str) -> f64 {
    let mut mantissa = 0.0f64;
    let mut fraction_exponent = 0i32;
    let mut seen_dot = false;
    let mut chars = digits.chars().peekable();
    while let Some(&c) = chars.peek() {
        match c {
            '.' => {
                seen_dot = true;
                chars.next();
            }
            c if c.is_ascii_hexdigit() => {
                mantissa = mantissa * 16.0 + f64::from(c.to_digit(16).unwrap_or(0));
                if seen_dot {
                    fraction_exponent -= 4;
                }
                chars.next();
            }
            _ => break,
        }
    }
    let mut exponent = 0i32;
    let mut negative = false;
    if matches!(chars.peek(), Some('p' | 'P')) {
        chars.next();
        match chars.peek() {
            Some('-') => {
                negative = true;
                chars.next();
            }
            Some('+') => {
                chars.next();
            }
            _ => {}
        }
        for c in chars {
            if let Some(digit) = c.to_digit(10) {
                exponent = exponent.saturating_mul(10).saturating_add(digit as i32);
            }
        }
    }
    if negative {
        exponent = -exponent;
    }
    mantissa * 2f64.powi(exponent + fraction_exponent)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::kind::SyntaxKind::*;

    fn kinds(text: &str) -> Vec<SyntaxKind> {
        let mut lexer = Lexer::new(text, LuaSyntaxOptions::lua54());
        let mut kinds = Vec::new();
        loop {
            let token = lexer.next_token();
            let kind = token.kind();
            kinds.push(kind);
            if kind == EndOfFileToken {
                break;
            }
        }
        kinds
    }

    fn round_trip(text: &str, options: LuaSyntaxOptions) {
        let mut lexer = Lexer::new(text, options);
        let mut rebuilt = String::new();
        loop {
            let token = lexer.next_token();
            rebuilt.push_str(&token.full_text());
            if token.kind() == EndOfFileToken {
                break;
            }
        }
        assert_eq!(rebuilt, text);
    }

    #[test]
    fn keywords_and_identifiers() {
        assert_eq!(
            kinds("local x = 1"),
            vec![LocalKeyword, Identifier, Equals, Number, EndOfFileToken]
        );
    }

    #[test]
    fn lexing_is_lossless() {
        for text in [
            "local x = 1 -- set\nreturn x",
            "a = [==[hello]==]",
            "x = \"abc\\n\" .. 'd'",
            "  \t\r\n-- only trivia\n",
            "#!/usr/bin/lua\nprint(1)",
            "a ... b .. c ..= d",
        ] {
            round_trip(text, LuaSyntaxOptions::all());
        }
    }

    #[test]
    fn long_string_value_and_level() {
        let mut lexer = Lexer::new("[==[hello]==]", LuaSyntaxOptions::lua54());
        let token = lexer.next_token();
        assert_eq!(token.kind(), StringLiteral);
        assert_eq!(token.token_value().unwrap().as_str(), Some("hello"));
        assert_eq!(token.full_text(), "[==[hello]==]");
    }

    #[test]
    fn long_string_skips_first_newline() {
        let mut lexer = Lexer::new("[[\nline]]", LuaSyntaxOptions::lua54());
        let token = lexer.next_token();
        assert_eq!(token.token_value().unwrap().as_str(), Some("line"));
    }

    #[test]
    fn unterminated_string_has_diagnostic() {
        let mut lexer = Lexer::new("x = \"abc\n", LuaSyntaxOptions::lua54());
        let mut diagnosed = false;
        loop {
            let token = lexer.next_token();
            if token
                .diagnostics()
                .iter()
                .any(|d| d.message.contains("unterminated string"))
            {
                diagnosed = true;
            }
            if token.kind() == EndOfFileToken {
                break;
            }
        }
        assert!(diagnosed);
    }

    #[test]
    fn numbers_decode() {
        let cases: Vec<(&str, f64)> = vec![
            ("42", 42.0),
            ("0x1F", 31.0),
            ("1.5", 1.5),
            ("1e2", 100.0),
            (".5", 0.5),
            ("0x1p4", 16.0),
        ];
        for (text, expected) in cases {
            let mut lexer = Lexer::new(text, LuaSyntaxOptions::lua54());
            let token = lexer.next_token();
            assert_eq!(token.kind(), Number, "{text}");
            assert_eq!(
                token.token_value().unwrap().as_number(),
                Some(expected),
                "{text}"
            );
        }
    }

    #[test]
    fn integer_literals_stay_integers_in_53_plus() {
        let mut lexer = Lexer::new("7", LuaSyntaxOptions::lua54());
        assert_eq!(
            lexer.next_token().token_value(),
            Some(&TokenValue::Integer(7))
        );
        let mut lexer = Lexer::new("7", LuaSyntaxOptions::lua51());
        assert_eq!(
            lexer.next_token().token_value(),
            Some(&TokenValue::Number(7.0))
        );
    }

    #[test]
    fn malformed_number_extends_over_identifier_tail() {
        let mut lexer = Lexer::new("5and", LuaSyntaxOptions::lua54());
        let token = lexer.next_token();
        assert_eq!(token.kind(), Number);
        assert_eq!(token.full_text(), "5and");
        assert!(token.diagnostics().iter().any(|d| d.id == "LUA1006"));
    }

    #[test]
    fn concat_after_number_stays_separate() {
        assert_eq!(
            kinds("1..2"),
            vec![Number, DotDot, Number, EndOfFileToken]
        );
    }

    #[test]
    fn bad_token_recovery() {
        let mut lexer = Lexer::new("$x", LuaSyntaxOptions::lua54());
        let bad = lexer.next_token();
        assert_eq!(bad.kind(), BadToken);
        assert!(bad.diagnostics()[0].id == "LUA1001");
        assert_eq!(lexer.next_token().kind(), Identifier);
    }

    #[test]
    fn glua_operators() {
        let mut lexer = Lexer::new("a && b || !c != d", LuaSyntaxOptions::glua());
        let mut seen = Vec::new();
        loop {
            let token = lexer.next_token();
            if token.kind() == EndOfFileToken {
                break;
            }
            assert!(token.diagnostics().is_empty(), "{:?}", token);
            seen.push(token.kind());
        }
        assert_eq!(
            seen,
            vec![Identifier, AmpAmp, Identifier, PipePipe, Bang, Identifier, BangEquals, Identifier]
        );
    }

    #[test]
    fn glua_operators_diagnosed_in_54() {
        let mut lexer = Lexer::new("a && b", LuaSyntaxOptions::lua54());
        lexer.next_token();
        let op = lexer.next_token();
        assert_eq!(op.kind(), AmpAmp);
        assert!(op.diagnostics().iter().any(|d| d.id == "LUA1007"));
    }

    #[test]
    fn continue_is_contextual() {
        let mut lexer = Lexer::new("continue", LuaSyntaxOptions::glua());
        assert_eq!(lexer.next_token().kind(), ContinueKeyword);
        let mut lexer = Lexer::new("continue", LuaSyntaxOptions::lua54());
        assert_eq!(lexer.next_token().kind(), Identifier);
    }

    #[test]
    fn shebang_is_trivia() {
        let mut lexer = Lexer::new("#!/usr/bin/lua\nx", LuaSyntaxOptions::lua54());
        let token = lexer.next_token();
        assert_eq!(token.kind(), Identifier);
        let leading = token.leading_trivia_green().unwrap();
        assert!(leading.is_list());
        assert_eq!(leading.slots()[0].kind(), Shebang);
        assert_eq!(leading.slots()[1].kind(), EndOfLine);
    }

    #[test]
    fn comments_attach_as_trailing_trivia() {
        let mut lexer = Lexer::new("x -- tail\ny", LuaSyntaxOptions::lua54());
        let x = lexer.next_token();
        let trailing = x.trailing_trivia_green().unwrap();
        assert!(trailing.is_list());
        let kinds: Vec<_> = trailing.slots().iter().map(GreenNode::kind).collect();
        assert_eq!(kinds, vec![Whitespace, Comment, EndOfLine]);
        let y = lexer.next_token();
        assert_eq!(y.kind(), Identifier);
        assert!(y.leading_trivia_green().is_none());
    }

    #[test]
    fn token_cache_dedupes_identifiers() {
        let mut lexer = Lexer::new("foo(foo)", LuaSyntaxOptions::lua54());
        let first = lexer.next_token();
        lexer.next_token(); // (
        let second = lexer.next_token();
        assert!(GreenNode::ptr_eq(&first, &second));
    }

    #[test]
    fn quick_scan_agrees_with_slow_lexer() {
        // Repeat tokens so the quick path gets cache hits.
        let text = "x = 1\nx = 1\nx = 1\n";
        round_trip(text, LuaSyntaxOptions::lua54());
    }

    #[test]
    fn luajit_suffixes() {
        let mut lexer = Lexer::new("10ULL", LuaSyntaxOptions::luajit());
        let token = lexer.next_token();
        assert_eq!(token.kind(), Number);
        assert!(token.diagnostics().is_empty());
        assert_eq!(token.token_value(), Some(&TokenValue::Integer(10)));
    }

    #[test]
    fn c_comments_in_glua() {
        let mut lexer = Lexer::new("// line\n/* block */ x", LuaSyntaxOptions::glua());
        let token = lexer.next_token();
        assert_eq!(token.kind(), Identifier);
        round_trip("// line\n/* block */ x", LuaSyntaxOptions::glua());
    }
}
