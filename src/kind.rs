//! The closed set of syntax kinds and the classification facts derived from
//! their metadata.
//!
//! Kinds are declared once through [`syntax_kinds!`] together with their
//! static metadata (trivia flag, fixed token text, keyword marker). Operator
//! precedences, extra categories and key/value properties are declared in the
//! metadata tables right below the macro invocation. Everything else —
//! keyword lookup by text, category membership, the validation pass — is
//! derived from these declarations and built at most once per process.

use fxhash::FxHashMap;
use once_cell::sync::Lazy;

use crate::diagnostic::Severity;

/// Precedence of every unary operator. Binds tighter than all binary
/// operators except `^`.
pub const UNARY_PRECEDENCE: u8 = 11;

macro_rules! syntax_kinds {
    (
        trivia: [ $($trivia:ident,)* ]
        tokens: [ $($token:ident,)* ]
        punctuation: [ $($punct:ident => $punct_text:literal,)* ]
        keywords: [ $($kw:ident => $kw_text:literal,)* ]
        nodes: [ $($node:ident,)* ]
    ) => {
        /// Every node, token and trivia kind of the Lua syntax family.
        #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
        #[repr(u16)]
        pub enum SyntaxKind {
            $($trivia,)*
            $($token,)*
            $($punct,)*
            $($kw,)*
            $($node,)*
        }

        impl SyntaxKind {
            /// All declared kinds, in declaration (= discriminant) order.
            pub const ALL: &'static [SyntaxKind] = &[
                $(SyntaxKind::$trivia,)*
                $(SyntaxKind::$token,)*
                $(SyntaxKind::$punct,)*
                $(SyntaxKind::$kw,)*
                $(SyntaxKind::$node,)*
            ];

            pub const fn is_trivia(self) -> bool {
                matches!(self, $(SyntaxKind::$trivia)|*)
            }

            pub const fn is_keyword(self) -> bool {
                matches!(self, $(SyntaxKind::$kw)|*)
            }

            pub const fn is_token(self) -> bool {
                matches!(
                    self,
                    $(SyntaxKind::$token)|* | $(SyntaxKind::$punct)|* | $(SyntaxKind::$kw)|*
                )
            }

            pub const fn is_node(self) -> bool {
                !self.is_token() && !self.is_trivia()
            }

            /// The fixed source text of this kind, if it has one.
            pub const fn token_text(self) -> Option<&'static str> {
                match self {
                    $(SyntaxKind::$punct => Some($punct_text),)*
                    $(SyntaxKind::$kw => Some($kw_text),)*
                    _ => None,
                }
            }
        }

        static KEYWORD_BY_TEXT: Lazy<FxHashMap<&'static str, SyntaxKind>> = Lazy::new(|| {
            let mut map = FxHashMap::default();
            $(map.insert($kw_text, SyntaxKind::$kw);)*
            map
        });
    };
}

syntax_kinds! {
    trivia: [
        Whitespace,
        EndOfLine,
        Comment,
        BlockComment,
        Shebang,
        SkippedTokens,
    ]
    tokens: [
        Identifier,
        Number,
        StringLiteral,
        BadToken,
        EndOfFileToken,
    ]
    punctuation: [
        Plus => "+",
        Minus => "-",
        Star => "*",
        Slash => "/",
        SlashSlash => "//",
        Percent => "%",
        Caret => "^",
        Hash => "#",
        Ampersand => "&",
        Pipe => "|",
        Tilde => "~",
        LessLess => "<<",
        GreaterGreater => ">>",
        EqualsEquals => "==",
        TildeEquals => "~=",
        BangEquals => "!=",
        LessEquals => "<=",
        GreaterEquals => ">=",
        Less => "<",
        Greater => ">",
        Equals => "=",
        OpenParen => "(",
        CloseParen => ")",
        OpenBrace => "{",
        CloseBrace => "}",
        OpenBracket => "[",
        CloseBracket => "]",
        Semicolon => ";",
        Colon => ":",
        ColonColon => "::",
        Comma => ",",
        Dot => ".",
        DotDot => "..",
        DotDotDot => "...",
        AmpAmp => "&&",
        PipePipe => "||",
        Bang => "!",
        PlusEquals => "+=",
        MinusEquals => "-=",
        StarEquals => "*=",
        SlashEquals => "/=",
        PercentEquals => "%=",
        CaretEquals => "^=",
        DotDotEquals => "..=",
    ]
    keywords: [
        AndKeyword => "and",
        BreakKeyword => "break",
        ContinueKeyword => "continue",
        DoKeyword => "do",
        ElseKeyword => "else",
        ElseIfKeyword => "elseif",
        EndKeyword => "end",
        FalseKeyword => "false",
        ForKeyword => "for",
        FunctionKeyword => "function",
        GotoKeyword => "goto",
        IfKeyword => "if",
        InKeyword => "in",
        LocalKeyword => "local",
        NilKeyword => "nil",
        NotKeyword => "not",
        OrKeyword => "or",
        RepeatKeyword => "repeat",
        ReturnKeyword => "return",
        ThenKeyword => "then",
        TrueKeyword => "true",
        UntilKeyword => "until",
        WhileKeyword => "while",
    ]
    nodes: [
        List,
        Chunk,
        Block,
        EmptyStatement,
        LocalDeclaration,
        LocalName,
        NameAttribute,
        Assignment,
        CompoundAssignment,
        IfStatement,
        ElseIfClause,
        ElseClause,
        WhileStatement,
        RepeatStatement,
        NumericForStatement,
        GenericForStatement,
        DoStatement,
        ReturnStatement,
        BreakStatement,
        ContinueStatement,
        GotoStatement,
        LabelStatement,
        FunctionDeclaration,
        LocalFunctionDeclaration,
        FunctionName,
        ExpressionStatement,
        NameExpression,
        LiteralExpression,
        VarArgExpression,
        ParenthesizedExpression,
        UnaryExpression,
        BinaryExpression,
        FunctionExpression,
        ParameterList,
        MemberAccessExpression,
        ElementAccessExpression,
        MethodCallExpression,
        FunctionCallExpression,
        ArgumentList,
        StringArgument,
        TableArgument,
        TableConstructorExpression,
        NamedField,
        IndexedField,
        PositionalField,
    ]
}

/// The approved extra-category names.
pub mod category {
    pub const ARITHMETIC_OPERATOR: &str = "arithmetic-operator";
    pub const COMPARISON_OPERATOR: &str = "comparison-operator";
    pub const LOGICAL_OPERATOR: &str = "logical-operator";
    pub const BITWISE_OPERATOR: &str = "bitwise-operator";
    pub const STRING_OPERATOR: &str = "string-operator";
    pub const LITERAL_KEYWORD: &str = "literal-keyword";

    pub const ALL: &[&str] = &[
        ARITHMETIC_OPERATOR,
        COMPARISON_OPERATOR,
        LOGICAL_OPERATOR,
        BITWISE_OPERATOR,
        STRING_OPERATOR,
        LITERAL_KEYWORD,
    ];
}

/// The approved property-key names.
pub mod property {
    pub const CONSTANT_VALUE: &str = "constant-value";
    pub const COMPOUND_ASSIGNMENT_OPERATOR: &str = "compound-assignment-operator";

    pub const ALL: &[&str] = &[CONSTANT_VALUE, COMPOUND_ASSIGNMENT_OPERATOR];
}

/// Scalar values carried by kind properties.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PropertyValue {
    Nil,
    Bool(bool),
    Str(&'static str),
    Kind(SyntaxKind),
}

impl SyntaxKind {
    pub fn from_raw(raw: u16) -> Option<SyntaxKind> {
        SyntaxKind::ALL.get(raw as usize).copied()
    }

    pub const fn into_raw(self) -> u16 {
        self as u16
    }

    /// Precedence when this kind is used as a prefix operator; `None` when it
    /// is not one.
    pub const fn unary_precedence(self) -> Option<u8> {
        match self {
            SyntaxKind::Minus
            | SyntaxKind::NotKeyword
            | SyntaxKind::Hash
            | SyntaxKind::Tilde
            | SyntaxKind::Bang => Some(UNARY_PRECEDENCE),
            _ => None,
        }
    }

    /// Precedence when this kind is used as a binary operator; `None` when it
    /// is not one. Higher binds tighter.
    pub const fn binary_precedence(self) -> Option<u8> {
        match self {
            SyntaxKind::OrKeyword | SyntaxKind::PipePipe => Some(1),
            SyntaxKind::AndKeyword | SyntaxKind::AmpAmp => Some(2),
            SyntaxKind::Less
            | SyntaxKind::Greater
            | SyntaxKind::LessEquals
            | SyntaxKind::GreaterEquals
            | SyntaxKind::EqualsEquals
            | SyntaxKind::TildeEquals
            | SyntaxKind::BangEquals => Some(3),
            SyntaxKind::Pipe => Some(4),
            SyntaxKind::Tilde => Some(5),
            SyntaxKind::Ampersand => Some(6),
            SyntaxKind::LessLess | SyntaxKind::GreaterGreater => Some(7),
            SyntaxKind::DotDot => Some(8),
            SyntaxKind::Plus | SyntaxKind::Minus => Some(9),
            SyntaxKind::Star
            | SyntaxKind::Slash
            | SyntaxKind::SlashSlash
            | SyntaxKind::Percent => Some(10),
            SyntaxKind::Caret => Some(12),
            _ => None,
        }
    }

    /// `..` and `^` nest to the right.
    pub const fn is_right_associative(self) -> bool {
        matches!(self, SyntaxKind::DotDot | SyntaxKind::Caret)
    }

    /// The expression kind an operator token maps to.
    pub const fn operator_expression_kind(self) -> Option<SyntaxKind> {
        if self.binary_precedence().is_some() {
            Some(SyntaxKind::BinaryExpression)
        } else if self.unary_precedence().is_some() {
            Some(SyntaxKind::UnaryExpression)
        } else {
            None
        }
    }

    /// Extra category names this kind belongs to.
    pub const fn extra_categories(self) -> &'static [&'static str] {
        match self {
            SyntaxKind::Plus
            | SyntaxKind::Star
            | SyntaxKind::Slash
            | SyntaxKind::SlashSlash
            | SyntaxKind::Percent
            | SyntaxKind::Caret => &[category::ARITHMETIC_OPERATOR],
            // `-` is both the subtraction and the negation operator.
            SyntaxKind::Minus => &[category::ARITHMETIC_OPERATOR],
            SyntaxKind::Less
            | SyntaxKind::Greater
            | SyntaxKind::LessEquals
            | SyntaxKind::GreaterEquals
            | SyntaxKind::EqualsEquals
            | SyntaxKind::TildeEquals
            | SyntaxKind::BangEquals => &[category::COMPARISON_OPERATOR],
            SyntaxKind::AndKeyword
            | SyntaxKind::OrKeyword
            | SyntaxKind::NotKeyword
            | SyntaxKind::AmpAmp
            | SyntaxKind::PipePipe
            | SyntaxKind::Bang => &[category::LOGICAL_OPERATOR],
            // `~` doubles as binary xor and unary complement.
            SyntaxKind::Ampersand
            | SyntaxKind::Pipe
            | SyntaxKind::Tilde
            | SyntaxKind::LessLess
            | SyntaxKind::GreaterGreater => &[category::BITWISE_OPERATOR],
            SyntaxKind::DotDot | SyntaxKind::DotDotEquals => &[category::STRING_OPERATOR],
            SyntaxKind::NilKeyword | SyntaxKind::TrueKeyword | SyntaxKind::FalseKeyword => {
                &[category::LITERAL_KEYWORD]
            }
            _ => &[],
        }
    }

    /// Key/value properties declared for this kind.
    pub const fn properties(self) -> &'static [(&'static str, PropertyValue)] {
        match self {
            SyntaxKind::NilKeyword => &[(property::CONSTANT_VALUE, PropertyValue::Nil)],
            SyntaxKind::TrueKeyword => &[(property::CONSTANT_VALUE, PropertyValue::Bool(true))],
            SyntaxKind::FalseKeyword => &[(property::CONSTANT_VALUE, PropertyValue::Bool(false))],
            SyntaxKind::PlusEquals => &[(
                property::COMPOUND_ASSIGNMENT_OPERATOR,
                PropertyValue::Kind(SyntaxKind::Plus),
            )],
            SyntaxKind::MinusEquals => &[(
                property::COMPOUND_ASSIGNMENT_OPERATOR,
                PropertyValue::Kind(SyntaxKind::Minus),
            )],
            SyntaxKind::StarEquals => &[(
                property::COMPOUND_ASSIGNMENT_OPERATOR,
                PropertyValue::Kind(SyntaxKind::Star),
            )],
            SyntaxKind::SlashEquals => &[(
                property::COMPOUND_ASSIGNMENT_OPERATOR,
                PropertyValue::Kind(SyntaxKind::Slash),
            )],
            SyntaxKind::PercentEquals => &[(
                property::COMPOUND_ASSIGNMENT_OPERATOR,
                PropertyValue::Kind(SyntaxKind::Percent),
            )],
            SyntaxKind::CaretEquals => &[(
                property::COMPOUND_ASSIGNMENT_OPERATOR,
                PropertyValue::Kind(SyntaxKind::Caret),
            )],
            SyntaxKind::DotDotEquals => &[(
                property::COMPOUND_ASSIGNMENT_OPERATOR,
                PropertyValue::Kind(SyntaxKind::DotDot),
            )],
            _ => &[],
        }
    }

    pub fn property(self, key: &str) -> Option<PropertyValue> {
        self.properties()
            .iter()
            .find(|(k, _)| *k == key)
            .map(|(_, v)| *v)
    }

    /// The token kinds the parser folds compound assignments over.
    pub const fn is_compound_assignment_operator(self) -> bool {
        matches!(
            self,
            SyntaxKind::PlusEquals
                | SyntaxKind::MinusEquals
                | SyntaxKind::StarEquals
                | SyntaxKind::SlashEquals
                | SyntaxKind::PercentEquals
                | SyntaxKind::CaretEquals
                | SyntaxKind::DotDotEquals
        )
    }
}

/// The keyword kind for `text`, if any.
pub fn keyword_kind(text: &str) -> Option<SyntaxKind> {
    KEYWORD_BY_TEXT.get(text).copied()
}

static KINDS_BY_CATEGORY: Lazy<FxHashMap<&'static str, Vec<SyntaxKind>>> = Lazy::new(|| {
    let mut map: FxHashMap<&'static str, Vec<SyntaxKind>> = FxHashMap::default();
    for &kind in SyntaxKind::ALL {
        for &cat in kind.extra_categories() {
            map.entry(cat).or_default().push(kind);
        }
    }
    map
});

/// All kinds declared with the given extra category.
pub fn kinds_in_category(name: &str) -> &'static [SyntaxKind] {
    KINDS_BY_CATEGORY
        .get(name)
        .map(|kinds| kinds.as_slice())
        .unwrap_or(&[])
}

/// A finding of the metadata validation pass.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MetadataDiagnostic {
    pub code: &'static str,
    pub severity: Severity,
    pub message: String,
}

impl MetadataDiagnostic {
    fn error(code: &'static str, message: String) -> Self {
        Self {
            code,
            severity: Severity::Error,
            message,
        }
    }

    fn warning(code: &'static str, message: String) -> Self {
        Self {
            code,
            severity: Severity::Warning,
            message,
        }
    }
}

/// Checks the declared kind metadata for the classic mistakes. The shipped
/// table must come back clean; the pass exists so that kind additions fail
/// loudly in tests instead of silently mislexing.
pub fn validate_metadata() -> Vec<MetadataDiagnostic> {
    let mut findings = Vec::new();

    for required in ["List", "Chunk", "BadToken", "EndOfFileToken"] {
        if !SyntaxKind::ALL
            .iter()
            .any(|kind| format!("{kind:?}") == required)
        {
            findings.push(MetadataDiagnostic::warning(
                "LOSK0001",
                format!("required SyntaxKind `{required}` not found"),
            ));
        }
    }

    if SyntaxKind::ALL.is_empty() {
        findings.push(MetadataDiagnostic::warning(
            "LOSK0002",
            "no annotated kinds found".into(),
        ));
    }

    for &kind in SyntaxKind::ALL {
        if kind.is_trivia() && kind.is_token() {
            findings.push(MetadataDiagnostic::error(
                "LOSK0003",
                format!("trivia kind {kind:?} is also declared as a token"),
            ));
        }

        let has_operator_role =
            kind.unary_precedence().is_some() || kind.binary_precedence().is_some();
        if has_operator_role {
            match kind.token_text() {
                Some(text) if !text.trim().is_empty() => {}
                _ => findings.push(MetadataDiagnostic::error(
                    "LOSK0004",
                    format!("operator kind {kind:?} has no token text"),
                )),
            }
        }

        if kind.is_keyword() {
            match kind.token_text() {
                Some(text) if !text.trim().is_empty() => {}
                _ => findings.push(MetadataDiagnostic::error(
                    "LOSK0005",
                    format!("keyword kind {kind:?} has no token text"),
                )),
            }
        }

        for &cat in kind.extra_categories() {
            if !category::ALL.contains(&cat) {
                findings.push(MetadataDiagnostic::warning(
                    "LOSK0006",
                    format!("category `{cat}` on {kind:?} is not in the constants set"),
                ));
            }
        }

        for (key, _) in kind.properties() {
            if !property::ALL.contains(key) {
                findings.push(MetadataDiagnostic::warning(
                    "LOSK0007",
                    format!("property `{key}` on {kind:?} is not in the constants set"),
                ));
            }
        }
    }

    findings
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn raw_round_trip() {
        for &kind in SyntaxKind::ALL {
            assert_eq!(SyntaxKind::from_raw(kind.into_raw()), Some(kind));
        }
        assert_eq!(SyntaxKind::from_raw(u16::MAX), None);
    }

    #[test]
    fn keyword_lookup() {
        assert_eq!(keyword_kind("end"), Some(SyntaxKind::EndKeyword));
        assert_eq!(keyword_kind("local"), Some(SyntaxKind::LocalKeyword));
        assert_eq!(keyword_kind("foo"), None);
        assert_eq!(SyntaxKind::EndKeyword.token_text(), Some("end"));
    }

    #[test]
    fn precedence_table_shape() {
        // `or` binds loosest, `^` tightest; unary sits between `*` and `^`.
        assert_eq!(SyntaxKind::OrKeyword.binary_precedence(), Some(1));
        assert!(SyntaxKind::Caret.binary_precedence().unwrap() > UNARY_PRECEDENCE);
        assert!(SyntaxKind::Star.binary_precedence().unwrap() < UNARY_PRECEDENCE);
        assert!(SyntaxKind::Caret.is_right_associative());
        assert!(SyntaxKind::DotDot.is_right_associative());
        assert!(!SyntaxKind::Plus.is_right_associative());
    }

    #[test]
    fn glua_aliases_share_precedence() {
        assert_eq!(
            SyntaxKind::AmpAmp.binary_precedence(),
            SyntaxKind::AndKeyword.binary_precedence()
        );
        assert_eq!(
            SyntaxKind::BangEquals.binary_precedence(),
            SyntaxKind::TildeEquals.binary_precedence()
        );
        assert_eq!(
            SyntaxKind::Bang.unary_precedence(),
            SyntaxKind::NotKeyword.unary_precedence()
        );
    }

    #[test]
    fn categories_and_properties() {
        assert!(kinds_in_category(category::COMPARISON_OPERATOR).contains(&SyntaxKind::Less));
        assert!(SyntaxKind::Tilde
            .extra_categories()
            .contains(&category::BITWISE_OPERATOR));
        assert_eq!(
            SyntaxKind::TrueKeyword.property(property::CONSTANT_VALUE),
            Some(PropertyValue::Bool(true))
        );
        assert_eq!(
            SyntaxKind::PlusEquals.property(property::COMPOUND_ASSIGNMENT_OPERATOR),
            Some(PropertyValue::Kind(SyntaxKind::Plus))
        );
    }

    #[test]
    fn shipped_metadata_is_clean() {
        let findings = validate_metadata();
        assert!(findings.is_empty(), "unexpected findings: {findings:?}");
    }
}
