use loretta::{
    parse, parse_with_cancellation, CancellationToken, LuaSyntaxOptions, NodeOrToken, SyntaxKind,
    SyntaxNode, SyntaxTree,
};

fn parse54(text: &str) -> SyntaxTree {
    parse(text, LuaSyntaxOptions::lua54())
}

fn first(node: &SyntaxNode, kind: SyntaxKind) -> SyntaxNode {
    node.descendants()
        .find(|n| n.kind() == kind)
        .unwrap_or_else(|| panic!("no {kind:?} in {}", node.full_text()))
}

fn child_kinds(node: &SyntaxNode) -> Vec<SyntaxKind> {
    node.children_with_tokens().map(|el| el.kind()).collect()
}

#[test]
fn chunk_shape() {
    let tree = parse54("local x = 1\nreturn x\n");
    let root = tree.root();
    assert_eq!(root.kind(), SyntaxKind::Chunk);
    assert_eq!(
        child_kinds(root),
        vec![SyntaxKind::Block, SyntaxKind::EndOfFileToken]
    );
    assert!(tree.diagnostics().is_empty());
    assert_eq!(root.full_text(), "local x = 1\nreturn x\n");
}

#[test]
fn multiplication_binds_tighter_than_addition() {
    let tree = parse54("return 1 + 2 * 3");
    let outer = first(tree.root(), SyntaxKind::BinaryExpression);
    let children = child_kinds(&outer);
    assert_eq!(
        children,
        vec![
            SyntaxKind::LiteralExpression,
            SyntaxKind::Plus,
            SyntaxKind::BinaryExpression,
        ]
    );
    let inner = first(&outer, SyntaxKind::BinaryExpression);
    // The outer node is found first; dig into its right operand.
    let right = outer
        .children()
        .nth(1)
        .expect("the right operand is the second child node");
    assert_eq!(right.kind(), SyntaxKind::BinaryExpression);
    assert_eq!(right.text(), "2 * 3");
    assert_eq!(inner.text(), "1 + 2 * 3");
}

#[test]
fn power_is_right_associative() {
    let tree = parse54("return 2 ^ 3 ^ 2");
    let outer = first(tree.root(), SyntaxKind::BinaryExpression);
    assert_eq!(
        child_kinds(&outer),
        vec![
            SyntaxKind::LiteralExpression,
            SyntaxKind::Caret,
            SyntaxKind::BinaryExpression,
        ]
    );
    let right = outer.children().nth(1).unwrap();
    assert_eq!(right.text(), "3 ^ 2");
}

#[test]
fn concat_is_right_associative() {
    let tree = parse54("return 'a' .. 'b' .. 'c'");
    let outer = first(tree.root(), SyntaxKind::BinaryExpression);
    let right = outer.children().nth(1).unwrap();
    assert_eq!(right.kind(), SyntaxKind::BinaryExpression);
    assert_eq!(right.text(), "'b' .. 'c'");
}

#[test]
fn unary_binds_tighter_than_binary_except_power() {
    let tree = parse54("return -2 ^ 2");
    // -2^2 is -(2^2)
    let unary = first(tree.root(), SyntaxKind::UnaryExpression);
    assert_eq!(
        child_kinds(&unary),
        vec![SyntaxKind::Minus, SyntaxKind::BinaryExpression]
    );

    let tree = parse54("return -a * b");
    // -a * b is (-a) * b
    let binary = first(tree.root(), SyntaxKind::BinaryExpression);
    assert_eq!(
        child_kinds(&binary),
        vec![
            SyntaxKind::UnaryExpression,
            SyntaxKind::Star,
            SyntaxKind::NameExpression,
        ]
    );
}

#[test]
fn statement_variety_parses_clean() {
    let source = r#"
local n <const> = 10
local function helper(a, b, ...)
    return a + b
end

function obj.child:method(x)
    while x > 0 do
        x = x - 1
    end
    repeat
        x = x + 1
    until x > 10
    for i = 1, 10, 2 do
        helper(i, x)
    end
    for k, v in pairs(obj) do
        print(k, v)
    end
    if x == 1 then
        return 1
    elseif x == 2 then
        return 2
    else
        do return 3 end
    end
end

::top::
goto top
"#;
    let tree = parse54(source);
    assert_eq!(tree.root().full_text(), source);
    assert!(
        tree.diagnostics().is_empty(),
        "unexpected diagnostics: {:#?}",
        tree.diagnostics()
    );
    for kind in [
        SyntaxKind::LocalDeclaration,
        SyntaxKind::NameAttribute,
        SyntaxKind::LocalFunctionDeclaration,
        SyntaxKind::FunctionDeclaration,
        SyntaxKind::FunctionName,
        SyntaxKind::WhileStatement,
        SyntaxKind::RepeatStatement,
        SyntaxKind::NumericForStatement,
        SyntaxKind::GenericForStatement,
        SyntaxKind::IfStatement,
        SyntaxKind::ElseIfClause,
        SyntaxKind::ElseClause,
        SyntaxKind::DoStatement,
        SyntaxKind::LabelStatement,
        SyntaxKind::GotoStatement,
        SyntaxKind::ReturnStatement,
        SyntaxKind::FunctionCallExpression,
        SyntaxKind::VarArgExpression,
    ] {
        first(tree.root(), kind);
    }
}

#[test]
fn call_suffix_chains() {
    let tree = parse54("return a.b[c]:m(1) 'str' { x = 1 }");
    let method = first(tree.root(), SyntaxKind::MethodCallExpression);
    assert_eq!(
        child_kinds(&method),
        vec![
            SyntaxKind::ElementAccessExpression,
            SyntaxKind::Colon,
            SyntaxKind::Identifier,
            SyntaxKind::ArgumentList,
        ]
    );
    first(tree.root(), SyntaxKind::StringArgument);
    first(tree.root(), SyntaxKind::TableArgument);
    first(tree.root(), SyntaxKind::MemberAccessExpression);
    assert!(tree.diagnostics().is_empty());
}

#[test]
fn table_constructor_fields() {
    let tree = parse54("t = { [1] = 'a', b = 2; 3, }");
    let table = first(tree.root(), SyntaxKind::TableConstructorExpression);
    first(&table, SyntaxKind::IndexedField);
    first(&table, SyntaxKind::NamedField);
    first(&table, SyntaxKind::PositionalField);
    assert!(tree.diagnostics().is_empty());
    assert_eq!(tree.root().full_text(), "t = { [1] = 'a', b = 2; 3, }");
}

#[test]
fn missing_tokens_keep_the_tree_complete() {
    let tree = parse54("if x then return 1");
    assert_eq!(tree.root().full_text(), "if x then return 1");
    let diagnostics = tree.diagnostics();
    assert!(diagnostics
        .iter()
        .any(|d| d.id == "LUA2001" && d.message.contains("'end'")));
    let if_statement = first(tree.root(), SyntaxKind::IfStatement);
    let end = if_statement
        .children_with_tokens()
        .filter_map(|el| el.into_token())
        .find(|t| t.kind() == SyntaxKind::EndKeyword)
        .expect("a missing `end` token is synthesized");
    assert!(end.is_missing());
    assert!(end.span().is_empty());
}

#[test]
fn missing_expression_reports() {
    let tree = parse54("x = ");
    assert_eq!(tree.root().full_text(), "x = ");
    assert!(tree.diagnostics().iter().any(|d| d.id == "LUA2004"));
}

#[test]
fn garbage_is_skipped_into_trivia() {
    let source = "$ ? local x = 1";
    let tree = parse54(source);
    assert_eq!(tree.root().full_text(), source);
    let diagnostics = tree.diagnostics();
    assert!(diagnostics.iter().any(|d| d.id == "LUA2002"));
    // The declaration still parses.
    first(tree.root(), SyntaxKind::LocalDeclaration);
}

#[test]
fn entirely_malformed_input_still_yields_a_tree() {
    let source = "$$$ ??? !!!";
    let tree = parse(source, LuaSyntaxOptions::lua51());
    assert_eq!(tree.root().kind(), SyntaxKind::Chunk);
    assert_eq!(tree.root().full_text(), source);
    assert!(tree.root().descendants_with_tokens().count() >= 2);
    assert!(!tree.diagnostics().is_empty());
}

#[test]
fn non_call_expression_statement_is_flagged() {
    let tree = parse54("x + 1\n");
    assert!(tree
        .diagnostics()
        .iter()
        .any(|d| d.id == "LUA2006"));
    assert_eq!(tree.root().full_text(), "x + 1\n");
}

#[test]
fn return_must_be_last() {
    let tree = parse54("return 1\nx = 2\n");
    assert!(tree.diagnostics().iter().any(|d| d.id == "LUA2007"));
}

#[test]
fn compound_assignment_in_fivem() {
    let tree = parse("x += 1", LuaSyntaxOptions::fivem());
    let stmt = first(tree.root(), SyntaxKind::CompoundAssignment);
    assert_eq!(
        child_kinds(&stmt),
        vec![
            SyntaxKind::NameExpression,
            SyntaxKind::PlusEquals,
            SyntaxKind::LiteralExpression,
        ]
    );
    assert!(tree.diagnostics().is_empty());

    // Same syntax under 5.4 parses, but is flagged by the lexer.
    let tree = parse("x += 1", LuaSyntaxOptions::lua54());
    first(tree.root(), SyntaxKind::CompoundAssignment);
    assert!(tree.diagnostics().iter().any(|d| d.id == "LUA1007"));
}

#[test]
fn labels_flagged_outside_goto_dialects() {
    let tree = parse("::top::", LuaSyntaxOptions::lua51());
    first(tree.root(), SyntaxKind::LabelStatement);
    assert!(tree.diagnostics().iter().any(|d| d.id == "LUA2003"));

    let tree = parse("::top::\ngoto top", LuaSyntaxOptions::lua54());
    assert!(tree.diagnostics().is_empty());
}

#[test]
fn continue_statement_in_glua() {
    let tree = parse("while true do continue end", LuaSyntaxOptions::glua());
    first(tree.root(), SyntaxKind::ContinueStatement);
    assert!(tree.diagnostics().is_empty());
}

#[test]
fn cancellation_produces_no_tree() {
    let token = CancellationToken::new();
    token.cancel();
    let result = parse_with_cancellation("local x = 1", LuaSyntaxOptions::lua54(), &token);
    assert!(result.is_err());
}

#[test]
fn uncancelled_token_is_inert() {
    let token = CancellationToken::new();
    let result = parse_with_cancellation("local x = 1", LuaSyntaxOptions::lua54(), &token);
    assert!(result.is_ok());
}

#[test]
fn local_attribute_validation() {
    let tree = parse54("local x <close> = open()");
    assert!(tree.diagnostics().is_empty());

    let tree = parse54("local x <frozen> = 1");
    assert!(tree.diagnostics().iter().any(|d| d.id == "LUA2008"));

    let tree = parse("local x <const> = 1", LuaSyntaxOptions::lua51());
    assert!(tree.diagnostics().iter().any(|d| d.id == "LUA2003"));
}

#[test]
fn skipped_tokens_do_not_reorder_diagnostics() {
    // Diagnostics come out in tree order even when some live inside
    // skipped-token trivia.
    let source = "local x = 1\n$\nreturn x";
    let tree = parse54(source);
    assert_eq!(tree.root().full_text(), source);
    let diagnostics = tree.diagnostics();
    let positions: Vec<_> = diagnostics
        .iter()
        .filter_map(|d| d.location.span())
        .map(|span| span.start())
        .collect();
    let mut sorted = positions.clone();
    sorted.sort();
    assert_eq!(positions, sorted);
}

#[test]
fn parenthesized_calls_are_statements() {
    let tree = parse54("(f)()\nf()('chain')\n");
    assert!(tree.diagnostics().is_empty());
    let _ = first(tree.root(), SyntaxKind::ParenthesizedExpression);
}

#[test]
fn deeply_nested_expressions_parse() {
    let mut source = String::from("return ");
    for _ in 0..100 {
        source.push('(');
    }
    source.push('1');
    for _ in 0..100 {
        source.push(')');
    }
    let tree = parse54(&source);
    assert!(tree.diagnostics().is_empty());
    assert_eq!(tree.root().full_text(), source);
}

#[test]
fn elements_know_their_parents() {
    let tree = parse54("return 1 + 2");
    for element in tree.root().descendants_with_tokens() {
        match &element {
            NodeOrToken::Node(node) if node == tree.root() => assert!(node.parent().is_none()),
            NodeOrToken::Node(node) => assert!(node.parent().is_some()),
            NodeOrToken::Token(token) => {
                let parent = token.parent();
                assert!(parent
                    .children_with_tokens()
                    .any(|el| el.as_token() == Some(token)));
            }
        }
    }
}
