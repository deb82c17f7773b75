use loretta::{Lexer, LuaSyntaxOptions, SyntaxKind, TokenValue};

fn lex(text: &str, options: LuaSyntaxOptions) -> Vec<loretta::GreenNode> {
    let mut lexer = Lexer::new(text, options);
    let mut tokens = Vec::new();
    loop {
        let token = lexer.next_token();
        let kind = token.kind();
        tokens.push(token);
        if kind == SyntaxKind::EndOfFileToken {
            break;
        }
    }
    tokens
}

#[test]
fn keyword_vs_identifier() {
    let tokens = lex("local x = 1", LuaSyntaxOptions::lua54());
    let kinds: Vec<_> = tokens.iter().map(|t| t.kind()).collect();
    assert_eq!(
        kinds,
        vec![
            SyntaxKind::LocalKeyword,
            SyntaxKind::Identifier,
            SyntaxKind::Equals,
            SyntaxKind::Number,
            SyntaxKind::EndOfFileToken,
        ]
    );
    assert!(tokens.iter().all(|t| t.diagnostics().is_empty()));
    // The spaces ride along as trailing trivia.
    assert_eq!(tokens[0].full_text(), "local ");
    assert_eq!(tokens[1].full_text(), "x ");
}

#[test]
fn long_string_with_level() {
    let tokens = lex("a = [==[hello]==]", LuaSyntaxOptions::lua54());
    let string = &tokens[2];
    assert_eq!(string.kind(), SyntaxKind::StringLiteral);
    assert_eq!(string.token_text(), Some("[==[hello]==]"));
    assert_eq!(string.token_value().unwrap().as_str(), Some("hello"));
    assert!(string.diagnostics().is_empty());
}

#[test]
fn unterminated_string_recovers() {
    let tokens = lex("x = \"abc\n", LuaSyntaxOptions::lua54());
    let string = tokens
        .iter()
        .find(|t| t.kind() == SyntaxKind::StringLiteral)
        .expect("the malformed string still becomes a token");
    assert!(string
        .diagnostics()
        .iter()
        .any(|d| d.id == "LUA1002" && d.message.contains("unterminated string")));
    // The line break is not part of the string; it trails it.
    assert_eq!(string.token_text(), Some("\"abc"));
}

#[test]
fn every_input_round_trips() {
    let inputs = [
        "",
        "   ",
        "-- nothing but a comment",
        "local x = 1\nreturn x\n",
        "x = \"unterminated",
        "$$$ not lua at all $$$",
        "a = [==[multi\nline]==] .. 'short'",
        "#!/usr/bin/env lua\nprint('hi')",
        "t = { [1] = 'a', b = 2; 3, }",
    ];
    for input in inputs {
        let rebuilt: String = lex(input, LuaSyntaxOptions::all())
            .iter()
            .map(|t| t.full_text())
            .collect();
        assert_eq!(rebuilt, input, "lexing must be lossless for {input:?}");
    }
}

#[test]
fn whitespace_changes_only_trivia() {
    let dense = lex("local x=1", LuaSyntaxOptions::lua54());
    let spaced = lex("local  x =  1", LuaSyntaxOptions::lua54());
    let dense_kinds: Vec<_> = dense.iter().map(|t| t.kind()).collect();
    let spaced_kinds: Vec<_> = spaced.iter().map(|t| t.kind()).collect();
    assert_eq!(dense_kinds, spaced_kinds);
    let dense_texts: Vec<_> = dense.iter().filter_map(|t| t.token_text()).collect();
    let spaced_texts: Vec<_> = spaced.iter().filter_map(|t| t.token_text()).collect();
    assert_eq!(dense_texts, spaced_texts);
}

#[test]
fn string_escapes_decode() {
    let cases = [
        (r#""a\nb""#, "a\nb"),
        (r#""tab\there""#, "tab\there"),
        (r#""quote\"inside""#, "quote\"inside"),
        (r#""\65\66""#, "AB"),
        (r#""\x41""#, "A"),
        (r#""\u{2603}""#, "\u{2603}"),
    ];
    for (source, expected) in cases {
        let tokens = lex(source, LuaSyntaxOptions::lua54());
        assert_eq!(
            tokens[0].token_value().unwrap().as_str(),
            Some(expected),
            "{source}"
        );
    }
}

#[test]
fn extended_escapes_flagged_in_51() {
    let tokens = lex(r#"x = "\x41""#, LuaSyntaxOptions::lua51());
    let string = tokens
        .iter()
        .find(|t| t.kind() == SyntaxKind::StringLiteral)
        .unwrap();
    assert!(string.diagnostics().iter().any(|d| d.id == "LUA1007"));
}

#[test]
fn fivem_extras() {
    let options = LuaSyntaxOptions::fivem();
    let tokens = lex("n = 1_000_000", options.clone());
    assert_eq!(
        tokens[2].token_value(),
        Some(&TokenValue::Integer(1_000_000))
    );
    let tokens = lex("h = `hash`", options.clone());
    let tick = &tokens[2];
    assert_eq!(tick.kind(), SyntaxKind::StringLiteral);
    assert!(tick.diagnostics().is_empty());
    assert_eq!(tick.token_value().unwrap().as_str(), Some("hash"));
    let tokens = lex("b = 0b1010", options);
    assert_eq!(tokens[2].token_value(), Some(&TokenValue::Integer(10)));
}

#[test]
fn bitwise_tokens_flagged_in_51() {
    let tokens = lex("a = b & c", LuaSyntaxOptions::lua51());
    let op = tokens
        .iter()
        .find(|t| t.kind() == SyntaxKind::Ampersand)
        .unwrap();
    assert!(op.diagnostics().iter().any(|d| d.id == "LUA1007"));

    let tokens = lex("a = b & c", LuaSyntaxOptions::lua53());
    let op = tokens
        .iter()
        .find(|t| t.kind() == SyntaxKind::Ampersand)
        .unwrap();
    assert!(op.diagnostics().is_empty());
}
