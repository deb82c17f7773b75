use loretta::{
    parse, GreenNode, LuaSyntaxOptions, NodeOrToken, SourceText, SyntaxKind, TextRange, TextSize,
    TokenAtOffset,
};

fn parse54(text: &str) -> loretta::SyntaxTree {
    parse(text, LuaSyntaxOptions::lua54())
}

/// Checks the width bookkeeping of a green subtree: a parent's full width is
/// always the sum of its children's.
fn check_widths(green: &GreenNode) {
    if green.is_token() {
        let mut expected = TextSize::of(green.token_text().unwrap_or(""));
        if let Some(leading) = green.leading_trivia_green() {
            check_widths(leading);
            expected += leading.full_width();
        }
        if let Some(trailing) = green.trailing_trivia_green() {
            check_widths(trailing);
            expected += trailing.full_width();
        }
        assert_eq!(green.full_width(), expected);
        return;
    }
    if green.is_trivia() {
        assert_eq!(
            green.full_width(),
            TextSize::of(green.trivia_text().unwrap_or(""))
        );
        return;
    }
    let sum: TextSize = green.children().map(GreenNode::full_width).sum();
    assert_eq!(green.full_width(), sum);
    for child in green.children() {
        check_widths(child);
    }
}

#[test]
fn widths_add_up() {
    let tree = parse54("local x = 1 -- trailing\nreturn x + 1\n");
    check_widths(tree.green_root());
}

#[test]
fn token_texts_concatenate_to_the_source() {
    let source = "local x = 1 --[[ c ]] return x\n";
    let tree = parse54(source);
    let rebuilt: String = tree.root().tokens().map(|t| t.full_text()).collect();
    assert_eq!(rebuilt, source);
}

#[test]
fn reparsing_the_output_is_idempotent() {
    let sources = [
        "local x = 1\nreturn x",
        "if a then b() elseif c then d() else e() end",
        "broken ( input [ here",
    ];
    for source in sources {
        let once = parse54(source);
        assert_eq!(once.root().full_text(), source);
        let twice = parse54(&once.root().full_text());
        assert_eq!(
            once.green_root(),
            twice.green_root(),
            "green structure must be reproducible for {source:?}"
        );
        let thrice = parse54(&twice.root().full_text());
        assert_eq!(twice.green_root(), thrice.green_root());
    }
}

#[test]
fn root_has_no_parent_and_children_know_offsets() {
    let tree = parse54("a = 1\nb = 2\n");
    let root = tree.root();
    assert!(root.parent().is_none());
    for node in root.descendants() {
        if let Some(parent) = node.parent() {
            let mut offset = parent.position();
            for element in parent.children_with_tokens() {
                assert_eq!(element.full_span().start(), offset);
                offset += element.full_span().len();
            }
        }
    }
}

#[test]
fn forward_and_reverse_enumeration_agree() {
    let tree = parse54("f(1, 2, 3)\n");
    for node in tree.root().descendants() {
        let forward: Vec<_> = node.children_with_tokens().collect();
        let mut reversed: Vec<_> = node.children_with_tokens().rev().collect();
        reversed.reverse();
        assert_eq!(forward.len(), node.slot_count());
        assert_eq!(forward, reversed);
        // Indexed access agrees with enumeration order.
        for (index, element) in forward.iter().enumerate() {
            assert_eq!(node.child_or_token(index).as_ref(), Some(element));
        }
    }
}

#[test]
fn spans_exclude_outer_trivia() {
    let tree = parse54("  return 1  ");
    let statement = tree
        .root()
        .descendants()
        .find(|n| n.kind() == SyntaxKind::ReturnStatement)
        .unwrap();
    assert_eq!(statement.full_span(), TextRange::new(0.into(), 12.into()));
    assert_eq!(statement.span(), TextRange::new(2.into(), 10.into()));
    assert_eq!(statement.text(), "return 1");
    assert_eq!(statement.full_text(), "  return 1  ");
}

#[test]
fn token_at_offset_finds_boundaries() {
    let tree = parse54("local x = 1");
    // Offsets: `local ` is 0..6, `x ` is 6..8.
    match tree.root().token_at_offset(TextSize::new(3)) {
        TokenAtOffset::Single(token) => assert_eq!(token.text(), "local"),
        other => panic!("expected a single token, got {other:?}"),
    }
    match tree.root().token_at_offset(TextSize::new(6)) {
        TokenAtOffset::Between(left, right) => {
            assert_eq!(left.text(), "local");
            assert_eq!(right.text(), "x");
        }
        other => panic!("expected a boundary, got {other:?}"),
    }
}

#[test]
fn next_token_walks_source_order() {
    let tree = parse54("local x = f(1)\n");
    let mut walked = Vec::new();
    let mut token = tree.root().first_token();
    while let Some(current) = token {
        walked.push(current.text().to_owned());
        token = current.next_token();
    }
    assert_eq!(walked, ["local", "x", "=", "f", "(", "1", ")", ""]);

    let mut backwards = Vec::new();
    let mut token = tree.root().last_token();
    while let Some(current) = token {
        backwards.push(current.text().to_owned());
        token = current.prev_token();
    }
    backwards.reverse();
    assert_eq!(walked, backwards);
}

#[test]
fn children_are_rematerialized_after_reclamation() {
    let tree = parse54("return 1");
    let root = tree.root();
    let first = root.first_child_or_token().unwrap();
    // While alive, the cached child is handed out again.
    let again = root.first_child_or_token().unwrap();
    assert_eq!(first, again);
    let span = first.full_span();
    drop(first);
    drop(again);
    // After dropping, the slot re-materializes an equal child.
    let rebuilt = root.first_child_or_token().unwrap();
    assert_eq!(rebuilt.full_span(), span);
    assert_eq!(rebuilt.kind(), SyntaxKind::Block);
}

#[test]
fn trivia_lists_expose_pieces_with_positions() {
    let tree = parse54("x = 1 -- note\ny = 2");
    let one = tree
        .root()
        .tokens()
        .find(|t| t.text() == "1")
        .unwrap();
    let trailing: Vec<_> = one.trailing_trivia().iter().collect();
    let kinds: Vec<_> = trailing.iter().map(|t| t.kind()).collect();
    assert_eq!(
        kinds,
        vec![
            SyntaxKind::Whitespace,
            SyntaxKind::Comment,
            SyntaxKind::EndOfLine
        ]
    );
    assert_eq!(trailing[1].text(), "-- note");
    assert_eq!(trailing[1].span(), TextRange::new(6.into(), 13.into()));
    assert_eq!(trailing[1].token(), &one);
}

#[test]
fn separated_lists_are_detected() {
    let tree = parse54("local a, b, c = 1, 2, 3");
    let declaration = tree
        .root()
        .descendants()
        .find(|n| n.kind() == SyntaxKind::LocalDeclaration)
        .unwrap();
    let names = declaration
        .children()
        .find(|n| n.kind() == SyntaxKind::List)
        .unwrap();
    let green = names.green();
    assert!(green.is_separated_list());
    assert_eq!(green.separated_element_count(), 3);
    assert_eq!(green.separated_element(1).unwrap().text(), "b");
    assert_eq!(green.separator(0).unwrap().kind(), SyntaxKind::Comma);
}

#[test]
fn token_list_views() {
    let tree = parse54("function a.b.c() end");
    let name = tree
        .root()
        .descendants()
        .find(|n| n.kind() == SyntaxKind::FunctionName)
        .unwrap();
    let list = name.token_list(0).expect("slot 0 holds the first name token");
    assert!(list.any());
    assert_eq!(list.count(), 1);
    let token = list.get(0).unwrap();
    assert_eq!(token.text(), "a");
    assert_eq!(list.first().unwrap(), token);
    assert_eq!(list.last().unwrap(), token);
    assert_eq!(list.index_of(&token), Some(0));
    assert_eq!(list.iter().count(), 1);

    // Functional edits build fresh, re-specialized green lists.
    let pushed = list.push(GreenNode::token(SyntaxKind::Identifier, "x"));
    assert!(pushed.is_list());
    assert_eq!(pushed.slot_count(), 2);
    let replaced = list.replace(0, GreenNode::token(SyntaxKind::Identifier, "y"));
    assert_eq!(replaced.slot_count(), 1);
    assert_eq!(replaced.get_slot(0).unwrap().token_text(), Some("y"));
    let emptied = list.remove_at(0);
    assert_eq!(emptied.slot_count(), 0);
}

#[test]
fn line_index_scenario() {
    let source = SourceText::new("a\r\nb\nc");
    let index = source.line_index();
    let starts: Vec<u32> = index.line_starts().iter().map(|&s| s.into()).collect();
    assert_eq!(starts, vec![0, 3, 5]);
    let breaks: Vec<u8> = (0..index.line_count())
        .map(|line| index.line_break_length(line))
        .collect();
    assert_eq!(breaks, vec![2, 1, 0]);
}

#[test]
fn diagnostics_carry_absolute_spans() {
    let tree = parse54("x = \"abc\n");
    let diagnostics = tree.diagnostics();
    let unterminated = diagnostics
        .iter()
        .find(|d| d.id == "LUA1002")
        .expect("the unterminated string is diagnosed");
    assert_eq!(
        unterminated.location.span(),
        Some(TextRange::new(4.into(), 8.into()))
    );
}

#[test]
fn ancestors_reach_the_root() {
    let tree = parse54("return a.b.c");
    let member = tree
        .root()
        .descendants()
        .filter(|n| n.kind() == SyntaxKind::MemberAccessExpression)
        .last()
        .unwrap();
    let chain: Vec<SyntaxKind> = member.ancestors().map(|n| n.kind()).collect();
    assert_eq!(chain.first(), Some(&SyntaxKind::MemberAccessExpression));
    assert_eq!(chain.last(), Some(&SyntaxKind::Chunk));
}

#[test]
fn preorder_is_balanced() {
    let tree = parse54("if a then b() end");
    let mut depth = 0i32;
    for event in tree.root().preorder_with_tokens() {
        match event {
            loretta::WalkEvent::Enter(_) => depth += 1,
            loretta::WalkEvent::Leave(_) => depth -= 1,
        }
        assert!(depth >= 0);
    }
    assert_eq!(depth, 0);
}

#[test]
fn red_equality_is_positional() {
    let tree = parse54("return 1");
    let a = tree.root().first_child_or_token().unwrap();
    let b = tree.root().first_child_or_token().unwrap();
    assert_eq!(a, b);
    match (a, b) {
        (NodeOrToken::Node(a), NodeOrToken::Node(b)) => {
            assert_eq!(a.position(), b.position());
        }
        _ => panic!("the first child of a chunk is its block"),
    }
}
