#![cfg(feature = "serde1")]

use loretta::{
    parse, GreenNode, LuaSyntaxOptions, SyntaxAnnotation, SyntaxKind, SyntaxTree, TokenValue,
};

#[test]
fn green_tree_round_trips() {
    let tree = parse(
        "local x = 1 -- keep me\nreturn x\n",
        LuaSyntaxOptions::lua54(),
    );
    let json = serde_json::to_string(tree.green_root()).unwrap();
    let restored: GreenNode = serde_json::from_str(&json).unwrap();
    assert_eq!(&restored, tree.green_root());
    assert_eq!(restored.full_text(), "local x = 1 -- keep me\nreturn x\n");
}

#[test]
fn syntax_tree_round_trips_with_source_and_options() {
    let tree = parse("x = \"abc\n", LuaSyntaxOptions::glua());
    let json = serde_json::to_string(&tree).unwrap();
    let restored: SyntaxTree = serde_json::from_str(&json).unwrap();
    assert_eq!(restored.source().as_str(), tree.source().as_str());
    assert_eq!(restored.options(), tree.options());
    assert_eq!(restored.green_root(), tree.green_root());
    // Diagnostics survive, with the same absolute spans.
    assert_eq!(restored.diagnostics(), tree.diagnostics());
}

#[test]
fn annotations_keep_their_identity() {
    let annotation = SyntaxAnnotation::with_kind_and_data("formatting", "keep");
    let token = GreenNode::token_full(
        SyntaxKind::Identifier,
        "x",
        TokenValue::None,
        None,
        None,
        Vec::new(),
    )
    .with_annotations(vec![annotation.clone()]);
    let expr = GreenNode::node(SyntaxKind::NameExpression, vec![token]);
    assert!(expr.contains_annotations());

    let json = serde_json::to_string(&expr).unwrap();
    let restored: GreenNode = serde_json::from_str(&json).unwrap();
    let restored_token = restored.get_slot(0).unwrap();
    let restored_annotation = &restored_token.annotations()[0];

    // Identity is by id, and ids travel through serialization verbatim.
    assert_eq!(restored_annotation, &annotation);
    assert_eq!(restored_annotation.id(), annotation.id());
    assert_eq!(restored_annotation.kind(), Some("formatting"));
    assert_eq!(restored_annotation.data(), Some("keep"));
    assert!(restored_token.has_annotation(&annotation));
}

#[test]
fn elastic_annotation_round_trips() {
    let elastic = SyntaxAnnotation::elastic();
    let trivia = GreenNode::trivia(SyntaxKind::Whitespace, " ")
        .with_annotations(vec![elastic.clone()]);
    let json = serde_json::to_string(&trivia).unwrap();
    let restored: GreenNode = serde_json::from_str(&json).unwrap();
    assert!(restored.has_annotation(elastic));
}

#[test]
fn corrupt_kinds_fail_the_read() {
    let tree = parse("return 1", LuaSyntaxOptions::lua54());
    let mut value = serde_json::to_value(tree.green_root()).unwrap();
    value["kind"] = serde_json::json!(60000);
    assert!(serde_json::from_value::<GreenNode>(value).is_err());
}

#[test]
fn mismatched_payloads_fail_the_read() {
    // A trivia payload under a token kind must be rejected, not guessed at.
    let json = serde_json::json!({
        "kind": SyntaxKind::Identifier.into_raw(),
        "missing": false,
        "diagnostics": [],
        "annotations": [],
        "payload": { "t": "Trivia", "c": " " },
    });
    assert!(serde_json::from_value::<GreenNode>(json).is_err());
}
