//! 診断レンダリングとツリーダンプのテスト

use codespan_reporting::diagnostic::{LabelStyle, Severity};
use kagami::matcher::{Matches, Search, SearchOptions};
use kagami::oracle::EmptyOracle;
use kagami::parser;
use kagami::report::{duplicates_diagnostic, occurrence_diagnostics};
use kagami::tree::{NodePath, NodeRef};
use pretty_assertions::assert_eq;

fn two_occurrences() -> Matches {
    let pattern = parser::parse_expression("$x + 1").expect("式の解析に成功するはず");
    let scope =
        parser::parse_statement("{ int a = b + 1; int c = d + 1; }").expect("文の解析に成功するはず");

    let options = SearchOptions {
        allow_variables_in_pattern: true,
        no_element_verify: true,
        allow_go_deeper: true,
        ..SearchOptions::default()
    };

    let oracle = EmptyOracle;
    Search::new(&oracle)
        .options(options)
        .find_one(&NodePath::root(pattern), &NodePath::root(scope))
        .expect("検索に成功するはず")
}

#[test]
fn test_duplicates_diagnostic_labels_every_occurrence() {
    let found = two_occurrences();
    assert_eq!(found.len(), 2);

    let diagnostic = duplicates_diagnostic(&found, 0).expect("診断が作られるはず");
    assert_eq!(diagnostic.severity, Severity::Warning);
    assert_eq!(diagnostic.labels.len(), 2);
    assert_eq!(diagnostic.labels[0].style, LabelStyle::Primary);
    assert_eq!(diagnostic.labels[1].style, LabelStyle::Secondary);
}

#[test]
fn test_empty_matches_yield_no_diagnostic() {
    assert!(duplicates_diagnostic(&Matches::default(), 0).is_none());
}

#[test]
fn test_occurrence_diagnostics_list_bound_variables() {
    let found = two_occurrences();
    let diagnostics = occurrence_diagnostics(&found, 0);

    assert_eq!(diagnostics.len(), 2);
    for diagnostic in &diagnostics {
        assert_eq!(diagnostic.labels.len(), 1);
        assert!(diagnostic.notes[0].contains("$x"));
    }
}

#[test]
fn test_tree_serialization_round_trip() {
    let node: NodeRef = parser::parse_expression("a.b(1) + c").expect("式の解析に成功するはず");

    let json = serde_json::to_string(&node).expect("シリアライズに成功するはず");
    let back: NodeRef = serde_json::from_str(&json).expect("デシリアライズに成功するはず");

    assert_eq!(node, back);
}
