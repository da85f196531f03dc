//! 複文パターンの重複検出テスト
//!
//! 先頭文の出現から文リストを連鎖照合する重複検出のテスト。
//! 束縛の引き継ぎ、残り文数の不足による棄却、リマップモードでの
//! 一貫したリネーム検出を確かめる。

use std::collections::HashSet;
use std::rc::Rc;

use kagami::matcher::{Search, SearchOptions};
use kagami::oracle::{ElementKind, EmptyOracle, SimpleOracle};
use kagami::parser;
use kagami::tree::{Node, NodePath, NodeRef};
use pretty_assertions::assert_eq;

fn stmt(source: &str) -> NodeRef {
    parser::parse_statement(source).expect("文の解析に成功するはず")
}

fn pattern_paths(source: &str) -> Vec<NodePath> {
    parser::parse_statements(source)
        .expect("文リストの解析に成功するはず")
        .into_iter()
        .map(NodePath::root)
        .collect()
}

/// 構文的マッチングの既定オプション（go-deeperあり）
fn syntactic_deep() -> SearchOptions {
    SearchOptions {
        allow_variables_in_pattern: true,
        no_element_verify: true,
        allow_go_deeper: true,
        ..SearchOptions::default()
    }
}

#[test]
fn test_two_statement_sequence_is_found() {
    let patterns = pattern_paths("f(); g();");
    let scope = stmt("{ f(); g(); }");

    let oracle = EmptyOracle;
    let found = Search::new(&oracle)
        .options(syntactic_deep())
        .find(&patterns, &NodePath::root(scope.clone()))
        .expect("検索に成功するはず");

    assert_eq!(found.len(), 1);

    // 出現は先頭文の位置で報告される
    let Node::Block(block) = &*scope else {
        panic!("ブロックになるはず");
    };
    let (path, _) = found.iter().next().unwrap();
    assert!(Rc::ptr_eq(path.leaf(), &block.statements[0]));
}

#[test]
fn test_insufficient_trailing_statements_discards_candidate() {
    let patterns = pattern_paths("f(); g();");

    // 先頭文はリストの最後にしか現れないので、連鎖できず棄却される
    let scope = stmt("{ q(); f(); }");
    let oracle = EmptyOracle;
    let found = Search::new(&oracle)
        .options(syntactic_deep())
        .find(&patterns, &NodePath::root(scope))
        .expect("検索に成功するはず");

    assert!(found.is_empty());
}

#[test]
fn test_chained_bindings_thread_across_statements() {
    // 先頭文で束縛された$vは後続の文でも同じ束縛にマッチしなければ
    // ならない
    let mut oracle = SimpleOracle::new();
    let t = oracle.add_type("T");
    let x = oracle.add_element("x", ElementKind::Variable, Some(t));
    let y = oracle.add_element("y", ElementKind::Variable, Some(t));
    let f = oracle.add_element("f", ElementKind::Method, None);
    let g = oracle.add_element("g", ElementKind::Method, None);
    oracle.bind_name("x", x);
    oracle.bind_name("y", y);
    oracle.bind_name("f", f);
    oracle.bind_name("g", g);

    let patterns = pattern_paths("$v.f(); $v.g();");
    let options = SearchOptions {
        allow_variables_in_pattern: true,
        allow_go_deeper: true,
        ..SearchOptions::default()
    };

    let mismatched = Search::new(&oracle)
        .options(options)
        .find(&patterns, &NodePath::root(stmt("{ x.f(); y.g(); }")))
        .expect("検索に成功するはず");
    assert!(mismatched.is_empty());

    let consistent = Search::new(&oracle)
        .options(options)
        .find(&patterns, &NodePath::root(stmt("{ x.f(); x.g(); }")))
        .expect("検索に成功するはず");
    assert_eq!(consistent.len(), 1);

    let (_, assignments) = consistent.iter().next().unwrap();
    let Node::Identifier(receiver) = &**assignments.variables["$v"].leaf() else {
        panic!("レシーバ式に束縛されるはず");
    };
    assert_eq!(receiver.name, "x");
}

#[test]
fn test_remap_reports_each_renamed_occurrence() {
    // パターン中の`a`をリマップ可能にすると、一貫してリネームされた
    // 2つの並びが別々の出現として報告される
    let mut oracle = SimpleOracle::new();
    let t = oracle.add_type("T");
    let a = oracle.add_element("a", ElementKind::Variable, Some(t));
    let x = oracle.add_element("x", ElementKind::Variable, Some(t));
    let y = oracle.add_element("y", ElementKind::Variable, Some(t));
    let f = oracle.add_element("f", ElementKind::Method, None);
    let g = oracle.add_element("g", ElementKind::Method, None);
    oracle.bind_name("a", a);
    oracle.bind_name("x", x);
    oracle.bind_name("y", y);
    oracle.bind_name("f", f);
    oracle.bind_name("g", g);

    let patterns = pattern_paths("a.f(); a.g();");
    let scope = stmt("{ x.f(); x.g(); other(); y.f(); y.g(); }");

    let mut candidates = HashSet::new();
    candidates.insert(a);

    let options = SearchOptions {
        allow_variables_in_pattern: true,
        allow_go_deeper: true,
        ..SearchOptions::default()
    };

    let found = Search::new(&oracle)
        .options(options)
        .remap_candidates(candidates)
        .find(&patterns, &NodePath::root(scope.clone()))
        .expect("検索に成功するはず");

    assert_eq!(found.len(), 2);

    // 出現位置は各並びの先頭文
    let Node::Block(block) = &*scope else {
        panic!("ブロックになるはず");
    };
    let keys: Vec<NodeRef> = found.iter().map(|(path, _)| path.leaf().clone()).collect();
    assert!(Rc::ptr_eq(&keys[0], &block.statements[0]));
    assert!(Rc::ptr_eq(&keys[1], &block.statements[3]));

    // リマップ表にはリネームされたシンボル1つにつき1エントリ
    let remapped: Vec<String> = found
        .iter()
        .map(|(_, assignments)| {
            assert_eq!(assignments.remap_to_trees.len(), 1);
            let path = assignments.remap_to_trees.get(&a).expect("aのリマップ先");
            let Node::Identifier(ident) = &**path.leaf() else {
                panic!("識別子へのリマップになるはず");
            };
            ident.name.clone()
        })
        .collect();
    assert_eq!(remapped, vec!["x".to_string(), "y".to_string()]);
}
