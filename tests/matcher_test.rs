//! 構造マッチャーテスト
//!
//! 純粋に構文的なモード（要素照合なし）でのマッチャーエンジンの
//! テスト。自由変数の束縛と一貫性、複文ワイルドカード、ブロックと
//! 文の等価則、go-deeper検索、キャンセルを確かめる。

use std::rc::Rc;
use std::sync::atomic::AtomicBool;

use kagami::error::MatchError;
use kagami::matcher::{BindState, Matches, Search, SearchOptions};
use kagami::oracle::EmptyOracle;
use kagami::parser;
use kagami::tree::{Node, NodeKind, NodePath, NodeRef};
use pretty_assertions::assert_eq;

fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

fn expr(source: &str) -> NodeRef {
    parser::parse_expression(source).expect("式の解析に成功するはず")
}

fn stmt(source: &str) -> NodeRef {
    parser::parse_statement(source).expect("文の解析に成功するはず")
}

/// 構文的マッチングの既定オプション
fn syntactic() -> SearchOptions {
    SearchOptions {
        allow_variables_in_pattern: true,
        no_element_verify: true,
        ..SearchOptions::default()
    }
}

fn find(pattern: &NodeRef, scope: &NodeRef, options: SearchOptions) -> Matches {
    let oracle = EmptyOracle;
    Search::new(&oracle)
        .options(options)
        .find_one(&NodePath::root(pattern.clone()), &NodePath::root(scope.clone()))
        .expect("検索に成功するはず")
}

#[test]
fn test_self_match_binds_variables_to_themselves() {
    init_logging();

    let pattern = stmt("if ($cond) { $body$; } else { $body$; }");
    let root = NodePath::root(pattern.clone());
    let oracle = EmptyOracle;

    let found = Search::new(&oracle)
        .options(syntactic())
        .find_one(&root, &root)
        .expect("検索に成功するはず");

    assert_eq!(found.len(), 1);
    assert!(!found.cancelled);

    let assignments = found.get(&root).expect("ルートでマッチするはず");
    let Node::If(if_stmt) = &*pattern else {
        panic!("if文になるはず");
    };

    // $condは自分自身の条件式に束縛される
    let bound = &assignments.variables["$cond"];
    assert!(Rc::ptr_eq(bound.leaf(), &if_stmt.condition));
    assert_eq!(assignments.multi_variables["$body$"].len(), 1);
}

#[test]
fn test_variable_consistency() {
    let found = find(&expr("$a + $a"), &expr("x + x"), syntactic());
    assert_eq!(found.len(), 1);

    let (_, assignments) = found.iter().next().unwrap();
    assert!(assignments.variables.contains_key("$a"));
    // 再束縛は連番つきの別名として追加で記録される
    assert!(assignments.variables.contains_key("$a$1"));

    assert!(find(&expr("$a + $a"), &expr("x + y"), syntactic()).is_empty());
}

#[test]
fn test_multi_wildcard_binds_statement_sequence() {
    let pattern = stmt("if ($cond) { $body$; } else { $body$; }");
    let scope = stmt("if (x > 0) { foo(); bar(); } else { foo(); bar(); }");

    let found = find(&pattern, &scope, syntactic());
    assert_eq!(found.len(), 1);

    let (_, assignments) = found.iter().next().unwrap();
    let sequence = &assignments.multi_variables["$body$"];
    assert_eq!(sequence.len(), 2);

    let bound_condition = assignments.variables["$cond"].leaf();
    assert!(matches!(&**bound_condition, Node::Binary(_)));
}

#[test]
fn test_multi_wildcard_rejects_differing_branches() {
    let pattern = stmt("if ($cond) { $body$; } else { $body$; }");
    let scope = stmt("if (x > 0) { foo(); } else { baz(); }");

    assert!(find(&pattern, &scope, syntactic()).is_empty());
}

#[test]
fn test_multi_wildcard_length_invariance() {
    let pattern = stmt("if ($cond) { $body$; } else { $body$; }");
    let scope = stmt("if (a) { f(); g(); } else { f(); }");

    assert!(find(&pattern, &scope, syntactic()).is_empty());
}

#[test]
fn test_single_statement_block_matches_statement() {
    // 単文ブロックのパターンは裸の文にマッチする
    let found = find(&stmt("{ foo(); }"), &stmt("foo();"), syntactic());
    assert_eq!(found.len(), 1);
}

#[test]
fn test_statement_matches_inside_block_with_go_deeper() {
    let mut options = syntactic();
    options.allow_go_deeper = true;

    let scope = stmt("{ foo(); }");
    let found = find(&stmt("foo();"), &scope, options);
    assert_eq!(found.len(), 1);

    let (path, _) = found.iter().next().unwrap();
    assert!(!Rc::ptr_eq(path.leaf(), &scope));
    assert_eq!(path.leaf().kind(), NodeKind::ExpressionStatement);
}

#[test]
fn test_go_deeper_finds_matches_in_document_order() {
    let mut options = syntactic();
    options.allow_go_deeper = true;

    let scope = stmt("{ int a = b + 1; int c = d + 1; }");
    let found = find(&expr("$x + 1"), &scope, options);
    assert_eq!(found.len(), 2);

    let bound_names: Vec<String> = found
        .iter()
        .map(|(_, assignments)| {
            let Node::Identifier(ident) = &**assignments.variables["$x"].leaf() else {
                panic!("識別子に束縛されるはず");
            };
            ident.name.clone()
        })
        .collect();
    assert_eq!(bound_names, vec!["b".to_string(), "d".to_string()]);
}

#[test]
fn test_statement_variable_binds_whole_statement() {
    let found = find(&stmt("{ $a; $a; }"), &stmt("{ foo(); foo(); }"), syntactic());
    assert_eq!(found.len(), 1);

    assert!(find(&stmt("{ $a; $a; }"), &stmt("{ foo(); bar(); }"), syntactic()).is_empty());
}

#[test]
fn test_member_name_channel() {
    let pattern = expr("x.$m() + x.$m()");

    let found = find(&pattern, &expr("x.foo() + x.foo()"), syntactic());
    assert_eq!(found.len(), 1);

    let (_, assignments) = found.iter().next().unwrap();
    assert_eq!(assignments.variables_to_names["$m"], "foo");

    assert!(find(&pattern, &expr("x.foo() + x.bar()"), syntactic()).is_empty());
}

#[test]
fn test_label_name_channel() {
    let pattern = stmt("$l: while ($c) foo();");
    let scope = stmt("outer: while (x) foo();");

    let found = find(&pattern, &scope, syntactic());
    assert_eq!(found.len(), 1);

    let (_, assignments) = found.iter().next().unwrap();
    assert_eq!(assignments.variables_to_names["$l"], "outer");
}

#[test]
fn test_parameterized_type_degrades_to_base_type() {
    let pattern = stmt("List<$args$> l = null;");

    // 型引数なしのベース型にマッチ
    assert_eq!(find(&pattern, &stmt("List l = null;"), syntactic()).len(), 1);
    // 任意の型引数列にもマッチ
    assert_eq!(
        find(&pattern, &stmt("List<String> l = null;"), syntactic()).len(),
        1
    );
}

#[test]
fn test_unsupported_pattern_shape_is_an_error() {
    let pattern = stmt("{ $pre$; foo(); bar(); }");
    let oracle = EmptyOracle;

    let result = Search::new(&oracle)
        .options(syntactic())
        .find_one(&NodePath::root(pattern), &NodePath::root(stmt("foo();")));

    assert!(matches!(
        result,
        Err(MatchError::UnsupportedPatternShape(_))
    ));
}

#[test]
fn test_cancellation_before_start_yields_empty_result() {
    let cancel = AtomicBool::new(true);
    let mut options = syntactic();
    options.allow_go_deeper = true;

    let oracle = EmptyOracle;
    let found = Search::new(&oracle)
        .options(options)
        .cancel(&cancel)
        .find_one(
            &NodePath::root(stmt("foo();")),
            &NodePath::root(stmt("{ foo(); }")),
        )
        .expect("キャンセルはエラーにならないはず");

    assert!(found.is_empty());
    assert!(found.cancelled);
}

#[test]
fn test_preinitialized_state_constrains_search() {
    let mut state = BindState::empty();
    state
        .variables_to_names
        .insert("$m".to_string(), "foo".to_string());

    let mut options = syntactic();
    options.allow_go_deeper = true;

    let oracle = EmptyOracle;
    let found = Search::new(&oracle)
        .options(options)
        .preinitialized(state)
        .find_one(
            &NodePath::root(stmt("x.$m();")),
            &NodePath::root(stmt("{ x.foo(); x.bar(); }")),
        )
        .expect("検索に成功するはず");

    // 事前束縛された$m="foo"に合う出現だけが見つかる
    assert_eq!(found.len(), 1);
    let (_, assignments) = found.iter().next().unwrap();
    assert_eq!(assignments.variables_to_names["$m"], "foo");
}

#[test]
fn test_trivial_self_match_is_suppressed() {
    // パターンがスコープの中の文そのものである場合、その文自身は
    // 出現として報告されない
    let scope = stmt("{ foo(); foo(); }");
    let Node::Block(block) = &*scope else {
        panic!("ブロックになるはず");
    };

    let root = NodePath::root(scope.clone());
    let first = NodePath::child(&root, block.statements[0].clone());

    let mut options = syntactic();
    options.allow_go_deeper = true;

    let oracle = EmptyOracle;
    let found = Search::new(&oracle)
        .options(options)
        .find_one(&first, &root)
        .expect("検索に成功するはず");

    assert_eq!(found.len(), 1);
    let (path, _) = found.iter().next().unwrap();
    assert!(Rc::ptr_eq(path.leaf(), &block.statements[1]));
}

#[test]
fn test_empty_pattern_list_yields_empty_result() {
    let oracle = EmptyOracle;
    let found = Search::new(&oracle)
        .options(syntactic())
        .find(&[], &NodePath::root(stmt("foo();")))
        .expect("検索に成功するはず");

    assert!(found.is_empty());
}
