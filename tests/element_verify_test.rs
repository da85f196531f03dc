//! シンボル照合テスト
//!
//! オラクルを使った意味的な照合のテスト。要素の同一性、static
//! メンバとワイルドカードレシーバ、オーバーライド、エラー型の
//! 非確定扱い、型制約、合成thisレシーバを確かめる。

use kagami::matcher::{Matches, Search, SearchOptions};
use kagami::oracle::{ElementKind, SimpleOracle};
use kagami::parser;
use kagami::tree::{Node, NodePath, NodeRef};
use pretty_assertions::assert_eq;

fn expr(source: &str) -> NodeRef {
    parser::parse_expression(source).expect("式の解析に成功するはず")
}

fn stmt(source: &str) -> NodeRef {
    parser::parse_statement(source).expect("文の解析に成功するはず")
}

/// 要素照合ありの既定オプション
fn attributed() -> SearchOptions {
    SearchOptions {
        allow_variables_in_pattern: true,
        ..SearchOptions::default()
    }
}

fn find(
    oracle: &SimpleOracle,
    pattern: &NodeRef,
    scope: &NodeRef,
    options: SearchOptions,
) -> Matches {
    Search::new(oracle)
        .options(options)
        .find_one(&NodePath::root(pattern.clone()), &NodePath::root(scope.clone()))
        .expect("検索に成功するはず")
}

#[test]
fn test_synthetic_this_matches_bare_call() {
    // `this.f()`のパターンは、囲みクラスの中の裸の`f()`にマッチする
    let mut oracle = SimpleOracle::new();
    let f = oracle.add_element("f", ElementKind::Method, None);
    oracle.bind_name("f", f);

    let pattern = expr("this.f()");
    let scope = parser::parse_class("class C { void m() { f(); } }")
        .expect("クラスの解析に成功するはず");

    let mut options = attributed();
    options.allow_go_deeper = true;

    let found = find(&oracle, &pattern, &scope, options);
    assert_eq!(found.len(), 1);

    let (path, _) = found.iter().next().unwrap();
    assert!(matches!(&**path.leaf(), Node::MethodInvocation(_)));
}

#[test]
fn test_static_member_rejects_wildcard_receiver_on_class_selector() {
    // ワイルドカードレシーバはインスタンス式を表すので、クラス名
    // 経由のstaticメンバ参照にはマッチしない
    let mut oracle = SimpleOracle::new();
    let util = oracle.add_element("Util", ElementKind::Class, None);
    let sf = oracle.add_element("sf", ElementKind::Method, None);
    oracle.set_static(sf);
    let obj = oracle.add_element("obj", ElementKind::Variable, None);
    oracle.bind_name("Util", util);
    oracle.bind_name("sf", sf);
    oracle.bind_name("obj", obj);

    let pattern = expr("$recv.sf()");
    let mut options = attributed();
    options.allow_go_deeper = true;

    let via_class = find(&oracle, &pattern, &stmt("Util.sf();"), options);
    assert!(via_class.is_empty());

    let via_instance = find(&oracle, &pattern, &stmt("obj.sf();"), options);
    assert_eq!(via_instance.len(), 1);

    let (_, assignments) = via_instance.iter().next().unwrap();
    let Node::Identifier(receiver) = &**assignments.variables["$recv"].leaf() else {
        panic!("レシーバ式に束縛されるはず");
    };
    assert_eq!(receiver.name, "obj");
}

#[test]
fn test_overriding_method_matches_pattern_method() {
    let mut oracle = SimpleOracle::new();
    let base = oracle.add_element("Base", ElementKind::Class, None);
    let run = oracle.add_element("run", ElementKind::Method, None);
    let run_impl = oracle.add_element("runImpl", ElementKind::Method, None);
    oracle.set_enclosing(run_impl, base);
    oracle.set_override(run_impl, run);
    let o = oracle.add_element("o", ElementKind::Variable, None);
    oracle.bind_name("run", run);
    oracle.bind_name("runImpl", run_impl);
    oracle.bind_name("o", o);

    let found = find(&oracle, &expr("o.run()"), &expr("o.runImpl()"), attributed());
    assert_eq!(found.len(), 1);
}

#[test]
fn test_error_type_is_inconclusive_not_fatal() {
    // エラー型の候補では確定できないが、検索全体は中断されず
    // 他の候補は見つかる
    let mut oracle = SimpleOracle::new();
    let t_error = oracle.add_error_type();
    let t_v = oracle.add_type("V");
    let v = oracle.add_element("v", ElementKind::Variable, Some(t_v));
    let w = oracle.add_element("w", ElementKind::Variable, Some(t_error));
    oracle.bind_name("v", v);
    oracle.bind_name("w", w);

    let mut options = attributed();
    options.allow_go_deeper = true;

    let scope = stmt("{ int a = w; int b = v; }");
    let found = find(&oracle, &expr("v"), &scope, options);
    assert_eq!(found.len(), 1);

    let (path, _) = found.iter().next().unwrap();
    let Node::Identifier(ident) = &**path.leaf() else {
        panic!("識別子の出現になるはず");
    };
    assert_eq!(ident.name, "v");
}

#[test]
fn test_type_constrained_variable_in_expression() {
    let mut oracle = SimpleOracle::new();
    let t_num = oracle.add_type("Number");
    let t_str = oracle.add_type("String");
    let t_int = oracle.add_type("Integer");
    oracle.set_assignable(t_int, t_num);

    let a = oracle.add_element("a", ElementKind::Variable, Some(t_num));
    let s = oracle.add_element("s", ElementKind::Variable, Some(t_str));
    let c = oracle.add_element("c", ElementKind::Variable, Some(t_int));
    oracle.bind_name("a", a);
    oracle.bind_name("s", s);
    oracle.bind_name("c", c);

    let mut options = attributed();
    options.allow_go_deeper = true;
    options.no_element_verify = true;

    let scope = stmt("{ int q = a + 1; int r = s + 1; int u = c + 1; }");
    let found = Search::new(&oracle)
        .options(options)
        .constrain_type("$x", t_num)
        .find_one(&NodePath::root(expr("$x + 1")), &NodePath::root(scope))
        .expect("検索に成功するはず");

    // 代入可能な型の候補だけが束縛される
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
    assert_eq!(bound_names, vec!["a".to_string(), "c".to_string()]);
}

#[test]
fn test_type_constrained_variable_in_declaration() {
    let mut oracle = SimpleOracle::new();
    let t_num = oracle.add_type("Number");
    let t_str = oracle.add_type("String");
    let a = oracle.add_element("a", ElementKind::Variable, Some(t_num));
    let s = oracle.add_element("s", ElementKind::Variable, Some(t_str));
    oracle.bind_name("a", a);
    oracle.bind_name("s", s);

    let mut options = attributed();
    options.no_element_verify = true;

    let pattern = stmt("int $x = 0;");

    let matching = Search::new(&oracle)
        .options(options)
        .constrain_type("$x", t_num)
        .find_one(
            &NodePath::root(pattern.clone()),
            &NodePath::root(stmt("int a = 0;")),
        )
        .expect("検索に成功するはず");
    assert_eq!(matching.len(), 1);

    let rejected = Search::new(&oracle)
        .options(options)
        .constrain_type("$x", t_num)
        .find_one(&NodePath::root(pattern), &NodePath::root(stmt("int s = 0;")))
        .expect("検索に成功するはず");
    assert!(rejected.is_empty());
}
