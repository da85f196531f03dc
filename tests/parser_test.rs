//! パーサーテスト
//!
//! パターン言語パーサーの各構文形式と演算子優先順位のテスト。
//! マッチャーテストで使う構文がすべて期待どおりの木になることを
//! ここで確かめる。

use kagami::parser;
use kagami::tree::{BinaryOp, LiteralValue, Node, NodeKind, NodeRef, UnaryOp};
use pretty_assertions::assert_eq;
use test_case::test_case;

/// 式の解析に成功することを確認するヘルパー
fn parse_expr(source: &str) -> NodeRef {
    parser::parse_expression(source).expect("式の解析に成功するはず")
}

/// 文の解析に成功することを確認するヘルパー
fn parse_stmt(source: &str) -> NodeRef {
    parser::parse_statement(source).expect("文の解析に成功するはず")
}

#[test]
fn test_operator_precedence() {
    // 乗算は加算より強く束縛される
    let expr = parse_expr("a + b * c");
    let Node::Binary(add) = &*expr else {
        panic!("加算になるはず");
    };
    assert_eq!(add.op, BinaryOp::Plus);
    assert_eq!(add.left.kind(), NodeKind::Identifier);

    let Node::Binary(mul) = &*add.right else {
        panic!("右辺は乗算になるはず");
    };
    assert_eq!(mul.op, BinaryOp::Multiply);
}

#[test_case("+", BinaryOp::Plus)]
#[test_case("-", BinaryOp::Minus)]
#[test_case("*", BinaryOp::Multiply)]
#[test_case("/", BinaryOp::Divide)]
#[test_case("%", BinaryOp::Remainder)]
#[test_case("<<", BinaryOp::LeftShift)]
#[test_case(">>", BinaryOp::RightShift)]
#[test_case(">>>", BinaryOp::UnsignedRightShift)]
#[test_case("<", BinaryOp::Less)]
#[test_case(">", BinaryOp::Greater)]
#[test_case("<=", BinaryOp::LessEqual)]
#[test_case(">=", BinaryOp::GreaterEqual)]
#[test_case("==", BinaryOp::Equal)]
#[test_case("!=", BinaryOp::NotEqual)]
#[test_case("&", BinaryOp::And)]
#[test_case("^", BinaryOp::Xor)]
#[test_case("|", BinaryOp::Or)]
#[test_case("&&", BinaryOp::ConditionalAnd)]
#[test_case("||", BinaryOp::ConditionalOr)]
fn test_binary_operator(op_source: &str, expected: BinaryOp) {
    let expr = parse_expr(&format!("a {} b", op_source));
    let Node::Binary(binary) = &*expr else {
        panic!("二項式になるはず: {}", op_source);
    };
    assert_eq!(binary.op, expected);
}

#[test]
fn test_member_select_and_invocation() {
    let expr = parse_expr("obj.call(1, x).field");
    let Node::MemberSelect(select) = &*expr else {
        panic!("メンバ選択になるはず");
    };
    assert_eq!(select.identifier, "field");

    let Node::MethodInvocation(invocation) = &*select.expression else {
        panic!("メソッド呼び出しになるはず");
    };
    assert_eq!(invocation.arguments.len(), 2);
    assert!(matches!(
        &*invocation.arguments[0],
        Node::Literal(literal) if literal.value == LiteralValue::Int(1)
    ));
    assert_eq!(invocation.method_select.kind(), NodeKind::MemberSelect);
}

#[test]
fn test_cast_versus_parenthesized() {
    // `(int) x`はキャスト
    let cast = parse_expr("(int) x");
    assert_eq!(cast.kind(), NodeKind::TypeCast);

    // `(a) + b`はかっこ式を左辺とする加算
    let add = parse_expr("(a) + b");
    let Node::Binary(binary) = &*add else {
        panic!("加算になるはず");
    };
    assert_eq!(binary.left.kind(), NodeKind::Parenthesized);
}

#[test]
fn test_unary_and_postfix() {
    let expr = parse_expr("!done");
    let Node::Unary(unary) = &*expr else {
        panic!("単項式になるはず");
    };
    assert_eq!(unary.op, UnaryOp::Not);

    let expr = parse_expr("i++");
    let Node::Unary(unary) = &*expr else {
        panic!("後置式になるはず");
    };
    assert_eq!(unary.op, UnaryOp::PostfixIncrement);
}

#[test]
fn test_sentinel_names_parse_as_identifiers() {
    let stmt = parse_stmt("if ($cond) { $body$; }");
    let Node::If(if_stmt) = &*stmt else {
        panic!("if文になるはず");
    };

    let Node::Identifier(cond) = &*if_stmt.condition else {
        panic!("条件は識別子になるはず");
    };
    assert_eq!(cond.name, "$cond");

    let Node::Block(block) = &*if_stmt.then_statement else {
        panic!("then節はブロックになるはず");
    };
    assert_eq!(block.statements.len(), 1);
    assert_eq!(block.statements[0].kind(), NodeKind::ExpressionStatement);
}

#[test]
fn test_local_variable_versus_expression_statement() {
    // 型+名前は変数宣言
    let decl = parse_stmt("Foo bar = make();");
    let Node::Variable(variable) = &*decl else {
        panic!("変数宣言になるはず");
    };
    assert_eq!(variable.name, "bar");
    assert!(variable.ty.is_some());
    assert!(variable.initializer.is_some());

    // 呼び出しは式文
    let stmt = parse_stmt("foo.bar();");
    assert_eq!(stmt.kind(), NodeKind::ExpressionStatement);

    // 代入も式文
    let stmt = parse_stmt("a.b.c = 1;");
    let Node::ExpressionStatement(expr_stmt) = &*stmt else {
        panic!("式文になるはず");
    };
    assert_eq!(expr_stmt.expression.kind(), NodeKind::Assignment);
}

#[test]
fn test_array_type_declaration() {
    let decl = parse_stmt("int[] arr = null;");
    let Node::Variable(variable) = &*decl else {
        panic!("変数宣言になるはず");
    };
    assert_eq!(variable.ty.as_ref().unwrap().kind(), NodeKind::ArrayType);
}

#[test]
fn test_nested_generics() {
    // `>>`はジェネリクスの閉じ2つに分割される
    let decl = parse_stmt("Map<String, List<Integer>> m = null;");
    let Node::Variable(variable) = &*decl else {
        panic!("変数宣言になるはず");
    };

    let Node::ParameterizedType(map_type) = &**variable.ty.as_ref().unwrap() else {
        panic!("パラメータ化型になるはず");
    };
    assert_eq!(map_type.type_arguments.len(), 2);
    assert_eq!(
        map_type.type_arguments[1].kind(),
        NodeKind::ParameterizedType
    );
}

#[test]
fn test_for_statements() {
    let classic = parse_stmt("for (int i = 0; i < n; i++) f(i);");
    let Node::For(for_stmt) = &*classic else {
        panic!("for文になるはず");
    };
    assert_eq!(for_stmt.initializer.len(), 1);
    assert_eq!(for_stmt.initializer[0].kind(), NodeKind::Variable);
    assert!(for_stmt.condition.is_some());
    assert_eq!(for_stmt.update.len(), 1);
    assert_eq!(for_stmt.update[0].kind(), NodeKind::ExpressionStatement);

    let enhanced = parse_stmt("for (int x : items) use(x);");
    let Node::EnhancedFor(for_each) = &*enhanced else {
        panic!("拡張for文になるはず");
    };
    assert_eq!(for_each.variable.kind(), NodeKind::Variable);
    assert_eq!(for_each.expression.kind(), NodeKind::Identifier);
}

#[test]
fn test_try_catch_finally() {
    let stmt = parse_stmt(
        "try (Res r = open()) { use(r); } catch (Ex e) { handle(e); } finally { close(); }",
    );
    let Node::Try(try_stmt) = &*stmt else {
        panic!("try文になるはず");
    };
    assert_eq!(try_stmt.resources.len(), 1);
    assert_eq!(try_stmt.catches.len(), 1);
    assert!(try_stmt.finally_block.is_some());

    let Node::Catch(catch) = &*try_stmt.catches[0] else {
        panic!("catch節になるはず");
    };
    assert_eq!(catch.parameter.kind(), NodeKind::Variable);
}

#[test]
fn test_switch_statement() {
    let stmt = parse_stmt("switch (x) { case 1: f(); break; default: g(); }");
    let Node::Switch(switch) = &*stmt else {
        panic!("switch文になるはず");
    };
    assert_eq!(switch.cases.len(), 2);

    let Node::Case(first) = &*switch.cases[0] else {
        panic!("case節になるはず");
    };
    assert!(first.expression.is_some());
    assert_eq!(first.statements.len(), 2);

    let Node::Case(default) = &*switch.cases[1] else {
        panic!("default節になるはず");
    };
    assert!(default.expression.is_none());
}

#[test]
fn test_labeled_statement_and_break() {
    let stmt = parse_stmt("out: while (true) break out;");
    let Node::Labeled(labeled) = &*stmt else {
        panic!("ラベルつき文になるはず");
    };
    assert_eq!(labeled.label, "out");

    let Node::While(while_stmt) = &*labeled.statement else {
        panic!("while文になるはず");
    };
    let Node::Break(break_stmt) = &*while_stmt.statement else {
        panic!("break文になるはず");
    };
    assert_eq!(break_stmt.label.as_deref(), Some("out"));
}

#[test]
fn test_lambda_and_member_reference() {
    let expr = parse_expr("(a, b) -> a + b");
    let Node::Lambda(lambda) = &*expr else {
        panic!("ラムダ式になるはず");
    };
    assert_eq!(lambda.parameters.len(), 2);
    assert_eq!(lambda.body.kind(), NodeKind::Binary);

    let expr = parse_expr("list.forEach(System.out::println)");
    let Node::MethodInvocation(invocation) = &*expr else {
        panic!("メソッド呼び出しになるはず");
    };
    let Node::MemberReference(reference) = &*invocation.arguments[0] else {
        panic!("メソッド参照になるはず");
    };
    assert_eq!(reference.name, "println");
}

#[test]
fn test_new_expressions() {
    let expr = parse_expr("new Foo(1)");
    let Node::NewClass(new_class) = &*expr else {
        panic!("クラス生成になるはず");
    };
    assert_eq!(new_class.arguments.len(), 1);

    let expr = parse_expr("new int[3]");
    let Node::NewArray(new_array) = &*expr else {
        panic!("配列生成になるはず");
    };
    assert_eq!(new_array.dimensions.len(), 1);
    assert!(new_array.initializers.is_none());

    let expr = parse_expr("new int[]{1, 2}");
    let Node::NewArray(new_array) = &*expr else {
        panic!("配列生成になるはず");
    };
    assert_eq!(new_array.dimensions.len(), 0);
    assert_eq!(new_array.initializers.as_ref().unwrap().len(), 2);
}

#[test]
fn test_class_declaration() {
    let class = parser::parse_class(
        "class Point { int x; Point(int x) { this.x = x; } int getX() { return x; } }",
    )
    .expect("クラスの解析に成功するはず");

    let Node::Class(class) = &*class else {
        panic!("クラス宣言になるはず");
    };
    assert_eq!(class.name, "Point");
    assert_eq!(class.members.len(), 3);

    assert_eq!(class.members[0].kind(), NodeKind::Variable);

    let Node::Method(constructor) = &*class.members[1] else {
        panic!("コンストラクタになるはず");
    };
    assert!(constructor.return_type.is_none());
    assert_eq!(constructor.parameters.len(), 1);

    let Node::Method(getter) = &*class.members[2] else {
        panic!("メソッドになるはず");
    };
    assert_eq!(getter.name, "getX");
    assert!(getter.return_type.is_some());
}

#[test]
fn test_annotated_field() {
    let class = parser::parse_class("class A { @Deprecated static final int N = 1; }")
        .expect("クラスの解析に成功するはず");

    let Node::Class(class) = &*class else {
        panic!("クラス宣言になるはず");
    };
    let Node::Variable(field) = &*class.members[0] else {
        panic!("フィールドになるはず");
    };
    let Node::Modifiers(modifiers) = &**field.modifiers.as_ref().unwrap() else {
        panic!("修飾子になるはず");
    };
    assert_eq!(modifiers.annotations.len(), 1);
    assert_eq!(modifiers.flags.len(), 2);
}

#[test]
fn test_statement_list() {
    let statements =
        parser::parse_statements("a.f(); a.g();").expect("文リストの解析に成功するはず");
    assert_eq!(statements.len(), 2);
    assert!(statements
        .iter()
        .all(|s| s.kind() == NodeKind::ExpressionStatement));
}

#[test]
fn test_parse_errors() {
    assert!(parser::parse_statement("int = 5;").is_err());
    assert!(parser::parse_expression("a +").is_err());
    assert!(parser::parse_statement("if (x) {").is_err());
}
