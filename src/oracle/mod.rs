//! シンボル・型オラクル
//!
//! マッチャーが意味的な同値判定に使う読み取り専用の問い合わせ口。
//! 実際の解決器（型チェッカー等）は外部の協調者であり、ここでは
//! トレイト境界と、テーブル駆動の簡易実装だけを提供する。

use std::collections::HashMap;

use crate::tree::{Node, NodePath};

/// 解決済みシンボルの識別子
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ElementId(pub u32);

/// 解決済み型の識別子
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TypeId(pub u32);

/// シンボルの種別
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ElementKind {
    Class,
    Interface,
    Enum,
    Field,
    Method,
    Variable,
    Parameter,
}

impl ElementKind {
    /// クラス・インタフェース・列挙のいずれか
    pub fn is_class_like(self) -> bool {
        matches!(self, ElementKind::Class | ElementKind::Interface | ElementKind::Enum)
    }
}

/// マッチャーが消費する意味解決の問い合わせ群。
///
/// すべて読み取り専用。解決できない場合は `None` を返し、マッチャー側は
/// 「確定できない」として扱う（ハードな失敗にはしない）。
pub trait SymbolOracle {
    /// ノードが指す宣言済みシンボル
    fn element_of(&self, path: &NodePath) -> Option<ElementId>;

    /// ノードの式としての型
    fn type_of(&self, path: &NodePath) -> Option<TypeId>;

    /// シンボルの種別
    fn element_kind(&self, element: ElementId) -> ElementKind;

    /// シンボルの単純名
    fn element_name(&self, element: ElementId) -> Option<String>;

    /// static宣言かどうか
    fn is_static(&self, element: ElementId) -> bool;

    /// 囲んでいる宣言（メソッドのオーナー型など）
    fn enclosing_element(&self, element: ElementId) -> Option<ElementId>;

    /// シンボルの宣言型
    fn type_of_element(&self, element: ElementId) -> Option<TypeId>;

    /// エラー型（解決失敗の型）かどうか
    fn is_error_type(&self, ty: TypeId) -> bool;

    /// `real` を `designed` に代入できるか
    fn is_assignable(&self, real: TypeId, designed: TypeId) -> bool;

    /// 同一型か
    fn is_same_type(&self, a: TypeId, b: TypeId) -> bool;

    /// `a` が `owner` において `b` をオーバーライドするか
    fn overrides(&self, a: ElementId, b: ElementId, owner: ElementId) -> bool;
}

/// 何も解決しないオラクル。純粋に構文的なマッチで使う。
#[derive(Debug, Default, Clone, Copy)]
pub struct EmptyOracle;

impl SymbolOracle for EmptyOracle {
    fn element_of(&self, _path: &NodePath) -> Option<ElementId> {
        None
    }

    fn type_of(&self, _path: &NodePath) -> Option<TypeId> {
        None
    }

    fn element_kind(&self, _element: ElementId) -> ElementKind {
        ElementKind::Variable
    }

    fn element_name(&self, _element: ElementId) -> Option<String> {
        None
    }

    fn is_static(&self, _element: ElementId) -> bool {
        false
    }

    fn enclosing_element(&self, _element: ElementId) -> Option<ElementId> {
        None
    }

    fn type_of_element(&self, _element: ElementId) -> Option<TypeId> {
        None
    }

    fn is_error_type(&self, _ty: TypeId) -> bool {
        false
    }

    fn is_assignable(&self, a: TypeId, b: TypeId) -> bool {
        a == b
    }

    fn is_same_type(&self, a: TypeId, b: TypeId) -> bool {
        a == b
    }

    fn overrides(&self, _a: ElementId, _b: ElementId, _owner: ElementId) -> bool {
        false
    }
}

#[derive(Debug, Clone)]
struct ElementInfo {
    name: String,
    kind: ElementKind,
    is_static: bool,
    ty: Option<TypeId>,
    enclosing: Option<ElementId>,
}

#[derive(Debug, Clone)]
struct TypeInfo {
    name: String,
    is_error: bool,
}

/// テーブル駆動の簡易オラクル。
///
/// 識別子・メンバ選択をその名前で登録済みシンボルに解決する。
/// テストおよび小規模な利用者向けで、スコープ規則は持たない。
#[derive(Debug, Default, Clone)]
pub struct SimpleOracle {
    elements: Vec<ElementInfo>,
    types: Vec<TypeInfo>,
    bindings: HashMap<String, ElementId>,
    assignable: Vec<(TypeId, TypeId)>,
    overrides: Vec<(ElementId, ElementId)>,
}

impl SimpleOracle {
    pub fn new() -> Self {
        Self::default()
    }

    /// 型を登録
    pub fn add_type(&mut self, name: impl Into<String>) -> TypeId {
        let id = TypeId(self.types.len() as u32);
        self.types.push(TypeInfo {
            name: name.into(),
            is_error: false,
        });
        id
    }

    /// エラー型を登録
    pub fn add_error_type(&mut self) -> TypeId {
        let id = TypeId(self.types.len() as u32);
        self.types.push(TypeInfo {
            name: "<error>".to_string(),
            is_error: true,
        });
        id
    }

    /// シンボルを登録
    pub fn add_element(
        &mut self,
        name: impl Into<String>,
        kind: ElementKind,
        ty: Option<TypeId>,
    ) -> ElementId {
        let id = ElementId(self.elements.len() as u32);
        self.elements.push(ElementInfo {
            name: name.into(),
            kind,
            is_static: false,
            ty,
            enclosing: None,
        });
        id
    }

    /// シンボルをstaticにする
    pub fn set_static(&mut self, element: ElementId) {
        self.elements[element.0 as usize].is_static = true;
    }

    /// 囲み宣言を設定
    pub fn set_enclosing(&mut self, element: ElementId, enclosing: ElementId) {
        self.elements[element.0 as usize].enclosing = Some(enclosing);
    }

    /// 名前をシンボルに束縛する。以後、その名前の識別子・メンバ選択は
    /// このシンボルに解決される。
    pub fn bind_name(&mut self, name: impl Into<String>, element: ElementId) {
        self.bindings.insert(name.into(), element);
    }

    /// 代入可能関係を追加（`real` → `designed`）
    pub fn set_assignable(&mut self, real: TypeId, designed: TypeId) {
        self.assignable.push((real, designed));
    }

    /// オーバーライド関係を追加（`a` が `b` をオーバーライド）
    pub fn set_override(&mut self, a: ElementId, b: ElementId) {
        self.overrides.push((a, b));
    }

    /// 型名を引く（診断用）
    pub fn type_name(&self, ty: TypeId) -> &str {
        &self.types[ty.0 as usize].name
    }

    fn resolvable_name(node: &Node) -> Option<&str> {
        match node {
            Node::Identifier(ident) => Some(&ident.name),
            Node::MemberSelect(select) => Some(&select.identifier),
            Node::Variable(var) => Some(&var.name),
            _ => None,
        }
    }
}

impl SymbolOracle for SimpleOracle {
    fn element_of(&self, path: &NodePath) -> Option<ElementId> {
        let name = Self::resolvable_name(path.leaf())?;
        self.bindings.get(name).copied()
    }

    fn type_of(&self, path: &NodePath) -> Option<TypeId> {
        let element = self.element_of(path)?;
        self.type_of_element(element)
    }

    fn element_kind(&self, element: ElementId) -> ElementKind {
        self.elements[element.0 as usize].kind
    }

    fn element_name(&self, element: ElementId) -> Option<String> {
        Some(self.elements[element.0 as usize].name.clone())
    }

    fn is_static(&self, element: ElementId) -> bool {
        self.elements[element.0 as usize].is_static
    }

    fn enclosing_element(&self, element: ElementId) -> Option<ElementId> {
        self.elements[element.0 as usize].enclosing
    }

    fn type_of_element(&self, element: ElementId) -> Option<TypeId> {
        self.elements[element.0 as usize].ty
    }

    fn is_error_type(&self, ty: TypeId) -> bool {
        self.types[ty.0 as usize].is_error
    }

    fn is_assignable(&self, real: TypeId, designed: TypeId) -> bool {
        real == designed || self.assignable.contains(&(real, designed))
    }

    fn is_same_type(&self, a: TypeId, b: TypeId) -> bool {
        a == b
    }

    fn overrides(&self, a: ElementId, b: ElementId, _owner: ElementId) -> bool {
        self.overrides.contains(&(a, b))
    }
}
