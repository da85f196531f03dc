//! 構造的ツリーマッチング
//!
//! パターン木（自由変数・複文ワイルドカード入り）をスコープ木の
//! 全部分木と照合し、マッチ位置ごとの変数束縛を返す。複文パターンは
//! 先頭文のマッチ位置から文リストを連鎖照合して重複範囲を見つける。

mod duplicates;
mod engine;
mod state;

pub use state::{BindState, VariableAssignments};

use indexmap::IndexMap;
use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicBool, Ordering};

use crate::error::MatchError;
use crate::oracle::{ElementId, SymbolOracle, TypeId};
use crate::tree::{Node, NodePath, NodeRef};

/// 検索の振る舞いを決めるフラグ集合
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SearchOptions {
    /// パターン中の`$`名を自由変数として扱う
    pub allow_variables_in_pattern: bool,
    /// リマップ対象の変数を任意の式にリマップできるようにする
    pub allow_remap_variable_to_expression: bool,
    /// スコープのルートだけでなく全部分木を検索する
    pub allow_go_deeper: bool,
    /// オラクルを使わず純粋に構文的に照合する
    pub no_element_verify: bool,
    /// 合成した`this`レシーバの束縛をマッチ後も保持する
    pub keep_synthetic_this: bool,
}

/// 協調的キャンセルの問い合わせ口。
/// 各比較ステップの先頭でポーリングされる。
pub trait Cancel {
    fn is_cancelled(&self) -> bool;
}

/// キャンセルしない
#[derive(Debug, Default, Clone, Copy)]
pub struct NeverCancel;

impl Cancel for NeverCancel {
    fn is_cancelled(&self) -> bool {
        false
    }
}

impl Cancel for AtomicBool {
    fn is_cancelled(&self) -> bool {
        self.load(Ordering::Relaxed)
    }
}

/// クロージャをキャンセル述語として使うためのラッパ
pub struct CancelFn<F>(pub F);

impl<F: Fn() -> bool> Cancel for CancelFn<F> {
    fn is_cancelled(&self) -> bool {
        (self.0)()
    }
}

/// 自由変数を示す接頭辞
pub const VARIABLE_PREFIX: char = '$';

/// 名前が複文ワイルドカード（末尾も`$`）かどうか
pub fn is_multistatement_wildcard(name: &str) -> bool {
    name.ends_with(VARIABLE_PREFIX)
}

/// ワイルドカードとして扱えるノードからその名前を取り出す。
///
/// 識別子だけの式文は`$`接頭辞に関係なく名前を返す（呼び出し側が
/// 接頭辞を確認する）。裸の識別子と境界なし型パラメータは`$`付きの
/// 場合のみ返す。
pub fn wildcard_tree_name(node: &Node) -> Option<&str> {
    if let Node::ExpressionStatement(stmt) = node {
        if let Node::Identifier(ident) = &*stmt.expression {
            return Some(&ident.name);
        }
    }

    if let Node::Identifier(ident) = node {
        if ident.name.starts_with(VARIABLE_PREFIX) {
            return Some(&ident.name);
        }
    }

    if let Node::TypeParameter(tp) = node {
        if tp.bounds.is_empty() && tp.name.starts_with(VARIABLE_PREFIX) {
            return Some(&tp.name);
        }
    }

    None
}

/// ノードが複文ワイルドカードかどうか
pub fn is_multistatement_wildcard_tree(node: &Node) -> bool {
    wildcard_tree_name(node).is_some_and(is_multistatement_wildcard)
}

/// 識別子・メンバ選択だけの連鎖かどうか
pub fn is_pure_member_select(node: &Node, allow_variables: bool) -> bool {
    match node {
        Node::Identifier(ident) => allow_variables || !ident.name.starts_with(VARIABLE_PREFIX),
        Node::MemberSelect(select) => is_pure_member_select(&select.expression, allow_variables),
        _ => false,
    }
}

/// 文リストに複文ワイルドカードが含まれるか
pub fn contains_multistatement_trees(statements: &[NodeRef]) -> bool {
    statements.iter().any(|s| is_multistatement_wildcard_tree(s))
}

/// 検索結果。マッチ位置 → 変数束縛の挿入順マップと、検索が
/// 途中でキャンセルされたかどうか。
#[derive(Debug, Default, Clone)]
pub struct Matches {
    pub occurrences: IndexMap<NodePath, VariableAssignments>,
    pub cancelled: bool,
}

impl Matches {
    pub fn is_empty(&self) -> bool {
        self.occurrences.is_empty()
    }

    pub fn len(&self) -> usize {
        self.occurrences.len()
    }

    pub fn iter(&self) -> indexmap::map::Iter<'_, NodePath, VariableAssignments> {
        self.occurrences.iter()
    }

    pub fn get(&self, path: &NodePath) -> Option<&VariableAssignments> {
        self.occurrences.get(path)
    }
}

static NEVER: NeverCancel = NeverCancel;

/// 1回のパターン検索の設定。
///
/// マッチャー本体は呼び出しごとに内部で新しく組み立てられ、
/// `Search`自体は再利用できる。
pub struct Search<'a> {
    oracle: &'a dyn SymbolOracle,
    options: SearchOptions,
    cancel: &'a dyn Cancel,
    preinitialized: Option<BindState>,
    remap_candidates: Option<HashSet<ElementId>>,
    type_constraints: HashMap<String, TypeId>,
}

impl<'a> Search<'a> {
    pub fn new(oracle: &'a dyn SymbolOracle) -> Self {
        Self {
            oracle,
            options: SearchOptions::default(),
            cancel: &NEVER,
            preinitialized: None,
            remap_candidates: None,
            type_constraints: HashMap::new(),
        }
    }

    pub fn options(mut self, options: SearchOptions) -> Self {
        self.options = options;
        self
    }

    pub fn cancel(mut self, cancel: &'a dyn Cancel) -> Self {
        self.cancel = cancel;
        self
    }

    /// 複文連鎖の続きとして使う初期束縛
    pub fn preinitialized(mut self, state: BindState) -> Self {
        self.preinitialized = Some(state);
        self
    }

    /// リマップを許すシンボル集合。設定するとリマップモードになる。
    pub fn remap_candidates(mut self, candidates: HashSet<ElementId>) -> Self {
        self.remap_candidates = Some(candidates);
        self
    }

    /// 自由変数に型制約を課す。候補の型が代入可能でなければ束縛しない。
    pub fn constrain_type(mut self, variable: impl Into<String>, ty: TypeId) -> Self {
        self.type_constraints.insert(variable.into(), ty);
        self
    }

    /// パターン（文の並び、または単一の部分木）をスコープと照合する。
    pub fn find(&self, patterns: &[NodePath], scope: &NodePath) -> Result<Matches, MatchError> {
        duplicates::compute_duplicates(
            patterns,
            scope,
            self.oracle,
            self.cancel,
            self.options,
            self.preinitialized.as_ref(),
            self.remap_candidates.as_ref(),
            &self.type_constraints,
        )
    }

    /// 単一パターンの照合
    pub fn find_one(&self, pattern: &NodePath, scope: &NodePath) -> Result<Matches, MatchError> {
        self.find(std::slice::from_ref(pattern), scope)
    }
}
