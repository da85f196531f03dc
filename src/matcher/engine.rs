//! マッチャーエンジン本体
//!
//! パターン木と候補木を同期した再帰下降で照合する。自由変数の
//! 束縛・再束縛検証、複文ワイルドカードの組合せ探索、シンボル
//! 照合の4値判定、go-deeperモードの候補ルート探索を担う。
//!
//! 投機的な分岐（複文ワイルドカードの捕捉長探索、注釈の順不同
//! 照合、合成thisの試行）では必ず束縛状態を複製してから試し、
//! 失敗した枝は複製前の状態に巻き戻す。

use indexmap::IndexMap;
use std::collections::{HashMap, HashSet};
use std::rc::Rc;

use crate::oracle::{ElementId, ElementKind, SymbolOracle, TypeId};
use crate::tree::{self, Node, NodeKind, NodePath, NodeRef, Span};

use super::state::{BindState, VariableAssignments};
use super::{
    contains_multistatement_trees, is_multistatement_wildcard_tree, is_pure_member_select,
    wildcard_tree_name, Cancel, SearchOptions, VARIABLE_PREFIX,
};

/// `class`というフィールド名（リテラルクラス参照の慣用句）
const CLASS_FIELD: &str = "class";

/// 再帰を即座に打ち切る理由
#[derive(Debug, Clone)]
pub(crate) enum Stop {
    Cancelled,
    UnsupportedPattern(String),
}

/// シンボル照合の4値判定
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum VerifyResult {
    /// 一致。より深い構造照合も必要（非staticメンバ等）
    MatchCheckDeeper,
    /// 一致
    Match,
    /// この照合では確定できない。他の候補の探索は続行してよい
    NoMatchContinue,
    /// 不一致
    NoMatch,
}

/// 1回のパターン検索を駆動する再帰比較器。
/// 呼び出しごとに新しく作り、終わったら捨てる。
pub(crate) struct TreeMatcher<'a> {
    searching_for: NodePath,
    oracle: &'a dyn SymbolOracle,
    cancel: &'a dyn Cancel,
    options: SearchOptions,
    pub(crate) allow_go_deeper: bool,
    pub(crate) variables_with_allowed_remap: HashSet<ElementId>,
    pub(crate) allow_variables_remap: bool,
    pub(crate) nocheck_on_allow_variables_remap: bool,
    pub(crate) bind_state: BindState,
    pub(crate) preinitialize_state: BindState,
    type_constraints: &'a HashMap<String, TypeId>,
    /// 現在訪問中のノードの親パス（訪問中はノード自身を含むパス）
    current: Option<NodePath>,
    pub(crate) occurrences: IndexMap<NodePath, VariableAssignments>,
    pub(crate) stop: Option<Stop>,
}

impl<'a> TreeMatcher<'a> {
    pub(crate) fn new(
        searching_for: NodePath,
        oracle: &'a dyn SymbolOracle,
        cancel: &'a dyn Cancel,
        options: SearchOptions,
        type_constraints: &'a HashMap<String, TypeId>,
    ) -> Self {
        Self {
            searching_for,
            oracle,
            cancel,
            options,
            allow_go_deeper: true,
            variables_with_allowed_remap: HashSet::new(),
            allow_variables_remap: false,
            nocheck_on_allow_variables_remap: false,
            bind_state: BindState::empty(),
            preinitialize_state: BindState::empty(),
            type_constraints,
            current: None,
            occurrences: IndexMap::new(),
            stop: None,
        }
    }

    /// パスで指すノードをパターンと照合する。走査カーソルを
    /// そのパスの親に合わせてから本体に入る。
    pub(crate) fn scan_path(&mut self, path: &NodePath, pattern: Option<&NodePath>) -> bool {
        let saved = std::mem::replace(&mut self.current, path.parent().cloned());
        let result = self.scan(Some(path.leaf()), pattern);
        self.current = saved;
        result
    }

    fn current_child(&self, node: &NodeRef) -> NodePath {
        match &self.current {
            Some(current) => NodePath::child(current, node.clone()),
            None => NodePath::root(node.clone()),
        }
    }

    /// 照合の中心。パターン側の自由変数・ワイルドカード・リマップを
    /// 処理したうえで、種類が合えば構造比較へ、go-deeperモードなら
    /// 子の候補探索へ進む。
    fn scan(&mut self, node: Option<&NodeRef>, pattern: Option<&NodePath>) -> bool {
        if self.stop.is_some() {
            return false;
        }
        if self.cancel.is_cancelled() {
            self.stop = Some(Stop::Cancelled);
            return false;
        }

        let Some(node) = node else {
            return match pattern {
                None => true,
                // 残りゼロ文にマッチする複文ワイルドカード
                Some(p) => is_multistatement_wildcard_tree(p.leaf()),
            };
        };
        let node = node.clone();
        let mut pattern: Option<NodePath> = pattern.cloned();

        let mut tree_name: Option<String> = None;
        let mut degraded: Option<(NodePath, String)> = None;

        if let Some(p) = pattern.as_ref() {
            match &**p.leaf() {
                Node::Identifier(ident) => tree_name = Some(ident.name.clone()),
                Node::TypeParameter(tp) if tp.bounds.is_empty() => {
                    tree_name = Some(tp.name.clone());
                }
                // 唯一の型引数が複文ワイルドカードのパラメータ化型は
                // ベース型だけの照合に退化する
                Node::ParameterizedType(ptt)
                    if matches!(node.kind(), NodeKind::Identifier | NodeKind::MemberSelect)
                        && ptt.type_arguments.len() == 1
                        && is_multistatement_wildcard_tree(&ptt.type_arguments[0]) =>
                {
                    let name = wildcard_tree_name(&ptt.type_arguments[0])
                        .map(str::to_string)
                        .unwrap_or_default();
                    degraded = Some((NodePath::child(p, ptt.ty.clone()), name));
                }
                _ => {}
            }
        }

        if let Some((base, wildcard)) = degraded {
            self.bind_state.multi_variables.insert(wildcard, Vec::new());
            pattern = Some(base);
        }

        if let Some(name) = tree_name.as_deref() {
            if name.starts_with(VARIABLE_PREFIX) && self.options.allow_variables_in_pattern {
                if let Some(bound_name) = self.bind_state.variables_to_names.get(name) {
                    return match &*node {
                        Node::Identifier(ident) => ident.name == *bound_name,
                        _ => false,
                    };
                }

                let current_path = self.current_child(&node);
                if !self.type_matches(&current_path, name) {
                    return false;
                }

                match self.bind_state.variables.get(name).cloned() {
                    None => {
                        // 初出の自由変数は無条件に束縛する
                        self.bind_state.variables.insert(name.to_string(), current_path);
                        return true;
                    }
                    Some(original) => {
                        // 再出現: 以前の束縛と再帰的に照合し、成功したら
                        // 連番付きの別名を追加で記録する
                        let saved_option = self.options.allow_variables_in_pattern;
                        self.options.allow_variables_in_pattern = false;
                        let success = self.scan(Some(&node), Some(&original));
                        self.options.allow_variables_in_pattern = saved_option;

                        if success {
                            self.bind_state.match_count += 1;
                            let alias = format!("{}${}", name, self.bind_state.match_count);
                            self.bind_state.variables.insert(alias, current_path);
                        }
                        return success;
                    }
                }
            }

            if let Some(p) = pattern.as_ref() {
                if let Some(remappable) = self.oracle.element_of(p) {
                    if self.variables_with_allowed_remap.contains(&remappable)
                        && (self.options.allow_remap_variable_to_expression
                            || node.kind() == NodeKind::Identifier)
                    {
                        return self.scan_remappable(&node, remappable);
                    }
                }
            }
        }

        // パターン側が文の位置の`$`名: 文1つを丸ごと束縛する
        if let Some(p) = pattern.as_ref() {
            let wildcard = wildcard_tree_name(p.leaf()).map(str::to_string);
            if let Some(ident) = wildcard {
                if ident.starts_with(VARIABLE_PREFIX) && node.is_statement() {
                    match self.bind_state.variables.get(&ident).cloned() {
                        None => {
                            let current_path = self.current_child(&node);
                            self.bind_state.variables.insert(ident, current_path);
                            return true;
                        }
                        Some(original) => {
                            let success = self.scan(Some(&node), Some(&original));
                            if success {
                                self.bind_state.match_count += 1;
                                let alias = format!("{}${}", ident, self.bind_state.match_count);
                                let context = self
                                    .current
                                    .clone()
                                    .unwrap_or_else(|| self.current_child(&node));
                                self.bind_state.variables.insert(alias, context);
                            }
                            return success;
                        }
                    }
                }
            }
        }

        if let Some(p) = pattern.clone() {
            if same_kind(&node, p.leaf()) {
                let result = self.super_scan(&node, Some(&p));

                if result {
                    if p == self.searching_for
                        && !Rc::ptr_eq(&node, self.searching_for.leaf())
                        && self.allow_go_deeper
                    {
                        self.record_occurrence(&node);
                    }

                    return true;
                }
            }
        }

        if !self.allow_go_deeper {
            return false;
        }

        let pattern_is_root = pattern
            .as_ref()
            .is_some_and(|p| Rc::ptr_eq(p.leaf(), self.searching_for.leaf()));

        if pattern_is_root || !same_kind(&node, self.searching_for.leaf()) {
            if self.bind_state.multi_variables.is_empty()
                || self.bind_state.variables.is_empty()
                || self.bind_state.variables_to_names.is_empty()
                || self.bind_state.remap_to_element.is_empty()
                || self.bind_state.remap_to_trees.is_empty()
            {
                self.bind_state = BindState::start_from(&self.preinitialize_state);
            }
            self.super_scan(&node, None);
            false
        } else {
            // このノード自体が新しい候補ルートかもしれない
            self.allow_go_deeper = false;
            let searching = self.searching_for.clone();
            let result = self.super_scan(&node, Some(&searching));
            self.allow_go_deeper = true;

            if result {
                if !Rc::ptr_eq(&node, self.searching_for.leaf()) {
                    self.record_occurrence(&node);
                }
                return true;
            }

            self.super_scan(&node, None);
            false
        }
    }

    fn record_occurrence(&mut self, node: &NodeRef) {
        let path = self.current_child(node);
        log::trace!("マッチ: {}", node);
        self.occurrences
            .insert(path, VariableAssignments::snapshot(&self.bind_state));
        self.bind_state = BindState::start_from(&self.preinitialize_state);
    }

    /// リマップ対象シンボルへの照合。既存のリマップ先があれば
    /// それと照合し、なければ型互換を確認して新規に記録する。
    fn scan_remappable(&mut self, node: &NodeRef, remappable: ElementId) -> bool {
        if let Some(existing) = self.bind_state.remap_to_trees.get(&remappable).cloned() {
            let saved = self.allow_go_deeper;
            self.allow_go_deeper = false;
            let result = self.super_scan(node, Some(&existing));
            self.allow_go_deeper = saved;
            return result;
        }

        let current_path = self.current_child(node);
        let current_type = self.oracle.type_of(&current_path);
        let pattern_type = self.oracle.type_of_element(remappable);

        if let (Some(current_type), Some(pattern_type)) = (current_type, pattern_type) {
            if self.nocheck_on_allow_variables_remap
                || self.is_same_type_for_variable_remap(current_type, pattern_type)
            {
                self.bind_state.remap_to_trees.insert(remappable, current_path);
                return true;
            }
        }

        false
    }

    /// パターン側の特殊形（`$`識別子の再入、ブロック退化）を
    /// さばいてから種類別の構造比較に入る。
    fn super_scan(&mut self, node: &NodeRef, pattern: Option<&NodePath>) -> bool {
        let Some(p) = pattern else {
            return self.do_super_scan(node, None);
        };

        if let Node::Identifier(ident) = &**p.leaf() {
            if ident.name.starts_with(VARIABLE_PREFIX) && self.options.allow_variables_in_pattern {
                return self.scan(Some(node), Some(p));
            }
        }

        let mut p = p.clone();

        if p.leaf().kind() == NodeKind::Block && node.kind() != NodeKind::Block {
            // 単文ブロックは文と等価。ワイルドカードを含む1〜3文の
            // ブロックだけが退化ルールを持つ
            let statements = match &**p.leaf() {
                Node::Block(block) => block.statements.clone(),
                _ => unreachable!("kind checked above"),
            };

            match statements.len() {
                1 => {
                    if is_multistatement_wildcard_tree(&statements[0]) {
                        let path = self.current_child(node);
                        return self.validate_multi_variable(&statements[0], vec![path]);
                    }

                    p = NodePath::child(&p, statements[0].clone());
                }
                2 => {
                    if is_multistatement_wildcard_tree(&statements[0]) {
                        if !self.validate_multi_variable(&statements[0], Vec::new()) {
                            return false;
                        }
                        p = NodePath::child(&p, statements[1].clone());
                    } else if is_multistatement_wildcard_tree(&statements[1]) {
                        if !self.validate_multi_variable(&statements[1], Vec::new()) {
                            return false;
                        }
                        p = NodePath::child(&p, statements[0].clone());
                    } else {
                        self.stop = Some(Stop::UnsupportedPattern(
                            "ワイルドカードを含まない2文ブロックを単一の文と照合できません"
                                .to_string(),
                        ));
                        return false;
                    }
                }
                3 => {
                    if is_multistatement_wildcard_tree(&statements[0])
                        && is_multistatement_wildcard_tree(&statements[2])
                    {
                        if !self.validate_multi_variable(&statements[0], Vec::new()) {
                            return false;
                        }
                        if !self.validate_multi_variable(&statements[2], Vec::new()) {
                            return false;
                        }
                        p = NodePath::child(&p, statements[1].clone());
                    } else {
                        self.stop = Some(Stop::UnsupportedPattern(
                            "両端がワイルドカードでない3文ブロックを単一の文と照合できません"
                                .to_string(),
                        ));
                        return false;
                    }
                }
                _ => {}
            }
        }

        if !same_kind(node, p.leaf()) {
            return false;
        }

        self.do_super_scan(node, Some(&p))
    }

    fn do_super_scan(&mut self, node: &NodeRef, pattern: Option<&NodePath>) -> bool {
        let pushed = self.current_child(node);
        let prev = std::mem::replace(&mut self.current, Some(pushed));
        let result = self.visit(node, pattern);
        self.current = prev;
        result
    }

    /// 子ノード同士の照合（どちらかが欠けている場合の規約込み）
    fn scan_child(
        &mut self,
        node: Option<&NodeRef>,
        pattern: Option<&NodeRef>,
        origin: Option<&NodePath>,
    ) -> bool {
        match (node, pattern) {
            (None, None) => true,
            (Some(_), None) => false,
            (node, Some(p)) => {
                let path = match origin {
                    Some(origin) => NodePath::child(origin, p.clone()),
                    None => NodePath::root(p.clone()),
                };
                self.scan(node, Some(&path))
            }
        }
    }

    /// 子リスト同士の照合。パターン側に複文ワイルドカードがあれば
    /// 組合せ探索に切り替える。
    fn check_lists(
        &mut self,
        one: Option<&[NodeRef]>,
        other: Option<&[NodeRef]>,
        origin: Option<&NodePath>,
    ) -> bool {
        let (Some(one), Some(other)) = (one, other) else {
            return one.is_none() && other.is_none();
        };

        if contains_multistatement_trees(other) {
            return self.check_lists_with_multistatement(one, 0, other, 0, origin);
        }

        if one.len() != other.len() {
            return false;
        }

        for (node, pattern) in one.iter().zip(other) {
            if !self.scan_child(Some(node), Some(pattern), origin) {
                return false;
            }
        }

        true
    }

    /// 複文ワイルドカードを含むリスト照合。ワイルドカードの捕捉長を
    /// 短い方から試し、最初に成功した組合せを採用する。各試行の前に
    /// 束縛状態を複製し、失敗したら巻き戻す。
    fn check_lists_with_multistatement(
        &mut self,
        real: &[NodeRef],
        mut real_offset: usize,
        pattern: &[NodeRef],
        mut pattern_offset: usize,
        origin: Option<&NodePath>,
    ) -> bool {
        while real_offset < real.len()
            && pattern_offset < pattern.len()
            && !is_multistatement_wildcard_tree(&pattern[pattern_offset])
        {
            if !self.scan_child(Some(&real[real_offset]), Some(&pattern[pattern_offset]), origin) {
                return false;
            }

            real_offset += 1;
            pattern_offset += 1;
        }

        if real_offset == real.len() && pattern_offset == pattern.len() {
            return true;
        }

        if pattern_offset >= pattern.len() {
            return false;
        }

        if is_multistatement_wildcard_tree(&pattern[pattern_offset]) {
            if pattern_offset + 1 == pattern.len() {
                let paths = real[real_offset..]
                    .iter()
                    .map(|t| self.current_child(t))
                    .collect();

                return self.validate_multi_variable(&pattern[pattern_offset], paths);
            }

            let mut captured: Vec<NodePath> = Vec::new();

            while real_offset < real.len() {
                if self.stop.is_some() {
                    return false;
                }

                let backup = self.bind_state.clone();

                if self.check_lists_with_multistatement(
                    real,
                    real_offset,
                    pattern,
                    pattern_offset + 1,
                    origin,
                ) {
                    return self.validate_multi_variable(&pattern[pattern_offset], captured);
                }

                self.bind_state = backup;

                captured.push(self.current_child(&real[real_offset]));
                real_offset += 1;
            }

            return false;
        }

        false
    }

    /// 複文ワイルドカードへの捕捉列の束縛。初回の束縛が正であり、
    /// 再出現時は長さが同じで要素ごとに照合できなければならない。
    fn validate_multi_variable(&mut self, wildcard: &NodeRef, paths: Vec<NodePath>) -> bool {
        let name = match wildcard_tree_name(wildcard) {
            Some(name) => name.to_string(),
            None => unreachable!("呼び出し側でワイルドカードであることを確認済み"),
        };

        match self.bind_state.multi_variables.get(&name).cloned() {
            None => {
                self.bind_state.multi_variables.insert(name, paths);
                true
            }
            Some(original) => {
                if paths.len() != original.len() {
                    return false;
                }

                for (current, original) in paths.iter().zip(&original) {
                    if !self.scan_path(current, Some(original)) {
                        return false;
                    }
                }

                self.bind_state.match_count += 1;
                let alias = format!("{}${}", name, self.bind_state.match_count);
                if let Some(context) = self.current.clone() {
                    self.bind_state.variables.insert(alias, context);
                }

                true
            }
        }
    }

    /// 自由変数の型制約。制約がなければ常に束縛可、エラー型の制約や
    /// 型を解決できない候補は束縛不可。
    fn type_matches(&self, current_path: &NodePath, placeholder: &str) -> bool {
        match self.type_constraints.get(placeholder).copied() {
            Some(designed) if !self.oracle.is_error_type(designed) => {
                let Some(real) = self.oracle.type_of(current_path) else {
                    return false;
                };
                if self.oracle.is_error_type(real) {
                    return false;
                }
                self.oracle.is_assignable(real, designed)
            }
            Some(_) => false,
            None => true,
        }
    }

    fn is_same_type_for_variable_remap(&self, node_type: TypeId, pattern_type: TypeId) -> bool {
        // TODO: リマップはサブタイプも許容できるかもしれない
        self.oracle.is_same_type(node_type, pattern_type)
    }

    // ==================== 種類別の構造比較 ====================

    fn visit(&mut self, node: &NodeRef, pattern: Option<&NodePath>) -> bool {
        let Some(p) = pattern else {
            // 検索モード: 各子を独立した候補として走査する
            for child in node.children() {
                if self.stop.is_some() {
                    return false;
                }
                self.scan(Some(&child), None);
            }
            return false;
        };

        match &**node {
            Node::Identifier(_) => self.visit_identifier(node, p),
            Node::MemberSelect(_) => self.visit_member_select(node, p),
            Node::Literal(n) => {
                let Node::Literal(t) = &**p.leaf() else {
                    return false;
                };
                n.value == t.value
            }
            Node::Binary(n) => {
                let Node::Binary(t) = &**p.leaf() else {
                    return false;
                };
                if n.op != t.op {
                    return false;
                }
                self.scan_child(Some(&n.left), Some(&t.left), Some(p))
                    && self.scan_child(Some(&n.right), Some(&t.right), Some(p))
            }
            Node::Unary(n) => {
                let Node::Unary(t) = &**p.leaf() else {
                    return false;
                };
                n.op == t.op && self.scan_child(Some(&n.operand), Some(&t.operand), Some(p))
            }
            Node::Assignment(n) => {
                let Node::Assignment(t) = &**p.leaf() else {
                    return false;
                };
                self.scan_child(Some(&n.expression), Some(&t.expression), Some(p))
                    && self.scan_child(Some(&n.variable), Some(&t.variable), Some(p))
            }
            Node::CompoundAssignment(n) => {
                let Node::CompoundAssignment(t) = &**p.leaf() else {
                    return false;
                };
                if n.op != t.op {
                    return false;
                }
                self.scan_child(Some(&n.expression), Some(&t.expression), Some(p))
                    && self.scan_child(Some(&n.variable), Some(&t.variable), Some(p))
            }
            Node::MethodInvocation(n) => {
                let Node::MethodInvocation(t) = &**p.leaf() else {
                    return false;
                };
                self.scan_child(Some(&n.method_select), Some(&t.method_select), Some(p))
                    && self.check_lists(Some(&n.type_arguments), Some(&t.type_arguments), Some(p))
                    && self.check_lists(Some(&n.arguments), Some(&t.arguments), Some(p))
            }
            Node::NewClass(n) => {
                let Node::NewClass(t) = &**p.leaf() else {
                    return false;
                };
                self.scan_child(Some(&n.identifier), Some(&t.identifier), Some(p))
                    && self.scan_child(
                        n.enclosing_expression.as_ref(),
                        t.enclosing_expression.as_ref(),
                        Some(p),
                    )
                    && self.check_lists(Some(&n.type_arguments), Some(&t.type_arguments), Some(p))
                    && self.check_lists(Some(&n.arguments), Some(&t.arguments), Some(p))
                    && self.scan_child(n.class_body.as_ref(), t.class_body.as_ref(), Some(p))
            }
            Node::NewArray(n) => {
                let Node::NewArray(t) = &**p.leaf() else {
                    return false;
                };
                self.check_lists(Some(&n.dimensions), Some(&t.dimensions), Some(p))
                    && self.check_lists(
                        n.initializers.as_deref(),
                        t.initializers.as_deref(),
                        Some(p),
                    )
                    && self.scan_child(n.ty.as_ref(), t.ty.as_ref(), Some(p))
            }
            Node::ArrayAccess(n) => {
                let Node::ArrayAccess(t) = &**p.leaf() else {
                    return false;
                };
                self.scan_child(Some(&n.expression), Some(&t.expression), Some(p))
                    && self.scan_child(Some(&n.index), Some(&t.index), Some(p))
            }
            Node::Conditional(n) => {
                let Node::Conditional(t) = &**p.leaf() else {
                    return false;
                };
                self.scan_child(Some(&n.condition), Some(&t.condition), Some(p))
                    && self.scan_child(
                        Some(&n.false_expression),
                        Some(&t.false_expression),
                        Some(p),
                    )
                    && self.scan_child(Some(&n.true_expression), Some(&t.true_expression), Some(p))
            }
            Node::Parenthesized(n) => {
                let Node::Parenthesized(t) = &**p.leaf() else {
                    return false;
                };
                self.scan_child(Some(&n.expression), Some(&t.expression), Some(p))
            }
            Node::TypeCast(n) => {
                let Node::TypeCast(t) = &**p.leaf() else {
                    return false;
                };
                self.scan_child(Some(&n.ty), Some(&t.ty), Some(p))
                    && self.scan_child(Some(&n.expression), Some(&t.expression), Some(p))
            }
            Node::InstanceOf(n) => {
                let Node::InstanceOf(t) = &**p.leaf() else {
                    return false;
                };
                if !self.scan_child(Some(&n.expression), Some(&t.expression), Some(p)) {
                    return false;
                }
                if n.pattern.is_some() || t.pattern.is_some() {
                    return self.scan_child(n.pattern.as_ref(), t.pattern.as_ref(), Some(p));
                }
                self.scan_child(n.ty.as_ref(), t.ty.as_ref(), Some(p))
            }
            Node::BindingPattern(n) => {
                let Node::BindingPattern(t) = &**p.leaf() else {
                    return false;
                };
                self.scan_child(Some(&n.variable), Some(&t.variable), Some(p))
            }
            Node::Lambda(n) => {
                let Node::Lambda(t) = &**p.leaf() else {
                    return false;
                };
                self.check_lists(Some(&n.parameters), Some(&t.parameters), Some(p))
                    && self.scan_child(Some(&n.body), Some(&t.body), Some(p))
            }
            Node::MemberReference(n) => {
                let Node::MemberReference(t) = &**p.leaf() else {
                    return false;
                };
                if n.mode != t.mode {
                    return false;
                }
                if !self.scan_child(
                    Some(&n.qualifier_expression),
                    Some(&t.qualifier_expression),
                    Some(p),
                ) {
                    return false;
                }
                self.match_name_channel(&t.name, &n.name)
            }
            Node::Block(_) => self.visit_block(node, p),
            Node::If(n) => {
                let Node::If(t) = &**p.leaf() else {
                    return false;
                };
                self.scan_child(Some(&n.condition), Some(&t.condition), Some(p))
                    && self.scan_child(Some(&n.then_statement), Some(&t.then_statement), Some(p))
                    && self.scan_child(
                        n.else_statement.as_ref(),
                        t.else_statement.as_ref(),
                        Some(p),
                    )
            }
            Node::While(n) => {
                let Node::While(t) = &**p.leaf() else {
                    return false;
                };
                self.scan_child(Some(&n.condition), Some(&t.condition), Some(p))
                    && self.scan_child(Some(&n.statement), Some(&t.statement), Some(p))
            }
            Node::DoWhile(n) => {
                let Node::DoWhile(t) = &**p.leaf() else {
                    return false;
                };
                self.scan_child(Some(&n.statement), Some(&t.statement), Some(p))
                    && self.scan_child(Some(&n.condition), Some(&t.condition), Some(p))
            }
            Node::For(n) => {
                let Node::For(t) = &**p.leaf() else {
                    return false;
                };
                self.check_lists(Some(&n.initializer), Some(&t.initializer), Some(p))
                    && self.scan_child(n.condition.as_ref(), t.condition.as_ref(), Some(p))
                    && self.check_lists(Some(&n.update), Some(&t.update), Some(p))
                    && self.scan_child(Some(&n.statement), Some(&t.statement), Some(p))
            }
            Node::EnhancedFor(n) => {
                let Node::EnhancedFor(t) = &**p.leaf() else {
                    return false;
                };
                self.scan_child(Some(&n.variable), Some(&t.variable), Some(p))
                    && self.scan_child(Some(&n.expression), Some(&t.expression), Some(p))
                    && self.scan_child(Some(&n.statement), Some(&t.statement), Some(p))
            }
            Node::Return(n) => {
                let Node::Return(t) = &**p.leaf() else {
                    return false;
                };
                self.scan_child(n.expression.as_ref(), t.expression.as_ref(), Some(p))
            }
            // TODO: ラベルの照合
            Node::Break(_) => matches!(&**p.leaf(), Node::Break(_)),
            Node::Continue(_) => matches!(&**p.leaf(), Node::Continue(_)),
            Node::Throw(n) => {
                let Node::Throw(t) = &**p.leaf() else {
                    return false;
                };
                self.scan_child(Some(&n.expression), Some(&t.expression), Some(p))
            }
            Node::Try(n) => {
                let Node::Try(t) = &**p.leaf() else {
                    return false;
                };
                self.check_lists(Some(&n.resources), Some(&t.resources), Some(p))
                    && self.scan_child(Some(&n.block), Some(&t.block), Some(p))
                    && self.check_lists(Some(&n.catches), Some(&t.catches), Some(p))
                    && self.scan_child(n.finally_block.as_ref(), t.finally_block.as_ref(), Some(p))
            }
            Node::Catch(n) => {
                let Node::Catch(t) = &**p.leaf() else {
                    return false;
                };
                self.scan_child(Some(&n.parameter), Some(&t.parameter), Some(p))
                    && self.scan_child(Some(&n.block), Some(&t.block), Some(p))
            }
            Node::Switch(n) => {
                let Node::Switch(t) = &**p.leaf() else {
                    return false;
                };
                self.scan_child(Some(&n.expression), Some(&t.expression), Some(p))
                    && self.check_lists(Some(&n.cases), Some(&t.cases), Some(p))
            }
            Node::Case(n) => {
                let Node::Case(t) = &**p.leaf() else {
                    return false;
                };
                self.scan_child(n.expression.as_ref(), t.expression.as_ref(), Some(p))
                    && self.check_lists(Some(&n.statements), Some(&t.statements), Some(p))
            }
            Node::Synchronized(n) => {
                let Node::Synchronized(t) = &**p.leaf() else {
                    return false;
                };
                self.scan_child(Some(&n.expression), Some(&t.expression), Some(p))
                    && self.scan_child(Some(&n.block), Some(&t.block), Some(p))
            }
            Node::Labeled(n) => {
                let Node::Labeled(t) = &**p.leaf() else {
                    return false;
                };
                if !self.match_name_channel(&t.label, &n.label) {
                    return false;
                }
                self.scan_child(Some(&n.statement), Some(&t.statement), Some(p))
            }
            Node::ExpressionStatement(n) => {
                let Node::ExpressionStatement(t) = &**p.leaf() else {
                    return false;
                };
                self.scan_child(Some(&n.expression), Some(&t.expression), Some(p))
            }
            Node::EmptyStatement(_) => matches!(&**p.leaf(), Node::EmptyStatement(_)),
            Node::Assert(n) => {
                let Node::Assert(t) = &**p.leaf() else {
                    return false;
                };
                self.scan_child(Some(&n.condition), Some(&t.condition), Some(p))
                    && self.scan_child(n.detail.as_ref(), t.detail.as_ref(), Some(p))
            }
            Node::Variable(_) => self.visit_variable(node, p),
            Node::Method(_) => self.visit_method(node, p),
            Node::Class(_) => self.visit_class(node, p),
            Node::Modifiers(_) => self.visit_modifiers(node, p),
            Node::Annotation(_) => self.visit_annotation(node, p),
            Node::TypeParameter(n) => {
                let Node::TypeParameter(t) = &**p.leaf() else {
                    return false;
                };
                if !self.bind_declared_name(&t.name, &n.name) {
                    return false;
                }
                self.check_lists(Some(&n.bounds), Some(&t.bounds), Some(p))
            }
            Node::ParameterizedType(n) => {
                let Node::ParameterizedType(t) = &**p.leaf() else {
                    return false;
                };
                self.scan_child(Some(&n.ty), Some(&t.ty), Some(p))
                    && self.check_lists(Some(&n.type_arguments), Some(&t.type_arguments), Some(p))
            }
            Node::ArrayType(n) => {
                let Node::ArrayType(t) = &**p.leaf() else {
                    return false;
                };
                self.scan_child(Some(&n.ty), Some(&t.ty), Some(p))
            }
            Node::PrimitiveType(n) => {
                let Node::PrimitiveType(t) = &**p.leaf() else {
                    return false;
                };
                n.kind == t.kind
            }
            Node::WildcardType(n) => {
                let Node::WildcardType(t) = &**p.leaf() else {
                    return false;
                };
                self.scan_child(n.bound.as_ref(), t.bound.as_ref(), Some(p))
            }
        }
    }

    /// 名前チャネル（識別子・ラベル名の文字列照合）。パターン側が
    /// `$`名なら捕捉し、既に捕捉済みなら一致を要求する。
    fn match_name_channel(&mut self, pattern_name: &str, node_name: &str) -> bool {
        if pattern_name.starts_with(VARIABLE_PREFIX) {
            if let Some(existing) = self.bind_state.variables_to_names.get(pattern_name) {
                return node_name == existing;
            }
            self.bind_state
                .variables_to_names
                .insert(pattern_name.to_string(), node_name.to_string());
            return true;
        }

        node_name == pattern_name
    }

    /// 宣言名の照合。`$`名は名前チャネルと部分木の両方に入れる
    /// （宣言言及条件の両対応のため）。再出現は名前一致を要求し、
    /// 連番付き別名を追加する。
    fn bind_declared_name(&mut self, pattern_name: &str, node_name: &str) -> bool {
        if !pattern_name.starts_with(VARIABLE_PREFIX) {
            return node_name == pattern_name;
        }

        match self.bind_state.variables_to_names.get(pattern_name) {
            Some(existing) => {
                if node_name != existing {
                    return false;
                }
                self.bind_state.match_count += 1;
                let alias = format!("{}${}", pattern_name, self.bind_state.match_count);
                if let Some(context) = self.current.clone() {
                    self.bind_state.variables.insert(alias, context);
                }
                true
            }
            None => {
                if let Some(current) = self.current.clone() {
                    self.bind_state
                        .variables
                        .insert(pattern_name.to_string(), current);
                }
                self.bind_state
                    .variables_to_names
                    .insert(pattern_name.to_string(), node_name.to_string());
                true
            }
        }
    }

    fn visit_identifier(&mut self, node: &NodeRef, p: &NodePath) -> bool {
        let current = self.current_path_of(node);

        match self.verify_elements(&current, p) {
            VerifyResult::MatchCheckDeeper => {
                if node.kind() == p.leaf().kind() {
                    return true;
                }
                self.deep_verify_identifier_to_member_select(&current, p)
            }
            VerifyResult::Match => true,
            VerifyResult::NoMatch | VerifyResult::NoMatchContinue => false,
        }
    }

    fn visit_member_select(&mut self, node: &NodeRef, p: &NodePath) -> bool {
        let current = self.current_path_of(node);

        match self.verify_elements(&current, p) {
            VerifyResult::MatchCheckDeeper => {
                return if node.kind() == p.leaf().kind() {
                    // 中の自由変数を束縛するためレシーバも照合する
                    let (Node::MemberSelect(n), Node::MemberSelect(t)) = (&**node, &**p.leaf())
                    else {
                        return false;
                    };
                    self.scan_child(Some(&n.expression), Some(&t.expression), Some(p))
                } else {
                    self.deep_verify_identifier_to_member_select(p, &current)
                };
            }
            VerifyResult::Match => return true,
            VerifyResult::NoMatch => return false,
            VerifyResult::NoMatchContinue => {}
        }

        // 要素照合では確定できなかったので構造比較に落ちる
        if node.kind() != p.leaf().kind() {
            return false;
        }

        let (Node::MemberSelect(n), Node::MemberSelect(t)) = (&**node, &**p.leaf()) else {
            return false;
        };

        if !self.scan_child(Some(&n.expression), Some(&t.expression), Some(p)) {
            return false;
        }

        if t.identifier.starts_with(VARIABLE_PREFIX) {
            if let Some(existing) = self.bind_state.variables_to_names.get(&t.identifier) {
                return n.identifier == *existing;
            }
            self.bind_state
                .variables_to_names
                .insert(t.identifier.clone(), n.identifier.clone());
            return true;
        }

        n.identifier == t.identifier
    }

    fn visit_block(&mut self, node: &NodeRef, p: &NodePath) -> bool {
        let Node::Block(n) = &**node else {
            return false;
        };

        if p.leaf().kind() != NodeKind::Block {
            // 単文ブロックは文と等価
            debug_assert!(n.statements.len() == 1);
            debug_assert!(!n.is_static);

            if Rc::ptr_eq(p.leaf(), self.searching_for.leaf()) {
                return false;
            }

            let pattern_stmt = vec![p.leaf().clone()];
            return self.check_lists(Some(&n.statements), Some(&pattern_stmt), p.parent());
        }

        let Node::Block(t) = &**p.leaf() else {
            return false;
        };

        if n.is_static != t.is_static {
            return false;
        }

        self.check_lists(Some(&n.statements), Some(&t.statements), Some(p))
    }

    fn visit_variable(&mut self, node: &NodeRef, p: &NodePath) -> bool {
        let (Node::Variable(n), Node::Variable(t)) = (&**node, &**p.leaf()) else {
            return false;
        };

        if !self.scan_child(n.modifiers.as_ref(), t.modifiers.as_ref(), Some(p)) {
            return false;
        }

        if !self.scan_child(n.ty.as_ref(), t.ty.as_ref(), Some(p)) {
            return false;
        }

        if t.name.starts_with(VARIABLE_PREFIX) {
            // 型制約があれば宣言にも適用する
            let current = self.current_path_of(node);
            if !self.type_matches(&current, &t.name) {
                return false;
            }
            if !self.bind_declared_name(&t.name, &n.name) {
                return false;
            }
        } else if self.allow_variables_remap {
            let current = self.current_path_of(node);
            let node_el = self.oracle.element_of(&current);
            let p_el = self.oracle.element_of(p);

            if let (Some(node_el), Some(p_el)) = (node_el, p_el) {
                let node_type = self.oracle.type_of_element(node_el);
                let p_type = self.oracle.type_of_element(p_el);
                if let (Some(node_type), Some(p_type)) = (node_type, p_type) {
                    if self.is_same_type_for_variable_remap(node_type, p_type) {
                        self.bind_state.remap_to_element.insert(p_el, node_el);
                    }
                }
            }
        } else if n.name != t.name {
            return false;
        }

        self.scan_child(n.initializer.as_ref(), t.initializer.as_ref(), Some(p))
    }

    fn visit_method(&mut self, node: &NodeRef, p: &NodePath) -> bool {
        let (Node::Method(n), Node::Method(t)) = (&**node, &**p.leaf()) else {
            return false;
        };

        if !self.scan_child(n.modifiers.as_ref(), t.modifiers.as_ref(), Some(p)) {
            return false;
        }

        if !self.check_lists(Some(&n.type_parameters), Some(&t.type_parameters), Some(p)) {
            return false;
        }

        // コンストラクタの戻り型は比較しない
        let node_return = if n.name == "<init>" { None } else { n.return_type.as_ref() };
        let pattern_return = if t.name == "<init>" { None } else { t.return_type.as_ref() };

        if !self.scan_child(node_return, pattern_return, Some(p)) {
            return false;
        }

        if !self.bind_declared_name(&t.name, &n.name) {
            return false;
        }

        if !self.check_lists(Some(&n.parameters), Some(&t.parameters), Some(p)) {
            return false;
        }

        if !self.check_lists(Some(&n.throws), Some(&t.throws), Some(p)) {
            return false;
        }

        if !self.scan_child(n.body.as_ref(), t.body.as_ref(), Some(p)) {
            return false;
        }

        self.scan_child(n.default_value.as_ref(), t.default_value.as_ref(), Some(p))
    }

    fn visit_class(&mut self, node: &NodeRef, p: &NodePath) -> bool {
        let (Node::Class(n), Node::Class(t)) = (&**node, &**p.leaf()) else {
            return false;
        };

        if !t.name.is_empty() {
            if !self.scan_child(n.modifiers.as_ref(), t.modifiers.as_ref(), Some(p)) {
                return false;
            }

            if !self.bind_declared_name(&t.name, &n.name) {
                return false;
            }

            if !self.check_lists(Some(&n.type_parameters), Some(&t.type_parameters), Some(p)) {
                return false;
            }

            if !self.scan_child(n.extends_clause.as_ref(), t.extends_clause.as_ref(), Some(p)) {
                return false;
            }

            if !self.check_lists(
                Some(&n.implements_clause),
                Some(&t.implements_clause),
                Some(p),
            ) {
                return false;
            }
        } else if !n.name.is_empty() {
            return false;
        }

        self.check_lists(Some(&n.members), Some(&t.members), Some(p))
    }

    fn visit_modifiers(&mut self, node: &NodeRef, p: &NodePath) -> bool {
        let (Node::Modifiers(n), Node::Modifiers(t)) = (&**node, &**p.leaf()) else {
            return false;
        };

        // 先頭注釈が裸の識別子なら修飾子ワイルドカード
        let wildcard = t.annotations.first().and_then(|a| match &**a {
            Node::Annotation(annotation) => match &*annotation.annotation_type {
                Node::Identifier(ident) => Some(ident.name.clone()),
                _ => None,
            },
            _ => None,
        });

        if let Some(name) = wildcard {
            if self.options.allow_variables_in_pattern {
                let pattern_annotations: Vec<NodeRef> =
                    t.annotations.iter().skip(1).cloned().collect();

                if !n.flags.is_superset(&t.flags) {
                    return false;
                }

                // 残りのパターン注釈は順不同で照合し、使った候補は除く
                let mut remaining: Vec<NodeRef> = n.annotations.clone();

                for pattern_annotation in &pattern_annotations {
                    let mut found = false;

                    for index in 0..remaining.len() {
                        let backup = self.bind_state.clone();
                        let candidate = remaining[index].clone();
                        let annotation_path =
                            NodePath::child(p, pattern_annotation.clone());

                        if self.do_super_scan(&candidate, Some(&annotation_path)) {
                            remaining.remove(index);
                            found = true;
                            break;
                        }

                        self.bind_state = backup;
                    }

                    if !found {
                        return false;
                    }
                }

                let Some(current) = self.current.clone() else {
                    return false;
                };

                return match self.bind_state.variables.get(&name) {
                    None => {
                        self.bind_state.variables.insert(name, current);
                        true
                    }
                    Some(_) => {
                        // 修飾子ワイルドカードの再束縛照合は未対応
                        self.bind_state.match_count += 1;
                        let alias = format!("{}${}", name, self.bind_state.match_count);
                        self.bind_state.variables.insert(alias, current);
                        false
                    }
                };
            }
        }

        if !self.check_lists(Some(&n.annotations), Some(&t.annotations), Some(p)) {
            return false;
        }

        n.flags == t.flags
    }

    fn visit_annotation(&mut self, node: &NodeRef, p: &NodePath) -> bool {
        let (Node::Annotation(n), Node::Annotation(t)) = (&**node, &**p.leaf()) else {
            return false;
        };

        // `@A(value = $args$)` は `@A($args$)` と同じ扱い
        let mut pattern_arguments: &[NodeRef] = &t.arguments;
        let unwrapped;

        if t.arguments.len() == 1 {
            if let Node::Assignment(assignment) = &*t.arguments[0] {
                if let Node::Identifier(variable) = &*assignment.variable {
                    if variable.name == "value"
                        && is_multistatement_wildcard_tree(&assignment.expression)
                    {
                        unwrapped = vec![assignment.expression.clone()];
                        pattern_arguments = &unwrapped;
                    }
                }
            }
        }

        if !self.check_lists(Some(&n.arguments), Some(pattern_arguments), Some(p)) {
            return false;
        }

        self.scan_child(Some(&n.annotation_type), Some(&t.annotation_type), Some(p))
    }

    // ==================== シンボル照合 ====================

    fn current_path_of(&self, node: &NodeRef) -> NodePath {
        match &self.current {
            Some(current) if Rc::ptr_eq(current.leaf(), node) => current.clone(),
            Some(current) => NodePath::child(current, node.clone()),
            None => NodePath::root(node.clone()),
        }
    }

    fn verify_elements(&mut self, node: &NodePath, p: &NodePath) -> VerifyResult {
        if self.options.no_element_verify {
            self.unattributed_verify_elements(node, p)
        } else {
            self.full_verify_elements(node, p)
        }
    }

    fn full_verify_elements(&mut self, node: &NodePath, p: &NodePath) -> VerifyResult {
        let node_el = self.oracle.element_of(node);
        let p_el = self.oracle.element_of(p);

        let Some(node_el) = node_el else {
            // 候補側が解決できない: パターン側も未解決なら一致扱い、
            // そうでなければ確定できない
            return if p_el.is_none() {
                VerifyResult::Match
            } else {
                VerifyResult::NoMatchContinue
            };
        };

        let matching_result = if !self.oracle.is_static(node_el) {
            if self.oracle.element_kind(node_el).is_class_like() {
                VerifyResult::Match
            } else {
                VerifyResult::MatchCheckDeeper
            }
        } else {
            // staticメンバをワイルドカードレシーバ（インスタンス式を
            // 表す）のパターンと照合してはならない
            let mut result = VerifyResult::Match;

            if let (Node::MemberSelect(p_select), Node::MemberSelect(node_select)) =
                (&**p.leaf(), &**node.leaf())
            {
                if wildcard_tree_name(&p_select.expression).is_some() {
                    let selector_path = NodePath::child(node, node_select.expression.clone());
                    let node_selector = self.oracle.element_of(&selector_path);

                    result = match node_selector {
                        Some(selector)
                            if self.oracle.element_kind(selector).is_class_like() =>
                        {
                            // `X.this`等はインスタンスを指すので除外済み
                            VerifyResult::NoMatch
                        }
                        _ => VerifyResult::MatchCheckDeeper,
                    };
                }
            }

            result
        };

        let Some(p_el) = p_el else {
            return VerifyResult::NoMatch;
        };

        if node_el == p_el {
            return matching_result;
        }

        let node_kind = self.oracle.element_kind(node_el);
        let p_kind = self.oracle.element_kind(p_el);

        // 互いに無関係でも`class`という名のフィールド同士は
        // リテラルクラス参照の慣用句として深い照合に回す
        if node_kind == p_kind
            && node_kind == ElementKind::Field
            && self.oracle.element_name(node_el).as_deref() == Some(CLASS_FIELD)
            && self.oracle.element_name(p_el).as_deref() == Some(CLASS_FIELD)
        {
            return VerifyResult::MatchCheckDeeper;
        }

        if node_kind == p_kind && node_kind == ElementKind::Method {
            if let Some(owner) = self.oracle.enclosing_element(node_el) {
                if self.oracle.overrides(node_el, p_el, owner) {
                    return VerifyResult::MatchCheckDeeper;
                }
            }
        }

        if self.allow_variables_remap
            && self.bind_state.remap_to_element.get(&p_el) == Some(&node_el)
        {
            return matching_result;
        }

        // 型比較。どちらかがエラー型・未解決なら確定できない
        let Some(node_type) = self.oracle.type_of(node) else {
            return VerifyResult::NoMatchContinue;
        };
        if self.oracle.is_error_type(node_type) {
            return VerifyResult::NoMatchContinue;
        }

        let Some(p_type) = self.oracle.type_of(p) else {
            return VerifyResult::NoMatchContinue;
        };
        if self.oracle.is_error_type(p_type) {
            return VerifyResult::NoMatchContinue;
        }

        VerifyResult::NoMatch
    }

    fn unattributed_verify_elements(&self, node: &NodePath, p: &NodePath) -> VerifyResult {
        if simple_name(node.leaf()) == simple_name(p.leaf()) {
            let pure_select = is_pure_member_select(node.leaf(), true)
                && is_pure_member_select(p.leaf(), true);

            if pure_select {
                VerifyResult::Match
            } else {
                VerifyResult::MatchCheckDeeper
            }
        } else {
            VerifyResult::NoMatchContinue
        }
    }

    /// 識別子とメンバ選択の照合に使う合成`this`レシーバの試行。
    /// 成功・失敗にかかわらず、オプション指定がなければ束縛は
    /// 試行前の状態に戻す。
    fn deep_verify_identifier_to_member_select(
        &mut self,
        identifier: &NodePath,
        member_select: &NodePath,
    ) -> bool {
        let Node::MemberSelect(select) = &**member_select.leaf() else {
            return false;
        };
        let receiver = select.expression.clone();

        for this_path in self.prepare_this(identifier) {
            let original_state = self.bind_state.clone();

            let matched =
                self.scan_child(Some(this_path.leaf()), Some(&receiver), Some(member_select));

            if !self.options.keep_synthetic_this {
                self.bind_state = original_state;
            }

            if matched {
                return true;
            }
        }

        false
    }

    /// パスを囲む各クラス宣言に対応する合成`this`のパス列。
    /// 非帰属モードでは単一の合成`this`だけを返す。
    fn prepare_this(&self, path: &NodePath) -> Vec<NodePath> {
        if self.options.no_element_verify {
            return vec![NodePath::child(path, synthetic_this())];
        }

        let mut result = Vec::new();

        for ancestor in path.iter_to_root() {
            if ancestor.leaf().kind() == NodeKind::Class {
                result.push(NodePath::child(ancestor, synthetic_this()));
            }
        }

        result
    }
}

fn synthetic_this() -> NodeRef {
    Rc::new(Node::Identifier(tree::Identifier {
        name: "this".to_string(),
        span: Span::dummy(),
    }))
}

fn simple_name(node: &Node) -> &str {
    match node {
        Node::Identifier(ident) => &ident.name,
        Node::MemberSelect(select) => &select.identifier,
        _ => unreachable!("識別子・メンバ選択以外に単純名はない"),
    }
}

/// 2つのノードが比較可能な種類かどうか。種類が同じ場合に加えて、
/// 単文ブロックと文、ワイルドカード入りパターンブロックと文、
/// 識別子とメンバ選択の等価則を認める。
pub(crate) fn same_kind(node: &Node, pattern: &Node) -> bool {
    let k1 = node.kind();
    let k2 = pattern.kind();

    if k1 == k2 {
        return true;
    }

    if is_single_statement_block_and_statement(node, pattern)
        || is_single_statement_block_and_statement(pattern, node)
    {
        return true;
    }

    if k2 == NodeKind::Block && node.is_statement() {
        let Node::Block(block) = pattern else {
            return false;
        };

        if block.is_static {
            return false;
        }

        return match block.statements.len() {
            1 => true,
            2 => {
                is_multistatement_wildcard_tree(&block.statements[0])
                    || is_multistatement_wildcard_tree(&block.statements[1])
            }
            3 => {
                is_multistatement_wildcard_tree(&block.statements[0])
                    || is_multistatement_wildcard_tree(&block.statements[2])
            }
            _ => false,
        };
    }

    if !matches!(k1, NodeKind::MemberSelect | NodeKind::Identifier)
        || !matches!(k2, NodeKind::MemberSelect | NodeKind::Identifier)
    {
        return false;
    }

    is_pure_member_select(node, true) && is_pure_member_select(pattern, true)
}

fn is_single_statement_block_and_statement(first: &Node, second: &Node) -> bool {
    if let Node::Block(block) = first {
        if block.statements.len() == 1 && !block.is_static {
            return second.is_statement();
        }
    }

    false
}
