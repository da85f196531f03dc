//! マッチ試行中の束縛状態
//!
//! 1回のマッチ試行が積み上げる束縛の集まり。投機的な分岐の前には
//! 必ず複製し、成功した枝だけを書き戻す（copy-on-branch）。

use std::collections::HashMap;

use crate::oracle::ElementId;
use crate::tree::NodePath;

/// マッチ試行中の可変な束縛ストア
#[derive(Debug, Clone, Default)]
pub struct BindState {
    /// 自由変数 → 束縛された部分木パス
    pub variables: HashMap<String, NodePath>,
    /// 複文ワイルドカード → 束縛された文パス列
    pub multi_variables: HashMap<String, Vec<NodePath>>,
    /// 自由変数 → 捕捉された名前文字列（識別子・ラベル・型名）
    pub variables_to_names: HashMap<String, String>,
    /// パターン側シンボル → 対象側シンボル（リマップモード時のみ）
    pub remap_to_element: HashMap<ElementId, ElementId>,
    /// パターン側シンボル → 対象側部分木（リマップモード時のみ）
    pub remap_to_trees: HashMap<ElementId, NodePath>,
    /// 再束縛の曖昧さ解消に使う通し番号
    pub match_count: usize,
}

impl BindState {
    /// 空の状態
    pub fn empty() -> Self {
        Self::default()
    }

    /// 既存の状態を種にした新しい試行用の状態。
    /// 束縛は引き継ぎ、`match_count` は0に戻す。
    pub fn start_from(original: &BindState) -> Self {
        Self {
            match_count: 0,
            ..original.clone()
        }
    }

    /// 束縛マップ3種から状態を組み立てる（複文連鎖の途中経過用）
    pub fn from_parts(
        variables: HashMap<String, NodePath>,
        multi_variables: HashMap<String, Vec<NodePath>>,
        variables_to_names: HashMap<String, String>,
    ) -> Self {
        Self {
            variables,
            multi_variables,
            variables_to_names,
            ..Self::default()
        }
    }

    /// リマップ表を差し替えた状態を組み立てる
    pub fn with_remap(
        original: &BindState,
        remap_to_element: HashMap<ElementId, ElementId>,
        remap_to_trees: HashMap<ElementId, NodePath>,
    ) -> Self {
        Self {
            remap_to_element,
            remap_to_trees,
            ..original.clone()
        }
    }
}

/// 成功したマッチ1件に付随する束縛のスナップショット
#[derive(Debug, Clone)]
pub struct VariableAssignments {
    pub variables: HashMap<String, NodePath>,
    pub multi_variables: HashMap<String, Vec<NodePath>>,
    pub variables_to_names: HashMap<String, String>,
    pub remap_to_element: HashMap<ElementId, ElementId>,
    pub remap_to_trees: HashMap<ElementId, NodePath>,
}

impl VariableAssignments {
    pub(crate) fn snapshot(state: &BindState) -> Self {
        Self {
            variables: state.variables.clone(),
            multi_variables: state.multi_variables.clone(),
            variables_to_names: state.variables_to_names.clone(),
            remap_to_element: state.remap_to_element.clone(),
            remap_to_trees: state.remap_to_trees.clone(),
        }
    }
}
