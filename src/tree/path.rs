//! ルートからノードへのパス
//!
//! マッチ結果はノードの同一性で区別されるため、パスの等価性と
//! ハッシュはチェーン上の各ノードのポインタ同一性で定義する。

use std::hash::{Hash, Hasher};
use std::rc::Rc;

use super::Node;

/// 共有されるツリーノードへの参照
pub type NodeRef = Rc<Node>;

#[derive(Debug)]
struct PathLink {
    node: NodeRef,
    parent: Option<NodePath>,
}

/// ノードとそのルートまでの祖先列
#[derive(Debug, Clone)]
pub struct NodePath {
    link: Rc<PathLink>,
}

impl NodePath {
    /// ルートノードだけからなるパスを作成
    pub fn root(node: NodeRef) -> Self {
        Self {
            link: Rc::new(PathLink { node, parent: None }),
        }
    }

    /// 親パスの下に子ノードを連結したパスを作成
    pub fn child(parent: &NodePath, node: NodeRef) -> Self {
        Self {
            link: Rc::new(PathLink {
                node,
                parent: Some(parent.clone()),
            }),
        }
    }

    /// パスの末端ノード
    pub fn leaf(&self) -> &NodeRef {
        &self.link.node
    }

    /// 親パス（ルートならNone）
    pub fn parent(&self) -> Option<&NodePath> {
        self.link.parent.as_ref()
    }

    /// このパスからルートへ向かうイテレータ（自身を含む）
    pub fn iter_to_root(&self) -> impl Iterator<Item = &NodePath> {
        std::iter::successors(Some(self), |p| p.parent())
    }
}

impl PartialEq for NodePath {
    fn eq(&self, other: &Self) -> bool {
        if Rc::ptr_eq(&self.link, &other.link) {
            return true;
        }
        if !Rc::ptr_eq(&self.link.node, &other.link.node) {
            return false;
        }
        match (self.parent(), other.parent()) {
            (None, None) => true,
            (Some(a), Some(b)) => a == b,
            _ => false,
        }
    }
}

impl Eq for NodePath {}

impl Hash for NodePath {
    fn hash<H: Hasher>(&self, state: &mut H) {
        for path in self.iter_to_root() {
            (Rc::as_ptr(path.leaf()) as usize).hash(state);
        }
    }
}

/// 文のパスから、それを含む文リストとその親パスを求める。
///
/// 親がブロックまたはcase節ならその文リスト、それ以外なら
/// その文自身だけからなるリストを返す。
pub fn enclosing_statements(path: &NodePath) -> (Option<NodePath>, Vec<NodeRef>) {
    let parent = path.parent().cloned();
    let statements = match parent.as_ref().map(|p| &**p.leaf()) {
        Some(Node::Block(block)) => block.statements.clone(),
        Some(Node::Case(case)) => case.statements.clone(),
        _ => vec![path.leaf().clone()],
    };
    (parent, statements)
}
