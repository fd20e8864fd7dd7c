//! 트리 노드와 평탄화된 뷰

use accessmap_foundation::{MarkerForest, MarkerNode};
use serde::{Deserialize, Serialize};

/// 화면용 트리 노드 (`name`은 마커 설명)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TreeNode {
    pub id: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<TreeNode>,
}

impl TreeNode {
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            children: Vec::new(),
        }
    }

    pub fn with_children(mut self, children: Vec<TreeNode>) -> Self {
        self.children = children;
        self
    }

    pub fn has_children(&self) -> bool {
        !self.children.is_empty()
    }

    /// 마커 포레스트 → 트리
    pub fn from_forest(forest: &MarkerForest) -> Vec<TreeNode> {
        forest.roots().iter().map(TreeNode::from).collect()
    }

    /// 자신과 모든 자손의 id (전위 순서)
    pub fn ids(&self) -> Vec<&str> {
        let mut out = Vec::new();
        collect_ids(std::slice::from_ref(self), &mut out);
        out
    }
}

impl From<&MarkerNode> for TreeNode {
    fn from(node: &MarkerNode) -> Self {
        TreeNode {
            id: node.id.clone(),
            name: node.description.clone(),
            children: node.children.iter().map(TreeNode::from).collect(),
        }
    }
}

/// 포레스트 전체의 id (전위 순서)
pub fn tree_ids(nodes: &[TreeNode]) -> Vec<&str> {
    let mut out = Vec::new();
    collect_ids(nodes, &mut out);
    out
}

fn collect_ids<'a>(nodes: &'a [TreeNode], out: &mut Vec<&'a str>) {
    for node in nodes {
        out.push(node.id.as_str());
        collect_ids(&node.children, out);
    }
}

/// 평탄화된 노드 (세션 동안 고정)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FlatNode {
    pub id: String,
    pub depth: usize,
    /// 직계 자식 id
    pub children: Vec<String>,
    pub parent: Option<String>,
}

/// 트리 → 전위 순서 평탄화
pub fn flatten(nodes: &[TreeNode]) -> Vec<FlatNode> {
    let mut out = Vec::new();
    flatten_into(nodes, 0, None, &mut out);
    out
}

fn flatten_into(nodes: &[TreeNode], depth: usize, parent: Option<&str>, out: &mut Vec<FlatNode>) {
    for node in nodes {
        out.push(FlatNode {
            id: node.id.clone(),
            depth,
            children: node.children.iter().map(|c| c.id.clone()).collect(),
            parent: parent.map(str::to_string),
        });
        flatten_into(&node.children, depth + 1, Some(&node.id), out);
    }
}
