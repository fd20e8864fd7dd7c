//! 트리 검색 필터
//!
//! 이름에 대한 대소문자 무시 부분 문자열 매칭. 일치하는 노드의 조상은 이름이
//! 일치하지 않아도 남는다. 빈 질의는 원본 복사본을 돌려준다.

use crate::node::TreeNode;

/// 필터링된 깊은 복사본
pub fn filter_tree(query: &str, nodes: &[TreeNode]) -> Vec<TreeNode> {
    let needle = query.trim().to_lowercase();
    if needle.is_empty() {
        return nodes.to_vec();
    }
    nodes
        .iter()
        .filter_map(|node| prune(node, &needle))
        .collect()
}

fn prune(node: &TreeNode, needle: &str) -> Option<TreeNode> {
    let children: Vec<TreeNode> = node
        .children
        .iter()
        .filter_map(|child| prune(child, needle))
        .collect();

    if node.name.to_lowercase().contains(needle) || !children.is_empty() {
        Some(TreeNode {
            id: node.id.clone(),
            name: node.name.clone(),
            children,
        })
    } else {
        None
    }
}

/// 노드 이름이 질의와 일치하는지
pub fn name_matches(query: &str, name: &str) -> bool {
    let needle = query.trim().to_lowercase();
    needle.is_empty() || name.to_lowercase().contains(&needle)
}
