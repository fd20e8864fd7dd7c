//! Hierarchy Builder
//!
//! 평면 레코드 목록 → 마커 포레스트.
//!
//! 1. id → 노드 맵을 레코드 순서대로 만든다. 뒤 레코드의 설명이 덮어쓴다 (빈 설명은 대체 문구로).
//! 2. 부모 참조가 알려진 id를 가리키면 그 부모의 자식이 된다 (마지막 참조가 이김).
//! 3. 어디서든 자식으로 붙은 id는 루트가 아니다.
//!
//! 순환 참조는 루트 단계 이후에도 배치되지 않은 id를 레코드 순서대로 루트로
//! 올리고, 현재 삽입 경로에 이미 있는 id로는 내려가지 않는 방식으로 끊는다.

use accessmap_foundation::{MarkerForest, MarkerNode, MarkerRecord};
use serde::Serialize;
use std::collections::{HashMap, HashSet};
use tracing::{debug, warn};

/// 해석되지 않은 부모 참조
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UnresolvedParent {
    pub id: String,
    pub parent_ref: String,
}

/// 빌드 결과
#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Hierarchy {
    pub forest: MarkerForest,
    /// 순환 때문에 루트로 올라간 id
    pub promoted_roots: Vec<String>,
    /// 없는 id를 가리킨 부모 참조 (해당 노드는 루트로 남음)
    pub unresolved: Vec<UnresolvedParent>,
}

/// 계층 빌더
#[derive(Debug, Default, Clone, Copy)]
pub struct HierarchyBuilder;

struct Index<'r> {
    order: Vec<&'r str>,
    descriptions: HashMap<&'r str, Option<&'r str>>,
    children: HashMap<&'r str, Vec<&'r str>>,
}

impl<'r> Index<'r> {
    fn build_node(
        &self,
        id: &'r str,
        path: &mut Vec<&'r str>,
        placed: &mut HashSet<&'r str>,
    ) -> MarkerNode {
        placed.insert(id);
        path.push(id);

        let mut node = MarkerNode::new(id, self.descriptions.get(id).copied().flatten());
        for &child in self.children.get(id).map(Vec::as_slice).unwrap_or(&[]) {
            if path.contains(&child) {
                warn!("Marker cycle: '{}' is an ancestor of itself via '{}'", child, id);
                continue;
            }
            if placed.contains(child) {
                continue;
            }
            node.children.push(self.build_node(child, path, placed));
        }

        path.pop();
        node
    }
}

impl HierarchyBuilder {
    pub fn new() -> Self {
        Self
    }

    pub fn build(&self, records: &[MarkerRecord]) -> Hierarchy {
        // 1. id → 설명 (레코드 순서)
        let mut order: Vec<&str> = Vec::new();
        let mut descriptions: HashMap<&str, Option<&str>> = HashMap::new();
        for record in records {
            let id = record.id.trim();
            if id.is_empty() {
                continue;
            }
            match descriptions.get_mut(id) {
                None => {
                    order.push(id);
                    descriptions.insert(id, record.non_empty_description());
                }
                Some(slot) => *slot = record.non_empty_description(),
            }
        }

        // 2. 부모 참조 해석
        let mut parent_of: HashMap<&str, &str> = HashMap::new();
        let mut unresolved = Vec::new();
        for record in records {
            let id = record.id.trim();
            let Some(parent) = record.non_empty_parent() else {
                continue;
            };
            if id.is_empty() {
                continue;
            }
            if descriptions.contains_key(parent) {
                parent_of.insert(id, parent);
            } else {
                debug!("Unresolved parent '{}' for marker '{}'", parent, id);
                unresolved.push(UnresolvedParent {
                    id: id.to_string(),
                    parent_ref: parent.to_string(),
                });
            }
        }

        let mut children: HashMap<&str, Vec<&str>> = HashMap::new();
        for &id in &order {
            if let Some(&parent) = parent_of.get(id) {
                children.entry(parent).or_default().push(id);
            }
        }

        let index = Index {
            order,
            descriptions,
            children,
        };

        // 3. 루트: 자식으로 붙지 않은 id
        let mut placed: HashSet<&str> = HashSet::new();
        let mut path: Vec<&str> = Vec::new();
        let mut roots = Vec::new();
        for &id in &index.order {
            if !parent_of.contains_key(id) {
                roots.push(index.build_node(id, &mut path, &mut placed));
            }
        }

        // 순환: 아직 배치되지 않은 id를 루트로
        let mut promoted_roots = Vec::new();
        for &id in &index.order {
            if placed.contains(id) {
                continue;
            }
            warn!("Breaking marker cycle at '{}': placed as a root", id);
            promoted_roots.push(id.to_string());
            roots.push(index.build_node(id, &mut path, &mut placed));
        }

        Hierarchy {
            forest: MarkerForest::new(roots),
            promoted_roots,
            unresolved,
        }
    }
}

/// 편의 함수: 레코드 → 포레스트
pub fn build_forest(records: &[MarkerRecord]) -> MarkerForest {
    HierarchyBuilder::new().build(records).forest
}
