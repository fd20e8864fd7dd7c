//! 마커 계층 구조
//!
//! 문서 표현:
//!
//! ```text
//! { "<rootId>": { "description": "...", "children": [ { "<id>": { ... } }, ... ] } }
//! ```
//!
//! 루트와 자식 순서를 그대로 유지해서 같은 입력이면 같은 바이트가 나온다.

use serde::de::{Deserializer, MapAccess, Visitor};
use serde::ser::{SerializeMap, SerializeSeq, SerializeStruct, Serializer};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;

/// 설명이 없는 마커에 붙는 값
pub const FALLBACK_DESCRIPTION: &str = "needs description";

/// 마커 노드
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MarkerNode {
    pub id: String,
    /// 비어 있지 않음 (없으면 FALLBACK_DESCRIPTION)
    pub description: String,
    pub children: Vec<MarkerNode>,
}

impl MarkerNode {
    pub fn new(id: impl Into<String>, description: Option<&str>) -> Self {
        let description = description
            .map(str::trim)
            .filter(|d| !d.is_empty())
            .unwrap_or(FALLBACK_DESCRIPTION)
            .to_string();
        Self {
            id: id.into(),
            description,
            children: Vec::new(),
        }
    }

    pub fn with_children(mut self, children: Vec<MarkerNode>) -> Self {
        self.children = children;
        self
    }

    pub fn is_leaf(&self) -> bool {
        self.children.is_empty()
    }

    pub fn has_fallback_description(&self) -> bool {
        self.description == FALLBACK_DESCRIPTION
    }

    /// 자기 자신 + 모든 자손 (전위 순회)
    pub fn walk(&self) -> Vec<&MarkerNode> {
        let mut out = Vec::new();
        let mut stack = vec![self];
        while let Some(node) = stack.pop() {
            out.push(node);
            stack.extend(node.children.iter().rev());
        }
        out
    }
}

/// 마커 포레스트 (여러 루트 가능)
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MarkerForest {
    roots: Vec<MarkerNode>,
}

impl MarkerForest {
    pub fn new(roots: Vec<MarkerNode>) -> Self {
        Self { roots }
    }

    pub fn roots(&self) -> &[MarkerNode] {
        &self.roots
    }

    pub fn into_roots(self) -> Vec<MarkerNode> {
        self.roots
    }

    pub fn is_empty(&self) -> bool {
        self.roots.is_empty()
    }

    pub fn root_ids(&self) -> Vec<&str> {
        self.roots.iter().map(|r| r.id.as_str()).collect()
    }

    /// 전체 노드 (전위 순회)
    pub fn nodes(&self) -> Vec<&MarkerNode> {
        self.roots.iter().flat_map(MarkerNode::walk).collect()
    }

    /// 전체 id (전위 순회)
    pub fn ids(&self) -> Vec<&str> {
        self.nodes().into_iter().map(|n| n.id.as_str()).collect()
    }

    /// 전체 노드 수
    pub fn len(&self) -> usize {
        self.nodes().len()
    }

    pub fn find(&self, id: &str) -> Option<&MarkerNode> {
        self.nodes().into_iter().find(|n| n.id == id)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.find(id).is_some()
    }

    /// 두 번 이상 나타나는 id (정상이면 비어 있음)
    pub fn duplicate_ids(&self) -> Vec<String> {
        let mut seen = HashSet::new();
        let mut dups = Vec::new();
        for id in self.ids() {
            if !seen.insert(id) && !dups.iter().any(|d: &String| d == id) {
                dups.push(id.to_string());
            }
        }
        dups
    }
}

// ============================================================================
// Serialize
// ============================================================================

struct NodeBody<'a>(&'a MarkerNode);

impl Serialize for NodeBody<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let mut body = serializer.serialize_struct("MarkerNode", 2)?;
        body.serialize_field("description", &self.0.description)?;
        body.serialize_field("children", &ChildList(&self.0.children))?;
        body.end()
    }
}

struct ChildList<'a>(&'a [MarkerNode]);

impl Serialize for ChildList<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let mut seq = serializer.serialize_seq(Some(self.0.len()))?;
        for child in self.0 {
            seq.serialize_element(&SingleEntry(child))?;
        }
        seq.end()
    }
}

struct SingleEntry<'a>(&'a MarkerNode);

impl Serialize for SingleEntry<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(1))?;
        map.serialize_entry(&self.0.id, &NodeBody(self.0))?;
        map.end()
    }
}

impl Serialize for MarkerForest {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.roots.len()))?;
        for root in &self.roots {
            map.serialize_entry(&root.id, &NodeBody(root))?;
        }
        map.end()
    }
}

// ============================================================================
// Deserialize
// ============================================================================

#[derive(Deserialize)]
struct OwnedBody {
    #[serde(default)]
    description: String,
    #[serde(default)]
    children: Vec<OrderedEntries>,
}

/// 순서를 보존하는 `{ id: body }` 맵
struct OrderedEntries(Vec<(String, OwnedBody)>);

impl<'de> Deserialize<'de> for OrderedEntries {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        struct EntriesVisitor;

        impl<'de> Visitor<'de> for EntriesVisitor {
            type Value = OrderedEntries;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("a map of marker id to marker node")
            }

            fn visit_map<A: MapAccess<'de>>(
                self,
                mut access: A,
            ) -> std::result::Result<Self::Value, A::Error> {
                let mut entries = Vec::with_capacity(access.size_hint().unwrap_or(0));
                while let Some((id, body)) = access.next_entry::<String, OwnedBody>()? {
                    entries.push((id, body));
                }
                Ok(OrderedEntries(entries))
            }
        }

        deserializer.deserialize_map(EntriesVisitor)
    }
}

impl OrderedEntries {
    fn into_nodes(self) -> Vec<MarkerNode> {
        self.0
            .into_iter()
            .map(|(id, body)| {
                let children = body
                    .children
                    .into_iter()
                    .flat_map(OrderedEntries::into_nodes)
                    .collect();
                MarkerNode::new(id, Some(body.description.as_str())).with_children(children)
            })
            .collect()
    }
}

impl<'de> Deserialize<'de> for MarkerForest {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let entries = OrderedEntries::deserialize(deserializer)?;
        Ok(MarkerForest::new(entries.into_nodes()))
    }
}
