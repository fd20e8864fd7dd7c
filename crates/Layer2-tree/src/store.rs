//! Permission Tree Store
//!
//! 역할별 체크 상태, 펼침 상태, 검색어를 가진 헤드리스 상태 계층.
//! 모든 연산은 동기이며 실패하지 않는다. 모르는 id나 활성 역할이 없는 경우는
//! 조용히 무시된다.

use crate::event::{ListenerId, Listeners, TreeEvent, TreeListener};
use crate::filter::filter_tree;
use crate::node::{flatten, tree_ids, FlatNode, TreeNode};
use crate::role::RoleState;
use accessmap_foundation::{role_label, AccessConfig};
use serde::Serialize;
use std::collections::{BTreeSet, HashMap};
use std::sync::Arc;
use tracing::debug;

/// 역할 하나의 카운터
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct Counters {
    /// 체크된 id 수 (트리에 없는 오래된 id 포함)
    pub active: usize,
    /// `total_rows - active`, 0 미만으로 내려가지 않음
    pub denied: usize,
}

/// 렌더링용 행
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VisibleRow {
    pub id: String,
    pub name: String,
    pub depth: usize,
    pub has_children: bool,
    pub expanded: bool,
    pub checked: bool,
}

pub struct PermissionTreeStore {
    tree: Vec<TreeNode>,
    flat: Vec<FlatNode>,
    index: HashMap<String, usize>,
    depth_counts: Vec<usize>,

    roles: Vec<RoleState>,
    active: Option<String>,
    expanded: BTreeSet<String>,

    role_query: String,
    tree_query: String,

    listeners: Listeners,
}

impl PermissionTreeStore {
    /// 정적 트리 + 역할 작업 사본. 활성 역할은 첫 번째 역할.
    pub fn new(tree: Vec<TreeNode>, roles: Vec<RoleState>) -> Self {
        let flat = flatten(&tree);
        let mut index = HashMap::with_capacity(flat.len());
        for (i, node) in flat.iter().enumerate() {
            index.entry(node.id.clone()).or_insert(i);
        }

        let mut depth_counts: Vec<usize> = Vec::new();
        for node in &flat {
            if depth_counts.len() <= node.depth {
                depth_counts.resize(node.depth + 1, 0);
            }
            depth_counts[node.depth] += 1;
        }

        let active = roles.first().map(|r| r.role_id.clone());
        debug!(
            "Tree store: {} rows, {} roles, depth {}",
            flat.len(),
            roles.len(),
            depth_counts.len()
        );

        Self {
            tree,
            flat,
            index,
            depth_counts,
            roles,
            active,
            expanded: BTreeSet::new(),
            role_query: String::new(),
            tree_query: String::new(),
            listeners: Listeners::new(),
        }
    }

    /// 설정 문서에서 세션 시작
    pub fn from_config(config: &AccessConfig) -> Self {
        Self::new(
            TreeNode::from_forest(&config.markers),
            RoleState::from_config(config),
        )
    }

    // ========================================================================
    // Listeners
    // ========================================================================

    pub fn subscribe(&mut self, listener: Arc<dyn TreeListener>) -> ListenerId {
        self.listeners.add(listener)
    }

    pub fn unsubscribe(&mut self, id: ListenerId) -> bool {
        self.listeners.remove(id)
    }

    pub fn listener_count(&self) -> usize {
        self.listeners.len()
    }

    // ========================================================================
    // Roles
    // ========================================================================

    pub fn roles(&self) -> &[RoleState] {
        &self.roles
    }

    pub fn active_role(&self) -> Option<&str> {
        self.active.as_deref()
    }

    pub fn role(&self, id: &str) -> Option<&RoleState> {
        self.roles.iter().find(|r| r.role_id == id)
    }

    fn active_state_mut(&mut self) -> Option<&mut RoleState> {
        let active = self.active.as_deref()?;
        self.roles.iter_mut().find(|r| r.role_id == active)
    }

    /// 활성 역할 변경. 펼침 상태는 모두 접힌다.
    pub fn select_role(&mut self, id: &str) {
        if self.role(id).is_none() {
            debug!("select_role: unknown role '{}'", id);
            return;
        }
        self.active = Some(id.to_string());
        self.expanded.clear();
        self.listeners.emit(&TreeEvent::RoleSelected {
            role: id.to_string(),
        });
    }

    /// 역할 목록 검색어
    pub fn set_role_query(&mut self, query: impl Into<String>) {
        self.role_query = query.into();
        self.listeners.emit(&TreeEvent::RoleQueryChanged {
            query: self.role_query.clone(),
        });
    }

    pub fn role_query(&self) -> &str {
        &self.role_query
    }

    /// 검색어와 일치하는 역할 (id 또는 표시 이름)
    pub fn filtered_roles(&self) -> Vec<&RoleState> {
        let needle = self.role_query.trim().to_lowercase();
        self.roles
            .iter()
            .filter(|r| {
                needle.is_empty()
                    || r.role_id.to_lowercase().contains(&needle)
                    || role_label(&r.role_id).to_lowercase().contains(&needle)
            })
            .collect()
    }

    // ========================================================================
    // Checked state
    // ========================================================================

    /// 활성 역할의 체크된 id
    pub fn checked_ids(&self) -> Option<&BTreeSet<String>> {
        let active = self.active.as_deref()?;
        self.role(active).map(|r| &r.checked)
    }

    pub fn is_checked(&self, id: &str) -> bool {
        self.checked_ids().is_some_and(|c| c.contains(id))
    }

    /// `id`와 모든 자손을 `on`으로. 조상은 건드리지 않는다.
    pub fn toggle_node(&mut self, id: &str, on: bool) {
        if !self.index.contains_key(id) {
            debug!("toggle_node: unknown node '{}'", id);
            return;
        }
        let ids = self.subtree_ids(id);
        self.apply_checked(&ids, on);
    }

    /// 주어진 트리의 모든 id를 `on`으로
    pub fn set_all_in_scope(&mut self, scope: &[TreeNode], on: bool) {
        let ids: Vec<String> = tree_ids(scope).into_iter().map(str::to_string).collect();
        self.apply_checked(&ids, on);
    }

    /// 프리셋: 전체 선택 (검색 필터와 무관하게 전체 트리)
    pub fn select_all(&mut self) {
        let ids = self.all_ids();
        self.apply_checked(&ids, true);
    }

    /// 프리셋: 전체 해제 (검색 필터와 무관하게 전체 트리)
    pub fn clear_all(&mut self) {
        let ids = self.all_ids();
        self.apply_checked(&ids, false);
    }

    fn all_ids(&self) -> Vec<String> {
        self.flat.iter().map(|f| f.id.clone()).collect()
    }

    fn apply_checked(&mut self, ids: &[String], on: bool) {
        let Some(state) = self.active_state_mut() else {
            debug!("No active role; ignoring check change");
            return;
        };
        let changed = state.set(ids.iter().map(String::as_str), on);
        let role = state.role_id.clone();
        debug!("Role '{}': {} ids set to {} ({} changed)", role, ids.len(), on, changed);
        self.listeners
            .emit(&TreeEvent::CheckedChanged { role, on, changed });
    }

    /// `id`와 모든 자손 (전체 트리 기준)
    fn subtree_ids(&self, id: &str) -> Vec<String> {
        let mut out = Vec::new();
        let mut stack = vec![id];
        while let Some(current) = stack.pop() {
            out.push(current.to_string());
            if let Some(&i) = self.index.get(current) {
                stack.extend(self.flat[i].children.iter().rev().map(String::as_str));
            }
        }
        out
    }

    // ========================================================================
    // Expansion
    // ========================================================================

    pub fn expanded(&self) -> &BTreeSet<String> {
        &self.expanded
    }

    pub fn is_expanded(&self, id: &str) -> bool {
        self.expanded.contains(id)
    }

    /// 펼침 토글. 펼칠 때 같은 부모 아래 형제 서브트리는 모두 접힌다.
    pub fn toggle_expand(&mut self, id: &str) {
        let Some(&i) = self.index.get(id) else {
            debug!("toggle_expand: unknown node '{}'", id);
            return;
        };
        if self.flat[i].children.is_empty() {
            return;
        }

        if !self.expanded.remove(id) {
            let siblings: Vec<String> = match &self.flat[i].parent {
                Some(parent) => self
                    .index
                    .get(parent)
                    .map(|&p| self.flat[p].children.clone())
                    .unwrap_or_default(),
                None => self
                    .flat
                    .iter()
                    .filter(|f| f.depth == 0)
                    .map(|f| f.id.clone())
                    .collect(),
            };
            for sibling in siblings.iter().filter(|s| s.as_str() != id) {
                for collapsed in self.subtree_ids(sibling) {
                    self.expanded.remove(&collapsed);
                }
            }
            self.expanded.insert(id.to_string());
        }

        self.listeners.emit(&TreeEvent::ExpansionChanged {
            expanded: self.expanded.len(),
        });
    }

    /// 자식이 있는 모든 노드 펼침
    pub fn expand_all(&mut self) {
        self.expanded = self
            .flat
            .iter()
            .filter(|f| !f.children.is_empty())
            .map(|f| f.id.clone())
            .collect();
        self.listeners.emit(&TreeEvent::ExpansionChanged {
            expanded: self.expanded.len(),
        });
    }

    pub fn collapse_all(&mut self) {
        self.expanded.clear();
        self.listeners
            .emit(&TreeEvent::ExpansionChanged { expanded: 0 });
    }

    // ========================================================================
    // Tree view
    // ========================================================================

    pub fn tree(&self) -> &[TreeNode] {
        &self.tree
    }

    pub fn flat_nodes(&self) -> &[FlatNode] {
        &self.flat
    }

    /// 트리 검색어. 펼침 상태는 바꾸지 않는다.
    pub fn set_tree_query(&mut self, query: impl Into<String>) {
        self.tree_query = query.into();
        self.listeners.emit(&TreeEvent::TreeQueryChanged {
            query: self.tree_query.clone(),
        });
    }

    pub fn tree_query(&self) -> &str {
        &self.tree_query
    }

    pub fn filtered_tree(&self) -> Vec<TreeNode> {
        filter_tree(&self.tree_query, &self.tree)
    }

    /// 화면에 보이는 행
    ///
    /// 검색 중에는 필터된 트리 전체를 펼친 상태로 보여준다.
    pub fn visible_rows(&self) -> Vec<VisibleRow> {
        let searching = !self.tree_query.trim().is_empty();
        let mut rows = Vec::new();
        if searching {
            let filtered = self.filtered_tree();
            self.push_rows(&filtered, 0, true, &mut rows);
        } else {
            self.push_rows(&self.tree, 0, false, &mut rows);
        }
        rows
    }

    fn push_rows(&self, nodes: &[TreeNode], depth: usize, open_all: bool, rows: &mut Vec<VisibleRow>) {
        for node in nodes {
            let expanded = node.has_children() && (open_all || self.expanded.contains(&node.id));
            rows.push(VisibleRow {
                id: node.id.clone(),
                name: node.name.clone(),
                depth,
                has_children: node.has_children(),
                expanded,
                checked: self.is_checked(&node.id),
            });
            if expanded {
                self.push_rows(&node.children, depth + 1, open_all, rows);
            }
        }
    }

    // ========================================================================
    // Counters
    // ========================================================================

    pub fn total_rows(&self) -> usize {
        self.flat.len()
    }

    /// 깊이별 노드 수 (인덱스 = 깊이)
    pub fn depth_counts(&self) -> &[usize] {
        &self.depth_counts
    }

    /// 활성 역할의 카운터
    pub fn counters(&self) -> Counters {
        match self.active.as_deref() {
            Some(role) => self.counters_for(role),
            None => Counters {
                active: 0,
                denied: self.total_rows(),
            },
        }
    }

    pub fn counters_for(&self, role: &str) -> Counters {
        let active = self.role(role).map_or(0, |r| r.checked.len());
        Counters {
            active,
            denied: self.total_rows().saturating_sub(active),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    fn sample_tree() -> Vec<TreeNode> {
        vec![
            TreeNode::new("dashboard", "Dashboard"),
            TreeNode::new("projects", "Проекты").with_children(vec![
                TreeNode::new("projects.view", "View projects"),
                TreeNode::new("projects.edit", "Edit projects")
                    .with_children(vec![TreeNode::new("projects.edit.owner", "Change owner")]),
            ]),
            TreeNode::new("reports", "Reports")
                .with_children(vec![TreeNode::new("reports.sales", "Sales")]),
        ]
    }

    fn store() -> PermissionTreeStore {
        PermissionTreeStore::new(
            sample_tree(),
            vec![
                RoleState::seeded(
                    "viewer",
                    ["dashboard", "projects", "projects.view", "reports", "reports.sales"],
                ),
                RoleState::new("editor"),
            ],
        )
    }

    fn checked(store: &PermissionTreeStore) -> Vec<&str> {
        store
            .checked_ids()
            .map(|c| c.iter().map(String::as_str).collect())
            .unwrap_or_default()
    }

    #[test]
    fn test_viewer_clear_then_toggle_reports() {
        let mut store = store();
        assert_eq!(store.active_role(), Some("viewer"));

        let tree = store.tree().to_vec();
        store.set_all_in_scope(&tree, false);
        store.toggle_node("reports", true);

        assert_eq!(checked(&store), vec!["reports", "reports.sales"]);
    }

    #[test]
    fn test_toggle_cascades_down_not_up() {
        let mut store = store();
        store.select_role("editor");
        store.toggle_node("projects.edit", true);
        assert_eq!(checked(&store), vec!["projects.edit", "projects.edit.owner"]);
        assert!(!store.is_checked("projects"));

        store.select_role("viewer");
        store.toggle_node("projects.view", false);
        assert!(store.is_checked("projects"));
        assert!(!store.is_checked("projects.view"));
    }

    #[test]
    fn test_unknown_ids_are_noops() {
        let mut store = store();
        let before = checked(&store).len();
        store.toggle_node("ghost", true);
        store.toggle_expand("ghost");
        store.select_role("ghost");
        assert_eq!(checked(&store).len(), before);
        assert_eq!(store.active_role(), Some("viewer"));
        assert!(store.expanded().is_empty());
    }

    #[test]
    fn test_expand_all_only_parents() {
        let mut store = PermissionTreeStore::new(
            vec![
                TreeNode::new("a", "A").with_children(vec![TreeNode::new("a.1", "A1")]),
                TreeNode::new("b", "B").with_children(vec![TreeNode::new("b.1", "B1")]),
                TreeNode::new("c", "C"),
            ],
            vec![RoleState::new("admin")],
        );
        store.expand_all();
        let expanded: Vec<_> = store.expanded().iter().map(String::as_str).collect();
        assert_eq!(expanded, vec!["a", "b"]);

        store.collapse_all();
        assert!(store.expanded().is_empty());
    }

    #[test]
    fn test_accordion_collapses_siblings_only() {
        let mut store = store();
        store.toggle_expand("projects");
        store.toggle_expand("projects.edit");
        assert!(store.is_expanded("projects.edit"));

        // 다른 루트를 펼치면 projects 서브트리 전체가 접힌다
        store.toggle_expand("reports");
        assert!(store.is_expanded("reports"));
        assert!(!store.is_expanded("projects"));
        assert!(!store.is_expanded("projects.edit"));

        // 다시 토글하면 닫힘
        store.toggle_expand("reports");
        assert!(store.expanded().is_empty());
    }

    #[test]
    fn test_leaf_cannot_expand() {
        let mut store = store();
        store.toggle_expand("dashboard");
        assert!(store.expanded().is_empty());
    }

    #[test]
    fn test_select_role_collapses_but_keeps_checks() {
        let mut store = store();
        store.expand_all();
        store.set_tree_query("sales");
        assert!(!store.expanded().is_empty());

        store.select_role("editor");
        assert!(store.expanded().is_empty());
        assert_eq!(store.tree_query(), "sales");
        assert_eq!(store.role("viewer").map(|r| r.checked.len()), Some(5));
    }

    #[test]
    fn test_tree_query_keeps_expansion() {
        let mut store = store();
        store.toggle_expand("projects");
        store.set_tree_query("owner");
        assert!(store.is_expanded("projects"));
        store.set_tree_query("");
        assert!(store.is_expanded("projects"));
    }

    #[test]
    fn test_presets_ignore_filter() {
        let mut store = store();
        store.select_role("editor");
        store.set_tree_query("sales");
        store.select_all();
        assert_eq!(store.counters().active, store.total_rows());

        store.clear_all();
        assert_eq!(store.counters().active, 0);
    }

    #[test]
    fn test_counters_sum_to_total() {
        let mut store = store();
        for role in ["viewer", "editor"] {
            store.select_role(role);
            let c = store.counters();
            assert_eq!(c.active + c.denied, store.total_rows());
        }
        assert_eq!(store.total_rows(), 7);
        assert_eq!(store.depth_counts(), &[3, 3, 1]);
    }

    #[test]
    fn test_denied_never_negative_with_stale_ids() {
        let stale: Vec<String> = (0..20).map(|i| format!("removed.{}", i)).collect();
        let store = PermissionTreeStore::new(sample_tree(), vec![RoleState::seeded("old", stale)]);
        let c = store.counters();
        assert_eq!(c.active, 20);
        assert_eq!(c.denied, 0);
    }

    #[test]
    fn test_visible_rows_follow_expansion() {
        let mut store = store();
        let ids: Vec<_> = store.visible_rows().into_iter().map(|r| r.id).collect();
        assert_eq!(ids, vec!["dashboard", "projects", "reports"]);

        store.toggle_expand("projects");
        let rows = store.visible_rows();
        let ids: Vec<_> = rows.iter().map(|r| r.id.as_str()).collect();
        assert_eq!(ids, vec!["dashboard", "projects", "projects.view", "projects.edit", "reports"]);
        assert_eq!(rows[2].depth, 1);
        assert!(rows[2].checked);
        assert!(rows[3].has_children);
        assert!(!rows[3].expanded);
    }

    #[test]
    fn test_visible_rows_while_searching() {
        let mut store = store();
        store.set_tree_query("owner");
        let ids: Vec<_> = store.visible_rows().into_iter().map(|r| r.id).collect();
        assert_eq!(ids, vec!["projects", "projects.edit", "projects.edit.owner"]);
        assert!(store.expanded().is_empty());
    }

    #[test]
    fn test_visible_row_json_shape() {
        let store = store();
        let value = serde_json::to_value(&store.visible_rows()[1]).unwrap();
        assert_eq!(value["id"], "projects");
        assert_eq!(value["hasChildren"], true);
        assert_eq!(value["expanded"], false);
        assert_eq!(value["checked"], true);
    }

    #[test]
    fn test_filtered_roles_by_id_and_label() {
        let mut store = PermissionTreeStore::from_config(&AccessConfig::baseline());
        store.set_role_query("ADMIN");
        let ids: Vec<_> = store.filtered_roles().iter().map(|r| r.role_id.as_str()).collect();
        assert_eq!(ids, vec!["super-admin", "admin"]);

        store.set_role_query("standard");
        assert!(store.filtered_roles().is_empty());

        store.set_role_query("User");
        let ids: Vec<_> = store.filtered_roles().iter().map(|r| r.role_id.as_str()).collect();
        assert_eq!(ids, vec!["user"]);
    }

    #[test]
    fn test_listeners_receive_events() {
        let seen: Arc<Mutex<Vec<&'static str>>> = Arc::new(Mutex::new(Vec::new()));
        let sink = seen.clone();

        let mut store = store();
        let id = store.subscribe(Arc::new(move |event: &TreeEvent| {
            sink.lock().unwrap().push(event.kind());
        }));

        store.select_role("editor");
        store.toggle_node("reports", true);
        store.expand_all();
        store.set_tree_query("x");
        assert!(store.unsubscribe(id));
        store.collapse_all();

        assert_eq!(
            *seen.lock().unwrap(),
            vec!["role_selected", "checked_changed", "expansion_changed", "tree_query_changed"]
        );
        assert_eq!(store.listener_count(), 0);
    }

    #[test]
    fn test_no_active_role() {
        let mut store = PermissionTreeStore::new(sample_tree(), Vec::new());
        store.toggle_node("reports", true);
        assert!(store.checked_ids().is_none());
        assert_eq!(store.counters().denied, 7);
    }
}
